use std::cell::Cell;
use std::io;
use std::time::Duration;

use crate::pal::{Platform, PlatformFacade, TimeSource, TimeSourceFacade};

/// A monotonic stopwatch with lap semantics.
///
/// The clock keeps a single reference point. [`lap()`][Self::lap] returns the time elapsed since
/// that reference point and moves the reference point to "now", while [`reset()`][Self::reset]
/// only moves the reference point.
///
/// The underlying time source is immune to wall-clock adjustments. Acquiring it is the only
/// fallible step: once a `Clock` exists, reading it cannot fail.
///
/// # Examples
///
/// ```
/// use solo_bench::Clock;
///
/// let clock = Clock::new().expect("this platform has a monotonic clock");
///
/// clock.start();
/// std::hint::black_box((0..1000).sum::<u64>());
/// let first = clock.lap();
///
/// std::hint::black_box((0..1000).sum::<u64>());
/// let second = clock.lap();
///
/// println!("first: {first:?}, second: {second:?}");
/// ```
#[derive(Debug)]
pub struct Clock {
    source: TimeSourceFacade,
    reference_nanos: Cell<u64>,
}

impl Clock {
    /// Acquires the platform's monotonic clock.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform cannot provide a monotonic time source.
    pub fn new() -> io::Result<Self> {
        Self::from_pal(&PlatformFacade::real())
    }

    pub(crate) fn from_pal(pal: &PlatformFacade) -> io::Result<Self> {
        Ok(Self::from_source(pal.monotonic_time_source()?))
    }

    pub(crate) fn from_source(source: TimeSourceFacade) -> Self {
        let now = source.now_nanos();

        Self {
            source,
            reference_nanos: Cell::new(now),
        }
    }

    /// Begins a measurement by setting the reference point to the current time.
    pub fn start(&self) {
        self.reset();
    }

    /// Moves the reference point to the current time without reporting anything.
    pub fn reset(&self) {
        self.reference_nanos.set(self.source.now_nanos());
    }

    /// Returns the time elapsed since the last start, reset or lap, and moves the
    /// reference point to the current time.
    #[must_use = "the lap duration is the only output of this call"]
    pub fn lap(&self) -> Duration {
        let now = self.source.now_nanos();
        let previous = self.reference_nanos.replace(now);

        Duration::from_nanos(now.saturating_sub(previous))
    }

    /// Returns the time elapsed since the reference point, leaving the reference point in place.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        Duration::from_nanos(
            self.source
                .now_nanos()
                .saturating_sub(self.reference_nanos.get()),
        )
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use mockall::Sequence;

    use super::*;
    use crate::pal::{FakePlatform, MockTimeSource};

    fn mock_source(readings: &[u64]) -> MockTimeSource {
        let mut source = MockTimeSource::new();
        let mut seq = Sequence::new();

        for &reading in readings {
            source
                .expect_now_nanos()
                .once()
                .in_sequence(&mut seq)
                .return_const(reading);
        }

        source
    }

    #[test]
    fn lap_measures_since_previous_lap() {
        // Construction reads once, then each lap reads once.
        let clock = Clock::from_source(mock_source(&[1_000, 1_500, 4_000]).into());

        assert_eq!(clock.lap(), Duration::from_nanos(500));
        assert_eq!(clock.lap(), Duration::from_nanos(2_500));
    }

    #[test]
    fn reset_discards_elapsed_time() {
        let clock = Clock::from_source(mock_source(&[0, 10_000, 10_250]).into());

        clock.reset();
        assert_eq!(clock.lap(), Duration::from_nanos(250));
    }

    #[test]
    fn elapsed_does_not_move_reference() {
        let clock = Clock::from_source(mock_source(&[100, 300, 700]).into());

        assert_eq!(clock.elapsed(), Duration::from_nanos(200));
        assert_eq!(clock.lap(), Duration::from_nanos(600));
    }

    #[test]
    fn start_sets_reference_point() {
        let platform = FakePlatform::new();
        let clock = Clock::from_pal(&platform.clone().into()).unwrap();

        platform.advance(Duration::from_micros(3));
        clock.start();
        platform.advance(Duration::from_micros(2));

        assert_eq!(clock.lap(), Duration::from_micros(2));
    }

    #[test]
    fn acquisition_failure_is_reported() {
        let result = Clock::from_pal(&FakePlatform::without_clock().into());

        assert!(result.is_err());
    }

    #[cfg(not(miri))] // Miri does not need to exercise the real platform here.
    #[test]
    fn real_clock_is_monotonic() {
        let clock = Clock::new().unwrap();

        let first = clock.elapsed();
        let second = clock.elapsed();

        assert!(second >= first);
    }
}
