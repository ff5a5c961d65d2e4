//! Fake platform for testing, with time that only moves when told to.

use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::pal::{Platform, TimeSource};

const ERR_POISONED_FAKE: &str = "FakePlatform state lock should not be poisoned";

#[derive(Debug)]
struct FakePlatformState {
    now_nanos: u64,
    clock_available: bool,
}

/// Clones share the same state, so a test can keep one handle and advance time
/// while the harness reads it through another.
#[derive(Clone, Debug)]
pub(crate) struct FakePlatform {
    state: Arc<Mutex<FakePlatformState>>,
}

impl FakePlatform {
    pub(crate) fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(FakePlatformState {
                now_nanos: 0,
                clock_available: true,
            })),
        }
    }

    /// A platform on which acquiring the monotonic clock fails.
    pub(crate) fn without_clock() -> Self {
        let platform = Self::new();
        platform.state.lock().expect(ERR_POISONED_FAKE).clock_available = false;
        platform
    }

    pub(crate) fn advance(&self, duration: Duration) {
        let nanos = u64::try_from(duration.as_nanos()).expect("fake durations are small");

        let mut state = self.state.lock().expect(ERR_POISONED_FAKE);
        state.now_nanos = state.now_nanos.saturating_add(nanos);
    }
}

impl Platform for FakePlatform {
    type TimeSource = FakeTimeSource;

    fn monotonic_time_source(&self) -> io::Result<Self::TimeSource> {
        if !self.state.lock().expect(ERR_POISONED_FAKE).clock_available {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "fake platform has no monotonic clock",
            ));
        }

        Ok(FakeTimeSource {
            state: Arc::clone(&self.state),
        })
    }
}

#[derive(Debug)]
pub(crate) struct FakeTimeSource {
    state: Arc<Mutex<FakePlatformState>>,
}

impl TimeSource for FakeTimeSource {
    fn now_nanos(&self) -> u64 {
        self.state.lock().expect(ERR_POISONED_FAKE).now_nanos
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn starts_at_zero() {
        let source = FakePlatform::new().monotonic_time_source().unwrap();
        assert_eq!(source.now_nanos(), 0);
    }

    #[test]
    fn advance_is_visible_through_time_source() {
        let platform = FakePlatform::new();
        let source = platform.monotonic_time_source().unwrap();

        platform.advance(Duration::from_nanos(150));
        platform.clone().advance(Duration::from_nanos(50));

        assert_eq!(source.now_nanos(), 200);
    }

    #[test]
    fn without_clock_fails_acquisition() {
        let result = FakePlatform::without_clock().monotonic_time_source();
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::Unsupported);
    }
}
