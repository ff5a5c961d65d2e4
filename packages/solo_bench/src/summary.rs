use std::num::NonZero;
use std::time::Duration;

use crate::RunState;

/// The outcome of a benchmark run: raw counters from the final invocation of the benchmark
/// function plus per-operation metrics derived from them.
///
/// In duration-target mode the benchmark function is invoked several times with growing
/// iteration counts. Only the last invocation contributes to the summary.
///
/// # Examples
///
/// ```
/// use std::convert::Infallible;
///
/// use new_zealand::nz;
/// use solo_bench::run_n;
///
/// let summary = run_n(
///     |state| {
///         for i in 0..state.iterations() {
///             std::hint::black_box(i.wrapping_mul(31));
///         }
///         Ok::<(), Infallible>(())
///     },
///     nz!(1000),
/// )
/// .unwrap();
///
/// println!(
///     "{} iterations, {:.2} ns/op, {} allocs/op",
///     summary.iterations(),
///     summary.nanos_per_op(),
///     summary.allocs_per_op()
/// );
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RunSummary {
    iterations: NonZero<u64>,
    elapsed: Duration,
    allocs: u64,
    alloc_bytes: u64,
    live_bytes: i64,
    bytes_per_op: Option<u64>,
    trials: NonZero<u64>,
}

impl RunSummary {
    pub(crate) fn from_state(state: &RunState<'_>, trials: NonZero<u64>) -> Self {
        let allocator = state.allocator();

        Self {
            iterations: NonZero::new(state.iterations())
                .expect("RunState iteration count is guaranteed to be nonzero"),
            elapsed: state.elapsed(),
            allocs: allocator.alloc_count(),
            alloc_bytes: allocator.alloc_bytes(),
            live_bytes: allocator.live_bytes(),
            bytes_per_op: state.bytes_per_op(),
            trials,
        }
    }

    /// The iteration count of the final invocation.
    #[must_use]
    pub fn iterations(&self) -> NonZero<u64> {
        self.iterations
    }

    /// Total measured time of the final invocation.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Total measured time of the final invocation, in nanoseconds.
    #[must_use]
    pub fn nanos(&self) -> u128 {
        self.elapsed.as_nanos()
    }

    /// Number of allocations made through the tracked allocator while measuring.
    #[must_use]
    pub fn allocs(&self) -> u64 {
        self.allocs
    }

    /// Bytes allocated through the tracked allocator while measuring.
    #[must_use]
    pub fn alloc_bytes(&self) -> u64 {
        self.alloc_bytes
    }

    /// Net bytes allocated but not freed while measuring.
    #[must_use]
    pub fn live_bytes(&self) -> i64 {
        self.live_bytes
    }

    /// Whether memory allocated while measuring was left unfreed.
    ///
    /// The harness cannot tell memory that is intentionally kept alive from memory that was
    /// forgotten; anything still live at the end of the run counts.
    #[must_use]
    pub fn has_leaks(&self) -> bool {
        self.live_bytes > 0
    }

    /// How many times the benchmark function was invoked to arrive at this summary.
    ///
    /// Always 1 in fixed-count mode.
    #[must_use]
    pub fn trials(&self) -> NonZero<u64> {
        self.trials
    }

    /// Mean measured nanoseconds per iteration.
    #[must_use]
    pub fn nanos_per_op(&self) -> f64 {
        self.per_op(u128_to_f64(self.nanos()))
    }

    /// Mean number of allocations per iteration.
    #[must_use]
    pub fn allocs_per_op(&self) -> f64 {
        self.per_op(u64_to_f64(self.allocs))
    }

    /// Mean bytes allocated per iteration.
    #[must_use]
    pub fn alloc_bytes_per_op(&self) -> f64 {
        self.per_op(u64_to_f64(self.alloc_bytes))
    }

    /// Mean live bytes left behind per iteration.
    #[must_use]
    pub fn live_bytes_per_op(&self) -> f64 {
        self.per_op(i64_to_f64(self.live_bytes))
    }

    /// The bytes processed per iteration, as declared by the benchmark function via
    /// [`RunState::set_bytes_per_op()`].
    #[must_use]
    pub fn bytes_per_op(&self) -> Option<u64> {
        self.bytes_per_op
    }

    /// Throughput in bytes per second, if the benchmark function declared how many bytes each
    /// iteration processes and a nonzero amount of time was measured.
    #[must_use]
    pub fn bytes_per_second(&self) -> Option<f64> {
        let bytes_per_op = self.bytes_per_op?;

        if self.elapsed.is_zero() {
            return None;
        }

        let total_bytes = u64_to_f64(bytes_per_op) * u64_to_f64(self.iterations.get());
        Some(total_bytes / self.elapsed.as_secs_f64())
    }

    fn per_op(&self, total: f64) -> f64 {
        total / u64_to_f64(self.iterations.get())
    }
}

#[expect(
    clippy::cast_precision_loss,
    reason = "per-operation metrics are approximate, precision loss only affects huge values"
)]
fn u64_to_f64(value: u64) -> f64 {
    value as f64
}

#[expect(
    clippy::cast_precision_loss,
    reason = "per-operation metrics are approximate, precision loss only affects huge values"
)]
fn u128_to_f64(value: u128) -> f64 {
    value as f64
}

#[expect(
    clippy::cast_precision_loss,
    reason = "per-operation metrics are approximate, precision loss only affects huge values"
)]
fn i64_to_f64(value: i64) -> f64 {
    value as f64
}

#[cfg(test)]
impl RunSummary {
    pub(crate) fn new_for_test(
        iterations: NonZero<u64>,
        elapsed: Duration,
        allocs: u64,
        alloc_bytes: u64,
        live_bytes: i64,
        bytes_per_op: Option<u64>,
    ) -> Self {
        Self {
            iterations,
            elapsed,
            allocs,
            alloc_bytes,
            live_bytes,
            bytes_per_op,
            trials: NonZero::<u64>::MIN,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use new_zealand::nz;
    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(RunSummary: Send, Sync, Copy);

    const EPSILON: f64 = 1e-9;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPSILON,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn per_op_metrics_are_ratios() {
        let summary = RunSummary::new_for_test(
            nz!(10),
            Duration::from_nanos(1_234),
            10,
            80,
            40,
            None,
        );

        assert_close(summary.nanos_per_op(), 123.4);
        assert_close(summary.allocs_per_op(), 1.0);
        assert_close(summary.alloc_bytes_per_op(), 8.0);
        assert_close(summary.live_bytes_per_op(), 4.0);
    }

    #[test]
    fn single_iteration_metrics_equal_raw_counters() {
        let summary =
            RunSummary::new_for_test(nz!(1), Duration::from_micros(3), 7, 700, 0, None);

        assert_close(summary.nanos_per_op(), 3_000.0);
        assert_close(summary.allocs_per_op(), 7.0);
        assert_close(summary.alloc_bytes_per_op(), 700.0);
        assert_close(summary.live_bytes_per_op(), 0.0);
        assert_eq!(summary.nanos(), 3_000);
    }

    #[test]
    fn negative_live_bytes_stay_negative() {
        let summary = RunSummary::new_for_test(nz!(4), Duration::ZERO, 0, 0, -64, None);

        assert_close(summary.live_bytes_per_op(), -16.0);
        assert!(!summary.has_leaks());
    }

    #[test]
    fn leaks_are_positive_live_bytes() {
        let summary = RunSummary::new_for_test(nz!(4), Duration::ZERO, 4, 32, 8, None);
        assert!(summary.has_leaks());

        let summary = RunSummary::new_for_test(nz!(4), Duration::ZERO, 4, 32, 0, None);
        assert!(!summary.has_leaks());
    }

    #[test]
    fn throughput_requires_declared_bytes() {
        let summary = RunSummary::new_for_test(nz!(1000), Duration::from_secs(1), 0, 0, 0, None);

        assert_eq!(summary.bytes_per_op(), None);
        assert!(summary.bytes_per_second().is_none());
    }

    #[test]
    fn throughput_is_bytes_over_elapsed() {
        let summary = RunSummary::new_for_test(
            nz!(1000),
            Duration::from_millis(500),
            0,
            0,
            0,
            Some(64),
        );

        assert_eq!(summary.bytes_per_op(), Some(64));
        assert_close(summary.bytes_per_second().unwrap(), 128_000.0);
    }

    #[test]
    fn throughput_undefined_for_zero_elapsed() {
        let summary = RunSummary::new_for_test(nz!(10), Duration::ZERO, 0, 0, 0, Some(8));

        assert!(summary.bytes_per_second().is_none());
    }
}
