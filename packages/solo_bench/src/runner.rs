//! Drives the benchmark function, scaling the iteration count in duration-target mode.

use std::num::NonZero;
use std::time::Duration;

use tracing::{debug, trace};

use crate::{Clock, Harness, RunError, RunState, RunSummary, Target};

/// A single scaling step never raises the iteration count by more than this factor.
pub const GROWTH_LIMIT_FACTOR: u64 = 100;

/// Each scaling step aims `1 / HEADROOM_DIVISOR` beyond the extrapolated iteration count,
/// so that the next invocation is likely to reach the target duration.
pub const HEADROOM_DIVISOR: u64 = 5;

/// Runs `benchmark` once, with the benchmark function expected to perform its unit of work
/// exactly `iterations` times.
///
/// # Errors
///
/// Fails if the platform has no monotonic clock or if the benchmark function fails.
///
/// # Examples
///
/// ```
/// use std::convert::Infallible;
///
/// use new_zealand::nz;
/// use solo_bench::run_n;
///
/// let summary = run_n(|_state| Ok::<(), Infallible>(()), nz!(10)).unwrap();
///
/// assert_eq!(summary.iterations().get(), 10);
/// ```
pub fn run_n<F, E>(benchmark: F, iterations: NonZero<u64>) -> Result<RunSummary, RunError<E>>
where
    F: FnMut(&mut RunState<'_>) -> Result<(), E>,
{
    Harness::new(Target::Iterations(iterations)).run(benchmark)
}

/// Runs `benchmark` with increasing iteration counts until one invocation measures at least
/// `target` or the default iteration ceiling is reached.
///
/// # Errors
///
/// Fails if `target` is zero, if the platform has no monotonic clock or if the benchmark
/// function fails.
///
/// # Examples
///
/// ```
/// use std::convert::Infallible;
/// use std::time::Duration;
///
/// use solo_bench::run_ns;
///
/// let target = Duration::from_millis(10);
///
/// let summary = run_ns(
///     |state| {
///         for _ in 0..state.iterations() {
///             std::hint::black_box((0..64_u64).product::<u64>());
///         }
///         Ok::<(), Infallible>(())
///     },
///     target,
/// )
/// .unwrap();
///
/// assert!(summary.elapsed() >= target || summary.iterations().get() == 1_000_000_000);
/// ```
pub fn run_ns<F, E>(benchmark: F, target: Duration) -> Result<RunSummary, RunError<E>>
where
    F: FnMut(&mut RunState<'_>) -> Result<(), E>,
{
    Harness::new(Target::Duration(target)).run(benchmark)
}

impl Harness<'_> {
    /// Executes a benchmark run with this configuration.
    ///
    /// # Errors
    ///
    /// Fails if the target duration is zero, if the platform has no monotonic clock or if the
    /// benchmark function fails. The benchmark function's error aborts the run immediately and
    /// is returned as [`RunError::Benchmark`].
    pub fn run<F, E>(&self, mut benchmark: F) -> Result<RunSummary, RunError<E>>
    where
        F: FnMut(&mut RunState<'_>) -> Result<(), E>,
    {
        debug!(
            mode = ?self.target,
            iteration_ceiling = self.iteration_ceiling.get(),
            "starting benchmark run"
        );

        if self.target == Target::Duration(Duration::ZERO) {
            return Err(RunError::ZeroTargetDuration);
        }

        let clock = Clock::from_pal(&self.pal).map_err(|e| {
            debug!(error = %e, "monotonic clock is not available");
            RunError::ClockUnavailable(e)
        })?;

        let mut state = RunState::new(clock, self.allocator);

        let trials = match self.target {
            Target::Iterations(iterations) => {
                run_trial(&mut state, iterations, &mut benchmark)?;
                NonZero::<u64>::MIN
            }
            Target::Duration(target) => self.scale_to_duration(&mut state, target, &mut benchmark)?,
        };

        let summary = RunSummary::from_state(&state, trials);

        debug!(
            iterations = summary.iterations().get(),
            elapsed = ?summary.elapsed(),
            trials = summary.trials().get(),
            "benchmark run completed"
        );

        Ok(summary)
    }

    /// Returns the number of trials it took.
    fn scale_to_duration<F, E>(
        &self,
        state: &mut RunState<'_>,
        target: Duration,
        benchmark: &mut F,
    ) -> Result<NonZero<u64>, RunError<E>>
    where
        F: FnMut(&mut RunState<'_>) -> Result<(), E>,
    {
        let target_nanos = saturating_nanos(target);

        let mut iterations = NonZero::<u64>::MIN;
        let mut trials = NonZero::<u64>::MIN;

        loop {
            run_trial(state, iterations, benchmark)?;

            let elapsed_nanos = saturating_nanos(state.elapsed());

            if elapsed_nanos >= target_nanos {
                return Ok(trials);
            }

            if iterations >= self.iteration_ceiling {
                debug!(
                    iterations = iterations.get(),
                    elapsed_nanos,
                    target_nanos,
                    "iteration ceiling reached before target duration"
                );
                return Ok(trials);
            }

            let next = next_iterations(
                target_nanos,
                iterations,
                elapsed_nanos,
                self.iteration_ceiling,
            );

            trace!(
                previous = iterations.get(),
                elapsed_nanos,
                next = next.get(),
                "scaling iteration count"
            );

            iterations = next;
            trials = trials.saturating_add(1);
        }
    }
}

fn run_trial<F, E>(
    state: &mut RunState<'_>,
    iterations: NonZero<u64>,
    benchmark: &mut F,
) -> Result<(), RunError<E>>
where
    F: FnMut(&mut RunState<'_>) -> Result<(), E>,
{
    state.run_once(iterations, benchmark).map_err(|e| {
        debug!(iterations = iterations.get(), "benchmark function failed");
        RunError::Benchmark(e)
    })
}

/// Extrapolates the iteration count that should make one invocation take `target_nanos`,
/// given that `previous` iterations took `previous_nanos`.
///
/// The result is 20% above the linear extrapolation, at most `GROWTH_LIMIT_FACTOR` times
/// `previous`, at least `previous + 1` and never above `ceiling` (which takes priority).
#[expect(
    clippy::integer_division,
    reason = "iteration counts are whole numbers, truncation is intended"
)]
pub(crate) fn next_iterations(
    target_nanos: u64,
    previous: NonZero<u64>,
    previous_nanos: u64,
    ceiling: NonZero<u64>,
) -> NonZero<u64> {
    let previous = u128::from(previous.get());

    // A zero measurement (coarse clock, trivial body) would otherwise divide by zero.
    let previous_nanos = u128::from(previous_nanos.max(1));

    // u128 cannot overflow here: the product of two u64 values always fits.
    let extrapolated = u128::from(target_nanos).saturating_mul(previous) / previous_nanos;
    let with_headroom = extrapolated.saturating_add(extrapolated / u128::from(HEADROOM_DIVISOR));

    let next = with_headroom
        .min(previous.saturating_mul(u128::from(GROWTH_LIMIT_FACTOR)))
        .max(previous.saturating_add(1))
        .min(u128::from(ceiling.get()));

    let next = u64::try_from(next).expect("bounded by a u64 ceiling");

    NonZero::new(next).expect("at least min(previous + 1, ceiling), both of which are nonzero")
}

#[cfg_attr(test, mutants::skip)] // Saturation needs a duration of more than 584 years.
fn saturating_nanos(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}
