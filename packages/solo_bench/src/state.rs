use std::cell::Cell;
use std::num::NonZero;
use std::time::Duration;

use crate::{Allocate, Clock, TrackingAllocator};

/// The state of a benchmark run, handed to the benchmark function on every invocation.
///
/// The benchmark function must perform its unit of work [`iterations()`][Self::iterations]
/// times per invocation. The timer is already running when the function is called, so a
/// function that needs no setup can simply loop.
///
/// Work that should not be measured can be excluded in two ways:
///
/// * Setup performed at the start of the function is discarded by calling
///   [`reset_timer()`][Self::reset_timer] once the setup is done.
/// * Interior work (e.g. regenerating test data) is excluded by bracketing it with
///   [`stop_timer()`][Self::stop_timer] and [`start_timer()`][Self::start_timer].
///
/// Allocations are attributed to the run only if they go through
/// [`allocator()`][Self::allocator]. Stopping the timer pauses the clock but not the
/// allocation counters, so memory allocated while stopped and freed while running balances out.
///
/// # Examples
///
/// ```
/// use std::alloc::Layout;
///
/// use new_zealand::nz;
/// use solo_bench::{Allocate, AllocError, run_n};
///
/// let summary = run_n(
///     |state| {
///         // Setup that we do not want to measure.
///         let input = (0..1000_u64).collect::<Vec<_>>();
///         state.reset_timer();
///
///         for _ in 0..state.iterations() {
///             let block = state.allocator().allocate(Layout::new::<u64>())?;
///             std::hint::black_box(input.iter().sum::<u64>());
///
///             // SAFETY: The block was allocated by this allocator.
///             unsafe { state.allocator().free(block) };
///         }
///
///         Ok::<(), AllocError>(())
///     },
///     nz!(100),
/// )
/// .unwrap();
///
/// assert_eq!(summary.iterations().get(), 100);
/// assert_eq!(summary.allocs(), 100);
/// assert_eq!(summary.live_bytes(), 0);
/// ```
#[derive(Debug)]
pub struct RunState<'a> {
    iterations: NonZero<u64>,

    // Measured time accumulated from completed laps. A running lap is not included.
    measured: Cell<Duration>,
    timer_running: Cell<bool>,
    bytes_per_op: Cell<Option<u64>>,

    clock: Clock,
    allocator: TrackingAllocator<'a>,
}

impl<'a> RunState<'a> {
    pub(crate) fn new(clock: Clock, allocator: &'a dyn Allocate) -> Self {
        Self {
            iterations: NonZero::<u64>::MIN,
            measured: Cell::new(Duration::ZERO),
            timer_running: Cell::new(false),
            bytes_per_op: Cell::new(None),
            clock,
            allocator: TrackingAllocator::new(allocator),
        }
    }

    /// How many times the benchmark function must perform its unit of work in this invocation.
    #[must_use]
    pub fn iterations(&self) -> u64 {
        self.iterations.get()
    }

    /// The instrumented allocator. Allocations that should count towards the run's
    /// allocation metrics must go through it.
    #[must_use]
    pub fn allocator(&self) -> &TrackingAllocator<'a> {
        &self.allocator
    }

    /// Discards all time and allocations measured so far in this invocation.
    ///
    /// The iteration count is not affected. If the timer is running, it keeps running from
    /// this point on.
    pub fn reset_timer(&self) {
        if self.timer_running.get() {
            self.clock.reset();
        }

        self.measured.set(Duration::ZERO);
        self.allocator.reset_counters();
    }

    /// Resumes timing after [`stop_timer()`][Self::stop_timer]. Previously measured time and
    /// allocation counters are kept. Does nothing if the timer is already running.
    pub fn start_timer(&self) {
        if self.timer_running.replace(true) {
            return;
        }

        self.clock.start();
    }

    /// Pauses timing, adding the time since the timer was last started or reset to the
    /// measured total. Allocation counters are left alone. Does nothing if the timer is
    /// already stopped.
    pub fn stop_timer(&self) {
        if !self.timer_running.replace(false) {
            return;
        }

        self.measured
            .set(self.measured.get().saturating_add(self.clock.lap()));
    }

    /// Whether time is currently being measured.
    #[must_use]
    pub fn is_timer_running(&self) -> bool {
        self.timer_running.get()
    }

    /// The time measured so far in this invocation, including the current lap if the timer
    /// is running.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        if self.timer_running.get() {
            self.measured.get().saturating_add(self.clock.elapsed())
        } else {
            self.measured.get()
        }
    }

    /// Declares how many bytes each unit of work processes, enabling throughput metrics in
    /// the [`RunSummary`][crate::RunSummary].
    pub fn set_bytes_per_op(&self, bytes: u64) {
        self.bytes_per_op.set(Some(bytes));
    }

    pub(crate) fn bytes_per_op(&self) -> Option<u64> {
        self.bytes_per_op.get()
    }

    /// Invokes the benchmark function once with the given iteration count. All measurements
    /// from any previous invocation are discarded first.
    pub(crate) fn run_once<F, E>(
        &mut self,
        iterations: NonZero<u64>,
        benchmark: &mut F,
    ) -> Result<(), E>
    where
        F: FnMut(&mut RunState<'_>) -> Result<(), E>,
    {
        self.iterations = iterations;

        self.stop_timer();
        self.reset_timer();
        self.start_timer();

        benchmark(self)?;

        self.stop_timer();
        Ok(())
    }
}
