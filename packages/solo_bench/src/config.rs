use std::fmt;
use std::num::NonZero;
use std::time::Duration;

use crate::pal::PlatformFacade;
use crate::{Allocate, SystemAllocator};

/// The default upper bound on the iteration count in duration-target mode.
pub const DEFAULT_ITERATION_CEILING: NonZero<u64> = match NonZero::new(1_000_000_000) {
    Some(value) => value,
    None => panic!("literal is nonzero"),
};

static SYSTEM_ALLOCATOR: SystemAllocator = SystemAllocator;

/// What a benchmark run aims for.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum Target {
    /// Invoke the benchmark function once, with exactly this iteration count.
    Iterations(NonZero<u64>),

    /// Keep raising the iteration count until a single invocation of the benchmark function
    /// measures at least this much time, or the iteration ceiling is reached.
    ///
    /// Must be greater than zero.
    Duration(Duration),
}

/// Configures and executes benchmark runs.
///
/// [`run_n()`][crate::run_n] and [`run_ns()`][crate::run_ns] cover the common cases. Use a
/// `Harness` directly to change the iteration ceiling or to measure allocations made through a
/// custom underlying allocator.
///
/// # Examples
///
/// ```
/// use std::convert::Infallible;
/// use std::time::Duration;
///
/// use new_zealand::nz;
/// use solo_bench::{Harness, SystemAllocator, Target};
///
/// let allocator = SystemAllocator;
///
/// let summary = Harness::new(Target::Duration(Duration::from_millis(5)))
///     .iteration_ceiling(nz!(10_000))
///     .allocator(&allocator)
///     .run(|state| {
///         for _ in 0..state.iterations() {
///             std::hint::black_box((0..100_u32).sum::<u32>());
///         }
///         Ok::<(), Infallible>(())
///     })
///     .unwrap();
///
/// assert!(summary.iterations().get() <= 10_000);
/// ```
#[must_use]
pub struct Harness<'a> {
    pub(crate) target: Target,
    pub(crate) iteration_ceiling: NonZero<u64>,
    pub(crate) allocator: &'a dyn Allocate,
    pub(crate) pal: PlatformFacade,
}

impl Harness<'static> {
    /// Creates a harness for the given target, using the system allocator and the default
    /// iteration ceiling.
    pub fn new(target: Target) -> Self {
        Self {
            target,
            iteration_ceiling: DEFAULT_ITERATION_CEILING,
            allocator: &SYSTEM_ALLOCATOR,
            pal: PlatformFacade::real(),
        }
    }
}

impl<'a> Harness<'a> {
    /// Sets the upper bound on the iteration count in duration-target mode.
    ///
    /// Has no effect in fixed-count mode.
    pub fn iteration_ceiling(mut self, ceiling: NonZero<u64>) -> Self {
        self.iteration_ceiling = ceiling;
        self
    }

    /// Sets the allocator that the run's tracking allocator forwards to.
    ///
    /// The allocator must outlive every run of the harness.
    pub fn allocator<'b>(self, allocator: &'b dyn Allocate) -> Harness<'b> {
        Harness {
            target: self.target,
            iteration_ceiling: self.iteration_ceiling,
            allocator,
            pal: self.pal,
        }
    }

    /// The configured target.
    #[must_use]
    pub fn target(&self) -> Target {
        self.target
    }

    #[cfg(test)]
    pub(crate) fn platform(mut self, pal: impl Into<PlatformFacade>) -> Self {
        self.pal = pal.into();
        self
    }
}

impl fmt::Debug for Harness<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Harness")
            .field("target", &self.target)
            .field("iteration_ceiling", &self.iteration_ceiling)
            .field("allocator", &"<allocator>")
            .field("pal", &self.pal)
            .finish()
    }
}
