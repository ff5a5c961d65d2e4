use std::alloc::Layout;
use std::io;

use thiserror::Error;

/// Errors returned by the benchmark entry points.
///
/// `E` is the error type of the benchmark function. The harness never inspects it; a failing
/// benchmark function aborts the run and its error is handed back unchanged.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RunError<E> {
    /// The platform could not provide a monotonic clock. Raised before the benchmark
    /// function is invoked for the first time.
    #[error("no monotonic clock is available on this platform")]
    ClockUnavailable(#[source] io::Error),

    /// Duration-target mode was requested with a zero duration.
    #[error("the target duration of a benchmark run must be greater than zero")]
    ZeroTargetDuration,

    /// The benchmark function returned an error.
    #[error("benchmark function failed")]
    Benchmark(#[source] E),
}

impl<E> RunError<E> {
    /// Returns the benchmark function's own error, if that is what aborted the run.
    #[must_use]
    pub fn benchmark_error(&self) -> Option<&E> {
        match self {
            Self::Benchmark(e) => Some(e),
            _ => None,
        }
    }

    /// Consumes the error, returning the benchmark function's own error if that is what
    /// aborted the run.
    #[must_use]
    pub fn into_benchmark_error(self) -> Option<E> {
        match self {
            Self::Benchmark(e) => Some(e),
            _ => None,
        }
    }
}

/// An allocation request the underlying allocator could not satisfy.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
#[non_exhaustive]
pub enum AllocError {
    /// The allocator has no memory to hand out for this layout.
    #[error(
        "allocator could not provide {} bytes aligned to {}",
        .layout.size(),
        .layout.align()
    )]
    Exhausted {
        /// The layout that was requested.
        layout: Layout,
    },

    /// The allocator could not resize the block. The block is still valid at its old size.
    #[error("allocator could not resize a {} byte block to {new_size} bytes", .layout.size())]
    ResizeRefused {
        /// The layout of the block before the resize was attempted.
        layout: Layout,

        /// The size the caller asked for.
        new_size: usize,
    },
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::error::Error as _;
    use std::fmt::Debug;

    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(AllocError: Send, Sync, Debug, Copy);
    assert_impl_all!(RunError<AllocError>: Send, Sync, Debug);

    #[test]
    fn benchmark_error_is_exposed_as_source() {
        let layout = Layout::new::<u64>();
        let error: RunError<AllocError> = RunError::Benchmark(AllocError::Exhausted { layout });

        let source = error.source().unwrap();
        assert_eq!(
            source.to_string(),
            "allocator could not provide 8 bytes aligned to 8"
        );
    }

    #[test]
    fn into_benchmark_error_returns_original_value() {
        let layout = Layout::new::<u32>();
        let original = AllocError::ResizeRefused {
            layout,
            new_size: 64,
        };

        let error: RunError<AllocError> = RunError::Benchmark(original);

        assert_eq!(error.benchmark_error(), Some(&original));
        assert_eq!(error.into_benchmark_error(), Some(original));
    }

    #[test]
    fn harness_errors_carry_no_benchmark_error() {
        let error: RunError<AllocError> = RunError::ZeroTargetDuration;
        assert!(error.benchmark_error().is_none());

        let error: RunError<AllocError> =
            RunError::ClockUnavailable(io::Error::from(io::ErrorKind::Unsupported));
        assert!(error.source().is_some());
        assert!(error.into_benchmark_error().is_none());
    }

    #[test]
    fn resize_refused_message_names_sizes() {
        let error = AllocError::ResizeRefused {
            layout: Layout::from_size_align(16, 8).unwrap(),
            new_size: 4096,
        };

        assert_eq!(
            error.to_string(),
            "allocator could not resize a 16 byte block to 4096 bytes"
        );
    }
}
