use std::fmt::Debug;
use std::io;

pub(crate) trait Platform: Debug + Send + Sync + 'static {
    type TimeSource: TimeSource;

    /// Acquires a monotonic time source, failing if the platform does not have one.
    fn monotonic_time_source(&self) -> io::Result<Self::TimeSource>;
}

#[cfg_attr(test, mockall::automock)]
pub(crate) trait TimeSource: Debug {
    /// Nanoseconds since an arbitrary fixed point. Never decreases.
    fn now_nanos(&self) -> u64;
}
