use std::io;
use std::time::Instant;

use crate::pal::{Platform, TimeSource};

pub(crate) static BUILD_TARGET_PLATFORM: BuildTargetPlatform = BuildTargetPlatform;

/// Used where we have no direct line to the operating system clock (non-Unix targets and Miri).
/// Rust std `Instant` is monotonic on every supported platform.
#[derive(Debug)]
pub(crate) struct BuildTargetPlatform;

impl Platform for BuildTargetPlatform {
    type TimeSource = TimeSourceImpl;

    fn monotonic_time_source(&self) -> io::Result<Self::TimeSource> {
        Ok(TimeSourceImpl {
            epoch: Instant::now(),
        })
    }
}

#[derive(Debug)]
pub(crate) struct TimeSourceImpl {
    epoch: Instant,
}

impl TimeSource for TimeSourceImpl {
    fn now_nanos(&self) -> u64 {
        u64::try_from(self.epoch.elapsed().as_nanos()).unwrap_or(u64::MAX)
    }
}
