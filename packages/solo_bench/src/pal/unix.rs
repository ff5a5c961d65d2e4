use std::io;
use std::marker::PhantomData;
use std::mem::MaybeUninit;

use crate::pal::{Platform, TimeSource};

const NANOS_PER_SEC: u64 = 1_000_000_000;

pub(crate) static BUILD_TARGET_PLATFORM: BuildTargetPlatform = BuildTargetPlatform::new();

#[derive(Debug)]
pub(crate) struct BuildTargetPlatform {
    _placeholder: PhantomData<()>,
}

impl BuildTargetPlatform {
    pub(crate) const fn new() -> Self {
        Self {
            _placeholder: PhantomData,
        }
    }
}

impl Platform for BuildTargetPlatform {
    type TimeSource = TimeSourceImpl;

    fn monotonic_time_source(&self) -> io::Result<Self::TimeSource> {
        // Probe once so a missing clock is reported before anything is measured.
        read_monotonic_nanos()?;

        Ok(TimeSourceImpl {
            _placeholder: PhantomData,
        })
    }
}

#[derive(Debug)]
pub(crate) struct TimeSourceImpl {
    _placeholder: PhantomData<()>,
}

impl TimeSource for TimeSourceImpl {
    fn now_nanos(&self) -> u64 {
        read_monotonic_nanos()
            .expect("CLOCK_MONOTONIC answered when the time source was acquired and cannot disappear afterwards")
    }
}

#[cfg_attr(test, mutants::skip)] // Real clock readings cannot be given expectations in tests.
fn read_monotonic_nanos() -> io::Result<u64> {
    let mut timespec = MaybeUninit::<libc::timespec>::uninit();

    // SAFETY: The pointer refers to writable storage for exactly one `timespec`,
    // which is all that `clock_gettime` writes to.
    let result = unsafe { libc::clock_gettime(libc::CLOCK_MONOTONIC, timespec.as_mut_ptr()) };

    if result != 0 {
        return Err(io::Error::last_os_error());
    }

    // SAFETY: `clock_gettime` returned success, so it has fully initialized the value.
    let timespec = unsafe { timespec.assume_init() };

    let secs = u64::try_from(timespec.tv_sec)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    let nanos = u64::try_from(timespec.tv_nsec)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    Ok(secs.saturating_mul(NANOS_PER_SEC).saturating_add(nanos))
}
