use std::io;

#[cfg(test)]
use crate::pal::{FakePlatform, FakeTimeSource, MockTimeSource};
use crate::pal::{BUILD_TARGET_PLATFORM, BuildTargetPlatform, Platform, TimeSource, TimeSourceImpl};

#[derive(Clone, Debug)]
pub(crate) enum PlatformFacade {
    Real(&'static BuildTargetPlatform),

    #[cfg(test)]
    Fake(FakePlatform),
}

impl PlatformFacade {
    pub(crate) fn real() -> Self {
        Self::Real(&BUILD_TARGET_PLATFORM)
    }
}

impl Platform for PlatformFacade {
    type TimeSource = TimeSourceFacade;

    fn monotonic_time_source(&self) -> io::Result<TimeSourceFacade> {
        match self {
            Self::Real(p) => p.monotonic_time_source().map(Into::into),
            #[cfg(test)]
            Self::Fake(p) => p.monotonic_time_source().map(Into::into),
        }
    }
}

#[cfg(test)]
impl From<FakePlatform> for PlatformFacade {
    fn from(p: FakePlatform) -> Self {
        Self::Fake(p)
    }
}

#[derive(Debug)]
pub(crate) enum TimeSourceFacade {
    Real(TimeSourceImpl),

    #[cfg(test)]
    Fake(FakeTimeSource),

    #[cfg(test)]
    Mock(MockTimeSource),
}

impl From<TimeSourceImpl> for TimeSourceFacade {
    fn from(ts: TimeSourceImpl) -> Self {
        Self::Real(ts)
    }
}

#[cfg(test)]
impl From<FakeTimeSource> for TimeSourceFacade {
    fn from(ts: FakeTimeSource) -> Self {
        Self::Fake(ts)
    }
}

#[cfg(test)]
impl From<MockTimeSource> for TimeSourceFacade {
    fn from(ts: MockTimeSource) -> Self {
        Self::Mock(ts)
    }
}

impl TimeSource for TimeSourceFacade {
    fn now_nanos(&self) -> u64 {
        match self {
            Self::Real(ts) => ts.now_nanos(),
            #[cfg(test)]
            Self::Fake(ts) => ts.now_nanos(),
            #[cfg(test)]
            Self::Mock(ts) => ts.now_nanos(),
        }
    }
}
