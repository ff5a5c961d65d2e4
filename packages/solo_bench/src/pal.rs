//! Platform abstraction layer for the monotonic time source.
//!
//! The real implementation reads `CLOCK_MONOTONIC` on Unix and falls back to
//! [`std::time::Instant`] elsewhere (and under Miri). Tests substitute a fake
//! platform whose time only moves when the test says so.

mod abstractions;
mod facade;
#[cfg(test)]
mod fake;
#[cfg(any(miri, not(unix)))]
mod rust;
#[cfg(all(unix, not(miri)))]
mod unix;

pub(crate) use abstractions::*;
pub(crate) use facade::*;
#[cfg(test)]
pub(crate) use fake::*;
#[cfg(any(miri, not(unix)))]
pub(crate) use rust::*;
#[cfg(all(unix, not(miri)))]
pub(crate) use unix::*;
