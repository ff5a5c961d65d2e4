#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Single-threaded micro-benchmark harness with adaptive iteration scaling and allocation
//! tracking.
//!
//! A benchmark is a function that receives a [`RunState`] and performs its unit of work
//! [`RunState::iterations()`] times. The harness decides the iteration count, measures the
//! elapsed time with a monotonic [`Clock`] and counts the allocations the function makes
//! through [`RunState::allocator()`]. The outcome is a [`RunSummary`] with raw counters and
//! per-operation metrics.
//!
//! The core functionality includes:
//! - [`run_n()`] - Runs a benchmark with a fixed iteration count
//! - [`run_ns()`] - Raises the iteration count until a run takes at least a target duration
//! - [`Harness`] - Configures runs (target, iteration ceiling, underlying allocator)
//! - [`RunState`] - Timer controls and the tracking allocator, passed to the benchmark function
//! - [`TrackingAllocator`] - Counts allocations, allocated bytes and live bytes
//! - [`RunSummary`] - The result of a run
//!
//! This package is not meant for use in production, serving only as a development tool.
//!
//! # Fixed iteration count
//!
//! ```
//! use std::convert::Infallible;
//!
//! use new_zealand::nz;
//! use solo_bench::run_n;
//!
//! let summary = run_n(
//!     |state| {
//!         for i in 0..state.iterations() {
//!             std::hint::black_box(i.count_ones());
//!         }
//!         Ok::<(), Infallible>(())
//!     },
//!     nz!(10_000),
//! )
//! .unwrap();
//!
//! assert_eq!(summary.iterations().get(), 10_000);
//! println!("{:.2} ns/op", summary.nanos_per_op());
//! ```
//!
//! # Target duration
//!
//! In duration-target mode the function is invoked repeatedly. Each invocation starts from a
//! clean slate; the iteration count of the next one is extrapolated from the previous
//! measurement (plus 20% headroom, at most 100x growth per step) until one invocation takes at
//! least the target duration or the iteration ceiling (10^9 by default) is reached. Only the
//! final invocation is reported.
//!
//! ```
//! use std::alloc::Layout;
//! use std::time::Duration;
//!
//! use solo_bench::{AllocError, Allocate, run_ns};
//!
//! let summary = run_ns(
//!     |state| {
//!         let allocator = state.allocator();
//!
//!         for _ in 0..state.iterations() {
//!             let block = allocator.allocate(Layout::new::<[u8; 16]>())?;
//!             // SAFETY: The block was allocated by this allocator.
//!             unsafe { allocator.free(block) };
//!         }
//!         Ok::<(), AllocError>(())
//!     },
//!     Duration::from_millis(10),
//! )
//! .unwrap();
//!
//! assert_eq!(summary.allocs_per_op(), 1.0);
//! assert_eq!(summary.live_bytes(), 0);
//! ```
//!
//! # Excluding work from the measurement
//!
//! Call [`RunState::reset_timer()`] after setup, and bracket interior work that should not be
//! measured with [`RunState::stop_timer()`] and [`RunState::start_timer()`]. Stopping the timer
//! only pauses the clock: allocations made through [`RunState::allocator()`] are always counted,
//! and only [`RunState::reset_timer()`] discards them.
//!
//! # Errors
//!
//! The benchmark function may fail with any error type. The first failure aborts the run and is
//! returned as [`RunError::Benchmark`], unchanged. No partial summary is produced.

mod allocate;
mod clock;
mod config;
mod error;
mod pal;
mod runner;
mod state;
mod summary;
mod tracker;

pub use allocate::*;
pub use clock::*;
pub use config::*;
pub use error::*;
pub use runner::*;
pub use state::*;
pub use summary::*;
pub use tracker::*;
