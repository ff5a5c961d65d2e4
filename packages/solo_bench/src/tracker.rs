//! Allocation tracking decorator.

use std::alloc::Layout;
use std::cell::Cell;
use std::cmp::Ordering;
use std::fmt;

use crate::{AllocError, Allocate, Block};

/// Counters updated by a [`TrackingAllocator`].
///
/// Single-threaded by construction: the counters live in `Cell`s and are only ever touched
/// from the thread that owns the run.
#[derive(Debug)]
struct Counters {
    count: Cell<u64>,
    bytes: Cell<u64>,
    live_bytes: Cell<i64>,
}

impl Counters {
    const fn new() -> Self {
        Self {
            count: Cell::new(0),
            bytes: Cell::new(0),
            live_bytes: Cell::new(0),
        }
    }

    fn record_growth(&self, size: usize) {
        let size_u64: u64 = size.try_into().expect("usize always fits into u64");
        let size_i64: i64 = size
            .try_into()
            .expect("allocation sizes never exceed isize::MAX");

        self.count.set(self.count.get().saturating_add(1));
        self.bytes.set(self.bytes.get().saturating_add(size_u64));
        self.live_bytes
            .set(self.live_bytes.get().saturating_add(size_i64));
    }

    fn record_release(&self, size: usize) {
        let size_i64: i64 = size
            .try_into()
            .expect("allocation sizes never exceed isize::MAX");

        self.live_bytes
            .set(self.live_bytes.get().saturating_sub(size_i64));
    }

    fn clear(&self) {
        self.count.set(0);
        self.bytes.set(0);
        self.live_bytes.set(0);
    }
}

/// An allocator that forwards every call to another allocator while counting what passes
/// through it.
///
/// Three counters are kept:
///
/// * the number of allocations (a growing resize counts as one),
/// * the total bytes allocated (a growing resize counts its growth),
/// * the net live bytes: allocated minus freed, where a shrinking resize counts as freeing.
///
/// Counters only change when the delegate reports success.
///
/// The tracker borrows its delegate and cannot outlive it.
///
/// # Examples
///
/// ```
/// use std::alloc::Layout;
///
/// use solo_bench::{Allocate, SystemAllocator, TrackingAllocator};
///
/// let tracker = TrackingAllocator::new(&SystemAllocator);
///
/// let block = tracker.allocate(Layout::new::<[u64; 4]>()).unwrap();
/// assert_eq!(tracker.alloc_count(), 1);
/// assert_eq!(tracker.live_bytes(), 32);
///
/// // SAFETY: The block was allocated by this tracker.
/// unsafe { tracker.free(block) };
/// assert_eq!(tracker.alloc_bytes(), 32);
/// assert_eq!(tracker.live_bytes(), 0);
/// ```
pub struct TrackingAllocator<'a> {
    inner: &'a dyn Allocate,
    counters: Counters,
}

impl fmt::Debug for TrackingAllocator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackingAllocator")
            .field("inner", &"<allocator>")
            .field("counters", &self.counters)
            .finish()
    }
}

impl<'a> TrackingAllocator<'a> {
    /// Creates a tracker that forwards to `inner`, with all counters at zero.
    #[must_use]
    pub fn new(inner: &'a dyn Allocate) -> Self {
        Self {
            inner,
            counters: Counters::new(),
        }
    }

    /// Number of allocations, including resizes that grew a block.
    #[must_use]
    pub fn alloc_count(&self) -> u64 {
        self.counters.count.get()
    }

    /// Total bytes allocated, including the growth of resized blocks.
    #[must_use]
    pub fn alloc_bytes(&self) -> u64 {
        self.counters.bytes.get()
    }

    /// Bytes allocated but not yet freed.
    ///
    /// Negative if more memory was freed than allocated while tracking, which happens when
    /// memory allocated before the counters were last reset is freed afterwards.
    #[must_use]
    pub fn live_bytes(&self) -> i64 {
        self.counters.live_bytes.get()
    }

    pub(crate) fn reset_counters(&self) {
        self.counters.clear();
    }
}

impl Allocate for TrackingAllocator<'_> {
    fn allocate(&self, layout: Layout) -> Result<Block, AllocError> {
        let block = self.inner.allocate(layout)?;
        self.counters.record_growth(block.size());

        Ok(block)
    }

    unsafe fn resize(&self, block: &mut Block, new_size: usize) -> Result<(), AllocError> {
        let old_size = block.size();

        // SAFETY: Forwarding the caller's guarantee. Every block this tracker hands out came
        // from `inner`.
        unsafe { self.inner.resize(block, new_size) }?;

        let new_size = block.size();
        let change = new_size.abs_diff(old_size);

        match new_size.cmp(&old_size) {
            Ordering::Greater => self.counters.record_growth(change),
            Ordering::Less => self.counters.record_release(change),
            Ordering::Equal => {}
        }

        Ok(())
    }

    unsafe fn free(&self, block: Block) {
        let size = block.size();

        // SAFETY: Forwarding the caller's guarantee. Every block this tracker hands out came
        // from `inner`.
        unsafe { self.inner.free(block) };

        self.counters.record_release(size);
    }
}
