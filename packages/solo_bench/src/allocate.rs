//! The allocation capability handed to benchmarked code.

use std::alloc::{self, Layout};
use std::ptr::{self, NonNull};

use crate::AllocError;

/// A block of memory obtained from an [`Allocate`] implementation.
///
/// The block remembers the layout it was allocated with, so that it can later be resized or
/// freed through the same allocator. A block that is dropped without being freed leaks its
/// memory, which is exactly what the live byte counter of a
/// [`TrackingAllocator`][crate::TrackingAllocator] will report.
#[derive(Debug, Eq, PartialEq)]
#[must_use = "dropping a block without freeing it leaks memory"]
pub struct Block {
    ptr: NonNull<u8>,
    layout: Layout,
}

impl Block {
    /// Describes an existing block of memory.
    ///
    /// Used by [`Allocate`] implementations to hand out the memory they allocate.
    pub fn from_raw_parts(ptr: NonNull<u8>, layout: Layout) -> Self {
        Self { ptr, layout }
    }

    /// A well-aligned placeholder for a zero-sized allocation. Owns no memory.
    fn dangling(layout: Layout) -> Self {
        let ptr = NonNull::new(ptr::without_provenance_mut::<u8>(layout.align()))
            .expect("alignment of a Layout is never zero");

        Self { ptr, layout }
    }

    /// The start of the block.
    #[must_use]
    pub fn as_ptr(&self) -> NonNull<u8> {
        self.ptr
    }

    /// The layout the block currently has.
    #[must_use]
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// The size of the block in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.layout.size()
    }
}

/// An allocator that benchmarked code can allocate from explicitly.
///
/// Every allocation the harness is expected to attribute to a benchmark must go through an
/// implementation of this trait, typically the [`TrackingAllocator`][crate::TrackingAllocator]
/// exposed by [`RunState::allocator()`][crate::RunState::allocator].
pub trait Allocate {
    /// Allocates a block of memory with the given layout.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError::Exhausted`] if the allocator cannot provide the memory.
    fn allocate(&self, layout: Layout) -> Result<Block, AllocError>;

    /// Resizes a block to `new_size` bytes, keeping its alignment.
    ///
    /// On success the block is updated in place and may have moved. On failure the block is
    /// left untouched and remains valid at its old size.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError::ResizeRefused`] if the block cannot be resized.
    ///
    /// # Safety
    ///
    /// The block must have been allocated by this allocator and not yet freed.
    unsafe fn resize(&self, block: &mut Block, new_size: usize) -> Result<(), AllocError>;

    /// Returns a block to the allocator.
    ///
    /// # Safety
    ///
    /// The block must have been allocated by this allocator and not yet freed.
    unsafe fn free(&self, block: Block);
}

/// Allocates from the Rust global allocator.
///
/// Zero-sized requests are served without touching the global allocator.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemAllocator;

impl Allocate for SystemAllocator {
    fn allocate(&self, layout: Layout) -> Result<Block, AllocError> {
        if layout.size() == 0 {
            return Ok(Block::dangling(layout));
        }

        // SAFETY: The layout has a nonzero size, checked above.
        let ptr = unsafe { alloc::alloc(layout) };

        NonNull::new(ptr)
            .map(|ptr| Block::from_raw_parts(ptr, layout))
            .ok_or(AllocError::Exhausted { layout })
    }

    unsafe fn resize(&self, block: &mut Block, new_size: usize) -> Result<(), AllocError> {
        let refused = AllocError::ResizeRefused {
            layout: block.layout,
            new_size,
        };

        let Ok(new_layout) = Layout::from_size_align(new_size, block.layout.align()) else {
            return Err(refused);
        };

        if block.size() == 0 {
            let Ok(fresh) = self.allocate(new_layout) else {
                return Err(refused);
            };

            *block = fresh;
            return Ok(());
        }

        if new_size == 0 {
            // SAFETY: The caller guarantees the block came from this allocator. It has a nonzero
            // size, so it was obtained from the global allocator with exactly this layout.
            unsafe { alloc::dealloc(block.ptr.as_ptr(), block.layout) };

            *block = Block::dangling(new_layout);
            return Ok(());
        }

        // SAFETY: The caller guarantees the block came from this allocator and both sizes are
        // nonzero. `new_layout` was validated above, so `new_size` rounded up to the alignment
        // does not overflow `isize`.
        let ptr = unsafe { alloc::realloc(block.ptr.as_ptr(), block.layout, new_size) };

        let ptr = NonNull::new(ptr).ok_or(refused)?;
        *block = Block::from_raw_parts(ptr, new_layout);

        Ok(())
    }

    unsafe fn free(&self, block: Block) {
        if block.size() == 0 {
            return;
        }

        // SAFETY: The caller guarantees the block came from this allocator. It has a nonzero
        // size, so it was obtained from the global allocator with exactly this layout.
        unsafe { alloc::dealloc(block.ptr.as_ptr(), block.layout) };
    }
}
