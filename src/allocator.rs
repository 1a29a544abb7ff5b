//! Allocator.
//!
//! The `Allocator` trait allows a user to customize where the element storage of a `Queue` or `Vector` comes from,
//! on a per instance basis.
//!
//! Only the blocks of element slots, the segments, are obtained from the `Allocator`; the small bookkeeping structures
//! describing the chain of segments use the global allocator.

use std::alloc;

/// Layout, re-exported.
pub type Layout = alloc::Layout;

/// Allocator
pub trait Allocator {
    /// Allocates memory as per the size and alignment requirements.
    ///
    /// May return a null pointer if the allocation cannot be satisfied.
    ///
    /// #   Safety
    ///
    /// -   Assumes that the size of the Layout is non-zero.
    unsafe fn allocate(&self, layout: Layout) -> *mut u8;

    /// Deallocates memory.
    ///
    /// #   Safety
    ///
    /// -   Assumes that `ptr` was allocated by `self.allocate`.
    /// -   Assumes that `ptr` was not already deallocated.
    /// -   Assumes that `layout` matches the layout with which `ptr` was allocated.
    unsafe fn deallocate(&self, ptr: *mut u8, layout: Layout);
}

/// DefaultAllocator
///
/// A default implementation of the `Allocator` trait, relying on the global allocator.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct DefaultAllocator;

impl Allocator for DefaultAllocator {
    unsafe fn allocate(&self, layout: Layout) -> *mut u8 {
        //  Safety:
        //  -   Forwarding, the layout is non-zero as per pre-condition.
        unsafe { alloc::alloc(layout) }
    }

    unsafe fn deallocate(&self, ptr: *mut u8, layout: Layout) {
        //  Safety:
        //  -   Forwarding.
        unsafe { alloc::dealloc(ptr, layout) }
    }
}

impl<A: Allocator + ?Sized> Allocator for &A {
    unsafe fn allocate(&self, layout: Layout) -> *mut u8 {
        //  Safety:
        //  -   Forwarding.
        unsafe { (**self).allocate(layout) }
    }

    unsafe fn deallocate(&self, ptr: *mut u8, layout: Layout) {
        //  Safety:
        //  -   Forwarding.
        unsafe { (**self).deallocate(ptr, layout) }
    }
}
