//! Allocator.
//!
//! The `Allocator` trait allows a user to customize allocation on a per
//! instance basis, without depending on the unstable std allocator APIs.
//!
//! Storage strategies receive the allocator by reference on each call; they
//! own the blocks, never the allocator.

use super::failure::{Failure, Result};
use super::root::alloc;

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
    /// -   Assumes that `layout` matches the layout with which `ptr` was
    ///     allocated.
    unsafe fn deallocate(&self, ptr: *mut u8, layout: Layout);
}

impl<A: Allocator + ?Sized> Allocator for &A {
    unsafe fn allocate(&self, layout: Layout) -> *mut u8 {
        //  Safety:
        //  -   Forwarding.
        (**self).allocate(layout)
    }

    unsafe fn deallocate(&self, ptr: *mut u8, layout: Layout) {
        //  Safety:
        //  -   Forwarding.
        (**self).deallocate(ptr, layout)
    }
}

/// Computes the layout of an array of `n` elements of type `T`.
///
/// #   Errors
///
/// Returns `Failure::BytesOverflow` if the size in bytes overflows.
pub fn array_layout<T>(n: usize) -> Result<Layout> {
    Layout::array::<T>(n).map_err(|_| Failure::BytesOverflow)
}

/// DefaultAllocator
///
/// A default implementation of the `Allocator` trait, relying on the global
/// allocator.
#[cfg(feature = "with-std")]
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct DefaultAllocator;

#[cfg(feature = "with-std")]
impl Allocator for DefaultAllocator {
    unsafe fn allocate(&self, layout: Layout) -> *mut u8 {
        alloc::alloc(layout)
    }

    unsafe fn deallocate(&self, ptr: *mut u8, layout: Layout) {
        alloc::dealloc(ptr, layout)
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn array_layout_simple() {
        let layout = array_layout::<u32>(4).unwrap();

        assert_eq!(16, layout.size());
        assert_eq!(4, layout.align());
    }

    #[test]
    fn array_layout_overflow() {
        assert_eq!(
            Err(Failure::BytesOverflow),
            array_layout::<u64>(usize::MAX / 2)
        );
    }
}
