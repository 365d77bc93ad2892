//! The storage strategies of the array.
//!
//! A storage owns a single block of `capacity` slots, and nothing else: it
//! does not track which slots are live, and it never implements `Drop`. The
//! array destroys every live element and releases the block explicitly.
//!
//! Two strategies are provided:
//!
//! -   `InlineStorage`: one contiguous block of element-sized slots.
//! -   `BoxedStorage`: one contiguous block of pointer-sized slots, each live
//!     slot pointing at an individually allocated element.

use super::allocator::{array_layout, Allocator, Layout};
use super::failure::{Failure, Result};
use super::root::{marker, mem, ptr};

/// The contract of a storage strategy.
///
/// A storage is a block of `capacity` slots. A slot is either live, holding
/// one fully constructed element, or uninitialized. Growth never
/// default-constructs slots: a slot only becomes live through `construct_at`
/// or `migrate_to`.
///
/// #   Safety
///
/// Implementations must:
///
/// -   Never create or destroy elements besides those explicitly requested.
/// -   Never implement `Drop`: the caller destroys live elements and invokes
///     `deallocate` explicitly, and may overwrite a deallocated storage.
/// -   Keep the block exclusively owned: no aliasing between two storages.
pub unsafe trait Storage<T> {
    /// Creates a storage with no block, capacity 0.
    fn empty() -> Self;

    /// Allocates a block of `capacity` uninitialized slots.
    ///
    /// Never partially succeeds: on error, no memory is retained.
    ///
    /// #   Errors
    ///
    /// -   `BytesOverflow` if the block size cannot be computed.
    /// -   `OutOfMemory` if the allocator cannot satisfy the request.
    fn allocate<A: Allocator>(capacity: usize, allocator: &A) -> Result<Self>
    where
        Self: Sized;

    /// Returns the number of slots of the block.
    fn capacity(&self) -> usize;

    /// Releases the block, resetting the storage to the empty state.
    ///
    /// #   Safety
    ///
    /// -   Assumes that no slot is live.
    /// -   Assumes that `allocator` is the allocator the block was obtained
    ///     from.
    unsafe fn deallocate<A: Allocator>(&mut self, allocator: &A);

    /// Constructs one element in an uninitialized slot.
    ///
    /// On error the slot remains uninitialized and `value` is dropped; no
    /// partial object, no leak.
    ///
    /// #   Errors
    ///
    /// -   `OutOfMemory` if a per-element block is needed and cannot be
    ///     obtained.
    ///
    /// #   Safety
    ///
    /// -   Assumes that `slot < capacity`.
    /// -   Assumes that the slot is uninitialized.
    unsafe fn construct_at<A: Allocator>(&mut self, slot: usize, value: T, allocator: &A)
        -> Result<()>;

    /// Destroys the element in a live slot, leaving it uninitialized.
    ///
    /// #   Safety
    ///
    /// -   Assumes that `slot < capacity`.
    /// -   Assumes that the slot is live.
    unsafe fn destroy_at<A: Allocator>(&mut self, slot: usize, allocator: &A);

    /// Moves the element out of a live slot, leaving it uninitialized.
    ///
    /// #   Safety
    ///
    /// -   Assumes that `slot < capacity`.
    /// -   Assumes that the slot is live.
    unsafe fn take_at<A: Allocator>(&mut self, slot: usize, allocator: &A) -> T;

    /// Moves a live element from one slot to another of the same block.
    ///
    /// Afterwards `from` is uninitialized and `to` is live. Infallible: a
    /// relocation is a bitwise move.
    ///
    /// #   Safety
    ///
    /// -   Assumes that `from != to`, both `< capacity`.
    /// -   Assumes that `from` is live and `to` is uninitialized.
    unsafe fn relocate(&mut self, from: usize, to: usize);

    /// Moves a live element into an uninitialized slot of another storage.
    ///
    /// Afterwards `from` is uninitialized and `to` is live. Infallible.
    ///
    /// #   Safety
    ///
    /// -   Assumes that `from < self.capacity()` and `to < other.capacity()`.
    /// -   Assumes that `from` is live and `to` is uninitialized.
    unsafe fn migrate_to(&mut self, other: &mut Self, from: usize, to: usize);

    /// Returns a reference to the element in a live slot.
    ///
    /// #   Safety
    ///
    /// -   Assumes that `slot < capacity` and the slot is live.
    unsafe fn get(&self, slot: usize) -> &T;

    /// Returns a mutable reference to the element in a live slot.
    ///
    /// #   Safety
    ///
    /// -   Assumes that `slot < capacity` and the slot is live.
    unsafe fn get_mut(&mut self, slot: usize) -> &mut T;
}

/// InlineStorage
///
/// The default strategy: elements are stored by value, contiguously.
pub struct InlineStorage<T> {
    //  Null if and only if the capacity is 0; dangling for zero-sized T.
    ptr: *mut T,
    capacity: usize,
    _marker: marker::PhantomData<T>,
}

//  Safety:
//  -   The storage exclusively owns its elements.
unsafe impl<T: Send> Send for InlineStorage<T> {}
unsafe impl<T: Sync> Sync for InlineStorage<T> {}

impl<T> InlineStorage<T> {
    //  Returns the layout of the block.
    //
    //  #   Safety
    //
    //  -   Assumes that the capacity is non-zero, and that the same layout
    //      was computed successfully when allocating.
    unsafe fn layout(&self) -> Layout {
        Layout::from_size_align_unchecked(
            mem::size_of::<T>() * self.capacity,
            mem::align_of::<T>(),
        )
    }

    //  Returns a pointer to the slot.
    fn slot(&self, slot: usize) -> *mut T {
        debug_assert!(slot < self.capacity);

        //  Safety:
        //  -   slot is within the block.
        unsafe { self.ptr.add(slot) }
    }
}

unsafe impl<T> Storage<T> for InlineStorage<T> {
    fn empty() -> Self {
        Self {
            ptr: ptr::null_mut(),
            capacity: 0,
            _marker: marker::PhantomData,
        }
    }

    fn allocate<A: Allocator>(capacity: usize, allocator: &A) -> Result<Self> {
        if capacity == 0 {
            return Ok(Self::empty());
        }

        let layout = array_layout::<T>(capacity)?;

        let ptr = if layout.size() == 0 {
            //  Zero-sized elements: no allocation, a dangling aligned
            //  pointer suffices.
            ptr::NonNull::<T>::dangling().as_ptr()
        } else {
            //  Safety:
            //  -   The layout size is non-zero.
            let ptr = unsafe { allocator.allocate(layout) } as *mut T;

            if ptr.is_null() {
                return Err(Failure::OutOfMemory);
            }

            ptr
        };

        Ok(Self {
            ptr,
            capacity,
            _marker: marker::PhantomData,
        })
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    unsafe fn deallocate<A: Allocator>(&mut self, allocator: &A) {
        if self.capacity > 0 && mem::size_of::<T>() > 0 {
            //  Safety:
            //  -   The block was allocated with this layout.
            //  -   No slot is live, per this function's contract.
            allocator.deallocate(self.ptr as *mut u8, self.layout());
        }

        self.ptr = ptr::null_mut();
        self.capacity = 0;
    }

    unsafe fn construct_at<A: Allocator>(&mut self, slot: usize, value: T, _allocator: &A)
        -> Result<()>
    {
        //  Safety:
        //  -   The slot is uninitialized, per this function's contract.
        ptr::write(self.slot(slot), value);

        Ok(())
    }

    unsafe fn destroy_at<A: Allocator>(&mut self, slot: usize, _allocator: &A) {
        //  Safety:
        //  -   The slot is live, per this function's contract.
        ptr::drop_in_place(self.slot(slot));
    }

    unsafe fn take_at<A: Allocator>(&mut self, slot: usize, _allocator: &A) -> T {
        //  Safety:
        //  -   The slot is live, per this function's contract, and will be
        //      treated as uninitialized from here on.
        ptr::read(self.slot(slot))
    }

    unsafe fn relocate(&mut self, from: usize, to: usize) {
        debug_assert!(from != to);

        //  Safety:
        //  -   The slots are distinct, per this function's contract.
        //  -   `from` is live, and `to` is treated as live from here on.
        ptr::copy_nonoverlapping(self.slot(from), self.slot(to), 1);
    }

    unsafe fn migrate_to(&mut self, other: &mut Self, from: usize, to: usize) {
        //  Safety:
        //  -   The blocks are distinct, the slots cannot overlap.
        ptr::copy_nonoverlapping(self.slot(from), other.slot(to), 1);
    }

    unsafe fn get(&self, slot: usize) -> &T {
        //  Safety:
        //  -   The slot is live, per this function's contract.
        &*self.slot(slot)
    }

    unsafe fn get_mut(&mut self, slot: usize) -> &mut T {
        //  Safety:
        //  -   The slot is live, per this function's contract.
        &mut *self.slot(slot)
    }
}

/// BoxedStorage
///
/// The pointer-per-slot strategy: the block holds pointers, each live slot
/// pointing at an individually allocated element. Relocation and migration
/// move pointers, never elements.
pub struct BoxedStorage<T> {
    //  Null if and only if the capacity is 0.
    slots: *mut *mut T,
    capacity: usize,
    _marker: marker::PhantomData<T>,
}

//  Safety:
//  -   The storage exclusively owns its elements.
unsafe impl<T: Send> Send for BoxedStorage<T> {}
unsafe impl<T: Sync> Sync for BoxedStorage<T> {}

impl<T> BoxedStorage<T> {
    //  Returns the layout of the block of pointers.
    //
    //  #   Safety
    //
    //  -   Assumes that the capacity is non-zero, and that the same layout
    //      was computed successfully when allocating.
    unsafe fn layout(&self) -> Layout {
        Layout::from_size_align_unchecked(
            mem::size_of::<*mut T>() * self.capacity,
            mem::align_of::<*mut T>(),
        )
    }

    //  Returns a pointer to the slot.
    fn slot(&self, slot: usize) -> *mut *mut T {
        debug_assert!(slot < self.capacity);

        //  Safety:
        //  -   slot is within the block.
        unsafe { self.slots.add(slot) }
    }

    //  Returns the pointer held by a live slot.
    //
    //  #   Safety
    //
    //  -   Assumes that `slot < capacity` and the slot is live.
    unsafe fn element(&self, slot: usize) -> *mut T {
        *self.slot(slot)
    }

    //  Releases the block of one element.
    //
    //  #   Safety
    //
    //  -   Assumes that `element` was allocated by `allocator`, and holds no
    //      live element.
    unsafe fn release_element<A: Allocator>(element: *mut T, allocator: &A) {
        let layout = Layout::new::<T>();

        if layout.size() > 0 {
            allocator.deallocate(element as *mut u8, layout);
        }
    }
}

unsafe impl<T> Storage<T> for BoxedStorage<T> {
    fn empty() -> Self {
        Self {
            slots: ptr::null_mut(),
            capacity: 0,
            _marker: marker::PhantomData,
        }
    }

    fn allocate<A: Allocator>(capacity: usize, allocator: &A) -> Result<Self> {
        if capacity == 0 {
            return Ok(Self::empty());
        }

        let layout = array_layout::<*mut T>(capacity)?;

        //  Safety:
        //  -   The layout size is non-zero: pointers are not zero-sized.
        let slots = unsafe { allocator.allocate(layout) } as *mut *mut T;

        if slots.is_null() {
            return Err(Failure::OutOfMemory);
        }

        Ok(Self {
            slots,
            capacity,
            _marker: marker::PhantomData,
        })
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    unsafe fn deallocate<A: Allocator>(&mut self, allocator: &A) {
        if self.capacity > 0 {
            //  Safety:
            //  -   The block was allocated with this layout.
            //  -   No slot is live, per this function's contract.
            allocator.deallocate(self.slots as *mut u8, self.layout());
        }

        self.slots = ptr::null_mut();
        self.capacity = 0;
    }

    unsafe fn construct_at<A: Allocator>(&mut self, slot: usize, value: T, allocator: &A)
        -> Result<()>
    {
        let layout = Layout::new::<T>();

        let element = if layout.size() == 0 {
            ptr::NonNull::<T>::dangling().as_ptr()
        } else {
            //  Safety:
            //  -   The layout size is non-zero.
            let element = allocator.allocate(layout) as *mut T;

            if element.is_null() {
                //  The slot remains uninitialized; `value` is dropped.
                return Err(Failure::OutOfMemory);
            }

            element
        };

        //  Safety:
        //  -   `element` is suitably sized and aligned for T.
        ptr::write(element, value);

        //  Safety:
        //  -   The slot is within the block, and treated as live from here
        //      on.
        ptr::write(self.slot(slot), element);

        Ok(())
    }

    unsafe fn destroy_at<A: Allocator>(&mut self, slot: usize, allocator: &A) {
        let element = self.element(slot);

        //  Safety:
        //  -   The slot is live, hence the element is live.
        ptr::drop_in_place(element);

        //  Safety:
        //  -   The element block was allocated by `construct_at`.
        Self::release_element(element, allocator);
    }

    unsafe fn take_at<A: Allocator>(&mut self, slot: usize, allocator: &A) -> T {
        let element = self.element(slot);

        //  Safety:
        //  -   The slot is live, hence the element is live; the block is
        //      released without dropping it.
        let value = ptr::read(element);

        Self::release_element(element, allocator);

        value
    }

    unsafe fn relocate(&mut self, from: usize, to: usize) {
        debug_assert!(from != to);

        //  Moves the pointer; the element itself does not move.
        ptr::write(self.slot(to), self.element(from));
    }

    unsafe fn migrate_to(&mut self, other: &mut Self, from: usize, to: usize) {
        //  Moves the pointer; the element itself does not move.
        ptr::write(other.slot(to), self.element(from));
    }

    unsafe fn get(&self, slot: usize) -> &T {
        //  Safety:
        //  -   The slot is live, hence the element is live.
        &*self.element(slot)
    }

    unsafe fn get_mut(&mut self, slot: usize) -> &mut T {
        //  Safety:
        //  -   The slot is live, hence the element is live.
        &mut *self.element(slot)
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    use crate::utils::tester::{SpyCount, SpyElement, TestAllocator};

    fn exercise<'a, S: Storage<SpyElement<'a>>>(count: &'a SpyCount) {
        let allocator = TestAllocator::unlimited();

        let mut storage = S::allocate(4, &allocator).unwrap();
        assert_eq!(4, storage.capacity());

        unsafe {
            storage.construct_at(0, SpyElement::new(count), &allocator).unwrap();
            storage.construct_at(1, SpyElement::new(count), &allocator).unwrap();
            assert_eq!(2, count.constructed());

            //  Shift the element of slot 1 into slot 0.
            storage.destroy_at(0, &allocator);
            storage.relocate(1, 0);
            assert_eq!(1, count.live());

            let mut other = S::allocate(8, &allocator).unwrap();
            storage.migrate_to(&mut other, 0, 0);

            let _value = other.take_at(0, &allocator);

            storage.deallocate(&allocator);
            other.deallocate(&allocator);
        }

        assert_eq!(0, storage.capacity());
        assert_eq!(count.constructed(), count.destroyed());
    }

    #[test]
    fn inline_round_trip() {
        let count = SpyCount::zero();
        exercise::<InlineStorage<_>>(&count);
    }

    #[test]
    fn boxed_round_trip() {
        let count = SpyCount::zero();
        exercise::<BoxedStorage<_>>(&count);
    }

    #[test]
    fn inline_allocation_failure() {
        let allocator = TestAllocator::new(0);

        let result = InlineStorage::<u32>::allocate(4, &allocator);

        assert_eq!(Failure::OutOfMemory, result.err().unwrap());
        assert!(allocator.allocations().is_empty());
    }

    #[test]
    fn boxed_construct_failure_drops_value() {
        //  One allocation for the block of pointers, none for the element.
        let allocator = TestAllocator::new(1);

        let mut storage = BoxedStorage::<String>::allocate(2, &allocator).unwrap();

        let result = unsafe {
            storage.construct_at(0, String::from("hello"), &allocator)
        };
        assert_eq!(Err(Failure::OutOfMemory), result);

        unsafe { storage.deallocate(&allocator) };
        assert!(allocator.allocations().is_empty());
    }

    #[test]
    fn inline_zero_sized_elements() {
        let allocator = TestAllocator::new(0);

        let mut storage = InlineStorage::<()>::allocate(16, &allocator).unwrap();
        assert_eq!(16, storage.capacity());

        unsafe {
            storage.construct_at(3, (), &allocator).unwrap();
            assert_eq!((), *storage.get(3));

            storage.destroy_at(3, &allocator);
            storage.deallocate(&allocator);
        }

        //  No allocation was ever performed.
        assert!(allocator.allocations().is_empty());
    }
}
