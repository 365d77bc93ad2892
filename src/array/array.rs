//! The DynArray.

use super::allocator::Allocator;
use super::failure::{Failure, Result};
use super::policy::GrowthPolicy;
use super::root::{fmt, iter, marker, mem, ops};
use super::storage::Storage;

#[cfg(feature = "with-std")]
use super::allocator::DefaultAllocator;

#[cfg(feature = "with-std")]
use super::storage::InlineStorage;

//
//  Public Interface
//

/// `DynArray`
#[cfg(not(feature = "with-std"))]
pub struct DynArray<T, S: Storage<T>, A: Allocator> {
    length: usize,
    storage: S,
    policy: GrowthPolicy,
    allocator: A,
    _marker: marker::PhantomData<T>,
}

/// `DynArray`
#[cfg(feature = "with-std")]
pub struct DynArray<T, S: Storage<T> = InlineStorage<T>, A: Allocator = DefaultAllocator> {
    //  The number of live elements; slots `[0, length)` of the storage are
    //  live, slots `[length, capacity)` are uninitialized.
    length: usize,
    //  The storage, exclusively owned; capacity 0 if and only if no block.
    storage: S,
    //  Decides target capacities on growth and, when enabled, on shrink.
    policy: GrowthPolicy,
    allocator: A,
    _marker: marker::PhantomData<T>,
}

impl<T, S: Storage<T>, A: Allocator + Default> DynArray<T, S, A> {
    /// Creates an empty array.
    ///
    /// No memory is allocated.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use dynarr::array::DynArray;
    /// let array: DynArray<i32> = DynArray::new();
    ///
    /// assert_eq!(0, array.len());
    /// assert_eq!(0, array.capacity());
    /// ```
    pub fn new() -> Self {
        Self::with_policy_and_allocator(GrowthPolicy::default(), A::default())
    }

    /// Creates an empty array with a custom growth/shrink policy.
    ///
    /// No memory is allocated.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use dynarr::array::DynArray;
    /// #   use dynarr::policy::GrowthPolicy;
    /// let array: DynArray<i32> = DynArray::with_policy(GrowthPolicy::with_shrink(4));
    ///
    /// assert_eq!(0, array.len());
    /// ```
    pub fn with_policy(policy: GrowthPolicy) -> Self {
        Self::with_policy_and_allocator(policy, A::default())
    }

    /// Creates an empty array with `capacity` slots, eagerly allocated.
    ///
    /// #   Panics
    ///
    /// Panics if the block cannot be allocated.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use dynarr::array::DynArray;
    /// let array: DynArray<i32> = DynArray::with_capacity(8);
    ///
    /// assert_eq!(0, array.len());
    /// assert_eq!(8, array.capacity());
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        Self::try_with_capacity(capacity).unwrap_or_else(|failure| panic_from_failure(failure))
    }

    /// Creates an empty array with `capacity` slots, eagerly allocated.
    ///
    /// #   Errors
    ///
    /// Returns an error if the block cannot be allocated, in which case no
    /// memory is retained.
    pub fn try_with_capacity(capacity: usize) -> Result<Self> {
        let mut array = Self::new();
        array.reallocate(capacity)?;

        Ok(array)
    }
}

impl<T, S: Storage<T>, A: Allocator> DynArray<T, S, A> {
    /// Creates an empty array with a custom allocator.
    ///
    /// No memory is allocated.
    pub fn with_allocator(allocator: A) -> Self {
        Self::with_policy_and_allocator(GrowthPolicy::default(), allocator)
    }

    /// Creates an empty array with a custom policy and allocator.
    ///
    /// No memory is allocated.
    pub fn with_policy_and_allocator(policy: GrowthPolicy, allocator: A) -> Self {
        Self {
            length: 0,
            storage: S::empty(),
            policy,
            allocator,
            _marker: marker::PhantomData,
        }
    }

    /// Returns the number of live elements.
    pub fn len(&self) -> usize {
        self.length
    }

    /// Returns the number of allocated slots.
    pub fn capacity(&self) -> usize {
        self.storage.capacity()
    }

    /// Returns whether the array contains any element, or not.
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Returns the growth/shrink policy.
    pub fn policy(&self) -> GrowthPolicy {
        self.policy
    }

    /// Returns a reference to the element at `index`, if any.
    ///
    /// The reference is tied to the current block: any operation which may
    /// reallocate or shift the storage takes `&mut self`, and therefore
    /// cannot be called while the reference lives.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use dynarr::array::DynArray;
    /// let mut array: DynArray<_> = DynArray::new();
    /// array.push(1);
    ///
    /// assert_eq!(Some(&1), array.get(0));
    /// assert_eq!(None, array.get(1));
    /// ```
    pub fn get(&self, index: usize) -> Option<&T> {
        if index < self.length {
            //  Safety:
            //  -   index < length: the slot is live.
            Some(unsafe { self.storage.get(index) })
        } else {
            None
        }
    }

    /// Returns a mutable reference to the element at `index`, if any.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        if index < self.length {
            //  Safety:
            //  -   index < length: the slot is live.
            Some(unsafe { self.storage.get_mut(index) })
        } else {
            None
        }
    }

    /// Appends an element to the back.
    ///
    /// #   Panics
    ///
    /// Panics if the element cannot be pushed.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use dynarr::array::DynArray;
    /// let mut array: DynArray<_> = DynArray::new();
    /// array.push(1);
    /// array.push(2);
    ///
    /// assert_eq!(2, array.len());
    /// ```
    pub fn push(&mut self, value: T) {
        self.try_push(value).unwrap_or_else(|failure| panic_from_failure(failure))
    }

    /// Appends an element to the back, in amortized O(1).
    ///
    /// If the array is full, first grows to the capacity decided by the
    /// policy: the new element is constructed into the new block, then the
    /// live elements are migrated to it by bitwise moves, and only then is
    /// the old block released.
    ///
    /// #   Errors
    ///
    /// If the new block or the element cannot be allocated, the array is left
    /// exactly as it was before the call.
    pub fn try_push(&mut self, value: T) -> Result<()> {
        if self.length == self.storage.capacity() {
            let target = self.policy.grow_target(self.storage.capacity())?;
            return self.grow_and_push(target, value);
        }

        //  Safety:
        //  -   length < capacity: the slot is uninitialized.
        unsafe { self.storage.construct_at(self.length, value, &self.allocator)? };

        self.length += 1;

        Ok(())
    }

    /// Removes and returns the element at `index`.
    ///
    /// #   Panics
    ///
    /// Panics if `index` is out of range.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use dynarr::array::DynArray;
    /// let mut array: DynArray<_> = DynArray::new();
    /// array.extend([1, 2, 3].iter().copied());
    ///
    /// assert_eq!(2, array.remove(1));
    /// assert_eq!(Some(&3), array.get(1));
    /// ```
    pub fn remove(&mut self, index: usize) -> T {
        self.try_remove(index).unwrap_or_else(|failure| panic_from_failure(failure))
    }

    /// Removes and returns the element at `index`, in O(len - index).
    ///
    /// Each subsequent element is shifted one slot to the left; the relative
    /// order of the remaining elements is preserved. May then shrink the
    /// block, if the policy says so.
    ///
    /// #   Errors
    ///
    /// Returns `Failure::OutOfRange` if `index >= len`, before any memory
    /// access; the array is left unchanged.
    pub fn try_remove(&mut self, index: usize) -> Result<T> {
        if index >= self.length {
            return Err(Failure::OutOfRange);
        }

        //  Safety:
        //  -   index < length: the slot is live.
        let value = unsafe { self.storage.take_at(index, &self.allocator) };

        self.length -= 1;

        for slot in index..self.length {
            //  Safety:
            //  -   slot + 1 is live, slot was vacated.
            unsafe { self.storage.relocate(slot + 1, slot) };
        }

        if let Some(target) = self.policy.shrink_target(self.length, self.storage.capacity()) {
            //  Shrinking is best effort: on allocation failure the current
            //  block is kept, and remains valid.
            let _ = self.reallocate(target);
        }

        Ok(value)
    }

    /// Destroys all live elements; the capacity is unchanged.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use dynarr::array::DynArray;
    /// let mut array: DynArray<_> = DynArray::new();
    /// array.extend([1, 2, 3].iter().copied());
    ///
    /// array.clear();
    ///
    /// assert_eq!(0, array.len());
    /// assert_eq!(4, array.capacity());
    /// ```
    pub fn clear(&mut self) {
        //  The length is cleared first: a panicking drop must not lead to a
        //  second destroy. The elements past the panic leak, which is safe.
        let length = mem::replace(&mut self.length, 0);

        for slot in 0..length {
            //  Safety:
            //  -   slot < length: the slot is live.
            unsafe { self.storage.destroy_at(slot, &self.allocator) };
        }
    }

    /// Reduces the capacity to exactly the length, releasing the block
    /// entirely when empty.
    ///
    /// #   Panics
    ///
    /// Panics if the reduced block cannot be allocated.
    pub fn shrink_to_fit(&mut self) {
        self.try_shrink_to_fit().unwrap_or_else(|failure| panic_from_failure(failure))
    }

    /// Reduces the capacity to exactly the length, releasing the block
    /// entirely when empty.
    ///
    /// #   Errors
    ///
    /// If the reduced block cannot be allocated, the array is left exactly as
    /// it was before the call.
    pub fn try_shrink_to_fit(&mut self) -> Result<()> {
        if self.length < self.storage.capacity() {
            self.reallocate(self.length)?;
        }

        Ok(())
    }

    /// Appends every element of `elements` to the back.
    ///
    /// #   Panics
    ///
    /// Panics if an element cannot be pushed.
    pub fn extend<I: IntoIterator<Item = T>>(&mut self, elements: I) {
        self.try_extend(elements).unwrap_or_else(|failure| panic_from_failure(failure))
    }

    /// Appends every element of `elements` to the back.
    ///
    /// #   Errors
    ///
    /// If an element cannot be pushed, the elements already pushed are
    /// retained, and the remainder of `elements` is dropped.
    pub fn try_extend<I: IntoIterator<Item = T>>(&mut self, elements: I) -> Result<()> {
        for value in elements {
            self.try_push(value)?;
        }

        Ok(())
    }

    /// Exchanges the contents of two arrays.
    ///
    /// O(1), never fails: only the `(storage, length, policy, allocator)`
    /// quadruplet is exchanged, no element is touched.
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }

    /// Returns an iterator over the live elements, in order.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use dynarr::array::DynArray;
    /// let mut array: DynArray<_> = DynArray::new();
    /// array.extend([1, 2, 3].iter().copied());
    ///
    /// let doubled: Vec<_> = array.iter().map(|x| x * 2).collect();
    ///
    /// assert_eq!(vec![2, 4, 6], doubled);
    /// ```
    pub fn iter(&self) -> Iter<'_, T, S, A> {
        Iter { array: self, index: 0 }
    }

    /// Returns a deep copy of the array.
    ///
    /// #   Errors
    ///
    /// If the block or an element cannot be allocated, the partial copy is
    /// destroyed and its block released; the array itself is untouched.
    pub fn try_clone(&self) -> Result<Self>
    where
        T: Clone,
        A: Clone,
    {
        let mut clone = Self::with_policy_and_allocator(self.policy, self.allocator.clone());
        clone.reallocate(self.storage.capacity())?;

        for slot in 0..self.length {
            //  Safety:
            //  -   slot < length: the slot is live.
            let value = unsafe { self.storage.get(slot) }.clone();

            //  Safety:
            //  -   clone.length < capacity: the slot is uninitialized.
            //
            //  On error, `clone` is dropped, destroying the elements already
            //  copied and releasing the partial block.
            unsafe { clone.storage.construct_at(clone.length, value, &clone.allocator)? };

            clone.length += 1;
        }

        Ok(clone)
    }

    //  Grows to a freshly allocated block of `target` slots, constructing
    //  `value` into it before adopting it.
    //
    //  The old block is only released once both the new block and the new
    //  element exist; on failure the array is untouched, capacity included.
    fn grow_and_push(&mut self, target: usize, value: T) -> Result<()> {
        debug_assert!(target > self.length);

        let mut storage = S::allocate(target, &self.allocator)?;

        //  Safety:
        //  -   length < target: the slot is uninitialized.
        let constructed = unsafe { storage.construct_at(self.length, value, &self.allocator) };

        if let Err(failure) = constructed {
            //  Safety:
            //  -   No slot of the new block is live.
            unsafe { storage.deallocate(&self.allocator) };

            return Err(failure);
        }

        //  Safety:
        //  -   Each live slot is migrated exactly once, by bitwise move;
        //      no slot of the old block remains live afterwards.
        unsafe {
            for slot in 0..self.length {
                self.storage.migrate_to(&mut storage, slot, slot);
            }

            self.storage.deallocate(&self.allocator);
        }

        self.storage = storage;
        self.length += 1;

        Ok(())
    }

    //  Migrates the live elements to a freshly allocated block of `target`
    //  slots, releasing the old block.
    //
    //  If the new block cannot be allocated, the old block is untouched.
    fn reallocate(&mut self, target: usize) -> Result<()> {
        debug_assert!(target >= self.length);

        let mut storage = if target > 0 {
            S::allocate(target, &self.allocator)?
        } else {
            S::empty()
        };

        //  Safety:
        //  -   Each live slot is migrated exactly once, by bitwise move;
        //      no slot of the old block remains live afterwards.
        unsafe {
            for slot in 0..self.length {
                self.storage.migrate_to(&mut storage, slot, slot);
            }

            self.storage.deallocate(&self.allocator);
        }

        self.storage = storage;

        Ok(())
    }
}

impl<T, S: Storage<T>, A: Allocator> Drop for DynArray<T, S, A> {
    fn drop(&mut self) {
        self.clear();

        //  Safety:
        //  -   No live elements remain.
        unsafe { self.storage.deallocate(&self.allocator) };
    }
}

impl<T, S: Storage<T>, A: Allocator + Default> Default for DynArray<T, S, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone, S: Storage<T>, A: Allocator + Clone> Clone for DynArray<T, S, A> {
    fn clone(&self) -> Self {
        self.try_clone().unwrap_or_else(|failure| panic_from_failure(failure))
    }
}

impl<T: fmt::Debug, S: Storage<T>, A: Allocator> fmt::Debug for DynArray<T, S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq, S: Storage<T>, A: Allocator> PartialEq for DynArray<T, S, A> {
    fn eq(&self, other: &Self) -> bool {
        self.length == other.length && self.iter().eq(other.iter())
    }
}

impl<T: Eq, S: Storage<T>, A: Allocator> Eq for DynArray<T, S, A> {}

impl<T, S: Storage<T>, A: Allocator> ops::Index<usize> for DynArray<T, S, A> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        self.get(index).expect("Valid index")
    }
}

impl<T, S: Storage<T>, A: Allocator> ops::IndexMut<usize> for DynArray<T, S, A> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        self.get_mut(index).expect("Valid index")
    }
}

impl<T, S: Storage<T>, A: Allocator> iter::Extend<T> for DynArray<T, S, A> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, elements: I) {
        self.try_extend(elements).unwrap_or_else(|failure| panic_from_failure(failure))
    }
}

impl<T, S: Storage<T>, A: Allocator + Default> iter::FromIterator<T> for DynArray<T, S, A> {
    fn from_iter<I: IntoIterator<Item = T>>(elements: I) -> Self {
        let mut array = Self::new();
        array.extend(elements);
        array
    }
}

/// An iterator over the live elements of a `DynArray`, in order.
pub struct Iter<'a, T, S: Storage<T>, A: Allocator> {
    array: &'a DynArray<T, S, A>,
    index: usize,
}

impl<'a, T, S: Storage<T>, A: Allocator> iter::Iterator for Iter<'a, T, S, A> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let result = self.array.get(self.index);

        if result.is_some() {
            self.index += 1;
        }

        result
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.array.len() - self.index;
        (remaining, Some(remaining))
    }
}

impl<'a, T, S: Storage<T>, A: Allocator> iter::ExactSizeIterator for Iter<'a, T, S, A> {}

impl<'a, T, S: Storage<T>, A: Allocator> iter::IntoIterator for &'a DynArray<T, S, A> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T, S, A>;

    fn into_iter(self) -> Iter<'a, T, S, A> {
        self.iter()
    }
}

#[cold]
#[inline(never)]
fn panic_from_failure(failure: Failure) -> ! {
    panic!("{}", failure);
}
