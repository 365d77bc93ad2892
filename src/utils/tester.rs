//! Internal testing utilities

use crate::root::{cell, ptr};

use crate::allocator::{Allocator, DefaultAllocator, Layout};

//  Allocation
//
//  Description of an allocation.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub struct Allocation {
    //  The size of the allocation, in bytes.
    pub size: usize,
    //  The alignment of the allocation, in bytes.
    pub alignment: usize,
    //  The pointer allocated.
    pub pointer: *mut u8,
}

impl Allocation {
    pub fn new(pointer: *mut u8, layout: Layout) -> Self {
        Allocation {
            size: layout.size(),
            alignment: layout.align(),
            pointer,
        }
    }

    pub fn layout(&self) -> Layout {
        Layout::from_size_align(self.size, self.alignment).unwrap()
    }
}

//  Test Allocator
//
//  An allocator specifically for testing:
//  -   Allows injecting allocation failures, via a budget.
//  -   Checks that allocations and deallocations match.
pub struct TestAllocator {
    //  The actual allocator.
    pub allocator: DefaultAllocator,
    //  The number of allocations allowed.
    pub allowed: cell::Cell<usize>,
    //  The allocations performed; to check deallocation requests.
    pub allocations: cell::RefCell<Vec<Allocation>>,
}

impl TestAllocator {
    //  Creates an allocator allowing `allowed` allocations.
    pub fn new(allowed: usize) -> Self {
        TestAllocator {
            allocator: DefaultAllocator,
            allowed: cell::Cell::new(allowed),
            allocations: cell::RefCell::new(vec![]),
        }
    }

    //  Creates an allocator with no failure injection.
    pub fn unlimited() -> Self {
        Self::new(usize::MAX)
    }

    pub fn allocations(&self) -> Vec<Allocation> {
        self.allocations.borrow().clone()
    }

    pub fn allocation_sizes(&self) -> Vec<usize> {
        self.allocations.borrow().iter().map(|&a| a.size).collect()
    }

    pub fn clear(&self) {
        for a in self.allocations.borrow().iter() {
            //  Safety:
            //  -   Were allocated, and not deallocated.
            unsafe { self.allocator.deallocate(a.pointer, a.layout()) };
        }

        self.allocations.borrow_mut().clear();
    }

    fn locate(&self, allocation: Allocation) -> Option<usize> {
        self.allocations.borrow().iter().position(|a| *a == allocation)
    }
}

impl Allocator for TestAllocator {
    unsafe fn allocate(&self, layout: Layout) -> *mut u8 {
        if self.allowed.get() == 0 {
            return ptr::null_mut();
        }

        self.allowed.set(self.allowed.get() - 1);

        let result = self.allocator.allocate(layout);
        assert!(!result.is_null());

        let allocation = Allocation::new(result, layout);
        self.allocations.borrow_mut().push(allocation);

        result
    }

    unsafe fn deallocate(&self, ptr: *mut u8, layout: Layout) {
        self.allocator.deallocate(ptr, layout);

        let allocation = Allocation::new(ptr, layout);

        if let Some(index) = self.locate(allocation) {
            self.allocations.borrow_mut().remove(index);
        } else {
            panic!(
                "Could not find {:?} in {:?}",
                allocation,
                &*self.allocations.borrow()
            );
        }
    }
}

impl Drop for TestAllocator {
    fn drop(&mut self) {
        self.clear()
    }
}

//  SpyCount
//
//  A tally of element constructions and destructions, to prove the absence of
//  leaks and double destructions.
pub struct SpyCount {
    constructed: cell::Cell<usize>,
    destroyed: cell::Cell<usize>,
}

impl SpyCount {
    pub fn zero() -> Self {
        SpyCount {
            constructed: cell::Cell::new(0),
            destroyed: cell::Cell::new(0),
        }
    }

    //  The total number of constructions, clones included.
    pub fn constructed(&self) -> usize {
        self.constructed.get()
    }

    //  The total number of destructions.
    pub fn destroyed(&self) -> usize {
        self.destroyed.get()
    }

    //  The number of instances currently alive.
    pub fn live(&self) -> usize {
        self.constructed.get() - self.destroyed.get()
    }

    fn record_construction(&self) {
        self.constructed.set(self.constructed.get() + 1);
    }

    fn record_destruction(&self) {
        self.destroyed.set(self.destroyed.get() + 1);
    }
}

//  Spy Element
//
//  An element tracking the number of instances, helpful to ensure proper
//  drop.
pub struct SpyElement<'a> {
    count: &'a SpyCount,
}

impl<'a> SpyElement<'a> {
    pub fn new(count: &'a SpyCount) -> Self {
        count.record_construction();
        SpyElement { count }
    }
}

impl<'a> Clone for SpyElement<'a> {
    fn clone(&self) -> Self {
        Self::new(self.count)
    }
}

impl<'a> Drop for SpyElement<'a> {
    fn drop(&mut self) {
        self.count.record_destruction();
    }
}

//  An element whose clone panics once the shared budget is exhausted.
//
//  Instances are tallied like SpyElement, so that a panicked operation can be
//  checked for construction/destruction balance.
pub struct PanickyClone<'a> {
    count: &'a SpyCount,
    budget: &'a cell::Cell<usize>,
}

impl<'a> PanickyClone<'a> {
    pub fn new(count: &'a SpyCount, budget: &'a cell::Cell<usize>) -> Self {
        count.record_construction();
        PanickyClone { count, budget }
    }
}

impl<'a> Clone for PanickyClone<'a> {
    fn clone(&self) -> Self {
        if self.budget.get() == 0 {
            panic!("Oh No!");
        }

        self.budget.set(self.budget.get() - 1);

        Self::new(self.count, self.budget)
    }
}

impl<'a> Drop for PanickyClone<'a> {
    fn drop(&mut self) {
        self.count.record_destruction();
    }
}
