//! A single Segment of a chain.
//!
//! A Segment is a contiguous block of slots, obtained from an `Allocator`, described by offsets:
//!
//! -   `begin`, always 0.
//! -   `used_begin`, the first live element; only ever advanced by the Queue.
//! -   `current`, one past the last live element.
//! -   `end`, the capacity.
//!
//! The slots in `[used_begin, current)` are initialized, the others are not.
//!
//! A Segment does not remember its allocator; it is up to the owner to deallocate it with the allocator it was
//! allocated from.

use std::{marker, ptr, slice};

use crate::allocator::{Allocator, Layout};
use crate::failure::{Failure, Result};

pub struct Segment<T> {
    begin: ptr::NonNull<T>,
    capacity: usize,
    used_begin: usize,
    current: usize,
    _marker: marker::PhantomData<T>,
}

impl<T> Segment<T> {
    //  Allocates a segment of `capacity` slots.
    //
    //  Zero-sized elements never touch the allocator.
    pub fn allocate<A: Allocator>(capacity: usize, allocator: &A) -> Result<Self> {
        debug_assert!(capacity > 0);

        let layout = Self::allocation_layout(capacity)?;

        let begin = if layout.size() == 0 {
            ptr::NonNull::dangling()
        } else {
            //  Safety:
            //  -   The size of the layout is non-zero.
            let raw = unsafe { allocator.allocate(layout) };

            ptr::NonNull::new(raw as *mut T).ok_or(Failure::OutOfMemory)?
        };

        log::debug!("allocated segment of {} slots ({} bytes)", capacity, layout.size());

        Ok(Self { begin, capacity, used_begin: 0, current: 0, _marker: marker::PhantomData })
    }

    //  Deallocates the segment.
    //
    //  #   Safety
    //
    //  -   Assumes that `allocator` is the allocator the segment was allocated with.
    //  -   Assumes that the segment holds no live element, or that they were moved out.
    pub unsafe fn deallocate<A: Allocator>(self, allocator: &A) {
        let layout = match Self::allocation_layout(self.capacity) {
            Ok(layout) => layout,
            Err(_) => {
                //  Safety:
                //  -   Cannot error, it succeeded during the allocation.
                debug_assert!(false, "{} succeeded in allocation!", self.capacity);
                unsafe { std::hint::unreachable_unchecked() }
            },
        };

        if layout.size() == 0 {
            return;
        }

        log::debug!("releasing segment of {} slots ({} bytes)", self.capacity, layout.size());

        //  Safety:
        //  -   The pointer and layout match those of the allocation.
        unsafe { allocator.deallocate(self.begin.as_ptr() as *mut u8, layout) };
    }

    //  Returns the number of slots.
    pub fn capacity(&self) -> usize { self.capacity }

    //  Returns the offset of the first live element.
    pub fn used_begin(&self) -> usize { self.used_begin }

    //  Returns the offset one past the last live element.
    pub fn current(&self) -> usize { self.current }

    //  Returns the number of live elements.
    pub fn len(&self) -> usize { self.current - self.used_begin }

    //  Returns whether no element is live.
    pub fn is_empty(&self) -> bool { self.current == self.used_begin }

    //  Returns whether no further element can be written.
    pub fn is_full(&self) -> bool { self.current == self.capacity }

    //  Returns whether every slot has been written then read.
    pub fn is_drained(&self) -> bool { self.used_begin == self.capacity }

    //  Returns a pointer to the slot at `offset`.
    //
    //  The slot may not be initialized.
    pub fn slot(&self, offset: usize) -> *mut T {
        debug_assert!(offset <= self.capacity);

        //  Safety:
        //  -   `offset` is within the allocation, or one past it.
        unsafe { self.begin.as_ptr().add(offset) }
    }

    //  Writes `value` in the first raw slot past the live elements, returns its address.
    //
    //  #   Panics
    //
    //  In debug, if the segment is full.
    pub fn push(&mut self, value: T) -> *mut T {
        debug_assert!(!self.is_full());

        let slot = self.slot(self.current);

        //  Safety:
        //  -   The slot is within bounds, and raw.
        unsafe { ptr::write(slot, value) };

        self.current += 1;

        slot
    }

    //  Moves the first live element out.
    //
    //  #   Panics
    //
    //  In debug, if the segment is empty.
    pub fn pop_front(&mut self) -> T {
        debug_assert!(!self.is_empty());

        let slot = self.slot(self.used_begin);

        self.used_begin += 1;

        //  Safety:
        //  -   The slot was live, and is now considered raw.
        unsafe { ptr::read(slot) }
    }

    //  Returns the live elements.
    pub fn as_slice(&self) -> &[T] {
        //  Safety:
        //  -   `[used_begin, current)` is initialized.
        unsafe { slice::from_raw_parts(self.slot(self.used_begin), self.len()) }
    }

    //  Returns the live elements.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        //  Safety:
        //  -   `[used_begin, current)` is initialized.
        //  -   Exclusive access, as per &mut self.
        unsafe { slice::from_raw_parts_mut(self.slot(self.used_begin), self.len()) }
    }

    //  Shortens the live elements to the first `len`, for a segment whose `used_begin` is 0, returning the tail.
    //
    //  The caller is responsible for dropping the returned elements, or leaking them.
    pub fn take_tail(&mut self, len: usize) -> *mut [T] {
        debug_assert!(self.used_begin == 0);

        let len = if len < self.current { len } else { self.current };

        let tail = ptr::slice_from_raw_parts_mut(self.slot(len), self.current - len);

        self.current = len;

        tail
    }

    //  Resets the cursors to `begin`, returning the formerly live elements.
    //
    //  The caller is responsible for dropping the returned elements, or leaking them.
    pub fn take_live(&mut self) -> *mut [T] {
        let live = ptr::slice_from_raw_parts_mut(self.slot(self.used_begin), self.len());

        self.reset();

        live
    }

    //  Resets the cursors to `begin`, forgetting any live element.
    pub fn reset(&mut self) {
        self.used_begin = 0;
        self.current = 0;
    }

    //  Sets the number of live elements, for a segment whose `used_begin` is 0.
    //
    //  #   Safety
    //
    //  -   Assumes that the first `len` slots are initialized, and are not live in any other segment.
    pub unsafe fn set_len(&mut self, len: usize) {
        debug_assert!(self.used_begin == 0);
        debug_assert!(len <= self.capacity);

        self.current = len;
    }

    //  Computes the layout for a given capacity.
    //
    //  #   Fails
    //
    //  -   If the necessary size overflows.
    fn allocation_layout(capacity: usize) -> Result<Layout> {
        Layout::array::<T>(capacity).map_err(|_| Failure::BytesOverflow)
    }
}

#[cfg(test)]
mod tests {

use super::*;

fn truncate<T>(segment: &mut Segment<T>, len: usize) {
    let tail = segment.take_tail(len);
    unsafe { ptr::drop_in_place(tail) };
}

fn clear<T>(segment: &mut Segment<T>) {
    let live = segment.take_live();
    unsafe { ptr::drop_in_place(live) };
}

use std::mem;

use crate::utils::tester::*;

#[test]
fn segment_allocation_layout() {
    fn allocation_layout<T>(capacity: usize) -> Result<usize> {
        match Segment::<T>::allocation_layout(capacity) {
            Ok(layout) => {
                assert_eq!(mem::align_of::<T>(), layout.align());
                Ok(layout.size())
            },
            Err(error) => Err(error),
        }
    }

    assert_eq!(Ok(8), allocation_layout::<u64>(1));
    assert_eq!(Ok(32), allocation_layout::<u64>(4));
    assert_eq!(Ok(32), allocation_layout::<[u64; 4]>(1));
    assert_eq!(Ok(0), allocation_layout::<()>(usize::MAX));

    assert_eq!(Err(Failure::BytesOverflow), allocation_layout::<u64>(usize::MAX / 4));
}

#[test]
fn segment_allocate_failure() {
    let allocator = TestAllocator::default();

    let segment = Segment::<u32>::allocate(4, &allocator);

    assert!(matches!(segment, Err(Failure::OutOfMemory)));
    assert!(allocator.allocations().is_empty());
}

#[test]
fn segment_allocate_bytes_overflow() {
    let allocator = TestAllocator::default();
    allocator.allowed.set(1);

    let segment = Segment::<u64>::allocate(usize::MAX / 2, &allocator);

    assert!(matches!(segment, Err(Failure::BytesOverflow)));
    assert_eq!(1, allocator.allowed.get());
}

#[test]
fn segment_allocate_deallocate() {
    let allocator = TestAllocator::default();
    allocator.allowed.set(1);

    let segment = Segment::<u64>::allocate(4, &allocator).unwrap();

    assert_eq!(vec![32], allocator.allocation_sizes());
    assert_eq!(4, segment.capacity());
    assert!(segment.is_empty());
    assert!(!segment.is_full());

    unsafe { segment.deallocate(&allocator) };

    assert!(allocator.allocations().is_empty());
}

#[test]
fn segment_zero_sized() {
    let allocator = TestAllocator::default();

    let mut segment = Segment::<()>::allocate(3, &allocator).unwrap();

    segment.push(());
    segment.push(());

    assert_eq!(2, segment.len());
    assert_eq!(&[(), ()], segment.as_slice());

    clear(&mut segment);
    unsafe { segment.deallocate(&allocator) };

    assert!(allocator.allocations().is_empty());
}

#[test]
fn segment_push_pop_front() {
    let allocator = TestAllocator::default();
    allocator.allowed.set(1);

    let mut segment = Segment::<u32>::allocate(3, &allocator).unwrap();

    let first = segment.push(1);
    segment.push(2);
    segment.push(3);

    assert!(segment.is_full());
    assert_eq!(first, segment.slot(0));
    assert_eq!(&[1, 2, 3], segment.as_slice());

    assert_eq!(1, segment.pop_front());
    assert_eq!(2, segment.pop_front());

    assert_eq!(2, segment.used_begin());
    assert_eq!(&[3], segment.as_slice());
    assert!(!segment.is_drained());

    assert_eq!(3, segment.pop_front());

    assert!(segment.is_empty());
    assert!(segment.is_drained());

    unsafe { segment.deallocate(&allocator) };
}

#[test]
fn segment_truncate() {
    let allocator = TestAllocator::default();
    allocator.allowed.set(1);

    let count = SpyCount::zero();
    let mut segment = Segment::allocate(4, &allocator).unwrap();

    for _ in 0..4 {
        segment.push(SpyElement::new(&count));
    }

    truncate(&mut segment, 5);
    assert_eq!(4, count.get());

    truncate(&mut segment, 1);
    assert_eq!(1, count.get());
    assert_eq!(1, segment.len());

    clear(&mut segment);
    assert_eq!(0, count.get());

    unsafe { segment.deallocate(&allocator) };
}

#[test]
fn segment_clear() {
    let allocator = TestAllocator::default();
    allocator.allowed.set(1);

    let count = SpyCount::zero();
    let mut segment = Segment::allocate(4, &allocator).unwrap();

    for _ in 0..3 {
        segment.push(SpyElement::new(&count));
    }

    drop(segment.pop_front());

    assert_eq!(2, count.get());

    clear(&mut segment);

    assert_eq!(0, count.get());
    assert_eq!(0, segment.used_begin());
    assert_eq!(0, segment.current());

    unsafe { segment.deallocate(&allocator) };
}

#[test]
fn segment_clear_panicky() {
    use std::panic::{catch_unwind, AssertUnwindSafe};

    let allocator = TestAllocator::default();
    allocator.allowed.set(1);

    let mut segment = Segment::allocate(3, &allocator).unwrap();

    segment.push(PanickyDrop::new(0));
    segment.push(PanickyDrop::panicky(1));
    segment.push(PanickyDrop::new(2));

    let panicked = catch_unwind(AssertUnwindSafe(|| clear(&mut segment)));

    assert!(panicked.is_err());
    assert!(segment.is_empty());

    unsafe { segment.deallocate(&allocator) };
}

}
