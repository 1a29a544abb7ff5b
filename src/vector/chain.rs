//! The chain of Segments of the Vector.
//!
//! The chain is ordered from the head, holding the first elements, to the tail. The current segment holds the last
//! live element:
//!
//! -   Segments before the current segment are full.
//! -   Segments after the current segment are empty, they are left over by a clear or truncation.
//!
//! Hence the element at index `i` is found by walking the chain from the head, subtracting capacities.
//!
//! The owner of the chain is responsible for passing the same allocator to every call, and for calling `release`
//! before dropping it.

use std::{cmp, mem, ptr};

use crate::allocator::Allocator;
use crate::failure::{Failure, Result};
use crate::utils::{growth, segment::Segment};

pub struct VectorChain<T> {
    segments: Vec<Segment<T>>,
    //  Index of the segment holding the last live element, 0 if none.
    current: usize,
}

impl<T> VectorChain<T> {
    //  Creates an empty chain, without allocating.
    pub fn new() -> Self {
        Self { segments: Vec::new(), current: 0 }
    }

    //  Returns the segments, from head to tail.
    pub fn segments(&self) -> &[Segment<T>] { &self.segments }

    //  Returns the segments, from head to tail.
    pub fn segments_mut(&mut self) -> &mut [Segment<T>] { &mut self.segments }

    //  Returns the number of live elements.
    pub fn len(&self) -> usize {
        self.segments.iter().take(self.current + 1).map(Segment::len).sum()
    }

    //  Returns the number of slots, live or not.
    pub fn capacity(&self) -> usize {
        self.segments.iter().map(Segment::capacity).sum()
    }

    //  Returns the maximum number of elements.
    pub fn max_size() -> usize {
        match mem::size_of::<T>() {
            0 => usize::MAX,
            size => isize::MAX as usize / size,
        }
    }

    //  Returns the number of segments allocated.
    pub fn number_segments(&self) -> usize { self.segments.len() }

    //  Returns a pointer to the live element at `index`, if any.
    pub fn locate(&self, index: usize) -> Option<*mut T> {
        let mut offset = index;

        for segment in &self.segments {
            if offset < segment.capacity() {
                return if offset < segment.current() { Some(segment.slot(offset)) } else { None };
            }

            offset -= segment.capacity();
        }

        None
    }

    //  Appends an element, returning its address.
    //
    //  #   Errors
    //
    //  If a new segment is necessary and cannot be allocated, leaving the chain unchanged.
    pub fn try_push<A: Allocator>(&mut self, value: T, allocator: &A) -> Result<*mut T> {
        let index = self.writable_segment(allocator)?;

        Ok(self.push_at(index, value))
    }

    //  Appends the elements of `values`, only pulling an element once a slot is available for it.
    //
    //  #   Errors
    //
    //  If a new segment is necessary and cannot be allocated. The elements not pulled yet remain in `values`.
    pub fn try_push_each<A, I>(&mut self, values: &mut I, allocator: &A) -> Result<()>
    where
        A: Allocator,
        I: ExactSizeIterator<Item = T>,
    {
        while values.len() != 0 {
            let index = self.writable_segment(allocator)?;

            let Some(value) = values.next() else { break };

            self.push_at(index, value);
        }

        Ok(())
    }

    //  Writes `value` in the segment at `index`, as returned by `writable_segment`, returning its address.
    pub fn push_at(&mut self, index: usize, value: T) -> *mut T {
        debug_assert_eq!(self.current, index);

        self.segments[index].push(value)
    }

    //  Appends all elements of `values`, allocating at most one segment.
    //
    //  Returns the index of the first element appended.
    //
    //  #   Errors
    //
    //  If the resulting length overflows, or a new segment is necessary and cannot be allocated, leaving the chain
    //  unchanged and `values` untouched.
    pub fn try_grow_by<A, I>(&mut self, values: &mut I, allocator: &A) -> Result<usize>
    where
        A: Allocator,
        I: ExactSizeIterator<Item = T>,
    {
        let count = values.len();
        let len = self.len();
        let required = len.checked_add(count).ok_or(Failure::LengthOverflow)?;

        if required > Self::max_size() {
            return Err(Failure::LengthOverflow);
        }

        let capacity = self.capacity();

        if required > capacity {
            let size = growth::next_segment_size::<T>(capacity, required);
            self.append_segment(size, allocator)?;
        }

        for value in values.by_ref().take(count) {
            //  No allocation may occur, as per the reservation above.
            let index = self.writable_segment(allocator)?;
            self.push_at(index, value);
        }

        Ok(len)
    }

    //  Ensures that the total capacity is at least `capacity`, appending a single segment if necessary.
    pub fn try_reserve<A: Allocator>(&mut self, capacity: usize, allocator: &A) -> Result<()> {
        if capacity > Self::max_size() {
            return Err(Failure::LengthOverflow);
        }

        let current = self.capacity();

        if capacity <= current {
            return Ok(());
        }

        self.append_segment(capacity - current, allocator)
    }

    //  Replaces the elements by those of `collection`.
    //
    //  If the exact number of elements is known and exceeds the capacity, all segments are released before a single
    //  one is allocated; otherwise the live elements are overwritten in place.
    //
    //  #   Errors
    //
    //  If a new segment is necessary and cannot be allocated. The elements assigned until then are retained.
    pub fn try_assign<A, C>(&mut self, collection: C, allocator: &A) -> Result<()>
    where
        A: Allocator,
        C: IntoIterator<Item = T>,
    {
        let mut collection = collection.into_iter().fuse();

        if let (lower, Some(upper)) = collection.size_hint() {
            if lower == upper && lower > self.capacity() {
                self.reallocate(lower, allocator)?;
            }
        }

        let len = self.len();
        let mut written = 0;

        'overwrite: for segment in &mut self.segments[..] {
            for slot in segment.as_mut_slice() {
                match collection.next() {
                    Some(value) => *slot = value,
                    None => break 'overwrite,
                }

                written += 1;
            }
        }

        if written < len {
            self.truncate(written);
            return Ok(());
        }

        for value in collection {
            self.try_push(value, allocator)?;
        }

        Ok(())
    }

    //  Drops the elements past the first `len`, retaining the segments.
    //
    //  If the Drop of an element panics, the elements of the following segments are leaked.
    pub fn truncate(&mut self, len: usize) {
        let mut remaining = len;
        let mut tails = Vec::new();

        for segment in &mut self.segments[..] {
            let keep = cmp::min(remaining, segment.len());
            remaining -= keep;

            if keep < segment.len() {
                tails.push(segment.take_tail(keep));
            }
        }

        //  Pre-pooping our pants in case a Drop panics.
        self.adjust_current();

        for tail in tails {
            //  Safety:
            //  -   The elements were live, and are now considered raw.
            unsafe { ptr::drop_in_place(tail) };
        }
    }

    //  Drops all elements, retaining the segments.
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    //  Moves all elements into a single segment of exactly their number, or releases all segments if empty.
    //
    //  #   Errors
    //
    //  If the new segment cannot be allocated, leaving the chain unchanged.
    pub fn try_shrink<A: Allocator>(&mut self, allocator: &A) -> Result<()> {
        let len = self.len();

        if len == 0 {
            self.release(allocator);
            return Ok(());
        }

        if self.segments.len() == 1 && self.segments[0].capacity() == len {
            return Ok(());
        }

        let mut target = Segment::allocate(len, allocator)?;
        let mut moved = 0;

        for segment in &mut self.segments[..] {
            let count = segment.len();

            //  Safety:
            //  -   The source holds `count` live elements.
            //  -   The target has at least `count` raw slots past `moved`.
            unsafe { ptr::copy_nonoverlapping(segment.slot(0), target.slot(moved), count) };

            //  The elements now live in the target.
            segment.reset();

            moved += count;
        }

        debug_assert_eq!(len, moved);

        //  Safety:
        //  -   The first `moved` slots were initialized above.
        unsafe { target.set_len(moved) };

        log::debug!("shrunk {} segments into one of {} slots", self.segments.len(), len);

        for segment in mem::replace(&mut self.segments, vec![target]) {
            //  Safety:
            //  -   Allocated with `allocator`, as per pre-condition.
            //  -   Its elements were moved out.
            unsafe { segment.deallocate(allocator) };
        }

        self.current = 0;

        Ok(())
    }

    //  Drops all live elements, and releases all segments.
    pub fn release<A: Allocator>(&mut self, allocator: &A) {
        self.clear();

        for segment in self.segments.drain(..) {
            //  Safety:
            //  -   Allocated with `allocator`, as per pre-condition.
            //  -   Cleared above.
            unsafe { segment.deallocate(allocator) };
        }

        self.current = 0;
    }

    //  Releases all segments, then allocates a single one large enough for `required` elements.
    fn reallocate<A: Allocator>(&mut self, required: usize, allocator: &A) -> Result<()> {
        if required > Self::max_size() {
            return Err(Failure::LengthOverflow);
        }

        let capacity = cmp::max(growth::min_segment_size::<T>(), growth::grown_capacity(self.capacity(), required));

        log::debug!("reallocating {} segments into one of {} slots", self.segments.len(), capacity);

        self.release(allocator);

        self.append_segment(capacity, allocator)
    }

    //  Returns the index of a segment with a raw slot past its live elements, allocating if necessary.
    pub fn writable_segment<A: Allocator>(&mut self, allocator: &A) -> Result<usize> {
        match self.segments.get(self.current) {
            Some(segment) if !segment.is_full() => return Ok(self.current),
            Some(_) if self.current + 1 < self.segments.len() => {
                self.current += 1;

                debug_assert!(self.segments[self.current].is_empty());

                return Ok(self.current);
            },
            _ => (),
        }

        let len = self.len();
        let required = len.checked_add(1).ok_or(Failure::LengthOverflow)?;

        if required > Self::max_size() {
            return Err(Failure::LengthOverflow);
        }

        let size = growth::next_segment_size::<T>(self.capacity(), required);

        self.append_segment(size, allocator)?;

        if len > 0 {
            self.current = self.segments.len() - 1;
        }

        Ok(self.current)
    }

    //  Appends a segment of `capacity` slots at the tail, leaving the current segment unchanged.
    fn append_segment<A: Allocator>(&mut self, capacity: usize, allocator: &A) -> Result<()> {
        let segment = Segment::allocate(capacity, allocator)?;

        self.segments.push(segment);

        Ok(())
    }

    //  Points the current segment to the last segment with a live element, or the head.
    fn adjust_current(&mut self) {
        self.current = self.segments.iter().rposition(|segment| !segment.is_empty()).unwrap_or(0);
    }
}
