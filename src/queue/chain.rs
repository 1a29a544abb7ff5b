//! The chain of Segments of the Queue.
//!
//! The chain is ordered from the head, where elements are popped, to the tail. The write cursor designates the segment
//! elements are pushed into:
//!
//! -   Segments before the write cursor are full, the head may be partially drained.
//! -   Segments after the write cursor are empty, they are drained segments rotated to the tail for reuse.
//!
//! The owner of the chain is responsible for passing the same allocator to every call, and for calling `release`
//! before dropping it.

use std::{cmp, collections::VecDeque, ptr};

use crate::allocator::Allocator;
use crate::failure::Result;
use crate::utils::{growth, segment::Segment};

pub struct QueueChain<T> {
    segments: VecDeque<Segment<T>>,
    //  Index of the segment in which elements are pushed.
    current: usize,
}

impl<T> QueueChain<T> {
    //  Creates an empty chain, without allocating.
    pub fn new() -> Self {
        Self { segments: VecDeque::new(), current: 0 }
    }

    //  Returns the segments, from head to tail.
    pub fn segments(&self) -> &VecDeque<Segment<T>> { &self.segments }

    //  Returns the segments, from head to tail.
    pub fn segments_mut(&mut self) -> &mut VecDeque<Segment<T>> { &mut self.segments }

    //  Returns whether the chain holds no live element.
    pub fn is_empty(&self) -> bool {
        self.segments.front().map_or(true, Segment::is_empty)
    }

    //  Returns the number of live elements, across all segments.
    pub fn len(&self) -> usize {
        self.segments.iter().map(Segment::len).sum()
    }

    //  Returns the number of slots usable without allocating, live elements included.
    pub fn capacity(&self) -> usize {
        self.segments.iter()
            .map(|segment| segment.capacity() - segment.used_begin())
            .sum()
    }

    //  Returns the number of segments allocated.
    pub fn number_segments(&self) -> usize { self.segments.len() }

    //  Appends an element at the tail.
    //
    //  #   Errors
    //
    //  If a new segment is necessary and cannot be allocated, leaving the chain unchanged.
    pub fn try_push<A: Allocator>(&mut self, value: T, allocator: &A) -> Result<()> {
        let index = self.writable_segment(allocator)?;

        self.push_at(index, value);

        Ok(())
    }

    //  Appends the elements of `values` at the tail, only pulling an element once a slot is available for it.
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

    //  Writes `value` in the segment at `index`, as returned by `writable_segment`.
    pub fn push_at(&mut self, index: usize, value: T) {
        debug_assert_eq!(self.current, index);

        self.segments[index].push(value);
    }

    //  Moves out the element at the head, if any.
    //
    //  Rotates the head segment to the tail once it is drained.
    pub fn try_pop(&mut self) -> Option<T> {
        let head = self.segments.front_mut()?;

        if head.is_empty() {
            return None;
        }

        let value = head.pop_front();

        if head.is_drained() {
            self.rotate();
        }

        Some(value)
    }

    //  Moves out all live elements, in order, retaining the segments.
    pub fn take_all(&mut self) -> Vec<T> {
        let mut result = Vec::with_capacity(self.len());

        for segment in self.segments.iter_mut() {
            while !segment.is_empty() {
                result.push(segment.pop_front());
            }

            segment.reset();
        }

        self.current = 0;

        result
    }

    //  Drops all live elements, retaining the segments.
    //
    //  If the Drop of an element panics, the elements of the following segments are leaked.
    pub fn clear(&mut self) {
        //  Pre-pooping our pants in case a Drop panics.
        self.current = 0;

        let live: Vec<_> = self.segments.iter_mut().map(Segment::take_live).collect();

        for elements in live {
            //  Safety:
            //  -   The elements were live, and are now considered raw.
            unsafe { ptr::drop_in_place(elements) };
        }
    }

    //  Releases the segments holding no live element past the write cursor, or all segments if the chain is empty.
    pub fn shrink<A: Allocator>(&mut self, allocator: &A) {
        if self.is_empty() {
            self.release(allocator);
            return;
        }

        while self.segments.len() > self.current + 1 {
            if let Some(segment) = self.segments.pop_back() {
                debug_assert!(segment.is_empty());

                //  Safety:
                //  -   Allocated with `allocator`, as per pre-condition.
                //  -   Empty, as it is past the write cursor.
                unsafe { segment.deallocate(allocator) };
            }
        }
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
    }

    //  Returns the index of a segment with a raw slot past its live elements, allocating if necessary.
    pub fn writable_segment<A: Allocator>(&mut self, allocator: &A) -> Result<usize> {
        match self.segments.get(self.current) {
            Some(segment) if !segment.is_full() => return Ok(self.current),
            Some(_) if self.current + 1 < self.segments.len() => {
                //  A rotated segment awaits.
                self.current += 1;

                debug_assert!(self.segments[self.current].is_empty());

                return Ok(self.current);
            },
            _ => (),
        }

        let capacity = cmp::max(growth::min_segment_size::<T>(), growth::geometric(self.len()));

        let segment = Segment::allocate(capacity, allocator)?;

        self.segments.push_back(segment);
        self.current = self.segments.len() - 1;

        Ok(self.current)
    }

    //  Moves the drained head segment to the tail.
    fn rotate(&mut self) {
        debug_assert!(self.segments.front().map_or(false, Segment::is_drained));

        if let Some(mut head) = self.segments.pop_front() {
            head.reset();

            self.segments.push_back(head);

            //  If the head was the write segment, its successor, if any, is empty and now at the head.
            self.current = self.current.saturating_sub(1);

            log::trace!("rotated drained head segment to the tail of {} segments", self.segments.len());
        }
    }
}

#[cfg(test)]
mod tests {

use super::*;

use crate::failure::Failure;
use crate::utils::tester::*;

fn capacities<T>(chain: &QueueChain<T>) -> Vec<usize> {
    chain.segments().iter().map(Segment::capacity).collect()
}

#[test]
fn chain_push_pop() {
    let allocator = TestAllocator::unlimited();
    let mut chain = QueueChain::new();

    assert!(chain.is_empty());
    assert_eq!(None, chain.try_pop());

    for i in 0..5u32 {
        chain.try_push(i, &allocator).unwrap();
    }

    assert_eq!(5, chain.len());
    assert_eq!(vec![32], capacities(&chain));

    for i in 0..5u32 {
        assert_eq!(Some(i), chain.try_pop());
    }

    assert_eq!(None, chain.try_pop());
    assert!(chain.is_empty());

    chain.release(&allocator);
    assert!(allocator.allocations().is_empty());
}

#[test]
fn chain_geometric_growth() {
    let allocator = TestAllocator::unlimited();
    let mut chain = QueueChain::new();

    for i in 0..81u32 {
        chain.try_push(i, &allocator).unwrap();
    }

    //  32, then geom(32) = 48, then geom(80) = 120.
    assert_eq!(vec![32, 48, 120], capacities(&chain));
    assert_eq!(vec![128, 192, 480], allocator.allocation_sizes());

    chain.release(&allocator);
}

#[test]
fn chain_rotation_reuses_segment() {
    let allocator = TestAllocator::unlimited();
    let mut chain = QueueChain::new();

    //  Fill the first two segments.
    for i in 0..80u32 {
        chain.try_push(i, &allocator).unwrap();
    }

    assert_eq!(vec![32, 48], capacities(&chain));

    //  Drain the first one.
    for i in 0..32u32 {
        assert_eq!(Some(i), chain.try_pop());
    }

    assert_eq!(vec![48, 32], capacities(&chain));

    //  Push more: the rotated segment is reused.
    for i in 80..100u32 {
        chain.try_push(i, &allocator).unwrap();
    }

    assert_eq!(2, chain.number_segments());
    assert_eq!(2, allocator.allocations().len());

    for i in 32..100u32 {
        assert_eq!(Some(i), chain.try_pop());
    }

    assert!(chain.is_empty());

    chain.release(&allocator);
}

#[test]
fn chain_rotation_single_segment() {
    let allocator = TestAllocator::unlimited();
    let mut chain = QueueChain::new();

    for round in 0..3u32 {
        for i in 0..32 {
            chain.try_push(round * 32 + i, &allocator).unwrap();
        }

        for i in 0..32 {
            assert_eq!(Some(round * 32 + i), chain.try_pop());
        }

        assert_eq!(1, chain.number_segments());
        assert_eq!(0, chain.segments()[0].used_begin());
        assert_eq!(0, chain.segments()[0].current());
    }

    chain.release(&allocator);
}

#[test]
fn chain_push_out_of_memory() {
    let allocator = TestAllocator::default();
    allocator.allowed.set(1);

    let mut chain = QueueChain::new();

    for i in 0..32u32 {
        chain.try_push(i, &allocator).unwrap();
    }

    assert_eq!(Err(Failure::OutOfMemory), chain.try_push(32, &allocator));

    assert_eq!(32, chain.len());
    assert_eq!(1, chain.number_segments());
    assert_eq!(Some(0), chain.try_pop());

    chain.release(&allocator);
}

#[test]
fn chain_capacity() {
    let allocator = TestAllocator::unlimited();
    let mut chain = QueueChain::new();

    assert_eq!(0, chain.capacity());

    for i in 0..40u32 {
        chain.try_push(i, &allocator).unwrap();
    }

    assert_eq!(80, chain.capacity());

    for _ in 0..10 {
        chain.try_pop();
    }

    assert_eq!(70, chain.capacity());

    chain.release(&allocator);
}

#[test]
fn chain_take_all() {
    let allocator = TestAllocator::unlimited();
    let mut chain = QueueChain::new();

    for i in 0..50u32 {
        chain.try_push(i, &allocator).unwrap();
    }

    chain.try_pop();

    assert_eq!((1..50).collect::<Vec<_>>(), chain.take_all());
    assert!(chain.is_empty());
    assert_eq!(2, chain.number_segments());

    chain.try_push(50, &allocator).unwrap();

    assert_eq!(Some(50), chain.try_pop());

    chain.release(&allocator);
    assert!(allocator.allocations().is_empty());
}

#[test]
fn chain_clear() {
    let allocator = TestAllocator::unlimited();
    let count = SpyCount::zero();
    let mut chain = QueueChain::new();

    for _ in 0..50 {
        chain.try_push(SpyElement::new(&count), &allocator).unwrap();
    }

    drop(chain.try_pop());

    assert_eq!(49, count.get());

    chain.clear();

    assert_eq!(0, count.get());
    assert!(chain.is_empty());
    assert_eq!(0, chain.len());
    assert_eq!(2, chain.number_segments());

    chain.try_push(SpyElement::new(&count), &allocator).unwrap();

    assert_eq!(1, chain.len());
    assert_eq!(2, chain.number_segments());

    chain.release(&allocator);

    assert_eq!(0, count.get());
    assert!(allocator.allocations().is_empty());
}

#[test]
fn chain_shrink() {
    let allocator = TestAllocator::unlimited();
    let mut chain = QueueChain::new();

    for i in 0..80u32 {
        chain.try_push(i, &allocator).unwrap();
    }

    for _ in 0..32 {
        chain.try_pop();
    }

    //  The rotated segment is past the write cursor.
    chain.shrink(&allocator);

    assert_eq!(vec![48], capacities(&chain));
    assert_eq!(48, chain.len());

    while chain.try_pop().is_some() {}

    chain.shrink(&allocator);

    assert_eq!(0, chain.number_segments());
    assert!(allocator.allocations().is_empty());
}

}
