//! Iterators of the Queue.

use std::{collections::vec_deque, iter, slice};

use crate::allocator::Allocator;
use crate::utils::segment::Segment;

use super::chain::QueueChain;
use super::queue::Queue;

/// An iterator over the elements of a `Queue`, from front to back.
pub struct Iter<'a, T> {
    segments: vec_deque::Iter<'a, Segment<T>>,
    elements: slice::Iter<'a, T>,
    remaining: usize,
}

impl<'a, T> Iter<'a, T> {
    pub(super) fn new(chain: &'a QueueChain<T>) -> Self {
        Self { segments: chain.segments().iter(), elements: <&[T]>::default().iter(), remaining: chain.len() }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        loop {
            if let Some(element) = self.elements.next() {
                self.remaining -= 1;
                return Some(element);
            }

            self.elements = self.segments.next()?.as_slice().iter();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> ExactSizeIterator for Iter<'a, T> {}

impl<'a, T> iter::FusedIterator for Iter<'a, T> {}

/// An iterator over the elements of a `Queue`, from front to back.
pub struct IterMut<'a, T> {
    segments: vec_deque::IterMut<'a, Segment<T>>,
    elements: slice::IterMut<'a, T>,
    remaining: usize,
}

impl<'a, T> IterMut<'a, T> {
    pub(super) fn new(chain: &'a mut QueueChain<T>) -> Self {
        let remaining = chain.len();

        Self { segments: chain.segments_mut().iter_mut(), elements: <&mut [T]>::default().iter_mut(), remaining }
    }
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;

    fn next(&mut self) -> Option<&'a mut T> {
        loop {
            if let Some(element) = self.elements.next() {
                self.remaining -= 1;
                return Some(element);
            }

            self.elements = self.segments.next()?.as_mut_slice().iter_mut();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> ExactSizeIterator for IterMut<'a, T> {}

impl<'a, T> iter::FusedIterator for IterMut<'a, T> {}

/// An iterator moving the elements out of a `Queue`, from front to back.
///
/// The elements not yet consumed are dropped with the iterator.
pub struct IntoIter<T, A: Allocator> {
    queue: Queue<T, A>,
    remaining: usize,
}

impl<T, A: Allocator> IntoIter<T, A> {
    pub(super) fn new(mut queue: Queue<T, A>) -> Self {
        let remaining = queue.len_exclusive();

        Self { queue, remaining }
    }
}

impl<T, A: Allocator> Iterator for IntoIter<T, A> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let result = self.queue.pop_exclusive();

        if result.is_some() {
            self.remaining -= 1;
        }

        result
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T, A: Allocator> ExactSizeIterator for IntoIter<T, A> {}

impl<T, A: Allocator> iter::FusedIterator for IntoIter<T, A> {}
