//! Iterators of the Vector.

use std::{cmp, iter, ptr, slice, vec};

use crate::allocator::Allocator;
use crate::utils::segment::Segment;

use super::vector::Vector;

/// An iterator over the elements of a `Vector`.
///
/// Each element is resolved by index, hence the iterator only covers the elements present on its creation.
pub struct Iter<'a, T, A: Allocator> {
    vector: &'a Vector<T, A>,
    front: usize,
    back: usize,
}

impl<'a, T, A: Allocator> Iter<'a, T, A> {
    pub(super) fn new(vector: &'a Vector<T, A>, len: usize) -> Self {
        Self { vector, front: 0, back: len }
    }
}

impl<'a, T, A: Allocator> Clone for Iter<'a, T, A> {
    fn clone(&self) -> Self {
        Self { vector: self.vector, front: self.front, back: self.back }
    }
}

impl<'a, T, A: Allocator> Iterator for Iter<'a, T, A> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.front == self.back {
            return None;
        }

        let result = self.vector.get(self.front);
        self.front += 1;

        result
    }

    fn nth(&mut self, n: usize) -> Option<&'a T> {
        self.front = cmp::min(self.front.saturating_add(n), self.back);

        self.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;

        (remaining, Some(remaining))
    }
}

impl<'a, T, A: Allocator> DoubleEndedIterator for Iter<'a, T, A> {
    fn next_back(&mut self) -> Option<&'a T> {
        if self.front == self.back {
            return None;
        }

        self.back -= 1;

        self.vector.get(self.back)
    }
}

impl<'a, T, A: Allocator> ExactSizeIterator for Iter<'a, T, A> {}

impl<'a, T, A: Allocator> iter::FusedIterator for Iter<'a, T, A> {}

/// An iterator over the elements of a `Vector`.
pub struct IterMut<'a, T> {
    segments: slice::IterMut<'a, Segment<T>>,
    elements: slice::IterMut<'a, T>,
    remaining: usize,
}

impl<'a, T> IterMut<'a, T> {
    pub(super) fn new(segments: &'a mut [Segment<T>], len: usize) -> Self {
        Self { segments: segments.iter_mut(), elements: <&mut [T]>::default().iter_mut(), remaining: len }
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

/// An iterator moving the elements out of a `Vector`.
///
/// The elements not yet consumed are dropped with the iterator.
pub struct IntoIter<T, A: Allocator> {
    //  Runs of elements yet to be moved out, as `(address, length)`.
    runs: vec::IntoIter<(*mut T, usize)>,
    run: (*mut T, usize),
    remaining: usize,
    //  Owns the segments, which it releases on drop.
    _vector: Vector<T, A>,
}

impl<T, A: Allocator> IntoIter<T, A> {
    pub(super) fn new(mut vector: Vector<T, A>) -> Self {
        let runs = vector.take_elements();
        let remaining = runs.iter().map(|run| run.1).sum();

        Self { runs: runs.into_iter(), run: (ptr::null_mut(), 0), remaining, _vector: vector }
    }
}

impl<T, A: Allocator> Iterator for IntoIter<T, A> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        while self.run.1 == 0 {
            self.run = self.runs.next()?;
        }

        let (address, len) = self.run;

        //  Safety:
        //  -   `address` points to the first element of the run, which is live.
        //  -   The element is considered moved out past this point.
        let result = unsafe { ptr::read(address) };

        //  Safety:
        //  -   At most one past the end of the run.
        self.run = (unsafe { address.add(1) }, len - 1);
        self.remaining -= 1;

        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T, A: Allocator> ExactSizeIterator for IntoIter<T, A> {}

impl<T, A: Allocator> iter::FusedIterator for IntoIter<T, A> {}

impl<T, A: Allocator> Drop for IntoIter<T, A> {
    fn drop(&mut self) {
        let current = std::mem::replace(&mut self.run, (ptr::null_mut(), 0));

        for (address, len) in iter::once(current).chain(self.runs.by_ref()) {
            if len == 0 {
                continue;
            }

            //  Safety:
            //  -   The run is live, and considered moved out past this point.
            unsafe { ptr::drop_in_place(ptr::slice_from_raw_parts_mut(address, len)) };
        }
    }
}

unsafe impl<T: Send, A: Allocator + Send> Send for IntoIter<T, A> {}

unsafe impl<T: Sync, A: Allocator + Sync> Sync for IntoIter<T, A> {}
