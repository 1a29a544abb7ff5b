//! Iterators of the Combinable.

use std::{iter, slice, vec};

use super::buckets::{Bucket, Link, Node};

/// An iterator over the local values of a `Combinable`.
pub struct IterMut<'a, T> {
    buckets: slice::IterMut<'a, Bucket<T>>,
    node: Option<&'a mut Node<T>>,
}

impl<'a, T> IterMut<'a, T> {
    pub(super) fn new(buckets: &'a mut [Bucket<T>]) -> Self {
        Self { buckets: buckets.iter_mut(), node: None }
    }
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;

    fn next(&mut self) -> Option<&'a mut T> {
        loop {
            if let Some(node) = self.node.take() {
                let Node { value, next, .. } = node;

                self.node = next.as_deref_mut();

                return Some(value.get_mut());
            }

            self.node = self.buckets.next()?.head_mut().as_deref_mut();
        }
    }
}

impl<'a, T> iter::FusedIterator for IterMut<'a, T> {}

/// An iterator moving the local values out of a `Combinable`.
pub struct IntoIter<T> {
    buckets: vec::IntoIter<Bucket<T>>,
    node: Link<T>,
}

impl<T> IntoIter<T> {
    pub(super) fn new(buckets: Box<[Bucket<T>]>) -> Self {
        Self { buckets: buckets.into_vec().into_iter(), node: None }
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        loop {
            if let Some(node) = self.node.take() {
                let Node { value, next, .. } = *node;

                self.node = next;

                return Some(value.into_inner());
            }

            self.node = self.buckets.next()?.into_head();
        }
    }
}

impl<T> iter::FusedIterator for IntoIter<T> {}

impl<T> Drop for IntoIter<T> {
    fn drop(&mut self) {
        //  Unlinked one at a time, to avoid a recursive drop.
        for _ in self {}
    }
}
