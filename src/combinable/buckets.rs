//! The buckets of the Combinable.
//!
//! Each bucket is a singly-linked list of cells, one cell per thread which accessed its local value. A cell is only
//! ever prepended to its list; it is only ever removed when the whole list is cleared, with exclusive access.

use std::{cell::RefCell, thread::ThreadId};

use parking_lot::Mutex;

//  A cell of a bucket.
pub struct Node<T> {
    pub thread: ThreadId,
    pub value: RefCell<T>,
    pub next: Link<T>,
}

pub type Link<T> = Option<Box<Node<T>>>;

pub struct Bucket<T>(Mutex<Link<T>>);

//  The result of looking up a thread in a bucket.
pub enum Lookup<'a, T> {
    //  The cell of the thread.
    Present(&'a Node<T>),
    //  The bucket the cell of the thread should be inserted in.
    Absent(&'a Bucket<T>),
}

impl<T> Bucket<T> {
    pub fn new() -> Self { Self(Mutex::new(None)) }

    //  Looks up the cell of `thread`.
    //
    //  #   Safety
    //
    //  The `value` of the returned cell may only be borrowed by `thread`, or with exclusive access to the bucket.
    //  Sharing a bucket across threads relies on it: `RefCell` is not `Sync`.
    pub fn lookup(&self, thread: ThreadId) -> Lookup<'_, T> {
        let head = self.0.lock();

        match Self::find(&head, thread) {
            Some(node) => Lookup::Present(node),
            None => Lookup::Absent(self),
        }
    }

    //  Prepends a cell for `thread`, holding `value`, unless `thread` already has a cell.
    //
    //  Returns the cell of `thread`, and `value` back if the cell already existed. The value is handed back, rather
    //  than dropped, so that its `Drop` runs outside the lock.
    //
    //  #   Safety
    //
    //  As per `lookup`, the `value` of the returned cell may only be borrowed by `thread`.
    pub fn insert(&self, thread: ThreadId, value: T) -> (&Node<T>, Option<T>) {
        let mut head = self.0.lock();

        if let Some(node) = Self::find(&head, thread) {
            return (node, Some(value));
        }

        let node = Box::new(Node { thread, value: RefCell::new(value), next: head.take() });

        let result: *const Node<T> = &*node;

        *head = Some(node);

        log::trace!("inserted cell for {:?}", thread);

        //  Safety:
        //  -   The node is boxed, hence its address is stable.
        //  -   The node is only removed with exclusive access to the bucket, and this borrows the bucket.
        (unsafe { &*result }, None)
    }

    //  Returns the number of cells.
    pub fn len(&self) -> usize {
        let head = self.0.lock();

        let mut result = 0;
        let mut link = &*head;

        while let Some(node) = link {
            result += 1;
            link = &node.next;
        }

        result
    }

    //  Returns the head of the list.
    pub fn head_mut(&mut self) -> &mut Link<T> { self.0.get_mut() }

    //  Returns the head of the list.
    pub fn into_head(self) -> Link<T> { self.0.into_inner() }

    //  Finds the cell of `thread`, within the locked list starting at `head`.
    fn find<'a>(head: &Link<T>, thread: ThreadId) -> Option<&'a Node<T>> {
        let mut link = head;

        while let Some(node) = link {
            if node.thread == thread {
                //  Safety:
                //  -   The node is boxed, hence its address is stable.
                //  -   The node is only removed with exclusive access to the bucket, which the caller borrows.
                return Some(unsafe { &*(&**node as *const Node<T>) });
            }

            link = &node.next;
        }

        None
    }

    //  Drops all cells.
    pub fn clear(&mut self) {
        let mut link = self.head_mut().take();

        //  Unlinked one at a time, to avoid a recursive drop.
        while let Some(mut node) = link {
            link = node.next.take();
        }
    }
}

#[cfg(test)]
mod tests {

use super::*;

use std::thread;

#[test]
fn bucket_lookup_insert() {
    let bucket = Bucket::new();
    let current = thread::current().id();

    assert!(matches!(bucket.lookup(current), Lookup::Absent(_)));

    let (inserted, rejected) = bucket.insert(current, 3);
    let inserted = inserted as *const Node<i32>;

    assert_eq!(None, rejected);

    match bucket.lookup(current) {
        Lookup::Present(node) => {
            assert_eq!(inserted, node as *const _);
            assert_eq!(3, *node.value.borrow());
        },
        Lookup::Absent(_) => panic!("Expected the cell of the current thread"),
    }

    assert_eq!(1, bucket.len());
}

#[test]
fn bucket_lookup_skips_other_threads() {
    let bucket = Bucket::new();

    let others: Vec<_> = (0..3)
        .map(|_| thread::spawn(|| thread::current().id()).join().unwrap())
        .collect();

    for (index, other) in others.iter().enumerate() {
        bucket.insert(*other, index);
    }

    let current = thread::current().id();

    assert!(matches!(bucket.lookup(current), Lookup::Absent(_)));

    bucket.insert(current, 42);

    for (index, other) in others.iter().enumerate() {
        match bucket.lookup(*other) {
            Lookup::Present(node) => assert_eq!(index, *node.value.borrow()),
            Lookup::Absent(_) => panic!("Expected the cell of {:?}", other),
        }
    }

    assert_eq!(4, bucket.len());
}

#[test]
fn bucket_insert_existing() {
    let bucket = Bucket::new();
    let current = thread::current().id();

    let (first, rejected) = bucket.insert(current, 1);
    let first = first as *const Node<i32>;

    assert_eq!(None, rejected);

    let (second, rejected) = bucket.insert(current, 2);

    assert_eq!(first, second as *const _);
    assert_eq!(Some(2), rejected);
    assert_eq!(1, *second.value.borrow());
    assert_eq!(1, bucket.len());
}

#[test]
fn bucket_clear() {
    let mut bucket = Bucket::new();

    let others: Vec<_> = (0..10)
        .map(|_| thread::spawn(|| thread::current().id()).join().unwrap())
        .collect();

    for other in others {
        bucket.insert(other, String::from("Hello"));
    }

    assert_eq!(10, bucket.len());

    bucket.clear();

    assert_eq!(0, bucket.len());
    assert!(bucket.head_mut().is_none());
}

}
