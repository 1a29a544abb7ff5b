//! The Combinable

use std::{
    cell::RefMut,
    cmp,
    collections::hash_map::RandomState,
    fmt,
    hash::{BuildHasher, Hash, Hasher},
    mem,
    thread::{self, ThreadId},
};

use super::buckets::{Bucket, Lookup, Node};
use super::iterator::{IntoIter, IterMut};

/// The default number of threads expected to access a `Combinable`.
pub const DEFAULT_THREAD_COUNT: usize = 8;

/// `Combinable`
///
/// A `Combinable<T>` can be sent across threads, and shared across threads, whenever `T` can be sent. The local value
/// of a thread is only ever borrowed by this thread, or with exclusive access to the `Combinable`, hence values which
/// cannot be shared are fine.
///
/// #   Example of Sync.
///
/// ```
/// # use std::cell::Cell;
/// # use segmented::combinable::Combinable;
/// fn ensure_sync<T: Sync>(_: T) {}
///
/// let combinable: Combinable<Cell<i32>> = Combinable::new();
/// combinable.local().set(3);
///
/// ensure_sync(combinable);
/// ```
///
/// #   Example of not Sync.
///
/// ```compile_fail
/// # use std::rc::Rc;
/// # use segmented::combinable::Combinable;
/// fn ensure_sync<T: Sync>(_: T) {}
///
/// let combinable: Combinable<Rc<i32>> = Combinable::new();
/// *combinable.local() = Rc::new(3);
///
/// ensure_sync(combinable);
/// ```
///
/// #   Example of not Send.
///
/// ```compile_fail
/// # use std::rc::Rc;
/// # use segmented::combinable::Combinable;
/// fn ensure_send<T: Send>(_: T) {}
///
/// let combinable: Combinable<Rc<i32>> = Combinable::new();
/// *combinable.local() = Rc::new(3);
///
/// ensure_send(combinable);
/// ```
pub struct Combinable<T, S = RandomState> {
    hasher: S,
    buckets: Box<[Bucket<T>]>,
}

impl<T> Combinable<T> {
    /// Creates a new instance, sized for the default number of threads.
    ///
    /// No cell is created.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use segmented::combinable::Combinable;
    /// let combinable: Combinable<i32> = Combinable::new();
    ///
    /// assert!(combinable.is_empty());
    /// assert_eq!(8, combinable.number_buckets());
    /// ```
    pub fn new() -> Self {
        Self::with_thread_count(DEFAULT_THREAD_COUNT)
    }

    /// Creates a new instance, sized for `thread_count` threads.
    ///
    /// The number of buckets is `max(8, thread_count / 8)`, and never changes afterwards.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use segmented::combinable::Combinable;
    /// let combinable: Combinable<i32> = Combinable::with_thread_count(256);
    ///
    /// assert_eq!(32, combinable.number_buckets());
    /// ```
    pub fn with_thread_count(thread_count: usize) -> Self {
        Self::with_thread_count_and_hasher(thread_count, RandomState::new())
    }
}

impl<T, S: BuildHasher> Combinable<T, S> {
    /// Creates a new instance, sized for the default number of threads, which hashes thread identifiers with `hasher`.
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_thread_count_and_hasher(DEFAULT_THREAD_COUNT, hasher)
    }

    /// Creates a new instance, sized for `thread_count` threads, which hashes thread identifiers with `hasher`.
    pub fn with_thread_count_and_hasher(thread_count: usize, hasher: S) -> Self {
        let number_buckets = cmp::max(8, thread_count / 8);
        let buckets = (0..number_buckets).map(|_| Bucket::new()).collect();

        Self { hasher, buckets }
    }

    /// Returns the number of buckets.
    pub fn number_buckets(&self) -> usize { self.buckets.len() }

    /// Returns the number of threads which have a local value.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use segmented::combinable::Combinable;
    /// let combinable: Combinable<i32> = Combinable::new();
    /// assert_eq!(0, combinable.len());
    ///
    /// *combinable.local() += 1;
    /// assert_eq!(1, combinable.len());
    /// ```
    pub fn len(&self) -> usize {
        self.buckets.iter().map(Bucket::len).sum()
    }

    /// Returns whether no thread has a local value.
    pub fn is_empty(&self) -> bool { self.len() == 0 }

    /// Returns the local value of the current thread, creating it with `T::default()` if necessary.
    ///
    /// #   Panics
    ///
    /// Panics if the local value of the current thread is already borrowed, that is if the result of a previous call
    /// on the same thread is still alive.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use segmented::combinable::Combinable;
    /// let combinable: Combinable<i32> = Combinable::new();
    ///
    /// *combinable.local() += 3;
    /// *combinable.local() += 4;
    ///
    /// assert_eq!(7, *combinable.local());
    /// ```
    pub fn local(&self) -> RefMut<'_, T>
    where
        T: Default,
    {
        self.local_exists().0
    }

    /// Returns the local value of the current thread, creating it with `T::default()` if necessary, and whether it
    /// existed prior to the call.
    ///
    /// #   Panics
    ///
    /// Panics if the local value of the current thread is already borrowed.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use segmented::combinable::Combinable;
    /// let combinable: Combinable<i32> = Combinable::new();
    ///
    /// let (_, exists) = combinable.local_exists();
    /// assert!(!exists);
    ///
    /// let (_, exists) = combinable.local_exists();
    /// assert!(exists);
    /// ```
    pub fn local_exists(&self) -> (RefMut<'_, T>, bool)
    where
        T: Default,
    {
        self.local_or_insert_with(T::default)
    }

    /// Returns the local value of the current thread, creating it with `init` if necessary, and whether it existed
    /// prior to the call.
    ///
    /// `init` is not invoked if the local value already exists. If `init` itself creates the local value, through
    /// `local` for example, the value it returns is dropped and the existing one returned instead.
    ///
    /// #   Panics
    ///
    /// Panics if the local value of the current thread is already borrowed.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use segmented::combinable::Combinable;
    /// let combinable: Combinable<Vec<i32>> = Combinable::new();
    ///
    /// combinable.local_or_insert_with(|| vec![1, 2]).0.push(3);
    ///
    /// let (local, exists) = combinable.local_or_insert_with(Vec::new);
    /// assert!(exists);
    /// assert_eq!(vec![1, 2, 3], *local);
    /// ```
    pub fn local_or_insert_with<F>(&self, init: F) -> (RefMut<'_, T>, bool)
    where
        F: FnOnce() -> T,
    {
        let thread = thread::current().id();

        let (node, exists) = match self.bucket_of(thread).lookup(thread) {
            Lookup::Present(node) => (node, true),
            Lookup::Absent(bucket) => {
                //  `init` may itself create the cell, by calling `local`.
                let (node, rejected) = bucket.insert(thread, init());
                let exists = rejected.is_some();

                drop(rejected);

                (node, exists)
            },
        };

        (Self::borrow_local(node), exists)
    }

    /// Combines the local values of all threads, with `op`.
    ///
    /// The values are combined in an unspecified order, hence `op` should be associative and commutative for the
    /// result to be deterministic.
    ///
    /// Returns `T::default()` if no thread has a local value.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use std::thread;
    /// #   use segmented::combinable::Combinable;
    /// let mut combinable: Combinable<i32> = Combinable::new();
    ///
    /// thread::scope(|scope| {
    ///     for i in 1..=4 {
    ///         let combinable = &combinable;
    ///         scope.spawn(move || *combinable.local() += i);
    ///     }
    /// });
    ///
    /// assert_eq!(10, combinable.combine(|a, b| a + b));
    /// ```
    pub fn combine<F>(&mut self, op: F) -> T
    where
        T: Clone + Default,
        F: FnMut(T, T) -> T,
    {
        let mut values = self.iter_mut().map(|value| value.clone());

        match values.next() {
            Some(first) => values.fold(first, op),
            None => T::default(),
        }
    }

    /// Invokes `f` on the local value of each thread, in an unspecified order.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use segmented::combinable::Combinable;
    /// let mut combinable: Combinable<Vec<i32>> = Combinable::new();
    /// combinable.local().extend([1, 2, 3]);
    ///
    /// let mut all = Vec::new();
    /// combinable.combine_each(|local| all.extend_from_slice(local));
    ///
    /// assert_eq!(vec![1, 2, 3], all);
    /// ```
    pub fn combine_each<F>(&mut self, mut f: F)
    where
        F: FnMut(&T),
    {
        for value in self.iter_mut() {
            f(value);
        }
    }

    /// Drops the local values of all threads.
    ///
    /// The next call to `local` on any thread creates a fresh value.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use segmented::combinable::Combinable;
    /// let mut combinable: Combinable<i32> = Combinable::new();
    /// *combinable.local() = 5;
    ///
    /// combinable.clear();
    /// assert!(combinable.is_empty());
    ///
    /// assert_eq!(0, *combinable.local());
    /// ```
    pub fn clear(&mut self) {
        for bucket in self.buckets.iter_mut() {
            bucket.clear();
        }
    }

    /// Returns an iterator over the local values of all threads, in an unspecified order.
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut::new(&mut self.buckets)
    }

    //  Returns the bucket `thread` belongs to.
    fn bucket_of(&self, thread: ThreadId) -> &Bucket<T> {
        let mut hasher = self.hasher.build_hasher();
        thread.hash(&mut hasher);

        let index = (hasher.finish() % (self.buckets.len() as u64)) as usize;

        &self.buckets[index]
    }

    //  Borrows the value of the cell of the current thread.
    fn borrow_local(node: &Node<T>) -> RefMut<'_, T> {
        debug_assert_eq!(thread::current().id(), node.thread);

        node.value.borrow_mut()
    }
}

impl<T, S: BuildHasher + Default> Default for Combinable<T, S> {
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<T, S: BuildHasher> fmt::Debug for Combinable<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Combinable")
            .field("number_buckets", &self.number_buckets())
            .field("length", &self.len())
            .finish()
    }
}

impl<T, S> Drop for Combinable<T, S> {
    fn drop(&mut self) {
        for bucket in self.buckets.iter_mut() {
            bucket.clear();
        }
    }
}

impl<T, S> IntoIterator for Combinable<T, S> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(mut self) -> Self::IntoIter {
        IntoIter::new(mem::take(&mut self.buckets))
    }
}

impl<'a, T, S: BuildHasher> IntoIterator for &'a mut Combinable<T, S> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

#[cfg(test)]
mod tests {

use super::*;

use std::collections::HashSet;
use std::sync::Barrier;

use crate::utils::tester::*;

#[test]
fn combinable_number_buckets() {
    assert_eq!(8, Combinable::<i32>::new().number_buckets());
    assert_eq!(8, Combinable::<i32>::with_thread_count(0).number_buckets());
    assert_eq!(8, Combinable::<i32>::with_thread_count(64).number_buckets());
    assert_eq!(9, Combinable::<i32>::with_thread_count(72).number_buckets());
}

#[test]
fn combinable_combine_empty() {
    let mut combinable: Combinable<i32> = Combinable::new();

    assert_eq!(0, combinable.combine(|a, b| a + b));
}

#[test]
fn combinable_sum_across_threads() {
    const THREADS: usize = 8;
    const INCREMENTS: usize = 10_000;

    let mut combinable: Combinable<usize> = Combinable::new();

    crossbeam_utils::thread::scope(|scope| {
        for _ in 0..THREADS {
            let combinable = &combinable;
            scope.spawn(move |_| {
                for _ in 0..INCREMENTS {
                    *combinable.local() += 1;
                }
            });
        }
    }).unwrap();

    assert_eq!(THREADS, combinable.len());
    assert_eq!(THREADS * INCREMENTS, combinable.combine(|a, b| a + b));
}

#[test]
fn combinable_distinct_threads_distinct_cells() {
    const THREADS: usize = 16;

    let combinable: Combinable<usize> = Combinable::new();
    let barrier = Barrier::new(THREADS);

    let addresses = crossbeam_utils::thread::scope(|scope| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let (combinable, barrier) = (&combinable, &barrier);
                scope.spawn(move |_| {
                    let address = &*combinable.local() as *const usize as usize;

                    //  Keep all threads alive at once.
                    barrier.wait();

                    assert_eq!(address, &*combinable.local() as *const usize as usize);

                    address
                })
            })
            .collect();

        handles.into_iter().map(|handle| handle.join().unwrap()).collect::<HashSet<_>>()
    }).unwrap();

    assert_eq!(THREADS, addresses.len());
}

#[test]
fn combinable_local_exists() {
    let combinable: Combinable<i32> = Combinable::new();

    {
        let (mut local, exists) = combinable.local_exists();
        assert!(!exists);
        *local = 4;
    }

    let (local, exists) = combinable.local_exists();
    assert!(exists);
    assert_eq!(4, *local);
}

#[test]
fn combinable_local_or_insert_with_skips_init() {
    let combinable: Combinable<i32> = Combinable::new();

    let (local, exists) = combinable.local_or_insert_with(|| 3);
    assert!(!exists);
    assert_eq!(3, *local);
    drop(local);

    let (local, exists) = combinable.local_or_insert_with(|| panic!("Should not be invoked"));
    assert!(exists);
    assert_eq!(3, *local);
}

#[test]
fn combinable_local_or_insert_with_reentrant_init() {
    let mut combinable: Combinable<i32> = Combinable::new();

    let (local, exists) = combinable.local_or_insert_with(|| {
        *combinable.local() += 1;
        5
    });

    assert!(exists);
    assert_eq!(1, *local);
    drop(local);

    assert_eq!(1, combinable.len());
    assert_eq!(1, combinable.combine(|a, b| a + b));
}

#[test]
fn combinable_local_or_insert_with_reentrant_drops_once() {
    let count = SpyCount::zero();
    let combinable: Combinable<Option<SpyElement<'_>>> = Combinable::new();

    let (local, exists) = combinable.local_or_insert_with(|| {
        *combinable.local() = Some(SpyElement::new(&count));
        Some(SpyElement::new(&count))
    });

    assert!(exists);
    assert!(local.is_some());
    drop(local);

    assert_eq!(1, count.get());
    assert_eq!(1, combinable.len());
}

#[test]
#[should_panic]
fn combinable_local_double_borrow() {
    let combinable: Combinable<i32> = Combinable::new();

    let _first = combinable.local();
    let _second = combinable.local();
}

#[test]
fn combinable_clear() {
    let count = SpyCount::zero();
    let mut combinable: Combinable<Option<SpyElement<'_>>> = Combinable::new();

    crossbeam_utils::thread::scope(|scope| {
        for _ in 0..4 {
            let (combinable, count) = (&combinable, &count);
            scope.spawn(move |_| {
                *combinable.local() = Some(SpyElement::new(count));
            });
        }
    }).unwrap();

    assert_eq!(4, count.get());
    assert_eq!(4, combinable.len());

    combinable.clear();

    assert_eq!(0, count.get());
    assert!(combinable.is_empty());

    let (local, exists) = combinable.local_exists();
    assert!(!exists);
    assert!(local.is_none());
}

#[test]
fn combinable_combine_each() {
    let mut combinable: Combinable<Vec<usize>> = Combinable::new();

    crossbeam_utils::thread::scope(|scope| {
        for i in 0..4 {
            let combinable = &combinable;
            scope.spawn(move |_| {
                combinable.local().push(i);
                combinable.local().push(i + 10);
            });
        }
    }).unwrap();

    let mut all = Vec::new();
    combinable.combine_each(|local| all.extend_from_slice(local));
    all.sort_unstable();

    assert_eq!(vec![0, 1, 2, 3, 10, 11, 12, 13], all);
}

#[test]
fn combinable_into_iter() {
    let count = SpyCount::zero();
    let combinable: Combinable<Vec<SpyElement<'_>>> = Combinable::new();

    crossbeam_utils::thread::scope(|scope| {
        for i in 0..6 {
            let (combinable, count) = (&combinable, &count);
            scope.spawn(move |_| {
                combinable.local().extend((0..i).map(|_| SpyElement::new(count)));
            });
        }
    }).unwrap();

    assert_eq!(15, count.get());

    let mut iter = combinable.into_iter();

    let first = iter.next().map(|local| local.len());
    assert!(first.is_some());

    drop(iter);

    assert_eq!(0, count.get());
}

#[test]
fn trait_debug() {
    let combinable: Combinable<i32> = Combinable::new();
    *combinable.local() += 1;

    assert_eq!("Combinable { number_buckets: 8, length: 1 }", format!("{:?}", combinable));
}

}
