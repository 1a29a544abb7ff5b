//! The Queue

use std::{fmt, iter, panic};

use parking_lot::Mutex;

use crate::allocator::{Allocator, DefaultAllocator};
use crate::failure::{panic_from_failure, Result};

use super::chain::QueueChain;
use super::iterator::{IntoIter, Iter, IterMut};

/// `Queue`
pub struct Queue<T, A: Allocator = DefaultAllocator> {
    inner: Mutex<Inner<T, A>>,
}

//  The state guarded by the lock.
struct Inner<T, A> {
    chain: QueueChain<T>,
    allocator: A,
}

impl<T, A: Allocator + Default> Queue<T, A> {
    /// Creates a new, empty, instance.
    ///
    /// No memory is allocated.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use segmented::queue::Queue;
    /// let queue: Queue<i32> = Queue::new();
    ///
    /// assert!(queue.is_empty());
    /// assert_eq!(0, queue.capacity());
    /// ```
    pub fn new() -> Self {
        Self::with_allocator(A::default())
    }
}

impl<T, A: Allocator> Queue<T, A> {
    /// Creates a new, empty, instance which will obtain its segments from `allocator`.
    ///
    /// No memory is allocated.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use segmented::allocator::DefaultAllocator;
    /// #   use segmented::queue::Queue;
    /// let queue: Queue<i32> = Queue::with_allocator(DefaultAllocator);
    ///
    /// assert_eq!(0, queue.number_segments());
    /// ```
    pub fn with_allocator(allocator: A) -> Self {
        let inner = Inner { chain: QueueChain::new(), allocator };

        Self { inner: Mutex::new(inner) }
    }

    /// Returns a copy of the allocator.
    pub fn allocator(&self) -> A
    where
        A: Clone,
    {
        self.inner.lock().allocator.clone()
    }

    /// Returns whether the instance contains any element, or not.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use segmented::queue::Queue;
    /// let queue: Queue<_> = Queue::new();
    /// assert!(queue.is_empty());
    ///
    /// queue.push(1);
    /// assert!(!queue.is_empty());
    /// ```
    pub fn is_empty(&self) -> bool {
        self.inner.lock().chain.is_empty()
    }

    /// Returns the number of elements contained in the instance.
    ///
    /// The result is exact at the time the lock is held, it may be stale as soon as it is returned if other threads
    /// are pushing or popping concurrently.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use segmented::queue::Queue;
    /// let queue: Queue<_> = Queue::new();
    /// queue.push(1);
    /// queue.push(2);
    ///
    /// assert_eq!(2, queue.len());
    /// ```
    pub fn len(&self) -> usize {
        self.inner.lock().chain.len()
    }

    /// Returns the number of elements which can be pushed without allocating, including those already in.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use segmented::queue::Queue;
    /// let queue: Queue<i32> = Queue::new();
    /// queue.push(1);
    ///
    /// assert_eq!(32, queue.capacity());
    ///
    /// queue.try_pop();
    /// assert_eq!(31, queue.capacity());
    /// ```
    pub fn capacity(&self) -> usize {
        self.inner.lock().chain.capacity()
    }

    /// Returns the number of segments currently allocated.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use segmented::queue::Queue;
    /// let queue: Queue<i32> = Queue::new();
    /// assert_eq!(0, queue.number_segments());
    ///
    /// queue.extend(0..33);
    /// assert_eq!(2, queue.number_segments());
    /// ```
    pub fn number_segments(&self) -> usize {
        self.inner.lock().chain.number_segments()
    }

    /// Appends an element at the back.
    ///
    /// #   Errors
    ///
    /// Returns an error if a new segment is necessary, and cannot be allocated. The queue is then left unchanged.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use segmented::queue::Queue;
    /// let queue: Queue<_> = Queue::new();
    /// assert_eq!(Ok(()), queue.try_push(3));
    /// assert_eq!(Some(3), queue.try_pop());
    /// ```
    pub fn try_push(&self, value: T) -> Result<()> {
        let mut inner = self.inner.lock();
        let inner = &mut *inner;

        //  Reserved prior to moving `value` in, so that on failure `value` is dropped once the lock is released.
        let index = inner.chain.writable_segment(&inner.allocator)?;
        inner.chain.push_at(index, value);

        Ok(())
    }

    /// Appends an element at the back.
    ///
    /// Calling this method is equivalent to calling `try_push` and panicking on error.
    ///
    /// #   Panics
    ///
    /// Panics if the value cannot be pushed.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use segmented::queue::Queue;
    /// let queue: Queue<_> = Queue::new();
    /// queue.push(3);
    /// assert_eq!(1, queue.len());
    /// ```
    pub fn push(&self, value: T) {
        self.try_push(value).unwrap_or_else(|failure| panic_from_failure(failure));
    }

    /// Appends multiple elements at the back, contiguously.
    ///
    /// The collection is exhausted prior to appending, hence it may itself access the instance.
    ///
    /// #   Errors
    ///
    /// Returns an error if any of the values cannot be pushed. The values pushed until then remain in the queue.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use segmented::queue::Queue;
    /// let queue: Queue<_> = Queue::new();
    /// assert_eq!(Ok(()), queue.try_extend([1, 2, 3]));
    /// assert_eq!(3, queue.len());
    /// ```
    pub fn try_extend<C>(&self, collection: C) -> Result<()>
    where
        C: IntoIterator<Item = T>,
    {
        //  Declared prior to the lock, so that the values left over on failure are dropped once it is released.
        let mut values = collection.into_iter().collect::<Vec<_>>().into_iter();

        let mut inner = self.inner.lock();
        let inner = &mut *inner;

        inner.chain.try_push_each(&mut values, &inner.allocator)
    }

    /// Appends multiple elements at the back, contiguously.
    ///
    /// Calling this method is equivalent to calling `try_extend` and panicking on error.
    ///
    /// #   Panics
    ///
    /// Panics if any of the values cannot be pushed.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use segmented::queue::Queue;
    /// let queue: Queue<_> = Queue::new();
    /// queue.extend([1, 2, 3]);
    /// assert_eq!(3, queue.len());
    /// ```
    pub fn extend<C>(&self, collection: C)
    where
        C: IntoIterator<Item = T>,
    {
        self.try_extend(collection).unwrap_or_else(|failure| panic_from_failure(failure));
    }

    /// Pops the element at the front, if any.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use segmented::queue::Queue;
    /// let queue: Queue<_> = Queue::new();
    /// queue.push(1);
    ///
    /// assert_eq!(Some(1), queue.try_pop());
    /// assert_eq!(None, queue.try_pop());
    /// ```
    pub fn try_pop(&self) -> Option<T> {
        self.inner.lock().chain.try_pop()
    }

    /// Pops the element at the front into `destination`, if any.
    ///
    /// Returns whether an element was popped. If not, `destination` is reset to its default value.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use segmented::queue::Queue;
    /// let queue: Queue<_> = Queue::new();
    /// queue.push(7);
    ///
    /// let mut value = 0;
    ///
    /// assert!(queue.try_pop_into(&mut value));
    /// assert_eq!(7, value);
    ///
    /// assert!(!queue.try_pop_into(&mut value));
    /// assert_eq!(0, value);
    /// ```
    pub fn try_pop_into(&self, destination: &mut T) -> bool
    where
        T: Default,
    {
        match self.try_pop() {
            Some(value) => {
                *destination = value;
                true
            },
            None => {
                *destination = T::default();
                false
            },
        }
    }

    /// Clears the instance.
    ///
    /// The instance is then empty, although it retains previously allocated segments.
    ///
    /// Use `shrink_to_fit` to release them.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use segmented::queue::Queue;
    /// let queue: Queue<i32> = Queue::new();
    /// queue.extend(0..40);
    ///
    /// queue.clear();
    /// assert!(queue.is_empty());
    /// assert_eq!(2, queue.number_segments());
    /// ```
    pub fn clear(&self) {
        let elements = self.inner.lock().chain.take_all();

        //  Dropped once the lock is released.
        drop(elements);
    }

    /// Releases the segments which hold no element and are not about to be written to; all of them if empty.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use segmented::queue::Queue;
    /// let queue: Queue<i32> = Queue::new();
    /// queue.extend(0..40);
    ///
    /// queue.clear();
    /// queue.shrink_to_fit();
    /// assert_eq!(0, queue.number_segments());
    /// ```
    pub fn shrink_to_fit(&self) {
        let mut inner = self.inner.lock();
        let inner = &mut *inner;

        inner.chain.shrink(&inner.allocator);
    }

    /// Returns an iterator over the elements, from front to back.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use segmented::queue::Queue;
    /// let mut queue: Queue<_> = Queue::new();
    /// queue.extend([1, 2, 3]);
    ///
    /// assert_eq!(vec![1, 2, 3], queue.iter().copied().collect::<Vec<_>>());
    /// ```
    pub fn iter(&mut self) -> Iter<'_, T> {
        Iter::new(&self.inner.get_mut().chain)
    }

    /// Returns an iterator over the elements, from front to back.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use segmented::queue::Queue;
    /// let mut queue: Queue<_> = Queue::new();
    /// queue.extend([1, 2, 3]);
    ///
    /// for x in queue.iter_mut() {
    ///     *x *= 2;
    /// }
    ///
    /// assert_eq!(Some(2), queue.try_pop());
    /// ```
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut::new(&mut self.inner.get_mut().chain)
    }

    //  Pops the element at the front, without locking.
    pub(super) fn pop_exclusive(&mut self) -> Option<T> {
        self.inner.get_mut().chain.try_pop()
    }

    //  Returns the number of elements, without locking.
    pub(super) fn len_exclusive(&mut self) -> usize {
        self.inner.get_mut().chain.len()
    }
}

/// A `Queue<T>` can be shared across threads whenever `T` can be sent across threads, as elements are only ever
/// accessed by one thread at a time.
///
/// #   Example of Sync.
///
/// ```
/// # use std::cell::Cell;
/// # use segmented::queue::Queue;
/// fn ensure_sync<T: Sync>(_: T) {}
///
/// let queue: Queue<_> = Queue::new();
/// queue.push(Cell::new(3));
///
/// ensure_sync(queue);
/// ```
///
/// #   Example of not Send.
///
/// ```compile_fail
/// # use std::rc::Rc;
/// # use segmented::queue::Queue;
/// fn ensure_send<T: Send>(_: T) {}
///
/// let queue: Queue<_> = Queue::new();
/// queue.push(Rc::new(3));
///
/// ensure_send(queue);
/// ```
unsafe impl<T: Send, A: Allocator + Send> Send for Queue<T, A> {}

unsafe impl<T: Send, A: Allocator + Send> Sync for Queue<T, A> {}

/// A `Queue<T>` is always safe to use across panics: a panicking `Drop` of an element leaves it empty.
impl<T, A: Allocator> panic::UnwindSafe for Queue<T, A> {}

impl<T, A: Allocator> panic::RefUnwindSafe for Queue<T, A> {}

impl<T, A: Allocator> Drop for Queue<T, A> {
    fn drop(&mut self) {
        let inner = self.inner.get_mut();

        inner.chain.release(&inner.allocator);
    }
}

impl<T, A: Allocator + Default> Default for Queue<T, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, A: Allocator> fmt::Debug for Queue<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Queue").field("length", &self.len()).finish()
    }
}

impl<T, A: Allocator + Default> iter::FromIterator<T> for Queue<T, A> {
    fn from_iter<C>(collection: C) -> Self
    where
        C: IntoIterator<Item = T>,
    {
        let result = Self::new();
        result.extend(collection);
        result
    }
}

impl<T, A: Allocator> iter::Extend<T> for Queue<T, A> {
    fn extend<C>(&mut self, collection: C)
    where
        C: IntoIterator<Item = T>,
    {
        self.try_extend(collection).unwrap_or_else(|failure| panic_from_failure(failure));
    }
}

impl<T, A: Allocator> IntoIterator for Queue<T, A> {
    type Item = T;
    type IntoIter = IntoIter<T, A>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self)
    }
}

impl<'a, T, A: Allocator> IntoIterator for &'a mut Queue<T, A> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
