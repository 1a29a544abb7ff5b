//! The Vector

use std::{fmt, iter, mem, ops, panic, slice};

use parking_lot::Mutex;

use crate::allocator::{Allocator, DefaultAllocator};
use crate::failure::{panic_from_failure, Failure, Result};

use super::chain::VectorChain;
use super::iterator::{IntoIter, Iter, IterMut};

/// `Vector`
pub struct Vector<T, A: Allocator = DefaultAllocator> {
    inner: Mutex<Inner<T, A>>,
}

//  The state guarded by the lock.
//
//  Elements are never moved, nor dropped, while the lock is merely shared; only with exclusive access to the `Vector`.
struct Inner<T, A> {
    chain: VectorChain<T>,
    allocator: A,
}

impl<T, A: Allocator + Default> Vector<T, A> {
    /// Creates a new, empty, instance.
    ///
    /// No memory is allocated.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use segmented::vector::Vector;
    /// let vec: Vector<i32> = Vector::new();
    ///
    /// assert_eq!(0, vec.len());
    /// assert_eq!(0, vec.capacity());
    /// ```
    pub fn new() -> Self {
        Self::with_allocator(A::default())
    }

    /// Creates a new instance containing `count` clones of `value`.
    ///
    /// #   Panics
    ///
    /// Panics if the elements cannot be allocated.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use segmented::vector::Vector;
    /// let vec: Vector<_> = Vector::from_elem(3, "a");
    ///
    /// assert_eq!(vec!["a", "a", "a"], vec.iter().copied().collect::<Vec<_>>());
    /// ```
    pub fn from_elem(count: usize, value: T) -> Self
    where
        T: Clone,
    {
        let result = Self::new();
        result.grow_by(count, value);
        result
    }

    /// Creates a new instance containing `count` default elements.
    ///
    /// #   Panics
    ///
    /// Panics if the elements cannot be allocated.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use segmented::vector::Vector;
    /// let vec: Vector<i32> = Vector::with_default(4);
    ///
    /// assert_eq!(4, vec.len());
    /// assert_eq!(0, vec[3]);
    /// ```
    pub fn with_default(count: usize) -> Self
    where
        T: Default,
    {
        let result = Self::new();
        result.grow_by_default(count);
        result
    }
}

impl<T, A: Allocator> Vector<T, A> {
    /// Creates a new, empty, instance which will obtain its segments from `allocator`.
    ///
    /// No memory is allocated.
    pub fn with_allocator(allocator: A) -> Self {
        let inner = Inner { chain: VectorChain::new(), allocator };

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
    /// #   use segmented::vector::Vector;
    /// let vec: Vector<_> = Vector::new();
    /// assert!(vec.is_empty());
    ///
    /// vec.push(1);
    /// assert!(!vec.is_empty());
    /// ```
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of elements contained in the instance.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use segmented::vector::Vector;
    /// let vec: Vector<_> = Vector::new();
    /// assert_eq!(0, vec.len());
    ///
    /// vec.push(1);
    /// assert_eq!(1, vec.len());
    /// ```
    pub fn len(&self) -> usize {
        self.inner.lock().chain.len()
    }

    /// Returns the current capacity of the instance.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use segmented::vector::Vector;
    /// let vec: Vector<i32> = Vector::new();
    /// assert_eq!(0, vec.capacity());
    ///
    /// vec.extend([1, 2, 3, 4, 5]);
    /// assert_eq!(32, vec.capacity());
    /// ```
    pub fn capacity(&self) -> usize {
        self.inner.lock().chain.capacity()
    }

    /// Returns the maximum number of elements the instance may contain.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use segmented::vector::Vector;
    /// let vec: Vector<u64> = Vector::new();
    /// assert_eq!(isize::MAX as usize / 8, vec.max_size());
    /// ```
    pub fn max_size(&self) -> usize {
        VectorChain::<T>::max_size()
    }

    /// Returns the number of segments currently allocated.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use segmented::vector::Vector;
    /// let vec: Vector<i32> = Vector::new();
    /// assert_eq!(0, vec.number_segments());
    ///
    /// vec.extend(0..33);
    /// assert_eq!(2, vec.number_segments());
    /// ```
    pub fn number_segments(&self) -> usize {
        self.inner.lock().chain.number_segments()
    }

    /// Returns a reference to the ith element, if any.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use segmented::vector::Vector;
    /// let vec: Vector<i32> = Vector::new();
    /// vec.push(1);
    ///
    /// assert_eq!(Some(1), vec.get(0).copied());
    /// assert_eq!(None, vec.get(1));
    /// ```
    pub fn get(&self, i: usize) -> Option<&T> {
        let element = self.inner.lock().chain.locate(i)?;

        //  Safety:
        //  -   The element is live, and will remain so, at the same address, as long as `self` is borrowed.
        Some(unsafe { &*element })
    }

    /// Returns a reference to the ith element.
    ///
    /// #   Errors
    ///
    /// Returns `Failure::OutOfRange` if `i` is not less than the length.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use segmented::failure::Failure;
    /// #   use segmented::vector::Vector;
    /// let vec: Vector<i32> = Vector::new();
    /// vec.push(1);
    ///
    /// assert_eq!(Ok(&1), vec.try_get(0));
    /// assert_eq!(Err(Failure::OutOfRange { index: 1, len: 1 }), vec.try_get(1));
    /// ```
    pub fn try_get(&self, i: usize) -> Result<&T> {
        let inner = self.inner.lock();

        let element = inner.chain.locate(i).ok_or_else(|| Failure::OutOfRange { index: i, len: inner.chain.len() })?;

        //  Safety:
        //  -   The element is live, and will remain so, at the same address, as long as `self` is borrowed.
        Ok(unsafe { &*element })
    }

    /// Returns a reference to the ith element, if any.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use segmented::vector::Vector;
    /// let mut vec: Vector<i32> = Vector::new();
    /// vec.push(1);
    ///
    /// if let Some(e) = vec.get_mut(0) {
    ///     *e = 3;
    /// }
    /// assert_eq!(3, vec[0]);
    /// ```
    pub fn get_mut(&mut self, i: usize) -> Option<&mut T> {
        let element = self.inner.get_mut().chain.locate(i)?;

        //  Safety:
        //  -   The element is live, and exclusively borrowed as per `&mut self`.
        Some(unsafe { &mut *element })
    }

    /// Returns a reference to the first element, if any.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use segmented::vector::Vector;
    /// let vec: Vector<_> = Vector::new();
    /// assert_eq!(None, vec.front());
    ///
    /// vec.extend([1, 2, 3]);
    /// assert_eq!(Some(&1), vec.front());
    /// ```
    pub fn front(&self) -> Option<&T> {
        self.get(0)
    }

    /// Returns a reference to the last element, if any.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use segmented::vector::Vector;
    /// let vec: Vector<_> = Vector::new();
    /// assert_eq!(None, vec.back());
    ///
    /// vec.extend([1, 2, 3]);
    /// assert_eq!(Some(&3), vec.back());
    /// ```
    pub fn back(&self) -> Option<&T> {
        let inner = self.inner.lock();

        let last = inner.chain.len().checked_sub(1)?;
        let element = inner.chain.locate(last)?;

        //  Safety:
        //  -   The element is live, and will remain so, at the same address, as long as `self` is borrowed.
        Some(unsafe { &*element })
    }

    /// Returns the live elements of the ith segment, or an empty slice if there is no such segment.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use segmented::vector::Vector;
    /// let vec: Vector<i32> = Vector::new();
    /// vec.extend(0..40);
    ///
    /// assert_eq!(32, vec.segment(0).len());
    /// assert_eq!(&[32, 33, 34, 35, 36, 37, 38, 39], vec.segment(1));
    /// assert!(vec.segment(2).is_empty());
    /// ```
    pub fn segment(&self, i: usize) -> &[T] {
        let inner = self.inner.lock();

        let Some(segment) = inner.chain.segments().get(i) else { return &[] };

        let (pointer, len) = (segment.slot(0) as *const T, segment.len());

        //  Safety:
        //  -   The elements are live, and will remain so, at the same address, as long as `self` is borrowed.
        //  -   Elements pushed later are written past `len`.
        unsafe { slice::from_raw_parts(pointer, len) }
    }

    /// Appends an element to the back, and returns a reference to it.
    ///
    /// The element will remain at the same address until the instance is mutably borrowed.
    ///
    /// #   Errors
    ///
    /// Returns an error if a new segment is necessary, and cannot be allocated. The instance is then left unchanged.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use segmented::vector::Vector;
    /// let vec: Vector<i32> = Vector::new();
    /// assert_eq!(Ok(&3), vec.try_push(3));
    /// assert_eq!(3, vec[0]);
    /// ```
    pub fn try_push(&self, value: T) -> Result<&T> {
        let mut inner = self.inner.lock();
        let inner = &mut *inner;

        //  Reserved prior to moving `value` in, so that on failure `value` is dropped once the lock is released.
        let index = inner.chain.writable_segment(&inner.allocator)?;
        let element = inner.chain.push_at(index, value);

        //  Safety:
        //  -   The element is live, and will remain so, at the same address, as long as `self` is borrowed.
        Ok(unsafe { &*element })
    }

    /// Appends an element to the back, and returns a reference to it.
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
    /// #   use segmented::vector::Vector;
    /// let vec: Vector<i32> = Vector::new();
    /// let first = vec.push(3);
    ///
    /// vec.extend(0..100);
    /// assert_eq!(3, *first);
    /// ```
    pub fn push(&self, value: T) -> &T {
        self.try_push(value).unwrap_or_else(|failure| panic_from_failure(failure))
    }

    /// Appends `count` clones of `value` to the back, allocating at most one segment.
    ///
    /// Returns the index of the first element appended.
    ///
    /// #   Errors
    ///
    /// Returns an error if the resulting length would exceed `max_size`, or a new segment is necessary and cannot be
    /// allocated. The instance is then left unchanged.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use segmented::vector::Vector;
    /// let vec: Vector<i32> = Vector::new();
    /// vec.push(1);
    ///
    /// assert_eq!(Ok(1), vec.try_grow_by(100, 7));
    /// assert_eq!(101, vec.len());
    /// assert_eq!(2, vec.number_segments());
    /// ```
    pub fn try_grow_by(&self, count: usize, value: T) -> Result<usize>
    where
        T: Clone,
    {
        self.try_grow_by_with(count, || value.clone())
    }

    /// Appends `count` clones of `value` to the back, allocating at most one segment.
    ///
    /// Calling this method is equivalent to calling `try_grow_by` and panicking on error.
    ///
    /// #   Panics
    ///
    /// Panics if the values cannot be appended.
    pub fn grow_by(&self, count: usize, value: T) -> usize
    where
        T: Clone,
    {
        self.try_grow_by(count, value).unwrap_or_else(|failure| panic_from_failure(failure))
    }

    /// Appends `count` default elements to the back, allocating at most one segment.
    ///
    /// Returns the index of the first element appended.
    ///
    /// #   Errors
    ///
    /// Returns an error if the resulting length would exceed `max_size`, or a new segment is necessary and cannot be
    /// allocated. The instance is then left unchanged.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use segmented::vector::Vector;
    /// let vec: Vector<String> = Vector::new();
    ///
    /// assert_eq!(Ok(0), vec.try_grow_by_default(3));
    /// assert_eq!("", vec[2]);
    /// ```
    pub fn try_grow_by_default(&self, count: usize) -> Result<usize>
    where
        T: Default,
    {
        self.try_grow_by_with(count, T::default)
    }

    /// Appends `count` default elements to the back, allocating at most one segment.
    ///
    /// Calling this method is equivalent to calling `try_grow_by_default` and panicking on error.
    ///
    /// #   Panics
    ///
    /// Panics if the values cannot be appended.
    pub fn grow_by_default(&self, count: usize) -> usize
    where
        T: Default,
    {
        self.try_grow_by_default(count).unwrap_or_else(|failure| panic_from_failure(failure))
    }

    //  Appends `count` elements produced by `fill`, allocating at most one segment.
    //
    //  The elements are produced prior to locking, hence `fill` may itself access the instance.
    fn try_grow_by_with<F>(&self, count: usize, fill: F) -> Result<usize>
    where
        F: FnMut() -> T,
    {
        if count > self.max_size() {
            return Err(Failure::LengthOverflow);
        }

        let mut values = Vec::new();
        values.try_reserve_exact(count).map_err(|_| Failure::OutOfMemory)?;
        values.extend(iter::repeat_with(fill).take(count));

        //  Declared prior to the lock, so that the values left over on failure are dropped once it is released.
        let mut values = values.into_iter();

        let mut inner = self.inner.lock();
        let inner = &mut *inner;

        inner.chain.try_grow_by(&mut values, &inner.allocator)
    }

    /// Appends multiple elements to the back, contiguously.
    ///
    /// The collection is exhausted prior to appending, hence it may itself access the instance.
    ///
    /// #   Errors
    ///
    /// Returns an error if any of the values cannot be pushed. The values pushed until then remain.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use segmented::vector::Vector;
    /// let vec: Vector<i32> = Vector::new();
    /// assert_eq!(Ok(()), vec.try_extend([1, 2, 3]));
    /// assert_eq!(3, vec.len());
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

    /// Appends multiple elements to the back, contiguously.
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
    /// #   use segmented::vector::Vector;
    /// let vec: Vector<i32> = Vector::new();
    /// vec.extend([1, 2, 3]);
    /// assert_eq!(3, vec.len());
    /// ```
    pub fn extend<C>(&self, collection: C)
    where
        C: IntoIterator<Item = T>,
    {
        self.try_extend(collection).unwrap_or_else(|failure| panic_from_failure(failure));
    }

    /// Replaces the elements with those of `collection`.
    ///
    /// If the number of elements of `collection` is exactly known and exceeds the capacity, all segments are released
    /// before a single large enough one is allocated. Otherwise, the existing elements are overwritten in place, and
    /// the surplus either dropped or pushed.
    ///
    /// #   Errors
    ///
    /// Returns an error if a new segment is necessary and cannot be allocated. The elements assigned until then are
    /// retained.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use segmented::vector::Vector;
    /// let mut vec: Vector<i32> = Vector::new();
    /// vec.extend(0..10);
    ///
    /// assert_eq!(Ok(()), vec.try_assign([1, 3, 5]));
    /// assert_eq!(vec![1, 3, 5], vec.iter().copied().collect::<Vec<_>>());
    /// ```
    pub fn try_assign<C>(&mut self, collection: C) -> Result<()>
    where
        C: IntoIterator<Item = T>,
    {
        let inner = self.inner.get_mut();

        inner.chain.try_assign(collection, &inner.allocator)
    }

    /// Replaces the elements with those of `collection`.
    ///
    /// Calling this method is equivalent to calling `try_assign` and panicking on error.
    ///
    /// #   Panics
    ///
    /// Panics if the elements cannot be allocated.
    pub fn assign<C>(&mut self, collection: C)
    where
        C: IntoIterator<Item = T>,
    {
        self.try_assign(collection).unwrap_or_else(|failure| panic_from_failure(failure));
    }

    /// Replaces the elements with `count` clones of `value`.
    ///
    /// #   Errors
    ///
    /// Returns an error if a new segment is necessary and cannot be allocated.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use segmented::vector::Vector;
    /// let mut vec: Vector<i32> = Vector::new();
    /// vec.extend(0..10);
    ///
    /// assert_eq!(Ok(()), vec.try_assign_n(2, 7));
    /// assert_eq!(vec![7, 7], vec.iter().copied().collect::<Vec<_>>());
    /// ```
    pub fn try_assign_n(&mut self, count: usize, value: T) -> Result<()>
    where
        T: Clone,
    {
        self.try_assign(iter::repeat(value).take(count))
    }

    /// Replaces the elements with `count` clones of `value`.
    ///
    /// Calling this method is equivalent to calling `try_assign_n` and panicking on error.
    ///
    /// #   Panics
    ///
    /// Panics if the elements cannot be allocated.
    pub fn assign_n(&mut self, count: usize, value: T)
    where
        T: Clone,
    {
        self.try_assign_n(count, value).unwrap_or_else(|failure| panic_from_failure(failure));
    }

    /// Ensures that the capacity is at least `capacity`, appending a single segment if necessary.
    ///
    /// Unlike `Vec::reserve`, `capacity` is the total capacity, not an additional one.
    ///
    /// #   Errors
    ///
    /// Returns an error if `capacity` exceeds `max_size`, or the segment cannot be allocated.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use segmented::failure::Failure;
    /// #   use segmented::vector::Vector;
    /// let mut vec: Vector<i32> = Vector::new();
    ///
    /// assert_eq!(Ok(()), vec.try_reserve(100));
    /// assert_eq!(100, vec.capacity());
    ///
    /// assert_eq!(Err(Failure::LengthOverflow), vec.try_reserve(usize::MAX));
    /// ```
    pub fn try_reserve(&mut self, capacity: usize) -> Result<()> {
        let inner = self.inner.get_mut();

        inner.chain.try_reserve(capacity, &inner.allocator)
    }

    /// Ensures that the capacity is at least `capacity`, appending a single segment if necessary.
    ///
    /// Calling this method is equivalent to calling `try_reserve` and panicking on error.
    ///
    /// #   Panics
    ///
    /// Panics if the capacity cannot be reserved.
    pub fn reserve(&mut self, capacity: usize) {
        self.try_reserve(capacity).unwrap_or_else(|failure| panic_from_failure(failure));
    }

    /// Shrinks the instance.
    ///
    /// All elements are moved into a single segment of exactly the right capacity, or all segments are released if
    /// the instance is empty. References obtained prior are invalidated, as the borrow checker ensures.
    ///
    /// #   Errors
    ///
    /// Returns an error if the new segment cannot be allocated. The instance is then left unchanged.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use segmented::vector::Vector;
    /// let mut vec: Vector<i32> = Vector::new();
    /// vec.extend(0..40);
    ///
    /// assert_eq!(Ok(()), vec.try_shrink_to_fit());
    /// assert_eq!(1, vec.number_segments());
    /// assert_eq!(40, vec.capacity());
    /// ```
    pub fn try_shrink_to_fit(&mut self) -> Result<()> {
        let inner = self.inner.get_mut();

        inner.chain.try_shrink(&inner.allocator)
    }

    /// Shrinks the instance.
    ///
    /// Calling this method is equivalent to calling `try_shrink_to_fit` and panicking on error.
    ///
    /// #   Panics
    ///
    /// Panics if the new segment cannot be allocated.
    pub fn shrink_to_fit(&mut self) {
        self.try_shrink_to_fit().unwrap_or_else(|failure| panic_from_failure(failure));
    }

    /// Clears the instance.
    ///
    /// The instance is then empty, although it retains previously allocated memory.
    ///
    /// Use `shrink_to_fit` to release it.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use segmented::vector::Vector;
    /// let mut vec: Vector<i32> = Vector::new();
    /// vec.extend([1, 2, 3]);
    ///
    /// vec.clear();
    /// assert_eq!(0, vec.len());
    /// assert_eq!(32, vec.capacity());
    /// ```
    pub fn clear(&mut self) {
        self.inner.get_mut().chain.clear();
    }

    /// Shortens the instance to its first `len` elements, dropping the others.
    ///
    /// Has no effect if `len` is not less than the current length.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use segmented::vector::Vector;
    /// let mut vec: Vector<i32> = Vector::new();
    /// vec.extend(0..40);
    ///
    /// vec.truncate(3);
    /// assert_eq!(vec![0, 1, 2], vec.iter().copied().collect::<Vec<_>>());
    /// ```
    pub fn truncate(&mut self, len: usize) {
        self.inner.get_mut().chain.truncate(len);
    }

    /// Swaps the elements, and allocators, of `self` and `other`.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use segmented::vector::Vector;
    /// let mut a: Vector<_> = Vector::from([1, 2]);
    /// let mut b: Vector<_> = Vector::from([3]);
    ///
    /// a.swap(&mut b);
    ///
    /// assert_eq!(vec![3], a.iter().copied().collect::<Vec<_>>());
    /// assert_eq!(vec![1, 2], b.iter().copied().collect::<Vec<_>>());
    /// ```
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self.inner.get_mut(), other.inner.get_mut());
    }

    /// Returns an iterator over the elements.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use segmented::vector::Vector;
    /// let vec: Vector<_> = Vector::from([1, 2, 3]);
    ///
    /// assert_eq!(vec![3, 2, 1], vec.iter().rev().copied().collect::<Vec<_>>());
    /// ```
    pub fn iter(&self) -> Iter<'_, T, A> {
        Iter::new(self, self.len())
    }

    /// Returns an iterator over the elements.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use segmented::vector::Vector;
    /// let mut vec: Vector<_> = Vector::from([1, 2, 3]);
    ///
    /// for x in vec.iter_mut() {
    ///     *x *= 10;
    /// }
    ///
    /// assert_eq!(Some(&30), vec.back());
    /// ```
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        let chain = &mut self.inner.get_mut().chain;
        let len = chain.len();

        IterMut::new(chain.segments_mut(), len)
    }

    //  Moves the live elements out, as `(address, length)` runs, one per non-empty segment, without locking.
    //
    //  The elements are no longer live in `self`; the caller is responsible for dropping them.
    pub(super) fn take_elements(&mut self) -> Vec<(*mut T, usize)> {
        let chain = &mut self.inner.get_mut().chain;

        let result = chain.segments_mut().iter_mut()
            .filter(|segment| !segment.is_empty())
            .map(|segment| {
                let len = segment.len();
                let address = segment.slot(0);
                segment.reset();
                (address, len)
            })
            .collect();

        chain.truncate(0);

        result
    }
}

/// A `Vector<T>` can be sent across threads whenever `T` can, and shared across threads whenever `T` can be both sent
/// and shared.
///
/// #   Example of Sync.
///
/// ```
/// # use segmented::vector::Vector;
/// fn ensure_sync<T: Sync>(_: T) {}
///
/// let vec: Vector<_> = Vector::new();
/// vec.push("Hello".to_string());
///
/// ensure_sync(vec);
/// ```
///
/// #   Example of not Send.
///
/// ```compile_fail
/// # use std::rc::Rc;
/// # use segmented::vector::Vector;
/// fn ensure_send<T: Send>(_: T) {}
///
/// let vec: Vector<_> = Vector::new();
/// vec.push(Rc::new(3));
///
/// ensure_send(vec);
/// ```
///
/// #   Example of not Sync.
///
/// References to elements may be obtained from any thread, hence elements which cannot be shared prevent sharing.
///
/// ```compile_fail
/// # use std::cell::Cell;
/// # use segmented::vector::Vector;
/// fn ensure_sync<T: Sync>(_: T) {}
///
/// let vec: Vector<_> = Vector::new();
/// vec.push(Cell::new(1));
///
/// ensure_sync(vec);
/// ```
unsafe impl<T: Send, A: Allocator + Send> Send for Vector<T, A> {}

unsafe impl<T: Send + Sync, A: Allocator + Send> Sync for Vector<T, A> {}

/// A `Vector<T>` is always safe to use across panics.
///
/// #   Example of UnwindSafe.
///
/// ```
/// # use std::panic::UnwindSafe;
/// # use std::rc::Rc;
/// # use segmented::vector::Vector;
/// fn ensure_unwind_safe<T: UnwindSafe>(_: T) {}
///
/// let vec: Vector<_> = Vector::new();
/// vec.push(Rc::new(4));
///
/// ensure_unwind_safe(vec);
/// ```
impl<T, A: Allocator> panic::UnwindSafe for Vector<T, A> {}

impl<T, A: Allocator> panic::RefUnwindSafe for Vector<T, A> {}

impl<T, A: Allocator> Drop for Vector<T, A> {
    fn drop(&mut self) {
        let inner = self.inner.get_mut();

        inner.chain.release(&inner.allocator);
    }
}

impl<T, A: Allocator + Default> Default for Vector<T, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone, A: Allocator + Clone> Clone for Vector<T, A> {
    fn clone(&self) -> Self {
        let mut result = Self::with_allocator(self.allocator());

        result.reserve(self.len());
        result.extend(self.iter().cloned());

        result
    }
}

impl<T: fmt::Debug, A: Allocator> fmt::Debug for Vector<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let segments: Vec<_> = (0..self.number_segments()).map(|i| self.segment(i)).collect();

        f.debug_struct("Vector")
            .field("capacity", &self.capacity())
            .field("length", &self.len())
            .field("segments", &segments)
            .finish()
    }
}

impl<T: PartialEq, A: Allocator, B: Allocator> PartialEq<Vector<T, B>> for Vector<T, A> {
    fn eq(&self, other: &Vector<T, B>) -> bool {
        self.iter().eq(other.iter())
    }
}

impl<T: Eq, A: Allocator> Eq for Vector<T, A> {}

impl<T, A: Allocator + Default> iter::FromIterator<T> for Vector<T, A> {
    fn from_iter<C>(collection: C) -> Self
    where
        C: IntoIterator<Item = T>,
    {
        let result = Self::new();
        result.extend(collection);
        result
    }
}

impl<T, A: Allocator> iter::Extend<T> for Vector<T, A> {
    fn extend<C>(&mut self, collection: C)
    where
        C: IntoIterator<Item = T>,
    {
        self.try_extend(collection).unwrap_or_else(|failure| panic_from_failure(failure));
    }
}

impl<T, A: Allocator + Default, const N: usize> From<[T; N]> for Vector<T, A> {
    fn from(array: [T; N]) -> Self {
        let mut result = Self::new();
        result.reserve(N);
        result.extend(array);
        result
    }
}

impl<T, A: Allocator + Default> From<Vec<T>> for Vector<T, A> {
    fn from(vec: Vec<T>) -> Self {
        let mut result = Self::new();
        result.reserve(vec.len());
        result.extend(vec);
        result
    }
}

impl<T, A: Allocator> ops::Index<usize> for Vector<T, A> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        self.try_get(index).unwrap_or_else(|failure| panic_from_failure(failure))
    }
}

impl<T, A: Allocator> ops::IndexMut<usize> for Vector<T, A> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        let len = self.len();

        self.get_mut(index).unwrap_or_else(|| panic_from_failure(Failure::OutOfRange { index, len }))
    }
}

impl<T, A: Allocator> IntoIterator for Vector<T, A> {
    type Item = T;
    type IntoIter = IntoIter<T, A>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self)
    }
}

impl<'a, T, A: Allocator> IntoIterator for &'a Vector<T, A> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T, A>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, A: Allocator> IntoIterator for &'a mut Vector<T, A> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
