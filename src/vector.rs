//! #   The Vector.
//!
//! The `Vector` is the segmented equivalent of `Vec`: it may be appended to, and read from, by multiple threads
//! concurrently, and pushing never moves the elements already in.
//!
//! ##  Under the covers.
//!
//! Under the covers the `Vector` is a chain of segments: contiguous arrays of geometrically growing capacity.
//!
//! The main consequences are:
//!
//! -   Once pushed, an element remains at the same address until the `Vector` is mutably borrowed, hence `push` returns
//!     a reference to the element, and readers may hold references while other threads push.
//! -   The storage is not quite contiguous, and is instead constituted of a small number of contiguous segments.
//! -   Accessing an element by index walks the chain of segments, which is logarithmic in the number of elements.
//!
//! #   Example: basic
//!
//! General usage of `Vector` involve pushing elements, either using `push`, to push one element at a time, `extend`,
//! to push multiple elements at once, or `grow_by`, to push multiple clones of a single element.
//!
//! The faillible equivalent exist too: `try_push`, `try_extend` and `try_grow_by` will return a `Result` indicating
//! whether the operation succeeded, and the cause of its failure if it did not.
//!
//! ```
//! use segmented::vector::Vector;
//!
//! let vec: Vector<_> = Vector::new();
//! vec.push(1);
//! vec.push(2);
//!
//! assert_eq!(2, vec.len());
//! assert_eq!(1, vec[0]);
//!
//! vec.extend([3, 4, 5]);
//!
//! assert_eq!(5, vec.len());
//! assert_eq!(4, vec[3]);
//!
//! for x in &vec {
//!     println!("{}", x);
//! }
//! ```
//!
//! #   Example: accessing elements
//!
//! `Vector` provides multiple ways to access elements:
//!
//! -   The `get` and `get_mut` methods allow faillible scalar access.
//! -   The `try_get` method reports the length alongside the failure.
//! -   The `Index` and `IndexMut` traits are implemented to provide infaillible checked scalar access.
//! -   The `segment` method allows slice access.
//!
//! ```
//! use segmented::vector::Vector;
//!
//! let mut vec: Vector<_> = Vector::from([1, 2, 3, 4, 5]);
//!
//! assert_eq!(Some(1), vec.get(0).copied());
//! assert_eq!(Some(2), vec.get_mut(1).copied());
//!
//! assert_eq!(None, vec.get(5));
//! assert!(vec.try_get(5).is_err());
//!
//! assert_eq!(3, vec[2]);
//! vec[2] = 9;
//! assert_eq!(9, vec[2]);
//!
//! assert_eq!(&[1, 2, 9, 4, 5], vec.segment(0));
//! ```
//!
//! #   Example: managing capacity
//!
//! `Vector` provides multiple ways to manage the capacity available:
//!
//! -   The `reserve` and `try_reserve` calls allow pre-allocating a segment in advance.
//! -   The `shrink_to_fit` calls gather all elements into a single segment, releasing excess capacity.
//!
//! ```
//! use segmented::vector::Vector;
//!
//! let mut vec: Vector<i32> = Vector::new();
//!
//! vec.reserve(10);
//! assert_eq!(10, vec.capacity());
//!
//! vec.extend(0..20);
//! assert_eq!(2, vec.number_segments());
//!
//! //  Shrinking sheds excess capacity, and moves the elements.
//! vec.shrink_to_fit();
//! assert_eq!(20, vec.capacity());
//! assert_eq!(1, vec.number_segments());
//! ```
//!
//! #   Example: sharing is caring
//!
//! ```
//! use std::thread;
//!
//! use segmented::vector::Vector;
//!
//! let vec: Vector<_> = Vector::new();
//! let first = vec.push(0);
//!
//! thread::scope(|scope| {
//!     for t in 1..=4 {
//!         let vec = &vec;
//!         scope.spawn(move || {
//!             for i in 0..100 {
//!                 vec.push(t * 100 + i);
//!             }
//!         });
//!     }
//! });
//!
//! assert_eq!(0, *first);
//! assert_eq!(401, vec.len());
//! ```

mod chain;
mod iterator;
mod vector;

pub use self::iterator::{IntoIter, Iter, IterMut};
pub use self::vector::Vector;
