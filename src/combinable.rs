//! #   The Combinable.
//!
//! A `Combinable` gives each thread accessing it its own local value, which the thread may freely mutate without
//! synchronizing with the others. Once all threads are done, the local values are combined into one.
//!
//! ##  Under the covers.
//!
//! Under the covers the `Combinable` is a fixed-size array of buckets, each a linked-list of cells keyed by thread
//! identifier and guarded by its own lock. The lock is only taken to locate, or create, the cell of a thread; the
//! local value itself is accessed without any lock.
//!
//! #   Example
//!
//! ```
//! use std::thread;
//!
//! use segmented::combinable::Combinable;
//!
//! let mut words: Combinable<usize> = Combinable::new();
//! let lines = ["the quick brown fox", "jumps over", "the lazy dog"];
//!
//! thread::scope(|scope| {
//!     for line in lines {
//!         let words = &words;
//!         scope.spawn(move || *words.local() += line.split_whitespace().count());
//!     }
//! });
//!
//! assert_eq!(9, words.combine(|a, b| a + b));
//! ```

mod buckets;
mod combinable;
mod iterator;

pub use self::combinable::{Combinable, DEFAULT_THREAD_COUNT};
pub use self::iterator::{IntoIter, IterMut};
