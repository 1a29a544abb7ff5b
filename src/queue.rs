//! #   The Queue.
//!
//! The `Queue` is an unbounded FIFO queue, which may be shared across threads: any number of producers may push
//! elements while any number of consumers pop them.
//!
//! ##  Under the covers.
//!
//! Under the covers the `Queue` is a chain of segments: contiguous arrays of geometrically growing capacity. All
//! operations are serialized by a single lock.
//!
//! The main consequences are:
//!
//! -   Pushing never moves the elements already in the queue.
//! -   A segment fully drained by consumers is recycled at the tail of the chain, so that a queue whose length is
//!     stable eventually stops allocating altogether.
//!
//! #   Example: basic
//!
//! ```
//! use segmented::queue::Queue;
//!
//! let queue: Queue<_> = Queue::new();
//! queue.push(1);
//! queue.push(2);
//!
//! assert_eq!(2, queue.len());
//!
//! assert_eq!(Some(1), queue.try_pop());
//! assert_eq!(Some(2), queue.try_pop());
//! assert_eq!(None, queue.try_pop());
//! ```
//!
//! #   Example: sharing is caring
//!
//! ```
//! use std::thread;
//!
//! use segmented::queue::Queue;
//!
//! let queue: Queue<_> = Queue::new();
//!
//! thread::scope(|scope| {
//!     for producer in 0..4 {
//!         let queue = &queue;
//!         scope.spawn(move || {
//!             for i in 0..100 {
//!                 queue.push(producer * 100 + i);
//!             }
//!         });
//!     }
//! });
//!
//! let mut popped: Vec<_> = queue.into_iter().collect();
//! popped.sort();
//!
//! assert_eq!((0..400).collect::<Vec<_>>(), popped);
//! ```

mod chain;
mod iterator;
mod queue;

pub use self::iterator::{IntoIter, Iter, IterMut};
pub use self::queue::Queue;
