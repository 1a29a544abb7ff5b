//  Lints
#![allow(clippy::module_inception)]

//! #   The Segmented Library
//!
//! A collection of concurrent data-structures, built atop chains of segments.
//! -   The `Combinable`: a thread-local value per thread, combined at the end.
//! -   The `Queue`: an unbounded multi-producer multi-consumer FIFO queue.
//! -   The `Vector`: a `Vec` which may be appended to concurrently, and whose elements never move on push.
//!
//! Each segment is a contiguous array, allocated through an `Allocator`, and is never moved once allocated: the
//! elements stored within remain at a fixed address until the data-structure is exclusively borrowed.

pub mod allocator;
pub mod combinable;
pub mod failure;
pub mod queue;
pub mod vector;

mod utils;
