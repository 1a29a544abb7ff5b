//! The Failure and Result types of this library.
//!
//! The containers in this library support faillible allocations. Any method which attempts to allocate memory, or to
//! access an element by a checked index, may fail. The cause of the error is then represented as a `Failure`.
//!
//! Faillible methods come in two versions:
//!
//! -   A faillible `try_xxx` version, which returns a `Result` with `Failure` as the error type.
//! -   A convenience `xxx` version, which invokes the `try_xxx` version and panics in case of error.

use std::result;

/// Universal Failure type of this library.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, thiserror::Error)]
pub enum Failure {
    /// The index accessed is not less than the length of the container.
    #[error("index {index} is out of range for length {len}")]
    OutOfRange {
        /// The index requested.
        index: usize,
        /// The length of the container at the time of the request.
        len: usize,
    },
    /// The number of elements cannot be calculated due to overflowing.
    #[error("length overflow")]
    LengthOverflow,
    /// The number of bytes to allocate cannot be calculated due to overflowing.
    #[error("bytes overflow")]
    BytesOverflow,
    /// The allocator could not allocate memory.
    #[error("out of memory")]
    OutOfMemory,
}

/// Universal Result type of this library.
pub type Result<T> = result::Result<T, Failure>;

//  Panics with the description of `failure`.
//
//  Shared by all the panicking convenience methods.
#[cold]
#[inline(never)]
pub(crate) fn panic_from_failure(failure: Failure) -> ! {
    panic!("{}", failure);
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn failure_display() {
        assert_eq!("bytes overflow", format!("{}", Failure::BytesOverflow));
        assert_eq!(
            "index 4 is out of range for length 3",
            format!("{}", Failure::OutOfRange { index: 4, len: 3 })
        );
    }

    #[test]
    fn failure_is_error() {
        fn ensure_error<E: std::error::Error + Send + Sync + 'static>(_: E) {}

        ensure_error(Failure::OutOfMemory);
    }

    #[test]
    #[should_panic(expected = "length overflow")]
    fn failure_panic() {
        panic_from_failure(Failure::LengthOverflow);
    }
}
