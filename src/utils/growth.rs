//! Growth of the segmented containers.
//!
//! Assembles the computing primitives deciding how large a new segment should be.

use std::{cmp, mem};

//  Returns the minimum number of slots of a segment of `T`.
//
//  Smaller elements get more slots, so that the first segment is roughly of the same size in bytes whatever `T`.
pub const fn min_segment_size<T>() -> usize {
    let size = mem::size_of::<T>();

    if size >= 32 {
        8
    } else if size >= 16 {
        16
    } else {
        32
    }
}

//  Returns `n + n / 2`, saturating at `usize::MAX`.
pub fn geometric(n: usize) -> usize {
    n.saturating_add(n / 2)
}

//  Returns the total capacity to grow to, from `capacity`, so that at least `required` elements fit.
pub fn grown_capacity(capacity: usize, required: usize) -> usize {
    cmp::max(geometric(capacity), required)
}

//  Returns the number of slots of the segment to append to a chain of `capacity` slots, so that at least `required`
//  elements fit.
//
//  The result is never less than `min_segment_size`.
pub fn next_segment_size<T>(capacity: usize, required: usize) -> usize {
    let target = grown_capacity(capacity, required);

    cmp::max(min_segment_size::<T>(), target - cmp::min(target, capacity))
}

#[cfg(test)]
mod tests {

use super::*;

#[test]
fn growth_min_segment_size() {
    assert_eq!(32, min_segment_size::<()>());
    assert_eq!(32, min_segment_size::<u8>());
    assert_eq!(32, min_segment_size::<u64>());
    assert_eq!(16, min_segment_size::<u128>());
    assert_eq!(16, min_segment_size::<[u64; 3]>());
    assert_eq!(8, min_segment_size::<[u64; 4]>());
    assert_eq!(8, min_segment_size::<[u8; 1024]>());
}

#[test]
fn growth_geometric() {
    assert_eq!(0, geometric(0));
    assert_eq!(1, geometric(1));
    assert_eq!(3, geometric(2));
    assert_eq!(48, geometric(32));
    assert_eq!(usize::MAX, geometric(usize::MAX - 1));
    assert_eq!(usize::MAX, geometric(usize::MAX));
}

#[test]
fn growth_grown_capacity() {
    assert_eq!(1, grown_capacity(0, 1));
    assert_eq!(48, grown_capacity(32, 33));
    assert_eq!(100, grown_capacity(32, 100));
    assert_eq!(usize::MAX, grown_capacity(usize::MAX / 3 * 2, 1));
}

#[test]
fn growth_next_segment_size() {
    //  Empty chain: the minimum.
    assert_eq!(32, next_segment_size::<u32>(0, 1));
    assert_eq!(8, next_segment_size::<[u64; 4]>(0, 1));

    //  Geometric growth kicks in once beyond the minimum.
    assert_eq!(32, next_segment_size::<u32>(32, 33));
    assert_eq!(40, next_segment_size::<u32>(80, 81));

    //  A large request is honoured in one segment.
    assert_eq!(68, next_segment_size::<u32>(32, 100));

    //  Saturation.
    assert_eq!(usize::MAX / 3, next_segment_size::<u32>(usize::MAX / 3 * 2, 1));
}

}
