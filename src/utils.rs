//! Internal building blocks shared by the segmented containers.

pub mod growth;
pub mod segment;

#[cfg(test)]
pub mod tester;
