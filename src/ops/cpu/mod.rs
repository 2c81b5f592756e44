//! CPU implementations of the operation traits

mod merge;
mod search;
mod transform;
