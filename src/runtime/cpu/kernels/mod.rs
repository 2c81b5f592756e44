//! Block-level kernels of the CPU backend
//!
//! Each kernel is a function of one [`BlockContext`](crate::runtime::BlockContext)
//! plus the buffers it reads and writes. The launch driver runs it once per
//! block; blocks of one launch touch disjoint output ranges.

pub(crate) mod block_merge;
pub mod merge_path;
pub(crate) mod search_n;
pub(crate) mod transform;
