//! Device-wide operations
//!
//! Operations are defined as traits implemented by a runtime's client, so a
//! call has access to the client's allocator, tuning and diagnostics sink.
//!
//! ```text
//! RuntimeClient<R>
//!   ├── implements TransformOps<R>
//!   │     └── transform, transform_in_place
//!   ├── implements MergeOps<R>
//!   │     └── merge, merge_pairs, merge_path_partitions
//!   └── implements SearchOps<R>
//!         └── search_n
//! ```
//!
//! Every operation validates its arguments before enqueueing anything,
//! enqueues one or more kernels on the caller's stream, and returns without
//! waiting unless `debug_synchronous` is set.

mod cpu;
pub(crate) mod validation;
pub mod traits;

pub use traits::{MergeOps, SearchOps, TransformOps};
