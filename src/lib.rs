//! # tileprim
//!
//! **Device-wide parallel primitives executed as a grid of independent tiles.**
//!
//! tileprim turns an arbitrary-size problem into a fixed decomposition of
//! bounded-size tiles that blocks process with no cross-block communication,
//! while keeping exact ordering guarantees.
//!
//! ## Primitives
//!
//! - **transform**: elementwise map over a tiled range (in place or out of place)
//! - **merge**: stable two-way merge of sorted sequences using merge-path partitioning
//! - **merge_pairs**: the same merge, permuting associated values alongside the keys
//! - **search_n**: first run of `count` consecutive elements matching a predicate
//!
//! ## Execution model
//!
//! Every operation is enqueued on a [`Stream`](runtime::Stream). Operations on one
//! stream run in issue order; by default a call returns as soon as its kernels are
//! enqueued. Passing `debug_synchronous = true` drains the stream after every
//! internal stage and forwards `(stage, size, elapsed)` records to the client's
//! [`DiagnosticsSink`](runtime::DiagnosticsSink).
//!
//! ## Quick Start
//!
//! ```rust
//! use tileprim::prelude::*;
//!
//! let device = CpuDevice::new();
//! let client = CpuRuntime::default_client(&device);
//!
//! let a = DeviceBuffer::<CpuRuntime, i32>::from_slice(&[1, 3, 5, 7], &device)?;
//! let b = DeviceBuffer::<CpuRuntime, i32>::from_slice(&[2, 2, 6, 8], &device)?;
//! let out = DeviceBuffer::<CpuRuntime, i32>::zeros(8, &device)?;
//!
//! let stream = client.default_stream().clone();
//! client.merge(&a, 4, &b, 4, &out, |x: &i32, y: &i32| x < y, &stream, false)?;
//! stream.synchronize()?;
//! assert_eq!(out.to_vec(), vec![1, 2, 2, 3, 5, 6, 7, 8]);
//! # Ok::<(), tileprim::error::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `rayon` (default): blocks of a grid run on a rayon thread pool
//! - `f16`: half-precision keys (`half::f16`)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod dtype;
pub mod error;
pub mod ops;
pub mod runtime;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::dtype::{DType, DoublePair, Element, IntPair};
    pub use crate::error::{Error, Result, Status};
    pub use crate::ops::{MergeOps, SearchOps, TransformOps};
    pub use crate::runtime::{
        DeviceBuffer, Device, DiagnosticsSink, Runtime, RuntimeClient, Stream,
    };

    pub use crate::runtime::cpu::{CpuClient, CpuDevice, CpuRuntime, CpuStream};
}

/// Default runtime based on enabled features
pub type DefaultRuntime = runtime::cpu::CpuRuntime;
