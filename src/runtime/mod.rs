//! Runtime backends for tile-based kernels
//!
//! This module defines the `Runtime` trait family, device buffers, the
//! launch driver and the diagnostics sinks, and provides the CPU backend.
//!
//! # Architecture
//!
//! ```text
//! Runtime (backend identity)
//! ├── Device (identifies a compute unit)
//! ├── Client (dispatches operations, owns the default stream and tuning)
//! ├── Stream (ordered queue of kernel launches)
//! └── Allocator (buffers and transient scratch space)
//! ```

mod allocator;
mod buffer;
pub mod config;
mod diagnostics;
pub mod launch;
mod traits;

pub mod cpu;

pub(crate) use allocator::ScratchBuffer;
pub use allocator::{Allocator, DefaultAllocator};
pub use buffer::DeviceBuffer;
pub use config::{MergeConfig, ParallelismConfig, SearchNConfig, TransformConfig};
pub use diagnostics::{DiagnosticRecord, DiagnosticsSink, NullSink, RecordingSink, TracingSink};
pub use launch::{BlockContext, GridDim, LaunchConfig};
pub use traits::{Device, Runtime, RuntimeClient, Stream};
