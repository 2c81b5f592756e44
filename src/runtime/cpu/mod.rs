//! CPU runtime implementation
//!
//! The CPU backend models a device with host threads: a [`CpuStream`] is a
//! worker thread that runs kernel launches in issue order, and the blocks
//! of each launch are spread over a rayon pool. Buffers live on the heap,
//! 64-byte aligned and zero-initialized.

mod client;
mod device;
pub(crate) mod kernels;
mod launch;
mod runtime;
mod stream;

pub use client::{CpuAllocator, CpuClient};
pub use device::CpuDevice;
pub use runtime::CpuRuntime;
pub use stream::CpuStream;
