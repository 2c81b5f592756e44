//! CPU runtime implementation

use super::client::{CpuAllocator, CpuClient};
use super::device::CpuDevice;
use super::stream::CpuStream;
use crate::error::{Error, Result};
use crate::runtime::Runtime;
use std::alloc::{Layout as AllocLayout, alloc_zeroed, dealloc};

/// Alignment of every CPU allocation (AVX-512 width)
const ALIGN: usize = 64;

/// CPU compute runtime
///
/// Memory is allocated on the heap using the system allocator and is always
/// zero-initialized.
#[derive(Clone, Debug, Default)]
pub struct CpuRuntime;

impl CpuRuntime {
    pub(crate) fn heap_allocate(size_bytes: usize) -> Result<u64> {
        if size_bytes == 0 {
            return Ok(0);
        }
        let layout = AllocLayout::from_size_align(size_bytes, ALIGN)
            .map_err(|_| Error::OutOfMemory { size: size_bytes })?;

        // SAFETY: layout has non-zero size.
        let ptr = unsafe { alloc_zeroed(layout) };
        if ptr.is_null() {
            return Err(Error::OutOfMemory { size: size_bytes });
        }
        Ok(ptr as u64)
    }

    pub(crate) fn heap_deallocate(ptr: u64, size_bytes: usize) {
        if ptr == 0 || size_bytes == 0 {
            return;
        }
        // The layout was valid when the block was allocated.
        if let Ok(layout) = AllocLayout::from_size_align(size_bytes, ALIGN) {
            // SAFETY: ptr came from heap_allocate with this layout.
            unsafe { dealloc(ptr as *mut u8, layout) }
        }
    }
}

impl Runtime for CpuRuntime {
    type Device = CpuDevice;
    type Client = CpuClient;
    type Allocator = CpuAllocator;
    type Stream = CpuStream;

    fn name() -> &'static str {
        "cpu"
    }

    fn allocate(size_bytes: usize, _device: &Self::Device) -> Result<u64> {
        Self::heap_allocate(size_bytes)
    }

    fn deallocate(ptr: u64, size_bytes: usize, _device: &Self::Device) {
        Self::heap_deallocate(ptr, size_bytes)
    }

    fn copy_to_device(src: &[u8], dst: u64, _device: &Self::Device) -> Result<()> {
        if src.is_empty() {
            return Ok(());
        }
        if dst == 0 {
            return Err(Error::Backend("copy_to_device: null destination".into()));
        }

        // SAFETY: dst names an allocation of at least src.len() bytes.
        unsafe {
            std::ptr::copy_nonoverlapping(src.as_ptr(), dst as *mut u8, src.len());
        }
        Ok(())
    }

    fn copy_from_device(src: u64, dst: &mut [u8], _device: &Self::Device) -> Result<()> {
        if dst.is_empty() {
            return Ok(());
        }
        if src == 0 {
            return Err(Error::Backend("copy_from_device: null source".into()));
        }

        // SAFETY: src names an allocation of at least dst.len() bytes.
        unsafe {
            std::ptr::copy_nonoverlapping(src as *const u8, dst.as_mut_ptr(), dst.len());
        }
        Ok(())
    }

    fn default_device() -> Self::Device {
        CpuDevice::new()
    }

    /// # Panics
    ///
    /// Panics if the default stream's worker thread cannot be spawned. Use
    /// [`CpuClient::new`] to handle that error.
    fn default_client(device: &Self::Device) -> Self::Client {
        CpuClient::new(device.clone()).expect("failed to create CPU client")
    }
}
