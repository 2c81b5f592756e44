//! DeviceBuffer: caller-owned device memory with Arc-based sharing

use crate::dtype::Element;
use crate::error::{Error, Result};
use crate::runtime::Runtime;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Typed device memory for `len` elements of `T`
///
/// Cloning is zero-copy: clones share the same allocation. Operations keep a
/// clone of every buffer they use until their kernels have run, so a buffer
/// handed to an asynchronous operation stays valid even if the caller drops
/// its own handle early. Memory is deallocated when the last reference is
/// dropped.
///
/// Host access ([`DeviceBuffer::to_vec`], [`DeviceBuffer::copy_from_slice`])
/// is only meaningful after the streams writing the buffer have been
/// synchronized.
pub struct DeviceBuffer<R: Runtime, T: Element> {
    inner: Arc<BufferInner<R>>,
    _marker: PhantomData<T>,
}

struct BufferInner<R: Runtime> {
    /// Raw device pointer (CPU ptr cast to u64), `0` for the null buffer
    ptr: u64,
    /// Number of elements (not bytes)
    len: usize,
    /// Size of the allocation in bytes
    size_bytes: usize,
    /// Device where memory is allocated
    device: R::Device,
}

impl<R: Runtime, T: Element> DeviceBuffer<R, T> {
    /// Allocate a zero-initialized buffer of `len` elements
    ///
    /// A byte size that does not fit in `usize` is reported as
    /// [`Error::OutOfMemory`].
    pub fn zeros(len: usize, device: &R::Device) -> Result<Self> {
        let size_bytes = len
            .checked_mul(std::mem::size_of::<T>())
            .ok_or(Error::OutOfMemory { size: usize::MAX })?;
        let ptr = R::allocate(size_bytes, device)?;
        Ok(Self::wrap(ptr, len, size_bytes, device))
    }

    /// Allocate a buffer holding a copy of `data`
    pub fn from_slice(data: &[T], device: &R::Device) -> Result<Self> {
        let bytes: &[u8] = bytemuck::cast_slice(data);
        let ptr = R::allocate(bytes.len(), device)?;
        if let Err(e) = R::copy_to_device(bytes, ptr, device) {
            R::deallocate(ptr, bytes.len(), device);
            return Err(e);
        }
        Ok(Self::wrap(ptr, data.len(), bytes.len(), device))
    }

    /// The null buffer: no storage, zero length
    ///
    /// Passing it where an operation needs `n > 0` elements is an
    /// `InvalidArgument` error, detected before any work is enqueued.
    pub fn null() -> Self {
        Self::wrap(0, 0, 0, &R::default_device())
    }

    fn wrap(ptr: u64, len: usize, size_bytes: usize, device: &R::Device) -> Self {
        Self {
            inner: Arc::new(BufferInner {
                ptr,
                len,
                size_bytes,
                device: device.clone(),
            }),
            _marker: PhantomData,
        }
    }

    /// Get the raw device pointer
    #[inline]
    pub fn ptr(&self) -> u64 {
        self.inner.ptr
    }

    /// Get the number of elements
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len
    }

    /// Check if the buffer holds no elements
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.len == 0
    }

    /// Check if this is the null buffer
    #[inline]
    pub fn is_null(&self) -> bool {
        self.inner.ptr == 0
    }

    /// Get the device
    #[inline]
    pub fn device(&self) -> &R::Device {
        &self.inner.device
    }

    /// Get size in bytes
    #[inline]
    pub fn size_in_bytes(&self) -> usize {
        self.inner.size_bytes
    }

    /// Check whether two buffers share storage
    #[inline]
    pub fn same_storage<U: Element>(&self, other: &DeviceBuffer<R, U>) -> bool {
        !self.is_null() && self.inner.ptr == other.inner.ptr
    }

    /// Get the reference count
    #[inline]
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    #[inline]
    pub(crate) fn as_ptr(&self) -> *const T {
        self.inner.ptr as *const T
    }

    #[inline]
    pub(crate) fn as_mut_ptr(&self) -> *mut T {
        self.inner.ptr as *mut T
    }

    /// View the first `len` elements as a slice
    ///
    /// # Safety
    ///
    /// `len <= self.len()`, and nothing may write to that range while the
    /// slice is alive.
    #[inline]
    pub(crate) unsafe fn as_slice(&self, len: usize) -> &[T] {
        debug_assert!(len <= self.len());
        if len == 0 {
            return &[];
        }
        // SAFETY: the allocation holds self.len() elements of T and is
        // 64-byte aligned; the caller guarantees no concurrent writer.
        unsafe { std::slice::from_raw_parts(self.as_ptr(), len) }
    }

    /// Copy data from device to host
    pub fn try_to_vec(&self) -> Result<Vec<T>> {
        let mut result = vec![T::zeroed(); self.inner.len];
        let bytes: &mut [u8] = bytemuck::cast_slice_mut(&mut result);
        R::copy_from_device(self.inner.ptr, bytes, &self.inner.device)?;
        Ok(result)
    }

    /// Copy data from device to host
    ///
    /// # Panics
    ///
    /// Panics if the device-to-host transfer fails.
    pub fn to_vec(&self) -> Vec<T> {
        self.try_to_vec()
            .expect("copy_from_device failed in to_vec()")
    }

    /// Overwrite the buffer's leading elements with `data`
    pub fn copy_from_slice(&self, data: &[T]) -> Result<()> {
        if data.len() > self.inner.len {
            return Err(crate::error::Error::invalid_argument(
                "data",
                format!(
                    "{} elements do not fit in a buffer of {}",
                    data.len(),
                    self.inner.len
                ),
            ));
        }
        R::copy_to_device(bytemuck::cast_slice(data), self.inner.ptr, &self.inner.device)
    }
}

impl<R: Runtime, T: Element> Clone for DeviceBuffer<R, T> {
    /// Clone increments the reference count (zero-copy)
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            _marker: PhantomData,
        }
    }
}

impl<R: Runtime, T: Element> fmt::Debug for DeviceBuffer<R, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceBuffer")
            .field("dtype", &T::DTYPE)
            .field("ptr", &format_args!("0x{:x}", self.inner.ptr))
            .field("len", &self.inner.len)
            .finish()
    }
}

impl<R: Runtime> Drop for BufferInner<R> {
    fn drop(&mut self) {
        if self.ptr != 0 {
            R::deallocate(self.ptr, self.size_bytes, &self.device);
        }
    }
}

// SAFETY: the inner state is an integer handle plus a device id; the
// memory it names is only touched by kernels on ordered streams or by host
// copies the caller performs after synchronizing.
unsafe impl<R: Runtime, T: Element> Send for DeviceBuffer<R, T> {}
unsafe impl<R: Runtime, T: Element> Sync for DeviceBuffer<R, T> {}
