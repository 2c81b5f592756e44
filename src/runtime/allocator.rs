//! Memory allocator trait, default implementation and scratch buffers
//!
//! Kernels that need intermediate storage (merge-path partition points,
//! search_n candidate heads) draw it from the client's allocator. A
//! [`ScratchBuffer`] is owned by the kernels that use it and returns its
//! memory when the last of them has finished.

use crate::error::{Error, Result};
use bytemuck::Pod;
use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Memory allocator trait for runtime backends
pub trait Allocator: Clone + Send + Sync + 'static {
    /// Allocate memory of given size
    ///
    /// Returns a device pointer (u64) that can be used for operations.
    /// A zero-byte request returns the null handle `0`.
    fn allocate(&self, size_bytes: usize) -> Result<u64>;

    /// Deallocate memory
    fn deallocate(&self, ptr: u64, size_bytes: usize);

    /// Get the total bytes currently allocated through this allocator
    fn allocated_bytes(&self) -> usize {
        0 // Default: tracking not supported
    }
}

/// Default allocator that delegates to Runtime methods
///
/// Tracks outstanding bytes so callers can verify that transient scratch
/// space is released once the operations using it have completed. Clones
/// share the same counter.
#[derive(Clone, Debug)]
pub struct DefaultAllocator<D> {
    device: D,
    allocate_fn: fn(usize, &D) -> Result<u64>,
    deallocate_fn: fn(u64, usize, &D),
    outstanding: Arc<AtomicUsize>,
}

impl<D: Clone + Send + Sync> DefaultAllocator<D> {
    /// Create a new default allocator
    pub fn new(
        device: D,
        allocate_fn: fn(usize, &D) -> Result<u64>,
        deallocate_fn: fn(u64, usize, &D),
    ) -> Self {
        Self {
            device,
            allocate_fn,
            deallocate_fn,
            outstanding: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Get the device this allocator is associated with
    pub fn device(&self) -> &D {
        &self.device
    }
}

impl<D: Clone + Send + Sync + 'static> Allocator for DefaultAllocator<D> {
    fn allocate(&self, size_bytes: usize) -> Result<u64> {
        let ptr = (self.allocate_fn)(size_bytes, &self.device)?;
        if ptr != 0 {
            self.outstanding.fetch_add(size_bytes, Ordering::Relaxed);
        }
        Ok(ptr)
    }

    fn deallocate(&self, ptr: u64, size_bytes: usize) {
        if ptr == 0 {
            return;
        }
        (self.deallocate_fn)(ptr, size_bytes, &self.device);
        self.outstanding.fetch_sub(size_bytes, Ordering::Relaxed);
    }

    fn allocated_bytes(&self) -> usize {
        self.outstanding.load(Ordering::Relaxed)
    }
}

// ============================================================================
// Scratch Buffers
// ============================================================================

/// Transient zero-initialized device storage for `len` elements of `T`
///
/// Freed on drop. Kernels share a scratch buffer through an `Arc`, so the
/// memory lives exactly as long as the last enqueued stage that reads it.
pub(crate) struct ScratchBuffer<A: Allocator, T: Pod> {
    allocator: A,
    ptr: u64,
    len: usize,
    _marker: PhantomData<T>,
}

impl<A: Allocator, T: Pod> ScratchBuffer<A, T> {
    /// Allocate scratch space for `len` elements
    pub(crate) fn new(allocator: &A, len: usize) -> Result<Self> {
        let size_bytes = len
            .checked_mul(std::mem::size_of::<T>())
            .ok_or(Error::OutOfMemory { size: usize::MAX })?;
        let ptr = allocator.allocate(size_bytes)?;
        Ok(Self {
            allocator: allocator.clone(),
            ptr,
            len,
            _marker: PhantomData,
        })
    }

    /// Number of elements
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub(crate) fn as_mut_ptr(&self) -> *mut T {
        self.ptr as *mut T
    }

    /// View the scratch space as a slice
    ///
    /// # Safety
    ///
    /// No kernel may be writing to the buffer while the slice is alive.
    #[inline]
    pub(crate) unsafe fn as_slice(&self) -> &[T] {
        if self.len == 0 {
            return &[];
        }
        // SAFETY: ptr was allocated for len elements with 64-byte alignment.
        unsafe { std::slice::from_raw_parts(self.ptr as *const T, self.len) }
    }
}

impl<A: Allocator> ScratchBuffer<A, u64> {
    /// View the scratch space as atomics for cross-block min/max updates
    #[inline]
    pub(crate) fn as_atomic(&self) -> &[AtomicU64] {
        if self.len == 0 {
            return &[];
        }
        // SAFETY: AtomicU64 has the size of u64, the allocation is 64-byte
        // aligned, and every access goes through the atomic type.
        unsafe { std::slice::from_raw_parts(self.ptr as *const AtomicU64, self.len) }
    }
}

impl<A: Allocator, T: Pod> Drop for ScratchBuffer<A, T> {
    fn drop(&mut self) {
        self.allocator
            .deallocate(self.ptr, self.len * std::mem::size_of::<T>());
    }
}

// SAFETY: the buffer is plain memory addressed by an integer handle; kernels
// coordinate access through disjoint index ranges or atomics.
unsafe impl<A: Allocator, T: Pod> Send for ScratchBuffer<A, T> {}
unsafe impl<A: Allocator, T: Pod> Sync for ScratchBuffer<A, T> {}
