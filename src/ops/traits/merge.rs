//! Merge operations trait.

use crate::dtype::Element;
use crate::error::Result;
use crate::runtime::{DeviceBuffer, Runtime};

/// Stable merge of two sorted sequences
///
/// Both inputs must be sorted under the caller's strict order `less`, which
/// must be consistent and free of side effects. On equal keys an element of
/// the first input always precedes an element of the second, and the
/// relative order within each input is preserved.
///
/// The output must not share storage with any input.
#[allow(clippy::too_many_arguments)]
pub trait MergeOps<R: Runtime> {
    /// Merge `input1[..n1]` and `input2[..n2]` into `output[..n1 + n2]`
    ///
    /// Enqueues the partition kernel and then the block merge kernel on
    /// `stream`. The partition points live in scratch memory that is released
    /// when the merge kernel has finished.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a null or too short buffer, or an output that
    /// aliases an input. `LaunchFailed` or `OutOfMemory` if a stage cannot be
    /// enqueued. In debug mode, `AsyncExecution` if a fault surfaced while
    /// draining after a stage.
    ///
    /// # Example
    ///
    /// ```
    /// # use tileprim::prelude::*;
    /// # let device = CpuDevice::new();
    /// # let client = CpuRuntime::default_client(&device);
    /// let a = DeviceBuffer::<CpuRuntime, u32>::from_slice(&[9, 7, 1], &device)?;
    /// let b = DeviceBuffer::<CpuRuntime, u32>::from_slice(&[8, 2], &device)?;
    /// let out = DeviceBuffer::<CpuRuntime, u32>::zeros(5, &device)?;
    /// // Descending order
    /// client.merge(&a, 3, &b, 2, &out, |x: &u32, y: &u32| x > y, client.default_stream(), true)?;
    /// assert_eq!(out.to_vec(), vec![9, 8, 7, 2, 1]);
    /// # Ok::<(), tileprim::error::Error>(())
    /// ```
    fn merge<T, F>(
        &self,
        input1: &DeviceBuffer<R, T>,
        n1: usize,
        input2: &DeviceBuffer<R, T>,
        n2: usize,
        output: &DeviceBuffer<R, T>,
        less: F,
        stream: &R::Stream,
        debug_synchronous: bool,
    ) -> Result<()>
    where
        T: Element,
        F: Fn(&T, &T) -> bool + Send + Sync + 'static;

    /// Merge two key sequences and permute their values identically
    ///
    /// Values are moved with exactly the index movements applied to their
    /// keys and never take part in a comparison.
    fn merge_pairs<K, V, F>(
        &self,
        keys1: &DeviceBuffer<R, K>,
        values1: &DeviceBuffer<R, V>,
        n1: usize,
        keys2: &DeviceBuffer<R, K>,
        values2: &DeviceBuffer<R, V>,
        n2: usize,
        out_keys: &DeviceBuffer<R, K>,
        out_values: &DeviceBuffer<R, V>,
        less: F,
        stream: &R::Stream,
        debug_synchronous: bool,
    ) -> Result<()>
    where
        K: Element,
        V: Element,
        F: Fn(&K, &K) -> bool + Send + Sync + 'static;

    /// Compute the merge-path partition points for tiles of `tile` elements
    ///
    /// Writes `ceil((n1 + n2) / tile) + 1` values to `partitions`. Entry `k`
    /// is the `i` coordinate of the crossing on diagonal
    /// `d = min(k * tile, n1 + n2)`; the `j` coordinate is `d - i`. With
    /// `n1 + n2 == 0` nothing is written.
    fn merge_path_partitions<T, F>(
        &self,
        input1: &DeviceBuffer<R, T>,
        n1: usize,
        input2: &DeviceBuffer<R, T>,
        n2: usize,
        partitions: &DeviceBuffer<R, u64>,
        tile: usize,
        less: F,
        stream: &R::Stream,
        debug_synchronous: bool,
    ) -> Result<()>
    where
        T: Element,
        F: Fn(&T, &T) -> bool + Send + Sync + 'static;
}
