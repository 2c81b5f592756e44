//! CPU implementation of merge operations.
//!
//! A merge is two launches on the caller's stream: the partition kernel
//! writes one merge-path crossing per tile boundary into scratch memory,
//! then the block merge kernel merges every tile independently.

use crate::dtype::Element;
use crate::error::{Error, Result};
use crate::ops::MergeOps;
use crate::ops::validation::{merged_extent, require_disjoint, require_extent};
use crate::runtime::cpu::kernels::block_merge::{block_merge, block_merge_pairs};
use crate::runtime::cpu::kernels::merge_path::{partition_block, partition_count};
use crate::runtime::cpu::{CpuAllocator, CpuClient, CpuRuntime, CpuStream};
use crate::runtime::{DeviceBuffer, LaunchConfig, RuntimeClient, ScratchBuffer};
use std::sync::Arc;

type PartitionScratch = Arc<ScratchBuffer<CpuAllocator, u64>>;

impl MergeOps<CpuRuntime> for CpuClient {
    fn merge<T, F>(
        &self,
        input1: &DeviceBuffer<CpuRuntime, T>,
        n1: usize,
        input2: &DeviceBuffer<CpuRuntime, T>,
        n2: usize,
        output: &DeviceBuffer<CpuRuntime, T>,
        less: F,
        stream: &CpuStream,
        debug_synchronous: bool,
    ) -> Result<()>
    where
        T: Element,
        F: Fn(&T, &T) -> bool + Send + Sync + 'static,
    {
        let total = merged_extent(n1, n2)?;
        require_extent("input1", input1, n1)?;
        require_extent("input2", input2, n2)?;
        require_extent("output", output, total)?;
        if total == 0 {
            return Ok(());
        }
        require_disjoint(
            "output",
            output.ptr(),
            &[("input1", input1.ptr()), ("input2", input2.ptr())],
        )?;

        let config = self.merge_config::<T>();
        config.merge.validate("block_merge_kernel")?;
        let less = Arc::new(less);

        let partitions = self.partition_into_scratch(
            input1,
            n1,
            input2,
            n2,
            config.tile_size(),
            config.partition,
            Arc::clone(&less),
            stream,
            debug_synchronous,
        )?;

        let first = input1.clone();
        let second = input2.clone();
        let out = output.clone();
        self.launch_kernel(
            stream,
            "block_merge_kernel",
            total,
            config.merge,
            debug_synchronous,
            move |block| {
                // SAFETY: the partition kernel ran earlier on this stream, the
                // inputs were validated for n1 and n2 elements, and the output
                // is a distinct allocation of at least n1 + n2 elements.
                unsafe {
                    block_merge(
                        &block,
                        first.as_slice(n1),
                        second.as_slice(n2),
                        partitions.as_slice(),
                        out.as_mut_ptr(),
                        less.as_ref(),
                    )
                }
            },
        )
    }

    fn merge_pairs<K, V, F>(
        &self,
        keys1: &DeviceBuffer<CpuRuntime, K>,
        values1: &DeviceBuffer<CpuRuntime, V>,
        n1: usize,
        keys2: &DeviceBuffer<CpuRuntime, K>,
        values2: &DeviceBuffer<CpuRuntime, V>,
        n2: usize,
        out_keys: &DeviceBuffer<CpuRuntime, K>,
        out_values: &DeviceBuffer<CpuRuntime, V>,
        less: F,
        stream: &CpuStream,
        debug_synchronous: bool,
    ) -> Result<()>
    where
        K: Element,
        V: Element,
        F: Fn(&K, &K) -> bool + Send + Sync + 'static,
    {
        let total = merged_extent(n1, n2)?;
        require_extent("keys1", keys1, n1)?;
        require_extent("values1", values1, n1)?;
        require_extent("keys2", keys2, n2)?;
        require_extent("values2", values2, n2)?;
        require_extent("out_keys", out_keys, total)?;
        require_extent("out_values", out_values, total)?;
        if total == 0 {
            return Ok(());
        }
        let inputs = [
            ("keys1", keys1.ptr()),
            ("values1", values1.ptr()),
            ("keys2", keys2.ptr()),
            ("values2", values2.ptr()),
        ];
        require_disjoint("out_keys", out_keys.ptr(), &inputs)?;
        require_disjoint("out_values", out_values.ptr(), &inputs)?;
        require_disjoint("out_values", out_values.ptr(), &[("out_keys", out_keys.ptr())])?;

        let config = self.merge_config::<K>();
        config.merge.validate("block_merge_pairs_kernel")?;
        let less = Arc::new(less);

        let partitions = self.partition_into_scratch(
            keys1,
            n1,
            keys2,
            n2,
            config.tile_size(),
            config.partition,
            Arc::clone(&less),
            stream,
            debug_synchronous,
        )?;

        let (k1, v1, k2, v2) = (keys1.clone(), values1.clone(), keys2.clone(), values2.clone());
        let (ok, ov) = (out_keys.clone(), out_values.clone());
        self.launch_kernel(
            stream,
            "block_merge_pairs_kernel",
            total,
            config.merge,
            debug_synchronous,
            move |block| {
                // SAFETY: as for merge; both outputs are distinct allocations.
                unsafe {
                    block_merge_pairs(
                        &block,
                        k1.as_slice(n1),
                        v1.as_slice(n1),
                        k2.as_slice(n2),
                        v2.as_slice(n2),
                        partitions.as_slice(),
                        ok.as_mut_ptr(),
                        ov.as_mut_ptr(),
                        less.as_ref(),
                    )
                }
            },
        )
    }

    fn merge_path_partitions<T, F>(
        &self,
        input1: &DeviceBuffer<CpuRuntime, T>,
        n1: usize,
        input2: &DeviceBuffer<CpuRuntime, T>,
        n2: usize,
        partitions: &DeviceBuffer<CpuRuntime, u64>,
        tile: usize,
        less: F,
        stream: &CpuStream,
        debug_synchronous: bool,
    ) -> Result<()>
    where
        T: Element,
        F: Fn(&T, &T) -> bool + Send + Sync + 'static,
    {
        if tile == 0 {
            return Err(Error::invalid_argument("tile", "tile size must be positive"));
        }
        let total = merged_extent(n1, n2)?;
        require_extent("input1", input1, n1)?;
        require_extent("input2", input2, n2)?;
        if total == 0 {
            return Ok(());
        }
        require_extent("partitions", partitions, partition_count(total, tile))?;
        require_disjoint(
            "partitions",
            partitions.ptr(),
            &[("input1", input1.ptr()), ("input2", input2.ptr())],
        )?;

        let config = self.merge_config::<T>().partition;
        self.launch_partitions(
            input1,
            n1,
            input2,
            n2,
            tile,
            partitions.as_mut_ptr(),
            partitions.clone(),
            config,
            Arc::new(less),
            stream,
            debug_synchronous,
        )
    }
}

impl CpuClient {
    /// Allocate partition scratch and enqueue the partition kernel into it
    #[allow(clippy::too_many_arguments)]
    fn partition_into_scratch<T, F>(
        &self,
        input1: &DeviceBuffer<CpuRuntime, T>,
        n1: usize,
        input2: &DeviceBuffer<CpuRuntime, T>,
        n2: usize,
        tile: usize,
        config: LaunchConfig,
        less: Arc<F>,
        stream: &CpuStream,
        debug_synchronous: bool,
    ) -> Result<PartitionScratch>
    where
        T: Element,
        F: Fn(&T, &T) -> bool + Send + Sync + 'static,
    {
        let count = partition_count(n1 + n2, tile);
        let scratch = Arc::new(ScratchBuffer::new(self.allocator(), count)?);
        self.launch_partitions(
            input1,
            n1,
            input2,
            n2,
            tile,
            scratch.as_mut_ptr(),
            Arc::clone(&scratch),
            config,
            less,
            stream,
            debug_synchronous,
        )?;
        Ok(scratch)
    }

    /// Enqueue the partition kernel writing `partition_count(n1 + n2, tile)`
    /// entries to `dst`
    #[allow(clippy::too_many_arguments)]
    fn launch_partitions<T, F, K>(
        &self,
        input1: &DeviceBuffer<CpuRuntime, T>,
        n1: usize,
        input2: &DeviceBuffer<CpuRuntime, T>,
        n2: usize,
        tile: usize,
        dst: *mut u64,
        keep_alive: K,
        config: LaunchConfig,
        less: Arc<F>,
        stream: &CpuStream,
        debug_synchronous: bool,
    ) -> Result<()>
    where
        T: Element,
        F: Fn(&T, &T) -> bool + Send + Sync + 'static,
        K: Send + Sync + 'static,
    {
        let count = partition_count(n1 + n2, tile);
        let first = input1.clone();
        let second = input2.clone();
        let dst_addr = dst as usize;
        self.launch_kernel(
            stream,
            "merge_path_partition_kernel",
            count,
            config,
            debug_synchronous,
            move |block| {
                let _ = &keep_alive;
                // SAFETY: keep_alive owns dst, which holds `count` entries;
                // blocks write disjoint entries.
                unsafe {
                    partition_block(
                        &block,
                        first.as_slice(n1),
                        second.as_slice(n2),
                        tile,
                        dst_addr as *mut u64,
                        less.as_ref(),
                    )
                }
            },
        )
    }
}
