//! Kernel launches on the CPU backend

use super::client::CpuClient;
use super::stream::CpuStream;
use crate::error::Result;
use crate::runtime::launch::sync_and_record;
use crate::runtime::{BlockContext, LaunchConfig};
use std::time::Instant;

impl CpuClient {
    /// Launch `kernel` over a grid sized for `size` work items
    ///
    /// Validates the tile shape, enqueues one job on `stream` that runs every
    /// block, and returns. With `debug_synchronous` the stream is drained and a
    /// diagnostics record is emitted before returning. `size == 0` enqueues
    /// nothing.
    pub(crate) fn launch_kernel<F>(
        &self,
        stream: &CpuStream,
        name: &'static str,
        size: usize,
        config: LaunchConfig,
        debug_synchronous: bool,
        kernel: F,
    ) -> Result<()>
    where
        F: Fn(BlockContext) + Send + Sync + 'static,
    {
        let grid = config.grid(name, size)?;
        if grid.num_blocks == 0 {
            return Ok(());
        }

        let start = Instant::now();
        if debug_synchronous {
            tracing::debug!(
                kernel = name,
                size,
                num_blocks = grid.num_blocks,
                block_size = grid.block_size,
                items_per_block = grid.items_per_block(),
                "launch"
            );
        }

        let executor = self.executor.clone();
        stream.enqueue(
            name,
            Box::new(move || {
                executor.for_each_block(grid.num_blocks, |block_id| kernel(grid.block(block_id)));
            }),
        )?;

        if debug_synchronous {
            sync_and_record(stream, self.diagnostics.as_ref(), name, size, start)?;
        }
        Ok(())
    }

    /// Minimum number of blocks per rayon task
    pub fn rayon_min_len(&self) -> usize {
        self.parallelism().min_len()
    }
}
