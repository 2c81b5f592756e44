//! Launch driver: tile shape, grid sizing and debug-mode synchronization
//!
//! A kernel is launched as a one-dimensional grid of blocks. Each block owns
//! one tile of `block_size * items_per_thread` consecutive work items and
//! never communicates with other blocks.

use super::{DiagnosticRecord, DiagnosticsSink, Stream};
use crate::error::{Error, Result};
use std::time::Instant;

/// Maximum number of threads in one block
pub const MAX_BLOCK_SIZE: u32 = 1024;

/// Maximum number of blocks in one grid
pub const MAX_GRID_BLOCKS: usize = (1 << 31) - 1;

/// Tile shape of a kernel launch
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct LaunchConfig {
    /// Threads per block
    pub block_size: u32,
    /// Consecutive items each thread processes
    pub items_per_thread: u32,
}

impl LaunchConfig {
    /// Create a launch configuration
    pub const fn new(block_size: u32, items_per_thread: u32) -> Self {
        Self {
            block_size,
            items_per_thread,
        }
    }

    /// Number of items one block processes
    #[inline]
    pub const fn items_per_block(&self) -> usize {
        self.block_size as usize * self.items_per_thread as usize
    }

    /// Check the tile shape against device limits
    pub fn validate(&self, kernel: &'static str) -> Result<()> {
        if self.block_size == 0 || self.block_size > MAX_BLOCK_SIZE {
            return Err(Error::launch_failed(
                kernel,
                format!(
                    "block_size {} outside 1..={}",
                    self.block_size, MAX_BLOCK_SIZE
                ),
            ));
        }
        if self.items_per_thread == 0 {
            return Err(Error::launch_failed(kernel, "items_per_thread is 0"));
        }
        Ok(())
    }

    /// Compute the grid for `size` work items
    ///
    /// `size == 0` yields an empty grid.
    pub fn grid(&self, kernel: &'static str, size: usize) -> Result<GridDim> {
        self.validate(kernel)?;
        let items_per_block = self.items_per_block();
        let num_blocks = size.div_ceil(items_per_block);
        if num_blocks > MAX_GRID_BLOCKS {
            return Err(Error::launch_failed(
                kernel,
                format!("{num_blocks} blocks exceed the grid limit of {MAX_GRID_BLOCKS}"),
            ));
        }
        Ok(GridDim {
            num_blocks,
            block_size: self.block_size,
            items_per_thread: self.items_per_thread,
            size,
        })
    }
}

/// Launch geometry of one kernel
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GridDim {
    /// Number of blocks in the grid
    pub num_blocks: usize,
    /// Threads per block
    pub block_size: u32,
    /// Items per thread
    pub items_per_thread: u32,
    /// Total number of work items
    pub size: usize,
}

impl GridDim {
    /// Items per block
    #[inline]
    pub fn items_per_block(&self) -> usize {
        self.block_size as usize * self.items_per_thread as usize
    }

    /// Context handed to the kernel for block `block_id`
    #[inline]
    pub fn block(&self, block_id: usize) -> BlockContext {
        let items_per_block = self.items_per_block();
        let start = block_id * items_per_block;
        BlockContext {
            block_id,
            block_size: self.block_size,
            items_per_thread: self.items_per_thread,
            start,
            end: (start + items_per_block).min(self.size),
        }
    }
}

/// What one block knows about itself
///
/// `start..end` is the block's slice of the work items; the final block of
/// a grid may be partially filled.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BlockContext {
    /// Index of this block in the grid
    pub block_id: usize,
    /// Threads in this block
    pub block_size: u32,
    /// Items per thread
    pub items_per_thread: u32,
    /// First work item of the block
    pub start: usize,
    /// One past the last valid work item of the block
    pub end: usize,
}

impl BlockContext {
    /// Number of valid items in this block
    #[inline]
    pub fn valid_items(&self) -> usize {
        self.end - self.start
    }

    /// Work-item ranges of each thread of the block, empty ones skipped
    pub fn threads(&self) -> impl Iterator<Item = std::ops::Range<usize>> + '_ {
        let ipt = self.items_per_thread as usize;
        (0..self.block_size as usize)
            .map(move |t| {
                let lo = (self.start + t * ipt).min(self.end);
                lo..(lo + ipt).min(self.end)
            })
            .filter(|r| !r.is_empty())
    }
}

/// Debug-mode epilogue of a launch
///
/// Drains `stream`, then forwards `(name, size, elapsed since start)` to the
/// sink. A fault surfaced by the drain is returned and nothing is recorded.
pub fn sync_and_record<S: Stream>(
    stream: &S,
    sink: &dyn DiagnosticsSink,
    name: &'static str,
    size: usize,
    start: Instant,
) -> Result<()> {
    stream.synchronize()?;
    sink.record(DiagnosticRecord {
        name,
        size,
        elapsed: start.elapsed(),
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Status;

    #[test]
    fn test_grid_sizing() {
        let cfg = LaunchConfig::new(4, 2);
        let grid = cfg.grid("k", 17).unwrap();
        assert_eq!(grid.num_blocks, 3);
        assert_eq!(grid.block(2).valid_items(), 1);
        assert_eq!(cfg.grid("k", 16).unwrap().num_blocks, 2);
        assert_eq!(cfg.grid("k", 0).unwrap().num_blocks, 0);
    }

    #[test]
    fn test_invalid_config_is_launch_error() {
        let err = LaunchConfig::new(0, 4).grid("k", 10).unwrap_err();
        assert_eq!(err.status(), Status::LaunchError);
        let err = LaunchConfig::new(2048, 1).validate("k").unwrap_err();
        assert_eq!(err.status(), Status::LaunchError);
        assert!(LaunchConfig::new(32, 0).validate("k").is_err());
        assert!(LaunchConfig::new(1024, 1).validate("k").is_ok());
    }

    #[test]
    fn test_oversized_grid_rejected() {
        let err = LaunchConfig::new(1, 1).grid("k", MAX_GRID_BLOCKS + 1).unwrap_err();
        assert!(matches!(err, Error::LaunchFailed { kernel: "k", .. }));
    }

    #[test]
    fn test_thread_ranges_cover_partial_block() {
        let grid = LaunchConfig::new(4, 3).grid("k", 20).unwrap();
        let last = grid.block(1);
        assert_eq!((last.start, last.end), (12, 20));
        let ranges: Vec<_> = last.threads().collect();
        assert_eq!(ranges, vec![12..15, 15..18, 18..20]);
    }
}
