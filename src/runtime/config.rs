//! Tuning configuration
//!
//! Each algorithm has a tile shape that depends on the element type: small
//! elements get more items per thread so that a tile stays roughly the same
//! number of bytes. Clients carry an override per algorithm; when no
//! override is set the type-derived default is used.

use super::LaunchConfig;
#[cfg(feature = "rayon")]
use std::sync::Arc;

/// Default threads per block for every algorithm
pub const DEFAULT_BLOCK_SIZE: u32 = 256;

/// Items per thread for an element of `elem_size` bytes
const fn items_per_thread_for(elem_size: usize) -> u32 {
    match elem_size {
        0..=2 => 16,
        3..=4 => 8,
        5..=8 => 4,
        _ => 2,
    }
}

/// Tile shape of the transform kernel
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TransformConfig {
    /// Launch shape of the transform kernel
    pub kernel: LaunchConfig,
}

impl TransformConfig {
    /// Default shape for transforming elements of type `T`
    pub const fn for_type<T>() -> Self {
        Self {
            kernel: LaunchConfig::new(
                DEFAULT_BLOCK_SIZE,
                items_per_thread_for(std::mem::size_of::<T>()),
            ),
        }
    }
}

/// Tile shapes of the two merge stages
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MergeConfig {
    /// Launch shape of the partition kernel: one work item per tile boundary
    pub partition: LaunchConfig,
    /// Launch shape of the block merge kernel; its tile is the merge tile
    pub merge: LaunchConfig,
}

impl MergeConfig {
    /// Default shapes for merging keys of type `K`
    pub const fn for_type<K>() -> Self {
        Self {
            partition: LaunchConfig::new(128, 1),
            merge: LaunchConfig::new(
                DEFAULT_BLOCK_SIZE,
                items_per_thread_for(std::mem::size_of::<K>()),
            ),
        }
    }

    /// Number of output elements each merge block produces
    #[inline]
    pub const fn tile_size(&self) -> usize {
        self.merge.items_per_block()
    }
}

/// Tile shape and strategy threshold of search_n
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SearchNConfig {
    /// Launch shape of the scanning kernels
    pub kernel: LaunchConfig,
    /// Largest `count` handled by the per-thread scan; longer runs use the
    /// group-heads strategy
    pub threshold: usize,
}

impl SearchNConfig {
    /// Default shape for searching elements of type `T`
    pub const fn for_type<T>() -> Self {
        Self {
            kernel: LaunchConfig::new(
                DEFAULT_BLOCK_SIZE,
                items_per_thread_for(std::mem::size_of::<T>()),
            ),
            threshold: 8,
        }
    }
}

/// Parallelism configuration for CPU kernels
///
/// Controls the rayon pool that runs the blocks of a grid and the minimum
/// number of blocks each rayon task takes.
#[derive(Clone, Debug, Default)]
pub struct ParallelismConfig {
    /// Worker threads; `None` uses rayon's global pool
    pub num_threads: Option<usize>,
    /// Minimum blocks per rayon task; `None` means 1
    pub min_len: Option<usize>,
}

impl ParallelismConfig {
    /// Create a parallelism configuration
    pub fn new(num_threads: Option<usize>, min_len: Option<usize>) -> Self {
        Self {
            num_threads,
            min_len,
        }
    }

    /// Minimum blocks per rayon task
    #[inline]
    pub fn min_len(&self) -> usize {
        self.min_len.unwrap_or(1).max(1)
    }

    /// Build a dedicated pool when a thread count is set
    ///
    /// Falls back to the global pool (returns `None`) if the pool cannot be
    /// built.
    #[cfg(feature = "rayon")]
    pub(crate) fn build_pool(&self) -> Option<Arc<rayon::ThreadPool>> {
        let threads = self.num_threads?;
        match rayon::ThreadPoolBuilder::new()
            .num_threads(threads.max(1))
            .thread_name(|i| format!("tileprim-block-{i}"))
            .build()
        {
            Ok(pool) => Some(Arc::new(pool)),
            Err(e) => {
                tracing::warn!(threads, error = %e, "failed to build rayon pool, using global pool");
                None
            }
        }
    }
}
