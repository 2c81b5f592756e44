//! CPU client and allocator implementation

use super::device::CpuDevice;
use super::runtime::CpuRuntime;
use super::stream::CpuStream;
use crate::error::Result;
use crate::runtime::{
    DefaultAllocator, DiagnosticsSink, MergeConfig, ParallelismConfig, RuntimeClient,
    SearchNConfig, TracingSink, TransformConfig,
};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// CPU client for operation dispatch
///
/// Owns the default stream, the scratch allocator, the block thread pool,
/// per-algorithm tuning overrides and the diagnostics sink. Cloning is cheap
/// and clones share all of these.
#[derive(Clone)]
pub struct CpuClient {
    pub(crate) device: CpuDevice,
    allocator: CpuAllocator,
    default_stream: CpuStream,
    next_stream_id: Arc<AtomicUsize>,
    pub(crate) executor: BlockExecutor,
    parallelism: ParallelismConfig,
    transform_config: Option<TransformConfig>,
    merge_config: Option<MergeConfig>,
    search_n_config: Option<SearchNConfig>,
    pub(crate) diagnostics: Arc<dyn DiagnosticsSink>,
}

impl CpuClient {
    /// Create a new CPU client
    ///
    /// Spawns the worker thread of the default stream.
    pub fn new(device: CpuDevice) -> Result<Self> {
        let allocator = create_cpu_allocator(device.clone());
        let default_stream = CpuStream::new(0)?;
        let parallelism = ParallelismConfig::default();
        Ok(Self {
            device,
            allocator,
            default_stream,
            next_stream_id: Arc::new(AtomicUsize::new(1)),
            executor: BlockExecutor::new(&parallelism),
            parallelism,
            transform_config: None,
            merge_config: None,
            search_n_config: None,
            diagnostics: Arc::new(TracingSink),
        })
    }

    /// Run grid blocks on a dedicated pool or with a different task grain
    pub fn with_parallelism(mut self, config: ParallelismConfig) -> Self {
        self.executor = BlockExecutor::new(&config);
        self.parallelism = config;
        self
    }

    /// Replace the sink that receives debug-synchronous timing records
    pub fn with_diagnostics(mut self, sink: Arc<dyn DiagnosticsSink>) -> Self {
        self.diagnostics = sink;
        self
    }

    /// Override the transform tile shape for every element type
    pub fn with_transform_config(mut self, config: TransformConfig) -> Self {
        self.transform_config = Some(config);
        self
    }

    /// Override the merge tile shapes for every key type
    pub fn with_merge_config(mut self, config: MergeConfig) -> Self {
        self.merge_config = Some(config);
        self
    }

    /// Override the search_n tile shape and threshold for every element type
    pub fn with_search_n_config(mut self, config: SearchNConfig) -> Self {
        self.search_n_config = Some(config);
        self
    }

    /// Current parallelism configuration
    pub fn parallelism(&self) -> &ParallelismConfig {
        &self.parallelism
    }

    /// Transform tile shape used for elements of type `T`
    pub fn transform_config<T>(&self) -> TransformConfig {
        self.transform_config
            .unwrap_or_else(TransformConfig::for_type::<T>)
    }

    /// Merge tile shapes used for keys of type `K`
    pub fn merge_config<K>(&self) -> MergeConfig {
        self.merge_config.unwrap_or_else(MergeConfig::for_type::<K>)
    }

    /// search_n configuration used for elements of type `T`
    pub fn search_n_config<T>(&self) -> SearchNConfig {
        self.search_n_config
            .unwrap_or_else(SearchNConfig::for_type::<T>)
    }
}

impl RuntimeClient<CpuRuntime> for CpuClient {
    fn device(&self) -> &CpuDevice {
        &self.device
    }

    fn default_stream(&self) -> &CpuStream {
        &self.default_stream
    }

    fn create_stream(&self) -> Result<CpuStream> {
        CpuStream::new(self.next_stream_id.fetch_add(1, Ordering::Relaxed))
    }

    fn synchronize(&self) -> Result<()> {
        use crate::runtime::Stream;
        self.default_stream.synchronize()
    }

    fn allocator(&self) -> &CpuAllocator {
        &self.allocator
    }

    fn diagnostics(&self) -> &Arc<dyn DiagnosticsSink> {
        &self.diagnostics
    }
}

impl fmt::Debug for CpuClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CpuClient")
            .field("device", &self.device)
            .field("default_stream", &self.default_stream)
            .field("parallelism", &self.parallelism)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Block execution
// ============================================================================

/// Runs the blocks of one grid
///
/// Captured by launched jobs in place of the whole client, so queued work
/// never keeps a stream alive.
#[derive(Clone)]
pub(crate) struct BlockExecutor {
    #[cfg(feature = "rayon")]
    pool: Option<Arc<rayon::ThreadPool>>,
    #[cfg_attr(not(feature = "rayon"), allow(dead_code))]
    min_len: usize,
}

impl BlockExecutor {
    #[cfg_attr(not(feature = "rayon"), allow(unused_variables))]
    fn new(config: &ParallelismConfig) -> Self {
        Self {
            #[cfg(feature = "rayon")]
            pool: config.build_pool(),
            min_len: config.min_len(),
        }
    }

    /// Run `kernel` once for every block in `0..num_blocks`
    ///
    /// A panic in any block propagates to the caller after the grid stops.
    pub(crate) fn for_each_block<F>(&self, num_blocks: usize, kernel: F)
    where
        F: Fn(usize) + Send + Sync,
    {
        #[cfg(feature = "rayon")]
        {
            use rayon::prelude::*;

            let min_len = self.min_len;
            let run = || {
                (0..num_blocks)
                    .into_par_iter()
                    .with_min_len(min_len)
                    .for_each(&kernel);
            };
            match &self.pool {
                Some(pool) => pool.install(run),
                None => run(),
            }
        }

        #[cfg(not(feature = "rayon"))]
        for block_id in 0..num_blocks {
            kernel(block_id);
        }
    }
}

/// CPU-specific allocator type alias
pub type CpuAllocator = DefaultAllocator<CpuDevice>;

/// Create a CPU allocator for the given device
fn create_cpu_allocator(device: CpuDevice) -> CpuAllocator {
    DefaultAllocator::new(
        device,
        |size, _dev| CpuRuntime::heap_allocate(size),
        |ptr, size, _dev| CpuRuntime::heap_deallocate(ptr, size),
    )
}
