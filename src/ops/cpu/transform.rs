//! CPU implementation of transform operations.

use crate::dtype::Element;
use crate::error::Result;
use crate::ops::TransformOps;
use crate::ops::validation::require_extent;
use crate::runtime::LaunchConfig;
use crate::runtime::cpu::kernels::transform::transform_block;
use crate::runtime::cpu::{CpuClient, CpuRuntime, CpuStream};
use crate::runtime::DeviceBuffer;

impl TransformOps<CpuRuntime> for CpuClient {
    fn transform<T, U, F>(
        &self,
        input: &DeviceBuffer<CpuRuntime, T>,
        output: &DeviceBuffer<CpuRuntime, U>,
        size: usize,
        f: F,
        stream: &CpuStream,
        debug_synchronous: bool,
    ) -> Result<()>
    where
        T: Element,
        U: Element,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        require_extent("input", input, size)?;
        require_extent("output", output, size)?;

        let config = self.transform_config::<T>().kernel;
        self.enqueue_transform(
            input.as_ptr(),
            output.as_mut_ptr(),
            size,
            f,
            (input.clone(), output.clone()),
            config,
            stream,
            debug_synchronous,
        )
    }

    fn transform_in_place<T, F>(
        &self,
        buffer: &DeviceBuffer<CpuRuntime, T>,
        size: usize,
        f: F,
        stream: &CpuStream,
        debug_synchronous: bool,
    ) -> Result<()>
    where
        T: Element,
        F: Fn(T) -> T + Send + Sync + 'static,
    {
        require_extent("buffer", buffer, size)?;

        let config = self.transform_config::<T>().kernel;
        self.enqueue_transform(
            buffer.as_ptr(),
            buffer.as_mut_ptr(),
            size,
            f,
            buffer.clone(),
            config,
            stream,
            debug_synchronous,
        )
    }
}

impl CpuClient {
    /// Launch the transform kernel over raw element pointers
    ///
    /// `keep_alive` owns whatever `input` and `output` point into and is
    /// dropped once the kernel has run.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn enqueue_transform<T, U, F, K>(
        &self,
        input: *const T,
        output: *mut U,
        size: usize,
        f: F,
        keep_alive: K,
        config: LaunchConfig,
        stream: &CpuStream,
        debug_synchronous: bool,
    ) -> Result<()>
    where
        T: Element,
        U: Element,
        F: Fn(T) -> U + Send + Sync + 'static,
        K: Send + Sync + 'static,
    {
        let input_addr = input as usize;
        let output_addr = output as usize;
        self.launch_kernel(
            stream,
            "transform_kernel",
            size,
            config,
            debug_synchronous,
            move |block| {
                let _ = &keep_alive;
                // SAFETY: keep_alive holds both allocations, which the caller
                // validated for `size` elements; blocks cover disjoint ranges.
                unsafe {
                    transform_block(&block, input_addr as *const T, output_addr as *mut U, &f)
                };
            },
        )
    }
}
