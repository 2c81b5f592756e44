//! CPU implementation of search operations.

use crate::dtype::Element;
use crate::error::{Error, Result};
use crate::ops::SearchOps;
use crate::ops::validation::require_extent;
use crate::runtime::cpu::kernels::search_n::{find_heads_block, scan_block, verify_heads_block};
use crate::runtime::cpu::{CpuClient, CpuRuntime, CpuStream};
use crate::runtime::{DeviceBuffer, LaunchConfig, RuntimeClient, ScratchBuffer};
use std::sync::Arc;
use std::sync::atomic::Ordering;

impl SearchOps<CpuRuntime> for CpuClient {
    fn search_n<T, P>(
        &self,
        input: &DeviceBuffer<CpuRuntime, T>,
        size: usize,
        count: usize,
        value: T,
        predicate: P,
        output: &DeviceBuffer<CpuRuntime, u64>,
        stream: &CpuStream,
        debug_synchronous: bool,
    ) -> Result<()>
    where
        T: Element,
        P: Fn(&T, &T) -> bool + Send + Sync + 'static,
    {
        if count > size {
            return Err(Error::invalid_argument(
                "count",
                format!("run length {count} exceeds size {size}"),
            ));
        }
        require_extent("input", input, size)?;
        require_extent("output", output, 1)?;

        let config = self.search_n_config::<T>();
        config.kernel.validate("search_n_kernel")?;

        let result = Arc::new(ScratchBuffer::<_, u64>::new(self.allocator(), 1)?);
        let initial = if count == 0 { 0 } else { size as u64 };
        {
            let result = Arc::clone(&result);
            self.launch_kernel(
                stream,
                "search_n_init_kernel",
                1,
                LaunchConfig::new(1, 1),
                debug_synchronous,
                move |_| result.as_atomic()[0].store(initial, Ordering::Relaxed),
            )?;
        }

        if count > 0 {
            let matches = Arc::new(move |x: &T| predicate(x, &value));

            if count <= config.threshold {
                let (data, result, matches) =
                    (input.clone(), Arc::clone(&result), Arc::clone(&matches));
                self.launch_kernel(
                    stream,
                    "search_n_normal_kernel",
                    size,
                    config.kernel,
                    debug_synchronous,
                    move |block| {
                        // SAFETY: validated for `size` elements; read only.
                        let input = unsafe { data.as_slice(size) };
                        scan_block(&block, input, count, matches.as_ref(), &result.as_atomic()[0]);
                    },
                )?;
            } else {
                let groups = size.div_ceil(count);
                let heads = Arc::new(ScratchBuffer::<_, u64>::new(self.allocator(), groups)?);

                {
                    let (data, heads, matches) =
                        (input.clone(), Arc::clone(&heads), Arc::clone(&matches));
                    self.launch_kernel(
                        stream,
                        "search_n_find_heads_kernel",
                        size,
                        config.kernel,
                        debug_synchronous,
                        move |block| {
                            // SAFETY: validated for `size` elements; read only.
                            let input = unsafe { data.as_slice(size) };
                            find_heads_block(&block, input, count, matches.as_ref(), heads.as_atomic());
                        },
                    )?;
                }

                let (data, result) = (input.clone(), Arc::clone(&result));
                self.launch_kernel(
                    stream,
                    "search_n_verify_heads_kernel",
                    groups,
                    config.kernel,
                    debug_synchronous,
                    move |block| {
                        // SAFETY: validated for `size` elements; read only.
                        let input = unsafe { data.as_slice(size) };
                        verify_heads_block(
                            &block,
                            input,
                            count,
                            matches.as_ref(),
                            heads.as_atomic(),
                            &result.as_atomic()[0],
                        );
                    },
                )?;
            }
        }

        let src = result.as_mut_ptr() as *const u64;
        let config = self.transform_config::<u64>().kernel;
        self.enqueue_transform(
            src,
            output.as_mut_ptr(),
            1,
            |x: u64| x,
            (result, output.clone()),
            config,
            stream,
            debug_synchronous,
        )
    }
}
