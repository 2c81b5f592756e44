//! Elementwise transform operations trait.

use crate::dtype::Element;
use crate::error::Result;
use crate::runtime::{DeviceBuffer, Runtime};

/// Elementwise transform over a tiled range
pub trait TransformOps<R: Runtime> {
    /// Write `f(input[k])` to `output[k]` for every `k` in `0..size`
    ///
    /// # Arguments
    ///
    /// * `input` - Source buffer, at least `size` elements
    /// * `output` - Destination buffer, at least `size` elements; may be
    ///   `input` itself
    /// * `size` - Number of elements; `0` issues no work and succeeds
    /// * `f` - Unary function applied to each element
    /// * `stream` - Stream the kernel is enqueued on
    /// * `debug_synchronous` - Drain the stream and emit a diagnostics record
    ///   before returning
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a null or too short buffer. `LaunchFailed` if the
    /// kernel cannot be enqueued. In debug mode, `AsyncExecution` if a fault
    /// surfaced while draining.
    ///
    /// # Example
    ///
    /// ```
    /// # use tileprim::prelude::*;
    /// # let device = CpuDevice::new();
    /// # let client = CpuRuntime::default_client(&device);
    /// let input = DeviceBuffer::<CpuRuntime, i32>::from_slice(&[1, 2, 3], &device)?;
    /// let output = DeviceBuffer::<CpuRuntime, f64>::zeros(3, &device)?;
    /// client.transform(&input, &output, 3, |x: i32| x as f64 * 0.5, client.default_stream(), false)?;
    /// client.synchronize()?;
    /// assert_eq!(output.to_vec(), vec![0.5, 1.0, 1.5]);
    /// # Ok::<(), tileprim::error::Error>(())
    /// ```
    fn transform<T, U, F>(
        &self,
        input: &DeviceBuffer<R, T>,
        output: &DeviceBuffer<R, U>,
        size: usize,
        f: F,
        stream: &R::Stream,
        debug_synchronous: bool,
    ) -> Result<()>
    where
        T: Element,
        U: Element,
        F: Fn(T) -> U + Send + Sync + 'static;

    /// Replace `buffer[k]` with `f(buffer[k])` for every `k` in `0..size`
    fn transform_in_place<T, F>(
        &self,
        buffer: &DeviceBuffer<R, T>,
        size: usize,
        f: F,
        stream: &R::Stream,
        debug_synchronous: bool,
    ) -> Result<()>
    where
        T: Element,
        F: Fn(T) -> T + Send + Sync + 'static;
}
