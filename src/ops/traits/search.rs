//! Search operations trait.

use crate::dtype::Element;
use crate::error::Result;
use crate::runtime::{DeviceBuffer, Runtime};

/// Device-wide searches
pub trait SearchOps<R: Runtime> {
    /// Find the first run of `count` consecutive matching elements
    ///
    /// Element `x` matches when `predicate(&x, &value)` holds. Writes the
    /// index of the first element of the earliest run to `output[0]`, or
    /// `size` if there is no such run. `count == 0` writes `0`.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `count > size`, if `input` is null or shorter than
    /// `size`, or if `output` is empty.
    ///
    /// # Example
    ///
    /// ```
    /// # use tileprim::prelude::*;
    /// # let device = CpuDevice::new();
    /// # let client = CpuRuntime::default_client(&device);
    /// let input = DeviceBuffer::<CpuRuntime, i16>::from_slice(&[3, 1, 1, 2, 1, 1, 1], &device)?;
    /// let output = DeviceBuffer::<CpuRuntime, u64>::zeros(1, &device)?;
    /// client.search_n(&input, 7, 3, 1, |x: &i16, v: &i16| x == v, &output, client.default_stream(), false)?;
    /// client.synchronize()?;
    /// assert_eq!(output.to_vec(), vec![4]);
    /// # Ok::<(), tileprim::error::Error>(())
    /// ```
    #[allow(clippy::too_many_arguments)]
    fn search_n<T, P>(
        &self,
        input: &DeviceBuffer<R, T>,
        size: usize,
        count: usize,
        value: T,
        predicate: P,
        output: &DeviceBuffer<R, u64>,
        stream: &R::Stream,
        debug_synchronous: bool,
    ) -> Result<()>
    where
        T: Element,
        P: Fn(&T, &T) -> bool + Send + Sync + 'static;
}
