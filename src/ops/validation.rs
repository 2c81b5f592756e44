//! Argument validation shared by all backends
//!
//! Every check here runs before any work is enqueued, so a failing call has
//! no partial effects.

use crate::dtype::Element;
use crate::error::{Error, Result};
use crate::runtime::{DeviceBuffer, Runtime};

/// Require `buffer` to hold at least `extent` elements
///
/// A null buffer is accepted only when `extent == 0`.
pub(crate) fn require_extent<R: Runtime, T: Element>(
    arg: &'static str,
    buffer: &DeviceBuffer<R, T>,
    extent: usize,
) -> Result<()> {
    if extent == 0 {
        return Ok(());
    }
    if buffer.is_null() {
        return Err(Error::invalid_argument(
            arg,
            format!("null buffer where {extent} elements are required"),
        ));
    }
    if buffer.len() < extent {
        return Err(Error::invalid_argument(
            arg,
            format!("buffer holds {} elements, {extent} required", buffer.len()),
        ));
    }
    Ok(())
}

/// Require an output handle to differ from every input handle
pub(crate) fn require_disjoint(
    out_arg: &'static str,
    out: u64,
    inputs: &[(&'static str, u64)],
) -> Result<()> {
    if out == 0 {
        return Ok(());
    }
    match inputs.iter().find(|(_, ptr)| *ptr == out) {
        Some((name, _)) => Err(Error::invalid_argument(
            out_arg,
            format!("shares storage with '{name}'"),
        )),
        None => Ok(()),
    }
}

/// Length of the merged output
pub(crate) fn merged_extent(n1: usize, n2: usize) -> Result<usize> {
    n1.checked_add(n2)
        .ok_or_else(|| Error::invalid_argument("n2", "n1 + n2 overflows usize"))
}
