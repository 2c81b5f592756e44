//! Merge-path partitioning
//!
//! The merge of two sorted sequences `first` (length `n1`) and `second`
//! (length `n2`) is a monotonic staircase through the `n1 x n2` grid. Every
//! diagonal `d = i + j` crosses that path exactly once; the crossing point
//! splits the output into `d` elements taken from `first[..i]` and
//! `second[..j]`, and the rest.
//!
//! Ties are broken towards `first`: `first[i]` is emitted before `second[j]`
//! unless `less(second[j], first[i])`. The search below uses exactly the
//! same predicate, so a tile boundary never splits a run of equal keys in a
//! way that would reorder it.

use crate::runtime::BlockContext;

/// Locate the merge path on diagonal `diag`
///
/// Returns the smallest `i` in `[max(0, diag - n2), min(diag, n1)]` such
/// that `less(second[diag - i - 1], first[i])`, where `first[n1]` counts as
/// `+inf` and `second[-1]` as `-inf`. The crossing point is
/// `(i, diag - i)`.
///
/// `diag` must not exceed `first.len() + second.len()`.
pub fn merge_path_search<T, F>(first: &[T], second: &[T], diag: usize, less: &F) -> usize
where
    F: Fn(&T, &T) -> bool,
{
    let mut lo = diag.saturating_sub(second.len());
    let mut hi = diag.min(first.len());

    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        // mid < min(diag, n1) and mid >= diag - n2 keep both reads in range.
        if less(&second[diag - 1 - mid], &first[mid]) {
            hi = mid;
        } else {
            lo = mid + 1;
        }
    }
    lo
}

/// Number of partition points for `total` output elements and tile `tile`
#[inline]
pub fn partition_count(total: usize, tile: usize) -> usize {
    total.div_ceil(tile) + 1
}

/// Compute the partition points owned by one block of the partition kernel
///
/// Work item `k` resolves diagonal `min(k * tile, n1 + n2)` and stores its
/// `i` coordinate in `partitions[k]`.
///
/// # Safety
///
/// `partitions` must be valid for writes of `block.end` elements and no
/// other block may write `block.start..block.end`.
pub(crate) unsafe fn partition_block<T, F>(
    block: &BlockContext,
    first: &[T],
    second: &[T],
    tile: usize,
    partitions: *mut u64,
    less: &F,
) where
    F: Fn(&T, &T) -> bool,
{
    let total = first.len() + second.len();
    for range in block.threads() {
        for k in range {
            let diag = k.saturating_mul(tile).min(total);
            let i = merge_path_search(first, second, diag, less);
            // SAFETY: k < block.end, in bounds by the caller's contract.
            unsafe { partitions.add(k).write(i as u64) };
        }
    }
}
