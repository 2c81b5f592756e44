//! search_n kernels
//!
//! Two strategies find the first index at which `count` consecutive
//! elements satisfy the predicate:
//!
//! - **scan**: every thread starts a candidate run at its first item and
//!   follows it, restarting after each mismatch, until the run reaches
//!   `count` or starts past the thread's items. Cheap when `count` is small.
//! - **heads**: the input is cut into groups of `count` elements. A run of
//!   length `count` starting at `h` covers the rest of `h`'s group, so `h`
//!   is the last run head in its group. One kernel records the last head of
//!   every group, a second verifies each recorded head.
//!
//! Both publish candidates with an atomic minimum on a single result slot.

use crate::runtime::BlockContext;
use std::sync::atomic::{AtomicU64, Ordering};

/// Per-thread scan for runs of `count` matches
///
/// A thread reports the first run that starts within its own items. Runs
/// that start later belong to another thread.
pub(crate) fn scan_block<T, P>(
    block: &BlockContext,
    input: &[T],
    count: usize,
    matches: &P,
    result: &AtomicU64,
) where
    P: Fn(&T) -> bool,
{
    let size = input.len();
    for range in block.threads() {
        let thread_start = range.start;
        let mut run_start = thread_start;
        let mut remaining = count;
        let mut i = thread_start;
        while run_start < range.end && run_start + count <= size {
            if matches(&input[i]) {
                remaining -= 1;
                if remaining == 0 {
                    result.fetch_min(run_start as u64, Ordering::Relaxed);
                    break;
                }
            } else {
                remaining = count;
                run_start = i + 1;
            }
            i += 1;
        }
    }
}

/// Record the last run head of each group of `group_size` elements
///
/// `heads[g]` holds `h + 1` for the largest head `h` seen in group `g`, or
/// `0` when the group has no head.
pub(crate) fn find_heads_block<T, P>(
    block: &BlockContext,
    input: &[T],
    group_size: usize,
    matches: &P,
    heads: &[AtomicU64],
) where
    P: Fn(&T) -> bool,
{
    for range in block.threads() {
        for i in range {
            if matches(&input[i]) && (i == 0 || !matches(&input[i - 1])) {
                heads[i / group_size].fetch_max(i as u64 + 1, Ordering::Relaxed);
            }
        }
    }
}

/// Check every recorded head of the block's groups for a full run
pub(crate) fn verify_heads_block<T, P>(
    block: &BlockContext,
    input: &[T],
    count: usize,
    matches: &P,
    heads: &[AtomicU64],
    result: &AtomicU64,
) where
    P: Fn(&T) -> bool,
{
    let size = input.len();
    for range in block.threads() {
        for group in range {
            let encoded = heads[group].load(Ordering::Relaxed);
            if encoded == 0 {
                continue;
            }
            let head = encoded as usize - 1;
            if head + count > size {
                continue;
            }
            // The head itself already matched.
            if input[head + 1..head + count].iter().all(matches) {
                result.fetch_min(head as u64, Ordering::Relaxed);
            }
        }
    }
}
