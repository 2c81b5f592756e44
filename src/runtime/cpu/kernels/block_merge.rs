//! Block-local merge of one tile
//!
//! Block `k` owns output positions `d_k..d_{k+1}` and reads the partition
//! points `i_k = partitions[k]` and `i_{k+1} = partitions[k + 1]`. The
//! slices `first[i_k..i_{k+1}]` and `second[d_k - i_k..d_{k+1} - i_{k+1}]`
//! merged together are exactly that output window, so blocks never look
//! outside their own inputs.

use crate::runtime::BlockContext;

/// Which input an output element came from
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Side {
    First,
    Second,
}

/// Input ranges of one tile
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct TileBounds {
    pub first: std::ops::Range<usize>,
    pub second: std::ops::Range<usize>,
}

impl TileBounds {
    pub(crate) fn of(block: &BlockContext, partitions: &[u64]) -> Self {
        let i0 = partitions[block.block_id] as usize;
        let i1 = partitions[block.block_id + 1] as usize;
        Self {
            first: i0..i1,
            second: block.start - i0..block.end - i1,
        }
    }
}

/// Two-pointer merge of `a` and `b`, reporting each step to `emit`
///
/// `emit` receives the side and the index within that side's slice. Takes
/// `a[i]` unless `less(b[j], a[i])`.
#[inline]
pub(crate) fn merge_walk<T, F, E>(a: &[T], b: &[T], less: &F, mut emit: E)
where
    F: Fn(&T, &T) -> bool,
    E: FnMut(Side, usize),
{
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        if less(&b[j], &a[i]) {
            emit(Side::Second, j);
            j += 1;
        } else {
            emit(Side::First, i);
            i += 1;
        }
    }
    for i in i..a.len() {
        emit(Side::First, i);
    }
    for j in j..b.len() {
        emit(Side::Second, j);
    }
}

/// Load a tile's two input slices into one block-local buffer
///
/// Returns the buffer and the split point between the two slices.
#[inline]
fn load_tile<T: Copy>(first: &[T], second: &[T], bounds: &TileBounds) -> (Vec<T>, usize) {
    let split = bounds.first.len();
    let mut local = Vec::with_capacity(split + bounds.second.len());
    local.extend_from_slice(&first[bounds.first.clone()]);
    local.extend_from_slice(&second[bounds.second.clone()]);
    (local, split)
}

/// Merge one tile of keys
///
/// # Safety
///
/// `output` must be valid for writes of `block.end` elements, must not
/// overlap `first` or `second`, and no other block may write
/// `block.start..block.end`.
pub(crate) unsafe fn block_merge<T, F>(
    block: &BlockContext,
    first: &[T],
    second: &[T],
    partitions: &[u64],
    output: *mut T,
    less: &F,
) where
    T: Copy,
    F: Fn(&T, &T) -> bool,
{
    let bounds = TileBounds::of(block, partitions);
    let (keys, split) = load_tile(first, second, &bounds);
    let (a, b) = keys.split_at(split);

    let mut out = block.start;
    merge_walk(a, b, less, |side, idx| {
        let key = match side {
            Side::First => a[idx],
            Side::Second => b[idx],
        };
        // SAFETY: out < block.end by the tile invariant.
        unsafe { output.add(out).write(key) };
        out += 1;
    });
    debug_assert_eq!(out, block.end);
}

/// Merge one tile of keys and move the associated values identically
///
/// Values never take part in a comparison.
///
/// # Safety
///
/// Same as [`block_merge`], for both `out_keys` and `out_values`.
#[allow(clippy::too_many_arguments)]
pub(crate) unsafe fn block_merge_pairs<K, V, F>(
    block: &BlockContext,
    keys1: &[K],
    values1: &[V],
    keys2: &[K],
    values2: &[V],
    partitions: &[u64],
    out_keys: *mut K,
    out_values: *mut V,
    less: &F,
) where
    K: Copy,
    V: Copy,
    F: Fn(&K, &K) -> bool,
{
    let bounds = TileBounds::of(block, partitions);
    let (keys, split) = load_tile(keys1, keys2, &bounds);
    let (values, _) = load_tile(values1, values2, &bounds);
    let (ka, kb) = keys.split_at(split);
    let (va, vb) = values.split_at(split);

    let mut out = block.start;
    merge_walk(ka, kb, less, |side, idx| {
        let (key, value) = match side {
            Side::First => (ka[idx], va[idx]),
            Side::Second => (kb[idx], vb[idx]),
        };
        // SAFETY: out < block.end by the tile invariant.
        unsafe {
            out_keys.add(out).write(key);
            out_values.add(out).write(value);
        }
        out += 1;
    });
    debug_assert_eq!(out, block.end);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::LaunchConfig;
    use crate::runtime::cpu::kernels::merge_path::{partition_block, partition_count};

    fn lt(a: &i32, b: &i32) -> bool {
        a < b
    }

    fn run_merge(a: &[i32], b: &[i32], tile: u32) -> Vec<i32> {
        let total = a.len() + b.len();
        let count = partition_count(total, tile as usize);
        let mut parts = vec![0u64; count];
        let pgrid = LaunchConfig::new(1, 1).grid("p", count).unwrap();
        for k in 0..pgrid.num_blocks {
            unsafe {
                partition_block(&pgrid.block(k), a, b, tile as usize, parts.as_mut_ptr(), &lt)
            };
        }

        let mut out = vec![0; total];
        let grid = LaunchConfig::new(tile, 1).grid("m", total).unwrap();
        for k in 0..grid.num_blocks {
            unsafe { block_merge(&grid.block(k), a, b, &parts, out.as_mut_ptr(), &lt) };
        }
        out
    }

    #[test]
    fn test_merge_walk_stable() {
        let mut steps = Vec::new();
        merge_walk(&[1, 2], &[2, 3], &lt, |s, i| steps.push((s, i)));
        assert_eq!(
            steps,
            vec![
                (Side::First, 0),
                (Side::First, 1),
                (Side::Second, 0),
                (Side::Second, 1)
            ]
        );
    }

    #[test]
    fn test_merge_across_tiles() {
        let a = [1, 3, 5, 7];
        let b = [2, 2, 6, 8];
        for tile in [1, 2, 3, 5, 8, 16] {
            assert_eq!(run_merge(&a, &b, tile), vec![1, 2, 2, 3, 5, 6, 7, 8], "tile {tile}");
        }
    }

    #[test]
    fn test_tile_bounds_sum_to_tile() {
        let a = [0, 0, 1, 1, 2];
        let b = [0, 1, 1, 3];
        let parts = [0u64, 2, 4, 5];
        let grid = LaunchConfig::new(3, 1).grid("m", 9).unwrap();
        for k in 0..grid.num_blocks {
            let block = grid.block(k);
            let bounds = TileBounds::of(&block, &parts);
            assert_eq!(bounds.clone(), TileBounds::of(&block, &parts));
            assert_eq!(bounds.first.len() + bounds.second.len(), block.valid_items());
            assert!(bounds.second.end <= b.len() && bounds.first.end <= a.len());
        }
    }

    #[test]
    fn test_pairs_follow_keys() {
        let k1 = [1, 3, 5, 7];
        let v1 = [10, 20, 30, 40];
        let k2 = [2, 2, 6, 8];
        let v2 = [100, 200, 300, 400];
        let parts = [0u64, 2, 4];
        let grid = LaunchConfig::new(4, 1).grid("m", 8).unwrap();
        let mut ok = vec![0; 8];
        let mut ov = vec![0; 8];
        for k in 0..grid.num_blocks {
            unsafe {
                block_merge_pairs(
                    &grid.block(k),
                    &k1,
                    &v1,
                    &k2,
                    &v2,
                    &parts,
                    ok.as_mut_ptr(),
                    ov.as_mut_ptr(),
                    &lt,
                )
            };
        }
        assert_eq!(ok, vec![1, 2, 2, 3, 5, 6, 7, 8]);
        assert_eq!(ov, vec![10, 100, 200, 20, 30, 300, 40, 400]);
    }
}
