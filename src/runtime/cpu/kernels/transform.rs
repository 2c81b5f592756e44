//! Elementwise transform kernel

use crate::runtime::BlockContext;

/// Apply `f` to every item of the block
///
/// Each element is read once and then written once at the same index, so
/// `input` and `output` may point at the same allocation when `T` and `U`
/// have the same size.
///
/// # Safety
///
/// `input` must be valid for reads and `output` for writes of `block.end`
/// elements, and no other block may touch `block.start..block.end`.
#[inline]
pub(crate) unsafe fn transform_block<T, U, F>(
    block: &BlockContext,
    input: *const T,
    output: *mut U,
    f: &F,
) where
    T: Copy,
    F: Fn(T) -> U,
{
    for range in block.threads() {
        for i in range {
            // SAFETY: i < block.end, guaranteed in bounds by the caller.
            unsafe {
                let value = input.add(i).read();
                output.add(i).write(f(value));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::LaunchConfig;

    #[test]
    fn test_transform_partial_block() {
        let input: Vec<i32> = (0..10).collect();
        let mut output = vec![0i64; 10];
        let grid = LaunchConfig::new(2, 2).grid("t", 10).unwrap();
        for b in 0..grid.num_blocks {
            unsafe {
                transform_block(&grid.block(b), input.as_ptr(), output.as_mut_ptr(), &|x: i32| {
                    x as i64 * 3
                });
            }
        }
        assert_eq!(output, (0..10).map(|x| x * 3).collect::<Vec<i64>>());
    }

    #[test]
    fn test_transform_in_place() {
        let mut data = vec![1u8, 2, 3, 4, 5];
        let ptr = data.as_mut_ptr();
        let grid = LaunchConfig::new(4, 1).grid("t", 5).unwrap();
        for b in 0..grid.num_blocks {
            unsafe { transform_block(&grid.block(b), ptr as *const u8, ptr, &|x: u8| x * 2) };
        }
        assert_eq!(data, vec![2, 4, 6, 8, 10]);
    }
}
