//! Integration tests for merge, merge_pairs and merge_path_partitions

mod common;

use common::{
    create_cpu_client, create_small_tile_client, reference_merge, supported_key_dtypes, upload,
    zeros,
};
use std::sync::Arc;
use tileprim::prelude::*;
use tileprim::runtime::{Allocator, RecordingSink};

fn lt<T: PartialOrd>(a: &T, b: &T) -> bool {
    a < b
}

#[test]
fn test_merge_basic_scenario() {
    let (client, device) = create_cpu_client();
    let a = upload(&[1, 3, 5, 7], &device);
    let b = upload(&[2, 2, 6, 8], &device);
    let out = zeros::<i32>(8, &device);

    client
        .merge(&a, 4, &b, 4, &out, lt::<i32>, client.default_stream(), false)
        .unwrap();
    client.synchronize().unwrap();
    assert_eq!(out.to_vec(), vec![1, 2, 2, 3, 5, 6, 7, 8]);
}

#[test]
fn test_merge_pairs_basic_scenario() {
    let (client, device) = create_cpu_client();
    let k1 = upload(&[1, 3, 5, 7], &device);
    let v1 = upload(&[10i64, 20, 30, 40], &device);
    let k2 = upload(&[2, 2, 6, 8], &device);
    let v2 = upload(&[100i64, 200, 300, 400], &device);
    let ok = zeros::<i32>(8, &device);
    let ov = zeros::<i64>(8, &device);

    client
        .merge_pairs(
            &k1,
            &v1,
            4,
            &k2,
            &v2,
            4,
            &ok,
            &ov,
            lt::<i32>,
            client.default_stream(),
            true,
        )
        .unwrap();
    assert_eq!(ok.to_vec(), vec![1, 2, 2, 3, 5, 6, 7, 8]);
    assert_eq!(ov.to_vec(), vec![10, 100, 200, 20, 30, 300, 40, 400]);
}

#[test]
fn test_merge_scenario_on_every_tile_size() {
    for tile in [1, 2, 3, 4, 7, 8, 64] {
        let (client, device) = create_small_tile_client(tile);
        let a = upload(&[1, 3, 5, 7], &device);
        let b = upload(&[2, 2, 6, 8], &device);
        let out = zeros::<i32>(8, &device);
        client
            .merge(&a, 4, &b, 4, &out, lt::<i32>, client.default_stream(), true)
            .unwrap();
        assert_eq!(out.to_vec(), vec![1, 2, 2, 3, 5, 6, 7, 8], "tile {tile}");
    }
}

fn check_merge_dtype<T: Element>(dtype: DType) {
    let (client, device) = create_small_tile_client(5);
    let a: Vec<T> = (0..37).map(|i| T::from_f64((i * 3 % 50) as f64)).collect();
    let b: Vec<T> = (0..23).map(|i| T::from_f64((i * 7 % 50) as f64)).collect();
    let mut a = a;
    let mut b = b;
    a.sort_by(|x, y| x.partial_cmp(y).unwrap());
    b.sort_by(|x, y| x.partial_cmp(y).unwrap());

    let da = upload(&a, &device);
    let db = upload(&b, &device);
    let out = zeros::<T>(a.len() + b.len(), &device);
    client
        .merge(&da, a.len(), &db, b.len(), &out, T::natural_less, client.default_stream(), false)
        .unwrap();
    client.synchronize().unwrap();
    assert_eq!(out.to_vec(), reference_merge(&a, &b, T::natural_less), "dtype {dtype}");
}

#[test]
fn test_merge_all_key_types() {
    for dtype in supported_key_dtypes() {
        match dtype {
            DType::I8 => check_merge_dtype::<i8>(dtype),
            DType::U16 => check_merge_dtype::<u16>(dtype),
            DType::I32 => check_merge_dtype::<i32>(dtype),
            DType::U64 => check_merge_dtype::<u64>(dtype),
            DType::F32 => check_merge_dtype::<f32>(dtype),
            DType::F64 => check_merge_dtype::<f64>(dtype),
            DType::IntPair => check_merge_dtype::<IntPair>(dtype),
            DType::DoublePair => check_merge_dtype::<DoublePair>(dtype),
            #[cfg(feature = "f16")]
            DType::F16 => check_merge_dtype::<half::f16>(dtype),
            other => panic!("no merge test for {other}"),
        }
    }
}

#[test]
fn test_merge_is_stable() {
    // x is the key, y tags the source: 0 for the first input, 1 for the second.
    let (client, device) = create_small_tile_client(3);
    let a: Vec<IntPair> = [1, 1, 2, 2, 2, 4].iter().map(|&x| IntPair::new(x, 0)).collect();
    let b: Vec<IntPair> = [1, 2, 2, 3, 4, 4].iter().map(|&x| IntPair::new(x, 1)).collect();
    let da = upload(&a, &device);
    let db = upload(&b, &device);
    let out = zeros::<IntPair>(12, &device);

    let by_key = |p: &IntPair, q: &IntPair| p.x < q.x;
    client
        .merge(&da, 6, &db, 6, &out, by_key, client.default_stream(), false)
        .unwrap();
    client.synchronize().unwrap();

    let merged = out.to_vec();
    let tags: Vec<(i32, i32)> = merged.iter().map(|p| (p.x, p.y)).collect();
    assert_eq!(
        tags,
        vec![
            (1, 0),
            (1, 0),
            (1, 1),
            (2, 0),
            (2, 0),
            (2, 0),
            (2, 1),
            (2, 1),
            (3, 1),
            (4, 0),
            (4, 1),
            (4, 1)
        ]
    );
}

#[test]
fn test_merge_with_empty_inputs() {
    let (client, device) = create_cpu_client();
    let a = upload(&[4u8, 5, 9], &device);
    let out = zeros::<u8>(3, &device);
    let empty = DeviceBuffer::<CpuRuntime, u8>::null();

    client
        .merge(&a, 3, &empty, 0, &out, lt::<u8>, client.default_stream(), false)
        .unwrap();
    client.synchronize().unwrap();
    assert_eq!(out.to_vec(), vec![4, 5, 9]);

    let out = zeros::<u8>(3, &device);
    client
        .merge(&empty, 0, &a, 3, &out, lt::<u8>, client.default_stream(), false)
        .unwrap();
    client.synchronize().unwrap();
    assert_eq!(out.to_vec(), vec![4, 5, 9]);

    let nothing = DeviceBuffer::<CpuRuntime, u8>::null();
    let result = client.merge(&empty, 0, &empty, 0, &nothing, lt::<u8>, client.default_stream(), true);
    assert!(Status::of(&result).is_success());
}

#[test]
fn test_merge_honors_extents_not_buffer_lengths() {
    let (client, device) = create_cpu_client();
    let a = upload(&[1, 4, 100, 0], &device);
    let b = upload(&[2, 3, 100], &device);
    let out = upload(&[-1; 6], &device);

    client
        .merge(&a, 2, &b, 2, &out, lt::<i32>, client.default_stream(), false)
        .unwrap();
    client.synchronize().unwrap();
    assert_eq!(out.to_vec(), vec![1, 2, 3, 4, -1, -1]);
}

#[test]
fn test_merge_null_input_is_argument_error() {
    let (client, device) = create_cpu_client();
    let sink = Arc::new(RecordingSink::new());
    let client = client.with_diagnostics(sink.clone());
    let a = upload(&[1, 2], &device);
    let out = zeros::<i32>(4, &device);
    let null = DeviceBuffer::<CpuRuntime, i32>::null();

    let result = client.merge(&a, 2, &null, 2, &out, lt::<i32>, client.default_stream(), true);
    assert_eq!(Status::of(&result), Status::ArgumentError);
    assert!(matches!(result, Err(Error::InvalidArgument { arg: "input2", .. })));
    assert!(sink.records().is_empty());
    assert_eq!(client.allocator().allocated_bytes(), 0);
}

#[test]
fn test_merge_rejects_short_output_and_aliasing() {
    let (client, device) = create_cpu_client();
    let a = upload(&[1, 2], &device);
    let b = upload(&[3, 4], &device);

    let short = zeros::<i32>(3, &device);
    let result = client.merge(&a, 2, &b, 2, &short, lt::<i32>, client.default_stream(), false);
    assert_eq!(Status::of(&result), Status::ArgumentError);

    let big = upload(&[1, 2, 0, 0], &device);
    let result = client.merge(&big, 2, &b, 2, &big, lt::<i32>, client.default_stream(), false);
    assert!(matches!(result, Err(Error::InvalidArgument { arg: "output", .. })));
}

#[test]
fn test_merge_pairs_rejects_value_aliasing() {
    let (client, device) = create_cpu_client();
    let k = upload(&[1, 2], &device);
    let v = upload(&[1, 2], &device);
    let out_k = zeros::<i32>(4, &device);
    let result = client.merge_pairs(
        &k,
        &v,
        2,
        &k,
        &v,
        2,
        &out_k,
        &out_k,
        lt::<i32>,
        client.default_stream(),
        false,
    );
    assert!(matches!(result, Err(Error::InvalidArgument { arg: "out_values", .. })));
}

#[test]
fn test_merge_same_buffer_as_both_inputs() {
    let (client, device) = create_small_tile_client(2);
    let a = upload(&[1, 2, 3], &device);
    let out = zeros::<i32>(6, &device);
    client
        .merge(&a, 3, &a, 3, &out, lt::<i32>, client.default_stream(), false)
        .unwrap();
    client.synchronize().unwrap();
    assert_eq!(out.to_vec(), vec![1, 1, 2, 2, 3, 3]);
}

#[test]
fn test_merge_debug_records_both_stages() {
    let (client, device) = create_small_tile_client(4);
    let sink = Arc::new(RecordingSink::new());
    let client = client.with_diagnostics(sink.clone());
    let a = upload(&[1.0f64, 2.0, 3.0], &device);
    let b = upload(&[1.5f64, 2.5], &device);
    let out = zeros::<f64>(5, &device);

    client
        .merge(&a, 3, &b, 2, &out, lt::<f64>, client.default_stream(), true)
        .unwrap();

    let records = sink.records();
    let names: Vec<_> = records.iter().map(|r| r.name).collect();
    assert_eq!(names, vec!["merge_path_partition_kernel", "block_merge_kernel"]);
    // ceil(5 / 4) + 1 partition points, then 5 merged elements
    assert_eq!(records[0].size, 3);
    assert_eq!(records[1].size, 5);
    assert_eq!(out.to_vec(), vec![1.0, 1.5, 2.0, 2.5, 3.0]);
}

#[test]
fn test_merge_path_partitions_invariant() {
    let (client, device) = create_cpu_client();
    let a = vec![1, 1, 2, 3, 5, 8, 13, 21, 34];
    let b = vec![1, 2, 2, 3, 3, 5, 40];
    let tile = 4;
    let count = (a.len() + b.len()).div_ceil(tile) + 1;

    let da = upload(&a, &device);
    let db = upload(&b, &device);
    let parts = zeros::<u64>(count, &device);
    client
        .merge_path_partitions(
            &da,
            a.len(),
            &db,
            b.len(),
            &parts,
            tile,
            lt::<i32>,
            client.default_stream(),
            false,
        )
        .unwrap();
    client.synchronize().unwrap();

    let parts = parts.to_vec();
    assert_eq!(parts.len(), count);
    assert_eq!(parts[0], 0);
    assert_eq!(*parts.last().unwrap() as usize, a.len());
    for (k, &i) in parts.iter().enumerate() {
        let i = i as usize;
        let d = (k * tile).min(a.len() + b.len());
        let j = d - i;
        assert!(i <= a.len() && j <= b.len(), "diagonal {d}");
        if i > 0 && j < b.len() {
            assert!(a[i - 1] <= b[j], "diagonal {d}: A[i-1] <= B[j]");
        }
        if j > 0 && i < a.len() {
            assert!(b[j - 1] <= a[i], "diagonal {d}: B[j-1] <= A[i]");
        }
    }
    assert!(parts.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn test_merge_path_partitions_rejects_zero_tile() {
    let (client, device) = create_cpu_client();
    let a = upload(&[1], &device);
    let parts = zeros::<u64>(2, &device);
    let result =
        client.merge_path_partitions(&a, 1, &a, 1, &parts, 0, lt::<i32>, client.default_stream(), false);
    assert!(matches!(result, Err(Error::InvalidArgument { arg: "tile", .. })));
}

#[test]
fn test_merge_large_random_like_input() {
    let (client, device) = create_cpu_client();
    let mut a: Vec<u32> = (0..50_000u32).map(|i| i.wrapping_mul(2_654_435_761) % 10_000).collect();
    let mut b: Vec<u32> = (0..30_001u32).map(|i| i.wrapping_mul(40_503) % 10_000).collect();
    a.sort_unstable();
    b.sort_unstable();

    let da = upload(&a, &device);
    let db = upload(&b, &device);
    let out = zeros::<u32>(a.len() + b.len(), &device);
    client
        .merge(&da, a.len(), &db, b.len(), &out, lt::<u32>, client.default_stream(), false)
        .unwrap();
    client.synchronize().unwrap();
    assert_eq!(out.to_vec(), reference_merge(&a, &b, lt::<u32>));
}

#[test]
fn test_merge_scratch_released_after_synchronize() {
    let (client, device) = create_small_tile_client(2);
    let a = upload(&[1u16, 3, 5, 7, 9], &device);
    let b = upload(&[2u16, 4, 6], &device);
    let out = zeros::<u16>(8, &device);
    client
        .merge(&a, 5, &b, 3, &out, lt::<u16>, client.default_stream(), false)
        .unwrap();
    client.synchronize().unwrap();
    assert_eq!(client.allocator().allocated_bytes(), 0);
    assert_eq!(out.to_vec(), vec![1, 2, 3, 4, 5, 6, 7, 9]);
}
