//! Integration tests for search_n

mod common;

use common::{create_cpu_client, create_search_client, upload, zeros};
use std::sync::Arc;
use tileprim::prelude::*;
use tileprim::runtime::{Allocator, RecordingSink};

fn eq<T: PartialEq>(a: &T, b: &T) -> bool {
    a == b
}

fn reference<T: PartialEq>(input: &[T], count: usize, value: &T) -> u64 {
    if count == 0 {
        return 0;
    }
    input
        .windows(count)
        .position(|w| w.iter().all(|x| x == value))
        .unwrap_or(input.len()) as u64
}

fn run_search(client: &CpuClient, device: &CpuDevice, input: &[i32], count: usize, value: i32) -> u64 {
    let buf = upload(input, device);
    let out = upload(&[u64::MAX], device);
    client
        .search_n(&buf, input.len(), count, value, eq::<i32>, &out, client.default_stream(), false)
        .unwrap();
    client.synchronize().unwrap();
    out.to_vec()[0]
}

#[test]
fn test_search_n_small_count() {
    let (client, device) = create_cpu_client();
    let input = [1, 2, 2, 3, 2, 2, 2, 4];
    assert_eq!(run_search(&client, &device, &input, 1, 2), 1);
    assert_eq!(run_search(&client, &device, &input, 2, 2), 1);
    assert_eq!(run_search(&client, &device, &input, 3, 2), 4);
    assert_eq!(run_search(&client, &device, &input, 4, 2), 8);
    assert_eq!(run_search(&client, &device, &input, 2, 7), 8);
}

#[test]
fn test_search_n_both_strategies_agree() {
    let input: Vec<i32> = (0..5_000).map(|i| ((i * 31 + i / 97) % 11 < 8) as i32).collect();
    for threshold in [0, 4, 1_000] {
        let (client, device) = create_search_client(threshold);
        for count in [1, 2, 3, 5, 8, 13, 21] {
            assert_eq!(
                run_search(&client, &device, &input, count, 1),
                reference(&input, count, &1),
                "threshold {threshold}, count {count}"
            );
        }
    }
}

#[test]
fn test_search_n_long_runs_use_heads() {
    let (client, device) = create_search_client(2);
    let mut input = vec![0i32; 300];
    input[40..45].fill(9);
    input[100..160].fill(9);
    input[250..300].fill(9);
    assert_eq!(run_search(&client, &device, &input, 5, 9), 40);
    assert_eq!(run_search(&client, &device, &input, 6, 9), 100);
    assert_eq!(run_search(&client, &device, &input, 60, 9), 100);
    assert_eq!(run_search(&client, &device, &input, 50, 9), 100);
    assert_eq!(run_search(&client, &device, &input, 61, 9), 300);
    assert_eq!(run_search(&client, &device, &input, 300, 9), 300);
}

#[test]
fn test_search_n_count_zero_returns_begin() {
    let (client, device) = create_cpu_client();
    assert_eq!(run_search(&client, &device, &[5, 6], 0, 1), 0);

    let out = upload(&[u64::MAX], &device);
    let empty = DeviceBuffer::<CpuRuntime, i32>::null();
    client
        .search_n(&empty, 0, 0, 0, eq::<i32>, &out, client.default_stream(), true)
        .unwrap();
    assert_eq!(out.to_vec(), vec![0]);
}

#[test]
fn test_search_n_count_larger_than_size() {
    let (client, device) = create_cpu_client();
    let input = upload(&[1, 1], &device);
    let out = zeros::<u64>(1, &device);
    let result = client.search_n(&input, 2, 3, 1, eq::<i32>, &out, client.default_stream(), false);
    assert_eq!(Status::of(&result), Status::ArgumentError);
    assert!(matches!(result, Err(Error::InvalidArgument { arg: "count", .. })));
}

#[test]
fn test_search_n_missing_output() {
    let (client, device) = create_cpu_client();
    let input = upload(&[1, 1], &device);
    let out = DeviceBuffer::<CpuRuntime, u64>::null();
    let result = client.search_n(&input, 2, 1, 1, eq::<i32>, &out, client.default_stream(), false);
    assert!(matches!(result, Err(Error::InvalidArgument { arg: "output", .. })));
}

#[test]
fn test_search_n_custom_predicate() {
    let (client, device) = create_cpu_client();
    let input = upload(&[0.5f32, 3.0, 4.0, 0.1, 5.0, 6.0, 7.0], &device);
    let out = zeros::<u64>(1, &device);
    // Three consecutive elements strictly greater than the value
    client
        .search_n(
            &input,
            7,
            3,
            2.5f32,
            |x: &f32, v: &f32| x > v,
            &out,
            client.default_stream(),
            false,
        )
        .unwrap();
    client.synchronize().unwrap();
    assert_eq!(out.to_vec(), vec![4]);
}

#[test]
fn test_search_n_debug_stages_and_scratch() {
    let (client, device) = create_search_client(2);
    let sink = Arc::new(RecordingSink::new());
    let client = client.with_diagnostics(sink.clone());
    let input = upload(&[3u8, 3, 3, 3, 1, 3, 3, 3, 3, 3], &device);
    let out = zeros::<u64>(1, &device);

    client
        .search_n(&input, 10, 5, 3u8, eq::<u8>, &out, client.default_stream(), true)
        .unwrap();
    assert_eq!(out.to_vec(), vec![5]);
    assert_eq!(
        sink.names(),
        vec![
            "search_n_init_kernel",
            "search_n_find_heads_kernel",
            "search_n_verify_heads_kernel",
            "transform_kernel"
        ]
    );
    assert_eq!(client.allocator().allocated_bytes(), 0);

    sink.take();
    client
        .search_n(&input, 10, 2, 3u8, eq::<u8>, &out, client.default_stream(), true)
        .unwrap();
    assert_eq!(out.to_vec(), vec![0]);
    assert_eq!(
        sink.names(),
        vec!["search_n_init_kernel", "search_n_normal_kernel", "transform_kernel"]
    );
}
