//! Merge two keyed sequences and print the per-stage diagnostics
//!
//! Run with `RUST_LOG=tileprim=debug cargo run --example merge_pairs` to see
//! the launch geometry and the timing records of every stage.

use tileprim::prelude::*;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tileprim=debug")),
        )
        .init();

    let device = CpuDevice::new();
    let client = CpuRuntime::default_client(&device);

    let keys1 = DeviceBuffer::<CpuRuntime, i32>::from_slice(&[10, 20, 30, 40], &device)?;
    let values1 = DeviceBuffer::<CpuRuntime, i32>::from_slice(&[100, 200, 300, 400], &device)?;
    let keys2 = DeviceBuffer::<CpuRuntime, i32>::from_slice(&[20, 25, 40], &device)?;
    let values2 = DeviceBuffer::<CpuRuntime, i32>::from_slice(&[-20, -25, -40], &device)?;
    let out_keys = DeviceBuffer::<CpuRuntime, i32>::zeros(7, &device)?;
    let out_values = DeviceBuffer::<CpuRuntime, i32>::zeros(7, &device)?;

    let stream = client.create_stream()?;
    client.merge_pairs(
        &keys1,
        &values1,
        4,
        &keys2,
        &values2,
        3,
        &out_keys,
        &out_values,
        |a: &i32, b: &i32| a < b,
        &stream,
        true,
    )?;
    stream.synchronize()?;

    // Ties keep the first input's entry first: (20, 200) before (20, -20).
    for (k, v) in out_keys.try_to_vec()?.iter().zip(out_values.try_to_vec()?) {
        println!("{k:>4} -> {v}");
    }
    Ok(())
}
