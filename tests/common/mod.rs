//! Common test utilities
#![allow(dead_code)]

use tileprim::dtype::{DType, Element};
use tileprim::runtime::cpu::{CpuClient, CpuDevice, CpuRuntime};
use tileprim::runtime::{DeviceBuffer, LaunchConfig, MergeConfig, Runtime, SearchNConfig};

/// Create a CPU client and device for testing
pub fn create_cpu_client() -> (CpuClient, CpuDevice) {
    let device = CpuDevice::new();
    let client = CpuRuntime::default_client(&device);
    (client, device)
}

/// Create a CPU client whose merge tiles hold only `tile` elements
///
/// Small tiles force many partitions on small inputs, which is where
/// boundary bugs show up.
pub fn create_small_tile_client(tile: u32) -> (CpuClient, CpuDevice) {
    let (client, device) = create_cpu_client();
    let client = client.with_merge_config(MergeConfig {
        partition: LaunchConfig::new(2, 1),
        merge: LaunchConfig::new(tile, 1),
    });
    (client, device)
}

/// Create a CPU client whose search_n switches to the heads strategy for
/// every `count > threshold`
pub fn create_search_client(threshold: usize) -> (CpuClient, CpuDevice) {
    let (client, device) = create_cpu_client();
    let client = client.with_search_n_config(SearchNConfig {
        kernel: LaunchConfig::new(4, 2),
        threshold,
    });
    (client, device)
}

/// Upload a slice to a new device buffer
pub fn upload<T: Element>(data: &[T], device: &CpuDevice) -> DeviceBuffer<CpuRuntime, T> {
    DeviceBuffer::from_slice(data, device).unwrap()
}

/// Allocate a zeroed device buffer
pub fn zeros<T: Element>(len: usize, device: &CpuDevice) -> DeviceBuffer<CpuRuntime, T> {
    DeviceBuffer::zeros(len, device).unwrap()
}

/// Stable sequential merge used as the reference result
///
/// Takes from `a` unless `less(b[j], a[i])`.
pub fn reference_merge<T: Copy>(a: &[T], b: &[T], less: impl Fn(&T, &T) -> bool) -> Vec<T> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        if less(&b[j], &a[i]) {
            out.push(b[j]);
            j += 1;
        } else {
            out.push(a[i]);
            i += 1;
        }
    }
    out.extend_from_slice(&a[i..]);
    out.extend_from_slice(&b[j..]);
    out
}

/// Key types every merge test runs over
pub fn supported_key_dtypes() -> Vec<DType> {
    let mut dtypes = vec![
        DType::I8,
        DType::U16,
        DType::I32,
        DType::U64,
        DType::F32,
        DType::F64,
        DType::IntPair,
        DType::DoublePair,
    ];
    if cfg!(feature = "f16") {
        dtypes.push(DType::F16);
    }
    dtypes
}

/// Assert two f64 slices are close within tolerance
///
/// Uses the formula: |a - b| <= atol + rtol * |b|
pub fn assert_allclose_f64(a: &[f64], b: &[f64], rtol: f64, atol: f64, msg: &str) {
    assert_eq!(a.len(), b.len(), "{}: length mismatch", msg);
    for (i, (x, y)) in a.iter().zip(b.iter()).enumerate() {
        let diff = (x - y).abs();
        let tol = atol + rtol * y.abs();
        assert!(
            diff <= tol,
            "{}: element {} differs: {} vs {} (diff={}, tol={})",
            msg,
            i,
            x,
            y,
            diff,
            tol
        );
    }
}
