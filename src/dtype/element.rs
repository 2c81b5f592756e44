//! Element trait for mapping Rust types to DType

use super::DType;
use bytemuck::{Pod, Zeroable};
use std::fmt::Debug;

/// Trait for types that can be stored in a [`DeviceBuffer`](crate::runtime::DeviceBuffer)
///
/// This trait connects Rust's type system to tileprim's closed set of
/// registered element types.
///
/// # Bounds
/// - `Copy + Send + Sync + 'static` - kernels move elements between blocks and threads
/// - `Pod + Zeroable` - buffers are zero-initialized device memory
/// - `PartialOrd` - natural order used by [`Element::natural_less`]
///
/// Merge comparators are always supplied by the caller; the natural order is
/// only a convenience.
pub trait Element: Copy + Send + Sync + Pod + Zeroable + Debug + PartialOrd + 'static {
    /// The corresponding DType for this Rust type
    const DTYPE: DType;

    /// Convert to f64 (lossy for 64-bit integers and composite keys)
    ///
    /// Composite keys return their first component.
    fn to_f64(self) -> f64;

    /// Convert from f64 to this type
    ///
    /// Composite keys set every component to the converted value.
    fn from_f64(v: f64) -> Self;

    /// Strict "less than" under the type's natural order
    #[inline]
    fn natural_less(a: &Self, b: &Self) -> bool {
        a < b
    }
}

macro_rules! impl_primitive_element {
    ($($ty:ty => $dtype:ident),* $(,)?) => {
        $(
            impl Element for $ty {
                const DTYPE: DType = DType::$dtype;

                #[inline]
                fn to_f64(self) -> f64 {
                    self as f64
                }

                #[inline]
                fn from_f64(v: f64) -> Self {
                    v as $ty
                }
            }
        )*
    };
}

impl_primitive_element! {
    f64 => F64,
    f32 => F32,
    i64 => I64,
    i32 => I32,
    i16 => I16,
    i8 => I8,
    u64 => U64,
    u32 => U32,
    u16 => U16,
    u8 => U8,
}

// Half-precision floating point (requires "f16" feature)
#[cfg(feature = "f16")]
impl Element for half::f16 {
    const DTYPE: DType = DType::F16;

    #[inline]
    fn to_f64(self) -> f64 {
        half::f16::to_f64(self)
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        half::f16::from_f64(v)
    }
}
