//! Element type system for tileprim buffers
//!
//! Primitives are generic over their element types, but the set of supported
//! types is closed: every type a kernel can be instantiated with implements
//! [`Element`] and has a [`DType`] tag. Harnesses use the tag to name and
//! register concrete type combinations.

mod element;
mod pair;

pub use element::Element;
pub use pair::{DoublePair, IntPair};

use std::fmt;

// ============================================================================
// DType Enum
// ============================================================================

/// Element types supported by tileprim buffers
///
/// # Discriminant Values
///
/// - Floats: 0-9 (F64=0, F32=1, F16=2)
/// - Signed ints: 10-19 (I64=10, I32=11, I16=12, I8=13)
/// - Unsigned ints: 20-29 (U64=20, U32=21, U16=22, U8=23)
/// - Composite keys: 50-59 (IntPair=50, DoublePair=51)
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
#[repr(u8)]
pub enum DType {
    /// 64-bit floating point
    F64 = 0,
    /// 32-bit floating point
    F32 = 1,
    /// 16-bit floating point (IEEE 754), requires the `f16` feature
    F16 = 2,

    /// 64-bit signed integer
    I64 = 10,
    /// 32-bit signed integer
    I32 = 11,
    /// 16-bit signed integer
    I16 = 12,
    /// 8-bit signed integer
    I8 = 13,

    /// 64-bit unsigned integer
    U64 = 20,
    /// 32-bit unsigned integer
    U32 = 21,
    /// 16-bit unsigned integer
    U16 = 22,
    /// 8-bit unsigned integer
    U8 = 23,

    /// Pair of i32 compared lexicographically
    IntPair = 50,
    /// Pair of f64 compared lexicographically
    DoublePair = 51,
}

impl DType {
    /// Size of one element in bytes
    #[inline]
    pub const fn size_in_bytes(self) -> usize {
        match self {
            Self::DoublePair => 16,
            Self::F64 | Self::I64 | Self::U64 | Self::IntPair => 8,
            Self::F32 | Self::I32 | Self::U32 => 4,
            Self::F16 | Self::I16 | Self::U16 => 2,
            Self::I8 | Self::U8 => 1,
        }
    }

    /// Returns true if this is a floating point type
    #[inline]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::F64 | Self::F32 | Self::F16)
    }

    /// Returns true if this is any integer type (signed or unsigned)
    #[inline]
    pub const fn is_int(self) -> bool {
        matches!(
            self,
            Self::I64
                | Self::I32
                | Self::I16
                | Self::I8
                | Self::U64
                | Self::U32
                | Self::U16
                | Self::U8
        )
    }

    /// Returns true for the composite pair keys
    #[inline]
    pub const fn is_composite(self) -> bool {
        matches!(self, Self::IntPair | Self::DoublePair)
    }

    /// Short name for display (e.g., "f32", "i64")
    pub const fn short_name(self) -> &'static str {
        match self {
            Self::F64 => "f64",
            Self::F32 => "f32",
            Self::F16 => "f16",
            Self::I64 => "i64",
            Self::I32 => "i32",
            Self::I16 => "i16",
            Self::I8 => "i8",
            Self::U64 => "u64",
            Self::U32 => "u32",
            Self::U16 => "u16",
            Self::U8 => "u8",
            Self::IntPair => "int2",
            Self::DoublePair => "double2",
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}
