//! Composite keys made of two components
//!
//! These stand in for user-defined key structs: they are plain-old-data, have
//! no natural total order beyond lexicographic comparison, and are wider than
//! any primitive, which pushes the tuning tables to their smallest tiles.

use super::{DType, Element};
use bytemuck::{Pod, Zeroable};
use std::cmp::Ordering;

/// Two `i32` components compared lexicographically
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
#[repr(C)]
pub struct IntPair {
    /// Primary component
    pub x: i32,
    /// Secondary component, compared only when `x` ties
    pub y: i32,
}

impl IntPair {
    /// Create a new pair
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl PartialOrd for IntPair {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for IntPair {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.x, self.y).cmp(&(other.x, other.y))
    }
}

impl Element for IntPair {
    const DTYPE: DType = DType::IntPair;

    #[inline]
    fn to_f64(self) -> f64 {
        self.x as f64
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        Self::new(v as i32, v as i32)
    }
}

/// Two `f64` components compared lexicographically
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct DoublePair {
    /// Primary component
    pub x: f64,
    /// Secondary component, compared only when `x` ties
    pub y: f64,
}

impl DoublePair {
    /// Create a new pair
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl PartialOrd for DoublePair {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match self.x.partial_cmp(&other.x)? {
            Ordering::Equal => self.y.partial_cmp(&other.y),
            ord => Some(ord),
        }
    }
}

impl Element for DoublePair {
    const DTYPE: DType = DType::DoublePair;

    #[inline]
    fn to_f64(self) -> f64 {
        self.x
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        Self::new(v, v)
    }
}
