//! Numeric type shared by edge weights and tentative distances.
//!
//! The solvers are generic over [`Distance`]; the binary picks `u32` or `f32`
//! at build time (`float` feature).

use std::fmt::{Debug, Display};
use std::ops::Add;
use std::str::FromStr;

use serde::Serialize;

use crate::atomic::Atomic;

pub trait Distance:
    Atomic + PartialOrd + Add<Output = Self> + Debug + Display + FromStr + Serialize + Default
{
    const ZERO: Self;
    /// Sentinel for unreached nodes (`DIST_MAX`).
    const MAX: Self;
    const IS_FLOAT: bool;

    /// `self + w`, saturating at `MAX` for integer types.
    fn relax(self, w: Self) -> Self;
    /// `floor(self / delta)`, saturating at `usize::MAX`.
    fn bucket(self, delta: Self) -> usize;
    fn from_u64(v: u64) -> Self;
    fn to_f64(self) -> f64;
    /// Whether `self` can be used as a bucket width.
    fn is_valid_step(self) -> bool;
    /// Equality used when comparing against the serial reference.
    fn approx_eq(self, other: Self) -> bool;

    /// Width of the little-endian on-disk encoding.
    const BYTES: usize;
    fn write_le(self, out: &mut Vec<u8>);
    /// Decodes exactly `BYTES` bytes.
    fn read_le(bytes: &[u8]) -> Self;

    #[inline]
    fn is_reached(self) -> bool {
        self != Self::MAX
    }

    fn parse_param(s: &str) -> Option<Self> {
        s.trim().parse().ok()
    }
}

macro_rules! impl_distance_int {
    ($($t:ty),*) => {$(
        impl Distance for $t {
            const ZERO: Self = 0;
            const MAX: Self = <$t>::MAX;
            const IS_FLOAT: bool = false;
            const BYTES: usize = std::mem::size_of::<$t>();

            #[inline] fn write_le(self, out: &mut Vec<u8>) { out.extend_from_slice(&self.to_le_bytes()) }
            #[inline]
            fn read_le(bytes: &[u8]) -> Self {
                let mut buf = [0u8; std::mem::size_of::<$t>()];
                buf.copy_from_slice(bytes);
                <$t>::from_le_bytes(buf)
            }

            #[inline] fn relax(self, w: Self) -> Self { self.saturating_add(w) }
            #[inline] fn bucket(self, delta: Self) -> usize { usize::try_from(self / delta).unwrap_or(usize::MAX) }
            #[inline] fn from_u64(v: u64) -> Self { <$t>::try_from(v).unwrap_or(<$t>::MAX) }
            #[inline] fn to_f64(self) -> f64 { self as f64 }
            #[inline] fn is_valid_step(self) -> bool { self > 0 }
            #[inline] fn approx_eq(self, other: Self) -> bool { self == other }
        }
    )*};
}

impl_distance_int!(u32, u64);

macro_rules! impl_distance_float {
    ($($t:ty),*) => {$(
        impl Distance for $t {
            const ZERO: Self = 0.0;
            const MAX: Self = <$t>::MAX;
            const IS_FLOAT: bool = true;
            const BYTES: usize = std::mem::size_of::<$t>();

            #[inline] fn write_le(self, out: &mut Vec<u8>) { out.extend_from_slice(&self.to_le_bytes()) }
            #[inline]
            fn read_le(bytes: &[u8]) -> Self {
                let mut buf = [0u8; std::mem::size_of::<$t>()];
                buf.copy_from_slice(bytes);
                <$t>::from_le_bytes(buf)
            }

            #[inline] fn relax(self, w: Self) -> Self { self + w }
            // `as` saturates for floats, which is what we want for huge quotients.
            #[inline] fn bucket(self, delta: Self) -> usize { (self / delta) as usize }
            #[inline] fn from_u64(v: u64) -> Self { v as $t }
            #[inline] fn to_f64(self) -> f64 { self as f64 }
            #[inline] fn is_valid_step(self) -> bool { self > 0.0 && self.is_finite() }
            #[inline]
            fn approx_eq(self, other: Self) -> bool {
                if self == other {
                    return true;
                }
                if !self.is_reached() || !other.is_reached() {
                    return false;
                }
                let scale = self.abs().max(other.abs()).max(1.0);
                (self - other).abs() <= 1e-6 * scale
            }
        }
    )*};
}

impl_distance_float!(f32, f64);
