use std::fmt::{Debug, Display};
use std::str::FromStr;
use num_traits::{Float, NumAssignOps};
use rand::distributions::uniform::SampleUniform;

/// Floating point element type of a network.
pub trait DType:
    'static + Sized + Copy + Debug + Display + FromStr + Float + NumAssignOps + SampleUniform
{
    const ZERO: Self;
    const ONE: Self;
    fn from_f64(val: f64) -> Self;
    fn from_usize(val: usize) -> Self;
    fn as_f64(self) -> f64;
}

macro_rules! impl_dtype {
    ($ty:ty) => {
        impl DType for $ty {
            const ZERO: Self = 0.0;
            const ONE: Self = 1.0;
            #[inline]
            fn from_f64(val: f64) -> Self {
                val as $ty
            }
            #[inline]
            fn from_usize(val: usize) -> Self {
                val as $ty
            }
            #[inline]
            fn as_f64(self) -> f64 {
                self as f64
            }
        }
    };
}

impl_dtype!(f32);
impl_dtype!(f64);
