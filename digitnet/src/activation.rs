use crate::dtype::DType;
use std::iter::zip;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ActivationFn {
    #[default]
    Sigmoid,
}

impl ActivationFn {
    #[inline]
    pub fn compute<T: DType>(&self, x: T) -> T {
        match self {
            ActivationFn::Sigmoid => T::ONE / (T::ONE + (-x).exp()),
        }
    }

    /// Derivative with respect to the pre-activation value `x`.
    #[inline]
    pub fn derivative<T: DType>(&self, x: T) -> T {
        match self {
            ActivationFn::Sigmoid => {
                let exp = x.exp();
                if exp.is_finite() {
                    let denom = T::ONE + exp;
                    exp / (denom * denom)
                } else {
                    // e^x overflowed, evaluate the mirrored e^-x form instead of inf / inf
                    let exp = (-x).exp();
                    let denom = T::ONE + exp;
                    exp / (denom * denom)
                }
            }
        }
    }

    pub fn compute_slice<T: DType>(&self, activation: &[T], output: &mut [T]) {
        debug_assert_eq!(activation.len(), output.len());
        for (o, &a) in zip(output, activation) {
            *o = self.compute(a);
        }
    }
}
