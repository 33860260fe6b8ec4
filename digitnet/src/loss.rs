use crate::dtype::DType;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Loss against a one-hot target built from a class label.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LossFn {
    #[default]
    SquaredError,
}

impl LossFn {
    pub fn compute<T: DType>(&self, output: &[T], label: usize) -> T {
        match self {
            LossFn::SquaredError => {
                let mut cost = T::ZERO;
                for (i, &o) in output.iter().enumerate() {
                    let diff = if i == label { o - T::ONE } else { o };
                    cost += diff * diff;
                }
                cost
            }
        }
    }

    pub fn derivative<T: DType>(&self, output: &[T], label: usize, result: &mut [T]) {
        debug_assert_eq!(output.len(), result.len());
        match self {
            LossFn::SquaredError => {
                let two = T::from_f64(2.0);
                for (i, (r, &o)) in result.iter_mut().zip(output).enumerate() {
                    *r = if i == label { two * (o - T::ONE) } else { two * o };
                }
            }
        }
    }
}
