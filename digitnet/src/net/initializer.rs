use crate::dtype::DType;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Uniform};

/// Source of the initial parameters of a network.
///
/// Weights are returned row-major, one row of `input_size` values per neuron.
/// Building a network fails with [`Error::InvalidParameters`] when a returned
/// vector has the wrong length.
///
/// [`Error::InvalidParameters`]: crate::error::Error::InvalidParameters
pub trait NetInitializer<T: DType> {
    fn get_weights(&mut self, layer_idx: usize, input_size: usize, output_size: usize) -> Vec<T>;
    fn get_biases(&mut self, layer_idx: usize, size: usize) -> Vec<T>;
}

pub const INIT_RANGE: f64 = 0.5;

pub struct RandomNetInitializer {
    rng: StdRng,
}

impl RandomNetInitializer {
    pub fn seed_from_u64(seed: u64) -> Self {
        RandomNetInitializer {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_rng(rng: StdRng) -> Self {
        RandomNetInitializer { rng }
    }

    fn sample<T: DType>(&mut self, len: usize) -> Vec<T> {
        let dist = Uniform::new_inclusive(T::from_f64(-INIT_RANGE), T::from_f64(INIT_RANGE));
        dist.sample_iter(&mut self.rng).take(len).collect()
    }
}

impl Default for RandomNetInitializer {
    fn default() -> Self {
        RandomNetInitializer {
            rng: StdRng::from_entropy(),
        }
    }
}

impl<T: DType> NetInitializer<T> for RandomNetInitializer {
    fn get_weights(&mut self, _layer_idx: usize, input_size: usize, output_size: usize) -> Vec<T> {
        self.sample(input_size * output_size)
    }

    fn get_biases(&mut self, _layer_idx: usize, size: usize) -> Vec<T> {
        self.sample(size)
    }
}

/// Fills every weight and every bias with one value each.
#[derive(Copy, Clone, Debug)]
pub struct ConstantNetInitializer<T> {
    pub weight: T,
    pub bias: T,
}

impl<T: DType> ConstantNetInitializer<T> {
    pub fn zero() -> Self {
        ConstantNetInitializer {
            weight: T::ZERO,
            bias: T::ZERO,
        }
    }
}

impl<T: DType> NetInitializer<T> for ConstantNetInitializer<T> {
    fn get_weights(&mut self, _layer_idx: usize, input_size: usize, output_size: usize) -> Vec<T> {
        vec![self.weight; input_size * output_size]
    }

    fn get_biases(&mut self, _layer_idx: usize, size: usize) -> Vec<T> {
        vec![self.bias; size]
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_random_range_and_seed() {
        let mut a = RandomNetInitializer::seed_from_u64(0x5eed);
        let mut b = RandomNetInitializer::seed_from_u64(0x5eed);
        let wa: Vec<f64> = a.get_weights(1, 30, 20);
        let wb: Vec<f64> = b.get_weights(1, 30, 20);
        assert_eq!(wa.len(), 600);
        assert_eq!(wa, wb);
        assert!(wa.iter().all(|w| (-0.5..=0.5).contains(w)));
        // not degenerate
        assert!(wa.iter().any(|&w| w != wa[0]));

        let biases: Vec<f32> = a.get_biases(1, 20);
        assert_eq!(biases.len(), 20);
        assert!(biases.iter().all(|b| (-0.5..=0.5).contains(b)));
    }

    #[test]
    fn test_constant() {
        let mut init = ConstantNetInitializer { weight: 0.25f64, bias: -1.0 };
        assert_eq!(init.get_weights(2, 3, 2), vec![0.25; 6]);
        assert_eq!(init.get_biases(2, 2), vec![-1.0; 2]);
    }
}
