use crate::activation::ActivationFn;
use crate::dtype::DType;
use crate::error::{Error, Result};
use crate::loss::LossFn;
use crate::net::initializer::NetInitializer;
use std::fmt::{Debug, Formatter, Write};
use std::iter::zip;

/// A fully connected layer together with its training buffers.
///
/// `weights` is row-major with one row of `input_size` values per neuron.
#[derive(Clone)]
pub struct DenseLayer<T: DType> {
    input_size: usize,
    size: usize,
    weights: Box<[T]>,
    biases: Box<[T]>,
    weight_gradients: Box<[T]>,
    bias_gradients: Box<[T]>,
    pre_activations: Box<[T]>,
    activations: Box<[T]>,
    errors: Box<[T]>,
}

impl<T: DType> DenseLayer<T> {
    pub fn new(
        layer_idx: usize,
        input_size: usize,
        size: usize,
        initializer: &mut dyn NetInitializer<T>,
    ) -> Result<Self> {
        let num_weights = input_size
            .checked_mul(size)
            .ok_or_else(|| Error::InvalidTopology(vec![input_size, size]))?;
        let weights = initializer.get_weights(layer_idx, input_size, size);
        check_len(layer_idx, num_weights, weights.len())?;
        let biases = initializer.get_biases(layer_idx, size);
        check_len(layer_idx, size, biases.len())?;
        Ok(DenseLayer {
            input_size,
            size,
            weights: weights.into_boxed_slice(),
            biases: biases.into_boxed_slice(),
            weight_gradients: zeroed(num_weights),
            bias_gradients: zeroed(size),
            pre_activations: zeroed(size),
            activations: zeroed(size),
            errors: zeroed(size),
        })
    }

    pub(crate) fn forward(&mut self, activation_fn: ActivationFn, input: &[T]) -> &[T] {
        debug_assert_eq!(input.len(), self.input_size);
        for (j, row) in self.weights.chunks_exact(self.input_size).enumerate() {
            let mut x = T::ZERO;
            for (&w, &a) in zip(row, input) {
                x += w * a;
            }
            self.pre_activations[j] = x + self.biases[j];
        }
        activation_fn.compute_slice(&self.pre_activations, &mut self.activations);
        &self.activations
    }

    /// Loads the raw output error of the last layer.
    pub(crate) fn set_output_error(&mut self, loss: LossFn, label: usize) {
        loss.derivative(&self.activations, label, &mut self.errors);
    }

    /// Loads the raw error of a hidden layer from the already finished layer above it.
    pub(crate) fn set_hidden_error(&mut self, next: &DenseLayer<T>) {
        debug_assert_eq!(next.input_size, self.size);
        for (j, e) in self.errors.iter_mut().enumerate() {
            let mut delta = T::ZERO;
            for (row, &next_error) in zip(next.weights.chunks_exact(next.input_size), next.errors.iter()) {
                delta += row[j] * next_error;
            }
            *e = delta;
        }
    }

    /// Scales the raw error by the activation derivative and adds this
    /// sample's contribution to the gradient accumulators.
    pub(crate) fn accumulate_gradients(&mut self, activation_fn: ActivationFn, input: &[T]) {
        debug_assert_eq!(input.len(), self.input_size);
        let rows = self.weight_gradients.chunks_exact_mut(self.input_size);
        for (j, row) in rows.enumerate() {
            let error = activation_fn.derivative(self.pre_activations[j]) * self.errors[j];
            self.errors[j] = error;
            for (g, &a) in zip(row, input) {
                *g += a * error;
            }
            self.bias_gradients[j] += error;
        }
    }

    pub(crate) fn apply_gradients(&mut self, learn_rate: T, batch_size: T) {
        for (w, g) in zip(self.weights.iter_mut(), self.weight_gradients.iter_mut()) {
            *w -= learn_rate * *g / batch_size;
            *g = T::ZERO;
        }
        for (b, g) in zip(self.biases.iter_mut(), self.bias_gradients.iter_mut()) {
            *b -= learn_rate * *g / batch_size;
            *g = T::ZERO;
        }
    }

    #[inline]
    pub fn input_size(&self) -> usize {
        self.input_size
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn weights(&self) -> &[T] {
        &self.weights
    }

    /// Incoming weights of neuron `j`.
    #[inline]
    pub fn weight_row(&self, j: usize) -> &[T] {
        &self.weights[j * self.input_size..(j + 1) * self.input_size]
    }

    #[inline]
    pub fn biases(&self) -> &[T] {
        &self.biases
    }

    #[inline]
    pub fn weight_gradients(&self) -> &[T] {
        &self.weight_gradients
    }

    #[inline]
    pub fn bias_gradients(&self) -> &[T] {
        &self.bias_gradients
    }

    #[inline]
    pub fn pre_activations(&self) -> &[T] {
        &self.pre_activations
    }

    #[inline]
    pub fn activations(&self) -> &[T] {
        &self.activations
    }

    #[inline]
    pub fn errors(&self) -> &[T] {
        &self.errors
    }
}

fn check_len(layer: usize, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(Error::InvalidParameters { layer, expected, actual });
    }
    Ok(())
}

fn zeroed<T: DType>(len: usize) -> Box<[T]> {
    vec![T::ZERO; len].into_boxed_slice()
}

fn fmt_slice_elements<T: DType>(f: &mut Formatter<'_>, slice: &[T]) -> std::fmt::Result {
    let mut first = true;
    for x in slice {
        if first {
            first = false;
        } else {
            f.write_str(", ")?;
        }
        write!(f, "{x}")?;
    }
    Ok(())
}

pub(crate) fn fmt_slice<T: DType>(f: &mut Formatter<'_>, slice: &[T]) -> std::fmt::Result {
    f.write_char('[')?;
    if slice.len() > 10 {
        fmt_slice_elements(f, &slice[..5])?;
        f.write_str(" ... ")?;
        fmt_slice_elements(f, &slice[slice.len() - 5..])?;
    } else {
        fmt_slice_elements(f, slice)?;
    }
    f.write_char(']')
}

impl<T: DType> Debug for DenseLayer<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "DenseLayer {{ input_size: {}, size: {}, weights: ", self.input_size, self.size)?;
        fmt_slice(f, &self.weights)?;
        f.write_str(", biases: ")?;
        fmt_slice(f, &self.biases)?;
        f.write_str(", activations: ")?;
        fmt_slice(f, &self.activations)?;
        f.write_str(" }")
    }
}
