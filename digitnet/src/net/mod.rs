use crate::activation::ActivationFn;
use crate::dtype::DType;
use crate::error::{Error, Result};
use crate::loss::LossFn;
use crate::net::initializer::{NetInitializer, RandomNetInitializer};
use crate::net::layer::DenseLayer;
use crate::sample::Sample;
use crate::scoring::{AccuracyScorer, Prediction};
use log::debug;
use std::fmt::{Debug, Formatter};

pub mod initializer;
pub mod layer;
mod persist;

pub use persist::DEFAULT_NETWORK_FILE;

/// A fully connected sigmoid network trained one sample at a time with
/// mini-batch gradient descent.
///
/// Gradients are accumulated by [`Net::train`] and applied once every
/// `batch_size` samples.
#[derive(Clone)]
pub struct Net<T: DType> {
    input: Box<[T]>,
    layers: Box<[DenseLayer<T>]>,
    activation_fn: ActivationFn,
    loss: LossFn,
    batch_size: usize,
    learn_rate: T,
    label: Option<usize>,
    fed: bool,
    samples_in_batch: usize,
    scorer: AccuracyScorer,
}

impl<T: DType> Net<T> {
    /// Creates a network with randomly initialized parameters.
    pub fn new(layer_sizes: &[usize], batch_size: usize, learn_rate: T) -> Result<Self> {
        Self::with_initializer(layer_sizes, batch_size, learn_rate, &mut RandomNetInitializer::default())
    }

    pub fn with_initializer(
        layer_sizes: &[usize],
        batch_size: usize,
        learn_rate: T,
        initializer: &mut dyn NetInitializer<T>,
    ) -> Result<Self> {
        validate_topology::<T>(layer_sizes)?;
        if batch_size == 0 {
            return Err(Error::InvalidBatchSize(batch_size));
        }
        let layers = layer_sizes
            .windows(2)
            .enumerate()
            .map(|(i, w)| DenseLayer::new(i + 1, w[0], w[1], initializer))
            .collect::<Result<_>>()?;
        Ok(Net {
            input: vec![T::ZERO; layer_sizes[0]].into_boxed_slice(),
            layers,
            activation_fn: ActivationFn::Sigmoid,
            loss: LossFn::SquaredError,
            batch_size,
            learn_rate,
            label: None,
            fed: false,
            samples_in_batch: 0,
            scorer: AccuracyScorer::new(),
        })
    }

    /// Runs a forward pass for a labelled sample and returns the output activations.
    pub fn feed(&mut self, input: &[T], label: usize) -> Result<&[T]> {
        self.check_input(input)?;
        self.check_label(label)?;
        self.label = Some(label);
        Ok(self.forward(input))
    }

    /// Runs a forward pass without touching the current label.
    pub fn predict(&mut self, input: &[T]) -> Result<&[T]> {
        self.check_input(input)?;
        Ok(self.forward(input))
    }

    /// Feeds one sample, backpropagates its error into the gradient
    /// accumulators and updates the parameters at the end of a batch.
    pub fn train(&mut self, input: &[T], label: usize) -> Result<()> {
        self.feed(input, label)?;

        if self.samples_in_batch == 0 {
            self.scorer.reset();
        }

        self.backprop(input, label);

        let output = self.layers[self.layers.len() - 1].activations();
        self.scorer.process_sample(output, label);

        self.samples_in_batch += 1;
        if self.samples_in_batch >= self.batch_size {
            self.samples_in_batch = 0;
            self.update();
        }
        Ok(())
    }

    #[inline]
    pub fn train_sample(&mut self, sample: &Sample<T>) -> Result<()> {
        self.train(&sample.features, sample.label)
    }

    /// Squared error of the last forward pass against the one-hot target of
    /// the current label.
    pub fn cost(&self) -> Option<T> {
        let label = self.label?;
        Some(self.loss.compute(self.output_layer().activations(), label))
    }

    /// The strongest output neuron of the last forward pass.
    pub fn output(&self) -> Option<Prediction<T>> {
        if !self.fed {
            return None;
        }
        Prediction::from_output(self.output_layer().activations())
    }

    /// Share of correctly classified samples in the current accumulation window.
    #[inline]
    pub fn accuracy(&self) -> f64 {
        self.scorer.accuracy()
    }

    #[inline]
    pub fn scorer(&self) -> &AccuracyScorer {
        &self.scorer
    }

    fn forward(&mut self, input: &[T]) -> &[T] {
        self.input.copy_from_slice(input);
        self.fed = true;
        let mut prev: &[T] = &self.input;
        for layer in self.layers.iter_mut() {
            prev = layer.forward(self.activation_fn, prev);
        }
        prev
    }

    fn backprop(&mut self, input: &[T], label: usize) {
        // each layer reads the finished error of the layer above, so walk down strictly in order
        for i in (0..self.layers.len()).rev() {
            let (below, rest) = self.layers.split_at_mut(i);
            let Some((layer, above)) = rest.split_first_mut() else {
                continue;
            };
            match above.first() {
                None => layer.set_output_error(self.loss, label),
                Some(next) => layer.set_hidden_error(next),
            }
            let layer_input = match below.last() {
                None => input,
                Some(prev) => prev.activations(),
            };
            layer.accumulate_gradients(self.activation_fn, layer_input);
        }
    }

    fn update(&mut self) {
        debug!(
            "applying gradients of {} samples, window accuracy {:.4}",
            self.batch_size,
            self.scorer.accuracy()
        );
        let batch_size = T::from_usize(self.batch_size);
        for layer in self.layers.iter_mut() {
            layer.apply_gradients(self.learn_rate, batch_size);
        }
    }

    fn check_input(&self, input: &[T]) -> Result<()> {
        if input.len() != self.input_size() {
            return Err(Error::InputShapeMismatch {
                expected: self.input_size(),
                actual: input.len(),
            });
        }
        Ok(())
    }

    fn check_label(&self, label: usize) -> Result<()> {
        if label >= self.output_size() {
            return Err(Error::LabelOutOfRange {
                label,
                classes: self.output_size(),
            });
        }
        Ok(())
    }

    #[inline]
    fn output_layer(&self) -> &DenseLayer<T> {
        &self.layers[self.layers.len() - 1]
    }

    pub fn layer_sizes(&self) -> Vec<usize> {
        let mut sizes = Vec::with_capacity(self.layers.len() + 1);
        sizes.push(self.input_size());
        sizes.extend(self.layers.iter().map(|l| l.size()));
        sizes
    }

    #[inline]
    pub fn input_size(&self) -> usize {
        self.input.len()
    }

    #[inline]
    pub fn output_size(&self) -> usize {
        self.output_layer().size()
    }

    /// Layers `1..=n`; the input layer has no parameters and is not included.
    #[inline]
    pub fn layers(&self) -> &[DenseLayer<T>] {
        &self.layers
    }

    #[inline]
    pub fn input(&self) -> &[T] {
        &self.input
    }

    #[inline]
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    #[inline]
    pub fn learn_rate(&self) -> T {
        self.learn_rate
    }

    #[inline]
    pub fn label(&self) -> Option<usize> {
        self.label
    }

    #[inline]
    pub fn samples_in_batch(&self) -> usize {
        self.samples_in_batch
    }
}

/// Every layer needs at least one neuron and each weight matrix must fit in a
/// single allocation of `T`.
pub(crate) fn validate_topology<T: DType>(layer_sizes: &[usize]) -> Result<()> {
    let invalid = || Error::InvalidTopology(layer_sizes.to_vec());
    if layer_sizes.len() < 2 || layer_sizes.contains(&0) {
        return Err(invalid());
    }
    let max_len = isize::MAX as usize / size_of::<T>();
    for w in layer_sizes.windows(2) {
        let params = w[0].checked_mul(w[1]).ok_or_else(invalid)?;
        if params > max_len {
            return Err(invalid());
        }
    }
    Ok(())
}

pub struct NetBuilder<T: DType> {
    input_size: usize,
    layers: Vec<usize>,
    batch_size: usize,
    learn_rate: T,
    initializer: Box<dyn NetInitializer<T>>,
}

impl<T: DType> NetBuilder<T> {
    pub fn new(input_size: usize) -> Self {
        NetBuilder {
            input_size,
            layers: Vec::new(),
            batch_size: 1,
            learn_rate: T::ONE,
            initializer: Box::new(RandomNetInitializer::default()),
        }
    }

    pub fn with_initializer<I>(mut self, initializer: I) -> Self
    where
        I: 'static + NetInitializer<T>,
    {
        self.initializer = Box::new(initializer);
        self
    }

    pub fn with_layer(mut self, size: usize) -> Self {
        self.layers.push(size);
        self
    }

    pub fn with_layers<I>(mut self, sizes: I) -> Self
    where
        I: IntoIterator<Item = usize>,
    {
        self.layers.extend(sizes);
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_learn_rate(mut self, learn_rate: T) -> Self {
        self.learn_rate = learn_rate;
        self
    }

    pub fn build(mut self) -> Result<Net<T>> {
        let mut sizes = Vec::with_capacity(self.layers.len() + 1);
        sizes.push(self.input_size);
        sizes.extend_from_slice(&self.layers);
        Net::with_initializer(&sizes, self.batch_size, self.learn_rate, self.initializer.as_mut())
    }
}

impl<T: DType> Debug for Net<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Net")
            .field("layer_sizes", &self.layer_sizes())
            .field("batch_size", &self.batch_size)
            .field("learn_rate", &self.learn_rate)
            .field("layers", &self.layers)
            .finish_non_exhaustive()
    }
}
