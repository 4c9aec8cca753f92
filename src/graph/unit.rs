use std::cell::Cell;
use std::fmt;
use std::ops::Range;

/// Activation function applied to a unit's weighted sum.
pub type Activation = fn(f64) -> f64;

/// Sigmoid function.
/// Implements the formula:
/// `1 / (1 + exp(-x))`.
///
/// # Examples
/// ```
/// # use fdnnet::graph::sigmoid;
/// assert_eq!(sigmoid(0.0), 0.5);
/// assert!(sigmoid(10.0) > 0.99);
/// ```
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Where a unit takes its inputs from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// The network's external input buffer, holding this many values.
    /// Only layer 0 reads from it.
    External(usize),
    /// A contiguous block of units of the previous layer, by arena index.
    PreviousLayer(Range<usize>),
}

impl InputSource {
    /// Number of values the unit reads from this source.
    pub fn len(&self) -> usize {
        match self {
            InputSource::External(len) => *len,
            InputSource::PreviousLayer(range) => range.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            InputSource::External(len) => write!(f, "inputs[0..{}]", len),
            InputSource::PreviousLayer(range) => {
                write!(f, "units[{}..{}]", range.start, range.end)
            }
        }
    }
}

/// Single scalar node of the network.
///
/// A unit owns its weights (one per input) and bias, and remembers its last
/// output until `Net::clear_cache` is called.
#[derive(Debug, Clone)]
pub struct Unit {
    /// Position of the unit in the network's arena.
    pub(super) index: usize,

    pub(super) source: InputSource,

    pub(super) weights: Box<[f64]>,

    pub(super) bias: f64,

    /// Derivatives estimated by the last training step, one per weight.
    pub(super) gradient_weights: Box<[f64]>,

    pub(super) gradient_bias: f64,

    pub(super) activation: Activation,

    /// Output of the current evaluation pass, `None` until computed.
    pub(super) cached_output: Cell<Option<f64>>,
}

impl Unit {
    /// Builds a unit reading from `source` with the given parameters.
    /// `weights` must hold exactly `source.len()` values; the network
    /// guarantees it when wiring layers.
    pub(super) fn new(index: usize, source: InputSource, weights: Box<[f64]>, bias: f64) -> Unit {
        let gradient_weights = vec![0.0; weights.len()].into_boxed_slice();

        Unit {
            index,
            source,
            weights,
            bias,
            gradient_weights,
            gradient_bias: 0.0,
            activation: sigmoid,
            cached_output: Cell::new(None),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn source(&self) -> &InputSource {
        &self.source
    }

    pub fn input_count(&self) -> usize {
        self.weights.len()
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Mutable access to the weights.
    /// The slice length is fixed, so the unit's topology can't change. Values
    /// cached before the change stay until the next `Net::clear_cache`.
    pub fn weights_mut(&mut self) -> &mut [f64] {
        &mut self.weights
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    pub fn set_bias(&mut self, bias: f64) {
        self.bias = bias;
    }

    pub fn gradient_weights(&self) -> &[f64] {
        &self.gradient_weights
    }

    pub fn gradient_bias(&self) -> f64 {
        self.gradient_bias
    }

    /// Output memoized by the current evaluation pass, if any.
    pub fn cached_output(&self) -> Option<f64> {
        self.cached_output.get()
    }

    pub(super) fn clear_cache(&self) {
        self.cached_output.set(None);
    }

    /// Squashes the weighted sum and memoizes the result.
    pub(super) fn activate(&self, weighted_sum: f64) -> f64 {
        let output = (self.activation)(weighted_sum + self.bias);
        self.cached_output.set(Some(output));
        output
    }

    /// Gradient descent update using the stored derivatives.
    pub(super) fn apply_gradient(&mut self, learning_rate: f64) {
        for (w, g) in self.weights.iter_mut().zip(self.gradient_weights.iter()) {
            *w -= g * learning_rate;
        }
        self.bias -= self.gradient_bias * learning_rate;
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "unit {}: inputs {}, weights [", self.index, self.source)?;
        for (i, w) in self.weights.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:.6}", w)?;
        }
        write!(f, "], bias {:.6}, cached ", self.bias)?;
        match self.cached_output.get() {
            Some(output) => write!(f, "{:.6}", output),
            None => write!(f, "-"),
        }
    }
}
