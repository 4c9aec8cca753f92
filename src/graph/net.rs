use log::debug;
use rand::distributions::{Distribution, Uniform};
use rand::Rng;
use std::fmt;

use super::trainer::{TrainConfig, TrainError, Trainer};
use super::unit::{InputSource, Unit};

/// Layered graph of scalar units.
pub struct Net {
    /// The number of units in each layer.
    pub(super) layers: Box<[usize]>,

    /// All units of all layers, stored contiguously in layer order:
    /// `units = [layer_0][layer_1] ... [layer_N]`
    pub(super) units: Vec<Unit>,

    /// Arena index of the first unit of each layer, plus the total unit count
    /// as the last element. Unit `i` of layer `l` is `units[offsets[l] + i]`.
    pub(super) offsets: Box<[usize]>,

    /// External inputs read by every layer 0 unit.
    /// Allocated for `layers[0]` values, but empty until `Net::set_inputs`.
    pub(super) inputs: Vec<f64>,
}

impl Net {
    /// Returns network for given geometry.
    /// Every weight and bias is drawn independently from `[0, 1)`.
    ///
    /// Layer 0 consists of `layers[0]` units, each reading all `layers[0]`
    /// external inputs; every other layer reads the outputs of the layer
    /// before it.
    ///
    /// # Arguments
    /// * `layers` - a number slice that holds a desired number of units in each layer;
    /// * `rng` - random number generator used for the initial parameters.
    ///
    /// # Returns
    /// * `Ok(Net)` if the geometry is valid;
    /// * `Err(NewNetError)` otherwise.
    ///
    /// # Examples
    /// ```
    /// # use fdnnet::graph::Net;
    /// use rand::{rngs::StdRng, SeedableRng};
    ///
    /// let mut rng = StdRng::seed_from_u64(7);
    /// let net = Net::new(&[2, 3, 1], &mut rng).unwrap();
    /// assert_eq!(net.units().len(), 6);
    /// assert_eq!(net.param_count(), 2 * 3 + 3 * 3 + 4);
    /// ```
    pub fn new<R: Rng + ?Sized>(layers: &[usize], rng: &mut R) -> Result<Net, NewNetError> {
        let coeffs_total = Net::coeffs_count(layers)?;
        let params_between = Uniform::from(0.0..1.0);
        let coeffs: Vec<f64> = params_between.sample_iter(rng).take(coeffs_total).collect();

        Ok(Net::build(layers, &coeffs))
    }

    /// Returns network for given geometry with the given parameters.
    ///
    /// # Arguments
    /// * `layers` - a number slice that holds a desired number of units in each layer;
    /// * `coefficients` - parameters of all units in arena order, each unit laid
    /// out as `[weights]bias`.
    ///
    /// # Returns
    /// * `Ok(Net)` if the geometry is valid and the amount of coefficients is right;
    /// * `Err(NewNetError)` otherwise.
    ///
    /// # Examples
    /// ```
    /// # use fdnnet::graph::Net;
    /// // Two layer 0 units with 2 weights + bias each, then one unit reading them.
    /// let coefficients = [0.5, 0.5, 0.0, -0.5, 0.5, 0.0, 1.0, 1.0, -1.0];
    /// let net = Net::with_coefficients(&[2, 1], &coefficients).unwrap();
    /// assert_eq!(net.export().1, coefficients.to_vec());
    /// ```
    pub fn with_coefficients(layers: &[usize], coefficients: &[f64]) -> Result<Net, NewNetError> {
        let coeffs_total = Net::coeffs_count(layers)?;
        if coefficients.len() != coeffs_total {
            return Err(NewNetError::BadCoefficients(SizeMismatch {
                expected: coeffs_total,
                got: coefficients.len(),
            }));
        }

        Ok(Net::build(layers, coefficients))
    }

    /// Validates the geometry and calculates the amount of coefficients it needs.
    fn coeffs_count(layers: &[usize]) -> Result<usize, NewNetError> {
        if layers.is_empty() {
            return Err(NewNetError::EmptyGeometry);
        }
        if let Some(layer) = layers.iter().position(|&size| size == 0) {
            return Err(NewNetError::EmptyLayer(layer));
        }

        // Layer 0 reads as many external inputs as it has units
        let mut old_layer_size = layers[0];
        let mut coeffs_total = 0;
        for &layer_size in layers {
            coeffs_total += layer_size * (old_layer_size + 1);
            old_layer_size = layer_size;
        }

        Ok(coeffs_total)
    }

    /// Wires the units. `coeffs` has already been checked against `layers`.
    fn build(layers: &[usize], coeffs: &[f64]) -> Net {
        let mut offsets = Vec::with_capacity(layers.len() + 1);
        offsets.push(0);
        for &layer_size in layers {
            let last = offsets[offsets.len() - 1];
            offsets.push(last + layer_size);
        }

        let mut units = Vec::with_capacity(offsets[layers.len()]);
        let mut remaining_coeffs = coeffs;

        for (layer, &layer_size) in layers.iter().enumerate() {
            let source = if layer == 0 {
                InputSource::External(layers[0])
            } else {
                InputSource::PreviousLayer(offsets[layer - 1]..offsets[layer])
            };

            for _ in 0..layer_size {
                let (current_coeffs, coeffs_tail) = remaining_coeffs.split_at(source.len() + 1);
                remaining_coeffs = coeffs_tail;

                let (weights, bias) = current_coeffs.split_at(source.len());
                units.push(Unit::new(
                    units.len(),
                    source.clone(),
                    weights.to_vec().into_boxed_slice(),
                    bias[0],
                ));
            }
        }

        debug!("built net {:?} with {} units", layers, units.len());

        Net {
            layers: layers.to_owned().into_boxed_slice(),
            units,
            offsets: offsets.into_boxed_slice(),
            inputs: Vec::with_capacity(layers[0]),
        }
    }

    pub fn layers(&self) -> &[usize] {
        &self.layers
    }

    /// All units, in layer order.
    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    /// Units of the given layer, or `None` if there is no such layer.
    pub fn layer(&self, layer: usize) -> Option<&[Unit]> {
        if layer >= self.layers.len() {
            return None;
        }
        Some(&self.units[self.offsets[layer]..self.offsets[layer + 1]])
    }

    pub fn output_layer(&self) -> &[Unit] {
        let last = self.layers.len() - 1;
        &self.units[self.offsets[last]..self.offsets[last + 1]]
    }

    /// Returns unit `index` of `layer`, or `None` if out of range.
    ///
    /// # Examples
    /// ```
    /// # use fdnnet::graph::Net;
    /// # use rand::{rngs::StdRng, SeedableRng};
    /// let net = Net::new(&[2, 3, 1], &mut StdRng::seed_from_u64(0)).unwrap();
    /// assert_eq!(net.node_at(1, 2).unwrap().index(), 4);
    /// assert!(net.node_at(2, 1).is_none());
    /// ```
    pub fn node_at(&self, layer: usize, index: usize) -> Option<&Unit> {
        let position = self.position(layer, index)?;
        self.units.get(position)
    }

    pub fn node_at_mut(&mut self, layer: usize, index: usize) -> Option<&mut Unit> {
        let position = self.position(layer, index)?;
        self.units.get_mut(position)
    }

    fn position(&self, layer: usize, index: usize) -> Option<usize> {
        if layer >= self.layers.len() || index >= self.layers[layer] {
            return None;
        }
        Some(self.offsets[layer] + index)
    }

    /// The number of trainable scalars (weights and biases).
    pub fn param_count(&self) -> usize {
        self.units.iter().map(|unit| unit.input_count() + 1).sum()
    }

    /// Exports geometry and coefficients from network.
    /// Coefficients use the `Net::with_coefficients` layout.
    ///
    /// # Returns
    /// `(layers, coefficients)`.
    pub fn export(&self) -> (&[usize], Vec<f64>) {
        let mut coeffs = Vec::with_capacity(self.param_count());
        for unit in &self.units {
            coeffs.extend_from_slice(unit.weights());
            coeffs.push(unit.bias());
        }
        (&self.layers, coeffs)
    }

    /// Current external inputs; empty until `Net::set_inputs` is called.
    pub fn inputs(&self) -> &[f64] {
        &self.inputs
    }

    /// Overwrites the external inputs read by layer 0.
    /// Doesn't clear the cache, see `Net::clear_cache`.
    ///
    /// # Returns
    /// * `Ok(())` if `inputs` has exactly `layers[0]` values;
    /// * `Err(SizeMismatch)` otherwise, leaving the previous inputs in place.
    pub fn set_inputs(&mut self, inputs: &[f64]) -> Result<(), SizeMismatch> {
        if inputs.len() != self.layers[0] {
            return Err(SizeMismatch {
                expected: self.layers[0],
                got: inputs.len(),
            });
        }

        self.inputs.clear();
        self.inputs.extend_from_slice(inputs);
        Ok(())
    }

    /// Forgets every unit's output, so the next evaluation recomputes it.
    /// Must be called before each pass over new inputs or changed parameters.
    pub fn clear_cache(&self) {
        for unit in &self.units {
            unit.clear_cache();
        }
    }

    /// Calculates output of the unit at arena position `index`, recursively
    /// evaluating the previous layers. Outputs are memoized until
    /// `Net::clear_cache`.
    ///
    /// # Returns
    /// * `Ok(f64)` with the unit's activation;
    /// * `Err(EvalError)` if there is no such unit, if inputs were never set,
    /// or if the unit's source doesn't match the arena.
    pub fn evaluate(&self, index: usize) -> Result<f64, EvalError> {
        let unit = self.units.get(index).ok_or(EvalError::NoSuchUnit(index))?;

        if let Some(output) = unit.cached_output() {
            return Ok(output);
        }
        if unit.source.len() != unit.weights.len() {
            return Err(EvalError::BadSource(index));
        }

        let weighted_sum = match &unit.source {
            InputSource::External(len) => {
                if self.inputs.len() != *len {
                    return Err(EvalError::InputsNotSet(index));
                }
                Net::scalar_product(&unit.weights, &self.inputs)
            }
            InputSource::PreviousLayer(range) => {
                // Only units stored before this one may be read, which keeps the graph acyclic
                if range.end > index {
                    return Err(EvalError::BadSource(index));
                }

                let mut sum = 0.0;
                for (w, input) in unit.weights.iter().zip(range.clone()) {
                    sum += w * self.evaluate(input)?;
                }
                sum
            }
        };

        Ok(unit.activate(weighted_sum))
    }

    /// Calculates scalar (dot) product of two vectors of the same length.
    fn scalar_product(a: &[f64], b: &[f64]) -> f64 {
        a.iter().zip(b.iter()).map(|(a, b)| a * b).sum()
    }

    /// Arena positions of the output layer.
    pub(super) fn output_range(&self) -> std::ops::Range<usize> {
        let last = self.layers.len() - 1;
        self.offsets[last]..self.offsets[last + 1]
    }

    /// Calculates output of the network using given input.
    /// Clears the cache, sets the inputs and evaluates the output layer.
    ///
    /// # Arguments
    /// * `inputs` - Slice that holds the external inputs;
    /// * `outputs` - Mutable slice that will be filled with activations of output units.
    ///
    /// # Returns
    /// * `Ok(())` if amount of inputs and size of the outputs are right;
    /// * `Err(ProcessError)` otherwise.
    ///
    /// # Examples
    /// ```
    /// # use fdnnet::graph::{sigmoid, Net};
    /// let mut net = Net::with_coefficients(&[1], &[2.0, -1.0]).unwrap();
    /// let mut outputs = [0.0];
    /// net.process(&[3.0], &mut outputs).unwrap();
    /// assert_eq!(outputs[0], sigmoid(5.0));
    /// ```
    pub fn process(&mut self, inputs: &[f64], outputs: &mut [f64]) -> Result<(), ProcessError> {
        let outputs_len = self.layers[self.layers.len() - 1];
        if outputs.len() != outputs_len {
            return Err(ProcessError::BadOutputs(SizeMismatch {
                expected: outputs_len,
                got: outputs.len(),
            }));
        }

        self.clear_cache();
        self.set_inputs(inputs).map_err(ProcessError::BadInputs)?;

        for (output, index) in outputs.iter_mut().zip(self.output_range()) {
            *output = self.evaluate(index)?;
        }
        Ok(())
    }

    /// Consumes `Net` and builds `Trainer` object containing it.
    /// See `Trainer`'s documentation for details.
    pub fn build_trainer(self, config: TrainConfig) -> Result<Trainer, TrainError> {
        Trainer::build(self, config)
    }
}

impl fmt::Display for Net {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "net {:?}: {} units", self.layers, self.units.len())?;
        for layer in 0..self.layers.len() {
            writeln!(f, "  layer {}:", layer)?;
            for unit in &self.units[self.offsets[layer]..self.offsets[layer + 1]] {
                writeln!(f, "    {}", unit)?;
            }
        }
        Ok(())
    }
}

/// Error structure for `Net::new` and `Net::with_coefficients`
#[derive(Debug, Clone, PartialEq)]
pub enum NewNetError {
    EmptyGeometry,
    EmptyLayer(usize),
    BadCoefficients(SizeMismatch),
}

impl fmt::Display for NewNetError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self {
            NewNetError::EmptyGeometry => write!(f, "Net must have at least one layer!"),
            NewNetError::EmptyLayer(layer) => {
                write!(f, "Layer {} must have at least one unit!", layer)
            }
            NewNetError::BadCoefficients(SizeMismatch { expected, got }) => write!(
                f,
                "Expected {} coefficients because of provided geometry, but got {}!",
                expected, got
            ),
        }
    }
}

impl std::error::Error for NewNetError {}

/// Error structure for `Net::evaluate`
#[derive(Debug, Clone, PartialEq)]
pub enum EvalError {
    NoSuchUnit(usize),
    InputsNotSet(usize),
    BadSource(usize),
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self {
            EvalError::NoSuchUnit(index) => write!(f, "There is no unit {}!", index),
            EvalError::InputsNotSet(index) => {
                write!(f, "Unit {} was evaluated before inputs were set!", index)
            }
            EvalError::BadSource(index) => {
                write!(f, "Unit {} has an input source outside of its layer!", index)
            }
        }
    }
}

impl std::error::Error for EvalError {}

/// Error structure for `Net::process`
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessError {
    BadInputs(SizeMismatch),
    BadOutputs(SizeMismatch),
    Eval(EvalError),
}

impl From<EvalError> for ProcessError {
    fn from(err: EvalError) -> Self {
        ProcessError::Eval(err)
    }
}

impl fmt::Display for ProcessError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self {
            ProcessError::BadInputs(SizeMismatch { expected, got }) => {
                write!(f, "Expected {} input(s), but got {}!", expected, got)
            }
            ProcessError::BadOutputs(SizeMismatch { expected, got }) => {
                write!(f, "Expected {} output(s), but got {}!", expected, got)
            }
            ProcessError::Eval(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for ProcessError {}

/// Error structure for collections size mismatch
#[derive(Debug, Clone, PartialEq)]
pub struct SizeMismatch {
    pub expected: usize,
    pub got: usize,
}

impl fmt::Display for SizeMismatch {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Expected {} values, but got {}!",
            self.expected, self.got
        )
    }
}

impl std::error::Error for SizeMismatch {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::sigmoid;
    use rand::{rngs::StdRng, SeedableRng};

    fn small_net() -> Net {
        // layer 0: two units over two inputs, layer 1: one unit over layer 0
        Net::with_coefficients(&[2, 1], &[1.0, 2.0, 0.5, -1.0, 0.0, 0.25, 2.0, -3.0, 0.1]).unwrap()
    }

    #[test]
    fn rejects_bad_geometry() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(Net::new(&[], &mut rng).err(), Some(NewNetError::EmptyGeometry));
        assert_eq!(Net::new(&[2, 0, 1], &mut rng).err(), Some(NewNetError::EmptyLayer(1)));
        assert_eq!(
            Net::with_coefficients(&[2, 1], &[0.0; 8]).err(),
            Some(NewNetError::BadCoefficients(SizeMismatch { expected: 9, got: 8 }))
        );
    }

    #[test]
    fn random_parameters_are_in_unit_interval() {
        let mut rng = StdRng::seed_from_u64(42);
        let net = Net::new(&[3, 4, 2], &mut rng).unwrap();
        let (layers, coeffs) = net.export();

        assert_eq!(layers, &[3, 4, 2]);
        // Layer 0 units read all 3 inputs, later layers read the previous one
        assert_eq!(coeffs.len(), 3 * 4 + 4 * 4 + 2 * 5);
        assert_eq!(coeffs.len(), net.param_count());
        assert!(coeffs.iter().all(|&c| (0.0..1.0).contains(&c)));
    }

    #[test]
    fn same_seed_builds_same_net() {
        let a = Net::new(&[2, 2, 1], &mut StdRng::seed_from_u64(9)).unwrap();
        let b = Net::new(&[2, 2, 1], &mut StdRng::seed_from_u64(9)).unwrap();
        assert_eq!(a.export(), b.export());
    }

    #[test]
    fn wires_layers_to_previous_layer() {
        let net = Net::new(&[2, 3, 1], &mut StdRng::seed_from_u64(3)).unwrap();

        for unit in net.layer(0).unwrap() {
            assert_eq!(unit.source(), &InputSource::External(2));
            assert_eq!(unit.input_count(), 2);
        }
        for unit in net.layer(1).unwrap() {
            assert_eq!(unit.source(), &InputSource::PreviousLayer(0..2));
        }
        assert_eq!(net.output_layer()[0].source(), &InputSource::PreviousLayer(2..5));
        assert_eq!(net.output_layer()[0].index(), 5);
        assert!(net.layer(3).is_none());
    }

    #[test]
    fn evaluates_by_hand() {
        let mut net = small_net();
        net.set_inputs(&[1.0, 0.5]).unwrap();

        let h0 = sigmoid(1.0 * 1.0 + 2.0 * 0.5 + 0.5);
        let h1 = sigmoid(-1.0 * 1.0 + 0.0 * 0.5 + 0.25);
        let out = sigmoid(2.0 * h0 - 3.0 * h1 + 0.1);

        assert!((net.evaluate(2).unwrap() - out).abs() < 1e-12);
        // Evaluating the output filled the caches of the layer below
        assert_eq!(net.units()[0].cached_output(), Some(h0));
        assert_eq!(net.units()[1].cached_output(), Some(h1));
    }

    #[test]
    fn memoizes_within_a_pass() {
        let mut net = small_net();
        net.set_inputs(&[1.0, 1.0]).unwrap();
        let first = net.evaluate(2).unwrap();

        // A stale input doesn't matter until the cache is cleared
        net.set_inputs(&[0.0, 0.0]).unwrap();
        assert_eq!(net.evaluate(2).unwrap(), first);

        net.clear_cache();
        assert!(net.units().iter().all(|unit| unit.cached_output().is_none()));
        assert_ne!(net.evaluate(2).unwrap(), first);

        net.set_inputs(&[1.0, 1.0]).unwrap();
        net.clear_cache();
        assert_eq!(net.evaluate(2).unwrap(), first);
    }

    #[test]
    fn later_layers_do_not_affect_earlier_ones() {
        let mut net = small_net();
        net.set_inputs(&[0.3, 0.7]).unwrap();
        let before = net.evaluate(1).unwrap();
        let output_before = net.evaluate(2).unwrap();

        let unit = net.node_at_mut(1, 0).unwrap();
        unit.weights_mut()[0] = 10.0;
        unit.set_bias(-4.0);
        net.clear_cache();

        assert_eq!(net.evaluate(1).unwrap(), before);
        assert_ne!(net.evaluate(2).unwrap(), output_before);
    }

    #[test]
    fn evaluation_errors() {
        let net = small_net();
        assert_eq!(net.evaluate(0), Err(EvalError::InputsNotSet(0)));
        assert_eq!(net.evaluate(2), Err(EvalError::InputsNotSet(0)));
        assert_eq!(net.evaluate(3), Err(EvalError::NoSuchUnit(3)));
    }

    #[test]
    fn set_inputs_checks_length() {
        let mut net = small_net();
        net.set_inputs(&[1.0, 2.0]).unwrap();

        assert_eq!(
            net.set_inputs(&[1.0]),
            Err(SizeMismatch { expected: 2, got: 1 })
        );
        assert_eq!(
            net.set_inputs(&[1.0, 2.0, 3.0]),
            Err(SizeMismatch { expected: 2, got: 3 })
        );
        assert_eq!(net.inputs(), &[1.0, 2.0]);
    }

    #[test]
    fn process_checks_outputs_and_recomputes() {
        let mut net = small_net();
        let mut outputs = [0.0; 2];
        assert_eq!(
            net.process(&[1.0, 1.0], &mut outputs),
            Err(ProcessError::BadOutputs(SizeMismatch { expected: 1, got: 2 }))
        );

        let mut a = [0.0];
        let mut b = [0.0];
        net.process(&[1.0, 1.0], &mut a).unwrap();
        net.process(&[0.0, 1.0], &mut b).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn dump_lists_every_unit() {
        let net = small_net();
        let dump = net.to_string();
        assert!(dump.starts_with("net [2, 1]: 3 units\n"));
        assert!(dump.contains("unit 2: inputs units[0..2], weights [2.000000, -3.000000]"));
        assert_eq!(dump.lines().filter(|line| line.contains("unit ")).count(), 3);
    }
}
