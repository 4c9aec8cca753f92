use pyo3::prelude::*;
use rand::{rngs::StdRng, SeedableRng};

use super::trainer::{ConsumableTrainer, Trainer};
use crate::graph::{
    CostError, Net as InnerNet, NewNetError, ProcessError, SampleError, SampleSet, SizeMismatch,
    TrainConfig, TrainError,
};
use crate::{Impl_to_PyErr, MakeConsumable};

MakeConsumable!(ConsumableNet, InnerNet, Net);

#[pyclass]
pub struct Net {
    pub(super) net: ConsumableNet,
    pub(super) outputs_buffer: Box<[f64]>,
}

impl Net {
    pub(super) fn wrap(net: InnerNet) -> Self {
        let outputs_count = net.output_layer().len();
        Self {
            net: ConsumableNet::acquire(net),
            outputs_buffer: vec![0.0; outputs_count].into_boxed_slice(),
        }
    }
}

#[pymethods]
impl Net {
    /// Random parameters come from `seed`, or from OS entropy when it's omitted.
    #[new]
    pub fn new(
        layers: Vec<usize>,
        seed: Option<u64>,
        coefficients: Option<Vec<f64>>,
    ) -> Result<Self, NewNetError> {
        let net = match coefficients {
            Some(coefficients) => InnerNet::with_coefficients(&layers, &coefficients)?,
            None => {
                let mut rng = match seed {
                    Some(seed) => StdRng::seed_from_u64(seed),
                    None => StdRng::from_entropy(),
                };
                InnerNet::new(&layers, &mut rng)?
            }
        };
        Ok(Self::wrap(net))
    }

    pub fn layers(&self) -> PyResult<Vec<usize>> {
        Ok(self.net.get_ref()?.layers().to_vec())
    }

    pub fn export(&self) -> PyResult<(Vec<usize>, Vec<f64>)> {
        let (layers, coeffs) = self.net.get_ref()?.export();
        Ok((layers.to_owned(), coeffs))
    }

    pub fn process(&mut self, inputs: Vec<f64>) -> PyResult<Vec<f64>> {
        self.net
            .get_ref_mut()?
            .process(&inputs, &mut self.outputs_buffer)?;
        Ok(self.outputs_buffer.to_vec())
    }

    pub fn cost(&mut self, samples: Vec<(Vec<f64>, Vec<f64>)>) -> PyResult<f64> {
        let samples = SampleSet::from_pairs(&samples)?;
        Ok(self.net.get_ref_mut()?.cost(&samples)?)
    }

    pub fn dump(&self) -> PyResult<String> {
        Ok(self.net.get_ref()?.to_string())
    }

    pub fn build_trainer(&mut self, learning_rate: f64, epsilon: f64) -> PyResult<Trainer> {
        let config = TrainConfig {
            learning_rate,
            epsilon,
            ..TrainConfig::default()
        };
        // Validate first, so a bad config doesn't consume the net
        config.validate()?;
        let trainer = self.net.release()?.build_trainer(config)?;
        Ok(Trainer {
            trainer: ConsumableTrainer::acquire(trainer),
            outputs_buffer: self.outputs_buffer.clone(),
        })
    }
}

Impl_to_PyErr!(for NewNetError, ProcessError, SizeMismatch, SampleError, CostError, TrainError);
