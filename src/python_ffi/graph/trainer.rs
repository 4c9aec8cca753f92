use pyo3::prelude::*;

use super::net::Net;
use crate::graph::{SampleSet, Trainer as InnerTrainer};
use crate::MakeConsumable;

MakeConsumable!(ConsumableTrainer, InnerTrainer, Trainer);

#[pyclass]
pub struct Trainer {
    pub(super) trainer: ConsumableTrainer,
    pub(super) outputs_buffer: Box<[f64]>,
}

#[pymethods]
impl Trainer {
    pub fn layers(&self) -> PyResult<Vec<usize>> {
        Ok(self.trainer.get_ref()?.net_ref().layers().to_vec())
    }

    pub fn net_export(&self) -> PyResult<(Vec<usize>, Vec<f64>)> {
        let (layers, coeffs) = self.trainer.get_ref()?.net_ref().export();
        Ok((layers.to_owned(), coeffs))
    }

    pub fn process(&mut self, inputs: Vec<f64>) -> PyResult<Vec<f64>> {
        self.trainer
            .get_ref_mut()?
            .net_mut()
            .process(&inputs, &mut self.outputs_buffer)?;
        Ok(self.outputs_buffer.to_vec())
    }

    /// One gradient descent step; returns the cost before it.
    pub fn step(&mut self, samples: Vec<(Vec<f64>, Vec<f64>)>) -> PyResult<f64> {
        let samples = SampleSet::from_pairs(&samples)?;
        Ok(self.trainer.get_ref_mut()?.step(&samples)?)
    }

    /// Runs `iterations` steps; returns the final cost.
    pub fn train(&mut self, samples: Vec<(Vec<f64>, Vec<f64>)>, iterations: usize) -> PyResult<f64> {
        let samples = SampleSet::from_pairs(&samples)?;
        Ok(self.trainer.get_ref_mut()?.train(&samples, iterations)?)
    }

    pub fn teardown(&mut self) -> PyResult<Net> {
        Ok(Net::wrap(self.trainer.release()?.teardown()))
    }
}
