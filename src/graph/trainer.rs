use log::{debug, info, trace};
use std::fmt;
use std::time::Instant;

use super::cost::CostError;
use super::net::Net;
use super::samples::SampleSet;

/// Gradient descent settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainConfig {
    /// Multiplier applied to every estimated derivative.
    pub learning_rate: f64,
    /// Perturbation added to a parameter to estimate its derivative.
    pub epsilon: f64,
    /// Log the cost every `log_every` iterations; `0` disables progress logs.
    pub log_every: usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        TrainConfig {
            learning_rate: 1.0,
            epsilon: 1e-3,
            log_every: 1000,
        }
    }
}

impl TrainConfig {
    /// Checks that the learning rate and epsilon are positive and finite.
    pub fn validate(&self) -> Result<(), TrainError> {
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(TrainError::BadLearningRate(self.learning_rate));
        }
        if !(self.epsilon.is_finite() && self.epsilon > 0.0) {
            return Err(TrainError::BadEpsilon(self.epsilon));
        }
        Ok(())
    }
}

/// Net trainer structure.
///
/// Training procedure will look like this:
/// * One builds the trainer by calling `Net::build_trainer`, which will consume `Net`
/// and return `Trainer` object.
/// * Training data is processed via `Trainer::step` or `Trainer::train`.
/// Also, at any time one can call `Trainer::net_mut` to get access to `Net::process`.
/// * Once finished training, one can use `Trainer::teardown` to get `Net` object back.
///
/// Derivatives are estimated by forward differences, one parameter at a time,
/// so a step costs one `Net::cost` per weight and bias plus one baseline.
pub struct Trainer {
    pub(crate) net: Net,
    pub(crate) config: TrainConfig,
}

impl Trainer {
    /// Consumes `Net` and builds `Trainer` object containing it.
    pub(super) fn build(net: Net, config: TrainConfig) -> Result<Trainer, TrainError> {
        config.validate()?;
        Ok(Trainer { net, config })
    }

    /// Returns reference to contained `Net`.
    pub fn net_ref(&self) -> &Net {
        &self.net
    }

    /// Returns mutable reference to contained `Net`, allowing the use of `Net::process`.
    pub fn net_mut(&mut self) -> &mut Net {
        &mut self.net
    }

    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    /// Estimates the derivative of the cost with respect to a single
    /// parameter, restoring the parameter afterwards.
    fn partial_derivative<F>(
        &mut self,
        samples: &SampleSet,
        baseline: f64,
        mut param: F,
    ) -> Result<f64, CostError>
    where
        F: FnMut(&mut Net) -> &mut f64,
    {
        let epsilon = self.config.epsilon;

        let saved = *param(&mut self.net);
        *param(&mut self.net) = saved + epsilon;
        let perturbed = self.net.cost(samples);
        *param(&mut self.net) = saved;

        Ok((perturbed? - baseline) / epsilon)
    }

    /// Performs one gradient descent iteration over the whole sample set.
    ///
    /// Every weight and bias gets its derivative estimated against the
    /// unperturbed network first; only then all of them are updated.
    ///
    /// # Returns
    /// * The cost of the network before the update;
    /// * `Err(TrainError)` if the cost can't be calculated for `samples`.
    ///
    /// # Examples
    /// ```
    /// # use fdnnet::graph::{Net, SampleSet, TrainConfig};
    /// let set = SampleSet::from_pairs(&[(&[1.0][..], &[1.0][..])]).unwrap();
    /// let net = Net::with_coefficients(&[1], &[0.0, 0.0]).unwrap();
    /// let mut trainer = net.build_trainer(TrainConfig::default()).unwrap();
    ///
    /// let before = trainer.step(&set).unwrap();
    /// let after = trainer.net_mut().cost(&set).unwrap();
    /// assert!(after < before);
    /// ```
    pub fn step(&mut self, samples: &SampleSet) -> Result<f64, TrainError> {
        let baseline = self.net.cost(samples)?;

        for u in 0..self.net.units.len() {
            for i in 0..self.net.units[u].weights.len() {
                let derivative =
                    self.partial_derivative(samples, baseline, |net| &mut net.units[u].weights[i])?;
                self.net.units[u].gradient_weights[i] = derivative;
            }

            let derivative =
                self.partial_derivative(samples, baseline, |net| &mut net.units[u].bias)?;
            self.net.units[u].gradient_bias = derivative;

            trace!(
                "unit {}: weight gradients {:?}, bias gradient {}",
                u,
                self.net.units[u].gradient_weights,
                derivative
            );
        }

        let learning_rate = self.config.learning_rate;
        for unit in self.net.units.iter_mut() {
            unit.apply_gradient(learning_rate);
        }

        Ok(baseline)
    }

    /// Performs `iterations` training steps.
    ///
    /// # Returns
    /// * The cost of the trained network;
    /// * `Err(TrainError)` if the cost can't be calculated for `samples`.
    pub fn train(&mut self, samples: &SampleSet, iterations: usize) -> Result<f64, TrainError> {
        let start_time = Instant::now();
        let log_every = self.config.log_every;

        for iteration in 0..iterations {
            let cost = self.step(samples)?;
            if log_every > 0 && iteration % log_every == 0 {
                debug!("iteration {}: cost {}", iteration, cost);
            }
        }

        let cost = self.net.cost(samples)?;
        info!(
            "ran {} iterations in {:.3} seconds, final cost {}",
            iterations,
            start_time.elapsed().as_secs_f64(),
            cost
        );
        Ok(cost)
    }

    /// Consumes `Trainer` object and returns contained `Net` back.
    pub fn teardown(self) -> Net {
        self.net
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TrainError {
    BadLearningRate(f64),
    BadEpsilon(f64),
    Cost(CostError),
}

impl From<CostError> for TrainError {
    fn from(err: CostError) -> Self {
        TrainError::Cost(err)
    }
}

impl fmt::Display for TrainError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self {
            TrainError::BadLearningRate(rate) => {
                write!(f, "Learning rate must be positive, but got {}!", rate)
            }
            TrainError::BadEpsilon(epsilon) => {
                write!(f, "Epsilon must be positive, but got {}!", epsilon)
            }
            TrainError::Cost(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for TrainError {}
