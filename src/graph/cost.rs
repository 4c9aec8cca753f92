use std::fmt;

use super::net::{EvalError, Net, SizeMismatch};
use super::samples::SampleSet;

impl Net {
    /// Calculates mean squared error of the network over a sample set.
    /// Implements the formula:
    /// `sum((output - expected)^2) / (samples * outputs)`.
    ///
    /// Every sample gets a fresh pass: the cache is cleared and the inputs
    /// are set before the output layer is evaluated.
    ///
    /// # Returns
    /// * `Ok(f64)` if `samples` is not empty and matches the network's widths;
    /// * `Err(CostError)` otherwise.
    ///
    /// # Examples
    /// ```
    /// # use fdnnet::graph::{Net, SampleSet};
    /// // One unit with zero parameters always answers 0.5
    /// let mut net = Net::with_coefficients(&[1], &[0.0, 0.0]).unwrap();
    /// let set = SampleSet::from_pairs(&[(&[3.0][..], &[1.0][..]), (&[-2.0][..], &[0.0][..])]).unwrap();
    /// assert_eq!(net.cost(&set).unwrap(), 0.25);
    /// ```
    pub fn cost(&mut self, samples: &SampleSet) -> Result<f64, CostError> {
        let outputs_len = self.layers[self.layers.len() - 1];

        if samples.inputs_len() != self.layers[0] {
            return Err(CostError::BadInputs(SizeMismatch {
                expected: self.layers[0],
                got: samples.inputs_len(),
            }));
        }
        if samples.outputs_len() != outputs_len {
            return Err(CostError::BadExpected(SizeMismatch {
                expected: outputs_len,
                got: samples.outputs_len(),
            }));
        }
        if samples.is_empty() {
            return Err(CostError::EmptySet);
        }

        let mut cost = 0.0;
        for sample in samples {
            self.clear_cache();
            self.set_inputs(&sample.inputs).map_err(CostError::BadInputs)?;

            for (index, &expected) in self.output_range().zip(sample.expected.iter()) {
                let diff = self.evaluate(index)? - expected;
                cost += diff * diff;
            }
        }

        Ok(cost / (samples.len() * outputs_len) as f64)
    }
}

/// Error structure for `Net::cost`
#[derive(Debug, Clone, PartialEq)]
pub enum CostError {
    EmptySet,
    BadInputs(SizeMismatch),
    BadExpected(SizeMismatch),
    Eval(EvalError),
}

impl From<EvalError> for CostError {
    fn from(err: EvalError) -> Self {
        CostError::Eval(err)
    }
}

impl fmt::Display for CostError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self {
            CostError::EmptySet => write!(f, "Cost of an empty sample set is undefined!"),
            CostError::BadInputs(SizeMismatch { expected, got }) => {
                write!(f, "Expected {} input(s), but samples have {}!", expected, got)
            }
            CostError::BadExpected(SizeMismatch { expected, got }) => write!(
                f,
                "Expected {} desired output(s), but samples have {}!",
                expected, got
            ),
            CostError::Eval(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for CostError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::sigmoid;
    use rand::{rngs::StdRng, SeedableRng};

    fn or_samples() -> SampleSet {
        SampleSet::from_pairs(&[
            (&[0.0, 0.0][..], &[0.0][..]),
            (&[0.0, 1.0][..], &[1.0][..]),
            (&[1.0, 0.0][..], &[1.0][..]),
            (&[1.0, 1.0][..], &[1.0][..]),
        ])
        .unwrap()
    }

    #[test]
    fn matches_hand_computed_mse() {
        let mut net = Net::with_coefficients(&[1], &[1.0, -0.5]).unwrap();
        let set = SampleSet::from_pairs(&[(&[0.0][..], &[0.0][..]), (&[2.0][..], &[1.0][..])]).unwrap();

        let a = sigmoid(-0.5);
        let b = sigmoid(1.5) - 1.0;
        let expected = (a * a + b * b) / 2.0;

        assert!((net.cost(&set).unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn averages_over_outputs_too() {
        // Two output units answering 0.5 against targets 1 and 0: 0.25 each
        let mut net = Net::with_coefficients(&[2], &[0.0; 6]).unwrap();
        let set = SampleSet::from_pairs(&[(&[1.0, 1.0][..], &[1.0, 0.0][..])]).unwrap();
        assert_eq!(net.cost(&set).unwrap(), 0.25);
    }

    #[test]
    fn is_deterministic_and_bounded() {
        let mut rng = StdRng::seed_from_u64(11);
        let set = or_samples();

        for layers in &[vec![2, 1], vec![2, 3, 1], vec![2, 2, 2, 1]] {
            let mut net = Net::new(layers, &mut rng).unwrap();
            let first = net.cost(&set).unwrap();
            assert_eq!(net.cost(&set).unwrap(), first);
            assert!((0.0..=1.0).contains(&first));
        }
    }

    #[test]
    fn rejects_mismatched_sets() {
        let mut net = Net::with_coefficients(&[2, 1], &[0.0; 9]).unwrap();

        assert_eq!(net.cost(&SampleSet::new(2, 1)), Err(CostError::EmptySet));
        assert_eq!(
            net.cost(&SampleSet::new(3, 1)),
            Err(CostError::BadInputs(SizeMismatch { expected: 2, got: 3 }))
        );
        assert_eq!(
            net.cost(&SampleSet::new(2, 2)),
            Err(CostError::BadExpected(SizeMismatch { expected: 1, got: 2 }))
        );
    }
}
