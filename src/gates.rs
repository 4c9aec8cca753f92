//! Two-input boolean gates as training scenarios

use std::fmt;

use crate::graph::SampleSet;

/// Every input combination of a two-input gate, in truth table order.
pub const INPUTS: [[f64; 2]; 4] = [[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    And,
    Or,
    Nand,
    Nor,
    Xor,
    Xnor,
}

impl Gate {
    pub const ALL: [Gate; 6] = [Gate::And, Gate::Or, Gate::Nand, Gate::Nor, Gate::Xor, Gate::Xnor];

    pub fn apply(self, a: bool, b: bool) -> bool {
        match self {
            Gate::And => a && b,
            Gate::Or => a || b,
            Gate::Nand => !(a && b),
            Gate::Nor => !(a || b),
            Gate::Xor => a != b,
            Gate::Xnor => a == b,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Gate::And => "AND",
            Gate::Or => "OR",
            Gate::Nand => "NAND",
            Gate::Nor => "NOR",
            Gate::Xor => "XOR",
            Gate::Xnor => "XNOR",
        }
    }

    /// Whether a single unit can separate the truth table.
    pub fn is_linearly_separable(self) -> bool {
        !matches!(self, Gate::Xor | Gate::Xnor)
    }

    /// Expected output for a row of `INPUTS`, as `0.0` or `1.0`.
    pub fn expected(self, inputs: [f64; 2]) -> f64 {
        if self.apply(inputs[0] > 0.5, inputs[1] > 0.5) {
            1.0
        } else {
            0.0
        }
    }

    /// The four row truth table, with 2 inputs and 1 expected output per sample.
    ///
    /// # Examples
    /// ```
    /// # use fdnnet::gates::Gate;
    /// let set = Gate::And.samples();
    /// assert_eq!(set.len(), 4);
    /// let ones = set.iter().filter(|sample| sample.expected[0] == 1.0).count();
    /// assert_eq!(ones, 1);
    /// ```
    pub fn samples(self) -> SampleSet {
        INPUTS
            .iter()
            .map(|&inputs| (inputs, [self.expected(inputs)]))
            .collect()
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truth_tables() {
        let column = |gate: Gate| -> Vec<f64> { INPUTS.iter().map(|&i| gate.expected(i)).collect() };

        assert_eq!(column(Gate::And), vec![0.0, 0.0, 0.0, 1.0]);
        assert_eq!(column(Gate::Or), vec![0.0, 1.0, 1.0, 1.0]);
        assert_eq!(column(Gate::Nand), vec![1.0, 1.0, 1.0, 0.0]);
        assert_eq!(column(Gate::Nor), vec![1.0, 0.0, 0.0, 0.0]);
        assert_eq!(column(Gate::Xor), vec![0.0, 1.0, 1.0, 0.0]);
        assert_eq!(column(Gate::Xnor), vec![1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn samples_follow_input_order() {
        let set = Gate::Xor.samples();
        let rows: Vec<(Vec<f64>, f64)> = set
            .iter()
            .map(|sample| (sample.inputs.to_vec(), sample.expected[0]))
            .collect();

        assert_eq!(rows[1], (vec![0.0, 1.0], 1.0));
        assert_eq!(rows[3], (vec![1.0, 1.0], 0.0));
        assert_eq!((set.inputs_len(), set.outputs_len()), (2, 1));
    }

    #[test]
    fn every_gate_builds_a_full_table() {
        for &gate in Gate::ALL.iter() {
            let set = gate.samples();
            assert_eq!(set.len(), INPUTS.len(), "{}", gate);
            for (sample, inputs) in set.iter().zip(INPUTS.iter()) {
                assert_eq!(&*sample.inputs, &inputs[..]);
                assert_eq!(&*sample.expected, &[gate.expected(*inputs)]);
            }
        }
    }

    #[test]
    fn separability() {
        assert!(Gate::Nand.is_linearly_separable());
        assert!(!Gate::Xnor.is_linearly_separable());
    }
}
