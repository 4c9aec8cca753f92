use std::fmt;
use std::iter::FromIterator;

use super::net::SizeMismatch;

/// A single training example.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub inputs: Box<[f64]>,
    pub expected: Box<[f64]>,
}

/// Ordered set of `(inputs, expected outputs)` pairs of fixed widths.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleSet {
    inputs_len: usize,
    outputs_len: usize,
    samples: Vec<Sample>,
}

impl SampleSet {
    /// Returns an empty set for samples of the given widths.
    pub fn new(inputs_len: usize, outputs_len: usize) -> SampleSet {
        SampleSet {
            inputs_len,
            outputs_len,
            samples: Vec::new(),
        }
    }

    /// Builds a set from pairs of slices, arrays or vectors, taking the widths
    /// from the first pair.
    ///
    /// # Returns
    /// * `Ok(SampleSet)` if every pair has the widths of the first;
    /// * `Err(SampleError)` for the first pair that doesn't.
    ///
    /// # Examples
    /// ```
    /// # use fdnnet::graph::SampleSet;
    /// let set = SampleSet::from_pairs(&[
    ///     (&[0.0, 1.0][..], &[1.0][..]),
    ///     (&[1.0, 1.0][..], &[0.0][..]),
    /// ]).unwrap();
    /// assert_eq!(set.len(), 2);
    /// assert_eq!(set.inputs_len(), 2);
    /// ```
    pub fn from_pairs<I, E>(pairs: &[(I, E)]) -> Result<SampleSet, SampleError>
    where
        I: AsRef<[f64]>,
        E: AsRef<[f64]>,
    {
        let (inputs_len, outputs_len) = match pairs.first() {
            Some((inputs, expected)) => (inputs.as_ref().len(), expected.as_ref().len()),
            None => (0, 0),
        };

        let mut set = SampleSet::new(inputs_len, outputs_len);
        for (inputs, expected) in pairs {
            set.push(inputs.as_ref(), expected.as_ref())?;
        }
        Ok(set)
    }

    /// Appends a sample.
    ///
    /// # Returns
    /// * `Ok(())` if `inputs` and `expected` have the set's widths;
    /// * `Err(SampleError)` otherwise, leaving the set unchanged.
    pub fn push(&mut self, inputs: &[f64], expected: &[f64]) -> Result<(), SampleError> {
        if inputs.len() != self.inputs_len {
            return Err(SampleError::BadInputs(SizeMismatch {
                expected: self.inputs_len,
                got: inputs.len(),
            }));
        }
        if expected.len() != self.outputs_len {
            return Err(SampleError::BadExpected(SizeMismatch {
                expected: self.outputs_len,
                got: expected.len(),
            }));
        }

        self.samples.push(Sample {
            inputs: inputs.into(),
            expected: expected.into(),
        });
        Ok(())
    }

    pub fn inputs_len(&self) -> usize {
        self.inputs_len
    }

    pub fn outputs_len(&self) -> usize {
        self.outputs_len
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sample> {
        self.samples.iter()
    }
}

/// Collects fixed-size rows into a set, the widths coming from the array types.
///
/// # Examples
/// ```
/// # use fdnnet::graph::SampleSet;
/// let set: SampleSet = vec![([0.0, 1.0], [1.0]), ([1.0, 1.0], [0.0])]
///     .into_iter()
///     .collect();
/// assert_eq!((set.inputs_len(), set.outputs_len()), (2, 1));
/// ```
impl<const I: usize, const O: usize> FromIterator<([f64; I], [f64; O])> for SampleSet {
    fn from_iter<T: IntoIterator<Item = ([f64; I], [f64; O])>>(rows: T) -> SampleSet {
        let samples = rows
            .into_iter()
            .map(|(inputs, expected)| Sample {
                inputs: inputs[..].into(),
                expected: expected[..].into(),
            })
            .collect();

        SampleSet {
            inputs_len: I,
            outputs_len: O,
            samples,
        }
    }
}

impl<'a> IntoIterator for &'a SampleSet {
    type Item = &'a Sample;
    type IntoIter = std::slice::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

/// Error structure for `SampleSet::push`
#[derive(Debug, Clone, PartialEq)]
pub enum SampleError {
    BadInputs(SizeMismatch),
    BadExpected(SizeMismatch),
}

impl fmt::Display for SampleError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self {
            SampleError::BadInputs(SizeMismatch { expected, got }) => {
                write!(f, "Expected {} sample input(s), but got {}!", expected, got)
            }
            SampleError::BadExpected(SizeMismatch { expected, got }) => write!(
                f,
                "Expected {} sample desired output(s), but got {}!",
                expected, got
            ),
        }
    }
}

impl std::error::Error for SampleError {}
