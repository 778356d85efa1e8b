use crate::criteria::OutputCriterion;
use crate::engine::results::Capability;
use crate::error::SearchError;

/// Mixed-radix index over the parameter ranges.
///
/// The flat step index is decomposed with the **last** dimension varying
/// fastest: the stride of dimension `i` is the product of all lengths
/// after `i`, and `index_i = (step / stride_i) % length_i`. This ordering
/// is part of the output contract: it defines the row order of the
/// result file.
#[derive(Debug, Clone)]
pub struct Grid {
    lengths: Vec<usize>,
    strides: Vec<usize>,
    total: usize,
}

impl Grid {
    /// `lengths` holds one range length per input descriptor, in
    /// descriptor list order. Zero dimensions is an error; a zero length
    /// makes the grid empty (zero total steps), which is not an error.
    /// A step count that overflows `usize` is rejected.
    pub fn new(lengths: Vec<usize>) -> Result<Self, SearchError> {
        if lengths.is_empty() {
            return Err(SearchError::EmptyParameterSet);
        }

        let total = lengths
            .iter()
            .try_fold(1usize, |acc, &length| acc.checked_mul(length))
            .ok_or(SearchError::GridOverflow)?;
        let mut strides = vec![1usize; lengths.len()];
        for i in (0..lengths.len() - 1).rev() {
            strides[i] = strides[i + 1]
                .checked_mul(lengths[i + 1])
                .ok_or(SearchError::GridOverflow)?;
        }

        Ok(Self {
            lengths,
            strides,
            total,
        })
    }

    /// Total number of grid points: the product of all range lengths.
    pub fn total_steps(&self) -> usize {
        self.total
    }

    /// Decodes a flat step index into one range index per dimension.
    pub fn indices(&self, step: usize) -> Result<Vec<usize>, SearchError> {
        if step >= self.total {
            return Err(SearchError::StepOutOfRange {
                step,
                total: self.total,
            });
        }
        Ok(self
            .lengths
            .iter()
            .zip(&self.strides)
            .map(|(&length, &stride)| (step / stride) % length)
            .collect())
    }
}

/// Deduplicated, order-stable set of capabilities the criteria require.
///
/// Computed once per run: each capability is dispatched at most once per
/// grid point, in this order, no matter how many criteria consume it.
pub fn required_capabilities(criteria: &[Box<dyn OutputCriterion>]) -> Vec<Capability> {
    let mut capabilities = Vec::new();
    for criterion in criteria {
        for &capability in criterion.required_capabilities() {
            if !capabilities.contains(&capability) {
                capabilities.push(capability);
            }
        }
    }
    capabilities
}
