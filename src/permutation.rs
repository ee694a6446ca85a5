//! Enumeration of candidate source assignments over a group of bins.
//!
//! A band group of `depth` adjacent bins admits `branching^depth` candidate
//! assignments: one label in `0..branching` per bin. The table lists them in
//! lexicographic order, the first column being the most significant digit.

use crate::error::{BssError, Result};

/// Upper bound on the number of rows a table may have.
pub const MAX_BRANCHES: usize = 1 << 20;

/// All length-`depth` sequences over `0..branching`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermutationTable {
    depth: usize,
    branching: usize,
    labels: Vec<usize>,
}

impl PermutationTable {
    /// Enumerate every branch for `depth` levels with `branching` children
    /// per node.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` if either parameter is zero or the table would
    /// exceed [`MAX_BRANCHES`] rows.
    pub fn new(depth: usize, branching: usize) -> Result<Self> {
        if depth == 0 || branching == 0 {
            return Err(BssError::config(format!(
                "permutation depth and branching factor must be positive, got {} and {}",
                depth, branching
            )));
        }
        let num_branches = u32::try_from(depth)
            .ok()
            .and_then(|d| branching.checked_pow(d))
            .filter(|&n| n <= MAX_BRANCHES)
            .ok_or_else(|| {
                BssError::config(format!(
                    "{}^{} candidate branches exceed the limit of {}",
                    branching, depth, MAX_BRANCHES
                ))
            })?;

        let mut labels = vec![0; num_branches * depth];
        for (branch, row) in labels.chunks_exact_mut(depth).enumerate() {
            let mut rest = branch;
            for slot in row.iter_mut().rev() {
                *slot = rest % branching;
                rest /= branching;
            }
        }

        Ok(Self {
            depth,
            branching,
            labels,
        })
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn branching(&self) -> usize {
        self.branching
    }

    pub fn num_branches(&self) -> usize {
        self.labels.len() / self.depth
    }

    /// Labels of one branch, one per level.
    pub fn branch(&self, index: usize) -> &[usize] {
        &self.labels[index * self.depth..(index + 1) * self.depth]
    }

    #[inline]
    pub fn label(&self, branch: usize, level: usize) -> usize {
        self.labels[branch * self.depth + level]
    }

    pub fn iter(&self) -> impl Iterator<Item = &[usize]> + '_ {
        self.labels.chunks_exact(self.depth)
    }
}
