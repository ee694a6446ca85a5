//! Boundary to the external per-bin separation algorithm.
//!
//! The joint-diagonalization algorithm itself lives outside this crate. Here
//! it is a capability: anything implementing [`Separator`] can be run over
//! every frequency bin of an observation tensor. Results are validated before
//! they reach the alignment stage, because a malformed bin would silently
//! corrupt every later alignment decision.

use std::error::Error;

use crate::error::{BssError, Result};
use crate::fft_backend::FftNum;
use crate::tensor::{Matrix, Tensor3};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Error type returned by separator implementations.
pub type SeparatorError = Box<dyn Error + Send + Sync>;

/// Output of one separator call.
#[derive(Debug, Clone, PartialEq)]
pub struct Separation<T> {
    /// `N x 2N` unmixing matrix
    pub unmixing: Matrix<T>,
    /// `N x T` separated sources
    pub sources: Matrix<T>,
}

/// Per-bin blind separation capability.
///
/// `observations` is the `(2N, T)` slice of the observation tensor at one
/// frequency bin. Implementations must be deterministic and free of side
/// effects; no assumption is made about the order of the returned sources.
pub trait Separator<T: FftNum>: Sync {
    fn separate(&self, observations: &Matrix<T>) -> std::result::Result<Separation<T>, SeparatorError>;
}

impl<T, F> Separator<T> for F
where
    T: FftNum,
    F: Fn(&Matrix<T>) -> std::result::Result<Separation<T>, SeparatorError> + Sync,
{
    fn separate(&self, observations: &Matrix<T>) -> std::result::Result<Separation<T>, SeparatorError> {
        self(observations)
    }
}

/// Separator that applies the same unmixing matrix to every bin.
///
/// Useful when the mixing is known, and as a deterministic stand-in for a
/// real separation algorithm.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedUnmixing<T> {
    unmixing: Matrix<T>,
}

impl<T: FftNum> FixedUnmixing<T> {
    pub fn new(unmixing: Matrix<T>) -> Self {
        Self { unmixing }
    }

    /// Route the left channel of sensor `i` to source `i`.
    pub fn left_channels(num_sources: usize) -> Self {
        let mut unmixing = Matrix::zeros(num_sources, 2 * num_sources);
        for source in 0..num_sources {
            unmixing.set(source, 2 * source, T::one());
        }
        Self { unmixing }
    }
}

impl<T: FftNum> Separator<T> for FixedUnmixing<T> {
    fn separate(&self, observations: &Matrix<T>) -> std::result::Result<Separation<T>, SeparatorError> {
        let sources = self.unmixing.matmul(observations)?;
        Ok(Separation {
            unmixing: self.unmixing.clone(),
            sources,
        })
    }
}

/// Run `separator` on every frequency bin of `observations`.
///
/// Returns the `(N, T, F)` separated tensor. Bins are independent and, with
/// the `parallel` feature, processed concurrently in no particular order.
///
/// # Errors
///
/// `DimensionMismatch` if the tensor does not have `2 * num_sources`
/// channels, `SeparationFailure` if any bin fails validation.
pub fn separate_bins<T, S>(
    observations: &Tensor3<T>,
    num_sources: usize,
    separator: &S,
) -> Result<Tensor3<T>>
where
    T: FftNum,
    S: Separator<T> + ?Sized,
{
    if observations.channels != 2 * num_sources || num_sources == 0 {
        return Err(BssError::mismatch(
            "observation tensor channels",
            format!("{} (two per source)", 2 * num_sources),
            observations.channels,
        ));
    }

    let separate_one = |bin: usize| -> Result<Matrix<T>> {
        let slice = observations.bin_matrix(bin);
        let separation = separator
            .separate(&slice)
            .map_err(|e| BssError::SeparationFailure {
                bin,
                reason: e.to_string(),
            })?;
        validate_separation(bin, &separation, num_sources, observations.frames)?;
        Ok(separation.sources)
    };

    #[cfg(feature = "parallel")]
    let per_bin: Vec<Matrix<T>> = (0..observations.bins)
        .into_par_iter()
        .map(separate_one)
        .collect::<Result<Vec<_>>>()?;

    #[cfg(not(feature = "parallel"))]
    let per_bin: Vec<Matrix<T>> = (0..observations.bins)
        .map(separate_one)
        .collect::<Result<Vec<_>>>()?;

    let mut separated = Tensor3::zeros(num_sources, observations.frames, observations.bins);
    for (bin, sources) in per_bin.iter().enumerate() {
        separated.set_bin_matrix(bin, sources)?;
    }

    log::debug!(
        "separated {} bins into {} sources x {} frames",
        observations.bins,
        num_sources,
        observations.frames
    );

    Ok(separated)
}

fn validate_separation<T: FftNum>(
    bin: usize,
    separation: &Separation<T>,
    num_sources: usize,
    frames: usize,
) -> Result<()> {
    let failure = |reason: String| BssError::SeparationFailure { bin, reason };

    if separation.unmixing.shape() != (num_sources, 2 * num_sources) {
        return Err(failure(format!(
            "unmixing matrix is {}x{}, expected {}x{}",
            separation.unmixing.rows,
            separation.unmixing.cols,
            num_sources,
            2 * num_sources
        )));
    }
    if separation.sources.shape() != (num_sources, frames) {
        return Err(failure(format!(
            "sources are {}x{}, expected {}x{}",
            separation.sources.rows, separation.sources.cols, num_sources, frames
        )));
    }
    if !separation.unmixing.is_finite() || !separation.sources.is_finite() {
        return Err(failure("separator returned non-finite values".to_string()));
    }
    Ok(())
}
