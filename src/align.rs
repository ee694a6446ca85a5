//! Cross-band permutation alignment.
//!
//! Bin-wise separation leaves the source order arbitrary in every bin. The
//! aligner walks band groups of `depth` bins from low to high frequency and,
//! for each group, keeps the candidate assignment whose spectral-centroid
//! trajectory is the least erratic over a short observation window. Genuine
//! sources have a slowly varying timbre; a wrong assignment mixes two
//! sources and makes the centroid jump.
//!
//! A branch label `p` at level `k` is a cyclic shift of the source axis for
//! bin `k` of the group: output source `s` takes separated row
//! `(s + p) mod N`. With two sources the labels are exactly keep and swap.
//!
//! The lowest band group fixes the reference source order and is never
//! reordered. Above it, a branch other than the identity is only taken when
//! its cost undercuts the identity's by the configured margin.

use num_traits::Float;

use crate::centroid::{BandCentroidCache, ContinuityScorer};
use crate::config::SeparationConfig;
use crate::error::{BssError, Result};
use crate::fft_backend::FftNum;
use crate::permutation::PermutationTable;
use crate::tensor::Tensor3;
use crate::utils::cast;

/// The branch chosen for one band group.
#[derive(Debug, Clone, PartialEq)]
pub struct BandDecision<T> {
    pub band: usize,
    /// Row of the permutation table
    pub branch: usize,
    /// Per-bin cyclic shifts of that row
    pub labels: Vec<usize>,
    /// Mean absolute centroid step of the chosen branch, summed over sources
    pub mean_delta: T,
}

impl<T> BandDecision<T> {
    /// True when the decision leaves every bin of the group as it was.
    pub fn is_identity(&self) -> bool {
        self.labels.iter().all(|&label| label == 0)
    }
}

/// Output of [`BandAligner::align`].
#[derive(Debug, Clone)]
pub struct Alignment<T> {
    /// `(N, T, F)` tensor with a globally consistent source axis
    pub sources: Tensor3<T>,
    /// One decision per band group, lowest frequency first
    pub decisions: Vec<BandDecision<T>>,
    /// Per-source centroid trajectories of the winning branches
    pub cache: BandCentroidCache<T>,
}

/// Relative cost reduction a reordering must achieve over the identity.
pub const DEFAULT_IDENTITY_MARGIN: f64 = 0.6;

/// Resolves the permutation ambiguity of a separated tensor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandAligner {
    depth: usize,
    window_start: usize,
    window_frames: usize,
    identity_margin: f64,
}

impl BandAligner {
    /// `depth` bins per band group; the observation window covers frames
    /// `window_start .. window_start + window_frames`.
    pub fn new(depth: usize, window_start: usize, window_frames: usize) -> Result<Self> {
        if depth == 0 {
            return Err(BssError::config("alignment depth must be positive"));
        }
        if window_frames < 2 {
            return Err(BssError::config(format!(
                "observation window needs at least 2 frames, got {}",
                window_frames
            )));
        }
        Ok(Self {
            depth,
            window_start,
            window_frames,
            identity_margin: DEFAULT_IDENTITY_MARGIN,
        })
    }

    /// Reorder a band only when the best branch costs less than
    /// `(1 - margin)` times the identity. A margin of 0 takes the plain
    /// minimum.
    pub fn with_identity_margin(mut self, margin: f64) -> Result<Self> {
        if !(0.0..1.0).contains(&margin) {
            return Err(BssError::config(format!(
                "identity margin must lie in [0, 1), got {}",
                margin
            )));
        }
        self.identity_margin = margin;
        Ok(self)
    }

    pub fn from_config(config: &SeparationConfig) -> Result<Self> {
        Self::new(config.depth, config.window_start, config.window_frames)?
            .with_identity_margin(config.identity_margin)
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn window_start(&self) -> usize {
        self.window_start
    }

    pub fn window_frames(&self) -> usize {
        self.window_frames
    }

    pub fn identity_margin(&self) -> f64 {
        self.identity_margin
    }

    /// Align the `(N, T, F)` separated tensor.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` for a tensor without sources, and
    /// `InvalidConfiguration` when `F` is not a multiple of the depth, when
    /// the observation window runs past the last frame, or when `N^depth`
    /// exceeds the permutation table limit.
    pub fn align<T: FftNum>(&self, separated: &Tensor3<T>) -> Result<Alignment<T>> {
        let (num_sources, frames, bins) = separated.shape();
        if num_sources == 0 {
            return Err(BssError::mismatch(
                "separated tensor",
                "at least one source",
                num_sources,
            ));
        }
        if bins % self.depth != 0 {
            return Err(BssError::config(format!(
                "{} frequency bins cannot be grouped in bands of {}",
                bins, self.depth
            )));
        }
        if self.window_start + self.window_frames > frames {
            return Err(BssError::config(format!(
                "observation window {}..{} exceeds the {} available frames",
                self.window_start,
                self.window_start + self.window_frames,
                frames
            )));
        }

        let table = PermutationTable::new(self.depth, num_sources)?;
        let num_bands = bins / self.depth;
        let scorer =
            ContinuityScorer::new(separated, &table, self.window_start, self.window_frames);
        let mut cache = BandCentroidCache::new(num_sources, self.window_frames, num_bands);
        let mut aligned = Tensor3::zeros(num_sources, frames, bins);
        let mut decisions = Vec::with_capacity(num_bands);
        let keep: T = cast(1.0 - self.identity_margin);

        log::debug!(
            "aligning {} bands of {} bins, {} candidate branches each",
            num_bands,
            self.depth,
            table.num_branches()
        );

        for band in 0..num_bands {
            if self.is_silent(separated, band) {
                log::warn!(
                    "band {} is silent over the observation window, keeping its order",
                    band
                );
            }

            let (best, cost) = if band == 0 {
                // Reference order for every band above.
                (0, scorer.branch_cost(band, 0, &cache))
            } else {
                let totals: Vec<T> = (0..table.num_branches())
                    .map(|branch| scorer.branch_cost(band, branch, &cache))
                    .collect();

                // First minimum wins; NaN never compares below a finite score.
                let mut best = 0;
                for (branch, &total) in totals.iter().enumerate() {
                    if total < totals[best] || (totals[best].is_nan() && !total.is_nan()) {
                        best = branch;
                    }
                }
                let identity = totals[0];
                if best != 0 && identity.is_finite() && totals[best] >= identity * keep {
                    best = 0;
                }
                (best, totals[best])
            };

            cache.push_band(&scorer.trajectories(band, best))?;
            self.apply_branch(separated, &mut aligned, band, table.branch(best));

            let decision = BandDecision {
                band,
                branch: best,
                labels: table.branch(best).to_vec(),
                mean_delta: cost,
            };
            log::trace!(
                "band {}: branch {} {:?} (mean delta {:?})",
                band,
                decision.branch,
                decision.labels,
                decision.mean_delta
            );
            decisions.push(decision);
        }

        let changed = decisions.iter().filter(|d| !d.is_identity()).count();
        log::debug!("alignment reordered {} of {} bands", changed, num_bands);

        Ok(Alignment {
            sources: aligned,
            decisions,
            cache,
        })
    }

    fn is_silent<T: FftNum>(&self, separated: &Tensor3<T>, band: usize) -> bool {
        let frames = self.window_start..self.window_start + self.window_frames;
        let bins = band * self.depth..(band + 1) * self.depth;
        (0..separated.channels).all(|source| {
            frames.clone().all(|frame| {
                bins.clone()
                    .all(|bin| separated.get(source, frame, bin) == T::zero())
            })
        })
    }

    fn apply_branch<T: FftNum>(
        &self,
        separated: &Tensor3<T>,
        aligned: &mut Tensor3<T>,
        band: usize,
        labels: &[usize],
    ) {
        let num_sources = separated.channels;
        for (level, &shift) in labels.iter().enumerate() {
            let bin = band * self.depth + level;
            for source in 0..num_sources {
                let row = (source + shift) % num_sources;
                for frame in 0..separated.frames {
                    aligned.set(source, frame, bin, separated.get(row, frame, bin));
                }
            }
        }
    }
}
