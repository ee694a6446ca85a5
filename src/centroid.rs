//! Spectral-centroid continuity scoring for candidate band assignments.
//!
//! For a band group, a candidate branch and an output source, the centroid
//! is the energy-weighted mean normalized frequency over the group's bins,
//! each bin contributing the separated row the branch routes to that source.
//! Once lower bands are resolved, every output source's centroid is expressed
//! relative to the mean centroid of that same source over the resolved
//! bands, so a track that moves together with the spectrum already aligned
//! below it has a flat trajectory.

use num_traits::Float;

use crate::error::{BssError, Result};
use crate::fft_backend::FftNum;
use crate::permutation::PermutationTable;
use crate::tensor::Tensor3;
use crate::utils::{cast, cast_usize};

/// Per-source centroid trajectories of the bands resolved so far.
///
/// Bands are only ever appended, in increasing frequency order. Each band
/// stores one trajectory of `window_frames` values per output source.
#[derive(Debug, Clone, PartialEq)]
pub struct BandCentroidCache<T> {
    num_sources: usize,
    window_frames: usize,
    resolved: usize,
    // values[(band * num_sources + source) * window_frames + offset]
    values: Vec<T>,
}

impl<T: FftNum> BandCentroidCache<T> {
    pub fn new(num_sources: usize, window_frames: usize, num_bands: usize) -> Self {
        Self {
            num_sources,
            window_frames,
            resolved: 0,
            values: Vec::with_capacity(num_sources * window_frames * num_bands),
        }
    }

    pub fn num_sources(&self) -> usize {
        self.num_sources
    }

    pub fn window_frames(&self) -> usize {
        self.window_frames
    }

    /// Number of bands appended so far
    pub fn resolved_bands(&self) -> usize {
        self.resolved
    }

    #[inline]
    pub fn get(&self, band: usize, source: usize, offset: usize) -> T {
        self.values[(band * self.num_sources + source) * self.window_frames + offset]
    }

    /// Trajectory of output `source` in resolved `band`.
    pub fn trajectory(&self, band: usize, source: usize) -> &[T] {
        let start = (band * self.num_sources + source) * self.window_frames;
        &self.values[start..start + self.window_frames]
    }

    /// Append the next band: `num_sources` trajectories, source-major.
    pub fn push_band(&mut self, trajectories: &[T]) -> Result<()> {
        let expected = self.num_sources * self.window_frames;
        if trajectories.len() != expected {
            return Err(BssError::mismatch(
                "band centroid trajectories",
                format!(
                    "{} sources x {} offsets",
                    self.num_sources, self.window_frames
                ),
                trajectories.len(),
            ));
        }
        self.values.extend_from_slice(trajectories);
        self.resolved += 1;
        Ok(())
    }

    /// Mean centroid of `source` over every resolved band at `offset`.
    pub fn context(&self, source: usize, offset: usize) -> Option<T> {
        if self.resolved == 0 {
            return None;
        }
        let sum = (0..self.resolved).fold(T::zero(), |acc, band| {
            acc + self.get(band, source, offset)
        });
        Some(sum / cast_usize(self.resolved))
    }
}

/// Normalized center frequency of `bin` on a grid of `freq_bins` bins.
///
/// `(bin + 0.5 + F/2) / F`
pub fn normalized_frequency<T: Float>(bin: usize, freq_bins: usize) -> T {
    let f = freq_bins as f64;
    cast((bin as f64 + 0.5 + f / 2.0) / f)
}

/// Scores candidate branches of one band group against the separated tensor.
pub struct ContinuityScorer<'a, T: FftNum> {
    sources: &'a Tensor3<T>,
    table: &'a PermutationTable,
    window_start: usize,
    window_frames: usize,
}

impl<'a, T: FftNum> ContinuityScorer<'a, T> {
    /// `sources` is the `(N, T, F)` separated tensor and `table` holds the
    /// candidate branches for groups of `table.depth()` bins. Scoring looks
    /// at frames `window_start .. window_start + window_frames`.
    pub fn new(
        sources: &'a Tensor3<T>,
        table: &'a PermutationTable,
        window_start: usize,
        window_frames: usize,
    ) -> Self {
        Self {
            sources,
            table,
            window_start,
            window_frames,
        }
    }

    pub fn depth(&self) -> usize {
        self.table.depth()
    }

    pub fn num_sources(&self) -> usize {
        self.sources.channels
    }

    /// Centroid of the track `branch` routes to output `source` in `band`,
    /// at window `offset`, ignoring resolved context.
    pub fn band_centroid(&self, band: usize, branch: usize, source: usize, offset: usize) -> T {
        let depth = self.depth();
        let num_sources = self.num_sources();
        let frame = self.window_start + offset;
        let freq_bins = self.sources.bins;

        let mut weighted = T::zero();
        let mut energy = T::zero();
        let mut plain = T::zero();
        for level in 0..depth {
            let bin = band * depth + level;
            let row = (source + self.table.label(branch, level)) % num_sources;
            let x = self.sources.get(row, frame, bin);
            let freq: T = normalized_frequency(bin, freq_bins);
            weighted = weighted + x * x * freq;
            energy = energy + x * x;
            plain = plain + freq;
        }

        if energy <= T::epsilon() * T::epsilon() {
            // Silent group: fall back to the unweighted center.
            plain / cast_usize(depth)
        } else {
            weighted / energy
        }
    }

    /// Centroid of `source` under `branch` at `offset`, relative to that
    /// source's resolved context.
    pub fn blended_centroid(
        &self,
        band: usize,
        branch: usize,
        source: usize,
        offset: usize,
        cache: &BandCentroidCache<T>,
    ) -> T {
        let centroid = self.band_centroid(band, branch, source, offset);
        match cache.context(source, offset) {
            Some(context) => centroid - context,
            None => centroid,
        }
    }

    /// Mean absolute step of the blended centroid over the observation
    /// window, summed over every output source.
    pub fn branch_cost(&self, band: usize, branch: usize, cache: &BandCentroidCache<T>) -> T {
        let steps = cast_usize::<T>(self.window_frames - 1);
        (0..self.num_sources()).fold(T::zero(), |total, source| {
            let mut previous = self.blended_centroid(band, branch, source, 0, cache);
            let mut variation = T::zero();
            for offset in 1..self.window_frames {
                let current = self.blended_centroid(band, branch, source, offset, cache);
                variation = variation + Float::abs(current - previous);
                previous = current;
            }
            total + variation / steps
        })
    }

    /// Raw trajectories of every output source under `branch`, source-major,
    /// in the layout [`BandCentroidCache::push_band`] expects.
    pub fn trajectories(&self, band: usize, branch: usize) -> Vec<T> {
        (0..self.num_sources())
            .flat_map(|source| {
                (0..self.window_frames)
                    .map(move |offset| self.band_centroid(band, branch, source, offset))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_frequency() {
        let f: f64 = normalized_frequency(0, 8);
        assert!((f - 4.5 / 8.0).abs() < 1e-15);
        let f: f64 = normalized_frequency(7, 8);
        assert!((f - 11.5 / 8.0).abs() < 1e-15);
    }

    #[test]
    fn test_energy_weighted_centroid() {
        // One source, two bins, all energy in bin 1.
        let mut tensor = Tensor3::<f64>::zeros(1, 1, 2);
        tensor.set(0, 0, 1, -3.0);
        let table = PermutationTable::new(2, 1).unwrap();
        let scorer = ContinuityScorer::new(&tensor, &table, 0, 1);
        let c = scorer.band_centroid(0, 0, 0, 0);
        assert!((c - normalized_frequency::<f64>(1, 2)).abs() < 1e-12);
    }

    #[test]
    fn test_branch_routes_rows_per_source() {
        // Source 0 owns bin 0, source 1 owns bin 1.
        let mut tensor = Tensor3::<f64>::zeros(2, 1, 2);
        tensor.set(0, 0, 0, 1.0);
        tensor.set(1, 0, 1, 1.0);
        let table = PermutationTable::new(2, 2).unwrap();
        let scorer = ContinuityScorer::new(&tensor, &table, 0, 1);
        let low = normalized_frequency::<f64>(0, 2);
        let high = normalized_frequency::<f64>(1, 2);

        // Branch 0 = [0, 0]: each output keeps its own row.
        assert!((scorer.band_centroid(0, 0, 0, 0) - low).abs() < 1e-12);
        assert!((scorer.band_centroid(0, 0, 1, 0) - high).abs() < 1e-12);
        // Branch 1 = [0, 1]: bin 1 is exchanged, so both bins land in source 0.
        let both = (low + high) / 2.0;
        assert!((scorer.band_centroid(0, 1, 0, 0) - both).abs() < 1e-12);
        let silent = scorer.band_centroid(0, 1, 1, 0);
        assert!((silent - both).abs() < 1e-12);
    }

    #[test]
    fn test_silent_group_uses_plain_mean() {
        let tensor = Tensor3::<f32>::zeros(2, 3, 4);
        let table = PermutationTable::new(2, 2).unwrap();
        let scorer = ContinuityScorer::new(&tensor, &table, 0, 3);
        let expected = (normalized_frequency::<f32>(2, 4) + normalized_frequency::<f32>(3, 4)) / 2.0;
        assert!((scorer.band_centroid(1, 3, 1, 1) - expected).abs() < 1e-6);
    }

    #[test]
    fn test_context_is_per_source_mean() {
        let mut cache = BandCentroidCache::<f64>::new(2, 2, 3);
        assert_eq!(cache.context(0, 0), None);
        cache.push_band(&[0.5, 0.6, 0.9, 1.2]).unwrap();
        cache.push_band(&[0.7, 1.0, 1.1, 1.0]).unwrap();
        assert_eq!(cache.resolved_bands(), 2);
        assert!((cache.context(0, 1).unwrap() - 0.8).abs() < 1e-12);
        assert!((cache.context(1, 0).unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(cache.trajectory(1, 1), &[1.1, 1.0]);
        assert!(cache.push_band(&[0.1, 0.2]).is_err());
    }

    #[test]
    fn test_blended_centroid_subtracts_own_context() {
        let mut tensor = Tensor3::<f64>::zeros(2, 2, 2);
        tensor.set(0, 0, 1, 1.0);
        tensor.set(0, 1, 1, 1.0);
        let table = PermutationTable::new(1, 2).unwrap();
        let scorer = ContinuityScorer::new(&tensor, &table, 0, 2);

        let mut cache = BandCentroidCache::new(2, 2, 2);
        cache.push_band(&[0.25, 0.5, 1.0, 1.0]).unwrap();
        let raw = normalized_frequency::<f64>(1, 2);
        assert!((scorer.blended_centroid(1, 0, 0, 0, &cache) - (raw - 0.25)).abs() < 1e-12);
        assert!((scorer.blended_centroid(1, 0, 0, 1, &cache) - (raw - 0.5)).abs() < 1e-12);
        // Source 0 moves by 0.25 against its context; source 1 is silent and flat.
        assert!((scorer.branch_cost(1, 0, &cache) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_trajectories_layout() {
        let data: Vec<f64> = (0..2 * 3 * 2).map(|x| x as f64 + 1.0).collect();
        let tensor = Tensor3::from_data(2, 3, 2, data).unwrap();
        let table = PermutationTable::new(2, 2).unwrap();
        let scorer = ContinuityScorer::new(&tensor, &table, 1, 2);
        let trajectories = scorer.trajectories(0, 2);
        assert_eq!(trajectories.len(), 4);
        assert_eq!(trajectories[3], scorer.band_centroid(0, 2, 1, 1));
    }
}
