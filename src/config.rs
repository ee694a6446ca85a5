//! Configuration surface of the convolutive separation pipeline.

use crate::align::DEFAULT_IDENTITY_MARGIN;
use crate::error::{BssError, Result};
use crate::permutation::MAX_BRANCHES;
use crate::window::WindowShape;

/// Options accepted by [`crate::ConvolutiveSeparation`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SeparationConfig {
    /// Transform block length `L` in samples; yields `L/2` frequency bins
    pub block_length: usize,
    /// Analysis/synthesis window family
    pub window: WindowShape,
    /// Number of sources `N`, which is also the number of stereo sensors
    pub num_sources: usize,
    /// Number of adjacent bins `d` decided together by the aligner
    pub depth: usize,
    /// First frame `t0` of the centroid observation window
    pub window_start: usize,
    /// Length `l` of the centroid observation window in frames
    pub window_frames: usize,
    /// Relative cost reduction over the identity required to reorder a band
    pub identity_margin: f64,
}

impl Default for SeparationConfig {
    /// 512-sample blocks with a KBD window (alpha = 5), two sources,
    /// four-bin band groups, a 20-frame window starting at frame 0 and
    /// [`DEFAULT_IDENTITY_MARGIN`].
    fn default() -> Self {
        Self {
            block_length: 512,
            window: WindowShape::default(),
            num_sources: 2,
            depth: 4,
            window_start: 0,
            window_frames: 20,
            identity_margin: DEFAULT_IDENTITY_MARGIN,
        }
    }
}

impl SeparationConfig {
    pub fn new(num_sources: usize) -> Self {
        Self {
            num_sources,
            ..Self::default()
        }
    }

    pub fn with_block_length(mut self, block_length: usize) -> Self {
        self.block_length = block_length;
        self
    }

    pub fn with_window(mut self, window: WindowShape) -> Self {
        self.window = window;
        self
    }

    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    /// Observe frames `start .. start + frames` when scoring branches.
    pub fn with_observation_window(mut self, start: usize, frames: usize) -> Self {
        self.window_start = start;
        self.window_frames = frames;
        self
    }

    /// `0` reorders a band whenever any branch scores below the identity.
    pub fn with_identity_margin(mut self, margin: f64) -> Self {
        self.identity_margin = margin;
        self
    }

    /// Number of MDCT frequency bins
    pub fn freq_bins(&self) -> usize {
        self.block_length / 2
    }

    /// Candidate branches per band group: `N^d`
    pub fn num_branches(&self) -> Option<usize> {
        u32::try_from(self.depth)
            .ok()
            .and_then(|d| self.num_sources.checked_pow(d))
    }

    /// Check every option that does not depend on the input signals.
    pub fn validate(&self) -> Result<()> {
        if self.block_length == 0 || self.block_length % 2 != 0 {
            return Err(BssError::config(format!(
                "block length must be a positive even number, got {}",
                self.block_length
            )));
        }
        self.window.validate()?;
        if self.num_sources == 0 {
            return Err(BssError::config("at least one source is required"));
        }
        if self.depth == 0 {
            return Err(BssError::config("alignment depth must be positive"));
        }
        if self.freq_bins() % self.depth != 0 {
            return Err(BssError::config(format!(
                "{} frequency bins cannot be grouped in bands of {}",
                self.freq_bins(),
                self.depth
            )));
        }
        if self.window_frames < 2 {
            return Err(BssError::config(format!(
                "observation window needs at least 2 frames, got {}",
                self.window_frames
            )));
        }
        if !(0.0..1.0).contains(&self.identity_margin) {
            return Err(BssError::config(format!(
                "identity margin must lie in [0, 1), got {}",
                self.identity_margin
            )));
        }
        match self.num_branches() {
            Some(n) if n <= MAX_BRANCHES => Ok(()),
            _ => Err(BssError::config(format!(
                "{}^{} candidate branches exceed the limit of {}",
                self.num_sources, self.depth, MAX_BRANCHES
            ))),
        }
    }
}
