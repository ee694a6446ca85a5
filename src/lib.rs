/*MIT License

Copyright (c) 2025 David Maseda Neira

Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the "Software"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
*/

//! Frequency-domain blind source separation of convolutive mixtures.
//!
//! Each of `N` stereo sensors is taken to the frequency domain with a
//! critically sampled MDCT. Every frequency bin is then an instantaneous
//! mixture that an external [`Separator`] can unmix, at the price of an
//! arbitrary source order per bin. [`BandAligner`] restores a consistent
//! order across bins by scoring the continuity of spectral-centroid
//! trajectories, and [`Resynthesizer`] brings the aligned sources back to
//! the time domain.
//!
//! ```
//! use mdct_bss::prelude::*;
//!
//! let config = SeparationConfig::new(1)
//!     .with_block_length(16)
//!     .with_depth(2)
//!     .with_observation_window(0, 4);
//! let pipeline = ConvolutiveSeparation::<f64>::new(config).unwrap();
//!
//! let left: Vec<f64> = (0..64).map(|i| (i as f64 * 0.3).sin()).collect();
//! let sensor = StereoSignal::new(left.clone(), vec![0.0; 64]).unwrap();
//! let output = pipeline.run(&[sensor], &FixedUnmixing::<f64>::left_channels(1)).unwrap();
//!
//! assert_eq!(output.sources[0].len(), 64);
//! assert!((output.sources[0][10] - left[10]).abs() < 1e-9);
//! ```

pub mod align;
pub mod centroid;
pub mod config;
pub mod error;
pub mod fft_backend;
pub mod mdct;
pub mod permutation;
pub mod pipeline;
pub mod resynth;
pub mod separator;
pub mod simd;
pub mod tensor;
pub mod utils;
pub mod window;

#[cfg(feature = "visualization")]
pub mod visualization;

pub mod prelude {
    pub use crate::{
        Alignment, BandAligner, BandDecision, BssError, ConvolutiveSeparation, FixedUnmixing,
        Imdct, Matrix, Mdct, Resynthesizer, Separation, SeparationConfig, SeparationOutput,
        Separator, SeparatorError, StereoSignal, Tensor3, TimeFrequencyGrid, Window, WindowShape,
    };
}

pub use align::{Alignment, BandAligner, BandDecision, DEFAULT_IDENTITY_MARGIN};
pub use centroid::{BandCentroidCache, ContinuityScorer, normalized_frequency};
pub use config::SeparationConfig;
pub use error::{BssError, Result};
pub use fft_backend::{Complex, FftBackend, FftNum, FftPlanner};
pub use mdct::{Imdct, Mdct, TimeFrequencyGrid, frame_count};
pub use permutation::{MAX_BRANCHES, PermutationTable};
pub use pipeline::{ConvolutiveSeparation, SeparationOutput};
pub use resynth::Resynthesizer;
pub use separator::{FixedUnmixing, Separation, Separator, SeparatorError, separate_bins};
pub use tensor::{Matrix, SensorGrids, Tensor3, observation_tensor};
pub use utils::{StereoSignal, deinterleave, interleave};
pub use window::{MAX_KAISER_ALPHA, Window, WindowShape};

#[cfg(feature = "visualization")]
pub use visualization::{ColorMap, GridImageExt, VisualizationConfig};

// Type aliases for common use cases
pub type MdctF32 = Mdct<f32>;
pub type MdctF64 = Mdct<f64>;
pub type ImdctF32 = Imdct<f32>;
pub type ImdctF64 = Imdct<f64>;
pub type WindowF32 = Window<f32>;
pub type WindowF64 = Window<f64>;
pub type TimeFrequencyGridF32 = TimeFrequencyGrid<f32>;
pub type TimeFrequencyGridF64 = TimeFrequencyGrid<f64>;
pub type ConvolutiveSeparationF32 = ConvolutiveSeparation<f32>;
pub type ConvolutiveSeparationF64 = ConvolutiveSeparation<f64>;
