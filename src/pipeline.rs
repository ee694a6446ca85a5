//! End-to-end convolutive separation: analysis, per-bin separation,
//! permutation alignment and resynthesis.

use crate::align::{BandAligner, BandDecision};
use crate::config::SeparationConfig;
use crate::error::{BssError, Result};
use crate::fft_backend::FftNum;
use crate::mdct::Mdct;
use crate::resynth::Resynthesizer;
use crate::separator::{Separator, separate_bins};
use crate::tensor::{SensorGrids, Tensor3, observation_tensor};
use crate::utils::StereoSignal;
use crate::window::Window;

/// Result of [`ConvolutiveSeparation::run`].
#[derive(Debug, Clone)]
pub struct SeparationOutput<T> {
    /// One mono signal per estimated source, as long as the input recordings
    pub sources: Vec<Vec<T>>,
    /// Alignment decision of every band group
    pub decisions: Vec<BandDecision<T>>,
}

/// Frequency-domain separation of `N` stereo sensors into `N` sources.
///
/// Transform plans and the window are built once and reused for every run.
pub struct ConvolutiveSeparation<T: FftNum> {
    config: SeparationConfig,
    mdct: Mdct<T>,
    resynthesizer: Resynthesizer<T>,
    aligner: BandAligner,
}

impl<T: FftNum> ConvolutiveSeparation<T> {
    pub fn new(config: SeparationConfig) -> Result<Self> {
        config.validate()?;
        let window = Window::new(config.block_length, config.window)?;
        let aligner = BandAligner::from_config(&config)?;

        Ok(Self {
            mdct: Mdct::new(window.clone()),
            resynthesizer: Resynthesizer::new(window),
            aligner,
            config,
        })
    }

    pub fn config(&self) -> &SeparationConfig {
        &self.config
    }

    /// Transform every sensor and stack the grids into the `(2N, T, F)`
    /// observation tensor.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` if the sensor count differs from the configured
    /// number of sources, `DimensionMismatch` if the recordings differ in
    /// length.
    pub fn analyze(&self, sensors: &[StereoSignal<T>]) -> Result<Tensor3<T>> {
        if sensors.len() != self.config.num_sources {
            return Err(BssError::config(format!(
                "expected {} stereo sensors, got {}",
                self.config.num_sources,
                sensors.len()
            )));
        }
        let num_samples = sensors[0].len();
        for sensor in sensors {
            if sensor.left.len() != num_samples || sensor.right.len() != num_samples {
                return Err(BssError::mismatch(
                    "sensor recordings",
                    format!("{} samples per channel", num_samples),
                    format!(
                        "{} left / {} right samples",
                        sensor.left.len(),
                        sensor.right.len()
                    ),
                ));
            }
        }

        let grids: Vec<SensorGrids<T>> = sensors
            .iter()
            .map(|sensor| SensorGrids {
                left: self.mdct.process(&sensor.left),
                right: self.mdct.process(&sensor.right),
            })
            .collect();

        observation_tensor(&grids)
    }

    /// Separate `sensors` using `separator` on every frequency bin.
    pub fn run<S>(&self, sensors: &[StereoSignal<T>], separator: &S) -> Result<SeparationOutput<T>>
    where
        S: Separator<T> + ?Sized,
    {
        let observations = self.analyze(sensors)?;
        let num_samples = sensors[0].len();
        log::info!(
            "separating {} sensors of {} samples: {} bins x {} frames",
            sensors.len(),
            num_samples,
            observations.bins,
            observations.frames
        );

        let separated = separate_bins(&observations, self.config.num_sources, separator)?;
        let alignment = self.aligner.align(&separated)?;
        let sources = self
            .resynthesizer
            .process(&alignment.sources, Some(num_samples))?;

        log::info!(
            "resynthesized {} sources, {} of {} bands reordered",
            sources.len(),
            alignment
                .decisions
                .iter()
                .filter(|decision| !decision.is_identity())
                .count(),
            alignment.decisions.len()
        );

        Ok(SeparationOutput {
            sources,
            decisions: alignment.decisions,
        })
    }
}
