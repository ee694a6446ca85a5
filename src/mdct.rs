//! Modified discrete cosine transform and its inverse, computed with an FFT.
//!
//! Frames are `L` samples long with a hop of `L/2`, giving a critically
//! sampled grid of `L/2` real coefficients per frame. The inverse overlap-adds
//! windowed frames so that the aliasing of neighbouring frames cancels.

use std::sync::Arc;

use crate::error::{BssError, Result};
use crate::fft_backend::{Complex, FftBackend, FftNum, FftPlanner};
use crate::simd;
use crate::utils::cast;
use crate::window::Window;

/// Real time-frequency grid produced by [`Mdct`].
///
/// Stored frame-major: `data[frame * freq_bins + bin]`.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeFrequencyGrid<T> {
    pub freq_bins: usize,
    pub num_frames: usize,
    pub data: Vec<T>,
}

impl<T: FftNum> TimeFrequencyGrid<T> {
    pub fn new(freq_bins: usize, num_frames: usize) -> Self {
        Self {
            freq_bins,
            num_frames,
            data: vec![T::zero(); freq_bins * num_frames],
        }
    }

    /// Wrap an existing frame-major buffer.
    pub fn from_data(freq_bins: usize, num_frames: usize, data: Vec<T>) -> Result<Self> {
        if data.len() != freq_bins * num_frames {
            return Err(BssError::mismatch(
                "time-frequency grid",
                format!("{} values ({} bins x {} frames)", freq_bins * num_frames, freq_bins, num_frames),
                data.len(),
            ));
        }
        Ok(Self {
            freq_bins,
            num_frames,
            data,
        })
    }

    /// `(freq_bins, num_frames)`
    pub fn shape(&self) -> (usize, usize) {
        (self.freq_bins, self.num_frames)
    }

    #[inline]
    pub fn get(&self, bin: usize, frame: usize) -> T {
        self.data[frame * self.freq_bins + bin]
    }

    #[inline]
    pub fn set(&mut self, bin: usize, frame: usize, value: T) {
        self.data[frame * self.freq_bins + bin] = value;
    }

    /// All coefficients of one frame.
    pub fn frame(&self, frame: usize) -> &[T] {
        &self.data[frame * self.freq_bins..(frame + 1) * self.freq_bins]
    }

    pub fn frame_mut(&mut self, frame: usize) -> &mut [T] {
        &mut self.data[frame * self.freq_bins..(frame + 1) * self.freq_bins]
    }
}

/// Number of MDCT frames produced for `num_samples` samples.
///
/// `ceil(2 * num_samples / block_length) + 1`
pub fn frame_count(num_samples: usize, block_length: usize) -> usize {
    (2 * num_samples).div_ceil(block_length) + 1
}

/// Forward MDCT
pub struct Mdct<T: FftNum> {
    window: Window<T>,
    fft: Arc<dyn FftBackend<T>>,
    pre_rotation: Vec<Complex<T>>,
    post_rotation: Vec<Complex<T>>,
}

impl<T: FftNum> Mdct<T> {
    pub fn new(window: Window<T>) -> Self {
        let block_length = window.len();
        let half = window.half_len();
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(block_length);

        let l = block_length as f64;
        let pre_rotation = (0..block_length)
            .map(|n| unit_phasor(-core::f64::consts::PI * n as f64 / l))
            .collect();
        let post_rotation = (0..half)
            .map(|k| {
                unit_phasor(-core::f64::consts::PI * (half as f64 + 1.0) * (k as f64 + 0.5) / l)
            })
            .collect();

        Self {
            window,
            fft,
            pre_rotation,
            post_rotation,
        }
    }

    pub fn window(&self) -> &Window<T> {
        &self.window
    }

    pub fn block_length(&self) -> usize {
        self.window.len()
    }

    pub fn freq_bins(&self) -> usize {
        self.window.half_len()
    }

    /// Transform a whole signal into a `(L/2, T)` grid.
    pub fn process(&self, signal: &[T]) -> TimeFrequencyGrid<T> {
        let block_length = self.block_length();
        let hop = self.freq_bins();
        let num_frames = frame_count(signal.len(), block_length);

        // L/2 zeros in front, zeros up to (T + 1) * L/2 behind.
        let mut padded = vec![T::zero(); (num_frames + 1) * hop];
        padded[hop..hop + signal.len()].copy_from_slice(signal);

        let mut grid = TimeFrequencyGrid::new(hop, num_frames);
        let mut windowed = vec![T::zero(); block_length];
        let mut fft_buffer = vec![Complex::new(T::zero(), T::zero()); block_length];
        let mut scratch = self.fft.make_scratch();

        for frame_idx in 0..num_frames {
            let start = frame_idx * hop;
            simd::apply_window(
                &padded[start..start + block_length],
                self.window.as_slice(),
                &mut windowed,
            );

            for ((slot, &x), &rot) in fft_buffer
                .iter_mut()
                .zip(windowed.iter())
                .zip(self.pre_rotation.iter())
            {
                *slot = rot * x;
            }

            self.fft.process_with_scratch(&mut fft_buffer, &mut scratch);

            for ((out, value), &rot) in grid
                .frame_mut(frame_idx)
                .iter_mut()
                .zip(fft_buffer.iter())
                .zip(self.post_rotation.iter())
            {
                *out = (value * rot).re;
            }
        }

        log::trace!(
            "mdct: {} samples -> {} bins x {} frames",
            signal.len(),
            hop,
            num_frames
        );

        grid
    }

    /// Transform several channels with the same plan.
    pub fn process_multichannel(&self, channels: &[Vec<T>]) -> Vec<TimeFrequencyGrid<T>> {
        channels.iter().map(|channel| self.process(channel)).collect()
    }
}

/// Inverse MDCT with time-domain aliasing cancellation
pub struct Imdct<T: FftNum> {
    window: Window<T>,
    fft: Arc<dyn FftBackend<T>>,
    pre_rotation: Vec<Complex<T>>,
    post_rotation: Vec<Complex<T>>,
}

impl<T: FftNum> Imdct<T> {
    pub fn new(window: Window<T>) -> Self {
        let block_length = window.len();
        let bins = window.half_len();
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(block_length);

        let two_f = block_length as f64;
        let f = bins as f64;
        let pre_rotation = (0..bins)
            .map(|k| unit_phasor(-core::f64::consts::PI * (f + 1.0) * k as f64 / two_f))
            .collect();
        // The 1/F normalization is folded into the post-rotation.
        let post_rotation = (0..block_length)
            .map(|n| {
                unit_phasor(-core::f64::consts::PI * (n as f64 + 0.5 + f / 2.0) / two_f)
                    * cast::<T>(1.0 / f)
            })
            .collect();

        Self {
            window,
            fft,
            pre_rotation,
            post_rotation,
        }
    }

    pub fn window(&self) -> &Window<T> {
        &self.window
    }

    pub fn freq_bins(&self) -> usize {
        self.window.half_len()
    }

    /// Number of samples [`Imdct::process`] returns for `num_frames` frames.
    pub fn output_len(&self, num_frames: usize) -> usize {
        self.freq_bins() * num_frames.saturating_sub(1)
    }

    /// Reconstruct the signal covered by `grid`.
    ///
    /// Returns `F * (T - 1)` samples: the overlap-add buffer without its
    /// leading pre-padding and its trailing single-frame region. The result
    /// is at least as long as the signal that produced the grid.
    pub fn process(&self, grid: &TimeFrequencyGrid<T>) -> Result<Vec<T>> {
        let bins = self.freq_bins();
        if grid.freq_bins != bins {
            return Err(BssError::mismatch(
                "imdct",
                format!("{} frequency bins", bins),
                grid.freq_bins,
            ));
        }

        let block_length = self.window.len();
        let num_frames = grid.num_frames;
        let mut overlap_buffer = vec![T::zero(); bins * (num_frames + 1)];
        let mut fft_buffer = vec![Complex::new(T::zero(), T::zero()); block_length];
        let mut frame_real = vec![T::zero(); block_length];
        let mut scratch = self.fft.make_scratch();
        let two = cast::<T>(2.0);

        for frame_idx in 0..num_frames {
            for ((slot, &x), &rot) in fft_buffer
                .iter_mut()
                .zip(grid.frame(frame_idx).iter())
                .zip(self.pre_rotation.iter())
            {
                *slot = rot * x;
            }
            for slot in fft_buffer[bins..].iter_mut() {
                *slot = Complex::new(T::zero(), T::zero());
            }

            self.fft.process_with_scratch(&mut fft_buffer, &mut scratch);

            for ((out, value), &rot) in frame_real
                .iter_mut()
                .zip(fft_buffer.iter())
                .zip(self.post_rotation.iter())
            {
                *out = (value * rot).re;
            }

            let pos = frame_idx * bins;
            simd::overlap_add_windowed(
                &frame_real,
                self.window.as_slice(),
                two,
                &mut overlap_buffer[pos..pos + block_length],
            );
        }

        let end = bins * num_frames.max(1);
        Ok(overlap_buffer[bins..end].to_vec())
    }

    /// Reconstruct exactly `num_samples` samples, the length of the signal
    /// that was transformed.
    pub fn process_truncated(
        &self,
        grid: &TimeFrequencyGrid<T>,
        num_samples: usize,
    ) -> Result<Vec<T>> {
        let available = self.output_len(grid.num_frames);
        if num_samples > available {
            return Err(BssError::mismatch(
                "imdct output length",
                format!("at most {} samples", available),
                num_samples,
            ));
        }
        let mut signal = self.process(grid)?;
        signal.truncate(num_samples);
        Ok(signal)
    }

    /// Reconstruct several channels with the same plan.
    pub fn process_multichannel(&self, grids: &[TimeFrequencyGrid<T>]) -> Result<Vec<Vec<T>>> {
        grids.iter().map(|grid| self.process(grid)).collect()
    }
}

fn unit_phasor<T: FftNum>(phase: f64) -> Complex<T> {
    Complex::new(cast(phase.cos()), cast(phase.sin()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::WindowShape;

    fn max_abs_error(a: &[f64], b: &[f64]) -> f64 {
        a.iter()
            .zip(b.iter())
            .map(|(x, y)| (x - y).abs())
            .fold(0.0, f64::max)
    }

    #[test]
    fn test_frame_count() {
        assert_eq!(frame_count(0, 8), 1);
        assert_eq!(frame_count(4, 8), 2);
        assert_eq!(frame_count(5, 8), 3);
        assert_eq!(frame_count(3000, 512), 13);
    }

    #[test]
    fn test_grid_shape() {
        let window = Window::<f64>::new(16, WindowShape::default()).unwrap();
        let mdct = Mdct::new(window);
        let grid = mdct.process(&vec![0.5; 37]);
        assert_eq!(grid.shape(), (8, frame_count(37, 16)));
        assert_eq!(grid.data.len(), 8 * grid.num_frames);
    }

    #[test]
    fn test_matches_direct_cosine_sum() {
        // X[k] = sum_n w[n] x[n] cos(2 pi / L (n + 1/2 + L/4)(k + 1/2))
        let block_length = 8;
        let window = Window::<f64>::new(block_length, WindowShape::Sine).unwrap();
        let w = window.as_slice().to_vec();
        let mdct = Mdct::new(window);

        let signal: Vec<f64> = (0..12).map(|i| ((i * 7 % 5) as f64) - 2.0).collect();
        let grid = mdct.process(&signal);

        let hop = block_length / 2;
        let mut padded = vec![0.0; (grid.num_frames + 1) * hop];
        padded[hop..hop + signal.len()].copy_from_slice(&signal);

        let l = block_length as f64;
        for frame in 0..grid.num_frames {
            for k in 0..hop {
                let expected: f64 = (0..block_length)
                    .map(|n| {
                        let phase = 2.0 * core::f64::consts::PI / l
                            * (n as f64 + 0.5 + l / 4.0)
                            * (k as f64 + 0.5);
                        w[n] * padded[frame * hop + n] * phase.cos()
                    })
                    .sum();
                assert!(
                    (grid.get(k, frame) - expected).abs() < 1e-10,
                    "frame {}, bin {}: {} vs {}",
                    frame,
                    k,
                    grid.get(k, frame),
                    expected
                );
            }
        }
    }

    #[test]
    fn test_roundtrip_kbd() {
        let window = Window::<f64>::new(64, WindowShape::KaiserBessel { alpha: 4.0 }).unwrap();
        let mdct = Mdct::new(window.clone());
        let imdct = Imdct::new(window);

        let original: Vec<f64> = (0..1000).map(|i| (i as f64 * 0.013).sin() * 0.7).collect();
        let grid = mdct.process(&original);
        let reconstructed = imdct.process(&grid).unwrap();

        assert!(reconstructed.len() >= original.len());
        let error = max_abs_error(&original, &reconstructed[..original.len()]);
        assert!(error < 1e-12, "max error {}", error);
    }

    #[test]
    fn test_imdct_rejects_wrong_bin_count() {
        let imdct = Imdct::new(Window::<f32>::new(16, WindowShape::Sine).unwrap());
        let grid = TimeFrequencyGrid::<f32>::new(4, 3);
        assert!(matches!(
            imdct.process(&grid),
            Err(BssError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_process_truncated_too_long() {
        let window = Window::<f32>::new(8, WindowShape::Sine).unwrap();
        let mdct = Mdct::new(window.clone());
        let imdct = Imdct::new(window);
        let grid = mdct.process(&[1.0; 10]);
        assert_eq!(imdct.process_truncated(&grid, 10).unwrap().len(), 10);
        assert!(imdct.process_truncated(&grid, 1000).is_err());
    }

    #[test]
    fn test_empty_signal() {
        let window = Window::<f32>::new(8, WindowShape::Vorbis).unwrap();
        let mdct = Mdct::new(window.clone());
        let imdct = Imdct::new(window);
        let grid = mdct.process(&[]);
        assert_eq!(grid.num_frames, 1);
        assert!(imdct.process(&grid).unwrap().is_empty());
    }
}
