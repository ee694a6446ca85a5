//! Flat tensors shared by the separation stages.
//!
//! [`Tensor3`] holds `(channel, frame, bin)` data; the observation tensor,
//! the separated tensor and the aligned tensor all use it. [`Matrix`] is the
//! 2-D exchange format at the separator boundary.

use crate::error::{BssError, Result};
use crate::fft_backend::FftNum;
use crate::mdct::TimeFrequencyGrid;

/// Row-major matrix
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix<T> {
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<T>,
}

impl<T: FftNum> Matrix<T> {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![T::zero(); rows * cols],
        }
    }

    pub fn identity(size: usize) -> Self {
        let mut matrix = Self::zeros(size, size);
        for i in 0..size {
            matrix.set(i, i, T::one());
        }
        matrix
    }

    pub fn from_data(rows: usize, cols: usize, data: Vec<T>) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(BssError::mismatch(
                "matrix",
                format!("{} values ({}x{})", rows * cols, rows, cols),
                data.len(),
            ));
        }
        Ok(Self { rows, cols, data })
    }

    /// Build from nested rows; every row must have the same length.
    pub fn from_rows(rows: &[Vec<T>]) -> Result<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(rows.len() * cols);
        for row in rows {
            if row.len() != cols {
                return Err(BssError::mismatch("matrix row", cols, row.len()));
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            rows: rows.len(),
            cols,
            data,
        })
    }

    /// `(rows, cols)`
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> T {
        self.data[row * self.cols + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: T) {
        self.data[row * self.cols + col] = value;
    }

    pub fn row(&self, row: usize) -> &[T] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// Matrix product `self * rhs`.
    pub fn matmul(&self, rhs: &Matrix<T>) -> Result<Matrix<T>> {
        if self.cols != rhs.rows {
            return Err(BssError::mismatch(
                "matrix product",
                format!("{} rows on the right-hand side", self.cols),
                rhs.rows,
            ));
        }
        let mut out = Matrix::zeros(self.rows, rhs.cols);
        for i in 0..self.rows {
            for k in 0..self.cols {
                let a = self.get(i, k);
                if a == T::zero() {
                    continue;
                }
                let rhs_row = rhs.row(k);
                let out_row = &mut out.data[i * rhs.cols..(i + 1) * rhs.cols];
                for (o, &b) in out_row.iter_mut().zip(rhs_row) {
                    *o = *o + a * b;
                }
            }
        }
        Ok(out)
    }

    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|x| x.is_finite())
    }
}

/// Dense `(channel, frame, bin)` tensor.
///
/// Stored as `data[(channel * frames + frame) * bins + bin]`, so every
/// channel is laid out exactly like a frame-major [`TimeFrequencyGrid`].
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor3<T> {
    pub channels: usize,
    pub frames: usize,
    pub bins: usize,
    pub data: Vec<T>,
}

impl<T: FftNum> Tensor3<T> {
    pub fn zeros(channels: usize, frames: usize, bins: usize) -> Self {
        Self {
            channels,
            frames,
            bins,
            data: vec![T::zero(); channels * frames * bins],
        }
    }

    pub fn from_data(channels: usize, frames: usize, bins: usize, data: Vec<T>) -> Result<Self> {
        let expected = channels * frames * bins;
        if data.len() != expected {
            return Err(BssError::mismatch(
                "tensor",
                format!("{} values ({}x{}x{})", expected, channels, frames, bins),
                data.len(),
            ));
        }
        Ok(Self {
            channels,
            frames,
            bins,
            data,
        })
    }

    /// Stack grids of identical shape as consecutive channels.
    pub fn from_channel_grids(grids: &[TimeFrequencyGrid<T>]) -> Result<Self> {
        let Some(first) = grids.first() else {
            return Err(BssError::config("at least one channel grid is required"));
        };
        let (bins, frames) = first.shape();

        let mut data = Vec::with_capacity(grids.len() * frames * bins);
        for grid in grids {
            if grid.shape() != (bins, frames) {
                return Err(BssError::mismatch(
                    "channel grids",
                    format!("{} bins x {} frames", bins, frames),
                    format!("{} bins x {} frames", grid.freq_bins, grid.num_frames),
                ));
            }
            data.extend_from_slice(&grid.data);
        }

        Ok(Self {
            channels: grids.len(),
            frames,
            bins,
            data,
        })
    }

    /// `(channels, frames, bins)`
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.channels, self.frames, self.bins)
    }

    #[inline]
    fn index(&self, channel: usize, frame: usize, bin: usize) -> usize {
        (channel * self.frames + frame) * self.bins + bin
    }

    #[inline]
    pub fn get(&self, channel: usize, frame: usize, bin: usize) -> T {
        self.data[self.index(channel, frame, bin)]
    }

    #[inline]
    pub fn set(&mut self, channel: usize, frame: usize, bin: usize, value: T) {
        let idx = self.index(channel, frame, bin);
        self.data[idx] = value;
    }

    /// All `(frame, bin)` values of one channel.
    pub fn channel(&self, channel: usize) -> &[T] {
        let len = self.frames * self.bins;
        &self.data[channel * len..(channel + 1) * len]
    }

    /// Copy one channel out as a time-frequency grid.
    pub fn channel_grid(&self, channel: usize) -> TimeFrequencyGrid<T> {
        TimeFrequencyGrid {
            freq_bins: self.bins,
            num_frames: self.frames,
            data: self.channel(channel).to_vec(),
        }
    }

    /// The `(channels, frames)` slice at one frequency bin.
    pub fn bin_matrix(&self, bin: usize) -> Matrix<T> {
        let mut matrix = Matrix::zeros(self.channels, self.frames);
        for channel in 0..self.channels {
            for frame in 0..self.frames {
                matrix.set(channel, frame, self.get(channel, frame, bin));
            }
        }
        matrix
    }

    /// Overwrite the slice at one frequency bin.
    pub fn set_bin_matrix(&mut self, bin: usize, matrix: &Matrix<T>) -> Result<()> {
        if matrix.shape() != (self.channels, self.frames) {
            return Err(BssError::mismatch(
                "bin slice",
                format!("{}x{}", self.channels, self.frames),
                format!("{}x{}", matrix.rows, matrix.cols),
            ));
        }
        for channel in 0..self.channels {
            for frame in 0..self.frames {
                self.set(channel, frame, bin, matrix.get(channel, frame));
            }
        }
        Ok(())
    }

    /// Energy of one channel at one bin over all frames.
    pub fn bin_energy(&self, channel: usize, bin: usize) -> T {
        (0..self.frames).fold(T::zero(), |acc, frame| {
            let x = self.get(channel, frame, bin);
            acc + x * x
        })
    }
}

/// Left and right MDCT grids of one sensor.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorGrids<T> {
    pub left: TimeFrequencyGrid<T>,
    pub right: TimeFrequencyGrid<T>,
}

/// Stack per-sensor stereo grids into the `(2N, T, F)` observation tensor.
///
/// Channel `2i` holds the left grid of sensor `i`, channel `2i + 1` the right.
///
/// # Errors
///
/// `InvalidConfiguration` for an empty sensor list, `DimensionMismatch` when
/// any grid differs in shape from the first one.
pub fn observation_tensor<T: FftNum>(sensors: &[SensorGrids<T>]) -> Result<Tensor3<T>> {
    if sensors.is_empty() {
        return Err(BssError::config("at least one sensor is required"));
    }

    let grids: Vec<TimeFrequencyGrid<T>> = sensors
        .iter()
        .flat_map(|sensor| [sensor.left.clone(), sensor.right.clone()])
        .collect();
    let tensor = Tensor3::from_channel_grids(&grids)?;

    log::debug!(
        "observation tensor: {} channels x {} frames x {} bins",
        tensor.channels,
        tensor.frames,
        tensor.bins
    );

    Ok(tensor)
}
