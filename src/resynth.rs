//! Inverse transform of aligned sources back to the time domain.

use crate::error::Result;
use crate::fft_backend::FftNum;
use crate::mdct::Imdct;
use crate::tensor::Tensor3;
use crate::window::Window;

/// Applies the IMDCT to every source of an aligned tensor.
pub struct Resynthesizer<T: FftNum> {
    imdct: Imdct<T>,
}

impl<T: FftNum> Resynthesizer<T> {
    pub fn new(window: Window<T>) -> Self {
        Self {
            imdct: Imdct::new(window),
        }
    }

    /// One mono signal per source channel of `aligned`.
    ///
    /// With `num_samples`, every output is truncated to that length, which
    /// should be the length of the analysed recordings.
    pub fn process(&self, aligned: &Tensor3<T>, num_samples: Option<usize>) -> Result<Vec<Vec<T>>> {
        (0..aligned.channels)
            .map(|source| {
                let grid = aligned.channel_grid(source);
                match num_samples {
                    Some(len) => self.imdct.process_truncated(&grid, len),
                    None => self.imdct.process(&grid),
                }
            })
            .collect()
    }
}
