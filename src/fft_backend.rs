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

//! FFT backend abstraction layer
//!
//! Both block transforms only ever need a forward complex FFT: the MDCT runs
//! one of length L per frame and the IMDCT one of length 2F = L. This module
//! hides the concrete FFT library behind [`FftBackend`] so the transforms only
//! see a planned, reusable object that works on caller-provided scratch.

use std::sync::Arc;

use num_traits::{Float, FromPrimitive};

pub use rustfft::num_complex::Complex;

/// Sample type accepted by every transform in the crate (`f32` or `f64`).
pub trait FftNum: Float + FromPrimitive + rustfft::FftNum + Send + Sync + 'static {}

impl FftNum for f32 {}
impl FftNum for f64 {}

/// A planned FFT of fixed size
pub trait FftBackend<T: FftNum>: Send + Sync {
    /// Transform `buffer` in place, using `scratch` as working memory.
    ///
    /// `scratch` must hold at least [`FftBackend::scratch_len`] elements.
    fn process_with_scratch(&self, buffer: &mut [Complex<T>], scratch: &mut [Complex<T>]);

    /// Scratch length required by [`FftBackend::process_with_scratch`]
    fn scratch_len(&self) -> usize;

    /// Get the FFT size
    fn len(&self) -> usize;

    /// Check if FFT size is zero (always false for valid FFTs)
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Allocate a zeroed scratch buffer of the required length.
    fn make_scratch(&self) -> Vec<Complex<T>> {
        vec![Complex::new(T::zero(), T::zero()); self.scratch_len()]
    }
}

struct RustFftWrapper<T: FftNum> {
    fft: Arc<dyn rustfft::Fft<T>>,
}

impl<T: FftNum> FftBackend<T> for RustFftWrapper<T> {
    fn process_with_scratch(&self, buffer: &mut [Complex<T>], scratch: &mut [Complex<T>]) {
        self.fft.process_with_scratch(buffer, scratch);
    }

    fn scratch_len(&self) -> usize {
        self.fft.get_inplace_scratch_len()
    }

    fn len(&self) -> usize {
        self.fft.len()
    }
}

/// FFT planner backed by rustfft.
///
/// Plans are cached by rustfft, so planning the same size twice is cheap.
pub struct FftPlanner<T: FftNum> {
    planner: rustfft::FftPlanner<T>,
}

impl<T: FftNum> FftPlanner<T> {
    pub fn new() -> Self {
        Self {
            planner: rustfft::FftPlanner::new(),
        }
    }

    /// Plan a forward FFT of the given size
    pub fn plan_fft_forward(&mut self, size: usize) -> Arc<dyn FftBackend<T>> {
        Arc::new(RustFftWrapper {
            fft: self.planner.plan_fft_forward(size),
        })
    }
}

impl<T: FftNum> Default for FftPlanner<T> {
    fn default() -> Self {
        Self::new()
    }
}
