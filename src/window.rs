//! Analysis/synthesis windows for the lapped transform.
//!
//! Every window built here satisfies the Princen-Bradley condition
//! `w[n]^2 + w[n + L/2]^2 = 1`, which is what makes the MDCT followed by the
//! windowed IMDCT an identity (time-domain aliasing cancellation).

use core::f64::consts::PI;
use num_traits::Float;

use crate::error::{BssError, Result};
use crate::utils::cast;

/// Window family used for both analysis and synthesis.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WindowShape {
    /// Kaiser-Bessel-derived window (AC-3). `alpha` controls the trade-off
    /// between main-lobe width and side-lobe rejection; the Kaiser beta is
    /// `pi * alpha`.
    KaiserBessel { alpha: f64 },
    /// Plain sine window
    Sine,
    /// Power-complementary slope window of the Vorbis codec
    Vorbis,
}

impl Default for WindowShape {
    fn default() -> Self {
        WindowShape::KaiserBessel { alpha: 5.0 }
    }
}

/// Largest accepted Kaiser `alpha`. Above it `I0(pi * alpha)` leaves the
/// range of `f64`.
pub const MAX_KAISER_ALPHA: f64 = 200.0;

impl WindowShape {
    /// Check the shape parameter.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` if a Kaiser `alpha` is not finite or lies
    /// outside `0 ..= MAX_KAISER_ALPHA`.
    pub fn validate(&self) -> Result<()> {
        if let WindowShape::KaiserBessel { alpha } = *self {
            if !(0.0..=MAX_KAISER_ALPHA).contains(&alpha) {
                return Err(BssError::config(format!(
                    "Kaiser alpha must lie in [0, {}], got {}",
                    MAX_KAISER_ALPHA, alpha
                )));
            }
        }
        Ok(())
    }
}

/// Immutable window of length equal to the transform block length.
#[derive(Debug, Clone, PartialEq)]
pub struct Window<T: Float> {
    shape: WindowShape,
    values: Vec<T>,
}

impl<T: Float> Window<T> {
    /// Build a window of `block_length` samples.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` if `block_length` is zero or odd, or if the
    /// shape parameter is rejected by [`WindowShape::validate`].
    pub fn new(block_length: usize, shape: WindowShape) -> Result<Self> {
        if block_length == 0 || block_length % 2 != 0 {
            return Err(BssError::config(format!(
                "block length must be a positive even number, got {}",
                block_length
            )));
        }
        shape.validate()?;

        let values = match shape {
            WindowShape::KaiserBessel { alpha } => kaiser_bessel_derived(block_length, alpha),
            WindowShape::Sine => (0..block_length)
                .map(|n| (PI * (n as f64 + 0.5) / block_length as f64).sin())
                .collect(),
            WindowShape::Vorbis => (0..block_length)
                .map(|n| {
                    let s = (PI * (n as f64 + 0.5) / block_length as f64).sin();
                    (0.5 * PI * s * s).sin()
                })
                .collect(),
        };

        Ok(Self {
            shape,
            values: values.into_iter().map(cast).collect(),
        })
    }

    /// Kaiser-Bessel-derived window with the given `alpha`.
    pub fn kaiser_bessel_derived(block_length: usize, alpha: f64) -> Result<Self> {
        Self::new(block_length, WindowShape::KaiserBessel { alpha })
    }

    pub fn shape(&self) -> WindowShape {
        self.shape
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Half the block length, which is also the number of MDCT bins.
    pub fn half_len(&self) -> usize {
        self.values.len() / 2
    }

    pub fn as_slice(&self) -> &[T] {
        &self.values
    }

    /// Largest deviation of `w[n]^2 + w[n + L/2]^2` from one.
    pub fn princen_bradley_deviation(&self) -> T {
        let half = self.half_len();
        (0..half)
            .map(|n| {
                let a = self.values[n];
                let b = self.values[n + half];
                (a * a + b * b - T::one()).abs()
            })
            .fold(T::zero(), T::max)
    }
}

/// Fold a Kaiser window of `L/2 + 1` points into a KBD window of `L` points.
///
/// The first half is the square root of the normalized cumulative sum of the
/// Kaiser window, the second half its mirror image.
fn kaiser_bessel_derived(block_length: usize, alpha: f64) -> Vec<f64> {
    let half = block_length / 2;
    let kaiser = kaiser_window(half + 1, PI * alpha);
    let total: f64 = kaiser.iter().sum();

    let mut rising = Vec::with_capacity(half);
    let mut acc = 0.0;
    for &k in &kaiser[..half] {
        acc += k;
        rising.push((acc / total).sqrt());
    }

    let mut window = rising.clone();
    window.extend(rising.iter().rev());
    window
}

fn kaiser_window(len: usize, beta: f64) -> Vec<f64> {
    if len == 1 {
        return vec![1.0];
    }
    let m = (len - 1) as f64;
    let norm = bessel_i0(beta);
    (0..len)
        .map(|n| {
            let ratio = 2.0 * n as f64 / m - 1.0;
            bessel_i0(beta * (1.0 - ratio * ratio).max(0.0).sqrt()) / norm
        })
        .collect()
}

const BESSEL_MAX_TERMS: usize = 4096;

/// Zeroth-order modified Bessel function of the first kind.
fn bessel_i0(x: f64) -> f64 {
    let quarter_sq = 0.25 * x * x;
    let mut sum = 1.0;
    let mut term = 1.0;
    for k in 1..=BESSEL_MAX_TERMS {
        let k = k as f64;
        term *= quarter_sq / (k * k);
        sum += term;
        if !sum.is_finite() || term < sum * 1e-17 {
            break;
        }
    }
    sum
}
