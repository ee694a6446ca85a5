/// Utility functions for multi-channel audio and numeric conversions
use num_traits::Float;

use crate::error::{BssError, Result};

/// Convert an `f64` constant into the working float type.
#[inline]
pub(crate) fn cast<T: Float>(value: f64) -> T {
    T::from(value).unwrap_or_else(T::nan)
}

/// Convert an index or count into the working float type.
#[inline]
pub(crate) fn cast_usize<T: Float>(value: usize) -> T {
    T::from(value).unwrap_or_else(T::nan)
}

/// One stereo recording from a single sensor.
///
/// Both channels always have the same number of samples.
#[derive(Debug, Clone, PartialEq)]
pub struct StereoSignal<T> {
    pub left: Vec<T>,
    pub right: Vec<T>,
}

impl<T: Float> StereoSignal<T> {
    /// Build a stereo signal from separate channels.
    pub fn new(left: Vec<T>, right: Vec<T>) -> Result<Self> {
        if left.len() != right.len() {
            return Err(BssError::mismatch(
                "stereo signal",
                format!("right channel of {} samples", left.len()),
                format!("{} samples", right.len()),
            ));
        }
        Ok(Self { left, right })
    }

    /// Split an interleaved `[L, R, L, R, ...]` buffer.
    ///
    /// # Example
    ///
    /// ```
    /// use mdct_bss::StereoSignal;
    ///
    /// let stereo = StereoSignal::from_interleaved(&[1.0, 2.0, 3.0, 4.0]).unwrap();
    /// assert_eq!(stereo.left, vec![1.0, 3.0]);
    /// assert_eq!(stereo.right, vec![2.0, 4.0]);
    /// ```
    pub fn from_interleaved(data: &[T]) -> Result<Self> {
        let mut channels = deinterleave(data, 2)?;
        let right = channels.pop().unwrap_or_default();
        let left = channels.pop().unwrap_or_default();
        Ok(Self { left, right })
    }

    /// Samples per channel
    pub fn len(&self) -> usize {
        self.left.len()
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }
}

/// Deinterleave multi-channel audio data.
///
/// Converts interleaved format (e.g., `[L,R,L,R,L,R,...]` for stereo)
/// into separate channels (`vec![vec![L,L,L,...], vec![R,R,R,...]]`).
///
/// # Errors
///
/// `InvalidConfiguration` if `num_channels` is 0, `DimensionMismatch` if
/// `data.len()` is not divisible by `num_channels`.
///
/// # Example
///
/// ```
/// use mdct_bss::deinterleave;
///
/// let interleaved = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]; // L,R,L,R,L,R
/// let channels = deinterleave(&interleaved, 2).unwrap();
///
/// assert_eq!(channels[0], vec![1.0, 3.0, 5.0]); // Left
/// assert_eq!(channels[1], vec![2.0, 4.0, 6.0]); // Right
/// ```
pub fn deinterleave<T: Float>(data: &[T], num_channels: usize) -> Result<Vec<Vec<T>>> {
    if num_channels == 0 {
        return Err(BssError::config("num_channels must be greater than 0"));
    }
    if data.len() % num_channels != 0 {
        return Err(BssError::mismatch(
            "deinterleave",
            format!("a multiple of {} samples", num_channels),
            data.len(),
        ));
    }

    let samples_per_channel = data.len() / num_channels;
    let mut channels = vec![Vec::with_capacity(samples_per_channel); num_channels];

    for (i, &sample) in data.iter().enumerate() {
        channels[i % num_channels].push(sample);
    }

    Ok(channels)
}

/// Interleave multiple channels into a single buffer.
///
/// Converts separate channels (`vec![vec![L,L,L,...], vec![R,R,R,...]]`)
/// into interleaved format (e.g., `[L,R,L,R,L,R,...]` for stereo). Handy for
/// handing all resynthesized sources to a multi-channel writer at once.
///
/// # Example
///
/// ```
/// use mdct_bss::interleave;
///
/// let left = vec![1.0, 3.0, 5.0];
/// let right = vec![2.0, 4.0, 6.0];
/// let interleaved = interleave(&[left, right]).unwrap();
///
/// assert_eq!(interleaved, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
/// ```
pub fn interleave<T: Float>(channels: &[Vec<T>]) -> Result<Vec<T>> {
    let Some(first) = channels.first() else {
        return Err(BssError::config("channels must not be empty"));
    };
    let samples_per_channel = first.len();

    for channel in channels {
        if channel.len() != samples_per_channel {
            return Err(BssError::mismatch(
                "interleave",
                format!("{} samples per channel", samples_per_channel),
                channel.len(),
            ));
        }
    }

    let mut interleaved = Vec::with_capacity(samples_per_channel * channels.len());
    for sample_idx in 0..samples_per_channel {
        for channel in channels {
            interleaved.push(channel[sample_idx]);
        }
    }

    Ok(interleaved)
}
