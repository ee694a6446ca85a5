/// Common test utilities
use std::f64::consts::PI;

use mdct_bss::Tensor3;

#[allow(dead_code)]
pub fn calculate_snr(original: &[f64], reconstructed: &[f64]) -> f64 {
    assert_eq!(original.len(), reconstructed.len());

    let signal_power: f64 = original.iter().map(|x| x.powi(2)).sum();
    let noise_power: f64 = original
        .iter()
        .zip(reconstructed.iter())
        .map(|(o, r)| (o - r).powi(2))
        .sum();

    if noise_power == 0.0 {
        f64::INFINITY
    } else {
        10.0 * (signal_power / noise_power).log10()
    }
}

#[allow(dead_code)]
pub fn max_abs_error(original: &[f64], reconstructed: &[f64]) -> f64 {
    original
        .iter()
        .zip(reconstructed.iter())
        .map(|(o, r)| (o - r).abs())
        .max_by(|a, b| a.partial_cmp(b).unwrap())
        .unwrap_or(0.0)
}

/// Two sources whose spectral centroids drift in opposite directions.
///
/// Source 0 grows as `exp(0.05 t f)`, so its energy moves up the spectrum
/// over time; source 1 decays as `exp(-0.1 t f)` and its centroid falls.
#[allow(dead_code)]
pub fn monotone_sources(freq_bins: usize, frames: usize) -> Tensor3<f64> {
    let mut tensor = Tensor3::zeros(2, frames, freq_bins);
    for frame in 0..frames {
        let t = frame as f64;
        for bin in 0..freq_bins {
            let f = bin as f64;
            tensor.set(0, frame, bin, (0.05 * t * f).exp());
            tensor.set(1, frame, bin, (-0.1 * t * f).exp());
        }
    }
    tensor
}

/// Opposite tilts inside every band group of `depth` bins, with envelopes
/// that alternate between the two sources from frame to frame.
#[allow(dead_code)]
pub fn enveloped_sources(freq_bins: usize, depth: usize, frames: usize) -> Tensor3<f64> {
    let mut tensor = Tensor3::zeros(2, frames, freq_bins);
    for frame in 0..frames {
        let (g0, g1) = if frame % 2 == 0 { (1.0, 4.0) } else { (4.0, 1.0) };
        let t = frame as f64;
        for bin in 0..freq_bins {
            let k = (bin % depth) as f64;
            tensor.set(0, frame, bin, g0 * (0.05 * t * k).exp());
            tensor.set(1, frame, bin, g1 * (-0.1 * t * k).exp());
        }
    }
    tensor
}

/// Exchange the two sources at each of `bins`.
#[allow(dead_code)]
pub fn swap_bins(tensor: &Tensor3<f64>, bins: &[usize]) -> Tensor3<f64> {
    let mut swapped = tensor.clone();
    for &bin in bins {
        for frame in 0..tensor.frames {
            swapped.set(0, frame, bin, tensor.get(1, frame, bin));
            swapped.set(1, frame, bin, tensor.get(0, frame, bin));
        }
    }
    swapped
}

#[allow(dead_code)]
pub fn test_signal(len: usize, seed: f64) -> Vec<f64> {
    (0..len)
        .map(|i| {
            let t = i as f64;
            (t * 0.031 * seed).sin() + 0.4 * (t * 0.27 + seed).cos() * (t * 0.003).sin()
        })
        .collect()
}

/// Linear chirp from 300 Hz rising by 400 Hz per second.
#[allow(dead_code)]
pub fn chirp(len: usize, sample_rate: f64) -> Vec<f64> {
    (0..len)
        .map(|i| {
            let t = i as f64 / sample_rate;
            0.5 * (2.0 * PI * (300.0 + 400.0 * t) * t).sin()
        })
        .collect()
}

/// 1800 Hz tone under a 3 Hz amplitude envelope.
#[allow(dead_code)]
pub fn tremolo(len: usize, sample_rate: f64) -> Vec<f64> {
    (0..len)
        .map(|i| {
            let t = i as f64 / sample_rate;
            let envelope = 0.5 + 0.5 * (2.0 * PI * 3.0 * t).sin();
            0.4 * envelope * (2.0 * PI * 1800.0 * t).sin()
        })
        .collect()
}
