mod common;

use mdct_bss::prelude::*;

fn assert_tensors_close(a: &Tensor3<f64>, b: &Tensor3<f64>) {
    assert_eq!(a.shape(), b.shape());
    for (x, y) in a.data.iter().zip(b.data.iter()) {
        assert!((x - y).abs() < 1e-12, "{} != {}", x, y);
    }
}

fn labels_of(alignment: &Alignment<f64>) -> Vec<Vec<usize>> {
    alignment
        .decisions
        .iter()
        .map(|d| d.labels.clone())
        .collect()
}

#[test]
fn test_swapped_bin_is_restored() {
    let clean = common::monotone_sources(6, 16);
    let scrambled = common::swap_bins(&clean, &[3]);

    let aligner = BandAligner::new(3, 2, 10).unwrap();
    let alignment = aligner.align(&scrambled).unwrap();

    assert_tensors_close(&alignment.sources, &clean);
    assert_eq!(alignment.decisions.len(), 2);
    assert!(alignment.decisions[0].is_identity());
    assert_eq!(alignment.decisions[1].branch, 4);
    assert_eq!(alignment.decisions[1].labels, vec![1, 0, 0]);
}

#[test]
fn test_scattered_swaps_are_restored() {
    let clean = common::monotone_sources(12, 16);
    let scrambled = common::swap_bins(&clean, &[3, 7, 8, 11]);

    let aligner = BandAligner::new(3, 2, 10).unwrap();
    let alignment = aligner.align(&scrambled).unwrap();

    assert_tensors_close(&alignment.sources, &clean);
    assert_eq!(
        labels_of(&alignment),
        vec![vec![0, 0, 0], vec![1, 0, 0], vec![0, 1, 1], vec![0, 0, 1]]
    );
}

#[test]
fn test_enveloped_swaps_are_restored() {
    let clean = common::enveloped_sources(12, 3, 16);
    let scrambled = common::swap_bins(&clean, &[3, 7, 8, 11]);

    let alignment = BandAligner::new(3, 2, 10).unwrap().align(&scrambled).unwrap();

    assert_tensors_close(&alignment.sources, &clean);
    assert_eq!(
        labels_of(&alignment),
        vec![vec![0, 0, 0], vec![1, 0, 0], vec![0, 1, 1], vec![0, 0, 1]]
    );
}

#[test]
fn test_consistent_input_is_left_alone() {
    let aligner = BandAligner::new(3, 2, 10).unwrap();
    for clean in [
        common::monotone_sources(12, 16),
        common::enveloped_sources(12, 3, 16),
    ] {
        let alignment = aligner.align(&clean).unwrap();
        assert!(alignment.decisions.iter().all(BandDecision::is_identity));
        assert_eq!(alignment.sources, clean);
    }
}

#[test]
fn test_swap_in_lowest_band_is_not_undone() {
    // The lowest band fixes the reference order, so an exchange there stays.
    let clean = common::monotone_sources(6, 16);
    let scrambled = common::swap_bins(&clean, &[1]);

    let alignment = BandAligner::new(3, 2, 10).unwrap().align(&scrambled).unwrap();

    assert!(alignment.decisions[0].is_identity());
    for frame in 0..16 {
        for source in 0..2 {
            assert_eq!(
                alignment.sources.get(source, frame, 1),
                scrambled.get(source, frame, 1)
            );
        }
    }
    assert_ne!(alignment.sources, clean);
}

#[test]
fn test_zero_margin_takes_plain_minimum() {
    let clean = common::monotone_sources(12, 16);
    let scrambled = common::swap_bins(&clean, &[3, 7, 8, 11]);
    let aligner = BandAligner::new(3, 2, 10)
        .unwrap()
        .with_identity_margin(0.0)
        .unwrap();
    let alignment = aligner.align(&scrambled).unwrap();
    assert_tensors_close(&alignment.sources, &clean);
}

#[test]
fn test_alignment_is_deterministic() {
    let scrambled = common::swap_bins(&common::monotone_sources(12, 16), &[1, 5, 9]);
    let aligner = BandAligner::new(3, 2, 10).unwrap();
    let first = aligner.align(&scrambled).unwrap();
    let second = aligner.align(&scrambled).unwrap();
    assert_eq!(first.sources, second.sources);
    assert_eq!(first.decisions, second.decisions);
}

#[test]
fn test_cache_holds_every_band() {
    let clean = common::monotone_sources(12, 16);
    let alignment = BandAligner::new(3, 2, 10).unwrap().align(&clean).unwrap();
    assert_eq!(alignment.cache.resolved_bands(), 4);
    assert_eq!(alignment.cache.num_sources(), 2);
    assert_eq!(alignment.cache.window_frames(), 10);
    for band in 0..4 {
        for source in 0..2 {
            assert_eq!(alignment.cache.trajectory(band, source).len(), 10);
        }
    }
}

#[test]
fn test_bins_not_divisible_by_depth() {
    let tensor = Tensor3::<f64>::zeros(2, 16, 10);
    let result = BandAligner::new(3, 0, 8).unwrap().align(&tensor);
    assert!(matches!(result, Err(BssError::InvalidConfiguration(_))));
}

#[test]
fn test_empty_source_axis() {
    let tensor = Tensor3::<f64>::zeros(0, 16, 6);
    let result = BandAligner::new(3, 0, 8).unwrap().align(&tensor);
    assert!(matches!(result, Err(BssError::DimensionMismatch { .. })));
}

#[test]
fn test_three_sources_use_cyclic_shifts() {
    // Every bin of a single-bin band may be rotated; the aligned tensor
    // must still hold each input row exactly once per bin.
    let data: Vec<f64> = (0..3 * 8 * 4).map(|x| ((x * 7 % 11) as f64) + 1.0).collect();
    let tensor = Tensor3::from_data(3, 8, 4, data).unwrap();
    let alignment = BandAligner::new(1, 0, 8).unwrap().align(&tensor).unwrap();

    for decision in &alignment.decisions {
        let shift = decision.labels[0];
        assert!(shift < 3);
        for source in 0..3 {
            for frame in 0..8 {
                assert_eq!(
                    alignment.sources.get(source, frame, decision.band),
                    tensor.get((source + shift) % 3, frame, decision.band)
                );
            }
        }
    }
}
