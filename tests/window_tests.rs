use mdct_bss::{BssError, Window, WindowShape};

#[test]
fn test_all_shapes_satisfy_princen_bradley() {
    let shapes = [
        WindowShape::KaiserBessel { alpha: 0.0 },
        WindowShape::KaiserBessel { alpha: 2.0 },
        WindowShape::KaiserBessel { alpha: 5.0 },
        WindowShape::KaiserBessel { alpha: 10.0 },
        WindowShape::Sine,
        WindowShape::Vorbis,
    ];
    for shape in shapes {
        for block_length in [2, 8, 18, 256, 2048] {
            let window = Window::<f64>::new(block_length, shape).unwrap();
            assert_eq!(window.len(), block_length);
            let deviation = window.princen_bradley_deviation();
            assert!(
                deviation < 1e-10,
                "{:?} at {} deviates by {}",
                shape,
                block_length,
                deviation
            );
        }
    }
}

#[test]
fn test_window_is_symmetric() {
    let window = Window::<f64>::kaiser_bessel_derived(64, 4.0).unwrap();
    let values = window.as_slice();
    for n in 0..32 {
        assert!((values[n] - values[63 - n]).abs() < 1e-12);
    }
}

#[test]
fn test_kbd_rises_monotonically() {
    let window = Window::<f32>::new(512, WindowShape::default()).unwrap();
    let half = &window.as_slice()[..window.half_len()];
    assert!(half.windows(2).all(|pair| pair[0] <= pair[1]));
    assert!(half.iter().all(|&v| (0.0..=1.0).contains(&v)));
}

#[test]
fn test_larger_alpha_narrows_window() {
    let soft = Window::<f64>::kaiser_bessel_derived(128, 1.0).unwrap();
    let sharp = Window::<f64>::kaiser_bessel_derived(128, 8.0).unwrap();
    // Near the edges the sharper window carries less weight.
    assert!(sharp.as_slice()[8] < soft.as_slice()[8]);
}

#[test]
fn test_invalid_lengths_rejected() {
    for block_length in [0, 1, 7, 513] {
        assert!(matches!(
            Window::<f64>::new(block_length, WindowShape::Sine),
            Err(BssError::InvalidConfiguration(_))
        ));
    }
}

#[test]
fn test_invalid_alpha_rejected() {
    for alpha in [-1.0, f64::NAN, f64::INFINITY, 300.0] {
        assert!(Window::<f64>::kaiser_bessel_derived(16, alpha).is_err());
    }
}

#[test]
fn test_steepest_accepted_alpha_is_valid() {
    let window = Window::<f64>::kaiser_bessel_derived(64, mdct_bss::MAX_KAISER_ALPHA).unwrap();
    assert!(window.as_slice().iter().all(|w| w.is_finite()));
    assert!(window.princen_bradley_deviation() < 1e-12);
}
