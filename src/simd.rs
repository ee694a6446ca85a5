/// SIMD-accelerated kernels for the MDCT hot loops using pulp
use num_traits::Float;

#[cfg(feature = "simd")]
use pulp::Arch;

/// Multiply a signal segment by the analysis window into `output`.
///
/// Used by the forward transform before the pre-rotation.
#[inline]
pub fn apply_window<T: Float + 'static>(segment: &[T], window: &[T], output: &mut [T]) {
    debug_assert_eq!(segment.len(), window.len());
    debug_assert_eq!(segment.len(), output.len());

    #[cfg(feature = "simd")]
    {
        let simd = Arch::new();
        if let (Some(segment), Some(window)) = (as_f32(segment), as_f32(window)) {
            if let Some(output) = as_f32_mut(output) {
                apply_window_f32_simd(simd, segment, window, output);
                return;
            }
        }
        if let (Some(segment), Some(window)) = (as_f64(segment), as_f64(window)) {
            if let Some(output) = as_f64_mut(output) {
                apply_window_f64_simd(simd, segment, window, output);
                return;
            }
        }
    }

    for ((out, &s), &w) in output.iter_mut().zip(segment).zip(window) {
        *out = s * w;
    }
}

/// Windowed overlap-add for the inverse transform.
///
/// Computes `output[i] += frame[i] * window[i] * scale`.
#[inline]
pub fn overlap_add_windowed<T: Float + 'static>(
    frame: &[T],
    window: &[T],
    scale: T,
    output: &mut [T],
) {
    debug_assert_eq!(frame.len(), window.len());
    debug_assert_eq!(frame.len(), output.len());

    #[cfg(feature = "simd")]
    {
        let simd = Arch::new();
        if let (Some(frame), Some(window), Some(scale)) =
            (as_f32(frame), as_f32(window), scalar_as::<T, f32>(scale))
        {
            if let Some(output) = as_f32_mut(output) {
                overlap_add_f32_simd(simd, frame, window, scale, output);
                return;
            }
        }
        if let (Some(frame), Some(window), Some(scale)) =
            (as_f64(frame), as_f64(window), scalar_as::<T, f64>(scale))
        {
            if let Some(output) = as_f64_mut(output) {
                overlap_add_f64_simd(simd, frame, window, scale, output);
                return;
            }
        }
    }

    for ((out, &x), &w) in output.iter_mut().zip(frame).zip(window) {
        *out = *out + x * w * scale;
    }
}

#[cfg(feature = "simd")]
fn as_f32<T: 'static>(values: &[T]) -> Option<&[f32]> {
    if std::any::TypeId::of::<T>() == std::any::TypeId::of::<f32>() {
        // T is f32, so the layout is identical.
        Some(unsafe { std::slice::from_raw_parts(values.as_ptr() as *const f32, values.len()) })
    } else {
        None
    }
}

#[cfg(feature = "simd")]
fn as_f32_mut<T: 'static>(values: &mut [T]) -> Option<&mut [f32]> {
    if std::any::TypeId::of::<T>() == std::any::TypeId::of::<f32>() {
        Some(unsafe {
            std::slice::from_raw_parts_mut(values.as_mut_ptr() as *mut f32, values.len())
        })
    } else {
        None
    }
}

#[cfg(feature = "simd")]
fn as_f64<T: 'static>(values: &[T]) -> Option<&[f64]> {
    if std::any::TypeId::of::<T>() == std::any::TypeId::of::<f64>() {
        Some(unsafe { std::slice::from_raw_parts(values.as_ptr() as *const f64, values.len()) })
    } else {
        None
    }
}

#[cfg(feature = "simd")]
fn as_f64_mut<T: 'static>(values: &mut [T]) -> Option<&mut [f64]> {
    if std::any::TypeId::of::<T>() == std::any::TypeId::of::<f64>() {
        Some(unsafe {
            std::slice::from_raw_parts_mut(values.as_mut_ptr() as *mut f64, values.len())
        })
    } else {
        None
    }
}

#[cfg(feature = "simd")]
fn scalar_as<T: Float + 'static, U: Float + 'static>(value: T) -> Option<U> {
    if std::any::TypeId::of::<T>() == std::any::TypeId::of::<U>() {
        U::from(value)
    } else {
        None
    }
}

#[cfg(feature = "simd")]
fn apply_window_f32_simd(simd: Arch, segment: &[f32], window: &[f32], output: &mut [f32]) {
    simd.dispatch(|| {
        let (segment_head, segment_tail) = pulp::as_arrays::<4, _>(segment);
        let (window_head, window_tail) = pulp::as_arrays::<4, _>(window);
        let (output_head, output_tail) = pulp::as_arrays_mut::<4, _>(output);

        for i in 0..segment_head.len() {
            output_head[i] = [
                segment_head[i][0] * window_head[i][0],
                segment_head[i][1] * window_head[i][1],
                segment_head[i][2] * window_head[i][2],
                segment_head[i][3] * window_head[i][3],
            ];
        }

        for i in 0..segment_tail.len() {
            output_tail[i] = segment_tail[i] * window_tail[i];
        }
    });
}

#[cfg(feature = "simd")]
fn apply_window_f64_simd(simd: Arch, segment: &[f64], window: &[f64], output: &mut [f64]) {
    simd.dispatch(|| {
        let (segment_head, segment_tail) = pulp::as_arrays::<4, _>(segment);
        let (window_head, window_tail) = pulp::as_arrays::<4, _>(window);
        let (output_head, output_tail) = pulp::as_arrays_mut::<4, _>(output);

        for i in 0..segment_head.len() {
            output_head[i] = [
                segment_head[i][0] * window_head[i][0],
                segment_head[i][1] * window_head[i][1],
                segment_head[i][2] * window_head[i][2],
                segment_head[i][3] * window_head[i][3],
            ];
        }

        for i in 0..segment_tail.len() {
            output_tail[i] = segment_tail[i] * window_tail[i];
        }
    });
}

#[cfg(feature = "simd")]
fn overlap_add_f32_simd(simd: Arch, frame: &[f32], window: &[f32], scale: f32, output: &mut [f32]) {
    simd.dispatch(|| {
        let (frame_head, frame_tail) = pulp::as_arrays::<4, _>(frame);
        let (window_head, window_tail) = pulp::as_arrays::<4, _>(window);
        let (output_head, output_tail) = pulp::as_arrays_mut::<4, _>(output);

        for i in 0..frame_head.len() {
            for lane in 0..4 {
                output_head[i][lane] += frame_head[i][lane] * window_head[i][lane] * scale;
            }
        }

        for i in 0..frame_tail.len() {
            output_tail[i] += frame_tail[i] * window_tail[i] * scale;
        }
    });
}

#[cfg(feature = "simd")]
fn overlap_add_f64_simd(simd: Arch, frame: &[f64], window: &[f64], scale: f64, output: &mut [f64]) {
    simd.dispatch(|| {
        let (frame_head, frame_tail) = pulp::as_arrays::<4, _>(frame);
        let (window_head, window_tail) = pulp::as_arrays::<4, _>(window);
        let (output_head, output_tail) = pulp::as_arrays_mut::<4, _>(output);

        for i in 0..frame_head.len() {
            for lane in 0..4 {
                output_head[i][lane] += frame_head[i][lane] * window_head[i][lane] * scale;
            }
        }

        for i in 0..frame_tail.len() {
            output_tail[i] += frame_tail[i] * window_tail[i] * scale;
        }
    });
}
