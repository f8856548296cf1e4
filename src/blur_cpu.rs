use crate::error::{CardstockError, CardstockResult};

/// Rows processed between cancellation polls.
const CANCEL_POLL_ROWS: u32 = 32;

/// Separable gaussian blur over a premultiplied RGBA8 buffer.
///
/// `cancelled` is polled every [`CANCEL_POLL_ROWS`] rows in each pass; when it
/// reports true the blur stops and `Ok(None)` is returned, leaving the caller
/// to fall back to the untransformed source. Edges are clamp-extended.
pub fn blur_rgba8_premul(
    src: &[u8],
    width: u32,
    height: u32,
    radius: u32,
    sigma: f32,
    cancelled: &dyn Fn() -> bool,
) -> CardstockResult<Option<Vec<u8>>> {
    let expected_len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| CardstockError::transform("blur buffer size overflow"))?;
    if src.len() != expected_len {
        return Err(CardstockError::transform(
            "blur_rgba8_premul expects src matching width*height*4",
        ));
    }
    if radius == 0 {
        return Ok(Some(src.to_vec()));
    }
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(CardstockError::validation("blur sigma must be > 0"));
    }

    let kernel = gaussian_weights(radius, sigma);
    let mut tmp = vec![0u8; expected_len];
    let mut out = vec![0u8; expected_len];

    if !horizontal_pass(src, &mut tmp, width, height, &kernel, cancelled) {
        return Ok(None);
    }
    if !vertical_pass(&tmp, &mut out, width, height, &kernel, cancelled) {
        return Ok(None);
    }
    Ok(Some(out))
}

/// Move every pixel toward (factor < 1) or away from (factor > 1) its luma.
///
/// Operates in premultiplied space; channels are clamped to the pixel's alpha
/// so the buffer stays premultiplied-valid.
pub fn saturate_in_place(data: &mut [u8], factor: f32) {
    if factor == 1.0 {
        return;
    }
    for px in data.chunks_exact_mut(4) {
        let a = px[3];
        let luma =
            0.2126 * f32::from(px[0]) + 0.7152 * f32::from(px[1]) + 0.0722 * f32::from(px[2]);
        for c in px.iter_mut().take(3) {
            let adjusted = luma + (f32::from(*c) - luma) * factor;
            *c = adjusted.round().clamp(0.0, f32::from(a)) as u8;
        }
    }
}

/// Composite a constant straight-alpha color over every pixel (src-over).
pub fn tint_in_place(data: &mut [u8], tint_rgba: [u8; 4]) {
    let ta = u32::from(tint_rgba[3]);
    if ta == 0 {
        return;
    }
    let tint_premul = [
        mul_div255(u32::from(tint_rgba[0]), ta),
        mul_div255(u32::from(tint_rgba[1]), ta),
        mul_div255(u32::from(tint_rgba[2]), ta),
        tint_rgba[3],
    ];
    let inv = 255 - ta;
    for px in data.chunks_exact_mut(4) {
        for c in 0..4 {
            px[c] = tint_premul[c].saturating_add(mul_div255(u32::from(px[c]), inv));
        }
    }
}

fn gaussian_weights(radius: u32, sigma: f32) -> Vec<f32> {
    let r = radius as i32;
    let denom = 2.0 * f64::from(sigma) * f64::from(sigma);
    let raw: Vec<f64> = (-r..=r)
        .map(|i| {
            let x = f64::from(i);
            (-x * x / denom).exp()
        })
        .collect();
    let sum: f64 = raw.iter().sum();
    raw.iter().map(|w| (w / sum) as f32).collect()
}

fn horizontal_pass(
    src: &[u8],
    dst: &mut [u8],
    width: u32,
    height: u32,
    kernel: &[f32],
    cancelled: &dyn Fn() -> bool,
) -> bool {
    let radius = (kernel.len() / 2) as i32;
    let w = width as i32;
    for y in 0..height {
        if y.is_multiple_of(CANCEL_POLL_ROWS) && cancelled() {
            return false;
        }
        for x in 0..w {
            let mut acc = [0.0f32; 4];
            for (ki, &kw) in kernel.iter().enumerate() {
                let sx = (x + ki as i32 - radius).clamp(0, w - 1);
                let idx = ((y as i32 * w + sx) as usize) * 4;
                for c in 0..4 {
                    acc[c] += kw * f32::from(src[idx + c]);
                }
            }
            let out_idx = ((y as i32 * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out_idx + c] = acc[c].round().clamp(0.0, 255.0) as u8;
            }
        }
    }
    true
}

fn vertical_pass(
    src: &[u8],
    dst: &mut [u8],
    width: u32,
    height: u32,
    kernel: &[f32],
    cancelled: &dyn Fn() -> bool,
) -> bool {
    let radius = (kernel.len() / 2) as i32;
    let w = width as i32;
    let h = height as i32;
    for y in 0..height {
        if y.is_multiple_of(CANCEL_POLL_ROWS) && cancelled() {
            return false;
        }
        for x in 0..w {
            let mut acc = [0.0f32; 4];
            for (ki, &kw) in kernel.iter().enumerate() {
                let sy = (y as i32 + ki as i32 - radius).clamp(0, h - 1);
                let idx = ((sy * w + x) as usize) * 4;
                for c in 0..4 {
                    acc[c] += kw * f32::from(src[idx + c]);
                }
            }
            let out_idx = ((y as i32 * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out_idx + c] = acc[c].round().clamp(0.0, 255.0) as u8;
            }
        }
    }
    true
}

fn mul_div255(x: u32, y: u32) -> u8 {
    (((x * y) + 127) / 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    const NEVER: fn() -> bool = || false;

    #[test]
    fn blur_radius_0_is_identity() {
        let src = vec![1u8, 2, 3, 4, 5, 6, 7, 8];
        let out = blur_rgba8_premul(&src, 1, 2, 0, 1.0, &NEVER).unwrap().unwrap();
        assert_eq!(out, src);
    }

    #[test]
    fn blur_constant_image_is_identity() {
        let (w, h) = (4u32, 3u32);
        let px = [10u8, 20, 30, 40];
        let src = px.repeat((w * h) as usize);
        let out = blur_rgba8_premul(&src, w, h, 3, 2.0, &NEVER).unwrap().unwrap();
        assert_eq!(out, src);
    }

    #[test]
    fn blur_spreads_energy_from_single_pixel() {
        let (w, h) = (5u32, 5u32);
        let mut src = vec![0u8; (w * h * 4) as usize];
        let center = ((2 * w + 2) * 4) as usize;
        src[center..center + 4].copy_from_slice(&[255, 255, 255, 255]);

        let out = blur_rgba8_premul(&src, w, h, 2, 1.2, &NEVER).unwrap().unwrap();

        let nonzero = out.chunks_exact(4).filter(|px| px[3] != 0).count();
        assert!(nonzero > 1);

        let sum_a: u32 = out.chunks_exact(4).map(|px| u32::from(px[3])).sum();
        assert!((sum_a as i32 - 255).abs() <= 4);
    }

    #[test]
    fn blur_reports_cancellation_as_none() {
        let src = vec![0u8; 16 * 16 * 4];
        let out = blur_rgba8_premul(&src, 16, 16, 2, 1.0, &|| true).unwrap();
        assert!(out.is_none());
    }

    #[test]
    fn blur_rejects_mismatched_buffer() {
        assert!(blur_rgba8_premul(&[0u8; 7], 2, 2, 1, 1.0, &NEVER).is_err());
    }

    #[test]
    fn blur_rejects_non_positive_sigma() {
        let src = vec![0u8; 4];
        assert!(blur_rgba8_premul(&src, 1, 1, 1, 0.0, &NEVER).is_err());
    }

    #[test]
    fn saturate_0_produces_grayscale() {
        let mut data = vec![200u8, 100, 50, 255];
        saturate_in_place(&mut data, 0.0);
        assert_eq!(data[0], data[1]);
        assert_eq!(data[1], data[2]);
        assert_eq!(data[3], 255);
    }

    #[test]
    fn saturate_1_is_identity() {
        let mut data = vec![200u8, 100, 50, 255];
        let orig = data.clone();
        saturate_in_place(&mut data, 1.0);
        assert_eq!(data, orig);
    }

    #[test]
    fn saturate_clamps_to_alpha() {
        let mut data = vec![40u8, 10, 10, 40];
        saturate_in_place(&mut data, 3.0);
        assert!(data[..3].iter().all(|&c| c <= data[3]));
    }

    #[test]
    fn opaque_tint_replaces_pixels() {
        let mut data = vec![10u8, 20, 30, 255, 90, 80, 70, 255];
        tint_in_place(&mut data, [0, 0, 0, 255]);
        assert_eq!(data, vec![0, 0, 0, 255, 0, 0, 0, 255]);
    }

    #[test]
    fn transparent_tint_is_noop() {
        let mut data = vec![10u8, 20, 30, 255];
        let orig = data.clone();
        tint_in_place(&mut data, [255, 255, 255, 0]);
        assert_eq!(data, orig);
    }
}
