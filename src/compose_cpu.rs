use image::RgbaImage;
use kurbo::{Rect, Size};

use crate::{
    composite::{BorderSpec, CardComposite, ElementContent, GradientSpec, ImageFit},
    error::CardstockResult,
    layout::{aspect_fill_window, aspect_fit},
};

/// Rows blitted between suppress-flag polls.
const SUPPRESS_POLL_ROWS: u32 = 64;

/// Composite a card's raster elements into one premultiplied RGBA8 image.
///
/// Returns `Ok(None)` when the composite was suppressed mid-flight (the slot
/// moved on); a degenerate container produces an empty image, not an error.
/// Text elements are carried for the host's text renderer and skipped here.
pub fn flatten(composite: &CardComposite) -> CardstockResult<Option<RgbaImage>> {
    let container = composite.container();
    let w = container.width().max(0.0).round() as u32;
    let h = container.height().max(0.0).round() as u32;
    if w == 0 || h == 0 {
        return Ok(Some(RgbaImage::new(0, 0)));
    }

    let mut canvas = RgbaImage::new(w, h);
    for element in composite.elements() {
        if composite.is_suppressed() {
            tracing::debug!(card = composite.card_id().0, "flatten stopped, composite suppressed");
            return Ok(None);
        }
        match &element.content {
            ElementContent::Image { image, fit } => {
                if !blit_image(&mut canvas, element.frame, image, *fit, composite) {
                    tracing::debug!(card = composite.card_id().0, "blit stopped, composite suppressed");
                    return Ok(None);
                }
            }
            ElementContent::Gradient(g) => fill_gradient(&mut canvas, element.frame, g),
            ElementContent::Border(b) => stroke_border(&mut canvas, element.frame, b),
            ElementContent::Text(_) => {}
        }
    }
    Ok(Some(canvas))
}

/// Nearest-sampled scaled blit, src-over. Returns false if suppressed.
fn blit_image(
    canvas: &mut RgbaImage,
    frame: Rect,
    src: &RgbaImage,
    fit: ImageFit,
    composite: &CardComposite,
) -> bool {
    let (sw, sh) = src.dimensions();
    if sw == 0 || sh == 0 {
        return true;
    }
    let src_size = Size::new(f64::from(sw), f64::from(sh));

    let (dest, window) = match fit {
        ImageFit::Fit => (aspect_fit(src_size, frame), Rect::new(0.0, 0.0, src_size.width, src_size.height)),
        ImageFit::Fill => (frame, aspect_fill_window(src_size, frame)),
    };
    if dest.area() <= 0.0 || window.area() <= 0.0 {
        return true;
    }

    let (cw, ch) = canvas.dimensions();
    let (x_start, x_end) = pixel_span(dest.x0, dest.x1, cw);
    let (y_start, y_end) = pixel_span(dest.y0, dest.y1, ch);

    for (row, dy) in (y_start..y_end).enumerate() {
        if (row as u32).is_multiple_of(SUPPRESS_POLL_ROWS) && composite.is_suppressed() {
            return false;
        }
        let v = (f64::from(dy) + 0.5 - dest.y0) / dest.height();
        let sy = ((window.y0 + v * window.height()).floor() as i64).clamp(0, i64::from(sh) - 1) as u32;
        for dx in x_start..x_end {
            let u = (f64::from(dx) + 0.5 - dest.x0) / dest.width();
            let sx =
                ((window.x0 + u * window.width()).floor() as i64).clamp(0, i64::from(sw) - 1) as u32;
            let s = src.get_pixel(sx, sy).0;
            let d = canvas.get_pixel(dx, dy).0;
            canvas.get_pixel_mut(dx, dy).0 = over(d, s);
        }
    }
    true
}

/// Vertical fade over `frame`: `from_rgba` at the bottom edge, `to_rgba` at
/// the top edge.
fn fill_gradient(canvas: &mut RgbaImage, frame: Rect, spec: &GradientSpec) {
    if frame.area() <= 0.0 {
        return;
    }
    let (cw, ch) = canvas.dimensions();
    let (x_start, x_end) = pixel_span(frame.x0, frame.x1, cw);
    let (y_start, y_end) = pixel_span(frame.y0, frame.y1, ch);

    for dy in y_start..y_end {
        let t = ((frame.y1 - (f64::from(dy) + 0.5)) / frame.height()).clamp(0.0, 1.0);
        let color = premultiply(lerp_rgba(spec.from_rgba, spec.to_rgba, t));
        for dx in x_start..x_end {
            let d = canvas.get_pixel(dx, dy).0;
            canvas.get_pixel_mut(dx, dy).0 = over(d, color);
        }
    }
}

fn stroke_border(canvas: &mut RgbaImage, frame: Rect, spec: &BorderSpec) {
    if frame.area() <= 0.0 || spec.width_px <= 0.0 {
        return;
    }
    let bw = spec.width_px.max(1.0);
    let color = premultiply(spec.rgba);
    let top = Rect::new(frame.x0, frame.y0, frame.x1, frame.y0 + bw);
    let bottom = Rect::new(frame.x0, frame.y1 - bw, frame.x1, frame.y1);
    let left = Rect::new(frame.x0, frame.y0 + bw, frame.x0 + bw, frame.y1 - bw);
    let right = Rect::new(frame.x1 - bw, frame.y0 + bw, frame.x1, frame.y1 - bw);
    for edge in [top, bottom, left, right] {
        fill_rect(canvas, edge, color);
    }
}

fn fill_rect(canvas: &mut RgbaImage, rect: Rect, premul_color: [u8; 4]) {
    let (cw, ch) = canvas.dimensions();
    let (x_start, x_end) = pixel_span(rect.x0, rect.x1, cw);
    let (y_start, y_end) = pixel_span(rect.y0, rect.y1, ch);
    for dy in y_start..y_end {
        for dx in x_start..x_end {
            let d = canvas.get_pixel(dx, dy).0;
            canvas.get_pixel_mut(dx, dy).0 = over(d, premul_color);
        }
    }
}

/// Half-open integer pixel range covered by [a0, a1), clamped to the canvas.
fn pixel_span(a0: f64, a1: f64, max: u32) -> (u32, u32) {
    let start = (a0.round().max(0.0) as u32).min(max);
    let end = (a1.round().max(0.0) as u32).min(max);
    (start, end.max(start))
}

/// Premultiplied src-over.
fn over(dst: [u8; 4], src: [u8; 4]) -> [u8; 4] {
    let sa = u32::from(src[3]);
    if sa == 0 {
        return dst;
    }
    if sa == 255 {
        return src;
    }
    let inv = 255 - sa;
    let mut out = [0u8; 4];
    for c in 0..4 {
        out[c] = src[c].saturating_add(mul_div255(u32::from(dst[c]), inv));
    }
    out
}

fn premultiply(rgba: [u8; 4]) -> [u8; 4] {
    let a = u32::from(rgba[3]);
    [
        mul_div255(u32::from(rgba[0]), a),
        mul_div255(u32::from(rgba[1]), a),
        mul_div255(u32::from(rgba[2]), a),
        rgba[3],
    ]
}

fn lerp_rgba(from: [u8; 4], to: [u8; 4], t: f64) -> [u8; 4] {
    let mut out = [0u8; 4];
    for c in 0..4 {
        let v = f64::from(from[c]) + (f64::from(to[c]) - f64::from(from[c])) * t;
        out[c] = v.round().clamp(0.0, 255.0) as u8;
    }
    out
}

fn mul_div255(x: u32, y: u32) -> u8 {
    (((x * y) + 127) / 255) as u8
}
