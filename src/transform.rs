use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use image::RgbaImage;

use crate::{
    blur_cpu,
    error::CardstockError,
    fx::TransformParams,
};

/// Cloneable cancellation handle shared between a slot and its build.
///
/// Reads and writes are plain atomics: querying never blocks, from any
/// thread. Cancellation is monotonic; there is no way to clear the flag.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[derive(Debug)]
pub enum TransformOutcome {
    Transformed(RgbaImage),
    /// The transform observed cancellation and stopped early. The caller
    /// falls back to the untransformed source; this is not an error.
    Aborted,
    /// Non-cancellation failure. The caller falls back to the untransformed
    /// source and may log the error.
    Failed(CardstockError),
}

/// A potentially slow transform of a source image, run on a worker thread.
///
/// Implementations must poll `cancelled` at bounded intervals and return
/// [`TransformOutcome::Aborted`] promptly once it reports true. A transform
/// that never polls can run to completion; its result is still discarded at
/// the commit guard.
pub trait ImageTransform: Send + Sync {
    fn apply(&self, src: &RgbaImage, cancelled: &dyn Fn() -> bool) -> TransformOutcome;
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BlurParams {
    pub radius_px: u32,
    pub sigma: f32,
    /// Straight-alpha color composited over the blurred image.
    pub tint: Option<[u8; 4]>,
    /// 1.0 leaves colors untouched; > 1.0 makes the blur more vivid.
    pub saturation: f32,
}

impl Default for BlurParams {
    fn default() -> Self {
        Self {
            radius_px: 30,
            sigma: 15.0,
            tint: Some([128, 128, 128, 77]),
            saturation: 1.8,
        }
    }
}

/// Gaussian blur with tint and saturation, the card background treatment.
#[derive(Clone, Copy, Debug, Default)]
pub struct BlurTransform {
    params: BlurParams,
}

impl BlurTransform {
    pub fn new(params: BlurParams) -> Self {
        Self { params }
    }
}

impl ImageTransform for BlurTransform {
    fn apply(&self, src: &RgbaImage, cancelled: &dyn Fn() -> bool) -> TransformOutcome {
        let (w, h) = src.dimensions();
        if w == 0 || h == 0 {
            return TransformOutcome::Failed(CardstockError::transform(
                "cannot blur an empty image",
            ));
        }

        match blur_cpu::blur_rgba8_premul(
            src.as_raw(),
            w,
            h,
            self.params.radius_px,
            self.params.sigma,
            cancelled,
        ) {
            Ok(Some(mut data)) => {
                if self.params.saturation != 1.0 {
                    blur_cpu::saturate_in_place(&mut data, self.params.saturation);
                }
                if let Some(tint) = self.params.tint {
                    blur_cpu::tint_in_place(&mut data, tint);
                }
                match RgbaImage::from_raw(w, h, data) {
                    Some(img) => TransformOutcome::Transformed(img),
                    None => TransformOutcome::Failed(CardstockError::transform(
                        "blur output buffer has wrong size",
                    )),
                }
            }
            Ok(None) => TransformOutcome::Aborted,
            Err(e) => TransformOutcome::Failed(e),
        }
    }
}

/// Identity transform for hosts that want the source image untouched.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopTransform;

impl ImageTransform for NoopTransform {
    fn apply(&self, src: &RgbaImage, _cancelled: &dyn Fn() -> bool) -> TransformOutcome {
        TransformOutcome::Transformed(src.clone())
    }
}

/// Build the transform an fx spec describes.
pub fn transform_for_params(params: TransformParams) -> Arc<dyn ImageTransform> {
    match params {
        TransformParams::Blur(p) => Arc::new(BlurTransform::new(p)),
        TransformParams::None => Arc::new(NoopTransform),
    }
}
