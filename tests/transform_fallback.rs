use std::sync::Arc;

use image::RgbaImage;

use cardstock::{
    CardDescriptor, CardId, CardstockError, DisplaySlot, ElementContent, ImageFit, ImageTransform,
    InlineScheduler, TransformOutcome,
};

/// Reports cancellation on every poll, as if the build were superseded the
/// instant the transform started.
struct AbortingTransform;

impl ImageTransform for AbortingTransform {
    fn apply(&self, _src: &RgbaImage, _cancelled: &dyn Fn() -> bool) -> TransformOutcome {
        TransformOutcome::Aborted
    }
}

/// Fails for a non-cancellation reason.
struct FailingTransform;

impl ImageTransform for FailingTransform {
    fn apply(&self, _src: &RgbaImage, _cancelled: &dyn Fn() -> bool) -> TransformOutcome {
        TransformOutcome::Failed(CardstockError::transform("synthetic failure"))
    }
}

fn descriptor() -> CardDescriptor {
    CardDescriptor::new(
        CardId(5),
        Arc::new(RgbaImage::from_pixel(32, 24, image::Rgba([120, 130, 140, 255]))),
        "Sorting Hat Palm",
        "Understory specialist",
    )
}

fn background_image(slot: &DisplaySlot) -> Arc<RgbaImage> {
    let composite = slot.committed().expect("composite should have committed");
    let Some(ElementContent::Image { image, fit: ImageFit::Fill }) =
        composite.elements().first().map(|e| &e.content)
    else {
        panic!("first element should be the background image");
    };
    image.clone()
}

#[test]
fn aborted_transform_falls_back_to_the_source_image() {
    let d = descriptor();
    let mut slot = DisplaySlot::new(Arc::new(AbortingTransform));
    slot.configure(d.clone(), &InlineScheduler);
    slot.process_commits();

    // The composite still commits, with the untransformed source as background.
    assert!(Arc::ptr_eq(&background_image(&slot), &d.image));
}

#[test]
fn failed_transform_falls_back_to_the_source_image() {
    let d = descriptor();
    let mut slot = DisplaySlot::new(Arc::new(FailingTransform));
    slot.configure(d.clone(), &InlineScheduler);
    slot.process_commits();

    assert!(Arc::ptr_eq(&background_image(&slot), &d.image));
}

#[test]
fn feature_element_always_uses_the_source_image() {
    let d = descriptor();
    let mut slot = DisplaySlot::new(Arc::new(AbortingTransform));
    slot.configure(d.clone(), &InlineScheduler);
    slot.process_commits();

    let composite = slot.committed().unwrap();
    let Some(ElementContent::Image { image, fit: ImageFit::Fit }) =
        composite.elements().get(1).map(|e| &e.content)
    else {
        panic!("second element should be the feature image");
    };
    assert!(Arc::ptr_eq(image, &d.image));
}
