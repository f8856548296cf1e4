use std::sync::Arc;

use image::RgbaImage;

use cardstock::{
    CardDescriptor, CardId, DisplaySlot, InlineScheduler, NoopTransform, flatten,
    layout::DESCRIPTION_PANEL_HEIGHT,
};

fn committed_slot(width: u32, height: u32) -> DisplaySlot {
    let d = CardDescriptor::new(
        CardId(9),
        Arc::new(RgbaImage::from_pixel(width, height, image::Rgba([60, 70, 80, 255]))),
        "Strangler Fig",
        "Grows down from the canopy",
    );
    let mut slot = DisplaySlot::new(Arc::new(NoopTransform));
    slot.configure(d, &InlineScheduler);
    slot.process_commits();
    slot
}

#[test]
fn committed_composite_flattens_to_the_container_size() {
    let slot = committed_slot(40, 30);
    let composite = slot.committed().unwrap();
    let img = flatten(composite).unwrap().unwrap();
    assert_eq!(
        img.dimensions(),
        (40, 30 + DESCRIPTION_PANEL_HEIGHT as u32)
    );
    // Opaque source: the background fill reaches every pixel.
    assert_eq!(img.get_pixel(0, 0).0[3], 255);
    assert_eq!(img.get_pixel(39, 109).0[3], 255);
}

#[test]
fn reuse_mid_flatten_suppresses_the_output() {
    let slot = committed_slot(40, 30);
    let handle = slot.committed().unwrap().clone();

    // A host thread could still be flattening this composite when the slot
    // is recycled; the suppress flag stops that output from surfacing.
    handle.suppress_display();
    assert!(flatten(&handle).unwrap().is_none());
}

#[test]
fn flatten_is_deterministic_for_a_fixed_descriptor() {
    let slot = committed_slot(24, 18);
    let composite = slot.committed().unwrap();
    let a = flatten(composite).unwrap().unwrap();
    let b = flatten(composite).unwrap().unwrap();
    assert_eq!(a.as_raw(), b.as_raw());
}
