use kurbo::{Rect, Size};

/// Height of the description panel below the feature image, in pixels.
pub const DESCRIPTION_PANEL_HEIGHT: f64 = 80.0;

/// Height of the title strip overlaid on the bottom of the feature image.
pub const TITLE_STRIP_HEIGHT: f64 = 44.0;

/// Horizontal/vertical inset applied to text frames.
pub const TEXT_INSET: f64 = 12.0;

/// Placement rectangles for every visual element of one card, in container
/// coordinates (origin at the container's top-left).
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CardFrames {
    pub container: Rect,
    pub background: Rect,
    pub feature: Rect,
    pub title: Rect,
    pub description: Rect,
    pub gradient: Rect,
}

/// Compute all placement rectangles from the feature image's natural size.
///
/// Pure and deterministic. A non-positive natural size yields the degenerate
/// all-zero layout rather than an error; the resulting card is visually empty.
pub fn card_frames(natural: Size) -> CardFrames {
    if natural.width <= 0.0 || natural.height <= 0.0 {
        return CardFrames::default();
    }

    let container = Rect::new(0.0, 0.0, natural.width, natural.height + DESCRIPTION_PANEL_HEIGHT);
    let feature = Rect::new(0.0, 0.0, natural.width, natural.height);
    let title = Rect::new(
        feature.x0 + TEXT_INSET,
        (feature.y1 - TITLE_STRIP_HEIGHT).max(feature.y0),
        (feature.x1 - TEXT_INSET).max(feature.x0 + TEXT_INSET),
        feature.y1,
    );
    let description = Rect::new(
        container.x0 + TEXT_INSET,
        feature.y1 + TEXT_INSET / 2.0,
        (container.x1 - TEXT_INSET).max(container.x0 + TEXT_INSET),
        container.y1 - TEXT_INSET / 2.0,
    );
    // The vertical fade sits behind the title: bottom half of the feature image.
    let gradient = Rect::new(
        feature.x0,
        feature.y0 + feature.height() / 2.0,
        feature.x1,
        feature.y1,
    );

    CardFrames {
        container,
        background: container,
        feature,
        title,
        description,
        gradient,
    }
}

/// Host sizing query: the card size that fits `constraint` for content with
/// the given natural size.
///
/// The card scales down to the constraint width (never upscaling past the
/// natural width) and appends the description panel. Degenerate inputs map to
/// `Size::ZERO`.
pub fn size_that_fits(constraint: Size, natural: Size) -> Size {
    if natural.width <= 0.0 || natural.height <= 0.0 || constraint.width <= 0.0 {
        return Size::ZERO;
    }
    let width = constraint.width.min(natural.width);
    let height = natural.height * (width / natural.width) + DESCRIPTION_PANEL_HEIGHT;
    Size::new(width, height)
}

/// Largest rectangle with `content`'s aspect ratio centered inside `bounds`.
pub fn aspect_fit(content: Size, bounds: Rect) -> Rect {
    if content.width <= 0.0 || content.height <= 0.0 || bounds.area() <= 0.0 {
        return Rect::ZERO;
    }
    let scale = (bounds.width() / content.width).min(bounds.height() / content.height);
    let w = content.width * scale;
    let h = content.height * scale;
    let x0 = bounds.x0 + (bounds.width() - w) / 2.0;
    let y0 = bounds.y0 + (bounds.height() - h) / 2.0;
    Rect::new(x0, y0, x0 + w, y0 + h)
}

/// Centered crop window inside `content` whose aspect ratio matches `bounds`.
///
/// Sampling this window and stretching it over `bounds` gives aspect-fill
/// behavior (cover, centered, cropped).
pub fn aspect_fill_window(content: Size, bounds: Rect) -> Rect {
    if content.width <= 0.0 || content.height <= 0.0 || bounds.area() <= 0.0 {
        return Rect::ZERO;
    }
    let bounds_aspect = bounds.width() / bounds.height();
    let mut w = content.width;
    let mut h = w / bounds_aspect;
    if h > content.height {
        h = content.height;
        w = h * bounds_aspect;
    }
    let x0 = (content.width - w) / 2.0;
    let y0 = (content.height - h) / 2.0;
    Rect::new(x0, y0, x0 + w, y0 + h)
}
