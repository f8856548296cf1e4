use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use image::RgbaImage;
use kurbo::Rect;

use crate::{
    layout::CardFrames,
    model::{CardDescriptor, CardId},
    text::{StyledText, styled_description, styled_title},
};

/// How an image element maps its pixels into its frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ImageFit {
    /// Cover the frame, centered and cropped (the blurred background).
    Fill,
    /// Contain within the frame, centered and letterboxed (the feature image).
    Fit,
}

/// Vertical fade: `from_rgba` at the frame's bottom edge to `to_rgba` at its
/// top edge. Straight-alpha colors. Stateless and reusable across composites.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GradientSpec {
    pub from_rgba: [u8; 4],
    pub to_rgba: [u8; 4],
}

impl Default for GradientSpec {
    fn default() -> Self {
        Self {
            from_rgba: [0, 0, 0, 255],
            to_rgba: [0, 0, 0, 0],
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BorderSpec {
    pub rgba: [u8; 4],
    pub width_px: f64,
}

impl Default for BorderSpec {
    fn default() -> Self {
        Self {
            rgba: [217, 217, 217, 51],
            width_px: 1.0,
        }
    }
}

/// First-commit presentation hint for hosts. Purely advisory; the pipeline
/// attaches it and never interprets it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Reveal {
    None,
    FadeIn { duration_ms: u32 },
}

#[derive(Clone, Debug)]
pub enum ElementContent {
    Image { image: Arc<RgbaImage>, fit: ImageFit },
    Gradient(GradientSpec),
    Text(StyledText),
    Border(BorderSpec),
}

#[derive(Clone, Debug)]
pub struct CardElement {
    /// Placement in container coordinates.
    pub frame: Rect,
    pub content: ElementContent,
}

/// The assembled, ready-to-display visual result for one descriptor.
///
/// Immutable after assembly except for the suppress flag, which stops any
/// still-running rasterization once the owning slot has moved on. Clones
/// share the flag.
#[derive(Clone, Debug)]
pub struct CardComposite {
    card_id: CardId,
    container: Rect,
    elements: Vec<CardElement>,
    reveal: Reveal,
    suppress: Arc<AtomicBool>,
}

impl CardComposite {
    /// Deterministic assembly: background, feature, gradient, title,
    /// description, border — siblings in that paint order.
    pub fn assemble(
        descriptor: &CardDescriptor,
        frames: &CardFrames,
        background: Arc<RgbaImage>,
    ) -> Self {
        let elements = vec![
            CardElement {
                frame: frames.background,
                content: ElementContent::Image {
                    image: background,
                    fit: ImageFit::Fill,
                },
            },
            CardElement {
                frame: frames.feature,
                content: ElementContent::Image {
                    image: descriptor.image.clone(),
                    fit: ImageFit::Fit,
                },
            },
            CardElement {
                frame: frames.gradient,
                content: ElementContent::Gradient(GradientSpec::default()),
            },
            CardElement {
                frame: frames.title,
                content: ElementContent::Text(styled_title(&descriptor.name)),
            },
            CardElement {
                frame: frames.description,
                content: ElementContent::Text(styled_description(&descriptor.description)),
            },
            CardElement {
                frame: frames.container,
                content: ElementContent::Border(BorderSpec::default()),
            },
        ];

        Self {
            card_id: descriptor.id,
            container: frames.container,
            elements,
            reveal: Reveal::FadeIn { duration_ms: 600 },
            suppress: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn card_id(&self) -> CardId {
        self.card_id
    }

    pub fn container(&self) -> Rect {
        self.container
    }

    pub fn elements(&self) -> &[CardElement] {
        &self.elements
    }

    pub fn reveal(&self) -> Reveal {
        self.reveal
    }

    /// Stop any further drawing of this composite. Monotonic.
    pub fn suppress_display(&self) {
        self.suppress.store(true, Ordering::Release);
    }

    pub fn is_suppressed(&self) -> bool {
        self.suppress.load(Ordering::Acquire)
    }
}
