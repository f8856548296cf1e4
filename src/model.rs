use std::sync::Arc;

use image::RgbaImage;
use kurbo::Size;

use crate::error::{CardstockError, CardstockResult};

/// Identity token for one card's content.
///
/// Commit staleness is detected with per-slot build generations, not with this
/// id; the id exists so hosts can tell which content a committed composite was
/// built from.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct CardId(pub u64);

/// Immutable description of what one card should display.
///
/// The source image is assumed to be resident in memory already (no fetching
/// here) and is shared behind an `Arc`, so cloning a descriptor is cheap. The
/// pipeline only ever reads a descriptor.
#[derive(Clone, Debug)]
pub struct CardDescriptor {
    pub id: CardId,
    pub image: Arc<RgbaImage>,
    pub name: String,
    pub description: String,
}

impl CardDescriptor {
    pub fn new(
        id: CardId,
        image: Arc<RgbaImage>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id,
            image,
            name: name.into(),
            description: description.into(),
        }
    }

    /// Natural pixel size of the source image.
    pub fn natural_size(&self) -> Size {
        let (w, h) = self.image.dimensions();
        Size::new(f64::from(w), f64::from(h))
    }

    pub fn validate(&self) -> CardstockResult<()> {
        let (w, h) = self.image.dimensions();
        if w == 0 || h == 0 {
            return Err(CardstockError::validation(
                "descriptor image must have positive dimensions",
            ));
        }
        Ok(())
    }
}
