#![forbid(unsafe_code)]

pub mod blur_cpu;
pub mod compose_cpu;
pub mod composite;
pub mod error;
pub mod fx;
pub mod layout;
pub mod model;
pub mod scheduler;
pub mod slot;
mod task;
pub mod text;
pub mod transform;

pub use compose_cpu::flatten;
pub use composite::{
    BorderSpec, CardComposite, CardElement, ElementContent, GradientSpec, ImageFit, Reveal,
};
pub use error::{CardstockError, CardstockResult};
pub use fx::{TransformParams, TransformSpec, parse_transform};
pub use layout::{CardFrames, card_frames, size_that_fits};
pub use model::{CardDescriptor, CardId};
pub use scheduler::{BuildScheduler, InlineScheduler, WorkerPool};
pub use slot::{DisplaySlot, PlaceholderStyle, Visible};
pub use text::{FontWeight, StyledText, styled_description, styled_title};
pub use transform::{
    BlurParams, BlurTransform, CancelFlag, ImageTransform, NoopTransform, TransformOutcome,
    transform_for_params,
};
