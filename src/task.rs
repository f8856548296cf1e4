use std::sync::{Arc, mpsc::Sender};

use crate::{
    composite::CardComposite,
    layout,
    model::CardDescriptor,
    transform::{CancelFlag, ImageTransform, TransformOutcome},
};

/// The slot's handle to its current construction task: the generation it was
/// issued with and the shared cancellation flag. The task itself holds no
/// reference back to the slot.
#[derive(Clone, Debug)]
pub(crate) struct BuildTicket {
    pub generation: u64,
    pub cancel: CancelFlag,
}

impl BuildTicket {
    pub(crate) fn new(generation: u64) -> Self {
        Self {
            generation,
            cancel: CancelFlag::new(),
        }
    }
}

/// Phase-1 result handed off to the interactive thread. The commit guard
/// re-checks `cancel` and `generation` before the composite becomes visible.
#[derive(Debug)]
pub(crate) struct BuiltCard {
    pub generation: u64,
    pub cancel: CancelFlag,
    pub composite: CardComposite,
}

pub(crate) struct BuildContext {
    pub descriptor: CardDescriptor,
    pub generation: u64,
    pub cancel: CancelFlag,
    pub transform: Arc<dyn ImageTransform>,
    pub commits: Sender<BuiltCard>,
}

/// Phase 1: assemble one composite on a worker thread.
///
/// Never touches slot state; the only communication back is the commit
/// channel. Transform aborts and failures both degrade to the untransformed
/// source image; neither surfaces to the host.
#[tracing::instrument(skip_all, fields(card = ctx.descriptor.id.0, generation = ctx.generation))]
pub(crate) fn run_construction(ctx: BuildContext) {
    if ctx.cancel.is_cancelled() {
        tracing::trace!("build skipped, cancelled before start");
        return;
    }

    let frames = layout::card_frames(ctx.descriptor.natural_size());

    let cancel = ctx.cancel.clone();
    let cancelled = move || cancel.is_cancelled();
    let background = match ctx.transform.apply(&ctx.descriptor.image, &cancelled) {
        TransformOutcome::Transformed(img) => Arc::new(img),
        TransformOutcome::Aborted => {
            tracing::trace!("transform aborted, falling back to source image");
            ctx.descriptor.image.clone()
        }
        TransformOutcome::Failed(err) => {
            tracing::warn!(%err, "transform failed, falling back to source image");
            ctx.descriptor.image.clone()
        }
    };

    let composite = CardComposite::assemble(&ctx.descriptor, &frames, background);

    // Skip dead work when already superseded; the commit guard re-checks
    // regardless.
    if ctx.cancel.is_cancelled() {
        tracing::trace!("build discarded, cancelled before hand-off");
        return;
    }

    // A closed channel means the slot is gone; there is nothing to commit to.
    let _ = ctx.commits.send(BuiltCard {
        generation: ctx.generation,
        cancel: ctx.cancel,
        composite,
    });
}
