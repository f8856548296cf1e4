use std::sync::{
    Arc,
    mpsc::{self, Receiver, Sender},
};

use kurbo::Size;

use crate::{
    composite::CardComposite,
    layout,
    model::CardDescriptor,
    scheduler::BuildScheduler,
    task::{BuildContext, BuildTicket, BuiltCard, run_construction},
    transform::{BlurTransform, ImageTransform},
};

/// The cheap visual a slot shows whenever no composite is committed.
/// Structurally always present; a committed composite replaces it rather
/// than covering it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PlaceholderStyle {
    pub background_rgba: [u8; 4],
    pub badge_rgba: [u8; 4],
}

impl Default for PlaceholderStyle {
    fn default() -> Self {
        Self {
            background_rgba: [217, 217, 217, 255],
            badge_rgba: [190, 190, 190, 255],
        }
    }
}

/// What the host should draw for a slot right now.
#[derive(Debug)]
pub enum Visible<'a> {
    Placeholder(&'a PlaceholderStyle),
    Composite(&'a CardComposite),
}

/// A recyclable display slot: owns at most one in-flight construction task
/// and at most one committed composite.
///
/// All methods must be called from the interactive thread; the only state a
/// worker thread touches is each task's atomic cancellation flag. Completed
/// builds arrive over an internal channel and become visible in
/// [`process_commits`](Self::process_commits).
pub struct DisplaySlot {
    placeholder: PlaceholderStyle,
    transform: Arc<dyn ImageTransform>,
    natural_size: Option<Size>,
    generation: u64,
    current: Option<BuildTicket>,
    committed: Option<CardComposite>,
    commit_tx: Sender<BuiltCard>,
    commit_rx: Receiver<BuiltCard>,
}

impl DisplaySlot {
    pub fn new(transform: Arc<dyn ImageTransform>) -> Self {
        Self::with_placeholder(PlaceholderStyle::default(), transform)
    }

    pub fn with_placeholder(
        placeholder: PlaceholderStyle,
        transform: Arc<dyn ImageTransform>,
    ) -> Self {
        let (commit_tx, commit_rx) = mpsc::channel();
        Self {
            placeholder,
            transform,
            natural_size: None,
            generation: 0,
            current: None,
            committed: None,
            commit_tx,
            commit_rx,
        }
    }

    /// Cancel any in-flight build and schedule a new one for `descriptor`.
    ///
    /// Non-blocking and infallible: only the cheap descriptor properties are
    /// captured synchronously, everything slow happens on the scheduler. An
    /// already-committed composite stays visible until the new build commits.
    pub fn configure(&mut self, descriptor: CardDescriptor, scheduler: &dyn BuildScheduler) {
        if let Some(ticket) = &self.current {
            ticket.cancel.cancel();
        }

        self.natural_size = Some(descriptor.natural_size());
        self.generation += 1;
        let ticket = BuildTicket::new(self.generation);
        tracing::debug!(
            card = descriptor.id.0,
            generation = ticket.generation,
            "scheduling card build"
        );

        let ctx = BuildContext {
            descriptor,
            generation: ticket.generation,
            cancel: ticket.cancel.clone(),
            transform: self.transform.clone(),
            commits: self.commit_tx.clone(),
        };
        scheduler.spawn(Box::new(move || run_construction(ctx)));
        self.current = Some(ticket);
    }

    /// Return the slot to its pristine placeholder state.
    ///
    /// Cancels the in-flight build, suppresses and detaches the committed
    /// composite. Safe with no build active; idempotent.
    pub fn prepare_for_reuse(&mut self) {
        if let Some(ticket) = self.current.take() {
            ticket.cancel.cancel();
            tracing::debug!(generation = ticket.generation, "reuse cancelled in-flight build");
        }
        if let Some(composite) = self.committed.take() {
            composite.suppress_display();
        }
    }

    /// Interactive-thread pump: apply the commit guard to every completed
    /// build that has arrived since the last call.
    pub fn process_commits(&mut self) {
        while let Ok(built) = self.commit_rx.try_recv() {
            self.try_commit(built);
        }
    }

    /// Sizing query for the host's layout pass. Pure: depends only on the
    /// most recent descriptor's natural size, never on task state.
    pub fn intrinsic_size_for_constraint(&self, constraint: Size) -> Size {
        match self.natural_size {
            Some(natural) => layout::size_that_fits(constraint, natural),
            None => Size::ZERO,
        }
    }

    pub fn visible(&self) -> Visible<'_> {
        match &self.committed {
            Some(composite) => Visible::Composite(composite),
            None => Visible::Placeholder(&self.placeholder),
        }
    }

    pub fn committed(&self) -> Option<&CardComposite> {
        self.committed.as_ref()
    }

    pub fn placeholder(&self) -> &PlaceholderStyle {
        &self.placeholder
    }

    pub fn is_building(&self) -> bool {
        self.current.is_some()
    }

    /// The commit guard. Checked in order, all within this single
    /// interactive-thread step: (a) the originating task was not cancelled,
    /// (b) it is still this slot's current task, (c) the composite was not
    /// suppressed. Any failure discards the composite with no visual change.
    fn try_commit(&mut self, built: BuiltCard) {
        if built.cancel.is_cancelled() {
            tracing::trace!(generation = built.generation, "discarding cancelled build");
            return;
        }
        let current_generation = match &self.current {
            Some(ticket) => ticket.generation,
            None => {
                tracing::trace!(generation = built.generation, "discarding build with no current task");
                return;
            }
        };
        if built.generation != current_generation {
            tracing::trace!(
                generation = built.generation,
                current = current_generation,
                "discarding superseded build"
            );
            return;
        }
        if built.composite.is_suppressed() {
            tracing::trace!(generation = built.generation, "discarding suppressed composite");
            return;
        }

        tracing::debug!(
            card = built.composite.card_id().0,
            generation = built.generation,
            "committing composite"
        );
        self.committed = Some(built.composite);
        self.current = None;
    }
}

impl Default for DisplaySlot {
    fn default() -> Self {
        Self::new(Arc::new(BlurTransform::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::{CardDescriptor, CardId},
        scheduler::InlineScheduler,
        transform::NoopTransform,
    };
    use image::RgbaImage;

    fn slot() -> DisplaySlot {
        DisplaySlot::new(Arc::new(NoopTransform))
    }

    fn descriptor(id: u64) -> CardDescriptor {
        CardDescriptor::new(
            CardId(id),
            Arc::new(RgbaImage::new(20, 10)),
            "name",
            "description",
        )
    }

    #[test]
    fn fresh_slot_shows_placeholder() {
        let s = slot();
        assert!(matches!(s.visible(), Visible::Placeholder(_)));
        assert!(!s.is_building());
        assert_eq!(
            s.intrinsic_size_for_constraint(Size::new(100.0, 100.0)),
            Size::ZERO
        );
    }

    #[test]
    fn configure_then_pump_commits() {
        let mut s = slot();
        s.configure(descriptor(1), &InlineScheduler);
        assert!(s.is_building());
        s.process_commits();
        assert!(!s.is_building());
        assert_eq!(s.committed().unwrap().card_id(), CardId(1));
    }

    #[test]
    fn intrinsic_size_is_available_before_commit() {
        let mut s = slot();
        s.configure(descriptor(1), &InlineScheduler);
        let size = s.intrinsic_size_for_constraint(Size::new(10.0, 1000.0));
        assert_eq!(size.width, 10.0);
    }

    #[test]
    fn reuse_is_idempotent() {
        let mut s = slot();
        s.configure(descriptor(1), &InlineScheduler);
        s.process_commits();
        s.prepare_for_reuse();
        s.prepare_for_reuse();
        assert!(matches!(s.visible(), Visible::Placeholder(_)));
        assert!(!s.is_building());
    }

    #[test]
    fn reuse_on_a_fresh_slot_is_safe() {
        let mut s = slot();
        s.prepare_for_reuse();
        assert!(matches!(s.visible(), Visible::Placeholder(_)));
    }
}
