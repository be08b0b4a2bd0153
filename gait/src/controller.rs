use crate::{
    graph::TransitionGraph,
    player::AnimationPlayer,
    sequencer::{GaitSequencer, RequestOutcome, SequencerError},
    state::GaitState,
};

/// Owns the sequencer for one model across its load lifecycle.
#[derive(Debug)]
pub enum GaitController {
    /// Clips are still loading. At most one request is parked until they are
    /// available; a newer request replaces it.
    Loading {
        initial_gait: GaitState,
        parked: Option<GaitState>,
    },
    /// Clips are available and the sequencer is running.
    Ready(GaitSequencer),
}

impl GaitController {
    pub fn new(initial_gait: GaitState) -> Self {
        Self::Loading {
            initial_gait,
            parked: None,
        }
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    #[inline]
    pub fn sequencer(&self) -> Option<&GaitSequencer> {
        match self {
            Self::Loading { .. } => None,
            Self::Ready(sequencer) => Some(sequencer),
        }
    }

    /// Called once the model's clips are available.
    ///
    /// Starts the initial gait's loop and replays the parked request, if any.
    /// The controller becomes ready even when the initial loop cannot start;
    /// the error is returned for the caller to report.
    pub fn on_clips_loaded(
        &mut self,
        graph: &TransitionGraph,
        player: &mut impl AnimationPlayer,
    ) -> Result<(), SequencerError> {
        let Self::Loading {
            initial_gait,
            parked,
        } = *self
        else {
            tracing::warn!("Gait controller already received its clips");
            return Ok(());
        };

        let mut sequencer = GaitSequencer::new(initial_gait);
        let started = sequencer.start(graph, player);
        if let Err(ref err) = started {
            tracing::warn!(gait = %initial_gait, "{err}, initial loop not started");
        }

        if let Some(target) = parked {
            let outcome = sequencer.request_gait(target, graph, player);
            tracing::debug!(%target, ?outcome, "Replayed request parked during loading");
        }

        *self = Self::Ready(sequencer);

        started
    }

    pub fn request_gait(
        &mut self,
        target: GaitState,
        graph: &TransitionGraph,
        player: &mut impl AnimationPlayer,
    ) -> RequestOutcome {
        match self {
            Self::Loading { parked, .. } => {
                let replaced = parked.replace(target);
                tracing::debug!(
                    %target,
                    replaced = ?replaced,
                    "Clips not loaded yet, parking gait request",
                );
                RequestOutcome::Queued { replaced }
            }
            Self::Ready(sequencer) => sequencer.request_gait(target, graph, player),
        }
    }

    pub fn tick(&mut self, graph: &TransitionGraph, player: &mut impl AnimationPlayer) {
        if let Self::Ready(sequencer) = self {
            sequencer.tick(graph, player);
        }
    }
}
