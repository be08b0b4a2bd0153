use thiserror::Error;

use crate::{
    graph::TransitionGraph,
    pathfinder::{PathError, find_path},
    player::{AnimationPlayer, Crossfade, PlayerError},
    state::{GaitState, derive_gait},
};

/// Length of the blend between two consecutive clips, in seconds.
pub const CROSSFADE_DURATION: f32 = 0.3;

/// A non-looping clip counts as finished this close to its end, in seconds.
pub const END_EPSILON: f32 = 0.05;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SequencerError {
    #[error(transparent)]
    Path(#[from] PathError),

    #[error(transparent)]
    Player(#[from] PlayerError),
}

/// What happened to a gait request.
#[derive(Clone, Debug, PartialEq)]
pub enum RequestOutcome {
    /// The model is already settled in the requested gait.
    AlreadySettled,
    /// A transition started playing immediately.
    Started,
    /// A transition is in flight; the request will start once it drains.
    Pending { replaced: Option<GaitState> },
    /// The request waits for the current loop to reach its cycle boundary.
    DeferredToLoopEnd { replaced: Option<GaitState> },
    /// Clips are not loaded yet; the request is parked until they are.
    Queued { replaced: Option<GaitState> },
    /// The transition could not be started.
    Failed(SequencerError),
}

#[derive(Clone, Debug)]
struct SelectedClip {
    name: String,
    looping: bool,
}

/// Plays transition paths between gaits, one clip after another.
///
/// Mutated only by [GaitSequencer::request_gait] and the per-frame
/// [GaitSequencer::advance]; neither propagates failures, so the frame loop
/// keeps running whatever the player reports.
#[derive(Debug)]
pub struct GaitSequencer {
    /// The gait the model last settled into.
    current_gait: GaitState,
    /// Clips of the transition being played. Empty when idle.
    active_queue: Vec<String>,
    queue_cursor: usize,
    is_transitioning: bool,
    /// The most recent request that could not start yet.
    pending_target: Option<GaitState>,
    /// The pending target waits for the looping clip to finish its cycle.
    wait_for_loop_end: bool,
    /// The clip last handed to the player.
    selected: Option<SelectedClip>,
}

impl GaitSequencer {
    pub fn new(initial_gait: GaitState) -> Self {
        Self {
            current_gait: initial_gait,
            active_queue: Vec::new(),
            queue_cursor: 0,
            is_transitioning: false,
            pending_target: None,
            wait_for_loop_end: false,
            selected: None,
        }
    }

    /// Start the self loop of the initial gait.
    pub fn start(
        &mut self,
        graph: &TransitionGraph,
        player: &mut impl AnimationPlayer,
    ) -> Result<(), SequencerError> {
        let gait = self.current_gait;
        let clip = graph
            .self_loop(gait)
            .ok_or(PathError::NoPathFound {
                from: gait,
                to: gait,
            })?
            .to_string();

        self.play_clip(player, clip, true)?;
        tracing::info!(%gait, "Idling in initial gait");

        Ok(())
    }

    /// Request that the model moves to `target`.
    pub fn request_gait(
        &mut self,
        target: GaitState,
        graph: &TransitionGraph,
        player: &mut impl AnimationPlayer,
    ) -> RequestOutcome {
        if !self.is_transitioning && target == self.current_gait {
            if self.wait_for_loop_end {
                self.wait_for_loop_end = false;
                if let Some(cancelled) = self.pending_target.take() {
                    tracing::debug!(
                        %cancelled,
                        gait = %target,
                        "Cancelling deferred request, already settled in requested gait",
                    );
                }
            }
            return RequestOutcome::AlreadySettled;
        }

        if self.is_transitioning {
            let replaced = self.replace_pending(target);
            return RequestOutcome::Pending { replaced };
        }

        if self.selected_is_looping() {
            let replaced = self.replace_pending(target);
            self.wait_for_loop_end = true;
            tracing::debug!(%target, "Deferring request until the current loop ends");
            return RequestOutcome::DeferredToLoopEnd { replaced };
        }

        match self.start_transition(target, graph, player) {
            Ok(()) => RequestOutcome::Started,
            Err(err) => RequestOutcome::Failed(err),
        }
    }

    /// Query the player for the selected clip's progress and advance.
    pub fn tick(&mut self, graph: &TransitionGraph, player: &mut impl AnimationPlayer) {
        let Some(selected) = self.selected.as_ref() else {
            return;
        };

        // A clip the player no longer knows about has no duration; treat it as
        // degenerate so the queue moves on.
        let duration = player.duration(&selected.name).unwrap_or(0.0);
        let elapsed = player.current_time(&selected.name).unwrap_or(duration);

        self.advance(graph, player, elapsed, duration);
    }

    /// Advance the state machine given the selected clip's `elapsed` time
    /// and `duration`. Called once per frame.
    pub fn advance(
        &mut self,
        graph: &TransitionGraph,
        player: &mut impl AnimationPlayer,
        elapsed: f32,
        duration: f32,
    ) {
        if self.wait_for_loop_end && self.pending_target.is_some() && self.selected_is_looping() {
            if time_to_cycle_end(elapsed, duration) <= CROSSFADE_DURATION {
                self.wait_for_loop_end = false;
                if let Some(target) = self.pending_target.take() {
                    // Failures are logged where they happen.
                    let _ = self.start_transition(target, graph, player);
                }
            }
            return;
        }

        if !self.is_transitioning {
            return;
        }

        if duration <= 0.0 {
            tracing::warn!(
                clip = self.selected_animation_name().unwrap_or_default(),
                duration,
                "Degenerate clip duration, skipping to the next clip",
            );
        } else if elapsed < duration - END_EPSILON {
            return;
        }

        self.advance_queue(graph, player);
    }

    /// The gait the model last settled into.
    #[inline]
    pub fn current_gait(&self) -> GaitState {
        self.current_gait
    }

    #[inline]
    pub fn is_transitioning(&self) -> bool {
        self.is_transitioning
    }

    /// Name of the clip last handed to the player.
    #[inline]
    pub fn selected_animation_name(&self) -> Option<&str> {
        self.selected.as_ref().map(|selected| selected.name.as_str())
    }

    #[inline]
    pub fn pending_target(&self) -> Option<GaitState> {
        self.pending_target
    }

    #[inline]
    pub fn is_waiting_for_loop_end(&self) -> bool {
        self.wait_for_loop_end
    }

    #[inline]
    pub fn active_queue(&self) -> &[String] {
        &self.active_queue
    }

    #[inline]
    pub fn queue_cursor(&self) -> usize {
        self.queue_cursor
    }

    fn selected_is_looping(&self) -> bool {
        self.selected.as_ref().is_some_and(|selected| selected.looping)
    }

    fn replace_pending(&mut self, target: GaitState) -> Option<GaitState> {
        let replaced = self.pending_target.replace(target);
        if let Some(previous) = replaced {
            tracing::debug!(
                %previous,
                replacement = %target,
                "Replacing pending gait request before it was consumed",
            );
        }
        replaced
    }

    fn start_transition(
        &mut self,
        target: GaitState,
        graph: &TransitionGraph,
        player: &mut impl AnimationPlayer,
    ) -> Result<(), SequencerError> {
        let from = self.current_gait;
        let queue = find_path(graph, from, target).inspect_err(|err| {
            tracing::warn!(%from, to = %target, "{err}, dropping request");
        })?;

        tracing::debug!(%from, to = %target, clips = ?queue, "Starting transition");

        self.active_queue = queue;
        self.queue_cursor = 0;
        self.is_transitioning = true;

        self.play_step(graph, player)
    }

    fn advance_queue(&mut self, graph: &TransitionGraph, player: &mut impl AnimationPlayer) {
        self.queue_cursor += 1;

        if self.queue_cursor >= self.active_queue.len() {
            self.finish_transition(graph, player);
            return;
        }

        let _ = self.play_step(graph, player);
    }

    fn finish_transition(&mut self, graph: &TransitionGraph, player: &mut impl AnimationPlayer) {
        let previous = self.current_gait;
        if let Some(last) = self.active_queue.last() {
            self.current_gait = derive_gait(last, previous);
        }

        self.active_queue.clear();
        self.queue_cursor = 0;
        self.is_transitioning = false;

        tracing::info!(gait = %self.current_gait, %previous, "Settled into gait");

        let Some(target) = self.pending_target.take() else {
            return;
        };

        if target == self.current_gait {
            tracing::debug!(%target, "Dropping pending request for the settled gait");
            return;
        }

        let _ = self.start_transition(target, graph, player);
    }

    /// Play the clip under the cursor. Only the last clip of a queue loops.
    fn play_step(
        &mut self,
        graph: &TransitionGraph,
        player: &mut impl AnimationPlayer,
    ) -> Result<(), SequencerError> {
        let Some(clip) = self.active_queue.get(self.queue_cursor).cloned() else {
            return Ok(());
        };
        let looping = self.queue_cursor + 1 == self.active_queue.len();

        if let Err(err) = self.play_clip(player, clip, looping) {
            self.abandon_transition(graph, player, &err);
            return Err(err.into());
        }

        Ok(())
    }

    /// Drop the active queue after a clip failed and fall back to idling in
    /// the current gait's loop.
    fn abandon_transition(
        &mut self,
        graph: &TransitionGraph,
        player: &mut impl AnimationPlayer,
        err: &PlayerError,
    ) {
        tracing::warn!(
            step = self.queue_cursor,
            len = self.active_queue.len(),
            gait = %self.current_gait,
            "{err}, abandoning transition",
        );

        self.active_queue.clear();
        self.queue_cursor = 0;
        self.is_transitioning = false;

        let Some(idle) = graph.self_loop(self.current_gait).map(str::to_string) else {
            return;
        };

        let already_idle = self
            .selected
            .as_ref()
            .is_some_and(|selected| selected.looping && selected.name == idle);

        if !already_idle && let Err(err) = self.play_clip(player, idle, true) {
            tracing::warn!(gait = %self.current_gait, "{err}, cannot fall back to idle loop");
            if let Some(dropped) = self.pending_target.take() {
                tracing::warn!(%dropped, "Dropping pending gait request");
            }
            return;
        }

        // Let a surviving request try again at the next cycle boundary.
        self.wait_for_loop_end = self.pending_target.is_some();
    }

    fn play_clip(
        &mut self,
        player: &mut impl AnimationPlayer,
        name: String,
        looping: bool,
    ) -> Result<(), PlayerError> {
        if !player.has_clip(&name) {
            return Err(PlayerError::ClipNotFound(name));
        }

        let crossfade = self.selected.as_ref().map(|selected| Crossfade {
            from: selected.name.as_str(),
            duration: CROSSFADE_DURATION,
        });

        player.play(&name, looping, crossfade)?;

        tracing::trace!(clip = %name, looping, "Playing clip");
        self.selected = Some(SelectedClip { name, looping });

        Ok(())
    }
}

/// Seconds until a looping clip finishes its current cycle.
fn time_to_cycle_end(elapsed: f32, duration: f32) -> f32 {
    if duration <= 0.0 || !duration.is_finite() {
        return 0.0;
    }
    duration - elapsed.max(0.0).rem_euclid(duration)
}
