//! Sequencing of pre-authored animation clips between the gaits of a model.
//!
//! A [TransitionGraph] names the clips that carry the model from one gait to
//! another. The [GaitSequencer] resolves a route through the graph for each
//! request and plays it clip by clip through an [AnimationPlayer], keeping at
//! most one request waiting while a transition is in flight.

mod controller;
mod graph;
mod pathfinder;
mod player;
mod sequencer;
mod state;

#[cfg(test)]
mod test_player;

pub use controller::GaitController;
pub use graph::{GraphError, TransitionGraph, TransitionGraphBuilder};
pub use pathfinder::{PathError, find_path};
pub use player::{AnimationPlayer, Crossfade, PlayerError};
pub use sequencer::{CROSSFADE_DURATION, END_EPSILON, GaitSequencer, RequestOutcome, SequencerError};
pub use state::{GaitState, derive_gait};
