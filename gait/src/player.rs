use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlayerError {
    #[error("Clip not found ({0})")]
    ClipNotFound(String),
}

/// Blend parameters for a clip change.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Crossfade<'a> {
    /// The clip being faded out.
    pub from: &'a str,
    /// Length of the blend in seconds.
    pub duration: f32,
}

/// The clip playback capability the sequencer drives.
///
/// Clips are addressed by name; the player owns all clip data.
pub trait AnimationPlayer {
    /// Whether a clip with `clip` as its name is loaded.
    fn has_clip(&self, clip: &str) -> bool;

    /// Start playing `clip`, blending from `crossfade.from` when given.
    fn play(
        &mut self,
        clip: &str,
        looping: bool,
        crossfade: Option<Crossfade<'_>>,
    ) -> Result<(), PlayerError>;

    /// Seconds since `clip` started playing, if it is the active clip.
    ///
    /// Looping clips report unwrapped time through the end of their first
    /// cycle. Later cycles may be folded back by whole cycles.
    fn current_time(&self, clip: &str) -> Option<f32>;

    /// Length of one cycle of `clip` in seconds.
    fn duration(&self, clip: &str) -> Option<f32>;
}
