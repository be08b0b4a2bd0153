//! A recording [AnimationPlayer] for driving the sequencer in tests.

use ahash::HashMap;

use crate::player::{AnimationPlayer, Crossfade, PlayerError};

#[derive(Clone, Debug, PartialEq)]
pub struct PlayCall {
    pub clip: String,
    pub looping: bool,
    pub crossfade_from: Option<String>,
    pub crossfade_duration: Option<f32>,
}

#[derive(Debug, Default)]
pub struct RecordingPlayer {
    durations: HashMap<String, f32>,
    active: Option<(String, f32)>,
    pub calls: Vec<PlayCall>,
}

impl RecordingPlayer {
    pub fn with_clips<'a>(clips: impl IntoIterator<Item = (&'a str, f32)>) -> Self {
        Self {
            durations: clips
                .into_iter()
                .map(|(name, duration)| (name.to_string(), duration))
                .collect(),
            ..Default::default()
        }
    }

    /// Every clip the quadruped graph references, each lasting `duration`.
    pub fn quadruped(duration: f32) -> Self {
        let graph = crate::TransitionGraph::quadruped();
        Self::with_clips(graph.clip_names().into_iter().map(|name| (name, duration)))
    }

    pub fn set_duration(&mut self, clip: &str, duration: f32) {
        self.durations.insert(clip.to_string(), duration);
    }

    pub fn remove_clip(&mut self, clip: &str) {
        self.durations.remove(clip);
    }

    /// Move the active clip's time to `time`.
    pub fn seek(&mut self, time: f32) {
        if let Some((_, current)) = self.active.as_mut() {
            *current = time;
        }
    }

    pub fn step(&mut self, delta_time: f32) {
        if let Some((_, time)) = self.active.as_mut() {
            *time += delta_time;
        }
    }

    pub fn played_clips(&self) -> Vec<&str> {
        self.calls.iter().map(|call| call.clip.as_str()).collect()
    }
}

impl AnimationPlayer for RecordingPlayer {
    fn has_clip(&self, clip: &str) -> bool {
        self.durations.contains_key(clip)
    }

    fn play(
        &mut self,
        clip: &str,
        looping: bool,
        crossfade: Option<Crossfade<'_>>,
    ) -> Result<(), PlayerError> {
        if !self.has_clip(clip) {
            return Err(PlayerError::ClipNotFound(clip.to_string()));
        }

        self.calls.push(PlayCall {
            clip: clip.to_string(),
            looping,
            crossfade_from: crossfade.map(|fade| fade.from.to_string()),
            crossfade_duration: crossfade.map(|fade| fade.duration),
        });
        self.active = Some((clip.to_string(), 0.0));

        Ok(())
    }

    fn current_time(&self, clip: &str) -> Option<f32> {
        self.active
            .as_ref()
            .filter(|(name, _)| name == clip)
            .map(|(_, time)| *time)
    }

    fn duration(&self, clip: &str) -> Option<f32> {
        self.durations.get(clip).copied()
    }
}
