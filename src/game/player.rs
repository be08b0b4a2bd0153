use ahash::HashMap;
use bevy_ecs::prelude::*;
use gait::{AnimationPlayer, Crossfade, PlayerError};

/// Frames longer than this are clamped so a stall does not skip whole clips.
const MAX_DELTA_TIME: f32 = 0.125;

/// Durations of the clips a model has available, by name.
#[derive(Clone, Debug, Default)]
pub struct ClipLibrary {
    durations: HashMap<String, f32>,
}

impl ClipLibrary {
    pub fn insert(&mut self, name: &str, duration: f32) {
        if self
            .durations
            .insert(name.to_string(), duration)
            .is_some()
        {
            tracing::warn!(clip = name, "Clip declared more than once");
        }
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.durations.contains_key(name)
    }

    #[inline]
    pub fn duration(&self, name: &str) -> Option<f32> {
        self.durations.get(name).copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.durations.len()
    }
}

#[derive(Clone, Debug, PartialEq)]
struct ActiveClip {
    name: String,
    looping: bool,
    /// Seconds since the clip started. Looping clips keep the first cycle
    /// unwrapped, later cycles are folded back into the second one.
    time: f32,
    duration: f32,
}

impl ActiveClip {
    fn advance(&mut self, delta_time: f32) {
        if !self.looping {
            self.time = (self.time + delta_time).min(self.duration.max(0.0));
            return;
        }

        self.fold_cycles();
        self.time += delta_time;
        self.fold_cycles();
    }

    /// Drop whole cycles past the second one, keeping the phase.
    fn fold_cycles(&mut self) {
        let duration = self.duration;
        if duration > 0.0 && duration.is_finite() && self.time >= duration * 2.0 {
            self.time = duration + (self.time - duration).rem_euclid(duration);
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FadingClip {
    pub name: String,
    pub elapsed: f32,
    pub duration: f32,
}

/// Plays clips by advancing a clock per clip instead of posing a skeleton.
#[derive(Component, Debug, Default)]
pub struct SimulatedPlayer {
    library: ClipLibrary,
    active: Option<ActiveClip>,
    fading: Option<FadingClip>,
}

impl SimulatedPlayer {
    /// Replace the available clips. Playback state is kept.
    pub fn set_library(&mut self, library: ClipLibrary) {
        self.library = library;
    }

    pub fn fading_clip(&self) -> Option<&FadingClip> {
        self.fading.as_ref()
    }

    /// Weight of the active clip in the blend, 1.0 once any crossfade is done.
    pub fn blend_weight(&self) -> f32 {
        match self.fading {
            Some(ref fading) if fading.duration > 0.0 => {
                (fading.elapsed / fading.duration).clamp(0.0, 1.0)
            }
            _ => 1.0,
        }
    }

    pub fn update(&mut self, delta_time: f32) {
        if !delta_time.is_finite() {
            return;
        }
        let delta_time = delta_time.clamp(0.0, MAX_DELTA_TIME);

        if let Some(ref mut active) = self.active {
            active.advance(delta_time);
        }

        if let Some(ref mut fading) = self.fading {
            fading.elapsed += delta_time;
            if fading.elapsed >= fading.duration {
                self.fading = None;
            }
        }
    }
}

impl AnimationPlayer for SimulatedPlayer {
    fn has_clip(&self, clip: &str) -> bool {
        self.library.contains(clip)
    }

    fn play(
        &mut self,
        clip: &str,
        looping: bool,
        crossfade: Option<Crossfade<'_>>,
    ) -> Result<(), PlayerError> {
        let Some(duration) = self.library.duration(clip) else {
            return Err(PlayerError::ClipNotFound(clip.to_string()));
        };

        self.fading = crossfade
            .filter(|crossfade| crossfade.duration > 0.0)
            .map(|crossfade| FadingClip {
                name: crossfade.from.to_string(),
                elapsed: 0.0,
                duration: crossfade.duration,
            });

        tracing::debug!(clip, looping, "Playing clip");

        self.active = Some(ActiveClip {
            name: clip.to_string(),
            looping,
            time: 0.0,
            duration,
        });

        Ok(())
    }

    fn current_time(&self, clip: &str) -> Option<f32> {
        self.active
            .as_ref()
            .filter(|active| active.name == clip)
            .map(|active| active.time)
    }

    fn duration(&self, clip: &str) -> Option<f32> {
        self.library.duration(clip)
    }
}
