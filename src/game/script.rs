use std::str::FromStr;

use gait::GaitState;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ScriptError {
    #[error("Expected AT=INPUT, found \"{0}\"")]
    MissingSeparator(String),

    #[error("Invalid time \"{0}\"")]
    InvalidTime(String),

    #[error("Invalid input \"{0}\"")]
    InvalidInput(String),
}

/// What a scripted entry feeds into the viewer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Input {
    Gait(GaitState),
    Key(char),
}

impl Input {
    /// The key press this input stands for.
    pub fn key(self) -> char {
        match self {
            Input::Gait(gait) => gait.hotkey(),
            Input::Key(key) => key,
        }
    }
}

/// A single input fed to the viewer at a point in simulated time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScriptedInput {
    /// Seconds from the start of the run.
    pub at: f32,
    pub input: Input,
}

impl FromStr for ScriptedInput {
    type Err = ScriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((at, input)) = s.trim().split_once('=') else {
            return Err(ScriptError::MissingSeparator(s.to_string()));
        };

        let at = match at.trim().parse::<f32>() {
            Ok(at) if at.is_finite() && at >= 0.0 => at,
            _ => return Err(ScriptError::InvalidTime(at.to_string())),
        };

        let input = input.trim();
        let input = if let Ok(gait) = GaitState::from_str(input) {
            Input::Gait(gait)
        } else {
            let mut chars = input.chars();
            match (chars.next(), chars.next()) {
                (Some(key), None) => Input::Key(key),
                _ => return Err(ScriptError::InvalidInput(input.to_string())),
            }
        };

        Ok(Self { at, input })
    }
}

/// Scripted inputs ordered by time, consumed as the clock passes them.
#[derive(Debug, Default)]
pub struct Script {
    inputs: Vec<ScriptedInput>,
    next: usize,
}

impl Script {
    pub fn new(mut inputs: Vec<ScriptedInput>) -> Self {
        // Stable, so entries at the same time keep their command line order.
        inputs.sort_by(|a, b| a.at.total_cmp(&b.at));
        Self { inputs, next: 0 }
    }

    /// The next input scheduled at or before `time`.
    pub fn pop_due(&mut self, time: f32) -> Option<Input> {
        let scripted = self.inputs.get(self.next)?;
        if scripted.at > time {
            return None;
        }
        self.next += 1;
        Some(scripted.input)
    }

    pub fn is_finished(&self) -> bool {
        self.next >= self.inputs.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_gait_labels_and_keys() {
        assert_eq!(
            "1.5=trot".parse::<ScriptedInput>(),
            Ok(ScriptedInput {
                at: 1.5,
                input: Input::Gait(GaitState::Trot),
            })
        );
        assert_eq!(
            " 2 = GAIT_SIT ".parse::<ScriptedInput>(),
            Ok(ScriptedInput {
                at: 2.0,
                input: Input::Gait(GaitState::Sit),
            })
        );
        assert_eq!(
            "0=4".parse::<ScriptedInput>(),
            Ok(ScriptedInput {
                at: 0.0,
                input: Input::Key('4'),
            })
        );
    }

    #[test]
    fn rejects_malformed_entries() {
        assert_eq!(
            "trot".parse::<ScriptedInput>(),
            Err(ScriptError::MissingSeparator("trot".to_string()))
        );
        assert_eq!(
            "soon=trot".parse::<ScriptedInput>(),
            Err(ScriptError::InvalidTime("soon".to_string()))
        );
        assert_eq!(
            "-1=trot".parse::<ScriptedInput>(),
            Err(ScriptError::InvalidTime("-1".to_string()))
        );
        assert_eq!(
            "1=canter".parse::<ScriptedInput>(),
            Err(ScriptError::InvalidInput("canter".to_string()))
        );
    }

    #[test]
    fn input_maps_to_hotkey() {
        assert_eq!(Input::Gait(GaitState::Gallop).key(), '4');
        assert_eq!(Input::Key('x').key(), 'x');
    }

    #[test]
    fn pops_inputs_in_time_order() {
        let mut script = Script::new(vec![
            "2=sit".parse().unwrap(),
            "0.5=walk".parse().unwrap(),
            "2=reach".parse().unwrap(),
        ]);

        assert_eq!(script.pop_due(0.4), None);
        assert_eq!(script.pop_due(0.5), Some(Input::Gait(GaitState::Walk)));
        assert_eq!(script.pop_due(1.0), None);
        assert_eq!(script.pop_due(3.0), Some(Input::Gait(GaitState::Sit)));
        assert_eq!(script.pop_due(3.0), Some(Input::Gait(GaitState::Reach)));
        assert_eq!(script.pop_due(3.0), None);
        assert!(script.is_finished());
    }
}
