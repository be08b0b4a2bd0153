use std::{
    path::{Path, PathBuf},
    str::FromStr,
};

use gait::{GaitState, GraphError, TransitionGraph};
use thiserror::Error;

use crate::game::player::ClipLibrary;

use super::parser::{ConfigLine, ConfigLines};

/// Definitions shipped with the viewer.
const BUILTIN_GAIT_DEFS: &str = include_str!("../../../data/gait_defs.txt");

#[derive(Debug, Error)]
pub enum DefsError {
    #[error("File not found ({0})")]
    FileNotFound(PathBuf),

    #[error("Could not read {0} ({1})")]
    Io(PathBuf, String),

    #[error("Invalid transition graph ({0})")]
    Graph(#[from] GraphError),
}

impl DefsError {
    pub fn from_io_error(error: std::io::Error, path: &Path) -> Self {
        match error {
            err if err.kind() == std::io::ErrorKind::NotFound => {
                Self::FileNotFound(path.to_path_buf())
            }
            err => Self::Io(path.to_path_buf(), err.kind().to_string()),
        }
    }
}

#[derive(Debug)]
pub struct TransitionDef {
    pub from: GaitState,
    pub to: GaitState,
    /// Label used in diagnostics only.
    pub name: String,
    pub clips: Vec<String>,
}

#[derive(Debug)]
pub struct ClipDef {
    pub name: String,
    pub duration: f32,
}

#[derive(Debug, Default)]
pub struct GaitDefs {
    pub transitions: Vec<TransitionDef>,
    pub clips: Vec<ClipDef>,
}

impl GaitDefs {
    pub fn builtin() -> Self {
        Self::from(ConfigLines::parse(BUILTIN_GAIT_DEFS))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, DefsError> {
        let path = path.as_ref();
        let text =
            std::fs::read_to_string(path).map_err(|err| DefsError::from_io_error(err, path))?;
        let lines = ConfigLines::parse(&text);
        tracing::info!(lines = lines.len(), "Loading gait definitions: {}", path.display());
        Ok(Self::from(lines))
    }

    /// Build and validate the transition graph.
    pub fn graph(&self) -> Result<TransitionGraph, DefsError> {
        let mut builder = TransitionGraph::builder();
        for transition in self.transitions.iter() {
            tracing::debug!(
                name = %transition.name,
                from = %transition.from,
                to = %transition.to,
                clips = transition.clips.len(),
                "Transition defined"
            );
            builder.insert(transition.from, transition.to, transition.clips.clone());
        }
        Ok(builder.build()?)
    }

    pub fn clip_library(&self) -> ClipLibrary {
        let mut library = ClipLibrary::default();
        for clip in self.clips.iter() {
            library.insert(&clip.name, clip.duration);
        }
        library
    }

    /// Clips the graph references that have no declaration.
    pub fn undeclared_clips<'a>(&self, graph: &'a TransitionGraph) -> Vec<&'a str> {
        let library = self.clip_library();
        graph
            .clip_names()
            .into_iter()
            .filter(|name| !library.contains(name))
            .collect()
    }
}

enum ParseState {
    None,
    Transition(TransitionDef),
}

fn parse_gait(line: &ConfigLine, index: usize) -> Option<GaitState> {
    let label = line.string(index);
    match GaitState::from_str(&label) {
        Ok(gait) => Some(gait),
        Err(_) => {
            tracing::warn!(
                line = line.line_number,
                "Invalid {} gait label: {}",
                line.key,
                label
            );
            None
        }
    }
}

impl From<ConfigLines> for GaitDefs {
    fn from(value: ConfigLines) -> Self {
        let mut defs = GaitDefs::default();
        let mut parse_state = ParseState::None;

        for line in value.into_iter() {
            match line.key.as_str() {
                "BEGIN_TRANSITION_SEQ" => {
                    if let ParseState::Transition(open) =
                        std::mem::replace(&mut parse_state, ParseState::None)
                    {
                        tracing::warn!(
                            line = line.line_number,
                            "Transition sequence {} was not ended",
                            open.name
                        );
                        defs.transitions.push(open);
                    }

                    let (Some(from), Some(to)) = (parse_gait(&line, 0), parse_gait(&line, 1))
                    else {
                        continue;
                    };

                    let name = line
                        .maybe_param::<String>(2)
                        .filter(|name| !name.is_empty())
                        .unwrap_or_else(|| format!("{from}_to_{to}"));

                    parse_state = ParseState::Transition(TransitionDef {
                        from,
                        to,
                        name,
                        clips: Vec::default(),
                    });
                }

                "MOTION" => match &mut parse_state {
                    ParseState::None => {
                        tracing::warn!(
                            line = line.line_number,
                            "No transition sequence available to add MOTION."
                        );
                    }
                    ParseState::Transition(transition) => {
                        let clip = line.string(0);
                        if clip.is_empty() {
                            tracing::warn!(line = line.line_number, "MOTION missing clip name.");
                            continue;
                        }
                        transition.clips.push(clip);
                    }
                },

                "END_SEQUENCE" => match std::mem::replace(&mut parse_state, ParseState::None) {
                    ParseState::None => {
                        tracing::warn!(line = line.line_number, "No transition sequence to end.")
                    }
                    ParseState::Transition(transition) => defs.transitions.push(transition),
                },

                "DECLARE_CLIP" => {
                    let name = line.string(0);
                    let Some(duration) = line.maybe_param::<f32>(1) else {
                        tracing::warn!(
                            line = line.line_number,
                            "DECLARE_CLIP {} missing duration.",
                            name
                        );
                        continue;
                    };

                    if name.is_empty() {
                        tracing::warn!(line = line.line_number, "DECLARE_CLIP missing clip name.");
                        continue;
                    }

                    if duration <= 0.0 {
                        tracing::warn!(
                            line = line.line_number,
                            "Clip {} has a degenerate duration ({})",
                            name,
                            duration
                        );
                    }

                    defs.clips.push(ClipDef { name, duration });
                }

                "::" => {
                    // Section heading.
                }

                key => {
                    tracing::warn!(
                        line = line.line_number,
                        "Invalid key for gait definitions: {key}"
                    );
                }
            }
        }

        if let ParseState::Transition(open) = parse_state {
            tracing::warn!("Transition sequence {} was not ended", open.name);
            defs.transitions.push(open);
        }

        defs
    }
}
