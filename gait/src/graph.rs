use ahash::HashMap;
use thiserror::Error;

use crate::state::GaitState;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("Gait {0} has no self-loop clip")]
    MissingSelfLoop(GaitState),

    #[error("Self-loop for gait {gait} must be a single clip, found {len}")]
    InvalidSelfLoop { gait: GaitState, len: usize },
}

/// Directed lookup of the clips to play to move from one gait to another.
///
/// Every gait has a single-clip self loop; other pairs may be empty, in which
/// case the pathfinder derives a route through intermediate gaits.
#[derive(Clone, Debug)]
pub struct TransitionGraph {
    edges: HashMap<(GaitState, GaitState), Vec<String>>,
}

impl TransitionGraph {
    pub fn builder() -> TransitionGraphBuilder {
        TransitionGraphBuilder::default()
    }

    /// The authored quadruped table.
    ///
    /// Only neighbouring gaits are connected; far pairs such as `walk -> sit`
    /// are left for the pathfinder.
    pub fn quadruped() -> Self {
        use GaitState::*;

        let mut builder = Self::builder();
        for gait in GaitState::ALL {
            builder = builder.self_loop(gait);
        }

        let result = builder
            .edge(Stand, Walk, ["stand_to_walk", "walk"])
            .edge(Walk, Stand, ["walk_to_stand", "stand"])
            .edge(Walk, Trot, ["walk_to_trot", "trot"])
            .edge(Trot, Walk, ["trot_to_walk", "walk"])
            .edge(Trot, Gallop, ["trot_to_gallop", "gallop"])
            .edge(Gallop, Trot, ["gallop_to_trot", "trot"])
            .edge(Stand, Trot, ["stand_to_trot", "trot"])
            .edge(Trot, Stand, ["trot_to_stand", "stand"])
            .edge(Stand, Gallop, ["stand_to_trot", "trot_to_gallop", "gallop"])
            .edge(Stand, Sit, ["stand_to_sit", "sit"])
            .edge(Sit, Stand, ["sit_to_stand", "stand"])
            .edge(Stand, Reach, ["stand_to_reach", "reach"])
            .edge(Reach, Stand, ["reach_to_stand", "stand"])
            .build();

        match result {
            Ok(graph) => graph,
            Err(err) => unreachable!("authored quadruped graph is invalid: {err}"),
        }
    }

    /// Return the authored clips for `from -> to`, empty when no edge exists.
    #[inline]
    pub fn lookup(&self, from: GaitState, to: GaitState) -> &[String] {
        self.edges
            .get(&(from, to))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Return the clip that keeps the model in `gait`.
    #[inline]
    pub fn self_loop(&self, gait: GaitState) -> Option<&str> {
        self.lookup(gait, gait).first().map(String::as_str)
    }

    /// Whether a non-empty edge exists for `from -> to`.
    #[inline]
    pub fn has_edge(&self, from: GaitState, to: GaitState) -> bool {
        !self.lookup(from, to).is_empty()
    }

    /// Iterate authored non-empty edges in declaration order of `(from, to)`.
    pub fn edges(&self) -> impl Iterator<Item = (GaitState, GaitState, &[String])> {
        GaitState::ALL.into_iter().flat_map(move |from| {
            GaitState::ALL.into_iter().filter_map(move |to| {
                let clips = self.lookup(from, to);
                (!clips.is_empty()).then_some((from, to, clips))
            })
        })
    }

    /// Every distinct clip name referenced by the graph, sorted.
    pub fn clip_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .edges
            .values()
            .flat_map(|clips| clips.iter().map(String::as_str))
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }
}

#[derive(Debug, Default)]
pub struct TransitionGraphBuilder {
    edges: HashMap<(GaitState, GaitState), Vec<String>>,
}

impl TransitionGraphBuilder {
    /// Set the clips for `from -> to`, replacing any earlier definition.
    pub fn edge<I, S>(mut self, from: GaitState, to: GaitState, clips: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(from, to, clips.into_iter().map(Into::into).collect());
        self
    }

    /// Set the self loop of `gait` to the clip named after it.
    pub fn self_loop(self, gait: GaitState) -> Self {
        self.edge(gait, gait, [gait.name()])
    }

    /// Set the clips for `from -> to` in place.
    pub fn insert(&mut self, from: GaitState, to: GaitState, clips: Vec<String>) {
        if self.edges.insert((from, to), clips).is_some() {
            tracing::warn!(%from, %to, "Replacing previously defined transition");
        }
    }

    /// Validate the self-loop invariant and freeze the graph.
    pub fn build(mut self) -> Result<TransitionGraph, GraphError> {
        self.edges.retain(|_, clips| !clips.is_empty());

        for gait in GaitState::ALL {
            match self.edges.get(&(gait, gait)) {
                None => return Err(GraphError::MissingSelfLoop(gait)),
                Some(clips) if clips.len() != 1 => {
                    return Err(GraphError::InvalidSelfLoop {
                        gait,
                        len: clips.len(),
                    });
                }
                Some(_) => {}
            }
        }

        Ok(TransitionGraph { edges: self.edges })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use GaitState::*;

    #[test]
    fn quadruped_has_single_clip_self_loops() {
        let graph = TransitionGraph::quadruped();
        for gait in GaitState::ALL {
            assert_eq!(graph.lookup(gait, gait), [gait.name()]);
            assert_eq!(graph.self_loop(gait), Some(gait.name()));
        }
    }

    #[test]
    fn quadruped_leaves_far_pairs_empty() {
        let graph = TransitionGraph::quadruped();
        assert!(graph.lookup(Walk, Sit).is_empty());
        assert!(graph.lookup(Sit, Walk).is_empty());
        assert!(graph.lookup(Gallop, Reach).is_empty());
        assert!(!graph.has_edge(Gallop, Stand));
        assert!(graph.has_edge(Stand, Gallop));
    }

    #[test]
    fn quadruped_stand_to_gallop_goes_through_trot() {
        let graph = TransitionGraph::quadruped();
        assert_eq!(
            graph.lookup(Stand, Gallop),
            ["stand_to_trot", "trot_to_gallop", "gallop"]
        );
    }

    #[test]
    fn edges_iterate_in_declaration_order() {
        let graph = TransitionGraph::quadruped();
        let pairs: Vec<_> = graph
            .edges()
            .filter(|(from, _, _)| *from == Stand)
            .map(|(_, to, _)| to)
            .collect();
        assert_eq!(pairs, vec![Stand, Walk, Trot, Gallop, Sit, Reach]);
        assert_eq!(graph.edges().count(), 19);
    }

    #[test]
    fn clip_names_are_deduplicated() {
        let graph = TransitionGraph::quadruped();
        let names = graph.clip_names();
        assert_eq!(
            names.iter().filter(|name| **name == "stand_to_trot").count(),
            1
        );
        assert!(names.contains(&"reach_to_stand"));
    }

    #[test]
    fn build_rejects_missing_self_loop() {
        let result = TransitionGraph::builder()
            .self_loop(Stand)
            .edge(Stand, Walk, ["stand_to_walk", "walk"])
            .build();
        assert_eq!(result.unwrap_err(), GraphError::MissingSelfLoop(Walk));
    }

    #[test]
    fn build_rejects_multi_clip_self_loop() {
        let mut builder = TransitionGraph::builder();
        for gait in GaitState::ALL {
            builder = builder.self_loop(gait);
        }
        let result = builder.edge(Sit, Sit, ["sit", "sit_fidget"]).build();
        assert_eq!(
            result.unwrap_err(),
            GraphError::InvalidSelfLoop { gait: Sit, len: 2 }
        );
    }

    #[test]
    fn empty_edges_are_dropped() {
        let mut builder = TransitionGraph::builder();
        for gait in GaitState::ALL {
            builder = builder.self_loop(gait);
        }
        let graph = builder
            .edge(Walk, Sit, Vec::<String>::new())
            .build()
            .unwrap();
        assert!(!graph.has_edge(Walk, Sit));
        assert_eq!(graph.edges().count(), GaitState::ALL.len());
    }
}
