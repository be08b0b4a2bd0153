use std::collections::VecDeque;

use strum::EnumCount;
use thiserror::Error;

use crate::{graph::TransitionGraph, state::GaitState};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PathError {
    #[error("No transition path from {from} to {to}")]
    NoPathFound { from: GaitState, to: GaitState },
}

/// Resolve the clips to play to move the model from `from` to `to`.
///
/// A direct edge is returned verbatim even when a search would produce fewer
/// clips. Without one, a breadth-first search finds the route with the fewest
/// edges, expanding neighbours in [GaitState] declaration order so ties
/// resolve the same way every time.
pub fn find_path(
    graph: &TransitionGraph,
    from: GaitState,
    to: GaitState,
) -> Result<Vec<String>, PathError> {
    if from == to {
        return graph
            .self_loop(from)
            .map(|clip| vec![clip.to_string()])
            .ok_or(PathError::NoPathFound { from, to });
    }

    let direct = graph.lookup(from, to);
    if !direct.is_empty() {
        return Ok(direct.to_vec());
    }

    let route = search(graph, from, to).ok_or(PathError::NoPathFound { from, to })?;

    tracing::trace!(
        %from,
        %to,
        route = ?route,
        "Resolved transition through intermediate gaits",
    );

    Ok(expand_route(graph, &route))
}

/// Breadth-first search over gaits, returning the visited states from `from`
/// to `to` inclusive.
fn search(graph: &TransitionGraph, from: GaitState, to: GaitState) -> Option<Vec<GaitState>> {
    let mut parents: [Option<GaitState>; GaitState::COUNT] = [None; GaitState::COUNT];
    let mut visited = [false; GaitState::COUNT];
    let mut queue = VecDeque::with_capacity(GaitState::COUNT);

    visited[from.index()] = true;
    queue.push_back(from);

    while let Some(current) = queue.pop_front() {
        if current == to {
            let mut route = vec![current];
            let mut cursor = current;
            while let Some(parent) = parents[cursor.index()] {
                route.push(parent);
                cursor = parent;
            }
            route.reverse();
            return Some(route);
        }

        for next in GaitState::ALL {
            if visited[next.index()] || !graph.has_edge(current, next) {
                continue;
            }
            visited[next.index()] = true;
            parents[next.index()] = Some(current);
            queue.push_back(next);
        }
    }

    None
}

/// Concatenate the edge clips along `route`.
///
/// Intermediate edges drop their final clip when it is the self loop of the
/// gait they arrive in; settling into that loop mid-route is redundant.
fn expand_route(graph: &TransitionGraph, route: &[GaitState]) -> Vec<String> {
    let edge_count = route.len().saturating_sub(1);
    let mut clips = Vec::new();

    for (index, pair) in route.windows(2).enumerate() {
        let (a, b) = (pair[0], pair[1]);
        let mut edge = graph.lookup(a, b);

        let is_terminal = index + 1 == edge_count;
        if !is_terminal && edge.last().is_some_and(|clip| clip == b.name()) {
            edge = &edge[..edge.len() - 1];
        }

        clips.extend(edge.iter().cloned());
    }

    clips
}
