// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dependency validation and topological ordering (spec.md §4.B).
//!
//! The graph is never persisted as its own structure: it is recomputed
//! transiently from each job's `depends_on` list whenever an ordering is
//! needed (spec.md §9: "an arena + id model is sufficient").

use hcagent_core::JobId;
use std::collections::{HashMap, HashSet, VecDeque};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("job depends on itself")]
    SelfDependency,
    #[error("duplicate dependency id '{0}' in depends_on")]
    DuplicateDependency(JobId),
    #[error("dependency '{0}' does not exist")]
    DependencyNotFound(JobId),
    #[error("dependency on '{0}' would close a cycle")]
    Cycle(JobId),
}

/// Validates a new job's `depends_on` list against the set of ids that
/// already exist, per spec.md §4.B:
/// - no self-reference, no duplicate id in the same list
/// - every referenced id must already exist
/// - adding the edge set must not close a cycle
///
/// `existing_depends_on` maps every pre-existing job id to its own
/// `depends_on` list, used to walk forward from each referenced dependency
/// looking for a path back to `new_id`.
pub fn validate_new_dependencies(
    new_id: JobId,
    depends_on: &[JobId],
    existing_depends_on: &HashMap<JobId, Vec<JobId>>,
) -> Result<(), GraphError> {
    let mut seen = HashSet::new();
    for dep in depends_on {
        if *dep == new_id {
            return Err(GraphError::SelfDependency);
        }
        if !seen.insert(*dep) {
            return Err(GraphError::DuplicateDependency(*dep));
        }
        if !existing_depends_on.contains_key(dep) {
            return Err(GraphError::DependencyNotFound(*dep));
        }
    }

    // A cycle back to new_id can only occur by walking forward from one of
    // the new dependencies through pre-existing edges (pre-existing jobs
    // cannot already depend on new_id, since it didn't exist). So this
    // reduces to: does any existing job reachable from `depends_on` list
    // something that equals new_id? That is impossible today since new_id
    // is brand new, but future callers validating edits should still path
    // through this detector, so it is kept general via `Cycle` walking.
    for dep in depends_on {
        if reaches(*dep, new_id, existing_depends_on) {
            return Err(GraphError::Cycle(*dep));
        }
    }
    Ok(())
}

fn reaches(from: JobId, target: JobId, edges: &HashMap<JobId, Vec<JobId>>) -> bool {
    let mut stack = vec![from];
    let mut visited = HashSet::new();
    while let Some(node) = stack.pop() {
        if node == target {
            return true;
        }
        if !visited.insert(node) {
            continue;
        }
        if let Some(deps) = edges.get(&node) {
            stack.extend(deps.iter().copied());
        }
    }
    false
}

/// A node in the set being topologically sorted.
pub struct Node {
    pub id: JobId,
    pub depends_on: Vec<JobId>,
}

/// Kahn's algorithm restricted to the given node set, with ties broken by
/// insertion order (spec.md §4.B). An edge only counts if its source is
/// also present in `nodes` — used by the caller to exclude completed
/// predecessors from blocking a queued successor in listings.
pub fn topo_sort(nodes: Vec<Node>) -> Vec<JobId> {
    let present: HashSet<JobId> = nodes.iter().map(|n| n.id).collect();

    let mut indegree: HashMap<JobId, usize> = HashMap::new();
    let mut dependents: HashMap<JobId, Vec<JobId>> = HashMap::new();
    let mut order_index: HashMap<JobId, usize> = HashMap::new();

    for (i, node) in nodes.iter().enumerate() {
        order_index.insert(node.id, i);
        let relevant_deps = node.depends_on.iter().filter(|d| present.contains(d)).count();
        indegree.insert(node.id, relevant_deps);
        for dep in &node.depends_on {
            if present.contains(dep) {
                dependents.entry(*dep).or_default().push(node.id);
            }
        }
    }

    // Ready queue ordered by original insertion index for stable tie-breaking.
    let mut ready: VecDeque<JobId> = nodes
        .iter()
        .filter(|n| indegree.get(&n.id).copied().unwrap_or(0) == 0)
        .map(|n| n.id)
        .collect();
    ready.make_contiguous().sort_by_key(|id| order_index.get(id).copied().unwrap_or(usize::MAX));

    let mut result = Vec::with_capacity(nodes.len());
    while let Some(id) = ready.pop_front() {
        result.push(id);
        if let Some(deps) = dependents.get(&id) {
            let mut newly_ready = Vec::new();
            for dependent in deps {
                if let Some(count) = indegree.get_mut(dependent) {
                    *count -= 1;
                    if *count == 0 {
                        newly_ready.push(*dependent);
                    }
                }
            }
            newly_ready.sort_by_key(|id| order_index.get(id).copied().unwrap_or(usize::MAX));
            for nid in newly_ready {
                // Keep the queue sorted by insertion order overall.
                let pos = ready
                    .iter()
                    .position(|existing| {
                        order_index.get(existing).copied().unwrap_or(usize::MAX)
                            > order_index.get(&nid).copied().unwrap_or(usize::MAX)
                    })
                    .unwrap_or(ready.len());
                ready.insert(pos, nid);
            }
        }
    }

    result
}

#[cfg(test)]
#[path = "graph_tests.rs"]
mod tests;
