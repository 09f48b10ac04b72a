//! Snapshot comparison between two resolved overviews.
//!
//! The two overviews must be built independently from two complete
//! edge-list snapshots (e.g. before and after a change); this module
//! never mutates them and never sees a partially-constructed one.
//! Acquiring the snapshots (checking out revisions, running the module
//! graph command) is the caller's concern and must be serialized when
//! both snapshots come from one shared working tree.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::Serialize;

use crate::analysis::GraphStats;
use crate::graph::{Adjacency, DependencyOverview};

/// A module present in both snapshots whose effective version differs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionChange {
    pub path: String,
    pub before: String,
    pub after: String,
}

/// Signed deltas between two [`GraphStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsDelta {
    pub direct_dependencies: i64,
    pub transitive_dependencies: i64,
    pub total_dependencies: i64,
    pub max_depth_of_dependencies: i64,
}

/// The complete diff between two snapshots.
///
/// Node differences are computed over the deduplicated union of each
/// side's direct and transitive dependency lists; edge differences over
/// sorted `"from -> to"` renderings. The reduced edge lists are only
/// populated when [`DiffResult::reduce_edges`] has run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffResult {
    pub before: GraphStats,
    pub after: GraphStats,
    pub delta: StatsDelta,
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub edges_added: Vec<String>,
    pub edges_removed: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub version_changes: Vec<VersionChange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reduced_edges_added: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reduced_edges_removed: Option<Vec<String>>,
}

/// Compares two snapshots.
///
/// Symmetric by construction: `compute_diff(a, b).added` equals
/// `compute_diff(b, a).removed`, and likewise for edges.
pub fn compute_diff(before: &DependencyOverview, after: &DependencyOverview) -> DiffResult {
    let before_stats = GraphStats::compute(before);
    let after_stats = GraphStats::compute(after);

    let before_deps = before.all_deps();
    let after_deps = after.all_deps();
    let before_edges = rendered_edges(before.graph());
    let after_edges = rendered_edges(after.graph());

    DiffResult {
        before: before_stats,
        after: after_stats,
        delta: StatsDelta {
            direct_dependencies: after_stats.direct_dependencies as i64
                - before_stats.direct_dependencies as i64,
            transitive_dependencies: after_stats.transitive_dependencies as i64
                - before_stats.transitive_dependencies as i64,
            total_dependencies: after_stats.total_dependencies as i64
                - before_stats.total_dependencies as i64,
            max_depth_of_dependencies: after_stats.max_depth_of_dependencies as i64
                - before_stats.max_depth_of_dependencies as i64,
        },
        added: diff_slices(&before_deps, &after_deps),
        removed: diff_slices(&after_deps, &before_deps),
        edges_added: diff_slices(&before_edges, &after_edges),
        edges_removed: diff_slices(&after_edges, &before_edges),
        version_changes: version_changes(before, after),
        reduced_edges_added: None,
        reduced_edges_removed: None,
    }
}

impl DiffResult {
    /// Populates the reduced edge lists: diff edges that a renderer can
    /// omit because a longer path of other diff-relevant edges already
    /// explains the connectivity change.
    pub fn reduce_edges(&mut self, before: &DependencyOverview, after: &DependencyOverview) {
        let diff_nodes = self.diff_nodes();
        self.reduced_edges_added = Some(reduce_diff_edges(
            &self.edges_added,
            after.graph(),
            &diff_nodes,
        ));
        self.reduced_edges_removed = Some(reduce_diff_edges(
            &self.edges_removed,
            before.graph(),
            &diff_nodes,
        ));
    }

    /// Every module mentioned by this diff: added and removed modules,
    /// version changes, and both endpoints of every changed edge.
    fn diff_nodes(&self) -> HashSet<String> {
        let mut nodes: HashSet<String> = HashSet::new();
        nodes.extend(self.added.iter().cloned());
        nodes.extend(self.removed.iter().cloned());
        for change in &self.version_changes {
            nodes.insert(change.path.clone());
        }
        for edge in self.edges_added.iter().chain(self.edges_removed.iter()) {
            if let Some((from, to)) = split_edge(edge) {
                nodes.insert(from.to_string());
                nodes.insert(to.to_string());
            }
        }
        nodes
    }
}

/// Renders a graph's edges as sorted `"from -> to"` strings.
pub fn rendered_edges(graph: &Adjacency) -> Vec<String> {
    let mut edges: Vec<String> = graph
        .iter()
        .flat_map(|(from, tos)| tos.iter().map(move |to| format!("{from} -> {to}")))
        .collect();
    edges.sort();
    edges
}

fn split_edge(edge: &str) -> Option<(&str, &str)> {
    edge.split_once(" -> ")
}

/// Items in `b` that are not in `a`, sorted.
fn diff_slices(a: &[String], b: &[String]) -> Vec<String> {
    let known: HashSet<&str> = a.iter().map(String::as_str).collect();
    let mut out: Vec<String> = b
        .iter()
        .filter(|item| !known.contains(item.as_str()))
        .cloned()
        .collect();
    out.sort();
    out
}

/// Modules present as dependencies in both snapshots whose effective
/// versions differ, sorted by identifier. A module that disappeared
/// entirely is a removal, not a version change.
fn version_changes(before: &DependencyOverview, after: &DependencyOverview) -> Vec<VersionChange> {
    let after_deps: HashSet<String> = after.all_deps().into_iter().collect();
    let mut changes: Vec<VersionChange> = before
        .all_deps()
        .into_iter()
        .filter(|dep| after_deps.contains(dep))
        .filter_map(|dep| {
            let old = before.version_of(&dep)?;
            let new = after.version_of(&dep)?;
            if old != new {
                Some(VersionChange {
                    path: dep,
                    before: old.to_string(),
                    after: new.to_string(),
                })
            } else {
                None
            }
        })
        .collect();
    changes.sort_by(|a, b| a.path.cmp(&b.path));
    changes
}

/// Removes diff edges implied by longer paths through the diff-relevant
/// subgraph, but only when the alternative path contains at least one
/// other diff edge. A genuinely new edge whose endpoints were already
/// connected by untouched edges is never pruned.
fn reduce_diff_edges(
    diff_edges: &[String],
    full_graph: &Adjacency,
    diff_nodes: &HashSet<String>,
) -> Vec<String> {
    let diff_edge_set: HashSet<&str> = diff_edges.iter().map(String::as_str).collect();

    // Project the full graph onto just the diff-relevant nodes.
    let mut subgraph: HashMap<&str, Vec<&str>> = HashMap::new();
    for node in diff_nodes {
        if let Some(neighbors) = full_graph.get(node) {
            let kept: Vec<&str> = neighbors
                .iter()
                .filter(|n| diff_nodes.contains(n.as_str()))
                .map(String::as_str)
                .collect();
            if !kept.is_empty() {
                subgraph.insert(node.as_str(), kept);
            }
        }
    }

    diff_edges
        .iter()
        .filter(|edge| {
            let Some((from, to)) = split_edge(edge) else {
                return false;
            };
            !reachable_via_diff_path(from, to, &subgraph, &diff_edge_set)
        })
        .cloned()
        .collect()
}

/// BFS over (node, seen-a-diff-edge) states: is `dst` reachable from
/// `src` by a path of length > 1 (the direct edge excluded) in which at
/// least one edge is itself a diff edge?
fn reachable_via_diff_path(
    src: &str,
    dst: &str,
    subgraph: &HashMap<&str, Vec<&str>>,
    diff_edge_set: &HashSet<&str>,
) -> bool {
    let mut reached_with_diff: HashSet<&str> = HashSet::new();
    let mut reached_no_diff: HashSet<&str> = HashSet::new();
    let mut queue: VecDeque<(&str, bool)> = VecDeque::new();

    for &next in subgraph.get(src).map(Vec::as_slice).unwrap_or(&[]) {
        if next == dst {
            continue;
        }
        let has_diff = diff_edge_set.contains(format!("{src} -> {next}").as_str());
        let reached = if has_diff {
            &mut reached_with_diff
        } else {
            &mut reached_no_diff
        };
        if reached.insert(next) {
            queue.push_back((next, has_diff));
        }
    }

    while let Some((current, has_diff)) = queue.pop_front() {
        if current == dst && has_diff {
            return true;
        }
        for &next in subgraph.get(current).map(Vec::as_slice).unwrap_or(&[]) {
            let next_has_diff =
                has_diff || diff_edge_set.contains(format!("{current} -> {next}").as_str());
            let reached = if next_has_diff {
                &mut reached_with_diff
            } else {
                &mut reached_no_diff
            };
            if reached.insert(next) {
                queue.push_back((next, next_has_diff));
            }
        }
    }

    false
}
