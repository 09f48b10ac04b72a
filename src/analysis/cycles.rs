//! Elementary cycle enumeration.
//!
//! Implements Johnson's algorithm: iterate candidate start nodes in a
//! stable index order, restrict each search to the strongly-connected
//! component of the subgraph induced by nodes at or above the start
//! index, and run the circuit DFS with blocked-set pruning inside that
//! component. The index restriction anchors every elementary cycle at
//! its lowest-indexed member, so each cycle is found exactly once and no
//! two reported cycles are rotations of one another.
//!
//! Time complexity is O((V+E)(C+1)) where C is the number of cycles;
//! the per-start SCC restriction is what keeps large, mostly-acyclic
//! dependency graphs fast.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use petgraph::algo::{is_cyclic_directed, tarjan_scc};
use petgraph::graph::DiGraph;
use serde::Serialize;

use crate::analysis::Chain;
use crate::graph::Adjacency;

/// Finds every elementary cycle in the graph.
///
/// Each returned chain is a closed walk `[n0, n1, ..., nk, n0]` with no
/// repeated internal node. `max_length == 0` means unbounded; otherwise
/// cycles longer than `max_length` edges are neither recorded nor
/// explored. The cap is enforced inside the DFS rather than as a
/// filter afterwards, so it bounds the work done, not just the output.
///
/// Output order is deterministic: start nodes are visited in sorted
/// identifier order and neighbors in adjacency order.
///
/// # Example
///
/// ```rust
/// use std::collections::BTreeMap;
/// use depscope::analysis::find_cycles;
///
/// let mut graph = BTreeMap::new();
/// graph.insert("a".to_string(), vec!["b".to_string()]);
/// graph.insert("b".to_string(), vec!["a".to_string()]);
///
/// let cycles = find_cycles(&graph, 0);
/// assert_eq!(cycles, vec![vec!["a", "b", "a"]]);
/// ```
pub fn find_cycles(graph: &Adjacency, max_length: usize) -> Vec<Chain> {
    // Stable indices via sorted identifier order, covering sources and
    // targets alike.
    let mut node_set: BTreeSet<&str> = BTreeSet::new();
    for (from, tos) in graph {
        node_set.insert(from);
        for to in tos {
            node_set.insert(to);
        }
    }
    let names: Vec<String> = node_set.into_iter().map(str::to_string).collect();
    let index: HashMap<&str, usize> = names
        .iter()
        .enumerate()
        .map(|(i, name)| (name.as_str(), i))
        .collect();

    let mut succ: Vec<Vec<usize>> = vec![Vec::new(); names.len()];
    for (from, tos) in graph {
        let v = index[from.as_str()];
        for to in tos {
            succ[v].push(index[to.as_str()]);
        }
    }

    // Dependency graphs are usually acyclic; bail out before the
    // per-start SCC work if so.
    if !has_any_cycle(&succ) {
        return Vec::new();
    }

    let mut finder = CycleFinder {
        succ: &succ,
        names: &names,
        blocked: vec![false; names.len()],
        blocked_map: vec![HashSet::new(); names.len()],
        stack: Vec::new(),
        cycles: Vec::new(),
        max_length,
    };

    for start in 0..names.len() {
        if let Some(members) = scc_containing(start, &succ) {
            for &m in &members {
                finder.blocked[m] = false;
                finder.blocked_map[m].clear();
            }
            let scc_set: HashSet<usize> = members.into_iter().collect();
            finder.circuit(start, start, &scc_set);
        }
    }

    finder.cycles
}

fn has_any_cycle(succ: &[Vec<usize>]) -> bool {
    let mut check = DiGraph::<(), ()>::with_capacity(succ.len(), 0);
    let nodes: Vec<_> = succ.iter().map(|_| check.add_node(())).collect();
    for (v, targets) in succ.iter().enumerate() {
        for &w in targets {
            check.add_edge(nodes[v], nodes[w], ());
        }
    }
    is_cyclic_directed(&check)
}

/// The strongly-connected component containing `start` within the
/// subgraph induced by indices >= `start`, or `None` when no cycle can
/// be anchored there (singleton component without a self-loop).
fn scc_containing(start: usize, succ: &[Vec<usize>]) -> Option<Vec<usize>> {
    let n = succ.len();
    let mut sub = DiGraph::<usize, ()>::with_capacity(n - start, 0);
    let locals: Vec<_> = (start..n).map(|global| sub.add_node(global)).collect();
    for v in start..n {
        for &w in &succ[v] {
            if w >= start {
                sub.add_edge(locals[v - start], locals[w - start], ());
            }
        }
    }

    for scc in tarjan_scc(&sub) {
        if !scc.iter().any(|&local| sub[local] == start) {
            continue;
        }
        if scc.len() > 1 {
            return Some(scc.into_iter().map(|local| sub[local]).collect());
        }
        return if succ[start].contains(&start) {
            Some(vec![start])
        } else {
            None
        };
    }
    None
}

/// Working state for one [`find_cycles`] invocation. Never reused across
/// graphs; every call owns fresh blocked sets and output.
struct CycleFinder<'a> {
    succ: &'a [Vec<usize>],
    names: &'a [String],
    blocked: Vec<bool>,
    /// B-sets: `blocked_map[w]` holds the nodes to cascade-unblock when
    /// `w` itself is unblocked.
    blocked_map: Vec<HashSet<usize>>,
    stack: Vec<usize>,
    cycles: Vec<Chain>,
    max_length: usize,
}

impl CycleFinder<'_> {
    /// Johnson's circuit DFS. Returns true when any cycle through the
    /// current branch was committed, which triggers the unblock cascade
    /// so later explorations from the same start can revisit this node.
    fn circuit(&mut self, v: usize, start: usize, scc: &HashSet<usize>) -> bool {
        let mut found = false;
        self.stack.push(v);
        self.blocked[v] = true;

        for i in 0..self.succ[v].len() {
            let w = self.succ[v][i];
            if !scc.contains(&w) {
                continue;
            }
            if w == start {
                if self.max_length == 0 || self.stack.len() <= self.max_length {
                    let mut cycle: Chain = self
                        .stack
                        .iter()
                        .map(|&ix| self.names[ix].clone())
                        .collect();
                    cycle.push(self.names[start].clone());
                    self.cycles.push(cycle);
                    found = true;
                }
            } else if !self.blocked[w]
                && (self.max_length == 0 || self.stack.len() < self.max_length)
                && self.circuit(w, start, scc)
            {
                found = true;
            }
        }

        if found {
            self.unblock(v);
        } else {
            for i in 0..self.succ[v].len() {
                let w = self.succ[v][i];
                if scc.contains(&w) {
                    self.blocked_map[w].insert(v);
                }
            }
        }

        self.stack.pop();
        found
    }

    fn unblock(&mut self, v: usize) {
        self.blocked[v] = false;
        let pending: Vec<usize> = self.blocked_map[v].drain().collect();
        for w in pending {
            if self.blocked[w] {
                self.unblock(w);
            }
        }
    }
}

/// Aggregate view over a cycle list: counts by length, mutual
/// dependencies, and the modules most often involved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleSummary {
    pub total_cycles: usize,
    /// Cycle count keyed by edge count.
    pub by_length: BTreeMap<usize, usize>,
    /// Deduplicated two-node mutual dependencies, each pair sorted.
    pub two_node_cycles: Vec<[String; 2]>,
    pub top_participants: Vec<CycleParticipant>,
}

/// A module and the number of cycles it appears in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleParticipant {
    pub module: String,
    pub cycle_count: usize,
}

/// Summarizes a cycle list, keeping the `top_n` most frequent
/// participants (ties broken by identifier).
pub fn summarize_cycles(cycles: &[Chain], top_n: usize) -> CycleSummary {
    let mut by_length: BTreeMap<usize, usize> = BTreeMap::new();
    let mut two_node: BTreeSet<(String, String)> = BTreeSet::new();
    let mut participant_counts: HashMap<&str, usize> = HashMap::new();

    for cycle in cycles {
        if cycle.len() < 2 {
            continue;
        }
        let edge_count = cycle.len() - 1;
        *by_length.entry(edge_count).or_insert(0) += 1;

        let mut seen_in_cycle: HashSet<&str> = HashSet::new();
        for module in &cycle[..cycle.len() - 1] {
            if seen_in_cycle.insert(module) {
                *participant_counts.entry(module).or_insert(0) += 1;
            }
        }

        if edge_count == 2 {
            let (a, b) = (&cycle[0], &cycle[1]);
            if b < a {
                two_node.insert((b.clone(), a.clone()));
            } else {
                two_node.insert((a.clone(), b.clone()));
            }
        }
    }

    let mut top_participants: Vec<CycleParticipant> = participant_counts
        .into_iter()
        .map(|(module, cycle_count)| CycleParticipant {
            module: module.to_string(),
            cycle_count,
        })
        .collect();
    top_participants.sort_by(|a, b| {
        b.cycle_count
            .cmp(&a.cycle_count)
            .then_with(|| a.module.cmp(&b.module))
    });
    top_participants.truncate(top_n);

    CycleSummary {
        total_cycles: cycles.len(),
        by_length,
        two_node_cycles: two_node.into_iter().map(|(a, b)| [a, b]).collect(),
        top_participants,
    }
}
