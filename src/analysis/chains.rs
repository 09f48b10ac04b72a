//! Longest dependency chain computation.
//!
//! Finds the longest simple path starting from a module. The graph may
//! contain cycles: a module already on the active path is never
//! re-entered, so the search always terminates, and the chain it returns
//! never repeats a node.

use std::collections::{HashMap, HashSet};

use crate::analysis::Chain;
use crate::graph::Adjacency;

/// Returns the longest simple path starting at `start`.
///
/// Results for completed subtrees are memoized per node and shared
/// across the whole computation, since a downstream module's longest
/// chain does not depend on how it was reached. Ties between equally long
/// chains go to the first one found in adjacency order, so output is
/// deterministic for a given graph.
///
/// A module with no outgoing edges yields a chain of just itself; an
/// unknown module likewise.
///
/// # Example
///
/// ```rust
/// use std::collections::BTreeMap;
/// use depscope::analysis::longest_chain;
///
/// let mut graph = BTreeMap::new();
/// graph.insert("a".to_string(), vec!["b".to_string()]);
/// graph.insert("b".to_string(), vec!["c".to_string()]);
///
/// assert_eq!(longest_chain("a", &graph), ["a", "b", "c"]);
/// assert_eq!(longest_chain("c", &graph), ["c"]);
/// ```
pub fn longest_chain(start: &str, graph: &Adjacency) -> Chain {
    let mut memo: HashMap<String, Chain> = HashMap::new();
    let mut on_path: HashSet<String> = HashSet::new();
    longest_from(start, graph, &mut on_path, &mut memo).unwrap_or_default()
}

/// Recursive worker. Returns `None` when `current` is already on the
/// active path: that edge contributes no extension, and the truncated
/// result must not be memoized (it is an artifact of this particular
/// path, not a property of the node).
fn longest_from(
    current: &str,
    graph: &Adjacency,
    on_path: &mut HashSet<String>,
    memo: &mut HashMap<String, Chain>,
) -> Option<Chain> {
    if let Some(done) = memo.get(current) {
        return Some(done.clone());
    }

    let deps = graph.get(current).map(Vec::as_slice).unwrap_or(&[]);
    if deps.is_empty() {
        // No dependencies: the longest chain is just us.
        let chain = vec![current.to_string()];
        memo.insert(current.to_string(), chain.clone());
        return Some(chain);
    }

    if on_path.contains(current) {
        return None;
    }
    on_path.insert(current.to_string());

    let mut best: Chain = Chain::new();
    for dep in deps {
        if let Some(candidate) = longest_from(dep, graph, on_path, memo) {
            if candidate.len() > best.len() {
                best = candidate;
            }
        }
    }

    on_path.remove(current);

    let mut chain = Chain::with_capacity(best.len() + 1);
    chain.push(current.to_string());
    chain.extend(best);
    memo.insert(current.to_string(), chain.clone());
    Some(chain)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(edges: &[(&str, &[&str])]) -> Adjacency {
        edges
            .iter()
            .map(|(from, tos)| {
                (
                    from.to_string(),
                    tos.iter().map(|t| t.to_string()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn test_acyclic_diamond() {
        //        A
        //      / | \
        //     B  C  D
        //      \/   |
        //      E    G
        //      |
        //      F
        //      |
        //      H
        let g = graph(&[
            ("A", &["B", "C", "D"]),
            ("B", &["E"]),
            ("C", &["E"]),
            ("D", &["G"]),
            ("E", &["F"]),
            ("F", &["H"]),
        ]);
        let chain = longest_chain("A", &g);
        assert_eq!(chain, ["A", "B", "E", "F", "H"]);
        assert_eq!(chain.len(), 5);
    }

    #[test]
    fn test_cycle_does_not_loop_forever() {
        //        A
        //       / \
        //      B   C
        //      |   |
        //      D   E
        //      |
        //      F -> G -> H -> D  (cycle)
        let g = graph(&[
            ("A", &["B", "C"]),
            ("B", &["D"]),
            ("C", &["E"]),
            ("D", &["F"]),
            ("F", &["G"]),
            ("G", &["H"]),
            ("H", &["D"]),
        ]);
        let chain = longest_chain("A", &g);
        assert_eq!(chain, ["A", "B", "D", "F", "G", "H"]);
        assert_eq!(chain.len(), 6);
    }

    #[test]
    fn test_interlocking_cycles() {
        let g = graph(&[
            ("A", &["B", "C"]),
            ("B", &["C"]),
            ("C", &["B", "E"]),
            ("E", &["F"]),
            ("F", &["D"]),
            ("D", &["C"]),
        ]);
        let chain = longest_chain("A", &g);
        assert_eq!(chain, ["A", "B", "C", "E", "F", "D"]);
    }

    #[test]
    fn test_no_repeated_nodes() {
        let g = graph(&[
            ("A", &["B"]),
            ("B", &["C"]),
            ("C", &["A", "B"]),
        ]);
        let chain = longest_chain("A", &g);
        let mut seen = std::collections::HashSet::new();
        for module in &chain {
            assert!(seen.insert(module.clone()), "repeated node {module}");
        }
    }

    #[test]
    fn test_leaf_and_unknown_start() {
        let g = graph(&[("A", &["B"])]);
        assert_eq!(longest_chain("B", &g), ["B"]);
        assert_eq!(longest_chain("nope", &g), ["nope"]);
    }

    #[test]
    fn test_deterministic_across_runs() {
        let g = graph(&[
            ("A", &["B", "C"]),
            ("B", &["D"]),
            ("C", &["D"]),
            ("D", &["E"]),
        ]);
        let first = longest_chain("A", &g);
        for _ in 0..10 {
            assert_eq!(longest_chain("A", &g), first);
        }
        // First-found tie-break: B comes before C in adjacency order.
        assert_eq!(first, ["A", "B", "D", "E"]);
    }
}
