//! All-paths search and "why is this dependency here" reports.

use std::collections::HashSet;

use serde::Serialize;

use crate::analysis::Chain;
use crate::graph::{Adjacency, DependencyOverview};

/// One dependency path from a main module to the target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WhyPath {
    pub path: Chain,
    /// True for a two-node path starting at a main module; the target
    /// is a direct dependency along this path.
    pub direct: bool,
}

/// Everything a renderer needs to explain why a dependency is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WhyReport {
    pub target: String,
    pub found: bool,
    pub paths: Vec<WhyPath>,
    /// Modules with a direct edge to the target, sorted.
    pub direct_dependents: Vec<String>,
    pub main_modules: Vec<String>,
    /// True when the search stopped at the path cap before exhausting
    /// the graph.
    pub truncated: bool,
    pub total_paths: usize,
}

/// Finds all simple paths from `start` to `target`, capped at
/// `max_paths` results (`0` = unbounded).
///
/// A path ends at its first arrival at `target`, even when the target
/// has outgoing edges of its own. The visited set is scoped to the
/// current branch, so two different paths may pass through the same
/// intermediate module.
///
/// # Example
///
/// ```rust
/// use std::collections::BTreeMap;
/// use depscope::analysis::find_all_paths;
///
/// let mut graph = BTreeMap::new();
/// graph.insert("a".to_string(), vec!["b".to_string(), "c".to_string()]);
/// graph.insert("b".to_string(), vec!["d".to_string()]);
/// graph.insert("c".to_string(), vec!["d".to_string()]);
///
/// let paths = find_all_paths("a", "d", &graph, 0);
/// assert_eq!(paths.len(), 2);
///
/// let capped = find_all_paths("a", "d", &graph, 1);
/// assert_eq!(capped.len(), 1);
/// ```
pub fn find_all_paths(start: &str, target: &str, graph: &Adjacency, max_paths: usize) -> Vec<Chain> {
    let mut out = Vec::new();
    let mut path = Chain::new();
    let mut visited = HashSet::new();
    search(start, target, graph, &mut path, &mut visited, &mut out, max_paths);
    out
}

/// DFS worker. The cap is checked on entry and after every child call so
/// that the search aborts promptly at any recursion depth once
/// `max_paths` results exist, instead of unwinding a fully-explored
/// subtree first.
fn search(
    current: &str,
    target: &str,
    graph: &Adjacency,
    path: &mut Chain,
    visited: &mut HashSet<String>,
    out: &mut Vec<Chain>,
    max_paths: usize,
) {
    if max_paths > 0 && out.len() >= max_paths {
        return;
    }

    path.push(current.to_string());

    if current == target {
        out.push(path.clone());
        path.pop();
        return;
    }

    if visited.contains(current) {
        path.pop();
        return;
    }
    visited.insert(current.to_string());

    if let Some(nexts) = graph.get(current) {
        for next in nexts {
            search(next, target, graph, path, visited, out, max_paths);
            if max_paths > 0 && out.len() >= max_paths {
                break;
            }
        }
    }

    visited.remove(current);
    path.pop();
}

/// Builds a [`WhyReport`] for `target` against a resolved overview.
///
/// Paths are searched from every main module into one shared result
/// list, so `max_paths` bounds the total across all roots. Results are
/// sorted shortest-first, ties broken by the joined path text.
pub fn why(overview: &DependencyOverview, target: &str, max_paths: usize) -> WhyReport {
    let mut report = WhyReport {
        target: target.to_string(),
        found: false,
        paths: Vec::new(),
        direct_dependents: Vec::new(),
        main_modules: overview.main_modules().to_vec(),
        truncated: false,
        total_paths: 0,
    };

    report.found = overview.all_deps().iter().any(|dep| dep == target);
    if !report.found {
        return report;
    }

    for (from, tos) in overview.graph() {
        if tos.iter().any(|to| to == target) {
            report.direct_dependents.push(from.clone());
        }
    }
    report.direct_dependents.sort();

    let mut all_paths: Vec<Chain> = Vec::new();
    let mut path = Chain::new();
    let mut visited = HashSet::new();
    for main in overview.main_modules() {
        search(
            main,
            target,
            overview.graph(),
            &mut path,
            &mut visited,
            &mut all_paths,
            max_paths,
        );
        if max_paths > 0 && all_paths.len() >= max_paths {
            report.truncated = true;
            break;
        }
    }

    report.paths = all_paths
        .into_iter()
        .map(|path| {
            let direct = path.len() == 2 && overview.is_main(&path[0]);
            WhyPath { path, direct }
        })
        .collect();
    report.paths.sort_by(|a, b| {
        a.path
            .len()
            .cmp(&b.path.len())
            .then_with(|| a.path.join(" -> ").cmp(&b.path.join(" -> ")))
    });
    report.total_paths = report.paths.len();

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::DependencyOverview;
    use crate::parser::parse_str;

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
    fn test_all_paths_in_diamond() {
        let g = graph(&[("A", &["B", "C"]), ("B", &["D"]), ("C", &["D"])]);
        let paths = find_all_paths("A", "D", &g, 0);
        assert_eq!(paths.len(), 2);
        assert!(paths.contains(&vec!["A".to_string(), "B".to_string(), "D".to_string()]));
        assert!(paths.contains(&vec!["A".to_string(), "C".to_string(), "D".to_string()]));
    }

    #[test]
    fn test_path_cap_honored() {
        let g = graph(&[("A", &["B", "C"]), ("B", &["D"]), ("C", &["D"])]);
        let paths = find_all_paths("A", "D", &g, 1);
        assert_eq!(paths.len(), 1);
    }

    #[test]
    fn test_path_ends_at_first_arrival() {
        // D has outgoing edges; a path to D must not continue past it.
        let g = graph(&[("A", &["D"]), ("D", &["E"]), ("E", &["D"])]);
        let paths = find_all_paths("A", "D", &g, 0);
        assert_eq!(paths, vec![vec!["A".to_string(), "D".to_string()]]);
    }

    #[test]
    fn test_cycle_terminates() {
        let g = graph(&[("A", &["B"]), ("B", &["C"]), ("C", &["A", "D"])]);
        let paths = find_all_paths("A", "D", &g, 0);
        assert_eq!(
            paths,
            vec![vec![
                "A".to_string(),
                "B".to_string(),
                "C".to_string(),
                "D".to_string()
            ]]
        );
    }

    #[test]
    fn test_no_path_between_disconnected_nodes() {
        let g = graph(&[("A", &["B"]), ("X", &["Y"])]);
        assert!(find_all_paths("A", "Y", &g, 0).is_empty());
    }

    #[test]
    fn test_start_equals_target() {
        let g = graph(&[("A", &["B"])]);
        let paths = find_all_paths("A", "A", &g, 0);
        assert_eq!(paths, vec![vec!["A".to_string()]]);
    }

    fn overview(input: &str) -> DependencyOverview {
        DependencyOverview::build(&parse_str(input), &[])
    }

    #[test]
    fn test_why_report_basic() {
        let input = "\
app lib@v1
app util@v1
lib@v1 util@v1
util@v1 leaf@v1
";
        let report = why(&overview(input), "util", 0);
        assert!(report.found);
        assert_eq!(report.direct_dependents, ["app", "lib"]);
        assert_eq!(report.total_paths, 2);
        // Shortest first; the two-node path from the main module is direct.
        assert_eq!(report.paths[0].path, ["app", "util"]);
        assert!(report.paths[0].direct);
        assert_eq!(report.paths[1].path, ["app", "lib", "util"]);
        assert!(!report.paths[1].direct);
        assert!(!report.truncated);
    }

    #[test]
    fn test_why_missing_target() {
        let report = why(&overview("app lib@v1\n"), "ghost", 0);
        assert!(!report.found);
        assert!(report.paths.is_empty());
        assert!(report.direct_dependents.is_empty());
    }

    #[test]
    fn test_why_truncation_flag() {
        let input = "\
app a@v1
app b@v1
a@v1 leaf@v1
b@v1 leaf@v1
";
        let report = why(&overview(input), "leaf", 1);
        assert_eq!(report.total_paths, 1);
        assert!(report.truncated);
    }
}
