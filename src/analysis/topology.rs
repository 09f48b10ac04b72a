//! Graph topology metrics: degrees, depths, and rankings.

use std::collections::{BTreeSet, HashMap, VecDeque};

use serde::{Serialize, Serializer};

use crate::graph::{Adjacency, DependencyOverview};

/// Per-node topology metrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeMetrics {
    pub module: String,
    pub in_degree: usize,
    pub out_degree: usize,
    /// Shortest distance from any main module; `None` when unreachable.
    /// Serialized as `-1` in that case to keep the JSON contract stable.
    #[serde(serialize_with = "serialize_depth")]
    pub depth: Option<usize>,
    pub is_main_module: bool,
}

fn serialize_depth<S: Serializer>(depth: &Option<usize>, ser: S) -> Result<S::Ok, S::Error> {
    match depth {
        Some(d) => ser.serialize_i64(*d as i64),
        None => ser.serialize_i64(-1),
    }
}

/// A single resolved edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphEdge {
    pub from: String,
    pub to: String,
}

/// Which degree metric to rank by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RankMode {
    In,
    Out,
    Both,
}

impl std::str::FromStr for RankMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "in" => Ok(RankMode::In),
            "out" => Ok(RankMode::Out),
            "both" => Ok(RankMode::Both),
            _ => Err(format!("Unknown rank mode: '{s}'. Valid modes: in, out, both")),
        }
    }
}

impl std::fmt::Display for RankMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RankMode::In => write!(f, "in"),
            RankMode::Out => write!(f, "out"),
            RankMode::Both => write!(f, "both"),
        }
    }
}

/// Top-N nodes by degree, for the requested mode(s).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rankings {
    pub mode: RankMode,
    pub n: usize,
    #[serde(rename = "in", skip_serializing_if = "Option::is_none")]
    pub top_in: Option<Vec<NodeMetrics>>,
    #[serde(rename = "out", skip_serializing_if = "Option::is_none")]
    pub top_out: Option<Vec<NodeMetrics>>,
}

/// Computes per-node metrics and the sorted edge list for an overview.
///
/// Nodes are sorted by identifier and edges by `(from, to)`, so output
/// is stable across runs.
pub fn build_topology(overview: &DependencyOverview) -> (Vec<NodeMetrics>, Vec<GraphEdge>) {
    let mut node_set: BTreeSet<&str> = BTreeSet::new();
    let mut in_degree: HashMap<&str, usize> = HashMap::new();
    let mut out_degree: HashMap<&str, usize> = HashMap::new();

    for main in overview.main_modules() {
        node_set.insert(main);
    }

    let mut edges: Vec<GraphEdge> = Vec::new();
    for (from, tos) in overview.graph() {
        node_set.insert(from);
        *out_degree.entry(from).or_insert(0) += tos.len();
        for to in tos {
            node_set.insert(to);
            *in_degree.entry(to).or_insert(0) += 1;
            edges.push(GraphEdge {
                from: from.clone(),
                to: to.clone(),
            });
        }
    }
    edges.sort_by(|a, b| a.from.cmp(&b.from).then_with(|| a.to.cmp(&b.to)));

    let depths = shortest_depths(overview.main_modules(), overview.graph());

    let nodes = node_set
        .into_iter()
        .map(|module| NodeMetrics {
            module: module.to_string(),
            in_degree: in_degree.get(module).copied().unwrap_or(0),
            out_degree: out_degree.get(module).copied().unwrap_or(0),
            depth: depths.get(module).copied(),
            is_main_module: overview.is_main(module),
        })
        .collect();

    (nodes, edges)
}

/// BFS shortest depth from the main modules. Unreachable nodes have no
/// entry.
pub fn shortest_depths(main_modules: &[String], graph: &Adjacency) -> HashMap<String, usize> {
    let mut depth: HashMap<String, usize> = HashMap::new();
    let mut queue: VecDeque<String> = VecDeque::new();

    for main in main_modules {
        if !depth.contains_key(main) {
            depth.insert(main.clone(), 0);
            queue.push_back(main.clone());
        }
    }

    while let Some(current) = queue.pop_front() {
        let next_depth = depth[&current] + 1;
        if let Some(nexts) = graph.get(&current) {
            for next in nexts {
                if !depth.contains_key(next) {
                    depth.insert(next.clone(), next_depth);
                    queue.push_back(next.clone());
                }
            }
        }
    }

    depth
}

/// Ranks nodes by degree: count descending, identifier ascending.
/// `n` larger than the node count just returns everything.
pub fn degree_rankings(nodes: &[NodeMetrics], mode: RankMode, n: usize) -> Rankings {
    let top_in = matches!(mode, RankMode::In | RankMode::Both)
        .then(|| top_by(nodes, n, |node| node.in_degree));
    let top_out = matches!(mode, RankMode::Out | RankMode::Both)
        .then(|| top_by(nodes, n, |node| node.out_degree));
    Rankings {
        mode,
        n,
        top_in,
        top_out,
    }
}

fn top_by(nodes: &[NodeMetrics], n: usize, metric: impl Fn(&NodeMetrics) -> usize) -> Vec<NodeMetrics> {
    let mut ranked = nodes.to_vec();
    ranked.sort_by(|a, b| {
        metric(b)
            .cmp(&metric(a))
            .then_with(|| a.module.cmp(&b.module))
    });
    ranked.truncate(n);
    ranked
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

    fn mains(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_shortest_depths() {
        let g = graph(&[
            ("main", &["A", "B"]),
            ("A", &["C"]),
            ("B", &["C", "D"]),
            ("C", &["E"]),
        ]);
        let depths = shortest_depths(&mains(&["main"]), &g);
        assert_eq!(depths["main"], 0);
        assert_eq!(depths["A"], 1);
        assert_eq!(depths["B"], 1);
        assert_eq!(depths["C"], 2);
        assert_eq!(depths["D"], 2);
        assert_eq!(depths["E"], 3);
    }

    #[test]
    fn test_shortest_depths_unreachable_absent() {
        let g = graph(&[("main", &["A"]), ("X", &["Y"])]);
        let depths = shortest_depths(&mains(&["main"]), &g);
        assert!(!depths.contains_key("X"));
        assert!(!depths.contains_key("Y"));
        assert_eq!(depths["A"], 1);
    }

    fn build_overview(input: &str) -> DependencyOverview {
        DependencyOverview::build(&parse_str(input), &[])
    }

    #[test]
    fn test_build_topology() {
        let input = "\
main a@v1
main b@v1
a@v1 c@v1
b@v1 c@v1
";
        let (nodes, edges) = build_topology(&build_overview(input));
        assert_eq!(nodes.len(), 4);
        assert_eq!(edges.len(), 4);

        let c = nodes.iter().find(|n| n.module == "c").unwrap();
        assert_eq!(c.in_degree, 2);
        assert_eq!(c.out_degree, 0);
        assert_eq!(c.depth, Some(2));

        let main = nodes.iter().find(|n| n.module == "main").unwrap();
        assert!(main.is_main_module);
        assert_eq!(main.depth, Some(0));

        // Nodes and edges are identifier-sorted.
        let names: Vec<&str> = nodes.iter().map(|n| n.module.as_str()).collect();
        assert_eq!(names, ["a", "b", "c", "main"]);
        assert_eq!(edges[0].from, "a");
        assert_eq!(edges[3].to, "b");
    }

    #[test]
    fn test_rankings_modes() {
        let nodes = vec![
            NodeMetrics {
                module: "A".into(),
                in_degree: 5,
                out_degree: 1,
                depth: Some(1),
                is_main_module: false,
            },
            NodeMetrics {
                module: "B".into(),
                in_degree: 3,
                out_degree: 4,
                depth: Some(1),
                is_main_module: false,
            },
            NodeMetrics {
                module: "C".into(),
                in_degree: 10,
                out_degree: 2,
                depth: Some(2),
                is_main_module: false,
            },
        ];

        let both = degree_rankings(&nodes, RankMode::Both, 2);
        let top_in = both.top_in.unwrap();
        let top_out = both.top_out.unwrap();
        assert_eq!(top_in.len(), 2);
        assert_eq!(top_in[0].module, "C");
        assert_eq!(top_out[0].module, "B");

        let in_only = degree_rankings(&nodes, RankMode::In, 2);
        assert!(in_only.top_in.is_some());
        assert!(in_only.top_out.is_none());

        let out_only = degree_rankings(&nodes, RankMode::Out, 2);
        assert!(out_only.top_in.is_none());
        assert!(out_only.top_out.is_some());

        // n beyond the node count returns everything.
        let all = degree_rankings(&nodes, RankMode::In, 99);
        assert_eq!(all.top_in.unwrap().len(), 3);
    }

    #[test]
    fn test_rank_mode_round_trip() {
        assert_eq!("in".parse::<RankMode>().unwrap(), RankMode::In);
        assert_eq!("BOTH".parse::<RankMode>().unwrap(), RankMode::Both);
        assert!("sideways".parse::<RankMode>().is_err());
        assert_eq!(RankMode::Out.to_string(), "out");
    }
}
