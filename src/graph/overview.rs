//! Effective-version resolution and dependency classification.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use crate::graph::version::version_gt;
use crate::parser::{RawEdge, RawModule};

/// Adjacency map of the resolved graph: module identifier to the ordered,
/// deduplicated list of identifiers it depends on. Modules with no
/// outgoing edges are absent as keys.
pub type Adjacency = BTreeMap<String, Vec<String>>;

/// A resolved snapshot of one module graph.
///
/// Built once per analysis from a raw edge list and immutable afterwards.
/// Every module identifier is collapsed to its single effective version
/// (the maximum requested by any reachable requester, in the
/// [`version_gt`] ordering), edges from stale versions are dropped, and
/// the surviving dependencies are classified relative to the main
/// modules:
///
/// - main → main edges classify as neither direct nor transitive;
/// - main → other: the target is a direct dependency;
/// - other → anything: the target is a transitive dependency.
///
/// A module can legitimately appear in both lists; callers that need the
/// deduplicated union use [`DependencyOverview::all_deps`].
#[derive(Debug, Clone, Default)]
pub struct DependencyOverview {
    graph: Adjacency,
    direct_deps: Vec<String>,
    transitive_deps: Vec<String>,
    main_modules: Vec<String>,
    versions: BTreeMap<String, String>,
}

impl DependencyOverview {
    /// Builds an overview from raw edges.
    ///
    /// When `main_modules` is empty the first module seen on the left of
    /// an edge becomes the sole main module. When main modules are
    /// supplied, every versioned occurrence of one of them on the left
    /// also seeds resolution, which makes multi-root workspace graphs
    /// resolve from all of their roots.
    ///
    /// Empty input produces an empty overview with no main modules.
    pub fn build(edges: &[RawEdge], main_modules: &[String]) -> Self {
        let mut versioned: HashMap<RawModule, Vec<RawModule>> = HashMap::new();
        let mut lhs_order: Vec<RawModule> = Vec::new();

        // Resolution roots: the first module in the input plus every
        // versioned occurrence of a configured main module.
        let mut roots: Vec<RawModule> = Vec::new();
        let mut seen_roots: HashSet<RawModule> = HashSet::new();

        let mut resolved_mains: Vec<String> = main_modules.to_vec();

        for edge in edges {
            let lhs = &edge.from;
            if roots.is_empty() || main_modules.contains(&lhs.name) {
                if seen_roots.insert(lhs.clone()) {
                    roots.push(lhs.clone());
                }
            }
            if resolved_mains.is_empty() {
                resolved_mains.push(lhs.name.clone());
            }
            if !versioned.contains_key(lhs) {
                lhs_order.push(lhs.clone());
            }
            versioned.entry(lhs.clone()).or_default().push(edge.to.clone());
        }

        // Seed effective versions from what the roots themselves request.
        // Since go1.17 the root records requirements on all of its
        // dependencies, including indirect ones, so this covers most of
        // the graph up front.
        let mut effective: HashMap<String, String> = HashMap::new();
        for root in &roots {
            if let Some(requirements) = versioned.get(root) {
                for m in requirements {
                    let current = effective.get(&m.name).map(String::as_str).unwrap_or("");
                    if version_gt(m.version_str(), current) {
                        effective.insert(m.name.clone(), m.version_str().to_string());
                    }
                }
            }
        }

        // Walk the versioned graph from the roots. A module is reachable
        // once visited; its requested version is promoted to the running
        // effective version if larger, or replaced by an already-larger
        // effective version before its own requirements are expanded.
        let mut reachable: HashSet<String> = HashSet::new();
        let mut queue: VecDeque<RawModule> = roots.iter().cloned().collect();
        while let Some(mut visit) = queue.pop_front() {
            if reachable.contains(&visit.name) {
                continue;
            }
            reachable.insert(visit.name.clone());
            match effective.get(&visit.name) {
                Some(eff) if version_gt(eff, visit.version_str()) => {
                    visit.version = Some(eff.clone());
                }
                _ => {
                    if let Some(ver) = &visit.version {
                        effective.insert(visit.name.clone(), ver.clone());
                    }
                }
            }
            if let Some(requirements) = versioned.get(&visit) {
                for m in requirements {
                    queue.push_back(m.clone());
                }
            }
        }

        // Collapse pass: keep only edges whose source is reachable at its
        // effective version. This is what prunes a superseded cycle (an
        // old major version's mutual dependency) from the final graph.
        let main_set: HashSet<&str> = resolved_mains.iter().map(String::as_str).collect();
        let mut graph: Adjacency = Adjacency::new();
        let mut direct_deps: Vec<String> = Vec::new();
        let mut transitive_deps: Vec<String> = Vec::new();

        for lhs in &lhs_order {
            if !reachable.contains(&lhs.name) {
                continue;
            }
            if let Some(eff) = effective.get(&lhs.name) {
                if lhs.version.as_deref() != Some(eff.as_str()) {
                    continue;
                }
            }
            let Some(requirements) = versioned.get(lhs) else {
                continue;
            };
            for rhs in requirements {
                let targets = graph.entry(lhs.name.clone()).or_default();
                if !targets.contains(&rhs.name) {
                    targets.push(rhs.name.clone());
                }

                let lhs_main = main_set.contains(lhs.name.as_str());
                let rhs_main = main_set.contains(rhs.name.as_str());
                if lhs_main && rhs_main {
                    continue;
                }
                if lhs_main {
                    if !direct_deps.contains(&rhs.name) {
                        direct_deps.push(rhs.name.clone());
                    }
                } else if !transitive_deps.contains(&rhs.name) {
                    transitive_deps.push(rhs.name.clone());
                }
            }
        }

        let versions: BTreeMap<String, String> = reachable
            .iter()
            .filter_map(|name| {
                effective
                    .get(name)
                    .map(|ver| (name.clone(), ver.clone()))
            })
            .collect();

        Self {
            graph,
            direct_deps,
            transitive_deps,
            main_modules: resolved_mains,
            versions,
        }
    }

    /// The resolved adjacency map.
    pub fn graph(&self) -> &Adjacency {
        &self.graph
    }

    /// The dependencies of one module, in first-seen order. Empty for
    /// leaves and unknown modules alike.
    pub fn adjacency(&self, name: &str) -> &[String] {
        self.graph.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Modules one edge away from a main module, in encounter order.
    pub fn direct_deps(&self) -> &[String] {
        &self.direct_deps
    }

    /// Modules required by non-main modules, in encounter order.
    pub fn transitive_deps(&self) -> &[String] {
        &self.transitive_deps
    }

    /// The root modules this overview was resolved against.
    pub fn main_modules(&self) -> &[String] {
        &self.main_modules
    }

    /// Whether `name` is one of the main modules.
    pub fn is_main(&self, name: &str) -> bool {
        self.main_modules.iter().any(|m| m == name)
    }

    /// Effective version per reachable module. Modules that only ever
    /// appear unversioned (typically the main modules) have no entry.
    pub fn versions(&self) -> &BTreeMap<String, String> {
        &self.versions
    }

    /// The effective version of one module, if it has one.
    pub fn version_of(&self, name: &str) -> Option<&str> {
        self.versions.get(name).map(String::as_str)
    }

    /// The deduplicated union of direct and transitive dependencies,
    /// direct entries first, preserving encounter order.
    ///
    /// A module can be both a direct and a transitive dependency, so the
    /// two lists cannot simply be concatenated.
    pub fn all_deps(&self) -> Vec<String> {
        let mut all: Vec<String> = Vec::with_capacity(self.direct_deps.len());
        for dep in self.direct_deps.iter().chain(self.transitive_deps.iter()) {
            if !all.contains(dep) {
                all.push(dep.clone());
            }
        }
        all
    }

    /// Total number of resolved edges.
    pub fn edge_count(&self) -> usize {
        self.graph.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_str;

    fn build(input: &str, mains: &[&str]) -> DependencyOverview {
        let mains: Vec<String> = mains.iter().map(|s| s.to_string()).collect();
        DependencyOverview::build(&parse_str(input), &mains)
    }

    #[test]
    fn test_empty_input() {
        let overview = build("", &[]);
        assert!(overview.main_modules().is_empty());
        assert!(overview.direct_deps().is_empty());
        assert!(overview.transitive_deps().is_empty());
        assert!(overview.graph().is_empty());
        assert!(overview.versions().is_empty());
    }

    #[test]
    fn test_first_module_becomes_main() {
        let overview = build("app lib@v1.0.0\nlib@v1.0.0 util@v1.0.0\n", &[]);
        assert_eq!(overview.main_modules(), ["app"]);
        assert!(overview.is_main("app"));
        assert!(!overview.is_main("lib"));
        assert_eq!(overview.direct_deps(), ["lib"]);
        assert_eq!(overview.transitive_deps(), ["util"]);
    }

    #[test]
    fn test_leaves_have_no_adjacency_entry() {
        let overview = build("app lib@v1.0.0\n", &[]);
        assert!(overview.graph().contains_key("app"));
        assert!(!overview.graph().contains_key("lib"));
        assert!(overview.adjacency("lib").is_empty());
    }

    #[test]
    fn test_duplicate_edges_deduplicated() {
        let overview = build("app lib@v1.0.0\napp lib@v1.0.0\n", &[]);
        assert_eq!(overview.adjacency("app"), ["lib"]);
        assert_eq!(overview.edge_count(), 1);
    }

    #[test]
    fn test_adjacency_preserves_encounter_order() {
        let overview = build("app z@v1\napp a@v1\napp m@v1\n", &[]);
        assert_eq!(overview.adjacency("app"), ["z", "a", "m"]);
    }

    #[test]
    fn test_effective_version_picks_maximum() {
        // The root records d at v2 while b still requests v1; d resolves
        // to v2 and only v2's own requirements survive.
        let input = "\
app b@v1.0.0
app d@v2.0.0
b@v1.0.0 d@v1.0.0
d@v1.0.0 old-only@v1.0.0
d@v2.0.0 new-only@v1.0.0
";
        let overview = build(input, &[]);
        assert_eq!(overview.version_of("d"), Some("v2.0.0"));
        assert_eq!(overview.adjacency("d"), ["new-only"]);
        let all = overview.all_deps();
        assert!(all.contains(&"new-only".to_string()));
        assert!(!all.contains(&"old-only".to_string()));
    }

    #[test]
    fn test_multi_root_workspace_resolution() {
        let input = "\
A B@v2
A C@v2
A D@v2
B@v2 C@v1
C@v1 D@v1
D@v1 C@v1
D@v1 E@v1
C@v2 D@v2
C@v2 F@v2
D@v2 C@v2
D@v2 G@v2
";
        let overview = build(input, &["A", "D"]);
        assert_eq!(overview.main_modules(), ["A", "D"]);

        let mut direct = overview.direct_deps().to_vec();
        direct.sort();
        assert_eq!(direct, ["B", "C", "G"]);

        let mut transitive = overview.transitive_deps().to_vec();
        transitive.sort();
        assert_eq!(transitive, ["C", "D", "F"]);

        // The v1 cycle and its E dependency are pruned: C resolved to v2.
        assert!(!overview.all_deps().contains(&"E".to_string()));
        assert_eq!(overview.adjacency("C"), ["D", "F"]);
        assert_eq!(overview.version_of("C"), Some("v2"));
        assert_eq!(overview.version_of("D"), Some("v2"));
    }

    #[test]
    fn test_unreachable_sources_dropped() {
        // orphan is never reachable from app, so its edges are pruned.
        let input = "app lib@v1.0.0\norphan@v1.0.0 stray@v1.0.0\n";
        let overview = build(input, &[]);
        assert!(!overview.graph().contains_key("orphan"));
        assert!(!overview.all_deps().contains(&"stray".to_string()));
    }

    #[test]
    fn test_main_to_main_edges_unclassified() {
        let input = "A B@v1\nA C@v1\n";
        let overview = build(input, &["A", "B"]);
        assert_eq!(overview.direct_deps(), ["C"]);
        assert!(overview.transitive_deps().is_empty());
        // The edge itself survives in the graph.
        assert_eq!(overview.adjacency("A"), ["B", "C"]);
    }

    #[test]
    fn test_versions_idempotent() {
        let input = "\
app b@v1.2.0
app c@v1.1.0
b@v1.2.0 c@v1.1.0
c@v1.1.0 d@v0.9.0
";
        let first = build(input, &[]);
        let second = build(input, &[]);
        assert_eq!(first.versions(), second.versions());
        assert_eq!(first.version_of("c"), Some("v1.1.0"));
    }

    #[test]
    fn test_dependency_in_both_lists_counted_once_in_all() {
        let input = "app lib@v1\napp util@v1\nlib@v1 util@v1\n";
        let overview = build(input, &[]);
        assert_eq!(overview.direct_deps(), ["lib", "util"]);
        assert_eq!(overview.transitive_deps(), ["util"]);
        assert_eq!(overview.all_deps(), ["lib", "util"]);
    }
}
