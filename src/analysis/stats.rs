//! Headline metrics for one resolved overview.

use serde::Serialize;

use crate::analysis::chains::longest_chain;
use crate::graph::DependencyOverview;

/// Dependency counts plus the maximum chain depth.
///
/// `max_depth_of_dependencies` is the length of the longest simple chain
/// starting at the first main module; an overview with no main module
/// reports 0 rather than failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphStats {
    pub direct_dependencies: usize,
    pub transitive_dependencies: usize,
    pub total_dependencies: usize,
    pub max_depth_of_dependencies: usize,
}

impl GraphStats {
    /// Computes stats for an overview.
    pub fn compute(overview: &DependencyOverview) -> Self {
        let max_depth = overview
            .main_modules()
            .first()
            .map(|main| longest_chain(main, overview.graph()).len())
            .unwrap_or(0);

        Self {
            direct_dependencies: overview.direct_deps().len(),
            transitive_dependencies: overview.transitive_deps().len(),
            total_dependencies: overview.all_deps().len(),
            max_depth_of_dependencies: max_depth,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::DependencyOverview;
    use crate::parser::parse_str;

    #[test]
    fn test_stats_for_simple_graph() {
        let input = "\
app lib@v1
app util@v1
lib@v1 util@v1
util@v1 leaf@v1
";
        let overview = DependencyOverview::build(&parse_str(input), &[]);
        let stats = GraphStats::compute(&overview);
        assert_eq!(stats.direct_dependencies, 2);
        assert_eq!(stats.transitive_dependencies, 2);
        assert_eq!(stats.total_dependencies, 3);
        // app -> lib -> util -> leaf
        assert_eq!(stats.max_depth_of_dependencies, 4);
    }

    #[test]
    fn test_stats_empty_overview() {
        let overview = DependencyOverview::build(&[], &[]);
        let stats = GraphStats::compute(&overview);
        assert_eq!(stats.total_dependencies, 0);
        assert_eq!(stats.max_depth_of_dependencies, 0);
    }
}
