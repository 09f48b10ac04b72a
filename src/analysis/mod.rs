//! Graph algorithms over a resolved dependency overview.
//!
//! Everything in this module is synchronous, single-threaded, and
//! operates on an immutable adjacency map. Each entry point constructs
//! its own working state (memo tables, blocked sets), so repeated calls
//! on the same graph are independent and deterministic for a fixed
//! adjacency iteration order.
//!
//! - [`chains`]: longest simple path from a start module.
//! - [`cycles`]: every elementary cycle (Johnson's algorithm), plus a
//!   summary report.
//! - [`paths`]: all simple paths between two modules and "why is this
//!   dependency here" reports.
//! - [`topology`]: per-node degrees and depths, with rankings.
//! - [`stats`]: headline counts for one overview.

pub mod chains;
pub mod cycles;
pub mod paths;
pub mod stats;
pub mod topology;

/// An ordered sequence of module identifiers forming a path through the
/// graph. Cycles are closed walks: the first element is repeated at the
/// end.
pub type Chain = Vec<String>;

pub use chains::longest_chain;
pub use cycles::{find_cycles, summarize_cycles, CycleParticipant, CycleSummary};
pub use paths::{find_all_paths, why, WhyPath, WhyReport};
pub use stats::GraphStats;
pub use topology::{build_topology, degree_rankings, GraphEdge, NodeMetrics, RankMode, Rankings};
