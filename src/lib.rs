//! depscope - dependency graph metrics for module-graph output
//!
//! This crate analyzes the edge-list text emitted by a package manager's
//! "module graph" command: it resolves every module to its effective
//! version, classifies dependencies as direct or transitive, and runs
//! graph metrics over the result: longest chains, elementary cycles,
//! path explanations, and diffs between two snapshots.

pub mod analysis;
pub mod diff;
pub mod graph;
pub mod parser;
