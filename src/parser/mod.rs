//! Parser module for depscope.
//!
//! This module parses the line-oriented edge-list text emitted by a
//! package manager's "module graph" command into raw versioned edges.
//! Each line holds one `from to` pair, and either token may carry an
//! `@version` suffix:
//!
//! ```text
//! example.com/app example.com/lib@v1.2.0
//! example.com/lib@v1.2.0 example.com/util@v0.3.1
//! ```
//!
//! Parsing is deliberately forgiving: malformed lines are skipped rather
//! than failing the whole input, and toolchain pseudo-entries are dropped.
//! Version resolution and direct/transitive classification happen later,
//! in [`crate::graph::DependencyOverview`].

pub mod module_graph;

// Re-export commonly used types for convenience
pub use module_graph::{parse_file, parse_str, ParseError, ParseResult, RawEdge, RawModule};
