//! Graph module for resolved dependency modeling.
//!
//! This module builds a [`DependencyOverview`] from raw versioned edges:
//! each module identifier is resolved to the single effective version a
//! minimal-version-selection build would pick, stale-version edges are
//! pruned, and every surviving dependency is classified as direct or
//! transitive relative to the configured main modules.
//!
//! # Example
//!
//! ```rust
//! use depscope::graph::DependencyOverview;
//! use depscope::parser::parse_str;
//!
//! let edges = parse_str("app lib@v1.0.0\nlib@v1.0.0 util@v2.0.0\n");
//! let overview = DependencyOverview::build(&edges, &[]);
//!
//! assert_eq!(overview.main_modules(), ["app"]);
//! assert_eq!(overview.direct_deps(), ["lib"]);
//! assert_eq!(overview.transitive_deps(), ["util"]);
//! ```

mod overview;
pub mod version;

pub use overview::{Adjacency, DependencyOverview};
pub use version::version_gt;
