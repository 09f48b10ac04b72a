//! Parser for module-graph edge lists.
//!
//! Turns the raw `from to` line format into [`RawEdge`] values, keeping
//! version suffixes intact so that effective-version resolution can run
//! over the full versioned graph.

use std::fs;
use std::path::Path;

/// Errors that can occur while loading module-graph input.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Failed to read the input from disk.
    #[error("Failed to read module graph: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for parser operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// A module identifier with an optional version, as written in the raw
/// edge-list text.
///
/// Two `RawModule` values with the same name but different versions are
/// distinct nodes at this stage; they collapse into one node per name
/// once effective versions are resolved.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawModule {
    /// Module identifier (e.g., "example.com/lib").
    pub name: String,
    /// Version suffix, if the token carried one (e.g., "v1.2.0").
    pub version: Option<String>,
}

impl RawModule {
    /// Parses a single `name[@version]` token.
    ///
    /// # Example
    ///
    /// ```rust
    /// use depscope::parser::RawModule;
    ///
    /// let m = RawModule::parse("example.com/lib@v1.2.0");
    /// assert_eq!(m.name, "example.com/lib");
    /// assert_eq!(m.version.as_deref(), Some("v1.2.0"));
    ///
    /// let bare = RawModule::parse("example.com/app");
    /// assert!(bare.version.is_none());
    /// ```
    pub fn parse(token: &str) -> Self {
        match token.split_once('@') {
            Some((name, version)) => Self {
                name: name.to_string(),
                version: Some(version.to_string()),
            },
            None => Self {
                name: token.to_string(),
                version: None,
            },
        }
    }

    /// The version suffix, or `""` when the token had none.
    pub fn version_str(&self) -> &str {
        self.version.as_deref().unwrap_or("")
    }
}

impl std::fmt::Display for RawModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.version {
            Some(v) => write!(f, "{}@{}", self.name, v),
            None => write!(f, "{}", self.name),
        }
    }
}

/// One dependency requirement read from the raw input: `from` requires `to`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEdge {
    pub from: RawModule,
    pub to: RawModule,
}

/// Returns true for pseudo-modules the build toolchain injects into the
/// graph (e.g. `go@1.21.0 toolchain@go1.21.0` lines). These are not real
/// dependencies and must not become main modules.
fn is_toolchain_entry(name: &str) -> bool {
    name == "go" || name.starts_with("toolchain")
}

/// Parses module-graph text into raw edges.
///
/// One edge per line, whitespace-separated. Lines with fewer than two
/// tokens are skipped, as are toolchain pseudo-entries; extra tokens
/// after the first two are ignored. This never fails: unreadable lines
/// simply contribute nothing.
///
/// # Example
///
/// ```rust
/// use depscope::parser::parse_str;
///
/// let edges = parse_str("app lib@v1.0.0\nnot-an-edge\nlib@v1.0.0 util@v2.0.0\n");
/// assert_eq!(edges.len(), 2);
/// assert_eq!(edges[0].from.name, "app");
/// assert_eq!(edges[1].to.version.as_deref(), Some("v2.0.0"));
/// ```
pub fn parse_str(input: &str) -> Vec<RawEdge> {
    let mut edges = Vec::new();
    for line in input.lines() {
        let mut words = line.split_whitespace();
        let (Some(from), Some(to)) = (words.next(), words.next()) else {
            continue;
        };
        let from = RawModule::parse(from);
        if is_toolchain_entry(&from.name) {
            continue;
        }
        let to = RawModule::parse(to);
        edges.push(RawEdge { from, to });
    }
    edges
}

/// Reads and parses a module-graph file.
pub fn parse_file(path: &Path) -> ParseResult<Vec<RawEdge>> {
    let content = fs::read_to_string(path)?;
    Ok(parse_str(&content))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_versioned_token() {
        let m = RawModule::parse("k8s.io/api@v0.28.1");
        assert_eq!(m.name, "k8s.io/api");
        assert_eq!(m.version.as_deref(), Some("v0.28.1"));
        assert_eq!(m.version_str(), "v0.28.1");
    }

    #[test]
    fn test_parse_bare_token() {
        let m = RawModule::parse("example.com/app");
        assert_eq!(m.name, "example.com/app");
        assert!(m.version.is_none());
        assert_eq!(m.version_str(), "");
    }

    #[test]
    fn test_version_with_at_in_suffix() {
        // Only the first '@' separates name from version.
        let m = RawModule::parse("mod@v1.0.0@extra");
        assert_eq!(m.name, "mod");
        assert_eq!(m.version.as_deref(), Some("v1.0.0@extra"));
    }

    #[test]
    fn test_parse_str_skips_malformed_lines() {
        let input = "app lib@v1.0.0\nlonely-token\n\nlib@v1.0.0 util@v2.0.0\n";
        let edges = parse_str(input);
        assert_eq!(edges.len(), 2);
        assert_eq!(edges[0].from.name, "app");
        assert_eq!(edges[0].to.name, "lib");
        assert_eq!(edges[1].from.version.as_deref(), Some("v1.0.0"));
    }

    #[test]
    fn test_parse_str_skips_toolchain_entries() {
        let input = "go@1.21.0 toolchain@go1.21.0\ntoolchain@go1.21.0 whatever@v1\napp lib@v1.0.0\n";
        let edges = parse_str(input);
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].from.name, "app");
    }

    #[test]
    fn test_parse_str_empty_input() {
        assert!(parse_str("").is_empty());
    }

    #[test]
    fn test_display_round_trip() {
        assert_eq!(RawModule::parse("a@v1").to_string(), "a@v1");
        assert_eq!(RawModule::parse("a").to_string(), "a");
    }
}
