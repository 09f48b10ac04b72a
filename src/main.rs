//! Command-line interface for depscope.
//!
//! The CLI is a thin collaborator around the library: it loads raw
//! module-graph text from a file or stdin (it never invokes build or
//! version-control tools itself), validates flag contracts, and renders
//! the library's data structures as text or JSON.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use depscope::analysis::{
    build_topology, degree_rankings, find_cycles, longest_chain, summarize_cycles, why, Chain,
    GraphEdge, GraphStats, NodeMetrics, RankMode, Rankings, WhyReport,
};
use depscope::diff::compute_diff;
use depscope::graph::DependencyOverview;
use depscope::parser;

#[derive(Parser)]
#[command(name = "depscope")]
#[command(version)]
#[command(about = "Dependency graph metrics from module-graph output", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Arguments shared by every command that reads one snapshot.
#[derive(Args)]
struct InputArgs {
    /// Module graph file to analyze; "-" reads stdin
    #[arg(default_value = "-")]
    input: PathBuf,

    /// Modules whose dependencies count as direct; defaults to the
    /// first module encountered in the input
    #[arg(short = 'm', long = "main-modules", value_delimiter = ',')]
    main_modules: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show metrics about dependency chains
    Stats {
        #[command(flatten)]
        input: InputArgs,

        /// Also list all dependencies and the longest chain
        #[arg(short, long)]
        verbose: bool,

        /// Output in JSON format
        #[arg(short, long)]
        json: bool,
    },
    /// List all project dependencies
    List {
        #[command(flatten)]
        input: InputArgs,

        /// Output in JSON format
        #[arg(short, long)]
        json: bool,
    },
    /// Show graph topology: degrees, depths, and rankings
    Graph {
        #[command(flatten)]
        input: InputArgs,

        /// Show top modules by degree: in, out, or both
        #[arg(long)]
        top: Option<RankMode>,

        /// Number of modules to show with --top
        #[arg(short, default_value_t = 10)]
        n: usize,

        /// Output in JSON format
        #[arg(short, long)]
        json: bool,
    },
    /// Print cycles in dependency chains
    Cycles {
        #[command(flatten)]
        input: InputArgs,

        /// Show a cycle summary instead of the raw cycle list
        #[arg(long)]
        summary: bool,

        /// Limit cycles to length <= N (0 = no limit)
        #[arg(long, default_value_t = 0)]
        max_length: usize,

        /// Number of top participants to show in the summary
        #[arg(long, default_value_t = 10)]
        top: usize,

        /// Output in JSON format
        #[arg(short, long)]
        json: bool,
    },
    /// Show why a dependency is included
    Why {
        /// The dependency to explain
        target: String,

        #[command(flatten)]
        input: InputArgs,

        /// Maximum dependency paths to search (0 = no limit)
        #[arg(long, default_value_t = 1000)]
        max_paths: usize,

        /// Output in JSON format
        #[arg(short, long)]
        json: bool,
    },
    /// Compare two module graph snapshots
    Diff {
        /// Module graph file for the "before" snapshot
        before: PathBuf,

        /// Module graph file for the "after" snapshot
        after: PathBuf,

        /// Modules whose dependencies count as direct
        #[arg(short = 'm', long = "main-modules", value_delimiter = ',')]
        main_modules: Vec<String>,

        /// Drop changed edges implied by other changed edges
        #[arg(long)]
        reduce_edges: bool,

        /// Include edge-level changes in text output
        #[arg(short, long)]
        verbose: bool,

        /// Output in JSON format
        #[arg(short, long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Stats {
            input,
            verbose,
            json,
        } => run_stats(&input, verbose, json),
        Commands::List { input, json } => run_list(&input, json),
        Commands::Graph {
            input,
            top,
            n,
            json,
        } => run_graph(&input, top, n, json),
        Commands::Cycles {
            input,
            summary,
            max_length,
            top,
            json,
        } => run_cycles(&input, summary, max_length, top, json),
        Commands::Why {
            target,
            input,
            max_paths,
            json,
        } => run_why(&target, &input, max_paths, json),
        Commands::Diff {
            before,
            after,
            main_modules,
            reduce_edges,
            verbose,
            json,
        } => run_diff(&before, &after, &main_modules, reduce_edges, verbose, json),
    }
}

fn load_overview(path: &Path, main_modules: &[String]) -> Result<DependencyOverview> {
    let edges = if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("reading module graph from stdin")?;
        parser::parse_str(&text)
    } else {
        parser::parse_file(path).with_context(|| format!("reading {}", path.display()))?
    };
    Ok(DependencyOverview::build(&edges, main_modules))
}

fn load_input(input: &InputArgs) -> Result<DependencyOverview> {
    load_overview(&input.input, &input.main_modules)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run_stats(input: &InputArgs, verbose: bool, json: bool) -> Result<()> {
    let overview = load_input(input)?;
    let stats = GraphStats::compute(&overview);

    if json {
        return print_json(&stats);
    }

    println!("Direct Dependencies: {}", stats.direct_dependencies);
    println!("Transitive Dependencies: {}", stats.transitive_dependencies);
    println!("Total Dependencies: {}", stats.total_dependencies);
    println!("Max Depth Of Dependencies: {}", stats.max_depth_of_dependencies);

    if verbose {
        println!("\nAll dependencies:");
        let mut deps = overview.all_deps();
        deps.sort();
        for dep in deps {
            println!("{dep}");
        }
        if let Some(main) = overview.main_modules().first() {
            println!("\nLongest chain:");
            println!("{}", longest_chain(main, overview.graph()).join(" -> "));
        }
    }
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ListOutput {
    all_dependencies: Vec<String>,
    main_modules: Vec<String>,
    total_dependencies: usize,
}

fn run_list(input: &InputArgs, json: bool) -> Result<()> {
    let overview = load_input(input)?;
    if overview.main_modules().is_empty() {
        bail!("could not determine a main module; supply --main-modules or non-empty input");
    }
    let mut all = overview.all_deps();
    all.sort();

    if json {
        return print_json(&ListOutput {
            total_dependencies: all.len(),
            all_dependencies: all,
            main_modules: overview.main_modules().to_vec(),
        });
    }

    println!("List of all dependencies:");
    for dep in all {
        println!("{dep}");
    }
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GraphOutput {
    main_modules: Vec<String>,
    direct_dependency_count: usize,
    transitive_dependency_count: usize,
    edge_count: usize,
    nodes: Vec<NodeMetrics>,
    edge_objects: Vec<GraphEdge>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rankings: Option<Rankings>,
}

fn run_graph(input: &InputArgs, top: Option<RankMode>, n: usize, json: bool) -> Result<()> {
    if top.is_some() && n == 0 {
        bail!("-n must be > 0");
    }
    let overview = load_input(input)?;
    if overview.main_modules().is_empty() {
        bail!("could not determine a main module; supply --main-modules or non-empty input");
    }

    let (nodes, edges) = build_topology(&overview);
    let rankings = top.map(|mode| degree_rankings(&nodes, mode, n));

    if json {
        return print_json(&GraphOutput {
            main_modules: overview.main_modules().to_vec(),
            direct_dependency_count: overview.direct_deps().len(),
            transitive_dependency_count: overview.transitive_deps().len(),
            edge_count: edges.len(),
            nodes,
            edge_objects: edges,
            rankings,
        });
    }

    match rankings {
        Some(rankings) => print_rankings(&rankings),
        None => {
            println!(
                "{} nodes, {} edges, {} main module(s)",
                nodes.len(),
                edges.len(),
                overview.main_modules().len()
            );
            for node in &nodes {
                let depth = node
                    .depth
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "-".to_string());
                let marker = if node.is_main_module { " *" } else { "" };
                println!(
                    "{}  in={} out={} depth={}{}",
                    node.module, node.in_degree, node.out_degree, depth, marker
                );
            }
        }
    }
    Ok(())
}

fn print_rankings(rankings: &Rankings) {
    if let Some(top_in) = &rankings.top_in {
        print_ranked("Top by in-degree", top_in, |node| node.in_degree);
    }
    if rankings.top_in.is_some() && rankings.top_out.is_some() {
        println!();
    }
    if let Some(top_out) = &rankings.top_out {
        print_ranked("Top by out-degree", top_out, |node| node.out_degree);
    }
}

fn print_ranked(title: &str, ranked: &[NodeMetrics], metric: impl Fn(&NodeMetrics) -> usize) {
    println!("{} (N={})", title, ranked.len());
    for (rank, node) in ranked.iter().enumerate() {
        println!("{:>4}  {:<60} {}", rank + 1, node.module, metric(node));
    }
}

#[derive(Serialize)]
struct CyclesOutput {
    cycles: Vec<Chain>,
}

fn run_cycles(input: &InputArgs, summary: bool, max_length: usize, top: usize, json: bool) -> Result<()> {
    if max_length != 0 && max_length < 2 {
        bail!("--max-length must be >= 2 (minimum cycle length is 2)");
    }
    if summary && top == 0 {
        bail!("--top must be > 0");
    }

    let overview = load_input(input)?;
    let cycles = find_cycles(overview.graph(), max_length);

    if summary {
        let summary = summarize_cycles(&cycles, top);
        if json {
            return print_json(&summary);
        }
        println!("Total cycles: {}", summary.total_cycles);
        println!("By cycle length:");
        for (length, count) in &summary.by_length {
            println!("- {length}: {count}");
        }
        println!("2-node mutual dependencies: {}", summary.two_node_cycles.len());
        for [a, b] in &summary.two_node_cycles {
            println!("- {a} <-> {b}");
        }
        println!("Top participants:");
        for participant in &summary.top_participants {
            println!("- {}: {}", participant.module, participant.cycle_count);
        }
        return Ok(());
    }

    if json {
        return print_json(&CyclesOutput { cycles });
    }

    println!("All cycles in dependencies are: ");
    for cycle in &cycles {
        println!("\n{}", cycle.join(" -> "));
    }
    Ok(())
}

const WHY_TEXT_PATH_LIMIT: usize = 20;

fn run_why(target: &str, input: &InputArgs, max_paths: usize, json: bool) -> Result<()> {
    let overview = load_input(input)?;
    let report = why(&overview, target, max_paths);

    if json {
        return print_json(&report);
    }
    print_why_text(&report, max_paths);
    Ok(())
}

fn print_why_text(report: &WhyReport, max_paths: usize) {
    println!("Why is {} included?", report.target);
    println!("{}", "=".repeat(50));
    println!();

    if !report.found {
        println!("Not found in dependency graph.");
        return;
    }

    println!(
        "Directly depended on by ({} modules):",
        report.direct_dependents.len()
    );
    for dependent in &report.direct_dependents {
        let marker = if report.main_modules.contains(dependent) {
            "* "
        } else {
            "  "
        };
        println!("  {marker}{dependent}");
    }
    println!();

    // Cap text output so huge path sets stay readable.
    let shown = report.paths.len().min(WHY_TEXT_PATH_LIMIT);
    println!("Dependency paths (showing {shown} of {}):", report.paths.len());
    println!();
    for (i, why_path) in report.paths.iter().take(shown).enumerate() {
        let marker = if why_path.direct { "[DIRECT] " } else { "" };
        println!("  {}. {marker}{}", i + 1, why_path.path.join(" -> "));
    }

    if report.truncated {
        println!();
        println!("  (search truncated at --max-paths={max_paths})");
    } else if report.paths.len() > shown {
        println!();
        println!("  (showing first {shown} in text output; use --json for the full set)");
    }
}

fn run_diff(
    before_path: &Path,
    after_path: &Path,
    main_modules: &[String],
    reduce_edges: bool,
    verbose: bool,
    json: bool,
) -> Result<()> {
    // The two snapshots are loaded one after the other; nothing here is
    // allowed to interleave their construction.
    let before = load_overview(before_path, main_modules)?;
    let after = load_overview(after_path, main_modules)?;

    let mut diff = compute_diff(&before, &after);
    if reduce_edges {
        diff.reduce_edges(&before, &after);
    }

    if json {
        return print_json(&diff);
    }

    println!(
        "Dependency Diff: {}..{}",
        before_path.display(),
        after_path.display()
    );
    println!("{}", "=".repeat(50));
    println!();
    println!("Summary:");
    println!(
        "  Module graph: +{} added, -{} removed, ~{} version changes",
        diff.added.len(),
        diff.removed.len(),
        diff.version_changes.len()
    );
    println!();

    println!("Metrics:");
    println!("┌────────────────────┬──────────┬──────────┬─────────┐");
    println!("│ Metric             │  Before  │  After   │  Delta  │");
    println!("├────────────────────┼──────────┼──────────┼─────────┤");
    print_metric_row(
        "Direct Deps",
        diff.before.direct_dependencies,
        diff.after.direct_dependencies,
        diff.delta.direct_dependencies,
    );
    print_metric_row(
        "Transitive Deps",
        diff.before.transitive_dependencies,
        diff.after.transitive_dependencies,
        diff.delta.transitive_dependencies,
    );
    print_metric_row(
        "Total Deps",
        diff.before.total_dependencies,
        diff.after.total_dependencies,
        diff.delta.total_dependencies,
    );
    print_metric_row(
        "Max Depth",
        diff.before.max_depth_of_dependencies,
        diff.after.max_depth_of_dependencies,
        diff.delta.max_depth_of_dependencies,
    );
    println!("└────────────────────┴──────────┴──────────┴─────────┘");
    println!();

    println!("Dependencies Added ({}):", diff.added.len());
    print_name_list(&diff.added, '+');
    println!();

    println!("Dependencies Removed ({}):", diff.removed.len());
    print_name_list(&diff.removed, '-');
    println!();

    if !diff.version_changes.is_empty() {
        println!("Version Changes ({}):", diff.version_changes.len());
        for change in &diff.version_changes {
            println!("  ~ {:<50} {} → {}", change.path, change.before, change.after);
        }
        println!();
    }

    if verbose {
        let added = diff.reduced_edges_added.as_ref().unwrap_or(&diff.edges_added);
        let removed = diff
            .reduced_edges_removed
            .as_ref()
            .unwrap_or(&diff.edges_removed);
        println!("Edges Added ({}):", added.len());
        print_name_list(added, '+');
        println!();
        println!("Edges Removed ({}):", removed.len());
        print_name_list(removed, '-');
        println!();
    }

    Ok(())
}

fn print_metric_row(name: &str, before: usize, after: usize, delta: i64) {
    println!("│ {name:<18} │ {before:>8} │ {after:>8} │ {delta:>+7} │");
}

fn print_name_list(items: &[String], sign: char) {
    if items.is_empty() {
        println!("  (none)");
        return;
    }
    for item in items {
        println!("  {sign} {item}");
    }
}
