//! Repcount CLI
//!
//! Command-line front end for the counting engine:
//! - `count`: number of falsifying repair assignments for one input triple
//! - `check`: structural validation of a decomposition against its hypergraph
//! - `treewidth`: width of a `.td` file
//! - `primal`: Gaifman graph of Ec ∪ Es, for an external treewidth solver

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use colored::Colorize;
use repcount_core::{Engine, EngineStats};
use repcount_formats::format_gr;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

mod inputs;
mod profiling;

use inputs::{HypergraphArgs, InputArgs};

#[derive(Parser)]
#[command(
    name = "repcount",
    version,
    about = "Repcount: count falsifying repairs over a tree decomposition"
)]
struct Cli {
    #[command(flatten)]
    profile: profiling::ProfileArgs,
    /// Log verbosity on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Count falsifying assignments for a hypergraph and its tree decomposition.
    Count {
        #[command(flatten)]
        inputs: InputArgs,
        /// Skip the edge-coverage check (uncovered edges are then never evaluated)
        #[arg(long)]
        skip_coverage_check: bool,
        /// Write a JSON report to this path
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Validate edge coverage and per-fact connectivity of a decomposition.
    Check {
        #[command(flatten)]
        inputs: InputArgs,
    },

    /// Report the treewidth of a `.td` file (`Treewidth = k`).
    Treewidth {
        /// Tree decomposition, `.td` format
        #[arg(long)]
        td: PathBuf,
        /// Also write the line to this file
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Write the primal graph of Ec ∪ Es as a `p tw` file.
    Primal {
        #[command(flatten)]
        hypergraph: HypergraphArgs,
        /// Output `.gr` path
        #[arg(short, long)]
        out: PathBuf,
    },
}

/// Machine-readable result of `repcount count`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CountReport {
    /// Decimal; counts routinely exceed 64 bits.
    count: String,
    facts: u32,
    conflict_edges: usize,
    solution_edges: usize,
    bags: usize,
    root_bag: u32,
    treewidth: usize,
    coverage_checked: bool,
    stats: EngineStats,
    input_digest: String,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let profiler = profiling::Profiler::start(&cli.profile)?;

    let result = match cli.command {
        Commands::Count {
            inputs,
            skip_coverage_check,
            json,
        } => cmd_count(&inputs, skip_coverage_check, json.as_deref()),
        Commands::Check { inputs } => cmd_check(&inputs),
        Commands::Treewidth { td, out } => cmd_treewidth(&td, out.as_deref()),
        Commands::Primal { hypergraph, out } => cmd_primal(&hypergraph, &out),
    };

    if let Some(profiler) = profiler {
        match profiler.finish() {
            Ok(paths) => {
                for path in paths {
                    eprintln!("{} {}", "profile".green().bold(), path.display());
                }
            }
            Err(err) => eprintln!("profile: {err}"),
        }
    }

    result
}

fn cmd_count(args: &InputArgs, skip_coverage_check: bool, json: Option<&Path>) -> Result<()> {
    println!("{} {}", "Counting".green().bold(), args.td.display());

    let inputs = inputs::load(args)?;
    if let Err(err) = inputs.tree.validate_connectivity() {
        tracing::warn!(error = %err, "decomposition violates per-fact connectivity");
    }

    let built = if skip_coverage_check {
        tracing::warn!("edge coverage not checked; uncovered edges are never evaluated");
        Engine::new(&inputs.hypergraph, &inputs.tree)
    } else {
        Engine::new_checked(&inputs.hypergraph, &inputs.tree)
    };
    let mut engine = built.context("cannot build counting engine")?;

    let count = engine.number_falsify();
    let stats = engine.stats();

    println!(
        "  Facts: {}  Conflicts: {}  Solutions: {}",
        inputs.hypergraph.fact_count(),
        inputs.hypergraph.conflicts().len(),
        inputs.hypergraph.solutions().len()
    );
    println!(
        "  Bags: {}  Treewidth: {}  Root: {}",
        inputs.tree.len(),
        inputs.tree.treewidth(),
        inputs.td.root
    );
    println!(
        "  Memo: {} combine / {} lift entries, {} hits",
        stats.combine_entries,
        stats.lift_entries,
        stats.combine_hits + stats.lift_hits
    );
    println!("{} {}", "Count:".bold(), count.to_string().cyan());

    if let Some(path) = json {
        let report = CountReport {
            count: count.to_string(),
            facts: inputs.hypergraph.fact_count(),
            conflict_edges: inputs.hypergraph.conflicts().len(),
            solution_edges: inputs.hypergraph.solutions().len(),
            bags: inputs.tree.len(),
            root_bag: inputs.td.root,
            treewidth: inputs.tree.treewidth(),
            coverage_checked: !skip_coverage_check,
            stats,
            input_digest: inputs.digest,
        };
        let text = serde_json::to_string_pretty(&report)?;
        fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))?;
        println!("  {} {}", "→".cyan(), path.display());
    }
    Ok(())
}

fn cmd_check(args: &InputArgs) -> Result<()> {
    println!("{} {}", "Checking".green().bold(), args.td.display());

    let inputs = inputs::load(args)?;
    let coverage = inputs.tree.validate_coverage(&inputs.hypergraph);
    let connectivity = inputs.tree.validate_connectivity();

    let mut failures = 0;
    for (name, outcome) in [("edge coverage", coverage), ("connectivity", connectivity)] {
        match outcome {
            Ok(()) => println!("  {} {}", "ok".green().bold(), name),
            Err(err) => {
                failures += 1;
                println!("  {} {}: {}", "fail".red().bold(), name, err);
            }
        }
    }
    if failures > 0 {
        bail!("{failures} structural check(s) failed for {}", args.td.display());
    }
    println!("{}", "Valid.".green());
    Ok(())
}

fn cmd_treewidth(td: &Path, out: Option<&Path>) -> Result<()> {
    let td_file = inputs::load_td(td)?;
    let line = format!("Treewidth = {}", td_file.treewidth());
    println!("{line}");
    if let Some(summary) = td_file.summary {
        let declared = (summary.max_bag_size as usize).saturating_sub(1);
        if declared != td_file.treewidth() {
            tracing::warn!(
                declared,
                measured = td_file.treewidth(),
                "`s td` line disagrees with the bags"
            );
        }
    }
    if let Some(path) = out {
        fs::write(path, format!("{line}\n"))
            .with_context(|| format!("failed to write {}", path.display()))?;
        eprintln!("{} {}", "wrote".green().bold(), path.display().to_string().bold());
    }
    Ok(())
}

fn cmd_primal(args: &HypergraphArgs, out: &Path) -> Result<()> {
    let hypergraph = inputs::load_hypergraph(args)?;
    let edges: Vec<Vec<u32>> = hypergraph
        .primal_edges()
        .into_iter()
        .map(|(a, b)| vec![a, b])
        .collect();
    let text = format_gr("tw", hypergraph.fact_count(), &edges);
    fs::write(out, text).with_context(|| format!("failed to write {}", out.display()))?;
    eprintln!(
        "{} {} ({} vertices, {} edges)",
        "wrote".green().bold(),
        out.display().to_string().bold(),
        hypergraph.fact_count(),
        edges.len()
    );
    Ok(())
}
