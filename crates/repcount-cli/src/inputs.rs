//! Reading `.gr` / `.td` inputs from disk.

use anyhow::{Context, Result};
use clap::Args;
use repcount_core::{Hypergraph, TreeDecomposition};
use repcount_formats::digest::fnv1a64_digest;
use repcount_formats::{parse_gr, parse_td, TdFile};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Args, Debug, Clone)]
pub struct HypergraphArgs {
    /// Conflict hyperedges (Ec), `.gr` format
    #[arg(long)]
    pub conflicts: PathBuf,
    /// Solution / witness hyperedges (Es), `.gr` format
    #[arg(long)]
    pub solutions: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    #[command(flatten)]
    pub hypergraph: HypergraphArgs,
    /// Tree decomposition of the primal graph, `.td` format
    #[arg(long)]
    pub td: PathBuf,
}

pub struct Inputs {
    pub hypergraph: Hypergraph,
    pub td: TdFile,
    pub tree: TreeDecomposition,
    /// Digest over the three input files, in argument order.
    pub digest: String,
}

pub fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

pub fn load_td(path: &Path) -> Result<TdFile> {
    let text = read_text(path)?;
    parse_td(&text).with_context(|| format!("invalid tree decomposition {}", path.display()))
}

fn load_hypergraph_text(args: &HypergraphArgs) -> Result<(Hypergraph, String, String)> {
    let conflicts_text = read_text(&args.conflicts)?;
    let solutions_text = read_text(&args.solutions)?;
    let conflicts = parse_gr(&conflicts_text)
        .with_context(|| format!("invalid conflict hypergraph {}", args.conflicts.display()))?;
    let solutions = parse_gr(&solutions_text)
        .with_context(|| format!("invalid solution hypergraph {}", args.solutions.display()))?;
    let hypergraph = Hypergraph::from_gr(&conflicts, &solutions).with_context(|| {
        format!(
            "cannot combine {} and {}",
            args.conflicts.display(),
            args.solutions.display()
        )
    })?;
    tracing::debug!(
        facts = hypergraph.fact_count(),
        conflicts = hypergraph.conflicts().len(),
        solutions = hypergraph.solutions().len(),
        "loaded hypergraph"
    );
    Ok((hypergraph, conflicts_text, solutions_text))
}

pub fn load_hypergraph(args: &HypergraphArgs) -> Result<Hypergraph> {
    load_hypergraph_text(args).map(|(h, _, _)| h)
}

pub fn load(args: &InputArgs) -> Result<Inputs> {
    let (hypergraph, conflicts_text, solutions_text) = load_hypergraph_text(&args.hypergraph)?;
    let td_text = read_text(&args.td)?;
    let td = parse_td(&td_text)
        .with_context(|| format!("invalid tree decomposition {}", args.td.display()))?;
    let tree = TreeDecomposition::from_td(&td)
        .with_context(|| format!("malformed decomposition tree in {}", args.td.display()))?;

    if let Some(summary) = td.summary {
        if summary.bag_count as usize != td.bags.len() {
            tracing::warn!(
                declared = summary.bag_count,
                found = td.bags.len(),
                "bag count in `s td` line does not match the file"
            );
        }
    }

    let digest = fnv1a64_digest([
        conflicts_text.as_bytes(),
        solutions_text.as_bytes(),
        td_text.as_bytes(),
    ]);
    Ok(Inputs {
        hypergraph,
        td,
        tree,
        digest,
    })
}
