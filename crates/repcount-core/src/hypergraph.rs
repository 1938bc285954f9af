//! Conflict / witness hypergraph over a fixed universe of facts.
//!
//! Facts are `0..fact_count`. Two edge families share that universe:
//!
//! - **Ec** (conflict edges): facts that may not all be selected together;
//! - **Es** (solution edges): facts that jointly witness a query answer.
//!
//! Edges are stored as `RoaringBitmap`s so bag containment is a plain subset
//! test. The hypergraph is immutable once built.

use std::collections::BTreeSet;

use repcount_formats::GrFile;
use roaring::RoaringBitmap;

use crate::error::{EdgeKind, HypergraphError};

#[derive(Debug, Clone, PartialEq)]
pub struct Hypergraph {
    fact_count: u32,
    conflicts: Vec<RoaringBitmap>,
    solutions: Vec<RoaringBitmap>,
}

/// Build an edge bitmap from fact ids.
pub fn edge(facts: &[u32]) -> RoaringBitmap {
    facts.iter().copied().collect()
}

fn check_range(
    kind: EdgeKind,
    edges: &[RoaringBitmap],
    fact_count: u32,
) -> Result<(), HypergraphError> {
    for (idx, e) in edges.iter().enumerate() {
        if let Some(max) = e.max() {
            if max >= fact_count {
                return Err(HypergraphError::FactOutOfRange {
                    kind,
                    edge: idx,
                    fact: max,
                    fact_count,
                });
            }
        }
    }
    Ok(())
}

impl Hypergraph {
    pub fn new(
        fact_count: u32,
        conflicts: Vec<RoaringBitmap>,
        solutions: Vec<RoaringBitmap>,
    ) -> Result<Self, HypergraphError> {
        check_range(EdgeKind::Conflict, &conflicts, fact_count)?;
        check_range(EdgeKind::Solution, &solutions, fact_count)?;
        Ok(Self {
            fact_count,
            conflicts,
            solutions,
        })
    }

    /// Combine a conflict file and a solution file. The fact universe is the
    /// larger of the two files' vertex bounds.
    pub fn from_gr(conflicts: &GrFile, solutions: &GrFile) -> Result<Self, HypergraphError> {
        if !conflicts.has_header() && !solutions.has_header() {
            return Err(HypergraphError::MissingHeader);
        }
        let fact_count = conflicts.vertex_bound().max(solutions.vertex_bound());
        let to_edges = |file: &GrFile| file.edges.iter().map(|e| edge(e)).collect::<Vec<_>>();
        Self::new(fact_count, to_edges(conflicts), to_edges(solutions))
    }

    pub fn fact_count(&self) -> u32 {
        self.fact_count
    }

    pub fn conflicts(&self) -> &[RoaringBitmap] {
        &self.conflicts
    }

    pub fn solutions(&self) -> &[RoaringBitmap] {
        &self.solutions
    }

    /// Every edge tagged with its family and its index within that family.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeKind, usize, &RoaringBitmap)> {
        let c = self
            .conflicts
            .iter()
            .enumerate()
            .map(|(i, e)| (EdgeKind::Conflict, i, e));
        let s = self
            .solutions
            .iter()
            .enumerate()
            .map(|(i, e)| (EdgeKind::Solution, i, e));
        c.chain(s)
    }

    /// Gaifman graph of Ec ∪ Es: every pair of facts sharing an edge, as
    /// `(low, high)` pairs, sorted and without duplicates.
    pub fn primal_edges(&self) -> Vec<(u32, u32)> {
        let mut pairs = BTreeSet::new();
        for (_, _, e) in self.edges() {
            let facts: Vec<u32> = e.iter().collect();
            for (i, &a) in facts.iter().enumerate() {
                for &b in &facts[i + 1..] {
                    pairs.insert((a, b));
                }
            }
        }
        pairs.into_iter().collect()
    }
}
