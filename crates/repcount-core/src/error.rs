//! Error types for building and validating counting inputs.

use thiserror::Error;

/// Which edge family an edge belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum EdgeKind {
    /// Ec: facts that may not all be selected together.
    Conflict,
    /// Es: facts that jointly witness a query answer.
    Solution,
}

impl std::fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EdgeKind::Conflict => write!(f, "conflict"),
            EdgeKind::Solution => write!(f, "solution"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HypergraphError {
    #[error("{kind} edge #{edge} mentions fact {fact}, but the hypergraph has {fact_count} facts")]
    FactOutOfRange {
        kind: EdgeKind,
        edge: usize,
        fact: u32,
        fact_count: u32,
    },
    #[error("neither hypergraph file declares a `p <kind> n m` header")]
    MissingHeader,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecompositionError {
    #[error("tree decomposition has no bags")]
    Empty,
    #[error("tree edge {from} - {to} names unknown bag {missing}")]
    UnknownBag { from: u32, to: u32, missing: u32 },
    #[error("root bag {0} is not declared")]
    UnknownRoot(u32),
    #[error("bag {0} declared twice")]
    DuplicateBag(u32),
}

/// Structural invariants of a decomposition relative to a hypergraph.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoverageError {
    #[error("{kind} edge #{edge} {facts:?} is not contained in any bag")]
    UncoveredEdge {
        kind: EdgeKind,
        edge: usize,
        facts: Vec<u32>,
    },
    #[error("fact {fact} appears in {components} disconnected groups of bags")]
    DisconnectedFact { fact: u32, components: usize },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("bag {bag} has {width} facts; masks support at most {max}")]
    BagTooWide { bag: u32, width: usize, max: usize },
    #[error("bag {bag} has {fanout} children; child masks support at most {max}")]
    FanoutTooLarge { bag: u32, fanout: usize, max: usize },
    #[error(transparent)]
    Coverage(#[from] CoverageError),
}
