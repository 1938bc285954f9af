//! Repcount core: counting falsifying repairs over a tree decomposition.
//!
//! Given a conflict/witness hypergraph over database facts and a tree
//! decomposition of it, the engine counts `(selected, closure)` assignments
//! that avoid every conflict edge and every solution edge, with the
//! forced-exclusion closure covering the whole root bag.
//!
//! ## Pipeline
//!
//! 1. [`Hypergraph`]: fact universe plus Ec (conflict) and Es (solution) edges;
//! 2. [`TreeDecomposition`]: bag arena rooted at index `0`;
//! 3. [`Prepared`]: per-bag local masks and per-edge separator maps;
//! 4. [`Engine`]: memoized DP, [`Engine::number_falsify`] returns a `BigUint`.
//!
//! ```
//! use repcount_core::{edge, Engine, Hypergraph, TreeDecomposition};
//!
//! let h = Hypergraph::new(2, vec![edge(&[0, 1])], vec![]).unwrap();
//! let t = TreeDecomposition::single_bag(vec![0, 1]);
//! let mut engine = Engine::new_checked(&h, &t).unwrap();
//! assert_eq!(engine.number_falsify(), 2u32.into());
//! ```
//!
//! ## Module Organization
//!
//! - `mask`: bag-local bitmask helpers and width limits
//! - `hypergraph`, `decomposition`: immutable inputs plus structural validation
//! - `prepare`: bag preprocessing
//! - `engine`: the counting DP

pub mod decomposition;
pub mod engine;
pub mod error;
pub mod hypergraph;
pub mod mask;
pub mod prepare;

pub use decomposition::{Bag, BagIndex, TreeDecomposition};
pub use engine::{Engine, EngineStats};
pub use error::{CoverageError, DecompositionError, EdgeKind, EngineError, HypergraphError};
pub use hypergraph::{edge, Hypergraph};
pub use mask::{Mask, MAX_BAG_WIDTH, MAX_FANOUT};
pub use prepare::{BagLocal, Prepared, SeparatorMap};
