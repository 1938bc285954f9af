//! Repcount text formats
//!
//! The counting engine consumes two upstream artifacts, both produced outside
//! this workspace:
//!
//! - hypergraph files (`.gr`): one for conflict edges (Ec), one for
//!   solution/witness edges (Es), in the PACE-style `p <kind> n m` layout with
//!   1-based vertex ids;
//! - tree-decomposition files (`.td`): `s td ...` solution line, `b <id> ...`
//!   bag lines and `u v` tree edges, as emitted by exact-treewidth solvers.
//!
//! Parsers here are purely syntactic: they convert ids to 0-based form and
//! report line-numbered errors. Structural checks (edge coverage, tree shape)
//! live in `repcount-core`.

pub mod digest;
pub mod gr;
mod line;
pub mod td;

pub use gr::{format_gr, parse_gr, GrFile, GrParseError};
pub use td::{parse_td, TdBag, TdFile, TdParseError, TdSummary};
