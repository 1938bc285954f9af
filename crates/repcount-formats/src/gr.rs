//! `.gr` hypergraph files.
//!
//! ```text
//! c conflicts for table `orders`
//! p tw 5 2
//! 1 2
//! 3 4 5
//! ```
//!
//! - `c ...` and `# ...` lines are comments;
//! - `p <kind> <n> <m>` declares `n` vertices and `m` edges (`kind` is free-form,
//!   usually `tw` or `hg`);
//! - every line after the header is one hyperedge of 1-based vertex ids.
//!
//! Lines before the header are ignored. Two such files populate the conflict
//! (Ec) and solution (Es) edge families respectively.

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use thiserror::Error;

use crate::line::{normalize, parse_uint_list, to_zero_based};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GrParseError {
    #[error("parse error on line {line}: {message}")]
    Line { line: usize, message: String },
}

/// A parsed `.gr` file with 0-based vertex ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrFile {
    /// `n` from the `p` line, if one was present and well formed.
    pub declared_vertices: Option<u32>,
    /// `m` from the `p` line, if one was present and well formed.
    pub declared_edges: Option<u32>,
    /// Largest 1-based vertex id seen in any edge (0 when there are no edges).
    pub max_vertex: u32,
    /// Hyperedges, each sorted ascending without duplicates.
    pub edges: Vec<Vec<u32>>,
}

impl GrFile {
    /// Whether a `p` header was found.
    pub fn has_header(&self) -> bool {
        self.declared_vertices.is_some()
    }

    /// Number of vertices this file requires: the declared count or the largest
    /// id seen, whichever is larger.
    pub fn vertex_bound(&self) -> u32 {
        self.declared_vertices.unwrap_or(0).max(self.max_vertex)
    }
}

fn is_comment(line: &str) -> bool {
    line.starts_with('c') || line.starts_with('#')
}

/// Parse the `p <kind> <n> <m>` header. Short headers are accepted but declare
/// nothing.
fn parse_header(rest: &str) -> Result<(Option<u32>, Option<u32>), String> {
    let tokens: Vec<&str> = rest.split_whitespace().collect();
    if tokens.len() < 3 {
        return Ok((None, None));
    }
    let n = tokens[1]
        .parse::<u32>()
        .map_err(|_| format!("invalid vertex count `{}` in header", tokens[1]))?;
    let m = tokens[2]
        .parse::<u32>()
        .map_err(|_| format!("invalid edge count `{}` in header", tokens[2]))?;
    Ok((Some(n), Some(m)))
}

pub fn parse_gr(text: &str) -> Result<GrFile, GrParseError> {
    let mut out = GrFile::default();
    let mut after_header = false;

    for (i, raw) in text.lines().enumerate() {
        let line_no = i + 1;
        let line = raw.trim();
        if line.is_empty() || is_comment(line) {
            continue;
        }

        if let Some(rest) = line.strip_prefix("p ") {
            let (n, m) =
                parse_header(rest).map_err(|message| GrParseError::Line {
                    line: line_no,
                    message,
                })?;
            // A malformed-but-short header still opens the edge section.
            if n.is_some() {
                out.declared_vertices = n;
                out.declared_edges = m;
            } else if out.declared_vertices.is_none() {
                out.declared_vertices = Some(0);
            }
            after_header = true;
            continue;
        }

        if !after_header {
            continue;
        }

        let ids = parse_uint_list(line).map_err(|message| GrParseError::Line {
            line: line_no,
            message,
        })?;
        if let Some(&max) = ids.iter().max() {
            out.max_vertex = out.max_vertex.max(max);
        }
        let zero_based = to_zero_based(&ids).map_err(|message| GrParseError::Line {
            line: line_no,
            message,
        })?;
        out.edges.push(normalize(zero_based));
    }

    Ok(out)
}

/// Render edges (0-based ids) as a `.gr` file with 1-based ids.
pub fn format_gr(kind: &str, vertex_count: u32, edges: &[Vec<u32>]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "p {kind} {vertex_count} {}", edges.len());
    for edge in edges {
        let line: Vec<String> = edge.iter().map(|v| (v + 1).to_string()).collect();
        let _ = writeln!(out, "{}", line.join(" "));
    }
    out
}
