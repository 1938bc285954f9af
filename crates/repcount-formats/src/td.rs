//! `.td` tree-decomposition files.
//!
//! ```text
//! c produced by an exact treewidth solver
//! s td 2 3 4
//! b 1 1 2 3
//! b 2 3 4
//! 1 2
//! ```
//!
//! - `s td <bags> <max bag size> <vertices>` summarises the decomposition;
//! - `b <id> <v...>` declares a bag (1-based vertex ids);
//! - `u v` connects two bags of the (undirected) decomposition tree.
//!
//! The root is chosen as the largest bag, first-declared on ties. Orienting the
//! tree from that root is left to `repcount-core`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::line::{normalize, parse_uint_list, to_zero_based};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TdParseError {
    #[error("parse error on line {line}: {message}")]
    Line { line: usize, message: String },
    #[error("tree decomposition declares no bags (`b <id> ...` lines)")]
    NoBags,
}

/// One `b` line: bag id plus sorted, de-duplicated 0-based vertex ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TdBag {
    pub id: u32,
    pub vertices: Vec<u32>,
}

/// The `s td <bags> <width+1> <vertices>` solution line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TdSummary {
    pub bag_count: u32,
    pub max_bag_size: u32,
    pub vertex_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TdFile {
    pub summary: Option<TdSummary>,
    /// Bags in declaration order.
    pub bags: Vec<TdBag>,
    /// Undirected tree edges between bag ids, in file order.
    pub edges: Vec<(u32, u32)>,
    /// Id of the largest bag (first declared on ties).
    pub root: u32,
}

impl TdFile {
    /// Treewidth implied by the bags: largest bag size minus one (never negative).
    pub fn treewidth(&self) -> usize {
        self.bags
            .iter()
            .map(|b| b.vertices.len())
            .max()
            .unwrap_or(0)
            .saturating_sub(1)
    }

    pub fn bag(&self, id: u32) -> Option<&TdBag> {
        self.bags.iter().find(|b| b.id == id)
    }
}

fn parse_summary(rest: &str) -> Option<TdSummary> {
    let tokens: Vec<&str> = rest.split_whitespace().collect();
    if tokens.len() < 4 || tokens[0] != "td" {
        return None;
    }
    Some(TdSummary {
        bag_count: tokens[1].parse().ok()?,
        max_bag_size: tokens[2].parse().ok()?,
        vertex_count: tokens[3].parse().ok()?,
    })
}

fn parse_bag(rest: &str) -> Result<TdBag, String> {
    let mut tokens = rest.split_whitespace();
    let id_tok = tokens
        .next()
        .ok_or_else(|| "bag line is missing its id".to_string())?;
    let id = id_tok
        .parse::<u32>()
        .map_err(|_| format!("invalid bag id `{id_tok}`"))?;
    let remaining: Vec<&str> = tokens.collect();
    // An empty bag is legal (`b 3`).
    let vertices = if remaining.is_empty() {
        Vec::new()
    } else {
        let ids = parse_uint_list(&remaining.join(" "))?;
        normalize(to_zero_based(&ids)?)
    };
    Ok(TdBag { id, vertices })
}

pub fn parse_td(text: &str) -> Result<TdFile, TdParseError> {
    let mut summary = None;
    let mut bags: Vec<TdBag> = Vec::new();
    let mut edges = Vec::new();
    let mut root: Option<(u32, usize)> = None;

    for (i, raw) in text.lines().enumerate() {
        let line_no = i + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('c') {
            continue;
        }

        if let Some(rest) = line.strip_prefix("s ") {
            summary = parse_summary(rest);
            continue;
        }

        if let Some(rest) = line.strip_prefix("b ") {
            let bag = parse_bag(rest).map_err(|message| TdParseError::Line {
                line: line_no,
                message,
            })?;
            if bags.iter().any(|b| b.id == bag.id) {
                return Err(TdParseError::Line {
                    line: line_no,
                    message: format!("bag {} declared twice", bag.id),
                });
            }
            let size = bag.vertices.len();
            match root {
                Some((_, best)) if size <= best => {}
                _ => root = Some((bag.id, size)),
            }
            bags.push(bag);
            continue;
        }

        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() == 2 && tokens[0].starts_with(|c: char| c.is_ascii_digit()) {
            let pair = parse_uint_list(line).map_err(|message| TdParseError::Line {
                line: line_no,
                message,
            })?;
            edges.push((pair[0], pair[1]));
        }
    }

    let (root, _) = root.ok_or(TdParseError::NoBags)?;
    Ok(TdFile {
        summary,
        bags,
        edges,
        root,
    })
}
