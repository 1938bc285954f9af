//! Rooted tree decomposition stored as a flat arena of bags.
//!
//! Bags are addressed by [`BagIndex`] (position in the arena); the root is
//! always index `0` and the arena is laid out in breadth-first order from it.
//! Each bag keeps the label it had in its source file so errors and logs can
//! name it.
//!
//! Structural validation is explicit and result-returning:
//!
//! - [`TreeDecomposition::validate_coverage`]: every Ec/Es edge fits in a bag;
//! - [`TreeDecomposition::validate_connectivity`]: each fact's bags form a
//!   connected subtree.
//!
//! Neither is run implicitly by the engine.

use std::collections::{BTreeMap, VecDeque};

use ahash::AHashMap;
use repcount_formats::TdFile;
use roaring::RoaringBitmap;

use crate::error::{CoverageError, DecompositionError};
use crate::hypergraph::Hypergraph;

pub type BagIndex = usize;

#[derive(Debug, Clone, PartialEq)]
pub struct Bag {
    /// Label from the source decomposition.
    pub id: u32,
    /// Facts in local bit order: `facts[i]` is bit `i` of a bag-local mask.
    pub facts: Vec<u32>,
    pub fact_set: RoaringBitmap,
    pub parent: Option<BagIndex>,
    pub children: Vec<BagIndex>,
}

#[derive(Debug, Clone)]
pub struct TreeDecomposition {
    bags: Vec<Bag>,
    labels: AHashMap<u32, BagIndex>,
}

impl TreeDecomposition {
    /// Orient an undirected bag tree from `root`.
    ///
    /// `bags` are `(label, facts)` pairs; repeated facts inside a bag keep their
    /// first position. `edges` connect labels. Bags not reachable from the
    /// root are dropped, and edges that would close a cycle are ignored.
    pub fn from_edges(
        bags: Vec<(u32, Vec<u32>)>,
        edges: &[(u32, u32)],
        root: u32,
    ) -> Result<Self, DecompositionError> {
        if bags.is_empty() {
            return Err(DecompositionError::Empty);
        }

        let mut by_label: AHashMap<u32, usize> = AHashMap::with_capacity(bags.len());
        for (pos, (label, _)) in bags.iter().enumerate() {
            if by_label.insert(*label, pos).is_some() {
                return Err(DecompositionError::DuplicateBag(*label));
            }
        }
        let root_pos = *by_label
            .get(&root)
            .ok_or(DecompositionError::UnknownRoot(root))?;

        let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); bags.len()];
        for &(from, to) in edges {
            let lookup = |label: u32| {
                by_label
                    .get(&label)
                    .copied()
                    .ok_or(DecompositionError::UnknownBag {
                        from,
                        to,
                        missing: label,
                    })
            };
            let (a, b) = (lookup(from)?, lookup(to)?);
            if a == b {
                tracing::warn!(bag = from, "ignoring self-loop in decomposition tree");
                continue;
            }
            adjacency[a].push(b);
            adjacency[b].push(a);
        }

        // Breadth-first from the root; arena slot = visit order.
        let mut slot: Vec<Option<BagIndex>> = vec![None; bags.len()];
        let mut order = vec![root_pos];
        let mut parents: Vec<Option<BagIndex>> = vec![None];
        slot[root_pos] = Some(0);
        let mut queue = VecDeque::from([root_pos]);
        while let Some(pos) = queue.pop_front() {
            let here = slot[pos].unwrap_or_default();
            for &next in &adjacency[pos] {
                if slot[next].is_some() {
                    if parents[here] != slot[next] {
                        tracing::warn!(
                            from = bags[pos].0,
                            to = bags[next].0,
                            "ignoring non-tree edge in decomposition"
                        );
                    }
                    continue;
                }
                slot[next] = Some(order.len());
                order.push(next);
                parents.push(Some(here));
                queue.push_back(next);
            }
        }

        let dropped = bags.len() - order.len();
        if dropped > 0 {
            let labels: Vec<u32> = bags
                .iter()
                .enumerate()
                .filter(|(pos, _)| slot[*pos].is_none())
                .map(|(_, (label, _))| *label)
                .collect();
            tracing::warn!(
                dropped,
                labels = ?labels,
                root,
                "dropping bags unreachable from the root"
            );
        }

        let mut source: Vec<Option<(u32, Vec<u32>)>> = bags.into_iter().map(Some).collect();
        let mut arena: Vec<Bag> = Vec::with_capacity(order.len());
        for (idx, &pos) in order.iter().enumerate() {
            let (id, raw) = source[pos].take().unwrap_or_default();
            let mut fact_set = RoaringBitmap::new();
            let facts: Vec<u32> = raw.into_iter().filter(|&f| fact_set.insert(f)).collect();
            arena.push(Bag {
                id,
                facts,
                fact_set,
                parent: parents[idx],
                children: Vec::new(),
            });
        }
        for idx in 1..arena.len() {
            if let Some(parent) = arena[idx].parent {
                arena[parent].children.push(idx);
            }
        }

        let labels = arena
            .iter()
            .enumerate()
            .map(|(idx, bag)| (bag.id, idx))
            .collect();
        tracing::debug!(
            bags = arena.len(),
            root,
            "oriented tree decomposition"
        );
        Ok(Self { bags: arena, labels })
    }

    pub fn from_td(td: &TdFile) -> Result<Self, DecompositionError> {
        let bags = td
            .bags
            .iter()
            .map(|b| (b.id, b.vertices.clone()))
            .collect();
        Self::from_edges(bags, &td.edges, td.root)
    }

    /// One bag holding `facts`, no children.
    pub fn single_bag(facts: Vec<u32>) -> Self {
        let mut fact_set = RoaringBitmap::new();
        let facts: Vec<u32> = facts.into_iter().filter(|&f| fact_set.insert(f)).collect();
        Self {
            bags: vec![Bag {
                id: 1,
                facts,
                fact_set,
                parent: None,
                children: Vec::new(),
            }],
            labels: AHashMap::from_iter([(1, 0)]),
        }
    }

    pub fn root(&self) -> BagIndex {
        0
    }

    pub fn bag(&self, idx: BagIndex) -> &Bag {
        &self.bags[idx]
    }

    pub fn bags(&self) -> &[Bag] {
        &self.bags
    }

    pub fn len(&self) -> usize {
        self.bags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bags.is_empty()
    }

    pub fn by_label(&self, id: u32) -> Option<BagIndex> {
        self.labels.get(&id).copied()
    }

    /// Largest bag size minus one (zero for a decomposition of empty bags).
    pub fn treewidth(&self) -> usize {
        self.bags
            .iter()
            .map(|b| b.facts.len())
            .max()
            .unwrap_or(0)
            .saturating_sub(1)
    }

    pub fn max_fanout(&self) -> usize {
        self.bags.iter().map(|b| b.children.len()).max().unwrap_or(0)
    }

    /// Every conflict and solution edge must be a subset of at least one bag.
    /// Reports the first edge that is not.
    pub fn validate_coverage(&self, hypergraph: &Hypergraph) -> Result<(), CoverageError> {
        for (kind, idx, edge) in hypergraph.edges() {
            if !self.bags.iter().any(|b| edge.is_subset(&b.fact_set)) {
                return Err(CoverageError::UncoveredEdge {
                    kind,
                    edge: idx,
                    facts: edge.iter().collect(),
                });
            }
        }
        Ok(())
    }

    /// For every fact, the bags containing it must form one connected subtree.
    ///
    /// A connected group of bags in a rooted tree has exactly one top bag (whose
    /// parent lacks the fact), so counting tops counts components.
    pub fn validate_connectivity(&self) -> Result<(), CoverageError> {
        let mut tops: BTreeMap<u32, usize> = BTreeMap::new();
        for bag in &self.bags {
            let parent = bag.parent.map(|p| &self.bags[p].fact_set);
            for fact in &bag.fact_set {
                if parent.map_or(true, |p| !p.contains(fact)) {
                    *tops.entry(fact).or_default() += 1;
                }
            }
        }
        match tops.into_iter().find(|&(_, n)| n > 1) {
            Some((fact, components)) => Err(CoverageError::DisconnectedFact { fact, components }),
            None => Ok(()),
        }
    }
}
