//! Per-bag and per-tree-edge tables derived once before counting.
//!
//! For each bag: the fact → local bit map and the Ec/Es edges that lie wholly
//! inside the bag, rewritten as local masks. For each parent/child pair: the
//! separator map between the two local bit spaces.

use ahash::AHashMap;
use roaring::RoaringBitmap;

use crate::decomposition::{Bag, BagIndex, TreeDecomposition};
use crate::error::EngineError;
use crate::hypergraph::Hypergraph;
use crate::mask::{low_bits, Mask, MAX_BAG_WIDTH, MAX_FANOUT};

#[derive(Debug, Clone, Default)]
pub struct BagLocal {
    pub local_index: AHashMap<u32, u32>,
    /// Conflict edges contained in the bag, in local bits.
    pub conflict_masks: Vec<Mask>,
    /// Solution edges contained in the bag, in local bits.
    pub solution_masks: Vec<Mask>,
    /// Every local bit of the bag.
    pub full_mask: Mask,
    /// One bit per child slot.
    pub children_mask: Mask,
}

impl BagLocal {
    fn build(bag: &Bag, hypergraph: &Hypergraph) -> Self {
        let local_index: AHashMap<u32, u32> = bag
            .facts
            .iter()
            .enumerate()
            .map(|(bit, &fact)| (fact, bit as u32))
            .collect();
        let restrict = |edges: &[RoaringBitmap]| -> Vec<Mask> {
            edges
                .iter()
                .filter(|e| e.is_subset(&bag.fact_set))
                .map(|e| {
                    e.iter()
                        .filter_map(|f| local_index.get(&f))
                        .fold(0, |m: Mask, &bit| m | (1 << bit))
                })
                .collect()
        };
        let conflict_masks = restrict(hypergraph.conflicts());
        let solution_masks = restrict(hypergraph.solutions());
        Self {
            conflict_masks,
            solution_masks,
            full_mask: low_bits(bag.facts.len()),
            children_mask: low_bits(bag.children.len()),
            local_index,
        }
    }
}

/// Interface between a parent bag and one child.
///
/// Interface position `i` is the `i`-th child fact (in child order) that the
/// parent also holds; it sits at bit `parent_bits[i]` in the parent and
/// `child_bits[i]` in the child.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeparatorMap {
    pub parent_bits: Vec<u32>,
    pub child_bits: Vec<u32>,
    /// Interface bits in the parent's local space.
    pub parent_interface_mask: Mask,
    /// Interface bits in the child's local space.
    pub child_interface_mask: Mask,
    /// Child facts the parent does not hold, in the child's local space.
    pub child_private_mask: Mask,
}

fn gather(mask: Mask, bits: &[u32]) -> Mask {
    bits.iter()
        .enumerate()
        .filter(|&(_, &b)| mask & (1 << b) != 0)
        .fold(0, |out, (i, _)| out | (1 << i))
}

fn scatter(mask: Mask, bits: &[u32]) -> Mask {
    bits.iter()
        .enumerate()
        .filter(|&(i, _)| mask & (1 << i) != 0)
        .fold(0, |out, (_, &b)| out | (1 << b))
}

impl SeparatorMap {
    pub fn build(parent: &BagLocal, child: &Bag) -> Self {
        let mut out = Self::default();
        for (child_bit, fact) in child.facts.iter().enumerate() {
            let child_bit = child_bit as u32;
            match parent.local_index.get(fact) {
                Some(&parent_bit) => {
                    out.parent_bits.push(parent_bit);
                    out.child_bits.push(child_bit);
                    out.parent_interface_mask |= 1 << parent_bit;
                    out.child_interface_mask |= 1 << child_bit;
                }
                None => out.child_private_mask |= 1 << child_bit,
            }
        }
        out
    }

    pub fn width(&self) -> usize {
        self.parent_bits.len()
    }

    pub fn parent_to_interface(&self, mask: Mask) -> Mask {
        gather(mask, &self.parent_bits)
    }

    pub fn interface_to_parent(&self, mask: Mask) -> Mask {
        scatter(mask, &self.parent_bits)
    }

    pub fn child_to_interface(&self, mask: Mask) -> Mask {
        gather(mask, &self.child_bits)
    }

    pub fn interface_to_child(&self, mask: Mask) -> Mask {
        scatter(mask, &self.child_bits)
    }
}

#[derive(Debug, Clone)]
pub struct Prepared {
    pub locals: Vec<BagLocal>,
    /// `separators[bag][slot]` maps `bag` to its `slot`-th child.
    pub separators: Vec<Vec<SeparatorMap>>,
}

impl Prepared {
    pub fn build(
        hypergraph: &Hypergraph,
        tree: &TreeDecomposition,
    ) -> Result<Self, EngineError> {
        for bag in tree.bags() {
            if bag.facts.len() > MAX_BAG_WIDTH {
                return Err(EngineError::BagTooWide {
                    bag: bag.id,
                    width: bag.facts.len(),
                    max: MAX_BAG_WIDTH,
                });
            }
            if bag.children.len() > MAX_FANOUT {
                return Err(EngineError::FanoutTooLarge {
                    bag: bag.id,
                    fanout: bag.children.len(),
                    max: MAX_FANOUT,
                });
            }
        }

        let locals: Vec<BagLocal> = tree
            .bags()
            .iter()
            .map(|bag| BagLocal::build(bag, hypergraph))
            .collect();
        let separators: Vec<Vec<SeparatorMap>> = tree
            .bags()
            .iter()
            .zip(&locals)
            .map(|(bag, local)| {
                bag.children
                    .iter()
                    .map(|&c| SeparatorMap::build(local, tree.bag(c)))
                    .collect()
            })
            .collect();

        for (bag, local) in tree.bags().iter().zip(&locals) {
            tracing::trace!(
                bag = bag.id,
                width = bag.facts.len(),
                conflicts = local.conflict_masks.len(),
                solutions = local.solution_masks.len(),
                children = bag.children.len(),
                "prepared bag"
            );
        }
        Ok(Self { locals, separators })
    }

    pub fn separator(&self, bag: BagIndex, slot: usize) -> &SeparatorMap {
        &self.separators[bag][slot]
    }
}
