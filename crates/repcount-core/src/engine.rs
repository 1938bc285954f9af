//! Tree-decomposition DP counting falsifying (selected, closure) assignments.
//!
//! State per bag is a pair of local masks:
//!
//! - `selected`: facts chosen in the candidate repair;
//! - `closure`: `selected` plus every fact forced out by it (adding the fact
//!   would complete a conflict edge).
//!
//! Children are folded in one at a time ([`Engine::combine_children`]). For
//! each child the separator part of the closure is split between "witnessed
//! here" and "witnessed in the child" and the two sides are multiplied; the
//! child side ([`Engine::lift_child`]) sums over every selection of the child's
//! private facts. A bag with no pending children is scored by
//! [`Engine::leaf_check`].
//!
//! Both recursive functions are memoized per engine. Counts are `BigUint`.

use ahash::AHashMap;
use num_bigint::BigUint;
use num_traits::{One, Zero};
use serde::{Deserialize, Serialize};

use crate::decomposition::{BagIndex, TreeDecomposition};
use crate::error::EngineError;
use crate::hypergraph::Hypergraph;
use crate::mask::{deposit_bits, is_subset, low_bits, ones, Mask, SubmaskIter};
use crate::prepare::Prepared;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CombineKey {
    bag: BagIndex,
    pending: Mask,
    selected: Mask,
    closure: Mask,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct LiftKey {
    bag: BagIndex,
    child: usize,
    selected: Mask,
    closure: Mask,
}

/// Counters collected while counting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineStats {
    pub combine_entries: usize,
    pub lift_entries: usize,
    pub combine_hits: u64,
    pub lift_hits: u64,
    pub leaf_checks: u64,
    pub root_candidates: u64,
}

pub struct Engine<'a> {
    tree: &'a TreeDecomposition,
    prepared: Prepared,
    combine_memo: AHashMap<CombineKey, BigUint>,
    lift_memo: AHashMap<LiftKey, BigUint>,
    stats: EngineStats,
}

impl<'a> Engine<'a> {
    /// Prepare per-bag tables. Fails if a bag is too wide or has too many
    /// children for mask-based state. Edge coverage is not checked.
    pub fn new(hypergraph: &Hypergraph, tree: &'a TreeDecomposition) -> Result<Self, EngineError> {
        let prepared = Prepared::build(hypergraph, tree)?;
        tracing::debug!(
            bags = tree.len(),
            treewidth = tree.treewidth(),
            fanout = tree.max_fanout(),
            "engine prepared"
        );
        Ok(Self {
            tree,
            prepared,
            combine_memo: AHashMap::new(),
            lift_memo: AHashMap::new(),
            stats: EngineStats::default(),
        })
    }

    /// Like [`Engine::new`], but first requires every Ec/Es edge to fit in a bag.
    pub fn new_checked(
        hypergraph: &Hypergraph,
        tree: &'a TreeDecomposition,
    ) -> Result<Self, EngineError> {
        tree.validate_coverage(hypergraph)?;
        Self::new(hypergraph, tree)
    }

    pub fn tree(&self) -> &TreeDecomposition {
        self.tree
    }

    pub fn prepared(&self) -> &Prepared {
        &self.prepared
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats {
            combine_entries: self.combine_memo.len(),
            lift_entries: self.lift_memo.len(),
            ..self.stats
        }
    }

    /// Base case: `selected` contains no conflict or solution edge of the bag
    /// and `closure` is exactly its forced-exclusion closure.
    pub fn leaf_check(&self, bag: BagIndex, selected: Mask, closure: Mask) -> bool {
        let local = &self.prepared.locals[bag];
        if local
            .solution_masks
            .iter()
            .any(|&e| is_subset(e, selected))
        {
            return false;
        }
        // `None` also covers a conflict edge inside `selected`.
        self.max_rep_closure(bag, selected) == Some(closure)
    }

    /// `selected` plus each bag fact whose single addition would complete a
    /// conflict edge, tested bit by bit against `selected` alone. `None` when
    /// `selected` already contains a conflict edge.
    pub fn max_rep_closure(&self, bag: BagIndex, selected: Mask) -> Option<Mask> {
        let local = &self.prepared.locals[bag];
        let hits = |m: Mask| local.conflict_masks.iter().any(|&e| is_subset(e, m));
        if hits(selected) {
            return None;
        }
        let mut closure = selected;
        for pos in ones(local.full_mask & !selected) {
            let bit: Mask = 1 << pos;
            if hits(selected | bit) {
                closure |= bit;
            }
        }
        Some(closure)
    }

    /// Count completions of `bag`'s subtree restricted to the children still set
    /// in `pending`, given the bag's `selected` and `closure`.
    pub fn combine_children(
        &mut self,
        bag: BagIndex,
        pending: Mask,
        selected: Mask,
        closure: Mask,
    ) -> BigUint {
        if pending == 0 {
            self.stats.leaf_checks += 1;
            return if self.leaf_check(bag, selected, closure) {
                BigUint::one()
            } else {
                BigUint::zero()
            };
        }

        let key = CombineKey {
            bag,
            pending,
            selected,
            closure,
        };
        if let Some(hit) = self.combine_memo.get(&key) {
            self.stats.combine_hits += 1;
            return hit.clone();
        }

        let slot = pending.trailing_zeros() as usize;
        let rest = pending & (pending - 1);
        let sep = self.prepared.separator(bag, slot);
        let interface = sep.parent_interface_mask;
        let sel_iface = sep.parent_to_interface(selected & interface);
        let clo_iface = sep.parent_to_interface(closure & interface);
        let free = clo_iface & !sel_iface;
        let outside = closure & !interface;

        let mut total = BigUint::zero();
        for here in SubmaskIter::new(free) {
            let there = free ^ here;
            let closure_here =
                outside | self.prepared.separator(bag, slot).interface_to_parent(sel_iface | here);
            let left = self.combine_children(bag, rest, selected, closure_here);
            if left.is_zero() {
                continue;
            }
            let right = self.lift_child(bag, slot, sel_iface, sel_iface | there);
            total += left * right;
        }

        tracing::trace!(bag, pending, selected, closure, count = %total, "combine");
        self.combine_memo.insert(key, total.clone());
        total
    }

    /// Count completions of the `slot`-th child's subtree given the separator's
    /// `selected` and `closure` (interface bits), over every selection of the
    /// child's private facts.
    pub fn lift_child(
        &mut self,
        bag: BagIndex,
        slot: usize,
        selected: Mask,
        closure: Mask,
    ) -> BigUint {
        let key = LiftKey {
            bag,
            child: slot,
            selected,
            closure,
        };
        if let Some(hit) = self.lift_memo.get(&key) {
            self.stats.lift_hits += 1;
            return hit.clone();
        }

        let child = self.tree.bag(bag).children[slot];
        let sep = self.prepared.separator(bag, slot);
        let private = sep.child_private_mask;
        let child_selected = sep.interface_to_child(selected);
        let child_closure = sep.interface_to_child(closure) | private;
        let pending = self.prepared.locals[child].children_mask;

        let mut total = BigUint::zero();
        for index in 0..=low_bits(private.count_ones() as usize) {
            let extra = deposit_bits(index, private);
            total += self.combine_children(child, pending, child_selected | extra, child_closure);
        }

        self.lift_memo.insert(key, total.clone());
        total
    }

    /// Sum over every selection of the root bag with the root closure fixed to
    /// the whole bag.
    pub fn number_falsify(&mut self) -> BigUint {
        let root = self.tree.root();
        let full = self.prepared.locals[root].full_mask;
        let pending = self.prepared.locals[root].children_mask;

        let mut total = BigUint::zero();
        for selected in 0..=full {
            self.stats.root_candidates += 1;
            total += self.combine_children(root, pending, selected, full);
        }

        let stats = self.stats();
        tracing::info!(
            count = %total,
            root_candidates = stats.root_candidates,
            combine_entries = stats.combine_entries,
            lift_entries = stats.lift_entries,
            "counted falsifying assignments"
        );
        total
    }
}
