use std::collections::BTreeSet;

use num_bigint::BigUint;
use proptest::prelude::*;
use repcount_core::mask::{low_bits, Mask};
use repcount_core::*;

const MAX_FACTS: u32 = 7;

fn edges(n: u32, max_edges: usize) -> impl Strategy<Value = Vec<Vec<u32>>> {
    let universe = n.max(1);
    let widest = universe.min(3) as usize;
    proptest::collection::vec(
        proptest::collection::btree_set(0..universe, 1..=widest)
            .prop_map(|s| s.into_iter().collect()),
        0..=max_edges,
    )
    .prop_map(move |es| if n == 0 { Vec::new() } else { es })
}

fn instance() -> impl Strategy<Value = (u32, Vec<Vec<u32>>, Vec<Vec<u32>>)> {
    (0..=MAX_FACTS).prop_flat_map(|n| (Just(n), edges(n, 5), edges(n, 3)))
}

fn hypergraph(n: u32, ec: &[Vec<u32>], es: &[Vec<u32>]) -> Hypergraph {
    let to = |es: &[Vec<u32>]| es.iter().map(|e| edge(e)).collect::<Vec<_>>();
    Hypergraph::new(n, to(ec), to(es)).expect("hypergraph")
}

/// Selections R with no conflict or solution edge inside R, where every fact
/// outside R would complete a conflict edge.
fn naive_count(n: u32, ec: &[Vec<u32>], es: &[Vec<u32>]) -> BigUint {
    let inside = |r: u32, e: &[u32]| e.iter().all(|&v| r & (1 << v) != 0);
    let mut total = 0u32;
    for r in 0..(1u32 << n) {
        if ec.iter().any(|e| inside(r, e)) || es.iter().any(|e| inside(r, e)) {
            continue;
        }
        let maximal =
            (0..n).all(|v| r & (1 << v) != 0 || ec.iter().any(|e| inside(r | (1 << v), e)));
        if maximal {
            total += 1;
        }
    }
    BigUint::from(total)
}

type Facts = BTreeSet<u32>;

fn subsets(items: &[u32]) -> Vec<Facts> {
    (0..1u32 << items.len())
        .map(|pick| {
            items
                .iter()
                .enumerate()
                .filter(|(i, _)| (pick >> i) & 1 == 1)
                .map(|(_, &v)| v)
                .collect()
        })
        .collect()
}

/// The combine/lift recursion written over global fact sets, with no memo
/// and no local bit encoding.
struct Unmemoized<'a> {
    tree: &'a TreeDecomposition,
    conflicts: &'a [Vec<u32>],
    solutions: &'a [Vec<u32>],
}

impl Unmemoized<'_> {
    fn facts(&self, bag: BagIndex) -> Facts {
        self.tree.bag(bag).facts.iter().copied().collect()
    }

    fn within(edges: &[Vec<u32>], bag: &Facts) -> Vec<Facts> {
        edges
            .iter()
            .map(|e| e.iter().copied().collect::<Facts>())
            .filter(|e| e.is_subset(bag))
            .collect()
    }

    fn closure(&self, bag: BagIndex, selected: &Facts) -> Option<Facts> {
        let facts = self.facts(bag);
        let conflicts = Self::within(self.conflicts, &facts);
        if conflicts.iter().any(|e| e.is_subset(selected)) {
            return None;
        }
        let mut closure = selected.clone();
        for &v in facts.difference(selected) {
            let mut with = selected.clone();
            with.insert(v);
            if conflicts.iter().any(|e| e.is_subset(&with)) {
                closure.insert(v);
            }
        }
        Some(closure)
    }

    fn leaf(&self, bag: BagIndex, selected: &Facts, closure: &Facts) -> bool {
        let solutions = Self::within(self.solutions, &self.facts(bag));
        !solutions.iter().any(|e| e.is_subset(selected))
            && self.closure(bag, selected).as_ref() == Some(closure)
    }

    fn combine(
        &self,
        bag: BagIndex,
        pending: &[BagIndex],
        selected: &Facts,
        closure: &Facts,
    ) -> BigUint {
        let Some((&child, rest)) = pending.split_first() else {
            return BigUint::from(u32::from(self.leaf(bag, selected, closure)));
        };
        let interface: Facts = self
            .facts(bag)
            .intersection(&self.facts(child))
            .copied()
            .collect();
        let sel: Facts = selected.intersection(&interface).copied().collect();
        let free: Vec<u32> = closure
            .intersection(&interface)
            .filter(|v| !sel.contains(v))
            .copied()
            .collect();
        let outside: Facts = closure.difference(&interface).copied().collect();

        let mut total = BigUint::from(0u32);
        for here in subsets(&free) {
            let closure_here: Facts = outside.iter().chain(&sel).chain(&here).copied().collect();
            let child_closure: Facts = free
                .iter()
                .filter(|v| !here.contains(v))
                .chain(&sel)
                .copied()
                .collect();
            let left = self.combine(bag, rest, selected, &closure_here);
            let right = self.lift(bag, child, &sel, &child_closure);
            total += left * right;
        }
        total
    }

    fn lift(
        &self,
        parent: BagIndex,
        child: BagIndex,
        selected: &Facts,
        closure: &Facts,
    ) -> BigUint {
        let private: Vec<u32> = self
            .facts(child)
            .difference(&self.facts(parent))
            .copied()
            .collect();
        let closure: Facts = closure.iter().chain(&private).copied().collect();
        let children = &self.tree.bag(child).children;
        subsets(&private)
            .into_iter()
            .map(|extra| {
                let selected: Facts = selected.union(&extra).copied().collect();
                self.combine(child, children, &selected, &closure)
            })
            .sum()
    }

    fn count(&self) -> BigUint {
        let root = self.tree.root();
        let facts: Vec<u32> = self.facts(root).into_iter().collect();
        let full: Facts = facts.iter().copied().collect();
        let children = &self.tree.bag(root).children;
        subsets(&facts)
            .iter()
            .map(|selected| self.combine(root, children, selected, &full))
            .sum()
    }
}

/// Up to four bags over up to six facts, each bag hung below a random earlier
/// one. Edges need not be covered by any bag.
fn random_tree() -> impl Strategy<Value = (u32, Vec<Vec<u32>>, Vec<Vec<u32>>, TreeDecomposition)> {
    (1..=6u32).prop_flat_map(|n| {
        let width = n.min(4) as usize;
        let bag = proptest::collection::btree_set(0..n, 0..=width)
            .prop_map(|s| s.into_iter().collect::<Vec<u32>>());
        (
            Just(n),
            edges(n, 5),
            edges(n, 2),
            proptest::collection::vec(bag, 1..=4),
            proptest::collection::vec(any::<usize>(), 3),
        )
            .prop_map(|(n, ec, es, bags, seeds)| {
                let links: Vec<(u32, u32)> = (1..bags.len())
                    .map(|i| ((seeds[i - 1] % i) as u32 + 1, i as u32 + 1))
                    .collect();
                let labelled = bags
                    .into_iter()
                    .enumerate()
                    .map(|(i, facts)| (i as u32 + 1, facts))
                    .collect();
                let t = TreeDecomposition::from_edges(labelled, &links, 1).expect("td");
                (n, ec, es, t)
            })
    })
}

fn path_of_two(split: u32, n: u32) -> TreeDecomposition {
    // Bag 1 holds [0, split], bag 2 holds [split, n): they share `split`.
    let first = (0..=split.min(n.saturating_sub(1))).collect();
    let second = (split.min(n.saturating_sub(1))..n).collect();
    TreeDecomposition::from_edges(vec![(1, first), (2, second)], &[(1, 2)], 1).expect("td")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn single_bag_matches_naive_count((n, ec, es) in instance()) {
        let h = hypergraph(n, &ec, &es);
        let t = TreeDecomposition::single_bag((0..n).collect());
        let mut engine = Engine::new_checked(&h, &t).expect("engine");
        prop_assert_eq!(engine.number_falsify(), naive_count(n, &ec, &es));
    }

    #[test]
    fn tree_count_matches_unmemoized_recursion((n, ec, es, t) in random_tree()) {
        let h = hypergraph(n, &ec, &es);
        let mut engine = Engine::new(&h, &t).expect("engine");
        let expected = Unmemoized { tree: &t, conflicts: &ec, solutions: &es }.count();
        prop_assert_eq!(engine.number_falsify(), expected);
    }

    #[test]
    fn bag_order_does_not_change_single_bag_count((n, ec, es) in instance()) {
        let h = hypergraph(n, &ec, &es);
        let forward = TreeDecomposition::single_bag((0..n).collect());
        let reverse = TreeDecomposition::single_bag((0..n).rev().collect());
        let a = Engine::new(&h, &forward).expect("engine").number_falsify();
        let b = Engine::new(&h, &reverse).expect("engine").number_falsify();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn closure_extends_selection_within_bag(
        (n, ec, es) in instance(),
        selected in any::<u8>(),
    ) {
        let h = hypergraph(n, &ec, &es);
        let t = TreeDecomposition::single_bag((0..n).collect());
        let engine = Engine::new(&h, &t).expect("engine");
        let selected = selected as Mask & low_bits(n as usize);
        if let Some(closure) = engine.max_rep_closure(0, selected) {
            prop_assert_eq!(closure & selected, selected);
            prop_assert_eq!(closure & !low_bits(n as usize), 0);
            let witnessed = engine.prepared().locals[0]
                .solution_masks
                .iter()
                .any(|&e| e & !selected == 0);
            prop_assert_eq!(engine.leaf_check(0, selected, closure), !witnessed);
        }
    }

    #[test]
    fn separator_masks_round_trip(
        split in 0..MAX_FACTS,
        n in 1..=MAX_FACTS,
        m in any::<u8>(),
        parent in any::<u8>(),
    ) {
        let t = path_of_two(split, n);
        let h = Hypergraph::new(n, vec![], vec![]).expect("hypergraph");
        let prepared = Prepared::build(&h, &t).expect("prepared");
        let sep = prepared.separator(0, 0);
        let iface = low_bits(sep.width());
        let m = m as Mask & iface;

        prop_assert_eq!(sep.parent_to_interface(sep.interface_to_parent(m)), m);
        prop_assert_eq!(sep.child_to_interface(sep.interface_to_child(m)), m);

        let parent = parent as Mask;
        let back = sep.interface_to_parent(sep.parent_to_interface(parent));
        prop_assert_eq!(back, parent & sep.parent_interface_mask);
        prop_assert_eq!(sep.child_interface_mask & sep.child_private_mask, 0);
    }

    #[test]
    fn memoized_results_are_stable(
        (n, ec, es) in instance(),
        split in 0..MAX_FACTS,
    ) {
        prop_assume!(n > 0);
        let h = hypergraph(n, &ec, &es);
        let t = path_of_two(split, n);

        let mut engine = Engine::new(&h, &t).expect("engine");
        let full = engine.prepared().locals[0].full_mask;
        let first: Vec<BigUint> = (0..=full)
            .map(|r| engine.combine_children(0, 1, r, full))
            .collect();
        let again: Vec<BigUint> = (0..=full)
            .map(|r| engine.combine_children(0, 1, r, full))
            .collect();
        prop_assert_eq!(&first, &again);

        let mut fresh = Engine::new(&h, &t).expect("engine");
        let total: BigUint = first.iter().sum();
        prop_assert_eq!(fresh.number_falsify(), total);
    }
}
