//! Bag-local bitmasks.
//!
//! Inside one bag, fact `bag.facts[i]` is bit `i` of a [`Mask`]. Masks are a
//! fixed native word, so a bag may hold at most [`MAX_BAG_WIDTH`] facts and a
//! bag may have at most [`MAX_FANOUT`] children (pending-children sets are masks
//! too). Both limits are checked when an engine is built; nothing here wraps.

pub type Mask = u64;

/// Widest bag the engine accepts.
pub const MAX_BAG_WIDTH: usize = Mask::BITS as usize;

/// Most children a single bag may have.
pub const MAX_FANOUT: usize = Mask::BITS as usize;

/// Mask with the low `width` bits set.
#[inline]
pub fn low_bits(width: usize) -> Mask {
    if width >= MAX_BAG_WIDTH {
        Mask::MAX
    } else {
        (1 << width) - 1
    }
}

#[inline]
pub fn is_subset(sub: Mask, sup: Mask) -> bool {
    sub & !sup == 0
}

/// Positions of the set bits, ascending.
pub fn ones(mask: Mask) -> impl Iterator<Item = u32> {
    let mut rest = mask;
    std::iter::from_fn(move || {
        if rest == 0 {
            return None;
        }
        let pos = rest.trailing_zeros();
        rest &= rest - 1;
        Some(pos)
    })
}

/// Every submask of `free`, from `free` itself down to `0`, each exactly once.
///
/// Uses the `t = (t - 1) & free` step and stops after yielding `0`.
#[derive(Debug, Clone)]
pub struct SubmaskIter {
    free: Mask,
    next: Option<Mask>,
}

impl SubmaskIter {
    pub fn new(free: Mask) -> Self {
        Self {
            free,
            next: Some(free),
        }
    }
}

impl Iterator for SubmaskIter {
    type Item = Mask;

    fn next(&mut self) -> Option<Mask> {
        let t = self.next?;
        self.next = if t == 0 {
            None
        } else {
            Some((t - 1) & self.free)
        };
        Some(t)
    }
}

/// Scatter the low bits of `index` onto the set bits of `free`, in ascending
/// bit order: bit `k` of `index` lands on the `k`-th set bit of `free`.
///
/// As `index` ranges over `0..2^popcount(free)` this produces every submask of
/// `free` exactly once.
pub fn deposit_bits(index: Mask, free: Mask) -> Mask {
    let mut out = 0;
    for (k, pos) in ones(free).enumerate() {
        if (index >> k) & 1 != 0 {
            out |= 1 << pos;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn low_bits_edges() {
        assert_eq!(low_bits(0), 0);
        assert_eq!(low_bits(3), 0b111);
        assert_eq!(low_bits(64), Mask::MAX);
    }

    #[test]
    fn subset_checks() {
        assert!(is_subset(0b0101, 0b1101));
        assert!(!is_subset(0b0110, 0b1101));
        assert!(is_subset(0, 0));
    }

    #[test]
    fn ones_ascending() {
        assert_eq!(ones(0b1010_0110).collect::<Vec<_>>(), vec![1, 2, 5, 7]);
        assert_eq!(ones(0).count(), 0);
        assert_eq!(ones(Mask::MAX).count(), 64);
    }

    #[test]
    fn submasks_of_zero_is_just_zero() {
        assert_eq!(SubmaskIter::new(0).collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn submasks_in_descending_order() {
        assert_eq!(
            SubmaskIter::new(0b101).collect::<Vec<_>>(),
            vec![0b101, 0b100, 0b001, 0b000]
        );
    }

    #[test]
    fn deposit_follows_free_bits() {
        assert_eq!(deposit_bits(0b00, 0b1010), 0);
        assert_eq!(deposit_bits(0b01, 0b1010), 0b0010);
        assert_eq!(deposit_bits(0b10, 0b1010), 0b1000);
        assert_eq!(deposit_bits(0b11, 0b1010), 0b1010);
    }

    proptest! {
        #[test]
        fn submask_enumeration_visits_each_submask_once(free in any::<u16>()) {
            let free = free as Mask;
            let seen: Vec<Mask> = SubmaskIter::new(free).collect();
            let distinct: HashSet<Mask> = seen.iter().copied().collect();
            prop_assert_eq!(seen.len(), 1usize << free.count_ones());
            prop_assert_eq!(distinct.len(), seen.len());
            prop_assert!(seen.iter().all(|&t| is_subset(t, free)));
            prop_assert_eq!(seen.first().copied(), Some(free));
            prop_assert_eq!(seen.last().copied(), Some(0));
        }

        #[test]
        fn deposit_enumerates_the_same_submasks(free in any::<u16>()) {
            let free = free as Mask;
            let lifted: HashSet<Mask> = (0..(1u64 << free.count_ones()))
                .map(|idx| deposit_bits(idx, free))
                .collect();
            let direct: HashSet<Mask> = SubmaskIter::new(free).collect();
            prop_assert_eq!(lifted, direct);
        }
    }
}
