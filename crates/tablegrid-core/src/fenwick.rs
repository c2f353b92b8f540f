//! Fenwick tree (binary indexed tree) over integer sizes
//!
//! Backs [`SizeTable`](crate::size::SizeTable): entry `i` holds the
//! effective size of index `i` in fixed-point units, and the prefix sum of
//! the first `k` entries is the offset of index `k`. Integer sums are exact,
//! so the same values always produce the same offsets regardless of the
//! order in which they were set.
//!
//! | Operation | Time |
//! |-----------|------|
//! | `from_values` | O(n) |
//! | `set` | O(log n) |
//! | `prefix` | O(log n) |
//! | `count_at_most` / `count_below` | O(log n) |

/// Prefix-sum tree over non-negative `i64` values
///
/// The tree is stored 1-indexed (`tree[0]` unused). A plain copy of the
/// values is kept next to it so `set` can compute its delta without a
/// prefix query, and so structural edits can rebuild from it.
#[derive(Debug, Clone, Default)]
pub(crate) struct FenwickTree {
    tree: Vec<i64>,
    values: Vec<i64>,
}

impl FenwickTree {
    /// Build a tree from initial values in O(n)
    pub fn from_values(values: Vec<i64>) -> Self {
        let n = values.len();
        let mut tree = vec![0; n + 1];
        tree[1..].copy_from_slice(&values);

        for i in 1..=n {
            let parent = i + lowbit(i);
            if parent <= n {
                tree[parent] += tree[i];
            }
        }

        Self { tree, values }
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Value at position `i`
    pub fn get(&self, i: usize) -> i64 {
        self.values.get(i).copied().unwrap_or(0)
    }

    /// Replace the value at position `i`. Out-of-range positions are ignored.
    pub fn set(&mut self, i: usize, value: i64) {
        let Some(slot) = self.values.get_mut(i) else {
            return;
        };
        let delta = value - *slot;
        *slot = value;
        if delta == 0 {
            return;
        }

        let mut idx = i + 1;
        while idx < self.tree.len() {
            self.tree[idx] += delta;
            idx += lowbit(idx);
        }
    }

    /// Sum of the first `k` entries (`k` is clamped to `len`)
    pub fn prefix(&self, k: usize) -> i64 {
        let mut idx = k.min(self.len());
        let mut sum = 0;
        while idx > 0 {
            sum += self.tree[idx];
            idx -= lowbit(idx);
        }
        sum
    }

    /// Sum of all entries
    pub fn total(&self) -> i64 {
        self.prefix(self.len())
    }

    /// Largest `k` such that `prefix(k) <= target`
    pub fn count_at_most(&self, target: i64) -> usize {
        if target < 0 {
            return 0;
        }
        self.descend(target, |node, remaining| node <= remaining)
    }

    /// Largest `k` such that `prefix(k) < target`
    pub fn count_below(&self, target: i64) -> usize {
        if target <= 0 {
            return 0;
        }
        self.descend(target, |node, remaining| node < remaining)
    }

    /// Walk down from the most significant bit, absorbing every node the
    /// predicate accepts. Valid because all values are non-negative.
    fn descend(&self, target: i64, accept: impl Fn(i64, i64) -> bool) -> usize {
        let n = self.len();
        let mut pos = 0;
        let mut remaining = target;
        let mut mask = most_significant_bit(n);

        while mask > 0 {
            let next = pos + mask;
            if next <= n && accept(self.tree[next], remaining) {
                remaining -= self.tree[next];
                pos = next;
            }
            mask >>= 1;
        }

        pos
    }

    /// Take the plain values out, leaving an empty tree
    pub fn into_values(self) -> Vec<i64> {
        self.values
    }
}

/// Lowest set bit of `x`
#[inline]
fn lowbit(x: usize) -> usize {
    x & x.wrapping_neg()
}

/// Most significant bit that fits within `n`
#[inline]
fn most_significant_bit(n: usize) -> usize {
    if n == 0 {
        return 0;
    }
    1 << (usize::BITS - 1 - n.leading_zeros())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_values_prefix_sums() {
        let ft = FenwickTree::from_values(vec![3, 1, 4, 1, 5, 9, 2, 6]);
        assert_eq!(ft.prefix(0), 0);
        assert_eq!(ft.prefix(1), 3);
        assert_eq!(ft.prefix(3), 8);
        assert_eq!(ft.prefix(8), 31);
        assert_eq!(ft.prefix(100), 31);
        assert_eq!(ft.total(), 31);
    }

    #[test]
    fn set_overwrites_value() {
        let mut ft = FenwickTree::from_values(vec![5, 10, 15]);
        ft.set(1, 20);
        assert_eq!(ft.get(1), 20);
        assert_eq!(ft.prefix(2), 25);
        assert_eq!(ft.total(), 40);

        ft.set(7, 1);
        assert_eq!(ft.total(), 40);
    }

    #[test]
    fn set_and_restore_matches_fresh_build() {
        let values: Vec<i64> = (0..37).map(|k| 20_582 + 717 * k).collect();
        let fresh = FenwickTree::from_values(values.clone());
        let mut ft = fresh.clone();

        for i in 0..values.len() {
            ft.set(i, 0);
            assert_eq!(ft.prefix(i), ft.prefix(i + 1));
        }
        for (i, &v) in values.iter().enumerate() {
            ft.set(i, v);
        }
        for k in 0..=values.len() {
            assert_eq!(ft.prefix(k), fresh.prefix(k));
        }
    }

    #[test]
    fn count_at_most_finds_owning_entry() {
        // Offsets: 0, 20, 50, 60, 100, 125
        let ft = FenwickTree::from_values(vec![20, 30, 10, 40, 25]);
        assert_eq!(ft.count_at_most(0), 0);
        assert_eq!(ft.count_at_most(19), 0);
        assert_eq!(ft.count_at_most(20), 1);
        assert_eq!(ft.count_at_most(99), 3);
        assert_eq!(ft.count_at_most(125), 5);
        assert_eq!(ft.count_at_most(-1), 0);
    }

    #[test]
    fn count_at_most_skips_zero_entries() {
        // Offsets: 0, 10, 10, 10, 20
        let ft = FenwickTree::from_values(vec![10, 0, 0, 10]);
        assert_eq!(ft.count_at_most(10), 3);
        assert_eq!(ft.count_at_most(9), 0);
    }

    #[test]
    fn count_below_is_strict() {
        let ft = FenwickTree::from_values(vec![10, 0, 10]);
        assert_eq!(ft.count_below(0), 0);
        assert_eq!(ft.count_below(10), 0);
        assert_eq!(ft.count_below(11), 2);
        assert_eq!(ft.count_below(20), 2);
    }

    #[test]
    fn empty_tree() {
        let ft = FenwickTree::default();
        assert_eq!(ft.len(), 0);
        assert_eq!(ft.total(), 0);
        assert_eq!(ft.count_at_most(100), 0);
    }

    #[test]
    fn msb_correctness() {
        assert_eq!(most_significant_bit(0), 0);
        assert_eq!(most_significant_bit(1), 1);
        assert_eq!(most_significant_bit(5), 4);
        assert_eq!(most_significant_bit(1000), 512);
    }
}
