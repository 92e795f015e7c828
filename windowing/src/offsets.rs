use alloc::vec::Vec;
use core::cmp;

/// Item sizes plus a Fenwick tree over them, mapping index <-> offset in `O(log n)`.
///
/// Offsets here are relative to the first item: padding and scroll margin are applied by the
/// window. Every item except the last carries `gap` trailing space, so the tree stores
/// `size + gap` for `0..len - 1` and `size` for the last item.
#[derive(Clone, Debug, Default)]
pub(crate) struct OffsetIndex {
    sizes: Vec<u32>,
    measured: Vec<bool>,
    gap: u32,
    tree: Fenwick,
}

impl OffsetIndex {
    pub(crate) fn len(&self) -> usize {
        self.sizes.len()
    }

    pub(crate) fn size(&self, index: usize) -> Option<u32> {
        self.sizes.get(index).copied()
    }

    pub(crate) fn is_measured(&self, index: usize) -> bool {
        self.measured.get(index).copied().unwrap_or(false)
    }

    /// Replaces all sizes. `items` yields `(size, measured)` per index.
    pub(crate) fn rebuild(&mut self, items: impl IntoIterator<Item = (u32, bool)>) {
        self.sizes.clear();
        self.measured.clear();
        for (size, measured) in items {
            self.sizes.push(size);
            self.measured.push(measured);
        }
        self.rebuild_tree();
    }

    pub(crate) fn set_gap(&mut self, gap: u32) {
        if self.gap == gap {
            return;
        }
        self.gap = gap;
        self.rebuild_tree();
    }

    fn rebuild_tree(&mut self) {
        let n = self.sizes.len();
        let gap = self.gap as u64;
        self.tree = Fenwick::from_values(self.sizes.iter().enumerate().map(|(i, &s)| {
            if i + 1 < n {
                s as u64 + gap
            } else {
                s as u64
            }
        }));
    }

    /// Appends one item, moving the trailing gap onto the previous last item.
    pub(crate) fn push(&mut self, size: u32, measured: bool) {
        let len = self.sizes.len();
        if self.gap > 0 && len > 0 {
            self.tree.add(len - 1, self.gap as i64);
        }
        self.sizes.push(size);
        self.measured.push(measured);
        self.tree.push_value(size as u64);
    }

    /// Drops items past `new_len`. Sizes before `new_len` are kept as-is.
    pub(crate) fn truncate(&mut self, new_len: usize) {
        if new_len >= self.sizes.len() {
            return;
        }
        self.sizes.truncate(new_len);
        self.measured.truncate(new_len);
        self.tree.truncate(new_len);
        if self.gap > 0 && new_len > 0 {
            self.tree.add(new_len - 1, -(self.gap as i64));
        }
    }

    /// Sets the size at `index`. Returns the signed size delta (`0` when unchanged).
    ///
    /// All offsets after `index` observe the change on the next query.
    pub(crate) fn set(&mut self, index: usize, size: u32, measured: bool) -> i64 {
        let Some(cur) = self.sizes.get(index).copied() else {
            return 0;
        };
        self.measured[index] = measured;
        if cur == size {
            return 0;
        }
        self.sizes[index] = size;
        let delta = size as i64 - cur as i64;
        self.tree.add(index, delta);
        delta
    }

    /// Cumulative size of all items before `index` (including their gaps).
    ///
    /// Indexes past the end return the total size.
    pub(crate) fn offset_of(&self, index: usize) -> u64 {
        self.tree.prefix_sum(index)
    }

    pub(crate) fn total(&self) -> u64 {
        self.tree.total()
    }

    /// Index of the item covering `offset`. Offsets inside a gap map to the preceding item and
    /// offsets past the end map to the last item.
    pub(crate) fn index_at(&self, offset: u64) -> Option<usize> {
        let len = self.sizes.len();
        if len == 0 {
            return None;
        }
        Some(self.tree.lower_bound(offset).min(len - 1))
    }

    /// Iterates `(index, start, size)` for `start_index..end_index` without repeated tree queries.
    pub(crate) fn walk(
        &self,
        start_index: usize,
        end_index: usize,
        mut f: impl FnMut(usize, u64, u32),
    ) {
        let len = self.sizes.len();
        let end_index = cmp::min(end_index, len);
        if start_index >= end_index {
            return;
        }
        let gap = self.gap as u64;
        let mut start = self.offset_of(start_index);
        for i in start_index..end_index {
            let size = self.sizes[i];
            f(i, start, size);
            start = start.saturating_add(size as u64);
            if i + 1 < len {
                start = start.saturating_add(gap);
            }
        }
    }
}

/// 1-indexed Fenwick (binary indexed) tree of `u64` values.
#[derive(Clone, Debug)]
struct Fenwick {
    tree: Vec<u64>,
    total: u64,
    top_bit: usize,
}

impl Default for Fenwick {
    fn default() -> Self {
        Self {
            tree: alloc::vec![0],
            total: 0,
            top_bit: 0,
        }
    }
}

impl Fenwick {
    fn from_values(values: impl IntoIterator<Item = u64>) -> Self {
        let mut tree = alloc::vec![0u64];
        let mut total = 0u64;
        for value in values {
            total = total.saturating_add(value);
            tree.push(value);
        }
        let n = tree.len() - 1;
        // Linear-time build: push each node's partial sum into its parent.
        for i in 1..=n {
            let parent = i + lsb(i);
            if parent <= n {
                tree[parent] = tree[parent].saturating_add(tree[i]);
            }
        }
        Self {
            tree,
            total,
            top_bit: top_bit(n),
        }
    }

    fn len(&self) -> usize {
        self.tree.len() - 1
    }

    fn truncate(&mut self, new_len: usize) {
        if new_len >= self.len() {
            return;
        }
        // Node i only covers values at or before i, so the kept prefix stays valid.
        self.total = self.prefix_sum(new_len);
        self.tree.truncate(new_len + 1);
        self.top_bit = top_bit(new_len);
    }

    fn push_value(&mut self, value: u64) {
        let i = self.len() + 1;
        // Node i covers (i - lsb(i), i]: seed it from the existing prefix sums.
        let covered = self
            .prefix_sum(i - 1)
            .saturating_sub(self.prefix_sum(i - lsb(i)));
        self.tree.push(covered.saturating_add(value));
        self.total = self.total.saturating_add(value);
        self.top_bit = top_bit(i);
    }

    fn add(&mut self, index: usize, delta: i64) {
        let n = self.len();
        if index >= n || delta == 0 {
            return;
        }
        self.total = apply_delta(self.total, delta);
        let mut i = index + 1;
        while i <= n {
            debug_assert!(
                delta >= 0 || self.tree[i] >= delta.unsigned_abs(),
                "Fenwick underflow (node={i}, value={}, delta={delta})",
                self.tree[i]
            );
            self.tree[i] = apply_delta(self.tree[i], delta);
            i += lsb(i);
        }
    }

    fn prefix_sum(&self, count: usize) -> u64 {
        let mut i = cmp::min(count, self.len());
        let mut sum = 0u64;
        while i > 0 {
            sum = sum.saturating_add(self.tree[i]);
            i &= i - 1;
        }
        sum
    }

    fn total(&self) -> u64 {
        self.total
    }

    /// Largest `count` such that `prefix_sum(count) <= target`.
    fn lower_bound(&self, mut target: u64) -> usize {
        let n = self.len();
        let mut idx = 0usize;
        let mut bit = self.top_bit;
        while bit != 0 {
            let next = idx + bit;
            if next <= n && self.tree[next] <= target {
                target -= self.tree[next];
                idx = next;
            }
            bit >>= 1;
        }
        idx
    }
}

fn apply_delta(value: u64, delta: i64) -> u64 {
    if delta >= 0 {
        value.saturating_add(delta as u64)
    } else {
        value.saturating_sub(delta.unsigned_abs())
    }
}

fn lsb(i: usize) -> usize {
    i & i.wrapping_neg()
}

fn top_bit(n: usize) -> usize {
    if n == 0 { 0 } else { 1 << (usize::BITS - 1 - n.leading_zeros()) }
}
