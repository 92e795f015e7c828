use crate::key::{CacheKey, KeyMap};

/// A cached size for one item key.
///
/// `measured == false` marks a provisional estimate that is still waiting for a real
/// measurement from the host.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SizeEntry {
    pub size: u32,
    pub measured: bool,
}

/// Per-key item sizes.
///
/// Lookups never fail: unknown keys resolve to the estimate supplied by the caller. Entries are
/// only dropped by [`SizeCache::remove`], [`SizeCache::retain`] or [`SizeCache::clear`], which
/// the owning window calls when items leave the dataset.
#[derive(Clone, Debug)]
pub struct SizeCache<K> {
    entries: KeyMap<K, SizeEntry>,
}

impl<K> Default for SizeCache<K> {
    fn default() -> Self {
        Self {
            entries: KeyMap::new(),
        }
    }
}

impl<K: CacheKey> SizeCache<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached size for `key`, or `estimate` when the key is unknown.
    pub fn get(&self, key: &K, estimate: u32) -> u32 {
        self.entries.get(key).map_or(estimate, |e| e.size)
    }

    pub fn entry(&self, key: &K) -> Option<SizeEntry> {
        self.entries.get(key).copied()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub fn is_measured(&self, key: &K) -> bool {
        self.entries.get(key).is_some_and(|e| e.measured)
    }

    /// Records a real measurement.
    ///
    /// Returns `false` when `key` was already measured at exactly `size`, in which case nothing
    /// downstream needs to be invalidated.
    pub fn set(&mut self, key: K, size: u32) -> bool {
        let next = SizeEntry {
            size,
            measured: true,
        };
        match self.entries.insert(key, next) {
            Some(prev) => prev != next,
            None => true,
        }
    }

    /// Records a provisional size. Never overwrites a real measurement.
    pub fn set_estimate(&mut self, key: K, size: u32) -> bool {
        if let Some(prev) = self.entries.get_mut(&key) {
            if prev.measured || prev.size == size {
                return false;
            }
            prev.size = size;
            return true;
        }
        self.entries.insert(
            key,
            SizeEntry {
                size,
                measured: false,
            },
        );
        true
    }

    pub fn remove(&mut self, key: &K) -> Option<SizeEntry> {
        self.entries.remove(key)
    }

    /// Keeps only entries for which `keep` returns `true`. Returns the number of evicted entries.
    pub fn retain(&mut self, mut keep: impl FnMut(&K) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|k, _| keep(k));
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, SizeEntry)> {
        self.entries.iter().map(|(k, e)| (k, *e))
    }

    /// Iterates over real measurements only.
    pub fn measured(&self) -> impl Iterator<Item = (&K, u32)> {
        self.entries
            .iter()
            .filter(|(_, e)| e.measured)
            .map(|(k, e)| (k, e.size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::{String, ToString};

    #[test]
    fn unknown_keys_fall_back_to_estimate() {
        let cache = SizeCache::<u64>::new();
        assert_eq!(cache.get(&7, 30), 30);
        assert_eq!(cache.entry(&7), None);
    }

    #[test]
    fn set_is_idempotent_for_unchanged_sizes() {
        let mut cache = SizeCache::new();
        assert!(cache.set("a".to_string(), 20));
        assert!(!cache.set("a".to_string(), 20));
        assert!(cache.set("a".to_string(), 21));
        assert_eq!(cache.get(&"a".to_string(), 0), 21);
    }

    #[test]
    fn estimates_never_clobber_measurements() {
        let mut cache = SizeCache::<u32>::new();
        assert!(cache.set_estimate(1, 30));
        assert!(!cache.is_measured(&1));
        assert!(cache.set(1, 50));
        assert!(!cache.set_estimate(1, 30));
        assert_eq!(cache.get(&1, 0), 50);

        // A measurement equal to the previous estimate still flips `measured`.
        assert!(cache.set_estimate(2, 30));
        assert!(cache.set(2, 30));
        assert!(cache.is_measured(&2));
    }

    #[test]
    fn retain_prunes_missing_keys() {
        let mut cache = SizeCache::<String>::new();
        for k in ["a", "b", "c"] {
            cache.set(k.to_string(), 10);
        }
        let evicted = cache.retain(|k| k != "b");
        assert_eq!(evicted, 1);
        assert_eq!(cache.len(), 2);
        assert!(!cache.contains(&"b".to_string()));
        assert_eq!(cache.remove(&"a".to_string()).map(|e| e.size), Some(10));
        assert_eq!(cache.measured().count(), 1);
    }
}
