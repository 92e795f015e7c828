#[cfg(not(feature = "std"))]
use alloc::collections::BTreeMap;
#[cfg(feature = "std")]
use std::collections::HashMap;

/// Backing map of the size cache. Hash-based with `std`, ordered without it.
#[cfg(feature = "std")]
pub(crate) type KeyMap<K, V> = HashMap<K, V>;
#[cfg(not(feature = "std"))]
pub(crate) type KeyMap<K, V> = BTreeMap<K, V>;

/// Bounds an item key must satisfy to be used as a size cache key.
///
/// With `std` this is `Hash + Eq`; in `no_std` builds it is `Ord`.
#[cfg(feature = "std")]
pub trait CacheKey: core::hash::Hash + Eq {}
#[cfg(feature = "std")]
impl<K: core::hash::Hash + Eq> CacheKey for K {}

#[cfg(not(feature = "std"))]
pub trait CacheKey: Ord {}
#[cfg(not(feature = "std"))]
impl<K: Ord> CacheKey for K {}
