use windowing::{CacheKey, VirtualWindow};

/// Keeps the viewport pinned to an item identity across dataset changes.
///
/// Capture before prepending rows to a chat log or timeline, apply after; the anchored item
/// stays at the same place on screen.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollAnchor<K> {
    pub key: K,
    /// Scroll offset minus the anchored item's start. Negative when the item starts below the
    /// top of the viewport.
    pub offset_in_viewport: i64,
}

/// Anchors the first visible item. `None` for a disabled window or an empty range.
pub fn capture_first_visible_anchor<K: CacheKey>(
    window: &VirtualWindow<K>,
) -> Option<ScrollAnchor<K>> {
    let visible = window.visible_range();
    if visible.is_empty() {
        return None;
    }
    capture_at_index(window, visible.start_index)
}

/// Anchors whatever item covers the point `below_top` pixels under the top of the viewport.
pub fn capture_anchor_at<K: CacheKey>(
    window: &VirtualWindow<K>,
    below_top: u64,
) -> Option<ScrollAnchor<K>> {
    if window.visible_range().is_empty() {
        return None;
    }
    let at = window.scroll_offset().saturating_add(below_top);
    let index = window.index_at_offset(at)?;
    capture_at_index(window, index)
}

fn capture_at_index<K: CacheKey>(
    window: &VirtualWindow<K>,
    index: usize,
) -> Option<ScrollAnchor<K>> {
    let start = window.item_start(index)?;
    Some(ScrollAnchor {
        key: window.key_for(index),
        offset_in_viewport: signed_distance(window.scroll_offset(), start),
    })
}

/// Restores `anchor` by looking its key up in the window's current dataset.
///
/// Returns `false` when the key is gone.
pub fn apply_anchor<K: CacheKey>(window: &mut VirtualWindow<K>, anchor: &ScrollAnchor<K>) -> bool {
    apply_anchor_with(window, anchor, |w, key| w.index_of_key(key))
}

/// Like [`apply_anchor`], with a host-provided key lookup for datasets where the window's
/// linear key scan is too slow.
pub fn apply_anchor_with<K: CacheKey>(
    window: &mut VirtualWindow<K>,
    anchor: &ScrollAnchor<K>,
    key_to_index: impl FnOnce(&VirtualWindow<K>, &K) -> Option<usize>,
) -> bool {
    let Some(index) = key_to_index(window, &anchor.key) else {
        adebug!("anchor key left the dataset");
        return false;
    };
    let Some(start) = window.item_start(index) else {
        return false;
    };
    window.set_scroll_offset_clamped(start.saturating_add_signed(anchor.offset_in_viewport));
    true
}

fn signed_distance(to: u64, from: u64) -> i64 {
    if to >= from {
        i64::try_from(to - from).unwrap_or(i64::MAX)
    } else {
        i64::try_from(from - to).map_or(i64::MIN, |d| -d)
    }
}
