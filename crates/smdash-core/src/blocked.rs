//! Blocked-IP list rendering.

use std::cmp::Ordering;

use serde::Serialize;

/// Sorted blocked-IP list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BlockedListView {
    pub items: Vec<String>,
}

impl BlockedListView {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.items.get(index).map(String::as_str)
    }
}

/// Case-insensitive lexical order with a byte-order tie-break.
///
/// This is string order, not numeric IP order: `10.0.0.5` sorts after
/// `1.2.3.4` but before `9.9.9.9`.
pub fn compare_ips(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Render the blocked set as a deterministic list.
pub fn render_blocked(ips: &[String]) -> BlockedListView {
    let mut items = ips.to_vec();
    items.sort_by(|a, b| compare_ips(a, b));
    BlockedListView { items }
}
