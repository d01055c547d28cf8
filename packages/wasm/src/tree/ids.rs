//! Id generation for tree items.
//!
//! The converter never owns a counter. Callers pass something that hands out
//! ids, so one editing session can keep a single monotonic sequence across
//! imports, conversions, and edits.

use super::item::TreeItem;

/// Source of fresh tree item ids.
pub trait IdSource {
    fn next_id(&mut self) -> String;
}

impl<F: FnMut() -> String> IdSource for F {
    fn next_id(&mut self) -> String {
        self()
    }
}

/// Monotonic ids of the form `item-1`, `item-2`, ...
#[derive(Debug, Clone)]
pub struct SequentialIds {
    prefix: String,
    next: u64,
}

impl SequentialIds {
    pub const DEFAULT_PREFIX: &'static str = "item-";

    pub fn new() -> Self {
        Self::with_prefix(Self::DEFAULT_PREFIX)
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }

    /// Continue the sequence at `next`.
    pub fn starting_at(mut self, next: u64) -> Self {
        self.next = next;
        self
    }

    /// The number the next id will carry.
    pub fn peek(&self) -> u64 {
        self.next
    }

    /// Move past every id in `items` that this source could have produced,
    /// so ids loaded from elsewhere are never handed out again.
    pub fn resume_after(&mut self, items: &[TreeItem]) {
        let mut stack: Vec<&TreeItem> = items.iter().collect();
        while let Some(item) = stack.pop() {
            if let Some(n) = item
                .id
                .strip_prefix(self.prefix.as_str())
                .and_then(|rest| rest.parse::<u64>().ok())
            {
                self.next = self.next.max(n.saturating_add(1));
            }
            if let Some(children) = item.children() {
                stack.extend(children);
            }
        }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new()
    }
}

impl IdSource for SequentialIds {
    fn next_id(&mut self) -> String {
        let id = format!("{}{}", self.prefix, self.next);
        self.next += 1;
        id
    }
}
