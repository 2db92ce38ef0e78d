//! Capacity-bounded tracker of the largest observed values.

use std::path::PathBuf;

/// One named observation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TopItem {
    pub name: PathBuf,
    pub val: u64,
}

impl TopItem {
    pub fn new(name: impl Into<PathBuf>, val: u64) -> Self {
        Self {
            name: name.into(),
            val,
        }
    }
}

/// Keeps at most `capacity` items, sorted ascending by value (`items()[0]` is the minimum).
#[derive(Clone, Debug)]
pub struct TopN {
    capacity: usize,
    items: Vec<TopItem>,
}

impl TopN {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            items: Vec::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Offer an item. Inserted while below capacity; once full it only replaces the
    /// current minimum when strictly larger.
    pub fn put(&mut self, item: TopItem) {
        if self.capacity == 0 {
            return;
        }
        if self.items.len() < self.capacity {
            self.items.push(item);
        } else if self.items[0].val < item.val {
            self.items[0] = item;
        } else {
            return;
        }
        self.items.sort_by_key(|it| it.val);
    }

    pub fn items(&self) -> &[TopItem] {
        &self.items
    }

    pub fn into_items(self) -> Vec<TopItem> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
