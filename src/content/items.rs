//! List helpers for repeatable section items (plans, images, FAQ entries).
//!
//! Out-of-range indexes are reported as `false` rather than panicking; the
//! list is left untouched in that case.

/// Insert `item` at `index`, or append when `index` is `None` or past the end.
pub fn add_item<T>(items: &mut Vec<T>, item: T, index: Option<usize>) {
    match index {
        Some(i) if i <= items.len() => items.insert(i, item),
        _ => items.push(item),
    }
}

/// Remove the item at `index`. Returns the removed item.
pub fn remove_item<T>(items: &mut Vec<T>, index: usize) -> Option<T> {
    (index < items.len()).then(|| items.remove(index))
}

/// Move the item at `from` so it ends up at `to`, shifting the items between.
pub fn move_item<T>(items: &mut [T], from: usize, to: usize) -> bool {
    if from >= items.len() || to >= items.len() {
        return false;
    }
    if from < to {
        items[from..=to].rotate_left(1);
    } else {
        items[to..=from].rotate_right(1);
    }
    true
}
