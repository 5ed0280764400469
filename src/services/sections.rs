//! Section ordering and visibility over a page's section map.
//!
//! DESIGN
//! ======
//! Display order is `sort_by(order, then insertion order)`. Every mutation
//! here is synchronous and touches only the document passed in; the caller
//! holds the session write lock for the duration, so operations never
//! interleave. Deletion does not renumber: gaps in `order` are fine because
//! sorting only compares values.
//!
//! Sections the active layout requires cannot be hidden or deleted.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::content::{ContentError, ContentSection, PageContent, SectionSettings, items, layout, template};
use crate::error::ErrorCode;

#[derive(Debug, thiserror::Error)]
pub enum SectionError {
    #[error("section not found: {0}")]
    NotFound(String),
    #[error("section {0} is required by the page layout")]
    Required(String),
    #[error("unknown section template: {0}")]
    UnknownTemplate(String),
    #[error("field {0} is not a list")]
    NotAList(String),
    #[error("item index {index} out of range for {field}")]
    ItemIndex { field: String, index: usize },
    #[error(transparent)]
    Content(#[from] ContentError),
}

impl ErrorCode for SectionError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E_SECTION_NOT_FOUND",
            Self::Required(_) => "E_SECTION_REQUIRED",
            Self::UnknownTemplate(_) => "E_UNKNOWN_TEMPLATE",
            Self::NotAList(_) => "E_NOT_A_LIST",
            Self::ItemIndex { .. } => "E_ITEM_INDEX",
            Self::Content(e) => e.error_code(),
        }
    }
}

// =============================================================================
// ORDERING
// =============================================================================

/// Section keys in display order.
#[must_use]
pub fn display_order(content: &PageContent) -> Vec<String> {
    let mut keyed: Vec<(i64, usize, &str)> = content
        .sections
        .iter()
        .enumerate()
        .map(|(pos, (key, section))| (section.order, pos, key))
        .collect();
    keyed.sort_unstable();
    keyed
        .into_iter()
        .map(|(_, _, key)| key.to_owned())
        .collect()
}

/// Swap `key`'s order with the section displayed just before it.
///
/// Returns `false` when `key` is already first.
///
/// # Errors
///
/// Returns `NotFound` if `key` is not a section of the page.
pub fn move_up(content: &mut PageContent, key: &str) -> Result<bool, SectionError> {
    let order = display_order(content);
    let idx = index_of(&order, key)?;
    if idx == 0 {
        return Ok(false);
    }
    swap_orders(content, &order[idx - 1], key);
    Ok(true)
}

/// Swap `key`'s order with the section displayed just after it.
///
/// Returns `false` when `key` is already last.
///
/// # Errors
///
/// Returns `NotFound` if `key` is not a section of the page.
pub fn move_down(content: &mut PageContent, key: &str) -> Result<bool, SectionError> {
    let order = display_order(content);
    let idx = index_of(&order, key)?;
    if idx + 1 >= order.len() {
        return Ok(false);
    }
    swap_orders(content, key, &order[idx + 1]);
    Ok(true)
}

fn index_of(order: &[String], key: &str) -> Result<usize, SectionError> {
    order
        .iter()
        .position(|k| k == key)
        .ok_or_else(|| SectionError::NotFound(key.to_owned()))
}

/// Exchange the orders of two display neighbors. Tied orders are renumbered
/// first so the swap always changes the display order.
fn swap_orders(content: &mut PageContent, a: &str, b: &str) {
    let orders = |content: &PageContent| {
        (
            content.sections.get(a).map(|s| s.order),
            content.sections.get(b).map(|s| s.order),
        )
    };
    if let (Some(order_a), Some(order_b)) = orders(content) {
        if order_a == order_b {
            reindex(content);
        }
    }
    let (Some(order_a), Some(order_b)) = orders(content) else {
        return;
    };
    if let Some(section) = content.sections.get_mut(a) {
        section.order = order_b;
    }
    if let Some(section) = content.sections.get_mut(b) {
        section.order = order_a;
    }
}

/// Renumber all sections `1..=n` in current display order.
pub fn reindex(content: &mut PageContent) {
    for (i, key) in display_order(content).into_iter().enumerate() {
        if let Some(section) = content.sections.get_mut(&key) {
            section.order = i64::try_from(i).unwrap_or(i64::MAX - 1) + 1;
        }
    }
}

// =============================================================================
// VISIBILITY
// =============================================================================

/// Flip a section's visibility. Returns the new value.
///
/// # Errors
///
/// Returns `Required` (and leaves the section visible) when the active
/// layout requires `key`, or `NotFound` for an unknown key.
pub fn toggle_visibility(content: &mut PageContent, key: &str) -> Result<bool, SectionError> {
    if is_required(content, key) {
        return Err(SectionError::Required(key.to_owned()));
    }
    let section = content
        .sections
        .get_mut(key)
        .ok_or_else(|| SectionError::NotFound(key.to_owned()))?;
    section.visible = !section.visible;
    Ok(section.visible)
}

// =============================================================================
// ADD / DUPLICATE / DELETE
// =============================================================================

/// Add a section from the template catalog. Returns the new section's key.
///
/// Without `after_order` the section is appended with `max(order) + 1`
/// (`1` on an empty page). With `after_order` it takes `after_order + 1` and
/// every section ordered after that point shifts down by one.
///
/// # Errors
///
/// Returns `UnknownTemplate` if `template_id` is not in the catalog.
pub fn add_section(content: &mut PageContent, template_id: &str, after_order: Option<i64>) -> Result<String, SectionError> {
    let template = template::find(template_id).ok_or_else(|| SectionError::UnknownTemplate(template_id.to_owned()))?;
    let key = unique_key(content, template.section_type.as_str());
    let order = match after_order {
        Some(after) => {
            shift_after(content, after);
            after + 1
        }
        None => next_order(content),
    };
    content
        .sections
        .insert(key.clone(), ContentSection::new(template.data(), order));
    Ok(key)
}

/// Copy a section under a fresh key, placed directly after the source.
///
/// # Errors
///
/// Returns `NotFound` if `key` is not a section of the page.
pub fn duplicate_section(content: &mut PageContent, key: &str) -> Result<String, SectionError> {
    let mut copy = content
        .sections
        .get(key)
        .cloned()
        .ok_or_else(|| SectionError::NotFound(key.to_owned()))?;
    let new_key = unique_key(content, &format!("{key}_copy"));
    shift_after(content, copy.order);
    copy.order += 1;
    content.sections.insert(new_key.clone(), copy);
    Ok(new_key)
}

/// Remove a section. Remaining orders are left as they are.
///
/// # Errors
///
/// Returns `Required` for layout-required sections, `NotFound` for unknown keys.
pub fn delete_section(content: &mut PageContent, key: &str) -> Result<ContentSection, SectionError> {
    if is_required(content, key) {
        return Err(SectionError::Required(key.to_owned()));
    }
    content
        .sections
        .remove(key)
        .ok_or_else(|| SectionError::NotFound(key.to_owned()))
}

/// `max(order) + 1`, or `1` when the page has no sections.
#[must_use]
pub fn next_order(content: &PageContent) -> i64 {
    content
        .sections
        .iter()
        .map(|(_, section)| section.order)
        .max()
        .map_or(1, |max| max + 1)
}

fn is_required(content: &PageContent, key: &str) -> bool {
    layout::required_keys(&content.layout)
        .iter()
        .any(|required| *required == key)
}

fn shift_after(content: &mut PageContent, after: i64) {
    for (_, section) in content.sections.iter_mut() {
        if section.order > after {
            section.order += 1;
        }
    }
}

fn unique_key(content: &PageContent, base: &str) -> String {
    if !content.sections.contains_key(base) {
        return base.to_owned();
    }
    (2..)
        .map(|n| format!("{base}_{n}"))
        .find(|candidate| !content.sections.contains_key(candidate))
        .unwrap_or_else(|| base.to_owned())
}

// =============================================================================
// FIELD UPDATES
// =============================================================================

/// Merge a partial field update into a section's data.
///
/// # Errors
///
/// Returns `NotFound` for unknown keys, `Content` if the merged data does
/// not fit the section type (the section is left unchanged).
pub fn update_section_data(content: &mut PageContent, key: &str, patch: &Map<String, Value>) -> Result<(), SectionError> {
    let section = content
        .sections
        .get_mut(key)
        .ok_or_else(|| SectionError::NotFound(key.to_owned()))?;
    section.data.merge_patch(patch)?;
    Ok(())
}

/// Replace a section's display settings.
///
/// # Errors
///
/// Returns `NotFound` for unknown keys.
pub fn update_section_settings(
    content: &mut PageContent,
    key: &str,
    settings: Option<SectionSettings>,
) -> Result<(), SectionError> {
    let section = content
        .sections
        .get_mut(key)
        .ok_or_else(|| SectionError::NotFound(key.to_owned()))?;
    section.settings = settings;
    Ok(())
}

// =============================================================================
// REPEATABLE ITEMS
// =============================================================================

/// One change to a list field (gallery images, pricing plans, FAQ entries).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ItemOp {
    Add {
        item: Value,
        #[serde(default)]
        index: Option<usize>,
    },
    Remove {
        index: usize,
    },
    Move {
        from: usize,
        to: usize,
    },
}

/// Apply `op` to the list stored in `field` of a section's data. A missing
/// field counts as an empty list.
///
/// # Errors
///
/// Returns `NotAList` if the field holds something other than a list,
/// `ItemIndex` for an out-of-range remove or move, and `Content` when the
/// resulting list does not fit the section type.
pub fn edit_items(content: &mut PageContent, key: &str, field: &str, op: ItemOp) -> Result<(), SectionError> {
    let section = content
        .sections
        .get_mut(key)
        .ok_or_else(|| SectionError::NotFound(key.to_owned()))?;

    let (_, data) = section.data.clone().into_parts();
    let mut list = match data.get(field) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(list)) => list.clone(),
        Some(_) => return Err(SectionError::NotAList(field.to_owned())),
    };

    let bad_index = match &op {
        ItemOp::Add { .. } => 0,
        ItemOp::Remove { index } => *index,
        ItemOp::Move { from, to } => (*from).max(*to),
    };
    let applied = match op {
        ItemOp::Add { item, index } => {
            items::add_item(&mut list, item, index);
            true
        }
        ItemOp::Remove { index } => items::remove_item(&mut list, index).is_some(),
        ItemOp::Move { from, to } => items::move_item(&mut list, from, to),
    };
    if !applied {
        return Err(SectionError::ItemIndex { field: field.to_owned(), index: bad_index });
    }

    let mut patch = Map::new();
    patch.insert(field.to_owned(), Value::Array(list));
    section.data.merge_patch(&patch)?;
    Ok(())
}

#[cfg(test)]
#[path = "sections_test.rs"]
mod tests;
