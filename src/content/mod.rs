//! Content document: the page being edited and its named sections.
//!
//! DESIGN
//! ======
//! A page is a map of section key to `ContentSection`. The map keeps
//! insertion order so display ties (equal `order` values) resolve the same
//! way every time, including after a JSON round trip. Sections carry their
//! type-specific fields as a `SectionData` sum type; the wire format keeps
//! the loose `{ type, data }` pair the front-end produces.

pub mod color;
pub mod items;
pub mod layout;
pub mod rich_text;
pub mod section;
pub mod template;
pub mod validate;

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub use section::{SectionData, SectionType};

/// Current document schema version written by this service.
pub const CONTENT_VERSION: u32 = 1;

/// Layout id used when a document does not name one.
pub const DEFAULT_LAYOUT: &str = "landing";

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("invalid data for section type {kind}: {message}")]
    InvalidData { kind: String, message: String },
    #[error("section data must be a JSON object")]
    NotAnObject,
}

impl crate::error::ErrorCode for ContentError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidData { .. } => "E_INVALID_SECTION_DATA",
            Self::NotAnObject => "E_NOT_AN_OBJECT",
        }
    }
}

// =============================================================================
// PAGE CONTENT
// =============================================================================

/// The full editable document for one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageContent {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default = "default_layout")]
    pub layout: String,
    #[serde(default)]
    pub sections: SectionMap,
    #[serde(default)]
    pub settings: PageSettings,
}

fn default_version() -> u32 {
    CONTENT_VERSION
}

fn default_layout() -> String {
    DEFAULT_LAYOUT.to_owned()
}

impl PageContent {
    /// Empty document using the given layout.
    #[must_use]
    pub fn new(layout: &str) -> Self {
        Self { version: CONTENT_VERSION, layout: layout.to_owned(), sections: SectionMap::new(), settings: PageSettings::default() }
    }
}

impl Default for PageContent {
    fn default() -> Self {
        Self::new(DEFAULT_LAYOUT)
    }
}

/// Page-wide settings. Unknown keys are kept in `extra` and written back untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme_color: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// =============================================================================
// CONTENT SECTION
// =============================================================================

/// One named block of page content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSection", into = "RawSection")]
pub struct ContentSection {
    pub data: SectionData,
    pub visible: bool,
    pub order: i64,
    pub settings: Option<SectionSettings>,
}

impl ContentSection {
    #[must_use]
    pub fn new(data: SectionData, order: i64) -> Self {
        Self { data, visible: true, order, settings: None }
    }

    #[must_use]
    pub fn section_type(&self) -> String {
        self.data.kind().to_owned()
    }
}

/// Wire shape of a section: `type` and `data` as separate fields.
#[derive(Serialize, Deserialize)]
struct RawSection {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: serde_json::Value,
    #[serde(default = "default_visible")]
    visible: bool,
    #[serde(default)]
    order: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    settings: Option<SectionSettings>,
}

fn default_visible() -> bool {
    true
}

impl TryFrom<RawSection> for ContentSection {
    type Error = ContentError;

    fn try_from(raw: RawSection) -> Result<Self, Self::Error> {
        let data = SectionData::from_parts(&raw.kind, raw.data)?;
        Ok(Self { data, visible: raw.visible, order: raw.order, settings: raw.settings })
    }
}

impl From<ContentSection> for RawSection {
    fn from(section: ContentSection) -> Self {
        let (kind, data) = section.data.into_parts();
        Self { kind, data, visible: section.visible, order: section.order, settings: section.settings }
    }
}

/// Per-section display settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SectionSettings {
    pub background: BackgroundStyle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_image: Option<String>,
    pub padding: Padding,
    pub full_width: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundStyle {
    #[default]
    Default,
    Muted,
    Accent,
    Dark,
    Image,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Padding {
    None,
    Small,
    #[default]
    Medium,
    Large,
}

// =============================================================================
// SECTION MAP
// =============================================================================

/// Section key to section, in insertion order.
///
/// Serialized as a plain JSON object. Re-inserting an existing key replaces
/// the value in place and keeps its original position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectionMap {
    entries: Vec<(String, ContentSection)>,
}

impl SectionMap {
    #[must_use]
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ContentSection> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, section)| section)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut ContentSection> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, section)| section)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    /// Insertion index of `key`, used as the display tie-breaker.
    #[must_use]
    pub fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }

    /// Insert or replace. Returns the previous section for `key`, if any.
    pub fn insert(&mut self, key: impl Into<String>, section: ContentSection) -> Option<ContentSection> {
        let key = key.into();
        if let Some(slot) = self.get_mut(&key) {
            return Some(std::mem::replace(slot, section));
        }
        self.entries.push((key, section));
        None
    }

    pub fn remove(&mut self, key: &str) -> Option<ContentSection> {
        let idx = self.position(key)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ContentSection)> {
        self.entries
            .iter()
            .map(|(k, section)| (k.as_str(), section))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut ContentSection)> {
        self.entries
            .iter_mut()
            .map(|(k, section)| (k.as_str(), section))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, ContentSection)> for SectionMap {
    fn from_iter<I: IntoIterator<Item = (K, ContentSection)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, section) in iter {
            map.insert(key, section);
        }
        map
    }
}

impl Serialize for SectionMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, section) in &self.entries {
            map.serialize_entry(key, section)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for SectionMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SectionMapVisitor;

        impl<'de> Visitor<'de> for SectionMapVisitor {
            type Value = SectionMap;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of section key to section")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut map = SectionMap::new();
                while let Some((key, section)) = access.next_entry::<String, ContentSection>()? {
                    map.insert(key, section);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(SectionMapVisitor)
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
