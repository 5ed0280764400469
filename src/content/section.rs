//! Section types and their typed field sets.
//!
//! Each section type has its own data struct. All fields default so partially
//! filled sections (fresh templates, half-edited forms) still parse. Keys a
//! struct has no field for land in its flattened `extra` map, and types this
//! service does not know are carried as `SectionData::Custom`. Either way the
//! content API gets back everything it sent.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::ContentError;

// =============================================================================
// SECTION TYPE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionType {
    Hero,
    RichText,
    Features,
    Gallery,
    Pricing,
    Faq,
    Testimonials,
    Cta,
    Contact,
    Stats,
}

impl SectionType {
    pub const ALL: [Self; 10] = [
        Self::Hero,
        Self::RichText,
        Self::Features,
        Self::Gallery,
        Self::Pricing,
        Self::Faq,
        Self::Testimonials,
        Self::Cta,
        Self::Contact,
        Self::Stats,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hero => "hero",
            Self::RichText => "rich_text",
            Self::Features => "features",
            Self::Gallery => "gallery",
            Self::Pricing => "pricing",
            Self::Faq => "faq",
            Self::Testimonials => "testimonials",
            Self::Cta => "cta",
            Self::Contact => "contact",
            Self::Stats => "stats",
        }
    }

    #[must_use]
    pub fn from_str(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == raw)
    }

    /// Human-readable name shown in the section catalog.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Hero => "Hero",
            Self::RichText => "Rich Text",
            Self::Features => "Features",
            Self::Gallery => "Gallery",
            Self::Pricing => "Pricing",
            Self::Faq => "FAQ",
            Self::Testimonials => "Testimonials",
            Self::Cta => "Call to Action",
            Self::Contact => "Contact",
            Self::Stats => "Stats",
        }
    }
}

// =============================================================================
// SECTION DATA
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum SectionData {
    Hero(HeroData),
    RichText(RichTextData),
    Features(FeaturesData),
    Gallery(GalleryData),
    Pricing(PricingData),
    Faq(FaqData),
    Testimonials(TestimonialsData),
    Cta(CtaData),
    Contact(ContactData),
    Stats(StatsData),
    /// A section type this service has no schema for.
    Custom { kind: String, fields: Map<String, Value> },
}

impl SectionData {
    /// Build typed data from the wire `type` and `data` pair.
    ///
    /// # Errors
    ///
    /// Returns `NotAnObject` if `data` is neither an object nor null, and
    /// `InvalidData` if a field has the wrong shape for the section type.
    pub fn from_parts(kind: &str, data: Value) -> Result<Self, ContentError> {
        let data = match data {
            Value::Null => Value::Object(Map::new()),
            Value::Object(_) => data,
            _ => return Err(ContentError::NotAnObject),
        };

        let Some(section_type) = SectionType::from_str(kind) else {
            let Value::Object(fields) = data else {
                return Err(ContentError::NotAnObject);
            };
            return Ok(Self::Custom { kind: kind.to_owned(), fields });
        };

        Ok(match section_type {
            SectionType::Hero => Self::Hero(parse(kind, data)?),
            SectionType::RichText => Self::RichText(parse(kind, data)?),
            SectionType::Features => Self::Features(parse(kind, data)?),
            SectionType::Gallery => Self::Gallery(parse(kind, data)?),
            SectionType::Pricing => Self::Pricing(parse(kind, data)?),
            SectionType::Faq => Self::Faq(parse(kind, data)?),
            SectionType::Testimonials => Self::Testimonials(parse(kind, data)?),
            SectionType::Cta => Self::Cta(parse(kind, data)?),
            SectionType::Contact => Self::Contact(parse(kind, data)?),
            SectionType::Stats => Self::Stats(parse(kind, data)?),
        })
    }

    /// Split back into the wire `type` and `data` pair.
    #[must_use]
    pub fn into_parts(self) -> (String, Value) {
        let kind = self.kind().to_owned();
        let value = match self {
            Self::Hero(d) => to_value(&d),
            Self::RichText(d) => to_value(&d),
            Self::Features(d) => to_value(&d),
            Self::Gallery(d) => to_value(&d),
            Self::Pricing(d) => to_value(&d),
            Self::Faq(d) => to_value(&d),
            Self::Testimonials(d) => to_value(&d),
            Self::Cta(d) => to_value(&d),
            Self::Contact(d) => to_value(&d),
            Self::Stats(d) => to_value(&d),
            Self::Custom { fields, .. } => Value::Object(fields),
        };
        (kind, value)
    }

    /// Wire `type` string.
    #[must_use]
    pub fn kind(&self) -> &str {
        match self {
            Self::Hero(_) => SectionType::Hero.as_str(),
            Self::RichText(_) => SectionType::RichText.as_str(),
            Self::Features(_) => SectionType::Features.as_str(),
            Self::Gallery(_) => SectionType::Gallery.as_str(),
            Self::Pricing(_) => SectionType::Pricing.as_str(),
            Self::Faq(_) => SectionType::Faq.as_str(),
            Self::Testimonials(_) => SectionType::Testimonials.as_str(),
            Self::Cta(_) => SectionType::Cta.as_str(),
            Self::Contact(_) => SectionType::Contact.as_str(),
            Self::Stats(_) => SectionType::Stats.as_str(),
            Self::Custom { kind, .. } => kind,
        }
    }

    /// Shallow-merge a partial update into the data. `null` clears a field.
    ///
    /// The merged result is re-parsed for the section's type; on error the
    /// data is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns `InvalidData` if the merged fields do not fit the section type.
    pub fn merge_patch(&mut self, patch: &Map<String, Value>) -> Result<(), ContentError> {
        let (kind, mut value) = self.clone().into_parts();
        let Some(fields) = value.as_object_mut() else {
            return Err(ContentError::NotAnObject);
        };
        for (k, v) in patch {
            if v.is_null() {
                fields.remove(k);
            } else {
                fields.insert(k.clone(), v.clone());
            }
        }
        *self = Self::from_parts(&kind, value)?;
        Ok(())
    }

    /// Current string value of a top-level field, if it is a string.
    #[must_use]
    pub fn text_field(&self, field: &str) -> Option<String> {
        let (_, value) = self.clone().into_parts();
        value
            .get(field)
            .and_then(Value::as_str)
            .map(str::to_owned)
    }
}

fn parse<T: DeserializeOwned>(kind: &str, data: Value) -> Result<T, ContentError> {
    serde_json::from_value(data).map_err(|e| ContentError::InvalidData { kind: kind.to_owned(), message: e.to_string() })
}

fn to_value<T: Serialize>(data: &T) -> Value {
    serde_json::to_value(data).unwrap_or_else(|_| Value::Object(Map::new()))
}

// =============================================================================
// PER-TYPE FIELD SETS
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    #[default]
    Center,
    Right,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HeroData {
    pub heading: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subheading: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cta_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cta_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_image: Option<String>,
    pub alignment: Alignment,
    /// Keys with no typed field, carried through unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RichTextData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// HTML produced by the rich-text editor.
    pub body: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FeatureItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub title: String,
    pub description: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FeaturesData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    pub items: Vec<FeatureItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<u8>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GalleryImage {
    pub url: String,
    pub alt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GalleryLayout {
    #[default]
    Grid,
    Masonry,
    Carousel,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GalleryData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub images: Vec<GalleryImage>,
    pub layout: GalleryLayout,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PricingPlan {
    pub name: String,
    pub price: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
    pub features: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cta_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cta_link: Option<String>,
    pub highlighted: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PricingData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    pub plans: Vec<PricingPlan>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FaqItem {
    pub question: String,
    /// HTML answer from the rich-text editor.
    pub answer: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FaqData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub items: Vec<FaqItem>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Testimonial {
    pub quote: String,
    pub author: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TestimonialsData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub items: Vec<Testimonial>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CtaData {
    pub heading: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub button_text: String,
    pub button_link: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContactData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub show_form: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StatItem {
    pub value: String,
    pub label: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StatsData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub items: Vec<StatItem>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
#[path = "section_test.rs"]
mod tests;
