//! Page layouts: which section keys a page template requires.
//!
//! New sections are keyed by their section type, so every key named here is
//! a section type the template catalog can produce.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Layout {
    pub id: &'static str,
    pub name: &'static str,
    /// Section keys that must exist and cannot be hidden.
    pub required: &'static [&'static str],
    /// Section keys the layout suggests but does not enforce.
    pub optional: &'static [&'static str],
}

impl Layout {
    #[must_use]
    pub fn is_required(&self, key: &str) -> bool {
        self.required.iter().any(|required| *required == key)
    }
}

pub const LAYOUTS: &[Layout] = &[
    Layout {
        id: "landing",
        name: "Landing Page",
        required: &["hero"],
        optional: &["features", "testimonials", "pricing", "faq", "cta"],
    },
    Layout {
        id: "about",
        name: "About Page",
        required: &["hero", "rich_text"],
        optional: &["stats", "testimonials", "contact"],
    },
    Layout { id: "pricing", name: "Pricing Page", required: &["pricing"], optional: &["hero", "faq", "cta"] },
    Layout { id: "contact", name: "Contact Page", required: &["contact"], optional: &["hero", "faq"] },
    Layout { id: "blank", name: "Blank Page", required: &[], optional: &[] },
];

/// Look up a layout by id.
#[must_use]
pub fn find(id: &str) -> Option<&'static Layout> {
    LAYOUTS.iter().find(|layout| layout.id == id)
}

/// Keys required by `layout_id`. Unknown layouts require nothing.
#[must_use]
pub fn required_keys(layout_id: &str) -> &'static [&'static str] {
    find(layout_id).map_or(&[], |layout| layout.required)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_known_layout() {
        let layout = find("landing").unwrap();
        assert!(layout.is_required("hero"));
        assert!(!layout.is_required("faq"));
    }

    #[test]
    fn unknown_layout_requires_nothing() {
        assert!(find("nope").is_none());
        assert!(required_keys("nope").is_empty());
    }

    #[test]
    fn every_layout_key_has_a_template() {
        use crate::content::template::TEMPLATES;

        for layout in LAYOUTS {
            for key in layout.required.iter().chain(layout.optional) {
                assert!(
                    TEMPLATES.iter().any(|t| t.section_type.as_str() == *key),
                    "layout {} names {key}, which no template creates",
                    layout.id
                );
            }
        }
    }

    #[test]
    fn layout_ids_are_unique() {
        for (i, a) in LAYOUTS.iter().enumerate() {
            assert!(LAYOUTS.iter().skip(i + 1).all(|b| b.id != a.id), "duplicate layout id {}", a.id);
        }
    }
}
