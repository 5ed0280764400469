//! Content validation gate for auto-save.
//!
//! Invalid content is never saved; the coordinator checks `is_valid` right
//! before each attempt. Checks are limited to what the editor itself can get
//! wrong (empty required fields, malformed links and colors, missing layout
//! sections). Hidden sections are validated too since they are still persisted.

use serde::Serialize;

use super::section::SectionData;
use super::{ContentSection, PageContent, color, layout};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub message: String,
}

impl ValidationIssue {
    fn page(field: &str, message: impl Into<String>) -> Self {
        Self { section: None, field: Some(field.to_owned()), message: message.into() }
    }

    fn section(key: &str, field: &str, message: impl Into<String>) -> Self {
        Self { section: Some(key.to_owned()), field: Some(field.to_owned()), message: message.into() }
    }
}

/// All issues found in `content`. Empty means valid.
#[must_use]
pub fn validate(content: &PageContent) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    for key in layout::required_keys(&content.layout) {
        if !content.sections.contains_key(key) {
            issues.push(ValidationIssue {
                section: Some((*key).to_owned()),
                field: None,
                message: format!("layout {} requires section {key}", content.layout),
            });
        }
    }

    if let Some(theme) = &content.settings.theme_color {
        if !color::is_hex_color(theme) {
            issues.push(ValidationIssue::page("themeColor", "theme color must be a hex color"));
        }
    }

    for (key, section) in content.sections.iter() {
        validate_section(key, section, &mut issues);
    }

    issues
}

#[must_use]
pub fn is_valid(content: &PageContent) -> bool {
    validate(content).is_empty()
}

/// Accepts site-relative paths, anchors, http(s), mailto and tel targets.
#[must_use]
pub fn is_valid_link(link: &str) -> bool {
    let link = link.trim();
    if link.is_empty() || link.chars().any(char::is_whitespace) {
        return false;
    }
    if link.starts_with("//") {
        return false;
    }
    if link == "/" {
        return true;
    }
    ["/", "#", "https://", "http://", "mailto:", "tel:"]
        .iter()
        .any(|prefix| link.len() > prefix.len() && link.starts_with(prefix))
}

fn validate_section(key: &str, section: &ContentSection, issues: &mut Vec<ValidationIssue>) {
    if let Some(settings) = &section.settings {
        if let Some(bg) = &settings.background_color {
            if !color::is_hex_color(bg) {
                issues.push(ValidationIssue::section(key, "backgroundColor", "background color must be a hex color"));
            }
        }
    }

    let mut check_link = |field: &str, link: Option<&str>| {
        if let Some(link) = link {
            if !link.is_empty() && !is_valid_link(link) {
                issues.push(ValidationIssue::section(key, field, format!("invalid link: {link}")));
            }
        }
    };

    match &section.data {
        SectionData::Hero(hero) => {
            check_link("ctaLink", hero.cta_link.as_deref());
            if hero.heading.trim().is_empty() {
                issues.push(ValidationIssue::section(key, "heading", "heading is required"));
            }
        }
        SectionData::Features(features) => {
            for (i, item) in features.items.iter().enumerate() {
                if item.title.trim().is_empty() {
                    issues.push(ValidationIssue::section(key, &format!("items.{i}.title"), "feature title is required"));
                }
            }
        }
        SectionData::Gallery(gallery) => {
            for (i, image) in gallery.images.iter().enumerate() {
                if image.url.trim().is_empty() {
                    issues.push(ValidationIssue::section(key, &format!("images.{i}.url"), "image url is required"));
                }
            }
        }
        SectionData::Pricing(pricing) => {
            for (i, plan) in pricing.plans.iter().enumerate() {
                check_link(&format!("plans.{i}.ctaLink"), plan.cta_link.as_deref());
            }
            for (i, plan) in pricing.plans.iter().enumerate() {
                if plan.name.trim().is_empty() {
                    issues.push(ValidationIssue::section(key, &format!("plans.{i}.name"), "plan name is required"));
                }
            }
        }
        SectionData::Faq(faq) => {
            for (i, item) in faq.items.iter().enumerate() {
                if item.question.trim().is_empty() {
                    issues.push(ValidationIssue::section(key, &format!("items.{i}.question"), "question is required"));
                }
            }
        }
        SectionData::Cta(cta) => {
            check_link("buttonLink", Some(cta.button_link.as_str()));
            if cta.heading.trim().is_empty() {
                issues.push(ValidationIssue::section(key, "heading", "heading is required"));
            }
        }
        SectionData::Contact(contact) => {
            if let Some(email) = contact.email.as_deref() {
                if !email.is_empty() && !email.contains('@') {
                    issues.push(ValidationIssue::section(key, "email", "email address is malformed"));
                }
            }
        }
        SectionData::RichText(_)
        | SectionData::Testimonials(_)
        | SectionData::Stats(_)
        | SectionData::Custom { .. } => {}
    }
}

#[cfg(test)]
#[path = "validate_test.rs"]
mod tests;
