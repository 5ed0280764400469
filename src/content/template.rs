//! Section template catalog used when adding a section to a page.

use serde::Serialize;

use super::section::*;

/// A starting point for a new section.
#[derive(Debug, Clone, Copy)]
pub struct SectionTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub section_type: SectionType,
    build: fn() -> SectionData,
}

impl SectionTemplate {
    /// Fresh copy of the template's starter data.
    #[must_use]
    pub fn data(&self) -> SectionData {
        (self.build)()
    }

    #[must_use]
    pub fn summary(&self) -> TemplateSummary {
        TemplateSummary {
            id: self.id,
            name: self.name,
            description: self.description,
            section_type: self.section_type.as_str(),
            category: self.section_type.label(),
        }
    }
}

/// Catalog entry as listed to the front-end.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSummary {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub section_type: &'static str,
    pub category: &'static str,
}

pub const TEMPLATES: &[SectionTemplate] = &[
    SectionTemplate {
        id: "hero-centered",
        name: "Centered Hero",
        description: "Large heading with a call-to-action button",
        section_type: SectionType::Hero,
        build: hero_centered,
    },
    SectionTemplate {
        id: "hero-left",
        name: "Left-aligned Hero",
        description: "Heading and subheading aligned left over an image",
        section_type: SectionType::Hero,
        build: hero_left,
    },
    SectionTemplate {
        id: "rich-text",
        name: "Text Block",
        description: "Free-form formatted text",
        section_type: SectionType::RichText,
        build: rich_text,
    },
    SectionTemplate {
        id: "features-grid",
        name: "Feature Grid",
        description: "Three features with icons",
        section_type: SectionType::Features,
        build: features_grid,
    },
    SectionTemplate {
        id: "gallery-grid",
        name: "Image Gallery",
        description: "Grid of images with captions",
        section_type: SectionType::Gallery,
        build: gallery_grid,
    },
    SectionTemplate {
        id: "pricing-tiers",
        name: "Pricing Tiers",
        description: "Three plans with a highlighted middle tier",
        section_type: SectionType::Pricing,
        build: pricing_tiers,
    },
    SectionTemplate {
        id: "faq",
        name: "FAQ",
        description: "Questions and answers",
        section_type: SectionType::Faq,
        build: faq,
    },
    SectionTemplate {
        id: "testimonials",
        name: "Testimonials",
        description: "Customer quotes",
        section_type: SectionType::Testimonials,
        build: testimonials,
    },
    SectionTemplate {
        id: "cta-banner",
        name: "Call-to-Action Banner",
        description: "Short pitch with a single button",
        section_type: SectionType::Cta,
        build: cta_banner,
    },
    SectionTemplate {
        id: "contact-form",
        name: "Contact",
        description: "Contact details and a message form",
        section_type: SectionType::Contact,
        build: contact_form,
    },
    SectionTemplate {
        id: "stats-row",
        name: "Stats",
        description: "A row of headline numbers",
        section_type: SectionType::Stats,
        build: stats_row,
    },
];

#[must_use]
pub fn find(id: &str) -> Option<&'static SectionTemplate> {
    TEMPLATES.iter().find(|t| t.id == id)
}

// =============================================================================
// STARTER DATA
// =============================================================================

fn hero_centered() -> SectionData {
    SectionData::Hero(HeroData {
        heading: "Your headline here".into(),
        subheading: Some("A short sentence about what you offer.".into()),
        cta_text: Some("Get started".into()),
        cta_link: Some("#contact".into()),
        alignment: Alignment::Center,
        ..HeroData::default()
    })
}

fn hero_left() -> SectionData {
    SectionData::Hero(HeroData {
        heading: "Your headline here".into(),
        subheading: Some("Describe your product in one line.".into()),
        alignment: Alignment::Left,
        ..HeroData::default()
    })
}

fn rich_text() -> SectionData {
    SectionData::RichText(RichTextData { body: "<p>Start writing...</p>".into(), ..RichTextData::default() })
}

fn features_grid() -> SectionData {
    let item = |icon: &str, title: &str| FeatureItem {
        icon: Some(icon.into()),
        title: title.into(),
        description: "Explain this feature in a sentence or two.".into(),
        ..FeatureItem::default()
    };
    SectionData::Features(FeaturesData {
        title: Some("Features".into()),
        items: vec![item("zap", "Fast"), item("shield", "Secure"), item("heart", "Loved")],
        columns: Some(3),
        ..FeaturesData::default()
    })
}

fn gallery_grid() -> SectionData {
    SectionData::Gallery(GalleryData { title: Some("Gallery".into()), layout: GalleryLayout::Grid, ..GalleryData::default() })
}

fn pricing_tiers() -> SectionData {
    let plan = |name: &str, price: &str, highlighted: bool| PricingPlan {
        name: name.into(),
        price: price.into(),
        period: Some("month".into()),
        features: vec!["Feature one".into(), "Feature two".into()],
        cta_text: Some("Choose plan".into()),
        highlighted,
        ..PricingPlan::default()
    };
    SectionData::Pricing(PricingData {
        title: Some("Pricing".into()),
        plans: vec![plan("Starter", "$9", false), plan("Pro", "$29", true), plan("Business", "$99", false)],
        ..PricingData::default()
    })
}

fn faq() -> SectionData {
    let item = FaqItem {
        question: "What is included?".into(),
        answer: "<p>Everything you need.</p>".into(),
        ..FaqItem::default()
    };
    SectionData::Faq(FaqData { title: Some("Frequently asked questions".into()), items: vec![item], ..FaqData::default() })
}

fn testimonials() -> SectionData {
    SectionData::Testimonials(TestimonialsData {
        title: Some("What our customers say".into()),
        items: vec![Testimonial {
            quote: "It changed how we work.".into(),
            author: "A happy customer".into(),
            ..Testimonial::default()
        }],
        ..TestimonialsData::default()
    })
}

fn cta_banner() -> SectionData {
    SectionData::Cta(CtaData {
        heading: "Ready to get started?".into(),
        button_text: "Contact us".into(),
        button_link: "#contact".into(),
        ..CtaData::default()
    })
}

fn contact_form() -> SectionData {
    SectionData::Contact(ContactData { title: Some("Get in touch".into()), show_form: true, ..ContactData::default() })
}

fn stats_row() -> SectionData {
    let stat = |value: &str, label: &str| StatItem { value: value.into(), label: label.into(), ..StatItem::default() };
    SectionData::Stats(StatsData {
        items: vec![stat("10k+", "Customers"), stat("99.9%", "Uptime"), stat("24/7", "Support")],
        ..StatsData::default()
    })
}
