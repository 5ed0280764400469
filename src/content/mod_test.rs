use super::section::{HeroData, RichTextData};
use super::*;
use serde_json::json;

fn hero(order: i64) -> ContentSection {
    ContentSection::new(SectionData::Hero(HeroData { heading: "Welcome".into(), ..HeroData::default() }), order)
}

fn text(order: i64) -> ContentSection {
    ContentSection::new(SectionData::RichText(RichTextData { body: "<p>hi</p>".into(), ..RichTextData::default() }), order)
}

// =============================================================================
// SectionMap
// =============================================================================

#[test]
fn section_map_keeps_insertion_order() {
    let map: SectionMap = [("zeta", hero(1)), ("alpha", text(2)), ("mid", text(3))]
        .into_iter()
        .collect();
    let keys: Vec<&str> = map.keys().collect();
    assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    assert_eq!(map.position("alpha"), Some(1));
}

#[test]
fn section_map_insert_existing_replaces_in_place() {
    let mut map: SectionMap = [("a", hero(1)), ("b", text(2))].into_iter().collect();
    let previous = map.insert("a", text(9));
    assert!(previous.is_some());
    assert_eq!(map.position("a"), Some(0));
    assert_eq!(map.get("a").unwrap().order, 9);
    assert_eq!(map.len(), 2);
}

#[test]
fn section_map_remove_keeps_remaining_order() {
    let mut map: SectionMap = [("a", hero(1)), ("b", text(2)), ("c", text(3))]
        .into_iter()
        .collect();
    assert!(map.remove("b").is_some());
    assert!(map.remove("b").is_none());
    let keys: Vec<&str> = map.keys().collect();
    assert_eq!(keys, vec!["a", "c"]);
}

// =============================================================================
// Wire format
// =============================================================================

#[test]
fn page_content_parses_wire_shape() {
    let raw = r#"{
        "version": 1,
        "layout": "landing",
        "sections": {
            "hero": {"type": "hero", "data": {"heading": "Hi", "ctaText": "Go"}, "visible": true, "order": 1},
            "about": {"type": "rich_text", "data": {"body": "<p>x</p>"}, "order": 2,
                      "settings": {"background": "muted", "padding": "large"}}
        },
        "settings": {"title": "Home", "customFlag": true}
    }"#;
    let content: PageContent = serde_json::from_str(raw).unwrap();
    assert_eq!(content.layout, "landing");
    assert_eq!(content.sections.len(), 2);

    let hero = content.sections.get("hero").unwrap();
    let SectionData::Hero(data) = &hero.data else {
        panic!("expected hero data");
    };
    assert_eq!(data.heading, "Hi");
    assert_eq!(data.cta_text.as_deref(), Some("Go"));

    let about = content.sections.get("about").unwrap();
    assert!(about.visible, "visible defaults to true");
    let settings = about.settings.as_ref().unwrap();
    assert_eq!(settings.background, BackgroundStyle::Muted);
    assert_eq!(settings.padding, Padding::Large);

    assert_eq!(content.settings.title.as_deref(), Some("Home"));
    assert_eq!(content.settings.extra.get("customFlag"), Some(&json!(true)));
}

#[test]
fn page_content_preserves_section_order_through_json() {
    let raw = r#"{"sections": {
        "z": {"type": "hero", "data": {}, "order": 1},
        "a": {"type": "hero", "data": {}, "order": 1}
    }}"#;
    let content: PageContent = serde_json::from_str(raw).unwrap();
    let written = serde_json::to_string(&content).unwrap();
    let reparsed: PageContent = serde_json::from_str(&written).unwrap();
    let keys: Vec<&str> = reparsed.sections.keys().collect();
    assert_eq!(keys, vec!["z", "a"]);
    assert_eq!(reparsed.version, CONTENT_VERSION);
    assert_eq!(reparsed.layout, DEFAULT_LAYOUT);
}

#[test]
fn section_serializes_type_and_data_side_by_side() {
    let value = serde_json::to_value(hero(4)).unwrap();
    assert_eq!(value["type"], "hero");
    assert_eq!(value["data"]["heading"], "Welcome");
    assert_eq!(value["order"], 4);
    assert_eq!(value["visible"], true);
    assert!(value.get("settings").is_none());
}

#[test]
fn page_round_trip_keeps_section_data() {
    let raw = json!({
        "sections": {
            "hero": {"type": "hero", "data": {"heading": "Hi", "badge": "New"}, "order": 1},
            "stats": {"type": "stats", "data": {"items": [{"value": "5", "label": "Years", "icon": "clock"}]}, "order": 2}
        }
    });
    let content: PageContent = serde_json::from_value(raw).unwrap();
    let written = serde_json::to_value(&content).unwrap();
    assert_eq!(written["sections"]["hero"]["data"]["badge"], "New");
    assert_eq!(written["sections"]["stats"]["data"]["items"][0]["icon"], "clock");

    let reparsed: PageContent = serde_json::from_value(written).unwrap();
    assert_eq!(reparsed, content);
}

#[test]
fn unknown_section_type_is_preserved() {
    let raw = r#"{"type": "map_embed", "data": {"lat": 1.5, "zoom": 12}, "order": 3}"#;
    let section: ContentSection = serde_json::from_str(raw).unwrap();
    assert_eq!(section.section_type(), "map_embed");
    let value = serde_json::to_value(&section).unwrap();
    assert_eq!(value["data"]["zoom"], 12);
}

#[test]
fn section_with_non_object_data_is_rejected() {
    let raw = r#"{"type": "hero", "data": [1, 2], "order": 1}"#;
    assert!(serde_json::from_str::<ContentSection>(raw).is_err());
}
