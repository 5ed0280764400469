use super::*;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use crate::content::section::{HeroData, SectionData};
use crate::services::autosave::SaveState;
use crate::state::test_helpers::{MemoryStore, test_app_state};

/// Landing page with a valid hero and one optional text section.
fn landing_page() -> PageContent {
    let mut content = PageContent::new("landing");
    let hero = SectionData::Hero(HeroData { heading: "Welcome".into(), ..HeroData::default() });
    content.sections.insert("hero", ContentSection::new(hero, 1));
    sections::add_section(&mut content, "rich-text", None).unwrap();
    content
}

async fn opened() -> (AppState, Arc<MemoryStore>, Uuid) {
    let (state, store) = test_app_state();
    let page_id = Uuid::new_v4();
    store.put(page_id, landing_page());
    open_session(State(state.clone()), Path(page_id), Query(OpenSessionQuery::default()))
        .await
        .unwrap();
    (state, store, page_id)
}

fn path(page_id: Uuid, key: &str) -> Path<(Uuid, String)> {
    Path((page_id, key.to_owned()))
}

// =============================================================================
// error mapping
// =============================================================================

#[test]
fn session_error_maps_status() {
    let cases = [
        (SessionError::NotOpen(Uuid::nil()), StatusCode::NOT_FOUND),
        (SessionError::UnknownLayout("x".into()), StatusCode::BAD_REQUEST),
        (SessionError::Section(SectionError::Required("hero".into())), StatusCode::CONFLICT),
        (SessionError::Section(SectionError::UnknownTemplate("x".into())), StatusCode::BAD_REQUEST),
        (
            SessionError::Load { page_id: Uuid::nil(), source: StoreError::Request("refused".into()) },
            StatusCode::BAD_GATEWAY,
        ),
    ];
    for (err, status) in cases {
        assert_eq!(session_error(err).status, status);
    }
}

#[test]
fn required_error_body_carries_code() {
    let err = session_error(SessionError::Section(SectionError::Required("hero".into())));
    assert_eq!(err.body.code, "E_SECTION_REQUIRED");
    assert!(err.body.error.contains("hero"));
}

// =============================================================================
// session
// =============================================================================

#[tokio::test]
async fn routes_require_open_session() {
    let (state, _store) = test_app_state();
    let err = list_sections(State(state), Path(Uuid::new_v4())).await.unwrap_err();
    assert_eq!(err.status, StatusCode::NOT_FOUND);
    assert_eq!(err.body.code, "E_SESSION_NOT_OPEN");
}

#[tokio::test]
async fn open_then_close_session() {
    let (state, _store, page_id) = opened().await;
    let info = close_session(State(state.clone()), Path(page_id)).await.unwrap().0;
    assert!(!info.dirty);
    let err = get_content(State(state), Path(page_id)).await.unwrap_err();
    assert_eq!(err.status, StatusCode::NOT_FOUND);
}

// =============================================================================
// sections
// =============================================================================

#[tokio::test]
async fn list_sections_in_display_order_with_required_flag() {
    let (state, _store, page_id) = opened().await;
    let views = list_sections(State(state), Path(page_id)).await.unwrap().0;
    let keys: Vec<_> = views.iter().map(|v| v.key.as_str()).collect();
    assert_eq!(keys, vec!["hero", "rich_text"]);
    assert!(views[0].required);
    assert!(!views[1].required);
}

#[tokio::test]
async fn section_view_serializes_flat() {
    let (state, _store, page_id) = opened().await;
    let views = list_sections(State(state), Path(page_id)).await.unwrap().0;
    let value = serde_json::to_value(&views[0]).unwrap();
    assert_eq!(value["key"], "hero");
    assert_eq!(value["type"], "hero");
    assert_eq!(value["data"]["heading"], "Welcome");
    assert_eq!(value["visible"], true);
    assert_eq!(value["required"], true);
}

#[tokio::test]
async fn add_section_returns_created() {
    let (state, _store, page_id) = opened().await;
    let body = AddSectionBody { template_id: "faq".into(), after_order: None };
    let (status, view) = add_section(State(state), Path(page_id), Json(body)).await.unwrap();
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(view.key, "faq");
    assert_eq!(view.section.order, 3);
    assert!(view.section.visible);
}

#[tokio::test]
async fn hiding_required_section_conflicts() {
    let (state, _store, page_id) = opened().await;
    let err = toggle_visibility(State(state.clone()), path(page_id, "hero")).await.unwrap_err();
    assert_eq!(err.status, StatusCode::CONFLICT);

    let shown = toggle_visibility(State(state), path(page_id, "rich_text")).await.unwrap().0;
    assert!(!shown.visible);
}

#[tokio::test]
async fn move_down_reports_new_order() {
    let (state, _store, page_id) = opened().await;
    let response = move_down(State(state.clone()), path(page_id, "hero")).await.unwrap().0;
    assert!(response.moved);
    assert_eq!(response.order, vec!["rich_text", "hero"]);

    let response = move_down(State(state), path(page_id, "hero")).await.unwrap().0;
    assert!(!response.moved);
}

#[tokio::test]
async fn patch_section_with_bad_shape_is_unprocessable() {
    let (state, _store, page_id) = opened().await;
    let patch = json!({"heading": [1, 2]}).as_object().unwrap().clone();
    let err = patch_section(State(state), path(page_id, "hero"), Json(patch)).await.unwrap_err();
    assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn patch_with_untyped_key_is_stored() {
    let (state, _store, page_id) = opened().await;
    let patch = json!({"eyebrow": "Launch"}).as_object().unwrap().clone();
    let view = patch_section(State(state.clone()), path(page_id, "hero"), Json(patch)).await.unwrap().0;
    assert_eq!(view.section.data.text_field("eyebrow").as_deref(), Some("Launch"));

    let field_path = Path((page_id, "hero".to_owned(), "eyebrow".to_owned()));
    let body = FieldCommitBody { value: "Launch".into() };
    let response = commit_field(State(state), field_path, Json(body)).await.unwrap().0;
    assert!(!response.changed);
}

#[tokio::test]
async fn commit_field_only_changes_on_new_value() {
    let (state, _store, page_id) = opened().await;
    let field_path = || Path((page_id, "hero".to_owned(), "heading".to_owned()));

    let same = FieldCommitBody { value: "Welcome".into() };
    let response = commit_field(State(state.clone()), field_path(), Json(same)).await.unwrap().0;
    assert!(!response.changed);
    let revision = session::read(&state, page_id, |doc| doc.revision).await.unwrap();
    assert_eq!(revision, 0);

    let new = FieldCommitBody { value: "Hello there".into() };
    let response = commit_field(State(state.clone()), field_path(), Json(new)).await.unwrap().0;
    assert!(response.changed);
    let SectionData::Hero(hero) = &response.section.section.data else {
        panic!("expected hero");
    };
    assert_eq!(hero.heading, "Hello there");
}

#[tokio::test]
async fn delete_and_duplicate() {
    let (state, _store, page_id) = opened().await;
    let (status, copy) = duplicate_section(State(state.clone()), path(page_id, "rich_text")).await.unwrap();
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(copy.key, "rich_text_copy");

    let status = delete_section(State(state.clone()), path(page_id, "rich_text")).await.unwrap();
    assert_eq!(status, StatusCode::NO_CONTENT);

    let err = delete_section(State(state), path(page_id, "hero")).await.unwrap_err();
    assert_eq!(err.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn section_settings_normalize_color() {
    let (state, _store, page_id) = opened().await;
    let settings = SectionSettings { background_color: Some("#abc".into()), ..SectionSettings::default() };
    let view = put_section_settings(State(state), path(page_id, "hero"), Json(Some(settings)))
        .await
        .unwrap()
        .0;
    assert_eq!(view.section.settings.unwrap().background_color.as_deref(), Some("#AABBCC"));
}

#[tokio::test]
async fn items_route_edits_list() {
    let (state, _store, page_id) = opened().await;
    let body = AddSectionBody { template_id: "faq".into(), after_order: None };
    add_section(State(state.clone()), Path(page_id), Json(body)).await.unwrap();

    let item_path = || Path((page_id, "faq".to_owned(), "items".to_owned()));
    let op = ItemOp::Add { item: json!({"question": "Why?", "answer": "Because."}), index: Some(0) };
    let view = edit_items(State(state.clone()), item_path(), Json(op)).await.unwrap().0;
    let SectionData::Faq(faq) = &view.section.data else {
        panic!("expected faq");
    };
    assert_eq!(faq.items[0].question, "Why?");

    let err = edit_items(State(state), item_path(), Json(ItemOp::Remove { index: 50 })).await.unwrap_err();
    assert_eq!(err.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn reindex_closes_gaps() {
    let (state, _store, page_id) = opened().await;
    let body = AddSectionBody { template_id: "faq".into(), after_order: None };
    add_section(State(state.clone()), Path(page_id), Json(body)).await.unwrap();
    delete_section(State(state.clone()), path(page_id, "rich_text")).await.unwrap();

    let views = reindex(State(state), Path(page_id)).await.unwrap().0;
    let orders: Vec<_> = views.iter().map(|v| (v.key.as_str(), v.section.order)).collect();
    assert_eq!(orders, vec![("hero", 1), ("faq", 2)]);
}

// =============================================================================
// page settings
// =============================================================================

#[tokio::test]
async fn settings_history_and_revert() {
    let (state, _store, page_id) = opened().await;
    let first = PageSettings { title: Some("One".into()), theme_color: Some("#fff".into()), ..PageSettings::default() };
    let saved = put_settings(State(state.clone()), Path(page_id), Json(first)).await.unwrap().0;
    assert_eq!(saved.theme_color.as_deref(), Some("#FFFFFF"));

    let second = PageSettings { title: Some("Two".into()), ..PageSettings::default() };
    put_settings(State(state.clone()), Path(page_id), Json(second)).await.unwrap();

    let history = settings_history(State(state.clone()), Path(page_id)).await.unwrap().0;
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].settings.title.as_deref(), Some("One"));

    let reverted = revert_settings(State(state.clone()), Path(page_id)).await.unwrap().0;
    assert!(reverted.reverted);
    assert_eq!(reverted.settings.title.as_deref(), Some("One"));
}

#[tokio::test]
async fn unchanged_settings_do_not_grow_history() {
    let (state, _store, page_id) = opened().await;
    put_settings(State(state.clone()), Path(page_id), Json(PageSettings::default()))
        .await
        .unwrap();
    let history = settings_history(State(state), Path(page_id)).await.unwrap().0;
    assert!(history.is_empty());
}

// =============================================================================
// validation & save status
// =============================================================================

#[tokio::test]
async fn validation_reports_issues() {
    let (state, _store, page_id) = opened().await;
    let patch = json!({"heading": ""}).as_object().unwrap().clone();
    patch_section(State(state.clone()), path(page_id, "hero"), Json(patch)).await.unwrap();

    let response = validation(State(state), Path(page_id)).await.unwrap().0;
    assert!(!response.valid);
    assert!(response.issues.iter().any(|i| i.section.as_deref() == Some("hero")));
}

#[tokio::test(start_paused = true)]
async fn edits_through_routes_autosave() {
    let (state, store, page_id) = opened().await;
    let body = AddSectionBody { template_id: "cta-banner".into(), after_order: None };
    add_section(State(state.clone()), Path(page_id), Json(body)).await.unwrap();

    tokio::time::sleep(Duration::from_millis(2100)).await;
    assert_eq!(store.save_count(), 1);
    let status = save_status(State(state.clone()), Path(page_id)).await.unwrap().0;
    assert_eq!(status.status, SaveState::Saved);
    assert!(status.last_saved.is_some());

    // Nothing failed, so a manual retry changes nothing.
    let status = retry_save(State(state), Path(page_id)).await.unwrap().0;
    assert_eq!(status.status, SaveState::Saved);
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(store.save_count(), 1);
}
