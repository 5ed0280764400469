//! Editor session routes: open/close, section edits, settings, save status.
//!
//! Every mutating handler goes through `session::edit`, which bumps the
//! document revision and pokes the save coordinator when the content
//! actually changed. Handlers never save directly.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::content::rich_text::InlineEdit;
use crate::content::validate::{self, ValidationIssue};
use crate::content::{ContentSection, PageContent, PageSettings, SectionSettings, color, layout};
use crate::error::ApiError;
use crate::services::autosave::SaveStatus;
use crate::services::history::SettingsSnapshot;
use crate::services::sections::{self, ItemOp, SectionError};
use crate::services::session::{self, SessionError, SessionInfo};
use crate::services::store::StoreError;
use crate::state::AppState;

type ApiResult<T> = Result<Json<T>, ApiError>;

// =============================================================================
// RESPONSE SHAPES
// =============================================================================

/// A section with its key, as listed to the editor.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionView {
    pub key: String,
    #[serde(flatten)]
    pub section: ContentSection,
    /// Required by the page layout: cannot be hidden or deleted.
    pub required: bool,
}

fn section_view(content: &PageContent, key: &str) -> Option<SectionView> {
    let section = content.sections.get(key)?.clone();
    let required = layout::find(&content.layout).is_some_and(|l| l.is_required(key));
    Some(SectionView { key: key.to_owned(), section, required })
}

fn sections_in_order(content: &PageContent) -> Vec<SectionView> {
    sections::display_order(content)
        .iter()
        .filter_map(|key| section_view(content, key))
        .collect()
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub moved: bool,
    pub order: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct VisibilityResponse {
    pub visible: bool,
}

#[derive(Debug, Serialize)]
pub struct FieldCommitResponse {
    pub changed: bool,
    pub section: SectionView,
}

#[derive(Debug, Serialize)]
pub struct RevertResponse {
    pub reverted: bool,
    pub settings: PageSettings,
}

#[derive(Debug, Serialize)]
pub struct ValidationResponse {
    pub valid: bool,
    pub issues: Vec<ValidationIssue>,
}

// =============================================================================
// REQUEST SHAPES
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct OpenSessionQuery {
    pub layout: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddSectionBody {
    pub template_id: String,
    #[serde(default)]
    pub after_order: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct FieldCommitBody {
    pub value: String,
}

// =============================================================================
// SESSION
// =============================================================================

/// `POST /api/pages/:id/session`
///
/// Open (or rejoin) an editor session.
pub async fn open_session(
    State(state): State<AppState>,
    Path(page_id): Path<Uuid>,
    Query(query): Query<OpenSessionQuery>,
) -> ApiResult<SessionInfo> {
    let info = session::open_session(&state, page_id, query.layout.as_deref())
        .await
        .map_err(session_error)?;
    Ok(Json(info))
}

/// `DELETE /api/pages/:id/session`
///
/// Close the session, cancelling pending saves.
pub async fn close_session(State(state): State<AppState>, Path(page_id): Path<Uuid>) -> ApiResult<SessionInfo> {
    let info = session::close_session(&state, page_id)
        .await
        .map_err(session_error)?;
    Ok(Json(info))
}

/// `GET /api/pages/:id/content`
///
/// The full working document.
pub async fn get_content(State(state): State<AppState>, Path(page_id): Path<Uuid>) -> ApiResult<PageContent> {
    let content = session::read(&state, page_id, |doc| doc.content.clone())
        .await
        .map_err(session_error)?;
    Ok(Json(content))
}

// =============================================================================
// SECTIONS
// =============================================================================

/// `GET /api/pages/:id/sections`
///
/// Sections in display order.
pub async fn list_sections(State(state): State<AppState>, Path(page_id): Path<Uuid>) -> ApiResult<Vec<SectionView>> {
    let views = session::read(&state, page_id, |doc| sections_in_order(&doc.content))
        .await
        .map_err(session_error)?;
    Ok(Json(views))
}

/// `POST /api/pages/:id/sections`
///
/// Add a section from a template.
pub async fn add_section(
    State(state): State<AppState>,
    Path(page_id): Path<Uuid>,
    Json(body): Json<AddSectionBody>,
) -> Result<(StatusCode, Json<SectionView>), ApiError> {
    let view = session::edit(&state, page_id, |doc| {
        let key = sections::add_section(&mut doc.content, &body.template_id, body.after_order)?;
        view_or_missing(&doc.content, &key)
    })
    .await
    .map_err(session_error)?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// `PATCH /api/pages/:id/sections/:key`
///
/// Merge a partial data update.
pub async fn patch_section(
    State(state): State<AppState>,
    Path((page_id, key)): Path<(Uuid, String)>,
    Json(patch): Json<Map<String, Value>>,
) -> ApiResult<SectionView> {
    let view = session::edit(&state, page_id, |doc| {
        sections::update_section_data(&mut doc.content, &key, &patch)?;
        view_or_missing(&doc.content, &key)
    })
    .await
    .map_err(session_error)?;
    Ok(Json(view))
}

/// `DELETE /api/pages/:id/sections/:key`.
pub async fn delete_section(
    State(state): State<AppState>,
    Path((page_id, key)): Path<(Uuid, String)>,
) -> Result<StatusCode, ApiError> {
    session::edit(&state, page_id, |doc| sections::delete_section(&mut doc.content, &key))
        .await
        .map_err(session_error)?;
    Ok(StatusCode::NO_CONTENT)
}

/// `PUT /api/pages/:id/sections/:key/settings`
///
/// Replace (or with `null`, clear) display settings.
pub async fn put_section_settings(
    State(state): State<AppState>,
    Path((page_id, key)): Path<(Uuid, String)>,
    Json(mut settings): Json<Option<SectionSettings>>,
) -> ApiResult<SectionView> {
    if let Some(settings) = settings.as_mut() {
        settings.background_color = settings.background_color.take().map(normalize_color);
    }
    let view = session::edit(&state, page_id, |doc| {
        sections::update_section_settings(&mut doc.content, &key, settings)?;
        view_or_missing(&doc.content, &key)
    })
    .await
    .map_err(session_error)?;
    Ok(Json(view))
}

/// `PUT /api/pages/:id/sections/:key/fields/:field`
///
/// Commit an inline text edit.
///
/// Produces a data patch only when the value differs from the stored one, so
/// an unchanged commit never marks the page dirty.
pub async fn commit_field(
    State(state): State<AppState>,
    Path((page_id, key, field)): Path<(Uuid, String, String)>,
    Json(body): Json<FieldCommitBody>,
) -> ApiResult<FieldCommitResponse> {
    let response = session::edit(&state, page_id, |doc| {
        let current = doc
            .content
            .sections
            .get(&key)
            .ok_or_else(|| SectionError::NotFound(key.clone()))?
            .data
            .text_field(&field)
            .unwrap_or_default();

        let mut inline = InlineEdit::default();
        inline.begin(&field, &current);
        let changed = match inline.commit(&body.value) {
            Some(patch) => {
                sections::update_section_data(&mut doc.content, &key, &patch)?;
                true
            }
            None => false,
        };
        Ok(FieldCommitResponse { changed, section: view_or_missing(&doc.content, &key)? })
    })
    .await
    .map_err(session_error)?;
    Ok(Json(response))
}

/// `POST /api/pages/:id/sections/:key/visibility`
///
/// Toggle visibility.
pub async fn toggle_visibility(
    State(state): State<AppState>,
    Path((page_id, key)): Path<(Uuid, String)>,
) -> ApiResult<VisibilityResponse> {
    let visible = session::edit(&state, page_id, |doc| sections::toggle_visibility(&mut doc.content, &key))
        .await
        .map_err(session_error)?;
    Ok(Json(VisibilityResponse { visible }))
}

/// `POST /api/pages/:id/sections/:key/move-up`.
pub async fn move_up(State(state): State<AppState>, Path((page_id, key)): Path<(Uuid, String)>) -> ApiResult<OrderResponse> {
    let response = session::edit(&state, page_id, |doc| {
        let moved = sections::move_up(&mut doc.content, &key)?;
        Ok(OrderResponse { moved, order: sections::display_order(&doc.content) })
    })
    .await
    .map_err(session_error)?;
    Ok(Json(response))
}

/// `POST /api/pages/:id/sections/:key/move-down`.
pub async fn move_down(
    State(state): State<AppState>,
    Path((page_id, key)): Path<(Uuid, String)>,
) -> ApiResult<OrderResponse> {
    let response = session::edit(&state, page_id, |doc| {
        let moved = sections::move_down(&mut doc.content, &key)?;
        Ok(OrderResponse { moved, order: sections::display_order(&doc.content) })
    })
    .await
    .map_err(session_error)?;
    Ok(Json(response))
}

/// `POST /api/pages/:id/sections/:key/duplicate`.
pub async fn duplicate_section(
    State(state): State<AppState>,
    Path((page_id, key)): Path<(Uuid, String)>,
) -> Result<(StatusCode, Json<SectionView>), ApiError> {
    let view = session::edit(&state, page_id, |doc| {
        let new_key = sections::duplicate_section(&mut doc.content, &key)?;
        view_or_missing(&doc.content, &new_key)
    })
    .await
    .map_err(session_error)?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// `POST /api/pages/:id/sections/:key/items/:field`
///
/// Add, remove or move a list item.
pub async fn edit_items(
    State(state): State<AppState>,
    Path((page_id, key, field)): Path<(Uuid, String, String)>,
    Json(op): Json<ItemOp>,
) -> ApiResult<SectionView> {
    let view = session::edit(&state, page_id, |doc| {
        sections::edit_items(&mut doc.content, &key, &field, op)?;
        view_or_missing(&doc.content, &key)
    })
    .await
    .map_err(session_error)?;
    Ok(Json(view))
}

/// `POST /api/pages/:id/sections/reindex`
///
/// Renumber orders `1..=n`.
pub async fn reindex(State(state): State<AppState>, Path(page_id): Path<Uuid>) -> ApiResult<Vec<SectionView>> {
    let views = session::edit(&state, page_id, |doc| {
        sections::reindex(&mut doc.content);
        Ok(sections_in_order(&doc.content))
    })
    .await
    .map_err(session_error)?;
    Ok(Json(views))
}

/// Canonical `#RRGGBB` for valid hex input; anything else is kept so
/// validation can report it.
fn normalize_color(raw: String) -> String {
    color::normalize(&raw).unwrap_or(raw)
}

fn view_or_missing(content: &PageContent, key: &str) -> Result<SectionView, SectionError> {
    section_view(content, key).ok_or_else(|| SectionError::NotFound(key.to_owned()))
}

// =============================================================================
// PAGE SETTINGS
// =============================================================================

/// `PUT /api/pages/:id/settings`
///
/// Replace page settings, recording the old ones.
pub async fn put_settings(
    State(state): State<AppState>,
    Path(page_id): Path<Uuid>,
    Json(mut settings): Json<PageSettings>,
) -> ApiResult<PageSettings> {
    settings.theme_color = settings.theme_color.take().map(normalize_color);
    let settings = session::edit(&state, page_id, |doc| {
        if doc.content.settings != settings {
            doc.replace_settings(settings);
        }
        Ok(doc.content.settings.clone())
    })
    .await
    .map_err(session_error)?;
    Ok(Json(settings))
}

/// `POST /api/pages/:id/settings/revert`
///
/// Restore the previous settings.
pub async fn revert_settings(State(state): State<AppState>, Path(page_id): Path<Uuid>) -> ApiResult<RevertResponse> {
    let response = session::edit(&state, page_id, |doc| {
        let reverted = doc.revert_settings();
        Ok(RevertResponse { reverted, settings: doc.content.settings.clone() })
    })
    .await
    .map_err(session_error)?;
    Ok(Json(response))
}

/// `GET /api/pages/:id/settings/history`
///
/// Replaced settings, newest first.
pub async fn settings_history(
    State(state): State<AppState>,
    Path(page_id): Path<Uuid>,
) -> ApiResult<Vec<SettingsSnapshot>> {
    let history: Vec<SettingsSnapshot> = session::read(&state, page_id, |doc| doc.history.iter().cloned().collect())
        .await
        .map_err(session_error)?;
    Ok(Json(history))
}

// =============================================================================
// VALIDATION & SAVE STATUS
// =============================================================================

/// `GET /api/pages/:id/validation`.
pub async fn validation(State(state): State<AppState>, Path(page_id): Path<Uuid>) -> ApiResult<ValidationResponse> {
    let issues = session::read(&state, page_id, |doc| validate::validate(&doc.content))
        .await
        .map_err(session_error)?;
    Ok(Json(ValidationResponse { valid: issues.is_empty(), issues }))
}

/// `GET /api/pages/:id/save-status`.
pub async fn save_status(State(state): State<AppState>, Path(page_id): Path<Uuid>) -> ApiResult<SaveStatus> {
    let status = session::save_status(&state, page_id)
        .await
        .map_err(session_error)?;
    Ok(Json(status))
}

/// `POST /api/pages/:id/save/retry`
///
/// Manual retry after a failed save.
pub async fn retry_save(State(state): State<AppState>, Path(page_id): Path<Uuid>) -> ApiResult<SaveStatus> {
    let status = session::retry_save(&state, page_id)
        .await
        .map_err(session_error)?;
    Ok(Json(status))
}

// =============================================================================
// ERROR MAPPING
// =============================================================================

pub(crate) fn session_error(err: SessionError) -> ApiError {
    let status = match &err {
        SessionError::NotOpen(_) => StatusCode::NOT_FOUND,
        SessionError::UnknownLayout(_) => StatusCode::BAD_REQUEST,
        SessionError::Load { source, .. } => store_error_status(source),
        SessionError::Section(e) => section_error_status(e),
    };
    ApiError::from_error(status, &err)
}

fn section_error_status(err: &SectionError) -> StatusCode {
    match err {
        SectionError::NotFound(_) => StatusCode::NOT_FOUND,
        SectionError::Required(_) => StatusCode::CONFLICT,
        SectionError::UnknownTemplate(_) | SectionError::NotAList(_) | SectionError::ItemIndex { .. } => {
            StatusCode::BAD_REQUEST
        }
        SectionError::Content(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

pub(crate) fn store_error_status(err: &StoreError) -> StatusCode {
    match err {
        StoreError::Response { status: 404, .. } => StatusCode::NOT_FOUND,
        StoreError::Request(_) | StoreError::Response { .. } | StoreError::Parse(_) => StatusCode::BAD_GATEWAY,
        StoreError::HttpClientBuild(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
#[path = "pages_test.rs"]
mod tests;
