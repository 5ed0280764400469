//! Picker and catalog routes: layouts, templates, icons, colors, links,
//! uploads, and the format-command pre-flight.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::content::color::{PALETTE, Swatch};
use crate::content::layout::{LAYOUTS, Layout};
use crate::content::rich_text::{self, FormatCommand};
use crate::content::template::{TEMPLATES, TemplateSummary};
use crate::error::ApiError;
use crate::routes::pages::store_error_status;
use crate::services::icons::{self, Icon};
use crate::services::links::{self, LinkError, LinkOption};
use crate::services::upload::{self, UploadError, UploadedImage};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct IconQuery {
    pub q: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct IconResponse {
    pub categories: Vec<&'static str>,
    pub icons: Vec<&'static Icon>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LinkQuery {
    pub q: Option<String>,
    #[serde(default)]
    pub published_only: bool,
}

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    pub file_name: String,
}

/// `GET /api/layouts`.
pub async fn list_layouts() -> Json<&'static [Layout]> {
    Json(LAYOUTS)
}

/// `GET /api/templates`.
pub async fn list_templates() -> Json<Vec<TemplateSummary>> {
    Json(TEMPLATES.iter().map(|t| t.summary()).collect())
}

/// `GET /api/icons?q=&category=`.
pub async fn search_icons(Query(query): Query<IconQuery>) -> Json<IconResponse> {
    Json(IconResponse {
        categories: icons::categories(),
        icons: icons::search(query.q.as_deref(), query.category.as_deref()),
    })
}

/// `GET /api/colors`
///
/// Preset palette for the color picker.
pub async fn list_colors() -> Json<&'static [Swatch]> {
    Json(PALETTE)
}

/// `GET /api/links?q=&published_only=`
///
/// Internal pages as link targets.
pub async fn list_links(State(state): State<AppState>, Query(query): Query<LinkQuery>) -> Result<Json<Vec<LinkOption>>, ApiError> {
    let pages = links::fetch_pages(&state.api).await.map_err(|e| {
        warn!(error = %e, "page directory fetch failed");
        link_error(e)
    })?;
    Ok(Json(links::link_options(&pages, query.q.as_deref(), query.published_only)))
}

/// `POST /api/uploads?file_name=`
///
/// Raw image body, type from `Content-Type`.
pub async fn upload_image(
    State(state): State<AppState>,
    Query(query): Query<UploadQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<UploadedImage>), ApiError> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let image = upload::upload_image(&state.api, &query.file_name, content_type, body.to_vec(), state.config.upload_max_bytes)
        .await
        .map_err(upload_error)?;
    Ok((StatusCode::CREATED, Json(image)))
}

/// `POST /api/format/check`
///
/// Argument check before the client hands a
/// command to its editor engine.
pub async fn check_format(Json(command): Json<FormatCommand>) -> Result<StatusCode, ApiError> {
    rich_text::check_command(&command).map_err(|e| ApiError::from_error(StatusCode::BAD_REQUEST, &e))?;
    Ok(StatusCode::NO_CONTENT)
}

fn link_error(err: LinkError) -> ApiError {
    let status = match &err {
        LinkError::Rejected(_) => StatusCode::BAD_GATEWAY,
        LinkError::Api(e) => store_error_status(e),
    };
    ApiError::from_error(status, &err)
}

fn upload_error(err: UploadError) -> ApiError {
    let status = match &err {
        UploadError::Empty => StatusCode::BAD_REQUEST,
        UploadError::UnsupportedType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        UploadError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        UploadError::Presign(_) | UploadError::Transfer { .. } => StatusCode::BAD_GATEWAY,
        UploadError::Api(e) => store_error_status(e),
    };
    ApiError::from_error(status, &err)
}
