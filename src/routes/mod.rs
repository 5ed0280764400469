//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! This module binds the editor's JSON API under a single Axum router. The
//! browser front-end calls these endpoints; page content itself is loaded
//! from and saved to the hosting application's content API, never served
//! from here beyond the working copy of an open session.

pub mod catalog;
pub mod pages;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::routing::{get, patch, post, put};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Headroom over the upload limit so oversized images reach the handler and
/// get the structured error instead of a bare 413.
const BODY_LIMIT_SLACK: usize = 64 * 1024;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let upload_limit = usize::try_from(state.config.upload_max_bytes)
        .unwrap_or(usize::MAX)
        .saturating_add(BODY_LIMIT_SLACK);

    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/layouts", get(catalog::list_layouts))
        .route("/api/templates", get(catalog::list_templates))
        .route("/api/icons", get(catalog::search_icons))
        .route("/api/colors", get(catalog::list_colors))
        .route("/api/links", get(catalog::list_links))
        .route("/api/format/check", post(catalog::check_format))
        .route(
            "/api/uploads",
            post(catalog::upload_image).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            "/api/pages/{id}/session",
            post(pages::open_session).delete(pages::close_session),
        )
        .route("/api/pages/{id}/content", get(pages::get_content))
        .route(
            "/api/pages/{id}/sections",
            get(pages::list_sections).post(pages::add_section),
        )
        .route("/api/pages/{id}/sections/reindex", post(pages::reindex))
        .route(
            "/api/pages/{id}/sections/{key}",
            patch(pages::patch_section).delete(pages::delete_section),
        )
        .route("/api/pages/{id}/sections/{key}/settings", put(pages::put_section_settings))
        .route("/api/pages/{id}/sections/{key}/fields/{field}", put(pages::commit_field))
        .route("/api/pages/{id}/sections/{key}/items/{field}", post(pages::edit_items))
        .route("/api/pages/{id}/sections/{key}/visibility", post(pages::toggle_visibility))
        .route("/api/pages/{id}/sections/{key}/move-up", post(pages::move_up))
        .route("/api/pages/{id}/sections/{key}/move-down", post(pages::move_down))
        .route("/api/pages/{id}/sections/{key}/duplicate", post(pages::duplicate_section))
        .route("/api/pages/{id}/settings", put(pages::put_settings))
        .route("/api/pages/{id}/settings/revert", post(pages::revert_settings))
        .route("/api/pages/{id}/settings/history", get(pages::settings_history))
        .route("/api/pages/{id}/validation", get(pages::validation))
        .route("/api/pages/{id}/save-status", get(pages::save_status))
        .route("/api/pages/{id}/save/retry", post(pages::retry_save))
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_helpers::test_app_state;

    #[tokio::test]
    async fn router_builds_without_route_conflicts() {
        let (state, _store) = test_app_state();
        let _router = app(state);
    }

    #[tokio::test]
    async fn healthz_is_ok() {
        assert_eq!(healthz().await, StatusCode::OK);
    }
}
