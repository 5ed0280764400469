//! Page-link selector: internal pages as link targets.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ErrorCode;
use crate::services::store::{ContentApi, StoreError};

const PAGES_PATH: &str = "/api/pages";

#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    #[error("page directory rejected the request: {0}")]
    Rejected(String),
    #[error(transparent)]
    Api(#[from] StoreError),
}

impl ErrorCode for LinkError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Rejected(_) => "E_LINKS_REJECTED",
            Self::Api(e) => e.error_code(),
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Api(e) if e.retryable())
    }
}

/// One page as listed by the hosting application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRecord {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub is_published: bool,
}

#[derive(Debug, Deserialize)]
struct PagesResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Vec<PageRecord>,
    error: Option<String>,
}

/// A selectable link target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkOption {
    pub page_id: Uuid,
    pub label: String,
    pub href: String,
    pub published: bool,
}

/// `GET {CONTENT_API_URL}/api/pages`.
///
/// # Errors
///
/// Returns `Api` on transport or status errors and `Rejected` when the
/// response reports `success: false`.
pub async fn fetch_pages(api: &ContentApi) -> Result<Vec<PageRecord>, LinkError> {
    let response: PagesResponse = api.get_json(PAGES_PATH).await?;
    if !response.success {
        return Err(LinkError::Rejected(response.error.unwrap_or_else(|| "unknown error".to_owned())));
    }
    Ok(response.data)
}

/// Path a page is served at. The slug `index` (or an empty slug) is the site root.
#[must_use]
pub fn page_href(slug: &str) -> String {
    let slug = slug.trim_matches('/');
    if slug.is_empty() || slug == "index" {
        "/".to_owned()
    } else {
        format!("/{slug}")
    }
}

/// Turn page records into link options, matching `query` against title and
/// slug (case-insensitive) and optionally dropping drafts. Sorted by label.
#[must_use]
pub fn link_options(pages: &[PageRecord], query: Option<&str>, published_only: bool) -> Vec<LinkOption> {
    let needle = query
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_lowercase);

    let mut options: Vec<LinkOption> = pages
        .iter()
        .filter(|page| !published_only || page.is_published)
        .filter(|page| {
            needle.as_deref().map_or(true, |needle| {
                page.title.to_lowercase().contains(needle) || page.slug.to_lowercase().contains(needle)
            })
        })
        .map(|page| LinkOption {
            page_id: page.id,
            label: if page.title.trim().is_empty() { page.slug.clone() } else { page.title.clone() },
            href: page_href(&page.slug),
            published: page.is_published,
        })
        .collect();
    options.sort_by(|a, b| a.label.to_lowercase().cmp(&b.label.to_lowercase()));
    options
}
