//! Editor sessions — one live document and save coordinator per open page.
//!
//! DESIGN
//! ======
//! A session holds the page document behind its own `RwLock` and a handle to
//! the page's `SaveCoordinator`. Every successful mutation bumps `revision`;
//! the document is dirty while `revision > saved_revision`.
//!
//! The coordinator saves through [`SessionSaver`], which snapshots the
//! content and revision under a read lock, writes to the store without
//! holding any lock, then records the snapshot revision as saved. An edit
//! that lands during the write leaves `revision` ahead, so the page stays
//! dirty and the next debounce saves it again.
//!
//! LOCK ORDER
//! ==========
//! `AppState.sessions` before a session's document. The saver only ever
//! takes the document lock.
//!
//! ERROR HANDLING
//! ==============
//! Operations on a page without an open session return `NotOpen`. A load
//! failure other than 404 aborts the open; a 404 starts a new document.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use crate::content::{PageContent, PageSettings, DEFAULT_LAYOUT, layout, validate};
use crate::error::ErrorCode;
use crate::services::autosave::{SaveCoordinator, SaveStatus, SaveTarget};
use crate::services::history::SettingsHistory;
use crate::services::sections::SectionError;
use crate::services::store::{PageStore, StoreError};
use crate::state::AppState;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("no editor session open for page {0}")]
    NotOpen(Uuid),
    #[error("unknown layout: {0}")]
    UnknownLayout(String),
    #[error("failed to load page {page_id}: {source}")]
    Load {
        page_id: Uuid,
        #[source]
        source: StoreError,
    },
    #[error(transparent)]
    Section(#[from] SectionError),
}

impl ErrorCode for SessionError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotOpen(_) => "E_SESSION_NOT_OPEN",
            Self::UnknownLayout(_) => "E_UNKNOWN_LAYOUT",
            Self::Load { source, .. } => source.error_code(),
            Self::Section(e) => e.error_code(),
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Load { source, .. } => source.retryable(),
            _ => false,
        }
    }
}

// =============================================================================
// DOCUMENT
// =============================================================================

/// The live, in-memory copy of one page.
pub struct PageDocument {
    pub content: PageContent,
    /// Incremented on every applied edit.
    pub revision: u64,
    /// Highest revision known to be persisted.
    pub saved_revision: u64,
    pub history: SettingsHistory,
}

impl PageDocument {
    #[must_use]
    pub fn new(content: PageContent, history_limit: usize) -> Self {
        Self { content, revision: 0, saved_revision: 0, history: SettingsHistory::new(history_limit) }
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.revision > self.saved_revision
    }

    /// Replace the page settings, remembering the previous value.
    pub fn replace_settings(&mut self, settings: PageSettings) {
        let previous = std::mem::replace(&mut self.content.settings, settings);
        self.history.push(previous);
    }

    /// Restore the most recently replaced settings. Returns `false` when the
    /// history is empty.
    pub fn revert_settings(&mut self) -> bool {
        let Some(previous) = self.history.pop() else {
            return false;
        };
        self.content.settings = previous;
        true
    }
}

pub type SharedDocument = Arc<RwLock<PageDocument>>;

// =============================================================================
// SAVE TARGET
// =============================================================================

/// Saves one session's document through the page store.
pub struct SessionSaver {
    page_id: Uuid,
    document: SharedDocument,
    store: Arc<dyn PageStore>,
}

impl SessionSaver {
    #[must_use]
    pub fn new(page_id: Uuid, document: SharedDocument, store: Arc<dyn PageStore>) -> Self {
        Self { page_id, document, store }
    }
}

#[async_trait::async_trait]
impl SaveTarget for SessionSaver {
    type Error = StoreError;

    async fn is_dirty(&self) -> bool {
        self.document.read().await.is_dirty()
    }

    async fn is_valid(&self) -> bool {
        validate::is_valid(&self.document.read().await.content)
    }

    async fn save(&self) -> Result<(), StoreError> {
        let (content, revision) = {
            let doc = self.document.read().await;
            (doc.content.clone(), doc.revision)
        };

        self.store.save(self.page_id, &content).await?;

        let mut doc = self.document.write().await;
        if revision > doc.saved_revision {
            doc.saved_revision = revision;
        }
        Ok(())
    }
}

// =============================================================================
// SESSION
// =============================================================================

pub struct PageSession {
    pub document: SharedDocument,
    pub coordinator: SaveCoordinator,
}

/// Snapshot of a session for API responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub page_id: Uuid,
    pub layout: String,
    pub revision: u64,
    pub saved_revision: u64,
    pub dirty: bool,
    pub save: SaveStatus,
}

impl PageSession {
    async fn info(&self, page_id: Uuid) -> SessionInfo {
        let doc = self.document.read().await;
        SessionInfo {
            page_id,
            layout: doc.content.layout.clone(),
            revision: doc.revision,
            saved_revision: doc.saved_revision,
            dirty: doc.is_dirty(),
            save: self.coordinator.status(),
        }
    }
}

// =============================================================================
// LIFECYCLE
// =============================================================================

/// Open an editor session for `page_id`, loading its content from the store.
///
/// Idempotent: an already-open session is returned as is. When the store has
/// no content for the page, a new document with `layout` (default `landing`)
/// is started.
///
/// # Errors
///
/// Returns `UnknownLayout` for a layout id outside the catalog and `Load`
/// when the store fails for any reason other than 404.
pub async fn open_session(state: &AppState, page_id: Uuid, layout_id: Option<&str>) -> Result<SessionInfo, SessionError> {
    if let Some(id) = layout_id {
        if layout::find(id).is_none() {
            return Err(SessionError::UnknownLayout(id.to_owned()));
        }
    }

    {
        let sessions = state.sessions.read().await;
        if let Some(session) = sessions.get(&page_id) {
            return Ok(session.info(page_id).await);
        }
    }

    let content = match state.store.load(page_id).await {
        Ok(content) => content,
        Err(e) if e.is_not_found() => {
            info!(%page_id, "no stored content; starting new document");
            PageContent::new(layout_id.unwrap_or(DEFAULT_LAYOUT))
        }
        Err(source) => {
            warn!(%page_id, error = %source, "page load failed");
            return Err(SessionError::Load { page_id, source });
        }
    };

    let mut sessions = state.sessions.write().await;
    // Another request may have opened the page while we were loading.
    if let Some(session) = sessions.get(&page_id) {
        return Ok(session.info(page_id).await);
    }

    let sections = content.sections.len();
    let document = Arc::new(RwLock::new(PageDocument::new(content, state.config.settings_history_limit)));
    let saver = SessionSaver::new(page_id, document.clone(), state.store.clone());
    let coordinator = SaveCoordinator::spawn(saver, state.config.autosave, page_id.to_string());
    let session = PageSession { document, coordinator };
    let info = session.info(page_id).await;
    sessions.insert(page_id, session);

    info!(%page_id, sections, "editor session opened");
    Ok(info)
}

/// Close the session for `page_id`. Pending save timers are cancelled; a
/// save already in flight finishes first.
///
/// # Errors
///
/// Returns `NotOpen` if no session exists.
pub async fn close_session(state: &AppState, page_id: Uuid) -> Result<SessionInfo, SessionError> {
    let session = state
        .sessions
        .write()
        .await
        .remove(&page_id)
        .ok_or(SessionError::NotOpen(page_id))?;

    let PageSession { document, coordinator } = session;
    let status = coordinator.subscribe();
    coordinator.shutdown().await;
    let save = status.borrow().clone();

    let doc = document.read().await;
    let info = SessionInfo {
        page_id,
        layout: doc.content.layout.clone(),
        revision: doc.revision,
        saved_revision: doc.saved_revision,
        dirty: doc.is_dirty(),
        save,
    };
    if info.dirty {
        warn!(%page_id, revision = doc.revision, saved_revision = doc.saved_revision, "session closed with unsaved edits");
    } else {
        info!(%page_id, "editor session closed");
    }
    Ok(info)
}

// =============================================================================
// ACCESS
// =============================================================================

/// Run `f` against the current document.
///
/// # Errors
///
/// Returns `NotOpen` if no session exists.
pub async fn read<R>(state: &AppState, page_id: Uuid, f: impl FnOnce(&PageDocument) -> R) -> Result<R, SessionError> {
    let sessions = state.sessions.read().await;
    let session = sessions.get(&page_id).ok_or(SessionError::NotOpen(page_id))?;
    let doc = session.document.read().await;
    Ok(f(&doc))
}

/// Apply a mutation to the document. When it succeeds and the content
/// actually changed, the revision is bumped and the coordinator notified.
///
/// # Errors
///
/// Returns `NotOpen` if no session exists, or the mutation's own error (the
/// document is left as the mutation left it, which for every section
/// operation means unchanged).
pub async fn edit<R>(
    state: &AppState,
    page_id: Uuid,
    f: impl FnOnce(&mut PageDocument) -> Result<R, SectionError>,
) -> Result<R, SessionError> {
    let sessions = state.sessions.read().await;
    let session = sessions.get(&page_id).ok_or(SessionError::NotOpen(page_id))?;

    let changed;
    let out = {
        let mut doc = session.document.write().await;
        let before = doc.content.clone();
        let out = f(&mut doc)?;
        changed = doc.content != before;
        if changed {
            doc.revision += 1;
        }
        out
    };

    if changed {
        session.coordinator.notify_edit();
    }
    Ok(out)
}

/// Current save status for the page.
///
/// # Errors
///
/// Returns `NotOpen` if no session exists.
pub async fn save_status(state: &AppState, page_id: Uuid) -> Result<SaveStatus, SessionError> {
    let sessions = state.sessions.read().await;
    let session = sessions.get(&page_id).ok_or(SessionError::NotOpen(page_id))?;
    Ok(session.coordinator.status())
}

/// Ask the coordinator for a manual retry. Ignored unless the last save failed.
///
/// # Errors
///
/// Returns `NotOpen` if no session exists.
pub async fn retry_save(state: &AppState, page_id: Uuid) -> Result<SaveStatus, SessionError> {
    let sessions = state.sessions.read().await;
    let session = sessions.get(&page_id).ok_or(SessionError::NotOpen(page_id))?;
    session.coordinator.retry();
    Ok(session.coordinator.status())
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
