//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the map of open editor sessions, the page store sessions save
//! through, the content API client used by the link selector and uploader,
//! and the loaded configuration. Clone is cheap: every field is an `Arc` or
//! wraps one.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::config::Config;
use crate::services::session::PageSession;
use crate::services::store::{ContentApi, PageStore};

#[derive(Clone)]
pub struct AppState {
    /// Open editor sessions keyed by page id.
    pub sessions: Arc<RwLock<HashMap<Uuid, PageSession>>>,
    pub store: Arc<dyn PageStore>,
    pub api: ContentApi,
    pub config: Arc<Config>,
}

impl AppState {
    #[must_use]
    pub fn new(config: Config, api: ContentApi, store: Arc<dyn PageStore>) -> Self {
        Self { sessions: Arc::new(RwLock::new(HashMap::new())), store, api, config: Arc::new(config) }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
pub mod test_helpers {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use crate::config::{DEFAULT_SETTINGS_HISTORY_LIMIT, DEFAULT_UPLOAD_MAX_BYTES, HttpTimeouts};
    use crate::content::PageContent;
    use crate::services::autosave::AutosaveConfig;
    use crate::services::store::StoreError;

    /// In-memory page store. Missing pages answer 404 like the real API.
    #[derive(Default)]
    pub struct MemoryStore {
        pub pages: Mutex<HashMap<Uuid, PageContent>>,
        pub saves: AtomicUsize,
        pub fail_saves: AtomicBool,
    }

    impl MemoryStore {
        #[must_use]
        pub fn page(&self, page_id: Uuid) -> Option<PageContent> {
            self.pages.lock().unwrap().get(&page_id).cloned()
        }

        pub fn put(&self, page_id: Uuid, content: PageContent) {
            self.pages.lock().unwrap().insert(page_id, content);
        }

        #[must_use]
        pub fn save_count(&self) -> usize {
            self.saves.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl PageStore for MemoryStore {
        async fn load(&self, page_id: Uuid) -> Result<PageContent, StoreError> {
            self.page(page_id)
                .ok_or(StoreError::Response { status: 404, body: "not found".into() })
        }

        async fn save(&self, page_id: Uuid, content: &PageContent) -> Result<(), StoreError> {
            self.saves.fetch_add(1, Ordering::SeqCst);
            if self.fail_saves.load(Ordering::SeqCst) {
                return Err(StoreError::Response { status: 503, body: "unavailable".into() });
            }
            self.put(page_id, content.clone());
            Ok(())
        }
    }

    /// Config pointing at an address nothing listens on.
    #[must_use]
    pub fn test_config() -> Config {
        Config {
            port: 0,
            content_api_url: "http://127.0.0.1:1".into(),
            content_api_token: None,
            upload_max_bytes: DEFAULT_UPLOAD_MAX_BYTES,
            settings_history_limit: DEFAULT_SETTINGS_HISTORY_LIMIT,
            http: HttpTimeouts { request_secs: 1, connect_secs: 1 },
            autosave: AutosaveConfig::default(),
        }
    }

    /// Create a test `AppState` backed by a fresh `MemoryStore`.
    #[must_use]
    pub fn test_app_state() -> (AppState, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::default());
        let config = test_config();
        let api = ContentApi::new(reqwest::Client::new(), config.content_api_url.clone(), None);
        (AppState::new(config, api, store.clone()), store)
    }
}
