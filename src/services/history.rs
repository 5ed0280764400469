//! Settings history: bounded list of replaced page settings for simple undo.
//!
//! Each `PUT /settings` pushes the settings it replaces. Reverting pops the
//! newest entry back into the document. When the list is full the oldest
//! entry is dropped.

use std::collections::VecDeque;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

use crate::content::PageSettings;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsSnapshot {
    pub settings: PageSettings,
    /// Unix millis when these settings were replaced.
    pub replaced_at: i64,
}

#[derive(Debug, Clone)]
pub struct SettingsHistory {
    limit: usize,
    entries: VecDeque<SettingsSnapshot>,
}

impl SettingsHistory {
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self { limit, entries: VecDeque::with_capacity(limit.min(64)) }
    }

    /// Record settings that are about to be replaced.
    pub fn push(&mut self, previous: PageSettings) {
        if self.limit == 0 {
            return;
        }
        while self.entries.len() >= self.limit {
            self.entries.pop_front();
        }
        self.entries
            .push_back(SettingsSnapshot { settings: previous, replaced_at: now_ms() });
    }

    /// Remove and return the newest recorded settings.
    pub fn pop(&mut self) -> Option<PageSettings> {
        self.entries.pop_back().map(|snapshot| snapshot.settings)
    }

    /// Entries newest first.
    pub fn iter(&self) -> impl Iterator<Item = &SettingsSnapshot> {
        self.entries.iter().rev()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn now_ms() -> i64 {
    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(dur.as_millis()).unwrap_or(0)
}
