//! Save coordinator — debounced auto-save with bounded retry.
//!
//! DESIGN
//! ======
//! One tokio task per open page owns every timer. Edits and manual retries
//! arrive as commands over an unbounded channel; status leaves through a
//! `watch` channel so readers always see the latest value without blocking
//! the task. The task awaits `save()` inline, which is what guarantees at
//! most one save in flight: commands that arrive meanwhile queue up and are
//! handled once the attempt settles.
//!
//! STATES
//! ======
//! `idle → saving` when the debounce timer fires and the target is dirty and
//! valid. `saving → saved | failed` on the save outcome. `failed → saving`
//! after `min(base * 2^retry_count, cap)` while `retry_count < max_retries`,
//! or immediately on manual retry (which zeroes the counter first).
//! `saved → idle` after a short display delay.
//!
//! ERROR HANDLING
//! ==============
//! A save error is logged and stored as a display string; it is never
//! propagated. The target keeps reporting dirty until a save succeeds, so a
//! failure can never drop an edit.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::env_parse;

const DEFAULT_DEBOUNCE_MS: u64 = 2000;
const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_RETRY_CAP_MS: u64 = 10_000;
const DEFAULT_SAVED_DISPLAY_MS: u64 = 1500;

// =============================================================================
// CONFIG
// =============================================================================

/// Timing knobs for the coordinator, loaded from environment variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutosaveConfig {
    /// Quiet period after the latest edit before saving.
    pub debounce: Duration,
    /// Automatic retries allowed before waiting for a manual retry.
    pub max_retries: u32,
    /// Base delay for exponential retry back-off.
    pub retry_base: Duration,
    /// Upper bound on any single back-off delay.
    pub retry_cap: Duration,
    /// How long `saved` is shown before dropping back to `idle`.
    pub saved_display: Duration,
}

impl AutosaveConfig {
    #[must_use]
    pub fn from_env() -> Self {
        let debounce_ms = env_parse("AUTOSAVE_DEBOUNCE_MS", DEFAULT_DEBOUNCE_MS);
        Self {
            debounce: Duration::from_millis(debounce_ms),
            max_retries: env_parse("AUTOSAVE_MAX_RETRIES", DEFAULT_MAX_RETRIES),
            retry_base: Duration::from_millis(env_parse("AUTOSAVE_RETRY_BASE_MS", debounce_ms)),
            retry_cap: Duration::from_millis(env_parse("AUTOSAVE_RETRY_CAP_MS", DEFAULT_RETRY_CAP_MS)),
            saved_display: Duration::from_millis(env_parse("AUTOSAVE_SAVED_DISPLAY_MS", DEFAULT_SAVED_DISPLAY_MS)),
        }
    }

    /// Delay before the automatic retry that follows failure number `retry_count`.
    #[must_use]
    pub fn backoff_delay(&self, retry_count: u32) -> Duration {
        self.retry_base
            .saturating_mul(2u32.saturating_pow(retry_count))
            .min(self.retry_cap)
    }
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            max_retries: DEFAULT_MAX_RETRIES,
            retry_base: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            retry_cap: Duration::from_millis(DEFAULT_RETRY_CAP_MS),
            saved_display: Duration::from_millis(DEFAULT_SAVED_DISPLAY_MS),
        }
    }
}

// =============================================================================
// STATUS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveState {
    Idle,
    Saving,
    Saved,
    Failed,
}

/// Client-facing save status. Ephemeral; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveStatus {
    pub status: SaveState,
    /// Unix millis of the last successful save.
    pub last_saved: Option<i64>,
    pub retry_count: u32,
    pub error: Option<String>,
}

impl SaveStatus {
    fn idle() -> Self {
        Self { status: SaveState::Idle, last_saved: None, retry_count: 0, error: None }
    }
}

// =============================================================================
// SAVE TARGET
// =============================================================================

/// What the coordinator saves. Supplied by the session that owns the content.
#[async_trait::async_trait]
pub trait SaveTarget: Send + Sync + 'static {
    type Error: std::fmt::Display + Send;

    /// `true` while unsaved edits exist.
    async fn is_dirty(&self) -> bool;
    /// `true` while the content passes validation.
    async fn is_valid(&self) -> bool;
    async fn save(&self) -> Result<(), Self::Error>;
}

#[async_trait::async_trait]
impl<T: SaveTarget> SaveTarget for Arc<T> {
    type Error = T::Error;

    async fn is_dirty(&self) -> bool {
        self.as_ref().is_dirty().await
    }

    async fn is_valid(&self) -> bool {
        self.as_ref().is_valid().await
    }

    async fn save(&self) -> Result<(), Self::Error> {
        self.as_ref().save().await
    }
}

// =============================================================================
// HANDLE
// =============================================================================

#[derive(Debug)]
enum Command {
    Edit,
    Retry,
    Shutdown,
}

/// Handle to a running coordinator task. Dropping it stops the task and
/// cancels any pending timer.
pub struct SaveCoordinator {
    commands: mpsc::UnboundedSender<Command>,
    status: watch::Receiver<SaveStatus>,
    task: JoinHandle<()>,
}

impl SaveCoordinator {
    /// Spawn the coordinator task for `target`. `label` identifies it in logs.
    #[must_use]
    pub fn spawn<T: SaveTarget>(target: T, config: AutosaveConfig, label: impl Into<String>) -> Self {
        let (commands, rx) = mpsc::unbounded_channel();
        let (status_tx, status) = watch::channel(SaveStatus::idle());
        let worker = Worker {
            target,
            config,
            label: label.into(),
            status_tx,
            current: SaveStatus::idle(),
            pending: None,
            saved_reset: None,
        };
        let task = tokio::spawn(worker.run(rx));
        Self { commands, status, task }
    }

    /// Record that the content changed. Restarts the debounce window.
    pub fn notify_edit(&self) {
        let _ = self.commands.send(Command::Edit);
    }

    /// Manual retry after a failure. Ignored unless the status is `failed`.
    pub fn retry(&self) {
        let _ = self.commands.send(Command::Retry);
    }

    #[must_use]
    pub fn status(&self) -> SaveStatus {
        self.status.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SaveStatus> {
        self.status.clone()
    }

    /// Stop the task, dropping any pending timer, and wait for it to exit.
    /// A save already in flight finishes first.
    pub async fn shutdown(mut self) {
        let _ = self.commands.send(Command::Shutdown);
        let _ = (&mut self.task).await;
    }
}

impl Drop for SaveCoordinator {
    fn drop(&mut self) {
        self.task.abort();
    }
}

// =============================================================================
// WORKER
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    Debounce,
    Backoff,
    Manual,
}

struct Pending {
    at: Instant,
    trigger: Trigger,
}

struct Worker<T> {
    target: T,
    config: AutosaveConfig,
    label: String,
    status_tx: watch::Sender<SaveStatus>,
    current: SaveStatus,
    /// The single save timer: debounce or back-off, never both.
    pending: Option<Pending>,
    /// When a `saved` status drops back to `idle`.
    saved_reset: Option<Instant>,
}

impl<T: SaveTarget> Worker<T> {
    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<Command>) {
        loop {
            let pending_at = self.pending.as_ref().map(|p| p.at);
            let reset_at = self.saved_reset;

            tokio::select! {
                cmd = rx.recv() => match cmd {
                    Some(Command::Edit) => self.on_edit(),
                    Some(Command::Retry) => self.on_manual_retry().await,
                    Some(Command::Shutdown) | None => break,
                },
                () = sleep_until(pending_at), if pending_at.is_some() => {
                    if let Some(pending) = self.pending.take() {
                        self.fire(pending.trigger).await;
                    }
                }
                () = sleep_until(reset_at), if reset_at.is_some() => {
                    self.saved_reset = None;
                    if self.current.status == SaveState::Saved {
                        self.current.status = SaveState::Idle;
                        self.publish();
                    }
                }
            }
        }
        debug!(page = %self.label, "autosave coordinator stopped");
    }

    fn on_edit(&mut self) {
        // Trailing debounce: every edit restarts the full window, replacing a
        // pending back-off too. The retry counter is left alone.
        self.pending = Some(Pending { at: Instant::now() + self.config.debounce, trigger: Trigger::Debounce });
    }

    async fn on_manual_retry(&mut self) {
        if self.current.status != SaveState::Failed {
            debug!(page = %self.label, status = ?self.current.status, "manual retry ignored");
            return;
        }
        self.pending = None;
        self.current.retry_count = 0;
        self.publish();
        self.fire(Trigger::Manual).await;
    }

    async fn fire(&mut self, trigger: Trigger) {
        let dirty = self.target.is_dirty().await;
        if !dirty {
            debug!(page = %self.label, ?trigger, "save skipped: nothing to save");
            if self.current.status == SaveState::Failed {
                self.current = SaveStatus { last_saved: self.current.last_saved, ..SaveStatus::idle() };
                self.publish();
            }
            return;
        }
        if !self.target.is_valid().await {
            debug!(page = %self.label, ?trigger, "save skipped: content invalid");
            return;
        }
        self.attempt(trigger).await;
    }

    async fn attempt(&mut self, trigger: Trigger) {
        self.current.status = SaveState::Saving;
        self.saved_reset = None;
        self.publish();
        debug!(page = %self.label, ?trigger, retry_count = self.current.retry_count, "saving");

        match self.target.save().await {
            Ok(()) => {
                self.current = SaveStatus { status: SaveState::Saved, last_saved: Some(now_ms()), retry_count: 0, error: None };
                self.saved_reset = Some(Instant::now() + self.config.saved_display);
                info!(page = %self.label, "saved");
            }
            Err(e) => {
                self.current.status = SaveState::Failed;
                self.current.retry_count = self.current.retry_count.saturating_add(1);
                self.current.error = Some(e.to_string());
                let retry_count = self.current.retry_count;

                if retry_count < self.config.max_retries {
                    let delay = self.config.backoff_delay(retry_count);
                    self.pending = Some(Pending { at: Instant::now() + delay, trigger: Trigger::Backoff });
                    #[allow(clippy::cast_possible_truncation)]
                    let delay_ms = delay.as_millis() as u64;
                    warn!(page = %self.label, error = %e, retry_count, delay_ms, "save failed; retry scheduled");
                } else {
                    warn!(
                        page = %self.label,
                        error = %e,
                        retry_count,
                        "save failed; automatic retries exhausted"
                    );
                }
            }
        }
        self.publish();
    }

    fn publish(&self) {
        self.status_tx.send_replace(self.current.clone());
    }
}

async fn sleep_until(at: Option<Instant>) {
    match at {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

fn now_ms() -> i64 {
    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(dur.as_millis()).unwrap_or(0)
}

#[cfg(test)]
#[path = "autosave_test.rs"]
mod tests;
