//! Domain services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own editing rules, save scheduling and calls to the
//! hosting application so route handlers stay focused on request parsing and
//! status mapping. `sections` is pure; `session` owns the live documents;
//! `autosave` owns the timers.

pub mod autosave;
pub mod history;
pub mod icons;
pub mod links;
pub mod sections;
pub mod session;
pub mod store;
pub mod upload;
