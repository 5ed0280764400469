//! Rich-text formatting commands and inline (click-to-edit) field editing.
//!
//! DESIGN
//! ======
//! The rich-text engine is external and runs in the browser. `RichTextEngine`
//! is the contract a binding to it implements: this module validates command
//! arguments, forwards them, and derives the floating toolbar from the
//! engine's selection state. The server itself only uses `check_command`. Inline editing is a
//! small state machine over one text field that yields a data patch on commit.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::color;
use super::validate::is_valid_link;

// =============================================================================
// COMMANDS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    Center,
    Right,
    Justify,
}

/// Marks and block types the toolbar can show as active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mark {
    Bold,
    Italic,
    Strike,
    Link,
    Heading,
    BulletList,
    OrderedList,
}

impl Mark {
    pub const ALL: [Self; 7] =
        [Self::Bold, Self::Italic, Self::Strike, Self::Link, Self::Heading, Self::BulletList, Self::OrderedList];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum FormatCommand {
    Bold,
    Italic,
    Strike,
    Heading { level: u8 },
    BulletList,
    OrderedList,
    Link { href: String },
    Unlink,
    Align { align: TextAlign },
    Color { color: String },
    Image { src: String, alt: String },
}

#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("heading level must be 1-6, got {0}")]
    HeadingLevel(u8),
    #[error("invalid link target: {0}")]
    InvalidLink(String),
    #[error("invalid color: {0}")]
    InvalidColor(String),
    #[error("image source is empty")]
    EmptyImage,
    #[error("editor rejected command")]
    Rejected,
}

impl crate::error::ErrorCode for FormatError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::HeadingLevel(_) => "E_HEADING_LEVEL",
            Self::InvalidLink(_) => "E_INVALID_LINK",
            Self::InvalidColor(_) => "E_INVALID_COLOR",
            Self::EmptyImage => "E_EMPTY_IMAGE",
            Self::Rejected => "E_FORMAT_REJECTED",
        }
    }
}

// =============================================================================
// ENGINE SEAM
// =============================================================================

/// The external rich-text engine, as far as this service needs it.
pub(crate) trait RichTextEngine {
    /// Apply a command to the current selection. Returns `false` if the engine refused it.
    fn execute(&mut self, command: &FormatCommand) -> bool;
    fn is_active(&self, mark: Mark) -> bool;
    fn selection_is_empty(&self) -> bool;
    /// Current document as HTML.
    fn html(&self) -> String;
}

/// Validate a command's arguments and forward it to the engine.
///
/// # Errors
///
/// Returns the validation failure, or `Rejected` if the engine refused.
pub(crate) fn dispatch(engine: &mut dyn RichTextEngine, command: &FormatCommand) -> Result<(), FormatError> {
    check_command(command)?;
    if engine.execute(command) { Ok(()) } else { Err(FormatError::Rejected) }
}

/// Argument checks shared by `dispatch` and the pre-flight route.
///
/// # Errors
///
/// Returns the first invalid argument.
pub fn check_command(command: &FormatCommand) -> Result<(), FormatError> {
    match command {
        FormatCommand::Heading { level } if !(1..=6).contains(level) => Err(FormatError::HeadingLevel(*level)),
        FormatCommand::Link { href } if !is_valid_link(href) => Err(FormatError::InvalidLink(href.clone())),
        FormatCommand::Color { color } if !color::is_hex_color(color) => Err(FormatError::InvalidColor(color.clone())),
        FormatCommand::Image { src, .. } if src.trim().is_empty() => Err(FormatError::EmptyImage),
        _ => Ok(()),
    }
}

/// What the floating selection toolbar should show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolbarState {
    pub visible: bool,
    pub active: Vec<Mark>,
}

/// The toolbar appears only over a non-empty selection.
#[must_use]
pub(crate) fn floating_toolbar(engine: &dyn RichTextEngine) -> ToolbarState {
    if engine.selection_is_empty() {
        return ToolbarState { visible: false, active: Vec::new() };
    }
    let active = Mark::ALL
        .into_iter()
        .filter(|mark| engine.is_active(*mark))
        .collect();
    ToolbarState { visible: true, active }
}

// =============================================================================
// INLINE EDITING
// =============================================================================

/// Click-to-edit state for a single text field of a section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum InlineEdit {
    #[default]
    Viewing,
    Editing { field: String, original: String },
}

impl InlineEdit {
    /// Enter edit mode for `field`. Replaces any edit in progress.
    pub fn begin(&mut self, field: &str, current: &str) {
        *self = Self::Editing { field: field.to_owned(), original: current.to_owned() };
    }

    /// Leave edit mode. Returns a one-field data patch when the value changed.
    pub fn commit(&mut self, value: &str) -> Option<Map<String, Value>> {
        let Self::Editing { field, original } = std::mem::replace(self, Self::Viewing) else {
            return None;
        };
        if value == original {
            return None;
        }
        let mut patch = Map::new();
        patch.insert(field, Value::String(value.to_owned()));
        Some(patch)
    }

    pub fn cancel(&mut self) {
        *self = Self::Viewing;
    }

    #[must_use]
    pub fn is_editing(&self) -> bool {
        matches!(self, Self::Editing { .. })
    }
}

#[cfg(test)]
#[path = "rich_text_test.rs"]
mod tests;
