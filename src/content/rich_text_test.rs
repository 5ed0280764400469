use super::*;
use std::collections::HashSet;

/// Records forwarded commands; toggles marks for the simple ones.
#[derive(Default)]
struct MockEngine {
    executed: Vec<FormatCommand>,
    active: HashSet<Mark>,
    selection_empty: bool,
    refuse: bool,
}

impl RichTextEngine for MockEngine {
    fn execute(&mut self, command: &FormatCommand) -> bool {
        if self.refuse {
            return false;
        }
        let mark = match command {
            FormatCommand::Bold => Some(Mark::Bold),
            FormatCommand::Italic => Some(Mark::Italic),
            FormatCommand::Link { .. } => Some(Mark::Link),
            _ => None,
        };
        if let Some(mark) = mark {
            if !self.active.remove(&mark) {
                self.active.insert(mark);
            }
        }
        self.executed.push(command.clone());
        true
    }

    fn is_active(&self, mark: Mark) -> bool {
        self.active.contains(&mark)
    }

    fn selection_is_empty(&self) -> bool {
        self.selection_empty
    }

    fn html(&self) -> String {
        String::new()
    }
}

// =============================================================================
// dispatch
// =============================================================================

#[test]
fn dispatch_forwards_valid_commands() {
    let mut engine = MockEngine::default();
    dispatch(&mut engine, &FormatCommand::Bold).unwrap();
    dispatch(&mut engine, &FormatCommand::Heading { level: 2 }).unwrap();
    dispatch(&mut engine, &FormatCommand::Align { align: TextAlign::Center }).unwrap();
    assert_eq!(engine.executed.len(), 3);
    assert!(engine.is_active(Mark::Bold));
}

#[test]
fn dispatch_rejects_bad_arguments_without_forwarding() {
    let mut engine = MockEngine::default();
    let bad = [
        FormatCommand::Heading { level: 7 },
        FormatCommand::Link { href: "javascript:void(0)".into() },
        FormatCommand::Color { color: "tomato".into() },
        FormatCommand::Image { src: "  ".into(), alt: String::new() },
    ];
    for command in &bad {
        assert!(dispatch(&mut engine, command).is_err());
    }
    assert!(engine.executed.is_empty());
}

#[test]
fn dispatch_reports_engine_refusal() {
    let mut engine = MockEngine { refuse: true, ..MockEngine::default() };
    let err = dispatch(&mut engine, &FormatCommand::Italic).unwrap_err();
    assert!(matches!(err, FormatError::Rejected));
}

#[test]
fn format_command_wire_shape() {
    let command: FormatCommand = serde_json::from_str(r#"{"command":"link","href":"/pricing"}"#).unwrap();
    assert_eq!(command, FormatCommand::Link { href: "/pricing".into() });
    let command: FormatCommand = serde_json::from_str(r#"{"command":"align","align":"justify"}"#).unwrap();
    assert_eq!(command, FormatCommand::Align { align: TextAlign::Justify });
}

// =============================================================================
// floating_toolbar
// =============================================================================

#[test]
fn toolbar_hidden_without_selection() {
    let engine = MockEngine { selection_empty: true, ..MockEngine::default() };
    let state = floating_toolbar(&engine);
    assert!(!state.visible);
    assert!(state.active.is_empty());
}

#[test]
fn toolbar_lists_active_marks_in_fixed_order() {
    let mut engine = MockEngine::default();
    dispatch(&mut engine, &FormatCommand::Link { href: "https://example.com".into() }).unwrap();
    dispatch(&mut engine, &FormatCommand::Bold).unwrap();
    let state = floating_toolbar(&engine);
    assert!(state.visible);
    assert_eq!(state.active, vec![Mark::Bold, Mark::Link]);
}

// =============================================================================
// InlineEdit
// =============================================================================

#[test]
fn inline_commit_returns_patch_when_changed() {
    let mut edit = InlineEdit::default();
    edit.begin("heading", "Old");
    assert!(edit.is_editing());
    let patch = edit.commit("New").unwrap();
    assert_eq!(patch.get("heading"), Some(&Value::String("New".into())));
    assert!(!edit.is_editing());
}

#[test]
fn inline_commit_unchanged_is_none() {
    let mut edit = InlineEdit::default();
    edit.begin("heading", "Same");
    assert!(edit.commit("Same").is_none());
    assert_eq!(edit, InlineEdit::Viewing);
}

#[test]
fn inline_commit_without_begin_is_none() {
    let mut edit = InlineEdit::default();
    assert!(edit.commit("x").is_none());
}

#[test]
fn inline_cancel_discards() {
    let mut edit = InlineEdit::default();
    edit.begin("body", "<p>a</p>");
    edit.cancel();
    assert!(edit.commit("<p>b</p>").is_none());
}
