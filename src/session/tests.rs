use super::{Engine, Session};
use crate::buffer::{BufferMut, TextRange};
use crate::dispatcher::Outcome;
use crate::error::Result;
use crate::handlers::{Handler, HandlerContext};
use crate::key::{parse_keys, KeyEvent};
use crate::keymap::{MapFlags, MapModes, MappingTarget, Owner};
use crate::mode::{Mode, VisualSubMode};
use crate::options::{CursorShape, OptionScope};
use crate::state::CommandLineKind;
use crate::test_utils::Harness;
use std::sync::Arc;

fn shout(ctx: &mut HandlerContext<'_>) -> Result<()> {
    ctx.state.buffer_mut().insert(0, "!")
}

#[test]
fn test_engine_and_session_are_send() {
    fn assert_send_sync<T: Send + Sync>() {}
    fn assert_send<T: Send>() {}
    assert_send_sync::<Engine>();
    assert_send::<Session>();
}

#[test]
fn test_map_action_target() {
    let mut h = Harness::new("abc\n");
    let entry = h
        .engine()
        .map(
            MapModes::NORMAL,
            "Q",
            "<Action>(delete-char)",
            Owner::User,
            MapFlags::NOREMAP,
        )
        .unwrap();
    assert_eq!(entry.target, MappingTarget::Handler("delete-char".to_string()));
    h.feed("Q");
    assert_eq!(h.text(), "bc\n");
}

#[test]
fn test_map_unknown_action_fails() {
    let engine = Engine::new();
    let err = engine
        .map(
            MapModes::NORMAL,
            "Q",
            "<action>(no-such-thing)",
            Owner::User,
            MapFlags::NOREMAP,
        )
        .unwrap_err();
    assert_eq!(err.code, "E_UNKNOWN_HANDLER");
    assert!(engine.keymap.read().is_empty());
}

#[test]
fn test_nop_mapping_disables_key() {
    let mut h = Harness::new("abc\n");
    h.ex("nnoremap x <Nop>");
    h.feed("x");
    assert_eq!(h.text(), "abc\n");
}

#[test]
fn test_register_handler_with_trigger() {
    let mut h = Harness::new("abc\n");
    h.engine()
        .register_handler("shout", MapModes::NORMAL, Some("zq"), Handler::command(shout));
    h.feed("zq");
    assert_eq!(h.text(), "!abc\n");
    h.ex("nnoremap Z <Action>(shout)");
    h.feed("Z");
    assert_eq!(h.text(), "!!abc\n");
}

#[test]
fn test_remove_owner_keeps_other_owners() {
    let engine = Engine::new();
    engine
        .map(MapModes::NORMAL, "a", "b", Owner::InitScript, MapFlags::NOREMAP)
        .unwrap();
    engine
        .map(MapModes::NORMAL, "c", "d", Owner::User, MapFlags::NOREMAP)
        .unwrap();
    assert_eq!(engine.remove_owner(&Owner::InitScript), 1);
    let entries = engine.keymap.read().entries(MapModes::NORMAL);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].owner, Owner::User);
}

#[test]
fn test_engine_reset() {
    let engine = Arc::new(Engine::new());
    let mut h = Harness::with_engine(Arc::clone(&engine), "abc\n");
    h.ex("nmap x y");
    h.ex("set ic");
    h.ex("mark A");
    h.feed("yl");
    engine.reset();
    assert!(engine.keymap.read().is_empty());
    assert!(engine.options.is_default(OptionScope::Global, "ignorecase").unwrap());
    assert!(engine.marks.read().is_empty());
    assert!(engine.registers.read().get('"').is_none());
}

#[test]
fn test_selection_promotes_after_delay() {
    let mut h = Harness::new("hello world\n");
    h.feed("i");
    let t0 = h.clock.now();
    h.session.on_selection_changed(TextRange::new(1, 4), t0);
    h.wait(99);
    assert_eq!(h.mode(), Mode::Insert);
    h.wait(1);
    assert_eq!(h.mode(), Mode::Visual(VisualSubMode::Character));
    assert_eq!(h.session.selection(), Some(TextRange::new(1, 4)));

    let now = h.clock.now();
    h.session.on_selection_changed(TextRange::new(2, 2), now);
    h.wait(100);
    assert_eq!(h.mode(), Mode::Insert);
    assert_eq!(h.caret(), 2);
}

#[test]
fn test_selection_debounce_collapses_transient_change() {
    let mut h = Harness::new("hello world\n");
    h.feed("i");
    let t0 = h.clock.now();
    h.session.on_selection_changed(TextRange::new(1, 4), t0);
    let t1 = h.clock.advance(50);
    h.session.on_selection_changed(TextRange::new(1, 1), t1);
    h.wait(60);
    assert_eq!(h.mode(), Mode::Insert);
    h.wait(100);
    assert_eq!(h.mode(), Mode::Insert);
    assert!(h.session.next_deadline().is_none());
}

#[test]
fn test_selectiondelay_option() {
    let mut h = Harness::new("hello world\n");
    h.ex("set selectiondelay=10");
    let t0 = h.clock.now();
    h.session.on_selection_changed(TextRange::new(0, 5), t0);
    assert_eq!(
        h.session.next_deadline(),
        Some(t0 + std::time::Duration::from_millis(10))
    );
    h.wait(10);
    assert_eq!(h.mode(), Mode::Visual(VisualSubMode::Character));
}

#[test]
fn test_selectmode_mouse_promotes_to_select() {
    let mut h = Harness::new("hello world\n");
    h.ex("set selectmode=mouse");
    let t0 = h.clock.now();
    h.session.on_selection_changed(TextRange::new(0, 5), t0);
    h.wait(100);
    assert_eq!(h.mode(), Mode::Select(VisualSubMode::Character));
    h.feed("X");
    assert_eq!(h.text(), "X world\n");
    assert_eq!(h.mode(), Mode::Insert);
}

#[test]
fn test_clearing_explicit_visual_returns_to_normal() {
    let mut h = Harness::new("hello world\n");
    h.feed("vl");
    assert_eq!(h.mode(), Mode::Visual(VisualSubMode::Character));
    let now = h.clock.now();
    h.session.on_selection_changed(TextRange::new(0, 0), now);
    h.wait(100);
    assert_eq!(h.mode(), Mode::Normal);
}

#[test]
fn test_key_applies_settled_selection_first() {
    let mut h = Harness::new("hello world\n");
    let t0 = h.clock.now();
    h.session.on_selection_changed(TextRange::new(0, 5), t0);
    let later = h.clock.advance(200);
    let outcome = h.session.handle_at(KeyEvent::char('d'), later);
    assert_eq!(outcome, Outcome::Consumed);
    assert_eq!(h.text(), " world\n");
    assert_eq!(h.mode(), Mode::Normal);
}

#[test]
fn test_key_reports_error_from_expired_wait() {
    let mut h = Harness::new("hello\n");
    h.ex("nnoremap pq x");
    h.feed("p");
    let later = h.clock.advance(1001);
    match h.session.handle_at(KeyEvent::char('l'), later) {
        Outcome::Error(message) => assert!(message.starts_with("E353"), "{message}"),
        other => panic!("expected error, got {other:?}"),
    }
    assert_eq!(h.text(), "hello\n");
    assert_eq!(h.caret(), 1);
}

#[test]
fn test_escape_drops_unsettled_selection() {
    let mut h = Harness::new("hello world\n");
    let t0 = h.clock.now();
    h.session.on_selection_changed(TextRange::new(0, 5), t0);
    h.wait(100);
    assert_eq!(h.mode(), Mode::Visual(VisualSubMode::Character));

    let now = h.clock.now();
    h.session.on_selection_changed(TextRange::new(0, 8), now);
    h.feed("<Esc>");
    assert_eq!(h.mode(), Mode::Normal);
    assert!(h.session.next_deadline().is_none());
    h.wait(200);
    assert_eq!(h.mode(), Mode::Normal);
}

#[test]
fn test_cursor_attributes_follow_mode() {
    let mut h = Harness::new("hello\n");
    let normal = h.session.cursor_attributes();
    assert_eq!(normal.shape, CursorShape::Block);
    assert_eq!(normal.group, "Cursor");

    h.feed("d");
    let pending = h.session.cursor_attributes();
    assert_eq!(pending.shape, CursorShape::Horizontal);
    assert_eq!(pending.thickness, 50);
    h.feed("<Esc>");

    h.feed("i");
    let insert = h.session.cursor_attributes();
    assert_eq!(insert.shape, CursorShape::Vertical);
    assert_eq!(insert.thickness, 25);
    assert_eq!(insert.lmap_group.as_deref(), Some("lCursor"));
    h.feed("<Esc>");

    h.ex("set selection=exclusive");
    h.feed("v");
    let visual = h.session.cursor_attributes();
    assert_eq!(visual.shape, CursorShape::Vertical);
    assert_eq!(visual.thickness, 35);
}

#[test]
fn test_cursor_attributes_use_current_option() {
    let mut h = Harness::new("hello\n");
    h.ex("set guicursor=n:hor20-Cursor");
    h.ex("set guicursor+=n:ver75-OtherCursor");
    let attrs = h.session.cursor_attributes();
    assert_eq!(attrs.shape, CursorShape::Vertical);
    assert_eq!(attrs.thickness, 75);
    assert_eq!(attrs.group, "OtherCursor");
}

#[test]
fn test_next_deadline_tracks_mapping_wait() {
    let mut h = Harness::new("hello\n");
    h.ex("imap jj <Esc>");
    h.feed("ij");
    let now = h.clock.now();
    assert_eq!(
        h.session.next_deadline(),
        Some(now + std::time::Duration::from_millis(1000))
    );
    assert_eq!(h.session.pending_keys(), "j");
}

#[test]
fn test_commit_pending_resolves_held_keys() {
    let mut h = Harness::new("hello\n");
    h.ex("imap jj <Esc>");
    h.feed("ij");
    assert_eq!(h.session.commit_pending(), Outcome::Consumed);
    assert_eq!(h.text(), "jhello\n");
    assert!(h.session.next_deadline().is_none());
}

#[test]
fn test_pending_keys_show_partial_command() {
    let mut h = Harness::new("hello\n");
    h.feed("2d");
    assert_eq!(h.session.pending_keys(), "2d");
    h.feed("<Esc>");
    assert_eq!(h.session.pending_keys(), "");
}

#[test]
fn test_command_line_exposed() {
    let mut h = Harness::new("hello\n");
    h.feed(":se");
    let line = h.session.command_line().unwrap();
    assert_eq!(line.kind, CommandLineKind::Ex);
    assert_eq!(line.text(), "se");
    assert_eq!(h.mode(), Mode::CommandLine);
}

#[test]
fn test_execute_ex_reports_errors() {
    let mut h = Harness::new("hello\n");
    assert!(h.session.execute_ex("bogus").is_err());
    assert_eq!(
        h.last_message().as_deref(),
        Some("E492: Not an editor command: bogus")
    );
}

#[test]
fn test_drop_forgets_local_options() {
    let engine = Arc::new(Engine::new());
    let mut session = Session::with_text(Arc::clone(&engine), "x\n");
    let buffer = session.state().buffer_id();
    session.execute_ex("setlocal ts=3").unwrap();
    assert_eq!(engine.options.number(OptionScope::Local(buffer), "tabstop"), 3);
    drop(session);
    assert_eq!(engine.options.number(OptionScope::Local(buffer), "tabstop"), 8);
}

#[test]
fn test_marks_across_sessions() {
    let engine = Arc::new(Engine::new());
    let mut first = Harness::with_engine(Arc::clone(&engine), "one\ntwo\n");
    let second = Harness::with_engine(Arc::clone(&engine), "three\n");
    first.feed("jlmamA");
    let local = first.session.state().marks.get_mark('a').unwrap();
    assert_eq!((local.position.line, local.position.column), (1, 1));
    assert!(second.session.state().marks.get_mark('a').is_none());
    let global = second.session.state().marks.get_mark('A').unwrap();
    assert_eq!(global.buffer, first.session.state().buffer_id());
    assert_eq!((global.position.line, global.position.column), (1, 1));
}

#[test]
fn test_handle_uses_wall_clock() {
    let engine = Arc::new(Engine::new());
    let mut session = Session::with_text(engine, "abc\n");
    for key in parse_keys("x") {
        assert_eq!(session.handle(key), Outcome::Consumed);
    }
    assert_eq!(session.text(), "bc\n");
}
