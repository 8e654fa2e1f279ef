use super::*;
use crate::buffer::TextBuffer;
use std::collections::BTreeMap;
use std::sync::Arc;

fn state(text: &str) -> EditorState {
    let marks: SharedMarks = Arc::new(parking_lot::RwLock::new(BTreeMap::new()));
    EditorState::new(Box::new(TextBuffer::new(text)), marks)
}

#[test]
fn test_caret_clamped_in_normal() {
    let mut s = state("abc\nde");
    s.set_caret(3);
    assert_eq!(s.caret(), 2);
    s.set_caret(100);
    assert_eq!(s.caret(), 5);
}

#[test]
fn test_caret_past_end_in_insert() {
    let mut s = state("abc\nde");
    s.enter_mode(Mode::Insert).unwrap();
    s.set_caret(3);
    assert_eq!(s.caret(), 3);
}

#[test]
fn test_caret_on_empty_line() {
    let mut s = state("a\n\nb");
    s.set_caret(2);
    assert_eq!(s.caret(), 2);
    assert_eq!(s.caret_position(), Position::new(1, 0));
}

#[test]
fn test_leaving_insert_steps_back_and_sets_mark() {
    let mut s = state("hello");
    s.enter_mode(Mode::Insert).unwrap();
    s.set_caret(5);
    s.enter_mode(Mode::Normal).unwrap();
    assert_eq!(s.caret(), 4);
    let mark = s.marks.get_mark(marks::LAST_INSERT).unwrap();
    assert_eq!(mark.position, Position::new(0, 5));
}

#[test]
fn test_leaving_insert_at_column_zero_stays() {
    let mut s = state("hello");
    s.enter_mode(Mode::Insert).unwrap();
    s.enter_mode(Mode::Normal).unwrap();
    assert_eq!(s.caret(), 0);
}

#[test]
fn test_visual_anchor_and_marks() {
    let mut s = state("hello world");
    s.set_caret(2);
    s.enter_mode(Mode::Visual(VisualSubMode::Character)).unwrap();
    assert_eq!(s.visual_anchor(), 2);
    s.set_caret(6);
    let range = s.selection_range(false).unwrap();
    assert_eq!(range, OperatorRange::charwise(TextRange::new(2, 7)));
    let exclusive = s.selection_range(true).unwrap();
    assert_eq!(exclusive.span(), TextRange::new(2, 6));

    s.enter_mode(Mode::Normal).unwrap();
    assert!(s.selection_range(false).is_none());
    assert_eq!(
        s.marks.get_mark(marks::VISUAL_START).unwrap().position,
        Position::new(0, 2)
    );
    assert_eq!(
        s.marks.get_mark(marks::VISUAL_END).unwrap().position,
        Position::new(0, 6)
    );
    let snapshot = s.last_visual().unwrap();
    assert_eq!((snapshot.anchor, snapshot.caret), (2, 6));
}

#[test]
fn test_linewise_selection() {
    let mut s = state("one\ntwo\nthree");
    s.set_caret(5);
    s.enter_mode(Mode::Visual(VisualSubMode::Line)).unwrap();
    let range = s.selection_range(false).unwrap();
    assert_eq!(range.kind, RangeKind::Linewise);
    assert_eq!(range.span(), TextRange::new(4, 8));
}

#[test]
fn test_block_selection_segments() {
    let mut s = state("abcd\nef\nghij");
    s.set_caret(1);
    s.enter_mode(Mode::Visual(VisualSubMode::Block)).unwrap();
    s.set_caret(10);
    let range = s.selection_range(false).unwrap();
    assert_eq!(range.kind, RangeKind::Blockwise);
    assert_eq!(
        range.ranges,
        vec![
            TextRange::new(1, 3),
            TextRange::new(6, 7),
            TextRange::new(9, 11)
        ]
    );
}

#[test]
fn test_line_span_last_line_takes_previous_break() {
    let s = state("one\ntwo");
    assert_eq!(s.line_span(1, 1), TextRange::new(3, 7));
    assert_eq!(s.line_span(0, 0), TextRange::new(0, 4));
    assert_eq!(s.line_span(0, 1), TextRange::new(0, 7));
}

#[test]
fn test_restore_visual() {
    let mut s = state("hello world");
    assert!(!s.restore_visual(false).unwrap());
    s.set_caret(1);
    s.enter_mode(Mode::Visual(VisualSubMode::Character)).unwrap();
    s.set_caret(4);
    s.enter_mode(Mode::Normal).unwrap();
    s.set_caret(8);
    assert!(s.restore_visual(false).unwrap());
    assert_eq!(s.mode(), Mode::Visual(VisualSubMode::Character));
    assert_eq!((s.visual_anchor(), s.caret()), (1, 4));
}

#[test]
fn test_promote_and_demote_keep_insert() {
    let mut s = state("hello");
    s.enter_mode(Mode::Insert).unwrap();
    s.promote(Mode::Visual(VisualSubMode::Character)).unwrap();
    assert_eq!(s.demote(), Mode::Insert);
    assert_eq!(s.mode(), Mode::Insert);
}

#[test]
fn test_mark_change() {
    let mut s = state("one\ntwo");
    s.mark_change(TextRange::new(4, 7));
    assert_eq!(
        s.marks.get_mark(marks::CHANGE_START).unwrap().position,
        Position::new(1, 0)
    );
    assert_eq!(
        s.marks.get_mark(marks::CHANGE_END).unwrap().position,
        Position::new(1, 2)
    );
}

#[test]
fn test_command_line_editing() {
    let mut line = CommandLine::new(CommandLineKind::Ex, Mode::Normal, 0);
    line.insert_str("set");
    assert_eq!(line.text(), "set");
    assert_eq!(line.cursor, 3);
    assert_eq!(CommandLineKind::Search(SearchDirection::Backward).prompt(), '?');
}
