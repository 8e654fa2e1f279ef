use super::*;
use ::crossterm::event::{KeyCode, KeyModifiers};

#[test]
fn test_shift_is_folded_into_char() {
    let event = KeyEvent::new(Key::Char('a'), Modifiers::SHIFT);
    assert_eq!(event, KeyEvent::char('A'));
    assert!(event.modifiers.is_empty());
}

#[test]
fn test_ctrl_letters_are_lowercase() {
    assert_eq!(KeyEvent::ctrl('W'), KeyEvent::ctrl('w'));
}

#[test]
fn test_escape_equivalents() {
    assert!(KeyEvent::plain(Key::Escape).is_escape());
    assert!(KeyEvent::ctrl('[').is_escape());
    assert!(KeyEvent::ctrl('c').is_escape());
    assert!(!KeyEvent::char('c').is_escape());
}

#[test]
fn test_parse_plain_and_special() {
    assert_eq!(
        parse_keys("jj"),
        vec![KeyEvent::char('j'), KeyEvent::char('j')]
    );
    assert_eq!(
        parse_keys("<Esc>:w<CR>"),
        vec![
            KeyEvent::plain(Key::Escape),
            KeyEvent::char(':'),
            KeyEvent::char('w'),
            KeyEvent::plain(Key::Enter),
        ]
    );
}

#[test]
fn test_parse_modifiers() {
    assert_eq!(parse_keys("<C-w>"), vec![KeyEvent::ctrl('w')]);
    assert_eq!(parse_keys("<c-W>"), vec![KeyEvent::ctrl('w')]);
    assert_eq!(parse_keys("<A-x>"), vec![KeyEvent::alt('x')]);
    assert_eq!(
        parse_keys("<S-Tab>"),
        vec![KeyEvent::new(Key::Tab, Modifiers::SHIFT)]
    );
    assert_eq!(
        parse_keys("<C-S-Up>"),
        vec![KeyEvent::new(Key::Up, Modifiers::CTRL | Modifiers::SHIFT)]
    );
    assert_eq!(parse_keys("<C-->"), vec![KeyEvent::ctrl('-')]);
}

#[test]
fn test_parse_literal_fallbacks() {
    assert_eq!(
        parse_keys("<foo"),
        "<foo".chars().map(KeyEvent::char).collect::<Vec<_>>()
    );
    assert_eq!(
        parse_keys("<x>"),
        "<x>".chars().map(KeyEvent::char).collect::<Vec<_>>()
    );
    assert_eq!(parse_keys("<lt>"), vec![KeyEvent::char('<')]);
    assert_eq!(parse_keys("<Space>"), vec![KeyEvent::char(' ')]);
}

#[test]
fn test_parse_function_keys() {
    assert_eq!(parse_keys("<F5>"), vec![KeyEvent::plain(Key::F(5))]);
    // Out of range is literal
    assert_eq!(parse_keys("<F13>").len(), 5);
}

#[test]
fn test_leader_expansion() {
    assert_eq!(
        parse_keys_with_leader("<Leader>w", ","),
        vec![KeyEvent::char(','), KeyEvent::char('w')]
    );
    assert_eq!(
        parse_keys("<leader>"),
        vec![KeyEvent::char('\\')]
    );
}

#[test]
fn test_format_round_trip() {
    let notation = "<C-w>j<lt><Space><Esc><F2><S-Tab>x";
    let keys = parse_keys(notation);
    assert_eq!(format_keys(&keys), notation);
    assert_eq!(parse_keys(&format_keys(&keys)), keys);
}

#[test]
fn test_literal_characters() {
    assert_eq!(KeyEvent::char('x').literal(), Some('x'));
    assert_eq!(KeyEvent::plain(Key::Tab).literal(), Some('\t'));
    assert_eq!(KeyEvent::ctrl('a').literal(), Some('\u{1}'));
    assert_eq!(KeyEvent::plain(Key::Up).literal(), None);
}

#[test]
fn test_from_crossterm_event() {
    let ev = ::crossterm::event::KeyEvent::new(KeyCode::Char('w'), KeyModifiers::CONTROL);
    assert_eq!(KeyEvent::from(ev), KeyEvent::ctrl('w'));

    let ev = ::crossterm::event::KeyEvent::new(KeyCode::Char('A'), KeyModifiers::SHIFT);
    assert_eq!(KeyEvent::from(ev), KeyEvent::char('A'));

    let ev = ::crossterm::event::KeyEvent::new(KeyCode::Char('\r'), KeyModifiers::NONE);
    assert_eq!(KeyEvent::from(ev), KeyEvent::plain(Key::Enter));

    let ev = ::crossterm::event::KeyEvent::new(KeyCode::BackTab, KeyModifiers::NONE);
    assert_eq!(
        KeyEvent::from(ev),
        KeyEvent::new(Key::Tab, Modifiers::SHIFT)
    );

    let ev = ::crossterm::event::KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE);
    assert!(KeyEvent::from(ev).is_escape());
}
