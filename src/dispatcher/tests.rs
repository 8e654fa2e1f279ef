use super::pending::{combine_counts, PendingCommand};
use crate::constants::limits::MAX_COUNT;
use super::Outcome;
use crate::mode::Mode;
use crate::test_utils::Harness;

fn error_code(outcome: Outcome) -> String {
    match outcome {
        Outcome::Error(message) => message.split(':').next().unwrap_or_default().to_string(),
        other => panic!("expected an error, got {other:?}"),
    }
}

#[test]
fn test_combine_counts() {
    assert_eq!(combine_counts(None, None), None);
    assert_eq!(combine_counts(Some(2), None), Some(2));
    assert_eq!(combine_counts(None, Some(3)), Some(3));
    assert_eq!(combine_counts(Some(2), Some(3)), Some(6));
    assert_eq!(combine_counts(Some(MAX_COUNT), Some(MAX_COUNT)), Some(MAX_COUNT));
}

#[test]
fn test_count_digits_saturate() {
    let mut pending = PendingCommand::default();
    for _ in 0..25 {
        pending.push_digit(9);
    }
    assert_eq!(pending.count, Some(MAX_COUNT));
    pending.clear();
    pending.push_digit(4);
    pending.push_digit(2);
    assert_eq!(pending.count, Some(42));
}

// Mapping timeouts

#[test]
fn test_insert_mapping_completes() {
    let mut h = Harness::new("hello\n");
    h.ex("inoremap jj <Esc>");
    h.feed("ijj");
    assert_eq!(h.mode(), Mode::Normal);
    assert_eq!(h.text(), "hello\n");
    assert!(h.session.next_deadline().is_none());
}

#[test]
fn test_held_key_inserted_after_timeout() {
    let mut h = Harness::new("hello\n");
    h.ex("inoremap jj <Esc>");
    h.feed("ij");
    assert_eq!(h.text(), "hello\n");
    h.wait(999);
    assert_eq!(h.text(), "hello\n");
    h.wait(1);
    assert_eq!(h.text(), "jhello\n");
    assert_eq!(h.mode(), Mode::Insert);
}

#[test]
fn test_timeoutlen_option() {
    let mut h = Harness::new("hello\n");
    h.ex("set tm=200");
    h.ex("inoremap jj <Esc>");
    h.feed("ij");
    h.wait(200);
    assert_eq!(h.text(), "jhello\n");
}

#[test]
fn test_diverging_key_flushes_held_keys() {
    let mut h = Harness::new("hello\n");
    h.ex("inoremap jj <Esc>");
    h.feed("ijx");
    assert_eq!(h.text(), "jxhello\n");
    assert_eq!(h.mode(), Mode::Insert);
    assert!(h.session.next_deadline().is_none());
}

#[test]
fn test_notimeout_waits_for_next_key() {
    let mut h = Harness::new("hello\n");
    h.ex("set notimeout");
    h.ex("inoremap jj <Esc>");
    h.feed("ij");
    assert!(h.session.next_deadline().is_none());
    h.wait(5000);
    assert_eq!(h.text(), "hello\n");
    h.feed("k");
    assert_eq!(h.text(), "jkhello\n");
}

#[test]
fn test_prefix_mapping_with_exact_match() {
    let mut h = Harness::new("hello\n");
    h.ex("nnoremap , x");
    h.ex("nnoremap ,d dd");
    h.feed(",");
    assert_eq!(h.text(), "hello\n");
    h.wait(1000);
    assert_eq!(h.text(), "ello\n");

    h.feed(",l");
    assert_eq!(h.text(), "llo\n");
    assert_eq!(h.caret(), 1);

    h.feed(",d");
    assert_eq!(h.text(), "");
}

#[test]
fn test_nowait_mapping_fires_immediately() {
    let mut h = Harness::new("hello\n");
    h.ex("nnoremap ,d dd");
    h.ex("nnoremap <nowait> , x");
    h.feed(",");
    assert_eq!(h.text(), "ello\n");
    assert!(h.session.next_deadline().is_none());
}

// Remapping

#[test]
fn test_recursive_and_noremap() {
    let mut h = Harness::new("one\ntwo\n");
    h.ex("nnoremap x dd");
    h.ex("nmap Q x");
    h.feed("Q");
    assert_eq!(h.text(), "two\n");

    let mut h = Harness::new("one\ntwo\n");
    h.ex("nnoremap x dd");
    h.ex("nnoremap Q x");
    h.feed("Q");
    assert_eq!(h.text(), "ne\ntwo\n");
}

#[test]
fn test_recursive_mapping_is_bounded() {
    let mut h = Harness::new("one\n");
    h.ex("nmap a b");
    h.ex("nmap b a");
    assert_eq!(error_code(h.last("a")), "E223");
    assert_eq!(h.mode(), Mode::Normal);
    assert!(h.session.next_deadline().is_none());
    assert_eq!(
        h.last_message().as_deref(),
        Some("E223: Recursive mapping")
    );
}

#[test]
fn test_maxmapdepth_option() {
    let mut h = Harness::new("one\n");
    h.ex("set mmd=2");
    h.ex("nmap a b");
    h.ex("nmap b c");
    h.ex("nmap c x");
    assert_eq!(error_code(h.last("a")), "E223");
    assert_eq!(h.text(), "one\n");
    h.ex("set mmd=3");
    h.feed("a");
    assert_eq!(h.text(), "ne\n");
}

#[test]
fn test_lhs_at_start_of_rhs_is_not_remapped() {
    let mut h = Harness::new("abc\ndef\n");
    h.ex("nmap j jl");
    h.feed("j");
    assert_eq!(h.caret(), 5);
}

#[test]
fn test_operator_pending_mapping() {
    let mut h = Harness::new("foo bar\n");
    h.ex("onoremap w e");
    h.feed("dw");
    assert_eq!(h.text(), " bar\n");
    // Plain motions in normal mode are untouched
    h.feed("w");
    assert_eq!(h.caret(), 1);
}

#[test]
fn test_command_line_mapping() {
    let mut h = Harness::new("one\n");
    h.ex("cnoremap %% abc");
    h.feed(":%%");
    assert_eq!(h.session.command_line().unwrap().text(), "abc");
}

#[test]
fn test_leader_mapping() {
    let mut h = Harness::new("one\ntwo\n");
    h.ex("set mapleader=,");
    h.ex("nnoremap <Leader>d dd");
    h.feed(",d");
    assert_eq!(h.text(), "two\n");
}

#[test]
fn test_handler_mapping_with_char_argument() {
    let mut h = Harness::new("one\ntwo\n");
    h.ex("nnoremap M <Action>(set-mark)");
    h.feed("jMa");
    let mark = h.session.state().marks.get_mark('a').unwrap();
    assert_eq!(mark.position.line, 1);
}

#[test]
fn test_error_discards_remaining_typeahead() {
    let mut h = Harness::new("hello\n");
    h.ex("nnoremap Q `zx");
    assert_eq!(error_code(h.last("Q")), "E20");
    assert_eq!(h.text(), "hello\n");
}

// Command grammar

#[test]
fn test_escape_cancels_partial_command() {
    let mut h = Harness::new("hello world\n");
    h.feed("2d<Esc>");
    assert_eq!(h.text(), "hello world\n");
    assert_eq!(h.session.pending_keys(), "");
    h.feed("x");
    assert_eq!(h.text(), "ello world\n");

    h.feed("\"a<Esc>x");
    assert_eq!(h.text(), "llo world\n");
    assert!(h.engine().registers.read().get('a').is_none());

    h.feed("f<Esc>");
    assert_eq!(h.caret(), 0);
    assert_eq!(h.mode(), Mode::Normal);
}

#[test]
fn test_counts_multiply() {
    let mut h = Harness::new("a b c d e f g\n");
    h.feed("2d3w");
    assert_eq!(h.text(), "g\n");
}

#[test]
fn test_zero_is_motion_unless_counting() {
    let mut h = Harness::new("abcdefghijklmnop\n");
    h.feed("10l");
    assert_eq!(h.caret(), 10);
    h.feed("0");
    assert_eq!(h.caret(), 0);
}

#[test]
fn test_unknown_command_and_pass_through() {
    let mut h = Harness::new("hello\n");
    assert_eq!(error_code(h.last("Z")), "E_UNKNOWN_COMMAND");
    assert_eq!(h.last("<F5>"), Outcome::PassThrough);
    h.feed("i");
    assert_eq!(h.last("<F5>"), Outcome::PassThrough);
    assert_eq!(h.text(), "hello\n");
}

#[test]
fn test_invalid_register() {
    let mut h = Harness::new("hello\n");
    assert_eq!(error_code(h.last("\"!")), "E_INVALID_REGISTER");
    h.feed("x");
    assert_eq!(h.text(), "ello\n");
}

#[test]
fn test_unknown_handler_at_expansion() {
    let mut h = Harness::new("hello\n");
    h.engine()
        .keymap
        .write()
        .define(
            crate::keymap::MapModes::NORMAL,
            crate::key::parse_keys("Q"),
            crate::keymap::MappingTarget::Handler("gone".to_string()),
            crate::keymap::Owner::User,
            crate::keymap::MapFlags::NOREMAP,
        )
        .unwrap();
    assert_eq!(error_code(h.last("Q")), "E_UNKNOWN_HANDLER");
}

#[test]
fn test_same_keys_same_result() {
    let script = "wdwP2xAend<Esc>0vey$p";
    let mut first = Harness::new("alpha beta gamma\n");
    let mut second = Harness::new("alpha beta gamma\n");
    let a = first.keys(script);
    let b = second.keys(script);
    assert_eq!(a, b);
    assert_eq!(first.text(), second.text());
    assert_eq!(first.caret(), second.caret());
}
