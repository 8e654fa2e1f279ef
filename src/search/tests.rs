use super::*;
use crate::buffer::TextBuffer;

fn opts() -> SearchOptions {
    SearchOptions::default()
}

#[test]
fn test_find_forward_simple() {
    let buffer = TextBuffer::new("hello world\nanother line");
    let engine = SearchEngine::new();

    let res = engine
        .find(&buffer, "world", 0, SearchDirection::Forward, 1, &opts())
        .unwrap();
    assert_eq!(res, Some(TextRange::new(6, 11)));
    assert_eq!(engine.last_pattern().as_deref(), Some("world"));
}

#[test]
fn test_find_next_line() {
    let buffer = TextBuffer::new("hello world\nanother line");
    let engine = SearchEngine::new();
    let res = engine
        .find(&buffer, "line", 0, SearchDirection::Forward, 1, &opts())
        .unwrap();
    assert_eq!(res, Some(TextRange::new(20, 24)));
}

#[test]
fn test_match_at_cursor_is_skipped() {
    let buffer = TextBuffer::new("foo foo foo");
    let engine = SearchEngine::new();
    let res = engine
        .find(&buffer, "foo", 0, SearchDirection::Forward, 1, &opts())
        .unwrap();
    assert_eq!(res, Some(TextRange::new(4, 7)));
}

#[test]
fn test_count_advances() {
    let buffer = TextBuffer::new("ab ab ab ab");
    let engine = SearchEngine::new();
    let res = engine
        .find(&buffer, "ab", 0, SearchDirection::Forward, 2, &opts())
        .unwrap();
    assert_eq!(res, Some(TextRange::new(6, 8)));
}

#[test]
fn test_backward_search() {
    let buffer = TextBuffer::new("one two\nthree two\nfour");
    let engine = SearchEngine::new();
    let res = engine
        .find(&buffer, "two", 20, SearchDirection::Backward, 1, &opts())
        .unwrap();
    assert_eq!(res, Some(TextRange::new(14, 17)));

    let res = engine
        .find(&buffer, "two", 14, SearchDirection::Backward, 1, &opts())
        .unwrap();
    assert_eq!(res, Some(TextRange::new(4, 7)));
}

#[test]
fn test_wrapscan() {
    let buffer = TextBuffer::new("target\nmiddle\nend");
    let engine = SearchEngine::new();

    let res = engine
        .find(&buffer, "target", 10, SearchDirection::Forward, 1, &opts())
        .unwrap();
    assert_eq!(res, Some(TextRange::new(0, 6)));

    let nowrap = SearchOptions {
        wrapscan: false,
        ..opts()
    };
    let res = engine
        .find(&buffer, "target", 10, SearchDirection::Forward, 1, &nowrap)
        .unwrap();
    assert_eq!(res, None);

    let res = engine
        .find(&buffer, "end", 2, SearchDirection::Backward, 1, &nowrap)
        .unwrap();
    assert_eq!(res, None);
    let res = engine
        .find(&buffer, "end", 2, SearchDirection::Backward, 1, &opts())
        .unwrap();
    assert_eq!(res, Some(TextRange::new(14, 17)));
}

#[test]
fn test_only_match_under_cursor_wraps_to_itself() {
    let buffer = TextBuffer::new("x needle y");
    let engine = SearchEngine::new();
    let res = engine
        .find(&buffer, "needle", 2, SearchDirection::Forward, 1, &opts())
        .unwrap();
    assert_eq!(res, Some(TextRange::new(2, 8)));
}

#[test]
fn test_no_match_is_none() {
    let buffer = TextBuffer::new("abc");
    let engine = SearchEngine::new();
    let res = engine
        .find(&buffer, "zzz", 0, SearchDirection::Forward, 1, &opts())
        .unwrap();
    assert_eq!(res, None);
}

#[test]
fn test_unicode_offsets_are_code_points() {
    let buffer = TextBuffer::new("héllo wörld");
    let engine = SearchEngine::new();
    let res = engine
        .find(&buffer, "wörld", 0, SearchDirection::Forward, 1, &opts())
        .unwrap();
    assert_eq!(res, Some(TextRange::new(6, 11)));
}

#[test]
fn test_repeat_uses_last_pattern_and_direction() {
    let buffer = TextBuffer::new("a x a x a");
    let engine = SearchEngine::new();

    let err = engine.repeat(&buffer, 0, false, 1, &opts()).unwrap_err();
    assert_eq!(err.code, "E35");

    engine
        .find(&buffer, "x", 0, SearchDirection::Forward, 1, &opts())
        .unwrap();
    assert_eq!(
        engine.repeat(&buffer, 2, false, 1, &opts()).unwrap(),
        Some(TextRange::new(6, 7))
    );
    assert_eq!(
        engine.repeat(&buffer, 6, true, 1, &opts()).unwrap(),
        Some(TextRange::new(2, 3))
    );
    assert_eq!(engine.last_direction(), SearchDirection::Forward);
}

#[test]
fn test_next_match_object() {
    let buffer = TextBuffer::new("foo bar foo bar");
    let engine = SearchEngine::new();
    engine.set_last("bar", SearchDirection::Forward);

    // Caret before the first match
    assert_eq!(
        engine.next_match_object(&buffer, 0, 1, true, 0, &opts()),
        Some(TextRange::new(4, 7))
    );
    // Caret inside a match selects that match
    assert_eq!(
        engine.next_match_object(&buffer, 5, 1, true, 0, &opts()),
        Some(TextRange::new(4, 7))
    );
    // Count advances
    assert_eq!(
        engine.next_match_object(&buffer, 0, 2, true, 0, &opts()),
        Some(TextRange::new(12, 15))
    );
    // Adjustment trims the exclusive end
    assert_eq!(
        engine.next_match_object(&buffer, 0, 1, true, 1, &opts()),
        Some(TextRange::new(4, 6))
    );
    // Backward from the end
    assert_eq!(
        engine.next_match_object(&buffer, 11, 1, false, 0, &opts()),
        Some(TextRange::new(4, 7))
    );
}

#[test]
fn test_next_match_object_absent() {
    let buffer = TextBuffer::new("foo");
    let engine = SearchEngine::new();
    assert_eq!(engine.next_match_object(&buffer, 0, 1, true, 0, &opts()), None);

    engine.set_last("zzz", SearchDirection::Forward);
    assert_eq!(engine.next_match_object(&buffer, 0, 1, true, 0, &opts()), None);
}

#[test]
fn test_find_all() {
    let buffer = TextBuffer::new("ab\nab ab");
    let all = find_all(&buffer, "ab", &opts()).unwrap();
    assert_eq!(
        all,
        vec![
            TextRange::new(0, 2),
            TextRange::new(3, 5),
            TextRange::new(6, 8)
        ]
    );
}

#[test]
fn test_case_flags() {
    let ic = SearchOptions {
        ignorecase: true,
        ..opts()
    };
    let scs = SearchOptions {
        ignorecase: true,
        smartcase: true,
        ..opts()
    };
    assert_eq!(case_flags("hello", &opts()), "");
    assert_eq!(case_flags("hello", &ic), "i");
    assert_eq!(case_flags("Hello", &ic), "i");
    assert_eq!(case_flags("hello", &scs), "i");
    assert_eq!(case_flags("Hello", &scs), "");
}

#[test]
fn test_ignorecase_matches_other_case() {
    let buffer = TextBuffer::new("say HELLO");
    let engine = SearchEngine::new();
    let ic = SearchOptions {
        ignorecase: true,
        ..opts()
    };
    let res = engine
        .find(&buffer, "hello", 0, SearchDirection::Forward, 1, &ic)
        .unwrap();
    assert_eq!(res, Some(TextRange::new(4, 9)));
}

#[test]
fn test_highlight_state() {
    let engine = SearchEngine::new();
    engine.set_last("x", SearchDirection::Backward);
    assert!(engine.state().highlight);
    engine.clear_highlight();
    assert!(!engine.state().highlight);
    engine.reset();
    assert_eq!(engine.state(), SearchState::default());
}
