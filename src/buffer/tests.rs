use super::*;

#[test]
fn test_line_index() {
    let buf = TextBuffer::new("one\ntwo\n\nfour");
    assert_eq!(buf.line_count(), 4);
    assert_eq!(buf.line_start(1), 4);
    assert_eq!(buf.line_end(1), 7);
    assert_eq!(buf.line_text(2), "");
    assert_eq!(buf.line_text(3), "four");
}

#[test]
fn test_empty_buffer_has_one_line() {
    let buf = TextBuffer::new("");
    assert_eq!(buf.line_count(), 1);
    assert_eq!(buf.line_start(0), 0);
    assert_eq!(buf.line_end(0), 0);
    assert!(buf.is_empty());
}

#[test]
fn test_offset_position_conversion() {
    let buf = TextBuffer::new("héllo\nworld");
    assert_eq!(buf.offset_to_position(7), Position::new(1, 1));
    assert_eq!(buf.position_to_offset(Position::new(1, 1)), 7);
    // Column clamps to the end of the line
    assert_eq!(buf.position_to_offset(Position::new(0, 40)), 5);
    // Line clamps to the last line
    assert_eq!(buf.position_to_offset(Position::new(9, 0)), 6);
    assert_eq!(buf.line_of_offset(5), 0);
    assert_eq!(buf.line_of_offset(6), 1);
}

#[test]
fn test_insert_and_delete() {
    let mut buf = TextBuffer::new("hello world");
    buf.insert(5, ",").unwrap();
    assert_eq!(buf.to_string(), "hello, world");
    assert_eq!(buf.revision(), 1);

    let removed = buf.delete(TextRange::new(0, 7)).unwrap();
    assert_eq!(removed, "hello, ");
    assert_eq!(buf.to_string(), "world");
    assert_eq!(buf.revision(), 2);
}

#[test]
fn test_insert_newline_reindexes() {
    let mut buf = TextBuffer::new("ab");
    buf.insert(1, "\n").unwrap();
    assert_eq!(buf.line_count(), 2);
    assert_eq!(buf.line_text(1), "b");
}

#[test]
fn test_out_of_range_edit_is_rejected() {
    let mut buf = TextBuffer::new("abc");
    assert!(buf.insert(10, "x").is_err());
    assert!(buf.delete(TextRange::new(2, 9)).is_err());
    assert_eq!(buf.revision(), 0);
}

#[test]
fn test_replace() {
    let mut buf = TextBuffer::new("foo bar");
    let old = buf.replace(TextRange::new(4, 7), "baz").unwrap();
    assert_eq!(old, "bar");
    assert_eq!(buf.to_string(), "foo baz");
}

#[test]
fn test_text_range_helpers() {
    let r = TextRange::between(9, 3);
    assert_eq!(r, TextRange::new(3, 9));
    assert_eq!(r.len(), 6);
    assert!(r.contains(3));
    assert!(!r.contains(9));
    assert_eq!(r.adjusted(1), TextRange::new(3, 8));
    assert_eq!(TextRange::new(3, 4).adjusted(5), TextRange::new(3, 3));
}

#[test]
fn test_buffer_ids_are_unique() {
    let a = TextBuffer::new("");
    let b = TextBuffer::new("");
    assert_ne!(a.id(), b.id());
}
