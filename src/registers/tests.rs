use super::*;

#[test]
fn test_validate_names() {
    for name in ['a', 'Z', '0', '"', '-', '_', '+', '*'] {
        assert!(validate(name).is_ok(), "{name}");
    }
    let err = validate('!').unwrap_err();
    assert_eq!(err.code, "E_INVALID_REGISTER");
}

#[test]
fn test_yank_fills_zero_and_unnamed() {
    let mut regs = Registers::new();
    regs.record_yank(None, Register::new("foo", false));
    assert_eq!(regs.get('0').unwrap().text, "foo");
    assert_eq!(regs.get('"').unwrap().text, "foo");
}

#[test]
fn test_named_yank_leaves_zero() {
    let mut regs = Registers::new();
    regs.record_yank(Some('a'), Register::new("bar", false));
    assert!(regs.get('0').is_none());
    assert_eq!(regs.get('a').unwrap().text, "bar");
    assert_eq!(regs.get('"').unwrap().text, "bar");
}

#[test]
fn test_uppercase_appends() {
    let mut regs = Registers::new();
    regs.set('a', Register::new("one", false));
    regs.set('A', Register::new("two", false));
    assert_eq!(regs.get('a').unwrap().text, "onetwo");
    // Reading through the uppercase name sees the same register
    assert_eq!(regs.get('A').unwrap().text, "onetwo");
}

#[test]
fn test_delete_shifts_numbered() {
    let mut regs = Registers::new();
    regs.record_delete(None, Register::new("first\n", true));
    regs.record_delete(None, Register::new("second\n", true));
    assert_eq!(regs.get('1').unwrap().text, "second\n");
    assert_eq!(regs.get('2').unwrap().text, "first\n");

    regs.record_delete(None, Register::new("w", false));
    assert_eq!(regs.get('-').unwrap().text, "w");
    assert_eq!(regs.get('1').unwrap().text, "second\n");
    assert_eq!(regs.get('"').unwrap().text, "w");
}

#[test]
fn test_black_hole_discards() {
    let mut regs = Registers::new();
    regs.record_yank(None, Register::new("keep", false));
    regs.record_delete(Some('_'), Register::new("gone", false));
    assert_eq!(regs.get('"').unwrap().text, "keep");
    assert!(regs.get('_').is_none());
}
