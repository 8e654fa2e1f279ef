use super::parser::{parse, ParsedCommand, SetScope};
use super::ExContext;
use crate::buffer::Position;
use crate::key::parse_keys;
use crate::keymap::{MapModes, MappingTarget, Owner};
use crate::options::{OptionScope, OptionValue};
use crate::search::SearchDirection;
use crate::session::Engine;
use crate::test_utils::Harness;

const TEXT: &str = "one\n  two\nthree\n";

fn error_code(h: &mut Harness, line: &str) -> String {
    match h.session.execute_ex(line) {
        Ok(()) => panic!(":{line} should fail"),
        Err(err) => err.code,
    }
}

#[test]
fn test_parse_abbreviations() {
    let parsed = parse("se ts=4", None).unwrap();
    assert_eq!(
        parsed.command,
        ParsedCommand::Set {
            scope: SetScope::Both,
            args: "ts=4".to_string()
        }
    );
    assert!(matches!(
        parse("setl sw=2", None).unwrap().command,
        ParsedCommand::Set {
            scope: SetScope::Local,
            ..
        }
    ));
    assert_eq!(
        parse("nn x y", None).unwrap().command,
        ParsedCommand::Map {
            modes: MapModes::NORMAL,
            recursive: false,
            args: "x y".to_string()
        }
    );
    assert_eq!(
        parse("vu x", None).unwrap().command,
        ParsedCommand::Unmap {
            modes: MapModes::VISUAL | MapModes::SELECT,
            args: "x".to_string()
        }
    );
    assert_eq!(parse("noh", None).unwrap().command, ParsedCommand::NoHlSearch);
}

#[test]
fn test_parse_bang_forms() {
    assert_eq!(
        parse("map! ab cd", None).unwrap().command,
        ParsedCommand::Map {
            modes: MapModes::INSERT | MapModes::CMDLINE,
            recursive: true,
            args: "ab cd".to_string()
        }
    );
    assert_eq!(
        parse("delm!", None).unwrap().command,
        ParsedCommand::DelMarks {
            args: String::new(),
            bang: true
        }
    );
    assert!(matches!(
        parse("nmap! x y", None).unwrap().command,
        ParsedCommand::Unknown { .. }
    ));
}

#[test]
fn test_parse_k_takes_mark_name() {
    assert_eq!(
        parse("ka", None).unwrap().command,
        ParsedCommand::Mark {
            args: "a".to_string()
        }
    );
    assert_eq!(
        parse("k b", None).unwrap().command,
        ParsedCommand::Mark {
            args: "b".to_string()
        }
    );
    assert_eq!(
        parse("ma c", None).unwrap().command,
        ParsedCommand::Mark {
            args: "c".to_string()
        }
    );
}

#[test]
fn test_unknown_and_ambiguous_commands() {
    let mut h = Harness::new(TEXT);
    assert_eq!(error_code(&mut h, "frobnicate"), "E492");
    // set, smap, snoremap...
    assert_eq!(error_code(&mut h, "s"), "E492");
    assert!(h.last_message().unwrap().starts_with("E492"));
}

#[test]
fn test_comment_and_empty_lines_do_nothing() {
    let mut h = Harness::new(TEXT);
    h.ex("\" a comment");
    h.ex("");
    h.ex(":");
    assert_eq!(h.text(), TEXT);
}

#[test]
fn test_set_boolean_forms() {
    let mut h = Harness::new(TEXT);
    let scope = OptionScope::Global;
    h.ex("set ic");
    assert!(h.engine().options.flag(scope, "ignorecase"));
    h.ex("set noic");
    assert!(!h.engine().options.flag(scope, "ignorecase"));
    h.ex("set ic!");
    assert!(h.engine().options.flag(scope, "ignorecase"));
    h.ex("set invignorecase");
    assert!(!h.engine().options.flag(scope, "ignorecase"));
}

#[test]
fn test_set_several_arguments() {
    let mut h = Harness::new(TEXT);
    h.ex("set ic scs nows");
    let options = &h.engine().options;
    assert!(options.flag(OptionScope::Global, "ignorecase"));
    assert!(options.flag(OptionScope::Global, "smartcase"));
    assert!(!options.flag(OptionScope::Global, "wrapscan"));
}

#[test]
fn test_set_local_option_writes_buffer_and_global() {
    let mut h = Harness::new(TEXT);
    let buffer = h.session.state().buffer_id();
    h.ex("set ts=4");
    let options = &h.engine().options;
    assert_eq!(options.number(OptionScope::Local(buffer), "tabstop"), 4);
    assert_eq!(options.number(OptionScope::Global, "tabstop"), 4);
}

#[test]
fn test_setlocal_and_setglobal() {
    let mut h = Harness::new(TEXT);
    let buffer = h.session.state().buffer_id();
    h.ex("setlocal sw=2");
    h.ex("setglobal et");
    let options = &h.engine().options;
    assert_eq!(options.number(OptionScope::Local(buffer), "shiftwidth"), 2);
    assert_eq!(options.number(OptionScope::Global, "shiftwidth"), 8);
    assert!(options.flag(OptionScope::Global, "expandtab"));
}

#[test]
fn test_set_list_operators() {
    let mut h = Harness::new(TEXT);
    h.ex("set ww+=h,l");
    h.ex("set ww-=s");
    let value = h
        .engine()
        .options
        .get_list(OptionScope::Global, "whichwrap")
        .unwrap();
    assert_eq!(value, vec!["b", "h", "l"]);
    h.ex("set ww^=<");
    let value = h
        .engine()
        .options
        .get_list(OptionScope::Global, "whichwrap")
        .unwrap();
    assert_eq!(value[0], "<");
}

#[test]
fn test_set_number_operators_and_colon() {
    let mut h = Harness::new(TEXT);
    h.ex("set timeoutlen:500");
    h.ex("set tm+=100");
    assert_eq!(
        h.engine().options.number(OptionScope::Global, "timeoutlen"),
        600
    );
    h.ex("set tm&");
    assert_eq!(
        h.engine().options.number(OptionScope::Global, "timeoutlen"),
        1000
    );
}

#[test]
fn test_set_query_shows_value() {
    let mut h = Harness::new(TEXT);
    h.ex("set sw?");
    assert_eq!(h.last_message().as_deref(), Some("  shiftwidth=8"));
    h.ex("set ic?");
    assert_eq!(h.last_message().as_deref(), Some("noignorecase"));
    h.ex("set tm");
    assert_eq!(h.last_message().as_deref(), Some("  timeoutlen=1000"));
}

#[test]
fn test_set_without_arguments_lists_changed() {
    let mut h = Harness::new(TEXT);
    h.ex("set hls");
    h.ex("set");
    let texts: Vec<String> = h.session.messages().iter().map(|m| m.text.clone()).collect();
    assert!(texts.contains(&"--- Options ---".to_string()));
    assert!(texts.contains(&"  hlsearch".to_string()));
    assert!(!texts.iter().any(|t| t.contains("tabstop")));
}

#[test]
fn test_set_errors_leave_value() {
    let mut h = Harness::new(TEXT);
    assert_eq!(error_code(&mut h, "set guicursor=whatever"), "E545");
    assert_eq!(error_code(&mut h, "set gcr=n:ver0-Cursor"), "E549");
    assert_eq!(error_code(&mut h, "set nosuchoption"), "E518");
    assert_eq!(error_code(&mut h, "set ts=abc"), "E474");
    assert_eq!(error_code(&mut h, "set nots"), "E474");
    let options = &h.engine().options;
    assert!(options.is_default(OptionScope::Global, "guicursor").unwrap());
    assert_eq!(options.number(OptionScope::Global, "tabstop"), 8);
}

#[test]
fn test_set_unescapes_backslashes() {
    let mut h = Harness::new(TEXT);
    h.ex(r"set mapleader=\ ");
    assert_eq!(
        h.engine()
            .options
            .get(OptionScope::Global, "mapleader")
            .unwrap(),
        OptionValue::String(" ".to_string())
    );
}

#[test]
fn test_set_all_reset() {
    let mut h = Harness::new(TEXT);
    h.ex("set ic tm=10");
    h.ex("set all&");
    let options = &h.engine().options;
    assert!(options.is_default(OptionScope::Global, "ignorecase").unwrap());
    assert!(options.is_default(OptionScope::Global, "timeoutlen").unwrap());
}

#[test]
fn test_map_defines_entries() {
    let mut h = Harness::new(TEXT);
    h.ex("nnoremap <nowait> jk <Esc>");
    h.ex("imap jj <Esc>");
    let keymap = h.engine().keymap.read();
    let normal = keymap.entries(MapModes::NORMAL);
    assert_eq!(normal.len(), 1);
    assert!(!normal[0].recursive);
    assert!(normal[0].nowait);
    assert_eq!(normal[0].owner, Owner::User);
    let insert = keymap.entries(MapModes::INSERT);
    assert_eq!(insert.len(), 1);
    assert!(insert[0].recursive);
    assert_eq!(insert[0].from, parse_keys("jj"));
    assert_eq!(insert[0].target, MappingTarget::Keys(parse_keys("<Esc>")));
}

#[test]
fn test_map_rhs_keeps_spaces() {
    let mut h = Harness::new(TEXT);
    h.ex("nmap Q :set ic<CR>");
    let keymap = h.engine().keymap.read();
    let entry = &keymap.entries(MapModes::NORMAL)[0];
    assert_eq!(entry.target, MappingTarget::Keys(parse_keys(":set ic<CR>")));
}

#[test]
fn test_map_expands_leader() {
    let mut h = Harness::new(TEXT);
    h.ex("set mapleader=,");
    h.ex("nnoremap <Leader>w x");
    let keymap = h.engine().keymap.read();
    assert_eq!(keymap.entries(MapModes::NORMAL)[0].from, parse_keys(",w"));
}

#[test]
fn test_map_unique_refuses_existing() {
    let mut h = Harness::new(TEXT);
    h.ex("nmap x y");
    assert_eq!(error_code(&mut h, "nmap <unique> x z"), "E227");
}

#[test]
fn test_map_listing() {
    let mut h = Harness::new(TEXT);
    h.ex("nmap");
    assert_eq!(h.last_message().as_deref(), Some("No mapping found"));
    h.ex("nnoremap gx dd");
    h.ex("nmap");
    let last = h.last_message().unwrap();
    assert!(last.starts_with("n  gx"));
    assert!(last.ends_with("*dd"));
    h.ex("nmap zz");
    assert_eq!(h.last_message().as_deref(), Some("No mapping found"));
}

#[test]
fn test_unmap_and_mapclear() {
    let mut h = Harness::new(TEXT);
    h.ex("map x y");
    h.ex("nunmap x");
    {
        let keymap = h.engine().keymap.read();
        assert!(keymap.entries(MapModes::NORMAL).is_empty());
        assert_eq!(keymap.entries(MapModes::VISUAL).len(), 1);
    }
    assert_eq!(error_code(&mut h, "nunmap x"), "E31");
    h.ex("mapclear");
    assert!(h.engine().keymap.read().is_empty());
}

#[test]
fn test_unmap_removes_script_mappings() {
    let mut h = Harness::new(TEXT);
    let engine = std::sync::Arc::clone(h.engine());
    let mut ctx = ExContext::new(&engine, None, Owner::InitScript);
    ctx.run("inoremap jj <Esc>").unwrap();
    h.ex("iunmap jj");
    assert!(engine.keymap.read().is_empty());
}

#[test]
fn test_script_context_without_buffer() {
    let engine = Engine::new();
    let mut ctx = ExContext::new(&engine, None, Owner::InitScript);
    ctx.run("nmap x dd").unwrap();
    ctx.run("set ts=3").unwrap();
    assert_eq!(
        engine.keymap.read().entries(MapModes::NORMAL)[0].owner,
        Owner::InitScript
    );
    assert_eq!(engine.options.number(OptionScope::Global, "tabstop"), 3);
    assert!(ctx.run("mark a").is_err());
    assert!(ctx.run("2").is_err());
}

#[test]
fn test_mark_with_range_uses_start_line() {
    let mut h = Harness::new(TEXT);
    h.ex("2,3mark a");
    let mark = h.session.state().marks.get_mark('a').unwrap();
    assert_eq!(mark.position, Position::new(1, 0));
    h.ex("3kb");
    let mark = h.session.state().marks.get_mark('b').unwrap();
    assert_eq!(mark.position, Position::new(2, 0));
}

#[test]
fn test_mark_without_range_uses_caret_line() {
    let mut h = Harness::new(TEXT);
    h.feed("jll");
    h.ex("k c");
    let mark = h.session.state().marks.get_mark('c').unwrap();
    assert_eq!(mark.position, Position::new(1, 0));
}

#[test]
fn test_mark_errors() {
    let mut h = Harness::new(TEXT);
    assert_eq!(error_code(&mut h, "mark"), "E471");
    assert_eq!(error_code(&mut h, "mark ab"), "E488");
    assert_eq!(error_code(&mut h, "mark !"), "E191");
    assert_eq!(error_code(&mut h, "9mark a"), "E16");
}

#[test]
fn test_delmarks() {
    let mut h = Harness::new(TEXT);
    for name in ['a', 'b', 'c', 'd', 'A'] {
        h.ex(&format!("mark {name}"));
    }
    h.ex("delmarks a-c");
    let marks = &h.session.state().marks;
    assert!(marks.get_mark('a').is_none());
    assert!(marks.get_mark('c').is_none());
    assert!(marks.get_mark('d').is_some());
    h.ex("delm!");
    let marks = &h.session.state().marks;
    assert!(marks.get_mark('d').is_none());
    assert!(marks.get_mark('A').is_some());
    assert_eq!(error_code(&mut h, "delmarks c-a"), "E475");
    assert_eq!(error_code(&mut h, "delmarks"), "E471");
}

#[test]
fn test_marks_listing() {
    let mut h = Harness::new(TEXT);
    h.ex("2mark a");
    h.ex("marks a");
    let texts: Vec<String> = h.session.messages().iter().map(|m| m.text.clone()).collect();
    assert_eq!(texts[0], "mark line  col file/text");
    assert_eq!(texts[1], " a      2    0   two");
    assert_eq!(texts.len(), 2);
}

#[test]
fn test_line_number_goes_to_first_non_blank() {
    let mut h = Harness::new(TEXT);
    h.ex("2");
    assert_eq!(h.caret(), 6);
    assert_eq!(
        h.session.state().marks.get_mark('\'').unwrap().position,
        Position::new(0, 0)
    );
    h.ex("$-1");
    let state = h.session.state();
    assert_eq!(state.caret_position().line + 1, state.buffer().line_count() - 1);
}

#[test]
fn test_range_not_allowed_on_set() {
    let mut h = Harness::new(TEXT);
    assert_eq!(error_code(&mut h, "1set ic"), "E481");
}

#[test]
fn test_nohlsearch_clears_highlight() {
    let mut h = Harness::new(TEXT);
    h.engine().search.set_last("two", SearchDirection::Forward);
    assert!(h.engine().search.state().highlight);
    h.ex("noh");
    assert!(!h.engine().search.state().highlight);
    assert_eq!(h.engine().search.last_pattern().as_deref(), Some("two"));
}
