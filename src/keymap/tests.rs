use super::*;
use crate::key::{parse_keys, KeyEvent};
use crate::mode::VisualSubMode;

fn keys(s: &str) -> Vec<KeyEvent> {
    parse_keys(s)
}

fn to(s: &str) -> MappingTarget {
    MappingTarget::Keys(keys(s))
}

#[test]
fn test_trie_lookup() {
    let mut trie: TrieNode<u32> = TrieNode::new();
    trie.insert(&keys("dd"), 1);
    trie.insert(&keys("d"), 2);
    trie.insert(&keys("x"), 3);

    assert_eq!(trie.lookup(&keys("d")), MatchResult::Ambiguous(&2));
    assert_eq!(trie.lookup(&keys("dd")), MatchResult::Exact(&1));
    assert_eq!(trie.lookup(&keys("x")), MatchResult::Exact(&3));
    assert_eq!(trie.lookup(&keys("q")), MatchResult::None);
    assert_eq!(trie.longest_prefix(&keys("ddx")), Some((2, &1)));
    assert_eq!(trie.longest_prefix(&keys("dx")), Some((1, &2)));
}

#[test]
fn test_trie_retain_prunes() {
    let mut trie: TrieNode<u32> = TrieNode::new();
    trie.insert(&keys("abc"), 1);
    trie.retain(&mut |v: &mut u32| *v != 1);
    assert!(trie.is_empty());
}

#[test]
fn test_map_mode_specs() {
    assert_eq!(MapModes::from_spec(""), Some(MapModes::NVO));
    assert_eq!(
        MapModes::from_spec("v"),
        Some(MapModes::VISUAL | MapModes::SELECT)
    );
    assert_eq!(
        MapModes::from_spec("!"),
        Some(MapModes::INSERT | MapModes::CMDLINE)
    );
    assert_eq!(MapModes::from_spec("q"), None);
    assert_eq!(MapModes::NVO.to_string(), " ");
    assert_eq!((MapModes::NORMAL | MapModes::INSERT).to_string(), "ni");
}

#[test]
fn test_map_mode_for_mode() {
    assert_eq!(MapModes::for_mode(Mode::Normal, false), MapModes::NORMAL);
    assert_eq!(MapModes::for_mode(Mode::Normal, true), MapModes::OP_PENDING);
    assert_eq!(
        MapModes::for_mode(Mode::Visual(VisualSubMode::Line), false),
        MapModes::VISUAL
    );
    assert_eq!(MapModes::for_mode(Mode::Replace, false), MapModes::INSERT);
}

#[test]
fn test_resolve_exact_and_prefix() {
    let mut table = MappingTable::new();
    table
        .define(MapModes::INSERT, keys("jj"), to("<Esc>"), Owner::User, MapFlags::NOREMAP)
        .unwrap();

    assert_eq!(
        table.resolve(MapModes::INSERT, &keys("j")),
        Resolution::Prefix { exact: None }
    );
    match table.resolve(MapModes::INSERT, &keys("jj")) {
        Resolution::Exact(entry) => assert_eq!(entry.target, to("<Esc>")),
        other => panic!("expected exact match, got {other:?}"),
    }
    assert_eq!(table.resolve(MapModes::INSERT, &keys("jk")), Resolution::NoMatch);
    // Other modes are unaffected
    assert_eq!(table.resolve(MapModes::NORMAL, &keys("j")), Resolution::NoMatch);
}

#[test]
fn test_resolve_ambiguous_carries_exact() {
    let mut table = MappingTable::new();
    table
        .define(MapModes::NORMAL, keys("g"), to("x"), Owner::User, MapFlags::NOREMAP)
        .unwrap();
    table
        .define(MapModes::NORMAL, keys("gx"), to("y"), Owner::User, MapFlags::NOREMAP)
        .unwrap();

    match table.resolve(MapModes::NORMAL, &keys("g")) {
        Resolution::Prefix { exact: Some(entry) } => assert_eq!(entry.from, keys("g")),
        other => panic!("expected prefix with exact, got {other:?}"),
    }
}

#[test]
fn test_nowait_applies_immediately() {
    let mut table = MappingTable::new();
    table
        .define(
            MapModes::NORMAL,
            keys("g"),
            to("x"),
            Owner::User,
            MapFlags::NOREMAP.nowait(),
        )
        .unwrap();
    table
        .define(MapModes::NORMAL, keys("gx"), to("y"), Owner::User, MapFlags::NOREMAP)
        .unwrap();

    assert!(matches!(
        table.resolve(MapModes::NORMAL, &keys("g")),
        Resolution::Exact(_)
    ));
}

#[test]
fn test_same_owner_redefinition_overwrites() {
    let mut table = MappingTable::new();
    table
        .define(MapModes::NORMAL, keys("Q"), to("gq"), Owner::User, MapFlags::NOREMAP)
        .unwrap();
    table
        .define(MapModes::NORMAL, keys("Q"), to("dd"), Owner::User, MapFlags::RECURSIVE)
        .unwrap();

    let entries = table.entries(MapModes::NORMAL);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].target, to("dd"));
    assert!(entries[0].recursive);

    // Only one entry to remove
    assert_eq!(table.remove(&Owner::User, None, Some(&keys("Q"))), 1);
    assert!(table.is_empty());
}

#[test]
fn test_newest_owner_wins_and_bulk_remove() {
    let mut table = MappingTable::new();
    table
        .define(MapModes::NORMAL, keys("Q"), to("a"), Owner::InitScript, MapFlags::NOREMAP)
        .unwrap();
    table
        .define(
            MapModes::NORMAL,
            keys("Q"),
            to("b"),
            Owner::Plugin("x".into()),
            MapFlags::NOREMAP,
        )
        .unwrap();
    table
        .define(MapModes::NVO, keys("W"), to("c"), Owner::InitScript, MapFlags::NOREMAP)
        .unwrap();

    match table.resolve(MapModes::NORMAL, &keys("Q")) {
        Resolution::Exact(entry) => assert_eq!(entry.target, to("b")),
        other => panic!("unexpected {other:?}"),
    }

    // Removing the init script's mappings leaves the plugin's alone
    assert_eq!(table.remove(&Owner::InitScript, None, None), 5);
    match table.resolve(MapModes::NORMAL, &keys("Q")) {
        Resolution::Exact(entry) => assert_eq!(entry.owner, Owner::Plugin("x".into())),
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(table.resolve(MapModes::VISUAL, &keys("W")), Resolution::NoMatch);
}

#[test]
fn test_remove_restricted_to_mode() {
    let mut table = MappingTable::new();
    table
        .define(
            MapModes::VISUAL | MapModes::SELECT,
            keys("<C-x>"),
            to("d"),
            Owner::User,
            MapFlags::NOREMAP,
        )
        .unwrap();
    table.remove(&Owner::User, Some(MapModes::SELECT), None);

    assert!(matches!(
        table.resolve(MapModes::VISUAL, &keys("<C-x>")),
        Resolution::Exact(_)
    ));
    assert_eq!(table.resolve(MapModes::SELECT, &keys("<C-x>")), Resolution::NoMatch);
}

#[test]
fn test_unmap_missing_is_e31() {
    let mut table = MappingTable::new();
    let err = table
        .unmap(&Owner::User, MapModes::NORMAL, &keys("zz"))
        .unwrap_err();
    assert_eq!(err.code, "E31");
}

#[test]
fn test_define_rejects_empty() {
    let mut table = MappingTable::new();
    assert!(table
        .define(MapModes::NORMAL, Vec::new(), to("x"), Owner::User, MapFlags::NOREMAP)
        .is_err());
    assert!(table
        .define(MapModes::NONE, keys("a"), to("x"), Owner::User, MapFlags::NOREMAP)
        .is_err());
}

#[test]
fn test_longest_exact_prefix() {
    let mut table = MappingTable::new();
    table
        .define(MapModes::INSERT, keys("j"), to("J"), Owner::User, MapFlags::NOREMAP)
        .unwrap();
    table
        .define(MapModes::INSERT, keys("jjj"), to("<Esc>"), Owner::User, MapFlags::NOREMAP)
        .unwrap();

    let (len, entry) = table
        .longest_exact_prefix(MapModes::INSERT, &keys("jjx"))
        .unwrap();
    assert_eq!(len, 1);
    assert_eq!(entry.target, to("J"));
    assert!(table
        .longest_exact_prefix(MapModes::INSERT, &keys("x"))
        .is_none());
}

#[test]
fn test_entries_listing_deduplicates() {
    let mut table = MappingTable::new();
    table
        .define(MapModes::NVO, keys("a"), to("b"), Owner::User, MapFlags::NOREMAP)
        .unwrap();
    table
        .define(
            MapModes::NORMAL,
            keys("c"),
            MappingTarget::Handler("delete_char".into()),
            Owner::User,
            MapFlags::NOREMAP,
        )
        .unwrap();

    let entries = table.entries(MapModes::ALL);
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].from, keys("a"));
    assert_eq!(entries[1].target.to_string(), "<Action>(delete_char)");
}

#[test]
fn test_clear() {
    let mut table = MappingTable::new();
    table
        .define(MapModes::NVO, keys("a"), to("b"), Owner::User, MapFlags::NOREMAP)
        .unwrap();
    table.clear(MapModes::NORMAL);
    assert_eq!(table.resolve(MapModes::NORMAL, &keys("a")), Resolution::NoMatch);
    assert!(matches!(
        table.resolve(MapModes::VISUAL, &keys("a")),
        Resolution::Exact(_)
    ));
}
