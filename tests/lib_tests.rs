use clap::Parser;
use declgen::engine::{Cli, Worklist, glob_match, is_valid_constant_name, is_valid_method_name};
use declgen::runtime::ObjectId;
use declgen::symbols::parse_symbol_table;
use declgen::{Keep, Name, Warning};

// --- Name ---

#[test]
fn test_name_canonical_form_has_root_marker() {
    assert_eq!(Name::new("Foo::Bar").as_str(), "::Foo::Bar");
    assert_eq!(Name::new("::Foo::Bar").as_str(), "::Foo::Bar");
    assert_eq!(Name::new("  Foo::Bar ").as_str(), "::Foo::Bar");
}

#[test]
fn test_name_equality_uses_canonical_form() {
    assert_eq!(Name::new("Foo"), Name::new("::Foo"));
    assert_ne!(Name::new("Foo"), Name::new("Foo::Foo"));
}

#[test]
fn test_name_relative_and_segments() {
    let name = Name::new("A::B::C");
    assert_eq!(name.relative(), "A::B::C");
    assert_eq!(name.segments().collect::<Vec<_>>(), vec!["A", "B", "C"]);
    assert_eq!(name.last_segment(), "C");
}

#[test]
fn test_name_child_and_parent() {
    let root = Name::root();
    assert!(root.is_root());
    assert_eq!(root.child("Foo"), Name::new("Foo"));
    assert_eq!(Name::new("Foo").child("Bar"), Name::new("Foo::Bar"));
    assert_eq!(Name::new("Foo::Bar").parent(), Some(Name::new("Foo")));
    assert_eq!(Name::new("Foo").parent(), Some(Name::root()));
    assert_eq!(root.parent(), None);
}

#[test]
fn test_warning_display_includes_root() {
    let w = Warning::new(Some(&Name::new("Post")), "boom");
    assert_eq!(w.to_string(), "[Post] boom");
    assert_eq!(Warning::new(None, "plain").to_string(), "plain");
}

#[test]
fn test_keep_defaults_to_left() {
    assert_eq!(Keep::default(), Keep::Left);
}

// --- glob_match ---

#[test]
fn test_glob_match_star() {
    assert!(glob_match("Foo::*", "Foo::Bar"));
    assert!(glob_match("Foo::*", "Foo::Bar::Baz"));
    assert!(!glob_match("Foo::*", "Bar::Foo"));
    assert!(glob_match("*Internal*", "Foo::Internal::Thing"));
}

#[test]
fn test_glob_match_question_and_exact() {
    assert!(glob_match("Fo?", "Foo"));
    assert!(!glob_match("Fo?", "Fooo"));
    assert!(glob_match("Foo", "Foo"));
    assert!(!glob_match("Foo", "Food"));
}

// --- name validation ---

#[test]
fn test_valid_constant_names() {
    assert!(is_valid_constant_name("Foo"));
    assert!(is_valid_constant_name("FOO_BAR2"));
    assert!(!is_valid_constant_name("foo"));
    assert!(!is_valid_constant_name("_Foo"));
    assert!(!is_valid_constant_name("Foo-Bar"));
    assert!(!is_valid_constant_name(""));
}

#[test]
fn test_valid_method_names() {
    assert!(is_valid_method_name("bar"));
    assert!(is_valid_method_name("empty?"));
    assert!(is_valid_method_name("save!"));
    assert!(is_valid_method_name("name="));
    assert!(is_valid_method_name("<=>"));
    assert!(is_valid_method_name("[]="));
    assert!(!is_valid_method_name("1abc"));
    assert!(!is_valid_method_name("has space"));
    assert!(!is_valid_method_name(""));
}

// --- Worklist ---

#[test]
fn test_worklist_push_is_idempotent() {
    let mut wl = Worklist::new();
    assert!(wl.push(Name::new("Foo")));
    assert!(!wl.push(Name::new("::Foo")));
    assert_eq!(wl.pending(), 1);
    assert!(wl.pop().is_some());
    assert!(wl.pop().is_none());
    assert_eq!(wl.expanded(), 1);
}

#[test]
fn test_worklist_push_after_visit_is_noop() {
    let mut wl = Worklist::new();
    wl.push(Name::new("Foo"));
    wl.pop();
    assert!(!wl.push(Name::new("Foo")));
    assert!(!wl.push_constant(Name::new("Foo"), ObjectId(3)));
    assert!(wl.is_empty());
    assert!(wl.contains(&Name::new("Foo")));
}

#[test]
fn test_worklist_is_fifo_and_keeps_handles() {
    let mut wl = Worklist::new();
    wl.push(Name::new("A"));
    wl.push_constant(Name::new("B"), ObjectId(7));
    let a = wl.pop().unwrap();
    let b = wl.pop().unwrap();
    assert_eq!(a.name, Name::new("A"));
    assert_eq!(a.value, None);
    assert_eq!(b.name, Name::new("B"));
    assert_eq!(b.value, Some(ObjectId(7)));
}

// --- symbol table ---

const SYMBOL_TABLE: &str = r#"{
  "kind": "CLASS_OR_MODULE",
  "name": { "name": "<root>" },
  "children": [
    {
      "kind": "CLASS_OR_MODULE",
      "name": { "name": "Foo" },
      "children": [
        { "kind": "STATIC_FIELD", "name": { "name": "VERSION" } },
        { "kind": "METHOD", "name": { "name": "bar" } },
        { "kind": "CLASS_OR_MODULE", "name": { "name": "<Magic>" } },
        { "kind": "CLASS_OR_MODULE", "name": { "name": "123" } },
        {
          "kind": "CLASS_OR_MODULE",
          "name": { "name": "Inner" },
          "children": [{ "kind": "CLASS_OR_MODULE", "name": { "name": "Deep" } }]
        }
      ]
    },
    { "kind": "TYPE_ALIAS", "name": { "name": "Alias" } }
  ]
}"#;

#[test]
fn test_parse_symbol_table_keeps_allowed_kinds() {
    let set = parse_symbol_table(SYMBOL_TABLE).unwrap();
    assert!(set.contains(&Name::new("Foo")));
    assert!(set.contains(&Name::new("Foo::VERSION")));
    assert!(set.contains(&Name::new("Foo::Inner::Deep")));
    assert!(!set.contains(&Name::new("Foo::bar")));
    assert!(!set.contains(&Name::new("Alias")));
    assert_eq!(set.len(), 4);
}

#[test]
fn test_parse_symbol_table_drops_reserved_and_numeric_names() {
    let set = parse_symbol_table(SYMBOL_TABLE).unwrap();
    assert!(!set.contains(&Name::new("Foo::<Magic>")));
    assert!(!set.contains(&Name::new("Foo::123")));
    assert!(!set.contains(&Name::new("<root>")));
}

#[test]
fn test_parse_symbol_table_rejects_bad_json() {
    assert!(parse_symbol_table("{ not json").is_err());
}

#[test]
fn test_symbol_set_sorted() {
    let set: declgen::SymbolSet = ["B", "A::C", "A"].into_iter().collect();
    let sorted: Vec<String> = set.sorted().iter().map(|n| n.relative().to_string()).collect();
    assert_eq!(sorted, vec!["A", "A::C", "B"]);
}

// --- command line ---

#[test]
fn test_symbol_command_leaves_following_flags_alone() {
    let cli = Cli::parse_from([
        "declgen",
        "image.json",
        "--symbol-command",
        "srb-symbols --print-json",
        "-w",
        "1",
        "--strict",
    ]);
    assert_eq!(cli.workers, Some(1));
    assert_eq!(cli.strict, Some(true));
    assert_eq!(cli.symbol_command_argv(), vec!["srb-symbols", "--print-json"]);
    assert!(cli.roots.is_empty());
}

#[test]
fn test_roots_after_symbol_command_stay_roots() {
    let cli = Cli::parse_from([
        "declgen",
        "image.json",
        "Post",
        "--symbol-command",
        "srb-symbols",
        "Comment",
    ]);
    assert_eq!(cli.symbol_command_argv(), vec!["srb-symbols"]);
    assert_eq!(cli.root_names(), vec![Name::new("Post"), Name::new("Comment")]);
}

#[test]
fn test_symbol_command_absent_is_empty() {
    let cli = Cli::parse_from(["declgen", "image.json"]);
    assert!(cli.symbol_command_argv().is_empty());
}
