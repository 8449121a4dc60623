//! Declaration tree: arena, merge and normalization.

use declgen::runtime::{MixinKind, ParamKind, Visibility};
use declgen::tree::{
    ConflictKind, Const, ConstValue, DeclTree, Method, Mixin, Node, NodeId, Param, Scope,
    ScopeKind, merge, merge_all, normalize,
};
use declgen::{Keep, Name};

fn scope(tree: &mut DeclTree, name: &str) -> NodeId {
    let root = tree.root();
    tree.add_child(root, Node::Scope(Scope::class(name, None)))
}

fn method(tree: &mut DeclTree, parent: NodeId, name: &str, ret: &str) -> NodeId {
    let mut m = Method::new(name, false);
    m.return_type = Some(ret.to_string());
    tree.add_child(parent, Node::Method(m))
}

fn child_names(tree: &DeclTree, id: NodeId) -> Vec<String> {
    tree.children(id).iter().map(|&c| tree.get(c).name()).collect()
}

// --- arena ---

#[test]
fn test_add_child_dedups_identical_nodes() {
    let mut tree = DeclTree::new();
    let a = scope(&mut tree, "Foo");
    let b = scope(&mut tree, "Foo");
    assert_eq!(a, b);
    assert_eq!(tree.len(), 1);
}

#[test]
fn test_add_child_keeps_first_on_same_key() {
    let mut tree = DeclTree::new();
    let foo = scope(&mut tree, "Foo");
    let first = method(&mut tree, foo, "m", "Integer");
    let second = method(&mut tree, foo, "m", "String");
    assert_eq!(first, second);
    let m = tree.get(first).as_method().unwrap();
    assert_eq!(m.return_type.as_deref(), Some("Integer"));
}

#[test]
fn test_paths_and_find_path() {
    let mut tree = DeclTree::new();
    let foo = scope(&mut tree, "Foo");
    method(&mut tree, foo, "bar", "any");
    assert_eq!(tree.paths(), vec!["Foo", "Foo::bar"]);
    let found = tree.find_path("Foo::bar").unwrap();
    assert_eq!(tree.path_of(found), "Foo::bar");
    assert!(tree.find_path("Foo::baz").is_none());
    assert_eq!(tree.find_scope("Foo"), Some(foo));
}

#[test]
fn test_remove_empty_scope_only_removes_empty() {
    let mut tree = DeclTree::new();
    let empty = scope(&mut tree, "Empty");
    let full = scope(&mut tree, "Full");
    method(&mut tree, full, "m", "any");

    assert!(!tree.remove_empty_scope(full));
    assert!(tree.remove_empty_scope(empty));
    assert!(!tree.is_attached(empty));
    assert!(tree.find_scope("Empty").is_none());
    assert_eq!(tree.paths(), vec!["Full", "Full::m"]);
}

#[test]
fn test_remove_empty_scope_refuses_non_scope() {
    let mut tree = DeclTree::new();
    let root = tree.root();
    let c = tree.add_child(
        root,
        Node::Const(Const::new("MAX", ConstValue::Instance("Integer".into()))),
    );
    assert!(!tree.remove_empty_scope(c));
    assert!(!tree.remove_empty_scope(root));
}

#[test]
fn test_subtree_eq_across_trees() {
    let mut a = DeclTree::new();
    let mut b = DeclTree::new();
    let fa = scope(&mut a, "Foo");
    let fb = scope(&mut b, "Foo");
    method(&mut a, fa, "m", "any");
    method(&mut b, fb, "m", "any");
    assert!(a.subtree_eq(fa, &b, fb));
    method(&mut b, fb, "n", "any");
    assert!(!a.subtree_eq(fa, &b, fb));
}

#[test]
fn test_to_json_nests_children() {
    let mut tree = DeclTree::new();
    let foo = scope(&mut tree, "Foo");
    method(&mut tree, foo, "bar", "any");
    let json = tree.to_json();
    assert_eq!(json[0]["node"], "scope");
    assert_eq!(json[0]["name"], "Foo");
    assert_eq!(json[0]["kind"], "class");
    assert_eq!(json[0]["children"][0]["node"], "method");
    assert_eq!(json[0]["children"][0]["name"], "bar");
}

// --- merge ---

#[test]
fn test_merge_disjoint_trees_has_no_conflicts() {
    let mut a = DeclTree::new();
    scope(&mut a, "X");
    scope(&mut a, "Y");
    let mut b = DeclTree::new();
    scope(&mut b, "Z");

    let out = merge(&a, &b, Keep::Left);
    assert!(out.conflicts.is_empty());
    let mut paths = out.tree.paths();
    paths.sort();
    assert_eq!(paths, vec!["X", "Y", "Z"]);
}

#[test]
fn test_merge_identical_nodes_keeps_one_copy() {
    let mut a = DeclTree::new();
    let x = scope(&mut a, "X");
    method(&mut a, x, "m", "any");
    let b = {
        let mut b = DeclTree::new();
        let x = scope(&mut b, "X");
        method(&mut b, x, "m", "any");
        b
    };
    let out = merge(&a, &b, Keep::Left);
    assert!(out.conflicts.is_empty());
    assert_eq!(out.tree.paths(), vec!["X", "X::m"]);
}

#[test]
fn test_merge_combines_scope_children() {
    let mut a = DeclTree::new();
    let x = scope(&mut a, "X");
    method(&mut a, x, "m", "any");
    let mut b = DeclTree::new();
    let x = scope(&mut b, "X");
    method(&mut b, x, "n", "any");

    let out = merge(&a, &b, Keep::Left);
    assert!(out.conflicts.is_empty());
    assert_eq!(out.tree.paths(), vec!["X", "X::m", "X::n"]);
}

#[test]
fn test_merge_method_conflict_keep_left() {
    let mut a = DeclTree::new();
    let x = scope(&mut a, "X");
    method(&mut a, x, "m", "Integer");
    let mut b = DeclTree::new();
    let x = scope(&mut b, "X");
    method(&mut b, x, "m", "String");

    let out = merge(&a, &b, Keep::Left);
    assert_eq!(out.conflicts.len(), 1);
    let c = &out.conflicts[0];
    assert_eq!(c.path, Name::new("X::m"));
    assert_eq!(c.kind, ConflictKind::Method);

    let merged = out.tree.find_path("X::m").unwrap();
    let original = a.find_path("X::m").unwrap();
    assert!(out.tree.subtree_eq(merged, &a, original));
}

#[test]
fn test_merge_method_conflict_keep_right() {
    let mut a = DeclTree::new();
    let x = scope(&mut a, "X");
    method(&mut a, x, "m", "Integer");
    let mut b = DeclTree::new();
    let x = scope(&mut b, "X");
    method(&mut b, x, "m", "String");

    let out = merge(&a, &b, Keep::Right);
    assert_eq!(out.conflicts.len(), 1);
    let merged = out.tree.find_path("X::m").unwrap();
    let m = out.tree.get(merged).as_method().unwrap();
    assert_eq!(m.return_type.as_deref(), Some("String"));
}

#[test]
fn test_merge_scope_header_conflict_still_merges_children() {
    let mut a = DeclTree::new();
    let root = a.root();
    let x = a.add_child(root, Node::Scope(Scope::class("X", Some("Base".into()))));
    method(&mut a, x, "m", "any");
    let mut b = DeclTree::new();
    let root = b.root();
    let x = b.add_child(root, Node::Scope(Scope::class("X", Some("Other".into()))));
    method(&mut b, x, "n", "any");

    let out = merge(&a, &b, Keep::Left);
    assert_eq!(out.conflicts.len(), 1);
    assert_eq!(out.conflicts[0].kind, ConflictKind::Scope);
    let merged = out.tree.find_scope("X").unwrap();
    let s = out.tree.get(merged).as_scope().unwrap();
    assert_eq!(s.superclass.as_deref(), Some("Base"));
    assert_eq!(out.tree.paths(), vec!["X", "X::m", "X::n"]);
}

#[test]
fn test_merge_const_conflict() {
    let mut a = DeclTree::new();
    let root = a.root();
    a.add_child(
        root,
        Node::Const(Const::new("V", ConstValue::Instance("Integer".into()))),
    );
    let mut b = DeclTree::new();
    let root = b.root();
    b.add_child(
        root,
        Node::Const(Const::new("V", ConstValue::Instance("String".into()))),
    );
    let out = merge(&a, &b, Keep::Left);
    assert_eq!(out.conflicts.len(), 1);
    assert_eq!(out.conflicts[0].kind, ConflictKind::Const);
    assert_eq!(out.conflicts[0].path, Name::new("V"));
}

#[test]
fn test_merge_scope_against_const_with_same_name() {
    let mut a = DeclTree::new();
    let foo = scope(&mut a, "Foo");
    method(&mut a, foo, "bar", "any");
    let mut b = DeclTree::new();
    let root = b.root();
    b.add_child(
        root,
        Node::Const(Const::new("Foo", ConstValue::Alias("Bar".into()))),
    );

    let out = merge(&a, &b, Keep::Left);
    assert_eq!(out.conflicts.len(), 1);
    assert_eq!(out.conflicts[0].kind, ConflictKind::Scope);
    assert_eq!(out.conflicts[0].path, Name::new("Foo"));
    assert_eq!(out.tree.paths(), vec!["Foo", "Foo::bar"]);

    let out = merge(&b, &a, Keep::Left);
    assert_eq!(out.conflicts.len(), 1);
    assert_eq!(out.conflicts[0].kind, ConflictKind::Scope);
    assert_eq!(out.tree.paths(), vec!["Foo"]);
    assert!(out.tree.find_scope("Foo").is_none());
}

#[test]
fn test_merge_scope_replaced_by_const_when_keeping_right() {
    let mut a = DeclTree::new();
    let foo = scope(&mut a, "Foo");
    method(&mut a, foo, "bar", "any");
    let mut b = DeclTree::new();
    let root = b.root();
    b.add_child(
        root,
        Node::Const(Const::new("Foo", ConstValue::Alias("Bar".into()))),
    );

    let out = merge(&a, &b, Keep::Right);
    assert_eq!(out.tree.paths(), vec!["Foo"]);
    let id = out.tree.find_path("Foo").unwrap();
    assert!(matches!(out.tree.get(id), Node::Const(_)));
}

#[test]
fn test_merge_all_folds_left_to_right() {
    let trees: Vec<DeclTree> = ["A", "B", "C"]
        .iter()
        .map(|n| {
            let mut t = DeclTree::new();
            scope(&mut t, n);
            t
        })
        .collect();
    let out = merge_all(trees, Keep::Left);
    assert!(out.conflicts.is_empty());
    assert_eq!(out.tree.paths(), vec!["A", "B", "C"]);
}

// --- normalize ---

#[test]
fn test_normalize_nests_singleton_methods() {
    let mut tree = DeclTree::new();
    let foo = scope(&mut tree, "Foo");
    tree.add_child(foo, Node::Method(Method::new("create", true)));
    method(&mut tree, foo, "save", "any");

    normalize(&mut tree);
    assert_eq!(
        tree.paths(),
        vec!["Foo", "Foo::self", "Foo::self::create", "Foo::save"]
    );
    let holder = tree.find_path("Foo::self").unwrap();
    assert_eq!(
        tree.get(holder).as_scope().unwrap().kind,
        ScopeKind::SingletonClass
    );
    let create = tree.find_path("Foo::self::create").unwrap();
    assert!(!tree.get(create).as_method().unwrap().singleton);
}

#[test]
fn test_normalize_sorts_by_group_visibility_and_name() {
    let mut tree = DeclTree::new();
    let foo = scope(&mut tree, "Foo");
    let mut private = Method::new("a_private", false);
    private.visibility = Visibility::Private;
    tree.add_child(foo, Node::Method(private));
    method(&mut tree, foo, "zeta", "any");
    method(&mut tree, foo, "alpha", "any");
    tree.add_child(
        foo,
        Node::Const(Const::new("LIMIT", ConstValue::Instance("Integer".into()))),
    );
    tree.add_child(
        foo,
        Node::Mixin(Mixin {
            kind: MixinKind::Include,
            target: "Comparable".into(),
        }),
    );

    normalize(&mut tree);
    assert_eq!(
        child_names(&tree, foo),
        vec!["Comparable", "LIMIT", "alpha", "zeta", "a_private"]
    );
}

#[test]
fn test_normalize_sorts_top_level_scopes() {
    let mut tree = DeclTree::new();
    scope(&mut tree, "Zed");
    scope(&mut tree, "Alpha");
    normalize(&mut tree);
    let root = tree.root();
    assert_eq!(child_names(&tree, root), vec!["Alpha", "Zed"]);
}

#[test]
fn test_untyped_param_type() {
    let p = Param::untyped(ParamKind::Rest, "args");
    assert_eq!(p.ty, "any");
    assert_eq!(p.kind, ParamKind::Rest);
}
