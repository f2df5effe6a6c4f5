use expect_test::expect;
use refix_lang::LangGrammars;
use refix_tree::SyntaxKind::{self, *};
use refix_tree::{NodeId, SyntaxTree, TokenId};

use crate::Synchronizer;

fn tree(text: &str) -> SyntaxTree {
    refix_lang::parse(text).into_tree()
}

fn synchronizer() -> Synchronizer<'static> {
    Synchronizer::new(&LangGrammars).with_verify(true)
}

fn nth(tree: &SyntaxTree, kind: SyntaxKind, n: usize) -> NodeId {
    tree.preorder(tree.root()).filter(|&node| tree.kind(node) == kind).nth(n).unwrap()
}

fn live(tree: &SyntaxTree) -> Vec<TokenId> {
    tree.live_tokens().collect()
}

#[test]
fn clean_tree_is_left_alone() {
    let mut tree = tree("class A { int x; }");
    let before = live(&tree);
    let mut sync = synchronizer();

    let root = tree.root();
    sync.synchronize(&mut tree, root).unwrap();

    assert_eq!(live(&tree), before);
    assert!(sync.current(tree.root()).is_none());
}

#[test]
fn unchanged_attributes_keep_every_token() {
    let mut tree = tree("class A { int x[]; }");
    let var = nth(&tree, VARIABLE_ID, 0);
    let regions = tree.preorder(tree.root()).map(|node| tree.region(node)).collect::<Vec<_>>();
    let before = live(&tree);
    let mut sync = synchronizer();

    sync.capture(&tree, var).unwrap();
    tree.set_array_depth(var, 1);
    let root = tree.root();
    sync.synchronize(&mut tree, root).unwrap();
    assert!(!tree.is_dirty(tree.root()));

    let after = tree.preorder(tree.root()).map(|node| tree.region(node)).collect::<Vec<_>>();
    assert_eq!(after, regions);
    assert_eq!(live(&tree), before);

    let root = tree.root();
    sync.synchronize(&mut tree, root).unwrap();
    assert_eq!(live(&tree), before);
}

#[test]
fn array_depth_reuses_leading_brackets() {
    let mut tree = tree("class A { int x[]; }");
    let var = nth(&tree, VARIABLE_ID, 0);
    let mut sync = synchronizer();

    sync.capture(&tree, var).unwrap();
    tree.set_array_depth(var, 3);
    let root = tree.root();
    sync.synchronize(&mut tree, root).unwrap();

    assert_eq!(tree.render(), "class A { int x[][][]; }");
    let original = tree
        .region_tokens(tree.region(var))
        .map(|token| tree.token(token).origin().is_some())
        .collect::<Vec<_>>();
    assert_eq!(original, [true, true, true, false, false, false, false]);
    assert_eq!(tree.stringify(nth(&tree, VARIABLE_DECLARATOR, 0)), " x[][][]");
}

#[test]
fn trimmed_dimensions_move_the_parent_boundary() {
    let mut tree = tree("class A { int x[][], y; }");
    let var = nth(&tree, VARIABLE_ID, 0);
    let declarator = nth(&tree, VARIABLE_DECLARATOR, 0);
    let field = nth(&tree, FIELD_DECL, 0);
    let field_region = tree.region(field);
    let mut sync = synchronizer();

    sync.capture(&tree, var).unwrap();
    tree.set_array_depth(var, 0);
    let root = tree.root();
    sync.synchronize(&mut tree, root).unwrap();

    assert_eq!(tree.render(), "class A { int x, y; }");
    assert_eq!(tree.region(declarator), tree.region(var));
    assert_eq!(tree.stringify(declarator), " x");
    assert_eq!(tree.region(field), field_region);
}

#[test]
fn subtree_sync_stops_at_the_first_independent_ancestor() {
    let mut tree = tree("class A { int x[][], y; }");
    let var = nth(&tree, VARIABLE_ID, 0);
    let declarator = nth(&tree, VARIABLE_DECLARATOR, 0);
    let field = nth(&tree, FIELD_DECL, 0);
    let field_region = tree.region(field);
    let mut sync = synchronizer();

    sync.capture(&tree, var).unwrap();
    tree.set_image(var, "z");
    tree.set_array_depth(var, 0);
    sync.synchronize(&mut tree, var).unwrap();

    let z = tree.region(var);
    assert_eq!(z.first, z.last);
    assert_eq!(tree.token(z.first).text(), "z");
    assert!(tree.is_dirty(declarator));
    assert_eq!(tree.region(declarator), z);
    assert_eq!(tree.region(field), field_region);
    assert_eq!(tree.stringify(field), " int z, y;");
    assert_eq!(tree.render(), "class A { int z, y; }");
}

#[test]
fn root_boundary_follows_a_new_first_token() {
    let mut tree = tree("class A { }");
    let class = nth(&tree, CLASS_DECL, 0);
    let mut sync = synchronizer();

    sync.capture(&tree, class).unwrap();
    tree.set_modifier(class, PUBLIC_KW, true);
    let root = tree.root();
    sync.synchronize(&mut tree, root).unwrap();

    assert_eq!(tree.render(), "public class A { }");
    let first = tree.region(tree.root()).first;
    assert_eq!(first, tree.head());
    assert_eq!(tree.token(first).text(), "public");
    assert_eq!(tree.region(class).first, first);
}

#[test]
fn new_modifiers_are_minted_in_canonical_order() {
    let mut tree = tree("class A { int x; }");
    let field = nth(&tree, FIELD_DECL, 0);
    let mut sync = synchronizer();

    sync.capture(&tree, field).unwrap();
    tree.set_modifier(field, FINAL_KW, true);
    tree.set_modifier(field, STATIC_KW, true);
    let root = tree.root();
    sync.synchronize(&mut tree, root).unwrap();

    assert_eq!(tree.render(), "class A { static final int x; }");
    let baseline = sync.baseline(field).unwrap();
    let current = sync.current(field).unwrap();
    assert!(baseline.shape_eq(current));
    assert_ne!(baseline, current);
    expect![[r#"
        !Reentrant(Modifiers([PUBLIC_KW, PROTECTED_KW, PRIVATE_KW, ABSTRACT_KW, STATIC_KW, FINAL_KW, TRANSIENT_KW, VOLATILE_KW, SYNCHRONIZED_KW, NATIVE_KW])) "static final"
        !ChildOfKind(TYPE) "int"
        !ChildOfKind(VARIABLE_DECLARATOR) "x"
        !LiteralToken(SEMICOLON, ";") ";"
    "#]]
    .assert_eq(&current.debug(&tree));
}

#[test]
fn retained_modifiers_keep_their_relative_order() {
    let cases = [
        ("class A { final int x; }", [PUBLIC_KW, STATIC_KW], "class A { public static final int x; }"),
        ("class A { static public int x; }", [FINAL_KW, STATIC_KW], "class A { static public final int x; }"),
    ];
    for (text, enable, expected) in cases {
        let mut tree = tree(text);
        let field = nth(&tree, FIELD_DECL, 0);
        let mut sync = synchronizer();

        sync.capture(&tree, field).unwrap();
        for modifier in enable {
            tree.set_modifier(field, modifier, true);
        }
        let root = tree.root();
        sync.synchronize(&mut tree, root).unwrap();
        assert_eq!(tree.render(), expected);
    }
}

#[test]
fn disabled_modifiers_are_dropped() {
    let mut tree = tree("class A { public static int x; }");
    let field = nth(&tree, FIELD_DECL, 0);
    let mut sync = synchronizer();

    sync.capture(&tree, field).unwrap();
    tree.set_modifier(field, PUBLIC_KW, false);
    tree.set_modifier(field, STATIC_KW, false);
    let root = tree.root();
    sync.synchronize(&mut tree, root).unwrap();

    assert_eq!(tree.render(), "class A { int x; }");
    assert_eq!(tree.token(tree.region(field).first).text(), "int");
}

#[test]
fn changed_image_mints_a_token() {
    let mut tree = tree("class A { int x = y; }");
    let name = nth(&tree, NAME_EXPR, 0);
    let var = nth(&tree, VARIABLE_ID, 0);
    let mut sync = synchronizer();

    sync.capture(&tree, name).unwrap();
    tree.set_image(name, "count");
    sync.capture(&tree, var).unwrap();
    tree.set_image(var, "x");
    let root = tree.root();
    sync.synchronize(&mut tree, root).unwrap();

    assert_eq!(tree.render(), "class A { int x = count; }");
    assert!(tree.token(tree.region(name).first).is_minted());
    assert!(!tree.token(tree.region(var).first).is_minted());
}

#[test]
fn inserted_nodes_are_generated() {
    let mut tree = tree("class A { int x; }");
    let field = nth(&tree, FIELD_DECL, 0);
    let mut sync = synchronizer();

    sync.capture(&tree, field).unwrap();
    let declarator = tree.new_node(VARIABLE_DECLARATOR);
    let var = tree.new_node(VARIABLE_ID);
    tree.set_image(var, "y");
    tree.insert_child(declarator, 0, var).unwrap();
    tree.insert_child(field, 2, declarator).unwrap();
    let root = tree.root();
    sync.synchronize(&mut tree, root).unwrap();

    assert_eq!(tree.render(), "class A { int x, y; }");
    assert_eq!(tree.stringify(declarator), "y");
    assert!(sync.baseline(declarator).is_none());
}

#[test]
fn removing_a_middle_declarator_keeps_the_first_comma() {
    let mut tree = tree("class A { int a, b, c; }");
    let field = nth(&tree, FIELD_DECL, 0);
    let first_comma = tree.own_tokens(field)[0];
    let mut sync = synchronizer();

    sync.capture(&tree, field).unwrap();
    tree.remove_child(field, 2).unwrap();
    let root = tree.root();
    sync.synchronize(&mut tree, root).unwrap();

    assert_eq!(tree.render(), "class A { int a, c; }");
    assert_eq!(tree.own_tokens(field)[0], first_comma);
}

#[test]
fn missing_mandatory_child_is_a_mismatch() {
    let mut tree = tree("class A { int x; }");
    let field = nth(&tree, FIELD_DECL, 0);
    let mut sync = synchronizer();

    sync.capture(&tree, field).unwrap();
    tree.remove_child(field, 0).unwrap();
    let root = tree.root();
    let error = sync.synchronize(&mut tree, root).unwrap_err();

    expect!["`FIELD_DECL` does not match its grammar: no structure matches under ChildrenOnly"]
        .assert_eq(&error.to_string());
}

#[test]
fn keyword_image_cannot_be_spelled() {
    let mut tree = tree("class A { int x; }");
    let var = nth(&tree, VARIABLE_ID, 0);
    let mut sync = synchronizer();

    sync.capture(&tree, var).unwrap();
    tree.set_image(var, "int");
    let root = tree.root();
    let error = sync.synchronize(&mut tree, root).unwrap_err();

    expect![[r#"`VARIABLE_ID` does not match its grammar: "int" cannot be spelled as Identifier"#]]
        .assert_eq(&error.to_string());
}
