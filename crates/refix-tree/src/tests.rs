use expect_test::expect;
use text_size::{TextRange, TextSize};

use crate::SyntaxKind::*;
use crate::{Attachment, Builder, NodeId, SyntaxKind, SyntaxTree, TriviaPiece, TriviaPieceKind};

fn ws(len: u32) -> TriviaPiece {
    TriviaPiece::new(TriviaPieceKind::Whitespace, len.into())
}

fn leaf(builder: &mut Builder, kind: SyntaxKind, leading: Option<u32>, token: SyntaxKind, len: u32) {
    builder.start_node(kind);
    builder.token(leading.map(ws).into_iter(), token, len.into());
    builder.finish_node();
}

/// `  int x;\n` as a field declaration.
fn field() -> SyntaxTree {
    let mut builder = Builder::new("  int x;\n");
    builder.start_node(FIELD_DECL);
    builder.start_node(TYPE);
    leaf(&mut builder, PRIMITIVE_TYPE, Some(2), INT_KW, 3);
    builder.finish_node();
    builder.start_node(VARIABLE_DECLARATOR);
    leaf(&mut builder, VARIABLE_ID, Some(1), IDENT, 1);
    builder.finish_node();
    builder.token(std::iter::empty(), SEMICOLON, 1.into());
    builder.finish_node();
    builder.finish([TriviaPiece::new(TriviaPieceKind::Newline, 1.into())].into_iter())
}

fn child(tree: &SyntaxTree, path: &[usize]) -> NodeId {
    path.iter().fold(tree.root(), |node, &index| tree.children(node)[index])
}

#[test]
fn builder_records_regions_and_origins() {
    let tree = field();
    let root = tree.root();

    expect![[r#"
        FIELD_DECL ";"
          TYPE
            PRIMITIVE_TYPE "int"
          VARIABLE_DECLARATOR
            VARIABLE_ID "x"
    "#]]
    .assert_eq(&tree.debug_tree(root));

    assert_eq!(tree.render(), tree.text());
    assert_eq!(tree.stringify(root), "  int x;");
    assert_eq!(tree.node_origin(root), Some(TextRange::new(0.into(), 8.into())));

    let declarator = child(&tree, &[1]);
    assert_eq!(tree.node_origin(declarator), Some(TextRange::new(5.into(), 7.into())));
    assert_eq!(tree.region(declarator), tree.region(child(&tree, &[1, 0])));
    assert_eq!(tree.region(root).first, tree.region(child(&tree, &[0, 0])).first);
}

#[test]
fn token_chain_and_attachment() {
    let mut tree = field();
    let tokens = tree.live_tokens().collect::<Vec<_>>();
    let texts = tokens.iter().map(|&token| tree.token(token).text()).collect::<Vec<_>>();
    assert_eq!(texts, ["int", "x", ";"]);

    let root = tree.root();
    assert_eq!(tree.attachment(root), Attachment::Head);
    assert_eq!(tree.attachment(child(&tree, &[0, 0])), Attachment::Head);
    assert_eq!(tree.attachment(child(&tree, &[1])), Attachment::After(tokens[0]));
    assert_eq!(tree.attachment(child(&tree, &[1, 0])), Attachment::After(tokens[0]));

    let minted = tree.mint_token(STATIC_KW, "static");
    assert!(tree.token(minted).is_minted());
    let fresh = tree.new_node(VARIABLE_DECLARATOR);
    assert_eq!(tree.attachment(fresh), Attachment::Detached);
    let removed = tree.remove_child(root, 1).unwrap();
    assert_eq!(tree.attachment(removed), Attachment::Detached);

    let int_range = tree.token_range(tokens[0]).unwrap();
    assert_eq!(int_range, TextRange::new(TextSize::new(0), TextSize::new(5)));
    assert_eq!(tree.own_tokens(tree.root()), [tokens[2]]);
}

#[test]
fn minted_tokens_render_with_separators() {
    let mut tree = field();
    let root = tree.root();
    let first = tree.region(root).first;
    let last = tree.region(root).last;

    let public = tree.mint_token(PUBLIC_KW, "public");
    tree.link(public, Some(first));
    tree.set_head(public);
    let open = tree.mint_token(LEFT_BRACKET, "[");
    let close = tree.mint_token(RIGHT_BRACKET, "]");
    let x = tree.live_tokens().nth(2).unwrap();
    let semicolon = tree.token(x).next();
    tree.link(x, Some(open));
    tree.link(open, Some(close));
    tree.link(close, semicolon);
    tree.set_region(root, crate::TokenRegion::new(public, last));

    assert_eq!(tree.stringify(root), "public  int x[];");
    assert_eq!(tree.render(), "public  int x[];\n");
}

#[test]
fn edits_keep_children_contiguous() {
    let mut tree = field();
    let root = tree.root();
    let ty = child(&tree, &[0]);
    let declarator = child(&tree, &[1]);

    let literal = tree.new_node(LITERAL);
    assert!(tree.node(literal).dirty_self());

    tree.insert_child(root, 1, literal).unwrap();
    assert_eq!(tree.children(root), [ty, literal, declarator]);
    assert_eq!(tree.node(declarator).index(), 2);
    assert_eq!(tree.parent(literal), Some(root));
    assert!(tree.node(root).dirty_self());

    let removed = tree.remove_child(root, 0).unwrap();
    assert_eq!(removed, ty);
    assert_eq!(tree.parent(ty), None);
    assert_eq!(tree.node(literal).index(), 0);
    assert_eq!(tree.node(declarator).index(), 1);

    let old = tree.replace_child(root, 0, ty).unwrap();
    assert_eq!(old, literal);
    assert_eq!(tree.children(root), [ty, declarator]);
    assert_eq!(tree.node(ty).index(), 0);
    assert_eq!(tree.parent(literal), None);
}

#[test]
fn malformed_edits_are_rejected() {
    let mut tree = field();
    let root = tree.root();
    let ty = child(&tree, &[0]);

    let fresh = tree.new_node(NAME_EXPR);
    let errors = [
        tree.insert_child(root, 3, fresh).unwrap_err(),
        tree.insert_child(root, 0, ty).unwrap_err(),
        tree.insert_child(ty, 0, root).unwrap_err(),
        tree.remove_child(root, 2).unwrap_err(),
    ];
    let inner = tree.new_node(LITERAL);
    tree.insert_child(fresh, 0, inner).unwrap();
    let cycle = tree.insert_child(inner, 0, fresh).unwrap_err();

    let rendered = errors.iter().chain([&cycle]).map(ToString::to_string).collect::<Vec<_>>();
    expect![[r#"
        [
            "malformed edit: insert index 3 out of bounds for 2 children",
            "malformed edit: TYPE is still attached to #0",
            "malformed edit: the root cannot become a child",
            "malformed edit: child index 2 out of bounds for 2 children",
            "malformed edit: NAME_EXPR cannot be inserted into its own subtree",
        ]
    "#]]
    .assert_debug_eq(&rendered);
    assert_eq!(tree.children(root).len(), 2);
}

#[test]
fn attribute_edits_dirty_the_ancestor_chain() {
    let mut tree = field();
    let root = tree.root();
    let declarator = child(&tree, &[1]);
    let id = child(&tree, &[1, 0]);
    let ty = child(&tree, &[0]);

    assert!(!tree.is_dirty(root));
    tree.set_array_depth(id, 2);

    assert!(tree.node(id).dirty_self());
    assert!(tree.node(declarator).dirty_children());
    assert!(!tree.node(declarator).dirty_self());
    assert!(tree.node(root).dirty_children());
    assert!(!tree.is_dirty(ty));
    assert_eq!(tree.attrs(id).array_depth, 2);

    tree.set_modifier(root, STATIC_KW, true);
    assert!(tree.attrs(root).modifiers.contains(STATIC_KW));
    tree.clear_dirty(root);
    assert!(!tree.is_dirty(root));
}

#[test]
fn preorder_visits_parents_first() {
    let tree = field();
    let kinds = tree.preorder(tree.root()).map(|node| tree.kind(node)).collect::<Vec<_>>();
    assert_eq!(kinds, [FIELD_DECL, TYPE, PRIMITIVE_TYPE, VARIABLE_DECLARATOR, VARIABLE_ID]);
}
