use expect_test::expect;

use crate::parse;

const POINT: &str = r#"public class Point {
    private int x, y[] = 1;
    static final String name;
    int sum(final int a, int b) {
        int c = a + b * 2;
        if (c > 0) return c; else { c = f(a, "s"); }
        return (c);
    }
}
"#;

#[test]
fn parse_tree_shape() {
    let parse = parse(POINT);
    assert!(parse.errors().is_empty());

    let tree = parse.tree();
    expect![[r#"
        COMPILATION_UNIT
          CLASS_DECL "public" "class" "Point"
            CLASS_BODY "{" "}"
              FIELD_DECL "private" "," ";"
                TYPE
                  PRIMITIVE_TYPE "int"
                VARIABLE_DECLARATOR
                  VARIABLE_ID "x"
                VARIABLE_DECLARATOR "="
                  VARIABLE_ID "y" "[" "]"
                  LITERAL "1"
              FIELD_DECL "static" "final" ";"
                TYPE
                  CLASS_TYPE "String"
                VARIABLE_DECLARATOR
                  VARIABLE_ID "name"
              METHOD_DECL "sum"
                TYPE
                  PRIMITIVE_TYPE "int"
                FORMAL_PARAMS "(" "," ")"
                  FORMAL_PARAM "final"
                    TYPE
                      PRIMITIVE_TYPE "int"
                    VARIABLE_ID "a"
                  FORMAL_PARAM
                    TYPE
                      PRIMITIVE_TYPE "int"
                    VARIABLE_ID "b"
                BLOCK "{" "}"
                  LOCAL_VAR_DECL ";"
                    TYPE
                      PRIMITIVE_TYPE "int"
                    VARIABLE_DECLARATOR "="
                      VARIABLE_ID "c"
                      BINARY_EXPR "+"
                        NAME_EXPR "a"
                        BINARY_EXPR "*"
                          NAME_EXPR "b"
                          LITERAL "2"
                  IF_STMT "if" "(" ")" "else"
                    BINARY_EXPR ">"
                      NAME_EXPR "c"
                      LITERAL "0"
                    RETURN_STMT "return" ";"
                      NAME_EXPR "c"
                    BLOCK "{" "}"
                      EXPR_STMT ";"
                        BINARY_EXPR "="
                          NAME_EXPR "c"
                          CALL_EXPR "f"
                            ARGUMENTS "(" "," ")"
                              NAME_EXPR "a"
                              LITERAL "\"s\""
                  RETURN_STMT "return" ";"
                    PAREN_EXPR "(" ")"
                      NAME_EXPR "c"
    "#]]
    .assert_eq(&tree.debug_tree(tree.root()));
}

#[test]
fn attributes_come_from_own_tokens() {
    let parse = parse(POINT);
    let tree = parse.tree();
    let attrs = tree
        .preorder(tree.root())
        .map(|node| (tree.kind(node), tree.attrs(node)))
        .filter(|(_, attrs)| attrs.image.is_some() || attrs.array_depth > 0 || !attrs.modifiers.is_empty())
        .map(|(kind, attrs)| format!("{kind:?} {:?} {}\n", attrs.image, attrs.array_depth))
        .take(6)
        .collect::<String>();

    expect![[r#"
        CLASS_DECL Some("Point") 0
        FIELD_DECL None 0
        PRIMITIVE_TYPE Some("int") 0
        VARIABLE_ID Some("x") 0
        VARIABLE_ID Some("y") 1
        LITERAL Some("1") 0
    "#]]
    .assert_eq(&attrs);

    let class = tree.children(tree.root())[0];
    assert!(tree.attrs(class).modifiers.contains(refix_tree::SyntaxKind::PUBLIC_KW));
}

#[test]
fn round_trip() {
    for text in [POINT, "", "  // only trivia\n", "class A {}", "class A { int x = ; }"] {
        assert_eq!(parse(text).tree().render(), text);
    }
}

#[test]
fn parse_errors_are_collected() {
    let parse = parse("class A { int x = ; }");
    let errors = parse
        .errors()
        .iter()
        .map(|error| format!("{:?} {}\n", error.range(), error.message()))
        .collect::<String>();

    expect![[r#"
        18..19 expected an expression
        20..21 expected `;`
    "#]]
    .assert_eq(&errors);
}

#[test]
#[should_panic(expected = "BLOCK carries no image")]
fn image_elements_need_an_image_class() {
    crate::grammars::image(refix_tree::SyntaxKind::BLOCK);
}
