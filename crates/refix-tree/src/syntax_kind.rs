#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
#[repr(u16)]
pub enum SyntaxKind {
    LEFT_PAREN,
    RIGHT_PAREN,
    LEFT_BRACKET,
    RIGHT_BRACKET,
    LEFT_BRACE,
    RIGHT_BRACE,
    SEMICOLON,
    COMMA,
    DOT,
    EQ,
    OPERATOR,

    CLASS_KW,
    VOID_KW,
    RETURN_KW,
    IF_KW,
    ELSE_KW,
    TRUE_KW,
    FALSE_KW,
    NULL_KW,

    BOOLEAN_KW,
    CHAR_KW,
    DOUBLE_KW,
    INT_KW,
    LONG_KW,

    PUBLIC_KW,
    PROTECTED_KW,
    PRIVATE_KW,
    ABSTRACT_KW,
    STATIC_KW,
    FINAL_KW,
    TRANSIENT_KW,
    VOLATILE_KW,
    SYNCHRONIZED_KW,
    NATIVE_KW,

    IDENT,
    INT_LITERAL,
    STRING_LITERAL,

    WHITESPACE,
    NEWLINE,
    LINE_COMMENT,
    BLOCK_COMMENT,

    UNKNOWN,
    EOF,

    COMPILATION_UNIT,
    CLASS_DECL,
    CLASS_BODY,
    FIELD_DECL,
    METHOD_DECL,
    FORMAL_PARAMS,
    FORMAL_PARAM,
    TYPE,
    PRIMITIVE_TYPE,
    CLASS_TYPE,
    VARIABLE_DECLARATOR,
    VARIABLE_ID,
    BLOCK,
    LOCAL_VAR_DECL,
    RETURN_STMT,
    IF_STMT,
    EXPR_STMT,
    LITERAL,
    NAME_EXPR,
    BINARY_EXPR,
    PAREN_EXPR,
    CALL_EXPR,
    ARGUMENTS,
    ERROR,
    TOMBSTONE,
}

use SyntaxKind::*;

impl SyntaxKind {
    pub fn is_trivia(self) -> bool {
        matches!(self, WHITESPACE | NEWLINE | LINE_COMMENT | BLOCK_COMMENT)
    }

    pub fn is_modifier(self) -> bool {
        (PUBLIC_KW as u16..=NATIVE_KW as u16).contains(&(self as u16))
    }

    pub fn is_primitive_type(self) -> bool {
        matches!(self, BOOLEAN_KW | CHAR_KW | DOUBLE_KW | INT_KW | LONG_KW)
    }

    /// Fixed spelling of punctuation and keyword tokens.
    pub fn text(self) -> Option<&'static str> {
        let text = match self {
            LEFT_PAREN => "(",
            RIGHT_PAREN => ")",
            LEFT_BRACKET => "[",
            RIGHT_BRACKET => "]",
            LEFT_BRACE => "{",
            RIGHT_BRACE => "}",
            SEMICOLON => ";",
            COMMA => ",",
            DOT => ".",
            EQ => "=",
            CLASS_KW => "class",
            VOID_KW => "void",
            RETURN_KW => "return",
            IF_KW => "if",
            ELSE_KW => "else",
            TRUE_KW => "true",
            FALSE_KW => "false",
            NULL_KW => "null",
            BOOLEAN_KW => "boolean",
            CHAR_KW => "char",
            DOUBLE_KW => "double",
            INT_KW => "int",
            LONG_KW => "long",
            PUBLIC_KW => "public",
            PROTECTED_KW => "protected",
            PRIVATE_KW => "private",
            ABSTRACT_KW => "abstract",
            STATIC_KW => "static",
            FINAL_KW => "final",
            TRANSIENT_KW => "transient",
            VOLATILE_KW => "volatile",
            SYNCHRONIZED_KW => "synchronized",
            NATIVE_KW => "native",
            _ => return None,
        };
        Some(text)
    }

    pub fn from_keyword(text: &str) -> Option<Self> {
        let kind = match text {
            "class" => CLASS_KW,
            "void" => VOID_KW,
            "return" => RETURN_KW,
            "if" => IF_KW,
            "else" => ELSE_KW,
            "true" => TRUE_KW,
            "false" => FALSE_KW,
            "null" => NULL_KW,
            "boolean" => BOOLEAN_KW,
            "char" => CHAR_KW,
            "double" => DOUBLE_KW,
            "int" => INT_KW,
            "long" => LONG_KW,
            "public" => PUBLIC_KW,
            "protected" => PROTECTED_KW,
            "private" => PRIVATE_KW,
            "abstract" => ABSTRACT_KW,
            "static" => STATIC_KW,
            "final" => FINAL_KW,
            "transient" => TRANSIENT_KW,
            "volatile" => VOLATILE_KW,
            "synchronized" => SYNCHRONIZED_KW,
            "native" => NATIVE_KW,
            _ => return None,
        };
        Some(kind)
    }

    /// No separator is rendered between this token and the one before it.
    pub fn glues_left(self) -> bool {
        matches!(self, LEFT_PAREN | RIGHT_PAREN | LEFT_BRACKET | RIGHT_BRACKET | SEMICOLON | COMMA | DOT)
    }

    /// No separator is rendered between this token and the one after it.
    pub fn glues_right(self) -> bool {
        matches!(self, LEFT_PAREN | LEFT_BRACKET | DOT)
    }
}
