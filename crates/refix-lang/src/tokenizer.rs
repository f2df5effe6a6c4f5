mod cursor;

use cursor::{Cursor, EOF_CHAR};
use refix_tree::SyntaxKind::{self, *};
use refix_tree::{TriviaPiece, TriviaPieceKind};
use text_size::{TextRange, TextSize};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub leading: Vec<TriviaPiece>,
    pub kind: SyntaxKind,
    pub range: TextRange,
}

pub struct Tokenizer<'a> {
    text: &'a str,
    cursor: Cursor<'a>,
    finished: bool,
}

impl<'a> Tokenizer<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text, cursor: Cursor::new(text), finished: false }
    }

    fn offset(&self) -> TextSize {
        TextSize::new(self.text.len() as u32) - self.cursor.len()
    }

    fn range(&self) -> TextRange {
        let len = self.cursor.pos_within_token();
        TextRange::at(self.offset() - len, len)
    }

    fn text(&self) -> &'a str {
        &self.text[self.range()]
    }

    /// Next token with its leading trivia. Trivia at the end of the text is
    /// attached to the final `EOF` token.
    pub fn next_token(&mut self) -> Token {
        let leading = self.trivia();
        let kind = self.syntax_kind();
        let range = self.range();
        self.cursor.reset_pos_within_token();
        Token { leading, kind, range }
    }

    fn trivia(&mut self) -> Vec<TriviaPiece> {
        let mut pieces = Vec::new();
        loop {
            let kind = match self.cursor.peek() {
                '/' if self.cursor.second() == '/' => {
                    self.cursor.advance_while(|c| c != '\n');
                    TriviaPieceKind::LineComment
                }
                '/' if self.cursor.second() == '*' => {
                    self.cursor.advance();
                    self.cursor.advance();
                    while !self.cursor.is_eof()
                        && !(self.cursor.matches('*') && self.cursor.second() == '/')
                    {
                        self.cursor.advance();
                    }
                    self.cursor.advance();
                    self.cursor.advance();
                    TriviaPieceKind::BlockComment
                }
                '\n' => {
                    self.cursor.advance();
                    TriviaPieceKind::Newline
                }
                '\r' if self.cursor.second() == '\n' => {
                    self.cursor.advance();
                    self.cursor.advance();
                    TriviaPieceKind::Newline
                }
                c if c.is_whitespace() && !self.cursor.is_eof() => {
                    self.cursor.advance_while(|c| c.is_whitespace() && c != '\n' && c != '\r');
                    if self.cursor.pos_within_token() == TextSize::new(0) {
                        // A lone `\r`.
                        self.cursor.advance();
                    }
                    TriviaPieceKind::Whitespace
                }
                _ => break,
            };

            pieces.push(TriviaPiece::new(kind, self.cursor.pos_within_token()));
            self.cursor.reset_pos_within_token();
        }
        pieces
    }

    fn syntax_kind(&mut self) -> SyntaxKind {
        if self.cursor.is_eof() {
            return EOF;
        }
        match self.cursor.advance() {
            '(' => LEFT_PAREN,
            ')' => RIGHT_PAREN,
            '[' => LEFT_BRACKET,
            ']' => RIGHT_BRACKET,
            '{' => LEFT_BRACE,
            '}' => RIGHT_BRACE,
            ';' => SEMICOLON,
            ',' => COMMA,
            '.' => DOT,
            '0'..='9' => {
                self.cursor.advance_while(|c| c.is_ascii_digit() || c == '_');
                INT_LITERAL
            }
            '"' => {
                while !self.cursor.is_eof() && !self.cursor.matches('"') && !self.cursor.matches('\n')
                {
                    if self.cursor.advance() == '\\' {
                        self.cursor.advance();
                    }
                }
                if self.cursor.matches('"') {
                    self.cursor.advance();
                }
                STRING_LITERAL
            }
            'A'..='Z' | 'a'..='z' | '_' | '$' => {
                self.cursor.advance_while(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
                SyntaxKind::from_keyword(self.text()).unwrap_or(IDENT)
            }
            first_char if is_operator(first_char) => {
                self.cursor.advance_while(is_operator);
                if self.text() == "=" { EQ } else { OPERATOR }
            }
            EOF_CHAR => EOF,
            _ => UNKNOWN,
        }
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Token;

    /// Yields every token up to and including `EOF`.
    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let token = self.next_token();
        self.finished = token.kind == EOF;
        Some(token)
    }
}

fn is_operator(c: char) -> bool {
    matches!(c, '=' | '-' | '+' | '*' | '/' | '%' | '<' | '>' | '!' | '&' | '|' | '^' | '~' | '?')
}

#[cfg(test)]
mod tests {
    use expect_test::expect;

    use super::*;

    fn dump(text: &str) -> String {
        Tokenizer::new(text)
            .map(|token| {
                let trivia = token.leading.iter().map(|piece| format!("{:?}", piece.kind));
                let trivia = trivia.collect::<Vec<_>>().join(" ");
                format!("{:?} {:?} [{trivia}]\n", token.kind, &text[token.range])
            })
            .collect()
    }

    #[test]
    fn keywords_and_punctuation() {
        expect![[r#"
            PUBLIC_KW "public" []
            CLASS_KW "class" [Whitespace]
            IDENT "A" [Whitespace]
            LEFT_BRACE "{" [Whitespace]
            INT_KW "int" [Newline Whitespace]
            IDENT "x" [Whitespace]
            LEFT_BRACKET "[" []
            RIGHT_BRACKET "]" []
            EQ "=" [Whitespace]
            INT_LITERAL "42" [Whitespace]
            SEMICOLON ";" []
            RIGHT_BRACE "}" [Newline]
            EOF "" [Newline]
        "#]]
        .assert_eq(&dump("public class A {\n  int x[] = 42;\n}\n"));
    }

    #[test]
    fn operators_and_literals() {
        expect![[r##"
            IDENT "a" []
            OPERATOR "==" [Whitespace]
            STRING_LITERAL "\"b;\"" [Whitespace]
            OPERATOR "+" [Whitespace]
            TRUE_KW "true" [Whitespace]
            UNKNOWN "#" []
            EOF "" []
        "##]]
        .assert_eq(&dump(r#"a == "b;" + true#"#));
    }

    #[test]
    fn comments_are_trivia() {
        expect![[r#"
            RETURN_KW "return" [LineComment Newline BlockComment Whitespace]
            SEMICOLON ";" []
            EOF "" [Whitespace]
        "#]]
        .assert_eq(&dump("// lead\n/* block */ return; "));
    }

    #[test]
    fn tokens_cover_the_text() {
        let text = "class A {\r\n\tvoid f() { return 1 + 2; }\n}";
        let mut covered = TextSize::new(0);
        for token in Tokenizer::new(text) {
            covered += token.leading.iter().map(|piece| piece.len).sum::<TextSize>();
            assert_eq!(token.range.start(), covered);
            covered = token.range.end();
        }
        assert_eq!(covered, TextSize::of(text));
    }
}
