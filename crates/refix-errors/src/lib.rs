//! Errors raised while recording, synchronizing or translating a fix.
//!
//! Every variant is fatal for the fix that raised it: the session rolls the
//! tree back and the violation is reported without a fix.

use std::fmt::Display;

pub use annotate_snippets::Renderer;
use annotate_snippets::{Level, Snippet};
pub use text_size::TextRange;
use thiserror::Error;

pub type Result<T, E = FixError> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FixError {
    /// A complete parse produced more than one structure.
    #[error("grammar of `{kind}` is ambiguous: {count} structures match")]
    GrammarAmbiguity { kind: String, count: usize },

    /// No structure matches, or the old and new structures disagree on a
    /// mandatory element.
    #[error("`{kind}` does not match its grammar: {reason}")]
    GrammarMismatch { kind: String, reason: String },

    #[error("no grammar registered for `{kind}`")]
    MissingGrammar { kind: String },

    /// The edit contradicts the events already recorded for the slot.
    #[error("invalid rewrite at child {index}: {reason}")]
    InvalidMergeTransition { index: usize, reason: String },

    #[error("malformed edit: {reason}")]
    MalformedEdit { reason: String },
}

impl FixError {
    pub fn mismatch(kind: impl std::fmt::Debug, reason: impl Into<String>) -> Self {
        Self::GrammarMismatch { kind: format!("{kind:?}"), reason: reason.into() }
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedEdit { reason: reason.into() }
    }

    pub fn invalid_merge(index: usize, reason: impl Into<String>) -> Self {
        Self::InvalidMergeTransition { index, reason: reason.into() }
    }
}

/// A failed fix, positioned in the original source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    message: String,
    range: TextRange,
}

impl Diagnostic {
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn range(&self) -> TextRange {
        self.range
    }

    pub fn error(message: impl Into<String>, range: TextRange) -> Self {
        Self { message: message.into(), range }
    }

    pub fn from_error(error: &FixError, range: TextRange) -> Self {
        Self::error(format!("autofix abandoned: {error}"), range)
    }

    pub fn render<'a>(
        &'a self,
        renderer: &'a Renderer,
        path: &'a str,
        text: &'a str,
    ) -> impl Display + 'a {
        let message = Level::Error.title(&self.message).snippet(
            Snippet::source(text)
                .origin(path)
                .annotation(Level::Error.span(self.range.into()).label("here"))
                .fold(true),
        );
        renderer.render(message)
    }
}

#[cfg(test)]
mod tests {
    use expect_test::expect;
    use text_size::TextSize;

    use super::*;

    #[test]
    fn error_messages() {
        let errors = [
            FixError::GrammarAmbiguity { kind: "FIELD_DECL".into(), count: 2 },
            FixError::mismatch("TYPE", "no child left for `PRIMITIVE_TYPE`"),
            FixError::MissingGrammar { kind: "UNKNOWN".into() },
            FixError::invalid_merge(2, "Remove followed by Remove"),
            FixError::malformed("index 4 out of bounds for 3 children"),
        ];
        let rendered = errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n");

        expect![[r#"
            grammar of `FIELD_DECL` is ambiguous: 2 structures match
            `"TYPE"` does not match its grammar: no child left for `PRIMITIVE_TYPE`
            no grammar registered for `UNKNOWN`
            invalid rewrite at child 2: Remove followed by Remove
            malformed edit: index 4 out of bounds for 3 children"#]]
        .assert_eq(&rendered);
    }

    #[test]
    fn diagnostic_points_at_range() {
        let text = "class A { int x; }";
        let range = TextRange::at(TextSize::new(10), TextSize::new(3));
        let diagnostic =
            Diagnostic::from_error(&FixError::malformed("cannot insert an attached node"), range);

        assert_eq!(&text[diagnostic.range()], "int");

        let rendered = diagnostic.render(&Renderer::plain(), "A.java", text).to_string();
        assert!(rendered.contains("autofix abandoned: malformed edit"), "{rendered}");
        assert!(rendered.contains("A.java"), "{rendered}");
        assert!(rendered.contains("here"), "{rendered}");
    }
}
