//! A small Java-like language used to drive the fix engine end to end.

mod grammar;
mod grammars;
mod parser;
#[cfg(test)]
mod tests;
mod tokenizer;

use refix_errors::Diagnostic;
use refix_tree::SyntaxTree;

pub use grammars::{CLASS_MODIFIERS, LOCAL_MODIFIERS, LangGrammars, MEMBER_MODIFIERS, image_class};
pub use tokenizer::{Token, Tokenizer};

#[derive(Debug, Clone)]
pub struct Parse {
    tree: SyntaxTree,
    errors: Vec<Diagnostic>,
}

impl Parse {
    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    pub fn errors(&self) -> &[Diagnostic] {
        &self.errors
    }

    pub fn into_tree(self) -> SyntaxTree {
        self.tree
    }
}

/// Parses a compilation unit. Parse errors are collected; the tree always
/// covers the whole text.
pub fn parse(text: &str) -> Parse {
    let mut parser = parser::Parser::new(text);
    grammar::items::compilation_unit(&mut parser);
    parser.build_tree()
}
