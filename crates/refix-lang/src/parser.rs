use drop_bomb::DropBomb;
use refix_errors::Diagnostic;
use refix_tree::SyntaxKind::{self, *};
use refix_tree::{Builder, NodeAttrs};

use crate::Parse;
use crate::grammars::image_class;
use crate::tokenizer::{Token, Tokenizer};

pub(crate) struct Parser<'t> {
    text: &'t str,
    /// Always ends with `EOF`.
    tokens: Vec<Token>,
    pos: usize,
    events: Vec<Event>,
    errors: Vec<Diagnostic>,
}

impl<'t> Parser<'t> {
    pub(crate) fn new(text: &'t str) -> Self {
        let tokens = Tokenizer::new(text).collect();
        Self { text, tokens, pos: 0, events: Vec::new(), errors: Vec::new() }
    }

    pub(crate) fn nth(&self, n: usize) -> SyntaxKind {
        self.tokens.get(self.pos + n).map_or(EOF, |token| token.kind)
    }

    pub(crate) fn peek_kind(&self) -> SyntaxKind {
        self.nth(0)
    }

    pub(crate) fn peek_text(&self) -> &'t str {
        self.tokens.get(self.pos).map_or("", |token| &self.text[token.range])
    }

    pub(crate) fn at(&self, kind: SyntaxKind) -> bool {
        self.peek_kind() == kind
    }

    pub(crate) fn advance(&mut self) {
        if self.at(EOF) {
            return;
        }
        self.events.push(Event::Token(self.pos));
        self.pos += 1;
    }

    pub(crate) fn eat(&mut self, kind: SyntaxKind) -> bool {
        if !self.at(kind) {
            return false;
        }
        self.advance();
        true
    }

    pub(crate) fn expect(&mut self, kind: SyntaxKind) {
        if !self.eat(kind) {
            match kind.text() {
                Some(text) => self.error(&format!("expected `{text}`")),
                None => self.error(&format!("expected {kind:?}")),
            }
        }
    }

    pub(crate) fn start(&mut self) -> Marker {
        let pos = self.events.len() as u32;
        self.events.push(Event::TOMBSTONE);
        Marker::new(pos)
    }

    pub(crate) fn error(&mut self, message: &str) {
        let range = self.tokens[self.pos.min(self.tokens.len() - 1)].range;
        self.errors.push(Diagnostic::error(message, range));
    }

    /// Reports `message` and wraps the current token in an `ERROR` node.
    pub(crate) fn bump_error(&mut self, message: &str) {
        let m = self.start();
        self.error(message);
        self.advance();
        m.complete(self, ERROR);
    }

    pub(crate) fn build_tree(self) -> Parse {
        let Parser { text, tokens, pos: _, mut events, errors } = self;
        let mut builder = Builder::new(text);
        let mut forward_parents = Vec::new();
        let mut opened: Vec<(SyntaxKind, Vec<usize>)> = Vec::new();

        for i in 0..events.len() {
            match std::mem::replace(&mut events[i], Event::TOMBSTONE) {
                Event::Start { kind, forward_parent } => {
                    if kind == TOMBSTONE {
                        continue;
                    }

                    forward_parents.push(kind);
                    let mut idx = i;
                    let mut fp = forward_parent;
                    while let Some(fwd) = fp {
                        idx += fwd as usize;

                        fp = match std::mem::replace(&mut events[idx], Event::TOMBSTONE) {
                            Event::Start { kind, forward_parent } => {
                                if kind != TOMBSTONE {
                                    forward_parents.push(kind);
                                }
                                forward_parent
                            }
                            _ => unreachable!(),
                        };
                    }

                    for kind in forward_parents.drain(..).rev() {
                        builder.start_node(kind);
                        opened.push((kind, Vec::new()));
                    }
                }
                Event::Finish => {
                    if let Some((kind, own)) = opened.pop() {
                        let own = own.iter().map(|&index| {
                            let token = &tokens[index];
                            (token.kind, &text[token.range])
                        });
                        lower_attrs(builder.attrs(), kind, own);
                    }
                    builder.finish_node();
                }
                Event::Token(index) => {
                    let token = &tokens[index];
                    builder.token(token.leading.iter().copied(), token.kind, token.range.len());
                    if let Some((_, own)) = opened.last_mut() {
                        own.push(index);
                    }
                }
            }
        }

        let tail = tokens.last().map(|eof| eof.leading.as_slice()).unwrap_or_default();
        Parse { tree: builder.finish(tail.iter().copied()), errors }
    }
}

/// Derives a node's attributes from the tokens it owns directly.
fn lower_attrs<'a>(
    attrs: &mut NodeAttrs,
    kind: SyntaxKind,
    own: impl Iterator<Item = (SyntaxKind, &'a str)>,
) {
    let class = image_class(kind);
    for (token, text) in own {
        if token.is_modifier() {
            attrs.modifiers.insert(token);
        } else if token == LEFT_BRACKET {
            attrs.array_depth += 1;
        } else if attrs.image.is_none() && class.is_some_and(|class| class.accepts(token)) {
            attrs.image = Some(text.into());
        }
    }
}

enum Event {
    Start { kind: SyntaxKind, forward_parent: Option<u32> },
    /// Index into the parser's tokens.
    Token(usize),
    Finish,
}

impl Event {
    const TOMBSTONE: Self = Self::Start { kind: TOMBSTONE, forward_parent: None };
}

pub(crate) struct Marker {
    position: u32,
    bomb: DropBomb,
}

impl Marker {
    fn new(pos: u32) -> Self {
        Self { position: pos, bomb: DropBomb::new("Marker must be completed") }
    }

    pub(crate) fn complete(mut self, p: &mut Parser<'_>, kind: SyntaxKind) -> CompletedMarker {
        self.bomb.defuse();

        match &mut p.events[self.position as usize] {
            Event::Start { kind: slot, .. } => {
                *slot = kind;
            }
            _ => unreachable!(),
        }

        p.events.push(Event::Finish);
        CompletedMarker::new(self.position)
    }
}

pub(crate) struct CompletedMarker {
    pos: u32,
}

impl CompletedMarker {
    fn new(pos: u32) -> Self {
        Self { pos }
    }

    pub(crate) fn precede(self, p: &mut Parser<'_>) -> Marker {
        let new_pos = p.start();

        match &mut p.events[self.pos as usize] {
            Event::Start { forward_parent, .. } => {
                *forward_parent = Some(new_pos.position - self.pos);
            }
            _ => unreachable!(),
        }

        new_pos
    }
}
