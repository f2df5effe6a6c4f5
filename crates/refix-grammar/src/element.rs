use refix_tree::SyntaxKind::{self, *};
use refix_tree::SyntaxSet;

/// Parsing policy: what the matcher is fed and which elements take part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Nothing is fed; used to synthesize a node that has no tokens yet.
    Generate,
    /// Own tokens interleaved with children.
    Complete,
    /// Children only.
    ChildrenOnly,
}

/// How an element takes part in a parse under a given policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    Consume,
    /// Passed over as an epsilon transition, recorded with an empty region.
    Skip,
    /// No transition at all.
    Block,
}

/// One atomic unit of a node's grammar.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StructureElement {
    LiteralToken(SyntaxKind, &'static str),
    ChildOfKind(SyntaxKind),
    Reentrant(Reentrant),
}

impl StructureElement {
    pub fn should_attempt_match(&self, policy: Policy) -> MatchMode {
        match (self, policy) {
            (Self::ChildOfKind(_), Policy::Complete | Policy::ChildrenOnly) => MatchMode::Consume,
            (Self::ChildOfKind(_), Policy::Generate) => MatchMode::Block,
            (Self::LiteralToken(..) | Self::Reentrant(_), Policy::Complete) => MatchMode::Consume,
            (Self::LiteralToken(..) | Self::Reentrant(_), _) => MatchMode::Skip,
        }
    }

    pub fn is_child(&self) -> bool {
        matches!(self, Self::ChildOfKind(_))
    }
}

/// Composite elements whose tokens are driven by the node's attributes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Reentrant {
    /// `[` `]` pairs, one per `array_depth`.
    ArrayDims,
    /// Unordered keyword set; the slice order is the canonical order.
    Modifiers(&'static [SyntaxKind]),
    /// A single token spelling the node's `image`.
    Image(TokenClass),
}

/// Tokens consumed so far by an open reentrant element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Consumed {
    pub count: u32,
    pub seen: SyntaxSet,
}

impl Consumed {
    pub fn push(mut self, kind: SyntaxKind) -> Self {
        self.count += 1;
        self.seen.insert(kind);
        self
    }
}

impl Reentrant {
    pub fn accepts(&self, consumed: &Consumed, kind: SyntaxKind) -> bool {
        match self {
            Self::ArrayDims if consumed.count % 2 == 0 => kind == LEFT_BRACKET,
            Self::ArrayDims => kind == RIGHT_BRACKET,
            Self::Modifiers(allowed) => allowed.contains(&kind) && !consumed.seen.contains(kind),
            Self::Image(class) => consumed.count == 0 && class.accepts(kind),
        }
    }

    /// Whether the tokens consumed so far form a complete region.
    pub fn can_close(&self, consumed: &Consumed) -> bool {
        match self {
            Self::ArrayDims => consumed.count % 2 == 0,
            Self::Modifiers(_) => true,
            Self::Image(_) => consumed.count == 1,
        }
    }

    /// Canonical position of a modifier keyword.
    pub fn rank(&self, kind: SyntaxKind) -> Option<usize> {
        match self {
            Self::Modifiers(allowed) => allowed.iter().position(|&it| it == kind),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenClass {
    Identifier,
    PrimitiveKeyword,
    Literal,
    Operator,
}

impl TokenClass {
    pub fn accepts(self, kind: SyntaxKind) -> bool {
        match self {
            Self::Identifier => kind == IDENT,
            Self::PrimitiveKeyword => kind.is_primitive_type(),
            Self::Literal => {
                matches!(kind, INT_LITERAL | STRING_LITERAL | TRUE_KW | FALSE_KW | NULL_KW)
            }
            Self::Operator => matches!(kind, OPERATOR | EQ),
        }
    }

    /// Kind of a freshly minted token spelling `image`.
    pub fn kind_of(self, image: &str) -> Option<SyntaxKind> {
        let kind = match self {
            Self::Identifier if SyntaxKind::from_keyword(image).is_some() => return None,
            Self::Identifier => IDENT,
            Self::PrimitiveKeyword => SyntaxKind::from_keyword(image)?,
            Self::Literal => match image {
                "true" => TRUE_KW,
                "false" => FALSE_KW,
                "null" => NULL_KW,
                _ if image.starts_with('"') => STRING_LITERAL,
                _ if image.bytes().all(|byte| byte.is_ascii_digit()) => INT_LITERAL,
                _ => return None,
            },
            Self::Operator if image == "=" => EQ,
            Self::Operator => OPERATOR,
        };
        (!image.is_empty() && self.accepts(kind)).then_some(kind)
    }
}
