use crate::chissembler::source_span::SourceSpan;

/// The kinds of lexical tokens recognised by the chissembler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TokenKind {
    IntegerLiteral,
    Register,
    Identifier,
    Copy,
    Add,
    Sub,
    And,
    Or,
    Xor,
    Jump,
    Colon,
    Plus,
    Newline,
    EndOfInput,
}

impl TokenKind {
    /// A human-readable name, used to build `AssemblerError::UnexpectedToken` messages.
    pub(crate) fn description(self) -> &'static str {
        match self {
            TokenKind::IntegerLiteral => "an integer literal",
            TokenKind::Register => "a register",
            TokenKind::Identifier => "an identifier",
            TokenKind::Copy => "'copy'",
            TokenKind::Add => "'add'",
            TokenKind::Sub => "'sub'",
            TokenKind::And => "'and'",
            TokenKind::Or => "'or'",
            TokenKind::Xor => "'xor'",
            TokenKind::Jump => "'jump'",
            TokenKind::Colon => "':'",
            TokenKind::Plus => "'+'",
            TokenKind::Newline => "a newline",
            TokenKind::EndOfInput => "end of input",
        }
    }
}

/// A single lexical token together with the span of source text it was scanned from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Token {
    pub(crate) kind: TokenKind,
    pub(crate) span: SourceSpan,
}

impl Token {
    pub(crate) fn new(kind: TokenKind, span: SourceSpan) -> Self {
        Token { kind, span }
    }
}
