//! Tokens produced by the [`Lexer`](super::lexer::Lexer).

/// One lexical token. Identifiers and string literals own their bytes so
/// the lexer doesn't need to borrow from the source for the lifetime of
/// assembly.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    FloatLit(f32),
    IntLit(i32),
    StringLit(Vec<u8>),
    Id(String),
    Comma,
    Colon,
    Eof,
    Eol,
}

/// A token plus the byte offset into the source where it started, used to
/// render the four-line error context window.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub pos: usize,
}

impl Token {
    pub fn is_eol(&self) -> bool {
        matches!(self.kind, TokenKind::Eol)
    }

    pub fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }

    /// True if this token is the identifier `word`, case-sensitively --
    /// mirrors the reference's `idcmp`.
    pub fn is_id(&self, word: &str) -> bool {
        matches!(&self.kind, TokenKind::Id(s) if s == word)
    }
}
