use crate::dialect::{Dialect, DialectExt};
use crate::sql::tokens::Token;
use anydb_types::Value;

/// A SQL chunk represents a part of an SQL statement.
///
/// - `Token` - SQL keywords and operators (SELECT, FROM, =, etc.)
/// - `Ident` - Quoted identifiers ("table_name", "column_name")
/// - `Raw` - Unquoted raw SQL text (function names, type names)
/// - `Param` - Parameter placeholders with values
/// - `Number` - Inline integer literal (LIMIT/OFFSET)
#[derive(Debug, Clone, PartialEq)]
pub enum SqlChunk {
    /// SQL keywords and operators: SELECT, FROM, WHERE, =, AND, etc.
    Token(Token),

    /// Quoted identifier for user-provided names.
    /// Renders with the dialect's quote character.
    Ident(String),

    /// Raw SQL text (unquoted).
    /// Raw text directly followed by `(` renders as a function call.
    Raw(String),

    /// Parameter value; renders as `?` or `$n` depending on dialect
    Param(Value),

    /// Integer literal rendered inline
    Number(i64),
}

impl SqlChunk {
    /// Creates a quoted identifier
    #[inline]
    pub fn ident(name: impl Into<String>) -> Self {
        Self::Ident(name.into())
    }

    /// Creates raw SQL text
    #[inline]
    pub fn raw(text: impl Into<String>) -> Self {
        Self::Raw(text.into())
    }

    /// Write chunk content to buffer. Params are written by the caller, which
    /// tracks the placeholder index.
    pub(crate) fn write(&self, buf: &mut String, dialect: Dialect) {
        match self {
            SqlChunk::Token(token) => buf.push_str(token.as_str()),
            SqlChunk::Ident(name) => dialect.write_ident(buf, name),
            SqlChunk::Raw(text) => buf.push_str(text),
            SqlChunk::Number(n) => buf.push_str(&n.to_string()),
            SqlChunk::Param(_) => buf.push('?'),
        }
    }

    /// Check if this chunk is "word-like" (needs space separation from other word-like chunks)
    #[inline]
    pub(crate) const fn is_word_like(&self) -> bool {
        match self {
            SqlChunk::Token(t) => !matches!(
                t,
                Token::LPAREN
                    | Token::RPAREN
                    | Token::COMMA
                    | Token::SEMI
                    | Token::DOT
                    | Token::EQ
                    | Token::NE
                    | Token::LT
                    | Token::GT
                    | Token::LE
                    | Token::GE
            ),
            SqlChunk::Ident(_) | SqlChunk::Raw(_) | SqlChunk::Param(_) | SqlChunk::Number(_) => {
                true
            }
        }
    }
}

impl From<Token> for SqlChunk {
    #[inline]
    fn from(value: Token) -> Self {
        Self::Token(value)
    }
}

impl From<Value> for SqlChunk {
    #[inline]
    fn from(value: Value) -> Self {
        Self::Param(value)
    }
}
