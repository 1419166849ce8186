mod chunk;
mod tokens;

use crate::dialect::{Dialect, DialectExt};
pub use chunk::*;
use serde::Serialize;
use smallvec::SmallVec;
pub use tokens::*;

use anydb_types::Value;

/// SQL fragment builder with flat chunk storage.
///
/// Uses `SmallVec<[SqlChunk; 8]>` for inline storage of typical SQL fragments
/// without heap allocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sql {
    pub chunks: SmallVec<[SqlChunk; 8]>,
}

/// A rendered statement: SQL text plus its positional parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Statement {
    pub text: String,
    pub params: Vec<Value>,
}

impl Statement {
    pub fn new(text: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            text: text.into(),
            params,
        }
    }

    /// The parameters as a JSON array, for diagnostics.
    pub fn params_json(&self) -> String {
        params_json(&self.params)
    }
}

/// Encodes a parameter list as a JSON array.
pub fn params_json(params: &[Value]) -> String {
    serde_json::to_string(params).unwrap_or_else(|_| String::from("[]"))
}

impl core::fmt::Display for Statement {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, r#"sql: "{}", params: {}"#, self.text, self.params_json())
    }
}

impl Sql {
    // ==================== constructors ====================

    /// Creates an empty SQL fragment
    #[inline]
    pub const fn empty() -> Self {
        Self {
            chunks: SmallVec::new_const(),
        }
    }

    /// Creates SQL with a single token
    #[inline]
    pub fn token(t: Token) -> Self {
        Self {
            chunks: smallvec::smallvec![SqlChunk::Token(t)],
        }
    }

    /// Creates SQL with a quoted identifier
    #[inline]
    pub fn ident(name: impl Into<String>) -> Self {
        Self {
            chunks: smallvec::smallvec![SqlChunk::Ident(name.into())],
        }
    }

    /// Creates SQL with a qualified identifier: "table"."column"
    #[inline]
    pub fn qualified(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            chunks: smallvec::smallvec![
                SqlChunk::Ident(table.into()),
                SqlChunk::Token(Token::DOT),
                SqlChunk::Ident(column.into()),
            ],
        }
    }

    /// Creates SQL with raw text (unquoted)
    #[inline]
    pub fn raw(text: impl Into<String>) -> Self {
        Self {
            chunks: smallvec::smallvec![SqlChunk::Raw(text.into())],
        }
    }

    /// Creates SQL with an inline integer literal.
    #[inline]
    pub fn number(value: i64) -> Self {
        Self {
            chunks: smallvec::smallvec![SqlChunk::Number(value)],
        }
    }

    /// Creates SQL with a single parameter value
    #[inline]
    pub fn param(value: impl Into<Value>) -> Self {
        Self {
            chunks: smallvec::smallvec![SqlChunk::Param(value.into())],
        }
    }

    /// Creates SQL for a function call: NAME(args)
    #[inline]
    pub fn func(name: &str, args: Sql) -> Self {
        Sql::raw(name)
            .push(Token::LPAREN)
            .append(args)
            .push(Token::RPAREN)
    }

    // ==================== builder methods ====================

    /// Append another SQL fragment (flat extend)
    #[inline]
    pub fn append(mut self, other: impl Into<Sql>) -> Self {
        let other = other.into();
        if self.chunks.is_empty() {
            return other;
        }
        self.chunks.extend(other.chunks);
        self
    }

    #[inline]
    pub fn append_mut(&mut self, other: impl Into<Sql>) {
        let other = other.into();
        if self.chunks.is_empty() {
            self.chunks = other.chunks;
            return;
        }
        self.chunks.extend(other.chunks);
    }

    /// Push a single chunk
    #[inline]
    pub fn push(mut self, chunk: impl Into<SqlChunk>) -> Self {
        self.chunks.push(chunk.into());
        self
    }

    #[inline]
    pub fn push_mut(&mut self, chunk: impl Into<SqlChunk>) {
        self.chunks.push(chunk.into());
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    // ==================== combinators ====================

    /// Joins multiple SQL fragments with a separator
    pub fn join<I>(sqls: I, separator: Token) -> Sql
    where
        I: IntoIterator<Item = Sql>,
    {
        let mut iter = sqls.into_iter();
        let Some(mut result) = iter.next() else {
            return Sql::empty();
        };
        for other in iter {
            result.chunks.push(SqlChunk::Token(separator));
            result.chunks.extend(other.chunks);
        }
        result
    }

    /// Wrap in parentheses: (self)
    #[inline]
    pub fn parens(self) -> Self {
        Sql::token(Token::LPAREN).append(self).push(Token::RPAREN)
    }

    /// Creates an aliased version: self AS "name"
    pub fn alias(self, name: impl Into<String>) -> Sql {
        self.push(Token::AS).push(SqlChunk::Ident(name.into()))
    }

    /// Creates a comma-separated list of parameters.
    pub fn param_list<I>(values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let mut chunks = SmallVec::new();
        for (i, v) in values.into_iter().enumerate() {
            if i > 0 {
                chunks.push(SqlChunk::Token(Token::COMMA));
            }
            chunks.push(SqlChunk::Param(v.into()));
        }
        Sql { chunks }
    }

    // ==================== output methods ====================

    /// Renders the SQL text and collects parameters in a single pass.
    ///
    /// Placeholders are `$1, $2, ...` for PostgreSQL and `?` otherwise.
    pub fn build(&self, dialect: Dialect) -> Statement {
        let mut text = String::with_capacity(self.chunks.len().saturating_mul(8).max(64));
        let mut params = Vec::new();

        for (i, chunk) in self.chunks.iter().enumerate() {
            match chunk {
                SqlChunk::Param(value) => {
                    params.push(value.clone());
                    text.push_str(&dialect.render_placeholder(params.len()));
                }
                _ => chunk.write(&mut text, dialect),
            }

            if self.needs_space(i) {
                text.push(' ');
            }
        }

        Statement { text, params }
    }

    /// Returns an iterator over references to parameter values
    pub fn params(&self) -> impl Iterator<Item = &Value> {
        self.chunks.iter().filter_map(|chunk| match chunk {
            SqlChunk::Param(value) => Some(value),
            _ => None,
        })
    }

    fn needs_space(&self, index: usize) -> bool {
        let Some(next) = self.chunks.get(index + 1) else {
            return false;
        };
        chunk_needs_space(&self.chunks[index], next)
    }
}

/// Canonical spacing logic for SQL chunk rendering.
pub(crate) fn chunk_needs_space(current: &SqlChunk, next: &SqlChunk) -> bool {
    match (current, next) {
        // No space before closing/separator punctuation
        (_, SqlChunk::Token(Token::RPAREN | Token::COMMA | Token::SEMI | Token::DOT)) => false,
        // No space after opening punctuation
        (SqlChunk::Token(Token::LPAREN | Token::DOT), _) => false,
        // Function call: COUNT(
        (SqlChunk::Raw(_), SqlChunk::Token(Token::LPAREN)) => false,
        // Space after comma
        (SqlChunk::Token(Token::COMMA), _) => true,
        // Space after closing paren if next is word-like (e.g., ") FROM")
        (SqlChunk::Token(Token::RPAREN), next) => next.is_word_like(),
        // Space before opening paren if preceded by word-like (e.g., "IN (")
        (current, SqlChunk::Token(Token::LPAREN)) => current.is_word_like(),
        // Space around comparison operators
        (SqlChunk::Token(t), _) if t.is_operator() => true,
        (_, SqlChunk::Token(t)) if t.is_operator() => true,
        // Space between all word-like chunks
        _ => current.is_word_like() && next.is_word_like(),
    }
}

// ==================== trait implementations ====================

impl From<Token> for Sql {
    fn from(value: Token) -> Self {
        Sql::token(value)
    }
}

impl From<SqlChunk> for Sql {
    fn from(value: SqlChunk) -> Self {
        Self {
            chunks: smallvec::smallvec![value],
        }
    }
}

impl FromIterator<SqlChunk> for Sql {
    fn from_iter<I: IntoIterator<Item = SqlChunk>>(iter: I) -> Self {
        Self {
            chunks: SmallVec::from_iter(iter),
        }
    }
}

impl IntoIterator for Sql {
    type Item = SqlChunk;
    type IntoIter = smallvec::IntoIter<[SqlChunk; 8]>;

    fn into_iter(self) -> Self::IntoIter {
        self.chunks.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_numbers_postgres_placeholders() {
        let sql = Sql::token(Token::SELECT)
            .push(Token::STAR)
            .push(Token::FROM)
            .append(Sql::ident("users"))
            .push(Token::WHERE)
            .append(Sql::qualified("users", "id"))
            .push(Token::IN)
            .append(Sql::param_list([1, 2]).parens());

        let pg = sql.build(Dialect::PostgreSQL);
        assert_eq!(
            pg.text,
            r#"SELECT * FROM "users" WHERE "users"."id" IN ($1, $2)"#
        );
        assert_eq!(pg.params, vec![Value::Integer(1), Value::Integer(2)]);

        let lite = sql.build(Dialect::SQLite);
        assert_eq!(
            lite.text,
            r#"SELECT * FROM "users" WHERE "users"."id" IN (?, ?)"#
        );
    }

    #[test]
    fn function_calls_render_without_space() {
        let sql = Sql::func("COUNT", Sql::token(Token::STAR)).alias("n");
        assert_eq!(sql.build(Dialect::SQLite).text, r#"COUNT(*) AS "n""#);
    }

    #[test]
    fn operators_are_spaced() {
        let sql = Sql::ident("age").push(Token::GE).append(Sql::param(18));
        assert_eq!(sql.build(Dialect::MySQL).text, "`age` >= ?");
    }

    #[test]
    fn statement_display_shows_json_params() {
        let statement = Sql::param("x").build(Dialect::SQLite);
        assert_eq!(statement.to_string(), r#"sql: "?", params: ["x"]"#);
    }
}
