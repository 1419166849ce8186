//! Dialect type re-exported from anydb-types with core-specific extensions.

use std::borrow::Cow;
use std::fmt::Write;

/// Re-export the unified Dialect enum from anydb-types
pub use anydb_types::{Dialect, dialect_name};

/// Extension trait for Dialect-specific rendering
pub trait DialectExt {
    /// Renders a placeholder for this dialect with the given 1-based index.
    ///
    /// Returns `Cow::Borrowed("?")` for SQLite/MySQL (zero allocation),
    /// `Cow::Owned` for PostgreSQL numbered placeholders.
    ///
    /// # Examples
    /// - PostgreSQL: `$1`, `$2`, `$3`
    /// - SQLite/MySQL: `?`
    fn render_placeholder(&self, index: usize) -> Cow<'static, str>;

    /// The character identifiers are wrapped in.
    fn quote_char(&self) -> char;

    /// Writes `name` as a quoted identifier, doubling embedded quote characters.
    fn write_ident(&self, buf: &mut String, name: &str) {
        let quote = self.quote_char();
        buf.push(quote);
        for c in name.chars() {
            if c == quote {
                buf.push(quote);
            }
            buf.push(c);
        }
        buf.push(quote);
    }
}

impl DialectExt for Dialect {
    #[inline]
    fn render_placeholder(&self, index: usize) -> Cow<'static, str> {
        match self {
            Dialect::PostgreSQL => {
                let mut s = String::with_capacity(4);
                let _ = write!(s, "${index}");
                Cow::Owned(s)
            }
            Dialect::SQLite | Dialect::MySQL => Cow::Borrowed("?"),
        }
    }

    #[inline]
    fn quote_char(&self) -> char {
        match self {
            Dialect::MySQL => '`',
            Dialect::SQLite | Dialect::PostgreSQL => '"',
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_per_dialect() {
        assert_eq!(Dialect::PostgreSQL.render_placeholder(3), "$3");
        assert_eq!(Dialect::SQLite.render_placeholder(3), "?");
        assert_eq!(Dialect::MySQL.render_placeholder(1), "?");
    }

    #[test]
    fn identifiers_escape_their_quote() {
        let mut buf = String::new();
        Dialect::SQLite.write_ident(&mut buf, "users.address[]");
        assert_eq!(buf, r#""users.address[]""#);

        let mut buf = String::new();
        Dialect::MySQL.write_ident(&mut buf, "we`ird");
        assert_eq!(buf, "`we``ird`");
    }
}
