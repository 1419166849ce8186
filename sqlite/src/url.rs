//! `sqlite3://` urls.

use std::path::PathBuf;

use anydb_core::{AnydbError, Result};
use percent_encoding::percent_decode_str;

const MEMORY: &str = ":memory:";

/// Where a SQLite pool keeps its data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqliteTarget {
    /// A private in-memory database, shared by the pool's single connection
    Memory,
    File(PathBuf),
}

impl SqliteTarget {
    /// Parses `sqlite3:///abs/path.db`, `sqlite://rel.db`, `sqlite3://:memory:`
    /// and the bare `sqlite3:` form (in-memory).
    ///
    /// Path segments are percent-decoded; a query string is ignored.
    pub fn parse(url: &str) -> Result<Self> {
        let (scheme, rest) = url
            .split_once(':')
            .ok_or_else(|| AnydbError::Initialization(format!("not a sqlite url: {url}")))?;
        if !scheme.eq_ignore_ascii_case("sqlite3") && !scheme.eq_ignore_ascii_case("sqlite") {
            return Err(AnydbError::Initialization(format!(
                "not a sqlite url: {url}"
            )));
        }

        let rest = rest.strip_prefix("//").unwrap_or(rest);
        let path = rest.split_once('?').map_or(rest, |(path, _)| path);
        if path.is_empty() || path == MEMORY {
            return Ok(SqliteTarget::Memory);
        }

        let decoded = percent_decode_str(path)
            .decode_utf8()
            .map_err(|err| AnydbError::Initialization(format!("invalid sqlite path: {err}")))?;
        Ok(SqliteTarget::File(PathBuf::from(decoded.as_ref())))
    }

    pub fn is_memory(&self) -> bool {
        matches!(self, SqliteTarget::Memory)
    }

    pub(crate) fn connect(&self) -> rusqlite::Result<rusqlite::Connection> {
        let conn = match self {
            SqliteTarget::Memory => rusqlite::Connection::open_in_memory()?,
            SqliteTarget::File(path) => rusqlite::Connection::open(path)?,
        };
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        Ok(conn)
    }
}
