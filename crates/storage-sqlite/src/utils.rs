//! Helpers for working with SQLite statement limits.

/// Rows per multi-row `INSERT`.
///
/// Each instrument row binds seven parameters; 500 rows stay well below the
/// bundled SQLite's variable limit.
pub const SQLITE_MAX_ROWS_CHUNK: usize = 500;

/// Splits a slice into chunks of at most [`SQLITE_MAX_ROWS_CHUNK`] items.
pub fn chunk_for_sqlite<T>(items: &[T]) -> impl Iterator<Item = &[T]> {
    items.chunks(SQLITE_MAX_ROWS_CHUNK)
}
