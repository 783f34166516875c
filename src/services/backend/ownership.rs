use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension};

use super::BackendError;

/// Row-level ownership check: `NotFound` when the row is missing,
/// `AccessDenied` when it belongs to someone else.
pub(crate) fn ensure_owner(
    conn: &Connection,
    table: &str,
    id: i64,
    user_id: &str,
) -> Result<()> {
    let owner: Option<String> = conn
        .query_row(
            &format!("SELECT user_id FROM {} WHERE id = ?1", table),
            [id],
            |row| row.get(0),
        )
        .optional()
        .with_context(|| format!("Failed to look up owner of {} {}", table, id))?;

    match owner {
        None => Err(BackendError::NotFound(format!("{} {}", table, id)).into()),
        Some(owner) if owner != user_id => {
            log::warn!("User {} denied access to {} {}", user_id, table, id);
            Err(BackendError::AccessDenied.into())
        }
        Some(_) => Ok(()),
    }
}
