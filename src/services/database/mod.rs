// Database service module
// SQLite connection, schema creation, and additive migrations

mod connection;
pub(crate) mod migrations;
mod schema;

pub use connection::Database;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn table_exists(db: &Database, name: &str) -> bool {
        db.connection()
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?",
                [name],
                |row| row.get::<_, i64>(0),
            )
            .unwrap()
            == 1
    }

    #[test]
    fn test_new_database_in_memory() {
        let result = Database::new(":memory:");
        assert!(result.is_ok(), "Should create in-memory database");
    }

    #[test]
    fn test_new_database_with_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let db_path_str = db_path.to_str().unwrap();

        let result = Database::new(db_path_str);
        assert!(result.is_ok(), "Should create file-based database");
        assert!(Path::new(db_path_str).exists(), "Database file should exist");
    }

    #[test]
    fn test_initialize_schema_creates_tables() {
        let db = Database::new(":memory:").unwrap();
        db.initialize_schema().unwrap();

        for table in ["notes", "time_blocks", "subscriptions"] {
            assert!(table_exists(&db, table), "{} table should exist", table);
        }
    }

    #[test]
    fn test_initialize_schema_is_idempotent() {
        let db = Database::new(":memory:").unwrap();
        db.initialize_schema().unwrap();
        assert!(db.initialize_schema().is_ok());
    }

    #[test]
    fn test_foreign_keys_enabled() {
        let db = Database::new(":memory:").unwrap();

        let enabled: i64 = db
            .connection()
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();

        assert_eq!(enabled, 1, "Foreign keys should be enabled");
    }

    #[test]
    fn test_time_block_check_constraint() {
        let db = Database::new(":memory:").unwrap();
        db.initialize_schema().unwrap();
        let conn = db.connection();
        conn.execute(
            "INSERT INTO notes (user_id, title, content, created_at, updated_at)
             VALUES ('u1', 'n', '', '2025-01-01T00:00:00+00:00', '2025-01-01T00:00:00+00:00')",
            [],
        )
        .unwrap();

        let inverted = conn.execute(
            "INSERT INTO time_blocks (user_id, note_id, date, start_time, end_time)
             VALUES ('u1', 1, '2025-01-01', '10:00:00', '09:00:00')",
            [],
        );
        assert!(inverted.is_err(), "start must precede end");
    }
}
