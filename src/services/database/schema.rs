use anyhow::{Context, Result};
use rusqlite::Connection;

use super::migrations;

pub fn initialize_schema(conn: &Connection) -> Result<()> {
    create_notes_table(conn)?;
    create_time_blocks_table(conn)?;
    create_subscriptions_table(conn)?;
    run_subscription_migrations(conn)?;
    Ok(())
}

fn create_notes_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS notes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            title TEXT NOT NULL DEFAULT '',
            content TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )
    .context("Failed to create notes table")?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_notes_user ON notes(user_id)",
        [],
    )
    .context("Failed to create notes index")?;

    Ok(())
}

fn create_time_blocks_table(conn: &Connection) -> Result<()> {
    // Times are zero-padded HH:MM:SS, so text comparison orders them correctly.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS time_blocks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            note_id INTEGER NOT NULL REFERENCES notes(id) ON DELETE CASCADE,
            date TEXT NOT NULL,
            start_time TEXT NOT NULL,
            end_time TEXT NOT NULL,
            CHECK (start_time < end_time)
        )",
        [],
    )
    .context("Failed to create time_blocks table")?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_time_blocks_user_date ON time_blocks(user_id, date)",
        [],
    )
    .context("Failed to create time_blocks index")?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_time_blocks_note ON time_blocks(note_id)",
        [],
    )
    .context("Failed to create time_blocks note index")?;

    Ok(())
}

fn create_subscriptions_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS subscriptions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL UNIQUE,
            provider_subscription_id TEXT NOT NULL,
            order_id TEXT,
            customer_id TEXT NOT NULL,
            product_id TEXT NOT NULL,
            variant_id TEXT NOT NULL,
            plan TEXT NOT NULL DEFAULT 'free' CHECK (plan IN ('free', 'pro')),
            status TEXT NOT NULL,
            card_brand TEXT,
            card_last_four TEXT,
            renews_at TEXT,
            ends_at TEXT,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )
    .context("Failed to create subscriptions table")?;

    Ok(())
}

fn run_subscription_migrations(conn: &Connection) -> Result<()> {
    migrations::ensure_column(
        conn,
        "subscriptions",
        "trial_ends_at",
        "ALTER TABLE subscriptions ADD COLUMN trial_ends_at TEXT",
    )?;

    migrations::ensure_column(
        conn,
        "subscriptions",
        "update_payment_method_url",
        "ALTER TABLE subscriptions ADD COLUMN update_payment_method_url TEXT",
    )?;

    Ok(())
}
