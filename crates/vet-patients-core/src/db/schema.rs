//! SQLite schema definition.

/// Complete database schema for the patient tracker.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Blob Store
-- ============================================================================

-- One row per named snapshot. The value is opaque to the database.
CREATE TABLE IF NOT EXISTS blob_store (
    key TEXT PRIMARY KEY,
    value BLOB NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;
