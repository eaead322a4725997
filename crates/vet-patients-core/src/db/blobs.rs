//! SQLite-backed blob store.

use rusqlite::{params, OptionalExtension};

use super::{BlobStore, Database, DbResult};

impl BlobStore for Database {
    fn get(&self, key: &str) -> DbResult<Option<Vec<u8>>> {
        self.conn
            .query_row(
                "SELECT value FROM blob_store WHERE key = ?",
                [key],
                |row| row.get(0),
            )
            .optional()
            .map_err(Into::into)
    }

    fn put(&mut self, key: &str, value: &[u8]) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO blob_store (key, value) VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = datetime('now')
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM blob_store WHERE key = ?", [key])?;
        Ok(rows_affected > 0)
    }
}
