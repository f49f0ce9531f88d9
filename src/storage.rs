//! The storage module keeps proposed slugs in SQLite so they can be reviewed,
//! edited and reported after the optimization run.

use anyhow::Result;
use rusqlite::{Connection, params};
use std::sync::{Arc, Mutex};

use crate::slug::{SlugResult, check_slug};

/// Storage provides database operations for the slug results of one run.
pub struct Storage {
    /// The underlying SQLite connection wrapped in Arc<Mutex<>> to make it thread-safe
    conn: Arc<Mutex<Connection>>,
}

impl Storage {
    /// Creates a new Storage instance with a database at the specified path.
    ///
    /// # Arguments
    ///
    /// * `database_path` - Path where the database file should be created or opened
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or its schema created
    pub fn new(database_path: &str) -> Result<Self> {
        let conn = Connection::open(database_path)?;

        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Initializes the database schema with the results table if it doesn't exist.
    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS results (
                id INTEGER PRIMARY KEY,
                original_url TEXT NOT NULL,
                current_slug TEXT NOT NULL,
                proposed_slug TEXT NOT NULL
            )",
            params![],
        )?;

        Ok(())
    }

    /// Removes every stored result, returning how many were removed.
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    ///
    /// # Panics
    ///
    /// Panics if the mutex is poisoned
    pub fn clear(&self) -> Result<usize> {
        let conn = self.conn.lock().expect("Storage mutex poisoned");
        Ok(conn.execute("DELETE FROM results", [])?)
    }

    /// Stores a batch of results in a single transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    ///
    /// # Panics
    ///
    /// Panics if the mutex is poisoned
    pub fn insert_results(&self, results: &[SlugResult]) -> Result<()> {
        let mut conn = self.conn.lock().expect("Storage mutex poisoned");
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT OR REPLACE INTO results (id, original_url, current_slug, proposed_slug) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for result in results {
                stmt.execute(params![
                    result.id(),
                    result.original_url(),
                    result.current_slug(),
                    result.proposed_slug()
                ])?;
            }
        }
        tx.commit()?;

        Ok(())
    }

    /// Returns all stored results in the order they were produced.
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    ///
    /// # Panics
    ///
    /// Panics if the mutex is poisoned
    pub fn list_results(&self) -> Result<Vec<SlugResult>> {
        let conn = self.conn.lock().expect("Storage mutex poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, original_url, current_slug, proposed_slug FROM results ORDER BY id ASC",
        )?;
        let results: Result<Vec<SlugResult>, rusqlite::Error> = stmt
            .query_map([], |row| {
                Ok(SlugResult::from_parts(
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                ))
            })?
            .collect();

        results.map_err(|e| e.into())
    }

    /// Replaces the proposed slug of one result.
    ///
    /// # Returns
    ///
    /// Returns `false` if no result has the given id
    ///
    /// # Errors
    ///
    /// Returns an error if the slug contains a tab or line break, or if
    /// database operation fails
    ///
    /// # Panics
    ///
    /// Panics if the mutex is poisoned
    pub fn update_proposed_slug(&self, id: i64, slug: &str) -> Result<bool> {
        check_slug(slug)?;
        let conn = self.conn.lock().expect("Storage mutex poisoned");
        let updated = conn.execute(
            "UPDATE results SET proposed_slug = ?1 WHERE id = ?2",
            params![slug, id],
        )?;

        Ok(updated > 0)
    }
}
