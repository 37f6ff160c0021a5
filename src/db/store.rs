//! Entity store: the persistence contract the scheduling core consumes.
//!
//! Four operations (`list`, `get`, `put`, `remove_where`) over any
//! `Entity`. `SqliteStore` is the production implementation; the core only
//! sees the `EntityStore` trait.

use std::path::Path;

use rusqlite::{params, params_from_iter, Connection};

use super::repository::Entity;
use super::{open_database, open_memory_database, DatabaseError};

/// Abstract record store.
pub trait EntityStore {
    /// All records of one type, in insertion order.
    fn list<E: Entity>(&self) -> Result<Vec<E>, DatabaseError>;

    fn get<E: Entity>(&self, id: i64) -> Result<Option<E>, DatabaseError>;

    /// Insert (id `0`) or fully replace (id set). Returns the stored record.
    fn put<E: Entity>(&self, record: &E) -> Result<E, DatabaseError>;

    /// Delete every record matching `predicate`. Returns how many were removed.
    fn remove_where<E, P>(&self, predicate: P) -> Result<usize, DatabaseError>
    where
        E: Entity,
        P: Fn(&E) -> bool;

    /// Like `get`, but a missing record is an error.
    fn require<E: Entity>(&self, id: i64) -> Result<E, DatabaseError> {
        self.get::<E>(id)?.ok_or_else(|| DatabaseError::NotFound {
            entity_type: E::ENTITY_TYPE.into(),
            id: id.to_string(),
        })
    }

    /// Run `f` so that its reads and writes commit together or not at all.
    ///
    /// Stores without transactions run `f` directly.
    fn atomically<T, Fail, F>(&self, f: F) -> Result<T, Fail>
    where
        F: FnOnce(&Self) -> Result<T, Fail>,
        Fail: From<DatabaseError>,
    {
        f(self)
    }
}

/// `EntityStore` backed by a single SQLite connection.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Open (or create) the database file and apply migrations.
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        Ok(Self::new(open_database(path)?))
    }

    /// Fresh in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        Ok(Self::new(open_memory_database()?))
    }

    fn select_sql<E: Entity>() -> String {
        format!("SELECT id, {} FROM {}", E::COLUMNS.join(", "), E::TABLE)
    }

    fn insert<E: Entity>(&self, record: &E) -> Result<E, DatabaseError> {
        let placeholders = (1..=E::COLUMNS.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({placeholders})",
            E::TABLE,
            E::COLUMNS.join(", "),
        );
        self.conn
            .execute(&sql, params_from_iter(record.to_values()))
            .map_err(DatabaseError::from_write)?;
        let id = self.conn.last_insert_rowid();
        Ok(record.clone().with_id(id))
    }

    fn replace<E: Entity>(&self, record: &E) -> Result<E, DatabaseError> {
        let placeholders = (1..=E::COLUMNS.len() + 1)
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let assignments = E::COLUMNS
            .iter()
            .map(|c| format!("{c} = excluded.{c}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO {} (id, {}) VALUES ({placeholders})
             ON CONFLICT(id) DO UPDATE SET {assignments}",
            E::TABLE,
            E::COLUMNS.join(", "),
        );

        let mut values = Vec::with_capacity(E::COLUMNS.len() + 1);
        values.push(rusqlite::types::Value::Integer(record.id()));
        values.extend(record.to_values());

        self.conn
            .execute(&sql, params_from_iter(values))
            .map_err(DatabaseError::from_write)?;
        Ok(record.clone())
    }
}

impl EntityStore for SqliteStore {
    fn list<E: Entity>(&self) -> Result<Vec<E>, DatabaseError> {
        let sql = format!("{} ORDER BY id ASC", Self::select_sql::<E>());
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| E::from_row(row))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
    }

    fn get<E: Entity>(&self, id: i64) -> Result<Option<E>, DatabaseError> {
        let sql = format!("{} WHERE id = ?1", Self::select_sql::<E>());
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query_map(params![id], |row| E::from_row(row))?;
        rows.next().transpose().map_err(DatabaseError::from)
    }

    fn put<E: Entity>(&self, record: &E) -> Result<E, DatabaseError> {
        if record.id() < 0 {
            return Err(DatabaseError::InvalidRecord {
                entity_type: E::ENTITY_TYPE.into(),
                reason: format!("negative id {}", record.id()),
            });
        }
        if record.id() == 0 {
            self.insert(record)
        } else {
            self.replace(record)
        }
    }

    fn remove_where<E, P>(&self, predicate: P) -> Result<usize, DatabaseError>
    where
        E: Entity,
        P: Fn(&E) -> bool,
    {
        let doomed: Vec<i64> = self
            .list::<E>()?
            .iter()
            .filter(|record| predicate(record))
            .map(Entity::id)
            .collect();

        let sql = format!("DELETE FROM {} WHERE id = ?1", E::TABLE);
        let mut removed = 0;
        for id in doomed {
            removed += self.conn.execute(&sql, params![id]).map_err(DatabaseError::from_write)?;
        }
        Ok(removed)
    }

    /// `BEGIN IMMEDIATE` takes the write lock up front, so a competing
    /// writer cannot slip in between the read and the write inside `f`.
    fn atomically<T, Fail, F>(&self, f: F) -> Result<T, Fail>
    where
        F: FnOnce(&Self) -> Result<T, Fail>,
        Fail: From<DatabaseError>,
    {
        self.conn
            .execute_batch("BEGIN IMMEDIATE")
            .map_err(|e| Fail::from(DatabaseError::from(e)))?;

        match f(self) {
            Ok(value) => {
                self.conn
                    .execute_batch("COMMIT")
                    .map_err(|e| Fail::from(DatabaseError::from(e)))?;
                Ok(value)
            }
            Err(err) => {
                if let Err(e) = self.conn.execute_batch("ROLLBACK") {
                    tracing::warn!(error = %e, "Rollback failed");
                }
                Err(err)
            }
        }
    }
}
