mod schema;

use std::path::{Path, PathBuf};

use rusqlite::{Connection, OpenFlags, OptionalExtension};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::{SealId, TaggedSeal};
use schema::{ALL_SEALS_QUERY, REQUIRED_RELATIONS, SEAL_SCHEMA, TAGGED_SEALS_QUERY};

/// Errors raised while reading the seal/tag store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store file could not be opened.
    #[error("failed to open store {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// One of the expected relations does not exist.
    #[error("store is missing relation `{0}`")]
    MissingRelation(&'static str),

    /// A statement failed while reading or writing the store.
    #[error("failed to {action}: {source}")]
    Query {
        action: &'static str,
        #[source]
        source: rusqlite::Error,
    },
}

impl StoreError {
    fn query(action: &'static str) -> impl FnOnce(rusqlite::Error) -> Self {
        move |source| Self::Query { action, source }
    }
}

/// What to do with seals that carry no tags.
///
/// The membership relation only mentions seals with at least one tag, so
/// untagged seals are either left out entirely or enumerated from the
/// `seal` relation and encoded as all-zero vectors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UntaggedPolicy {
    /// Only seals with at least one tag are enumerated.
    #[default]
    Skip,
    /// Every seal is enumerated; untagged ones become zero vectors.
    Include,
}

/// Database wrapper providing read access to the seal/tag store.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens an in-memory SQLite database with an empty store schema.
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(|source| StoreError::Open {
            path: PathBuf::from(":memory:"),
            source,
        })?;
        let db = Self { conn };
        db.initialize_schema()?;
        Ok(db)
    }

    /// Creates (or reuses) a file-based store at the given path.
    ///
    /// Creates the database file if it does not exist and initializes the
    /// schema.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|source| StoreError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.initialize_schema()?;
        Ok(db)
    }

    /// Opens an existing store read-only.
    ///
    /// Never creates the file or touches its schema. Fails if the file does
    /// not exist or any of the `seal`, `tag` and `seal_has_tag` relations is
    /// missing.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|source| StoreError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.validate_schema()?;
        debug!(path = %path.display(), "opened seal store");
        Ok(db)
    }

    fn initialize_schema(&self) -> Result<(), StoreError> {
        self.conn
            .execute("PRAGMA foreign_keys = ON", [])
            .map_err(StoreError::query("enable foreign keys"))?;
        self.conn
            .execute_batch(SEAL_SCHEMA)
            .map_err(StoreError::query("initialize schema"))?;
        Ok(())
    }

    /// Checks that every relation the pipeline reads is present.
    pub fn validate_schema(&self) -> Result<(), StoreError> {
        for relation in REQUIRED_RELATIONS {
            let found = self
                .conn
                .query_row(
                    "SELECT 1 FROM sqlite_master WHERE type IN ('table', 'view') AND name = ?1",
                    [relation],
                    |_| Ok(()),
                )
                .optional()
                .map_err(StoreError::query("inspect schema"))?;

            if found.is_none() {
                return Err(StoreError::MissingRelation(relation));
            }
        }
        Ok(())
    }

    /// Returns every tag name in the store, in storage order.
    pub fn tag_names(&self) -> Result<Vec<String>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM tag")
            .map_err(StoreError::query("prepare tag query"))?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(StoreError::query("query tag names"))?;

        let mut names = Vec::new();
        for row in rows {
            names.push(row.map_err(StoreError::query("read tag name"))?);
        }
        Ok(names)
    }

    /// Returns every seal with its tag names, in ascending seal id order.
    ///
    /// Whether seals without tags appear is decided by `policy`.
    pub fn tagged_seals(&self, policy: UntaggedPolicy) -> Result<Vec<TaggedSeal>, StoreError> {
        let query = match policy {
            UntaggedPolicy::Skip => TAGGED_SEALS_QUERY,
            UntaggedPolicy::Include => ALL_SEALS_QUERY,
        };
        let mut stmt = self
            .conn
            .prepare(query)
            .map_err(StoreError::query("prepare membership query"))?;
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, Option<String>>(1)?))
            })
            .map_err(StoreError::query("query seal membership"))?;

        let mut seals: Vec<TaggedSeal> = Vec::new();
        for row in rows {
            let (id, name) = row.map_err(StoreError::query("read seal membership"))?;
            let id = SealId::new(id);

            // Rows arrive grouped by seal id
            if seals.last().map(TaggedSeal::id) != Some(id) {
                seals.push(TaggedSeal::untagged(id));
            }
            if let (Some(name), Some(seal)) = (name, seals.last_mut()) {
                seal.add_tag(name);
            }
        }

        debug!(count = seals.len(), ?policy, "loaded seal membership");
        Ok(seals)
    }

    /// Inserts a tag name if it does not exist yet and returns its row id.
    pub fn add_tag(&self, name: &str) -> Result<i64, StoreError> {
        self.conn
            .execute("INSERT OR IGNORE INTO tag (name) VALUES (?1)", [name])
            .map_err(StoreError::query("insert tag"))?;
        self.conn
            .query_row("SELECT id FROM tag WHERE name = ?1", [name], |row| {
                row.get(0)
            })
            .map_err(StoreError::query("look up tag"))
    }

    /// Inserts a seal and links it to the given tags, creating missing tags.
    pub fn add_seal(&self, id: SealId, tags: &[&str]) -> Result<(), StoreError> {
        self.conn
            .execute("INSERT OR IGNORE INTO seal (id) VALUES (?1)", [id.get()])
            .map_err(StoreError::query("insert seal"))?;

        for name in tags {
            let tag_id = self.add_tag(name)?;
            self.conn
                .execute(
                    "INSERT OR IGNORE INTO seal_has_tag (seal_id, tag_id) VALUES (?1, ?2)",
                    (id.get(), tag_id),
                )
                .map_err(StoreError::query("link seal to tag"))?;
        }
        Ok(())
    }

    /// Returns a reference to the underlying connection.
    ///
    /// Useful for executing custom queries in tests.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}
