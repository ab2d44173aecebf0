//! SQLite-backed snapshot store.
//!
//! One table keyed by snapshot name, with the kind, owner and version
//! columns lifted out of the JSON so they can be queried directly.

use crate::error::{StorageError, StorageResult};
use crate::store::{check_key, SnapshotStore, StoredSnapshot};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mesh_crdt::CrdtKind;
use mesh_types::NodeId;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS crdt_snapshots (
        key TEXT PRIMARY KEY,
        kind TEXT NOT NULL,
        node_id TEXT NOT NULL,
        version INTEGER NOT NULL,
        data TEXT NOT NULL,
        saved_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_crdt_snapshots_version ON crdt_snapshots(version);
    CREATE INDEX IF NOT EXISTS idx_crdt_snapshots_saved_at ON crdt_snapshots(saved_at);
";

/// A [`SnapshotStore`] persisted in a SQLite database.
///
/// Trait methods run their queries on tokio's blocking pool.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore").finish_non_exhaustive()
    }
}

/// Raw column values, converted outside the rusqlite row callback.
type SnapshotRow = (String, String, i64, String, String);

impl SqliteStore {
    /// Opens (or creates) a store at the given path.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        info!("Opened snapshot store at {}", path.display());
        Self::with_connection(conn)
    }

    /// Opens an in-memory store (for testing).
    pub fn open_in_memory() -> StorageResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> StorageResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        lock(&self.conn)
    }

    /// Runs `op` against the connection on the blocking pool.
    async fn blocking<R, F>(&self, op: F) -> StorageResult<R>
    where
        F: FnOnce(&Connection) -> StorageResult<R> + Send + 'static,
        R: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || op(&lock(&conn)))
            .await
            .map_err(|e| {
                warn!("Snapshot store task failed: {}", e);
                StorageError::InvalidData(format!("store task failed: {e}"))
            })?
    }

    /// Keys of snapshots saved at or after `since`, oldest first.
    pub fn keys_saved_since(&self, since: DateTime<Utc>) -> StorageResult<Vec<String>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT key FROM crdt_snapshots WHERE saved_at >= ?1 ORDER BY saved_at, key",
        )?;
        let keys = stmt
            .query_map(params![encode_time(since)], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(keys)
    }

    /// Keys of snapshots whose version is strictly above `version`.
    pub fn keys_above_version(&self, version: u64) -> StorageResult<Vec<String>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT key FROM crdt_snapshots WHERE version > ?1 ORDER BY version, key",
        )?;
        let keys = stmt
            .query_map(params![to_column(version)?], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(keys)
    }
}

#[async_trait]
impl SnapshotStore for SqliteStore {
    async fn save(&self, key: &str, snapshot: StoredSnapshot) -> StorageResult<()> {
        check_key(key)?;
        let key = key.to_string();
        self.blocking(move |conn| {
            conn.execute(
                "INSERT INTO crdt_snapshots (key, kind, node_id, version, data, saved_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(key) DO UPDATE SET
                    kind = excluded.kind,
                    node_id = excluded.node_id,
                    version = excluded.version,
                    data = excluded.data,
                    saved_at = excluded.saved_at",
                params![
                    key,
                    snapshot.kind.as_str(),
                    snapshot.node_id.as_str(),
                    to_column(snapshot.version)?,
                    snapshot.data,
                    encode_time(snapshot.saved_at),
                ],
            )?;
            debug!("Saved {} snapshot {} (version {})", snapshot.kind, key, snapshot.version);
            Ok(())
        })
        .await
    }

    async fn load(&self, key: &str) -> StorageResult<Option<StoredSnapshot>> {
        let key = key.to_string();
        self.blocking(move |conn| {
            let row: Option<SnapshotRow> = conn
                .query_row(
                    "SELECT kind, node_id, version, data, saved_at FROM crdt_snapshots WHERE key = ?1",
                    params![key],
                    |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?)),
                )
                .optional()?;
            row.map(decode_row).transpose()
        })
        .await
    }

    async fn get_all_keys(&self) -> StorageResult<Vec<String>> {
        self.blocking(|conn| {
            let mut stmt = conn.prepare("SELECT key FROM crdt_snapshots ORDER BY key")?;
            let keys = stmt
                .query_map([], |row| row.get(0))?
                .collect::<Result<Vec<String>, _>>()?;
            Ok(keys)
        })
        .await
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let key = key.to_string();
        self.blocking(move |conn| {
            let removed = conn.execute("DELETE FROM crdt_snapshots WHERE key = ?1", params![key])?;
            if removed > 0 {
                debug!("Deleted snapshot {}", key);
            }
            Ok(())
        })
        .await
    }
}

fn lock(conn: &Mutex<Connection>) -> MutexGuard<'_, Connection> {
    conn.lock().unwrap_or_else(PoisonError::into_inner)
}

fn decode_row((kind, node_id, version, data, saved_at): SnapshotRow) -> StorageResult<StoredSnapshot> {
    let kind: CrdtKind = kind.parse()?;
    // Stored as written, so whatever saved also loads.
    let node_id = NodeId::from(node_id);
    let version = u64::try_from(version)
        .map_err(|_| StorageError::InvalidData(format!("negative version: {version}")))?;
    let saved_at = DateTime::parse_from_rfc3339(&saved_at)
        .map_err(|e| StorageError::InvalidData(format!("bad saved_at {saved_at:?}: {e}")))?
        .with_timezone(&Utc);
    Ok(StoredSnapshot {
        kind,
        node_id,
        version,
        data,
        saved_at,
    })
}

// SQLite integers are signed.
fn to_column(version: u64) -> StorageResult<i64> {
    i64::try_from(version)
        .map_err(|_| StorageError::InvalidData(format!("version {version} exceeds i64")))
}

// Fixed-width UTC so lexical order matches time order.
fn encode_time(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(chrono::SecondsFormat::Nanos, true)
}
