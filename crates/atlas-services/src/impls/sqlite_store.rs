// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
SQLite-backed structural store.

Tables mirror the structural database: `channel` names, one `voxel_set` row
per segmented entity (bounding box, keypoint, external id), and `neuron` /
`synapse` rows pointing at their voxel sets. Synapses reference their pre and
post neurons by internal key.
*/

use crate::traits::StructuralStore;
use crate::types::*;
use async_trait::async_trait;
use atlas_structures::{BBox, EntityId, Vector3};
use parking_lot::{Mutex, MutexGuard};
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::info;

/// Schema of the structural database
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS channel (
    id   INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS voxel_set (
    id           INTEGER PRIMARY KEY,
    boss_vset_id INTEGER NOT NULL,
    channel      INTEGER NOT NULL REFERENCES channel(id),
    key_point_x  INTEGER NOT NULL,
    key_point_y  INTEGER NOT NULL,
    key_point_z  INTEGER NOT NULL,
    size         INTEGER,
    x_min        INTEGER NOT NULL,
    y_min        INTEGER NOT NULL,
    z_min        INTEGER NOT NULL,
    x_max        INTEGER NOT NULL,
    y_max        INTEGER NOT NULL,
    z_max        INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS voxel_set_boss_id ON voxel_set (boss_vset_id, channel);

CREATE TABLE IF NOT EXISTS neuron (
    id        INTEGER PRIMARY KEY,
    voxel_set INTEGER NOT NULL REFERENCES voxel_set(id),
    em_id     INTEGER
);

CREATE TABLE IF NOT EXISTS synapse (
    id        INTEGER PRIMARY KEY,
    voxel_set INTEGER NOT NULL REFERENCES voxel_set(id),
    pre       INTEGER NOT NULL REFERENCES neuron(id),
    post      INTEGER NOT NULL REFERENCES neuron(id)
);

CREATE INDEX IF NOT EXISTS synapse_pre ON synapse (pre);
CREATE INDEX IF NOT EXISTS synapse_post ON synapse (post);
"#;

/// [`StructuralStore`] over a small pool of SQLite connections
///
/// Every query runs on the blocking thread pool with one connection checked
/// out for its duration.
pub struct SqliteStructuralStore {
    connections: Arc<[Mutex<Connection>]>,
    next: AtomicUsize,
}

impl SqliteStructuralStore {
    /// Open an existing database file with `pool_size` connections (at least one)
    pub fn open(path: &Path, read_only: bool, pool_size: usize) -> ServiceResult<Self> {
        let flags = if read_only {
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX
        } else {
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX
        };

        let connections = (0..pool_size.max(1))
            .map(|_| {
                Connection::open_with_flags(path, flags).map_err(|e| {
                    ServiceError::Store(format!("Failed to open {}: {}", path.display(), e))
                })
            })
            .collect::<ServiceResult<Vec<_>>>()?;
        info!(
            target: "atlas-services",
            "Opened structural database {} (read_only={}, connections={})",
            path.display(),
            read_only,
            connections.len()
        );

        Ok(Self::from_connections(connections))
    }

    /// Fresh in-memory database with the schema applied
    ///
    /// An in-memory database lives in its connection, so the pool has one.
    pub fn open_in_memory() -> ServiceResult<Self> {
        let store = Self::from_connection(Connection::open_in_memory()?);
        store.create_schema()?;
        Ok(store)
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self::from_connections(vec![conn])
    }

    fn from_connections(connections: Vec<Connection>) -> Self {
        Self {
            connections: connections.into_iter().map(Mutex::new).collect(),
            next: AtomicUsize::new(0),
        }
    }

    pub fn pool_size(&self) -> usize {
        self.connections.len()
    }

    /// Apply [`SCHEMA_SQL`]; existing tables are left as they are
    pub fn create_schema(&self) -> ServiceResult<()> {
        self.execute_batch(SCHEMA_SQL)
    }

    /// Run a batch of statements, e.g. to load fixtures
    pub fn execute_batch(&self, sql: &str) -> ServiceResult<()> {
        self.connections[0].lock().execute_batch(sql)?;
        Ok(())
    }

    /// Run `query` on a blocking thread with a pooled connection
    async fn with_connection<T, F>(&self, query: F) -> ServiceResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> ServiceResult<T> + Send + 'static,
    {
        let connections = Arc::clone(&self.connections);
        let start = self.next.fetch_add(1, Ordering::Relaxed);
        tokio::task::spawn_blocking(move || {
            let conn = checkout(&connections, start);
            query(&conn)
        })
        .await
        .map_err(|e| ServiceError::Internal(format!("Store task failed: {}", e)))?
    }
}

/// First idle connection from `start` on, else wait for the one at `start`
fn checkout(connections: &[Mutex<Connection>], start: usize) -> MutexGuard<'_, Connection> {
    let len = connections.len();
    (0..len)
        .find_map(|offset| connections[(start + offset) % len].try_lock())
        .unwrap_or_else(|| connections[start % len].lock())
}

/// External ids are unsigned 64-bit; SQLite integers are signed.
/// Ids beyond `i64::MAX` cannot be stored and so never match.
fn to_sql_id(id: EntityId) -> Option<i64> {
    i64::try_from(id.get()).ok()
}

fn from_sql_id(column: usize, value: i64) -> rusqlite::Result<EntityId> {
    u64::try_from(value)
        .map(EntityId::new)
        .map_err(|_| rusqlite::Error::IntegralValueOutOfRange(column, value))
}

fn channel_id(conn: &Connection, name: &str) -> ServiceResult<Option<i64>> {
    Ok(conn
        .query_row("SELECT id FROM channel WHERE name = ?1", params![name], |row| {
            row.get(0)
        })
        .optional()?)
}

/// Channel key and sql id, or `None` when either cannot match any row
fn lookup_key(conn: &Connection, id: EntityId, channel: &str) -> ServiceResult<Option<(i64, i64)>> {
    let Some(sql_id) = to_sql_id(id) else {
        return Ok(None);
    };
    Ok(channel_id(conn, channel)?.map(|channel_key| (sql_id, channel_key)))
}

fn read_bbox(row: &rusqlite::Row<'_>, first: usize) -> rusqlite::Result<BBox> {
    Ok(BBox::new(
        Vector3::new(row.get(first)?, row.get(first + 1)?, row.get(first + 2)?),
        Vector3::new(row.get(first + 3)?, row.get(first + 4)?, row.get(first + 5)?),
    ))
}

#[async_trait]
impl StructuralStore for SqliteStructuralStore {
    async fn is_synapse(&self, id: EntityId, channel: &str) -> ServiceResult<bool> {
        let channel = channel.to_owned();
        self.with_connection(move |conn| {
            let Some((sql_id, channel_key)) = lookup_key(conn, id, &channel)? else {
                return Ok(false);
            };
            let found = conn
                .query_row(
                    "SELECT 1 FROM synapse JOIN voxel_set ON synapse.voxel_set = voxel_set.id
                     WHERE voxel_set.boss_vset_id = ?1 AND voxel_set.channel = ?2",
                    params![sql_id, channel_key],
                    |_| Ok(()),
                )
                .optional()?;
            Ok(found.is_some())
        })
        .await
    }

    async fn is_neuron(&self, id: EntityId, channel: &str) -> ServiceResult<bool> {
        let channel = channel.to_owned();
        self.with_connection(move |conn| {
            let Some((sql_id, channel_key)) = lookup_key(conn, id, &channel)? else {
                return Ok(false);
            };
            let found = conn
                .query_row(
                    "SELECT 1 FROM neuron JOIN voxel_set ON neuron.voxel_set = voxel_set.id
                     WHERE voxel_set.boss_vset_id = ?1 AND voxel_set.channel = ?2",
                    params![sql_id, channel_key],
                    |_| Ok(()),
                )
                .optional()?;
            Ok(found.is_some())
        })
        .await
    }

    async fn neuron_internal_id(&self, id: EntityId, channel: &str) -> ServiceResult<InternalId> {
        let channel = channel.to_owned();
        self.with_connection(move |conn| {
            let Some((sql_id, channel_key)) = lookup_key(conn, id, &channel)? else {
                return Err(ServiceError::not_found("Neuron", id));
            };
            conn.query_row(
                "SELECT neuron.id FROM neuron JOIN voxel_set ON neuron.voxel_set = voxel_set.id
                 WHERE voxel_set.boss_vset_id = ?1 AND voxel_set.channel = ?2",
                params![sql_id, channel_key],
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(|| ServiceError::not_found("Neuron", id))
        })
        .await
    }

    async fn bbox(&self, id: EntityId, channel: &str) -> ServiceResult<BBox> {
        let channel = channel.to_owned();
        self.with_connection(move |conn| {
            let Some((sql_id, channel_key)) = lookup_key(conn, id, &channel)? else {
                return Err(ServiceError::not_found("VoxelSet", id));
            };
            conn.query_row(
                "SELECT x_min, y_min, z_min, x_max, y_max, z_max FROM voxel_set
                 WHERE boss_vset_id = ?1 AND channel = ?2",
                params![sql_id, channel_key],
                |row| read_bbox(row, 0),
            )
            .optional()?
            .ok_or_else(|| ServiceError::not_found("VoxelSet", id))
        })
        .await
    }

    async fn keypoint(&self, id: EntityId, channel: &str) -> ServiceResult<Vector3> {
        let channel = channel.to_owned();
        self.with_connection(move |conn| {
            let Some((sql_id, channel_key)) = lookup_key(conn, id, &channel)? else {
                return Err(ServiceError::not_found("VoxelSet", id));
            };
            conn.query_row(
                "SELECT key_point_x, key_point_y, key_point_z FROM voxel_set
                 WHERE boss_vset_id = ?1 AND channel = ?2",
                params![sql_id, channel_key],
                |row| Ok(Vector3::new(row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?
            .ok_or_else(|| ServiceError::not_found("VoxelSet", id))
        })
        .await
    }

    async fn synapse_parents(&self, id: EntityId, channel: &str) -> ServiceResult<SynapseParents> {
        let channel = channel.to_owned();
        self.with_connection(move |conn| {
            let Some((sql_id, channel_key)) = lookup_key(conn, id, &channel)? else {
                return Err(ServiceError::not_found("Synapse", id));
            };
            conn.query_row(
                "SELECT pre_vs.boss_vset_id, post_vs.boss_vset_id
                 FROM synapse
                 JOIN voxel_set AS vs ON synapse.voxel_set = vs.id
                 JOIN neuron AS pre_n ON synapse.pre = pre_n.id
                 JOIN voxel_set AS pre_vs ON pre_n.voxel_set = pre_vs.id
                 JOIN neuron AS post_n ON synapse.post = post_n.id
                 JOIN voxel_set AS post_vs ON post_n.voxel_set = post_vs.id
                 WHERE vs.boss_vset_id = ?1 AND vs.channel = ?2",
                params![sql_id, channel_key],
                |row| {
                    Ok(SynapseParents {
                        pre: from_sql_id(0, row.get(0)?)?,
                        post: from_sql_id(1, row.get(1)?)?,
                    })
                },
            )
            .optional()?
            .ok_or_else(|| ServiceError::not_found("Synapse", id))
        })
        .await
    }

    async fn incident_synapses(&self, neuron: InternalId) -> ServiceResult<Vec<IncidentSynapse>> {
        self.with_connection(move |conn| {
            let mut stmt = conn.prepare_cached(
                "SELECT vs.boss_vset_id, synapse.pre,
                        vs.x_min, vs.y_min, vs.z_min, vs.x_max, vs.y_max, vs.z_max,
                        channel.name
                 FROM synapse
                 JOIN voxel_set AS vs ON synapse.voxel_set = vs.id
                 JOIN channel ON vs.channel = channel.id
                 WHERE synapse.pre = ?1 OR synapse.post = ?1
                 ORDER BY synapse.id",
            )?;
            let rows = stmt.query_map(params![neuron], |row| {
                Ok(IncidentSynapse {
                    synapse: from_sql_id(0, row.get(0)?)?,
                    pre: row.get(1)?,
                    bbox: read_bbox(row, 2)?,
                    channel: row.get(8)?,
                })
            })?;

            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
        .await
    }

    async fn neighbors(
        &self,
        neuron: InternalId,
        direction: NeighborDirection,
        functional_only: bool,
    ) -> ServiceResult<Vec<EntityId>> {
        let sql = match direction {
            NeighborDirection::Presynaptic => {
                "SELECT vs.boss_vset_id FROM synapse
                 JOIN neuron ON synapse.pre = neuron.id
                 JOIN voxel_set AS vs ON neuron.voxel_set = vs.id
                 WHERE synapse.post = ?1 AND (?2 = 0 OR neuron.em_id IS NOT NULL)
                 ORDER BY synapse.id"
            }
            NeighborDirection::Postsynaptic => {
                "SELECT vs.boss_vset_id FROM synapse
                 JOIN neuron ON synapse.post = neuron.id
                 JOIN voxel_set AS vs ON neuron.voxel_set = vs.id
                 WHERE synapse.pre = ?1 AND (?2 = 0 OR neuron.em_id IS NOT NULL)
                 ORDER BY synapse.id"
            }
        };

        self.with_connection(move |conn| {
            let mut stmt = conn.prepare_cached(sql)?;
            let rows = stmt.query_map(params![neuron, functional_only], |row| {
                from_sql_id(0, row.get(0)?)
            })?;

            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // neurons 1 (em), 2, 3 in "seg"; synapses 100 (1->2), 101 (3->1) in "syn"
    const FIXTURE: &str = r#"
        INSERT INTO channel (id, name) VALUES (1, 'c/e/seg'), (2, 'c/e/syn');
        INSERT INTO voxel_set (id, boss_vset_id, channel, key_point_x, key_point_y, key_point_z,
                               x_min, y_min, z_min, x_max, y_max, z_max) VALUES
            (1, 1, 1, 5, 5, 5, 0, 0, 0, 10, 10, 10),
            (2, 2, 1, 50, 50, 5, 40, 40, 0, 60, 60, 10),
            (3, 3, 1, 90, 90, 5, 80, 80, 0, 99, 99, 10),
            (4, 100, 2, 12, 12, 3, 10, 10, 0, 20, 20, 9),
            (5, 101, 2, 95, 95, 3, 90, 90, 0, 110, 110, 9);
        INSERT INTO neuron (id, voxel_set, em_id) VALUES (1, 1, 7), (2, 2, NULL), (3, 3, NULL);
        INSERT INTO synapse (id, voxel_set, pre, post) VALUES (1, 4, 1, 2), (2, 5, 3, 1);
    "#;

    fn fixture_store() -> SqliteStructuralStore {
        let store = SqliteStructuralStore::open_in_memory().unwrap();
        store.execute_batch(FIXTURE).unwrap();
        store
    }

    #[tokio::test]
    async fn test_existence_checks() {
        let store = fixture_store();
        assert!(store.is_neuron(EntityId::new(1), "c/e/seg").await.unwrap());
        assert!(!store.is_neuron(EntityId::new(100), "c/e/syn").await.unwrap());
        assert!(store.is_synapse(EntityId::new(100), "c/e/syn").await.unwrap());
        assert!(!store.is_synapse(EntityId::new(1), "c/e/seg").await.unwrap());
        // unknown channel and ids beyond the signed range are simply absent
        assert!(!store.is_neuron(EntityId::new(1), "no/such/channel").await.unwrap());
        assert!(!store.is_neuron(EntityId::new(u64::MAX), "c/e/seg").await.unwrap());
    }

    #[tokio::test]
    async fn test_geometry_lookups() {
        let store = fixture_store();
        assert_eq!(
            store.bbox(EntityId::new(101), "c/e/syn").await.unwrap(),
            BBox::new(Vector3::new(90, 90, 0), Vector3::new(110, 110, 9))
        );
        assert_eq!(
            store.keypoint(EntityId::new(2), "c/e/seg").await.unwrap(),
            Vector3::new(50, 50, 5)
        );
        assert!(matches!(
            store.keypoint(EntityId::new(2), "c/e/syn").await,
            Err(ServiceError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_synapse_parents() {
        let store = fixture_store();
        let parents = store.synapse_parents(EntityId::new(101), "c/e/syn").await.unwrap();
        assert_eq!(parents.pre, EntityId::new(3));
        assert_eq!(parents.post, EntityId::new(1));
        assert!(matches!(
            store.synapse_parents(EntityId::new(1), "c/e/syn").await,
            Err(ServiceError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_incident_synapses_carry_their_own_channel() {
        let store = fixture_store();
        let internal = store.neuron_internal_id(EntityId::new(1), "c/e/seg").await.unwrap();
        let incident = store.incident_synapses(internal).await.unwrap();

        assert_eq!(incident.len(), 2);
        assert_eq!(incident[0].synapse, EntityId::new(100));
        assert_eq!(incident[0].pre, internal);
        assert_eq!(incident[0].channel, "c/e/syn");
        assert_eq!(incident[1].synapse, EntityId::new(101));
        assert_ne!(incident[1].pre, internal);
    }

    #[tokio::test]
    async fn test_neighbors() {
        let store = fixture_store();
        let one = store.neuron_internal_id(EntityId::new(1), "c/e/seg").await.unwrap();
        assert_eq!(
            store.neighbors(one, NeighborDirection::Postsynaptic, false).await.unwrap(),
            vec![EntityId::new(2)]
        );
        assert_eq!(
            store.neighbors(one, NeighborDirection::Presynaptic, false).await.unwrap(),
            vec![EntityId::new(3)]
        );

        let two = store.neuron_internal_id(EntityId::new(2), "c/e/seg").await.unwrap();
        assert_eq!(
            store.neighbors(two, NeighborDirection::Presynaptic, true).await.unwrap(),
            vec![EntityId::new(1)]
        );
        let three = store.neuron_internal_id(EntityId::new(3), "c/e/seg").await.unwrap();
        assert_eq!(
            store.neighbors(three, NeighborDirection::Postsynaptic, true).await.unwrap(),
            vec![EntityId::new(1)]
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_pooled_connections_serve_concurrent_lookups() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("structural.db");
        let writer = SqliteStructuralStore::open(&path, false, 1).unwrap();
        writer.create_schema().unwrap();
        writer.execute_batch(FIXTURE).unwrap();

        let store = SqliteStructuralStore::open(&path, true, 3).unwrap();
        assert_eq!(store.pool_size(), 3);

        let lookups = (0..12).map(|_| store.keypoint(EntityId::new(2), "c/e/seg"));
        for keypoint in futures_util::future::join_all(lookups).await {
            assert_eq!(keypoint.unwrap(), Vector3::new(50, 50, 5));
        }
    }

    #[test]
    fn test_pool_has_at_least_one_connection() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStructuralStore::open(&dir.path().join("new.db"), false, 0).unwrap();
        assert_eq!(store.pool_size(), 1);
    }

    #[test]
    fn test_open_missing_file_read_only_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = SqliteStructuralStore::open(&dir.path().join("absent.db"), true, 2);
        assert!(matches!(result, Err(ServiceError::Store(_))));
    }
}
