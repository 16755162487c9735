use crate::walbin::{RecBody, WalWriter};
use crate::{DocumentStore, InMemoryStore};
use chrono::Utc;
use parking_lot::Mutex;
use serde_json::Value as JsonValue;
use solo_core::{Document, EntityId, Query, QueryResult, RepositoryError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// In-memory store made durable by a write-ahead log replayed on open.
///
/// Writes are serialized: the memory change and its WAL record happen under
/// one lock, so the log order always equals the order writes became visible.
pub struct PersistentStore {
    mem: InMemoryStore,
    wal: WalWriter,
    writes: Mutex<()>,
    data_dir: PathBuf,
}

impl PersistentStore {
    pub fn open(data_dir: PathBuf) -> std::io::Result<Self> {
        let (mem, last_seq) = restore(&data_dir)?;
        let wal = WalWriter::open(&data_dir, last_seq)?;
        info!(dir = %data_dir.display(), last_seq, "persistent store opened");
        Ok(Self {
            mem,
            wal,
            writes: Mutex::new(()),
            data_dir,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn log(&self, body: &RecBody) -> Result<()> {
        self.wal.append(Utc::now().timestamp_millis(), body)?;
        Ok(())
    }
}

/// Rebuilds the in-memory state from the WAL under `data_dir` without opening
/// it for writing. Returns the state and the last sequence seen.
pub fn restore(data_dir: &Path) -> std::io::Result<(InMemoryStore, u64)> {
    let recs = crate::walbin::replay(data_dir)?;
    let mem = InMemoryStore::new();
    let mut last_seq = 0u64;
    let replayed = recs.len();
    for (seq, rec) in recs {
        last_seq = last_seq.max(seq);
        match rec {
            RecBody::Put { table, doc } => match doc {
                JsonValue::Object(map) => mem.replay_put(&table, map),
                other => warn!(seq, %table, "non-object document in wal: {}", other),
            },
            RecBody::Delete { table, id } => mem.replay_delete(&table, &id),
        }
    }
    debug!(dir = %data_dir.display(), replayed, "wal replayed");
    Ok((mem, last_seq))
}

#[async_trait::async_trait]
impl DocumentStore for PersistentStore {
    async fn get(&self, table: &str, id: &str) -> Result<Option<Document>> {
        self.mem.get(table, id).await
    }

    async fn query(&self, table: &str, query: &Query) -> Result<QueryResult> {
        self.mem.query(table, query).await
    }

    async fn add(&self, table: &str, doc: Document) -> Result<EntityId> {
        let _w = self.writes.lock();
        let (id, stored) = self.mem.insert(table, doc)?;
        let body = RecBody::Put {
            table: table.to_string(),
            doc: JsonValue::Object(stored),
        };
        if let Err(e) = self.log(&body) {
            self.mem.delete(table, &id);
            return Err(e);
        }
        Ok(id)
    }

    async fn update(&self, table: &str, id: &str, doc: Document) -> Result<()> {
        let _w = self.writes.lock();
        let previous = self.mem.lookup(table, id).ok_or_else(|| {
            RepositoryError::Store(format!("cannot update missing {}/{}", table, id))
        })?;
        let stored = self.mem.replace(table, id, doc)?;
        let body = RecBody::Put {
            table: table.to_string(),
            doc: JsonValue::Object(stored),
        };
        if let Err(e) = self.log(&body) {
            self.mem.replace(table, id, previous)?;
            return Err(e);
        }
        Ok(())
    }

    async fn remove(&self, table: &str, id: &str) -> Result<()> {
        let _w = self.writes.lock();
        let removed = match self.mem.delete(table, id) {
            Some(doc) => doc,
            None => return Ok(()),
        };
        let body = RecBody::Delete {
            table: table.to_string(),
            id: id.to_string(),
        };
        if let Err(e) = self.log(&body) {
            self.mem.replay_put(table, removed);
            return Err(e);
        }
        Ok(())
    }

    async fn count(&self, table: &str) -> Result<usize> {
        self.mem.count(table).await
    }

    fn all_documents(&self) -> Vec<(String, Document)> {
        self.mem.all_documents()
    }
}
