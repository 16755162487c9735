use crate::eval;
use crate::traits::DocumentStore;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use prometheus::{register_histogram_vec, HistogramVec};
use serde_json::Value as JsonValue;
use solo_core::util::new_id;
use solo_core::{Document, EntityId, Pagination, Query, QueryResult, RepositoryError, Result, ID};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

static STORE_QUERY_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!("store_query_seconds", "Document query latency", &["table"]).unwrap()
});

#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Default)]
struct Inner {
    // table -> id -> document; ULID ids keep iteration close to insertion order
    tables: HashMap<String, BTreeMap<EntityId, Document>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replay_put(&self, table: &str, doc: Document) {
        if let Some(id) = doc.get(ID).and_then(|v| v.as_str()).map(str::to_string) {
            self.inner
                .write()
                .tables
                .entry(table.to_string())
                .or_default()
                .insert(id, doc);
        }
    }

    pub fn replay_delete(&self, table: &str, id: &str) {
        if let Some(t) = self.inner.write().tables.get_mut(table) {
            t.remove(id);
        }
    }

    /// Assigns the document its id and inserts it; fails on a taken id.
    pub(crate) fn insert(&self, table: &str, mut doc: Document) -> Result<(EntityId, Document)> {
        let id = match doc.get(ID) {
            Some(JsonValue::String(s)) if !s.is_empty() => s.clone(),
            Some(JsonValue::Null) | None => new_id(),
            Some(JsonValue::String(_)) => new_id(),
            Some(other) => {
                return Err(RepositoryError::malformed(
                    table,
                    format!("id must be a string, got {}", other),
                ))
            }
        };
        doc.insert(ID.to_string(), JsonValue::String(id.clone()));
        let mut inner = self.inner.write();
        let t = inner.tables.entry(table.to_string()).or_default();
        if t.contains_key(&id) {
            return Err(RepositoryError::Store(format!(
                "duplicate id {} in table {}",
                id, table
            )));
        }
        t.insert(id.clone(), doc.clone());
        Ok((id, doc))
    }

    pub(crate) fn replace(&self, table: &str, id: &str, mut doc: Document) -> Result<Document> {
        doc.insert(ID.to_string(), JsonValue::String(id.to_string()));
        let mut inner = self.inner.write();
        match inner.tables.get_mut(table).and_then(|t| t.get_mut(id)) {
            Some(slot) => {
                *slot = doc.clone();
                Ok(doc)
            }
            None => Err(RepositoryError::Store(format!(
                "cannot update missing {}/{}",
                table, id
            ))),
        }
    }

    /// Removes and returns the document, if present.
    pub(crate) fn delete(&self, table: &str, id: &str) -> Option<Document> {
        self.inner
            .write()
            .tables
            .get_mut(table)
            .and_then(|t| t.remove(id))
    }

    pub(crate) fn lookup(&self, table: &str, id: &str) -> Option<Document> {
        self.inner
            .read()
            .tables
            .get(table)
            .and_then(|t| t.get(id))
            .cloned()
    }

    fn run_query(&self, table: &str, query: &Query) -> Result<QueryResult> {
        if query.current_page_num == 0 {
            return Err(RepositoryError::InvalidQuery(
                "current page number must be positive".into(),
            ));
        }
        if query.page_size == Some(0) {
            return Err(RepositoryError::InvalidQuery(
                "page size must be positive".into(),
            ));
        }
        let mut matched: Vec<Document> = {
            let inner = self.inner.read();
            match inner.tables.get(table) {
                Some(t) => t
                    .values()
                    .filter(|d| query.filter.as_ref().map_or(true, |f| eval::matches(d, f)))
                    .cloned()
                    .collect(),
                None => Vec::new(),
            }
        };
        eval::sort_documents(&mut matched, &query.sorts);

        let record_count = matched.len();
        let page_size = query.page_size.unwrap_or(record_count.max(1));
        let mut page_count = record_count.div_ceil(page_size);
        if let Some(cap) = query.page_count {
            page_count = page_count.min(cap);
        }
        let results = if query.current_page_num > page_count {
            Vec::new()
        } else {
            matched
                .into_iter()
                .skip((query.current_page_num - 1) * page_size)
                .take(page_size)
                .collect()
        };
        Ok(QueryResult {
            results,
            pagination: Pagination {
                page_count,
                record_count,
            },
        })
    }
}

#[async_trait::async_trait]
impl DocumentStore for InMemoryStore {
    async fn get(&self, table: &str, id: &str) -> Result<Option<Document>> {
        Ok(self.lookup(table, id))
    }

    async fn query(&self, table: &str, query: &Query) -> Result<QueryResult> {
        let _timer = STORE_QUERY_SECONDS
            .with_label_values(&[table])
            .start_timer();
        self.run_query(table, query)
    }

    async fn add(&self, table: &str, doc: Document) -> Result<EntityId> {
        self.insert(table, doc).map(|(id, _)| id)
    }

    async fn update(&self, table: &str, id: &str, doc: Document) -> Result<()> {
        self.replace(table, id, doc).map(|_| ())
    }

    async fn remove(&self, table: &str, id: &str) -> Result<()> {
        self.delete(table, id);
        Ok(())
    }

    async fn count(&self, table: &str) -> Result<usize> {
        Ok(self
            .inner
            .read()
            .tables
            .get(table)
            .map(|t| t.len())
            .unwrap_or(0))
    }

    fn all_documents(&self) -> Vec<(String, Document)> {
        let inner = self.inner.read();
        let mut out = Vec::new();
        for (table, docs) in inner.tables.iter() {
            for doc in docs.values() {
                out.push((table.clone(), doc.clone()));
            }
        }
        out
    }
}
