use solo_core::{Document, EntityId, Query, QueryResult, Result};

/// Schema-less document store keyed by table name.
///
/// Misses are `Ok(None)`; only genuine store failures are errors.
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync + 'static {
    async fn get(&self, table: &str, id: &str) -> Result<Option<Document>>;
    async fn query(&self, table: &str, query: &Query) -> Result<QueryResult>;
    /// Stores a new document. Uses the document's own `id` when present,
    /// otherwise generates one.
    async fn add(&self, table: &str, doc: Document) -> Result<EntityId>;
    async fn update(&self, table: &str, id: &str, doc: Document) -> Result<()>;
    /// Removing an id that does not exist is not an error.
    async fn remove(&self, table: &str, id: &str) -> Result<()>;
    async fn count(&self, table: &str) -> Result<usize>;

    /// Every live document as `(table, doc)`, for admin dumps.
    fn all_documents(&self) -> Vec<(String, Document)>;
}
