//! Typed repositories over a [`DocumentStore`].
//!
//! [`Repository`] maps an [`Entity`] to its table; the entity repositories
//! add the lookups the blog needs on top of it.

use crate::DocumentStore;
use icu_collator::{Collator, CollatorOptions};
use icu_locid::locale;
use solo_core::{Entity, EntityId, Query, QueryResult, Result};
use std::marker::PhantomData;
use std::sync::Arc;

pub mod article;
pub mod category;
pub mod option;
pub mod page;
pub mod tag;
pub mod user;

pub use article::ArticleRepository;
pub use category::CategoryRepository;
pub use option::OptionRepository;
pub use page::PageRepository;
pub use tag::TagRepository;
pub use user::UserRepository;

pub struct Repository<T: Entity> {
    store: Arc<dyn DocumentStore>,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T: Entity> Repository<T> {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            _entity: PhantomData,
        }
    }

    pub fn table(&self) -> &'static str {
        T::TABLE
    }

    /// Raw documents plus pagination metadata.
    pub async fn query(&self, query: &Query) -> Result<QueryResult> {
        self.store.query(T::TABLE, query).await
    }

    pub async fn query_entities(&self, query: &Query) -> Result<Vec<T>> {
        self.query(query)
            .await?
            .results
            .into_iter()
            .map(T::from_document)
            .collect()
    }

    /// First match of the query, if any.
    pub async fn first(&self, query: &Query) -> Result<Option<T>> {
        match self.query(query).await?.results.into_iter().next() {
            Some(doc) => T::from_document(doc).map(Some),
            None => Ok(None),
        }
    }

    pub async fn get(&self, id: &str) -> Result<Option<T>> {
        match self.store.get(T::TABLE, id).await? {
            Some(doc) => T::from_document(doc).map(Some),
            None => Ok(None),
        }
    }

    pub async fn add(&self, entity: &T) -> Result<EntityId> {
        self.store.add(T::TABLE, entity.to_document()?).await
    }

    pub async fn update(&self, id: &str, entity: &T) -> Result<()> {
        self.store.update(T::TABLE, id, entity.to_document()?).await
    }

    pub async fn remove(&self, id: &str) -> Result<()> {
        self.store.remove(T::TABLE, id).await
    }

    pub async fn count(&self) -> Result<usize> {
        self.store.count(T::TABLE).await
    }
}

/// Sorts by title the way a zh-CN reader expects (pinyin order for Han,
/// case-insensitive first for Latin). Falls back to code point order when
/// no collation data is available.
pub(crate) fn sort_by_title<T>(items: &mut [T], title: impl Fn(&T) -> &str) {
    match Collator::try_new(&locale!("zh").into(), CollatorOptions::new()) {
        Ok(collator) => items.sort_by(|a, b| collator.compare(title(a), title(b))),
        Err(e) => {
            tracing::warn!(error = %e, "zh collation unavailable, sorting titles by code point");
            items.sort_by(|a, b| title(a).cmp(title(b)));
        }
    }
}
