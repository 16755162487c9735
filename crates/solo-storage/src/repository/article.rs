use super::Repository;
use crate::DocumentStore;
use solo_core::{Article, FilterOperator, PropertyFilter, Query, Result, SortDirection};
use std::ops::Deref;
use std::sync::Arc;

#[derive(Clone)]
pub struct ArticleRepository {
    base: Repository<Article>,
}

impl Deref for ArticleRepository {
    type Target = Repository<Article>;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

impl ArticleRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            base: Repository::new(store),
        }
    }

    pub async fn get_by_permalink(&self, permalink: &str) -> Result<Option<Article>> {
        let query = Query::new()
            .set_filter(PropertyFilter::new(
                Article::PERMALINK,
                FilterOperator::Equal,
                permalink,
            ))
            .set_page_count(1);
        self.first(&query).await
    }

    /// Newest published articles first, at most `num`.
    pub async fn get_recent_published(&self, num: usize) -> Result<Vec<Article>> {
        if num == 0 {
            return Ok(Vec::new());
        }
        let query = Query::new()
            .set_filter(PropertyFilter::new(
                Article::IS_PUBLISHED,
                FilterOperator::Equal,
                true,
            ))
            .add_sort(Article::CREATED, SortDirection::Descending)
            .set_current_page_num(1)
            .set_page_size(num)
            .set_page_count(1);
        self.query_entities(&query).await
    }
}
