use super::Repository;
use crate::DocumentStore;
use solo_core::{FilterOperator, Page, PropertyFilter, Query, Result, SortDirection};
use std::ops::Deref;
use std::sync::Arc;

#[derive(Clone)]
pub struct PageRepository {
    base: Repository<Page>,
}

impl Deref for PageRepository {
    type Target = Repository<Page>;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

impl PageRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            base: Repository::new(store),
        }
    }

    pub async fn get_by_permalink(&self, permalink: &str) -> Result<Option<Page>> {
        let query = Query::new()
            .set_filter(PropertyFilter::new(
                Page::PERMALINK,
                FilterOperator::Equal,
                permalink,
            ))
            .set_page_count(1);
        self.first(&query).await
    }

    /// Highest page order, `-1` when there are no pages.
    pub async fn get_max_order(&self) -> Result<i64> {
        let query = Query::new().add_sort(Page::ORDER, SortDirection::Descending);
        Ok(self.first(&query).await?.map(|p| p.order).unwrap_or(-1))
    }

    pub async fn get_pages(&self) -> Result<Vec<Page>> {
        let query = Query::new().add_sort(Page::ORDER, SortDirection::Ascending);
        self.query_entities(&query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryStore;

    #[tokio::test]
    async fn pages_in_order() {
        let repo = PageRepository::new(Arc::new(InMemoryStore::new()));
        assert_eq!(repo.get_max_order().await.unwrap(), -1);
        for (title, order) in [("about", 1), ("links", 0)] {
            repo.add(&Page {
                title: title.into(),
                permalink: format!("/{}", title),
                order,
                ..Default::default()
            })
            .await
            .unwrap();
        }
        assert_eq!(repo.get_max_order().await.unwrap(), 1);
        let titles: Vec<String> = repo
            .get_pages()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.title)
            .collect();
        assert_eq!(titles, vec!["links", "about"]);
        assert!(repo.get_by_permalink("/about").await.unwrap().is_some());
    }
}
