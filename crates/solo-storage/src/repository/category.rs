use super::{sort_by_title, Repository};
use crate::DocumentStore;
use solo_core::{Category, FilterOperator, PropertyFilter, Query, Result, SortDirection};
use std::ops::Deref;
use std::sync::Arc;

#[derive(Clone)]
pub struct CategoryRepository {
    base: Repository<Category>,
}

impl Deref for CategoryRepository {
    type Target = Repository<Category>;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

impl CategoryRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            base: Repository::new(store),
        }
    }

    pub async fn get_by_title(&self, title: &str) -> Result<Option<Category>> {
        let query = Query::new()
            .set_filter(PropertyFilter::new(
                Category::TITLE,
                FilterOperator::Equal,
                title,
            ))
            .set_page_count(1);
        self.first(&query).await
    }

    pub async fn get_by_uri(&self, uri: &str) -> Result<Option<Category>> {
        let query = Query::new()
            .set_filter(PropertyFilter::new(Category::URI, FilterOperator::Equal, uri))
            .set_page_count(1);
        self.first(&query).await
    }

    /// Highest order in use, or `-1` when there are no categories yet.
    pub async fn get_max_order(&self) -> Result<i64> {
        let query = Query::new().add_sort(Category::ORDER, SortDirection::Descending);
        Ok(self.first(&query).await?.map(|c| c.order).unwrap_or(-1))
    }

    pub async fn get_by_order(&self, order: i64) -> Result<Option<Category>> {
        let query = Query::new().set_filter(PropertyFilter::new(
            Category::ORDER,
            FilterOperator::Equal,
            order,
        ));
        self.first(&query).await
    }

    /// The first `num` categories by order, presented in title collation.
    pub async fn get_most_used_categories(&self, num: usize) -> Result<Vec<Category>> {
        if num == 0 {
            return Ok(Vec::new());
        }
        let query = Query::new()
            .add_sort(Category::ORDER, SortDirection::Ascending)
            .set_current_page_num(1)
            .set_page_size(num)
            .set_page_count(1);
        let mut categories = self.query_entities(&query).await?;
        sort_by_title(&mut categories, |c| c.title.as_str());
        Ok(categories)
    }

    /// Neighbour just above: the largest order below this category's.
    pub async fn get_upper(&self, id: &str) -> Result<Option<Category>> {
        self.neighbour(id, FilterOperator::LessThan, SortDirection::Descending)
            .await
    }

    /// Neighbour just below: the smallest order above this category's.
    pub async fn get_under(&self, id: &str) -> Result<Option<Category>> {
        self.neighbour(id, FilterOperator::GreaterThan, SortDirection::Ascending)
            .await
    }

    async fn neighbour(
        &self,
        id: &str,
        op: FilterOperator,
        direction: SortDirection,
    ) -> Result<Option<Category>> {
        let category = match self.get(id).await? {
            Some(c) => c,
            None => return Ok(None),
        };
        let query = Query::new()
            .set_filter(PropertyFilter::new(Category::ORDER, op, category.order))
            .add_sort(Category::ORDER, direction)
            .set_current_page_num(1)
            .set_page_size(1);
        let mut found = self.query_entities(&query).await?;
        if found.len() != 1 {
            return Ok(None);
        }
        Ok(found.pop())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryStore;

    fn category(title: &str, order: i64) -> Category {
        Category {
            title: title.into(),
            uri: title.to_lowercase(),
            order,
            ..Default::default()
        }
    }

    async fn seeded() -> (CategoryRepository, Vec<String>) {
        let repo = CategoryRepository::new(Arc::new(InMemoryStore::new()));
        let mut ids = Vec::new();
        for (i, t) in ["Zeta", "alpha", "Mid", "beta"].iter().enumerate() {
            ids.push(repo.add(&category(t, i as i64)).await.unwrap());
        }
        (repo, ids)
    }

    #[tokio::test]
    async fn max_order_of_empty_table() {
        let repo = CategoryRepository::new(Arc::new(InMemoryStore::new()));
        assert_eq!(repo.get_max_order().await.unwrap(), -1);
    }

    #[tokio::test]
    async fn max_order() {
        let (repo, _) = seeded().await;
        assert_eq!(repo.get_max_order().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn lookups_by_title_uri_order() {
        let (repo, ids) = seeded().await;
        let c = repo.get_by_title("Mid").await.unwrap().unwrap();
        assert_eq!(c.id.as_deref(), Some(ids[2].as_str()));
        assert!(repo.get_by_uri("alpha").await.unwrap().is_some());
        assert!(repo.get_by_title("nope").await.unwrap().is_none());
        assert_eq!(repo.get_by_order(3).await.unwrap().unwrap().title, "beta");
    }

    #[tokio::test]
    async fn upper_and_under() {
        let (repo, ids) = seeded().await;
        let upper = repo.get_upper(&ids[2]).await.unwrap().unwrap();
        assert_eq!(upper.order, 1);
        let under = repo.get_under(&ids[2]).await.unwrap().unwrap();
        assert_eq!(under.order, 3);
    }

    #[tokio::test]
    async fn upper_and_under_at_the_edges() {
        let (repo, ids) = seeded().await;
        assert!(repo.get_upper(&ids[0]).await.unwrap().is_none());
        assert!(repo.get_under(&ids[3]).await.unwrap().is_none());
        assert!(repo.get_upper("missing").await.unwrap().is_none());
        assert!(repo.get_under("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn most_used_takes_by_order_then_sorts_by_title() {
        let (repo, _) = seeded().await;
        let top = repo.get_most_used_categories(3).await.unwrap();
        let titles: Vec<&str> = top.iter().map(|c| c.title.as_str()).collect();
        // orders 0..=2 are Zeta, alpha, Mid; beta (order 3) is cut
        assert_eq!(titles, vec!["alpha", "Mid", "Zeta"]);
        assert!(repo.get_most_used_categories(0).await.unwrap().is_empty());
        assert_eq!(repo.get_most_used_categories(10).await.unwrap().len(), 4);
    }
}
