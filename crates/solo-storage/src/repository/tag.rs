use super::{sort_by_title, Repository};
use crate::DocumentStore;
use solo_core::{FilterOperator, PropertyFilter, Query, Result, SortDirection, Tag};
use std::ops::Deref;
use std::sync::Arc;

#[derive(Clone)]
pub struct TagRepository {
    base: Repository<Tag>,
}

impl Deref for TagRepository {
    type Target = Repository<Tag>;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

impl TagRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            base: Repository::new(store),
        }
    }

    pub async fn get_by_title(&self, title: &str) -> Result<Option<Tag>> {
        let query = Query::new()
            .set_filter(PropertyFilter::new(Tag::TITLE, FilterOperator::Equal, title))
            .set_page_count(1);
        self.first(&query).await
    }

    /// The `num` most referenced tags, presented in title collation.
    pub async fn get_most_used_tags(&self, num: usize) -> Result<Vec<Tag>> {
        if num == 0 {
            return Ok(Vec::new());
        }
        let query = Query::new()
            .add_sort(Tag::REFERENCE_COUNT, SortDirection::Descending)
            .set_current_page_num(1)
            .set_page_size(num)
            .set_page_count(1);
        let mut tags = self.query_entities(&query).await?;
        sort_by_title(&mut tags, |t| t.title.as_str());
        Ok(tags)
    }
}
