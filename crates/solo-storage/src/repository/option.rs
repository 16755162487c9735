use super::Repository;
use crate::DocumentStore;
use solo_core::{FilterOperator, OptionEntry, PropertyFilter, Query, Result};
use std::ops::Deref;
use std::sync::Arc;

#[derive(Clone)]
pub struct OptionRepository {
    base: Repository<OptionEntry>,
}

impl Deref for OptionRepository {
    type Target = Repository<OptionEntry>;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

impl OptionRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            base: Repository::new(store),
        }
    }

    pub async fn get_by_category(&self, category: &str) -> Result<Vec<OptionEntry>> {
        let query = Query::new().set_filter(PropertyFilter::new(
            OptionEntry::CATEGORY,
            FilterOperator::Equal,
            category,
        ));
        self.query_entities(&query).await
    }
}
