use crate::permalink::is_reserved_link;
use solo_core::Result;
use solo_storage::repository::{ArticleRepository, PageRepository};
use solo_storage::DocumentStore;
use std::sync::Arc;
use tracing::error;

/// Suffix of theme template files, which are served under their own names.
const TEMPLATE_SUFFIX: &str = ".ftl";

#[derive(Clone)]
pub struct PermalinkQueryService {
    articles: ArticleRepository,
    pages: PageRepository,
}

impl PermalinkQueryService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            articles: ArticleRepository::new(store.clone()),
            pages: PageRepository::new(store),
        }
    }

    /// Whether `permalink` is taken. A lookup failure counts as taken.
    pub async fn exists(&self, permalink: &str) -> bool {
        match self.lookup(permalink).await {
            Ok(taken) => taken,
            Err(e) => {
                error!(error = %e, %permalink, "permalink lookup failed");
                true
            }
        }
    }

    async fn lookup(&self, permalink: &str) -> Result<bool> {
        if is_reserved_link(permalink) {
            return Ok(true);
        }
        if self.articles.get_by_permalink(permalink).await?.is_some() {
            return Ok(true);
        }
        if self.pages.get_by_permalink(permalink).await?.is_some() {
            return Ok(true);
        }
        Ok(permalink.ends_with(TEMPLATE_SUFFIX))
    }
}
