use solo_core::util::is_blank;
use solo_core::{EntityId, OptionEntry, ServiceError};
use solo_storage::repository::OptionRepository;
use solo_storage::DocumentStore;
use std::sync::Arc;
use tracing::{debug, error};

#[derive(Clone)]
pub struct OptionMgmtService {
    options: OptionRepository,
}

impl OptionMgmtService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            options: OptionRepository::new(store),
        }
    }

    /// Upserts an option and returns its id.
    ///
    /// Without an id a new record is created. An id nobody holds yet is kept
    /// as the new record's id. Otherwise only `category` and `value` of the
    /// stored record are overwritten.
    pub async fn add_or_update_option(
        &self,
        option: OptionEntry,
    ) -> Result<EntityId, ServiceError> {
        self.upsert(option).await.map_err(|e| {
            error!(error = %e, "add or update option failed");
            ServiceError::from(e)
        })
    }

    async fn upsert(&self, mut option: OptionEntry) -> solo_core::Result<EntityId> {
        let id = match option.id.take().filter(|id| !is_blank(id)) {
            Some(id) => id,
            None => return self.options.add(&option).await,
        };
        match self.options.get(&id).await? {
            None => {
                option.id = Some(id);
                let id = self.options.add(&option).await?;
                debug!(%id, "option created with caller id");
                Ok(id)
            }
            Some(mut existing) => {
                existing.category = option.category;
                existing.value = option.value;
                self.options.update(&id, &existing).await?;
                debug!(%id, "option updated");
                Ok(id)
            }
        }
    }

    pub async fn remove_option(&self, id: &str) -> Result<(), ServiceError> {
        self.options.remove(id).await.map_err(|e| {
            error!(error = %e, %id, "remove option failed");
            ServiceError::from(e)
        })
    }

    pub async fn get_option(&self, id: &str) -> Result<Option<OptionEntry>, ServiceError> {
        Ok(self.options.get(id).await?)
    }

    pub async fn get_options_by_category(
        &self,
        category: &str,
    ) -> Result<Vec<OptionEntry>, ServiceError> {
        Ok(self.options.get_by_category(category).await?)
    }
}
