use super::Repository;
use crate::DocumentStore;
use solo_core::{FilterOperator, PropertyFilter, Query, RepositoryError, Result, User};
use std::ops::Deref;
use std::sync::Arc;
use tracing::error;

#[derive(Clone)]
pub struct UserRepository {
    base: Repository<User>,
}

impl Deref for UserRepository {
    type Target = Repository<User>;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

impl UserRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            base: Repository::new(store),
        }
    }

    /// Email lookup that keeps "no such user" and "lookup failed" apart.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let query = Query::new().set_filter(PropertyFilter::new(
            User::EMAIL,
            FilterOperator::Equal,
            email.trim().to_lowercase(),
        ));
        self.first(&query).await
    }

    /// Like [`find_by_email`](Self::find_by_email), but a failed lookup is
    /// logged and reported as no user.
    pub async fn get_by_email(&self, email: &str) -> Option<User> {
        match self.find_by_email(email).await {
            Ok(user) => user,
            Err(e) => {
                error!(error = %e, "user lookup by email failed");
                None
            }
        }
    }

    /// The administrator; a failed lookup is logged and reported as none.
    pub async fn get_admin(&self) -> Option<User> {
        let query = Query::new().set_filter(PropertyFilter::new(
            User::ROLE,
            FilterOperator::Equal,
            User::ADMIN_ROLE,
        ));
        match self.first(&query).await {
            Ok(user) => user,
            Err(e) => {
                error!(error = %e, "admin lookup failed");
                None
            }
        }
    }

    /// Unknown emails are not admins. A known user without a role is damaged
    /// data and is returned as an error instead.
    pub async fn is_admin_email(&self, email: &str) -> Result<bool> {
        let user = match self.get_by_email(email).await {
            Some(u) => u,
            None => return Ok(false),
        };
        match user.role {
            Some(role) => Ok(role == User::ADMIN_ROLE),
            None => {
                let e = RepositoryError::malformed(
                    self.table(),
                    format!("user {} has no role", user.email),
                );
                error!(error = %e, "admin check hit a damaged user record");
                Err(e)
            }
        }
    }
}
