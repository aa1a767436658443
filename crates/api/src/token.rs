//! Remember-me tokens. Identity is the token string itself, so equality can
//! use a plain derive.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[cfg(test)]
use mockall::automock;

use crate::RepositoryResult;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PersistentToken {
    pub token: String,
    pub user_login: String,
    pub token_date: NaiveDate,
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait PersistentTokenRepository: Send + Sync {
    async fn find_by_user(&self, user_login: &str) -> RepositoryResult<Vec<PersistentToken>>;

    /// All tokens issued strictly before the given date, for expiry sweeps.
    async fn find_by_token_date_before(
        &self,
        date: NaiveDate,
    ) -> RepositoryResult<Vec<PersistentToken>>;

    async fn save(&self, token: &PersistentToken) -> RepositoryResult<PersistentToken>;

    /// Deleting an absent token is a no-op, not an error.
    async fn delete(&self, token: &str) -> RepositoryResult<()>;
}
