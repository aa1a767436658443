use api::token::{PersistentToken, PersistentTokenRepository};
use api::RepositoryError::{DeleteError, PersistenceError, QueryError};
use api::RepositoryResult;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::instrument;

#[derive(Clone, Debug)]
pub struct SqlitePersistentTokenRepository {
    pool: SqlitePool,
}

impl SqlitePersistentTokenRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn from_row(row: &SqliteRow) -> RepositoryResult<PersistentToken> {
        let token_date: String = row.get("token_date");
        let token_date = NaiveDate::parse_from_str(&token_date, "%Y-%m-%d")
            .map_err(|e| QueryError(e.to_string()))?;
        Ok(PersistentToken {
            token: row.get("token"),
            user_login: row.get("user_login"),
            token_date,
        })
    }
}

#[async_trait]
impl PersistentTokenRepository for SqlitePersistentTokenRepository {
    #[instrument(skip(self))]
    async fn find_by_user(&self, user_login: &str) -> RepositoryResult<Vec<PersistentToken>> {
        let rows = sqlx::query(
            "SELECT token, user_login, token_date FROM persistent_token WHERE user_login = ?1 ORDER BY token",
        )
        .bind(user_login)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| QueryError(e.to_string()))?;

        rows.iter().map(Self::from_row).collect()
    }

    #[instrument(skip(self), fields(date = %date))]
    async fn find_by_token_date_before(
        &self,
        date: NaiveDate,
    ) -> RepositoryResult<Vec<PersistentToken>> {
        // ISO dates sort chronologically as text.
        let rows = sqlx::query(
            "SELECT token, user_login, token_date FROM persistent_token WHERE token_date < ?1 ORDER BY token",
        )
        .bind(date.format("%Y-%m-%d").to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| QueryError(e.to_string()))?;

        rows.iter().map(Self::from_row).collect()
    }

    #[instrument(skip(self, token), fields(user_login = token.user_login))]
    async fn save(&self, token: &PersistentToken) -> RepositoryResult<PersistentToken> {
        // The token string is the identity, so an upsert covers both the
        // initial grant and the rolling date refresh.
        sqlx::query(
            r#"
            INSERT INTO persistent_token (token, user_login, token_date)
            VALUES (?1, ?2, ?3)
            ON CONFLICT (token) DO UPDATE SET user_login = ?2, token_date = ?3
            "#,
        )
        .bind(&token.token)
        .bind(&token.user_login)
        .bind(token.token_date.format("%Y-%m-%d").to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| PersistenceError(e.to_string()))?;

        Ok(token.clone())
    }

    #[instrument(skip(self, token))]
    async fn delete(&self, token: &str) -> RepositoryResult<()> {
        sqlx::query("DELETE FROM persistent_token WHERE token = ?1")
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(|e| DeleteError(e.to_string()))?;
        Ok(())
    }
}
