use api::result::{SubmissionResult, SubmissionResultRepository};
use api::RepositoryError::{
    ConnectionError, DeleteError, ItemNotFoundError, PersistenceError, QueryError,
};
use api::RepositoryResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Acquire, Row, SqlitePool};
use tracing::instrument;

#[derive(Clone, Debug)]
pub struct SqliteSubmissionResultRepository {
    pool: SqlitePool,
}

impl SqliteSubmissionResultRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn from_row(row: &SqliteRow) -> RepositoryResult<SubmissionResult> {
        let completion_date: Option<String> = row.get("completion_date");
        let completion_date = match completion_date {
            None => None,
            Some(raw) => Some(
                DateTime::parse_from_rfc3339(&raw)
                    .map(|d| d.with_timezone(&Utc))
                    .map_err(|e| QueryError(e.to_string()))?,
            ),
        };
        Ok(SubmissionResult {
            id: Some(row.get("id")),
            participation_id: row.get("participation_id"),
            submission_id: row.get("submission_id"),
            completion_date,
        })
    }
}

#[async_trait]
impl SubmissionResultRepository for SqliteSubmissionResultRepository {
    #[instrument(skip(self))]
    async fn find_first_by_participation_id_order_by_completion_date_desc(
        &self,
        participation_id: i64,
    ) -> RepositoryResult<Option<SubmissionResult>> {
        // RFC 3339 timestamps in UTC sort chronologically as text, and DESC
        // places NULL completion dates last.
        let row = sqlx::query(
            r#"
            SELECT id, participation_id, submission_id, completion_date
            FROM submission_result WHERE participation_id = ?1
            ORDER BY completion_date DESC LIMIT 1
            "#,
        )
        .bind(participation_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| QueryError(e.to_string()))?;

        row.as_ref().map(Self::from_row).transpose()
    }

    #[instrument(skip(self, result), fields(participation_id = result.participation_id))]
    async fn save(&self, result: &SubmissionResult) -> RepositoryResult<SubmissionResult> {
        let completion_date = result.completion_date.map(|d| d.to_rfc3339());
        match result.id {
            None => {
                let query_result = sqlx::query(
                    r#"
                    INSERT INTO submission_result (participation_id, submission_id, completion_date)
                    VALUES (?1, ?2, ?3)
                    "#,
                )
                .bind(result.participation_id)
                .bind(result.submission_id)
                .bind(completion_date)
                .execute(&self.pool)
                .await
                .map_err(|e| PersistenceError(e.to_string()))?;

                let mut saved = result.clone();
                saved.id = Some(query_result.last_insert_rowid());
                Ok(saved)
            }
            Some(id) => {
                let mut conn = self
                    .pool
                    .acquire()
                    .await
                    .map_err(|e| ConnectionError(e.to_string()))?;
                let mut tx = conn
                    .begin()
                    .await
                    .map_err(|e| PersistenceError(e.to_string()))?;
                let query_result = sqlx::query(
                    r#"
                    UPDATE submission_result SET participation_id = ?1, submission_id = ?2,
                    completion_date = ?3 WHERE id = ?4
                    "#,
                )
                .bind(result.participation_id)
                .bind(result.submission_id)
                .bind(completion_date)
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(|e| PersistenceError(e.to_string()))?;

                if query_result.rows_affected() == 1 {
                    tx.commit()
                        .await
                        .map_err(|e| PersistenceError(e.to_string()))?;
                    Ok(result.clone())
                } else {
                    tx.rollback()
                        .await
                        .map_err(|e| PersistenceError(e.to_string()))?;
                    Err(ItemNotFoundError)
                }
            }
        }
    }

    #[instrument(skip(self))]
    async fn delete_by_id(&self, id: i64) -> RepositoryResult<()> {
        sqlx::query("DELETE FROM submission_result WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| DeleteError(e.to_string()))?;
        Ok(())
    }
}
