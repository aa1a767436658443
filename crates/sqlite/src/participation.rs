use api::participation::{Participation, ParticipationRepository};
use api::RepositoryError::{
    ConnectionError, DeleteError, ItemNotFoundError, PersistenceError, QueryError,
};
use api::RepositoryResult;
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Acquire, Row, SqlitePool};
use tracing::instrument;

#[derive(Clone, Debug)]
pub struct SqliteParticipationRepository {
    pool: SqlitePool,
}

const SELECT_COLUMNS: &str =
    "id, exercise_id, student, repository_url, build_plan_id, lti_outcome_url";

impl SqliteParticipationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn from_row(row: &SqliteRow) -> Participation {
        Participation {
            id: Some(row.get("id")),
            exercise_id: row.get("exercise_id"),
            student: row.get("student"),
            repository_url: row.get("repository_url"),
            build_plan_id: row.get("build_plan_id"),
            lti_outcome_url: row.get("lti_outcome_url"),
        }
    }
}

#[async_trait]
impl ParticipationRepository for SqliteParticipationRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Participation>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM participation WHERE id = ?1",
            SELECT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| QueryError(e.to_string()))?;

        Ok(row.as_ref().map(Self::from_row))
    }

    #[instrument(skip(self))]
    async fn find_by_exercise_id(&self, exercise_id: i64) -> RepositoryResult<Vec<Participation>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM participation WHERE exercise_id = ?1 ORDER BY id",
            SELECT_COLUMNS
        ))
        .bind(exercise_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| QueryError(e.to_string()))?;

        Ok(rows.iter().map(Self::from_row).collect())
    }

    #[instrument(skip(self))]
    async fn find_by_exercise_id_and_student(
        &self,
        exercise_id: i64,
        student: &str,
    ) -> RepositoryResult<Option<Participation>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM participation WHERE exercise_id = ?1 AND student = ?2",
            SELECT_COLUMNS
        ))
        .bind(exercise_id)
        .bind(student)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| QueryError(e.to_string()))?;

        Ok(row.as_ref().map(Self::from_row))
    }

    #[instrument(skip(self, participation), fields(student = participation.student))]
    async fn save(&self, participation: &Participation) -> RepositoryResult<Participation> {
        match participation.id {
            None => {
                let result = sqlx::query(
                    r#"
                    INSERT INTO participation (exercise_id, student, repository_url, build_plan_id, lti_outcome_url)
                    VALUES (?1, ?2, ?3, ?4, ?5)
                    "#,
                )
                .bind(participation.exercise_id)
                .bind(&participation.student)
                .bind(&participation.repository_url)
                .bind(&participation.build_plan_id)
                .bind(&participation.lti_outcome_url)
                .execute(&self.pool)
                .await
                .map_err(|e| PersistenceError(e.to_string()))?;

                let mut saved = participation.clone();
                saved.id = Some(result.last_insert_rowid());
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
                let result = sqlx::query(
                    r#"
                    UPDATE participation SET exercise_id = ?1, student = ?2, repository_url = ?3,
                    build_plan_id = ?4, lti_outcome_url = ?5 WHERE id = ?6
                    "#,
                )
                .bind(participation.exercise_id)
                .bind(&participation.student)
                .bind(&participation.repository_url)
                .bind(&participation.build_plan_id)
                .bind(&participation.lti_outcome_url)
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(|e| PersistenceError(e.to_string()))?;

                if result.rows_affected() == 1 {
                    tx.commit()
                        .await
                        .map_err(|e| PersistenceError(e.to_string()))?;
                    Ok(participation.clone())
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
        sqlx::query("DELETE FROM participation WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| DeleteError(e.to_string()))?;
        Ok(())
    }
}
