use api::exercise::{Exercise, ExerciseRepository, ExerciseVariant};
use api::page::{Page, PageRequest};
use api::RepositoryError::{
    ConnectionError, DeleteError, ItemNotFoundError, PersistenceError, QueryError,
};
use api::RepositoryResult;
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Acquire, Row, SqlitePool};
use tracing::instrument;

use crate::order_by;

#[derive(Clone, Debug)]
pub struct SqliteExerciseRepository {
    pool: SqlitePool,
}

const SELECT_COLUMNS: &str =
    "id, title, course_id, discriminator, base_build_plan_id, base_repository_url";

impl SqliteExerciseRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn from_row(row: &SqliteRow) -> Exercise {
        let discriminator: String = row.get("discriminator");
        let base_build_plan_id: Option<String> = row.get("base_build_plan_id");
        let base_repository_url: Option<String> = row.get("base_repository_url");
        let variant = match discriminator.as_str() {
            "programming" => ExerciseVariant::Programming {
                base_build_plan_id: base_build_plan_id.unwrap_or_default(),
                base_repository_url: base_repository_url.unwrap_or_default(),
            },
            _ => ExerciseVariant::Generic,
        };
        Exercise {
            id: Some(row.get("id")),
            title: row.get("title"),
            course_id: row.get("course_id"),
            variant,
        }
    }

    fn columns(exercise: &Exercise) -> (&'static str, Option<&str>, Option<&str>) {
        match &exercise.variant {
            ExerciseVariant::Generic => ("generic", None, None),
            ExerciseVariant::Programming {
                base_build_plan_id,
                base_repository_url,
            } => (
                "programming",
                Some(base_build_plan_id.as_str()),
                Some(base_repository_url.as_str()),
            ),
        }
    }
}

#[async_trait]
impl ExerciseRepository for SqliteExerciseRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Exercise>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM exercise WHERE id = ?1",
            SELECT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| QueryError(e.to_string()))?;

        Ok(row.as_ref().map(Self::from_row))
    }

    #[instrument(skip(self, page))]
    async fn find_all(&self, page: &PageRequest) -> RepositoryResult<Page<Exercise>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM exercise ORDER BY id {} LIMIT ?1 OFFSET ?2",
            SELECT_COLUMNS,
            order_by(page.sort())
        ))
        .bind(page.size())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| QueryError(e.to_string()))?;

        let total: i64 = sqlx::query("SELECT COUNT(*) FROM exercise")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| QueryError(e.to_string()))?
            .get(0);

        Ok(Page::new(rows.iter().map(Self::from_row).collect(), total))
    }

    #[instrument(skip(self, page))]
    async fn find_by_course_id(
        &self,
        course_id: i64,
        page: &PageRequest,
    ) -> RepositoryResult<Page<Exercise>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM exercise WHERE course_id = ?1 ORDER BY id {} LIMIT ?2 OFFSET ?3",
            SELECT_COLUMNS,
            order_by(page.sort())
        ))
        .bind(course_id)
        .bind(page.size())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| QueryError(e.to_string()))?;

        let total: i64 = sqlx::query("SELECT COUNT(*) FROM exercise WHERE course_id = ?1")
            .bind(course_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| QueryError(e.to_string()))?
            .get(0);

        Ok(Page::new(rows.iter().map(Self::from_row).collect(), total))
    }

    #[instrument(skip(self, page))]
    async fn find_by_course_id_where_lti_outcome_url_exists(
        &self,
        course_id: i64,
        student: &str,
        page: &PageRequest,
    ) -> RepositoryResult<Page<Exercise>> {
        let filter = "FROM exercise e WHERE e.course_id = ?1 AND EXISTS (\
             SELECT 1 FROM participation p \
             WHERE p.exercise_id = e.id AND p.student = ?2 AND p.lti_outcome_url IS NOT NULL)";

        let rows = sqlx::query(&format!(
            "SELECT {} {} ORDER BY e.id {} LIMIT ?3 OFFSET ?4",
            SELECT_COLUMNS,
            filter,
            order_by(page.sort())
        ))
        .bind(course_id)
        .bind(student)
        .bind(page.size())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| QueryError(e.to_string()))?;

        let total: i64 = sqlx::query(&format!("SELECT COUNT(*) {}", filter))
            .bind(course_id)
            .bind(student)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| QueryError(e.to_string()))?
            .get(0);

        Ok(Page::new(rows.iter().map(Self::from_row).collect(), total))
    }

    #[instrument(skip(self, exercise), fields(title = exercise.title))]
    async fn save(&self, exercise: &Exercise) -> RepositoryResult<Exercise> {
        let (discriminator, base_build_plan_id, base_repository_url) = Self::columns(exercise);
        match exercise.id {
            None => {
                let result = sqlx::query(
                    r#"
                    INSERT INTO exercise (title, course_id, discriminator, base_build_plan_id, base_repository_url)
                    VALUES (?1, ?2, ?3, ?4, ?5)
                    "#,
                )
                .bind(&exercise.title)
                .bind(exercise.course_id)
                .bind(discriminator)
                .bind(base_build_plan_id)
                .bind(base_repository_url)
                .execute(&self.pool)
                .await
                .map_err(|e| PersistenceError(e.to_string()))?;

                let mut saved = exercise.clone();
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
                    UPDATE exercise SET title = ?1, course_id = ?2, discriminator = ?3,
                    base_build_plan_id = ?4, base_repository_url = ?5 WHERE id = ?6
                    "#,
                )
                .bind(&exercise.title)
                .bind(exercise.course_id)
                .bind(discriminator)
                .bind(base_build_plan_id)
                .bind(base_repository_url)
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(|e| PersistenceError(e.to_string()))?;

                if result.rows_affected() == 1 {
                    tx.commit()
                        .await
                        .map_err(|e| PersistenceError(e.to_string()))?;
                    Ok(exercise.clone())
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
        sqlx::query("DELETE FROM exercise WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| DeleteError(e.to_string()))?;
        Ok(())
    }
}
