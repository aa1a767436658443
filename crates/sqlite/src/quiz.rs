use api::quiz::{
    AnswerPayload, QuestionStatistic, QuestionStatisticRepository, QuizSubmission,
    QuizSubmissionRepository, SubmittedAnswer,
};
use api::RepositoryError::{
    ConnectionError, DeleteError, ItemNotFoundError, PersistenceError, QueryError,
};
use api::RepositoryResult;
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Acquire, Row, Sqlite, SqlitePool, Transaction};
use tracing::instrument;

#[derive(Clone, Debug)]
pub struct SqliteQuizSubmissionRepository {
    pool: SqlitePool,
}

fn discriminator(payload: &AnswerPayload) -> &'static str {
    match payload {
        AnswerPayload::MultipleChoice { .. } => "multipleChoice",
        AnswerPayload::DragAndDrop { .. } => "dragAndDrop",
    }
}

fn answer_from_row(row: &SqliteRow) -> RepositoryResult<SubmittedAnswer> {
    let payload: String = row.get("payload");
    let payload: AnswerPayload =
        serde_json::from_str(&payload).map_err(|e| QueryError(e.to_string()))?;
    Ok(SubmittedAnswer {
        id: Some(row.get("id")),
        submission_id: Some(row.get("submission_id")),
        payload,
    })
}

impl SqliteQuizSubmissionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn find_answers(&self, submission_id: i64) -> RepositoryResult<Vec<SubmittedAnswer>> {
        let rows = sqlx::query(
            "SELECT id, submission_id, payload FROM submitted_answer WHERE submission_id = ?1 ORDER BY id",
        )
        .bind(submission_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| QueryError(e.to_string()))?;

        rows.iter().map(answer_from_row).collect()
    }

    async fn replace_answers(
        tx: &mut Transaction<'_, Sqlite>,
        submission_id: i64,
        answers: &[SubmittedAnswer],
    ) -> RepositoryResult<Vec<SubmittedAnswer>> {
        sqlx::query("DELETE FROM submitted_answer WHERE submission_id = ?1")
            .bind(submission_id)
            .execute(&mut **tx)
            .await
            .map_err(|e| PersistenceError(e.to_string()))?;

        let mut saved = Vec::with_capacity(answers.len());
        for answer in answers {
            let payload = serde_json::to_string(&answer.payload)
                .map_err(|e| PersistenceError(e.to_string()))?;
            let result = sqlx::query(
                r#"
                INSERT INTO submitted_answer (submission_id, discriminator, payload)
                VALUES (?1, ?2, ?3)
                "#,
            )
            .bind(submission_id)
            .bind(discriminator(&answer.payload))
            .bind(payload)
            .execute(&mut **tx)
            .await
            .map_err(|e| PersistenceError(e.to_string()))?;

            saved.push(SubmittedAnswer {
                id: Some(result.last_insert_rowid()),
                submission_id: Some(submission_id),
                payload: answer.payload.clone(),
            });
        }
        Ok(saved)
    }
}

#[async_trait]
impl QuizSubmissionRepository for SqliteQuizSubmissionRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<QuizSubmission>> {
        let row = sqlx::query("SELECT id FROM quiz_submission WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| QueryError(e.to_string()))?;

        match row {
            None => Ok(None),
            Some(row) => {
                let id: i64 = row.get("id");
                Ok(Some(QuizSubmission {
                    id: Some(id),
                    submitted_answers: self.find_answers(id).await?,
                }))
            }
        }
    }

    #[instrument(skip(self))]
    async fn find_all(&self) -> RepositoryResult<Vec<QuizSubmission>> {
        let rows = sqlx::query("SELECT id FROM quiz_submission ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| QueryError(e.to_string()))?;

        let mut submissions = Vec::with_capacity(rows.len());
        for row in rows {
            let id: i64 = row.get("id");
            submissions.push(QuizSubmission {
                id: Some(id),
                submitted_answers: self.find_answers(id).await?,
            });
        }
        Ok(submissions)
    }

    #[instrument(skip(self, submission), fields(id = submission.id))]
    async fn save(&self, submission: &QuizSubmission) -> RepositoryResult<QuizSubmission> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| ConnectionError(e.to_string()))?;
        let mut tx = conn
            .begin()
            .await
            .map_err(|e| PersistenceError(e.to_string()))?;

        let id = match submission.id {
            None => {
                let result = sqlx::query("INSERT INTO quiz_submission DEFAULT VALUES")
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| PersistenceError(e.to_string()))?;
                result.last_insert_rowid()
            }
            Some(id) => {
                let row = sqlx::query("SELECT id FROM quiz_submission WHERE id = ?1")
                    .bind(id)
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(|e| QueryError(e.to_string()))?;
                if row.is_none() {
                    tx.rollback()
                        .await
                        .map_err(|e| PersistenceError(e.to_string()))?;
                    return Err(ItemNotFoundError);
                }
                id
            }
        };

        let answers = Self::replace_answers(&mut tx, id, &submission.submitted_answers).await?;
        tx.commit()
            .await
            .map_err(|e| PersistenceError(e.to_string()))?;

        Ok(QuizSubmission {
            id: Some(id),
            submitted_answers: answers,
        })
    }

    #[instrument(skip(self))]
    async fn delete_by_id(&self, id: i64) -> RepositoryResult<()> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| ConnectionError(e.to_string()))?;
        let mut tx = conn
            .begin()
            .await
            .map_err(|e| DeleteError(e.to_string()))?;

        sqlx::query("DELETE FROM submitted_answer WHERE submission_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| DeleteError(e.to_string()))?;
        sqlx::query("DELETE FROM quiz_submission WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| DeleteError(e.to_string()))?;

        tx.commit().await.map_err(|e| DeleteError(e.to_string()))?;
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct SqliteQuestionStatisticRepository {
    pool: SqlitePool,
}

impl SqliteQuestionStatisticRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn from_row(row: &SqliteRow) -> QuestionStatistic {
        QuestionStatistic {
            id: Some(row.get("id")),
            rated_correct_counter: row.get("rated_correct_counter"),
            un_rated_correct_counter: row.get("un_rated_correct_counter"),
            question_id: row.get("question_id"),
        }
    }
}

#[async_trait]
impl QuestionStatisticRepository for SqliteQuestionStatisticRepository {
    #[instrument(skip(self))]
    async fn find_by_question_id(
        &self,
        question_id: i64,
    ) -> RepositoryResult<Option<QuestionStatistic>> {
        let row = sqlx::query(
            r#"
            SELECT id, rated_correct_counter, un_rated_correct_counter, question_id
            FROM question_statistic WHERE question_id = ?1
            "#,
        )
        .bind(question_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| QueryError(e.to_string()))?;

        Ok(row.as_ref().map(Self::from_row))
    }

    #[instrument(skip(self, statistic), fields(question_id = statistic.question_id))]
    async fn save(&self, statistic: &QuestionStatistic) -> RepositoryResult<QuestionStatistic> {
        match statistic.id {
            None => {
                let result = sqlx::query(
                    r#"
                    INSERT INTO question_statistic (rated_correct_counter, un_rated_correct_counter, question_id)
                    VALUES (?1, ?2, ?3)
                    "#,
                )
                .bind(statistic.rated_correct_counter)
                .bind(statistic.un_rated_correct_counter)
                .bind(statistic.question_id)
                .execute(&self.pool)
                .await
                .map_err(|e| PersistenceError(e.to_string()))?;

                let mut saved = statistic.clone();
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
                    UPDATE question_statistic SET rated_correct_counter = ?1,
                    un_rated_correct_counter = ?2, question_id = ?3 WHERE id = ?4
                    "#,
                )
                .bind(statistic.rated_correct_counter)
                .bind(statistic.un_rated_correct_counter)
                .bind(statistic.question_id)
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(|e| PersistenceError(e.to_string()))?;

                if result.rows_affected() == 1 {
                    tx.commit()
                        .await
                        .map_err(|e| PersistenceError(e.to_string()))?;
                    Ok(statistic.clone())
                } else {
                    tx.rollback()
                        .await
                        .map_err(|e| PersistenceError(e.to_string()))?;
                    Err(ItemNotFoundError)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::db_name;
    use crate::{connect, DBType};
    use tempfile::tempdir;
    use test_log::test;

    async fn pool(dir: &tempfile::TempDir) -> SqlitePool {
        let file_path = dir.path().join(db_name());
        connect(DBType::File(file_path.as_path())).await.unwrap()
    }

    fn multiple_choice(options: Vec<i64>) -> SubmittedAnswer {
        SubmittedAnswer {
            id: None,
            submission_id: None,
            payload: AnswerPayload::MultipleChoice {
                selected_option_ids: options,
            },
        }
    }

    #[test(tokio::test)]
    async fn save_and_reload_submission_with_answers() {
        let dir = tempdir().unwrap();
        let repository = SqliteQuizSubmissionRepository::new(pool(&dir).await);

        let mut submission = QuizSubmission::new();
        submission.add_submitted_answer(multiple_choice(vec![1, 3]));
        submission.add_submitted_answer(SubmittedAnswer {
            id: None,
            submission_id: None,
            payload: AnswerPayload::DragAndDrop {
                assignments: vec![api::quiz::DragAndDropAssignment {
                    item_id: 7,
                    location_id: 2,
                }],
            },
        });

        let saved = repository.save(&submission).await.unwrap();
        let id = saved.id.unwrap();
        assert_eq!(saved.submitted_answers.len(), 2);
        assert!(saved.submitted_answers.iter().all(|a| a.id.is_some()));

        let found = repository.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(found.submitted_answers.len(), 2);
        assert_eq!(
            found.submitted_answers[0].payload,
            AnswerPayload::MultipleChoice {
                selected_option_ids: vec![1, 3]
            }
        );
    }

    #[test(tokio::test)]
    async fn update_replaces_the_answer_set() {
        let dir = tempdir().unwrap();
        let repository = SqliteQuizSubmissionRepository::new(pool(&dir).await);

        let mut submission = QuizSubmission::new();
        submission.add_submitted_answer(multiple_choice(vec![1]));
        let mut saved = repository.save(&submission).await.unwrap();

        saved.submitted_answers = vec![multiple_choice(vec![2, 4])];
        let updated = repository.save(&saved).await.unwrap();
        assert_eq!(updated.submitted_answers.len(), 1);

        let found = repository.find_by_id(saved.id.unwrap()).await.unwrap().unwrap();
        assert_eq!(found.submitted_answers.len(), 1);
        assert_eq!(
            found.submitted_answers[0].payload,
            AnswerPayload::MultipleChoice {
                selected_option_ids: vec![2, 4]
            }
        );
    }

    #[test(tokio::test)]
    async fn update_of_missing_submission_fails() {
        let dir = tempdir().unwrap();
        let repository = SqliteQuizSubmissionRepository::new(pool(&dir).await);

        let mut submission = QuizSubmission::new();
        submission.id = Some(42);
        let result = repository.save(&submission).await;
        assert!(matches!(result.err().unwrap(), ItemNotFoundError));
    }

    #[test(tokio::test)]
    async fn find_all_returns_every_submission() {
        let dir = tempdir().unwrap();
        let repository = SqliteQuizSubmissionRepository::new(pool(&dir).await);

        repository.save(&QuizSubmission::new()).await.unwrap();
        let mut second = QuizSubmission::new();
        second.add_submitted_answer(multiple_choice(vec![9]));
        repository.save(&second).await.unwrap();

        let all = repository.find_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].submitted_answers.len(), 1);
    }

    #[test(tokio::test)]
    async fn delete_removes_submission_and_answers() {
        let dir = tempdir().unwrap();
        let repository = SqliteQuizSubmissionRepository::new(pool(&dir).await);

        let mut submission = QuizSubmission::new();
        submission.add_submitted_answer(multiple_choice(vec![1]));
        let saved = repository.save(&submission).await.unwrap();
        let id = saved.id.unwrap();

        assert!(repository.delete_by_id(id).await.is_ok());
        assert!(repository.find_by_id(id).await.unwrap().is_none());
        // absent id stays a no-op
        assert!(repository.delete_by_id(id).await.is_ok());
    }

    #[test(tokio::test)]
    async fn statistic_insert_then_update() {
        let dir = tempdir().unwrap();
        let repository = SqliteQuestionStatisticRepository::new(pool(&dir).await);

        let mut saved = repository.save(&QuestionStatistic::new(5)).await.unwrap();
        assert!(saved.id.is_some());

        saved.rated_correct_counter += 1;
        repository.save(&saved).await.unwrap();

        let found = repository.find_by_question_id(5).await.unwrap().unwrap();
        assert_eq!(found.rated_correct_counter, 1);
        assert_eq!(found.un_rated_correct_counter, 0);
    }

    #[test(tokio::test)]
    async fn statistic_for_unknown_question_is_none() {
        let dir = tempdir().unwrap();
        let repository = SqliteQuestionStatisticRepository::new(pool(&dir).await);
        assert!(repository.find_by_question_id(99).await.unwrap().is_none());
    }
}
