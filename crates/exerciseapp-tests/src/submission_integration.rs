use std::sync::Arc;

use api::exercise::{Exercise, ExerciseRepository, ExerciseVariant};
use api::participation::ParticipationService;
use api::quiz::{AnswerPayload, QuizSubmission, QuizSubmissionRepository, SubmittedAnswer};
use api::result::{SubmissionResult, SubmissionResultRepository};
use chrono::{TimeZone, Utc};
use sqlite::{
    SqliteExerciseRepository, SqliteParticipationRepository, SqliteQuizSubmissionRepository,
    SqliteSubmissionResultRepository,
};
use tempfile::tempdir;
use test_log::test;

use crate::support::pool;

#[test(tokio::test)]
async fn participation_init_reuses_the_existing_row() {
    let dir = tempdir().unwrap();
    let pool = pool(&dir).await;
    let exercises = SqliteExerciseRepository::new(pool.clone());
    let service = ParticipationService::new(Arc::new(SqliteParticipationRepository::new(pool)));

    let exercise = exercises
        .save(&Exercise {
            id: None,
            title: "Quiz 1".to_string(),
            course_id: 1,
            variant: ExerciseVariant::Generic,
        })
        .await
        .unwrap();

    let first = service.init(&exercise, "ga12abc").await.unwrap();
    let second = service.init(&exercise, "ga12abc").await.unwrap();
    assert_eq!(first, second);

    let other = service.init(&exercise, "other").await.unwrap();
    assert_ne!(first, other);
}

#[test(tokio::test)]
async fn latest_result_follows_the_completion_date() {
    let dir = tempdir().unwrap();
    let pool = pool(&dir).await;
    let exercises = SqliteExerciseRepository::new(pool.clone());
    let participations = ParticipationService::new(Arc::new(SqliteParticipationRepository::new(
        pool.clone(),
    )));
    let submissions = SqliteQuizSubmissionRepository::new(pool.clone());
    let results = SqliteSubmissionResultRepository::new(pool);

    let exercise = exercises
        .save(&Exercise {
            id: None,
            title: "Quiz 1".to_string(),
            course_id: 1,
            variant: ExerciseVariant::Generic,
        })
        .await
        .unwrap();
    let participation = participations.init(&exercise, "ga12abc").await.unwrap();
    let participation_id = participation.id.unwrap();

    let early_submission = submissions.save(&QuizSubmission::new()).await.unwrap();
    let late_submission = submissions.save(&QuizSubmission::new()).await.unwrap();

    let mut early = SubmissionResult::for_participation(participation_id);
    early.submission_id = early_submission.id;
    early.completion_date = Some(Utc.with_ymd_and_hms(2016, 5, 1, 8, 0, 0).unwrap());
    results.save(&early).await.unwrap();

    let mut late = SubmissionResult::for_participation(participation_id);
    late.submission_id = late_submission.id;
    late.completion_date = Some(Utc.with_ymd_and_hms(2016, 5, 1, 17, 0, 0).unwrap());
    results.save(&late).await.unwrap();

    let latest = results
        .find_first_by_participation_id_order_by_completion_date_desc(participation_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(latest.submission_id, late_submission.id);
}

#[test(tokio::test)]
async fn submission_answers_survive_a_round_trip_through_the_gateway() {
    let dir = tempdir().unwrap();
    let pool = pool(&dir).await;
    let submissions = SqliteQuizSubmissionRepository::new(pool);

    let mut submission = QuizSubmission::new();
    submission.add_submitted_answer(SubmittedAnswer {
        id: None,
        submission_id: None,
        payload: AnswerPayload::MultipleChoice {
            selected_option_ids: vec![2, 5],
        },
    });

    let saved = submissions.save(&submission).await.unwrap();
    let reloaded = submissions
        .find_by_id(saved.id.unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.submitted_answers.len(), 1);
    assert_eq!(
        reloaded.submitted_answers[0].payload,
        AnswerPayload::MultipleChoice {
            selected_option_ids: vec![2, 5]
        }
    );
}
