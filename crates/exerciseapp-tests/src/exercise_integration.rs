use std::fs::File;
use std::sync::Arc;

use api::exercise::{Exercise, ExerciseRepository, ExerciseService, ExerciseVariant};
use api::participation::{Participation, ParticipationRepository};
use sqlite::{SqliteExerciseRepository, SqliteParticipationRepository};
use tempfile::tempdir;
use test_log::test;

use crate::support::{pool, RecordingContinuousIntegration, RecordingVersionControl};

struct Harness {
    exercises: Arc<SqliteExerciseRepository>,
    participations: Arc<SqliteParticipationRepository>,
    continuous_integration: Arc<RecordingContinuousIntegration>,
    version_control: Arc<RecordingVersionControl>,
    service: ExerciseService,
}

async fn harness(dir: &tempfile::TempDir) -> Harness {
    let pool = pool(dir).await;
    let exercises = Arc::new(SqliteExerciseRepository::new(pool.clone()));
    let participations = Arc::new(SqliteParticipationRepository::new(pool));
    let continuous_integration = Arc::new(RecordingContinuousIntegration::default());
    let version_control = Arc::new(RecordingVersionControl::default());
    let service = ExerciseService::new(
        exercises.clone(),
        participations.clone(),
        Some(continuous_integration.clone()),
        Some(version_control.clone()),
    );
    Harness {
        exercises,
        participations,
        continuous_integration,
        version_control,
        service,
    }
}

async fn programming_exercise(harness: &Harness) -> Exercise {
    harness
        .exercises
        .save(&Exercise {
            id: None,
            title: "Sorting".to_string(),
            course_id: 1,
            variant: ExerciseVariant::Programming {
                base_build_plan_id: "BASE-PLAN".to_string(),
                base_repository_url: "https://vcs.example.org/base.git".to_string(),
            },
        })
        .await
        .unwrap()
}

async fn student_participation(harness: &Harness, exercise_id: i64, student: &str) -> Participation {
    let mut participation = Participation::new(exercise_id, student);
    participation.build_plan_id = Some(format!("PLAN-{}", student.to_uppercase()));
    participation.repository_url = Some(format!("https://vcs.example.org/{}.git", student));
    harness.participations.save(&participation).await.unwrap()
}

fn zip_entry_names(path: &std::path::Path) -> Vec<String> {
    let file = File::open(path).unwrap();
    let archive = zip::ZipArchive::new(file).unwrap();
    archive.file_names().map(str::to_string).collect()
}

#[test(tokio::test)]
async fn delete_cascades_over_participations_and_collaborators() {
    let dir = tempdir().unwrap();
    let harness = harness(&dir).await;
    let exercise = programming_exercise(&harness).await;
    let id = exercise.id.unwrap();
    student_participation(&harness, id, "alice").await;
    student_participation(&harness, id, "bob").await;

    harness.service.delete(id).await.unwrap();

    assert!(harness.exercises.find_by_id(id).await.unwrap().is_none());
    assert!(harness
        .participations
        .find_by_exercise_id(id)
        .await
        .unwrap()
        .is_empty());

    let plans = harness
        .continuous_integration
        .deleted_build_plans
        .lock()
        .unwrap();
    assert!(plans.contains(&"PLAN-ALICE".to_string()));
    assert!(plans.contains(&"PLAN-BOB".to_string()));
    assert!(!plans.contains(&"BASE-PLAN".to_string()));

    let repositories = harness.version_control.deleted_repositories.lock().unwrap();
    assert_eq!(repositories.len(), 2);
}

#[test(tokio::test)]
async fn cleanup_with_repository_deletion_produces_an_archive() {
    let dir = tempdir().unwrap();
    let harness = harness(&dir).await;
    let exercise = programming_exercise(&harness).await;
    let id = exercise.id.unwrap();
    student_participation(&harness, id, "alice").await;
    student_participation(&harness, id, "bob").await;

    let archive = harness.service.cleanup(id, true).await.unwrap();
    let path = archive.expect("a zip should have been produced");
    assert!(path.exists());

    let entries = zip_entry_names(&path);
    assert_eq!(entries.len(), 2);
    assert!(entries.contains(&"alice-repo.zip".to_string()));
    assert!(entries.contains(&"bob-repo.zip".to_string()));

    let plans = harness
        .continuous_integration
        .deleted_build_plans
        .lock()
        .unwrap();
    assert_eq!(plans.len(), 2);
    let repositories = harness.version_control.deleted_repositories.lock().unwrap();
    assert_eq!(repositories.len(), 2);
    assert!(!repositories.contains(&"https://vcs.example.org/base.git".to_string()));
}

#[test(tokio::test)]
async fn cleanup_without_repository_deletion_only_removes_build_plans() {
    let dir = tempdir().unwrap();
    let harness = harness(&dir).await;
    let exercise = programming_exercise(&harness).await;
    let id = exercise.id.unwrap();
    student_participation(&harness, id, "alice").await;

    let archive = harness.service.cleanup(id, false).await.unwrap();
    assert!(archive.is_none());

    let plans = harness
        .continuous_integration
        .deleted_build_plans
        .lock()
        .unwrap();
    assert_eq!(plans.len(), 1);
    assert!(harness
        .version_control
        .deleted_repositories
        .lock()
        .unwrap()
        .is_empty());
}

#[test(tokio::test)]
async fn archive_preserves_build_plans_and_repositories() {
    let dir = tempdir().unwrap();
    let harness = harness(&dir).await;
    let exercise = programming_exercise(&harness).await;
    let id = exercise.id.unwrap();
    student_participation(&harness, id, "alice").await;

    let archive = harness.service.archive(id).await.unwrap();
    let path = archive.expect("a zip should have been produced");
    assert!(zip_entry_names(&path).contains(&"alice-repo.zip".to_string()));

    assert!(harness
        .continuous_integration
        .deleted_build_plans
        .lock()
        .unwrap()
        .is_empty());
    assert!(harness
        .version_control
        .deleted_repositories
        .lock()
        .unwrap()
        .is_empty());
    assert_eq!(
        harness.participations.find_by_exercise_id(id).await.unwrap().len(),
        1
    );
}

#[test(tokio::test)]
async fn reset_removes_only_the_participations() {
    let dir = tempdir().unwrap();
    let harness = harness(&dir).await;
    let exercise = programming_exercise(&harness).await;
    let id = exercise.id.unwrap();
    student_participation(&harness, id, "alice").await;
    student_participation(&harness, id, "bob").await;

    harness.service.reset(&exercise).await.unwrap();

    assert!(harness
        .participations
        .find_by_exercise_id(id)
        .await
        .unwrap()
        .is_empty());
    assert!(harness.exercises.find_by_id(id).await.unwrap().is_some());
}

#[test(tokio::test)]
async fn deleting_an_absent_exercise_is_a_no_op() {
    let dir = tempdir().unwrap();
    let harness = harness(&dir).await;
    assert!(harness.service.delete(404).await.is_ok());
}
