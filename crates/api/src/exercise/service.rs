//! Orchestration for multi-step exercise operations: cascading delete,
//! participation reset, build-plan cleanup and repository archival.

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info, instrument};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::collaborators::{ContinuousIntegrationService, VersionControlService};
use crate::exercise::{Exercise, ExerciseRepository, ExerciseVariant};
use crate::participation::{Participation, ParticipationRepository};
use crate::{ServiceError, ServiceResult};

#[derive(Clone)]
pub struct ExerciseService {
    exercise_repository: Arc<dyn ExerciseRepository>,
    participation_repository: Arc<dyn ParticipationRepository>,
    continuous_integration: Option<Arc<dyn ContinuousIntegrationService>>,
    version_control: Option<Arc<dyn VersionControlService>>,
}

impl ExerciseService {
    pub fn new(
        exercise_repository: Arc<dyn ExerciseRepository>,
        participation_repository: Arc<dyn ParticipationRepository>,
        continuous_integration: Option<Arc<dyn ContinuousIntegrationService>>,
        version_control: Option<Arc<dyn VersionControlService>>,
    ) -> Self {
        Self {
            exercise_repository,
            participation_repository,
            continuous_integration,
            version_control,
        }
    }

    /// Deletes the exercise and cascades over its participations, removing
    /// build plans and repositories through the collaborators where present.
    /// Deleting an absent exercise is a logged no-op.
    #[instrument(skip(self), fields(id = id))]
    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        let exercise = self.find_exercise(id).await?;
        let Some(exercise) = exercise else {
            debug!("exercise {} was already absent, nothing to delete", id);
            return Ok(());
        };

        let participations = self.find_participations(id).await?;
        for participation in &participations {
            self.cleanup_participation(&exercise, participation).await;
            if let Some(participation_id) = participation.id {
                self.participation_repository
                    .delete_by_id(participation_id)
                    .await
                    .map_err(|err| {
                        error!("{}", err);
                        ServiceError::CleanupError(
                            "could not delete participation for exercise".to_string(),
                        )
                    })?;
            }
        }

        self.exercise_repository.delete_by_id(id).await.map_err(|err| {
            error!("{}", err);
            ServiceError::CleanupError("could not delete exercise".to_string())
        })?;
        info!("deleted exercise {} and {} participations", id, participations.len());
        Ok(())
    }

    /// Removes every participation of the exercise, returning it to an
    /// ungraded state. Idempotent: resetting an exercise with no
    /// participations, or an unsaved one, succeeds.
    #[instrument(skip(self, exercise), fields(id = exercise.id))]
    pub async fn reset(&self, exercise: &Exercise) -> ServiceResult<()> {
        let Some(id) = exercise.id else {
            return Ok(());
        };
        let participations = self.find_participations(id).await?;
        for participation in &participations {
            if let Some(participation_id) = participation.id {
                self.participation_repository
                    .delete_by_id(participation_id)
                    .await
                    .map_err(|err| {
                        error!("{}", err);
                        ServiceError::CleanupError(
                            "could not delete participation for exercise".to_string(),
                        )
                    })?;
            }
        }
        info!("reset exercise {}: removed {} participations", id, participations.len());
        Ok(())
    }

    /// Deletes all non-base build plans of the exercise's participations.
    /// When `delete_repositories` is set, additionally archives every
    /// repository into a zip, deletes the repositories, and returns the zip
    /// path. `None` means there was nothing to archive, which is not a
    /// failure.
    #[instrument(skip(self), fields(id = id))]
    pub async fn cleanup(&self, id: i64, delete_repositories: bool) -> ServiceResult<Option<PathBuf>> {
        let Some(exercise) = self.find_exercise(id).await? else {
            debug!("exercise {} was not found, nothing to clean up", id);
            return Ok(None);
        };
        let ExerciseVariant::Programming {
            base_build_plan_id,
            base_repository_url,
        } = &exercise.variant
        else {
            info!("exercise {} is not a programming exercise, nothing to clean up", id);
            return Ok(None);
        };

        let participations = self.find_participations(id).await?;
        if let Some(ci) = &self.continuous_integration {
            for participation in &participations {
                let Some(build_plan_id) = &participation.build_plan_id else {
                    continue;
                };
                if build_plan_id == base_build_plan_id {
                    continue;
                }
                if let Err(err) = ci.delete_build_plan(build_plan_id).await {
                    error!("could not delete build plan {}: {}", build_plan_id, err);
                }
            }
        }

        if !delete_repositories {
            return Ok(None);
        }

        let archive = self.zip_repositories(&exercise, &participations).await?;
        if archive.is_some() {
            if let Some(vcs) = &self.version_control {
                for participation in &participations {
                    let Some(repository_url) = &participation.repository_url else {
                        continue;
                    };
                    if repository_url == base_repository_url {
                        continue;
                    }
                    if let Err(err) = vcs.delete_repository(repository_url).await {
                        error!("could not delete repository {}: {}", repository_url, err);
                    }
                }
            }
        }
        Ok(archive)
    }

    /// Archives all non-base repositories of the exercise into a zip without
    /// deleting any build plans. `None` means there was nothing to archive.
    #[instrument(skip(self), fields(id = id))]
    pub async fn archive(&self, id: i64) -> ServiceResult<Option<PathBuf>> {
        let Some(exercise) = self.find_exercise(id).await? else {
            debug!("exercise {} was not found, nothing to archive", id);
            return Ok(None);
        };
        let participations = self.find_participations(id).await?;
        self.zip_repositories(&exercise, &participations).await
    }

    async fn find_exercise(&self, id: i64) -> ServiceResult<Option<Exercise>> {
        self.exercise_repository.find_by_id(id).await.map_err(|err| {
            error!("{}", err);
            ServiceError::LookupError("error searching repository for exercise".to_string())
        })
    }

    async fn find_participations(&self, exercise_id: i64) -> ServiceResult<Vec<Participation>> {
        self.participation_repository
            .find_by_exercise_id(exercise_id)
            .await
            .map_err(|err| {
                error!("{}", err);
                ServiceError::LookupError(
                    "error searching repository for participations".to_string(),
                )
            })
    }

    /// Best-effort removal of a participation's build plan and repository.
    /// Collaborator failures are logged, never surfaced.
    async fn cleanup_participation(&self, exercise: &Exercise, participation: &Participation) {
        let ExerciseVariant::Programming {
            base_build_plan_id,
            base_repository_url,
        } = &exercise.variant
        else {
            return;
        };

        if let (Some(ci), Some(build_plan_id)) =
            (&self.continuous_integration, &participation.build_plan_id)
        {
            if build_plan_id != base_build_plan_id {
                if let Err(err) = ci.delete_build_plan(build_plan_id).await {
                    error!("could not delete build plan {}: {}", build_plan_id, err);
                }
            }
        }
        if let (Some(vcs), Some(repository_url)) =
            (&self.version_control, &participation.repository_url)
        {
            if repository_url != base_repository_url {
                if let Err(err) = vcs.delete_repository(repository_url).await {
                    error!("could not delete repository {}: {}", repository_url, err);
                }
            }
        }
    }

    /// Exports every non-base participation repository and writes them into a
    /// single zip under the temp directory. Returns `None` when the exercise
    /// is not a programming exercise, no version control is configured, or no
    /// repository could be exported.
    async fn zip_repositories(
        &self,
        exercise: &Exercise,
        participations: &[Participation],
    ) -> ServiceResult<Option<PathBuf>> {
        let ExerciseVariant::Programming {
            base_repository_url, ..
        } = &exercise.variant
        else {
            return Ok(None);
        };
        let Some(vcs) = &self.version_control else {
            info!("no version control service configured, nothing to archive");
            return Ok(None);
        };

        let mut exports = Vec::new();
        for participation in participations {
            let Some(repository_url) = &participation.repository_url else {
                continue;
            };
            if repository_url == base_repository_url {
                continue;
            }
            match vcs.export_repository(repository_url).await {
                Ok(content) => exports.push((participation.student.clone(), content)),
                Err(err) => error!("could not export repository {}: {}", repository_url, err),
            }
        }
        if exports.is_empty() {
            return Ok(None);
        }

        let path = std::env::temp_dir().join(format!(
            "exercise-{}-{}.zip",
            exercise.id.unwrap_or_default(),
            Utc::now().timestamp()
        ));
        let file = File::create(&path)
            .map_err(|err| ServiceError::ArchiveError(err.to_string()))?;
        let mut zip = ZipWriter::new(file);
        let options = SimpleFileOptions::default();
        for (student, content) in &exports {
            zip.start_file(format!("{}-repo.zip", student), options)
                .map_err(|err| ServiceError::ArchiveError(err.to_string()))?;
            zip.write_all(content)
                .map_err(|err| ServiceError::ArchiveError(err.to_string()))?;
        }
        zip.finish()
            .map_err(|err| ServiceError::ArchiveError(err.to_string()))?;
        info!("archived {} repositories into {:?}", exports.len(), path);
        Ok(Some(path))
    }
}
