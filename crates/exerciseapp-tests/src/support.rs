use std::sync::Mutex;

use api::collaborators::{
    CollaborationResult, ContinuousIntegrationService, VersionControlService,
};
use async_trait::async_trait;
use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use sqlite::{connect, DBType, SqlitePool};
use tempfile::TempDir;

pub fn db_name() -> String {
    let rand_string: String = thread_rng()
        .sample_iter(&Alphanumeric)
        .take(10)
        .map(char::from)
        .collect();

    format!("testdb-{}.db3", rand_string)
}

pub async fn pool(dir: &TempDir) -> SqlitePool {
    let file_path = dir.path().join(db_name());
    connect(DBType::File(file_path.as_path())).await.unwrap()
}

/// Accepts every id and records what it was asked to delete.
#[derive(Default)]
pub struct RecordingContinuousIntegration {
    pub deleted_build_plans: Mutex<Vec<String>>,
}

#[async_trait]
impl ContinuousIntegrationService for RecordingContinuousIntegration {
    async fn build_plan_id_is_valid(&self, _build_plan_id: &str) -> bool {
        true
    }

    async fn delete_build_plan(&self, build_plan_id: &str) -> CollaborationResult<()> {
        self.deleted_build_plans
            .lock()
            .unwrap()
            .push(build_plan_id.to_string());
        Ok(())
    }
}

/// Serves a fixed snapshot per repository and records deletions.
#[derive(Default)]
pub struct RecordingVersionControl {
    pub deleted_repositories: Mutex<Vec<String>>,
}

#[async_trait]
impl VersionControlService for RecordingVersionControl {
    async fn repository_url_is_valid(&self, _repository_url: &str) -> bool {
        true
    }

    async fn export_repository(&self, repository_url: &str) -> CollaborationResult<Vec<u8>> {
        Ok(format!("snapshot of {}", repository_url).into_bytes())
    }

    async fn delete_repository(&self, repository_url: &str) -> CollaborationResult<()> {
        self.deleted_repositories
            .lock()
            .unwrap()
            .push(repository_url.to_string());
        Ok(())
    }
}
