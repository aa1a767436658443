use api::RepositoryError::ConnectionError;
use api::RepositoryResult;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{migrate, Error};

pub use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use tracing::instrument;

mod exercise;
mod participation;
mod quiz;
mod result;
mod token;

pub use exercise::SqliteExerciseRepository;
pub use participation::SqliteParticipationRepository;
pub use quiz::{SqliteQuestionStatisticRepository, SqliteQuizSubmissionRepository};
pub use result::SqliteSubmissionResultRepository;
pub use token::SqlitePersistentTokenRepository;

#[derive(Clone, Debug)]
pub enum DBType<'a> {
    InMemory,
    File(&'a Path),
}

/// Opens the database (creating the file if missing) and runs the embedded
/// migrations. The returned pool is shared by all repositories.
#[instrument]
pub async fn connect(dbtype: DBType<'_>) -> RepositoryResult<SqlitePool> {
    let pool_result: Result<SqlitePool, Error> = match dbtype {
        DBType::InMemory => SqlitePool::connect("sqlite::memory:").await,
        DBType::File(f) => {
            let Some(path) = f.to_str() else {
                return Err(ConnectionError(
                    "database path is not valid utf-8".to_string(),
                ));
            };
            match SqliteConnectOptions::from_str(format!("sqlite://{}", path).as_str()) {
                Ok(opts) => {
                    SqlitePool::connect_with(opts.create_if_missing(true).foreign_keys(true)).await
                }
                Err(e) => Err(e),
            }
        }
    };

    match pool_result {
        Ok(pool) => {
            let migrate_result = migrate!("db/migrations").run(&pool).await;
            match migrate_result {
                Ok(_) => Ok(pool),
                Err(e) => Err(ConnectionError(e.to_string())),
            }
        }
        Err(e) => Err(ConnectionError(e.to_string())),
    }
}

pub(crate) fn order_by(sort: api::page::SortOrder) -> &'static str {
    match sort {
        api::page::SortOrder::IdDescending => "DESC",
        _ => "ASC",
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use rand::distributions::Alphanumeric;
    use rand::{thread_rng, Rng};

    pub fn db_name() -> String {
        let rand_string: String = thread_rng()
            .sample_iter(&Alphanumeric)
            .take(10)
            .map(char::from)
            .collect();

        format!("testdb-{}.db3", rand_string)
    }
}
