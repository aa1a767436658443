use api::token::{PersistentToken, PersistentTokenRepository};
use chrono::NaiveDate;
use sqlite::SqlitePersistentTokenRepository;
use tempfile::tempdir;
use test_log::test;

use crate::support::pool;

fn token(series: &str, user: &str, date: NaiveDate) -> PersistentToken {
    PersistentToken {
        token: series.to_string(),
        user_login: user.to_string(),
        token_date: date,
    }
}

#[test(tokio::test)]
async fn expiry_sweep_deletes_only_stale_tokens() {
    let dir = tempdir().unwrap();
    let repository = SqlitePersistentTokenRepository::new(pool(&dir).await);

    let stale = NaiveDate::from_ymd_opt(2016, 3, 1).unwrap();
    let fresh = NaiveDate::from_ymd_opt(2016, 5, 1).unwrap();
    let cutoff = NaiveDate::from_ymd_opt(2016, 4, 1).unwrap();

    repository.save(&token("stale", "ga12abc", stale)).await.unwrap();
    repository.save(&token("fresh", "ga12abc", fresh)).await.unwrap();

    for expired in repository.find_by_token_date_before(cutoff).await.unwrap() {
        repository.delete(&expired.token).await.unwrap();
    }

    let remaining = repository.find_by_user("ga12abc").await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].token, "fresh");
}

#[test(tokio::test)]
async fn a_token_refresh_keeps_a_single_row() {
    let dir = tempdir().unwrap();
    let repository = SqlitePersistentTokenRepository::new(pool(&dir).await);

    let first = NaiveDate::from_ymd_opt(2016, 4, 1).unwrap();
    let refreshed = NaiveDate::from_ymd_opt(2016, 5, 1).unwrap();

    repository.save(&token("series", "ga12abc", first)).await.unwrap();
    repository.save(&token("series", "ga12abc", refreshed)).await.unwrap();

    let tokens = repository.find_by_user("ga12abc").await.unwrap();
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].token_date, refreshed);
}
