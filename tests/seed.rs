use reactivities::config::AppConfig;
use reactivities::database::{self, activities_repo, schema, seed, timestamps, user_repo};
use reactivities::services::{account_service, password_service};

#[tokio::test]
async fn seeding_fills_empty_tables_once() {
    let pool = database::connect_in_memory().await.unwrap();
    schema::ensure_schema(&pool).await.unwrap();
    let hash = password_service::hash_password(seed::SEED_PASSWORD)
        .await
        .unwrap();

    let first = seed::seed_data(&pool, &hash).await.unwrap();
    assert_eq!(first.users_created, 3);
    assert_eq!(first.activities_created, 10);

    let second = seed::seed_data(&pool, &hash).await.unwrap();
    assert_eq!(second.users_created, 0);
    assert_eq!(second.activities_created, 0);
    assert_eq!(user_repo::count_users(&pool).await.unwrap(), 3);
    assert_eq!(activities_repo::count_activities(&pool).await.unwrap(), 10);

    let now = timestamps::now();
    let all = activities_repo::list_activities_from(&pool, "0000", "all", "", 100)
        .await
        .unwrap();
    let past = all.iter().filter(|a| a.date < now).count();
    assert_eq!(all.len(), 10);
    assert_eq!(past, 2);
}

#[tokio::test]
async fn seeded_users_are_confirmed_and_can_log_in() {
    let pool = database::connect_in_memory().await.unwrap();
    schema::ensure_schema(&pool).await.unwrap();
    let hash = password_service::hash_password(seed::SEED_PASSWORD)
        .await
        .unwrap();
    seed::seed_data(&pool, &hash).await.unwrap();

    let config = AppConfig::default();
    assert!(config.require_confirmed_email);
    for email in ["bob@test.com", "tom@test.com", "jane@test.com"] {
        let session = account_service::login(&pool, &config, email, seed::SEED_PASSWORD)
            .await
            .unwrap();
        assert!(!session.token.is_empty());
    }
}

#[tokio::test]
async fn activities_are_only_seeded_into_an_empty_table() {
    let pool = database::connect_in_memory().await.unwrap();
    schema::ensure_schema(&pool).await.unwrap();
    let hash = password_service::hash_password(seed::SEED_PASSWORD)
        .await
        .unwrap();
    seed::seed_data(&pool, &hash).await.unwrap();

    let id = activities_repo::list_activities_from(&pool, "0000", "all", "", 1)
        .await
        .unwrap()
        .remove(0)
        .id;
    activities_repo::delete_activity(&pool, &id).await.unwrap();

    let report = seed::seed_data(&pool, &hash).await.unwrap();
    assert_eq!(report.activities_created, 0);
    assert_eq!(activities_repo::count_activities(&pool).await.unwrap(), 9);
}
