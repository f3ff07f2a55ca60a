use super::*;
use sqlx::Row;

#[tokio::test]
async fn test_empty_path_is_rejected() {
    let err = create_pool("  ").await.unwrap_err();
    assert_eq!(err, "Database file path is required");
}

#[tokio::test]
async fn test_memory_pool_keeps_state_between_queries() {
    let pool = create_pool(MEMORY_PATH).await.unwrap();
    sqlx::query("CREATE TABLE t (id INTEGER PRIMARY KEY)")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO t (id) VALUES (1)")
        .execute(&pool)
        .await
        .unwrap();

    let row = sqlx::query("SELECT COUNT(*) AS n FROM t")
        .fetch_one(&pool)
        .await
        .unwrap();
    let count: i64 = row.try_get("n").unwrap();
    assert_eq!(count, 1);
}
