#![allow(dead_code)]

use banking_api::seed::Seed;
use banking_api::{connect_in_memory, ensure_schema, DataContext};
use sqlx::SqlitePool;

pub async fn pool() -> SqlitePool {
    let pool = connect_in_memory().await.unwrap();
    ensure_schema(&pool).await.unwrap();
    pool
}

pub async fn context() -> DataContext {
    DataContext::new(pool().await)
}

/// Context over a database holding the reference seed, with an empty tracker.
pub async fn seeded() -> (DataContext, Seed) {
    let ctx = context().await;
    let seed = Seed::new();
    assert!(seed.apply(&ctx).await.unwrap());
    ctx.clear_tracked_set();
    (ctx, seed)
}
