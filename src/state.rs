//! Shared application state for all routes. Each request opens its own `DataContext` on the pool.

use crate::context::DataContext;
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
}

impl AppState {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Fresh unit of work for one request.
    pub fn context(&self) -> DataContext {
        DataContext::new(self.pool.clone())
    }
}
