//! Unit of work: a pool handle plus the change tracker shared by every repository of one request.

mod record;
mod tracker;

pub use record::Record;
pub use tracker::{ChangeTracker, EntitySet, EntryState};

use crate::error::AppResult;
use crate::model::EntityId;
use crate::sql::QueryBuf;
use sqlx::sqlite::SqliteRow;
use sqlx::SqlitePool;
use std::sync::{Mutex, PoisonError};

pub struct DataContext {
    pool: SqlitePool,
    tracker: Mutex<ChangeTracker>,
}

impl DataContext {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            tracker: Mutex::new(ChangeTracker::default()),
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Runs `f` with the tracker locked. Never call across an `.await`.
    pub(crate) fn with_tracker<R>(&self, f: impl FnOnce(&mut ChangeTracker) -> R) -> R {
        let mut guard = self.tracker.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    pub(crate) async fn fetch_all<T: Record>(&self, q: &QueryBuf) -> AppResult<Vec<T>> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query_as::<_, T>(&q.sql);
        for p in &q.params {
            query = query.bind(p.clone());
        }
        Ok(query.fetch_all(&self.pool).await?)
    }

    /// Raw rows, for joins mapped by hand.
    pub(crate) async fn fetch_rows(&self, q: &QueryBuf) -> AppResult<Vec<SqliteRow>> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(p.clone());
        }
        Ok(query.fetch_all(&self.pool).await?)
    }

    pub(crate) fn track<T: Record>(&self, item: T) -> T {
        self.with_tracker(|t| T::entries_mut(t).track_loaded(item))
    }

    pub(crate) fn track_all<T: Record>(&self, items: Vec<T>) -> Vec<T> {
        self.with_tracker(|t| {
            let set = T::entries_mut(t);
            items.into_iter().map(|item| set.track_loaded(item)).collect()
        })
    }

    /// Flushes every staged change in one transaction. Returns true if any row was affected.
    ///
    /// On failure the transaction is rolled back and the tracker keeps its pending changes.
    pub async fn save_all_changes(&self) -> AppResult<bool> {
        self.log_tracked_state("before save_all_changes");
        let statements = self.with_tracker(|t| t.pending_statements());
        if statements.is_empty() {
            tracing::debug!("save_all_changes: nothing to flush");
            return Ok(false);
        }

        let mut tx = self.pool.begin().await?;
        let mut affected = 0u64;
        for q in &statements {
            tracing::debug!(sql = %q.sql, params = ?q.params, "query (tx)");
            let mut query = sqlx::query(&q.sql);
            for p in &q.params {
                query = query.bind(p.clone());
            }
            affected += query.execute(&mut *tx).await?.rows_affected();
        }
        tx.commit().await?;

        self.with_tracker(ChangeTracker::accept_all_changes);
        tracing::debug!(statements = statements.len(), affected, "save_all_changes committed");
        self.log_tracked_state("after save_all_changes");
        Ok(affected > 0)
    }

    /// Forgets every tracked instance, so later queries hit storage.
    pub fn clear_tracked_set(&self) {
        self.with_tracker(|t| *t = ChangeTracker::default());
    }

    pub fn log_tracked_state(&self, label: &str) {
        if tracing::enabled!(tracing::Level::DEBUG) {
            let view = self.with_tracker(|t| t.debug_view());
            tracing::debug!(label, "tracked state\n{}", view);
        }
    }

    pub fn entry_state<T: Record>(&self, id: EntityId) -> Option<EntryState> {
        self.with_tracker(|t| T::entries(t).state(id))
    }

    pub fn tracked_count(&self) -> usize {
        self.with_tracker(|t| t.len())
    }

    pub fn has_changes(&self) -> bool {
        self.with_tracker(|t| t.has_changes())
    }
}
