//! CRUD over any mapped record, provided to every repository that exposes its [`DataContext`].

use crate::context::{DataContext, Record};
use crate::error::{AppError, AppResult};
use crate::model::EntityId;
use crate::sql::{self, Filter};
use async_trait::async_trait;

#[async_trait]
pub trait GenericRepository<T: Record>: Sync {
    fn context(&self) -> &DataContext;

    /// All rows in storage order. Untracked results are detached copies; tracked ones are
    /// copies of the identity-map entries, changed through [`GenericRepository::modify`].
    async fn select_all(&self, with_tracking: bool) -> AppResult<Vec<T>> {
        let q = sql::select::<T>(None, None);
        let rows = self.context().fetch_all::<T>(&q).await?;
        Ok(if with_tracking {
            self.context().track_all(rows)
        } else {
            rows
        })
    }

    /// Identity map first (staged entries included), then storage.
    async fn find_by_id(&self, id: EntityId) -> AppResult<Option<T>> {
        let tracked = self
            .context()
            .with_tracker(|t| T::entries(t).get(id).cloned());
        if tracked.is_some() {
            return Ok(tracked);
        }
        let q = sql::select_by_id::<T>(id);
        let row = self.context().fetch_all::<T>(&q).await?.into_iter().next();
        Ok(row.map(|item| self.context().track(item)))
    }

    async fn filter_by(&self, filter: Filter<T::Column>) -> AppResult<Vec<T>> {
        let q = sql::select::<T>(Some(&filter), None);
        let rows = self.context().fetch_all::<T>(&q).await?;
        Ok(self.context().track_all(rows))
    }

    /// First match in storage order.
    async fn find_by(&self, filter: Filter<T::Column>) -> AppResult<Option<T>> {
        let q = sql::select::<T>(Some(&filter), Some(1));
        let row = self.context().fetch_all::<T>(&q).await?.into_iter().next();
        Ok(row.map(|item| self.context().track(item)))
    }

    /// Stages `item` as Added; nothing is written before `save_all_changes`.
    fn add(&self, item: T) {
        tracing::debug!(kind = T::KIND, id = %item.id(), "add");
        self.context().with_tracker(|t| {
            item.stage_owned(t);
            T::entries_mut(t).stage_added(item);
        });
    }

    fn add_range(&self, items: Vec<T>) {
        for item in items {
            self.add(item);
        }
    }

    /// Overwrites the scalars of the stored entity with the same id.
    async fn update(&self, item: &T) -> AppResult<()> {
        if self.find_by_id(item.id()).await?.is_none() {
            return Err(AppError::UpdateTargetMissing {
                entity: T::KIND,
                id: item.id(),
            });
        }
        tracing::debug!(kind = T::KIND, id = %item.id(), "update");
        self.context()
            .with_tracker(|t| T::entries_mut(t).stage_modified(item))?;
        Ok(())
    }

    /// Mutates the tracked instance of `id` in place, loading it first when needed.
    ///
    /// This is how a tracked entity is changed: query results are copies, the identity map
    /// holds the instance that gets saved. The change is written on the next commit.
    async fn modify<F, R>(&self, id: EntityId, f: F) -> AppResult<R>
    where
        F: FnOnce(&mut T) -> R + Send,
        R: Send,
    {
        let missing = || AppError::UpdateTargetMissing { entity: T::KIND, id };
        if self.find_by_id(id).await?.is_none() {
            return Err(missing());
        }
        tracing::debug!(kind = T::KIND, %id, "modify");
        self.context()
            .with_tracker(|t| T::entries_mut(t).modify(id, f))
            .ok_or_else(missing)
    }

    fn remove(&self, item: &T) {
        tracing::debug!(kind = T::KIND, id = %item.id(), "remove");
        self.context().with_tracker(|t| T::entries_mut(t).stage_deleted(item));
    }

    /// Tracks `item` as Unchanged; scalar differences from the last fetch are saved on commit.
    fn attach(&self, item: T) -> T {
        self.context().with_tracker(|t| T::entries_mut(t).attach(item))
    }
}
