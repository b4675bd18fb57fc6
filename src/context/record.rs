//! Storage mapping of an entity: table, columns, bound values and its tracked set.

use super::tracker::{ChangeTracker, EntitySet};
use crate::model::Entity;
use crate::sql::{BindValue, Column};
use sqlx::sqlite::SqliteRow;
use sqlx::FromRow;

pub trait Record: Entity + for<'r> FromRow<'r, SqliteRow> + Unpin {
    const TABLE: &'static str;
    /// Column names; the first one is the primary key.
    const COLUMNS: &'static [&'static str];
    type Column: Column;

    /// Values in `COLUMNS` order.
    fn values(&self) -> Vec<BindValue>;

    fn entries(tracker: &ChangeTracker) -> &EntitySet<Self>;

    fn entries_mut(tracker: &mut ChangeTracker) -> &mut EntitySet<Self>;

    /// Stages not-yet-tracked entities owned by this aggregate as Added.
    fn stage_owned(&self, _tracker: &mut ChangeTracker) {}
}
