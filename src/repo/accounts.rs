//! Account storage mapping and account-specific queries.

use super::generic::GenericRepository;
use crate::context::{ChangeTracker, DataContext, EntitySet, Record};
use crate::error::AppResult;
use crate::model::{Account, EntityId, Owner};
use crate::sql::{self, BindValue, Column, Filter, QueryBuf};
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccountColumn {
    Id,
    Iban,
    Balance,
    OwnerId,
}

impl Column for AccountColumn {
    fn name(self) -> &'static str {
        match self {
            AccountColumn::Id => "id",
            AccountColumn::Iban => "iban",
            AccountColumn::Balance => "balance",
            AccountColumn::OwnerId => "owner_id",
        }
    }
}

impl Record for Account {
    const TABLE: &'static str = "accounts";
    const COLUMNS: &'static [&'static str] = &["id", "iban", "balance", "owner_id"];
    type Column = AccountColumn;

    fn values(&self) -> Vec<BindValue> {
        vec![
            self.id().into(),
            self.iban.clone().into(),
            self.balance().into(),
            self.owner_id().into(),
        ]
    }

    fn entries(tracker: &ChangeTracker) -> &EntitySet<Self> {
        &tracker.accounts
    }

    fn entries_mut(tracker: &mut ChangeTracker) -> &mut EntitySet<Self> {
        &mut tracker.accounts
    }
}

pub struct AccountsRepository<'ctx> {
    ctx: &'ctx DataContext,
}

impl<'ctx> AccountsRepository<'ctx> {
    pub fn new(ctx: &'ctx DataContext) -> Self {
        Self { ctx }
    }
}

impl GenericRepository<Account> for AccountsRepository<'_> {
    fn context(&self) -> &DataContext {
        self.ctx
    }
}

impl AccountsRepository<'_> {
    pub async fn find_by_iban(&self, iban: &str) -> AppResult<Option<Account>> {
        self.find_by(Filter::eq(AccountColumn::Iban, iban)).await
    }

    /// Accounts of one owner in storage order; `join_owner` loads the back-reference in the
    /// same query.
    pub async fn select_by_owner_id_join(
        &self,
        owner_id: EntityId,
        join_owner: bool,
        with_tracking: bool,
    ) -> AppResult<Vec<Account>> {
        let filter = Filter::eq(AccountColumn::OwnerId, owner_id);
        let rows = if join_owner {
            let q = accounts_with_owner(&filter);
            account_rows_with_owner(self.ctx.fetch_rows(&q).await?)?
        } else {
            let q = sql::select::<Account>(Some(&filter), None);
            self.ctx.fetch_all::<Account>(&q).await?
        };
        if !with_tracking {
            return Ok(rows);
        }
        Ok(self.ctx.with_tracker(|t| {
            rows.into_iter()
                .map(|account| {
                    let owner = account.owner().cloned();
                    let mut resolved = t.accounts.track_loaded(account);
                    // The back-reference follows the tracked owner_id, never the row's.
                    if let Some(owner) = owner.filter(|o| resolved.owner_id() == Some(o.id())) {
                        if let Some(tracked) = t.accounts.get_mut(resolved.id()) {
                            tracked.bind_owner(owner.clone());
                        }
                        resolved.bind_owner(owner);
                    }
                    resolved
                })
                .collect()
        }))
    }
}

fn accounts_with_owner(filter: &Filter<AccountColumn>) -> QueryBuf {
    let mut q = QueryBuf::default();
    let where_sql = sql::where_clause::<Account>(Some(filter), Some("a"), &mut q);
    q.sql = format!(
        "SELECT {}, o.\"name\" AS owner_name, o.\"birthdate\" AS owner_birthdate, o.\"email\" AS owner_email \
         FROM \"accounts\" a JOIN \"owners\" o ON o.\"id\" = a.\"owner_id\"{} \
         ORDER BY a.rowid",
        sql::column_list::<Account>(Some("a")),
        where_sql
    );
    q
}

fn account_rows_with_owner(rows: Vec<SqliteRow>) -> AppResult<Vec<Account>> {
    rows.into_iter()
        .map(|row| -> AppResult<Account> {
            let owner_id: EntityId = row.try_get("owner_id")?;
            let mut account = Account::from_parts(
                row.try_get::<EntityId, _>("id")?,
                row.try_get::<String, _>("iban")?,
                row.try_get::<f64, _>("balance")?,
                Some(owner_id),
            );
            account.bind_owner(Owner::with_id(
                owner_id,
                row.try_get::<String, _>("owner_name")?,
                row.try_get::<DateTime<Utc>, _>("owner_birthdate")?,
                row.try_get::<String, _>("owner_email")?,
            ));
            Ok(account)
        })
        .collect()
}
