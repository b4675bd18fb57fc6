//! Owner storage mapping and owner-specific queries.

use super::accounts::{AccountColumn, AccountsRepository};
use super::generic::GenericRepository;
use crate::context::{ChangeTracker, DataContext, EntitySet, Record};
use crate::error::AppResult;
use crate::model::{Account, EntityId, Owner};
use crate::sql::{self, BindValue, Column, Filter, QueryBuf};
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OwnerColumn {
    Id,
    Name,
    Birthdate,
    Email,
}

impl Column for OwnerColumn {
    fn name(self) -> &'static str {
        match self {
            OwnerColumn::Id => "id",
            OwnerColumn::Name => "name",
            OwnerColumn::Birthdate => "birthdate",
            OwnerColumn::Email => "email",
        }
    }
}

impl Record for Owner {
    const TABLE: &'static str = "owners";
    const COLUMNS: &'static [&'static str] = &["id", "name", "birthdate", "email"];
    type Column = OwnerColumn;

    fn values(&self) -> Vec<BindValue> {
        vec![
            self.id().into(),
            self.name.clone().into(),
            self.birthdate().into(),
            self.email.clone().into(),
        ]
    }

    fn entries(tracker: &ChangeTracker) -> &EntitySet<Self> {
        &tracker.owners
    }

    fn entries_mut(tracker: &mut ChangeTracker) -> &mut EntitySet<Self> {
        &mut tracker.owners
    }

    fn stage_owned(&self, tracker: &mut ChangeTracker) {
        for account in self.accounts() {
            if !tracker.accounts.contains(account.id()) {
                tracker.accounts.stage_added(account.clone());
            }
        }
    }
}

pub struct OwnersRepository<'ctx> {
    ctx: &'ctx DataContext,
}

impl<'ctx> OwnersRepository<'ctx> {
    pub fn new(ctx: &'ctx DataContext) -> Self {
        Self { ctx }
    }
}

impl GenericRepository<Owner> for OwnersRepository<'_> {
    fn context(&self) -> &DataContext {
        self.ctx
    }
}

impl OwnersRepository<'_> {
    /// Binds `account` to the tracked owner and stages it as Added. The tracked owner's
    /// account list gains the account too, so later lookups of the owner see it.
    pub async fn add_account(&self, owner_id: EntityId, mut account: Account) -> AppResult<Account> {
        self.modify(owner_id, |owner: &mut Owner| owner.add(&mut account))
            .await??;
        AccountsRepository::new(self.ctx).add(account.clone());
        Ok(account)
    }

    /// Owners whose name contains `name` (case-sensitive).
    pub async fn select_by_name(&self, name: &str) -> AppResult<Vec<Owner>> {
        self.filter_by(Filter::contains(OwnerColumn::Name, name)).await
    }

    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<Owner>> {
        self.find_by(Filter::eq(OwnerColumn::Email, email)).await
    }

    /// Owners born within `[from, to]`.
    pub async fn select_by_birthdate_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<Vec<Owner>> {
        self.filter_by(Filter::between(OwnerColumn::Birthdate, from, to))
            .await
    }

    /// Owners matching `filter`, with their accounts loaded in the same query when
    /// `join_accounts` is set.
    pub async fn select_by_join(
        &self,
        with_tracking: bool,
        filter: Option<Filter<OwnerColumn>>,
        join_accounts: bool,
    ) -> AppResult<Vec<Owner>> {
        if !join_accounts {
            let q = sql::select::<Owner>(filter.as_ref(), None);
            let rows = self.ctx.fetch_all::<Owner>(&q).await?;
            return Ok(if with_tracking {
                self.ctx.track_all(rows)
            } else {
                rows
            });
        }

        let q = owners_with_accounts(filter.as_ref());
        let owners = group_owner_rows(self.ctx.fetch_rows(&q).await?)?;
        if !with_tracking {
            return Ok(owners);
        }
        Ok(self.ctx.with_tracker(|t| {
            owners
                .into_iter()
                .map(|owner| {
                    let accounts: Vec<Account> = owner
                        .accounts()
                        .iter()
                        .map(|a| t.accounts.track_loaded(a.clone()))
                        .collect();
                    let mut resolved = t.owners.track_loaded(owner);
                    if let Some(current) = t.owners.get_mut(resolved.id()) {
                        current.set_accounts(accounts.clone());
                    }
                    resolved.set_accounts(accounts);
                    resolved
                })
                .collect()
        }))
    }
}

fn owners_with_accounts(filter: Option<&Filter<OwnerColumn>>) -> QueryBuf {
    let mut q = QueryBuf::default();
    let where_sql = sql::where_clause::<Owner>(filter, Some("o"), &mut q);
    q.sql = format!(
        "SELECT {}, a.\"id\" AS account_id, a.\"iban\" AS account_iban, a.\"balance\" AS account_balance \
         FROM \"owners\" o LEFT JOIN \"accounts\" a ON a.{} = o.\"id\"{} \
         ORDER BY o.rowid, a.rowid",
        sql::column_list::<Owner>(Some("o")),
        sql::quoted(AccountColumn::OwnerId.name()),
        where_sql
    );
    q
}

/// Folds LEFT JOIN rows (one per account, or one with NULL account columns) into owners.
fn group_owner_rows(rows: Vec<SqliteRow>) -> AppResult<Vec<Owner>> {
    let mut owners: Vec<Owner> = Vec::new();
    let mut accounts: Vec<Vec<Account>> = Vec::new();
    for row in rows {
        let owner_id: Uuid = row.try_get("id")?;
        if owners.last().map(|o| o.id()) != Some(owner_id) {
            owners.push(Owner::with_id(
                owner_id,
                row.try_get::<String, _>("name")?,
                row.try_get::<DateTime<Utc>, _>("birthdate")?,
                row.try_get::<String, _>("email")?,
            ));
            accounts.push(Vec::new());
        }
        let account_id: Option<Uuid> = row.try_get("account_id")?;
        if let (Some(account_id), Some(list)) = (account_id, accounts.last_mut()) {
            list.push(Account::from_parts(
                account_id,
                row.try_get::<String, _>("account_iban")?,
                row.try_get::<f64, _>("account_balance")?,
                Some(owner_id),
            ));
        }
    }
    Ok(owners
        .into_iter()
        .zip(accounts)
        .map(|(mut owner, mut list)| {
            let back = owner.detached();
            for account in &mut list {
                account.bind_owner(back.clone());
            }
            owner.set_accounts(list);
            owner
        })
        .collect())
}
