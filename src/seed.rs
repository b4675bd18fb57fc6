//! Reference owners and accounts used by tests and optional startup seeding.

use crate::context::DataContext;
use crate::error::AppResult;
use crate::model::{Account, Owner};
use crate::repo::{GenericRepository, OwnersRepository};
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use uuid::Uuid;

/// Six owners: 1 and 2 are "Mustermann" born in the 1980s, 3 and 4 were born in the 1960s,
/// 2 and 4 use gmail. Owner 1 holds accounts 1 and 2, owners 2 to 5 one account each, owner 6
/// none.
#[derive(Clone, Debug)]
pub struct Seed {
    pub owner1: Owner,
    pub owner2: Owner,
    pub owner3: Owner,
    pub owner4: Owner,
    pub owner5: Owner,
    pub owner6: Owner,
    pub account1: Account,
    pub account2: Account,
    pub account3: Account,
    pub account4: Account,
    pub account5: Account,
    pub account6: Account,
}

const fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    match NaiveDate::from_ymd_opt(y, m, d) {
        Some(date) => date,
        None => panic!("invalid calendar date"),
    }
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::default()))
}

/// Account already bound to `owner`, back-reference included.
fn held_by(owner: &Owner, iban: &str, balance: f64) -> Account {
    let mut account = Account::from_parts(Uuid::new_v4(), iban, balance, Some(owner.id()));
    account.bind_owner(owner.detached());
    account
}

impl Seed {
    pub fn new() -> Self {
        let mut owner1 = Owner::new(
            "Erika Mustermann",
            midnight(const { date(1988, 2, 1) }),
            "erika.mustermann@t-online.de",
        );
        let mut owner2 = Owner::new(
            "Max Mustermann",
            midnight(const { date(1985, 6, 15) }),
            "max.mustermann@gmail.com",
        );
        let mut owner3 = Owner::new(
            "Arno Arndt",
            midnight(const { date(1963, 4, 20) }),
            "a.arndt@t-online.de",
        );
        let mut owner4 = Owner::new(
            "Benno Bauer",
            midnight(const { date(1968, 11, 2) }),
            "b.bauer@gmail.com",
        );
        let mut owner5 = Owner::new(
            "Christine Conrad",
            midnight(const { date(1972, 8, 30) }),
            "c.conrad@gmx.de",
        );
        let owner6 = Owner::new(
            "Dana Dietrich",
            midnight(const { date(1991, 12, 24) }),
            "d.dietrich@t-online.de",
        );

        let account1 = held_by(&owner1, "DE10 10000000 0000000000", 2100.0);
        let account2 = held_by(&owner1, "DE10 20000000 0000000000", 350.0);
        let account3 = held_by(&owner2, "DE20 10000000 0000000000", 1500.0);
        let account4 = held_by(&owner3, "DE30 10000000 0000000000", 42.5);
        let account5 = held_by(&owner4, "DE40 10000000 0000000000", 0.0);
        let account6 = held_by(&owner5, "DE50 10000000 0000000000", 780.25);

        owner1.set_accounts(vec![account1.clone(), account2.clone()]);
        owner2.set_accounts(vec![account3.clone()]);
        owner3.set_accounts(vec![account4.clone()]);
        owner4.set_accounts(vec![account5.clone()]);
        owner5.set_accounts(vec![account6.clone()]);

        Seed {
            owner1,
            owner2,
            owner3,
            owner4,
            owner5,
            owner6,
            account1,
            account2,
            account3,
            account4,
            account5,
            account6,
        }
    }

    /// Owners in storage order, each carrying its accounts.
    pub fn owners(&self) -> Vec<Owner> {
        vec![
            self.owner1.clone(),
            self.owner2.clone(),
            self.owner3.clone(),
            self.owner4.clone(),
            self.owner5.clone(),
            self.owner6.clone(),
        ]
    }

    pub fn accounts(&self) -> Vec<Account> {
        vec![
            self.account1.clone(),
            self.account2.clone(),
            self.account3.clone(),
            self.account4.clone(),
            self.account5.clone(),
            self.account6.clone(),
        ]
    }

    /// Stages every owner (accounts cascade) and commits.
    pub async fn apply(&self, ctx: &DataContext) -> AppResult<bool> {
        OwnersRepository::new(ctx).add_range(self.owners());
        let saved = ctx.save_all_changes().await?;
        tracing::info!(owners = 6, accounts = 6, "seeded reference data");
        Ok(saved)
    }
}

impl Default for Seed {
    fn default() -> Self {
        Self::new()
    }
}
