//! Owner aggregate: a person holding zero or more accounts.

use super::account::Account;
use super::entity::{Entity, EntityId};
use crate::error::DomainError;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, sqlx::FromRow)]
pub struct Owner {
    id: EntityId,
    pub name: String,
    birthdate: DateTime<Utc>,
    pub email: String,
    #[sqlx(skip)]
    accounts: Vec<Account>,
}

impl Owner {
    /// New owner with a freshly generated id and no accounts.
    pub fn new(name: impl Into<String>, birthdate: DateTime<Utc>, email: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), name, birthdate, email)
    }

    pub fn with_id(
        id: EntityId,
        name: impl Into<String>,
        birthdate: DateTime<Utc>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            birthdate,
            email: email.into(),
            accounts: Vec::new(),
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn birthdate(&self) -> DateTime<Utc> {
        self.birthdate
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    /// Changes the mutable personal data. Id and birthdate never change.
    pub fn update(&mut self, name: impl Into<String>, email: impl Into<String>) {
        self.name = name.into();
        self.email = email.into();
    }

    /// Binds `account` to this owner and appends it to the account list.
    ///
    /// Fails when the account is already bound to a different owner. Adding an account that
    /// is already in the list only refreshes its binding.
    pub fn add(&mut self, account: &mut Account) -> Result<(), DomainError> {
        if let Some(current) = account.owner_id() {
            if current != self.id {
                return Err(DomainError::AccountAssignedElsewhere {
                    account_id: account.id(),
                    owner_id: current,
                });
            }
        }
        account.bind_owner(self.detached());
        match self.accounts.iter_mut().find(|a| a.id() == account.id()) {
            Some(existing) => *existing = account.clone(),
            None => self.accounts.push(account.clone()),
        }
        Ok(())
    }

    /// Scalar copy without accounts; used as the back-reference held by an account.
    pub fn detached(&self) -> Owner {
        Owner::with_id(self.id, self.name.clone(), self.birthdate, self.email.clone())
    }

    /// Replaces the loaded account list (join results).
    pub(crate) fn set_accounts(&mut self, accounts: Vec<Account>) {
        self.accounts = accounts;
    }
}

impl Entity for Owner {
    const KIND: &'static str = "owner";

    fn id(&self) -> EntityId {
        self.id
    }

    fn assign_scalars(&mut self, other: &Self) {
        self.name = other.name.clone();
        self.birthdate = other.birthdate;
        self.email = other.email.clone();
    }

    fn scalars_eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.name == other.name
            && self.birthdate == other.birthdate
            && self.email == other.email
    }
}
