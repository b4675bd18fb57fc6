//! Account: a bank account identified by an IBAN, bound to exactly one owner once persisted.

use super::entity::{Entity, EntityId};
use super::owner::Owner;
use crate::error::DomainError;
use uuid::Uuid;

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct Account {
    id: EntityId,
    pub iban: String,
    balance: f64,
    owner_id: Option<EntityId>,
    #[sqlx(skip)]
    owner: Option<Owner>,
}

impl Account {
    /// New unbound account with a fresh id and zero balance.
    pub fn new(iban: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), iban, 0.0)
    }

    pub fn with_id(id: EntityId, iban: impl Into<String>, balance: f64) -> Self {
        Self {
            id,
            iban: iban.into(),
            balance,
            owner_id: None,
            owner: None,
        }
    }

    pub(crate) fn from_parts(
        id: EntityId,
        iban: impl Into<String>,
        balance: f64,
        owner_id: Option<EntityId>,
    ) -> Self {
        Self {
            owner_id,
            ..Self::with_id(id, iban, balance)
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn owner_id(&self) -> Option<EntityId> {
        self.owner_id
    }

    /// Back-reference, present when loaded with its owner or bound via [`Owner::add`].
    pub fn owner(&self) -> Option<&Owner> {
        self.owner.as_ref()
    }

    pub(crate) fn bind_owner(&mut self, owner: Owner) {
        self.owner_id = Some(owner.id());
        self.owner = Some(owner);
    }
}

/// Compares scalars and the owner id; the loaded back-reference is ignored.
impl PartialEq for Account {
    fn eq(&self, other: &Self) -> bool {
        self.scalars_eq(other)
    }
}

impl Entity for Account {
    const KIND: &'static str = "account";

    fn id(&self) -> EntityId {
        self.id
    }

    /// An account never moves to a different owner.
    fn check_update(&self, incoming: &Self) -> Result<(), DomainError> {
        match (self.owner_id, incoming.owner_id) {
            (Some(current), Some(other)) if current != other => {
                Err(DomainError::AccountAssignedElsewhere {
                    account_id: self.id,
                    owner_id: current,
                })
            }
            _ => Ok(()),
        }
    }

    /// An unset incoming `owner_id` keeps the current binding.
    fn assign_scalars(&mut self, other: &Self) {
        self.iban = other.iban.clone();
        self.balance = other.balance;
        if other.owner_id.is_some() {
            self.owner_id = other.owner_id;
        }
    }

    fn scalars_eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.iban == other.iban
            && self.balance == other.balance
            && self.owner_id == other.owner_id
    }
}
