//! Wire shapes for owners and accounts (camelCase JSON) and their mapping to entities.

use super::account::Account;
use super::entity::EntityId;
use super::owner::Owner;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct OwnerDto {
    pub id: Uuid,
    pub name: String,
    pub birthdate: DateTime<Utc>,
    pub email: String,
}

impl Default for OwnerDto {
    fn default() -> Self {
        Self {
            id: Uuid::nil(),
            name: String::new(),
            birthdate: DateTime::<Utc>::default(),
            email: String::new(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct AccountDto {
    pub id: Uuid,
    pub iban: String,
    pub balance: f64,
    pub owner_id: Uuid,
}

fn id_or_fresh(id: Uuid) -> EntityId {
    if id.is_nil() {
        Uuid::new_v4()
    } else {
        id
    }
}

impl From<&Owner> for OwnerDto {
    fn from(o: &Owner) -> Self {
        Self {
            id: o.id(),
            name: o.name.clone(),
            birthdate: o.birthdate(),
            email: o.email.clone(),
        }
    }
}

impl From<OwnerDto> for Owner {
    fn from(dto: OwnerDto) -> Self {
        Owner::with_id(id_or_fresh(dto.id), dto.name, dto.birthdate, dto.email)
    }
}

impl From<&Account> for AccountDto {
    fn from(a: &Account) -> Self {
        Self {
            id: a.id(),
            iban: a.iban.clone(),
            balance: a.balance(),
            owner_id: a.owner_id().unwrap_or_else(Uuid::nil),
        }
    }
}

impl From<AccountDto> for Account {
    fn from(dto: AccountDto) -> Self {
        let owner_id = Some(dto.owner_id).filter(|id| !id.is_nil());
        Account::from_parts(id_or_fresh(dto.id), dto.iban, dto.balance, owner_id)
    }
}
