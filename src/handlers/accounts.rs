//! Account handlers, nested under their owner where the owner matters.

use super::parse_id;
use crate::error::AppError;
use crate::model::{Account, AccountDto};
use crate::repo::{AccountsRepository, GenericRepository, OwnersRepository};
use crate::response::{success_created, success_many, success_one};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

pub async fn list_owner_accounts(
    State(state): State<AppState>,
    Path(owner_id): Path<String>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let owner_id = parse_id(&owner_id)?;
    tracing::debug!(%owner_id, "list_owner_accounts");
    let ctx = state.context();
    let accounts = AccountsRepository::new(&ctx)
        .select_by_owner_id_join(owner_id, false, false)
        .await?;
    Ok(success_many(accounts.iter().map(AccountDto::from).collect()))
}

pub async fn get_account(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let id = parse_id(&account_id)?;
    tracing::debug!(%id, "get_account");
    let ctx = state.context();
    let account = AccountsRepository::new(&ctx)
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("account {}", id)))?;
    Ok(success_one(AccountDto::from(&account)))
}

pub async fn get_account_by_iban(
    State(state): State<AppState>,
    Path(iban): Path<String>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    tracing::debug!(%iban, "get_account_by_iban");
    let ctx = state.context();
    let account = AccountsRepository::new(&ctx)
        .find_by_iban(&iban)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("account with iban {}", iban)))?;
    Ok(success_one(AccountDto::from(&account)))
}

/// Binds a new account to an existing owner and persists it.
pub async fn create_account(
    State(state): State<AppState>,
    Path(owner_id): Path<String>,
    Json(dto): Json<AccountDto>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let owner_id = parse_id(&owner_id)?;
    let account = Account::from(dto);
    tracing::debug!(%owner_id, id = %account.id(), "create_account");
    if let Some(other) = account.owner_id().filter(|other| *other != owner_id) {
        return Err(AppError::BadRequest(format!(
            "account names owner {} but route names owner {}",
            other, owner_id
        )));
    }

    let ctx = state.context();
    let owners = OwnersRepository::new(&ctx);
    if owners.find_by_id(owner_id).await?.is_none() {
        return Err(AppError::BadRequest(format!("owner {} does not exist", owner_id)));
    }
    let accounts = AccountsRepository::new(&ctx);
    if accounts.find_by_id(account.id()).await?.is_some() {
        return Err(AppError::Conflict(format!("account {} already exists", account.id())));
    }
    if accounts.find_by_iban(&account.iban).await?.is_some() {
        return Err(AppError::Conflict(format!("iban {} already exists", account.iban)));
    }

    let account = owners.add_account(owner_id, account).await?;
    ctx.save_all_changes().await?;
    let dto = AccountDto::from(&account);
    Ok(success_created(&format!("/banking/accounts/{}", dto.id), dto))
}

pub async fn delete_account(
    State(state): State<AppState>,
    Path((owner_id, account_id)): Path<(String, String)>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let owner_id = parse_id(&owner_id)?;
    let id = parse_id(&account_id)?;
    tracing::debug!(%owner_id, %id, "delete_account");
    let ctx = state.context();
    let accounts = AccountsRepository::new(&ctx);
    let account = accounts
        .find_by_id(id)
        .await?
        .filter(|a| a.owner_id() == Some(owner_id))
        .ok_or_else(|| AppError::NotFound(format!("account {} of owner {}", id, owner_id)))?;
    accounts.remove(&account);
    ctx.save_all_changes().await?;
    Ok(StatusCode::NO_CONTENT)
}
