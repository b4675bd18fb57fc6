//! Owner handlers: list, lookups, create, update, delete.

use super::parse_id;
use crate::error::AppError;
use crate::model::{Owner, OwnerDto};
use crate::repo::{AccountsRepository, GenericRepository, OwnersRepository};
use crate::response::{success_created, success_many, success_one};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::Deserialize;

#[derive(Deserialize)]
pub struct NameQuery {
    pub name: String,
}

#[derive(Deserialize)]
pub struct EmailQuery {
    pub email: String,
}

#[derive(Deserialize)]
pub struct BirthdateQuery {
    pub from: String,
    pub to: String,
}

fn dtos(owners: &[Owner]) -> Vec<OwnerDto> {
    owners.iter().map(OwnerDto::from).collect()
}

/// `yyyy-MM-dd` at midnight UTC, or the last instant of that day when `end_of_day`.
fn parse_day(key: &str, s: &str, end_of_day: bool) -> Result<DateTime<Utc>, AppError> {
    let invalid = || AppError::BadRequest(format!("{} must be a date formatted yyyy-MM-dd", key));
    let date = NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| invalid())?;
    let naive = if end_of_day {
        date.and_hms_nano_opt(23, 59, 59, 999_999_999)
    } else {
        date.and_hms_opt(0, 0, 0)
    }
    .ok_or_else(invalid)?;
    Ok(Utc.from_utc_datetime(&naive))
}

pub async fn list_owners(State(state): State<AppState>) -> Result<impl axum::response::IntoResponse, AppError> {
    tracing::debug!("list_owners");
    let ctx = state.context();
    let owners = OwnersRepository::new(&ctx).select_all(false).await?;
    Ok(success_many(dtos(&owners)))
}

pub async fn get_owner(
    State(state): State<AppState>,
    Path(owner_id): Path<String>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let id = parse_id(&owner_id)?;
    tracing::debug!(%id, "get_owner");
    let ctx = state.context();
    let owner = OwnersRepository::new(&ctx)
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("owner {}", id)))?;
    Ok(success_one(OwnerDto::from(&owner)))
}

pub async fn owners_by_name(
    State(state): State<AppState>,
    Query(query): Query<NameQuery>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    tracing::debug!(name = %query.name, "owners_by_name");
    let ctx = state.context();
    let owners = OwnersRepository::new(&ctx).select_by_name(&query.name).await?;
    Ok(success_many(dtos(&owners)))
}

pub async fn owner_by_email(
    State(state): State<AppState>,
    Query(query): Query<EmailQuery>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    tracing::debug!(email = %query.email, "owner_by_email");
    let ctx = state.context();
    let owner = OwnersRepository::new(&ctx)
        .find_by_email(&query.email)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("owner with email {}", query.email)))?;
    Ok(success_one(OwnerDto::from(&owner)))
}

pub async fn owners_by_birthdate(
    State(state): State<AppState>,
    Query(query): Query<BirthdateQuery>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let from = parse_day("from", &query.from, false)?;
    let to = parse_day("to", &query.to, true)?;
    tracing::debug!(%from, %to, "owners_by_birthdate");
    let ctx = state.context();
    let owners = OwnersRepository::new(&ctx)
        .select_by_birthdate_range(from, to)
        .await?;
    Ok(success_many(dtos(&owners)))
}

pub async fn create_owner(
    State(state): State<AppState>,
    Json(dto): Json<OwnerDto>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let owner = Owner::from(dto);
    tracing::debug!(id = %owner.id(), "create_owner");
    let ctx = state.context();
    let owners = OwnersRepository::new(&ctx);
    if owners.find_by_id(owner.id()).await?.is_some() {
        return Err(AppError::Conflict(format!("owner {} already exists", owner.id())));
    }
    let dto = OwnerDto::from(&owner);
    owners.add(owner);
    ctx.save_all_changes().await?;
    Ok(success_created(&format!("/banking/owners/{}", dto.id), dto))
}

pub async fn update_owner(
    State(state): State<AppState>,
    Path(owner_id): Path<String>,
    Json(dto): Json<OwnerDto>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let id = parse_id(&owner_id)?;
    if dto.id != id {
        return Err(AppError::BadRequest(format!(
            "route id {} does not match body id {}",
            id, dto.id
        )));
    }
    tracing::debug!(%id, "update_owner");
    let ctx = state.context();
    let owner = OwnersRepository::new(&ctx)
        .modify(id, |owner: &mut Owner| {
            owner.update(dto.name, dto.email);
            owner.clone()
        })
        .await?;
    ctx.save_all_changes().await?;
    Ok(success_one(OwnerDto::from(&owner)))
}

pub async fn delete_owner(
    State(state): State<AppState>,
    Path(owner_id): Path<String>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let id = parse_id(&owner_id)?;
    tracing::debug!(%id, "delete_owner");
    let ctx = state.context();
    let owners = OwnersRepository::new(&ctx);
    let owner = owners
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("owner {}", id)))?;
    let accounts = AccountsRepository::new(&ctx)
        .select_by_owner_id_join(id, false, false)
        .await?;
    if !accounts.is_empty() {
        return Err(AppError::Conflict(format!(
            "owner {} still has {} account(s)",
            id,
            accounts.len()
        )));
    }
    owners.remove(&owner);
    ctx.save_all_changes().await?;
    Ok(StatusCode::NO_CONTENT)
}
