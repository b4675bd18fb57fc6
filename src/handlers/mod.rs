//! HTTP handlers for owners and accounts.

pub mod accounts;
pub mod owners;
pub use accounts::*;
pub use owners::*;

use crate::error::AppError;
use crate::model::EntityId;

fn parse_id(id_str: &str) -> Result<EntityId, AppError> {
    uuid::Uuid::parse_str(id_str).map_err(|_| AppError::BadRequest("invalid uuid".into()))
}
