//! Owner and account routes under `/banking`, plus the OpenAPI document of their payloads.

use crate::handlers::{
    create_account, create_owner, delete_account, delete_owner, get_account, get_account_by_iban,
    get_owner, list_owner_accounts, list_owners, owner_by_email, owners_by_birthdate,
    owners_by_name, update_owner,
};
use crate::model::{AccountDto, OwnerDto};
use crate::state::AppState;
use axum::{
    routing::{delete, get},
    Json, Router,
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(title = "banking-api", description = "Owners and their bank accounts"),
    components(schemas(OwnerDto, AccountDto))
)]
pub struct ApiDoc;

async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn banking_routes(state: AppState) -> Router {
    Router::new()
        .route("/banking/owners", get(list_owners).post(create_owner))
        .route("/banking/owners/name", get(owners_by_name))
        .route("/banking/owners/email", get(owner_by_email))
        .route("/banking/owners/birthdate", get(owners_by_birthdate))
        .route(
            "/banking/owners/:owner_id",
            get(get_owner).put(update_owner).delete(delete_owner),
        )
        .route(
            "/banking/owners/:owner_id/accounts",
            get(list_owner_accounts).post(create_account),
        )
        .route(
            "/banking/owners/:owner_id/accounts/:account_id",
            delete(delete_account),
        )
        .route("/banking/accounts/iban/:iban", get(get_account_by_iban))
        .route("/banking/accounts/:account_id", get(get_account))
        .route("/banking/openapi.json", get(openapi))
        .with_state(state)
}
