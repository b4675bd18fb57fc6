mod common;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use banking_api::seed::Seed;
use banking_api::{app, AccountDto, AppState, DataContext, OwnerDto};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

async fn seeded_app() -> (Router, Seed) {
    let pool = common::pool().await;
    let seed = Seed::new();
    seed.apply(&DataContext::new(pool.clone())).await.unwrap();
    (app(AppState::new(pool), 64 * 1024), seed)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            req = req.header(header::CONTENT_TYPE, "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    let response = app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn owner_json(dto: &OwnerDto) -> Value {
    serde_json::to_value(dto).unwrap()
}

#[tokio::test]
async fn common_routes_respond() {
    let (app, _) = seeded_app().await;
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = send(&app, Method::GET, "/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], "ok");

    let (status, body) = send(&app, Method::GET, "/version", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "banking-api");
}

#[tokio::test]
async fn list_and_get_owners() {
    let (app, seed) = seeded_app().await;
    let (status, body) = send(&app, Method::GET, "/banking/owners", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["count"], 6);
    assert_eq!(body["data"][0], owner_json(&OwnerDto::from(&seed.owner1)));

    let uri = format!("/banking/owners/{}", seed.owner2.id());
    let (status, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Max Mustermann");

    let uri = format!("/banking/owners/{}", Uuid::new_v4());
    let (status, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");

    let (status, _) = send(&app, Method::GET, "/banking/owners/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn owner_queries_by_name_email_and_birthdate() {
    let (app, seed) = seeded_app().await;

    let (status, body) = send(&app, Method::GET, "/banking/owners/name?name=Mustermann", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"],
        json!([
            owner_json(&OwnerDto::from(&seed.owner1)),
            owner_json(&OwnerDto::from(&seed.owner2))
        ])
    );

    let (status, body) = send(
        &app,
        Method::GET,
        "/banking/owners/email?email=b.bauer@gmail.com",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], seed.owner4.id().to_string());

    let (status, _) = send(&app, Method::GET, "/banking/owners/email?email=nobody@x.de", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &app,
        Method::GET,
        "/banking/owners/birthdate?from=1960-01-01&to=1969-12-31",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["count"], 2);

    let (status, body) = send(
        &app,
        Method::GET,
        "/banking/owners/birthdate?from=01.01.1960&to=1969-12-31",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "bad_request");
}

#[tokio::test]
async fn birthdate_query_includes_the_whole_to_day() {
    let (app, _) = seeded_app().await;
    for (name, birthdate) in [
        ("Eva Abend", "1969-12-31T18:30:00Z"),
        ("Fritz Frueh", "1960-01-01T00:00:00.250Z"),
        ("Otto Neujahr", "1970-01-01T00:00:00Z"),
    ] {
        let body = json!({ "name": name, "birthdate": birthdate, "email": "x@web.de" });
        let (status, _) = send(&app, Method::POST, "/banking/owners", Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(
        &app,
        Method::GET,
        "/banking/owners/birthdate?from=1960-01-01&to=1969-12-31",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["count"], 4);
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|o| o["name"].as_str())
        .collect();
    assert_eq!(names, vec!["Arno Arndt", "Benno Bauer", "Eva Abend", "Fritz Frueh"]);
}

#[tokio::test]
async fn create_update_and_delete_owner() {
    let (app, _) = seeded_app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/banking/owners",
        Some(json!({
            "name": "Hanna Hahn",
            "birthdate": "1999-09-09T00:00:00Z",
            "email": "h.hahn@web.de"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let created: OwnerDto = serde_json::from_value(body["data"].clone()).unwrap();
    assert!(!created.id.is_nil());

    let (status, _) = send(&app, Method::POST, "/banking/owners", Some(owner_json(&created))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let uri = format!("/banking/owners/{}", created.id);
    let mut changed = created.clone();
    changed.name = "Hanna Huhn".into();
    changed.email = "h.huhn@web.de".into();
    let (status, body) = send(&app, Method::PUT, &uri, Some(owner_json(&changed))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Hanna Huhn");

    let (_, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(body["data"]["email"], "h.huhn@web.de");

    let wrong = format!("/banking/owners/{}", Uuid::new_v4());
    let (status, _) = send(&app, Method::PUT, &wrong, Some(owner_json(&changed))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);
    let (status, _) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_of_missing_owner_is_not_found() {
    let (app, _) = seeded_app().await;
    let id = Uuid::new_v4();
    let dto = OwnerDto {
        id,
        name: "Nobody".into(),
        email: "nobody@x.de".into(),
        ..Default::default()
    };
    let (status, _) = send(&app, Method::PUT, &format!("/banking/owners/{}", id), Some(owner_json(&dto))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn owner_with_accounts_cannot_be_deleted() {
    let (app, seed) = seeded_app().await;
    let uri = format!("/banking/owners/{}", seed.owner1.id());
    let (status, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "conflict");
}

#[tokio::test]
async fn account_routes() {
    let (app, seed) = seeded_app().await;

    let uri = format!("/banking/owners/{}/accounts", seed.owner1.id());
    let (status, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["count"], 2);
    assert_eq!(body["data"][0]["ownerId"], seed.owner1.id().to_string());

    let uri = format!("/banking/accounts/{}", seed.account3.id());
    let (status, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["iban"], "DE20 10000000 0000000000");

    let (status, body) = send(
        &app,
        Method::GET,
        "/banking/accounts/iban/DE50%2010000000%200000000000",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let dto: AccountDto = serde_json::from_value(body["data"].clone()).unwrap();
    assert_eq!(dto, AccountDto::from(&seed.account6));

    let (status, _) = send(&app, Method::GET, "/banking/accounts/iban/XX00", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_and_delete_account() {
    let (app, seed) = seeded_app().await;
    let owner6 = seed.owner6.id();
    let uri = format!("/banking/owners/{}/accounts", owner6);

    let (status, body) = send(
        &app,
        Method::POST,
        &uri,
        Some(json!({ "iban": "DE60 10000000 0000000000", "balance": 10.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let created: AccountDto = serde_json::from_value(body["data"].clone()).unwrap();
    assert_eq!(created.owner_id, owner6);

    let (status, _) = send(
        &app,
        Method::POST,
        &uri,
        Some(json!({ "iban": "DE60 10000000 0000000000" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        Method::POST,
        &uri,
        Some(json!({ "iban": "DE61", "ownerId": seed.owner1.id() })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let missing_owner = format!("/banking/owners/{}/accounts", Uuid::new_v4());
    let (status, _) = send(&app, Method::POST, &missing_owner, Some(json!({ "iban": "DE62" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let wrong_owner = format!("/banking/owners/{}/accounts/{}", seed.owner1.id(), created.id);
    let (status, _) = send(&app, Method::DELETE, &wrong_owner, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let delete_uri = format!("/banking/owners/{}/accounts/{}", owner6, created.id);
    let (status, _) = send(&app, Method::DELETE, &delete_uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(body["meta"]["count"], 0);
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let pool = common::pool().await;
    let app = app(AppState::new(pool), 128);
    let body = json!({ "name": "x".repeat(512), "email": "big@x.de" });
    let (status, _) = send(&app, Method::POST, "/banking/owners", Some(body)).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn openapi_document_lists_dto_schemas() {
    let (app, _) = seeded_app().await;
    let (status, body) = send(&app, Method::GET, "/banking/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["components"]["schemas"]["OwnerDto"].is_object());
    assert!(body["components"]["schemas"]["AccountDto"].is_object());
}
