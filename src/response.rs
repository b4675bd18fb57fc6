//! `{data}` and `{data, meta}` bodies shared by every banking route.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

#[derive(Serialize)]
pub struct Single<T> {
    pub data: T,
}

#[derive(Serialize)]
pub struct Listing<T> {
    pub data: Vec<T>,
    pub meta: ListingMeta,
}

#[derive(Serialize)]
pub struct ListingMeta {
    pub count: usize,
}

pub fn success_one<T: Serialize>(data: T) -> (StatusCode, Json<Single<T>>) {
    (StatusCode::OK, Json(Single { data }))
}

/// 201 with a `Location` header pointing at the created resource.
pub fn success_created<T: Serialize>(location: &str, data: T) -> Response {
    let mut response = (StatusCode::CREATED, Json(Single { data })).into_response();
    if let Ok(value) = HeaderValue::from_str(location) {
        response.headers_mut().insert(header::LOCATION, value);
    }
    response
}

pub fn success_many<T: Serialize>(data: Vec<T>) -> (StatusCode, Json<Listing<T>>) {
    let meta = ListingMeta { count: data.len() };
    (StatusCode::OK, Json(Listing { data, meta }))
}
