//! Values that sqlx can bind to a SQLite statement.

use chrono::{DateTime, Utc};
use sqlx::encode::{Encode, IsNull};
use sqlx::sqlite::{Sqlite, SqliteTypeInfo};
use sqlx::Database;
use uuid::Uuid;

/// A value bound to a `?N` placeholder. Ids are stored as BLOB, timestamps as RFC 3339 TEXT.
#[derive(Clone, Debug, PartialEq)]
pub enum BindValue {
    Null,
    Text(String),
    Real(f64),
    Uuid(Uuid),
    Timestamp(DateTime<Utc>),
}

impl<'q> Encode<'q, Sqlite> for BindValue {
    fn encode_by_ref(
        &self,
        buf: &mut <Sqlite as Database>::ArgumentBuffer<'q>,
    ) -> Result<IsNull, Box<dyn std::error::Error + Send + Sync>> {
        match self {
            BindValue::Null => <Option<String> as Encode<Sqlite>>::encode_by_ref(&None, buf),
            BindValue::Text(s) => <String as Encode<Sqlite>>::encode_by_ref(s, buf),
            BindValue::Real(n) => <f64 as Encode<Sqlite>>::encode_by_ref(n, buf),
            BindValue::Uuid(u) => <Uuid as Encode<Sqlite>>::encode_by_ref(u, buf),
            BindValue::Timestamp(t) => <DateTime<Utc> as Encode<Sqlite>>::encode_by_ref(t, buf),
        }
    }
}

impl sqlx::Type<Sqlite> for BindValue {
    fn type_info() -> SqliteTypeInfo {
        <String as sqlx::Type<Sqlite>>::type_info()
    }

    fn compatible(_ty: &SqliteTypeInfo) -> bool {
        true
    }
}

impl From<&str> for BindValue {
    fn from(v: &str) -> Self {
        BindValue::Text(v.to_string())
    }
}

impl From<String> for BindValue {
    fn from(v: String) -> Self {
        BindValue::Text(v)
    }
}

impl From<f64> for BindValue {
    fn from(v: f64) -> Self {
        BindValue::Real(v)
    }
}

impl From<Uuid> for BindValue {
    fn from(v: Uuid) -> Self {
        BindValue::Uuid(v)
    }
}

impl From<DateTime<Utc>> for BindValue {
    fn from(v: DateTime<Utc>) -> Self {
        BindValue::Timestamp(v)
    }
}

impl<T: Into<BindValue>> From<Option<T>> for BindValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(BindValue::Null, Into::into)
    }
}
