//! Builds parameterized INSERT, SELECT, UPDATE, DELETE for a mapped record.

use super::filter::Filter;
use super::params::BindValue;
use crate::context::Record;
use crate::model::EntityId;

/// Quote identifier for SQLite (safe: only from code).
pub fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Column reference, optionally qualified by a table alias.
pub fn column_ref(alias: Option<&str>, column: &str) -> String {
    match alias {
        Some(a) => format!("{}.{}", a, quoted(column)),
        None => quoted(column),
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<BindValue>,
}

impl QueryBuf {
    /// Appends a parameter and returns its 1-based placeholder number.
    pub fn push_param(&mut self, v: BindValue) -> u32 {
        self.params.push(v);
        self.params.len() as u32
    }
}

/// Column list of a record, optionally qualified by an alias.
pub fn column_list<T: Record>(alias: Option<&str>) -> String {
    T::COLUMNS
        .iter()
        .map(|c| column_ref(alias, c))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `WHERE ...` for an optional filter (empty string when there is none).
pub fn where_clause<T: Record>(
    filter: Option<&Filter<T::Column>>,
    alias: Option<&str>,
    q: &mut QueryBuf,
) -> String {
    match filter {
        Some(f) => format!(" WHERE {}", f.to_sql(alias, q)),
        None => String::new(),
    }
}

/// SELECT in storage order with optional filter and limit.
pub fn select<T: Record>(filter: Option<&Filter<T::Column>>, limit: Option<u32>) -> QueryBuf {
    let mut q = QueryBuf::default();
    let where_sql = where_clause::<T>(filter, None, &mut q);
    q.sql = format!(
        "SELECT {} FROM {}{} ORDER BY rowid",
        column_list::<T>(None),
        quoted(T::TABLE),
        where_sql
    );
    if let Some(n) = limit {
        q.sql.push_str(&format!(" LIMIT {}", n));
    }
    q
}

/// SELECT by primary key.
pub fn select_by_id<T: Record>(id: EntityId) -> QueryBuf {
    let mut q = QueryBuf::default();
    let n = q.push_param(BindValue::Uuid(id));
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = ?{}",
        column_list::<T>(None),
        quoted(T::TABLE),
        quoted(T::COLUMNS[0]),
        n
    );
    q
}

/// INSERT of every mapped column.
pub fn insert<T: Record>(item: &T) -> QueryBuf {
    let mut q = QueryBuf::default();
    let placeholders: Vec<String> = item
        .values()
        .into_iter()
        .map(|v| format!("?{}", q.push_param(v)))
        .collect();
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quoted(T::TABLE),
        column_list::<T>(None),
        placeholders.join(", ")
    );
    q
}

/// UPDATE of every non-key column by primary key.
pub fn update<T: Record>(item: &T) -> QueryBuf {
    let mut q = QueryBuf::default();
    let mut values = item.values().into_iter();
    let id = values.next().unwrap_or(BindValue::Uuid(item.id()));
    let sets: Vec<String> = T::COLUMNS[1..]
        .iter()
        .zip(values)
        .map(|(c, v)| format!("{} = ?{}", quoted(c), q.push_param(v)))
        .collect();
    let n = q.push_param(id);
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = ?{}",
        quoted(T::TABLE),
        sets.join(", "),
        quoted(T::COLUMNS[0]),
        n
    );
    q
}

/// DELETE by primary key.
pub fn delete<T: Record>(id: EntityId) -> QueryBuf {
    let mut q = QueryBuf::default();
    let n = q.push_param(BindValue::Uuid(id));
    q.sql = format!(
        "DELETE FROM {} WHERE {} = ?{}",
        quoted(T::TABLE),
        quoted(T::COLUMNS[0]),
        n
    );
    q
}
