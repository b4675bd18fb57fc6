//! Typed predicates over entity columns, rendered to parameterized WHERE clauses.

use super::builder::{column_ref, QueryBuf};
use super::params::BindValue;

/// A storage column of one entity table. Column names come from code only, never from input.
pub trait Column: Copy + std::fmt::Debug + Send + Sync + 'static {
    fn name(self) -> &'static str;
}

#[derive(Clone, Debug, PartialEq)]
pub enum Filter<C> {
    /// `column = value`; a `Null` value renders as `IS NULL`.
    Eq(C, BindValue),
    /// Case-sensitive substring match.
    Contains(C, String),
    AtLeast(C, BindValue),
    AtMost(C, BindValue),
    All(Vec<Filter<C>>),
    Any(Vec<Filter<C>>),
}

impl<C: Column> Filter<C> {
    pub fn eq(column: C, value: impl Into<BindValue>) -> Self {
        Filter::Eq(column, value.into())
    }

    pub fn contains(column: C, needle: impl Into<String>) -> Self {
        Filter::Contains(column, needle.into())
    }

    /// Inclusive on both ends.
    pub fn between(column: C, from: impl Into<BindValue>, to: impl Into<BindValue>) -> Self {
        Filter::All(vec![
            Filter::AtLeast(column, from.into()),
            Filter::AtMost(column, to.into()),
        ])
    }

    pub fn and(self, other: Filter<C>) -> Self {
        match self {
            Filter::All(mut parts) => {
                parts.push(other);
                Filter::All(parts)
            }
            first => Filter::All(vec![first, other]),
        }
    }

    pub fn or(self, other: Filter<C>) -> Self {
        match self {
            Filter::Any(mut parts) => {
                parts.push(other);
                Filter::Any(parts)
            }
            first => Filter::Any(vec![first, other]),
        }
    }

    /// Renders the predicate, pushing its values onto `q.params`. Returns the SQL fragment.
    pub fn to_sql(&self, alias: Option<&str>, q: &mut QueryBuf) -> String {
        match self {
            Filter::Eq(c, BindValue::Null) => format!("{} IS NULL", column_ref(alias, c.name())),
            Filter::Eq(c, v) => {
                let n = q.push_param(v.clone());
                format!("{} = ?{}", column_ref(alias, c.name()), n)
            }
            Filter::Contains(c, needle) => {
                let n = q.push_param(BindValue::Text(needle.clone()));
                format!("instr({}, ?{}) > 0", column_ref(alias, c.name()), n)
            }
            Filter::AtLeast(c, v) => {
                let n = q.push_param(v.clone());
                format!("{} >= ?{}", column_ref(alias, c.name()), n)
            }
            Filter::AtMost(c, v) => {
                let n = q.push_param(v.clone());
                format!("{} <= ?{}", column_ref(alias, c.name()), n)
            }
            Filter::All(parts) => join_parts(parts, " AND ", "1 = 1", alias, q),
            Filter::Any(parts) => join_parts(parts, " OR ", "1 = 0", alias, q),
        }
    }
}

fn join_parts<C: Column>(
    parts: &[Filter<C>],
    sep: &str,
    empty: &str,
    alias: Option<&str>,
    q: &mut QueryBuf,
) -> String {
    if parts.is_empty() {
        return empty.to_string();
    }
    let rendered: Vec<String> = parts.iter().map(|p| p.to_sql(alias, q)).collect();
    format!("({})", rendered.join(sep))
}
