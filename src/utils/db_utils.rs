use chrono::{DateTime, NaiveDate, Utc};
use sqlx::MySql;
use sqlx::mysql::MySqlArguments;
use sqlx::query::{Query, QueryAs};

/// ===============================
/// SQL bindable value enum
/// ===============================
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    String(String),
    U64(u64),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
}

/// ===============================
/// Dynamic WHERE clause
/// ===============================
#[derive(Debug, Default, Clone)]
pub struct SqlWhere {
    clauses: Vec<String>,
    values: Vec<SqlValue>,
}

impl SqlWhere {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `clause` with one `?` placeholder per value.
    pub fn push(&mut self, clause: &str, values: impl IntoIterator<Item = SqlValue>) -> &mut Self {
        self.clauses.push(clause.to_string());
        self.values.extend(values);
        self
    }

    /// Adds `clause` only when `value` is present.
    pub fn push_opt(&mut self, clause: &str, value: Option<SqlValue>) -> &mut Self {
        if let Some(value) = value {
            self.push(clause, [value]);
        }
        self
    }

    /// `" WHERE a AND b"`, or empty when nothing was pushed.
    pub fn sql(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.clauses.join(" AND "))
        }
    }

    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }
}

fn bind_one<'q>(
    query: Query<'q, MySql, MySqlArguments>,
    value: SqlValue,
) -> Query<'q, MySql, MySqlArguments> {
    match value {
        SqlValue::String(v) => query.bind(v),
        SqlValue::U64(v) => query.bind(v),
        SqlValue::Date(v) => query.bind(v),
        SqlValue::DateTime(v) => query.bind(v),
    }
}

/// ===============================
/// Bind values in placeholder order
/// ===============================
pub fn bind<'q>(
    mut query: Query<'q, MySql, MySqlArguments>,
    values: &[SqlValue],
) -> Query<'q, MySql, MySqlArguments> {
    for value in values.iter().cloned() {
        query = bind_one(query, value);
    }
    query
}

pub fn bind_as<'q, O>(
    mut query: QueryAs<'q, MySql, O, MySqlArguments>,
    values: &[SqlValue],
) -> QueryAs<'q, MySql, O, MySqlArguments> {
    for value in values.iter().cloned() {
        query = match value {
            SqlValue::String(v) => query.bind(v),
            SqlValue::U64(v) => query.bind(v),
            SqlValue::Date(v) => query.bind(v),
            SqlValue::DateTime(v) => query.bind(v),
        };
    }
    query
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_where_renders_nothing() {
        assert_eq!(SqlWhere::new().sql(), "");
    }

    #[test]
    fn clauses_are_joined_with_and() {
        let mut w = SqlWhere::new();
        w.push("employee_id = ?", [SqlValue::String("EMP1".into())])
            .push_opt("status = ?", None)
            .push_opt("leave_type = ?", Some(SqlValue::String("sick".into())));
        assert_eq!(w.sql(), " WHERE employee_id = ? AND leave_type = ?");
        assert_eq!(w.values().len(), 2);
    }
}
