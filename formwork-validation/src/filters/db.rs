// Database existence filters

use super::Filter;
use crate::{FormError, MessageTemplate, Result, Severity};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Failure reported by a [`RowCounter`] implementation.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query error: {0}")]
    Query(String),
}

/// The database capability the existence filters need.
///
/// Implementations run [`count_statement`] with `value` bound to the
/// single parameter. Called once per validated value, so repeatable
/// fields issue one query per row.
pub trait RowCounter: Send + Sync {
    fn count_where(&self, table: &str, column: &str, value: &Value) -> std::result::Result<i64, DbError>;
}

/// `SELECT COUNT(*)` for one column equality. Identifiers must already
/// be sanitized.
pub fn count_statement(table: &str, column: &str) -> String {
    format!("SELECT COUNT(*) FROM {table} WHERE {column} = ?")
}

/// Strip everything outside `[a-z0-9_]`.
pub fn sanitize_identifier(raw: &str) -> Result<String> {
    let sanitized: String = raw
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_')
        .collect();
    if sanitized.is_empty() {
        return Err(FormError::InvalidFilterArgument(format!(
            "identifier {raw:?} is empty after sanitizing"
        )));
    }
    Ok(sanitized)
}

#[derive(Clone)]
struct Lookup {
    counter: Arc<dyn RowCounter>,
    table: String,
    column: String,
}

impl Lookup {
    fn new(counter: Arc<dyn RowCounter>, table: &str, column: &str) -> Result<Self> {
        Ok(Self {
            counter,
            table: sanitize_identifier(table)?,
            column: sanitize_identifier(column)?,
        })
    }

    /// Row count, or `None` when the database cannot answer.
    fn count(&self, value: &Value) -> Option<i64> {
        match self.counter.count_where(&self.table, &self.column, value) {
            Ok(count) if count >= 0 => Some(count),
            Ok(count) => {
                tracing::error!(table = %self.table, column = %self.column, count, "row counter returned a negative count");
                None
            }
            Err(e) => {
                tracing::error!(table = %self.table, column = %self.column, error = %e, "row count failed");
                None
            }
        }
    }
}

impl fmt::Debug for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lookup")
            .field("table", &self.table)
            .field("column", &self.column)
            .finish_non_exhaustive()
    }
}

/// At least one row must hold the value. Fails closed on database errors.
#[derive(Debug, Clone)]
pub struct ExistsInDb {
    lookup: Lookup,
    message: MessageTemplate,
    severity: Severity,
}

message_builders!(ExistsInDb);

impl ExistsInDb {
    pub fn new(counter: Arc<dyn RowCounter>, table: &str, column: &str) -> Result<Self> {
        Ok(Self {
            lookup: Lookup::new(counter, table, column)?,
            message: MessageTemplate::new("%s does not exist"),
            severity: Severity::Error,
        })
    }

    pub fn table(&self) -> &str {
        &self.lookup.table
    }

    pub fn column(&self) -> &str {
        &self.lookup.column
    }
}

impl Filter for ExistsInDb {
    fn name(&self) -> &str {
        "exists"
    }

    fn check(&self, value: &Value, _index: Option<usize>) -> bool {
        self.lookup.count(value).is_some_and(|count| count > 0)
    }

    fn message(&self) -> &MessageTemplate {
        &self.message
    }

    fn severity(&self) -> Severity {
        self.severity
    }
}

/// No row may hold the value. Fails closed on database errors.
#[derive(Debug, Clone)]
pub struct DoNotExistInDb {
    lookup: Lookup,
    message: MessageTemplate,
    severity: Severity,
}

message_builders!(DoNotExistInDb);

impl DoNotExistInDb {
    pub fn new(counter: Arc<dyn RowCounter>, table: &str, column: &str) -> Result<Self> {
        Ok(Self {
            lookup: Lookup::new(counter, table, column)?,
            message: MessageTemplate::new("%s already exists"),
            severity: Severity::Error,
        })
    }

    pub fn table(&self) -> &str {
        &self.lookup.table
    }

    pub fn column(&self) -> &str {
        &self.lookup.column
    }
}

impl Filter for DoNotExistInDb {
    fn name(&self) -> &str {
        "not_exists"
    }

    fn check(&self, value: &Value, _index: Option<usize>) -> bool {
        self.lookup.count(value) == Some(0)
    }

    fn message(&self) -> &MessageTemplate {
        &self.message
    }

    fn severity(&self) -> Severity {
        self.severity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use serde_json::json;

    #[derive(Default)]
    struct FakeTable {
        rows: Vec<Value>,
        calls: Mutex<Vec<(String, String)>>,
    }

    impl RowCounter for FakeTable {
        fn count_where(&self, table: &str, column: &str, value: &Value) -> std::result::Result<i64, DbError> {
            self.calls.lock().push((table.to_string(), column.to_string()));
            Ok(self.rows.iter().filter(|row| *row == value).count() as i64)
        }
    }

    struct Broken(std::result::Result<i64, String>);

    impl RowCounter for Broken {
        fn count_where(&self, _: &str, _: &str, _: &Value) -> std::result::Result<i64, DbError> {
            self.0.clone().map_err(DbError::Query)
        }
    }

    #[test]
    fn test_identifiers_sanitized() {
        let table = Arc::new(FakeTable::default());
        let filter = ExistsInDb::new(table.clone(), "users; DROP TABLE users", "e-mail").unwrap();
        assert_eq!(filter.table(), "usersusers");
        assert_eq!(filter.column(), "email");

        filter.check(&json!("a"), None);
        assert_eq!(table.calls.lock()[0], ("usersusers".to_string(), "email".to_string()));
    }

    #[test]
    fn test_empty_identifier_rejected() {
        let counter: Arc<dyn RowCounter> = Arc::new(FakeTable::default());
        assert!(matches!(
            DoNotExistInDb::new(counter, "USERS", "email"),
            Err(FormError::InvalidFilterArgument(_))
        ));
    }

    #[test]
    fn test_exists_and_not_exists() {
        let table = Arc::new(FakeTable {
            rows: vec![json!("taken@example.com")],
            ..Default::default()
        });
        let exists = ExistsInDb::new(table.clone(), "users", "email").unwrap();
        let free = DoNotExistInDb::new(table, "users", "email").unwrap();

        assert!(exists.check(&json!("taken@example.com"), None));
        assert!(!free.check(&json!("taken@example.com"), None));
        assert!(!exists.check(&json!("new@example.com"), None));
        assert!(free.check(&json!("new@example.com"), None));
    }

    #[test]
    fn test_fails_closed() {
        for counter in [Broken(Err("down".to_string())), Broken(Ok(-1))] {
            let counter: Arc<dyn RowCounter> = Arc::new(counter);
            let exists = ExistsInDb::new(counter.clone(), "users", "email").unwrap();
            let free = DoNotExistInDb::new(counter, "users", "email").unwrap();
            assert!(!exists.check(&json!("x"), None));
            assert!(!free.check(&json!("x"), None));
        }
    }

    #[test]
    fn test_count_statement() {
        assert_eq!(
            count_statement("users", "email"),
            "SELECT COUNT(*) FROM users WHERE email = ?"
        );
    }
}
