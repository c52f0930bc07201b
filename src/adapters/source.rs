use async_trait::async_trait;
use serde_json::Value;

use crate::error::{FactoryError, Result};

/// Sort instruction for a record-set read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub column: String,
    pub ascending: bool,
}

/// Filter/sort/limit options for one record-set read.
///
/// All filter values are compared as text, the way the dashboard's query
/// layer passes them through.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOpts {
    pub eq: Vec<(String, String)>,
    pub neq: Vec<(String, String)>,
    pub one_of: Vec<(String, Vec<String>)>,
    pub gte: Vec<(String, String)>,
    pub order: Option<OrderBy>,
    pub limit: Option<i64>,
}

impl QueryOpts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: &str, value: impl Into<String>) -> Self {
        self.eq.push((column.to_string(), value.into()));
        self
    }

    pub fn neq(mut self, column: &str, value: impl Into<String>) -> Self {
        self.neq.push((column.to_string(), value.into()));
        self
    }

    pub fn one_of(mut self, column: &str, values: &[&str]) -> Self {
        self.one_of.push((
            column.to_string(),
            values.iter().map(|v| v.to_string()).collect(),
        ));
        self
    }

    pub fn gte(mut self, column: &str, value: impl Into<String>) -> Self {
        self.gte.push((column.to_string(), value.into()));
        self
    }

    /// Newest first
    pub fn order_desc(mut self, column: &str) -> Self {
        self.order = Some(OrderBy {
            column: column.to_string(),
            ascending: false,
        });
        self
    }

    pub fn order_asc(mut self, column: &str) -> Self {
        self.order = Some(OrderBy {
            column: column.to_string(),
            ascending: true,
        });
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Every column name the query touches.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.eq
            .iter()
            .chain(self.neq.iter())
            .chain(self.gte.iter())
            .map(|(c, _)| c.as_str())
            .chain(self.one_of.iter().map(|(c, _)| c.as_str()))
            .chain(self.order.iter().map(|o| o.column.as_str()))
    }
}

/// Check that a record-set or column name is a plain SQL identifier.
pub fn validate_identifier<'a>(table: &str, ident: &'a str) -> Result<&'a str> {
    let mut chars = ident.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_lowercase() || c == '_');
    let valid_rest = chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if valid_start && valid_rest && ident.len() <= 63 {
        Ok(ident)
    } else {
        Err(FactoryError::invalid_query(
            table,
            format!("'{ident}' is not a valid identifier"),
        ))
    }
}

/// Anything that can answer a filtered read of a named record set.
///
/// Implementations return errors freely; the gateway is what turns them into
/// empty results.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Short label for logs
    fn name(&self) -> &'static str;

    async fn fetch_rows(&self, table: &str, opts: &QueryOpts) -> Result<Vec<Value>>;
}
