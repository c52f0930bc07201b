//! JSON-file record source for offline snapshots and tests.
//!
//! A fixture is one object mapping record-set names to arrays of rows:
//! `{"factory_tasks": [...], "v3_positions": [...]}`. Sets missing from the
//! file behave like an unavailable table.

use async_trait::async_trait;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

use crate::adapters::source::{validate_identifier, QueryOpts, RecordSource};
use crate::domain::lenient::value_to_string;
use crate::error::{FactoryError, Result};

#[derive(Debug, Clone, Default)]
pub struct FixtureStore {
    tables: HashMap<String, Vec<Value>>,
}

impl FixtureStore {
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(sets) = value else {
            return Err(FactoryError::Fixture(
                "fixture root must be an object of record sets".to_string(),
            ));
        };

        let mut tables = HashMap::new();
        for (name, rows) in sets {
            let Value::Array(rows) = rows else {
                return Err(FactoryError::Fixture(format!(
                    "record set '{name}' must be an array"
                )));
            };
            tables.insert(name, rows);
        }
        Ok(Self { tables })
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let store = Self::from_value(serde_json::from_str(&raw)?)?;
        info!(
            path = %path.display(),
            sets = store.tables.len(),
            "Loaded fixture record sets"
        );
        Ok(store)
    }

    pub fn insert(&mut self, table: &str, rows: Vec<Value>) {
        self.tables.insert(table.to_string(), rows);
    }
}

fn column_text(row: &Value, column: &str) -> Option<String> {
    row.get(column).and_then(value_to_string)
}

fn row_matches(row: &Value, opts: &QueryOpts) -> bool {
    let eq = opts
        .eq
        .iter()
        .all(|(c, v)| column_text(row, c).as_deref() == Some(v.as_str()));
    // SQL `<>` never matches a null column
    let neq = opts
        .neq
        .iter()
        .all(|(c, v)| column_text(row, c).is_some_and(|text| text != *v));
    let one_of = opts
        .one_of
        .iter()
        .all(|(c, vs)| column_text(row, c).is_some_and(|text| vs.contains(&text)));
    let gte = opts
        .gte
        .iter()
        .all(|(c, v)| column_text(row, c).is_some_and(|text| text.as_str() >= v.as_str()));
    eq && neq && one_of && gte
}

/// Numbers compare numerically, everything else as text; nulls sort last.
fn compare_column(a: &Value, b: &Value, column: &str, ascending: bool) -> Ordering {
    let (a, b) = (a.get(column), b.get(column));
    fn present(v: Option<&Value>) -> Option<&Value> {
        v.filter(|v| !v.is_null())
    }
    match (present(a), present(b)) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => {
            let ord = match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
                _ => value_to_string(a).cmp(&value_to_string(b)),
            };
            if ascending {
                ord
            } else {
                ord.reverse()
            }
        }
    }
}

#[async_trait]
impl RecordSource for FixtureStore {
    fn name(&self) -> &'static str {
        "fixture"
    }

    async fn fetch_rows(&self, table: &str, opts: &QueryOpts) -> Result<Vec<Value>> {
        validate_identifier(table, table)?;
        for column in opts.columns() {
            validate_identifier(table, column)?;
        }

        let rows = self
            .tables
            .get(table)
            .ok_or_else(|| FactoryError::SourceUnavailable(table.to_string()))?;

        let mut out: Vec<Value> = rows.iter().filter(|r| row_matches(r, opts)).cloned().collect();
        if let Some(order) = &opts.order {
            out.sort_by(|a, b| compare_column(a, b, &order.column, order.ascending));
        }
        if let Some(limit) = opts.limit {
            out.truncate(usize::try_from(limit.max(0)).unwrap_or(0));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store() -> FixtureStore {
        FixtureStore::from_value(json!({
            "opportunities": [
                {"name": "a", "score": 9},
                {"name": "b", "score": 22},
                {"name": "c", "score": null},
                {"name": "d", "score": 15}
            ],
            "factory_tasks": [
                {"id": 1, "status": "queued", "created_at": "2026-03-08T10:00:00Z"},
                {"id": 2, "status": "running", "created_at": "2026-03-09T10:00:00Z"},
                {"id": 3, "created_at": "2026-03-09T11:00:00Z"}
            ]
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn orders_numbers_numerically_and_limits() {
        let rows = store()
            .fetch_rows("opportunities", &QueryOpts::new().order_desc("score").limit(3))
            .await
            .unwrap();
        let names: Vec<_> = rows.iter().map(|r| r["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["b", "d", "a"]);
    }

    #[tokio::test]
    async fn nulls_sort_last_in_both_directions() {
        let store = store();
        for opts in [QueryOpts::new().order_asc("score"), QueryOpts::new().order_desc("score")] {
            let rows = store.fetch_rows("opportunities", &opts).await.unwrap();
            assert_eq!(rows.len(), 4);
            assert_eq!(rows[3]["name"], "c");
        }
        let rows = store
            .fetch_rows("opportunities", &QueryOpts::new().order_asc("score"))
            .await
            .unwrap();
        assert_eq!(rows[0]["name"], "a");
    }

    #[tokio::test]
    async fn applies_text_filters() {
        let store = store();
        let today = store
            .fetch_rows("factory_tasks", &QueryOpts::new().gte("created_at", "2026-03-09"))
            .await
            .unwrap();
        assert_eq!(today.len(), 2);

        let not_queued = store
            .fetch_rows("factory_tasks", &QueryOpts::new().neq("status", "queued"))
            .await
            .unwrap();
        assert_eq!(not_queued.len(), 1);

        let ids = store
            .fetch_rows("factory_tasks", &QueryOpts::new().one_of("id", &["1", "3"]))
            .await
            .unwrap();
        assert_eq!(ids.len(), 2);
    }

    #[tokio::test]
    async fn missing_set_is_an_error() {
        let err = store()
            .fetch_rows("v3_positions", &QueryOpts::new())
            .await
            .unwrap_err();
        assert!(matches!(err, FactoryError::SourceUnavailable(_)));
    }

    #[test]
    fn rejects_non_object_root() {
        assert!(FixtureStore::from_value(json!([1, 2])).is_err());
        assert!(FixtureStore::from_value(json!({"products": {}})).is_err());
    }
}
