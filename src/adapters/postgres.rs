use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::{PgPool, PgPoolOptions, Postgres};
use sqlx::{QueryBuilder, Row};
use tracing::{debug, info, instrument};

use crate::adapters::source::{validate_identifier, QueryOpts, RecordSource};
use crate::error::Result;

/// PostgreSQL storage adapter
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Pool whose connections open on first read, so the server starts while the database is down.
    pub fn connect_lazy(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect_lazy(database_url)?;

        info!("PostgreSQL pool configured (lazy)");
        Ok(Self { pool })
    }
}

/// Build `SELECT to_jsonb(t) ... ` for one record-set read.
///
/// Identifiers are validated, values are always bound.
fn build_select<'a>(table: &str, opts: &'a QueryOpts) -> Result<QueryBuilder<'a, Postgres>> {
    let table_ident = validate_identifier(table, table)?;
    for column in opts.columns() {
        validate_identifier(table, column)?;
    }

    let mut qb = QueryBuilder::<Postgres>::new("SELECT to_jsonb(t) AS row FROM ");
    qb.push(table_ident).push(" t WHERE 1=1");

    for (column, value) in &opts.eq {
        qb.push(" AND t.")
            .push(column)
            .push("::text = ")
            .push_bind(value.as_str());
    }
    for (column, value) in &opts.neq {
        qb.push(" AND t.")
            .push(column)
            .push("::text <> ")
            .push_bind(value.as_str());
    }
    for (column, values) in &opts.one_of {
        qb.push(" AND t.")
            .push(column)
            .push("::text = ANY(")
            .push_bind(values.clone())
            .push(")");
    }
    for (column, value) in &opts.gte {
        qb.push(" AND t.")
            .push(column)
            .push("::text >= ")
            .push_bind(value.as_str());
    }
    if let Some(order) = &opts.order {
        qb.push(" ORDER BY t.")
            .push(&order.column)
            .push(if order.ascending {
                " ASC NULLS LAST"
            } else {
                " DESC NULLS LAST"
            });
    }
    if let Some(limit) = opts.limit {
        qb.push(" LIMIT ").push_bind(limit);
    }

    Ok(qb)
}

#[async_trait]
impl RecordSource for PostgresStore {
    fn name(&self) -> &'static str {
        "postgres"
    }

    #[instrument(skip(self, opts))]
    async fn fetch_rows(&self, table: &str, opts: &QueryOpts) -> Result<Vec<Value>> {
        let mut qb = build_select(table, opts)?;
        let rows = qb.build().fetch_all(&self.pool).await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(row.try_get::<Value, _>("row")?);
        }
        debug!(rows = out.len(), "record set read");
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_binds_every_filter() {
        let opts = QueryOpts::new()
            .eq("agent", "alfred")
            .neq("status", "cancelled")
            .one_of("edge", &["arb", "momentum"])
            .gte("created_at", "2026-03-09")
            .order_desc("created_at")
            .limit(500);

        let qb = build_select("token_usage", &opts).unwrap();
        assert_eq!(
            qb.sql(),
            "SELECT to_jsonb(t) AS row FROM token_usage t WHERE 1=1 \
             AND t.agent::text = $1 AND t.status::text <> $2 \
             AND t.edge::text = ANY($3) AND t.created_at::text >= $4 \
             ORDER BY t.created_at DESC NULLS LAST LIMIT $5"
        );
    }

    #[test]
    fn select_without_options_reads_whole_set() {
        let opts = QueryOpts::new();
        let qb = build_select("factory_policy", &opts).unwrap();
        assert_eq!(
            qb.sql(),
            "SELECT to_jsonb(t) AS row FROM factory_policy t WHERE 1=1"
        );
    }

    #[test]
    fn select_rejects_bad_identifiers() {
        let opts = QueryOpts::new().order_desc("created_at desc; --");
        assert!(build_select("factory_tasks", &opts).is_err());
        assert!(build_select("factory tasks", &QueryOpts::new()).is_err());
    }
}
