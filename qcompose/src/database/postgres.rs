use async_trait::async_trait;
use sqlx::postgres::{PgArguments, PgPool, PgPoolOptions, PgRow};
use sqlx::{Arguments, Row as _};

use crate::aggregate::{Aggregate, Tuple};
use crate::builder::Statement;
use crate::column::ColumnRef;
use crate::engine::Engine;
use crate::query::Select;
use crate::row::Row;
use crate::settings::Settings;
use crate::ty::Kind;
use crate::update::{Delete, Update};
use crate::value::Value;
use crate::{Instance, QResult, Table};

/// Engine executing statements on PostgreSQL through a `sqlx` pool.
#[derive(Clone, Debug)]
pub struct PgEngine {
    pool: PgPool,
}

impl PgEngine {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(settings: &Settings) -> QResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .connect(&settings.database_url)
            .await?;

        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn execute(&self, statement: Statement) -> QResult<u64> {
        tracing::debug!(sql = %statement.sql, params = statement.params.len(), "execute");

        let result = sqlx::query_with(&statement.sql, arguments(&statement.params))
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl Engine for PgEngine {
    async fn fetch<T>(&self, select: &Select<T>) -> QResult<Vec<Row>>
    where
        T: Table + Instance,
    {
        let statement = select.build();
        tracing::debug!(sql = %statement.sql, params = statement.params.len(), "fetch");

        let pg_rows = sqlx::query_with(&statement.sql, arguments(&statement.params))
            .fetch_all(&self.pool)
            .await?;

        pg_rows
            .iter()
            .map(|pg_row| decode(pg_row, select.projection()))
            .collect()
    }

    async fn fetch_count<T>(&self, select: &Select<T>) -> QResult<u64>
    where
        T: Table + Instance,
    {
        let statement = select.build_count();
        tracing::debug!(sql = %statement.sql, params = statement.params.len(), "fetch count");

        let pg_row = sqlx::query_with(&statement.sql, arguments(&statement.params))
            .fetch_one(&self.pool)
            .await?;
        let count: i64 = pg_row.try_get(0usize)?;

        Ok(count.max(0) as u64)
    }

    async fn fetch_aggregate<T>(&self, aggregate: &Aggregate<T>) -> QResult<Vec<Tuple>>
    where
        T: Table + Instance,
    {
        let statement = aggregate.build();
        tracing::debug!(sql = %statement.sql, params = statement.params.len(), "fetch aggregate");

        let pg_rows = sqlx::query_with(&statement.sql, arguments(&statement.params))
            .fetch_all(&self.pool)
            .await?;

        pg_rows
            .iter()
            .map(|pg_row| {
                let values = aggregate
                    .outputs()
                    .iter()
                    .enumerate()
                    .map(|(idx, output)| decode_value(pg_row, idx, output.kind()))
                    .collect::<QResult<Vec<_>>>()?;

                Ok(Tuple::new(aggregate.outputs(), values))
            })
            .collect()
    }

    async fn execute_update<T>(&self, update: &Update<T>) -> QResult<u64>
    where
        T: Table + Instance,
    {
        self.execute(update.build()?).await
    }

    async fn execute_delete<T>(&self, delete: &Delete<T>) -> QResult<u64>
    where
        T: Table + Instance,
    {
        self.execute(delete.build()).await
    }
}

fn arguments(params: &[Value]) -> PgArguments {
    let mut arguments = PgArguments::default();

    for param in params {
        match param {
            // The builder writes NULL inline, but stay total
            Value::Null => arguments.add(Option::<String>::None),
            Value::Bool(value) => arguments.add(*value),
            Value::Int(value) => arguments.add(*value),
            Value::Float(value) => arguments.add(*value),
            Value::Text(value) => arguments.add(value.clone()),
        }
    }

    arguments
}

fn decode(pg_row: &PgRow, columns: &[ColumnRef]) -> QResult<Row> {
    let mut row = Row::new();

    for (idx, column) in columns.iter().enumerate() {
        row.set(*column, decode_value(pg_row, idx, column.kind)?);
    }

    Ok(row)
}

fn decode_value(pg_row: &PgRow, idx: usize, kind: Kind) -> QResult<Value> {
    Ok(match kind {
        Kind::Bool => pg_row.try_get::<Option<bool>, _>(idx)?.into(),
        Kind::Int32 => pg_row.try_get::<Option<i32>, _>(idx)?.into(),
        Kind::Int64 => pg_row.try_get::<Option<i64>, _>(idx)?.into(),
        Kind::Float64 => pg_row.try_get::<Option<f64>, _>(idx)?.into(),
        Kind::Text => pg_row.try_get::<Option<String>, _>(idx)?.into(),
    })
}
