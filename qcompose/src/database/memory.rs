//!
//! In-process engine, evaluating statements directly against stored rows.
//!

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::aggregate::{Aggregate, AggregateFn, Output, Tuple};
use crate::column::ColumnRef;
use crate::engine::Engine;
use crate::join::{Join, JoinKind};
use crate::order;
use crate::predicate::Predicate;
use crate::query::Select;
use crate::row::{IntoRow, Row};
use crate::ty::Kind;
use crate::update::{Delete, Update};
use crate::value::Value;
use crate::{Instance, QError, QResult, Table};

type Tables = HashMap<&'static str, Vec<Row>>;

///
/// Tables of rows kept in memory.
///
/// Filtering follows SQL semantics: a row is kept only when the
/// predicate evaluates to true, never when it is unknown.
///
#[derive(Default)]
pub struct MemoryEngine {
    tables: RwLock<Tables>,
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_table<T: Table + Instance>(&self) {
        self.tables
            .write()
            .entry(T::instance().name())
            .or_insert_with(Vec::new);
    }

    /// Store a row in `T`, creating the table if needed.
    ///
    /// The row is normalized to the columns of `T`: unknown values are
    /// dropped and missing ones are stored as `NULL`.
    pub fn insert<T: Table + Instance>(&self, row: Row) {
        let table = T::instance();
        let row = row.project(table.columns());

        self.tables
            .write()
            .entry(table.name())
            .or_insert_with(Vec::new)
            .push(row);
    }

    pub fn persist<E>(&self, entity: E)
    where
        E: IntoRow,
        E::Table: Instance,
    {
        self.insert::<E::Table>(entity.into_row());
    }

    fn select_rows<T: Table + Instance>(&self, select: &Select<T>) -> QResult<Vec<Row>> {
        let mut referenced = select.projection().to_vec();
        referenced.extend(predicate_columns(select.predicate()));
        referenced.extend(select.orders().iter().flat_map(|order| order.expr.columns()));
        check_scope(&select.tables(), &referenced)?;

        let tables = self.tables.read();
        let mut selected = filtered_rows(&tables, select.table_name(), select.joins(), select.predicate())?;

        // Stable, so ties keep insertion order
        selected.sort_by(|lhs, rhs| order::compare_rows(select.orders(), lhs, rhs));

        let offset = select.offset_rows().unwrap_or(0) as usize;
        let limit = select.limit_rows().map_or(usize::MAX, |limit| limit as usize);

        Ok(selected
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|row| row.project(select.projection()))
            .collect())
    }

    fn count_rows<T: Table + Instance>(&self, select: &Select<T>) -> QResult<u64> {
        check_scope(&select.tables(), &predicate_columns(select.predicate()))?;

        let tables = self.tables.read();
        let rows = filtered_rows(&tables, select.table_name(), select.joins(), select.predicate())?;

        Ok(rows.len() as u64)
    }

    fn aggregate_rows<T: Table + Instance>(&self, aggregate: &Aggregate<T>) -> QResult<Vec<Tuple>> {
        let grouping = aggregate.grouping();
        let outputs = aggregate.outputs();

        let mut referenced = grouping.to_vec();
        referenced.extend(predicate_columns(aggregate.predicate()));
        for output in outputs {
            match output {
                Output::Column(column) if !grouping.contains(column) => {
                    return Err(QError::Ungrouped(column.name));
                }
                Output::Column(column) | Output::Aggregate(_, column) => referenced.push(*column),
                Output::CountAll => {}
            }
        }
        check_scope(&aggregate.tables(), &referenced)?;

        let tables = self.tables.read();
        let rows = filtered_rows(
            &tables,
            aggregate.table_name(),
            aggregate.joins(),
            aggregate.predicate(),
        )?;

        let mut groups: Vec<(Vec<Value>, Vec<Row>)> = Vec::new();
        if grouping.is_empty() {
            // One group, even over no rows
            groups.push((vec![], rows));
        } else {
            for row in rows {
                let key: Vec<Value> = grouping
                    .iter()
                    .map(|column| row.value(column).cloned().unwrap_or(Value::Null))
                    .collect();

                match groups.iter_mut().find(|(group_key, _)| *group_key == key) {
                    Some((_, members)) => members.push(row),
                    None => groups.push((key, vec![row])),
                }
            }
            groups.sort_by(|(lhs, _), (rhs, _)| compare_keys(lhs, rhs));
        }

        groups
            .iter()
            .map(|(_, members)| {
                let values = outputs
                    .iter()
                    .map(|output| eval_output(output, members))
                    .collect::<QResult<Vec<_>>>()?;

                Ok(Tuple::new(outputs, values))
            })
            .collect()
    }

    fn update_rows<T: Table + Instance>(&self, update: &Update<T>) -> QResult<u64> {
        if update.assignments().is_empty() {
            return Err(QError::EmptyUpdate);
        }

        let mut tables = self.tables.write();
        let rows = tables
            .get_mut(update.table_name())
            .ok_or_else(|| QError::UnknownTable(update.table_name()))?;

        // Every new value is computed and checked before any row is written,
        // so a failing update leaves the table untouched.
        let mut changes = Vec::new();
        for (idx, row) in rows.iter().enumerate() {
            if !keeps(update.predicate(), row) {
                continue;
            }

            // Each assignment sees the row as it was before the update
            let values = update
                .assignments()
                .iter()
                .map(|(column, expr)| {
                    let value = expr.eval_checked(row).ok_or(QError::OutOfRange {
                        column: column.name,
                        kind: column.kind.name(),
                    })?;
                    check_assignable(column, &value)?;
                    Ok((*column, value))
                })
                .collect::<QResult<Vec<_>>>()?;

            changes.push((idx, values));
        }

        let affected = changes.len() as u64;
        for (idx, values) in changes {
            if let Some(row) = rows.get_mut(idx) {
                for (column, value) in values {
                    row.set(column, value);
                }
            }
        }

        Ok(affected)
    }

    fn delete_rows<T: Table + Instance>(&self, delete: &Delete<T>) -> QResult<u64> {
        let mut tables = self.tables.write();
        let rows = tables
            .get_mut(delete.table_name())
            .ok_or_else(|| QError::UnknownTable(delete.table_name()))?;

        let before = rows.len();
        rows.retain(|row| !keeps(delete.predicate(), row));

        Ok((before - rows.len()) as u64)
    }
}

#[async_trait]
impl Engine for MemoryEngine {
    async fn fetch<T>(&self, select: &Select<T>) -> QResult<Vec<Row>>
    where
        T: Table + Instance,
    {
        let rows = self.select_rows(select)?;
        tracing::debug!(table = select.table_name(), rows = rows.len(), "fetch");
        Ok(rows)
    }

    async fn fetch_count<T>(&self, select: &Select<T>) -> QResult<u64>
    where
        T: Table + Instance,
    {
        let count = self.count_rows(select)?;
        tracing::debug!(table = select.table_name(), count, "fetch count");
        Ok(count)
    }

    async fn fetch_aggregate<T>(&self, aggregate: &Aggregate<T>) -> QResult<Vec<Tuple>>
    where
        T: Table + Instance,
    {
        let tuples = self.aggregate_rows(aggregate)?;
        tracing::debug!(table = aggregate.table_name(), groups = tuples.len(), "fetch aggregate");
        Ok(tuples)
    }

    async fn execute_update<T>(&self, update: &Update<T>) -> QResult<u64>
    where
        T: Table + Instance,
    {
        let affected = self.update_rows(update)?;
        tracing::debug!(table = update.table_name(), affected, "bulk update");
        Ok(affected)
    }

    async fn execute_delete<T>(&self, delete: &Delete<T>) -> QResult<u64>
    where
        T: Table + Instance,
    {
        let affected = self.delete_rows(delete)?;
        tracing::debug!(table = delete.table_name(), affected, "bulk delete");
        Ok(affected)
    }
}

fn table_rows<'t>(tables: &'t Tables, name: &'static str) -> QResult<&'t [Row]> {
    tables
        .get(name)
        .map(Vec::as_slice)
        .ok_or(QError::UnknownTable(name))
}

///
/// Rows of `root` with every join applied, then filtered by `predicate`.
///
/// An inner join keeps one merged row per matching pair. A left join
/// also keeps unmatched rows, padded with `NULL` for the joined table.
///
fn filtered_rows(
    tables: &Tables,
    root: &'static str,
    joins: &[Join],
    predicate: Option<&Predicate>,
) -> QResult<Vec<Row>> {
    let mut rows = table_rows(tables, root)?.to_vec();

    for join in joins {
        let table = join.table();
        let candidates = table_rows(tables, table.name())?;

        let mut joined = Vec::with_capacity(rows.len());
        for row in rows {
            let before = joined.len();
            for candidate in candidates {
                let mut merged = row.clone();
                merged.merge(candidate);
                if join.on().matches(&merged) {
                    joined.push(merged);
                }
            }

            if joined.len() == before && join.kind() == JoinKind::Left {
                let mut padded = row;
                for column in table.columns() {
                    padded.set(*column, Value::Null);
                }
                joined.push(padded);
            }
        }
        rows = joined;
    }

    Ok(rows
        .into_iter()
        .filter(|row| keeps(predicate, row))
        .collect())
}

fn keeps(predicate: Option<&Predicate>, row: &Row) -> bool {
    predicate.map_or(true, |predicate| predicate.matches(row))
}

fn predicate_columns(predicate: Option<&Predicate>) -> Vec<ColumnRef> {
    predicate.map(Predicate::columns).unwrap_or_default()
}

fn check_scope(scope: &[&'static str], columns: &[ColumnRef]) -> QResult<()> {
    match columns.iter().find(|column| !scope.contains(&column.table)) {
        Some(column) => Err(QError::TableNotInScope(column.table)),
        None => Ok(()),
    }
}

/// What the database would refuse to store in `column`.
fn check_assignable(column: &ColumnRef, value: &Value) -> QResult<()> {
    match value {
        Value::Null if column.nullable => Ok(()),
        Value::Null => Err(QError::NotNull(column.name)),
        value if column.kind.admits(value) => Ok(()),
        Value::Int(_) if column.kind == Kind::Int32 => Err(QError::OutOfRange {
            column: column.name,
            kind: column.kind.name(),
        }),
        value => Err(QError::TypeMismatch {
            column: column.name,
            found: value.kind_name(),
        }),
    }
}

/// Group keys ascend, `NULL` last.
fn compare_keys(lhs: &[Value], rhs: &[Value]) -> Ordering {
    lhs.iter()
        .zip(rhs)
        .map(|(lhs, rhs)| match (lhs.is_null(), rhs.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => lhs.sql_cmp(rhs).unwrap_or(Ordering::Equal),
        })
        .find(|ordering| *ordering != Ordering::Equal)
        .unwrap_or(Ordering::Equal)
}

fn eval_output(output: &Output, rows: &[Row]) -> QResult<Value> {
    let column = match output {
        Output::Column(column) => {
            return Ok(rows
                .first()
                .and_then(|row| row.value(column))
                .cloned()
                .unwrap_or(Value::Null));
        }
        Output::CountAll => return Ok(Value::Int(rows.len() as i64)),
        Output::Aggregate(_, column) => column,
    };

    let values: Vec<&Value> = rows
        .iter()
        .filter_map(|row| row.value(column))
        .filter(|value| !value.is_null())
        .collect();

    match output {
        Output::Aggregate(AggregateFn::Count, _) => Ok(Value::Int(values.len() as i64)),
        Output::Aggregate(AggregateFn::Sum, _) => sum(column, &values),
        Output::Aggregate(AggregateFn::Avg, _) => average(column, &values),
        Output::Aggregate(AggregateFn::Min, _) => Ok(extreme(&values, Ordering::Less)),
        _ => Ok(extreme(&values, Ordering::Greater)),
    }
}

fn sum(column: &ColumnRef, values: &[&Value]) -> QResult<Value> {
    if values.is_empty() {
        return Ok(Value::Null);
    }

    if column.kind == Kind::Float64 {
        return Ok(Value::Float(
            values.iter().map(|value| as_number(column, value)).sum::<QResult<f64>>()?,
        ));
    }

    let mut total: i64 = 0;
    for value in values {
        total = match value {
            Value::Int(value) => total.checked_add(*value).ok_or(QError::OutOfRange {
                column: column.name,
                kind: Kind::Int64.name(),
            })?,
            value => {
                return Err(QError::TypeMismatch {
                    column: column.name,
                    found: value.kind_name(),
                })
            }
        };
    }

    Ok(Value::Int(total))
}

fn average(column: &ColumnRef, values: &[&Value]) -> QResult<Value> {
    if values.is_empty() {
        return Ok(Value::Null);
    }

    let total = values
        .iter()
        .map(|value| as_number(column, value))
        .sum::<QResult<f64>>()?;

    Ok(Value::Float(total / values.len() as f64))
}

fn as_number(column: &ColumnRef, value: &Value) -> QResult<f64> {
    match value {
        Value::Int(value) => Ok(*value as f64),
        Value::Float(value) => Ok(*value),
        value => Err(QError::TypeMismatch {
            column: column.name,
            found: value.kind_name(),
        }),
    }
}

/// The least (`Less`) or greatest (`Greater`) value. `NULL` for no values.
fn extreme(values: &[&Value], wanted: Ordering) -> Value {
    values
        .iter()
        .fold(None::<&Value>, |best, value| match best {
            Some(best) if value.sql_cmp(best) != Some(wanted) => Some(best),
            _ => Some(*value),
        })
        .cloned()
        .unwrap_or(Value::Null)
}
