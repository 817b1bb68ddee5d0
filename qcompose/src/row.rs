use std::collections::BTreeMap;

use crate::column::{Column, ColumnRef};
use crate::ty::ColumnType;
use crate::value::Value;
use crate::{QError, QResult, Table};

/// `(table, column)`, so that joined tables sharing column names don't collide.
type Key = (&'static str, &'static str);

///
/// One result (or stored) row, keyed by table and column name.
///
/// A row of a joined select holds the columns of every joined table.
///
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Row {
    values: BTreeMap<Key, Value>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style typed insertion.
    pub fn with<T, V>(mut self, column: Column<T, V>, value: V) -> Self
    where
        T: Table,
        V: ColumnType,
    {
        self.set(column.column_ref(), value.into_value());
        self
    }

    pub fn set(&mut self, column: ColumnRef, value: Value) {
        self.values.insert((column.table, column.name), value);
    }

    pub fn value(&self, column: &ColumnRef) -> Option<&Value> {
        self.values.get(&(column.table, column.name))
    }

    /// Typed read of a column value.
    pub fn get<T, V>(&self, column: Column<T, V>) -> QResult<V>
    where
        T: Table,
        V: ColumnType,
    {
        let value = self.require(column.column_ref())?;

        V::from_value(value.clone()).ok_or(QError::Decode {
            column: column.name(),
            expected: V::KIND.name(),
        })
    }

    ///
    /// Typed read that maps `NULL` to `None`.
    ///
    /// Needed for columns of an outer-joined table, which read as `NULL`
    /// when no row matched even if the column itself is non-null.
    ///
    pub fn get_optional<T, V>(&self, column: Column<T, V>) -> QResult<Option<V>>
    where
        T: Table,
        V: ColumnType,
    {
        match self.require(column.column_ref())? {
            Value::Null => Ok(None),
            value => V::from_value(value.clone())
                .map(Some)
                .ok_or(QError::Decode {
                    column: column.name(),
                    expected: V::KIND.name(),
                }),
        }
    }

    fn require(&self, column: ColumnRef) -> QResult<&Value> {
        self.value(&column)
            .ok_or(QError::MissingColumn(column.name))
    }

    /// Keep only the given columns. Missing ones read as `NULL`.
    pub fn project(&self, columns: &[ColumnRef]) -> Row {
        let values = columns
            .iter()
            .map(|column| {
                let value = self.value(column).cloned();
                ((column.table, column.name), value.unwrap_or(Value::Null))
            })
            .collect();

        Row { values }
    }

    /// Merge in the columns of `other`, e.g. a joined row.
    pub fn merge(&mut self, other: &Row) {
        self.values
            .extend(other.values.iter().map(|(key, value)| (*key, value.clone())));
    }

    /// Values in `(table, column)` name order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &'static str, &Value)> {
        self.values
            .iter()
            .map(|((table, name), value)| (*table, *name, value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Types that can be materialized from a result row.
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> QResult<Self>;
}

impl FromRow for Row {
    fn from_row(row: &Row) -> QResult<Self> {
        Ok(row.clone())
    }
}

/// Types that can be stored as a row of their table.
pub trait IntoRow {
    type Table: Table;

    fn into_row(self) -> Row;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::db::{Member, Team};

    #[test]
    fn same_column_name_in_two_tables() {
        let mut row = Row::new().with(Member::id(), 1);
        row.merge(&Row::new().with(Team::id(), 2));

        assert_eq!(row.get(Member::id()).unwrap(), 1);
        assert_eq!(row.get(Team::id()).unwrap(), 2);
        assert_eq!(row.len(), 2);
    }

    #[test]
    fn optional_read_of_outer_joined_null() {
        let mut row = Row::new();
        row.set(Team::name().column_ref(), Value::Null);

        assert!(matches!(row.get(Team::name()), Err(QError::Decode { .. })));
        assert_eq!(row.get_optional(Team::name()).unwrap(), None);
        assert!(matches!(
            row.get_optional(Team::id()),
            Err(QError::MissingColumn("id"))
        ));
    }

    #[test]
    fn projection_fills_missing_columns_with_null() {
        let row = Row::new().with(Member::age(), 10);
        let projected = row.project(&[Member::username().column_ref(), Member::age().column_ref()]);

        assert_eq!(projected.value(&Member::username().column_ref()), Some(&Value::Null));
        assert_eq!(projected.get(Member::age()).unwrap(), 10);
    }
}
