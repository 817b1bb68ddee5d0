//!
//! Aggregate selects, optionally grouped.
//!
//! ```ignore
//! aggregate::<Member>()
//!     .join::<Team>(Member::team_id().eq_column(Team::id()))
//!     .group_by(Team::name())
//!     .output(Team::name())
//!     .output(Member::age().avg())
//! ```
//!

use crate::builder::{QueryBuilder, Statement};
use crate::column::{Column, ColumnRef};
use crate::filter::Filter;
use crate::join::{self, Join};
use crate::logic;
use crate::predicate::Predicate;
use crate::query::build_where;
use crate::ty::{ColumnType, Kind};
use crate::value::Value;
use crate::{Instance, QError, QResult, Table};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AggregateFn {
    /// Non-null values
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

impl AggregateFn {
    pub fn name(self) -> &'static str {
        match self {
            AggregateFn::Count => "count",
            AggregateFn::Sum => "sum",
            AggregateFn::Avg => "avg",
            AggregateFn::Min => "min",
            AggregateFn::Max => "max",
        }
    }

    fn sql(self) -> &'static str {
        match self {
            AggregateFn::Count => "COUNT",
            AggregateFn::Sum => "SUM",
            AggregateFn::Avg => "AVG",
            AggregateFn::Min => "MIN",
            AggregateFn::Max => "MAX",
        }
    }
}

/// One output column of an aggregate select.
#[derive(Clone, Debug, PartialEq)]
pub enum Output {
    /// A grouping column, read as is.
    Column(ColumnRef),
    /// `COUNT(*)`
    CountAll,
    Aggregate(AggregateFn, ColumnRef),
}

impl Output {
    pub fn label(&self) -> &'static str {
        match self {
            Output::Column(column) => column.name,
            Output::CountAll => "count",
            Output::Aggregate(func, _) => func.name(),
        }
    }

    ///
    /// Kind of the produced values.
    ///
    /// Integer sums are widened to `int8` and averages are always `float8`,
    /// whatever the column kind.
    ///
    pub fn kind(&self) -> Kind {
        match self {
            Output::Column(column) => column.kind,
            Output::CountAll | Output::Aggregate(AggregateFn::Count, _) => Kind::Int64,
            Output::Aggregate(AggregateFn::Sum, column) => match column.kind {
                Kind::Float64 => Kind::Float64,
                _ => Kind::Int64,
            },
            Output::Aggregate(AggregateFn::Avg, _) => Kind::Float64,
            Output::Aggregate(_, column) => column.kind,
        }
    }

    pub fn build(&self, builder: &mut QueryBuilder) {
        match self {
            Output::Column(column) => push_column(builder, column),
            Output::CountAll => builder.push("COUNT(*)"),
            Output::Aggregate(func, column) => {
                builder.push(func.sql());
                builder.push("(");
                push_column(builder, column);
                builder.push(")");

                match (*func, self.kind()) {
                    (AggregateFn::Sum, Kind::Int64) => builder.push("::int8"),
                    (AggregateFn::Avg, _) => builder.push("::float8"),
                    _ => {}
                }
            }
        }
    }
}

impl<T, V> From<Column<T, V>> for Output
where
    T: Table,
    V: ColumnType,
{
    fn from(column: Column<T, V>) -> Self {
        Output::Column(column.column_ref())
    }
}

fn push_column(builder: &mut QueryBuilder, column: &ColumnRef) {
    builder.push(column.table);
    builder.push(".");
    builder.push(column.name);
}

fn push_column_list(builder: &mut QueryBuilder, keyword: &str, columns: &[ColumnRef]) {
    builder.newline();
    builder.push(keyword);
    for (idx, column) in columns.iter().enumerate() {
        if idx > 0 {
            builder.push(", ");
        }
        push_column(builder, column);
    }
}

pub struct Aggregate<T> {
    outputs: Vec<Output>,
    joins: Vec<Join>,
    predicate: Option<Predicate>,
    group_by: Vec<ColumnRef>,
    table: std::marker::PhantomData<T>,
}

/// Aggregate over the rows of `T`.
pub fn aggregate<T>() -> Aggregate<T>
where
    T: Table + Instance,
{
    Aggregate {
        outputs: vec![],
        joins: vec![],
        predicate: None,
        group_by: vec![],
        table: std::marker::PhantomData,
    }
}

impl<T> Aggregate<T>
where
    T: Table + Instance,
{
    pub fn output(mut self, output: impl Into<Output>) -> Self {
        self.outputs.push(output.into());
        self
    }

    /// Output `COUNT(*)`.
    pub fn count(self) -> Self {
        self.output(Output::CountAll)
    }

    pub fn join<J>(mut self, on: Predicate) -> Self
    where
        J: Table + Instance,
    {
        self.joins.push(Join::inner::<J>(on));
        self
    }

    pub fn left_join<J>(mut self, on: Predicate) -> Self
    where
        J: Table + Instance,
    {
        self.joins.push(Join::left::<J>(on));
        self
    }

    /// Group by `column`. Groups come out ordered by their grouping columns.
    pub fn group_by<T2, V>(mut self, column: Column<T2, V>) -> Self
    where
        T2: Table,
        V: ColumnType,
    {
        self.group_by.push(column.column_ref());
        self
    }

    pub fn table_name(&self) -> &'static str {
        T::instance().name()
    }

    pub fn tables(&self) -> Vec<&'static str> {
        join::tables_in_scope(self.table_name(), &self.joins)
    }

    pub fn outputs(&self) -> &[Output] {
        &self.outputs
    }

    pub fn joins(&self) -> &[Join] {
        &self.joins
    }

    pub fn predicate(&self) -> Option<&Predicate> {
        self.predicate.as_ref()
    }

    pub fn grouping(&self) -> &[ColumnRef] {
        &self.group_by
    }

    pub fn build(&self) -> Statement {
        let mut builder = QueryBuilder::new();

        builder.push("SELECT");
        builder.newline_indent();
        for (idx, output) in self.outputs.iter().enumerate() {
            if idx > 0 {
                builder.push(", ");
            }
            output.build(&mut builder);
        }
        builder.newline_outdent();

        join::build_from(&mut builder, self.table_name(), &self.joins);
        build_where(&mut builder, self.predicate.as_ref());

        if !self.group_by.is_empty() {
            push_column_list(&mut builder, "GROUP BY ", &self.group_by);
            push_column_list(&mut builder, "ORDER BY ", &self.group_by);
        }

        builder.build()
    }
}

impl<T> Filter for Aggregate<T> {
    type Output = Self;

    fn filter(mut self, predicate: impl Into<Option<Predicate>>) -> Self {
        self.predicate = logic::and(self.predicate.take(), predicate.into());
        self
    }
}

impl<T> std::fmt::Debug for Aggregate<T> {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        fmt.debug_struct("Aggregate")
            .field("outputs", &self.outputs)
            .field("joins", &self.joins)
            .field("predicate", &self.predicate)
            .field("group_by", &self.group_by)
            .finish()
    }
}

/// One result row of an aggregate select, in output order.
#[derive(Clone, Debug, PartialEq)]
pub struct Tuple {
    labels: Vec<&'static str>,
    values: Vec<Value>,
}

impl Tuple {
    pub fn new(outputs: &[Output], values: Vec<Value>) -> Self {
        Self {
            labels: outputs.iter().map(Output::label).collect(),
            values,
        }
    }

    pub fn value(&self, idx: usize) -> Option<&Value> {
        self.values.get(idx)
    }

    /// Typed read of output `idx`.
    pub fn get<V: ColumnType>(&self, idx: usize) -> QResult<V> {
        let value = self.values.get(idx).ok_or(QError::MissingOutput(idx))?;
        let label = self.labels.get(idx).copied().unwrap_or("?");

        V::from_value(value.clone()).ok_or(QError::Decode {
            column: label,
            expected: V::KIND.name(),
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::db::{Member, Team};

    #[test]
    fn ungrouped_aggregates() {
        let statement = aggregate::<Member>()
            .count()
            .output(Member::age().sum())
            .output(Member::age().avg())
            .output(Member::age().max())
            .output(Member::username().count())
            .build();

        assert_eq!(
            statement.sql,
            "SELECT\n COUNT(*), SUM(member.age)::int8, AVG(member.age)::float8, MAX(member.age), COUNT(member.username)\nFROM member"
        );
    }

    #[test]
    fn grouped_by_joined_column() {
        let statement = aggregate::<Member>()
            .join::<Team>(Member::team_id().eq_column(Team::id()))
            .filter(Member::age().gt(0))
            .group_by(Team::name())
            .output(Team::name())
            .output(Member::age().avg())
            .build();

        assert_eq!(
            statement.sql,
            "SELECT\n team.name, AVG(member.age)::float8\nFROM member\nINNER JOIN team ON member.team_id = team.id\nWHERE\n member.age > $1\nGROUP BY team.name\nORDER BY team.name"
        );
    }

    #[test]
    fn output_kinds() {
        assert_eq!(Member::age().sum().kind(), Kind::Int64);
        assert_eq!(Member::age().avg().kind(), Kind::Float64);
        assert_eq!(Member::age().min().kind(), Kind::Int32);
        assert_eq!(Output::CountAll.kind(), Kind::Int64);
    }

    #[test]
    fn tuple_reads_by_position() {
        let outputs = [Output::CountAll, Member::age().avg()];
        let tuple = Tuple::new(&outputs, vec![Value::Int(4), Value::Float(25.0)]);

        assert_eq!(tuple.get::<i64>(0).unwrap(), 4);
        assert_eq!(tuple.get::<f64>(1).unwrap(), 25.0);
        assert!(matches!(
            tuple.get::<String>(1),
            Err(QError::Decode { column: "avg", .. })
        ));
        assert!(matches!(tuple.get::<i64>(2), Err(QError::MissingOutput(2))));
    }
}
