//!
//! Typed columns.
//!

use crate::aggregate::{AggregateFn, Output};
use crate::expr::{Expr, TypedExpr};
use crate::order::Order;
use crate::predicate::{CompareOp, Predicate};
use crate::ty::{ColumnType, Kind};
use crate::Table;

/// Untyped reference to a column of some table.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ColumnRef {
    pub table: &'static str,
    pub name: &'static str,
    pub kind: Kind,
    pub nullable: bool,
}

///
/// A column of table `T` holding values of Rust type `V`.
///
/// Columns are handed out by the accessors generated by `#[qcompose::table]`,
/// and are the starting point of every typed predicate:
///
/// ```ignore
/// Member::username().eq("member1") & Member::age().goe(10)
/// ```
///
pub struct Column<T, V> {
    column: ColumnRef,
    table: std::marker::PhantomData<T>,
    ty: std::marker::PhantomData<V>,
}

impl<T, V> Clone for Column<T, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, V> Copy for Column<T, V> {}

impl<T, V> std::fmt::Debug for Column<T, V> {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(fmt, "Column({}.{})", self.column.table, self.column.name)
    }
}

impl<T, V> Column<T, V>
where
    T: Table,
    V: ColumnType,
{
    pub fn from_ref(column: ColumnRef) -> Self {
        Self {
            column,
            table: std::marker::PhantomData,
            ty: std::marker::PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.column.name
    }

    pub fn column_ref(&self) -> ColumnRef {
        self.column
    }

    pub fn expr(&self) -> Expr {
        Expr::Column(self.column)
    }

    fn compare(&self, op: CompareOp, value: impl Into<V::Unit>) -> Predicate {
        Predicate::Compare(self.expr(), op, unit_expr::<V>(value.into()))
    }

    pub fn eq(&self, value: impl Into<V::Unit>) -> Predicate {
        self.compare(CompareOp::Eq, value)
    }

    pub fn ne(&self, value: impl Into<V::Unit>) -> Predicate {
        self.compare(CompareOp::Ne, value)
    }

    pub fn lt(&self, value: impl Into<V::Unit>) -> Predicate {
        self.compare(CompareOp::Lt, value)
    }

    /// Less than or equal.
    pub fn loe(&self, value: impl Into<V::Unit>) -> Predicate {
        self.compare(CompareOp::Loe, value)
    }

    pub fn gt(&self, value: impl Into<V::Unit>) -> Predicate {
        self.compare(CompareOp::Gt, value)
    }

    /// Greater than or equal.
    pub fn goe(&self, value: impl Into<V::Unit>) -> Predicate {
        self.compare(CompareOp::Goe, value)
    }

    /// Inclusive range.
    pub fn between(&self, low: impl Into<V::Unit>, high: impl Into<V::Unit>) -> Predicate {
        Predicate::Between(
            self.expr(),
            unit_expr::<V>(low.into()),
            unit_expr::<V>(high.into()),
        )
    }

    pub fn is_in<I, U>(&self, values: I) -> Predicate
    where
        I: IntoIterator<Item = U>,
        U: Into<V::Unit>,
    {
        Predicate::In(
            self.expr(),
            values
                .into_iter()
                .map(|value| unit_expr::<V>(value.into()))
                .collect(),
        )
    }

    pub fn is_null(&self) -> Predicate {
        Predicate::IsNull(self.expr())
    }

    pub fn is_not_null(&self) -> Predicate {
        Predicate::IsNotNull(self.expr())
    }

    /// Compare against another column of the same unit type, e.g. in a join condition.
    ///
    /// Nullability may differ: `member.team_id = team.id`.
    pub fn eq_column<T2, V2>(&self, other: Column<T2, V2>) -> Predicate
    where
        T2: Table,
        V2: ColumnType<Unit = V::Unit>,
    {
        Predicate::Compare(self.expr(), CompareOp::Eq, other.expr())
    }

    /// `column + delta`, for use in bulk updates.
    pub fn add(&self, delta: impl Into<V::Unit>) -> TypedExpr<V> {
        TypedExpr::new(Expr::Add(
            Box::new(self.expr()),
            Box::new(unit_expr::<V>(delta.into())),
        ))
    }

    /// `COUNT(column)`: the number of non-null values.
    pub fn count(&self) -> Output {
        Output::Aggregate(AggregateFn::Count, self.column)
    }

    /// `SUM(column)`, `NULL` over no values.
    pub fn sum(&self) -> Output {
        Output::Aggregate(AggregateFn::Sum, self.column)
    }

    pub fn avg(&self) -> Output {
        Output::Aggregate(AggregateFn::Avg, self.column)
    }

    pub fn min(&self) -> Output {
        Output::Aggregate(AggregateFn::Min, self.column)
    }

    pub fn max(&self) -> Output {
        Output::Aggregate(AggregateFn::Max, self.column)
    }

    pub fn asc(&self) -> Order {
        Order::asc(self.expr())
    }

    pub fn desc(&self) -> Order {
        Order::desc(self.expr())
    }
}

fn unit_expr<V: ColumnType>(unit: V::Unit) -> Expr {
    Expr::Value(unit.into())
}
