//!
//! Bulk update and delete statements.
//!
//! Both bypass any entity state held by the caller: rows are changed
//! directly in the database.
//!

use crate::builder::{QueryBuilder, Statement};
use crate::column::{Column, ColumnRef};
use crate::expr::{Expr, TypedExpr};
use crate::filter::Filter;
use crate::logic;
use crate::predicate::Predicate;
use crate::query::build_where;
use crate::ty::ColumnType;
use crate::value::Value;
use crate::{Instance, QError, QResult, Table};

pub struct Update<T> {
    assignments: Vec<(ColumnRef, Expr)>,
    predicate: Option<Predicate>,
    table: std::marker::PhantomData<T>,
}

pub fn update<T>() -> Update<T>
where
    T: Table + Instance,
{
    Update {
        assignments: vec![],
        predicate: None,
        table: std::marker::PhantomData,
    }
}

impl<T> Update<T>
where
    T: Table + Instance,
{
    /// `SET column = value`
    pub fn set<V: ColumnType>(self, column: Column<T, V>, value: impl Into<V::Unit>) -> Self {
        let unit: V::Unit = value.into();
        let value: Value = unit.into();
        self.assign(column.column_ref(), Expr::Value(value))
    }

    /// `SET column = NULL`
    pub fn set_null<V: ColumnType>(self, column: Column<T, Option<V>>) -> Self
    where
        Option<V>: ColumnType,
    {
        self.assign(column.column_ref(), Expr::Value(Value::Null))
    }

    /// `SET column = <expression>`, e.g. `Member::age().add(1)`, or another column of the same type.
    pub fn set_expr<V: ColumnType>(
        self,
        column: Column<T, V>,
        expr: impl Into<TypedExpr<V>>,
    ) -> Self {
        self.assign(column.column_ref(), expr.into().into_expr())
    }

    fn assign(mut self, column: ColumnRef, expr: Expr) -> Self {
        self.assignments.push((column, expr));
        self
    }

    pub fn table_name(&self) -> &'static str {
        T::instance().name()
    }

    pub fn assignments(&self) -> &[(ColumnRef, Expr)] {
        &self.assignments
    }

    pub fn predicate(&self) -> Option<&Predicate> {
        self.predicate.as_ref()
    }

    pub fn build(&self) -> QResult<Statement> {
        if self.assignments.is_empty() {
            return Err(QError::EmptyUpdate);
        }

        let mut builder = QueryBuilder::new();

        builder.push("UPDATE ");
        builder.push(self.table_name());
        builder.newline();
        builder.push("SET");
        builder.newline_indent();
        for (idx, (column, expr)) in self.assignments.iter().enumerate() {
            if idx > 0 {
                builder.push(",");
                builder.newline();
            }
            builder.push(column.name);
            builder.push(" = ");
            expr.build(&mut builder);
        }
        builder.outdent();

        build_where(&mut builder, self.predicate.as_ref());

        Ok(builder.build())
    }
}

impl<T> Filter for Update<T> {
    type Output = Self;

    fn filter(mut self, predicate: impl Into<Option<Predicate>>) -> Self {
        self.predicate = logic::and(self.predicate.take(), predicate.into());
        self
    }
}

pub struct Delete<T> {
    predicate: Option<Predicate>,
    table: std::marker::PhantomData<T>,
}

pub fn delete<T>() -> Delete<T>
where
    T: Table + Instance,
{
    Delete {
        predicate: None,
        table: std::marker::PhantomData,
    }
}

impl<T> Delete<T>
where
    T: Table + Instance,
{
    pub fn table_name(&self) -> &'static str {
        T::instance().name()
    }

    pub fn predicate(&self) -> Option<&Predicate> {
        self.predicate.as_ref()
    }

    pub fn build(&self) -> Statement {
        let mut builder = QueryBuilder::new();

        builder.push("DELETE FROM ");
        builder.push(self.table_name());
        build_where(&mut builder, self.predicate.as_ref());

        builder.build()
    }
}

impl<T> Filter for Delete<T> {
    type Output = Self;

    fn filter(mut self, predicate: impl Into<Option<Predicate>>) -> Self {
        self.predicate = logic::and(self.predicate.take(), predicate.into());
        self
    }
}
