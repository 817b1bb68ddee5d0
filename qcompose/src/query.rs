//!
//! Select statements.
//!

use std::fmt::Write;

use crate::builder::{QueryBuilder, Statement};
use crate::column::{Column, ColumnRef};
use crate::filter::{Filter, Range};
use crate::join::{self, Join};
use crate::logic;
use crate::order::Order;
use crate::page::Pageable;
use crate::predicate::Predicate;
use crate::ty::ColumnType;
use crate::{Instance, Table};

///
/// A projection: one column, or a tuple of columns.
///
/// Columns may belong to the selected table or to any table joined onto it.
///
pub trait Project {
    fn column_refs(&self) -> Vec<ColumnRef>;
}

impl<T, V> Project for Column<T, V>
where
    T: Table,
    V: ColumnType,
{
    fn column_refs(&self) -> Vec<ColumnRef> {
        vec![self.column_ref()]
    }
}

macro_rules! project_tuple {
    ($($p:ident: $idx:tt),+) => {
        impl<$($p),+> Project for ($($p,)+)
        where
            $($p: Project,)+
        {
            fn column_refs(&self) -> Vec<ColumnRef> {
                let mut columns = Vec::new();
                $(columns.extend(self.$idx.column_refs());)+
                columns
            }
        }
    };
}

project_tuple!(P0: 0, P1: 1);
project_tuple!(P0: 0, P1: 1, P2: 2);
project_tuple!(P0: 0, P1: 1, P2: 2, P3: 3);
project_tuple!(P0: 0, P1: 1, P2: 2, P3: 3, P4: 4);

/// # Select
///
/// Encodes the intent of selecting *something* from a table.
///
pub struct Select<T> {
    projection: Vec<ColumnRef>,
    joins: Vec<Join>,
    predicate: Option<Predicate>,
    orders: Vec<Order>,
    offset: Option<u64>,
    limit: Option<u64>,
    table: std::marker::PhantomData<T>,
}

/// Select every column of `T`.
pub fn select_from<T>() -> Select<T>
where
    T: Table + Instance,
{
    Select::new(T::instance().columns().to_vec())
}

/// Select a projection, from `T` and the tables joined onto it.
pub fn select<T, P>(projection: P) -> Select<T>
where
    T: Table + Instance,
    P: Project,
{
    Select::new(projection.column_refs())
}

impl<T> Select<T>
where
    T: Table + Instance,
{
    fn new(projection: Vec<ColumnRef>) -> Self {
        Self {
            projection,
            joins: vec![],
            predicate: None,
            orders: vec![],
            offset: None,
            limit: None,
            table: std::marker::PhantomData,
        }
    }

    pub fn table_name(&self) -> &'static str {
        T::instance().name()
    }

    /// The root table followed by every joined table.
    pub fn tables(&self) -> Vec<&'static str> {
        join::tables_in_scope(self.table_name(), &self.joins)
    }

    pub fn projection(&self) -> &[ColumnRef] {
        &self.projection
    }

    pub fn joins(&self) -> &[Join] {
        &self.joins
    }

    pub fn predicate(&self) -> Option<&Predicate> {
        self.predicate.as_ref()
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn offset_rows(&self) -> Option<u64> {
        self.offset
    }

    pub fn limit_rows(&self) -> Option<u64> {
        self.limit
    }

    /// `INNER JOIN J ON on`
    pub fn join<J>(mut self, on: Predicate) -> Self
    where
        J: Table + Instance,
    {
        self.joins.push(Join::inner::<J>(on));
        self
    }

    /// `LEFT JOIN J ON on`
    pub fn left_join<J>(mut self, on: Predicate) -> Self
    where
        J: Table + Instance,
    {
        self.joins.push(Join::left::<J>(on));
        self
    }

    pub fn order_by(mut self, order: Order) -> Self {
        self.orders.push(order);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Restrict to the rows of one page.
    pub fn paged(self, pageable: Pageable) -> Self {
        let offset = pageable.offset();
        self.range(offset..offset.saturating_add(pageable.size()))
    }

    /// The same selection without ordering or row window, for counting.
    pub fn unpaged(&self) -> Self {
        Self {
            projection: self.projection.clone(),
            joins: self.joins.clone(),
            predicate: self.predicate.clone(),
            orders: vec![],
            offset: None,
            limit: None,
            table: std::marker::PhantomData,
        }
    }

    pub fn build(&self) -> Statement {
        let mut builder = QueryBuilder::new();

        builder.push("SELECT");
        builder.newline_indent();
        for (idx, column) in self.projection.iter().enumerate() {
            if idx > 0 {
                builder.push(", ");
            }
            builder.push(column.table);
            builder.push(".");
            builder.push(column.name);
        }
        builder.newline_outdent();

        join::build_from(&mut builder, self.table_name(), &self.joins);

        build_where(&mut builder, self.predicate.as_ref());

        if !self.orders.is_empty() {
            builder.newline();
            builder.push("ORDER BY ");
            for (idx, order) in self.orders.iter().enumerate() {
                if idx > 0 {
                    builder.push(", ");
                }
                order.build(&mut builder);
            }
        }

        if let Some(limit) = self.limit {
            builder.newline();
            let _ = write!(builder.buf_mut(), "LIMIT {}", limit);
        }

        if let Some(offset) = self.offset {
            builder.newline();
            let _ = write!(builder.buf_mut(), "OFFSET {}", offset);
        }

        builder.build()
    }

    /// `SELECT COUNT(*)` over the same joins and filter, ignoring order and row window.
    pub fn build_count(&self) -> Statement {
        let mut builder = QueryBuilder::new();

        builder.push("SELECT COUNT(*)");
        builder.newline();
        join::build_from(&mut builder, self.table_name(), &self.joins);

        build_where(&mut builder, self.predicate.as_ref());

        builder.build()
    }
}

impl<T> Filter for Select<T> {
    type Output = Self;

    fn filter(mut self, predicate: impl Into<Option<Predicate>>) -> Self {
        self.predicate = logic::and(self.predicate.take(), predicate.into());
        self
    }
}

impl<T> Range for Select<T> {
    type Output = Self;

    fn range(mut self, range: std::ops::Range<u64>) -> Self {
        self.offset = Some(range.start);
        self.limit = Some(range.end.saturating_sub(range.start));
        self
    }
}

impl<T> Clone for Select<T> {
    fn clone(&self) -> Self {
        Self {
            projection: self.projection.clone(),
            joins: self.joins.clone(),
            predicate: self.predicate.clone(),
            orders: self.orders.clone(),
            offset: self.offset,
            limit: self.limit,
            table: std::marker::PhantomData,
        }
    }
}

impl<T> std::fmt::Debug for Select<T> {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        fmt.debug_struct("Select")
            .field("projection", &self.projection)
            .field("joins", &self.joins)
            .field("predicate", &self.predicate)
            .field("orders", &self.orders)
            .field("offset", &self.offset)
            .field("limit", &self.limit)
            .finish()
    }
}

pub(crate) fn build_where(builder: &mut QueryBuilder, predicate: Option<&Predicate>) {
    if let Some(predicate) = predicate {
        builder.newline();
        builder.push("WHERE");
        builder.newline_indent();
        predicate.build(builder);
        builder.outdent();
    }
}
