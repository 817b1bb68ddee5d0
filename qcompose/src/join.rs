//!
//! Joins of further tables onto a statement's root table.
//!

use crate::builder::QueryBuilder;
use crate::predicate::Predicate;
use crate::{Instance, Table};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum JoinKind {
    Inner,
    /// Keeps unmatched rows, with the joined table's columns all `NULL`.
    Left,
}

#[derive(Clone)]
pub struct Join {
    kind: JoinKind,
    table: &'static dyn Table,
    on: Predicate,
}

impl Join {
    pub fn inner<J>(on: Predicate) -> Self
    where
        J: Table + Instance,
    {
        Self::new::<J>(JoinKind::Inner, on)
    }

    pub fn left<J>(on: Predicate) -> Self
    where
        J: Table + Instance,
    {
        Self::new::<J>(JoinKind::Left, on)
    }

    fn new<J>(kind: JoinKind, on: Predicate) -> Self
    where
        J: Table + Instance,
    {
        Self {
            kind,
            table: J::instance(),
            on,
        }
    }

    pub fn kind(&self) -> JoinKind {
        self.kind
    }

    pub fn table(&self) -> &'static dyn Table {
        self.table
    }

    pub fn on(&self) -> &Predicate {
        &self.on
    }

    pub fn build(&self, builder: &mut QueryBuilder) {
        builder.push(match self.kind {
            JoinKind::Inner => "INNER JOIN ",
            JoinKind::Left => "LEFT JOIN ",
        });
        builder.push(self.table.name());
        builder.push(" ON ");
        self.on.build(builder);
    }
}

impl std::fmt::Debug for Join {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        fmt.debug_struct("Join")
            .field("kind", &self.kind)
            .field("table", &self.table.name())
            .field("on", &self.on)
            .finish()
    }
}

/// `FROM root` followed by one line per join.
pub(crate) fn build_from(builder: &mut QueryBuilder, root: &str, joins: &[Join]) {
    builder.push("FROM ");
    builder.push(root);

    for join in joins {
        builder.newline();
        join.build(builder);
    }
}

/// Names of the root table and every joined table.
pub(crate) fn tables_in_scope(root: &'static str, joins: &[Join]) -> Vec<&'static str> {
    std::iter::once(root)
        .chain(joins.iter().map(|join| join.table.name()))
        .collect()
}
