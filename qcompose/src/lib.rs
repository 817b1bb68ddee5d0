//!
//! Type-safe query composition.
//!
//! Tables are declared with [`table`], which turns every bodiless associated
//! function into a typed [`column::Column`]. Columns produce [`predicate::Predicate`]s,
//! and optional predicates are folded into a single `WHERE` clause:
//!
//! ```text
//! criteria            atomic predicates          composed
//!
//! username: Some  ->  username = $1      \
//! age:      None  ->  (absent)            >--->  username = $1 AND age >= $2
//! age_goe:  Some  ->  age >= $2          /
//! ```
//!
//! An absent predicate means "no restriction", and folding only absent
//! predicates yields no `WHERE` clause at all.
//!

// Lets the table macro refer to `::qcompose` from inside this crate.
extern crate self as qcompose;

pub use qcompose_macros::*;

pub mod aggregate;
pub mod builder;
pub mod column;
pub mod compose;
pub mod database;
pub mod demo;
pub mod engine;
pub mod expr;
pub mod filter;
pub mod join;
pub mod logging;
pub mod logic;
pub mod order;
pub mod page;
pub mod predicate;
pub mod prelude;
pub mod query;
pub mod row;
pub mod settings;
pub mod ty;
pub mod update;
pub mod value;

pub use aggregate::aggregate;
pub use compose::{combine, compose, SearchCriteria};
pub use query::{select, select_from};
pub use update::{delete, update};

///
/// A database table.
///
/// Implemented by `#[qcompose::table("name")]`.
///
pub trait Table: Send + Sync + 'static {
    fn name(&self) -> &'static str;

    /// All columns, in declaration order.
    fn columns(&self) -> &'static [column::ColumnRef];
}

/// Provide some &'static instance of a type.
pub trait Instance {
    fn instance() -> &'static Self;
}

#[derive(thiserror::Error, Debug)]
pub enum QError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Could not decode column `{column}` as {expected}")]
    Decode {
        column: &'static str,
        expected: &'static str,
    },

    #[error("Row has no column `{0}`")]
    MissingColumn(&'static str),

    #[error("Result has no output at index {0}")]
    MissingOutput(usize),

    #[error("Value out of range for column `{column}` of type {kind}")]
    OutOfRange {
        column: &'static str,
        kind: &'static str,
    },

    #[error("Column `{column}` can't hold a {found} value")]
    TypeMismatch {
        column: &'static str,
        found: &'static str,
    },

    #[error("Null value in non-null column `{0}`")]
    NotNull(&'static str),

    #[error("Table `{0}` is neither selected from nor joined")]
    TableNotInScope(&'static str),

    #[error("Column `{0}` must be grouped by or aggregated")]
    Ungrouped(&'static str),

    #[error("Expected at most one row, got {0}")]
    NonUniqueResult(usize),

    #[error("Page size must be greater than zero")]
    InvalidPageSize,

    #[error("Update has no assignments")]
    EmptyUpdate,

    #[error("Unknown table `{0}`")]
    UnknownTable(&'static str),

    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),
}

pub type QResult<T> = Result<T, QError>;
