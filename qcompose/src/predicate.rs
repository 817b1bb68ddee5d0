//!
//! Boolean expressions over table columns.
//!

use std::cmp::Ordering;

use crate::builder::{QueryBuilder, Statement};
use crate::column::ColumnRef;
use crate::expr::Expr;
use crate::logic;
use crate::row::Row;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Loe,
    Gt,
    Goe,
}

impl CompareOp {
    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "<>",
            CompareOp::Lt => "<",
            CompareOp::Loe => "<=",
            CompareOp::Gt => ">",
            CompareOp::Goe => ">=",
        }
    }

    fn test(self, ordering: Ordering) -> bool {
        match self {
            CompareOp::Eq => ordering == Ordering::Equal,
            CompareOp::Ne => ordering != Ordering::Equal,
            CompareOp::Lt => ordering == Ordering::Less,
            CompareOp::Loe => ordering != Ordering::Greater,
            CompareOp::Gt => ordering == Ordering::Greater,
            CompareOp::Goe => ordering != Ordering::Less,
        }
    }
}

///
/// A filter condition.
///
/// An empty `And` is always true and an empty `Or` is always false.
/// Use the combinators in [`crate::logic`] to join optional predicates;
/// they never produce nested junctions of the same kind.
///
#[derive(Clone, Debug, PartialEq)]
pub enum Predicate {
    Compare(Expr, CompareOp, Expr),
    Between(Expr, Expr, Expr),
    In(Expr, Vec<Expr>),
    IsNull(Expr),
    IsNotNull(Expr),
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
}

impl Predicate {
    /// Conjunction with an optional predicate. An absent `other` leaves `self` unchanged.
    pub fn and(self, other: impl Into<Option<Predicate>>) -> Predicate {
        logic::and(Some(self), other.into()).unwrap_or_else(|| Predicate::And(vec![]))
    }

    /// Disjunction with an optional predicate. An absent `other` leaves `self` unchanged.
    pub fn or(self, other: impl Into<Option<Predicate>>) -> Predicate {
        logic::or(Some(self), other.into()).unwrap_or_else(|| Predicate::And(vec![]))
    }

    pub fn build(&self, builder: &mut QueryBuilder) {
        match self {
            Predicate::Compare(lhs, op, rhs) => {
                lhs.build(builder);
                builder.push(" ");
                builder.push(op.symbol());
                builder.push(" ");
                rhs.build(builder);
            }
            Predicate::Between(expr, low, high) => {
                expr.build(builder);
                builder.push(" BETWEEN ");
                low.build(builder);
                builder.push(" AND ");
                high.build(builder);
            }
            Predicate::In(_, list) if list.is_empty() => builder.push("FALSE"),
            Predicate::In(expr, list) => {
                expr.build(builder);
                builder.push(" IN (");
                for (idx, item) in list.iter().enumerate() {
                    if idx > 0 {
                        builder.push(", ");
                    }
                    item.build(builder);
                }
                builder.push(")");
            }
            Predicate::IsNull(expr) => {
                expr.build(builder);
                builder.push(" IS NULL");
            }
            Predicate::IsNotNull(expr) => {
                expr.build(builder);
                builder.push(" IS NOT NULL");
            }
            Predicate::And(clauses) => build_junction(builder, clauses, " AND ", "TRUE"),
            Predicate::Or(clauses) => build_junction(builder, clauses, " OR ", "FALSE"),
            Predicate::Not(inner) => {
                builder.push("NOT (");
                inner.build(builder);
                builder.push(")");
            }
        }
    }

    /// Render this predicate alone, e.g. for logging.
    pub fn to_sql(&self) -> Statement {
        let mut builder = QueryBuilder::new();
        self.build(&mut builder);
        builder.build()
    }

    ///
    /// Evaluate using SQL three-valued logic.
    ///
    /// `None` means _unknown_, which is what comparisons against `NULL` produce.
    ///
    pub fn eval(&self, row: &Row) -> Option<bool> {
        match self {
            Predicate::Compare(lhs, op, rhs) => lhs
                .eval(row)
                .sql_cmp(&rhs.eval(row))
                .map(|ordering| op.test(ordering)),
            Predicate::Between(expr, low, high) => {
                let value = expr.eval(row);
                let above = value.sql_cmp(&low.eval(row)).map(|o| o != Ordering::Less);
                let below = value
                    .sql_cmp(&high.eval(row))
                    .map(|o| o != Ordering::Greater);
                kleene_and(vec![above, below])
            }
            Predicate::In(expr, list) => {
                let value = expr.eval(row);
                kleene_or(
                    list.iter()
                        .map(|item| value.sql_cmp(&item.eval(row)).map(|o| o == Ordering::Equal))
                        .collect(),
                )
            }
            Predicate::IsNull(expr) => Some(expr.eval(row).is_null()),
            Predicate::IsNotNull(expr) => Some(!expr.eval(row).is_null()),
            Predicate::And(clauses) => kleene_and(clauses.iter().map(|c| c.eval(row)).collect()),
            Predicate::Or(clauses) => kleene_or(clauses.iter().map(|c| c.eval(row)).collect()),
            Predicate::Not(inner) => inner.eval(row).map(|value| !value),
        }
    }

    /// Whether a `WHERE` clause with this predicate keeps the row.
    pub fn matches(&self, row: &Row) -> bool {
        self.eval(row) == Some(true)
    }

    /// Every column read by this predicate.
    pub fn columns(&self) -> Vec<ColumnRef> {
        match self {
            Predicate::Compare(lhs, _, rhs) => [lhs, rhs].iter().flat_map(|e| e.columns()).collect(),
            Predicate::Between(expr, low, high) => [expr, low, high]
                .iter()
                .flat_map(|e| e.columns())
                .collect(),
            Predicate::In(expr, list) => std::iter::once(expr)
                .chain(list)
                .flat_map(Expr::columns)
                .collect(),
            Predicate::IsNull(expr) | Predicate::IsNotNull(expr) => expr.columns(),
            Predicate::And(clauses) | Predicate::Or(clauses) => {
                clauses.iter().flat_map(Predicate::columns).collect()
            }
            Predicate::Not(inner) => inner.columns(),
        }
    }

    fn build_nested(&self, builder: &mut QueryBuilder) {
        match self {
            Predicate::And(clauses) | Predicate::Or(clauses) if clauses.len() > 1 => {
                builder.push("(");
                self.build(builder);
                builder.push(")");
            }
            _ => self.build(builder),
        }
    }
}

fn build_junction(builder: &mut QueryBuilder, clauses: &[Predicate], separator: &str, empty: &str) {
    if clauses.is_empty() {
        builder.push(empty);
        return;
    }

    for (idx, clause) in clauses.iter().enumerate() {
        if idx > 0 {
            builder.push(separator);
        }
        clause.build_nested(builder);
    }
}

fn kleene_and(values: Vec<Option<bool>>) -> Option<bool> {
    if values.contains(&Some(false)) {
        Some(false)
    } else if values.contains(&None) {
        None
    } else {
        Some(true)
    }
}

fn kleene_or(values: Vec<Option<bool>>) -> Option<bool> {
    if values.contains(&Some(true)) {
        Some(true)
    } else if values.contains(&None) {
        None
    } else {
        Some(false)
    }
}

impl std::ops::BitAnd for Predicate {
    type Output = Predicate;

    fn bitand(self, rhs: Predicate) -> Predicate {
        self.and(rhs)
    }
}

impl std::ops::BitOr for Predicate {
    type Output = Predicate;

    fn bitor(self, rhs: Predicate) -> Predicate {
        self.or(rhs)
    }
}

impl std::ops::Not for Predicate {
    type Output = Predicate;

    fn not(self) -> Predicate {
        Predicate::Not(Box::new(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::db::Member;

    fn member(username: Option<&str>, age: i32) -> Row {
        Row::new()
            .with(Member::username(), username.map(str::to_owned))
            .with(Member::age(), age)
    }

    #[test]
    fn comparison_with_null_is_unknown() {
        let nameless = member(None, 10);

        assert_eq!(Member::username().eq("member1").eval(&nameless), None);
        assert_eq!(Member::username().ne("member1").eval(&nameless), None);
        assert!(!Member::username().ne("member1").matches(&nameless));
        assert_eq!(Member::username().is_null().eval(&nameless), Some(true));
    }

    #[test]
    fn kleene_junctions() {
        let nameless = member(None, 10);
        let unknown = Member::username().eq("x");

        assert_eq!((unknown.clone() & Member::age().eq(11)).eval(&nameless), Some(false));
        assert_eq!((unknown.clone() & Member::age().eq(10)).eval(&nameless), None);
        assert_eq!((unknown.clone() | Member::age().eq(10)).eval(&nameless), Some(true));
        assert_eq!((!unknown).eval(&nameless), None);
    }

    #[test]
    fn between_is_inclusive() {
        let row = member(Some("member1"), 10);

        assert!(Member::age().between(10, 11).matches(&row));
        assert!(Member::age().between(9, 10).matches(&row));
        assert!(!Member::age().between(11, 20).matches(&row));
    }

    #[test]
    fn in_list() {
        let row = member(Some("member1"), 20);

        assert!(Member::age().is_in(vec![10, 20]).matches(&row));
        assert!(!Member::age().is_in(Vec::<i32>::new()).matches(&row));
    }

    #[test]
    fn and_with_absent_is_unchanged() {
        let p = Member::age().eq(10);
        assert_eq!(p.clone().and(None), p);
        assert_eq!(p.clone().or(None), p);
    }

    #[test]
    fn empty_junctions() {
        let row = member(None, 1);
        assert_eq!(Predicate::And(vec![]).eval(&row), Some(true));
        assert_eq!(Predicate::Or(vec![]).eval(&row), Some(false));
        assert_eq!(Predicate::And(vec![]).to_sql().sql, "TRUE");
        assert_eq!(Predicate::Or(vec![]).to_sql().sql, "FALSE");
    }
}
