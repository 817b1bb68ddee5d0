//!
//! Null-safe logical combination of optional predicates.
//!
//! An absent predicate (`None`) imposes no restriction, so it is the
//! identity element of conjunction: `and(None, p) == p`.
//!

use crate::predicate::Predicate;

#[derive(Clone, Copy, PartialEq)]
enum LogicOp {
    And,
    Or,
}

/// Logical conjunction of two optional clauses.
///
/// To use more than two clauses, just nest it, or use [`all`].
pub fn and(lhs: Option<Predicate>, rhs: Option<Predicate>) -> Option<Predicate> {
    optimize(LogicOp::And, vec![lhs, rhs].into_iter())
}

/// Logical disjunction of two optional clauses.
///
/// Absent clauses are skipped, just like in [`and`]: `or(None, p) == p`.
pub fn or(lhs: Option<Predicate>, rhs: Option<Predicate>) -> Option<Predicate> {
    optimize(LogicOp::Or, vec![lhs, rhs].into_iter())
}

/// Conjunction of every present clause. `None` when no clause is present.
pub fn all<I>(clauses: I) -> Option<Predicate>
where
    I: IntoIterator<Item = Option<Predicate>>,
{
    optimize(LogicOp::And, clauses.into_iter())
}

/// Disjunction of every present clause. `None` when no clause is present.
pub fn any<I>(clauses: I) -> Option<Predicate>
where
    I: IntoIterator<Item = Option<Predicate>>,
{
    optimize(LogicOp::Or, clauses.into_iter())
}

fn optimize(
    op: LogicOp,
    clause_iter: impl Iterator<Item = Option<Predicate>>,
) -> Option<Predicate> {
    let mut present = false;
    let mut clauses = Vec::new();

    for clause in clause_iter.flatten() {
        present = true;
        match (op, clause) {
            (LogicOp::And, Predicate::And(inner)) => clauses.extend(inner),
            (LogicOp::Or, Predicate::Or(inner)) => clauses.extend(inner),
            (_, clause) => clauses.push(clause),
        }
    }

    match clauses.len() {
        // Only empty junctions were given. `TRUE` is the same as no
        // restriction, but `FALSE` must survive.
        0 if present && op == LogicOp::Or => Some(Predicate::Or(vec![])),
        0 => None,
        1 => clauses.pop(),
        _ => Some(match op {
            LogicOp::And => Predicate::And(clauses),
            LogicOp::Or => Predicate::Or(clauses),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnRef;
    use crate::expr::Expr;
    use crate::predicate::CompareOp;
    use crate::ty::Kind;

    fn eq(name: &'static str, value: i64) -> Predicate {
        Predicate::Compare(
            Expr::Column(ColumnRef {
                table: "t",
                name,
                kind: Kind::Int64,
                nullable: false,
            }),
            CompareOp::Eq,
            Expr::Value(value.into()),
        )
    }

    #[test]
    fn absent_is_identity() {
        assert_eq!(and(None, None), None);
        assert_eq!(and(Some(eq("a", 1)), None), Some(eq("a", 1)));
        assert_eq!(and(None, Some(eq("b", 2))), Some(eq("b", 2)));
        assert_eq!(or(None, Some(eq("b", 2))), Some(eq("b", 2)));
    }

    #[test]
    fn nested_conjunctions_are_flattened() {
        let nested = and(
            Some(eq("a", 1)),
            and(Some(eq("b", 2)), Some(eq("c", 3))),
        );
        assert_eq!(
            nested,
            Some(Predicate::And(vec![eq("a", 1), eq("b", 2), eq("c", 3)]))
        );
    }

    #[test]
    fn mixed_junctions_are_kept() {
        let mixed = and(Some(eq("a", 1)), or(Some(eq("b", 2)), Some(eq("c", 3))));
        assert_eq!(
            mixed,
            Some(Predicate::And(vec![
                eq("a", 1),
                Predicate::Or(vec![eq("b", 2), eq("c", 3)])
            ]))
        );
    }

    #[test]
    fn fold_of_nothing_is_none() {
        assert_eq!(all(vec![None, None, None]), None);
        assert_eq!(any(Vec::<Option<Predicate>>::new()), None);
        assert_eq!(all(vec![None, Some(eq("a", 1)), None]), Some(eq("a", 1)));
    }

    #[test]
    fn empty_disjunction_survives() {
        assert_eq!(
            any(vec![Some(Predicate::Or(vec![]))]),
            Some(Predicate::Or(vec![]))
        );
        assert_eq!(all(vec![Some(Predicate::And(vec![]))]), None);
    }
}
