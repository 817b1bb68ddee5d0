use crate::builder::QueryBuilder;
use crate::column::{Column, ColumnRef};
use crate::row::Row;
use crate::ty::ColumnType;
use crate::value::Value;
use crate::Table;

/// Scalar expression appearing inside predicates, orderings and assignments.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Column(ColumnRef),
    Value(Value),
    Add(Box<Expr>, Box<Expr>),
}

impl Expr {
    pub fn build(&self, builder: &mut QueryBuilder) {
        match self {
            Expr::Column(column) => {
                builder.push(column.table);
                builder.push(".");
                builder.push(column.name);
            }
            Expr::Value(value) => builder.push_param(value.clone()),
            Expr::Add(lhs, rhs) => {
                lhs.build(builder);
                builder.push(" + ");
                rhs.build(builder);
            }
        }
    }

    /// Evaluate against a stored row. Unknown columns and overflows read as `NULL`.
    pub fn eval(&self, row: &Row) -> Value {
        self.eval_checked(row).unwrap_or(Value::Null)
    }

    /// Like [`Expr::eval`], but `None` when the arithmetic overflows.
    pub fn eval_checked(&self, row: &Row) -> Option<Value> {
        match self {
            Expr::Column(column) => Some(row.value(column).cloned().unwrap_or(Value::Null)),
            Expr::Value(value) => Some(value.clone()),
            Expr::Add(lhs, rhs) => match (lhs.eval_checked(row)?, rhs.eval_checked(row)?) {
                (Value::Int(lhs), Value::Int(rhs)) => lhs.checked_add(rhs).map(Value::Int),
                (Value::Float(lhs), Value::Float(rhs)) => Some(Value::Float(lhs + rhs)),
                _ => Some(Value::Null),
            },
        }
    }

    /// The table-qualified columns this expression reads.
    pub fn columns(&self) -> Vec<ColumnRef> {
        match self {
            Expr::Column(column) => vec![*column],
            Expr::Value(_) => vec![],
            Expr::Add(lhs, rhs) => {
                let mut columns = lhs.columns();
                columns.extend(rhs.columns());
                columns
            }
        }
    }
}

///
/// An expression known to produce values of column type `V`.
///
/// The right hand side of a typed assignment, e.g. `Member::age().add(1)`.
///
pub struct TypedExpr<V> {
    expr: Expr,
    ty: std::marker::PhantomData<fn() -> V>,
}

impl<V: ColumnType> TypedExpr<V> {
    pub(crate) fn new(expr: Expr) -> Self {
        Self {
            expr,
            ty: std::marker::PhantomData,
        }
    }

    pub fn value(value: V) -> Self {
        Self::new(Expr::Value(value.into_value()))
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    pub fn into_expr(self) -> Expr {
        self.expr
    }
}

impl<V> Clone for TypedExpr<V> {
    fn clone(&self) -> Self {
        Self {
            expr: self.expr.clone(),
            ty: std::marker::PhantomData,
        }
    }
}

impl<V> std::fmt::Debug for TypedExpr<V> {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        std::fmt::Debug::fmt(&self.expr, fmt)
    }
}

impl<T, V> From<Column<T, V>> for TypedExpr<V>
where
    T: Table,
    V: ColumnType,
{
    fn from(column: Column<T, V>) -> Self {
        Self::new(column.expr())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::db::Member;

    #[test]
    fn overflowing_add_is_detected() {
        let row = Row::new().with(Member::age(), i32::MAX);
        let expr = Expr::Add(
            Box::new(Member::age().expr()),
            Box::new(Expr::Value(Value::Int(i64::MAX))),
        );

        assert_eq!(expr.eval_checked(&row), None);
        assert_eq!(expr.eval(&row), Value::Null);
        assert_eq!(
            Member::age().add(1).expr().eval_checked(&row),
            Some(Value::Int(i64::from(i32::MAX) + 1))
        );
    }

    #[test]
    fn null_operand_gives_null() {
        let row = Row::new().with(Member::team_id(), None);
        assert_eq!(Member::team_id().add(1).expr().eval(&row), Value::Null);
    }
}
