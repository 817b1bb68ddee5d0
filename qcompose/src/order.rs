use std::cmp::Ordering;

use crate::builder::QueryBuilder;
use crate::expr::Expr;
use crate::row::Row;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Direction {
    Asc,
    Desc,
}

/// Placement of `NULL`s. `Default` follows PostgreSQL: last when
/// ascending, first when descending.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Nulls {
    Default,
    First,
    Last,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Order {
    pub expr: Expr,
    pub direction: Direction,
    pub nulls: Nulls,
}

impl Order {
    pub fn asc(expr: Expr) -> Self {
        Self {
            expr,
            direction: Direction::Asc,
            nulls: Nulls::Default,
        }
    }

    pub fn desc(expr: Expr) -> Self {
        Self {
            expr,
            direction: Direction::Desc,
            nulls: Nulls::Default,
        }
    }

    pub fn nulls_first(mut self) -> Self {
        self.nulls = Nulls::First;
        self
    }

    pub fn nulls_last(mut self) -> Self {
        self.nulls = Nulls::Last;
        self
    }

    pub fn build(&self, builder: &mut QueryBuilder) {
        self.expr.build(builder);
        builder.push(match self.direction {
            Direction::Asc => " ASC",
            Direction::Desc => " DESC",
        });
        builder.push(match self.nulls {
            Nulls::Default => "",
            Nulls::First => " NULLS FIRST",
            Nulls::Last => " NULLS LAST",
        });
    }

    pub fn compare(&self, lhs: &Row, rhs: &Row) -> Ordering {
        let nulls_first = match self.nulls {
            Nulls::First => true,
            Nulls::Last => false,
            Nulls::Default => self.direction == Direction::Desc,
        };

        let (lhs, rhs) = (self.expr.eval(lhs), self.expr.eval(rhs));

        match (lhs.is_null(), rhs.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) if nulls_first => Ordering::Less,
            (true, false) => Ordering::Greater,
            (false, true) if nulls_first => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => {
                let ordering = lhs.sql_cmp(&rhs).unwrap_or(Ordering::Equal);
                match self.direction {
                    Direction::Asc => ordering,
                    Direction::Desc => ordering.reverse(),
                }
            }
        }
    }
}

/// Compare rows by a list of orderings, the first one taking precedence.
pub fn compare_rows(orders: &[Order], lhs: &Row, rhs: &Row) -> Ordering {
    orders
        .iter()
        .map(|order| order.compare(lhs, rhs))
        .find(|ordering| *ordering != Ordering::Equal)
        .unwrap_or(Ordering::Equal)
}
