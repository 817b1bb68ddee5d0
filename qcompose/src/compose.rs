//!
//! Composition of optional search criteria into one filter.
//!

use crate::logic;
use crate::predicate::Predicate;
use crate::Table;

///
/// A set of optional search criteria for table `Self::Table`.
///
/// Each criterion maps to at most one atomic predicate. A criterion that
/// is absent contributes `None`, meaning "no restriction on this field".
///
/// ```ignore
/// impl SearchCriteria for MemberSearchCondition {
///     type Table = Member;
///
///     fn criteria(&self) -> Vec<Option<Predicate>> {
///         vec![
///             self.username.clone().map(|username| Member::username().eq(username)),
///             self.age_goe.map(|age| Member::age().goe(age)),
///         ]
///     }
/// }
/// ```
///
pub trait SearchCriteria {
    type Table: Table;

    fn criteria(&self) -> Vec<Option<Predicate>>;
}

///
/// Fold every present criterion into one conjunction.
///
/// Returns `None` when no criterion is present, which a query treats
/// as "no filtering".
///
pub fn compose<C>(criteria: &C) -> Option<Predicate>
where
    C: SearchCriteria + ?Sized,
{
    let clauses = criteria.criteria();
    let total = clauses.len();
    let present = clauses.iter().filter(|clause| clause.is_some()).count();

    let composed = clauses.into_iter().fold(None, combine);

    tracing::trace!(present, total, "composed search predicate");

    composed
}

/// Conjunction of two optional predicates, treating absence as the identity.
pub fn combine(lhs: Option<Predicate>, rhs: Option<Predicate>) -> Option<Predicate> {
    logic::and(lhs, rhs)
}

///
/// Accumulates optional predicates one at a time.
///
/// Yields the same predicate as folding with [`combine`]. Useful when
/// criteria are discovered imperatively rather than listed up front.
///
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Conjunction {
    predicate: Option<Predicate>,
}

impl Conjunction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn and(&mut self, predicate: impl Into<Option<Predicate>>) -> &mut Self {
        self.predicate = logic::and(self.predicate.take(), predicate.into());
        self
    }

    pub fn or(&mut self, predicate: impl Into<Option<Predicate>>) -> &mut Self {
        self.predicate = logic::or(self.predicate.take(), predicate.into());
        self
    }

    pub fn has_value(&self) -> bool {
        self.predicate.is_some()
    }

    pub fn into_predicate(self) -> Option<Predicate> {
        self.predicate
    }
}

impl From<Conjunction> for Option<Predicate> {
    fn from(conjunction: Conjunction) -> Self {
        conjunction.into_predicate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::db::Member;
    use crate::demo::MemberSearchCondition;

    #[test]
    fn no_criteria_compose_to_none() {
        assert_eq!(compose(&MemberSearchCondition::default()), None);
    }

    #[test]
    fn single_criterion_is_not_wrapped() {
        let cond = MemberSearchCondition {
            username: Some("member1".to_owned()),
            ..Default::default()
        };
        assert_eq!(compose(&cond), Some(Member::username().eq("member1")));
    }

    #[test]
    fn present_criteria_form_a_flat_conjunction() {
        let cond = MemberSearchCondition {
            username: Some("member1".to_owned()),
            age: Some(10),
            age_goe: None,
            age_loe: Some(20),
            team_name: None,
        };
        assert_eq!(
            compose(&cond),
            Some(Predicate::And(vec![
                Member::username().eq("member1"),
                Member::age().eq(10),
                Member::age().loe(20),
            ]))
        );
    }

    #[test]
    fn combine_treats_absence_as_identity() {
        let p = Member::age().eq(10);
        assert_eq!(combine(None, None), None);
        assert_eq!(combine(Some(p.clone()), None), Some(p.clone()));
        assert_eq!(combine(None, Some(p.clone())), Some(p));
    }

    #[test]
    fn conjunction_matches_functional_fold() {
        let cond = MemberSearchCondition {
            username: Some("member1".to_owned()),
            age: Some(10),
            ..Default::default()
        };

        let mut conjunction = Conjunction::new();
        if let Some(username) = &cond.username {
            conjunction.and(Member::username().eq(username.clone()));
        }
        if let Some(age) = cond.age {
            conjunction.and(Member::age().eq(age));
        }
        conjunction.and(None);

        assert!(conjunction.has_value());
        assert_eq!(conjunction.into_predicate(), compose(&cond));
    }

    #[test]
    fn empty_conjunction_has_no_value() {
        let mut conjunction = Conjunction::new();
        conjunction.and(None).or(None);
        assert!(!conjunction.has_value());
        assert_eq!(Option::<Predicate>::from(conjunction), None);
    }
}
