use crate::predicate::Predicate;

///
/// Restrict a statement with a `WHERE` predicate.
///
/// Passing `None` leaves the statement unrestricted, and filtering
/// twice conjoins both predicates.
///
pub trait Filter {
    type Output;

    fn filter(self, predicate: impl Into<Option<Predicate>>) -> Self::Output;
}

/// Restrict a statement to a window of rows.
pub trait Range {
    type Output;

    fn range(self, range: std::ops::Range<u64>) -> Self::Output;
}
