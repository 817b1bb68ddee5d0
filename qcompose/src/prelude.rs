pub use crate::aggregate::Tuple;
pub use crate::compose::{combine, compose, Conjunction, SearchCriteria};
pub use crate::engine::Engine;
pub use crate::filter::{Filter, Range};
pub use crate::page::{Page, Pageable};
pub use crate::predicate::Predicate;
pub use crate::row::{FromRow, IntoRow, Row};
pub use crate::{aggregate, delete, select, select_from, update};
pub use crate::{Instance, QError, QResult, Table};
