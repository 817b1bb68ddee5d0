//!
//! The query capability that statements are executed against.
//!

use async_trait::async_trait;

use crate::aggregate::{Aggregate, Tuple};
use crate::page::{Page, Pageable};
use crate::query::Select;
use crate::row::Row;
use crate::update::{Delete, Update};
use crate::{Instance, QError, QResult, Table};

///
/// An executor of statements.
///
/// Implementations own connections, transactions and row decoding.
/// Errors they raise are passed through to the caller unchanged.
///
#[async_trait]
pub trait Engine: Send + Sync {
    /// Fetch every row selected by `select`.
    async fn fetch<T>(&self, select: &Select<T>) -> QResult<Vec<Row>>
    where
        T: Table + Instance;

    /// Count the rows matching `select`, ignoring its order and row window.
    async fn fetch_count<T>(&self, select: &Select<T>) -> QResult<u64>
    where
        T: Table + Instance;

    /// Fetch the result tuples of an aggregate select, one per group.
    async fn fetch_aggregate<T>(&self, aggregate: &Aggregate<T>) -> QResult<Vec<Tuple>>
    where
        T: Table + Instance;

    /// Execute a bulk update, returning the number of affected rows.
    async fn execute_update<T>(&self, update: &Update<T>) -> QResult<u64>
    where
        T: Table + Instance;

    /// Execute a bulk delete, returning the number of affected rows.
    async fn execute_delete<T>(&self, delete: &Delete<T>) -> QResult<u64>
    where
        T: Table + Instance;

    /// Fetch at most one row. More than one matching row is an error.
    async fn fetch_one<T>(&self, select: &Select<T>) -> QResult<Option<Row>>
    where
        T: Table + Instance,
    {
        let mut rows = self.fetch(select).await?;
        match rows.len() {
            0 | 1 => Ok(rows.pop()),
            count => Err(QError::NonUniqueResult(count)),
        }
    }

    /// Fetch the first row, if any.
    async fn fetch_first<T>(&self, select: &Select<T>) -> QResult<Option<Row>>
    where
        T: Table + Instance,
    {
        let rows = self.fetch(&select.clone().limit(1)).await?;
        Ok(rows.into_iter().next())
    }

    /// Fetch one page of rows together with the total row count.
    async fn fetch_page<T>(&self, select: &Select<T>, pageable: Pageable) -> QResult<Page<Row>>
    where
        T: Table + Instance,
    {
        let content = self.fetch(&select.clone().paged(pageable)).await?;
        let total = self.fetch_count(select).await?;

        Ok(Page::new(content, pageable, total))
    }

    /// Like [`Engine::fetch_page`], but skips the count query
    /// whenever the total follows from the page content.
    async fn fetch_page_lazy<T>(
        &self,
        select: &Select<T>,
        pageable: Pageable,
    ) -> QResult<Page<Row>>
    where
        T: Table + Instance,
    {
        let content = self.fetch(&select.clone().paged(pageable)).await?;

        let total = match pageable.infer_total(content.len()) {
            Some(total) => {
                tracing::trace!(total, "count query skipped");
                total
            }
            None => self.fetch_count(select).await?,
        };

        Ok(Page::new(content, pageable, total))
    }
}
