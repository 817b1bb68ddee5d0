//!
//! Paging of query results.
//!

use crate::{QError, QResult};

/// A window of rows: `size` rows starting at `offset`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Pageable {
    offset: u64,
    size: u64,
}

impl Pageable {
    /// Zero-based page `page` of `size` rows.
    pub fn of_page(page: u64, size: u64) -> QResult<Self> {
        if size == 0 {
            return Err(QError::InvalidPageSize);
        }

        Ok(Self {
            offset: page.saturating_mul(size),
            size,
        })
    }

    /// `size` rows starting at an arbitrary `offset`.
    pub fn at_offset(offset: u64, size: u64) -> QResult<Self> {
        if size == 0 {
            return Err(QError::InvalidPageSize);
        }

        Ok(Self { offset, size })
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn page_number(&self) -> u64 {
        self.offset / self.size
    }

    ///
    /// The total row count, when it follows from the page content alone.
    ///
    /// That is the case on a first page that is not full, and on any
    /// later page that is non-empty but not full. Otherwise a count
    /// query is required.
    ///
    pub fn infer_total(&self, content_len: usize) -> Option<u64> {
        let content_len = content_len as u64;

        if self.offset == 0 {
            if self.size > content_len {
                return Some(content_len);
            }
            return None;
        }

        if content_len != 0 && self.size > content_len {
            return Some(self.offset.saturating_add(content_len));
        }

        None
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Page<R> {
    content: Vec<R>,
    pageable: Pageable,
    total: u64,
}

impl<R> Page<R> {
    pub fn new(content: Vec<R>, pageable: Pageable, total: u64) -> Self {
        Self {
            content,
            pageable,
            total,
        }
    }

    pub fn content(&self) -> &[R] {
        &self.content
    }

    pub fn into_content(self) -> Vec<R> {
        self.content
    }

    pub fn pageable(&self) -> Pageable {
        self.pageable
    }

    /// Total number of rows matching the query, across all pages.
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn total_pages(&self) -> u64 {
        self.total / self.pageable.size + u64::from(self.total % self.pageable.size != 0)
    }

    pub fn has_next(&self) -> bool {
        self.pageable.offset.saturating_add(self.content.len() as u64) < self.total
    }

    pub fn map<U, F>(self, func: F) -> Page<U>
    where
        F: FnMut(R) -> U,
    {
        Page {
            content: self.content.into_iter().map(func).collect(),
            pageable: self.pageable,
            total: self.total,
        }
    }

    pub fn try_map<U, F>(self, func: F) -> QResult<Page<U>>
    where
        F: FnMut(R) -> QResult<U>,
    {
        Ok(Page {
            content: self
                .content
                .into_iter()
                .map(func)
                .collect::<QResult<Vec<U>>>()?,
            pageable: self.pageable,
            total: self.total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_size_is_rejected() {
        assert!(matches!(
            Pageable::of_page(0, 0),
            Err(QError::InvalidPageSize)
        ));
        assert!(matches!(
            Pageable::at_offset(3, 0),
            Err(QError::InvalidPageSize)
        ));
    }

    #[test]
    fn page_offsets() {
        let pageable = Pageable::of_page(2, 10).unwrap();
        assert_eq!(pageable.offset(), 20);
        assert_eq!(pageable.page_number(), 2);
    }

    #[test]
    fn total_is_inferred_from_partial_pages() {
        let first = Pageable::of_page(0, 10).unwrap();
        assert_eq!(first.infer_total(4), Some(4));
        assert_eq!(first.infer_total(0), Some(0));
        assert_eq!(first.infer_total(10), None);

        let third = Pageable::of_page(2, 10).unwrap();
        assert_eq!(third.infer_total(3), Some(23));
        assert_eq!(third.infer_total(0), None);
        assert_eq!(third.infer_total(10), None);
    }

    #[test]
    fn page_arithmetic() {
        let pageable = Pageable::at_offset(1, 2).unwrap();
        let page = Page::new(vec!["b", "c"], pageable, 4);

        assert_eq!(page.total_pages(), 2);
        assert!(page.has_next());
        assert_eq!(page.map(str::len).content(), &[1, 1]);
    }

    #[test]
    fn huge_page_sizes_do_not_overflow() {
        let page = Page::new(Vec::<i32>::new(), Pageable::at_offset(0, u64::MAX).unwrap(), 5);
        assert_eq!(page.total_pages(), 1);
        assert!(!page.has_next());

        let full = Page::new(vec![1], Pageable::of_page(0, 1).unwrap(), u64::MAX);
        assert_eq!(full.total_pages(), u64::MAX);

        let last = Pageable::of_page(u64::MAX, 10).unwrap();
        assert_eq!(last.offset(), u64::MAX);
        assert_eq!(Page::new(Vec::<i32>::new(), last, 3).total_pages(), 1);
    }
}
