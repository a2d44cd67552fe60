//! Remote record store contract.

use crate::error::DataSourceError;
use crate::filter::FilterCriteria;
use crate::record::{FieldMap, GridRecord, RecordId};
use async_trait::async_trait;

/// Everything a fetch needs: filters plus the requested page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    pub criteria: FilterCriteria,
    pub page: u32,
    pub limit: u32,
}

/// One page of records as returned by the server.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<R> {
    pub records: Vec<R>,
    pub total_pages: u32,
}

/// Paginated CRUD access to one collection of records.
///
/// Implementations must be safe to call concurrently and must not deduplicate
/// requests; ordering is the grid controller's concern.
#[async_trait]
pub trait RemoteDataSource: Send + Sync + 'static {
    type Record: GridRecord;

    async fn fetch_page(&self, query: &PageQuery) -> Result<Page<Self::Record>, DataSourceError>;

    async fn create_record(&self, payload: &FieldMap) -> Result<Self::Record, DataSourceError>;

    /// Returns the server's canonical record, which may differ from `patch`.
    async fn update_record(
        &self,
        id: RecordId,
        patch: &FieldMap,
    ) -> Result<Self::Record, DataSourceError>;

    async fn delete_record(&self, id: RecordId) -> Result<(), DataSourceError>;
}

/// Slice a full collection into the page `query` asks for.
///
/// Used by sources whose endpoint returns the whole collection at once.
pub fn paginate_locally<R: Clone>(records: &[R], query: &PageQuery) -> Page<R> {
    let limit = query.limit.max(1) as usize;
    let total_pages = records.len().div_ceil(limit).max(1);
    let start = (query.page.max(1) as usize - 1).saturating_mul(limit);
    let records = records.iter().skip(start).take(limit).cloned().collect();
    Page {
        records,
        total_pages: u32::try_from(total_pages).unwrap_or(u32::MAX),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(page: u32, limit: u32) -> PageQuery {
        PageQuery {
            criteria: FilterCriteria::new(),
            page,
            limit,
        }
    }

    #[test]
    fn test_paginate_locally_slices() {
        let items: Vec<i32> = (1..=25).collect();
        let page = paginate_locally(&items, &query(3, 10));
        assert_eq!(page.records, vec![21, 22, 23, 24, 25]);
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn test_paginate_locally_empty_has_one_page() {
        let items: Vec<i32> = Vec::new();
        let page = paginate_locally(&items, &query(1, 10));
        assert!(page.records.is_empty());
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn test_paginate_locally_past_end_is_empty() {
        let items: Vec<i32> = (1..=5).collect();
        let page = paginate_locally(&items, &query(4, 2));
        assert!(page.records.is_empty());
        assert_eq!(page.total_pages, 3);
    }
}
