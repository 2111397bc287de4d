//! Offset pagination types.

use serde::Serialize;

use crate::validation::{FieldViolation, ValidationError};

/// Page requested when the caller omits `page`.
pub const DEFAULT_PAGE: u32 = 1;
/// Page size used when the caller omits `limit`.
pub const DEFAULT_LIMIT: u32 = 10;
/// Largest page size a caller may request.
pub const MAX_LIMIT: u32 = 100;

/// A validated 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    /// Validate a page request.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` if `page` or `limit` is zero, or if `limit`
    /// exceeds [`MAX_LIMIT`].
    pub fn new(page: u32, limit: u32) -> Result<Self, ValidationError> {
        let mut errors = Vec::new();
        if page == 0 {
            errors.push(FieldViolation::new(
                "page",
                "page must be a positive number",
            ));
        }
        if limit == 0 {
            errors.push(FieldViolation::new(
                "limit",
                "limit must be a positive number",
            ));
        } else if limit > MAX_LIMIT {
            errors.push(FieldViolation::new(
                "limit",
                format!("limit must not be greater than {MAX_LIMIT}"),
            ));
        }

        if errors.is_empty() {
            Ok(Self { page, limit })
        } else {
            Err(ValidationError::new(errors))
        }
    }

    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of rows to skip: `(page - 1) * limit`.
    #[must_use]
    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// Pagination metadata returned alongside a page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    /// Total number of matching rows, ignoring the page window.
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    /// `ceil(total / limit)`; zero when there are no rows.
    pub total_pages: u64,
}

impl PageMeta {
    /// Compute metadata for `total` rows under `request`.
    #[must_use]
    pub fn new(total: u64, request: PageRequest) -> Self {
        Self {
            total,
            page: request.page,
            limit: request.limit,
            total_pages: total.div_ceil(u64::from(request.limit)),
        }
    }
}

/// A page of results: `{ data, meta }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}
