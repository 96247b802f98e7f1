use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::shared::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Envelope wrapping every JSON response, success or failure
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub meta: Option<Meta>,
    pub errors: Option<Vec<String>>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: Option<T>, message: Option<String>, meta: Option<Meta>) -> Self {
        Self {
            success: true,
            data,
            message,
            meta,
            errors: None,
        }
    }

    pub fn error(message: Option<String>, errors: Option<Vec<String>>) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            message,
            meta: None,
            errors,
        }
    }
}

/// Paging details for list responses (characters, resources, wiki pages, trash)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    /// Matching rows across all pages
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
}

/// `?page=&pageSize=` on list endpoints. `page_size` is accepted too.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct PaginationQuery {
    /// 1-indexed page (default: 1)
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: i64,

    /// Items per page (default: 10, max: 100)
    #[serde(default = "default_page_size", alias = "pageSize")]
    #[param(minimum = 1, maximum = 100)]
    pub page_size: i64,
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

impl Default for PaginationQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PaginationQuery {
    pub fn page(&self) -> i64 {
        self.page.max(1)
    }

    /// Rows to skip before this page
    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.limit()
    }

    /// Page size clamped to `1..=MAX_PAGE_SIZE`
    pub fn limit(&self) -> i64 {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }

    /// Response meta for this page, reporting the effective page and size
    pub fn meta(&self, total: i64) -> Meta {
        Meta {
            total,
            page: self.page(),
            page_size: self.limit(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_pages_are_clamped() {
        let query = PaginationQuery {
            page: 0,
            page_size: 500,
        };
        assert_eq!(query.offset(), 0);
        assert_eq!(query.limit(), MAX_PAGE_SIZE);

        let query = PaginationQuery {
            page: 3,
            page_size: 0,
        };
        assert_eq!(query.offset(), 2);
        assert_eq!(query.limit(), 1);
    }

    #[test]
    fn test_meta_reports_effective_paging() {
        let query = PaginationQuery {
            page: -2,
            page_size: 250,
        };
        assert_eq!(
            query.meta(7),
            Meta {
                total: 7,
                page: 1,
                page_size: MAX_PAGE_SIZE,
            }
        );
    }

    #[test]
    fn test_page_size_accepts_both_spellings() {
        let camel: PaginationQuery = serde_json::from_str(r#"{"pageSize": 5}"#).unwrap();
        let snake: PaginationQuery = serde_json::from_str(r#"{"page_size": 6}"#).unwrap();
        assert_eq!((camel.page, camel.page_size), (1, 5));
        assert_eq!(snake.page_size, 6);
    }
}
