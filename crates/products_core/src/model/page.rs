//! Pagination request and response envelopes.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;

/// 1-based page request. Missing wire fields fall back to defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    pub fn new(page: u32, limit: u32) -> Self {
        Self { page, limit }
    }

    /// Number of rows skipped before this page. Zero for `page == 0`.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }
}

/// Pagination metadata, computed from the full active row count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub total: u64,
    pub page: u32,
    pub last_page: u64,
}

impl PageMeta {
    /// Builds metadata for `request`; `last_page = ceil(total / limit)`.
    ///
    /// Callers must reject `limit == 0` beforehand.
    pub fn new(total: u64, request: PageRequest) -> Self {
        Self {
            total,
            page: request.page,
            last_page: total.div_ceil(u64::from(request.limit.max(1))),
        }
    }
}

/// One page of resources plus metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

#[cfg(test)]
mod tests {
    use super::{PageMeta, PageRequest};

    #[test]
    fn offset_skips_previous_pages() {
        assert_eq!(PageRequest::new(1, 10).offset(), 0);
        assert_eq!(PageRequest::new(3, 10).offset(), 20);
    }

    #[test]
    fn last_page_rounds_up() {
        assert_eq!(PageMeta::new(25, PageRequest::new(1, 10)).last_page, 3);
        assert_eq!(PageMeta::new(20, PageRequest::new(1, 10)).last_page, 2);
        assert_eq!(PageMeta::new(0, PageRequest::new(1, 10)).last_page, 0);
    }

    #[test]
    fn missing_wire_fields_use_defaults() {
        let request: PageRequest = serde_json::from_str(r#"{"limit": 5}"#)
            .expect("json should parse");
        assert_eq!(request, PageRequest::new(1, 5));
    }
}
