use serde::{Deserialize, Serialize};

use crate::config::ApiConfig;

pub const DEFAULT_PAGE_SIZE: u64 = 20;

fn default_page() -> u64 {
    1
}

fn default_size() -> u64 {
    DEFAULT_PAGE_SIZE
}

/// 1-based page request. Page 0 is read as page 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_size")]
    pub size: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: default_page(), size: default_size() }
    }
}

impl PageRequest {
    pub fn new(page: u64, size: u64) -> Self {
        Self { page, size }
    }

    pub fn page_number(&self) -> u64 {
        self.page.max(1)
    }

    pub fn offset(&self) -> u64 {
        (self.page_number() - 1).saturating_mul(self.size)
    }

    /// Caps the size at `max`; a zero size falls back to the default.
    pub fn clamp(self, max: u64) -> Self {
        let size = if self.size == 0 { DEFAULT_PAGE_SIZE } else { self.size };
        Self { page: self.page_number(), size: size.min(max.max(1)) }
    }
}

/// Raw `?page=&size=` query parameters.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub size: Option<u64>,
}

impl PageQuery {
    /// Fills the configured default size and caps it at the configured maximum.
    pub fn resolve(self, api: &ApiConfig) -> PageRequest {
        PageRequest::new(self.page.unwrap_or(1), self.size.unwrap_or(api.default_page_size)).clamp(api.max_page_size)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationResponse<T> {
    pub page: u64,
    /// Number of items in `content`, not the requested size.
    pub size: u64,
    pub total_count: i64,
    pub content: Vec<T>,
}

impl<T> PaginationResponse<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PaginationResponse<U> {
        PaginationResponse {
            page: self.page,
            size: self.size,
            total_count: self.total_count,
            content: self.content.into_iter().map(f).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_are_one_based() {
        assert_eq!(PageRequest::new(1, 10).offset(), 0);
        assert_eq!(PageRequest::new(3, 10).offset(), 20);
        assert_eq!(PageRequest::new(0, 10).offset(), 0);
    }

    #[test]
    fn resolves_query_against_config() {
        let api = crate::config::AppConfig::development().api;
        let page = PageQuery::default().resolve(&api);
        assert_eq!(page, PageRequest::new(1, api.default_page_size));

        let page = PageQuery { page: Some(0), size: Some(api.max_page_size + 1) }.resolve(&api);
        assert_eq!(page, PageRequest::new(1, api.max_page_size));
    }

    #[test]
    fn clamps_size() {
        assert_eq!(PageRequest::new(2, 5000).clamp(100), PageRequest::new(2, 100));
        assert_eq!(PageRequest::new(0, 0).clamp(100), PageRequest::new(1, DEFAULT_PAGE_SIZE));
    }
}
