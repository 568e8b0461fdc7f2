//! Case-management service configuration.

use bk_core::repository::Pagination;

/// Tunables shared by the BK services.
#[derive(Debug, Clone)]
pub struct CaseConfig {
    /// Page size used when a listing request does not name one (default: 20).
    pub default_page_size: u64,
    /// Upper bound applied to any requested page size (default: 100).
    pub max_page_size: u64,
    /// Number of newest records of each kind shown on profiles and the
    /// dashboard (default: 5).
    pub recent_items: u64,
    /// Length of the dashboard attention list (default: 10).
    pub attention_limit: usize,
}

impl Default for CaseConfig {
    fn default() -> Self {
        Self {
            default_page_size: 20,
            max_page_size: 100,
            recent_items: 5,
            attention_limit: 10,
        }
    }
}

/// A normalized page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub page_size: u64,
}

/// Largest offset SurrealQL accepts as an integer.
const MAX_OFFSET: u64 = i64::MAX as u64;

impl PageRequest {
    /// Offsets past [`MAX_OFFSET`] are clamped; such a page is empty.
    pub fn pagination(self) -> Pagination {
        Pagination {
            offset: self
                .page
                .saturating_sub(1)
                .saturating_mul(self.page_size)
                .min(MAX_OFFSET),
            limit: self.page_size,
        }
    }
}

impl CaseConfig {
    /// Clamp caller-supplied paging: pages start at 1, a missing or zero
    /// size falls back to the default, oversized requests are capped.
    pub fn page_request(&self, page: Option<u64>, page_size: Option<u64>) -> PageRequest {
        let page = page.filter(|p| *p > 0).unwrap_or(1);
        let page_size = match page_size {
            Some(0) | None => self.default_page_size,
            Some(size) => size.min(self.max_page_size),
        };
        PageRequest { page, page_size }
    }

    pub(crate) fn recent(&self) -> Pagination {
        Pagination {
            offset: 0,
            limit: self.recent_items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paging_defaults_and_caps() {
        let config = CaseConfig::default();

        let req = config.page_request(None, None);
        assert_eq!(req, PageRequest { page: 1, page_size: 20 });
        assert_eq!(req.pagination().offset, 0);

        let req = config.page_request(Some(3), Some(500));
        assert_eq!(req.page_size, 100);
        assert_eq!(req.pagination().offset, 200);

        let req = config.page_request(Some(0), Some(0));
        assert_eq!(req, PageRequest { page: 1, page_size: 20 });
    }

    #[test]
    fn huge_page_number_clamps_offset() {
        let config = CaseConfig::default();

        let far = config.page_request(Some(u64::MAX), Some(50)).pagination();
        assert_eq!(far.offset, MAX_OFFSET);
        assert_eq!(far.limit, 50);

        let unnormalized = PageRequest { page: 0, page_size: 10 };
        assert_eq!(unnormalized.pagination().offset, 0);
    }
}
