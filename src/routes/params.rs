use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

const DEFAULT_PER_PAGE: u64 = 20;
const MAX_PER_PAGE: u64 = 100;

#[derive(Debug, Default, Clone, Deserialize, ToSchema, IntoParams)]
pub struct Pagination {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

impl Pagination {
    /// Returns `(page, per_page)` with per_page clamped to 1..=100 and page
    /// clamped so the row offset stays within a signed 64-bit integer.
    pub fn normalize(&self) -> (u64, u64) {
        let per_page = self
            .per_page
            .unwrap_or(DEFAULT_PER_PAGE)
            .clamp(1, MAX_PER_PAGE);
        let max_page = i64::MAX as u64 / per_page;
        let page = self.page.unwrap_or(1).clamp(1, max_page);
        (page, per_page)
    }
}

/// Query for admin list endpoints that can filter by status.
#[derive(Debug, Default, Clone, Deserialize, ToSchema, IntoParams)]
pub struct StatusListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub status: Option<String>,
}

impl StatusListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            per_page: self.per_page,
        }
    }

    /// The status filter, ignoring blank values.
    pub fn status(&self) -> Option<&str> {
        self.status
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_defaults_and_clamps() {
        assert_eq!(Pagination::default().normalize(), (1, 20));
        let wild = Pagination {
            page: Some(0),
            per_page: Some(1_000),
        };
        assert_eq!(wild.normalize(), (1, 100));
    }

    #[test]
    fn huge_page_keeps_offset_in_range() {
        for per_page in [1, 20, 100] {
            let (page, per_page) = Pagination {
                page: Some(u64::MAX),
                per_page: Some(per_page),
            }
            .normalize();
            let offset = (page - 1).checked_mul(per_page).expect("offset fits u64");
            assert!(offset <= i64::MAX as u64);
        }
    }

    #[test]
    fn blank_status_is_no_filter() {
        let query = StatusListQuery {
            status: Some("  ".into()),
            ..Default::default()
        };
        assert_eq!(query.status(), None);
    }
}
