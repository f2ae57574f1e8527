use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{trim_opt, Normalize};
use crate::constants::UserRole;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 20;
pub const MAX_LIMIT: u32 = 100;

/// Sorting direction
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Pagination parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct PaginationQuery {
    #[validate(range(min = 1, message = "Page must be at least 1"))]
    pub page: Option<u32>,

    #[validate(range(min = 1, max = 100, message = "Limit must be between 1 and 100"))]
    pub limit: Option<u32>,

    #[validate(length(max = 100, message = "Search term must be at most 100 characters"))]
    pub search: Option<String>,

    pub sort_order: Option<SortOrder>,
}

impl Normalize for PaginationQuery {
    fn normalize(self) -> Self {
        Self {
            search: trim_opt(self.search),
            ..self
        }
    }
}

impl PaginationQuery {
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(DEFAULT_PAGE).max(1)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT) as i64
    }

    pub fn offset(&self) -> i64 {
        (self.page() as i64 - 1) * self.limit()
    }
}

/// Admin user listing, optionally narrowed to one role
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UserListQuery {
    pub role: Option<UserRole>,

    #[validate(range(min = 1, message = "Page must be at least 1"))]
    pub page: Option<u32>,

    #[validate(range(min = 1, max = 100, message = "Limit must be between 1 and 100"))]
    pub limit: Option<u32>,

    /// Matched against name and email
    #[validate(length(max = 100, message = "Search term must be at most 100 characters"))]
    pub search: Option<String>,

    pub sort_order: Option<SortOrder>,
}

impl Normalize for UserListQuery {
    fn normalize(self) -> Self {
        Self {
            search: trim_opt(self.search),
            ..self
        }
    }
}

impl UserListQuery {
    pub fn pagination(&self) -> PaginationQuery {
        PaginationQuery {
            page: self.page,
            limit: self.limit,
            search: self.search.clone(),
            sort_order: self.sort_order,
        }
    }
}
