use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::query::{PaginationQuery, SortOrder};
use super::{error, trim_opt, Normalize};

/// Columns a product listing may be ordered by
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProductSortField {
    Price,
    Name,
    Rating,
    #[default]
    CreatedAt,
}

impl ProductSortField {
    /// Column name, safe to interpolate into ORDER BY
    pub fn column(&self) -> &'static str {
        match self {
            ProductSortField::Price => "price",
            ProductSortField::Name => "name",
            ProductSortField::Rating => "rating",
            ProductSortField::CreatedAt => "created_at",
        }
    }
}

/// Product search query string
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_price_range"))]
pub struct ProductFilterQuery {
    #[validate(length(max = 100, message = "Search term must be at most 100 characters"))]
    pub search: Option<String>,

    pub vendor_id: Option<Uuid>,

    pub vendor_type_id: Option<Uuid>,

    #[validate(range(min = 0.0, message = "Minimum price cannot be negative"))]
    pub min_price: Option<f64>,

    #[validate(range(min = 0.0, message = "Maximum price cannot be negative"))]
    pub max_price: Option<f64>,

    pub is_available: Option<bool>,

    pub is_vegetarian: Option<bool>,

    pub sort_by: Option<ProductSortField>,

    pub sort_order: Option<SortOrder>,

    #[validate(range(min = 1, message = "Page must be at least 1"))]
    pub page: Option<u32>,

    #[validate(range(min = 1, max = 100, message = "Limit must be between 1 and 100"))]
    pub limit: Option<u32>,
}

impl Normalize for ProductFilterQuery {
    fn normalize(self) -> Self {
        Self {
            search: trim_opt(self.search),
            ..self
        }
    }
}

impl ProductFilterQuery {
    pub fn pagination(&self) -> PaginationQuery {
        PaginationQuery {
            page: self.page,
            limit: self.limit,
            search: None,
            sort_order: self.sort_order,
        }
    }

    pub fn sort_field(&self) -> ProductSortField {
        self.sort_by.unwrap_or_default()
    }

    pub fn order(&self) -> SortOrder {
        self.sort_order.unwrap_or_default()
    }
}

fn validate_price_range(query: &ProductFilterQuery) -> Result<(), ValidationError> {
    // NaN slips past range checks since every comparison with it is false
    let prices = [query.min_price, query.max_price];
    if prices.iter().flatten().any(|p| !p.is_finite()) {
        return Err(error("price", "Price filters must be finite numbers"));
    }
    if let (Some(min), Some(max)) = (query.min_price, query.max_price) {
        if min > max {
            return Err(error(
                "price_range",
                "Minimum price cannot be greater than maximum price",
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::prepare;

    fn parse(query: &str) -> Result<ProductFilterQuery, actix_web::error::QueryPayloadError> {
        actix_web::web::Query::<ProductFilterQuery>::from_query(query).map(|q| q.into_inner())
    }

    #[test]
    fn empty_query_is_valid() {
        let q = prepare(parse("").unwrap()).unwrap();
        assert_eq!(q.sort_field(), ProductSortField::CreatedAt);
        assert_eq!(q.order(), SortOrder::Desc);
        assert_eq!(q.pagination().offset(), 0);
    }

    #[test]
    fn parses_full_filter() {
        let q = parse(
            "search=%20pizza%20&min_price=5&max_price=20.5&is_vegetarian=true&sort_by=price&sort_order=asc&page=2&limit=10",
        )
        .unwrap();
        let q = prepare(q).unwrap();
        assert_eq!(q.search.as_deref(), Some("pizza"));
        assert_eq!(q.min_price, Some(5.0));
        assert_eq!(q.is_vegetarian, Some(true));
        assert_eq!(q.sort_field().column(), "price");
        assert_eq!(q.order(), SortOrder::Asc);
        assert_eq!(q.pagination().offset(), 10);
    }

    #[test]
    fn non_numeric_price_fails_to_parse() {
        assert!(parse("min_price=cheap").is_err());
    }

    #[test]
    fn unknown_sort_field_fails_to_parse() {
        assert!(parse("sort_by=calories").is_err());
    }

    #[test]
    fn negative_price_is_rejected() {
        let errors = prepare(parse("min_price=-1").unwrap()).unwrap_err();
        assert_eq!(errors, vec!["Minimum price cannot be negative".to_string()]);
    }

    #[test]
    fn inverted_price_range_is_rejected() {
        let errors = prepare(parse("min_price=30&max_price=10").unwrap()).unwrap_err();
        assert_eq!(
            errors,
            vec!["Minimum price cannot be greater than maximum price".to_string()]
        );
    }

    #[test]
    fn non_finite_prices_are_rejected() {
        for query in ["min_price=NaN", "max_price=NaN", "max_price=inf", "min_price=1&max_price=NaN"] {
            let errors = prepare(parse(query).unwrap()).unwrap_err();
            assert_eq!(errors, vec!["Price filters must be finite numbers".to_string()], "{}", query);
        }
    }

    #[test]
    fn limit_above_maximum_is_rejected() {
        let errors = prepare(parse("limit=500").unwrap()).unwrap_err();
        assert_eq!(errors, vec!["Limit must be between 1 and 100".to_string()]);
    }
}
