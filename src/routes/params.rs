use serde::{Deserialize, Deserializer};
use utoipa::ToSchema;

// Query structs with a flattened member are buffered by serde, which hands
// every value through as a string; accept both the string and native forms.
fn lenient_i64<'de, D>(de: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(i64),
        Text(String),
    }
    match Option::<Raw>::deserialize(de)? {
        None => Ok(None),
        Some(Raw::Num(n)) => Ok(Some(n)),
        Some(Raw::Text(s)) if s.is_empty() => Ok(None),
        Some(Raw::Text(s)) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

fn lenient_bool<'de, D>(de: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Flag(bool),
        Text(String),
    }
    match Option::<Raw>::deserialize(de)? {
        None => Ok(None),
        Some(Raw::Flag(b)) => Ok(Some(b)),
        Some(Raw::Text(s)) if s.is_empty() => Ok(None),
        Some(Raw::Text(s)) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct Pagination {
    #[serde(default, deserialize_with = "lenient_i64")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub per_page: Option<i64>,
}

impl Pagination {
    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;
        (page, per_page, offset)
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProductSortBy {
    CreatedAt,
    Price,
    Name,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProductQuery {
    #[serde(flatten)]
    pub pagination: Pagination,
    pub q: Option<String>,
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub featured: Option<bool>,
    pub sort_by: Option<ProductSortBy>,
    pub sort_order: Option<SortOrder>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderListQuery {
    #[serde(flatten)]
    pub pagination: Pagination,
    pub status: Option<String>,
    pub sort_order: Option<SortOrder>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UserListQuery {
    #[serde(flatten)]
    pub pagination: Pagination,
    pub search: Option<String>,
    pub role: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Query;
    use axum::http::Uri;

    #[test]
    fn pagination_params_parse_from_a_query_string() {
        let uri: Uri = "/api/products?page=2&per_page=10".parse().unwrap();
        let Query(query) = Query::<ProductQuery>::try_from_uri(&uri).unwrap();
        assert_eq!(query.pagination.normalize(), (2, 10, 10));
    }

    #[test]
    fn product_filters_parse_from_a_query_string() {
        let uri: Uri = "/api/products?featured=true&category=poncho&sort_by=price&sort_order=asc"
            .parse()
            .unwrap();
        let Query(query) = Query::<ProductQuery>::try_from_uri(&uri).unwrap();
        assert_eq!(query.featured, Some(true));
        assert_eq!(query.category.as_deref(), Some("poncho"));
        assert!(matches!(query.sort_by, Some(ProductSortBy::Price)));
        assert!(matches!(query.sort_order, Some(SortOrder::Asc)));
    }

    #[test]
    fn absent_pagination_params_fall_back_to_defaults() {
        let uri: Uri = "/api/orders".parse().unwrap();
        let Query(query) = Query::<OrderListQuery>::try_from_uri(&uri).unwrap();
        assert_eq!(query.pagination.normalize(), (1, 20, 0));

        let uri: Uri = "/api/users?page=3&search=jamie".parse().unwrap();
        let Query(query) = Query::<UserListQuery>::try_from_uri(&uri).unwrap();
        assert_eq!(query.pagination.normalize(), (3, 20, 40));
        assert_eq!(query.search.as_deref(), Some("jamie"));
    }

    #[test]
    fn pagination_defaults() {
        let p = Pagination {
            page: None,
            per_page: None,
        };
        assert_eq!(p.normalize(), (1, 20, 0));
    }

    #[test]
    fn pagination_clamps_out_of_range_values() {
        let p = Pagination {
            page: Some(0),
            per_page: Some(1000),
        };
        assert_eq!(p.normalize(), (1, 100, 0));

        let p = Pagination {
            page: Some(3),
            per_page: Some(10),
        };
        assert_eq!(p.normalize(), (3, 10, 20));
    }
}
