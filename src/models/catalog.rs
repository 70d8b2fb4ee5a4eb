use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Catalog pages are fixed at 10 products.
pub const CATALOG_PAGE_SIZE: i64 = 10;

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ProductQuery {
    /// Free-text search over product name, brand and category name.
    pub q: Option<String>,
    /// Exact brand match, case-insensitive.
    pub brand: Option<String>,
    /// One of the fixed price bucket strings, e.g. `2000000-4000000`.
    pub price: Option<String>,
    /// `asc`, `desc` or `default`.
    pub sort: Option<String>,
    pub page: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    PriceAsc,
    PriceDesc,
    Default,
}

impl SortKey {
    pub fn parse(s: &str) -> Self {
        match s {
            "asc" => SortKey::PriceAsc,
            "desc" => SortKey::PriceDesc,
            _ => SortKey::Default,
        }
    }

    pub fn as_param(&self) -> &'static str {
        match self {
            SortKey::PriceAsc => "asc",
            SortKey::PriceDesc => "desc",
            SortKey::Default => "default",
        }
    }
}

/// A fixed half-open price range `[min, max)`; the top bucket is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceBucket {
    pub min: i64,
    pub max: Option<i64>,
}

impl PriceBucket {
    /// Only the six bucket strings the storefront renders are recognized;
    /// anything else applies no price filter, as in the original UI.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "0-2000000" => Some(Self { min: 0, max: Some(2_000_000) }),
            "2000000-4000000" => Some(Self { min: 2_000_000, max: Some(4_000_000) }),
            "4000000-7000000" => Some(Self { min: 4_000_000, max: Some(7_000_000) }),
            "7000000-13000000" => Some(Self { min: 7_000_000, max: Some(13_000_000) }),
            "13000000-20000000" => Some(Self { min: 13_000_000, max: Some(20_000_000) }),
            "20000000-999999999" => Some(Self { min: 20_000_000, max: None }),
            _ => None,
        }
    }

    pub fn contains(&self, price: i64) -> bool {
        price >= self.min && self.max.map_or(true, |max| price < max)
    }
}

/// One catalog row as serialized by the products JSON endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ProductListItem {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub brand: String,
    pub price: i64,
    pub original_price: Option<i64>,
    pub discount_percent: i32,
    pub is_on_sale: bool,
    pub image: Option<String>,
    pub stock: i64,
    pub category_name: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EchoedFilters {
    pub q: String,
    pub brand: String,
    pub price: String,
    pub sort: String,
}

/// Pagination metadata mirroring Django's paginator fields the storefront
/// JavaScript depends on.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CatalogPage {
    pub products: Vec<ProductListItem>,
    pub current_page: i64,
    pub total_pages: i64,
    pub has_previous: bool,
    pub has_next: bool,
    pub previous_page: Option<String>,
    pub next_page: Option<String>,
    pub start_index: i64,
    pub end_index: i64,
    pub total_products: i64,
    pub filters: EchoedFilters,
}

/// Pure pagination arithmetic for a fixed-size page over `total` rows.
/// Out-of-range pages clamp to the last page; `start_index`/`end_index` are
/// 1-based and both 0 when there are no rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    pub page: i64,
    pub total_pages: i64,
    pub offset: i64,
    pub start_index: i64,
    pub end_index: i64,
}

pub fn page_info(requested_page: i64, total: i64, page_size: i64) -> PageInfo {
    let total_pages = if total == 0 {
        1
    } else {
        (total + page_size - 1) / page_size
    };
    let page = requested_page.clamp(1, total_pages);
    let offset = (page - 1) * page_size;
    let (start_index, end_index) = if total == 0 {
        (0, 0)
    } else {
        (offset + 1, (offset + page_size).min(total))
    };
    PageInfo {
        page,
        total_pages,
        offset,
        start_index,
        end_index,
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HomeResponse {
    pub categories: Vec<super::CategoryResponse>,
    pub special_promotions: Vec<super::PromotionResponse>,
    pub products: CatalogPage,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductDetailResponse {
    pub product: super::ProductResponse,
    pub category_name: Option<String>,
    /// Set when an active special promotion overrides the display price.
    pub promotion_discount_percent: Option<i32>,
    pub promotion_discounted_price: Option<i64>,
    pub related_products: Vec<ProductListItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_bucket_boundaries() {
        let bucket = PriceBucket::parse("2000000-4000000").unwrap();
        assert!(!bucket.contains(1_990_000));
        assert!(bucket.contains(2_000_000));
        assert!(bucket.contains(3_999_999));
        assert!(!bucket.contains(4_000_000));
    }

    #[test]
    fn test_top_bucket_is_unbounded() {
        let bucket = PriceBucket::parse("20000000-999999999").unwrap();
        assert!(bucket.contains(20_000_000));
        assert!(bucket.contains(1_000_000_000));
        assert!(!bucket.contains(19_999_999));
    }

    #[test]
    fn test_unknown_bucket_is_ignored() {
        assert_eq!(PriceBucket::parse("1-2"), None);
        assert_eq!(PriceBucket::parse(""), None);
    }

    #[test]
    fn test_sort_parsing() {
        assert_eq!(SortKey::parse("asc"), SortKey::PriceAsc);
        assert_eq!(SortKey::parse("desc"), SortKey::PriceDesc);
        assert_eq!(SortKey::parse("default"), SortKey::Default);
        assert_eq!(SortKey::parse("anything"), SortKey::Default);
    }

    #[test]
    fn test_page_info_clamps_and_indexes() {
        let info = page_info(1, 25, 10);
        assert_eq!((info.page, info.total_pages), (1, 3));
        assert_eq!((info.start_index, info.end_index), (1, 10));

        let last = page_info(3, 25, 10);
        assert_eq!((last.start_index, last.end_index), (21, 25));

        // Requests past the end land on the last page.
        let clamped = page_info(99, 25, 10);
        assert_eq!(clamped.page, 3);

        let empty = page_info(1, 0, 10);
        assert_eq!((empty.page, empty.total_pages), (1, 1));
        assert_eq!((empty.start_index, empty.end_index), (0, 0));
    }
}
