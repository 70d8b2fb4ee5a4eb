use crate::error::{AppError, AppResult};
use crate::models::*;
use sqlx::{PgPool, Postgres, QueryBuilder};

#[derive(Clone)]
pub struct CatalogQueryService {
    pool: PgPool,
}

/// Normalized filter set shared by the count and page queries.
struct Filters {
    q: String,
    brand: String,
    price: String,
    bucket: Option<PriceBucket>,
    sort: SortKey,
}

impl Filters {
    fn from_query(query: &ProductQuery) -> Self {
        let q = query.q.clone().unwrap_or_default().trim().to_string();
        let brand = query.brand.clone().unwrap_or_default().trim().to_string();
        let price = query.price.clone().unwrap_or_default();
        let bucket = PriceBucket::parse(&price);
        let sort = SortKey::parse(query.sort.as_deref().unwrap_or("default"));
        Self {
            q,
            brand,
            price,
            bucket,
            sort,
        }
    }

    fn echoed(&self) -> EchoedFilters {
        EchoedFilters {
            q: self.q.clone(),
            brand: self.brand.clone(),
            price: self.price.clone(),
            sort: self.sort.as_param().to_string(),
        }
    }

    /// WHERE fragment appended to both the count and the page query. The
    /// category join is present in both, so category-name search stays
    /// consistent.
    fn push_where(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        qb.push(" WHERE p.is_active = TRUE");

        if !self.q.is_empty() {
            let pattern = format!("%{}%", self.q);
            qb.push(" AND (p.name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR p.brand ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR c.name ILIKE ")
                .push_bind(pattern)
                .push(")");
        }

        if !self.brand.is_empty() {
            qb.push(" AND lower(p.brand) = lower(")
                .push_bind(self.brand.clone())
                .push(")");
        }

        if let Some(bucket) = self.bucket {
            qb.push(" AND p.price >= ").push_bind(bucket.min);
            if let Some(max) = bucket.max {
                qb.push(" AND p.price < ").push_bind(max);
            }
        }
    }

    fn order_by(&self) -> &'static str {
        match self.sort {
            SortKey::PriceAsc => " ORDER BY p.price ASC",
            SortKey::PriceDesc => " ORDER BY p.price DESC",
            SortKey::Default => " ORDER BY p.created_at DESC, p.is_featured DESC",
        }
    }
}

/// Rebuild the query string for a pagination link, echoing only the filters
/// the client actually set.
fn build_page_link(filters: &EchoedFilters, page: i64) -> String {
    let mut params: Vec<String> = Vec::new();
    if !filters.q.is_empty() {
        params.push(format!("q={}", filters.q));
    }
    if !filters.brand.is_empty() {
        params.push(format!("brand={}", filters.brand));
    }
    if !filters.price.is_empty() {
        params.push(format!("price={}", filters.price));
    }
    if filters.sort != "default" {
        params.push(format!("sort={}", filters.sort));
    }
    params.push(format!("page={page}"));
    format!("?{}", params.join("&"))
}

impl CatalogQueryService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Search/filter/sort/paginate over active products. Pages are fixed at
    /// ten rows; requests past the end clamp to the last page.
    pub async fn list_products(&self, query: &ProductQuery) -> AppResult<CatalogPage> {
        let filters = Filters::from_query(query);

        let mut count_qb = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM products p LEFT JOIN categories c ON c.id = p.category_id",
        );
        filters.push_where(&mut count_qb);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let info = page_info(query.page.unwrap_or(1), total, CATALOG_PAGE_SIZE);

        let mut page_qb = QueryBuilder::<Postgres>::new(
            r#"
            SELECT
                p.id, p.name, p.slug, p.brand, p.price, p.original_price,
                p.discount_percent,
                (p.original_price IS NOT NULL AND p.original_price > p.price) AS is_on_sale,
                p.image, p.stock,
                COALESCE(c.name, '') AS category_name
            FROM products p
            LEFT JOIN categories c ON c.id = p.category_id
            "#,
        );
        filters.push_where(&mut page_qb);
        page_qb.push(filters.order_by());
        page_qb
            .push(" LIMIT ")
            .push_bind(CATALOG_PAGE_SIZE)
            .push(" OFFSET ")
            .push_bind(info.offset);

        let products: Vec<ProductListItem> = page_qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await?;

        let echoed = filters.echoed();
        let has_previous = info.page > 1;
        let has_next = info.page < info.total_pages;

        Ok(CatalogPage {
            products,
            current_page: info.page,
            total_pages: info.total_pages,
            has_previous,
            has_next,
            previous_page: has_previous.then(|| build_page_link(&echoed, info.page - 1)),
            next_page: has_next.then(|| build_page_link(&echoed, info.page + 1)),
            start_index: info.start_index,
            end_index: info.end_index,
            total_products: total,
            filters: echoed,
        })
    }

    /// Detail read model keyed by numeric id or slug; inactive products are
    /// not exposed. Includes any active special promotion and up to five
    /// related products from the same category.
    pub async fn product_detail(&self, key: &str) -> AppResult<ProductDetailResponse> {
        let product = match key.parse::<i64>() {
            Ok(id) => {
                sqlx::query_as::<_, Product>(
                    "SELECT * FROM products WHERE id = $1 AND is_active",
                )
                .bind(id)
                .fetch_optional(&self.pool)
                .await?
            }
            Err(_) => {
                sqlx::query_as::<_, Product>(
                    "SELECT * FROM products WHERE slug = $1 AND is_active",
                )
                .bind(key)
                .fetch_optional(&self.pool)
                .await?
            }
        };

        let product =
            product.ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

        let category_name: Option<String> = match product.category_id {
            Some(category_id) => {
                sqlx::query_scalar("SELECT name FROM categories WHERE id = $1")
                    .bind(category_id)
                    .fetch_optional(&self.pool)
                    .await?
            }
            None => None,
        };

        let promotion: Option<(i32,)> = sqlx::query_as(
            "SELECT discount_percent FROM special_promotions
             WHERE product_id = $1 AND is_active",
        )
        .bind(product.id)
        .fetch_optional(&self.pool)
        .await?;
        let promotion_discount_percent = promotion.map(|(p,)| p);
        let promotion_discounted_price =
            promotion_discount_percent.map(|p| discounted_price(product.price, p));

        let related_products: Vec<ProductListItem> = match product.category_id {
            Some(category_id) => {
                sqlx::query_as(
                    r#"
                    SELECT
                        p.id, p.name, p.slug, p.brand, p.price, p.original_price,
                        p.discount_percent,
                        (p.original_price IS NOT NULL AND p.original_price > p.price) AS is_on_sale,
                        p.image, p.stock,
                        COALESCE(c.name, '') AS category_name
                    FROM products p
                    LEFT JOIN categories c ON c.id = p.category_id
                    WHERE p.category_id = $1 AND p.is_active AND p.id <> $2
                    ORDER BY p.created_at DESC
                    LIMIT 5
                    "#,
                )
                .bind(category_id)
                .bind(product.id)
                .fetch_all(&self.pool)
                .await?
            }
            None => Vec::new(),
        };

        Ok(ProductDetailResponse {
            product: ProductResponse::from(product),
            category_name,
            promotion_discount_percent,
            promotion_discounted_price,
            related_products,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn echoed(q: &str, brand: &str, price: &str, sort: &str) -> EchoedFilters {
        EchoedFilters {
            q: q.to_string(),
            brand: brand.to_string(),
            price: price.to_string(),
            sort: sort.to_string(),
        }
    }

    #[test]
    fn test_build_page_link_with_all_filters() {
        let link = build_page_link(&echoed("iphone", "Apple", "2000000-4000000", "asc"), 3);
        assert_eq!(link, "?q=iphone&brand=Apple&price=2000000-4000000&sort=asc&page=3");
    }

    #[test]
    fn test_build_page_link_omits_defaults() {
        let link = build_page_link(&echoed("", "", "", "default"), 2);
        assert_eq!(link, "?page=2");
    }
}
