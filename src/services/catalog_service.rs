use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::{derive_slug, resolve_slug};
use sqlx::PgPool;

/// Display bucket for products whose brand is blank; sorted after all real
/// brands in the admin listing.
pub const NO_BRAND_LABEL: &str = "No brand";

#[derive(Clone)]
pub struct CatalogService {
    pool: PgPool,
}

impl CatalogService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---- categories ----

    pub async fn list_active_categories(&self) -> AppResult<Vec<CategoryResponse>> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT * FROM categories WHERE is_active ORDER BY sort_order, name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories.into_iter().map(CategoryResponse::from).collect())
    }

    pub async fn create_category(&self, request: CreateCategoryRequest) -> AppResult<Category> {
        let name = request.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::ValidationError(
                "Category name is required".to_string(),
            ));
        }

        let slug = match &request.slug {
            Some(slug) if !slug.trim().is_empty() => slug.trim().to_string(),
            // Category slugs only fold spaces, unlike product slugs.
            _ => name.to_lowercase().replace(' ', "-"),
        };

        let taken: Option<i64> = sqlx::query_scalar(
            "SELECT id FROM categories WHERE name = $1 OR slug = $2",
        )
        .bind(&name)
        .bind(&slug)
        .fetch_optional(&self.pool)
        .await?;
        if taken.is_some() {
            return Err(AppError::Conflict(
                "A category with this name or slug already exists".to_string(),
            ));
        }

        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name, slug, description, image, is_active, sort_order)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&name)
        .bind(&slug)
        .bind(&request.description)
        .bind(&request.image)
        .bind(request.is_active.unwrap_or(true))
        .bind(request.sort_order.unwrap_or(0))
        .fetch_one(&self.pool)
        .await?;

        Ok(category)
    }

    /// Products keep existing; the FK detaches them (SET NULL).
    pub async fn delete_category(&self, category_id: i64) -> AppResult<()> {
        let deleted = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(category_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if deleted == 0 {
            return Err(AppError::NotFound("Category not found".to_string()));
        }
        Ok(())
    }

    // ---- products ----

    /// Admin creation path: a duplicate slug is a validation failure, never
    /// auto-suffixed. Derived fields are normalized immediately before the
    /// insert.
    pub async fn create_product(&self, request: CreateProductRequest) -> AppResult<Product> {
        let name = request.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::ValidationError(
                "Product name is required".to_string(),
            ));
        }
        if request.price < 0 || request.original_price.is_some_and(|p| p < 0) {
            return Err(AppError::ValidationError(
                "Price must not be negative".to_string(),
            ));
        }
        if request.stock < 0 {
            return Err(AppError::ValidationError(
                "Stock must not be negative".to_string(),
            ));
        }

        let slug = derive_slug(&name);
        let taken: Option<i64> = sqlx::query_scalar("SELECT id FROM products WHERE slug = $1")
            .bind(&slug)
            .fetch_optional(&self.pool)
            .await?;
        if taken.is_some() {
            return Err(AppError::Conflict(
                "A product with this name already exists".to_string(),
            ));
        }

        self.insert_product(&name, &slug, &request).await
    }

    /// Seed/bulk-import path: slug collisions are resolved by appending
    /// `-1`, `-2`, ... instead of failing.
    pub async fn import_product(&self, request: CreateProductRequest) -> AppResult<Product> {
        let name = request.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::ValidationError(
                "Product name is required".to_string(),
            ));
        }

        let base = derive_slug(&name);
        let taken: Vec<String> = sqlx::query_scalar(
            "SELECT slug FROM products WHERE slug = $1 OR slug LIKE $2",
        )
        .bind(&base)
        .bind(format!("{base}-%"))
        .fetch_all(&self.pool)
        .await?;
        let taken: std::collections::HashSet<String> = taken.into_iter().collect();
        let slug = resolve_slug(&base, |s| taken.contains(s));

        self.insert_product(&name, &slug, &request).await
    }

    async fn insert_product(
        &self,
        name: &str,
        slug: &str,
        request: &CreateProductRequest,
    ) -> AppResult<Product> {
        let discount_percent = derive_discount_percent(
            request.price,
            request.original_price,
            request.discount_percent.unwrap_or(0),
        );
        let is_out_of_stock = derive_out_of_stock(request.stock);

        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (
                name, slug, description, price, original_price, image,
                category_id, brand, stock, is_active, is_featured,
                discount_percent, storage_options, color_options,
                warranty_options, specifications, free_shipping,
                allow_open_box, return_policy_30days, is_out_of_stock
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                $15, $16, $17, $18, $19, $20
            )
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(slug)
        .bind(&request.description)
        .bind(request.price)
        .bind(request.original_price)
        .bind(&request.image)
        .bind(request.category_id)
        .bind(request.brand.trim())
        .bind(request.stock)
        .bind(request.is_active.unwrap_or(true))
        .bind(request.is_featured.unwrap_or(false))
        .bind(discount_percent)
        .bind(&request.storage_options)
        .bind(&request.color_options)
        .bind(&request.warranty_options)
        .bind(&request.specifications)
        .bind(request.free_shipping)
        .bind(request.allow_open_box)
        .bind(request.return_policy_30days)
        .bind(is_out_of_stock)
        .fetch_one(&self.pool)
        .await?;

        Ok(product)
    }

    /// Every save re-runs the derivation rules, so a stock change flips
    /// `is_out_of_stock` and a price change recomputes the discount.
    pub async fn update_product(
        &self,
        product_id: i64,
        request: UpdateProductRequest,
    ) -> AppResult<Product> {
        let current = self.get_product_by_id(product_id).await?;

        let name = match &request.name {
            Some(name) if !name.trim().is_empty() => name.trim().to_string(),
            Some(_) => {
                return Err(AppError::ValidationError(
                    "Product name is required".to_string(),
                ));
            }
            None => current.name.clone(),
        };
        let price = request.price.unwrap_or(current.price);
        let original_price = request.original_price.or(current.original_price);
        let stock = request.stock.unwrap_or(current.stock);
        if price < 0 || stock < 0 {
            return Err(AppError::ValidationError(
                "Price and stock must not be negative".to_string(),
            ));
        }

        let discount_percent =
            derive_discount_percent(price, original_price, current.discount_percent);
        let is_out_of_stock = derive_out_of_stock(stock);

        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products SET
                name = $1,
                description = $2,
                price = $3,
                original_price = $4,
                image = $5,
                category_id = $6,
                brand = $7,
                stock = $8,
                is_active = $9,
                is_featured = $10,
                discount_percent = $11,
                storage_options = $12,
                color_options = $13,
                warranty_options = $14,
                specifications = $15,
                free_shipping = $16,
                allow_open_box = $17,
                return_policy_30days = $18,
                is_out_of_stock = $19,
                updated_at = now()
            WHERE id = $20
            RETURNING *
            "#,
        )
        .bind(&name)
        .bind(request.description.as_deref().unwrap_or(&current.description))
        .bind(price)
        .bind(original_price)
        .bind(request.image.as_deref().or(current.image.as_deref()))
        .bind(request.category_id.or(current.category_id))
        .bind(request.brand.as_deref().unwrap_or(&current.brand).trim())
        .bind(stock)
        .bind(request.is_active.unwrap_or(current.is_active))
        .bind(request.is_featured.unwrap_or(current.is_featured))
        .bind(discount_percent)
        .bind(request.storage_options.as_ref().unwrap_or(&current.storage_options))
        .bind(request.color_options.as_ref().unwrap_or(&current.color_options))
        .bind(request.warranty_options.as_ref().unwrap_or(&current.warranty_options))
        .bind(request.specifications.as_ref().unwrap_or(&current.specifications))
        .bind(request.free_shipping.unwrap_or(current.free_shipping))
        .bind(request.allow_open_box.unwrap_or(current.allow_open_box))
        .bind(request.return_policy_30days.unwrap_or(current.return_policy_30days))
        .bind(is_out_of_stock)
        .bind(product_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(product)
    }

    pub async fn delete_product(&self, product_id: i64) -> AppResult<()> {
        let deleted = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(product_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if deleted == 0 {
            return Err(AppError::NotFound("Product not found".to_string()));
        }
        Ok(())
    }

    pub async fn get_product_by_id(&self, product_id: i64) -> AppResult<Product> {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
            .bind(product_id)
            .fetch_optional(&self.pool)
            .await?;

        product.ok_or_else(|| AppError::NotFound("Product not found".to_string()))
    }

    /// Admin listing: all products newest-first, grouped by brand.
    pub async fn admin_products_by_brand(&self) -> AppResult<Vec<BrandGroup>> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT * FROM products ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(group_by_brand(products))
    }
}

#[derive(Debug, serde::Serialize, utoipa::ToSchema)]
pub struct BrandGroup {
    pub brand: String,
    pub products: Vec<ProductResponse>,
}

/// Group products by trimmed, case-preserving brand. Brands sort
/// alphabetically; blank-brand products land in a trailing bucket.
pub fn group_by_brand(products: Vec<Product>) -> Vec<BrandGroup> {
    let mut by_brand: Vec<(String, Vec<Product>)> = Vec::new();
    let mut without_brand: Vec<Product> = Vec::new();

    for product in products {
        let brand = product.brand.trim().to_string();
        if brand.is_empty() {
            without_brand.push(product);
            continue;
        }
        match by_brand.iter_mut().find(|(b, _)| *b == brand) {
            Some((_, group)) => group.push(product),
            None => by_brand.push((brand, vec![product])),
        }
    }

    by_brand.sort_by(|(a, _), (b, _)| a.cmp(b));
    if !without_brand.is_empty() {
        by_brand.push((NO_BRAND_LABEL.to_string(), without_brand));
    }

    by_brand
        .into_iter()
        .map(|(brand, products)| BrandGroup {
            brand,
            products: products.into_iter().map(ProductResponse::from).collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn product(name: &str, brand: &str) -> Product {
        Product {
            id: 0,
            name: name.to_string(),
            slug: crate::utils::derive_slug(name),
            description: String::new(),
            price: 1_000_000,
            original_price: None,
            image: None,
            category_id: None,
            brand: brand.to_string(),
            stock: 1,
            is_active: true,
            is_featured: false,
            discount_percent: 0,
            storage_options: serde_json::json!([]),
            color_options: serde_json::json!([]),
            warranty_options: serde_json::json!([]),
            specifications: serde_json::json!({}),
            free_shipping: false,
            allow_open_box: false,
            return_policy_30days: false,
            is_out_of_stock: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_group_by_brand_sorted_with_blank_last() {
        let groups = group_by_brand(vec![
            product("Galaxy S24", "Samsung"),
            product("Redmi Note 13", "Xiaomi"),
            product("Mystery Phone", "  "),
            product("Galaxy A55", "Samsung"),
            product("Benco S1", "Benco"),
        ]);

        let brands: Vec<&str> = groups.iter().map(|g| g.brand.as_str()).collect();
        assert_eq!(brands, vec!["Benco", "Samsung", "Xiaomi", NO_BRAND_LABEL]);
        assert_eq!(groups[1].products.len(), 2);
    }

    #[test]
    fn test_group_by_brand_trims_but_preserves_case() {
        let groups = group_by_brand(vec![product("Benco S1", " Benco ")]);
        assert_eq!(groups[0].brand, "Benco");
    }

    #[test]
    fn test_group_by_brand_empty() {
        assert!(group_by_brand(vec![]).is_empty());
    }
}
