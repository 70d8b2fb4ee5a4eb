//! Seed the database with sample categories, products and coupons.
//!
//! Idempotent: existing categories and coupons are left alone, and product
//! slug collisions resolve by suffixing instead of failing, so the command
//! can be re-run after partial imports.

use chrono::{Duration, Utc};
use env_logger::Env;
use serde_json::json;

use shopmobile_backend::{
    config::Config,
    database::{create_pool, run_migrations},
    error::AppResult,
    models::*,
    services::{CatalogService, CouponService},
};

struct SeedProduct {
    name: &'static str,
    description: &'static str,
    price: i64,
    original_price: Option<i64>,
    brand: &'static str,
    category: &'static str,
    image: &'static str,
    stock: i64,
    is_featured: bool,
}

const CATEGORIES: &[(&str, i32)] = &[
    ("iPhone", 1),
    ("Samsung", 2),
    ("Xiaomi", 3),
    ("OPPO", 4),
    ("vivo", 5),
    ("realme", 6),
    ("Honor", 7),
    ("RedMagic", 8),
    ("Tecno", 9),
    ("Benco", 10),
];

const PRODUCTS: &[SeedProduct] = &[
    SeedProduct {
        name: "iPhone 16 Pro Max 256GB",
        description: "iPhone 16 Pro Max voi man hinh Super Retina XDR 6.9 inch, chip A18 Pro, camera 48MP.",
        price: 34_990_000,
        original_price: None,
        brand: "Apple",
        category: "iPhone",
        image: "images/products/iphone/iphone-16-pro-max.jpg",
        stock: 50,
        is_featured: true,
    },
    SeedProduct {
        name: "iPhone 16 Pro 128GB",
        description: "iPhone 16 Pro voi camera tetraprism 5x, chip A18 Pro, thiet ke sang trong.",
        price: 28_990_000,
        original_price: Some(32_990_000),
        brand: "Apple",
        category: "iPhone",
        image: "images/products/iphone/iphone-16-pro.jpg",
        stock: 30,
        is_featured: true,
    },
    SeedProduct {
        name: "iPhone 15 Pro Max 256GB",
        description: "iPhone 15 Pro Max voi khung titanium, chip A17 Pro, camera 5x quang hoc.",
        price: 32_990_000,
        original_price: Some(39_990_000),
        brand: "Apple",
        category: "iPhone",
        image: "images/products/iphone/iphone-15-pro-max.jpg",
        stock: 25,
        is_featured: true,
    },
    SeedProduct {
        name: "iPhone 15 128GB",
        description: "iPhone 15 voi Dynamic Island, camera 48MP, cong USB-C.",
        price: 19_990_000,
        original_price: None,
        brand: "Apple",
        category: "iPhone",
        image: "images/products/iphone/iphone-15.jpg",
        stock: 80,
        is_featured: false,
    },
    SeedProduct {
        name: "Samsung Galaxy S24 Ultra 256GB",
        description: "Samsung Galaxy S24 Ultra voi S Pen, camera 200MP, AI features.",
        price: 28_990_000,
        original_price: Some(34_990_000),
        brand: "Samsung",
        category: "Samsung",
        image: "images/products/samsung/s24-ultra.jpg",
        stock: 40,
        is_featured: true,
    },
    SeedProduct {
        name: "Samsung Galaxy S24+ 256GB",
        description: "Samsung Galaxy S24+ voi man hinh 6.7 inch, chip Snapdragon 8 Gen 3.",
        price: 24_990_000,
        original_price: None,
        brand: "Samsung",
        category: "Samsung",
        image: "images/products/samsung/s24-plus.jpg",
        stock: 35,
        is_featured: false,
    },
    SeedProduct {
        name: "Xiaomi 14 Ultra 512GB",
        description: "Xiaomi 14 Ultra voi ong kinh Leica, Snapdragon 8 Gen 3.",
        price: 24_990_000,
        original_price: Some(27_990_000),
        brand: "Xiaomi",
        category: "Xiaomi",
        image: "images/products/xiaomi/14-ultra.jpg",
        stock: 20,
        is_featured: true,
    },
    SeedProduct {
        name: "Redmi Note 13 Pro 256GB",
        description: "Redmi Note 13 Pro voi camera 200MP, sac nhanh 67W.",
        price: 7_290_000,
        original_price: Some(8_290_000),
        brand: "Xiaomi",
        category: "Xiaomi",
        image: "images/products/xiaomi/redmi-note-13-pro.jpg",
        stock: 120,
        is_featured: false,
    },
    SeedProduct {
        name: "OPPO Reno11 F 5G",
        description: "OPPO Reno11 F 5G voi camera chan dung 64MP, thiet ke mong nhe.",
        price: 8_990_000,
        original_price: Some(10_990_000),
        brand: "OPPO",
        category: "OPPO",
        image: "images/products/oppo/reno11-f.jpg",
        stock: 60,
        is_featured: false,
    },
    SeedProduct {
        name: "Benco S1",
        description: "Benco S1 man hinh lon, pin 5000mAh, gia tot.",
        price: 1_890_000,
        original_price: None,
        brand: "Benco",
        category: "Benco",
        image: "images/products/benco/s1.jpg",
        stock: 200,
        is_featured: false,
    },
];

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = Config::from_toml().expect("Failed to load configuration file");
    let pool = create_pool(&config.database)
        .await
        .expect("Failed to create database connection pool");
    run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    let catalog_service = CatalogService::new(pool.clone());
    let coupon_service = CouponService::new(pool.clone());

    log::info!("Starting database seeding...");
    seed(&pool, &catalog_service, &coupon_service)
        .await
        .expect("Seeding failed");
    log::info!("Database seeding completed");

    Ok(())
}

async fn seed(
    pool: &sqlx::PgPool,
    catalog_service: &CatalogService,
    coupon_service: &CouponService,
) -> AppResult<()> {
    use shopmobile_backend::error::AppError;

    let mut category_ids = std::collections::HashMap::new();
    for (name, sort_order) in CATEGORIES {
        match catalog_service
            .create_category(CreateCategoryRequest {
                name: name.to_string(),
                slug: None,
                description: String::new(),
                image: None,
                is_active: Some(true),
                sort_order: Some(*sort_order),
            })
            .await
        {
            Ok(category) => {
                log::info!("Created category: {}", category.name);
                category_ids.insert(*name, category.id);
            }
            Err(AppError::Conflict(_)) => {
                let id: i64 = sqlx::query_scalar("SELECT id FROM categories WHERE name = $1")
                    .bind(*name)
                    .fetch_one(pool)
                    .await?;
                category_ids.insert(*name, id);
                log::info!("Category already exists: {name}");
            }
            Err(e) => return Err(e),
        }
    }

    for product in PRODUCTS {
        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM products WHERE name = $1")
            .bind(product.name)
            .fetch_optional(pool)
            .await?;
        if exists.is_some() {
            log::info!("Product already exists: {}", product.name);
            continue;
        }

        let created = catalog_service
            .import_product(CreateProductRequest {
                name: product.name.to_string(),
                description: product.description.to_string(),
                price: product.price,
                original_price: product.original_price,
                image: Some(product.image.to_string()),
                category_id: category_ids.get(product.category).copied(),
                brand: product.brand.to_string(),
                stock: product.stock,
                is_active: Some(true),
                is_featured: Some(product.is_featured),
                discount_percent: None,
                storage_options: json!(["128GB", "256GB", "512GB"]),
                color_options: json!([]),
                warranty_options: json!(["12 thang chinh hang"]),
                specifications: json!({}),
                free_shipping: true,
                allow_open_box: true,
                return_policy_30days: false,
            })
            .await?;
        log::info!("Created product: {} ({})", created.name, created.slug);
    }

    let now = Utc::now();
    let coupons = [
        CreateCouponRequest {
            code: "WELCOME500".to_string(),
            name: "Chao mung thanh vien moi".to_string(),
            description: "Giam 500k cho don hang tu 5 trieu".to_string(),
            discount_type: DiscountType::Amount,
            discount_value: 500_000,
            min_order_amount: 5_000_000,
            max_discount: Some(500_000),
            start_date: Some(now - Duration::days(1)),
            end_date: Some(now + Duration::days(90)),
            usage_limit: Some(1000),
        },
        CreateCouponRequest {
            code: "SALE10".to_string(),
            name: "Giam 10% toan bo".to_string(),
            description: "Giam 10% cho tat ca san pham, toi da 200k".to_string(),
            discount_type: DiscountType::Percent,
            discount_value: 10,
            min_order_amount: 0,
            max_discount: Some(200_000),
            start_date: Some(now - Duration::days(1)),
            end_date: Some(now + Duration::days(30)),
            usage_limit: Some(500),
        },
        CreateCouponRequest {
            code: "FREESHIP".to_string(),
            name: "Mien phi van chuyen".to_string(),
            description: "Mien phi van chuyen cho don hang tu 2 trieu".to_string(),
            discount_type: DiscountType::Amount,
            discount_value: 30_000,
            min_order_amount: 2_000_000,
            max_discount: Some(30_000),
            start_date: Some(now - Duration::days(1)),
            end_date: Some(now + Duration::days(60)),
            usage_limit: Some(2000),
        },
        CreateCouponRequest {
            code: "NEWYEAR2026".to_string(),
            name: "Tet 2026 Sale".to_string(),
            description: "Giam 15% cho don hang tu 10 trieu".to_string(),
            discount_type: DiscountType::Percent,
            discount_value: 15,
            min_order_amount: 10_000_000,
            max_discount: Some(3_000_000),
            start_date: Some(now - Duration::days(1)),
            end_date: Some(now + Duration::days(30)),
            usage_limit: Some(300),
        },
    ];

    for coupon in coupons {
        let code = coupon.code.clone();
        match coupon_service.create_coupon(coupon).await {
            Ok(created) => log::info!("Created coupon: {}", created.code),
            Err(AppError::Conflict(_)) => log::info!("Coupon already exists: {code}"),
            Err(e) => return Err(e),
        }
    }

    Ok(())
}
