use crate::models::*;
use crate::services::{CatalogQueryService, CatalogService, PromotionService};
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/catalog/home",
    tag = "catalog",
    params(
        ("q" = Option<String>, Query, description = "Search text"),
        ("brand" = Option<String>, Query, description = "Brand filter"),
        ("price" = Option<String>, Query, description = "Price bucket, e.g. 2000000-4000000"),
        ("sort" = Option<String>, Query, description = "asc | desc | default"),
        ("page" = Option<i64>, Query, description = "Page number")
    ),
    responses(
        (status = 200, description = "Home page data: categories, promotions, first product page")
    )
)]
pub async fn home(
    catalog_service: web::Data<CatalogService>,
    query_service: web::Data<CatalogQueryService>,
    promotion_service: web::Data<PromotionService>,
    query: web::Query<ProductQuery>,
) -> Result<HttpResponse> {
    let query = query.into_inner();

    let categories = match catalog_service.list_active_categories().await {
        Ok(categories) => categories,
        Err(e) => return Ok(e.error_response()),
    };
    let special_promotions = match promotion_service.list_active_promotions().await {
        Ok(promotions) => promotions,
        Err(e) => return Ok(e.error_response()),
    };
    let products = match query_service.list_products(&query).await {
        Ok(page) => page,
        Err(e) => return Ok(e.error_response()),
    };

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": HomeResponse {
            categories,
            special_promotions,
            products,
        }
    })))
}

#[utoipa::path(
    get,
    path = "/catalog/products",
    tag = "catalog",
    params(
        ("q" = Option<String>, Query, description = "Search text"),
        ("brand" = Option<String>, Query, description = "Brand filter"),
        ("price" = Option<String>, Query, description = "Price bucket, e.g. 2000000-4000000"),
        ("sort" = Option<String>, Query, description = "asc | desc | default"),
        ("page" = Option<i64>, Query, description = "Page number")
    ),
    responses(
        (status = 200, description = "One catalog page with pagination metadata")
    )
)]
pub async fn list_products(
    query_service: web::Data<CatalogQueryService>,
    query: web::Query<ProductQuery>,
) -> Result<HttpResponse> {
    match query_service.list_products(&query.into_inner()).await {
        Ok(page) => {
            // The storefront JS expects the page fields at the top level,
            // next to the success flag.
            let mut body = match serde_json::to_value(&page) {
                Ok(body) => body,
                Err(e) => return Ok(crate::error::AppError::from(e).error_response()),
            };
            body["success"] = json!(true);
            Ok(HttpResponse::Ok().json(body))
        }
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/catalog/products/{key}",
    tag = "catalog",
    params(
        ("key" = String, Path, description = "Product id or slug")
    ),
    responses(
        (status = 200, description = "Product detail with promotion and related products"),
        (status = 404, description = "Product not found")
    )
)]
pub async fn product_detail(
    query_service: web::Data<CatalogQueryService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match query_service.product_detail(&path.into_inner()).await {
        Ok(detail) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": detail
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn catalog_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/catalog")
            .route("/home", web::get().to(home))
            .route("/products", web::get().to(list_products))
            .route("/products/{key}", web::get().to(product_detail)),
    );
}
