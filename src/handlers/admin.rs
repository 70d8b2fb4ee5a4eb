use crate::handlers::user::get_user_id_from_request;
use crate::models::*;
use crate::services::{
    CatalogService, CouponService, OrderService, PromotionService, UserService,
};
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use chrono::Utc;
use serde_json::json;

/// Every admin route runs through this gate first; staff rights are read
/// from the database, not the token.
async fn require_staff(user_service: &UserService, req: &HttpRequest) -> Result<(), HttpResponse> {
    let user_id = get_user_id_from_request(req).unwrap_or(0);
    match user_service.ensure_staff(user_id).await {
        Ok(_) => Ok(()),
        Err(e) => Err(e.error_response()),
    }
}

// ---- dashboard ----

#[utoipa::path(
    get,
    path = "/admin/dashboard",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Order and revenue statistics", body = DashboardResponse),
        (status = 403, description = "Not a staff user")
    )
)]
pub async fn dashboard(
    user_service: web::Data<UserService>,
    order_service: web::Data<OrderService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    if let Err(resp) = require_staff(&user_service, &req).await {
        return Ok(resp);
    }

    match order_service.dashboard(Utc::now()).await {
        Ok(stats) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": stats
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

// ---- products ----

#[utoipa::path(
    get,
    path = "/admin/products",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "All products grouped by brand"),
        (status = 403, description = "Not a staff user")
    )
)]
pub async fn list_products(
    user_service: web::Data<UserService>,
    catalog_service: web::Data<CatalogService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    if let Err(resp) = require_staff(&user_service, &req).await {
        return Ok(resp);
    }

    match catalog_service.admin_products_by_brand().await {
        Ok(groups) => {
            let total_products: usize = groups.iter().map(|g| g.products.len()).sum();
            Ok(HttpResponse::Ok().json(json!({
                "success": true,
                "data": {
                    "brands": groups,
                    "total_products": total_products
                }
            })))
        }
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/products",
    tag = "admin",
    request_body = CreateProductRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Product created", body = ProductResponse),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "Duplicate product name")
    )
)]
pub async fn add_product(
    user_service: web::Data<UserService>,
    catalog_service: web::Data<CatalogService>,
    req: HttpRequest,
    request: web::Json<CreateProductRequest>,
) -> Result<HttpResponse> {
    if let Err(resp) = require_staff(&user_service, &req).await {
        return Ok(resp);
    }

    match catalog_service.create_product(request.into_inner()).await {
        Ok(product) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "product": ProductResponse::from(product) },
            "message": "Product created"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/admin/products/{id}",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "Product id")
    ),
    request_body = UpdateProductRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 404, description = "Product not found")
    )
)]
pub async fn update_product(
    user_service: web::Data<UserService>,
    catalog_service: web::Data<CatalogService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdateProductRequest>,
) -> Result<HttpResponse> {
    if let Err(resp) = require_staff(&user_service, &req).await {
        return Ok(resp);
    }

    match catalog_service
        .update_product(path.into_inner(), request.into_inner())
        .await
    {
        Ok(product) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "product": ProductResponse::from(product) },
            "message": "Product updated"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/admin/products/{id}",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "Product id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Product deleted"),
        (status = 404, description = "Product not found")
    )
)]
pub async fn delete_product(
    user_service: web::Data<UserService>,
    catalog_service: web::Data<CatalogService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    if let Err(resp) = require_staff(&user_service, &req).await {
        return Ok(resp);
    }

    match catalog_service.delete_product(path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Product deleted"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

// ---- categories ----

#[utoipa::path(
    post,
    path = "/admin/categories",
    tag = "admin",
    request_body = CreateCategoryRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Category created"),
        (status = 409, description = "Duplicate category name or slug")
    )
)]
pub async fn add_category(
    user_service: web::Data<UserService>,
    catalog_service: web::Data<CatalogService>,
    req: HttpRequest,
    request: web::Json<CreateCategoryRequest>,
) -> Result<HttpResponse> {
    if let Err(resp) = require_staff(&user_service, &req).await {
        return Ok(resp);
    }

    match catalog_service.create_category(request.into_inner()).await {
        Ok(category) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "category": CategoryResponse::from(category) },
            "message": "Category created"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/admin/categories/{id}",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "Category id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Category deleted; its products are detached"),
        (status = 404, description = "Category not found")
    )
)]
pub async fn delete_category(
    user_service: web::Data<UserService>,
    catalog_service: web::Data<CatalogService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    if let Err(resp) = require_staff(&user_service, &req).await {
        return Ok(resp);
    }

    match catalog_service.delete_category(path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Category deleted"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

// ---- promotions ----

#[utoipa::path(
    get,
    path = "/admin/promotions",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "All special promotions with their products"),
        (status = 403, description = "Not a staff user")
    )
)]
pub async fn list_promotions(
    user_service: web::Data<UserService>,
    promotion_service: web::Data<PromotionService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    if let Err(resp) = require_staff(&user_service, &req).await {
        return Ok(resp);
    }

    match promotion_service.list_promotions().await {
        Ok(promotions) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": {
                "promotions": promotions,
                "max_promotions": MAX_SPECIAL_PROMOTIONS
            }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/promotions",
    tag = "admin",
    request_body = CreatePromotionRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Promotion created", body = PromotionResponse),
        (status = 404, description = "Product not found"),
        (status = 409, description = "Promotion cap reached")
    )
)]
pub async fn add_promotion(
    user_service: web::Data<UserService>,
    promotion_service: web::Data<PromotionService>,
    req: HttpRequest,
    request: web::Json<CreatePromotionRequest>,
) -> Result<HttpResponse> {
    if let Err(resp) = require_staff(&user_service, &req).await {
        return Ok(resp);
    }

    match promotion_service.add_promotion(request.into_inner()).await {
        Ok(promotion) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "promotion": promotion },
            "message": "Promotion created"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/admin/promotions/{id}",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "Promotion id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Promotion deleted"),
        (status = 404, description = "Promotion not found")
    )
)]
pub async fn delete_promotion(
    user_service: web::Data<UserService>,
    promotion_service: web::Data<PromotionService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    if let Err(resp) = require_staff(&user_service, &req).await {
        return Ok(resp);
    }

    match promotion_service.delete_promotion(path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Promotion deleted"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

// ---- coupons ----

#[utoipa::path(
    get,
    path = "/admin/coupons",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "All coupons, newest first"),
        (status = 403, description = "Not a staff user")
    )
)]
pub async fn list_coupons(
    user_service: web::Data<UserService>,
    coupon_service: web::Data<CouponService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    if let Err(resp) = require_staff(&user_service, &req).await {
        return Ok(resp);
    }

    match coupon_service.list_coupons().await {
        Ok(coupons) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "coupons": coupons }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/coupons",
    tag = "admin",
    request_body = CreateCouponRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Coupon created", body = CouponResponse),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "Duplicate coupon code")
    )
)]
pub async fn add_coupon(
    user_service: web::Data<UserService>,
    coupon_service: web::Data<CouponService>,
    req: HttpRequest,
    request: web::Json<CreateCouponRequest>,
) -> Result<HttpResponse> {
    if let Err(resp) = require_staff(&user_service, &req).await {
        return Ok(resp);
    }

    match coupon_service.create_coupon(request.into_inner()).await {
        Ok(coupon) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "coupon": coupon },
            "message": "Coupon created"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/admin/coupons/{id}",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "Coupon id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Coupon deleted"),
        (status = 404, description = "Coupon not found")
    )
)]
pub async fn delete_coupon(
    user_service: web::Data<UserService>,
    coupon_service: web::Data<CouponService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    if let Err(resp) = require_staff(&user_service, &req).await {
        return Ok(resp);
    }

    match coupon_service.delete_coupon(path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Coupon deleted"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

// ---- orders ----

#[utoipa::path(
    post,
    path = "/admin/orders",
    tag = "admin",
    request_body = CreateOrderRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Order created with snapshotted items", body = OrderResponse),
        (status = 400, description = "Invalid request")
    )
)]
pub async fn create_order(
    user_service: web::Data<UserService>,
    order_service: web::Data<OrderService>,
    req: HttpRequest,
    request: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse> {
    if let Err(resp) = require_staff(&user_service, &req).await {
        return Ok(resp);
    }

    match order_service.create_order(request.into_inner()).await {
        Ok(order) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "order": order },
            "message": "Order created"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/admin/orders/{id}/status",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "Order id")
    ),
    request_body = UpdateOrderStatusRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Order status updated"),
        (status = 404, description = "Order not found")
    )
)]
pub async fn set_order_status(
    user_service: web::Data<UserService>,
    order_service: web::Data<OrderService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdateOrderStatusRequest>,
) -> Result<HttpResponse> {
    if let Err(resp) = require_staff(&user_service, &req).await {
        return Ok(resp);
    }

    match order_service
        .set_order_status(path.into_inner(), request.status)
        .await
    {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Order status updated"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/orders/{id}/recalculate",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "Order id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Order total recomputed from its items"),
        (status = 404, description = "Order not found")
    )
)]
pub async fn recalculate_order_total(
    user_service: web::Data<UserService>,
    order_service: web::Data<OrderService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    if let Err(resp) = require_staff(&user_service, &req).await {
        return Ok(resp);
    }

    match order_service.calculate_total(path.into_inner()).await {
        Ok(total) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "total_amount": total }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn admin_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route("/dashboard", web::get().to(dashboard))
            .route("/products", web::get().to(list_products))
            .route("/products", web::post().to(add_product))
            .route("/products/{id}", web::put().to(update_product))
            .route("/products/{id}", web::delete().to(delete_product))
            .route("/categories", web::post().to(add_category))
            .route("/categories/{id}", web::delete().to(delete_category))
            .route("/promotions", web::get().to(list_promotions))
            .route("/promotions", web::post().to(add_promotion))
            .route("/promotions/{id}", web::delete().to(delete_promotion))
            .route("/coupons", web::get().to(list_coupons))
            .route("/coupons", web::post().to(add_coupon))
            .route("/coupons/{id}", web::delete().to(delete_coupon))
            .route("/orders", web::post().to(create_order))
            .route("/orders/{id}/status", web::put().to(set_order_status))
            .route(
                "/orders/{id}/recalculate",
                web::post().to(recalculate_order_total),
            ),
    );
}
