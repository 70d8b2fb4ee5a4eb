use crate::models::*;
use crate::services::CouponService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use chrono::Utc;
use serde_json::json;

#[utoipa::path(
    get,
    path = "/coupons",
    tag = "coupon",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Coupons currently redeemable, soonest expiry first")
    )
)]
pub async fn list_valid_coupons(coupon_service: web::Data<CouponService>) -> Result<HttpResponse> {
    match coupon_service.list_valid_coupons(Utc::now()).await {
        Ok(coupons) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "coupons": coupons }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/coupons/validate",
    tag = "coupon",
    request_body = ApplyCouponRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Discount the coupon grants for this order amount", body = ApplyCouponResponse),
        (status = 400, description = "Coupon not applicable"),
        (status = 404, description = "Unknown coupon code")
    )
)]
pub async fn validate_coupon(
    coupon_service: web::Data<CouponService>,
    request: web::Json<ApplyCouponRequest>,
) -> Result<HttpResponse> {
    let request = request.into_inner();
    match coupon_service
        .validate(&request.code, request.order_amount, Utc::now())
        .await
    {
        Ok(discount) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": ApplyCouponResponse {
                code: request.code.trim().to_uppercase(),
                discount,
            }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/coupons/redeem",
    tag = "coupon",
    request_body = ApplyCouponRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Coupon redeemed; one use consumed", body = ApplyCouponResponse),
        (status = 400, description = "Coupon not applicable"),
        (status = 404, description = "Unknown coupon code")
    )
)]
pub async fn redeem_coupon(
    coupon_service: web::Data<CouponService>,
    request: web::Json<ApplyCouponRequest>,
) -> Result<HttpResponse> {
    let request = request.into_inner();
    match coupon_service
        .redeem(&request.code, request.order_amount, Utc::now())
        .await
    {
        Ok(discount) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": ApplyCouponResponse {
                code: request.code.trim().to_uppercase(),
                discount,
            },
            "message": "Coupon applied"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn coupon_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/coupons")
            .route("", web::get().to(list_valid_coupons))
            .route("/validate", web::post().to(validate_coupon))
            .route("/redeem", web::post().to(redeem_coupon)),
    );
}
