use crate::handlers::user::get_user_id_from_request;
use crate::services::OrderService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/orders",
    tag = "order",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "The caller's orders with their items, newest first"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_orders(
    order_service: web::Data<OrderService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req).unwrap_or(0);

    match order_service.get_user_orders(user_id).await {
        Ok(orders) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "orders": orders }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn order_config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/orders").route("", web::get().to(get_orders)));
}
