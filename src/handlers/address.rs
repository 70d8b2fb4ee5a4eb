use crate::handlers::user::get_user_id_from_request;
use crate::models::*;
use crate::services::AddressService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/addresses",
    tag = "address",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Saved addresses, default first"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_addresses(
    address_service: web::Data<AddressService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req).unwrap_or(0);

    match address_service.list_addresses(user_id).await {
        Ok(addresses) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "addresses": addresses }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/addresses",
    tag = "address",
    request_body = CreateAddressRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Address added", body = AddressResponse),
        (status = 400, description = "Missing required fields")
    )
)]
pub async fn add_address(
    address_service: web::Data<AddressService>,
    req: HttpRequest,
    request: web::Json<CreateAddressRequest>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req).unwrap_or(0);

    match address_service.add_address(user_id, request.into_inner()).await {
        Ok(address) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "address": address },
            "message": "Address added"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/addresses/{id}/default",
    tag = "address",
    params(
        ("id" = i64, Path, description = "Address id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Default address updated"),
        (status = 404, description = "Address not found")
    )
)]
pub async fn set_default_address(
    address_service: web::Data<AddressService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req).unwrap_or(0);

    match address_service
        .set_default_address(user_id, path.into_inner())
        .await
    {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Default address updated"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/addresses/{id}",
    tag = "address",
    params(
        ("id" = i64, Path, description = "Address id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Address deleted"),
        (status = 404, description = "Address not found")
    )
)]
pub async fn delete_address(
    address_service: web::Data<AddressService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req).unwrap_or(0);

    match address_service
        .delete_address(user_id, path.into_inner())
        .await
    {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Address deleted"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn address_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/addresses")
            .route("", web::get().to(list_addresses))
            .route("", web::post().to(add_address))
            .route("/{id}/default", web::post().to(set_default_address))
            .route("/{id}", web::delete().to(delete_address)),
    );
}
