use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers;
use crate::models::*;
use crate::services::catalog_service::BrandGroup;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.as_mut().unwrap();
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        )
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::refresh,
        handlers::auth::forgot_password,
        handlers::auth::reset_password,
        handlers::auth::logout,
        handlers::user::get_profile,
        handlers::user::update_profile,
        handlers::user::change_password,
        handlers::address::list_addresses,
        handlers::address::add_address,
        handlers::address::set_default_address,
        handlers::address::delete_address,
        handlers::catalog::home,
        handlers::catalog::list_products,
        handlers::catalog::product_detail,
        handlers::coupon::list_valid_coupons,
        handlers::coupon::validate_coupon,
        handlers::coupon::redeem_coupon,
        handlers::order::get_orders,
        handlers::admin::dashboard,
        handlers::admin::list_products,
        handlers::admin::add_product,
        handlers::admin::update_product,
        handlers::admin::delete_product,
        handlers::admin::add_category,
        handlers::admin::delete_category,
        handlers::admin::list_promotions,
        handlers::admin::add_promotion,
        handlers::admin::delete_promotion,
        handlers::admin::list_coupons,
        handlers::admin::add_coupon,
        handlers::admin::delete_coupon,
        handlers::admin::create_order,
        handlers::admin::set_order_status,
        handlers::admin::recalculate_order_total,
    ),
    components(
        schemas(
            User,
            UserResponse,
            RegisterRequest,
            LoginRequest,
            UpdateProfileRequest,
            ChangePasswordRequest,
            ForgotPasswordRequest,
            ResetPasswordRequest,
            AuthResponse,
            Category,
            CreateCategoryRequest,
            CategoryResponse,
            Product,
            CreateProductRequest,
            UpdateProductRequest,
            ProductResponse,
            ProductListItem,
            EchoedFilters,
            CatalogPage,
            HomeResponse,
            ProductDetailResponse,
            Address,
            CreateAddressRequest,
            AddressResponse,
            Order,
            OrderItem,
            OrderStatus,
            PaymentMethod,
            NewOrderItem,
            CreateOrderRequest,
            UpdateOrderStatusRequest,
            OrderItemResponse,
            OrderResponse,
            DashboardResponse,
            Coupon,
            DiscountType,
            CreateCouponRequest,
            CouponResponse,
            ApplyCouponRequest,
            ApplyCouponResponse,
            SpecialPromotion,
            PromotionWithProduct,
            CreatePromotionRequest,
            PromotionResponse,
            BrandGroup,
            ApiError,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Authentication API"),
        (name = "user", description = "User profile API"),
        (name = "address", description = "Saved address API"),
        (name = "catalog", description = "Product catalog API"),
        (name = "coupon", description = "Coupon API"),
        (name = "order", description = "Order API"),
        (name = "admin", description = "Staff-only management API"),
    ),
    info(
        title = "ShopMobile Backend API",
        version = "1.0.0",
        description = "QHUN22 phone store REST API documentation",
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
