use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "order_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Approved,
    Rejected,
    Shipping,
    Delivered,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "pending"),
            OrderStatus::Approved => write!(f, "approved"),
            OrderStatus::Rejected => write!(f, "rejected"),
            OrderStatus::Shipping => write!(f, "shipping"),
            OrderStatus::Delivered => write!(f, "delivered"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "payment_method", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cod,
    Bank,
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::Cod => write!(f, "cod"),
            PaymentMethod::Bank => write!(f, "bank"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub shipping_address_id: Option<i64>,
    pub total_amount: i64,
    pub note: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: Option<i64>,
    pub product_name: String,
    pub product_price: i64,
    pub quantity: i64,
}

impl OrderItem {
    pub fn subtotal(&self) -> i64 {
        self.product_price * self.quantity
    }
}

/// Order total is a plain aggregation over item subtotals. Callers re-run
/// `calculate_total` after mutating items; nothing keeps it in sync.
pub fn sum_items(items: &[OrderItem]) -> i64 {
    items.iter().map(OrderItem::subtotal).sum()
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NewOrderItem {
    pub product_id: Option<i64>,
    pub product_name: String,
    pub product_price: i64,
    pub quantity: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub user_id: i64,
    pub payment_method: PaymentMethod,
    pub shipping_address_id: Option<i64>,
    #[serde(default)]
    pub note: String,
    pub items: Vec<NewOrderItem>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderItemResponse {
    pub id: i64,
    pub product_id: Option<i64>,
    pub product_name: String,
    pub product_price: i64,
    pub quantity: i64,
    pub subtotal: i64,
}

impl From<OrderItem> for OrderItemResponse {
    fn from(item: OrderItem) -> Self {
        let subtotal = item.subtotal();
        Self {
            id: item.id,
            product_id: item.product_id,
            product_name: item.product_name,
            product_price: item.product_price,
            quantity: item.quantity,
            subtotal,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderResponse {
    pub id: i64,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub shipping_address_id: Option<i64>,
    pub total_amount: i64,
    pub note: String,
    pub items: Vec<OrderItemResponse>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardResponse {
    pub total_orders: i64,
    pub monthly_revenue: i64,
    pub total_revenue: i64,
    pub new_users: i64,
    pub pending_orders: i64,
    pub approved_orders: i64,
    pub delivered_orders: i64,
    pub rejected_orders: i64,
    pub recent_orders: Vec<Order>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(price: i64, quantity: i64) -> OrderItem {
        OrderItem {
            id: 0,
            order_id: 1,
            product_id: None,
            product_name: "Benco S1".to_string(),
            product_price: price,
            quantity,
        }
    }

    #[test]
    fn test_subtotal() {
        assert_eq!(item(2_990_000, 2).subtotal(), 5_980_000);
    }

    #[test]
    fn test_sum_items() {
        let items = vec![item(2_990_000, 1), item(500_000, 3)];
        assert_eq!(sum_items(&items), 4_490_000);
        assert_eq!(sum_items(&[]), 0);
    }
}
