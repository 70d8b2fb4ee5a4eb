use crate::error::{AppError, AppResult};
use crate::models::*;
use chrono::{DateTime, Datelike, TimeZone, Utc};
use sqlx::PgPool;

#[derive(Clone)]
pub struct OrderService {
    pool: PgPool,
}

impl OrderService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Checkout is not part of this system; orders enter through the seed
    /// and admin paths. Item snapshots (name/price) come from the caller so
    /// later catalog edits never rewrite order history.
    pub async fn create_order(&self, request: CreateOrderRequest) -> AppResult<OrderResponse> {
        if request.items.is_empty() {
            return Err(AppError::ValidationError(
                "An order needs at least one item".to_string(),
            ));
        }
        for item in &request.items {
            if item.quantity <= 0 {
                return Err(AppError::ValidationError(
                    "Item quantity must be positive".to_string(),
                ));
            }
            if item.product_name.trim().is_empty() {
                return Err(AppError::ValidationError(
                    "Item product name is required".to_string(),
                ));
            }
        }

        let mut tx = self.pool.begin().await?;

        let order = sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders (user_id, payment_method, shipping_address_id, note)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(request.user_id)
        .bind(request.payment_method)
        .bind(request.shipping_address_id)
        .bind(&request.note)
        .fetch_one(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(request.items.len());
        for item in &request.items {
            let inserted = sqlx::query_as::<_, OrderItem>(
                r#"
                INSERT INTO order_items (order_id, product_id, product_name, product_price, quantity)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id, order_id, product_id, product_name, product_price, quantity
                "#,
            )
            .bind(order.id)
            .bind(item.product_id)
            .bind(item.product_name.trim())
            .bind(item.product_price)
            .bind(item.quantity)
            .fetch_one(&mut *tx)
            .await?;
            items.push(inserted);
        }

        let total = sum_items(&items);
        sqlx::query("UPDATE orders SET total_amount = $1, updated_at = now() WHERE id = $2")
            .bind(total)
            .bind(order.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(OrderResponse {
            id: order.id,
            status: order.status,
            payment_method: order.payment_method,
            shipping_address_id: order.shipping_address_id,
            total_amount: total,
            note: order.note,
            items: items.into_iter().map(OrderItemResponse::from).collect(),
            created_at: order.created_at,
        })
    }

    pub async fn get_user_orders(&self, user_id: i64) -> AppResult<Vec<OrderResponse>> {
        let orders = sqlx::query_as::<_, Order>(
            "SELECT * FROM orders WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        if orders.is_empty() {
            return Ok(Vec::new());
        }

        let order_ids: Vec<i64> = orders.iter().map(|o| o.id).collect();
        let items = sqlx::query_as::<_, OrderItem>(
            r#"
            SELECT id, order_id, product_id, product_name, product_price, quantity
            FROM order_items
            WHERE order_id = ANY($1)
            ORDER BY id
            "#,
        )
        .bind(&order_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut responses: Vec<OrderResponse> = orders
            .into_iter()
            .map(|order| OrderResponse {
                id: order.id,
                status: order.status,
                payment_method: order.payment_method,
                shipping_address_id: order.shipping_address_id,
                total_amount: order.total_amount,
                note: order.note,
                items: Vec::new(),
                created_at: order.created_at,
            })
            .collect();

        for item in items {
            if let Some(order) = responses.iter_mut().find(|o| o.id == item.order_id) {
                order.items.push(OrderItemResponse::from(item));
            }
        }

        Ok(responses)
    }

    /// Recompute the order total from its items and write it back. Nothing
    /// calls this automatically; item mutations must be followed by it.
    pub async fn calculate_total(&self, order_id: i64) -> AppResult<i64> {
        let items = sqlx::query_as::<_, OrderItem>(
            r#"
            SELECT id, order_id, product_id, product_name, product_price, quantity
            FROM order_items WHERE order_id = $1
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        let total = sum_items(&items);

        let updated = sqlx::query(
            "UPDATE orders SET total_amount = $1, updated_at = now() WHERE id = $2",
        )
        .bind(total)
        .bind(order_id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(AppError::NotFound("Order not found".to_string()));
        }

        Ok(total)
    }

    /// Statuses carry no transition rules; any status may replace any other.
    pub async fn set_order_status(&self, order_id: i64, status: OrderStatus) -> AppResult<()> {
        let updated = sqlx::query(
            "UPDATE orders SET status = $1, updated_at = now() WHERE id = $2",
        )
        .bind(status)
        .bind(order_id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(AppError::NotFound("Order not found".to_string()));
        }
        Ok(())
    }

    /// Admin dashboard aggregates, as rendered on the panel landing page.
    pub async fn dashboard(&self, now: DateTime<Utc>) -> AppResult<DashboardResponse> {
        let start_of_month = Utc
            .with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
            .single()
            .unwrap_or(now);

        let total_orders: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;

        let total_revenue: i64 =
            sqlx::query_scalar("SELECT COALESCE(SUM(total_amount), 0) FROM orders")
                .fetch_one(&self.pool)
                .await?;

        let monthly_revenue: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(total_amount), 0) FROM orders WHERE created_at >= $1",
        )
        .bind(start_of_month)
        .fetch_one(&self.pool)
        .await?;

        let new_users: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE created_at >= $1")
                .bind(start_of_month)
                .fetch_one(&self.pool)
                .await?;

        let status_counts: Vec<(OrderStatus, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM orders GROUP BY status")
                .fetch_all(&self.pool)
                .await?;
        let count_for = |wanted: OrderStatus| {
            status_counts
                .iter()
                .find(|(status, _)| *status == wanted)
                .map(|(_, count)| *count)
                .unwrap_or(0)
        };

        let recent_orders = sqlx::query_as::<_, Order>(
            "SELECT * FROM orders ORDER BY created_at DESC LIMIT 10",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(DashboardResponse {
            total_orders,
            monthly_revenue,
            total_revenue,
            new_users,
            pending_orders: count_for(OrderStatus::Pending),
            approved_orders: count_for(OrderStatus::Approved),
            delivered_orders: count_for(OrderStatus::Delivered),
            rejected_orders: count_for(OrderStatus::Rejected),
            recent_orders,
        })
    }
}
