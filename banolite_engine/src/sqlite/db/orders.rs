use bnl_common::Money;
use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewOrder, Order, OrderId, OrderItem},
    traits::FulfillmentError,
};

/// Inserts a new order row. The caller is responsible for inserting the line items and should wrap both calls in a
/// transaction, passing `&mut *tx` as the connection argument.
pub async fn insert_order(order: &NewOrder, conn: &mut SqliteConnection) -> Result<Order, FulfillmentError> {
    let id = OrderId::random();
    // The order id doubles as the payment reference, so webhook events map straight back to the order.
    let order = sqlx::query_as(
        r#"
            INSERT INTO orders (id, user_id, email, total, payment_method, payment_ref, booking_date, attendee_name)
            VALUES ($1, $2, $3, $4, $5, $1, $6, $7)
            RETURNING *;
        "#,
    )
    .bind(id)
    .bind(&order.user_id)
    .bind(&order.email)
    .bind(order.total)
    .bind(&order.payment_method)
    .bind(&order.booking_date)
    .bind(&order.attendee_name)
    .fetch_one(conn)
    .await?;
    Ok(order)
}

pub async fn insert_order_item(
    order_id: &OrderId,
    product_id: &str,
    price: Money,
    quantity: i64,
    conn: &mut SqliteConnection,
) -> Result<OrderItem, FulfillmentError> {
    let item = sqlx::query_as(
        r#"
            INSERT INTO order_items (order_id, product_id, price, quantity)
            VALUES ($1, $2, $3, $4)
            RETURNING *;
        "#,
    )
    .bind(order_id)
    .bind(product_id)
    .bind(price)
    .bind(quantity)
    .fetch_one(conn)
    .await?;
    Ok(item)
}

pub async fn fetch_order_by_id(order_id: &OrderId, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as(r#"SELECT * FROM orders WHERE id = $1"#).bind(order_id).fetch_optional(conn).await?;
    Ok(order)
}

pub async fn fetch_order_items(order_id: &OrderId, conn: &mut SqliteConnection) -> Result<Vec<OrderItem>, sqlx::Error> {
    let items = sqlx::query_as(r#"SELECT * FROM order_items WHERE order_id = $1 ORDER BY id"#)
        .bind(order_id)
        .fetch_all(conn)
        .await?;
    Ok(items)
}

pub async fn fetch_orders_for_user(user_id: &str, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let orders = sqlx::query_as(r#"SELECT * FROM orders WHERE user_id = $1 ORDER BY created_at DESC, id DESC"#)
        .bind(user_id)
        .fetch_all(conn)
        .await?;
    Ok(orders)
}

/// Flips the order from `Pending` to `Completed` in a single conditional update. If the order is missing or not
/// pending anymore, no row matches and `None` is returned. Two racing deliveries of the same charge event can
/// therefore never both observe a win.
pub async fn mark_order_completed(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order: Option<Order> = sqlx::query_as(
        r#"
            UPDATE orders
            SET status = 'Completed', updated_at = CURRENT_TIMESTAMP
            WHERE id = $1 AND status = 'Pending'
            RETURNING *;
        "#,
    )
    .bind(order_id)
    .fetch_optional(conn)
    .await?;
    if let Some(o) = &order {
        debug!("🗃️ Order {} marked as completed", o.id);
    }
    Ok(order)
}
