use log::debug;
use lp_common::Points;
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewOrder, Order, OrderNumber, OrderStatus, RegisterOutcome},
    traits::LedgerError,
};

/// Inserts the order if its number is unseen, returning the resulting record and outcome.
///
/// The `INSERT .. ON CONFLICT DO NOTHING` makes the uniqueness check-and-insert a single atomic
/// statement; two concurrent registrations of the same number cannot both create a record.
pub async fn insert_if_absent(
    order: NewOrder,
    conn: &mut SqliteConnection,
) -> Result<(Order, RegisterOutcome), LedgerError> {
    let inserted: Option<Order> =
        sqlx::query_as("INSERT INTO orders (number, user_id) VALUES ($1, $2) ON CONFLICT (number) DO NOTHING RETURNING *")
            .bind(order.number.as_str())
            .bind(order.user_id)
            .fetch_optional(&mut *conn)
            .await?;
    if let Some(o) = inserted {
        debug!("📝️ Order [{}] registered for user #{} with id {}", o.number, o.user_id, o.id);
        return Ok((o, RegisterOutcome::Created));
    }
    let existing = fetch_order_by_number(&order.number, conn)
        .await?
        .ok_or_else(|| LedgerError::OrderNotFound(order.number.clone()))?;
    let outcome =
        if existing.user_id == order.user_id { RegisterOutcome::AlreadyOwned } else { RegisterOutcome::Conflict };
    Ok((existing, outcome))
}

pub async fn fetch_order_by_number(
    number: &OrderNumber,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order =
        sqlx::query_as("SELECT * FROM orders WHERE number = $1").bind(number.as_str()).fetch_optional(conn).await?;
    Ok(order)
}

/// All orders submitted by the user, most recent first.
pub async fn orders_for_user(user_id: i64, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let orders = sqlx::query_as("SELECT * FROM orders WHERE user_id = $1 ORDER BY submitted_at DESC, id DESC")
        .bind(user_id)
        .fetch_all(conn)
        .await?;
    Ok(orders)
}

/// All orders not yet in a terminal state, oldest first.
pub async fn unresolved_orders(conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let orders = sqlx::query_as(
        "SELECT * FROM orders WHERE status IN ('Registered', 'Processing') ORDER BY submitted_at ASC, id ASC",
    )
    .fetch_all(conn)
    .await?;
    Ok(orders)
}

/// Moves an order from `from` to `to`, recording the accrual, iff it is currently in `from`.
///
/// The status guard in the WHERE clause makes the transition atomic: a duplicate or out-of-order
/// poll result finds no row to update and returns `None` instead of clobbering a terminal state.
pub(crate) async fn advance_status(
    number: &OrderNumber,
    from: OrderStatus,
    to: OrderStatus,
    accrual: Points,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as(
        "UPDATE orders SET status = $1, accrual = $2, updated_at = CURRENT_TIMESTAMP \
         WHERE number = $3 AND status = $4 RETURNING *",
    )
    .bind(to.to_string())
    .bind(accrual)
    .bind(number.as_str())
    .bind(from.to_string())
    .fetch_optional(conn)
    .await?;
    Ok(order)
}
