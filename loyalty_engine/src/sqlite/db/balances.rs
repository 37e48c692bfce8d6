use lp_common::Points;
use sqlx::SqliteConnection;

use crate::db_types::{OrderNumber, UserBalance, Withdrawal};

/// Adds `amount` to the user's earned total, creating the balance row on first credit.
pub(crate) async fn credit(user_id: i64, amount: Points, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO user_balances (user_id, earned, withdrawn) VALUES ($1, $2, 0) \
         ON CONFLICT (user_id) DO UPDATE SET earned = earned + excluded.earned",
    )
    .bind(user_id)
    .bind(amount)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn fetch_balance(user_id: i64, conn: &mut SqliteConnection) -> Result<Option<UserBalance>, sqlx::Error> {
    let balance = sqlx::query_as("SELECT * FROM user_balances WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(conn)
        .await?;
    Ok(balance)
}

/// Adds `amount` to the user's withdrawn total iff the current balance covers it.
///
/// The balance check lives in the WHERE clause, so check-and-debit is one atomic statement;
/// `None` means the funds were insufficient and nothing changed.
pub(crate) async fn debit(
    user_id: i64,
    amount: Points,
    conn: &mut SqliteConnection,
) -> Result<Option<UserBalance>, sqlx::Error> {
    let balance = sqlx::query_as(
        "UPDATE user_balances SET withdrawn = withdrawn + $1 \
         WHERE user_id = $2 AND earned - withdrawn >= $1 RETURNING *",
    )
    .bind(amount)
    .bind(user_id)
    .fetch_optional(conn)
    .await?;
    Ok(balance)
}

pub(crate) async fn insert_withdrawal(
    user_id: i64,
    number: &OrderNumber,
    amount: Points,
    conn: &mut SqliteConnection,
) -> Result<Withdrawal, sqlx::Error> {
    let withdrawal = sqlx::query_as("INSERT INTO withdrawals (user_id, number, amount) VALUES ($1, $2, $3) RETURNING *")
        .bind(user_id)
        .bind(number.as_str())
        .bind(amount)
        .fetch_one(conn)
        .await?;
    Ok(withdrawal)
}

/// All withdrawals made by the user, most recent first.
pub async fn withdrawals_for_user(user_id: i64, conn: &mut SqliteConnection) -> Result<Vec<Withdrawal>, sqlx::Error> {
    let withdrawals = sqlx::query_as("SELECT * FROM withdrawals WHERE user_id = $1 ORDER BY processed_at DESC, id DESC")
        .bind(user_id)
        .fetch_all(conn)
        .await?;
    Ok(withdrawals)
}
