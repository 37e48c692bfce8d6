//! `SqliteDatabase` is a concrete implementation of a loyalty engine backend.
//!
//! It implements all the traits defined in the [`crate::traits`] module on top of a SQLite
//! connection pool. Multi-step flows (terminal transition + balance credit, balance check +
//! withdrawal record) run inside a single transaction.
use std::fmt::Debug;

use log::debug;
use lp_common::Points;
use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool};

use super::db::{balances, new_pool, orders, users};
use crate::{
    db_types::{NewOrder, Order, OrderNumber, OrderStatus, RegisterOutcome, User, UserBalance, Withdrawal},
    traits::{AccountApiError, AccountManagement, AuthApiError, AuthManagement, LedgerError, LoyaltyDatabase},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Connects to the database at `url`, creating the database file if it does not exist yet.
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        if !Sqlite::database_exists(url).await.unwrap_or(false) {
            Sqlite::create_database(url).await?;
            debug!("🗃️ Created new sqlite database at {url}");
        }
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    /// Applies any outstanding schema migrations.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./src/sqlite/migrations").run(&self.pool).await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl AccountManagement for SqliteDatabase {
    async fn fetch_orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::orders_for_user(user_id, &mut conn).await?;
        Ok(orders)
    }

    async fn fetch_order_by_number(&self, number: &OrderNumber) -> Result<Option<Order>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_number(number, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_balance(&self, user_id: i64) -> Result<UserBalance, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let balance = balances::fetch_balance(user_id, &mut conn).await?;
        Ok(balance.unwrap_or_else(|| UserBalance::zero(user_id)))
    }

    async fn fetch_withdrawals(&self, user_id: i64) -> Result<Vec<Withdrawal>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let withdrawals = balances::withdrawals_for_user(user_id, &mut conn).await?;
        Ok(withdrawals)
    }
}

impl LoyaltyDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn register_order(&self, order: NewOrder) -> Result<(Order, RegisterOutcome), LedgerError> {
        let mut conn = self.pool.acquire().await?;
        orders::insert_if_absent(order, &mut conn).await
    }

    async fn start_processing(&self, number: &OrderNumber) -> Result<Order, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let advanced = orders::advance_status(
            number,
            OrderStatus::Registered,
            OrderStatus::Processing,
            Points::default(),
            &mut conn,
        )
        .await?;
        match advanced {
            Some(order) => Ok(order),
            None => {
                let current = orders::fetch_order_by_number(number, &mut conn)
                    .await?
                    .ok_or_else(|| LedgerError::OrderNotFound(number.clone()))?;
                Err(LedgerError::InvalidTransition { from: current.status, to: OrderStatus::Processing })
            },
        }
    }

    async fn complete_order(
        &self,
        number: &OrderNumber,
        status: OrderStatus,
        accrual: Points,
    ) -> Result<Order, LedgerError> {
        if !OrderStatus::Processing.can_advance_to(status) {
            let current = self.fetch_order_by_number(number).await?.map(|o| o.status).unwrap_or(OrderStatus::Processing);
            return Err(LedgerError::InvalidTransition { from: current, to: status });
        }
        let accrual = if status == OrderStatus::Processed { accrual } else { Points::default() };
        let mut tx = self.pool.begin().await?;
        let advanced = orders::advance_status(number, OrderStatus::Processing, status, accrual, &mut tx).await?;
        let order = match advanced {
            Some(order) => order,
            None => {
                let current = orders::fetch_order_by_number(number, &mut tx)
                    .await?
                    .ok_or_else(|| LedgerError::OrderNotFound(number.clone()))?;
                return Err(LedgerError::InvalidTransition { from: current.status, to: status });
            },
        };
        if status == OrderStatus::Processed && accrual.is_positive() {
            balances::credit(order.user_id, accrual, &mut tx).await?;
        }
        tx.commit().await?;
        debug!("🗃️ Order [{number}] finalised as {status} with accrual {accrual}");
        Ok(order)
    }

    async fn fetch_unresolved_orders(&self) -> Result<Vec<Order>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::unresolved_orders(&mut conn).await?;
        Ok(orders)
    }

    async fn withdraw(&self, user_id: i64, number: &OrderNumber, amount: Points) -> Result<Withdrawal, LedgerError> {
        let mut tx = self.pool.begin().await?;
        let debited = balances::debit(user_id, amount, &mut tx).await?;
        if debited.is_none() {
            let available =
                balances::fetch_balance(user_id, &mut tx).await?.map(|b| b.current()).unwrap_or_default();
            return Err(LedgerError::InsufficientFunds { available, requested: amount });
        }
        let withdrawal = balances::insert_withdrawal(user_id, number, amount, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ User #{user_id} withdrew {amount} against order [{number}]");
        Ok(withdrawal)
    }
}

impl AuthManagement for SqliteDatabase {
    async fn create_user(&self, login: &str, password_hash: &str) -> Result<User, AuthApiError> {
        let mut conn = self.pool.acquire().await?;
        let user = users::insert_user(login, password_hash, &mut conn).await?;
        user.ok_or_else(|| AuthApiError::LoginTaken(login.to_string()))
    }

    async fn fetch_user_by_login(&self, login: &str) -> Result<Option<User>, AuthApiError> {
        let mut conn = self.pool.acquire().await?;
        let user = users::fetch_user_by_login(login, &mut conn).await?;
        Ok(user)
    }
}
