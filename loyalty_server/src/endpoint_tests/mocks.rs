use loyalty_engine::{
    db_types::{Order, OrderNumber, User, UserBalance, Withdrawal},
    traits::{AccountApiError, AccountManagement, AuthApiError, AuthManagement},
};
use mockall::mock;

mock! {
    pub AuthManager {}
    impl AuthManagement for AuthManager {
        async fn create_user(&self, login: &str, password_hash: &str) -> Result<User, AuthApiError>;
        async fn fetch_user_by_login(&self, login: &str) -> Result<Option<User>, AuthApiError>;
    }
}

mock! {
    pub AccountManager {}
    impl AccountManagement for AccountManager {
        async fn fetch_orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, AccountApiError>;
        async fn fetch_order_by_number(&self, number: &OrderNumber) -> Result<Option<Order>, AccountApiError>;
        async fn fetch_balance(&self, user_id: i64) -> Result<UserBalance, AccountApiError>;
        async fn fetch_withdrawals(&self, user_id: i64) -> Result<Vec<Withdrawal>, AccountApiError>;
    }
}
