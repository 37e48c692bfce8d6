use actix_web::{http::StatusCode, test, test::TestRequest, web, App};
use chrono::Utc;
use loyalty_engine::{
    db_types::{Order, OrderNumber, OrderStatus, UserBalance, Withdrawal},
    AccountApi,
    OrderFlowApi,
};
use lp_common::Points;

use crate::{
    auth::TokenIssuer,
    endpoint_tests::{
        helpers::{get_auth_config, issue_token, test_user},
        mocks::MockAccountManager,
    },
    routes::{balance, my_orders, my_withdrawals},
};

macro_rules! account_app {
    ($mock:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(OrderFlowApi::new($mock)))
                .app_data(web::Data::new(TokenIssuer::new(&get_auth_config())))
                .service(web::resource("/api/user/orders").route(web::get().to(my_orders::<MockAccountManager>))),
        )
        .await
    };
}

macro_rules! balance_app {
    ($mock:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(AccountApi::new($mock)))
                .app_data(web::Data::new(TokenIssuer::new(&get_auth_config())))
                .service(web::resource("/api/user/balance").route(web::get().to(balance::<MockAccountManager>)))
                .service(
                    web::resource("/api/user/balance/withdrawals")
                        .route(web::get().to(my_withdrawals::<MockAccountManager>)),
                ),
        )
        .await
    };
}

fn order(number: &str, status: OrderStatus, accrual: i64) -> Order {
    Order {
        id: 1,
        number: OrderNumber::from(number.to_string()),
        user_id: 7,
        status,
        accrual: Points::from(accrual),
        submitted_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn bearer(user_id: i64) -> (&'static str, String) {
    let token = issue_token(&test_user(user_id, "alice"));
    ("Authorization", format!("Bearer {token}"))
}

#[actix_web::test]
async fn orders_are_returned_in_wire_format() {
    let mut mock = MockAccountManager::new();
    mock.expect_fetch_orders_for_user()
        .returning(|_| Ok(vec![order("12345678903", OrderStatus::Processed, 500)]));
    let app = account_app!(mock);

    let req = TestRequest::get().uri("/api/user/orders").insert_header(bearer(7)).to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(res).await;
    assert_eq!(body[0]["number"], "12345678903");
    assert_eq!(body[0]["status"], "PROCESSED");
    assert_eq!(body[0]["accrual"], 500);
    assert!(body[0].get("uploadedAt").is_some());
}

#[actix_web::test]
async fn an_empty_order_list_is_no_content() {
    let mut mock = MockAccountManager::new();
    mock.expect_fetch_orders_for_user().returning(|_| Ok(vec![]));
    let app = account_app!(mock);

    let req = TestRequest::get().uri("/api/user/orders").insert_header(bearer(7)).to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
}

#[actix_web::test]
async fn requests_without_a_token_are_unauthorized() {
    let mock = MockAccountManager::new();
    let app = account_app!(mock);

    let req = TestRequest::get().uri("/api/user/orders").to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn requests_with_a_garbage_token_are_unauthorized() {
    let mock = MockAccountManager::new();
    let app = account_app!(mock);

    let req = TestRequest::get()
        .uri("/api/user/orders")
        .insert_header(("Authorization", "Bearer not.a.token"))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn balance_reports_current_and_withdrawn() {
    let mut mock = MockAccountManager::new();
    mock.expect_fetch_balance()
        .returning(|user_id| Ok(UserBalance { user_id, earned: Points::from(750), withdrawn: Points::from(250) }));
    let app = balance_app!(mock);

    let req = TestRequest::get().uri("/api/user/balance").insert_header(bearer(7)).to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(res).await;
    assert_eq!(body["current"], 500);
    assert_eq!(body["withdrawn"], 250);
}

#[actix_web::test]
async fn withdrawal_history_uses_the_wire_format() {
    let mut mock = MockAccountManager::new();
    mock.expect_fetch_withdrawals().returning(|user_id| {
        Ok(vec![Withdrawal {
            id: 1,
            user_id,
            number: OrderNumber::from("2377225624".to_string()),
            amount: Points::from(751),
            processed_at: Utc::now(),
        }])
    });
    let app = balance_app!(mock);

    let req = TestRequest::get().uri("/api/user/balance/withdrawals").insert_header(bearer(7)).to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(res).await;
    assert_eq!(body[0]["orderNumber"], "2377225624");
    assert_eq!(body[0]["amount"], 751);
    assert!(body[0].get("processedAt").is_some());
}

#[actix_web::test]
async fn an_empty_withdrawal_history_is_no_content() {
    let mut mock = MockAccountManager::new();
    mock.expect_fetch_withdrawals().returning(|_| Ok(vec![]));
    let app = balance_app!(mock);

    let req = TestRequest::get().uri("/api/user/balance/withdrawals").insert_header(bearer(7)).to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
}
