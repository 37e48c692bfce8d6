use actix_web::{http::StatusCode, test, test::TestRequest, web, App};
use chrono::Utc;
use loyalty_engine::{hash_password, traits::AuthApiError, AuthApi};
use serde_json::json;

use crate::{
    auth::TokenIssuer,
    endpoint_tests::{
        helpers::{get_auth_config, test_user},
        mocks::MockAuthManager,
    },
    routes::{login, register_user},
};

macro_rules! auth_app {
    ($mock:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(AuthApi::new($mock)))
                .app_data(web::Data::new(TokenIssuer::new(&get_auth_config())))
                .service(web::resource("/api/user/register").route(web::post().to(register_user::<MockAuthManager>)))
                .service(web::resource("/api/user/login").route(web::post().to(login::<MockAuthManager>))),
        )
        .await
    };
}

#[actix_web::test]
async fn registration_issues_a_token() {
    let mut mock = MockAuthManager::new();
    mock.expect_create_user().returning(|login, _hash| Ok(test_user(7, login)));
    let app = auth_app!(mock);

    let req = TestRequest::post()
        .uri("/api/user/register")
        .set_json(json!({"login": "alice", "password": "hunter22"}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().get("Authorization").is_some());
    let body: serde_json::Value = test::read_body_json(res).await;
    let token = body["token"].as_str().unwrap();
    let claims = TokenIssuer::new(&get_auth_config()).validate_token(token).unwrap();
    assert_eq!(claims.sub, 7);
    assert_eq!(claims.login, "alice");
}

#[actix_web::test]
async fn taken_logins_conflict() {
    let mut mock = MockAuthManager::new();
    mock.expect_create_user().returning(|login, _| Err(AuthApiError::LoginTaken(login.to_string())));
    let app = auth_app!(mock);

    let req = TestRequest::post()
        .uri("/api/user/register")
        .set_json(json!({"login": "alice", "password": "hunter22"}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn empty_credentials_are_a_bad_request() {
    let mock = MockAuthManager::new();
    let app = auth_app!(mock);

    let req =
        TestRequest::post().uri("/api/user/register").set_json(json!({"login": "", "password": "pw"})).to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn login_with_good_credentials() {
    let mut mock = MockAuthManager::new();
    mock.expect_fetch_user_by_login().returning(|login| {
        let mut user = test_user(3, login);
        user.password_hash = hash_password("hunter22");
        user.created_at = Utc::now();
        Ok(Some(user))
    });
    let app = auth_app!(mock);

    let req = TestRequest::post()
        .uri("/api/user/login")
        .set_json(json!({"login": "bob", "password": "hunter22"}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(res).await;
    let claims = TokenIssuer::new(&get_auth_config()).validate_token(body["token"].as_str().unwrap()).unwrap();
    assert_eq!(claims.sub, 3);
}

#[actix_web::test]
async fn login_with_bad_credentials_is_unauthorized() {
    let mut mock = MockAuthManager::new();
    mock.expect_fetch_user_by_login().returning(|login| {
        let mut user = test_user(3, login);
        user.password_hash = hash_password("the-real-password");
        Ok(Some(user))
    });
    let app = auth_app!(mock);

    let req = TestRequest::post()
        .uri("/api/user/login")
        .set_json(json!({"login": "bob", "password": "a-guess"}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn unknown_logins_are_indistinguishable_from_bad_passwords() {
    let mut mock = MockAuthManager::new();
    mock.expect_fetch_user_by_login().returning(|_| Ok(None));
    let app = auth_app!(mock);

    let req = TestRequest::post()
        .uri("/api/user/login")
        .set_json(json!({"login": "nobody", "password": "pw"}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}
