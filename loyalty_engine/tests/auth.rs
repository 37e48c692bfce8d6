use loyalty_engine::{
    test_utils::prepare_env::{prepare_test_db, random_db_path},
    traits::AuthApiError,
    AuthApi,
};

#[tokio::test]
async fn register_and_authenticate() {
    let db = prepare_test_db(&random_db_path()).await;
    let auth = AuthApi::new(db);
    let user = auth.register_user("dave", "s3cret").await.unwrap();
    assert_eq!(user.login, "dave");

    let same = auth.authenticate("dave", "s3cret").await.unwrap();
    assert_eq!(same.id, user.id);
}

#[tokio::test]
async fn duplicate_logins_are_rejected() {
    let db = prepare_test_db(&random_db_path()).await;
    let auth = AuthApi::new(db);
    auth.register_user("erin", "first").await.unwrap();
    let err = auth.register_user("erin", "second").await.unwrap_err();
    assert!(matches!(err, AuthApiError::LoginTaken(login) if login == "erin"));
}

#[tokio::test]
async fn bad_credentials_are_indistinguishable() {
    let db = prepare_test_db(&random_db_path()).await;
    let auth = AuthApi::new(db);
    auth.register_user("frank", "right").await.unwrap();

    let wrong_password = auth.authenticate("frank", "wrong").await.unwrap_err();
    assert!(matches!(wrong_password, AuthApiError::BadCredentials));
    let unknown_user = auth.authenticate("nobody", "right").await.unwrap_err();
    assert!(matches!(unknown_user, AuthApiError::BadCredentials));
}
