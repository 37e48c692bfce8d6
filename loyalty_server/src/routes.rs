//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
use actix_web::{get, web, HttpResponse, Responder};
use log::*;
use loyalty_engine::{
    db_types::RegisterOutcome,
    order_objects::{BalanceSummary, OrderSummary, WithdrawalSummary},
    traits::{AccountManagement, AuthManagement, LoyaltyDatabase},
    AccountApi,
    AuthApi,
    OrderFlowApi,
};

use crate::{
    auth::{JwtClaims, TokenIssuer},
    data_objects::{AuthRequest, WithdrawRequest},
    errors::ServerError,
    poller::PollerHandle,
};

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Auth  ----------------------------------------------------
/// Creates a new user account and immediately logs it in.
///
/// The issued access token is returned both in the `Authorization` response header and as a JSON
/// body, so both header-scraping and body-parsing clients work.
pub async fn register_user<B: AuthManagement>(
    body: web::Json<AuthRequest>,
    api: web::Data<AuthApi<B>>,
    signer: web::Data<TokenIssuer>,
) -> Result<HttpResponse, ServerError> {
    let AuthRequest { login, password } = body.into_inner();
    if login.is_empty() || password.is_empty() {
        return Err(ServerError::InvalidRequestBody("Login and password must not be empty".to_string()));
    }
    let user = api.register_user(&login, &password).await?;
    let token = signer.issue_token(&user)?;
    debug!("💻️ New user '{login}' registered and logged in");
    Ok(HttpResponse::Ok()
        .insert_header(("Authorization", format!("Bearer {token}")))
        .json(serde_json::json!({ "token": token })))
}

pub async fn login<B: AuthManagement>(
    body: web::Json<AuthRequest>,
    api: web::Data<AuthApi<B>>,
    signer: web::Data<TokenIssuer>,
) -> Result<HttpResponse, ServerError> {
    let AuthRequest { login, password } = body.into_inner();
    let user = api.authenticate(&login, &password).await?;
    let token = signer.issue_token(&user)?;
    trace!("💻️ User '{login}' logged in");
    Ok(HttpResponse::Ok()
        .insert_header(("Authorization", format!("Bearer {token}")))
        .json(serde_json::json!({ "token": token })))
}

//----------------------------------------------   Orders  ----------------------------------------------------
/// Accepts a raw order number (text body) for accrual.
///
/// 202 for a fresh registration, 200 when the user re-submits their own number, 409 when the
/// number belongs to someone else and 422 when the number fails the Luhn check.
pub async fn submit_order<B: LoyaltyDatabase>(
    claims: JwtClaims,
    body: String,
    api: web::Data<OrderFlowApi<B>>,
    poller: web::Data<PollerHandle>,
) -> Result<HttpResponse, ServerError> {
    let number = body.trim();
    if number.is_empty() {
        return Err(ServerError::InvalidRequestBody("Expected an order number in the request body".to_string()));
    }
    let (order, outcome) = api.register_order(number, claims.sub).await?;
    match outcome {
        RegisterOutcome::Created => {
            poller.enqueue(order.number).await;
            Ok(HttpResponse::Accepted().finish())
        },
        RegisterOutcome::AlreadyOwned => Ok(HttpResponse::Ok().finish()),
        RegisterOutcome::Conflict => Err(ServerError::OrderConflict),
    }
}

/// The user's submitted orders, most recent first. 204 when there are none.
pub async fn my_orders<B: AccountManagement>(
    claims: JwtClaims,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let orders = api.orders_for_user(claims.sub).await?;
    if orders.is_empty() {
        return Ok(HttpResponse::NoContent().finish());
    }
    let summaries = orders.into_iter().map(OrderSummary::from).collect::<Vec<_>>();
    Ok(HttpResponse::Ok().json(summaries))
}

//----------------------------------------------   Balance  ----------------------------------------------------
pub async fn balance<B: AccountManagement>(
    claims: JwtClaims,
    api: web::Data<AccountApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let balance = api.balance(claims.sub).await?;
    Ok(HttpResponse::Ok().json(BalanceSummary::from(balance)))
}

/// Withdraws points against an order number. 402 when the balance does not cover the amount.
pub async fn withdraw<B: LoyaltyDatabase>(
    claims: JwtClaims,
    body: web::Json<WithdrawRequest>,
    api: web::Data<AccountApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let WithdrawRequest { order_number, amount } = body.into_inner();
    api.withdraw(claims.sub, &order_number, amount).await?;
    Ok(HttpResponse::Ok().finish())
}

/// The user's withdrawal history, most recent first. 204 when there is none.
pub async fn my_withdrawals<B: AccountManagement>(
    claims: JwtClaims,
    api: web::Data<AccountApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let withdrawals = api.withdrawals(claims.sub).await?;
    if withdrawals.is_empty() {
        return Ok(HttpResponse::NoContent().finish());
    }
    let summaries = withdrawals.into_iter().map(WithdrawalSummary::from).collect::<Vec<_>>();
    Ok(HttpResponse::Ok().json(summaries))
}

/// Registers the full user-facing API under `/api/user` for the backend `B`.
pub fn configure_api<B>(cfg: &mut web::ServiceConfig)
where B: LoyaltyDatabase + AuthManagement + 'static {
    cfg.service(
        web::scope("/api/user")
            .service(web::resource("/register").route(web::post().to(register_user::<B>)))
            .service(web::resource("/login").route(web::post().to(login::<B>)))
            .service(
                web::resource("/orders")
                    .route(web::post().to(submit_order::<B>))
                    .route(web::get().to(my_orders::<B>)),
            )
            .service(web::resource("/balance").route(web::get().to(balance::<B>)))
            .service(web::resource("/balance/withdraw").route(web::post().to(withdraw::<B>)))
            .service(web::resource("/balance/withdrawals").route(web::get().to(my_withdrawals::<B>))),
    );
}
