//! HTTP surface of the accrual service.
//!
//! `GET /api/orders/{number}` returns the calculated accrual for an order (404 until submitted,
//! 429 with `Retry-After` when the status endpoint is being polled too aggressively).
//! `POST /api/orders` submits an order with its goods for calculation and replies 202.
//! `POST /api/goods` registers a reward mechanic, 409 if the pattern is already taken.
use actix_web::{web, HttpResponse};
use log::{debug, info};
use serde::Deserialize;

use crate::{
    errors::AccrualError,
    matcher::{Good, Mechanic},
    rate_limit::RateLimiter,
    store::AccrualStore,
};

#[derive(Debug, Deserialize)]
pub struct CalculationRequest {
    pub order: String,
    #[serde(default)]
    pub goods: Vec<Good>,
}

pub async fn order_status(
    path: web::Path<String>,
    store: web::Data<AccrualStore>,
    limiter: web::Data<RateLimiter>,
) -> HttpResponse {
    if let Err(retry_after) = limiter.try_acquire() {
        debug!("🧮️ Status poll throttled, retry after {retry_after}s");
        return HttpResponse::TooManyRequests()
            .insert_header(("Retry-After", retry_after.to_string()))
            .body(format!("No more than {} requests per minute allowed", limiter.max_requests()));
    }
    let number = path.into_inner();
    match store.show_status(&number).await {
        Some(record) => HttpResponse::Ok().json(record),
        None => HttpResponse::NotFound().finish(),
    }
}

pub async fn submit_order(
    body: web::Json<CalculationRequest>,
    store: web::Data<AccrualStore>,
) -> Result<HttpResponse, AccrualError> {
    let req = body.into_inner();
    let total = store.calculate(&req.order, &req.goods).await?;
    info!("🧮️ Accepted order [{}] for calculation, total {total}", req.order);
    Ok(HttpResponse::Accepted().finish())
}

pub async fn register_mechanic(
    body: web::Json<Mechanic>,
    store: web::Data<AccrualStore>,
) -> Result<HttpResponse, AccrualError> {
    let mechanic = body.into_inner();
    info!("🧮️ Registering mechanic for pattern '{}'", mechanic.match_text);
    store.register_mechanic(mechanic).await?;
    Ok(HttpResponse::Ok().finish())
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/orders/{number}").route(web::get().to(order_status)))
        .service(web::resource("/api/orders").route(web::post().to(submit_order)))
        .service(web::resource("/api/goods").route(web::post().to(register_mechanic)));
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use actix_web::{http::StatusCode, test, web, App};
    use serde_json::json;

    use super::configure;
    use crate::{rate_limit::RateLimiter, store::AccrualStore};

    macro_rules! accrual_app {
        ($limit:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new(AccrualStore::new()))
                    .app_data(web::Data::new(RateLimiter::new($limit, Duration::from_secs(60))))
                    .configure(configure),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn full_calculation_flow() {
        let app = accrual_app!(0);
        let req = test::TestRequest::post()
            .uri("/api/goods")
            .set_json(json!({"match": "Bork", "rewardType": "PERCENT", "rewardPoints": 10}))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);

        let req = test::TestRequest::post()
            .uri("/api/orders")
            .set_json(json!({"order": "12345678903", "goods": [{"description": "Bork mixer", "price": 1000}]}))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::ACCEPTED);

        let req = test::TestRequest::get().uri("/api/orders/12345678903").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["order"], "12345678903");
        assert_eq!(body["status"], "PROCESSED");
        assert_eq!(body["accrual"], 100);
    }

    #[actix_web::test]
    async fn unknown_orders_are_not_found() {
        let app = accrual_app!(0);
        let req = test::TestRequest::get().uri("/api/orders/2377225624").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn duplicate_mechanic_conflicts() {
        let app = accrual_app!(0);
        let mechanic = json!({"match": "LG", "rewardType": "POINTS", "rewardPoints": 30});
        let req = test::TestRequest::post().uri("/api/goods").set_json(&mechanic).to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        let req = test::TestRequest::post().uri("/api/goods").set_json(&mechanic).to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn invalid_order_numbers_are_rejected() {
        let app = accrual_app!(0);
        let req = test::TestRequest::post()
            .uri("/api/orders")
            .set_json(json!({"order": "12345678904", "goods": []}))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn status_polling_is_throttled() {
        let app = accrual_app!(2);
        for _ in 0..2 {
            let req = test::TestRequest::get().uri("/api/orders/12345678903").to_request();
            let res = test::call_service(&app, req).await;
            assert_eq!(res.status(), StatusCode::NOT_FOUND);
        }
        let req = test::TestRequest::get().uri("/api/orders/12345678903").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
        let retry_after = res.headers().get("Retry-After").unwrap().to_str().unwrap();
        assert!(retry_after.parse::<u64>().unwrap() >= 1);
    }
}
