use std::time::Duration;

use accrual_service::{config::AccrualConfig, rate_limit::RateLimiter, routes, store::AccrualStore};
use actix_web::{web, App, HttpServer};
use dotenvy::dotenv;
use log::info;

#[actix_web::main]
async fn main() {
    dotenv().ok();
    env_logger::init();
    let config = AccrualConfig::from_env_or_default();

    info!("🚀️ Starting accrual service on {}:{}", config.host, config.port);
    match run_server(config).await {
        Ok(_) => println!("Bye!"),
        Err(e) => eprintln!("{e}"),
    }
}

async fn run_server(config: AccrualConfig) -> std::io::Result<()> {
    let store = web::Data::new(AccrualStore::new());
    let limiter = web::Data::new(RateLimiter::new(config.rate_limit, Duration::from_secs(60)));
    HttpServer::new(move || {
        App::new().app_data(store.clone()).app_data(limiter.clone()).configure(routes::configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
