use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use log::info;
use loyalty_engine::{AccountApi, AuthApi, OrderFlowApi, SqliteDatabase};

use crate::{
    accrual::AccrualClient,
    auth::TokenIssuer,
    config::ServerConfig,
    errors::ServerError,
    poller::{enqueue_backlog, start_poller, PollerHandle},
    routes::{configure_api, health},
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.migrate().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let source = AccrualClient::new(&config.accrual_url).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let (poller, _workers) = start_poller(db.clone(), source, config.poller.clone());
    let api = OrderFlowApi::new(db.clone());
    let requeued = enqueue_backlog(&api, &poller).await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    info!("🚀️ Poller is live against {} ({requeued} orders re-queued)", config.accrual_url);
    let srv = create_server_instance(config, db, poller)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    poller: PollerHandle,
) -> Result<Server, ServerError> {
    let srv = HttpServer::new(move || {
        let orders_api = OrderFlowApi::new(db.clone());
        let accounts_api = AccountApi::new(db.clone());
        let auth_api = AuthApi::new(db.clone());
        let signer = TokenIssuer::new(&config.auth);
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("loyalty::access_log"))
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(accounts_api))
            .app_data(web::Data::new(auth_api))
            .app_data(web::Data::new(signer))
            .app_data(web::Data::new(poller.clone()))
            .configure(configure_api::<SqliteDatabase>)
            .service(health)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
