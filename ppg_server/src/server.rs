use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use log::*;
use pesapal_tools::PesapalApi;
use ppg_engine::{ReconciliationApi, ReconciliationDatabase, SqliteDatabase};

use crate::{
    config::{ServerConfig, ServerOptions},
    cors::cors,
    errors::ServerError,
    mailer::Mailer,
    routes::configure,
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.migrate().await.map_err(|e| ServerError::InitializeError(format!("Could not migrate database. {e}")))?;
    info!("💻️ Connected to database at {}", db.url());
    let gateway = PesapalApi::new(config.pesapal.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let mailer = Mailer::from_config(&config.mailer)?;
    let srv = create_server_instance(config, db, gateway, mailer)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    gateway: PesapalApi,
    mailer: Mailer,
) -> Result<Server, ServerError> {
    let reconcile_options = config.reconcile_options();
    let options = ServerOptions::from_config(&config);
    let cors_origins = config.cors_origins.clone();
    let srv = HttpServer::new(move || {
        let reconciliation_api = ReconciliationApi::new(db.clone(), mailer.clone()).with_options(reconcile_options);
        App::new()
            .wrap(cors(&cors_origins))
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("ppg::access_log"))
            .app_data(web::Data::new(reconciliation_api))
            .app_data(web::Data::new(gateway.clone()))
            .app_data(web::Data::new(options.clone()))
            .configure(configure::<SqliteDatabase, Mailer>)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
