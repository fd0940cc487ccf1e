//! # Articles Query Service
//!
//! Keeps the read-side projection in step with article events and serves
//! reads cache-first.

use actix_web::{App, HttpServer, web};
use articles_web::{RequestIdMiddleware, TelemetryConfig, init_telemetry};
use tracing_actix_web::TracingLogger;

mod config;
#[cfg_attr(not(feature = "amqp"), allow(dead_code))]
mod consumer;
mod handlers;
mod state;

use config::AppConfig;
use state::AppState;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    init_telemetry(&TelemetryConfig::from_env("query-service", "query_service"));

    let config = AppConfig::from_env();

    tracing::info!(
        "Starting Articles Query Service on {}:{}",
        config.host,
        config.port
    );

    let state = AppState::connect(&config).await?;

    HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .wrap(RequestIdMiddleware)
            .wrap(articles_web::cors())
            .app_data(web::Data::new(state.clone()))
            .configure(articles_web::extractor_config)
            .configure(handlers::configure_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    tracing::info!("Query service stopped");
    Ok(())
}
