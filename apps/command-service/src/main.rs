//! # Articles Command Service
//!
//! Accepts article mutations, commits them to the authoritative store,
//! refreshes the shared cache and publishes one event per change.

use actix_web::{App, HttpServer, web};
use articles_web::{RequestIdMiddleware, TelemetryConfig, init_telemetry};
use tracing_actix_web::TracingLogger;

mod config;
mod handlers;
mod state;

use config::AppConfig;
use state::AppState;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    init_telemetry(&TelemetryConfig::from_env("command-service", "command_service"));

    let config = AppConfig::from_env();

    tracing::info!(
        "Starting Articles Command Service on {}:{}",
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

    tracing::info!("Command service stopped");
    Ok(())
}
