//! # Articles Gateway
//!
//! Single public entry point: mutations are forwarded to the command
//! service, reads to the query service.

use actix_web::{App, HttpServer, web};
use articles_web::{RequestIdMiddleware, TelemetryConfig, init_telemetry};
use tracing_actix_web::TracingLogger;

mod config;
mod handlers;
mod proxy;

use config::AppConfig;
use proxy::Upstreams;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    init_telemetry(&TelemetryConfig::from_env("gateway", "gateway"));

    let config = AppConfig::from_env();

    tracing::info!(
        command = %config.command_url,
        query = %config.query_url,
        "Starting Articles Gateway on {}:{}",
        config.host,
        config.port
    );

    let upstreams = Upstreams::new(&config.command_url, &config.query_url, config.request_timeout)?;

    HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .wrap(RequestIdMiddleware)
            .wrap(articles_web::cors())
            .app_data(web::Data::new(upstreams.clone()))
            .configure(handlers::configure_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    tracing::info!("Gateway stopped");
    Ok(())
}
