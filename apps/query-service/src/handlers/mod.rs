//! HTTP handlers and route configuration.

mod articles;
mod health;

use actix_web::web;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(health::welcome))
        .route("/ping", web::get().to(health::ping))
        .service(
            web::scope("/articles")
                .route("", web::get().to(articles::list))
                .route("/{uuid}", web::get().to(articles::single)),
        );
}
