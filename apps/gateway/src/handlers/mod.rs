//! HTTP handlers and route configuration.

use actix_web::{HttpRequest, HttpResponse, web};
use articles_web::AppResult;

use crate::proxy::Upstreams;

/// GET /ping
async fn ping() -> HttpResponse {
    articles_web::response::ping()
}

/// Everything under /articles is forwarded.
async fn forward(
    upstreams: web::Data<Upstreams>,
    req: HttpRequest,
    body: web::Bytes,
) -> AppResult<HttpResponse> {
    upstreams.forward(&req, body).await
}

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/ping", web::get().to(ping))
        .route("/articles", web::to(forward))
        .route("/articles/{tail:.*}", web::to(forward));
}
