//! Liveness endpoints.

use actix_web::HttpResponse;

/// GET /
pub async fn welcome() -> HttpResponse {
    articles_web::response::welcome("Command Service")
}

/// GET /ping
pub async fn ping() -> HttpResponse {
    articles_web::response::ping()
}
