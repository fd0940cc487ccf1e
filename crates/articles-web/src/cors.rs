use actix_cors::Cors;
use actix_web::http::header;

/// Any http(s) origin may call the services.
pub fn cors() -> Cors {
    Cors::default()
        .allowed_origin_fn(|origin, _req| {
            origin
                .to_str()
                .map(|o| o.starts_with("http://") || o.starts_with("https://"))
                .unwrap_or(false)
        })
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allowed_headers(vec![
            header::ACCEPT,
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::HeaderName::from_static("x-csrf-token"),
            header::HeaderName::from_static("x-request-id"),
        ])
        .expose_headers(vec![header::LINK])
        .supports_credentials()
        .max_age(300)
}
