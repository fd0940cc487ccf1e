//! Upstream forwarding.

use std::time::Duration;

use actix_web::http::{Method, StatusCode};
use actix_web::{HttpRequest, HttpResponse, web};
use articles_web::request_id::REQUEST_ID_HEADER;
use articles_web::{AppError, AppResult};

/// Which backing service answers a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Command,
    Query,
}

impl Route {
    /// Mutations go to the command service, everything else to the query service.
    pub fn for_method(method: &Method) -> Self {
        match *method {
            Method::POST | Method::PUT | Method::PATCH | Method::DELETE => Route::Command,
            _ => Route::Query,
        }
    }
}

/// HTTP client plus the two upstream base URLs.
#[derive(Clone)]
pub struct Upstreams {
    client: reqwest::Client,
    command_url: String,
    query_url: String,
}

impl Upstreams {
    pub fn new(command_url: &str, query_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            command_url: command_url.trim_end_matches('/').to_string(),
            query_url: query_url.trim_end_matches('/').to_string(),
        })
    }

    fn base(&self, route: Route) -> &str {
        match route {
            Route::Command => &self.command_url,
            Route::Query => &self.query_url,
        }
    }

    /// Forward method, path, query string and body; pass the upstream status
    /// and body back unchanged.
    pub async fn forward(&self, req: &HttpRequest, body: web::Bytes) -> AppResult<HttpResponse> {
        let route = Route::for_method(req.method());
        let mut url = format!("{}{}", self.base(route), req.path());
        if !req.query_string().is_empty() {
            url.push('?');
            url.push_str(req.query_string());
        }

        let method = reqwest::Method::from_bytes(req.method().as_str().as_bytes())
            .map_err(|e| AppError::BadRequest(format!("Unsupported method: {e}")))?;

        tracing::debug!(route = ?route, method = %method, url = %url, "Forwarding");

        let mut upstream = self.client.request(method, &url).body(body);
        for name in ["content-type", "accept", REQUEST_ID_HEADER] {
            if let Some(value) = req.headers().get(name).and_then(|v| v.to_str().ok()) {
                upstream = upstream.header(name, value);
            }
        }

        let response = upstream.send().await.map_err(|e| {
            if e.is_timeout() {
                AppError::Timeout
            } else {
                AppError::BadGateway(format!("{url}: {e}"))
            }
        })?;

        let status = StatusCode::from_u16(response.status().as_u16())
            .map_err(|e| AppError::BadGateway(e.to_string()))?;
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::BadGateway(format!("{url}: {e}")))?;

        let mut reply = HttpResponse::build(status);
        if let Some(content_type) = content_type {
            reply.content_type(content_type);
        }
        Ok(reply.body(bytes.to_vec()))
    }
}
