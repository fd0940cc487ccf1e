//! Success envelopes.

use actix_web::HttpResponse;
use articles_core::domain::Article;
use articles_shared::ApiResponse;
use articles_shared::dto::ResponseArticle;

pub fn article(article: Article) -> ResponseArticle {
    ResponseArticle {
        uuid: article.uuid,
        author: article.author,
        title: article.title,
        body: article.body,
        created_at: article.created_at,
        updated_at: article.updated_at,
    }
}

/// `200 {"error":false,"message":..,"data":<article>}`
pub fn ok_article(message: &str, value: Article) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::ok(message, article(value)))
}

/// `200 {"error":false,"message":..,"data":[<article>..]}`
pub fn ok_articles(message: &str, values: Vec<Article>) -> HttpResponse {
    let data: Vec<ResponseArticle> = values.into_iter().map(article).collect();
    HttpResponse::Ok().json(ApiResponse::ok(message, data))
}

/// `GET /` answer.
pub fn welcome(app_name: &str) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::message(format!(
        "Welcome to {app_name} version 1.0"
    )))
}

/// `GET /ping` answer.
pub fn ping() -> HttpResponse {
    HttpResponse::Ok().content_type("text/plain").body(".")
}
