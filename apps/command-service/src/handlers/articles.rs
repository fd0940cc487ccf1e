//! Article mutation endpoints.

use actix_web::{HttpResponse, web};
use articles_core::domain::parse_uuid;
use articles_shared::dto::{RequestStoreArticle, RequestUpdateArticle};
use articles_web::{AppResult, response, with_deadline};

use crate::state::AppState;

/// POST /articles
pub async fn store(
    state: web::Data<AppState>,
    body: web::Json<RequestStoreArticle>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let article = with_deadline(
        state.request_timeout,
        state.commands.store(req.author, req.title, req.body),
    )
    .await?;

    Ok(response::ok_article("Article Successfully Created", article))
}

/// PUT /articles/{uuid}
pub async fn update(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<RequestUpdateArticle>,
) -> AppResult<HttpResponse> {
    let uuid = parse_uuid(&path)?;
    let req = body.into_inner();
    let article = with_deadline(
        state.request_timeout,
        state.commands.update(uuid, req.author, req.title, req.body),
    )
    .await?;

    Ok(response::ok_article("Article Successfully Updated", article))
}

/// DELETE /articles/{uuid}
pub async fn delete(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let uuid = parse_uuid(&path)?;
    let article = with_deadline(state.request_timeout, state.commands.delete(uuid)).await?;

    Ok(response::ok_article("Article Successfully Deleted", article))
}
