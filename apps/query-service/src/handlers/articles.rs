//! Article read endpoints.

use actix_web::{HttpResponse, web};
use articles_core::domain::parse_uuid;
use articles_core::ports::ListQuery;
use articles_shared::dto::RequestListArticle;
use articles_web::{AppResult, response, with_deadline};

use crate::state::AppState;

/// GET /articles?page=&limit=&q=&author=
pub async fn list(
    state: web::Data<AppState>,
    params: web::Query<RequestListArticle>,
) -> AppResult<HttpResponse> {
    let params = params.into_inner();
    let query = ListQuery::new(params.page, params.limit, params.q, params.author);

    let articles = with_deadline(state.request_timeout, state.queries.get_list(&query)).await?;

    Ok(response::ok_articles("Articles Successfully Retrieved", articles))
}

/// GET /articles/{uuid}
pub async fn single(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let uuid = parse_uuid(&path)?;
    let article = with_deadline(state.request_timeout, state.queries.get_single(uuid)).await?;

    Ok(response::ok_article("Article Successfully Retrieved", article))
}
