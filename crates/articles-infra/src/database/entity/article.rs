//! Article entity for SeaORM.

use sea_orm::entity::prelude::*;
use sea_orm::{NotSet, Set};

/// A row of `articles`. `id` is store-local and never leaves this crate.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "articles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub uuid: Uuid,
    pub author: String,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub body: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to Domain Article, dropping the row id.
impl From<Model> for articles_core::domain::Article {
    fn from(model: Model) -> Self {
        Self {
            uuid: model.uuid,
            author: model.author,
            title: model.title,
            body: model.body,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

/// Conversion from a new Domain Article to an insertable ActiveModel.
impl From<articles_core::domain::NewArticle> for ActiveModel {
    fn from(article: articles_core::domain::NewArticle) -> Self {
        Self {
            id: NotSet,
            uuid: Set(article.uuid),
            author: Set(article.author),
            title: Set(article.title),
            body: Set(article.body),
            created_at: Set(article.created_at.into()),
            updated_at: Set(article.updated_at.into()),
        }
    }
}
