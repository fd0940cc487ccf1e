//! Data Transfer Objects - request/response types for the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Body of `POST /articles`. Missing fields decode as empty and are rejected
/// by validation rather than by the JSON decoder.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestStoreArticle {
    pub author: String,
    pub title: String,
    pub body: String,
}

/// Body of `PUT /articles/{uuid}`; the uuid comes from the path.
pub type RequestUpdateArticle = RequestStoreArticle;

/// Query string of `GET /articles`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestListArticle {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub q: Option<String>,
    pub author: Option<String>,
}

/// An article as exposed over HTTP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseArticle {
    pub uuid: Uuid,
    pub author: String,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_decode_as_empty() {
        let req: RequestStoreArticle = serde_json::from_str(r#"{"title":"t"}"#).unwrap();
        assert_eq!(req.author, "");
        assert_eq!(req.title, "t");
        assert_eq!(req.body, "");
    }

    #[test]
    fn timestamps_serialize_as_iso8601() {
        let at = DateTime::parse_from_rfc3339("2024-05-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let article = ResponseArticle {
            uuid: Uuid::nil(),
            author: "a".into(),
            title: "t".into(),
            body: "b".into(),
            created_at: at,
            updated_at: at,
        };
        let json = serde_json::to_value(&article).unwrap();
        assert_eq!(json["created_at"], "2024-05-01T10:00:00Z");
    }
}
