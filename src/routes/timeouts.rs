use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::AppState;
use crate::client::types::HttpMethod;
use crate::error::AppError;
use crate::policy::TimeoutPolicy;
use crate::shared::millis;

#[derive(Debug, Deserialize)]
pub struct TimeoutQuery {
    pub method: Option<String>,
    #[serde(default)]
    pub url: String,
    pub content_type: Option<String>,
}

/// The whole policy table, or the timeout for one request when `method`
/// is given.
pub async fn timeout_table(
    State(state): State<AppState>,
    Query(query): Query<TimeoutQuery>,
) -> Result<Json<Value>, AppError> {
    let Some(method) = query.method.as_deref() else {
        let table: Map<String, Value> = state
            .policy
            .table_ms()
            .into_iter()
            .map(|(class, ms)| (class.as_str().to_string(), Value::from(ms)))
            .collect();
        return Ok(Json(Value::Object(table)));
    };

    let method = HttpMethod::from_token(method)
        .map_err(|_| AppError::InvalidMethod(method.to_string()))?;
    let content_type = query.content_type.as_deref();
    let class = TimeoutPolicy::classify(&method, &query.url, content_type);

    tracing::debug!(method = %method, url = %query.url, class = class.as_str(), "Resolved timeout");

    Ok(Json(json!({
        "method": method.as_str(),
        "url": query.url,
        "class": class,
        "timeoutMs": millis(state.policy.duration(class)),
    })))
}

#[cfg(test)]
mod tests {
    use crate::routes::tests::{get_json, test_router};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_table() {
        let (status, body) = get_json(test_router(), "/api/timeouts").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["GET"], 10000);
        assert_eq!(body["PUT"], 20000);
        assert_eq!(body["UPLOAD"], 60000);
        assert_eq!(body["DEFAULT"], 15000);
    }

    #[tokio::test]
    async fn test_resolve_single_request() {
        let (status, body) =
            get_json(test_router(), "/api/timeouts?method=get&url=/upload/x").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["class"], "UPLOAD");
        assert_eq!(body["timeoutMs"], 60000);
        assert_eq!(body["method"], "GET");
    }

    #[tokio::test]
    async fn test_resolve_multipart() {
        let (_, body) = get_json(
            test_router(),
            "/api/timeouts?method=POST&url=/server/importDB&content_type=multipart%2Fform-data",
        )
        .await;
        assert_eq!(body["timeoutMs"], 60000);
    }

    #[tokio::test]
    async fn test_invalid_method() {
        let (status, body) = get_json(test_router(), "/api/timeouts?method=G%20T").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_METHOD");
        assert_eq!(body["success"], false);
    }
}
