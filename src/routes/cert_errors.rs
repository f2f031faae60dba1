use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::borrow::Cow;
use std::sync::Arc;

use super::AppState;
use crate::cert_errors::CertErrorTranslator;
use crate::error::AppError;
use crate::infra::HeaderCookies;

#[derive(Debug, Default, Deserialize)]
pub struct ResolveQuery {
    pub lang: Option<String>,
    #[serde(default)]
    pub fallback: String,
}

/// The shared translator, reading `lang` from the caller's cookies when
/// the request carries any.
fn request_translator<'a>(state: &'a AppState, headers: &HeaderMap) -> Cow<'a, CertErrorTranslator> {
    let cookies = HeaderCookies::from_headers(headers);
    if cookies.is_empty() {
        Cow::Borrowed(state.translator.as_ref())
    } else {
        Cow::Owned(state.translator.with_cookies(Arc::new(cookies)))
    }
}

pub async fn resolve_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Query(query): Query<ResolveQuery>,
    headers: HeaderMap,
) -> Json<Value> {
    let message = request_translator(&state, &headers).resolve(
        &code,
        &query.fallback,
        query.lang.as_deref(),
    );
    Json(json!({ "code": code, "message": message }))
}

pub async fn normalize(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    if !body.is_object() {
        return Err(AppError::InvalidRequest(
            "expected a JSON object".to_string(),
        ));
    }
    Ok(Json(
        request_translator(&state, &headers).normalize_api_response(body),
    ))
}

#[cfg(test)]
mod tests {
    use crate::cert_errors::{CertErrorTranslator, LanguageResolver};
    use crate::infra::EmbeddedCatalog;
    use crate::policy::TimeoutPolicy;
    use crate::routes::tests::{call, get_json, post_json, test_router};
    use crate::routes::{router, AppState};
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        Router,
    };
    use serde_json::json;
    use std::sync::Arc;

    fn catalog_router() -> Router {
        let translator = CertErrorTranslator::new(
            Arc::new(EmbeddedCatalog::load().unwrap()),
            LanguageResolver::new(None, Some("en-US".to_string())),
            None,
        );
        router(AppState {
            translator: Arc::new(translator),
            policy: TimeoutPolicy::STANDARD,
        })
    }

    #[tokio::test]
    async fn test_resolve_known_code() {
        let (status, body) = get_json(test_router(), "/api/cert-errors/CERT_E006?lang=en").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["code"], "CERT_E006");
        assert_eq!(body["message"], "Certificate has expired");
    }

    #[tokio::test]
    async fn test_resolve_with_fallback() {
        let (_, body) = get_json(
            test_router(),
            "/api/cert-errors/NOT_A_CERT_CODE?fallback=fallback%20text",
        )
        .await;
        assert_eq!(body["message"], "fallback text");

        let (_, body) = get_json(test_router(), "/api/cert-errors/CERT_E999?lang=en").await;
        assert_eq!(body["message"], "Certificate Error: CERT_E999");

        let (_, body) = get_json(test_router(), "/api/cert-errors/CERT_E12").await;
        assert_eq!(body["message"], "Certificate Error: CERT_E12");
    }

    #[tokio::test]
    async fn test_resolve_reads_language_cookie() {
        let request = Request::get("/api/cert-errors/CERT_E006")
            .header(header::COOKIE, "session=abc; lang=zh-CN")
            .body(Body::empty())
            .unwrap();
        let (status, body) = call(catalog_router(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "证书已过期");

        let (_, body) = get_json(catalog_router(), "/api/cert-errors/CERT_E006").await;
        assert_eq!(body["message"], "Certificate has expired");
    }

    #[tokio::test]
    async fn test_query_language_beats_cookie() {
        let request = Request::get("/api/cert-errors/CERT_E006?lang=en-US")
            .header(header::COOKIE, "lang=zh-CN")
            .body(Body::empty())
            .unwrap();
        let (_, body) = call(catalog_router(), request).await;
        assert_eq!(body["message"], "Certificate has expired");
    }

    #[tokio::test]
    async fn test_normalize() {
        let (status, body) = post_json(
            test_router(),
            "/api/normalize",
            json!({ "error": { "code": "CERT_E003", "message": "x" } }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["error"]["userMessage"], "CA server timeout");
        assert_eq!(body["error"]["message"], "x");
    }

    #[tokio::test]
    async fn test_normalize_reads_language_cookie() {
        let request = Request::post("/api/normalize")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::COOKIE, "lang=zh-CN")
            .body(Body::from(
                json!({ "error": { "code": "CERT_E003", "message": "x" } }).to_string(),
            ))
            .unwrap();
        let (status, body) = call(catalog_router(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["error"]["userMessage"], "CA 服务器超时");
    }

    #[tokio::test]
    async fn test_normalize_rejects_non_object() {
        let (status, body) = post_json(test_router(), "/api/normalize", json!([1, 2])).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_REQUEST");
    }
}
