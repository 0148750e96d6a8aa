// HTTPレスポンス生成
//
// 全レスポンスにCORSヘッダーを付与し、ボディはJSONで返す。
// プリフライト（OPTIONS）のみ空ボディ。

use lambda_http::http::header::{
    HeaderMap, HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE,
};
use lambda_http::http::StatusCode;
use lambda_http::{Body, Response};
use serde_json::{json, Value};

/// CORSヘッダーの設定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorsPolicy {
    /// Access-Control-Allow-Headersの値
    allow_headers: &'static str,
}

impl CorsPolicy {
    /// Webhook用（Content-Typeのみ許可）
    pub const WEBHOOK: CorsPolicy = CorsPolicy {
        allow_headers: "Content-Type",
    };

    /// ブラウザから呼ばれるAPI用（Authorizationも許可）
    pub const API: CorsPolicy = CorsPolicy {
        allow_headers: "Content-Type, Authorization",
    };

    /// CORSヘッダーを生成
    ///
    /// - Content-Type: application/json
    /// - Access-Control-Allow-Origin: *
    /// - Access-Control-Allow-Headers: ポリシーごとの値
    /// - Access-Control-Allow-Methods: POST, OPTIONS
    pub fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
        headers.insert(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(self.allow_headers),
        );
        headers.insert(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("POST, OPTIONS"),
        );
        headers
    }

    /// プリフライト応答（200、空ボディ）
    pub fn preflight(&self) -> Response<Body> {
        self.respond(StatusCode::OK, Body::Empty)
    }

    /// JSONボディの応答
    pub fn json(&self, status: StatusCode, body: &Value) -> Response<Body> {
        self.respond(status, Body::Text(body.to_string()))
    }

    /// エラー応答
    ///
    /// `{"success": false, "error": ..., "details": ...}`の形で返す。
    /// detailsが無い場合は省略する。
    pub fn error(&self, status: StatusCode, error: &str, details: Option<&str>) -> Response<Body> {
        let body = match details {
            Some(details) => json!({ "success": false, "error": error, "details": details }),
            None => json!({ "success": false, "error": error }),
        };
        self.json(status, &body)
    }

    /// 405 Method Not Allowed
    pub fn method_not_allowed(&self) -> Response<Body> {
        self.error(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed", None)
    }

    fn respond(&self, status: StatusCode, body: Body) -> Response<Body> {
        let mut response = Response::new(body);
        *response.status_mut() = status;
        *response.headers_mut() = self.headers();
        response
    }
}
