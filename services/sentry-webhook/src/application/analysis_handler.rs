// データ分析ハンドラー
//
// フロントエンドから呼ばれる分析APIのスタブ。実際の分析は行わず、
// 受け取ったデータ件数を含む定型の結果を返す。

use chrono::Utc;
use lambda_http::http::{Method, StatusCode};
use lambda_http::{Body, Request, Response};
use serde_json::json;
use thiserror::Error;
use tracing::{error, info, info_span, warn};

use super::http_response::CorsPolicy;
use crate::domain::{AnalysisRequest, AnalysisResult, PayloadError};
use crate::infrastructure::AnalysisConfig;

/// 分析処理のエラー型
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("failed to parse request body: {0}")]
    Parse(#[from] PayloadError),

    #[error("method not allowed: {0}")]
    MethodNotAllowed(String),
}

/// データ分析ハンドラー
pub struct AnalysisHandler {
    config: AnalysisConfig,
}

impl AnalysisHandler {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// HTTPリクエストを処理してレスポンスを返す
    pub fn handle(&self, request: &Request) -> Response<Body> {
        let method = request.method();
        let span = info_span!("data_analysis", method = %method, path = %request.uri().path());
        let _guard = span.enter();

        self.handle_raw(method, request.body().as_ref())
    }

    /// メソッドとボディから直接レスポンスを生成
    pub fn handle_raw(&self, method: &Method, body: &[u8]) -> Response<Body> {
        if method == Method::OPTIONS {
            return CorsPolicy::API.preflight();
        }

        match self.analyze(method, body) {
            Ok(result) => {
                info!(
                    profile = self.config.profile().as_str(),
                    data_points = result.data_points,
                    "分析リクエスト処理完了"
                );
                CorsPolicy::API.json(
                    StatusCode::OK,
                    &json!({
                        "success": true,
                        "response": result,
                        "message": "Analysis completed successfully",
                    }),
                )
            }
            Err(AnalysisError::MethodNotAllowed(method)) => {
                warn!(method = %method, "許可されていないメソッド");
                CorsPolicy::API.method_not_allowed()
            }
            Err(err) => {
                error!(error = %err, "分析リクエスト処理失敗");
                CorsPolicy::API.error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Analysis failed",
                    Some(&err.to_string()),
                )
            }
        }
    }

    /// POSTリクエストの本処理
    pub fn analyze(&self, method: &Method, body: &[u8]) -> Result<AnalysisResult, AnalysisError> {
        if method != Method::POST {
            return Err(AnalysisError::MethodNotAllowed(method.to_string()));
        }

        let request = AnalysisRequest::from_body(body)?;
        let profile = self.config.profile();
        info!(
            analysis_type = %request.analysis_type_label(profile),
            has_prompt = request.prompt.is_some(),
            "分析リクエストを受信"
        );

        Ok(AnalysisResult::build(&request, profile, Utc::now()))
    }
}
