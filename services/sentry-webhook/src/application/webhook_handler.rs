/// Sentry Webhookハンドラー
///
/// Sentryからのアラートを受け取り、通知メッセージに整形して
/// プッシュ通知APIへ中継する。
///
/// # 処理フロー
/// 1. OPTIONSはCORSプリフライトとして200を返す
/// 2. POST以外は405
/// 3. トークン確認 → ボディパース → メッセージ整形 → 送信
/// 4. いずれかの段階で失敗した場合はJSONエラーボディで500
use chrono::Utc;
use lambda_http::http::{Method, StatusCode};
use lambda_http::{Body, Request, Response};
use serde_json::json;
use thiserror::Error;
use tracing::{error, info, info_span, warn, Instrument};

use super::http_response::CorsPolicy;
use crate::domain::{AlertEvent, NotificationMessage, PayloadError};
use crate::infrastructure::config::ENV_NOTIFY_TOKEN;
use crate::infrastructure::{NotificationSender, NotifierConfig, NotifyError};

/// Webhook処理のエラー型
#[derive(Debug, Error, Clone, PartialEq)]
pub enum WebhookError {
    /// 必須設定が欠落
    #[error("configuration error: {0} not configured")]
    Configuration(String),

    /// リクエストボディが不正
    #[error("failed to parse request body: {0}")]
    Parse(#[from] PayloadError),

    /// POST/OPTIONS以外のメソッド
    #[error("method not allowed: {0}")]
    MethodNotAllowed(String),

    /// 通知APIへの送信に失敗
    #[error("failed to send notification: {0}")]
    Notification(#[from] NotifyError),
}

impl WebhookError {
    /// 対応するHTTPステータスコード
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            WebhookError::Configuration(_)
            | WebhookError::Parse(_)
            | WebhookError::Notification(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// レスポンスの`error`フィールドに入れるラベル
    pub fn label(&self) -> &'static str {
        match self {
            WebhookError::Configuration(_) => "Configuration Error",
            WebhookError::Parse(_) => "Invalid Request Body",
            WebhookError::MethodNotAllowed(_) => "Method Not Allowed",
            WebhookError::Notification(_) => "Notification Failed",
        }
    }
}

/// Sentry Webhookハンドラー
///
/// 設定と通知送信の実装は起動時に注入する。
/// 呼び出し間で状態は持たない。
pub struct WebhookHandler<N>
where
    N: NotificationSender,
{
    config: NotifierConfig,
    sender: N,
}

impl<N> WebhookHandler<N>
where
    N: NotificationSender,
{
    /// 新しいハンドラーを作成
    pub fn new(config: NotifierConfig, sender: N) -> Self {
        Self { config, sender }
    }

    /// HTTPリクエストを処理してレスポンスを返す
    ///
    /// エラーはすべてここでJSONレスポンスに変換する。
    pub async fn handle(&self, request: &Request) -> Response<Body> {
        let method = request.method().clone();
        let span = info_span!("sentry_webhook", method = %method, path = %request.uri().path());
        let body: &[u8] = request.body().as_ref();

        self.handle_raw(&method, body).instrument(span).await
    }

    /// メソッドとボディから直接レスポンスを生成
    pub async fn handle_raw(&self, method: &Method, body: &[u8]) -> Response<Body> {
        if method == Method::OPTIONS {
            return CorsPolicy::WEBHOOK.preflight();
        }

        match self.process(method, body).await {
            Ok(()) => {
                info!("通知リクエスト処理完了");
                CorsPolicy::WEBHOOK.json(
                    StatusCode::OK,
                    &json!({ "success": true, "message": "Notification sent successfully" }),
                )
            }
            Err(WebhookError::MethodNotAllowed(method)) => {
                warn!(method = %method, "許可されていないメソッド");
                CorsPolicy::WEBHOOK.method_not_allowed()
            }
            Err(err) => {
                error!(error = %err, "通知リクエスト処理失敗");
                CorsPolicy::WEBHOOK.error(err.status_code(), err.label(), Some(&err.to_string()))
            }
        }
    }

    /// POSTリクエストの本処理
    pub async fn process(&self, method: &Method, body: &[u8]) -> Result<(), WebhookError> {
        if method != Method::POST {
            return Err(WebhookError::MethodNotAllowed(method.to_string()));
        }

        let token = self
            .config
            .token()
            .ok_or_else(|| WebhookError::Configuration(ENV_NOTIFY_TOKEN.to_string()))?;

        let event = AlertEvent::from_body(body)?;
        let level = event.level();
        info!(
            project = event.project_name(),
            level = level.as_str(),
            has_url = event.url().is_some(),
            "Sentryアラートを受信"
        );

        let message = NotificationMessage::from_alert(&event, Utc::now());
        self.sender.send(token, message.as_str()).await?;

        Ok(())
    }
}
