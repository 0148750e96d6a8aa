// 通知APIクライアント
//
// 整形済みメッセージをプッシュ通知APIへ送信する。
// application/x-www-form-urlencodedで`message=<本文>`をPOSTし、
// AuthorizationヘッダーにBearerトークンを付与する。
// 再試行は行わない（1回の呼び出しにつき送信は1回）。

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::{debug, error, info};
use url::Url;

use super::config::NotifierConfig;

/// 接続タイムアウト上限（秒）
const CONNECT_TIMEOUT_SECS: u64 = 5;

/// 通知送信のエラー型
#[derive(Debug, Error, Clone, PartialEq)]
pub enum NotifyError {
    /// 通知APIが200以外を返した
    #[error("notification API error: {status} {body}")]
    HttpError {
        /// HTTPステータスコード
        status: u16,
        /// レスポンスボディ
        body: String,
    },

    /// 接続失敗・タイムアウトなど
    #[error("network error: {0}")]
    NetworkError(String),

    /// HTTPクライアントの構築に失敗
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(String),
}

/// 通知送信用トレイト
///
/// 実際の通知APIクライアントとテスト用モックを差し替えられるようにする。
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// メッセージを送信する
    ///
    /// # 引数
    /// * `token` - 通知APIのBearerトークン
    /// * `message` - 送信するメッセージ本文
    ///
    /// # 戻り値
    /// * 通知APIが200を返した場合は`Ok(())`
    /// * それ以外は`Err(NotifyError)`
    async fn send(&self, token: &str, message: &str) -> Result<(), NotifyError>;
}

/// LINE Notify互換APIクライアント
#[derive(Clone)]
pub struct LineNotifyClient {
    client: Client,
    endpoint: Url,
}

impl std::fmt::Debug for LineNotifyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineNotifyClient")
            .field("endpoint", &self.endpoint.as_str())
            .finish_non_exhaustive()
    }
}

impl LineNotifyClient {
    /// 設定からクライアントを作成
    pub fn new(config: &NotifierConfig) -> Result<Self, NotifyError> {
        let connect_timeout = config
            .timeout()
            .min(std::time::Duration::from_secs(CONNECT_TIMEOUT_SECS));

        let client = Client::builder()
            .timeout(config.timeout())
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| NotifyError::ClientBuild(e.to_string()))?;

        info!(endpoint = %config.endpoint(), "LineNotifyClientを初期化");

        Ok(Self {
            client,
            endpoint: config.endpoint().clone(),
        })
    }
}

#[async_trait]
impl NotificationSender for LineNotifyClient {
    async fn send(&self, token: &str, message: &str) -> Result<(), NotifyError> {
        debug!(
            endpoint = %self.endpoint,
            message_length = message.len(),
            "通知APIへ送信"
        );

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(token)
            .form(&[("message", message)])
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "通知APIリクエスト失敗");
                NotifyError::NetworkError(e.to_string())
            })?;

        let status = response.status();
        if status == StatusCode::OK {
            info!(status = %status, "通知送信に成功");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        error!(status = %status, body = %body, "通知APIエラー");

        Err(NotifyError::HttpError {
            status: status.as_u16(),
            body,
        })
    }
}
