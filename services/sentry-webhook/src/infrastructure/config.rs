/// Lambda関数の設定
///
/// 起動時に環境変数から一度だけ読み込み、ハンドラーに明示的に渡す。
/// ハンドラー内部から環境変数を直接参照しない。
use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};
use url::Url;

use crate::domain::AnalysisProfile;

/// 通知APIトークンの環境変数名
pub const ENV_NOTIFY_TOKEN: &str = "LINE_NOTIFY_TOKEN";

/// 通知APIエンドポイントの環境変数名
pub const ENV_NOTIFY_ENDPOINT: &str = "LINE_NOTIFY_ENDPOINT";

/// 通知APIタイムアウト秒数の環境変数名
pub const ENV_NOTIFY_TIMEOUT_SECS: &str = "NOTIFY_TIMEOUT_SECS";

/// 分析プロファイルの環境変数名
pub const ENV_ANALYSIS_PROFILE: &str = "ANALYSIS_PROFILE";

/// 通知APIのデフォルトエンドポイント
pub const DEFAULT_NOTIFY_ENDPOINT: &str = "https://notify-api.line.me/api/notify";

/// 通知APIリクエストのデフォルトタイムアウト（秒）
pub const DEFAULT_NOTIFY_TIMEOUT_SECS: u64 = 10;

/// 通知設定のエラー型
#[derive(Debug, Error, Clone, PartialEq)]
pub enum NotifierConfigError {
    /// エンドポイントがURLとして不正
    #[error("invalid notification endpoint {endpoint}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
}

/// Webhook通知Lambdaの設定
///
/// 以下の環境変数から読み込む:
/// - LINE_NOTIFY_TOKEN: 通知APIのBearerトークン（POST時に必須）
/// - LINE_NOTIFY_ENDPOINT: 通知APIのURL（任意）
/// - NOTIFY_TIMEOUT_SECS: 通知APIのタイムアウト秒数（任意）
///
/// トークン未設定でも起動は成功する。OPTIONSなどトークン不要の
/// リクエストには応答し、POST時に設定エラーとして扱う。
#[derive(Clone)]
pub struct NotifierConfig {
    token: Option<String>,
    endpoint: Url,
    timeout: Duration,
}

impl std::fmt::Debug for NotifierConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotifierConfig")
            .field("token_configured", &self.token.is_some())
            .field("endpoint", &self.endpoint.as_str())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl NotifierConfig {
    /// 明示的な値で設定を作成
    ///
    /// 空文字列のトークンは未設定として扱う。
    pub fn new(
        token: Option<String>,
        endpoint: &str,
        timeout: Duration,
    ) -> Result<Self, NotifierConfigError> {
        let endpoint = Url::parse(endpoint).map_err(|e| NotifierConfigError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            token: token.filter(|t| !t.trim().is_empty()),
            endpoint,
            timeout,
        })
    }

    /// 環境変数から設定を読み込む
    ///
    /// # エラー
    /// LINE_NOTIFY_ENDPOINTがURLとして不正な場合
    pub fn from_env() -> Result<Self, NotifierConfigError> {
        let token = std::env::var(ENV_NOTIFY_TOKEN).ok();
        let endpoint = std::env::var(ENV_NOTIFY_ENDPOINT)
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_NOTIFY_ENDPOINT.to_string());
        let timeout_secs = parse_env_u64(ENV_NOTIFY_TIMEOUT_SECS, DEFAULT_NOTIFY_TIMEOUT_SECS);

        let config = Self::new(token, &endpoint, Duration::from_secs(timeout_secs))?;

        if config.token.is_none() {
            warn!(key = ENV_NOTIFY_TOKEN, "Notification token is not configured");
        }
        info!(
            endpoint = %config.endpoint,
            timeout_secs,
            token_configured = config.token.is_some(),
            "NotifierConfig loaded"
        );

        Ok(config)
    }

    /// Bearerトークン
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// 通知APIのURL
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// 通知APIリクエストのタイムアウト
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// データ分析Lambdaの設定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AnalysisConfig {
    profile: AnalysisProfile,
}

impl AnalysisConfig {
    pub fn new(profile: AnalysisProfile) -> Self {
        Self { profile }
    }

    /// 環境変数から設定を読み込む
    ///
    /// ANALYSIS_PROFILEが未設定または不正な場合はstandardを使う。
    pub fn from_env() -> Self {
        let profile = match std::env::var(ENV_ANALYSIS_PROFILE) {
            Ok(value) => match AnalysisProfile::parse(&value) {
                Some(profile) => profile,
                None => {
                    warn!(
                        key = ENV_ANALYSIS_PROFILE,
                        value = %value,
                        "Unknown analysis profile, using standard"
                    );
                    AnalysisProfile::Standard
                }
            },
            Err(_) => AnalysisProfile::Standard,
        };

        info!(profile = profile.as_str(), "AnalysisConfig loaded");

        Self { profile }
    }

    pub fn profile(&self) -> AnalysisProfile {
        self.profile
    }
}

/// 環境変数からu64値を読み込む
///
/// 未設定またはパースエラーの場合はデフォルト値を返す。
fn parse_env_u64(key: &str, default: u64) -> u64 {
    match std::env::var(key) {
        Ok(value) => match value.trim().parse::<u64>() {
            Ok(parsed) => parsed,
            Err(_) => {
                warn!(
                    key,
                    value = %value,
                    default,
                    "Environment variable parse error, using default"
                );
                default
            }
        },
        Err(_) => default,
    }
}
