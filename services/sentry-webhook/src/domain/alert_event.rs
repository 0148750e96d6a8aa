/// Sentryアラートイベントのドメインモデル
///
/// Sentry WebhookのJSONペイロードのうち、通知に必要なフィールドだけを
/// 明示的なスキーマとして定義する。全フィールドはオプショナルで、
/// 欠落時はデフォルト値で補完する。
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// プロジェクト名が無い場合の表示名
pub const DEFAULT_PROJECT_NAME: &str = "SAP Frontend";

/// エラータイトルが無い場合の表示名
pub const DEFAULT_ERROR_TITLE: &str = "Unknown Error";

/// レベルが無い場合のデフォルト
pub const DEFAULT_LEVEL: &str = "error";

/// ペイロードのパースエラー
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PayloadError {
    /// ボディが空
    #[error("request body is empty")]
    EmptyBody,

    /// JSONとして不正
    #[error("failed to parse JSON: {0}")]
    InvalidJson(String),

    /// JSONとしては正しいがスキーマに合わない
    #[error("invalid payload shape: {0}")]
    InvalidShape(String),
}

/// リクエストボディをJSON値として読み込む
///
/// API Gateway経由ではボディは文字列で届くが、呼び出し元によっては
/// JSON文字列がさらに文字列としてエンコードされていることがある。
/// トップレベルが文字列の場合はもう一段パースする。
pub fn parse_body_value(body: &[u8]) -> Result<Value, PayloadError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(PayloadError::EmptyBody);
    }

    let value: Value =
        serde_json::from_slice(body).map_err(|e| PayloadError::InvalidJson(e.to_string()))?;

    match value {
        Value::String(inner) => {
            serde_json::from_str(&inner).map_err(|e| PayloadError::InvalidJson(e.to_string()))
        }
        other => Ok(other),
    }
}

/// Sentryイベントの発生時刻
///
/// SentryはISO-8601文字列とエポック秒（小数あり）の両方を送ってくる。
/// 数値の絶対値が`EPOCH_MILLIS_THRESHOLD`以上ならエポックミリ秒とみなす。
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum EventTimestamp {
    /// エポック秒
    Epoch(f64),
    /// ISO-8601 / RFC 3339 文字列
    Text(String),
}

/// 秒として西暦5138年、ミリ秒として1973年に相当する境界値
pub const EPOCH_MILLIS_THRESHOLD: f64 = 1e11;

impl EventTimestamp {
    /// UTC日時に変換する
    ///
    /// オフセット無しの文字列はUTCとして扱う。
    /// 解釈できない場合は`None`。
    pub fn to_utc(&self) -> Option<DateTime<Utc>> {
        match self {
            EventTimestamp::Epoch(value) => {
                if !value.is_finite() {
                    return None;
                }
                if value.abs() >= EPOCH_MILLIS_THRESHOLD {
                    return Utc.timestamp_millis_opt(value.round() as i64).single();
                }
                let secs = *value;
                let whole = secs.floor();
                let nanos = ((secs - whole) * 1_000_000_000.0) as u32;
                Utc.timestamp_opt(whole as i64, nanos).single()
            }
            EventTimestamp::Text(text) => {
                let text = text.trim();
                if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
                    return Some(dt.with_timezone(&Utc));
                }
                NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
                    .ok()
                    .map(|naive| naive.and_utc())
            }
        }
    }

    /// 表示用の生文字列
    pub fn raw(&self) -> String {
        match self {
            EventTimestamp::Epoch(secs) => secs.to_string(),
            EventTimestamp::Text(text) => text.clone(),
        }
    }
}

/// ネストされた`event`オブジェクト
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EventDetail {
    /// エラータイトル
    #[serde(default)]
    pub title: Option<String>,
    /// 発生時刻
    #[serde(default)]
    pub timestamp: Option<EventTimestamp>,
}

/// Sentry Webhookから受信するアラートイベント
///
/// スキーマ外のフィールドは無視する。
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AlertEvent {
    /// プロジェクト名
    #[serde(default)]
    pub project_name: Option<String>,
    /// イベント詳細
    #[serde(default)]
    pub event: Option<EventDetail>,
    /// 重大度（fatal / error / warning / info）
    #[serde(default)]
    pub level: Option<String>,
    /// Sentry上の詳細URL
    #[serde(default)]
    pub url: Option<String>,
}

impl AlertEvent {
    /// リクエストボディからアラートイベントをパースする
    pub fn from_body(body: &[u8]) -> Result<Self, PayloadError> {
        let value = parse_body_value(body)?;
        Self::from_value(value)
    }

    /// JSON値からアラートイベントを構築する
    pub fn from_value(value: Value) -> Result<Self, PayloadError> {
        if !value.is_object() {
            return Err(PayloadError::InvalidShape(
                "payload must be a JSON object".to_string(),
            ));
        }
        serde_json::from_value(value).map_err(|e| PayloadError::InvalidShape(e.to_string()))
    }

    /// プロジェクト名（デフォルト補完済み）
    pub fn project_name(&self) -> &str {
        non_empty(self.project_name.as_deref()).unwrap_or(DEFAULT_PROJECT_NAME)
    }

    /// エラータイトル（デフォルト補完済み）
    pub fn title(&self) -> &str {
        non_empty(self.event.as_ref().and_then(|e| e.title.as_deref()))
            .unwrap_or(DEFAULT_ERROR_TITLE)
    }

    /// 重大度
    pub fn level(&self) -> AlertLevel {
        AlertLevel::parse(non_empty(self.level.as_deref()).unwrap_or(DEFAULT_LEVEL))
    }

    /// 詳細URL（空文字列は未指定扱い）
    pub fn url(&self) -> Option<&str> {
        non_empty(self.url.as_deref())
    }

    /// 発生時刻
    pub fn timestamp(&self) -> Option<&EventTimestamp> {
        self.event.as_ref().and_then(|e| e.timestamp.as_ref())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}

/// アラートの重大度
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertLevel {
    Fatal,
    Error,
    Warning,
    Info,
    /// 未知のレベル（元の文字列を保持）
    Other(String),
}

impl AlertLevel {
    /// レベル文字列をパースする（大文字小文字は区別する）
    pub fn parse(level: &str) -> Self {
        match level {
            "fatal" => AlertLevel::Fatal,
            "error" => AlertLevel::Error,
            "warning" => AlertLevel::Warning,
            "info" => AlertLevel::Info,
            other => AlertLevel::Other(other.to_string()),
        }
    }

    /// レベルに対応する絵文字
    ///
    /// 未知のレベルはerrorと同じ🚨を使う。
    pub fn emoji(&self) -> &'static str {
        match self {
            AlertLevel::Fatal => "💀",
            AlertLevel::Error => "🚨",
            AlertLevel::Warning => "⚠️",
            AlertLevel::Info => "ℹ️",
            AlertLevel::Other(_) => "🚨",
        }
    }

    /// 元のレベル文字列
    pub fn as_str(&self) -> &str {
        match self {
            AlertLevel::Fatal => "fatal",
            AlertLevel::Error => "error",
            AlertLevel::Warning => "warning",
            AlertLevel::Info => "info",
            AlertLevel::Other(raw) => raw,
        }
    }

    /// 通知文に載せるラベル（大文字）
    pub fn label(&self) -> String {
        self.as_str().to_uppercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_parse_full_payload() {
        let body = r#"{
            "project_name": "my-app",
            "event": {"title": "TypeError: x is undefined", "timestamp": "2024-01-15T09:30:00Z"},
            "level": "warning",
            "url": "https://sentry.io/issues/1"
        }"#;

        let event = AlertEvent::from_body(body.as_bytes()).unwrap();

        assert_eq!(event.project_name(), "my-app");
        assert_eq!(event.title(), "TypeError: x is undefined");
        assert_eq!(event.level(), AlertLevel::Warning);
        assert_eq!(event.url(), Some("https://sentry.io/issues/1"));
        assert_eq!(
            event.timestamp(),
            Some(&EventTimestamp::Text("2024-01-15T09:30:00Z".to_string()))
        );
    }

    #[test]
    fn test_empty_object_uses_defaults() {
        let event = AlertEvent::from_body(b"{}").unwrap();

        assert_eq!(event.project_name(), DEFAULT_PROJECT_NAME);
        assert_eq!(event.title(), DEFAULT_ERROR_TITLE);
        assert_eq!(event.level(), AlertLevel::Error);
        assert_eq!(event.url(), None);
        assert!(event.timestamp().is_none());
    }

    #[test]
    fn test_empty_strings_fall_back_to_defaults() {
        let body = r#"{"project_name": "", "event": {"title": ""}, "level": "", "url": ""}"#;
        let event = AlertEvent::from_body(body.as_bytes()).unwrap();

        assert_eq!(event.project_name(), DEFAULT_PROJECT_NAME);
        assert_eq!(event.title(), DEFAULT_ERROR_TITLE);
        assert_eq!(event.level(), AlertLevel::Error);
        assert_eq!(event.url(), None);
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let body = r#"{"project_name": "p", "culprit": "main.js", "data": {"x": 1}}"#;
        let event = AlertEvent::from_body(body.as_bytes()).unwrap();
        assert_eq!(event.project_name(), "p");
    }

    #[test]
    fn test_double_encoded_body() {
        let inner = r#"{"project_name":"nested","level":"fatal"}"#;
        let body = serde_json::to_string(inner).unwrap();

        let event = AlertEvent::from_body(body.as_bytes()).unwrap();

        assert_eq!(event.project_name(), "nested");
        assert_eq!(event.level(), AlertLevel::Fatal);
    }

    #[test]
    fn test_malformed_json_is_error() {
        let result = AlertEvent::from_body(b"{not json");
        assert!(matches!(result, Err(PayloadError::InvalidJson(_))));
    }

    #[test]
    fn test_empty_body_is_error() {
        assert_eq!(AlertEvent::from_body(b""), Err(PayloadError::EmptyBody));
        assert_eq!(AlertEvent::from_body(b"  \n"), Err(PayloadError::EmptyBody));
    }

    #[test]
    fn test_non_object_payload_is_error() {
        let result = AlertEvent::from_body(b"[1,2,3]");
        assert!(matches!(result, Err(PayloadError::InvalidShape(_))));

        let result = AlertEvent::from_body(b"null");
        assert!(matches!(result, Err(PayloadError::InvalidShape(_))));
    }

    #[test]
    fn test_wrong_field_type_is_error() {
        let result = AlertEvent::from_body(br#"{"project_name": 42}"#);
        assert!(matches!(result, Err(PayloadError::InvalidShape(_))));
    }

    #[test]
    fn test_level_parse_and_emoji() {
        assert_eq!(AlertLevel::parse("fatal").emoji(), "💀");
        assert_eq!(AlertLevel::parse("error").emoji(), "🚨");
        assert_eq!(AlertLevel::parse("warning").emoji(), "⚠️");
        assert_eq!(AlertLevel::parse("info").emoji(), "ℹ️");
        assert_eq!(AlertLevel::parse("debug").emoji(), "🚨");
    }

    #[test]
    fn test_level_parse_is_case_sensitive() {
        assert_eq!(
            AlertLevel::parse("FATAL"),
            AlertLevel::Other("FATAL".to_string())
        );
        assert_eq!(AlertLevel::parse("FATAL").emoji(), "🚨");
    }

    #[test]
    fn test_level_label_is_uppercase() {
        assert_eq!(AlertLevel::Warning.label(), "WARNING");
        assert_eq!(AlertLevel::parse("critical").label(), "CRITICAL");
    }

    #[test]
    fn test_timestamp_rfc3339_with_offset() {
        let ts = EventTimestamp::Text("2024-01-15T18:30:00+09:00".to_string());
        let utc = ts.to_utc().unwrap();
        assert_eq!(utc.hour(), 9);
        assert_eq!(utc.minute(), 30);
    }

    #[test]
    fn test_timestamp_without_offset_is_utc() {
        let ts = EventTimestamp::Text("2024-01-15T09:30:00.123456".to_string());
        let utc = ts.to_utc().unwrap();
        assert_eq!(utc.hour(), 9);
        assert_eq!(utc.minute(), 30);
    }

    #[test]
    fn test_timestamp_epoch_seconds() {
        let body = r#"{"event": {"timestamp": 1705311000.5}}"#;
        let event = AlertEvent::from_body(body.as_bytes()).unwrap();
        let utc = event.timestamp().unwrap().to_utc().unwrap();
        assert_eq!(utc.timestamp(), 1_705_311_000);
        assert_eq!(utc.timestamp_subsec_millis(), 500);
    }

    #[test]
    fn test_timestamp_epoch_millis() {
        let body = r#"{"event": {"timestamp": 1705311000999}}"#;
        let event = AlertEvent::from_body(body.as_bytes()).unwrap();
        let utc = event.timestamp().unwrap().to_utc().unwrap();
        assert_eq!(utc.timestamp(), 1_705_311_000);
        assert_eq!(utc.timestamp_subsec_millis(), 999);
    }

    #[test]
    fn test_timestamp_garbage_is_none() {
        let ts = EventTimestamp::Text("yesterday".to_string());
        assert!(ts.to_utc().is_none());
        assert_eq!(ts.raw(), "yesterday");
    }
}
