/// 通知メッセージの整形
///
/// AlertEventから人間が読める複数行テキストを組み立てる。
/// 発生時刻は日本時間（UTC+9、夏時間なし）で表示する。
use chrono::{DateTime, FixedOffset, Utc};

use super::alert_event::AlertEvent;

/// 表示タイムゾーン（Asia/Tokyo）のUTCオフセット秒
pub const DISPLAY_UTC_OFFSET_SECS: i32 = 9 * 3600;

/// 表示用の日時フォーマット（例: 2024/01/15 18:30）
pub const DISPLAY_TIME_FORMAT: &str = "%Y/%m/%d %H:%M";

/// 送信用に整形された通知メッセージ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationMessage {
    text: String,
}

impl NotificationMessage {
    /// アラートイベントからメッセージを整形する
    ///
    /// # Arguments
    /// * `event` - 受信したアラートイベント
    /// * `now` - イベントに時刻が無い場合に使う現在時刻
    pub fn from_alert(event: &AlertEvent, now: DateTime<Utc>) -> Self {
        let level = event.level();
        let occurred_at = match event.timestamp() {
            Some(ts) => match ts.to_utc() {
                Some(utc) => format_display_time(utc),
                None => ts.raw(),
            },
            None => format_display_time(now),
        };
        let url_line = event
            .url()
            .map(|url| format!("🔗 詳細: {}", url))
            .unwrap_or_default();

        let text = [
            format!("{} Sentry Alert", level.emoji()),
            String::new(),
            format!("🎯 プロジェクト: {}", event.project_name()),
            format!("🐛 エラー: {}", event.title()),
            format!("📅 発生時刻: {}", occurred_at),
            format!("📊 レベル: {}", level.label()),
            String::new(),
            url_line,
            String::new(),
            "#SentryAlert".to_string(),
        ]
        .join("\n");

        Self { text }
    }

    /// メッセージ本文
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

/// UTC日時を表示タイムゾーンの文字列に変換する
pub fn format_display_time(utc: DateTime<Utc>) -> String {
    match FixedOffset::east_opt(DISPLAY_UTC_OFFSET_SECS) {
        Some(offset) => utc
            .with_timezone(&offset)
            .format(DISPLAY_TIME_FORMAT)
            .to_string(),
        None => utc.format(DISPLAY_TIME_FORMAT).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn alert(body: &str) -> AlertEvent {
        AlertEvent::from_body(body.as_bytes()).unwrap()
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_message_contains_project_title_and_emoji() {
        let event = alert(
            r#"{"project_name":"shop-web","event":{"title":"ReferenceError: foo"},"level":"info"}"#,
        );
        let message = NotificationMessage::from_alert(&event, fixed_now());
        let text = message.as_str();

        assert!(text.starts_with("ℹ️ Sentry Alert"));
        assert!(text.contains("🎯 プロジェクト: shop-web"));
        assert!(text.contains("🐛 エラー: ReferenceError: foo"));
        assert!(text.contains("📊 レベル: INFO"));
        assert!(text.ends_with("#SentryAlert"));
    }

    #[test]
    fn test_fatal_uses_skull() {
        let event = alert(r#"{"level":"fatal"}"#);
        let message = NotificationMessage::from_alert(&event, fixed_now());
        assert!(message.as_str().starts_with("💀 "));
        assert!(message.as_str().contains("📊 レベル: FATAL"));
    }

    #[test]
    fn test_unknown_level_defaults_to_siren() {
        let event = alert(r#"{"level":"critical"}"#);
        let message = NotificationMessage::from_alert(&event, fixed_now());
        assert!(message.as_str().starts_with("🚨 "));
        assert!(message.as_str().contains("📊 レベル: CRITICAL"));
    }

    #[test]
    fn test_timestamp_converted_to_tokyo_time() {
        let event = alert(r#"{"event":{"timestamp":"2024-01-15T15:30:00Z"}}"#);
        let message = NotificationMessage::from_alert(&event, fixed_now());
        assert!(message.as_str().contains("📅 発生時刻: 2024/01/16 00:30"));
    }

    #[test]
    fn test_epoch_millis_timestamp_converted_to_tokyo_time() {
        let event = alert(r#"{"event":{"timestamp":1705311000999}}"#);
        let message = NotificationMessage::from_alert(&event, fixed_now());
        assert!(message.as_str().contains("📅 発生時刻: 2024/01/15 18:30"));
    }

    #[test]
    fn test_missing_timestamp_uses_now() {
        let event = alert("{}");
        let message = NotificationMessage::from_alert(&event, fixed_now());
        assert!(message.as_str().contains("📅 発生時刻: 2024/03/01 09:00"));
    }

    #[test]
    fn test_unparseable_timestamp_shown_verbatim() {
        let event = alert(r#"{"event":{"timestamp":"not-a-date"}}"#);
        let message = NotificationMessage::from_alert(&event, fixed_now());
        assert!(message.as_str().contains("📅 発生時刻: not-a-date"));
    }

    #[test]
    fn test_url_line_present_only_with_url() {
        let with_url = alert(r#"{"url":"https://sentry.io/organizations/o/issues/9/"}"#);
        let message = NotificationMessage::from_alert(&with_url, fixed_now());
        assert!(message
            .as_str()
            .contains("🔗 詳細: https://sentry.io/organizations/o/issues/9/"));

        let without_url = alert("{}");
        let message = NotificationMessage::from_alert(&without_url, fixed_now());
        assert!(!message.as_str().contains("🔗"));
    }

    #[test]
    fn test_full_layout() {
        let event = alert(
            r#"{"project_name":"p","event":{"title":"t","timestamp":"2024-01-15T00:00:00Z"},"level":"error","url":"https://x"}"#,
        );
        let message = NotificationMessage::from_alert(&event, fixed_now());

        let expected = "🚨 Sentry Alert\n\
                        \n\
                        🎯 プロジェクト: p\n\
                        🐛 エラー: t\n\
                        📅 発生時刻: 2024/01/15 09:00\n\
                        📊 レベル: ERROR\n\
                        \n\
                        🔗 詳細: https://x\n\
                        \n\
                        #SentryAlert";
        assert_eq!(message.as_str(), expected);
    }
}
