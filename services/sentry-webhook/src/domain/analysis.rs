/// データ分析リクエストと結果
///
/// 分析Lambdaは実際の分析処理を行わず、受け取ったデータ件数を
/// 数えて定型の結果を返す。
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Number, Value};

use super::alert_event::{parse_body_value, PayloadError};

/// 分析種別が無い場合のラベル（minimalプロファイル）
pub const MINIMAL_DEFAULT_ANALYSIS_TYPE: &str = "データ";

/// 分析結果のプロファイル
///
/// フルスタック用とminimalスタック用で返す定型値が異なる。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnalysisProfile {
    #[default]
    Standard,
    Minimal,
}

impl AnalysisProfile {
    /// プロファイル名をパースする
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "standard" => Some(AnalysisProfile::Standard),
            "minimal" => Some(AnalysisProfile::Minimal),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisProfile::Standard => "standard",
            AnalysisProfile::Minimal => "minimal",
        }
    }

    fn processing_time(&self) -> &'static str {
        match self {
            AnalysisProfile::Standard => "1.2s",
            AnalysisProfile::Minimal => "0.5s",
        }
    }

    fn model_version(&self) -> &'static str {
        match self {
            AnalysisProfile::Standard => "v1.0.0",
            AnalysisProfile::Minimal => "minimal-v1.0.0",
        }
    }
}

/// 分析リクエスト
///
/// 各フィールドの形は検証しない。`salesData`は配列なら要素数、文字列なら
/// UTF-16単位の長さを数え、それ以外は0件とみなす。
/// `analysisType`は任意のJSON値を受け取り、要約文に埋め込む際に文字列化する。
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    /// 分析指示（現状は参照しない）
    #[serde(default)]
    pub prompt: Option<Value>,
    #[serde(default)]
    pub sales_data: Option<Value>,
    /// キーが無い場合は`None`、`null`の場合は`Some(Value::Null)`
    #[serde(default, deserialize_with = "present_value")]
    pub analysis_type: Option<Value>,
}

/// キーが存在すれば`null`も含めて`Some`にする
fn present_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl AnalysisRequest {
    /// リクエストボディから分析リクエストをパースする
    pub fn from_body(body: &[u8]) -> Result<Self, PayloadError> {
        let value = parse_body_value(body)?;
        if !value.is_object() {
            return Err(PayloadError::InvalidShape(
                "payload must be a JSON object".to_string(),
            ));
        }
        serde_json::from_value(value).map_err(|e| PayloadError::InvalidShape(e.to_string()))
    }

    /// 分析対象のレコード数
    pub fn record_count(&self) -> usize {
        match &self.sales_data {
            Some(Value::Array(items)) => items.len(),
            Some(Value::String(text)) => text.encode_utf16().count(),
            _ => 0,
        }
    }

    /// 要約文に使う分析種別ラベル
    ///
    /// standardはキー欠落を`undefined`、`null`を`null`として埋め込む。
    /// minimalは偽とみなせる値（欠落、null、false、0、空文字列）を
    /// 「データ」に置き換える。
    pub fn analysis_type_label(&self, profile: AnalysisProfile) -> String {
        match profile {
            AnalysisProfile::Standard => match &self.analysis_type {
                Some(value) => display_value(value),
                None => "undefined".to_string(),
            },
            AnalysisProfile::Minimal => match &self.analysis_type {
                Some(value) if is_truthy(value) => display_value(value),
                _ => MINIMAL_DEFAULT_ANALYSIS_TYPE.to_string(),
            },
        }
    }
}

/// テンプレート文字列に埋め込んだときの表記
fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Number(number) => display_number(number),
        Value::Bool(flag) => flag.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => display_value(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// 整数値の浮動小数は小数点なしで表記する（5.0 → "5"）
fn display_number(number: &Number) -> String {
    if number.is_i64() || number.is_u64() {
        return number.to_string();
    }
    match number.as_f64() {
        Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e21 => format!("{:.0}", f),
        Some(f) => f.to_string(),
        None => number.to_string(),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// 分析の詳細情報
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisDetail {
    #[serde(rename = "totalRecords")]
    pub total_records: usize,
    pub processing_time: String,
    pub model_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// 分析結果
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub summary: String,
    pub data_points: usize,
    pub timestamp: String,
    pub analysis: AnalysisDetail,
}

impl AnalysisResult {
    /// リクエストとプロファイルから定型の分析結果を構築する
    pub fn build(request: &AnalysisRequest, profile: AnalysisProfile, now: DateTime<Utc>) -> Self {
        let label = request.analysis_type_label(profile);
        let count = request.record_count();

        Self {
            summary: format!("{}分析を実行しました", label),
            data_points: count,
            timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            analysis: AnalysisDetail {
                total_records: count,
                processing_time: profile.processing_time().to_string(),
                model_version: profile.model_version().to_string(),
                status: match profile {
                    AnalysisProfile::Standard => None,
                    AnalysisProfile::Minimal => Some("success".to_string()),
                },
            },
        }
    }
}
