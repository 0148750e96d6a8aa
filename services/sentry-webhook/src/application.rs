// アプリケーション層モジュール
pub mod analysis_handler;
pub mod http_response;
pub mod webhook_handler;

// 再エクスポート
pub use analysis_handler::{AnalysisError, AnalysisHandler};
pub use http_response::CorsPolicy;
pub use webhook_handler::{WebhookError, WebhookHandler};
