// Domain layer modules
pub mod alert_event;
pub mod analysis;
pub mod notification_message;

// Re-exports
pub use alert_event::{AlertEvent, AlertLevel, EventDetail, EventTimestamp, PayloadError};
pub use analysis::{AnalysisDetail, AnalysisProfile, AnalysisRequest, AnalysisResult};
pub use notification_message::{format_display_time, NotificationMessage};
