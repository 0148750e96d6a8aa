// Infrastructure layer modules
pub mod config;
pub mod logging;
pub mod notify_client;

// Re-exports
pub use config::{AnalysisConfig, NotifierConfig, NotifierConfigError};
pub use logging::init_logging;
pub use notify_client::{LineNotifyClient, NotificationSender, NotifyError};
