pub mod catalog;
pub mod events;
pub mod logs;
pub mod types;

pub use catalog::{ServiceStackType, ServiceStackTypeVersion};
pub use events::{AppVersionEvent, BuildInfo, UserRef, is_build_terminal};
pub use logs::{LogAccess, LogEntry, LogFetchParams};
pub use types::*;
