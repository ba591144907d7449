pub mod config;
pub mod ingestion;
pub mod normalizer;
pub mod providers;
pub mod session;

// Re-export main types
pub use config::{ConfigManager, MemorySettingsStore, SettingsStore};
pub use providers::{ProviderRegistry, RawProviderResponse, VisionAdapter};
pub use session::{AnalysisSession, SessionSnapshot, SessionState};
