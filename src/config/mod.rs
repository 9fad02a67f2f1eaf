// src/config/mod.rs
pub mod settings;
pub mod sources;

pub use settings::{DetectorSettings, NotifyConfig, Settings, TelegramConfig};
pub use sources::{load_sources_from, SourceConfig, SourceKind};
