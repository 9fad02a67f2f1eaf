// src/config/settings.rs
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_SOURCES_PATH: &str = "config/sources.toml";
pub const DEFAULT_STATE_DIR: &str = "state";
pub const DEFAULT_DOCS_DIR: &str = "docs";
pub const DEFAULT_USER_AGENT: &str = "change-radar/0.1 (+https://example.com)";

pub const ENV_SOURCES_PATH: &str = "MONITOR_SOURCES_PATH";
pub const ENV_STATE_DIR: &str = "MONITOR_STATE_DIR";
pub const ENV_DOCS_DIR: &str = "MONITOR_DOCS_DIR";
pub const ENV_USER_AGENT: &str = "MONITOR_USER_AGENT";
pub const ENV_PAGE_TIMEOUT_SECS: &str = "MONITOR_PAGE_TIMEOUT_SECS";
pub const ENV_FEED_TIMEOUT_SECS: &str = "MONITOR_FEED_TIMEOUT_SECS";
pub const ENV_FEED_DELAY_MS: &str = "MONITOR_FEED_DELAY_MS";
pub const ENV_PAGE_DELAY_MS: &str = "MONITOR_PAGE_DELAY_MS";
pub const ENV_REPORT_FIRST_OBSERVATION: &str = "MONITOR_REPORT_FIRST_OBSERVATION";
pub const ENV_METRICS_PATH: &str = "MONITOR_METRICS_PATH";

/// Knobs for a single polling pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectorSettings {
    pub page_timeout: Duration,
    pub feed_timeout: Duration,
    /// Courtesy pause after a feed poll.
    pub feed_delay: Duration,
    /// Courtesy pause after a page poll (larger than the feed one by default).
    pub page_delay: Duration,
    /// Emit an event (with an all-additions diff) the first time a page is seen,
    /// instead of only seeding state.
    pub report_first_observation: bool,
}

impl Default for DetectorSettings {
    fn default() -> Self {
        Self {
            page_timeout: Duration::from_secs(25),
            feed_timeout: Duration::from_secs(25),
            feed_delay: Duration::from_millis(800),
            page_delay: Duration::from_millis(1000),
            report_first_observation: false,
        }
    }
}

impl DetectorSettings {
    /// No courtesy delays; handy for tests and one-off checks.
    pub fn without_delays(mut self) -> Self {
        self.feed_delay = Duration::ZERO;
        self.page_delay = Duration::ZERO;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
}

/// Notification credentials. A `None` field disables that sink.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotifyConfig {
    pub telegram: Option<TelegramConfig>,
    pub slack_webhook: Option<String>,
}

/// Process-wide configuration, built once at startup and passed by reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub sources_path: PathBuf,
    pub state_dir: PathBuf,
    pub docs_dir: PathBuf,
    pub user_agent: String,
    pub metrics_path: Option<PathBuf>,
    pub detector: DetectorSettings,
    pub notify: NotifyConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sources_path: PathBuf::from(DEFAULT_SOURCES_PATH),
            state_dir: PathBuf::from(DEFAULT_STATE_DIR),
            docs_dir: PathBuf::from(DEFAULT_DOCS_DIR),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            metrics_path: None,
            detector: DetectorSettings::default(),
            notify: NotifyConfig::default(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Build settings from an arbitrary key lookup. Unparseable numbers keep defaults.
    pub fn from_lookup<F>(get: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let d = Settings::default();
        let non_empty = |k: &str| get(k).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let secs = |k: &str, dflt: Duration| {
            non_empty(k)
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(dflt)
        };
        let millis = |k: &str, dflt: Duration| {
            non_empty(k)
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_millis)
                .unwrap_or(dflt)
        };

        let telegram = match (non_empty("TELEGRAM_BOT_TOKEN"), non_empty("TELEGRAM_CHAT_ID")) {
            (Some(bot_token), Some(chat_id)) => Some(TelegramConfig { bot_token, chat_id }),
            _ => None,
        };

        Self {
            sources_path: non_empty(ENV_SOURCES_PATH)
                .map(PathBuf::from)
                .unwrap_or(d.sources_path),
            state_dir: non_empty(ENV_STATE_DIR)
                .map(PathBuf::from)
                .unwrap_or(d.state_dir),
            docs_dir: non_empty(ENV_DOCS_DIR)
                .map(PathBuf::from)
                .unwrap_or(d.docs_dir),
            user_agent: non_empty(ENV_USER_AGENT).unwrap_or(d.user_agent),
            metrics_path: non_empty(ENV_METRICS_PATH).map(PathBuf::from),
            detector: DetectorSettings {
                page_timeout: secs(ENV_PAGE_TIMEOUT_SECS, d.detector.page_timeout),
                feed_timeout: secs(ENV_FEED_TIMEOUT_SECS, d.detector.feed_timeout),
                feed_delay: millis(ENV_FEED_DELAY_MS, d.detector.feed_delay),
                page_delay: millis(ENV_PAGE_DELAY_MS, d.detector.page_delay),
                report_first_observation: non_empty(ENV_REPORT_FIRST_OBSERVATION).is_some_and(
                    |v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"),
                ),
            },
            notify: NotifyConfig {
                telegram,
                slack_webhook: non_empty("SLACK_WEBHOOK_URL"),
            },
        }
    }
}
