// tests/settings_env.rs
use std::path::PathBuf;
use std::time::Duration;

use change_radar::config::settings::{
    ENV_DOCS_DIR, ENV_FEED_DELAY_MS, ENV_PAGE_TIMEOUT_SECS, ENV_REPORT_FIRST_OBSERVATION,
    ENV_STATE_DIR,
};
use change_radar::{NotifierMux, Settings};
use serial_test::serial;

const TOUCHED: &[&str] = &[
    ENV_STATE_DIR,
    ENV_DOCS_DIR,
    ENV_PAGE_TIMEOUT_SECS,
    ENV_FEED_DELAY_MS,
    ENV_REPORT_FIRST_OBSERVATION,
    "TELEGRAM_BOT_TOKEN",
    "TELEGRAM_CHAT_ID",
    "SLACK_WEBHOOK_URL",
];

fn clear_env() {
    for k in TOUCHED {
        std::env::remove_var(k);
    }
}

#[test]
#[serial]
fn from_env_reads_overrides() {
    clear_env();
    std::env::set_var(ENV_STATE_DIR, "/tmp/radar-state");
    std::env::set_var(ENV_DOCS_DIR, "/tmp/radar-docs");
    std::env::set_var(ENV_PAGE_TIMEOUT_SECS, "7");
    std::env::set_var(ENV_FEED_DELAY_MS, "0");
    std::env::set_var(ENV_REPORT_FIRST_OBSERVATION, "true");

    let s = Settings::from_env();
    assert_eq!(s.state_dir, PathBuf::from("/tmp/radar-state"));
    assert_eq!(s.docs_dir, PathBuf::from("/tmp/radar-docs"));
    assert_eq!(s.detector.page_timeout, Duration::from_secs(7));
    assert_eq!(s.detector.feed_delay, Duration::ZERO);
    assert!(s.detector.report_first_observation);
    clear_env();
}

#[test]
#[serial]
fn notification_sinks_follow_credentials() {
    clear_env();
    assert!(NotifierMux::from_config(&Settings::from_env().notify).is_empty());

    // Half-configured Telegram stays disabled
    std::env::set_var("TELEGRAM_BOT_TOKEN", "123:abc");
    assert!(NotifierMux::from_config(&Settings::from_env().notify).is_empty());

    std::env::set_var("TELEGRAM_CHAT_ID", "-100200");
    std::env::set_var("SLACK_WEBHOOK_URL", "https://hooks.slack.test/T/B/x");
    let mux = NotifierMux::from_config(&Settings::from_env().notify);
    assert_eq!(mux.sink_names(), vec!["telegram", "slack"]);
    clear_env();
}
