//! Sends a sample change summary through the configured sinks (no-op when none are set).

use change_radar::event::now_str;
use change_radar::notify::build_message;
use change_radar::{ChangeEvent, NotifierMux, Settings};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_target(false).init();

    let settings = Settings::from_env();
    let mux = NotifierMux::from_config(&settings.notify);

    let events = vec![
        ChangeEvent {
            source_id: "demo-linkedin".into(),
            title: "Marketing API v202507 released".into(),
            url: "https://example.com/linkedin".into(),
            tags: vec!["linkedin".into()],
            date: now_str(),
            summary: "Versioned API update".into(),
            diff: None,
        },
        ChangeEvent {
            source_id: "demo-page".into(),
            title: "Product updates".into(),
            url: "https://example.com/updates".into(),
            tags: vec![],
            date: now_str(),
            summary: "New carousel formats".into(),
            diff: Some("-old\n+new".into()),
        },
    ];

    if let Some(text) = build_message(&events) {
        println!("{text}\n");
    }
    let delivered = mux.notify_changes(&events).await;
    println!("notify-demo done: delivered to {delivered} of {:?}", mux.sink_names());
}
