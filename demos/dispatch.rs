//! Publish to the website adapter and print the aggregated response.
//!
//! cargo run -p fanout --example dispatch -- config/fanout.example.yml
use fanout::prelude::*;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config/fanout.example.yml".to_string());

    let config =
        FanoutConfig::from_file_with_overrides(&config_path, |key| std::env::var(key).ok())?;
    init_tracing(&config.settings.logging)?;

    let app = FanoutApp::from_settings(config.settings).await?;
    info!(platforms = ?app.orchestrator().platforms(), "Loaded {}", config_path);

    let request = PublishRequest::new(
        "fanout 0.2",
        "One request, every platform.",
        ["website"],
    );
    let response = app.orchestrator().dispatch(&request).await?.into_response();
    println!("{}", serde_json::to_string_pretty(&response)?);

    if let Some(website) = app.orchestrator().adapter(PlatformId::Website) {
        let listing = website.list().await;
        println!("{}", serde_json::to_string_pretty(&listing)?);
    }

    info!(stats = ?app.orchestrator().stats(), "Done");
    Ok(())
}
