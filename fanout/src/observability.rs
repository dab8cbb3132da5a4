use fanout_config::LoggingSettings;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global fmt subscriber. `RUST_LOG` wins over `settings.level`.
///
/// Fails if a global subscriber is already set.
pub fn init_tracing(settings: &LoggingSettings) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))?;

    let registry = tracing_subscriber::registry().with(env_filter);
    if settings.json {
        registry
            .with(fmt::layer().json().with_current_span(true).with_target(true))
            .try_init()?;
    } else {
        registry.with(fmt::layer().compact().with_target(true)).try_init()?;
    }
    Ok(())
}
