use std::path::Path;

use eyre::{Context, Result};
use tracing_chrome::{ChromeLayerBuilder, FlushGuard};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "nl2sql=info,nl2sql_driver=info";

/// Keeps the Chrome trace writer alive; the file is flushed on drop.
pub struct LogGuard {
    _chrome: Option<FlushGuard>,
}

/// Install the global subscriber. Logs go to stderr, stdout belongs to the session.
pub fn init(chrome_trace: Option<&Path>) -> Result<LogGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let (chrome, guard) = match chrome_trace {
        Some(path) => {
            let (layer, guard) = ChromeLayerBuilder::new().file(path).build();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(chrome)
        .try_init()
        .wrap_err("failed to install tracing subscriber")?;

    if let Some(path) = chrome_trace {
        tracing::info!("writing chrome trace to {}", path.display());
    }

    Ok(LogGuard { _chrome: guard })
}
