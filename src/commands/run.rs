//! Run command handler.

use spotwatch::config::SpotwatchConfig;
use spotwatch::io::{OutputFormat, create_sink, run_feed};
use spotwatch::services::{SpotProcessor, TimeBase};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, BufReader};

/// Command-line overrides for `run`.
#[derive(Debug, Default)]
pub struct RunOptions {
    /// NDJSON feed file; stdin when unset.
    pub input: Option<PathBuf>,
    /// Output format override.
    pub format: Option<OutputFormat>,
    /// Time base override.
    pub time_base: Option<TimeBase>,
    /// Window override in seconds.
    pub window_secs: Option<u64>,
}

/// Run command.
pub async fn cmd_run(
    mut config: SpotwatchConfig,
    options: RunOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(format) = options.format {
        config.output = format;
    }
    if let Some(time_base) = options.time_base {
        config.time_base = time_base;
    }
    if let Some(secs) = options.window_secs {
        config = config.with_window(Duration::from_secs(secs));
    }
    config.validate()?;

    let directory = Arc::new(config.load_directory()?);
    let home = config.home();
    tracing::info!(
        entities = directory.len(),
        home_regions = home.len(),
        window_secs = config.suppression.window.as_secs(),
        time_base = ?config.time_base,
        "Starting spot processing"
    );

    let processor = SpotProcessor::new(directory, home, &config.suppression, config.time_base);
    let mut sink = create_sink(std::io::stdout(), config.output);

    let reader: Box<dyn AsyncBufRead + Unpin + Send> = match &options.input {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .map_err(|e| format!("cannot open {}: {e}", path.display()))?;
            Box::new(BufReader::new(file))
        },
        None => Box::new(BufReader::new(tokio::io::stdin())),
    };

    let shutdown = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    let stats = run_feed(
        reader,
        &processor,
        sink.as_mut(),
        config.sweep_interval,
        shutdown,
    )
    .await?;

    eprintln!(
        "Processed {} spots: {} admitted, {} suppressed, {} rejected, {} malformed",
        stats.received, stats.admitted, stats.suppressed, stats.rejected, stats.malformed
    );
    Ok(())
}
