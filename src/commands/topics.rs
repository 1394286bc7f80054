//! Topics command handler.

use spotwatch::config::SpotwatchConfig;
use spotwatch::services::topic_filters;

/// Prints one broker subscription filter per line.
pub fn cmd_topics(
    config: &SpotwatchConfig,
    band: Option<String>,
    mode: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let band = band.unwrap_or_else(|| config.band.clone());
    let mode = mode.unwrap_or_else(|| config.mode.clone());

    for filter in topic_filters(&band, &mode, &config.home())? {
        println!("{filter}");
    }
    Ok(())
}
