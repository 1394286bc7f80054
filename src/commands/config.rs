//! Config command handler.

use spotwatch::config::SpotwatchConfig;

/// Config command.
pub fn cmd_config(config: &SpotwatchConfig, show: bool) -> Result<(), Box<dyn std::error::Error>> {
    if show {
        print!("{}", config.to_toml()?);
    } else {
        println!("Use 'spotwatch config --show' to display the effective configuration");
    }
    Ok(())
}
