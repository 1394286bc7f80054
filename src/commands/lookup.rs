//! Lookup command handler.

use spotwatch::config::SpotwatchConfig;
use spotwatch::models::EntityCode;

/// Resolves an entity code and reports its region class.
pub fn cmd_lookup(config: &SpotwatchConfig, code: i64) -> Result<(), Box<dyn std::error::Error>> {
    let directory = config.load_directory()?;
    let code = EntityCode::new(code);
    let class = if config.home().is_home(code) {
        "home"
    } else {
        "foreign"
    };

    match directory.resolve(code) {
        Some(name) => println!("{code}\t{name}\t{class}"),
        None => return Err(format!("entity {code} is not in the directory").into()),
    }
    Ok(())
}
