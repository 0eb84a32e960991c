use auto_finance_core::EngineConfig;
use log::debug;

use super::file;

/// Engine configuration from `--config`, or the built-in defaults.
pub fn load_config(path: Option<&str>) -> Result<EngineConfig, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        debug!("no --config given; using default engine configuration");
        return Ok(EngineConfig::default());
    };
    let config: EngineConfig = file::read_document(path)?;
    config.validate()?;
    debug!("loaded engine configuration from {path}");
    Ok(config)
}
