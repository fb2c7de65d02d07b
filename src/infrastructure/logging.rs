use std::fs::File;
use std::path::Path;

use log::LevelFilter;
use simplelog::{ConfigBuilder, WriteLogger};

use super::config::ConfigResult;

/// Sends log output to `path`. Stdout is owned by the terminal UI, so
/// nothing is logged there.
pub fn init_logging(path: &Path, level: LevelFilter) -> ConfigResult<()> {
    let file = File::create(path)?;
    let config = ConfigBuilder::new()
        .set_target_level(LevelFilter::Error)
        .set_thread_level(LevelFilter::Off)
        .build();
    WriteLogger::init(level, config, file)?;
    log::info!("logging to {} at {}", path.display(), level);
    Ok(())
}
