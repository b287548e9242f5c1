//! Backdrop viewer.
//!
//! Usage: `driftfield [config.json]`

use driftfield::{Backdrop, BackdropConfig};
use log::{error, info, warn};
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match env::args().nth(1).map(PathBuf::from) {
        Some(path) => match BackdropConfig::load(&path) {
            Ok(c) => {
                info!("Loaded config from {:?}", path);
                c
            }
            Err(e) => {
                warn!("Failed to load config from {:?}: {}", path, e);
                warn!("Using default configuration.");
                BackdropConfig::default()
            }
        },
        None => BackdropConfig::default(),
    };

    match Backdrop::new().with_config(config).run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
