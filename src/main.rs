mod config;
mod http;
mod ip;
mod persistence;
mod services;
mod sync;
mod util;

use std::process::ExitCode;

use env_logger::Env;
use log::{error, info};

use config::Config;
use sync::{Outcome, Synchronizer};

const CONFIG_PATHS: &[&str] = &[
    "./config.toml",
    #[cfg(target_family = "unix")]
    "/etc/linode-ddns/config.toml",
];

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    // An explicit path on the command line replaces the search list.
    let explicit = std::env::args().nth(1);
    let config = match &explicit {
        Some(path) => Config::load([path.as_str()]),
        None => Config::load(CONFIG_PATHS.iter().copied()),
    };

    let config = match config {
        Ok(conf) => conf,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut synchronizer = match Synchronizer::from_config(config) {
        Ok(s) => s,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("linode-ddns v{} started", env!("CARGO_PKG_VERSION"));

    match synchronizer.run() {
        Ok(Outcome::Changed { failed, .. }) if failed > 0 => {
            // Not fatal, the records are reported above and the new IP is
            // cached regardless.
            info!("Finished, {} record update(s) failed", failed);
            ExitCode::SUCCESS
        }
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
