//! SIGHUP-driven reload of the hashing migration flag.
//!
//! On each SIGHUP the `.env` file is re-read (overriding the process
//! environment) and the flag is swapped in place. Requests already hashing
//! finish with the algorithm they started with.

use registry_crypto::MigrationFlag;
use tracing::{error, info, warn};

use crate::config::bcrypt_migration_from_env;

#[cfg(unix)]
pub fn spawn_sighup_handler(flag: MigrationFlag) {
    tokio::spawn(async move {
        let mut signal = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::hangup()) {
            Ok(s) => s,
            Err(e) => {
                error!(error = %e, "Failed to install SIGHUP handler for config reload");
                return;
            }
        };

        info!("SIGHUP config reload handler started");

        loop {
            signal.recv().await;
            info!("Received SIGHUP, reloading migration flag");
            reload(&flag);
        }
    });
}

#[cfg(not(unix))]
pub fn spawn_sighup_handler(_flag: MigrationFlag) {
    info!("SIGHUP reload not supported on this platform");
}

fn reload(flag: &MigrationFlag) {
    if let Err(e) = dotenvy::dotenv_override() {
        warn!(error = %e, "Could not re-read .env, using current environment");
    }

    match bcrypt_migration_from_env() {
        Ok(bcrypt) => {
            let previous = flag.set(bcrypt);
            if previous == bcrypt {
                info!(bcrypt, "SIGHUP reload: migration flag unchanged");
            } else {
                info!(bcrypt, previous, "SIGHUP reload: migration flag updated");
            }
        }
        Err(e) => {
            warn!(error = %e, "SIGHUP reload failed, keeping current flag");
        }
    }
}
