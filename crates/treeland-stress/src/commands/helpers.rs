use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{error, info};

use treeland_stress_core::StressConfig;

/// Load the config hierarchy, layer CLI overrides on top and validate.
pub(crate) fn load_config(overrides: StressConfig) -> Result<StressConfig, Box<dyn std::error::Error>> {
    let config = match StressConfig::load_hierarchy() {
        Ok(config) => config.with_overrides(overrides),
        Err(e) => {
            eprintln!("Error: {}", e);
            error!(event = "cli.config_load_failed", error = %e);
            return Err(e.into());
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        error!(event = "cli.config_invalid", error = %e);
        return Err(e.into());
    }

    Ok(config)
}

/// Install the Ctrl+C handler and return the flag it sets.
pub(crate) fn install_interrupt_handler() -> Result<Arc<AtomicBool>, Box<dyn std::error::Error>> {
    let interrupt = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&interrupt);
    ctrlc::set_handler(move || {
        info!(event = "cli.interrupt_received");
        flag.store(true, Ordering::SeqCst);
    })
    .map_err(|e| format!("Failed to install Ctrl+C handler: {}", e))?;
    Ok(interrupt)
}
