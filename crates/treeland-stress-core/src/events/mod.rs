use tracing::{error, info};

pub fn log_app_startup(tool: &str) {
    info!(
        event = "core.app.startup_completed",
        tool = tool,
        version = env!("CARGO_PKG_VERSION")
    );
}

pub fn log_app_shutdown(tool: &str) {
    info!(event = "core.app.shutdown_started", tool = tool);
}

pub fn log_app_error(error: &dyn std::error::Error) {
    error!(
        event = "core.app.error_occurred",
        error = %error,
        error_type = std::any::type_name_of_val(error)
    );
}
