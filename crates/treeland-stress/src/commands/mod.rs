use clap::ArgMatches;
use tracing::error;

use treeland_stress_core::events;

mod apps;
mod display;
mod helpers;

pub fn run_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let result = match matches.subcommand() {
        Some(("apps", sub_matches)) => apps::handle_apps_command(sub_matches),
        Some(("display", sub_matches)) => display::handle_display_command(sub_matches),
        _ => {
            error!(event = "cli.command_unknown");
            Err("Unknown command".into())
        }
    };
    result.inspect_err(|e| events::log_app_error(&**e))
}
