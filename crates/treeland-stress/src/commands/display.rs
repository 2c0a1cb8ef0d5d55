use std::sync::atomic::Ordering;
use std::time::Instant;

use clap::ArgMatches;
use tracing::{info, warn};

use treeland_stress_core::config::DisplayConfig;
use treeland_stress_core::display::{Phase, PhaseReport, WlrRandr};
use treeland_stress_core::{StressConfig, display_ops, events};

use super::helpers::{install_interrupt_handler, load_config};

pub(crate) fn handle_display_command(
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    events::log_app_startup("display");

    let overrides = StressConfig {
        display: DisplayConfig {
            interval_secs: matches.get_one::<f64>("interval").copied(),
            ..Default::default()
        },
        ..Default::default()
    };
    let config = load_config(overrides)?;
    let debug = matches.get_flag("debug");
    let only_output = matches.get_one::<String>("output").map(String::as_str);

    let tool = WlrRandr::new(config.display.tool());
    if !tool.is_available() {
        eprintln!("Warning: '{}' not found in PATH", tool.exec());
        warn!(event = "cli.display_tool_missing", tool = tool.exec());
    }

    let options = display_ops::display_options(&config.display, debug);
    let interrupt = install_interrupt_handler()?;
    let started = Instant::now();

    let reports =
        display_ops::run_display_test(&tool, &options, only_output, &interrupt, print_report);

    println!();
    if interrupt.load(Ordering::SeqCst) {
        println!("Test interrupted by user");
    }
    if reports.is_empty() {
        println!("No outputs tested");
    } else {
        let fully = reports.iter().filter(|r| r.all_succeeded()).count();
        println!(
            "Phases fully passed: {}/{} in {:.1} s",
            fully,
            reports.len(),
            started.elapsed().as_secs_f64()
        );
    }

    events::log_app_shutdown("display");
    info!(event = "cli.display_completed", phases = reports.len());
    Ok(())
}

fn print_report(report: &PhaseReport) {
    let (title, noun) = match report.phase {
        Phase::Modes => ("Resolutions and refresh rates", "modes"),
        Phase::Transforms => ("Transforms on the preferred mode", "transforms"),
        Phase::Scales => ("Scales 0.5 to 1.5", "scales"),
    };

    if report.phase == Phase::Modes {
        println!("\nTesting output: {}", report.output);
    }
    println!("\n=== {} ===", title);
    println!(
        "Successful {}: {}/{}",
        noun,
        report.succeeded.len(),
        report.total
    );
    if !report.all_succeeded() && !report.succeeded.is_empty() {
        println!("Supported {}: {}", noun, report.succeeded.join(", "));
    }
    if !report.restored {
        println!("Warning: initial {} setting could not be restored", report.phase);
    }
}
