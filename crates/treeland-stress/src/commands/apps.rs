use std::path::PathBuf;

use clap::ArgMatches;
use tracing::info;

use treeland_stress_core::apps::app_list::save_app_list;
use treeland_stress_core::apps::{FreezeReport, RunSummary, TickOutcome};
use treeland_stress_core::config::AppsConfig;
use treeland_stress_core::{StressConfig, apps_ops, events};

use super::helpers::{install_interrupt_handler, load_config};

fn overrides_from(matches: &ArgMatches) -> StressConfig {
    StressConfig {
        apps: AppsConfig {
            interval_secs: matches.get_one::<f64>("interval").copied(),
            max_processes: matches.get_one::<usize>("max-processes").copied(),
            duration_secs: matches.get_one::<u64>("duration").copied(),
            app_list: matches.get_one::<PathBuf>("app-list").cloned(),
            compositor: matches.get_one::<String>("compositor").cloned(),
            supervise: matches.get_flag("no-supervise").then_some(false),
        },
        ..Default::default()
    }
}

pub(crate) fn handle_apps_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    events::log_app_startup("apps");

    let config = load_config(overrides_from(matches))?;
    let apps = apps_ops::resolve_app_list(&config.apps);

    if let Some(path) = matches.get_one::<PathBuf>("save-app-list") {
        save_app_list(path, &apps).inspect_err(|e| eprintln!("Error: {}", e))?;
        println!("Saved {} apps to {}", apps.len(), path.display());
        return Ok(());
    }

    print_banner(&config.apps, &apps);

    let interrupt = install_interrupt_handler()?;
    let summary = apps_ops::run_launch_test(&config.apps, apps, &interrupt, print_tick)?;

    print_summary(&summary);
    events::log_app_shutdown("apps");
    info!(event = "cli.apps_completed", launches = summary.launches);
    Ok(())
}

fn print_banner(config: &AppsConfig, apps: &[treeland_stress_core::AppDescriptor]) {
    println!("Press Ctrl+C to stop the test");
    println!("Launch interval: {} s", config.interval_secs());
    println!("Max processes: {}", config.max_processes());
    match config.duration() {
        Some(duration) => println!("Duration: {} s", duration.as_secs()),
        None => println!("Duration: until interrupted"),
    }
    if config.supervise() {
        println!("Supervising: {}", config.compositor());
    }
    let names: Vec<&str> = apps.iter().map(|app| app.name.as_str()).collect();
    println!("Apps: {}", names.join(", "));
}

fn print_tick(outcome: &TickOutcome) {
    match outcome {
        TickOutcome::Launched {
            name,
            launches,
            running,
            ..
        } => {
            println!("Launched {name} ({launches} launched, {running} running)");
        }
        TickOutcome::LaunchFailed { name, error } => {
            println!("Failed to launch {name}: {error}");
        }
        TickOutcome::Froze(report) => print_freeze(report),
        TickOutcome::Suppressed => {}
    }
}

fn print_freeze(report: &FreezeReport) {
    println!();
    println!(
        "[{}] Compositor '{}' (pid {}) is gone, launches suspended",
        report.detected_at.format("%Y-%m-%d %H:%M:%S"),
        report.compositor,
        report.compositor_pid
    );
    if report.still_tracked.is_empty() {
        println!("No launched apps were running");
    } else {
        println!("Apps still tracked:");
        for (pid, name) in &report.still_tracked {
            println!("  {pid:>8}  {name}");
        }
    }
    println!("Press Ctrl+C to exit; tracked apps will be left running");
}

fn print_summary(summary: &RunSummary) {
    println!();
    println!("Test finished ({})", summary.mode);
    println!("Elapsed: {:.1} s", summary.elapsed.as_secs_f64());
    println!("Launches: {}", summary.launches);
    match summary.average_interval() {
        Some(avg) => println!("Average launch interval: {:.2} s", avg.as_secs_f64()),
        None => println!("Average launch interval: n/a"),
    }
    if summary.cleanup.skipped {
        println!("Cleanup skipped: compositor disappeared");
    } else {
        println!(
            "Cleanup: {} terminated, {} killed, {} failed",
            summary.cleanup.terminated, summary.cleanup.killed, summary.cleanup.failed
        );
    }
}
