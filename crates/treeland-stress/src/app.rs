use std::path::PathBuf;

use clap::{Arg, ArgAction, Command, value_parser};

pub fn build_cli() -> Command {
    Command::new("treeland-stress")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Stress tools for the Treeland Wayland compositor")
        .long_about("treeland-stress exercises a running compositor: 'apps' churns GUI application processes to test process lifecycle handling, 'display' drives wlr-randr through every mode, transform and scale of each output.")
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("apps")
                .about("Randomly launch and terminate applications")
                .long_about(
                    "Launches a random app from the app list at a fixed interval, keeping at most\n\
                    --max-processes of them alive by terminating the oldest one.\n\n\
                    Unless --no-supervise is given, the compositor process is watched: once it\n\
                    disappears no further app is launched and running apps are left untouched\n\
                    until Ctrl+C is pressed."
                )
                .arg(
                    Arg::new("interval")
                        .long("interval")
                        .short('i')
                        .help("Seconds between launches, must be positive (default: 0.1)")
                        .value_parser(value_parser!(f64))
                )
                .arg(
                    Arg::new("max-processes")
                        .long("max-processes")
                        .short('m')
                        .help("Maximum number of apps running at once, at least 1 (default: 10)")
                        .value_parser(value_parser!(usize))
                )
                .arg(
                    Arg::new("duration")
                        .long("duration")
                        .short('d')
                        .help("Test duration in seconds, 0 runs until interrupted (default: 0)")
                        .value_parser(value_parser!(u64))
                )
                .arg(
                    Arg::new("app-list")
                        .long("app-list")
                        .help("JSON file with the apps to launch (name, command, category)")
                        .value_parser(value_parser!(PathBuf))
                )
                .arg(
                    Arg::new("compositor")
                        .long("compositor")
                        .help("Process name of the compositor to supervise (default: treeland)")
                )
                .arg(
                    Arg::new("no-supervise")
                        .long("no-supervise")
                        .help("Keep launching even if the compositor process disappears")
                        .action(ArgAction::SetTrue)
                )
                .arg(
                    Arg::new("save-app-list")
                        .long("save-app-list")
                        .help("Write the effective app list to this JSON file and exit")
                        .value_parser(value_parser!(PathBuf))
                )
        )
        .subcommand(
            Command::new("display")
                .about("Sweep outputs through every mode, transform and scale")
                .arg(
                    Arg::new("interval")
                        .long("interval")
                        .short('i')
                        .help("Seconds to wait between configuration changes, must be positive (default: 5.0)")
                        .value_parser(value_parser!(f64))
                )
                .arg(
                    Arg::new("debug")
                        .long("debug")
                        .help("Print the raw wlr-randr output and parsed outputs on every query")
                        .action(ArgAction::SetTrue)
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Only test this output (e.g. HDMI-A-1)")
                )
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_build() {
        build_cli().debug_assert();
    }

    #[test]
    fn test_apps_args() {
        let matches = build_cli()
            .try_get_matches_from(vec![
                "treeland-stress",
                "apps",
                "--interval",
                "0.5",
                "--max-processes",
                "3",
                "--no-supervise",
            ])
            .unwrap();
        let sub = matches.subcommand_matches("apps").unwrap();
        assert_eq!(sub.get_one::<f64>("interval"), Some(&0.5));
        assert_eq!(sub.get_one::<usize>("max-processes"), Some(&3));
        assert_eq!(sub.get_one::<u64>("duration"), None);
        assert!(sub.get_flag("no-supervise"));
    }

    #[test]
    fn test_apps_rejects_non_numeric_interval() {
        let result =
            build_cli().try_get_matches_from(vec!["treeland-stress", "apps", "--interval", "fast"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_display_args() {
        let matches = build_cli()
            .try_get_matches_from(vec![
                "treeland-stress",
                "-v",
                "display",
                "--debug",
                "--output",
                "DP-1",
            ])
            .unwrap();
        assert!(matches.get_flag("verbose"));
        let sub = matches.subcommand_matches("display").unwrap();
        assert!(sub.get_flag("debug"));
        assert_eq!(sub.get_one::<String>("output").map(String::as_str), Some("DP-1"));
    }

    #[test]
    fn test_interval_help_states_positive() {
        let mut cli = build_cli();
        let apps = cli.find_subcommand_mut("apps").unwrap();
        let help = apps.render_help().to_string();
        assert!(help.contains("must be positive"), "got: {}", help);

        let display = cli.find_subcommand_mut("display").unwrap();
        let help = display.render_help().to_string();
        assert!(help.contains("must be positive"), "got: {}", help);
    }

    #[test]
    fn test_subcommand_required() {
        assert!(build_cli().try_get_matches_from(vec!["treeland-stress"]).is_err());
    }
}
