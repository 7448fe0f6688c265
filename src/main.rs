use anyhow::Result;
use clap::{Arg, Command};

use memwatch::commands;

fn build_cli() -> Command {
    Command::new("memwatch")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Memory telemetry, pressure classification, and reclaim nudging")
        .subcommand(
            Command::new("info")
                .about("Show a memory snapshot")
                .arg(
                    Arg::new("detailed")
                        .short('d')
                        .long("detailed")
                        .help("Include per-category process and system memory tables")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print the snapshot as JSON")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("pressure")
                .about("Classify current memory pressure")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print the level as JSON")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
        .subcommand(Command::new("reclaim").about("Issue reclamation hints now"))
        .subcommand(
            Command::new("watch")
                .about("Monitor memory on an interval and stream status events")
                .arg(
                    Arg::new("interval")
                        .short('i')
                        .long("interval")
                        .value_name("MS")
                        .help("Sampling interval in milliseconds")
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Stream events as JSON lines")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("bridge").about("Serve JSON method calls over stdin/stdout"),
        )
        .subcommand(
            Command::new("completions")
                .about("Generate shell completions")
                .arg(
                    Arg::new("shell")
                        .help("Shell to generate completions for")
                        .required(true)
                        .index(1),
                ),
        )
        .subcommand(Command::new("version").about("Shows version information"))
}

fn main() -> Result<()> {
    memwatch::init_logging();

    let matches = build_cli().get_matches();

    match matches.subcommand() {
        Some(("info", sub_matches)) => commands::info::execute(sub_matches),
        Some(("pressure", sub_matches)) => commands::pressure::execute(sub_matches),
        Some(("reclaim", _)) => commands::reclaim::execute(),
        Some(("watch", sub_matches)) => commands::watch::execute(sub_matches),
        Some(("bridge", _)) => commands::bridge::execute(),
        Some(("completions", sub_matches)) => {
            commands::completions::execute(sub_matches, &mut build_cli())
        }
        Some(("version", _)) => commands::version::execute(),
        _ => {
            println!("Use 'memwatch --help' for more information.");
            Ok(())
        }
    }
}
