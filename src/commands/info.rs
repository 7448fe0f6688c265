//! Memory snapshot command handler.

use anyhow::{Context, Result};
use clap::ArgMatches;

use crate::core::config::Config;
use crate::core::memory_monitor::MetricsCollector;
use crate::platform::detect_heap_provider;
use crate::ui;

/// Execute the info command
pub fn execute(matches: &ArgMatches) -> Result<()> {
    let detailed = matches.get_flag("detailed");
    let json = matches.get_flag("json");

    let config = Config::load()?;
    let profile = config.host_profile();
    let heap = detect_heap_provider(&profile).context("Failed to initialize heap source")?;
    let mut collector = MetricsCollector::new(profile, heap);

    let snapshot = if detailed {
        collector.sample_detailed()
    } else {
        collector.sample()
    }
    .context("Failed to sample memory")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        ui::print_snapshot(&snapshot);
    }

    Ok(())
}
