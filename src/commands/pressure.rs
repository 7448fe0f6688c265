//! Pressure classification command handler.

use anyhow::{Context, Result};
use clap::ArgMatches;
use serde_json::json;

use crate::core::config::Config;
use crate::core::memory_monitor::{classify, MetricsCollector};
use crate::platform::detect_heap_provider;
use crate::ui;

/// Execute the pressure command
pub fn execute(matches: &ArgMatches) -> Result<()> {
    let json_output = matches.get_flag("json");

    let config = Config::load()?;
    let profile = config.host_profile();
    let heap = detect_heap_provider(&profile).context("Failed to initialize heap source")?;
    let mut collector = MetricsCollector::new(profile, heap);

    let snapshot = collector.sample().context("Failed to sample memory")?;
    let level = classify(&snapshot, &config.thresholds);

    if json_output {
        println!("{}", json!({ "pressureLevel": level.as_u8() }));
    } else {
        ui::print_pressure(level);
    }

    Ok(())
}
