//! Live monitoring command handler.
//!
//! Runs the bridge's monitoring loop and streams status/error events until
//! interrupted.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::ArgMatches;
use colored::*;
use humansize::{format_size, BINARY};

use crate::core::config::Config;
use crate::core::memory_monitor::{BridgeEvent, HostBridge};
use crate::platform::detect_heap_provider;
use crate::ui;

/// Execute the watch command
pub fn execute(matches: &ArgMatches) -> Result<()> {
    let json = matches.get_flag("json");
    let interval_ms = matches.get_one::<u64>("interval").copied();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_time()
        .thread_name("memwatch-worker")
        .build()
        .context("Failed to build async runtime")?;

    runtime.block_on(run_watch(interval_ms, json))
}

async fn run_watch(interval_ms: Option<u64>, json: bool) -> Result<()> {
    let config = Config::load()?;
    let interval_ms = interval_ms.unwrap_or(config.interval_ms);

    let profile = config.host_profile();
    let heap = detect_heap_provider(&profile).context("Failed to initialize heap source")?;
    let (bridge, mut events) = HostBridge::with_parts(
        profile,
        heap,
        config.thresholds,
        Duration::from_millis(config.interval_ms),
    );

    // Shared cancellation flag, set from the Ctrl+C handler
    let stop_flag = Arc::new(AtomicBool::new(false));
    let stop_flag_clone = stop_flag.clone();
    ctrlc::set_handler(move || {
        stop_flag_clone.store(true, Ordering::Relaxed);
    })
    .map_err(|e| anyhow::anyhow!("Failed to set Ctrl+C handler: {}", e))?;

    bridge
        .start_monitoring(Some(interval_ms))
        .context("Failed to start monitoring")?;

    if !json {
        println!(
            "{}",
            format!("Watching memory every {} ms (Ctrl+C to stop)", interval_ms).bold()
        );
    }

    loop {
        if stop_flag.load(Ordering::Relaxed) {
            break;
        }
        match tokio::time::timeout(Duration::from_millis(200), events.recv()).await {
            Ok(Some(event)) => print_event(&event, json)?,
            Ok(None) => break,
            // Timed out: poll the stop flag again
            Err(_) => {}
        }
    }

    bridge.teardown();
    if !json {
        println!("{}", "Monitoring stopped.".dimmed());
    }
    Ok(())
}

fn print_event(event: &BridgeEvent, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(event)?);
        return Ok(());
    }

    match event {
        BridgeEvent::MemoryStatusUpdate {
            memory_info,
            pressure_level,
            timestamp,
        } => {
            let used = format_size(memory_info.app_used_memory, BINARY);
            let ceiling = if memory_info.app_max_memory > 0 {
                format_size(memory_info.app_max_memory, BINARY)
            } else {
                "?".to_string()
            };
            println!(
                "[{}] {}  app {} / {}  host avail {}",
                format_timestamp(*timestamp),
                ui::format_level(*pressure_level),
                used,
                ceiling,
                format_size(memory_info.avail_mem, BINARY)
            );
        }
        BridgeEvent::MemoryMonitoringError { error, timestamp } => {
            println!(
                "[{}] {} {}",
                format_timestamp(*timestamp),
                "error:".red().bold(),
                error
            );
        }
    }

    Ok(())
}

fn format_timestamp(timestamp_ms: i64) -> String {
    chrono::DateTime::<chrono::Utc>::from_timestamp_millis(timestamp_ms)
        .map(|dt| dt.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| timestamp_ms.to_string())
}
