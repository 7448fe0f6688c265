//! Host-channel command handler: line-oriented JSON method calls on stdin,
//! results and monitoring events on stdout.

use std::io::BufRead;
use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::json;

use crate::core::config::Config;
use crate::core::memory_monitor::{HostBridge, MethodCall};
use crate::platform::detect_heap_provider;

/// Execute the bridge command
pub fn execute() -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_time()
        .thread_name("memwatch-worker")
        .build()
        .context("Failed to build async runtime")?;

    runtime.block_on(run_bridge())
}

async fn run_bridge() -> Result<()> {
    let config = Config::load()?;
    let profile = config.host_profile();
    let heap = detect_heap_provider(&profile).context("Failed to initialize heap source")?;
    let (bridge, mut events) = HostBridge::with_parts(
        profile,
        heap,
        config.thresholds,
        Duration::from_millis(config.interval_ms),
    );

    // Monitoring events interleave with command results, one JSON object
    // per line.
    let printer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            if let Ok(line) = serde_json::to_string(&event) {
                println!("{line}");
            }
        }
    });

    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("Failed to read command line")?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let call: MethodCall = match serde_json::from_str(trimmed) {
            Ok(call) => call,
            Err(e) => {
                println!(
                    "{}",
                    json!({
                        "error": {
                            "code": "NOT_IMPLEMENTED",
                            "message": format!("unparseable method call: {e}"),
                        }
                    })
                );
                continue;
            }
        };

        match bridge.dispatch(&call).await {
            Ok(result) => {
                println!("{}", json!({ "method": call.method, "result": result }));
            }
            Err(e) => {
                println!(
                    "{}",
                    json!({
                        "method": call.method,
                        "error": { "code": e.code(), "message": e.to_string() },
                    })
                );
            }
        }
    }

    bridge.teardown();
    printer.abort();
    Ok(())
}
