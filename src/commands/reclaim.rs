//! Reclamation command handler.

use anyhow::{Context, Result};
use colored::*;

use crate::core::memory_monitor::PressureResponder;

/// Execute the reclaim command: the same double-hint the monitor issues
/// under high pressure.
pub fn execute() -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("Failed to build async runtime")?;

    let responder = PressureResponder::new();
    runtime.block_on(responder.request_reclaim());

    println!("{}", "Reclamation hints issued.".green());
    Ok(())
}
