use colored::*;
use humansize::{format_size, BINARY};

use crate::core::memory_monitor::{MemorySnapshot, PressureLevel};

/// Pressure level with its ordinal, color-coded by severity.
pub fn format_level(level: PressureLevel) -> ColoredString {
    let text = format!("{} ({})", level.label(), level.as_u8());
    match level {
        PressureLevel::Normal => text.green(),
        PressureLevel::Medium => text.yellow(),
        PressureLevel::High => text.bright_red(),
        PressureLevel::Critical => text.red().bold(),
    }
}

pub fn print_pressure(level: PressureLevel) {
    println!("Memory pressure: {}", format_level(level));
}

pub fn print_snapshot(snapshot: &MemorySnapshot) {
    println!("\n{}", "MEMORY SNAPSHOT".bold().bright_cyan());
    println!("{}", "=".repeat(60));

    print_section_header("Host");
    println!("  Total: {}", format_size(snapshot.total_mem, BINARY));
    println!("  Available: {}", format_size(snapshot.avail_mem, BINARY));
    println!(
        "  Low-memory threshold: {}",
        format_size(snapshot.threshold, BINARY)
    );
    let low = if snapshot.low_memory {
        "yes".red().bold()
    } else {
        "no".green()
    };
    println!("  Low memory: {}", low);

    print_section_header("App heap");
    if snapshot.app_max_memory > 0 {
        println!("  Ceiling: {}", format_size(snapshot.app_max_memory, BINARY));
    } else {
        println!("  Ceiling: {}", "unresolved".dimmed());
    }
    println!(
        "  Committed: {}",
        format_size(snapshot.app_total_memory, BINARY)
    );
    println!("  Used: {}", format_size(snapshot.app_used_memory, BINARY));
    println!("  Free: {}", format_size(snapshot.app_free_memory, BINARY));

    if !snapshot.process_usage.is_empty() {
        print_section_header("Process breakdown");
        for (category, usage) in &snapshot.process_usage {
            println!(
                "  {:<8} pss {:>10}  private dirty {:>10}",
                category,
                format_size(usage.pss, BINARY),
                format_size(usage.private_dirty, BINARY)
            );
        }
    }

    if !snapshot.system_memory.is_empty() {
        print_section_header("System counters");
        for (name, bytes) in &snapshot.system_memory {
            println!("  {:<24} {}", name, format_size(*bytes, BINARY));
        }
    }

    println!();
}

fn print_section_header(title: &str) {
    println!("\n{}", title.bold().green());
    println!("{}", "-".repeat(title.len()));
}
