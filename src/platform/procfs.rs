//! Best-effort readers for line-oriented procfs memory tables.
//!
//! Both readers share the same contract: an unreadable file yields an empty
//! map, a malformed line is skipped, and kilobyte-denominated values are
//! normalized to bytes.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Canonical wire names for the system counters worth reporting.
const SYSTEM_COUNTERS: &[(&str, &str)] = &[
    ("MemTotal", "systemTotalMemory"),
    ("MemFree", "systemFreeMemory"),
    ("MemAvailable", "systemAvailableMemory"),
    ("Buffers", "systemBuffers"),
    ("Cached", "systemCached"),
    ("SwapTotal", "systemSwapTotal"),
    ("SwapFree", "systemSwapFree"),
];

/// Aggregated proportional-set-size and private-dirty byte counts for one
/// region category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionUsage {
    pub private_dirty: u64,
    pub pss: u64,
}

/// Parse a `key: value kB` memory table into canonical byte counters.
///
/// Only the counters in [`SYSTEM_COUNTERS`] are kept; everything else in the
/// table is ignored.
pub fn read_memory_table(path: &Path) -> BTreeMap<String, u64> {
    let mut table = BTreeMap::new();
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(_) => return table,
    };

    for line in contents.lines() {
        let (key, rest) = match line.split_once(':') {
            Some(parts) => parts,
            None => continue,
        };
        let canonical = match SYSTEM_COUNTERS.iter().find(|(name, _)| *name == key.trim()) {
            Some((_, canonical)) => *canonical,
            None => continue,
        };
        if let Some(bytes) = parse_kb_value(rest) {
            table.insert(canonical.to_string(), bytes);
        }
    }

    table
}

/// Aggregate per-category PSS and private-dirty counts from a per-region
/// memory map table (smaps format), plus a `total` entry summing them.
pub fn read_region_usage(path: &Path) -> BTreeMap<String, RegionUsage> {
    let mut usage: BTreeMap<String, RegionUsage> = BTreeMap::new();
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(_) => return usage,
    };

    let mut current = "file";
    for line in contents.lines() {
        if let Some(rest) = line.strip_prefix("Pss:") {
            if let Some(bytes) = parse_kb_value(rest) {
                usage.entry(current.to_string()).or_default().pss += bytes;
            }
        } else if let Some(rest) = line.strip_prefix("Private_Dirty:") {
            if let Some(bytes) = parse_kb_value(rest) {
                usage.entry(current.to_string()).or_default().private_dirty += bytes;
            }
        } else if let Some(category) = region_category(line) {
            current = category;
        }
    }

    if !usage.is_empty() {
        let total = usage.values().fold(RegionUsage::default(), |acc, region| {
            RegionUsage {
                private_dirty: acc.private_dirty + region.private_dirty,
                pss: acc.pss + region.pss,
            }
        });
        usage.insert("total".to_string(), total);
    }

    usage
}

/// `123 kB` (possibly padded) to bytes; `None` for anything else.
fn parse_kb_value(raw: &str) -> Option<u64> {
    let value = raw.trim().trim_end_matches("kB").trim();
    value.parse::<u64>().ok().map(|kb| kb * 1024)
}

/// Category of an smaps region header line, `None` for attribute lines.
///
/// Header lines start with a `start-end` hex address range; attribute lines
/// start with a `Key:` token.
fn region_category(line: &str) -> Option<&'static str> {
    let mut parts = line.split_whitespace();
    let first = parts.next()?;
    if first.ends_with(':') || !first.contains('-') {
        return None;
    }
    if !first
        .chars()
        .all(|c| c.is_ascii_hexdigit() || c == '-')
    {
        return None;
    }

    // addr perms offset dev inode [pathname]
    let name = line.split_whitespace().nth(5).unwrap_or("");
    Some(categorize_region(name))
}

fn categorize_region(name: &str) -> &'static str {
    match name {
        "[heap]" => "heap",
        "[stack]" => "stack",
        "" => "anon",
        _ if name.starts_with("[anon") => "anon",
        _ => "file",
    }
}
