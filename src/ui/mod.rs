pub mod snapshot_formatters;

pub use snapshot_formatters::{format_level, print_pressure, print_snapshot};
