use anyhow::Result;

pub fn execute() -> Result<()> {
    println!("memwatch version {}", env!("CARGO_PKG_VERSION"));
    Ok(())
}
