use std::io::Write;

use anyhow::Result;

pub fn run_version_command(out: &mut dyn Write) -> Result<()> {
    writeln!(out, "{}", env!("CARGO_PKG_VERSION"))?;
    Ok(())
}
