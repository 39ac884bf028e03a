//! Write a default configuration file

use std::path::Path;

use anyhow::{bail, Result};
use chatpad_driver::ChatpadConfig;

pub fn write(config: &ChatpadConfig, path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    config.save(path)?;
    println!("Wrote {}", path.display());
    Ok(())
}
