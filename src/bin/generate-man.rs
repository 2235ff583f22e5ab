// Writes the cosboard man page to the directory given as the first argument
// (default: current directory)

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::CommandFactory;
use cosboard::cli::Cli;

fn main() -> Result<()> {
    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("Failed to create directory: {}", out_dir.display()))?;

    let man = clap_mangen::Man::new(Cli::command());
    let mut buffer: Vec<u8> = Vec::new();
    man.render(&mut buffer)
        .context("Failed to render man page")?;

    let path = out_dir.join("cosboard.1");
    std::fs::write(&path, buffer)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}
