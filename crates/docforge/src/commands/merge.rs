//! Merge command implementation

use super::{ApplyOptions, apply};
use anyhow::{Context, Result};
use std::io::Read;
use std::path::PathBuf;

/// Arguments for the merge command
#[derive(Debug)]
pub struct MergeArgs {
    /// Template file, or `-` for stdin
    pub template: String,
    pub target: PathBuf,
    pub options: ApplyOptions,
}

/// Execute the merge command
pub fn execute(args: MergeArgs) -> Result<bool> {
    let template = read_template(&args.template)?;
    apply(
        &template,
        &args.target,
        &args.options,
        &mut std::io::stdout().lock(),
        &mut std::io::stderr().lock(),
    )
}

fn read_template(source: &str) -> Result<String> {
    if source == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read the template from stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(source).with_context(|| format!("Failed to read template {source}"))
}
