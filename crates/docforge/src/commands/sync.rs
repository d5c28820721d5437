//! Sync command implementation
//!
//! Renders the template from a features file and merges it into the target.

use super::{ApplyOptions, apply};
use crate::features::SiteFeatures;
use crate::template::render_template;
use anyhow::Result;
use std::path::PathBuf;
use tracing::debug;

/// Arguments for the sync command
#[derive(Debug)]
pub struct SyncArgs {
    pub features: PathBuf,
    pub target: PathBuf,
    pub options: ApplyOptions,
}

/// Execute the sync command
pub fn execute(args: SyncArgs) -> Result<bool> {
    let features = SiteFeatures::load(&args.features)?;
    debug!(project = %features.project_name, "rendering template");
    let template = render_template(&features);
    apply(
        &template,
        &args.target,
        &args.options,
        &mut std::io::stdout().lock(),
        &mut std::io::stderr().lock(),
    )
}
