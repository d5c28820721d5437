//! Render command implementation

use crate::features::SiteFeatures;
use crate::template::render_template;
use anyhow::Result;
use std::io::Write;
use std::path::Path;

/// Execute the render command: print the template for a features file.
pub fn execute(features: &Path) -> Result<bool> {
    let features = SiteFeatures::load(features)?;
    std::io::stdout()
        .lock()
        .write_all(render_template(&features).as_bytes())?;
    Ok(true)
}
