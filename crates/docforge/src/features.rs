//! Project features read from a TOML file.
//!
//! ```toml
//! project_name = "demo"
//! site_url = "https://example.github.io/demo/"
//! repo_url = "https://github.com/example/demo"
//! ci_provider = "github"
//! c_source_dirs = ["src/native"]
//! cli_modules = ["demo.cli"]
//! has_typer = true
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Where the project's CI runs; decides the `edit_uri` layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CiProvider {
    Github,
    Gitlab,
}

/// What the template renderer needs to know about a project.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SiteFeatures {
    pub project_name: String,
    #[serde(default)]
    pub site_url: Option<String>,
    #[serde(default)]
    pub repo_url: Option<String>,
    #[serde(default)]
    pub ci_provider: Option<CiProvider>,
    /// Directories with C sources, relative to the project root.
    #[serde(default)]
    pub c_source_dirs: Vec<String>,
    /// Dotted module paths of the project's command-line apps.
    #[serde(default)]
    pub cli_modules: Vec<String>,
    #[serde(default)]
    pub has_typer: bool,
}

impl SiteFeatures {
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read features file {}", path.display()))?;
        Self::from_toml(&text)
            .with_context(|| format!("Invalid features file {}", path.display()))
    }
}
