//! Loading `vessel.toml`.

use std::path::{Path, PathBuf};

use miette::{IntoDiagnostic, WrapErr};
use serde::Deserialize;
use tracing::debug;
use vs_fiction::{MenuConfig, RuntimeConfig};
use vs_script::ValidatorConfig;

/// Default configuration file, read from the working directory if present.
pub const DEFAULT_CONFIG: &str = "vessel.toml";

/// All configuration sections.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VesselConfig {
    /// `[validator]`
    pub validator: ValidatorConfig,
    /// `[runtime]`
    pub runtime: RuntimeConfig,
    /// `[menu]`
    pub menu: MenuConfig,
}

impl VesselConfig {
    /// Load an explicit file, or `vessel.toml` if it exists, or defaults.
    pub fn load(explicit: Option<&Path>) -> miette::Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG);
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };

        let text = std::fs::read_to_string(&path)
            .into_diagnostic()
            .wrap_err_with(|| format!("cannot read {}", path.display()))?;
        let config = toml::from_str(&text)
            .into_diagnostic()
            .wrap_err_with(|| format!("invalid configuration in {}", path.display()))?;
        debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }
}
