//! Dispatch configuration.
//!
//! Settings come from a TOML file, with environment variables prefixed by
//! `KDISPATCH` layered on top (`KDISPATCH__MODULE_FORMAT=spirv`).
//!
//! # Example
//!
//! ```ignore
//! use kdispatch_core::config::load_config;
//!
//! let config = load_config("config/kdispatch.toml")?;
//! let launcher = ZeKernelLauncher::new(registry, sink).with_config(config)?;
//! ```

use std::path::Path;

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::geometry::LocalRangeDefaults;

/// Settings consumed by kernel launchers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Group sizes applied when a launch leaves the local range unspecified.
    #[serde(default)]
    pub local_range_defaults: LocalRangeDefaults,

    /// Binary format requested from the code-object registry.
    #[serde(default = "default_module_format")]
    pub module_format: String,

    /// Ordinal of the device launchers expect their queue to target.
    #[serde(default)]
    pub device_index: usize,
}

fn default_module_format() -> String {
    "spirv".to_string()
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            local_range_defaults: LocalRangeDefaults::default(),
            module_format: default_module_format(),
            device_index: 0,
        }
    }
}

impl DispatchConfig {
    /// Parse a TOML document, without environment overrides.
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?;
        let parsed: DispatchConfig = config.try_deserialize()?;
        parsed.validate()?;
        Ok(parsed)
    }

    /// Check internal consistency.
    pub fn validate(&self) -> Result<()> {
        self.local_range_defaults.validate()?;
        if self.module_format.is_empty() {
            return Err(crate::error::DispatchError::Config(
                "module_format must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Load configuration from a TOML file plus `KDISPATCH__*` environment overrides.
pub fn load_config(path: impl AsRef<Path>) -> Result<DispatchConfig> {
    let config = Config::builder()
        .add_source(File::from(path.as_ref()).format(FileFormat::Toml))
        .add_source(
            Environment::with_prefix("KDISPATCH")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let parsed: DispatchConfig = config.try_deserialize()?;
    parsed.validate()?;
    tracing::debug!(
        module_format = %parsed.module_format,
        device_index = parsed.device_index,
        "Loaded dispatch configuration"
    );
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = DispatchConfig::default();
        assert_eq!(config.module_format, "spirv");
        assert_eq!(config.local_range_defaults.one_d, [128]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_toml_overrides_defaults() {
        let config = DispatchConfig::from_toml_str(
            r#"
            module_format = "native"

            [local_range_defaults]
            one_d = [256]
            "#,
        )
        .unwrap();
        assert_eq!(config.module_format, "native");
        assert_eq!(config.local_range_defaults.one_d, [256]);
        assert_eq!(config.local_range_defaults.two_d, [16, 16]);
        assert_eq!(config.local_range_defaults.three_d, [4, 8, 8]);
    }

    #[test]
    fn test_zero_default_rejected() {
        let err = DispatchConfig::from_toml_str(
            r#"
            [local_range_defaults]
            three_d = [4, 0, 8]
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("non-zero"));
    }

    #[test]
    fn test_load_config_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[local_range_defaults]\ntwo_d = [8, 32]").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.local_range_defaults.two_d, [8, 32]);
    }
}
