//! Options controlling which pipeline steps run.
//!
//! Load order: `<home>/mkindex.toml` → environment variables → defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// File name of the options file, looked up directly under home.
pub const OPTIONS_FILE: &str = "mkindex.toml";

/// Top-level pipeline options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineOptions {
    pub steps: StepToggles,
}

/// Per-step switches for the steps that are optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StepToggles {
    /// Create the object-directory skeleton before cross-referencing.
    /// Off by default; the finder and crossref helpers do not need it.
    pub objdir_mkdirs: bool,
}

/// Environment switch that overrides `[steps] objdir_mkdirs`.
pub const OBJDIR_MKDIRS_ENV: &str = "MKINDEX_OBJDIR_MKDIRS";

/// Read a step switch such as `1`, `true`, `no` or `off`. Unrecognized
/// values leave the file setting alone.
fn parse_switch(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl PipelineOptions {
    /// Load options from `mkindex.toml` under home, with env var overrides.
    /// Falls back to defaults if no options file exists.
    pub fn load(home: &Path) -> Result<Self> {
        let path = home.join(OPTIONS_FILE);

        let mut options = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("malformed options file {}", path.display()))?
        } else {
            Self::default()
        };

        match std::env::var(OBJDIR_MKDIRS_ENV).ok().as_deref().map(parse_switch) {
            Some(Some(on)) => options.steps.objdir_mkdirs = on,
            Some(None) => tracing::warn!(var = OBJDIR_MKDIRS_ENV, "ignoring unrecognized value"),
            None => {}
        }

        tracing::debug!(objdir_mkdirs = options.steps.objdir_mkdirs, "pipeline options");
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = PipelineOptions::default();
        assert!(!options.steps.objdir_mkdirs);
    }

    #[test]
    fn test_options_from_toml() {
        let toml_str = r#"
[steps]
objdir_mkdirs = true
"#;
        let options: PipelineOptions = toml::from_str(toml_str).unwrap();
        assert!(options.steps.objdir_mkdirs);
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let options: PipelineOptions = toml::from_str("").unwrap();
        assert!(!options.steps.objdir_mkdirs);
    }

    #[test]
    fn test_parse_switch() {
        for on in ["1", "true", "TRUE", " yes ", "on"] {
            assert_eq!(parse_switch(on), Some(true), "{on:?}");
        }
        for off in ["0", "false", "No", "off"] {
            assert_eq!(parse_switch(off), Some(false), "{off:?}");
        }
        assert_eq!(parse_switch(""), None);
        assert_eq!(parse_switch("maybe"), None);
    }

    #[test]
    fn test_malformed_toml_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join(OPTIONS_FILE), "[steps\nobjdir_mkdirs = ").unwrap();
        let err = PipelineOptions::load(tmp.path()).unwrap_err();
        assert!(format!("{err:#}").contains("malformed options file"));
    }
}
