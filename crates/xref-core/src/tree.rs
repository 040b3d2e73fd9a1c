//! Per-tree settings loaded from the JSON config file.
//!
//! The config file holds a `trees` object keyed by tree name. Only the entry
//! for the requested tree is deserialized; every other key is ignored. String
//! values may reference `$VAR` / `${VAR}`, resolved against the orchestrator's
//! own variables first and the process environment second. A reference that
//! resolves nowhere fails the load.

use serde::Deserialize;
use serde_json::Value;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed JSON in {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{} has no \"trees\" object", .path.display())]
    MissingTrees { path: PathBuf },
    #[error("unknown tree '{tree}' (known trees: {})", .known.join(", "))]
    UnknownTree { tree: String, known: Vec<String> },
    #[error("invalid settings for tree '{tree}': {source}")]
    Invalid {
        tree: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("tree name '{tree}' is not valid UTF-8 and cannot name a tree")]
    TreeNameEncoding { tree: String },
    #[error("tree '{tree}': {key} references undefined variable ${var}")]
    UndefinedVariable {
        tree: String,
        key: &'static str,
        var: String,
    },
}

/// Tree entry exactly as written in the config file.
#[derive(Debug, Deserialize)]
struct RawTree {
    index_path: String,
    files_path: String,
    objdir_path: String,
    #[serde(default)]
    git_path: Option<String>,
    #[serde(default)]
    git_blame_path: Option<String>,
    #[serde(default)]
    hg_root: Option<String>,
    #[serde(default)]
    codesearch_path: Option<String>,
    #[serde(default)]
    codesearch_port: Option<u16>,
}

/// Settings for one tree with all variable references expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeConfig {
    pub name: String,
    /// Where the index for this tree is written.
    pub index_path: PathBuf,
    /// Checked-out source files.
    pub files_path: PathBuf,
    /// Build output scanned by the object-directory finder.
    pub objdir_path: PathBuf,
    pub git_path: Option<PathBuf>,
    pub git_blame_path: Option<PathBuf>,
    /// Upstream Mercurial URL, used only for links.
    pub hg_root: Option<String>,
    pub codesearch_path: Option<PathBuf>,
    pub codesearch_port: Option<u16>,
}

impl TreeConfig {
    /// Load the settings for `tree_name` from `config_file`.
    ///
    /// `vars` are consulted before the process environment when expanding
    /// `$VAR` references.
    pub fn load(
        config_file: &Path,
        tree_name: &str,
        vars: &BTreeMap<String, String>,
    ) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(config_file).map_err(|source| ConfigError::Read {
                path: config_file.to_path_buf(),
                source,
            })?;
        let root: Value =
            serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
                path: config_file.to_path_buf(),
                source,
            })?;
        let config = Self::from_value(&root, config_file, tree_name, vars)?;
        tracing::debug!(
            tree = %config.name,
            index = %config.index_path.display(),
            objdir = %config.objdir_path.display(),
            "tree config loaded"
        );
        Ok(config)
    }

    fn from_value(
        root: &Value,
        config_file: &Path,
        tree_name: &str,
        vars: &BTreeMap<String, String>,
    ) -> Result<Self, ConfigError> {
        let trees = root
            .get("trees")
            .and_then(Value::as_object)
            .ok_or_else(|| ConfigError::MissingTrees {
                path: config_file.to_path_buf(),
            })?;

        let Some(entry) = trees.get(tree_name) else {
            let mut known: Vec<String> = trees.keys().cloned().collect();
            known.sort();
            return Err(ConfigError::UnknownTree {
                tree: tree_name.to_string(),
                known,
            });
        };

        let raw = RawTree::deserialize(entry).map_err(|source| ConfigError::Invalid {
            tree: tree_name.to_string(),
            source,
        })?;

        let expander = Expander {
            tree: tree_name,
            vars,
        };
        let path = |key, value: &str| expander.expand(key, value).map(PathBuf::from);
        let opt_path =
            |key, value: Option<&String>| value.map(|v| path(key, v.as_str())).transpose();

        Ok(Self {
            name: tree_name.to_string(),
            index_path: path("index_path", &raw.index_path)?,
            files_path: path("files_path", &raw.files_path)?,
            objdir_path: path("objdir_path", &raw.objdir_path)?,
            git_path: opt_path("git_path", raw.git_path.as_ref())?,
            git_blame_path: opt_path("git_blame_path", raw.git_blame_path.as_ref())?,
            hg_root: raw
                .hg_root
                .as_deref()
                .map(|v| expander.expand("hg_root", v))
                .transpose()?,
            codesearch_path: opt_path("codesearch_path", raw.codesearch_path.as_ref())?,
            codesearch_port: raw.codesearch_port,
        })
    }
}

struct Expander<'a> {
    tree: &'a str,
    vars: &'a BTreeMap<String, String>,
}

impl Expander<'_> {
    fn expand(&self, key: &'static str, value: &str) -> Result<String, ConfigError> {
        shellexpand::env_with_context(value, |name: &str| {
            if let Some(v) = self.vars.get(name) {
                return Ok(Some(Cow::Borrowed(v.as_str())));
            }
            std::env::var(name).map(|v| Some(Cow::Owned(v)))
        })
        .map(Cow::into_owned)
        .map_err(|e| ConfigError::UndefinedVariable {
            tree: self.tree.to_string(),
            key,
            var: e.var_name,
        })
    }
}
