//! The explicit environment handed to every helper process.
//!
//! Nothing here touches the orchestrator's own process environment: the
//! variables are collected into a [`StepEnv`] and applied per child.

use crate::args::IndexArgs;
use crate::home::Home;
use crate::tree::TreeConfig;
use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::path::Path;

pub const XREF_HOME: &str = "XREF_HOME";
pub const CONFIG_REPO: &str = "CONFIG_REPO";
pub const CONFIG_FILE: &str = "CONFIG_FILE";
pub const TREE_NAME: &str = "TREE_NAME";
pub const INDEX_ROOT: &str = "INDEX_ROOT";
pub const FILES_ROOT: &str = "FILES_ROOT";
pub const OBJDIR: &str = "OBJDIR";
pub const GIT_ROOT: &str = "GIT_ROOT";
pub const BLAME_ROOT: &str = "BLAME_ROOT";
pub const HG_ROOT: &str = "HG_ROOT";
pub const CODESEARCH_PATH: &str = "CODESEARCH_PATH";
pub const CODESEARCH_PORT: &str = "CODESEARCH_PORT";
/// Search path the Python helpers use to import their shared modules.
pub const SEARCH_PATH: &str = "PYTHONPATH";

/// Ordered variable assignments applied on top of the inherited environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepEnv {
    vars: Vec<(&'static str, OsString)>,
}

impl StepEnv {
    /// Variables known before the config file is read. These are also the
    /// variables config values may reference.
    pub fn base(home: &Home, args: &IndexArgs, config_repo: &Path) -> Self {
        let mut env = Self::default();
        env.set(XREF_HOME, home.root());
        env.set(CONFIG_REPO, config_repo);
        env.set(CONFIG_FILE, args.config_file());
        env.set(TREE_NAME, &args.tree_name);
        env
    }

    /// Add the tree's settings and the helper search path.
    ///
    /// Optional roots are exported as empty strings so helpers running with
    /// unset-variable checks can still test them.
    #[must_use]
    pub fn with_tree(mut self, tree: &TreeConfig, home: &Home) -> Self {
        let or_empty = |p: Option<&Path>| p.map_or_else(OsString::new, |p| p.as_os_str().into());

        self.set(INDEX_ROOT, &tree.index_path);
        self.set(FILES_ROOT, &tree.files_path);
        self.set(OBJDIR, &tree.objdir_path);
        self.set(GIT_ROOT, or_empty(tree.git_path.as_deref()));
        self.set(BLAME_ROOT, or_empty(tree.git_blame_path.as_deref()));
        self.set(HG_ROOT, tree.hg_root.as_deref().unwrap_or_default());
        if let Some(path) = &tree.codesearch_path {
            self.set(CODESEARCH_PATH, path);
        }
        if let Some(port) = tree.codesearch_port {
            self.set(CODESEARCH_PORT, port.to_string());
        }
        self.set(SEARCH_PATH, home.scripts_dir());
        self
    }

    /// Assign `key`, replacing an earlier assignment in place.
    pub fn set(&mut self, key: &'static str, value: impl AsRef<OsStr>) {
        let value = value.as_ref().to_os_string();
        match self.vars.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.vars.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&OsStr> {
        self.vars
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_os_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &OsStr)> + '_ {
        self.vars.iter().map(|(k, v)| (*k, v.as_os_str()))
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// UTF-8 variables usable for `$VAR` expansion in the config file.
    /// Non-UTF-8 values are left out and fall through to the process environment.
    pub fn expansion_vars(&self) -> BTreeMap<String, String> {
        self.vars
            .iter()
            .filter_map(|(k, v)| v.to_str().map(|v| ((*k).to_string(), v.to_string())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn fixture() -> (tempfile::TempDir, Home, IndexArgs) {
        let tmp = tempfile::tempdir().unwrap();
        let home = Home::from_dir(tmp.path()).unwrap();
        let args = IndexArgs::new("/repo", "config.json", "my-tree");
        (tmp, home, args)
    }

    fn tree() -> TreeConfig {
        TreeConfig {
            name: "my-tree".to_string(),
            index_path: PathBuf::from("/idx"),
            files_path: PathBuf::from("/files"),
            objdir_path: PathBuf::from("/objdir"),
            git_path: Some(PathBuf::from("/git")),
            git_blame_path: None,
            hg_root: None,
            codesearch_path: None,
            codesearch_port: Some(8081),
        }
    }

    #[test]
    fn test_base_vars() {
        let (_tmp, home, args) = fixture();
        let env = StepEnv::base(&home, &args, Path::new("/repo"));
        assert_eq!(env.get(XREF_HOME), Some(home.root().as_os_str()));
        assert_eq!(env.get(CONFIG_FILE), Some(OsStr::new("config.json")));
        assert_eq!(env.get(TREE_NAME), Some(OsStr::new("my-tree")));
        assert_eq!(env.get(SEARCH_PATH), None);
    }

    #[test]
    fn test_with_tree_adds_search_path_and_roots() {
        let (_tmp, home, args) = fixture();
        let env = StepEnv::base(&home, &args, Path::new("/repo")).with_tree(&tree(), &home);

        assert_eq!(env.get(SEARCH_PATH), Some(home.scripts_dir().as_os_str()));
        assert_eq!(env.get(OBJDIR), Some(OsStr::new("/objdir")));
        assert_eq!(env.get(GIT_ROOT), Some(OsStr::new("/git")));
        assert_eq!(env.get(BLAME_ROOT), Some(OsStr::new("")));
        assert_eq!(env.get(CODESEARCH_PORT), Some(OsStr::new("8081")));
        assert_eq!(env.get(CODESEARCH_PATH), None);
    }

    #[test]
    fn test_set_replaces_in_place() {
        let mut env = StepEnv::default();
        env.set(TREE_NAME, "a");
        env.set(OBJDIR, "/o");
        env.set(TREE_NAME, "b");
        let keys: Vec<&str> = env.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![TREE_NAME, OBJDIR]);
        assert_eq!(env.get(TREE_NAME), Some(OsStr::new("b")));
    }

    #[test]
    fn test_expansion_vars() {
        let (_tmp, home, args) = fixture();
        let vars = StepEnv::base(&home, &args, Path::new("/repo")).expansion_vars();
        assert_eq!(vars.get(CONFIG_REPO).map(String::as_str), Some("/repo"));
        assert_eq!(vars.len(), 4);
    }
}
