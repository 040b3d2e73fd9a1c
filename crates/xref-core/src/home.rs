//! Locate the orchestrator's home: the repository that ships the `scripts/` helpers.

use std::path::{Path, PathBuf};

/// Environment variable that pins the home directory explicitly.
pub const HOME_ENV: &str = "MKINDEX_HOME";

/// Directory under home holding the helper scripts.
pub const SCRIPTS_DIR: &str = "scripts";

/// A helper that must exist for an ancestor directory to count as home.
const MARKER_SCRIPT: &str = "crossref.sh";

#[derive(Debug, thiserror::Error)]
pub enum HomeError {
    #[error("MKINDEX_HOME points at {}, which is not a usable directory: {source}", .path.display())]
    InvalidOverride {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot locate the running executable: {0}")]
    CurrentExe(#[source] std::io::Error),
    #[error("no ancestor of {} contains scripts/crossref.sh; set MKINDEX_HOME", .exe.display())]
    NotFound { exe: PathBuf },
}

/// Canonical, absolute home directory. Resolved once per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Home {
    root: PathBuf,
}

impl Home {
    /// Resolve home from `MKINDEX_HOME`, falling back to the running executable.
    ///
    /// Neither source depends on the caller's working directory.
    pub fn resolve() -> Result<Self, HomeError> {
        if let Some(dir) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
            return Self::from_override(Path::new(&dir));
        }
        let exe = std::env::current_exe().map_err(HomeError::CurrentExe)?;
        Self::from_executable(&exe)
    }

    /// Use an explicit `MKINDEX_HOME` value. Relative values are rejected,
    /// since they would be read against the caller's working directory.
    pub fn from_override(dir: &Path) -> Result<Self, HomeError> {
        if dir.is_relative() {
            return Err(HomeError::InvalidOverride {
                path: dir.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "path must be absolute",
                ),
            });
        }
        Self::from_dir(dir)
    }

    /// Use `dir` as home after canonicalizing it.
    pub fn from_dir(dir: &Path) -> Result<Self, HomeError> {
        let root = dir
            .canonicalize()
            .and_then(|p| {
                if p.is_dir() {
                    Ok(p)
                } else {
                    Err(std::io::Error::new(
                        std::io::ErrorKind::NotADirectory,
                        "not a directory",
                    ))
                }
            })
            .map_err(|source| HomeError::InvalidOverride {
                path: dir.to_path_buf(),
                source,
            })?;
        tracing::debug!(home = %root.display(), "home pinned by {}", HOME_ENV);
        Ok(Self { root })
    }

    /// Walk up from the executable until a directory containing
    /// `scripts/crossref.sh` is found.
    pub fn from_executable(exe: &Path) -> Result<Self, HomeError> {
        let exe = exe.canonicalize().map_err(HomeError::CurrentExe)?;
        let root = exe
            .ancestors()
            .skip(1)
            .find(|dir| dir.join(SCRIPTS_DIR).join(MARKER_SCRIPT).is_file())
            .map(Path::to_path_buf)
            .ok_or_else(|| HomeError::NotFound { exe: exe.clone() })?;
        tracing::debug!(home = %root.display(), exe = %exe.display(), "home resolved");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<home>/scripts`, also exported to helpers as their module search path.
    pub fn scripts_dir(&self) -> PathBuf {
        self.root.join(SCRIPTS_DIR)
    }

    /// Full path of a helper script by file name.
    pub fn script(&self, name: &str) -> PathBuf {
        self.scripts_dir().join(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_home(tmp: &Path) -> PathBuf {
        let home = tmp.join("checkout");
        std::fs::create_dir_all(home.join("scripts")).unwrap();
        std::fs::write(home.join("scripts").join("crossref.sh"), "#!/bin/sh\n").unwrap();
        home
    }

    #[test]
    fn test_from_executable_walks_up_to_scripts() {
        let tmp = tempfile::tempdir().unwrap();
        let home = make_home(tmp.path());
        let bin_dir = home.join("target").join("release");
        std::fs::create_dir_all(&bin_dir).unwrap();
        let exe = bin_dir.join("mkindex");
        std::fs::write(&exe, "").unwrap();

        let resolved = Home::from_executable(&exe).unwrap();
        assert_eq!(resolved.root(), home.canonicalize().unwrap());
        assert_eq!(
            resolved.scripts_dir(),
            home.canonicalize().unwrap().join("scripts")
        );
    }

    #[test]
    fn test_from_executable_without_marker_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let exe = tmp.path().join("mkindex");
        std::fs::write(&exe, "").unwrap();
        let err = Home::from_executable(&exe).unwrap_err();
        assert!(matches!(err, HomeError::NotFound { .. }), "got {err:?}");
    }

    #[test]
    fn test_from_dir_rejects_file() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("plain");
        std::fs::write(&file, "").unwrap();
        assert!(matches!(
            Home::from_dir(&file),
            Err(HomeError::InvalidOverride { .. })
        ));
    }

    #[test]
    fn test_override_must_be_absolute() {
        let tmp = tempfile::tempdir().unwrap();
        let home = make_home(tmp.path());

        let err = Home::from_override(Path::new("checkout")).unwrap_err();
        assert!(matches!(err, HomeError::InvalidOverride { .. }), "got {err:?}");
        assert!(err.to_string().contains("must be absolute"));

        let pinned = Home::from_override(&home).unwrap();
        assert_eq!(pinned.root(), home.canonicalize().unwrap());
    }

    #[test]
    fn test_script_path() {
        let tmp = tempfile::tempdir().unwrap();
        let home = Home::from_dir(&make_home(tmp.path())).unwrap();
        assert!(home.script("crossref.sh").is_file());
        assert!(home.script("crossref.sh").is_absolute());
    }
}
