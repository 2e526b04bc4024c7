//! Loading scripts from disk by the `<chapter>/<name>.script` convention.

use std::path::{Path, PathBuf};

use tracing::{debug, instrument, warn};

use crate::config::ValidatorConfig;
use crate::error::{ScriptError, ScriptResult};
use crate::script::{CheckResult, Script};

/// File extension of script files.
pub const SCRIPT_EXTENSION: &str = "script";

/// A directory of chapter folders holding script files.
#[derive(Debug, Clone)]
pub struct ScriptLibrary {
    root: PathBuf,
    config: ValidatorConfig,
}

impl ScriptLibrary {
    /// A library rooted at `root` with default validation.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            config: ValidatorConfig::default(),
        }
    }

    /// Use a custom validator configuration.
    pub fn with_config(mut self, config: ValidatorConfig) -> Self {
        self.config = config;
        self
    }

    /// The library root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of a script within the library.
    pub fn path_of(&self, chapter: &str, name: &str) -> PathBuf {
        self.root
            .join(chapter)
            .join(format!("{name}.{SCRIPT_EXTENSION}"))
    }

    /// Read, parse, and validate `<chapter>/<name>`.
    #[instrument(skip(self))]
    pub fn check(&self, chapter: &str, name: &str) -> ScriptResult<CheckResult> {
        let path = self.path_of(chapter, name);
        let bytes = read(&path)?;
        crate::check_bytes(&format!("{chapter}/{name}"), &bytes, &self.config)
    }

    /// Load `<chapter>/<name>`, rejecting it if validation finds errors.
    pub fn load(&self, chapter: &str, name: &str) -> ScriptResult<Script> {
        let result = self.check(chapter, name)?;
        let script_name = result.document.name.clone();
        result.into_script().map_err(|report| {
            warn!(script = %script_name, errors = report.errors().count(), "script rejected");
            ScriptError::Rejected {
                name: script_name,
                errors: report.errors().count(),
            }
        })
    }
}

/// Parse and validate one script file; the script is named by its path.
pub fn check_path(path: &Path, config: &ValidatorConfig) -> ScriptResult<CheckResult> {
    let bytes = read(path)?;
    crate::check_bytes(&path.display().to_string(), &bytes, config)
}

/// Every `.script` file under `dir`, recursively, in sorted order.
pub fn collect_scripts(dir: &Path) -> ScriptResult<Vec<PathBuf>> {
    let mut found = Vec::new();
    let mut pending = vec![dir.to_path_buf()];

    while let Some(current) = pending.pop() {
        let entries = std::fs::read_dir(&current).map_err(|source| ScriptError::Io {
            path: current.clone(),
            source,
        })?;
        for entry in entries.filter_map(Result::ok) {
            let path = entry.path();
            if path.is_dir() {
                pending.push(path);
            } else if path.extension().is_some_and(|ext| ext == SCRIPT_EXTENSION) {
                found.push(path);
            }
        }
    }

    // Sort for deterministic ordering
    found.sort();
    debug!(dir = %dir.display(), count = found.len(), "collected scripts");
    Ok(found)
}

fn read(path: &Path) -> ScriptResult<Vec<u8>> {
    std::fs::read(path).map_err(|source| ScriptError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn library_with(files: &[(&str, &str)]) -> (TempDir, ScriptLibrary) {
        let dir = TempDir::new().unwrap();
        for (rel, content) in files {
            let path = dir.path().join(rel);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, content).unwrap();
        }
        let library = ScriptLibrary::new(dir.path());
        (dir, library)
    }

    #[test]
    fn load_by_chapter_and_name() {
        let (_dir, library) = library_with(&[("chapter1/cabin.script", "Hello.\n")]);
        let script = library.load("chapter1", "cabin").unwrap();
        assert_eq!(script.name(), "chapter1/cabin");
        assert_eq!(script.len(), 1);
    }

    #[test]
    fn missing_file_is_io_error() {
        let (_dir, library) = library_with(&[]);
        assert!(matches!(
            library.load("chapter1", "cabin"),
            Err(ScriptError::Io { .. })
        ));
    }

    #[test]
    fn invalid_script_is_rejected() {
        let (_dir, library) = library_with(&[("chapter1/cabin.script", "pause\njumpto x\n")]);
        match library.load("chapter1", "cabin") {
            Err(ScriptError::Rejected { name, errors }) => {
                assert_eq!(name, "chapter1/cabin");
                assert_eq!(errors, 2);
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn non_utf8_is_encoding_error() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("c")).unwrap();
        std::fs::write(dir.path().join("c/bad.script"), [0xff, 0xfe, b'\n']).unwrap();
        let library = ScriptLibrary::new(dir.path());
        assert!(matches!(
            library.check("c", "bad"),
            Err(ScriptError::Encoding { .. })
        ));
    }

    #[test]
    fn collect_recurses_and_sorts() {
        let (dir, _) = library_with(&[
            ("b/two.script", ""),
            ("a/one.script", ""),
            ("a/notes.txt", ""),
        ]);
        let found = collect_scripts(dir.path()).unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            names,
            vec![PathBuf::from("a/one.script"), PathBuf::from("b/two.script")]
        );
    }
}
