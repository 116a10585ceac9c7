//=============================================
// kwenda/modules/mod.rs
//=============================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Kwenda module resolution and caching
// Objective: Strip `leta` lines from source, resolve module paths against the
//            search roots, and memoize each module's environment by path so
//            its top-level forms run at most once per program
//=============================================

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::environment::Env;

/// Extension appended to import paths written without one.
pub const MODULE_EXTENSION: &str = "swh";

#[derive(Debug, Error)]
pub enum ModuleError {
    #[error("module '{name}' could not be located (searched: {})", render_paths(.searched))]
    NotFound { name: String, searched: Vec<PathBuf> },
    #[error("failed reading module '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cyclic module import detected for '{module}'")]
    Cyclic { module: String },
}

fn render_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

//=============================================
//            Section 1: Import Preprocessing
//=============================================

/// Path of a line shaped exactly like `leta "<path>"`, optionally followed by a comment.
fn import_line(line: &str) -> Option<&str> {
    let rest = line.trim().strip_prefix("leta")?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let rest = rest.trim_start().strip_prefix('"')?;
    let (path, tail) = rest.split_once('"')?;
    let tail = tail.trim();
    (tail.is_empty() || tail.starts_with('#')).then_some(path)
}

//Function: preprocess_imports
//Purpose: Remove import lines from source and collect their paths in order
//Inputs: source: &str
//Returns: (String, Vec<String>) with line numbering preserved
pub fn preprocess_imports(source: &str) -> (String, Vec<String>) {
    let mut imports = Vec::new();
    let mut stripped = String::with_capacity(source.len());
    for (index, line) in source.split('\n').enumerate() {
        if index > 0 {
            stripped.push('\n');
        }
        match import_line(line) {
            Some(path) => imports.push(path.to_string()),
            None => stripped.push_str(line),
        }
    }
    (stripped, imports)
}

/// Namespace a module is bound under: its file stem.
pub fn module_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

//=============================================
//            Section 2: Module Loader & Cache
//=============================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ModuleStatus {
    Initializing,
    Ready,
}

#[derive(Debug)]
struct ModuleCacheEntry {
    status: ModuleStatus,
    env: Option<Env>,
}

/// A module's source, read and preprocessed.
#[derive(Debug, Clone)]
pub struct ModuleSource {
    pub base_dir: PathBuf,
    pub source: String,
    pub imports: Vec<String>,
}

/// Owns the search roots and the per-run cache of loaded modules.
#[derive(Debug, Default)]
pub struct ModuleLoader {
    search_paths: Vec<PathBuf>,
    cache: HashMap<PathBuf, ModuleCacheEntry>,
}

impl ModuleLoader {
    pub fn new(search_paths: Vec<PathBuf>) -> Self {
        Self {
            search_paths,
            cache: HashMap::new(),
        }
    }

    pub fn add_search_path(&mut self, path: impl Into<PathBuf>) {
        self.search_paths.push(path.into());
    }

    //Function: resolve
    //Purpose: Locate a module file: importer's directory, search roots, then cwd
    //Inputs: module_path: &str, base_dir: Option<&Path>
    //Returns: Result<PathBuf, ModuleError> (canonical when possible)
    pub fn resolve(&self, module_path: &str, base_dir: Option<&Path>) -> Result<PathBuf, ModuleError> {
        let mut relative = PathBuf::from(module_path);
        if relative.extension().is_none() {
            relative.set_extension(MODULE_EXTENSION);
        }
        if relative.is_absolute() {
            return if relative.is_file() {
                Ok(canonical(&relative))
            } else {
                Err(ModuleError::NotFound {
                    name: module_path.to_string(),
                    searched: vec![relative],
                })
            };
        }

        let mut roots: Vec<PathBuf> = base_dir.map(Path::to_path_buf).into_iter().collect();
        roots.extend(self.search_paths.iter().cloned());
        roots.push(PathBuf::from("."));

        let mut searched = Vec::with_capacity(roots.len());
        for root in roots {
            let candidate = root.join(&relative);
            if candidate.is_file() {
                debug!(module = module_path, path = %candidate.display(), "resolved module");
                return Ok(canonical(&candidate));
            }
            searched.push(candidate);
        }
        Err(ModuleError::NotFound {
            name: module_path.to_string(),
            searched,
        })
    }

    /// Read a resolved module and strip its import lines.
    pub fn read(&self, path: &Path) -> Result<ModuleSource, ModuleError> {
        let text = fs::read_to_string(path).map_err(|source| ModuleError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let (source, imports) = preprocess_imports(&text);
        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Ok(ModuleSource {
            base_dir,
            source,
            imports,
        })
    }

    //Function: begin
    //Purpose: Claim a module for loading, or hand back its cached environment
    //Inputs: &mut self, path: &Path
    //Returns: Ok(Some(env)) when ready, Ok(None) when the caller must load it,
    //         Err(Cyclic) when it is still initialising
    pub fn begin(&mut self, path: &Path) -> Result<Option<Env>, ModuleError> {
        if let Some(entry) = self.cache.get(path) {
            return match entry.status {
                ModuleStatus::Initializing => Err(ModuleError::Cyclic {
                    module: path.display().to_string(),
                }),
                ModuleStatus::Ready => Ok(entry.env.clone()),
            };
        }
        self.cache.insert(
            path.to_path_buf(),
            ModuleCacheEntry {
                status: ModuleStatus::Initializing,
                env: None,
            },
        );
        Ok(None)
    }

    pub fn finish(&mut self, path: &Path, env: Env) {
        self.cache.insert(
            path.to_path_buf(),
            ModuleCacheEntry {
                status: ModuleStatus::Ready,
                env: Some(env),
            },
        );
    }

    /// Forget a module whose load failed so a later import can retry it.
    pub fn abandon(&mut self, path: &Path) {
        self.cache.remove(path);
    }
}

fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::Environment;

    #[test]
    fn strips_import_lines_and_keeps_numbering() {
        let source = "leta \"hesabu\"\n  leta \"lib/maneno.swh\" # maoni\nkazi kuu() { }\nx = \"leta \\\"a\\\"\"";
        let (stripped, imports) = preprocess_imports(source);
        assert_eq!(imports, vec!["hesabu", "lib/maneno.swh"]);
        assert_eq!(stripped.lines().count(), 4);
        assert!(stripped.starts_with("\n\nkazi kuu()"));
    }

    #[test]
    fn ignores_non_import_lines() {
        let (_, imports) = preprocess_imports("letalo \"x\"\nleta x\nleta \"a\" andika(1)");
        assert!(imports.is_empty());
    }

    #[test]
    fn resolves_relative_to_base_then_search_paths() {
        let base = tempfile::tempdir().expect("tempdir");
        let lib = tempfile::tempdir().expect("tempdir");
        fs::write(base.path().join("hesabu.swh"), "namba x = 1").expect("write");
        fs::write(lib.path().join("maneno.swh"), "maneno s = \"a\"").expect("write");

        let loader = ModuleLoader::new(vec![lib.path().to_path_buf()]);
        let found = loader.resolve("hesabu", Some(base.path())).expect("in base dir");
        assert_eq!(module_name(&found), "hesabu");
        let found = loader.resolve("maneno.swh", Some(base.path())).expect("in search path");
        assert_eq!(found, lib.path().join("maneno.swh").canonicalize().expect("canonical"));

        let error = loader.resolve("hakuna", Some(base.path())).expect_err("missing");
        match error {
            ModuleError::NotFound { name, searched } => {
                assert_eq!(name, "hakuna");
                assert_eq!(searched.len(), 3);
                let message = ModuleError::NotFound { name, searched }.to_string();
                assert!(message.contains("hakuna.swh"), "{message}");
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn cache_reports_cycles_and_memoizes() {
        let mut loader = ModuleLoader::default();
        let path = PathBuf::from("/moduli/a.swh");
        assert!(loader.begin(&path).expect("first claim").is_none());
        assert!(matches!(loader.begin(&path), Err(ModuleError::Cyclic { .. })));

        let env = Environment::new_root();
        loader.finish(&path, env.clone());
        let cached = loader.begin(&path).expect("ready").expect("env");
        assert!(std::rc::Rc::ptr_eq(&cached, &env));
    }

    #[test]
    fn abandoned_modules_can_be_retried() {
        let mut loader = ModuleLoader::default();
        let path = PathBuf::from("b.swh");
        loader.begin(&path).expect("claim");
        loader.abandon(&path);
        assert!(loader.begin(&path).expect("claim again").is_none());
    }
}

//=============================================
// End of file
//=============================================
