//! Discovery of the per-module documents in a win32json checkout.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::CatalogError;
use crate::model::ApiModule;

/// Branch of the metadata repository the catalog is pinned to.
pub const DEFAULT_BRANCH: &str = "10.0.19041.202-preview";

/// Commit of the metadata repository the catalog is pinned to.
pub const DEFAULT_SHA: &str = "7164f4ce9fe17b7c5da3473eed26886753ce1173";

/// Where the metadata repository is cloned from.
pub const DEFAULT_REMOTE: &str = "https://github.com/marlersoft/win32json";

/// Default checkout location, relative to the working directory.
pub const DEFAULT_SOURCE_DIR: &str = "win32json";

/// Directory inside the checkout holding one document per module.
pub const API_SUBDIR: &str = "api";

/// Suffix every module document carries.
pub const MODULE_SUFFIX: &str = ".json";

/// Local branch name suggested when checking out the pinned commit.
const CHECKOUT_BRANCH: &str = "for_win32_transform";

/// Where the catalog lives and which revision it should be.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogConfig {
    /// Root of the metadata checkout.
    pub source: PathBuf,
    /// Branch to clone.
    pub branch: String,
    /// Commit to check out.
    pub sha: String,
    /// Repository URL.
    pub remote: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from(DEFAULT_SOURCE_DIR),
            branch: DEFAULT_BRANCH.to_string(),
            sha: DEFAULT_SHA.to_string(),
            remote: DEFAULT_REMOTE.to_string(),
        }
    }
}

impl CatalogConfig {
    /// Config for a checkout at `source` with the pinned revision.
    pub fn with_source(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            ..Self::default()
        }
    }

    /// Directory holding the module documents.
    pub fn api_dir(&self) -> PathBuf {
        self.source.join(API_SUBDIR)
    }

    /// Instructions for obtaining the checkout at the pinned revision.
    pub fn remediation(&self) -> String {
        let source = self.source.display();
        format!(
            "Clone it with:\n  git clone {remote} {source} -b {branch} && git -C {source} checkout {sha} -b {CHECKOUT_BRANCH}",
            remote = self.remote,
            branch = self.branch,
            sha = self.sha,
        )
    }
}

/// The set of API modules available in a checkout.
#[derive(Debug, Clone)]
pub struct Catalog {
    config: CatalogConfig,
}

impl Catalog {
    /// Create a catalog over the given checkout.
    pub fn new(config: CatalogConfig) -> Self {
        Self { config }
    }

    /// The configuration this catalog was built with.
    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// List module names in byte-wise lexicographic order.
    ///
    /// Every entry of the API directory must be a `<Module>.json` file;
    /// anything else aborts the listing.
    pub fn list_modules(&self) -> Result<Vec<String>, CatalogError> {
        let api_dir = self.config.api_dir();
        for dir in [&self.config.source, &api_dir] {
            if !dir.is_dir() {
                return Err(CatalogError::MissingSourceDirectory {
                    path: dir.clone(),
                    remediation: self.config.remediation(),
                });
            }
        }

        let mut modules = Vec::new();
        for entry in WalkDir::new(&api_dir).min_depth(1).max_depth(1) {
            let entry = entry?;
            let file_name = entry.file_name().to_string_lossy();
            let module = file_name
                .strip_suffix(MODULE_SUFFIX)
                .filter(|stem| !stem.is_empty() && !entry.file_type().is_dir());
            let Some(module) = module else {
                return Err(CatalogError::UnexpectedCatalogEntry {
                    entry: file_name.into_owned(),
                    dir: api_dir,
                    suffix: MODULE_SUFFIX.to_string(),
                });
            };
            modules.push(module.to_string());
        }

        // always sorted so output order never depends on the filesystem
        modules.sort();

        debug!(
            api_dir = %api_dir.display(),
            count = modules.len(),
            "Listed catalog modules."
        );
        Ok(modules)
    }

    /// Path of a module's document.
    pub fn module_path(&self, module: &str) -> PathBuf {
        self.config.api_dir().join(format!("{module}{MODULE_SUFFIX}"))
    }

    /// Read a module's document text.
    pub fn read_module(&self, module: &str) -> Result<String, CatalogError> {
        read_text(&self.module_path(module))
    }

    /// Read and decode a module's document.
    pub fn load_module(&self, module: &str) -> Result<ApiModule, CatalogError> {
        let text = self.read_module(module)?;
        let api = ApiModule::from_json(&text).map_err(|source| CatalogError::Module {
            module: module.to_string(),
            source,
        })?;

        debug!(
            module,
            constants = api.constants.len(),
            types = api.types.len(),
            deferred_functions = api.deferred_functions,
            "Decoded module."
        );
        Ok(api)
    }
}

fn read_text(path: &Path) -> Result<String, CatalogError> {
    fs::read_to_string(path).map_err(|source| CatalogError::Read {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn checkout(files: &[&str]) -> TempDir {
        let dir = TempDir::new().unwrap();
        let api = dir.path().join(API_SUBDIR);
        fs::create_dir_all(&api).unwrap();
        for file in files {
            fs::write(api.join(file), "{\"Constants\":[],\"Types\":[]}").unwrap();
        }
        dir
    }

    #[test]
    fn test_lists_in_byte_order() {
        let dir = checkout(&["B.json", "a.json", "C.json"]);
        let catalog = Catalog::new(CatalogConfig::with_source(dir.path()));

        let first = catalog.list_modules().unwrap();
        assert_eq!(first, vec!["B", "C", "a"]);
        assert_eq!(catalog.list_modules().unwrap(), first);
    }

    #[test]
    fn test_dotted_module_names_keep_their_dots() {
        let dir = checkout(&["UI.Shell.json", "Foundation.json"]);
        let catalog = Catalog::new(CatalogConfig::with_source(dir.path()));
        assert_eq!(
            catalog.list_modules().unwrap(),
            vec!["Foundation", "UI.Shell"]
        );
    }

    #[test]
    fn test_unexpected_entry_is_fatal() {
        let dir = checkout(&["Foundation.json", "README.md"]);
        let catalog = Catalog::new(CatalogConfig::with_source(dir.path()));

        let err = catalog.list_modules().unwrap_err();
        match err {
            CatalogError::UnexpectedCatalogEntry { entry, dir: api, .. } => {
                assert_eq!(entry, "README.md");
                assert_eq!(api, dir.path().join(API_SUBDIR));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_directory_entry_is_fatal() {
        let dir = checkout(&["Foundation.json"]);
        fs::create_dir(dir.path().join(API_SUBDIR).join("nested.json")).unwrap();
        let catalog = Catalog::new(CatalogConfig::with_source(dir.path()));
        assert!(matches!(
            catalog.list_modules(),
            Err(CatalogError::UnexpectedCatalogEntry { .. })
        ));
    }

    #[test]
    fn test_missing_source_names_clone_command() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("win32json");
        let catalog = Catalog::new(CatalogConfig::with_source(&source));

        let err = catalog.list_modules().unwrap_err();
        assert!(matches!(err, CatalogError::MissingSourceDirectory { .. }));
        let message = err.to_string();
        assert!(message.contains("git clone https://github.com/marlersoft/win32json"));
        assert!(message.contains(DEFAULT_SHA));
        assert!(message.contains("-b 10.0.19041.202-preview"));
    }

    #[test]
    fn test_missing_api_dir_is_missing_source() {
        let dir = TempDir::new().unwrap();
        let catalog = Catalog::new(CatalogConfig::with_source(dir.path()));
        assert!(matches!(
            catalog.list_modules(),
            Err(CatalogError::MissingSourceDirectory { path, .. }) if path == dir.path().join(API_SUBDIR)
        ));
    }

    #[test]
    fn test_load_module_reports_module_name() {
        let dir = checkout(&["Good.json"]);
        fs::write(dir.path().join(API_SUBDIR).join("Bad.json"), "{\"Types\":[]}").unwrap();
        let catalog = Catalog::new(CatalogConfig::with_source(dir.path()));

        assert!(catalog.load_module("Good").unwrap().constants.is_empty());
        let err = catalog.load_module("Bad").unwrap_err();
        assert_eq!(
            err.to_string(),
            "module 'Bad': $: missing required field `Constants`"
        );
        assert!(matches!(
            catalog.load_module("Absent"),
            Err(CatalogError::Read { .. })
        ));
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: CatalogConfig = serde_json::from_str(r#"{"source": "vendor/win32json"}"#).unwrap();
        assert_eq!(config.source, PathBuf::from("vendor/win32json"));
        assert_eq!(config.branch, DEFAULT_BRANCH);
        assert_eq!(config.api_dir(), Path::new("vendor/win32json").join("api"));
    }

    #[test]
    fn test_config_rejects_unknown_keys() {
        let err = serde_json::from_str::<CatalogConfig>(r#"{"sorce": "vendor/win32json"}"#)
            .unwrap_err();
        assert!(err.to_string().contains("unknown field `sorce`"));
    }
}
