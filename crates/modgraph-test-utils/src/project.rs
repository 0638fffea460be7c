//! [`TestProject`] builder for module graph test scenarios.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value, json};
use tempfile::TempDir;

/// Core module version written by [`TestProject::new`].
pub const DEFAULT_CORE_VERSION: &str = "3.1.0";

/// A temporary directory holding a project at `project/` and a core module
/// installation at `core/`.
///
/// Both paths are canonicalized, so they compare equal to what the
/// resolver reports on platforms where the temp dir is a symlink.
///
/// # Example
///
/// ```rust,no_run
/// use modgraph_test_utils::TestProject;
///
/// let project = TestProject::new();
/// project.root_package("app", &["theme"]);
/// project.module("node_modules/theme", "theme", "1.0.0", Some("^3.0.0"), &[]);
/// project.assert_file_exists("node_modules/theme/package.json");
/// ```
pub struct TestProject {
    _temp_dir: TempDir,
    root: PathBuf,
    core: PathBuf,
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

impl TestProject {
    /// Create an empty project next to a core module at [`DEFAULT_CORE_VERSION`].
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let base = dunce::canonicalize(temp_dir.path()).unwrap();
        let root = base.join("project");
        let core = base.join("core");
        fs::create_dir_all(&root).unwrap();

        let project = Self {
            _temp_dir: temp_dir,
            root,
            core,
        };
        project.write_core(DEFAULT_CORE_VERSION);
        project
    }

    /// Replace the core module's version.
    pub fn with_core_version(self, version: &str) -> Self {
        self.write_core(version);
        self
    }

    /// The project root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The core module installation directory.
    pub fn core_dir(&self) -> &Path {
        &self.core
    }

    /// Write the root `package.json` with `deps` as dependencies.
    pub fn root_package(&self, name: &str, deps: &[&str]) {
        self.package_json(
            ".",
            json!({
                "name": name,
                "version": "0.1.0",
                "dependencies": dependency_table(deps),
            }),
        );
    }

    /// Write an ordinary package that does not opt into the module ecosystem.
    pub fn package(&self, rel: &str, name: &str, version: &str, deps: &[&str]) {
        self.package_json(
            rel,
            json!({
                "name": name,
                "version": version,
                "dependencies": dependency_table(deps),
            }),
        );
    }

    /// Write an extension module, optionally declaring the core range it needs.
    pub fn module(&self, rel: &str, name: &str, version: &str, needs: Option<&str>, deps: &[&str]) {
        let declaration = match needs {
            Some(needs) => json!({ "needs": needs }),
            None => json!({}),
        };
        self.package_json(
            rel,
            json!({
                "name": name,
                "version": version,
                "dependencies": dependency_table(deps),
                "modgraph": declaration,
            }),
        );
    }

    /// Write `value` as `<rel>/package.json`, relative to the project root.
    pub fn package_json(&self, rel: &str, value: Value) {
        let content = serde_json::to_string_pretty(&value).unwrap();
        self.write_file(&format!("{rel}/package.json"), &content);
    }

    /// Write a file relative to the project root, creating parent directories.
    pub fn write_file(&self, rel: &str, content: &str) {
        let path = self.root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content)
            .unwrap_or_else(|e| panic!("Could not write {}: {e}", path.display()));
    }

    /// Write `modgraph.toml` at the project root, pointing at the core module.
    pub fn write_config(&self, extra: &str) {
        let core = self.core.to_string_lossy().replace('\\', "/");
        self.write_file(
            "modgraph.toml",
            &format!("{extra}\n[core]\npath = \"{core}\"\n"),
        );
    }

    /// Create a directory symlink at `link` pointing to `target`, both relative
    /// to the project root.
    #[cfg(unix)]
    pub fn symlink_dir(&self, target: &str, link: &str) {
        let link = self.root.join(link);
        if let Some(parent) = link.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        std::os::unix::fs::symlink(self.root.join(target), &link).unwrap();
    }

    /// Assert that `path` (relative to the project root) exists.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_file_exists(&self, path: &str) {
        let full_path = self.root.join(path);
        assert!(
            full_path.exists(),
            "Expected file to exist: {}",
            full_path.display()
        );
    }

    fn write_core(&self, version: &str) {
        fs::create_dir_all(&self.core).unwrap();
        let manifest = json!({
            "name": "modgraph",
            "version": version,
        });
        fs::write(
            self.core.join("package.json"),
            serde_json::to_string_pretty(&manifest).unwrap(),
        )
        .unwrap();
    }
}

/// `name` or `name@range` entries to a dependencies table.
fn dependency_table(deps: &[&str]) -> Value {
    let table: Map<String, Value> = deps
        .iter()
        .map(|dep| match dep.rsplit_once('@') {
            Some((name, range)) if !name.is_empty() => (name.to_string(), json!(range)),
            _ => (dep.to_string(), json!("*")),
        })
        .collect();
    Value::Object(table)
}
