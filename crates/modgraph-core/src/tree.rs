//! The pruned module tree used for rendering and access checks.

use modgraph_fs::NormalizedPath;
use serde::Serialize;

use crate::dedupe::ModuleMap;
use crate::discovery::DependencySource;
use crate::error::Result;
use crate::node::NodeId;

/// Label prefix of the rendered project root.
pub const ROOT_NAME: &str = ":root";

/// A node of the pruned tree.
///
/// Every extension module carries its canonical (selected) name, version and
/// path, regardless of which occurrence was found at this position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleBranch {
    pub name: String,
    pub version: Option<String>,
    pub path: NormalizedPath,
    pub dependencies: Option<Vec<ModuleBranch>>,
}

impl ModuleBranch {
    /// Direct dependency named `name`.
    pub fn dependency(&self, name: &str) -> Option<&ModuleBranch> {
        self.dependencies
            .as_deref()
            .and_then(|deps| deps.iter().find(|dep| dep.name == name))
    }

    /// `name@version`, or just the name when unversioned.
    pub fn label(&self) -> String {
        match &self.version {
            Some(version) => format!("{}@{}", self.name, version),
            None => self.name.clone(),
        }
    }

    /// Render the tree below this branch, with `label` on the first line.
    pub fn render(&self, label: &str) -> String {
        let mut out = format!("{label}\n");
        render_children(self, "", &mut out);
        out
    }
}

fn render_children(branch: &ModuleBranch, prefix: &str, out: &mut String) {
    let children = branch.dependencies.as_deref().unwrap_or_default();

    for (ix, child) in children.iter().enumerate() {
        let last = ix + 1 == children.len();
        let more = child.dependencies.as_ref().is_some_and(|d| !d.is_empty());

        out.push_str(prefix);
        out.push_str(if last { "└─" } else { "├─" });
        out.push_str(if more { "┬ " } else { "─ " });
        out.push_str(&child.label());
        out.push('\n');

        let nested = format!("{prefix}{} ", if last { ' ' } else { '│' });
        render_children(child, &nested, out);
    }
}

/// Rewrite the raw tree at `root` so every extension module reflects its
/// canonical entry.
pub fn prune(
    source: &dyn DependencySource,
    root: NodeId,
    canonical: &ModuleMap,
) -> Result<ModuleBranch> {
    let node = source.node(root);
    let selected = if node.is_extension {
        canonical.get(&node.name)
    } else {
        None
    };
    let origin = selected.unwrap_or(&*node);

    let dependencies = source
        .dependencies(root)?
        .into_iter()
        .map(|dep| prune(source, dep.id, canonical))
        .collect::<Result<Vec<_>>>()?;

    Ok(ModuleBranch {
        name: origin.name.clone(),
        version: origin.version.clone(),
        path: origin.path.clone(),
        dependencies: (!dependencies.is_empty()).then_some(dependencies),
    })
}

/// Every branch, including `root` itself, whose path is `dir`.
pub fn find_branches_by_path<'a>(
    root: &'a ModuleBranch,
    dir: &NormalizedPath,
) -> Vec<&'a ModuleBranch> {
    let mut found = Vec::new();
    collect_by_path(root, dir, &mut found);
    found
}

fn collect_by_path<'a>(
    branch: &'a ModuleBranch,
    dir: &NormalizedPath,
    found: &mut Vec<&'a ModuleBranch>,
) {
    if &branch.path == dir {
        found.push(branch);
    }
    for dep in branch.dependencies.iter().flatten() {
        collect_by_path(dep, dir, found);
    }
}
