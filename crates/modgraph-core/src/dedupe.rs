//! Flattening, deduplication and engine diagnostics.
//!
//! The raw tree may contain the same module name many times, at different
//! versions. Flattening groups every extension occurrence by name;
//! deduplication keeps the highest version of each group and records the
//! losers that the winner is not caret-compatible with.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::discovery::DependencySource;
use crate::error::Result;
use crate::issues::{DependencyVersionIssue, IssueSet};
use crate::node::{ModuleNode, NodeId};
use crate::version::VersionComparator;

/// Version used for comparisons when a module declares none.
const NO_VERSION: &str = "0.0.0";

/// Occurrences of each module name, in order of first appearance.
#[derive(Debug, Default)]
pub struct ModuleCollection {
    groups: Vec<(String, Vec<Rc<ModuleNode>>)>,
    index: HashMap<String, usize>,
}

impl ModuleCollection {
    /// Append an occurrence to its name's group.
    pub fn push(&mut self, node: Rc<ModuleNode>) {
        match self.index.get(&node.name) {
            Some(&ix) => self.groups[ix].1.push(node),
            None => {
                self.index.insert(node.name.clone(), self.groups.len());
                self.groups.push((node.name.clone(), vec![node]));
            }
        }
    }

    /// All occurrences of `name`.
    pub fn occurrences(&self, name: &str) -> &[Rc<ModuleNode>] {
        self.index
            .get(name)
            .map(|&ix| self.groups[ix].1.as_slice())
            .unwrap_or_default()
    }

    /// Groups in order of first appearance.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Rc<ModuleNode>])> {
        self.groups
            .iter()
            .map(|(name, nodes)| (name.as_str(), nodes.as_slice()))
    }

    /// Number of distinct names.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether no extension module was found.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// The canonical registry: one selected module per name.
#[derive(Debug, Default)]
pub struct ModuleMap {
    list: Vec<Rc<ModuleNode>>,
    index: HashMap<String, usize>,
}

impl ModuleMap {
    fn insert(&mut self, node: Rc<ModuleNode>) {
        self.index.insert(node.name.clone(), self.list.len());
        self.list.push(node);
    }

    /// The selected module for `name`.
    pub fn get(&self, name: &str) -> Option<&ModuleNode> {
        self.index.get(name).map(|&ix| &*self.list[ix])
    }

    /// Whether `name` has a selected module.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Selected modules in flattening order.
    pub fn iter(&self) -> impl Iterator<Item = &ModuleNode> {
        self.list.iter().map(|node| &**node)
    }

    /// Number of selected modules.
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Whether no module was selected.
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }
}

/// Output of [`flatten`].
#[derive(Debug, Default)]
pub struct Flattened {
    pub collection: ModuleCollection,
    /// Unresolvable identifiers, once per distinct node that declared them.
    pub missing: Vec<String>,
}

/// Walk the tree depth-first from `root`, grouping extension occurrences by name.
///
/// Non-extension nodes are not collected but their dependencies are still
/// walked, since modules may sit beneath ordinary packages.
pub fn flatten(source: &dyn DependencySource, root: NodeId) -> Result<Flattened> {
    let mut flattened = Flattened::default();
    let mut seen = HashSet::new();
    visit(source, root, &mut flattened, &mut seen)?;
    Ok(flattened)
}

fn visit(
    source: &dyn DependencySource,
    id: NodeId,
    flattened: &mut Flattened,
    seen: &mut HashSet<NodeId>,
) -> Result<()> {
    let node = source.node(id);
    if node.is_extension {
        flattened.collection.push(Rc::clone(&node));
    }

    let dependencies = source.dependencies(id)?;
    if seen.insert(id) {
        flattened.missing.extend(node.missing().iter().cloned());
    }

    for dependency in dependencies {
        visit(source, dependency.id, flattened, seen)?;
    }
    Ok(())
}

/// Order two optional versions; an absent version is below every present one.
pub fn compare_versions(
    comparator: &dyn VersionComparator,
    a: Option<&str>,
    b: Option<&str>,
) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => comparator.compare(a, b),
    }
}

/// Select the highest version of every module name.
///
/// Losers that do not satisfy `^<winner>` are recorded in
/// `issues.dependency_versions`. The sort is stable, so among equal versions
/// the first occurrence found wins.
pub fn dedupe(
    collection: &ModuleCollection,
    comparator: &dyn VersionComparator,
    issues: &mut IssueSet,
) -> ModuleMap {
    let mut deduped = ModuleMap::default();

    for (name, occurrences) in collection.iter() {
        let mut versions = occurrences.to_vec();
        versions.sort_by(|a, b| {
            compare_versions(comparator, b.version.as_deref(), a.version.as_deref())
        });

        let Some((winner, losers)) = versions.split_first() else {
            continue;
        };
        issues
            .dependency_versions
            .extend(version_issues(name, losers, winner, comparator));
        deduped.insert(Rc::clone(winner));
    }

    deduped
}

fn version_issues(
    name: &str,
    losers: &[Rc<ModuleNode>],
    winner: &Rc<ModuleNode>,
    comparator: &dyn VersionComparator,
) -> Vec<DependencyVersionIssue> {
    let selected = winner.version.as_deref().unwrap_or(NO_VERSION);

    losers
        .iter()
        .filter_map(|loser| {
            let requested = loser.version.as_deref().unwrap_or(NO_VERSION);
            if loser.version != winner.version {
                tracing::debug!("asked for {}@{} but using {}", name, requested, selected);
            }
            if comparator.satisfies(requested, &format!("^{selected}")) {
                None
            } else {
                Some(DependencyVersionIssue {
                    name: name.to_string(),
                    requested: Rc::clone(loser),
                    selected: Rc::clone(winner),
                })
            }
        })
        .collect()
}

/// Check every selected module's engine requirement against the core version.
///
/// The core module itself is exempt.
pub fn check_engines(
    modules: &ModuleMap,
    core_name: &str,
    comparator: &dyn VersionComparator,
    issues: &mut IssueSet,
) {
    let core_version = modules
        .get(core_name)
        .and_then(|core| core.version.as_deref())
        .unwrap_or(NO_VERSION);

    for module in &modules.list {
        if module.name == core_name {
            continue;
        }
        match module.engine_requirement.as_deref() {
            None => issues.missing_engine.push(Rc::clone(module)),
            Some(needs) if !comparator.satisfies(core_version, needs) => {
                issues.incompatible_engine.push(Rc::clone(module))
            }
            Some(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::SemverComparator;
    use pretty_assertions::assert_eq;

    fn module(name: &str, version: Option<&str>, path: &str) -> Rc<ModuleNode> {
        let node = ModuleNode::new(name, path).as_extension();
        Rc::new(match version {
            Some(v) => node.with_version(v),
            None => node,
        })
    }

    fn collection(nodes: &[Rc<ModuleNode>]) -> ModuleCollection {
        let mut collection = ModuleCollection::default();
        for node in nodes {
            collection.push(Rc::clone(node));
        }
        collection
    }

    #[test]
    fn test_collection_groups_in_first_seen_order() {
        let c = collection(&[
            module("b", Some("1.0.0"), "/b1"),
            module("a", Some("1.0.0"), "/a"),
            module("b", Some("2.0.0"), "/b2"),
        ]);
        let names: Vec<&str> = c.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(c.occurrences("b").len(), 2);
        assert!(c.occurrences("zzz").is_empty());
    }

    #[test]
    fn test_highest_version_wins() {
        let c = collection(&[
            module("b", Some("1.0.0"), "/b1"),
            module("b", Some("1.10.0"), "/b3"),
            module("b", Some("1.2.0"), "/b2"),
        ]);
        let mut issues = IssueSet::default();
        let map = dedupe(&c, &SemverComparator, &mut issues);

        assert_eq!(map.get("b").unwrap().version.as_deref(), Some("1.10.0"));
        // 1.0.0 and 1.2.0 do not satisfy ^1.10.0
        assert_eq!(issues.dependency_versions.len(), 2);
    }

    #[test]
    fn test_absent_version_loses() {
        let c = collection(&[module("b", None, "/b1"), module("b", Some("0.0.0"), "/b2")]);
        let mut issues = IssueSet::default();
        let map = dedupe(&c, &SemverComparator, &mut issues);

        assert_eq!(map.get("b").unwrap().path.as_str(), "/b2");
        assert!(issues.dependency_versions.is_empty());
    }

    #[test]
    fn test_equal_versions_first_wins_without_issue() {
        let c = collection(&[
            module("b", Some("1.0.0"), "/first"),
            module("b", Some("1.0.0"), "/second"),
        ]);
        let mut issues = IssueSet::default();
        let map = dedupe(&c, &SemverComparator, &mut issues);

        assert_eq!(map.get("b").unwrap().path.as_str(), "/first");
        assert!(issues.is_empty());
    }

    #[test]
    fn test_version_issue_shape() {
        let c = collection(&[module("b", Some("1.0.0"), "/old"), module("b", Some("2.0.0"), "/new")]);
        let mut issues = IssueSet::default();
        dedupe(&c, &SemverComparator, &mut issues);

        let issue = &issues.dependency_versions[0];
        assert_eq!(issue.name, "b");
        assert_eq!(issue.requested.path.as_str(), "/old");
        assert_eq!(issue.selected.path.as_str(), "/new");
    }

    #[test]
    fn test_engine_checks() {
        let core = Rc::new(
            ModuleNode::new("modgraph", "/core")
                .as_extension()
                .with_version("3.1.0"),
        );
        let ok = Rc::new(
            ModuleNode::new("ok", "/ok")
                .as_extension()
                .with_engine_requirement("^3.0.0"),
        );
        let old = Rc::new(
            ModuleNode::new("old", "/old")
                .as_extension()
                .with_engine_requirement("^2.0.0"),
        );
        let bare = Rc::new(ModuleNode::new("bare", "/bare").as_extension());

        let c = collection(&[core, ok, old, bare]);
        let mut issues = IssueSet::default();
        let map = dedupe(&c, &SemverComparator, &mut issues);
        check_engines(&map, "modgraph", &SemverComparator, &mut issues);

        let missing: Vec<&str> = issues.missing_engine.iter().map(|m| m.name.as_str()).collect();
        let incompatible: Vec<&str> = issues
            .incompatible_engine
            .iter()
            .map(|m| m.name.as_str())
            .collect();
        assert_eq!(missing, vec!["bare"]);
        assert_eq!(incompatible, vec!["old"]);
    }

    #[test]
    fn test_compare_versions_absent_lowest() {
        let cmp = SemverComparator;
        assert_eq!(compare_versions(&cmp, None, Some("0.0.0")), Ordering::Less);
        assert_eq!(compare_versions(&cmp, Some("0.0.1"), None), Ordering::Greater);
        assert_eq!(compare_versions(&cmp, None, None), Ordering::Equal);
    }
}
