//! Property-based tests for version selection

use std::cmp::Ordering;
use std::rc::Rc;

use modgraph_core::dedupe::{compare_versions, dedupe};
use modgraph_core::{IssueSet, ModuleCollection, ModuleNode, SemverComparator, VersionComparator};
use proptest::prelude::*;

fn version_strategy() -> impl Strategy<Value = Option<String>> {
    prop::option::of((0u64..4, 0u64..12, 0u64..12).prop_map(|(a, b, c)| format!("{a}.{b}.{c}")))
}

fn collection(versions: &[Option<String>]) -> ModuleCollection {
    let mut collection = ModuleCollection::default();
    for (ix, version) in versions.iter().enumerate() {
        let mut node = ModuleNode::new("m", format!("/p/{ix}")).as_extension();
        if let Some(version) = version {
            node = node.with_version(version.clone());
        }
        collection.push(Rc::new(node));
    }
    collection
}

proptest! {
    #[test]
    fn selected_version_is_maximal(versions in prop::collection::vec(version_strategy(), 1..12)) {
        let cmp = SemverComparator;
        let mut issues = IssueSet::default();
        let map = dedupe(&collection(&versions), &cmp, &mut issues);
        let winner = map.get("m").unwrap();

        for version in &versions {
            prop_assert_ne!(
                compare_versions(&cmp, winner.version.as_deref(), version.as_deref()),
                Ordering::Less
            );
        }
    }

    #[test]
    fn absent_version_never_wins_over_present(versions in prop::collection::vec(version_strategy(), 1..12)) {
        let mut issues = IssueSet::default();
        let map = dedupe(&collection(&versions), &SemverComparator, &mut issues);
        let winner = map.get("m").unwrap();

        if versions.iter().any(Option::is_some) {
            prop_assert!(winner.version.is_some());
        }
    }

    #[test]
    fn first_of_equal_versions_wins(version in "[0-3]\\.[0-9]\\.[0-9]", copies in 2usize..6) {
        let versions = vec![Some(version); copies];
        let mut issues = IssueSet::default();
        let map = dedupe(&collection(&versions), &SemverComparator, &mut issues);

        prop_assert_eq!(map.get("m").unwrap().path.as_str(), "/p/0");
        prop_assert!(issues.dependency_versions.is_empty());
    }

    #[test]
    fn issues_only_for_caret_incompatible_losers(versions in prop::collection::vec(version_strategy(), 1..12)) {
        let cmp = SemverComparator;
        let mut issues = IssueSet::default();
        let map = dedupe(&collection(&versions), &cmp, &mut issues);
        let selected = map.get("m").unwrap().version.clone().unwrap_or_else(|| "0.0.0".to_string());

        for issue in &issues.dependency_versions {
            let requested = issue.requested.version.as_deref().unwrap_or("0.0.0");
            let caret_selected = format!("^{selected}");
            prop_assert!(!cmp.satisfies(requested, &caret_selected));
        }
        prop_assert!(issues.dependency_versions.len() < versions.len());
    }
}
