use std::collections::HashMap;

use feedview_tree::{
    build_instance_tree, build_path_tree, FileRecord, StageId, StageNode, StageRecord, TreeError,
};
use proptest::prelude::*;

/// A well-formed stage set: ids `1..=n`, each non-root pointing at a smaller id,
/// handed to the builder in arbitrary order.
fn stage_tree() -> impl Strategy<Value = Vec<StageRecord>> {
    (1usize..40)
        .prop_flat_map(|n| proptest::collection::vec(any::<prop::sample::Index>(), n - 1))
        .prop_map(|parents| {
            let mut records = vec![StageRecord::new(1, None, "root")];
            for (i, parent) in parents.iter().enumerate() {
                let id = i as StageId + 2;
                let previous = parent.index(i + 1) as StageId + 1;
                records.push(StageRecord::new(id, Some(previous), format!("s{id}")));
            }
            records
        })
        .prop_shuffle()
}

/// A stage set whose root count is anything but one.
fn rootless_or_forest() -> impl Strategy<Value = Vec<StageRecord>> {
    (stage_tree(), prop_oneof![Just(0usize), 2usize..5]).prop_map(|(mut records, roots)| {
        records.sort_by_key(|r| r.id);
        if roots == 0 {
            records[0].previous_id = Some(records.last().map(|r| r.id).unwrap_or(1));
        } else {
            let max_id = records.last().map(|r| r.id).unwrap_or(0);
            for extra in 1..roots as StageId {
                records.push(StageRecord::new(max_id + extra, None, "extra"));
            }
        }
        records
    })
}

fn dir_segment() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-c]{1,2}").unwrap()
}

/// File names always carry an extension and directories never do, so a file
/// can never collide with a directory of the same name.
fn file_path() -> impl Strategy<Value = String> {
    (
        proptest::collection::vec(dir_segment(), 0..3),
        proptest::string::string_regex("[a-c]{1,2}\\.txt").unwrap(),
    )
        .prop_map(|(mut dirs, name)| {
            dirs.push(name);
            dirs.join("/")
        })
}

fn file_records() -> impl Strategy<Value = Vec<FileRecord>> {
    proptest::collection::vec(file_path(), 0..30).prop_map(|paths| {
        paths
            .into_iter()
            .enumerate()
            .map(|(i, path)| FileRecord::new(path, i as u64))
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn stage_tree_counts_every_record_and_sorts_children(records in stage_tree()) {
        let root = build_instance_tree(&records).expect("well-formed");
        prop_assert_eq!(root.len(), records.len());
        prop_assert_eq!(root.id(), 1);
        for (_, node) in root.iter() {
            let ids: Vec<StageId> = node.children.iter().map(StageNode::id).collect();
            let mut sorted = ids.clone();
            sorted.sort_unstable();
            prop_assert_eq!(ids, sorted);
        }
    }

    #[test]
    fn stage_tree_is_idempotent_and_order_independent(records in stage_tree()) {
        let first = build_instance_tree(&records).expect("well-formed");
        let second = build_instance_tree(&records).expect("well-formed");
        prop_assert_eq!(&first, &second);

        let mut sorted = records.clone();
        sorted.sort_by_key(|r| r.id);
        prop_assert_eq!(&first, &build_instance_tree(&sorted).expect("well-formed"));
    }

    #[test]
    fn stage_tree_without_exactly_one_root_is_not_found(records in rootless_or_forest()) {
        let roots = records.iter().filter(|r| r.previous_id.is_none()).count();
        prop_assert_eq!(build_instance_tree(&records), Err(TreeError::NotFound { roots }));
    }

    #[test]
    fn path_tree_leaves_match_distinct_paths(files in file_records()) {
        let root = build_path_tree(&files).expect("valid paths");

        let mut expected: HashMap<&str, u64> = HashMap::new();
        for file in &files {
            expected.insert(file.full_path.as_str(), file.file_handle.id);
        }

        let leaves = root.leaves();
        prop_assert_eq!(leaves.len(), expected.len());
        for (path, file) in leaves {
            prop_assert_eq!(expected.get(path.as_str()).copied(), Some(file.file_handle.id));
            prop_assert_eq!(&file.full_path, &path);
        }
    }

    #[test]
    fn path_tree_is_idempotent(files in file_records()) {
        let first = build_path_tree(&files).expect("valid paths");
        let second = build_path_tree(&files).expect("valid paths");
        prop_assert_eq!(first, second);
    }
}
