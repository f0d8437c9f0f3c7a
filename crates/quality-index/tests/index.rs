//! Tests for the incremental error index.

use std::collections::{BTreeSet, HashMap};

use proptest::prelude::*;
use quality_index::{ErrorIndex, IndexEvent, NodeId, NodeKind};
use quality_model::{ErrorRecord, ErrorType, LocalizedText, Priority};

fn make_record(
    id: &str,
    priority: Priority,
    feature_type: &str,
    feature_id: &str,
    error_type: ErrorType,
) -> ErrorRecord {
    ErrorRecord {
        priority,
        feature_type: feature_type.to_string(),
        feature_id: feature_id.to_string(),
        error_id: 1,
        unique_identifier: id.to_string(),
        error_type,
        attribute_name: None,
        description: LocalizedText::default(),
        extra_info: None,
        geometry: None,
        is_user_processed: false,
    }
}

fn bldg(id: &str, error_type: ErrorType) -> ErrorRecord {
    make_record(id, Priority::Fatal, "bldg", "f1", error_type)
}

/// Record derived from a numeric id, so the same id always describes the
/// same error.
fn numbered(id: u32) -> ErrorRecord {
    let priority = Priority::ALL[(id % 3) as usize];
    make_record(
        &format!("e{id}"),
        priority,
        &format!("type{}", id % 4),
        &format!("feature{}", id % 5),
        ErrorType::ALL[(id % 4) as usize],
    )
}

fn all_nodes(index: &ErrorIndex) -> Vec<NodeId> {
    let mut nodes = Vec::new();
    let mut stack = vec![index.root()];
    while let Some(id) = stack.pop() {
        nodes.push(id);
        stack.extend(index.children(id).iter().copied());
    }
    nodes
}

#[test]
fn refresh_builds_four_levels() {
    let mut index = ErrorIndex::new();
    index.refresh(&[
        bldg("e1", ErrorType::Attribute),
        bldg("e2", ErrorType::Geometry),
    ]);

    let fatal = index.priority_node(Priority::Fatal);
    assert_eq!(index.child_count(fatal), 1);
    let feature_type = index.child(fatal, 0).unwrap();
    assert_eq!(index.kind(feature_type), Some(NodeKind::FeatureType));
    assert_eq!(index.key(feature_type), Some("bldg"));
    assert_eq!(index.child_count(feature_type), 1);
    let feature = index.child(feature_type, 0).unwrap();
    assert_eq!(index.kind(feature), Some(NodeKind::Feature));
    assert_eq!(index.key(feature), Some("f1"));
    assert_eq!(index.child_count(feature), 2);
    assert_eq!(index.key(index.child(feature, 0).unwrap()), Some("e1"));
    assert_eq!(index.key(index.child(feature, 1).unwrap()), Some("e2"));
    assert_eq!(index.child_by_key(feature, "e2"), index.child(feature, 1));
    assert_eq!(index.parent(feature), Some(feature_type));

    assert_eq!(index.child_count(index.priority_node(Priority::Warning)), 0);
    assert_eq!(index.error_count(), 2);
}

#[test]
fn refresh_emits_insertions_per_created_node() {
    let mut index = ErrorIndex::new();
    let events = index.refresh(&[bldg("e1", ErrorType::Attribute)]);

    let fatal = index.priority_node(Priority::Fatal);
    let feature_type = index.child(fatal, 0).unwrap();
    let feature = index.child(feature_type, 0).unwrap();
    assert_eq!(
        events,
        vec![
            IndexEvent::RowsInserted {
                parent: fatal,
                first: 0,
                last: 0
            },
            IndexEvent::RowsInserted {
                parent: feature_type,
                first: 0,
                last: 0
            },
            IndexEvent::RowsInserted {
                parent: feature,
                first: 0,
                last: 0
            },
        ]
    );
}

#[test]
fn refresh_with_same_records_is_a_no_op() {
    let mut index = ErrorIndex::new();
    let records = vec![
        bldg("e1", ErrorType::Attribute),
        bldg("e2", ErrorType::Geometry),
    ];
    assert!(!index.refresh(&records).is_empty());
    let revision = index.revision();

    assert!(index.refresh(&records).is_empty());
    assert_eq!(index.revision(), revision);
}

#[test]
fn replacing_one_error_touches_only_its_rows() {
    let mut index = ErrorIndex::new();
    index.refresh(&[
        bldg("e1", ErrorType::Attribute),
        bldg("e2", ErrorType::Geometry),
    ]);
    let feature = index.parent(index.find_error("e1").unwrap()).unwrap();
    let feature_type = index.parent(feature).unwrap();
    let e2 = index.find_error("e2").unwrap();

    let events = index.refresh(&[
        bldg("e2", ErrorType::Geometry),
        bldg("e3", ErrorType::Topology),
    ]);

    assert_eq!(
        events,
        vec![
            IndexEvent::RowsRemoved {
                parent: feature,
                first: 0,
                last: 0
            },
            IndexEvent::RowsInserted {
                parent: feature,
                first: 1,
                last: 1
            },
        ]
    );
    assert_eq!(index.parent(feature), Some(feature_type));
    assert_eq!(index.find_error("e2"), Some(e2));
    assert_eq!(index.key(index.child(feature, 0).unwrap()), Some("e2"));
    assert_eq!(index.key(index.child(feature, 1).unwrap()), Some("e3"));
    assert!(!index.contains_error("e1"));
}

#[test]
fn removals_run_in_reverse_order() {
    let mut index = ErrorIndex::new();
    index.refresh(&[
        bldg("e1", ErrorType::Attribute),
        bldg("e2", ErrorType::Geometry),
        bldg("e3", ErrorType::Topology),
    ]);
    let feature = index.parent(index.find_error("e1").unwrap()).unwrap();

    let events = index.refresh(&[bldg("e2", ErrorType::Geometry)]);
    assert_eq!(
        events,
        vec![
            IndexEvent::RowsRemoved {
                parent: feature,
                first: 2,
                last: 2
            },
            IndexEvent::RowsRemoved {
                parent: feature,
                first: 0,
                last: 0
            },
        ]
    );
}

#[test]
fn emptied_branches_are_kept() {
    let mut index = ErrorIndex::new();
    index.refresh(&[bldg("e1", ErrorType::Attribute)]);
    let feature = index.parent(index.find_error("e1").unwrap()).unwrap();

    index.refresh(&[]);
    let fatal = index.priority_node(Priority::Fatal);
    assert_eq!(index.child_count(fatal), 1);
    assert_eq!(index.child_count(feature), 0);
    assert!(index.is_empty());

    // A later error for the same feature reuses the kept branch.
    let events = index.refresh(&[bldg("e4", ErrorType::Geometry)]);
    assert_eq!(
        events,
        vec![IndexEvent::RowsInserted {
            parent: feature,
            first: 0,
            last: 0
        }]
    );
}

#[test]
fn set_user_processed_notifies_ancestors() {
    let mut index = ErrorIndex::new();
    index.refresh(&[bldg("e1", ErrorType::Attribute)]);
    let error = index.find_error("e1").unwrap();
    let feature = index.parent(error).unwrap();
    let feature_type = index.parent(feature).unwrap();
    let fatal = index.priority_node(Priority::Fatal);

    let events = index.set_user_processed("e1", true).unwrap();
    assert_eq!(
        events,
        vec![
            IndexEvent::DataChanged { node: error },
            IndexEvent::DataChanged { node: feature },
            IndexEvent::DataChanged { node: feature_type },
            IndexEvent::DataChanged { node: fatal },
            IndexEvent::ErrorChecked {
                identifier: "e1".to_string(),
                processed: true
            },
        ]
    );
    assert!(index.record(error).unwrap().is_user_processed);
}

#[test]
fn service_processed_flag_wins_on_refresh() {
    let mut index = ErrorIndex::new();
    index.refresh(&[bldg("e1", ErrorType::Attribute)]);
    index.set_user_processed("e1", true);

    // The service still reports the old flag: it wins, as a data change.
    let events = index.refresh(&[bldg("e1", ErrorType::Attribute)]);
    assert!(!events.is_empty());
    assert!(events.iter().all(|event| !event.is_structural()));
    let error = index.find_error("e1").unwrap();
    assert!(!index.record(error).unwrap().is_user_processed);
}

fn id_sets() -> impl Strategy<Value = (BTreeSet<u32>, BTreeSet<u32>)> {
    (
        prop::collection::btree_set(0u32..60, 0..30),
        prop::collection::btree_set(0u32..60, 0..30),
    )
}

proptest! {
    #[test]
    fn second_identical_refresh_is_silent(ids in prop::collection::btree_set(0u32..60, 0..30)) {
        let records: Vec<ErrorRecord> = ids.iter().copied().map(numbered).collect();
        let mut index = ErrorIndex::new();
        index.refresh(&records);
        prop_assert!(index.refresh(&records).is_empty());
    }

    #[test]
    fn keys_match_identifiers_after_any_refresh((first, second) in id_sets()) {
        let mut index = ErrorIndex::new();
        index.refresh(&first.iter().copied().map(numbered).collect::<Vec<_>>());
        let before: HashMap<u32, (NodeId, NodeId)> = first
            .intersection(&second)
            .map(|id| {
                let node = index.find_error(&format!("e{id}")).unwrap();
                (*id, (node, index.parent(node).unwrap()))
            })
            .collect();

        let records: Vec<ErrorRecord> = second.iter().copied().map(numbered).collect();
        index.refresh(&records);

        prop_assert_eq!(index.error_count(), second.len());
        for record in &records {
            let node = index.find_error(&record.unique_identifier).unwrap();
            prop_assert_eq!(index.key(node), Some(record.unique_identifier.as_str()));
            let feature = index.parent(node).unwrap();
            prop_assert_eq!(index.key(feature), Some(record.feature_id.as_str()));
            let feature_type = index.parent(feature).unwrap();
            prop_assert_eq!(index.key(feature_type), Some(record.feature_type.as_str()));
            prop_assert_eq!(index.parent(feature_type), Some(index.priority_node(record.priority)));
        }
        // Surviving errors and their features keep their identity.
        for (id, (node, feature)) in before {
            let current = index.find_error(&format!("e{id}")).unwrap();
            prop_assert_eq!(current, node);
            prop_assert_eq!(index.parent(current), Some(feature));
        }
    }

    #[test]
    fn events_replay_to_current_child_counts((first, second) in id_sets()) {
        let mut index = ErrorIndex::new();
        index.refresh(&first.iter().copied().map(numbered).collect::<Vec<_>>());
        let mut counts: HashMap<NodeId, usize> = all_nodes(&index)
            .into_iter()
            .map(|id| (id, index.child_count(id)))
            .collect();

        let events = index.refresh(&second.iter().copied().map(numbered).collect::<Vec<_>>());
        for event in events {
            match event {
                IndexEvent::RowsInserted { parent, first, last } => {
                    let count = counts.entry(parent).or_insert(0);
                    prop_assert_eq!(first, *count);
                    *count += last - first + 1;
                }
                IndexEvent::RowsRemoved { parent, first, last } => {
                    let count = counts.entry(parent).or_insert(0);
                    prop_assert!(last < *count);
                    *count -= last - first + 1;
                }
                IndexEvent::DataChanged { .. } | IndexEvent::ErrorChecked { .. } => {}
            }
        }

        for id in all_nodes(&index) {
            prop_assert_eq!(counts.get(&id).copied().unwrap_or(0), index.child_count(id));
        }
    }
}
