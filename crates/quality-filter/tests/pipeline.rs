use std::collections::BTreeSet;

use proptest::prelude::*;
use quality_filter::{FilterPipeline, OptionsDelta};
use quality_index::{ErrorIndex, NodeId, NodeKind};
use quality_model::{
    Coord, ErrorRecord, ErrorType, Extent, Geometry, LayerMapping, LocalizedText, Priority,
};

fn make_record(
    id: &str,
    feature_type: &str,
    feature_id: &str,
    error_type: ErrorType,
    attribute: Option<&str>,
) -> ErrorRecord {
    ErrorRecord {
        priority: Priority::Fatal,
        feature_type: feature_type.to_string(),
        feature_id: feature_id.to_string(),
        error_id: 7,
        unique_identifier: id.to_string(),
        error_type,
        attribute_name: attribute.map(str::to_string),
        description: LocalizedText::default(),
        extra_info: None,
        geometry: None,
        is_user_processed: false,
    }
}

fn scenario() -> (ErrorIndex, FilterPipeline) {
    let records = vec![
        make_record("e1", "bldg", "f1", ErrorType::Attribute, Some("h")),
        make_record("e2", "bldg", "f1", ErrorType::Geometry, None),
    ];
    let mut index = ErrorIndex::new();
    index.refresh(&records);
    let mut pipeline = FilterPipeline::with_default_stages(&LayerMapping::new(), true);
    pipeline.refresh_options_from_data(&records);
    (index, pipeline)
}

fn feature_path(index: &ErrorIndex) -> (NodeId, NodeId, NodeId) {
    let error = index.find_error("e1").unwrap();
    let feature = index.parent(error).unwrap();
    let feature_type = index.parent(feature).unwrap();
    (index.priority_node(Priority::Fatal), feature_type, feature)
}

#[test]
fn everything_visible_without_filters() {
    let (index, mut pipeline) = scenario();
    let (fatal, feature_type, feature) = feature_path(&index);
    assert!(!pipeline.is_active());

    let visibility = pipeline.visibility(&index);
    assert_eq!(visibility.visible_error_count(fatal), 2);
    assert_eq!(visibility.visible_error_count(feature_type), 2);
    assert_eq!(visibility.visible_error_count(feature), 2);
    assert_eq!(visibility.visible_errors(&index).len(), 2);
}

#[test]
fn deselecting_error_types_hides_branches() {
    let (index, mut pipeline) = scenario();
    let (fatal, feature_type, feature) = feature_path(&index);

    pipeline.set_accepted_error_types([
        ErrorType::Geometry,
        ErrorType::Topology,
        ErrorType::Continuity,
    ]);
    assert!(pipeline.is_active());
    let visibility = pipeline.visibility(&index);
    assert!(visibility.is_visible(feature));
    assert_eq!(visibility.visible_error_count(feature), 1);
    assert_eq!(
        visibility.visible_children(&index, feature),
        vec![index.find_error("e2").unwrap()]
    );

    pipeline.set_accepted_error_types([ErrorType::Topology, ErrorType::Continuity]);
    let visibility = pipeline.visibility(&index);
    assert!(!visibility.is_visible(feature));
    assert!(!visibility.is_visible(feature_type));
    assert!(visibility.is_visible(fatal));
    assert_eq!(visibility.visible_error_count(fatal), 0);
    assert!(visibility.is_visible(index.priority_node(Priority::Info)));
}

#[test]
fn absent_attribute_can_be_hidden() {
    let (index, mut pipeline) = scenario();
    pipeline.set_accepted_attribute_names([Some("h".to_string())]);
    let visible = pipeline.visibility(&index).visible_errors(&index);
    assert_eq!(visible, vec![index.find_error("e1").unwrap()]);
}

#[test]
fn processed_errors_hide_after_index_change() {
    let (mut index, mut pipeline) = scenario();
    pipeline.set_show_user_processed(false);
    assert_eq!(pipeline.visibility(&index).visible_errors(&index).len(), 2);

    index.set_user_processed("e2", true);
    let visible = pipeline.visibility(&index).visible_errors(&index);
    assert_eq!(visible, vec![index.find_error("e1").unwrap()]);
}

#[test]
fn feature_type_options_follow_the_data() {
    let mut pipeline = FilterPipeline::with_default_stages(&LayerMapping::new(), false);
    let batch = |types: &[&str]| -> Vec<ErrorRecord> {
        types
            .iter()
            .enumerate()
            .map(|(n, feature_type)| {
                make_record(&format!("e{n}"), feature_type, "f", ErrorType::Geometry, None)
            })
            .collect()
    };
    let accepted = |pipeline: &FilterPipeline| -> BTreeSet<String> {
        pipeline
            .feature_types()
            .unwrap()
            .accepted()
            .iter()
            .cloned()
            .collect()
    };
    let set = |values: &[&str]| -> BTreeSet<String> {
        values.iter().map(|value| value.to_string()).collect()
    };

    pipeline.refresh_options_from_data(&batch(&["A", "B"]));
    assert_eq!(accepted(&pipeline), set(&["A", "B"]));

    let delta = pipeline.refresh_options_from_data(&batch(&["A", "B", "C"]));
    assert_eq!(delta, OptionsDelta { added: 1, removed: 0 });
    assert_eq!(accepted(&pipeline), set(&["A", "B", "C"]));

    let delta = pipeline.refresh_options_from_data(&batch(&["A", "C"]));
    assert_eq!(delta, OptionsDelta { added: 0, removed: 1 });
    assert_eq!(accepted(&pipeline), set(&["A", "C"]));
}

#[test]
fn one_change_per_options_refresh() {
    let (_, mut pipeline) = scenario();
    let revision = pipeline.revision();
    pipeline.refresh_options_from_data(&[make_record(
        "e9",
        "road",
        "r1",
        ErrorType::Topology,
        Some("width"),
    )]);
    assert_eq!(pipeline.revision(), revision + 1);
}

#[test]
fn deselected_value_stays_deselected_across_refresh() {
    let (index, mut pipeline) = scenario();
    pipeline
        .feature_types_mut()
        .unwrap()
        .set_value_accepted(&"bldg".to_string(), false);
    pipeline.refresh_options_from_data(&[make_record(
        "e1",
        "bldg",
        "f1",
        ErrorType::Attribute,
        Some("h"),
    )]);
    assert!(pipeline.visibility(&index).visible_errors(&index).is_empty());
}

#[test]
fn extent_stage_limits_to_intersecting_geometry() {
    let mut inside = make_record("e1", "bldg", "f1", ErrorType::Geometry, None);
    inside.geometry = Some(Geometry::Point(Coord::new(1.0, 1.0)));
    let mut outside = make_record("e2", "bldg", "f2", ErrorType::Geometry, None);
    outside.geometry = Some(Geometry::LineString(vec![
        Coord::new(20.0, 20.0),
        Coord::new(30.0, 25.0),
    ]));
    let records = vec![inside, outside];

    let mut index = ErrorIndex::new();
    index.refresh(&records);
    let mut pipeline = FilterPipeline::with_default_stages(&LayerMapping::new(), true);
    pipeline.refresh_options_from_data(&records);

    pipeline.set_extent(Some(Extent::new(0.0, 0.0, 10.0, 10.0)));
    let visible = pipeline.visibility(&index).visible_errors(&index);
    assert_eq!(visible, vec![index.find_error("e1").unwrap()]);

    pipeline.set_extent(None);
    assert_eq!(pipeline.visibility(&index).visible_errors(&index).len(), 2);
}

fn numbered(id: u32) -> ErrorRecord {
    let mut record = make_record(
        &format!("e{id}"),
        &format!("type{}", id % 3),
        &format!("feature{}", id % 5),
        ErrorType::ALL[(id % 4) as usize],
        None,
    );
    record.priority = Priority::ALL[(id % 3) as usize];
    record
}

proptest! {
    #[test]
    fn parents_visible_iff_a_child_is(
        ids in prop::collection::btree_set(0u32..40, 0..25),
        accepted in prop::collection::vec(any::<bool>(), 4),
    ) {
        let records: Vec<ErrorRecord> = ids.iter().copied().map(numbered).collect();
        let mut index = ErrorIndex::new();
        index.refresh(&records);
        let mut pipeline = FilterPipeline::with_default_stages(&LayerMapping::new(), true);
        pipeline.refresh_options_from_data(&records);
        pipeline.set_accepted_error_types(
            ErrorType::ALL
                .into_iter()
                .zip(accepted)
                .filter_map(|(error_type, keep)| keep.then_some(error_type)),
        );

        let accepts: Vec<bool> = index
            .error_nodes()
            .into_iter()
            .map(|id| pipeline.accepts(index.data(id).unwrap()))
            .collect();
        let visibility = pipeline.visibility(&index);

        for (id, accepted) in index.error_nodes().into_iter().zip(accepts) {
            prop_assert_eq!(visibility.is_visible(id), accepted);
        }
        for priority in Priority::ALL {
            let priority_node = index.priority_node(priority);
            prop_assert!(visibility.is_visible(priority_node));
            for &feature_type in index.children(priority_node) {
                for &feature in index.children(feature_type) {
                    let visible_errors = index
                        .children(feature)
                        .iter()
                        .filter(|error| visibility.is_visible(**error))
                        .count();
                    prop_assert_eq!(visibility.is_visible(feature), visible_errors > 0);
                    prop_assert_eq!(visibility.visible_error_count(feature), visible_errors);
                }
                let any = index
                    .children(feature_type)
                    .iter()
                    .any(|feature| visibility.is_visible(*feature));
                prop_assert_eq!(visibility.is_visible(feature_type), any);
                prop_assert_eq!(index.kind(feature_type), Some(NodeKind::FeatureType));
            }
        }
    }
}
