use super::*;
use serde_json::json;

fn sample_spec() -> TreeSpec {
    TreeSpec::new("container")
        .id("root")
        .child(TreeSpec::new("text").prop("tag", "h1").prop("children", "EXAMPLE 7"))
        .child(
            TreeSpec::new("container")
                .id("form")
                .child(TreeSpec::new("input-control").id("user_input").prop("type", "text"))
                .child(TreeSpec::new("button").id("button").prop("children", "Submit"))
                .child(TreeSpec::new("container").id("output").prop("children", "Click submit!")),
        )
}

#[test]
fn build_produces_unique_resolvable_ids() {
    let tree = build(&sample_spec()).expect("valid spec");
    let ids: Vec<&str> = tree.nodes().map(|n| n.id.as_str()).collect();
    let unique: HashSet<&str> = ids.iter().copied().collect();
    assert_eq!(ids.len(), unique.len());
    assert_eq!(tree.node_count(), 6);
    for id in ids {
        assert_eq!(tree.find(id).expect("resolvable").id, id);
    }
}

#[test]
fn nodes_walk_in_pre_order() {
    let tree = build(&sample_spec()).expect("valid spec");
    let ids: Vec<&str> = tree.nodes().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["root", "_node-0", "form", "user_input", "button", "output"]);
}

#[test]
fn missing_ids_are_generated_in_pre_order() {
    let spec = TreeSpec::new("container")
        .child(TreeSpec::new("text"))
        .child(TreeSpec::new("container").child(TreeSpec::new("markdown")));
    let tree = build(&spec).expect("valid spec");
    let ids: Vec<&str> = tree.nodes().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["_node-0", "_node-1", "_node-2", "_node-3"]);
}

#[test]
fn build_rejects_unknown_kind() {
    let spec = TreeSpec::new("container").child(TreeSpec::new("slider").id("s"));
    assert_eq!(build(&spec), Err(TreeError::InvalidNodeKind("slider".into())));
}

#[test]
fn build_rejects_duplicate_ids_across_depths() {
    let spec = TreeSpec::new("container")
        .id("a")
        .child(TreeSpec::new("container").id("b").child(TreeSpec::new("text").id("a")));
    assert_eq!(build(&spec), Err(TreeError::DuplicateId("a".into())));
}

#[test]
fn build_rejects_reserved_prefix() {
    let spec = TreeSpec::new("container").id("_node-7");
    assert_eq!(build(&spec), Err(TreeError::ReservedId("_node-7".into())));
}

#[test]
fn build_rejects_property_the_kind_does_not_declare() {
    let spec = TreeSpec::new("graph").id("g").prop("n_clicks", 3);
    assert_eq!(
        build(&spec),
        Err(TreeError::UnknownProperty { kind: NodeKind::Graph, property: "n_clicks".into() })
    );

    let spec = TreeSpec::new("text").id("t").prop("colour", "red");
    assert!(matches!(build(&spec), Err(TreeError::UnknownProperty { .. })));
}

#[test]
fn build_rejects_children_under_leaf_kinds() {
    let spec = TreeSpec::new("button").id("b").child(TreeSpec::new("text"));
    assert_eq!(
        build(&spec),
        Err(TreeError::UnexpectedChildren { id: "b".into(), kind: NodeKind::Button })
    );
}

#[test]
fn find_reports_missing_node() {
    let tree = build(&sample_spec()).expect("valid spec");
    assert_eq!(tree.find("nope"), Err(TreeError::NodeNotFound("nope".into())));
}

#[test]
fn initial_props_are_keyed_by_enum() {
    let tree = build(&sample_spec()).expect("valid spec");
    let button = tree.find("button").expect("button");
    assert_eq!(button.kind, NodeKind::Button);
    assert!(button.children.is_empty());
    assert_eq!(button.props.get(&Prop::Children), Some(&json!("Submit")));
    assert!(!tree.find("form").expect("form").children.is_empty());
}

#[test]
fn spec_deserializes_from_json() {
    let raw = json!({
        "id": "root",
        "kind": "container",
        "children": [
            {"id": "in", "kind": "input-control", "props": {"value": "SF", "control": "dropdown"}}
        ]
    });
    let spec: TreeSpec = serde_json::from_value(raw).expect("deserialize");
    let tree = build(&spec).expect("valid spec");
    let input = tree.find("in").expect("input");
    assert_eq!(input.kind, NodeKind::InputControl);
    assert_eq!(input.props.get(&Prop::Value), Some(&json!("SF")));
}

#[test]
fn prop_names_round_trip_through_text() {
    for kind in [
        NodeKind::Container,
        NodeKind::Text,
        NodeKind::Graph,
        NodeKind::InputControl,
        NodeKind::Button,
        NodeKind::Markdown,
    ] {
        assert_eq!(kind.as_str().parse::<NodeKind>(), Ok(kind));
        for prop in kind.props() {
            assert_eq!(Prop::parse(prop.as_str()), Some(*prop));
        }
    }
    assert_eq!(Prop::parse("nClicks"), None);
}

#[test]
fn n_clicks_defaults_to_zero() {
    assert_eq!(Prop::NClicks.default_value(), json!(0));
    assert_eq!(Prop::Value.default_value(), serde_json::Value::Null);
}
