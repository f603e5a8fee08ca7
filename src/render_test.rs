use super::*;
use crate::app::App;
use crate::tree::TreeSpec;

fn app() -> App {
    let spec = TreeSpec::new("container").id("root").children([
        TreeSpec::new("input-control").id("user_input").prop("placeholder", "Song/band"),
        TreeSpec::new("button").id("button").prop("children", "Submit"),
        TreeSpec::new("container").id("out").prop("children", "Click submit!"),
    ]);
    let mut app = App::new(&spec).expect("app");
    app.callback("out.children", &["button.n_clicks"], &["user_input.value"], |i, _| {
        Ok(json!(format!("clicked {}", i[0])))
    })
    .expect("register");
    app
}

#[test]
fn layout_mirrors_tree_and_omits_unset_props() {
    let app = app();
    let snapshot = layout(app.tree(), app.engine().registry());

    assert_eq!(snapshot["id"], "root");
    assert_eq!(snapshot["kind"], "container");
    assert_eq!(snapshot["props"], json!({}));
    let children = snapshot["children"].as_array().expect("children");
    assert_eq!(children.len(), 3);
    assert_eq!(children[0]["kind"], "input-control");
    assert_eq!(children[0]["props"], json!({"placeholder": "Song/band"}));
    assert_eq!(children[1]["props"], json!({"children": "Submit", "n_clicks": 0}));
}

#[test]
fn layout_reflects_dispatched_values() {
    let mut app = app();
    app.click("button").expect("click");
    let snapshot = layout(app.tree(), app.engine().registry());
    let children = snapshot["children"].as_array().expect("children");
    assert_eq!(children[1]["props"]["n_clicks"], 1);
    assert_eq!(children[2]["props"]["children"], "clicked 1");
}

#[test]
fn dependencies_list_textual_bindings() {
    let app = app();
    let deps = dependencies(app.engine().graph());
    assert_eq!(
        deps,
        vec![Dependency {
            output: "out.children".into(),
            inputs: vec!["button.n_clicks".into()],
            state: vec!["user_input.value".into()],
        }]
    );
}
