use super::*;
use crate::app::App;
use crate::frame::Status;
use crate::graph::CallbackError;
use crate::registry::Binding;
use crate::state::test_helpers;
use crate::tree::{Prop, TreeSpec};
use serde_json::json;

fn failing_state(debug: bool) -> AppState {
    let spec = TreeSpec::new("container").id("root").children([
        TreeSpec::new("input-control").id("in"),
        TreeSpec::new("container").id("out").prop("children", "idle"),
    ]);
    let mut app = App::new(&spec).expect("app");
    app.callback("out.children", &["in.value"], &[], |_, _| {
        Err(CallbackError::new("secret stack detail"))
    })
    .expect("register");
    AppState::new(app, debug)
}

#[test]
fn ui_event_parses_both_shapes() {
    let click: UiEvent = serde_json::from_value(json!({"id": "button", "event": "click"})).expect("click");
    assert_eq!(click, UiEvent::click("button"));

    let set: UiEvent =
        serde_json::from_value(json!({"id": "user_input", "property": "value", "value": "x"})).expect("set");
    assert_eq!(set, UiEvent::set("user_input", "value", json!("x")));

    let no_value: UiEvent = serde_json::from_value(json!({"id": "a", "property": "value"})).expect("set");
    assert_eq!(no_value, UiEvent::set("a", "value", Value::Null));

    assert!(serde_json::from_value::<UiEvent>(json!({"id": "a"})).is_err());
    assert!(serde_json::from_value::<UiEvent>(json!({"id": "a", "event": "hover"})).is_err());
}

#[tokio::test]
async fn handle_event_runs_demo_callback() {
    let state = test_helpers::test_app_state(false);
    handle_event(&state, UiEvent::set("user_input", "value", json!("Guns 'n Roses")), None)
        .await
        .expect("set");
    let report = handle_event(&state, UiEvent::click("button"), None)
        .await
        .expect("click");

    assert_eq!(report.patches.len(), 2);
    assert_eq!(
        report.patches[1].value,
        json!("The input value was \"Guns 'n Roses\" and the button has been clicked 1 times")
    );
}

#[tokio::test]
async fn handle_event_rejects_unknown_binding() {
    let state = test_helpers::test_app_state(false);
    let err = handle_event(&state, UiEvent::set("nope", "value", json!(1)), None)
        .await
        .unwrap_err();
    assert!(matches!(err, RegistryError::UnknownBinding(_)));
}

#[tokio::test]
async fn callback_errors_are_redacted_outside_debug() {
    let state = failing_state(false);
    let report = handle_event(&state, UiEvent::set("in", "value", json!(1)), None)
        .await
        .expect("dispatch");
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].message, REDACTED_MESSAGE);
    assert_eq!(report.errors[0].output.to_string(), "out.children");
}

#[tokio::test]
async fn callback_errors_keep_detail_in_debug() {
    let state = failing_state(true);
    let report = handle_event(&state, UiEvent::set("in", "value", json!(1)), None)
        .await
        .expect("dispatch");
    assert_eq!(report.errors[0].message, "secret stack detail");

    let snapshot = layout(&state).await;
    assert_eq!(snapshot["children"][1]["props"]["children"], "idle");
}

#[tokio::test]
async fn dependencies_expose_demo_callback() {
    let state = test_helpers::test_app_state(false);
    let deps = dependencies(&state).await;
    assert_eq!(deps.len(), 1);
    assert_eq!(deps[0].output, "output_container_button.children");
    assert_eq!(deps[0].inputs, vec!["button.n_clicks".to_string()]);
    assert_eq!(deps[0].state, vec!["user_input.value".to_string()]);
}

#[tokio::test]
async fn handle_event_queues_patches_for_everyone_but_origin() {
    let state = test_helpers::test_app_state(false);
    let (origin, mut origin_rx) = test_helpers::seed_client(&state).await;
    let (_peer, mut peer_rx) = test_helpers::seed_client(&state).await;

    let report = handle_event(&state, UiEvent::click("button"), Some(origin))
        .await
        .expect("click");

    // Queued before the call returned.
    let notice = peer_rx.try_recv().expect("peer should have a patch frame");
    assert_eq!(notice.syscall, "prop:patch");
    assert_eq!(notice.status, Status::Request);
    assert_eq!(notice.from, Some(origin.to_string()));
    assert_eq!(notice.data["patches"], json!(report.patches));
    assert!(origin_rx.try_recv().is_err());
}

#[tokio::test]
async fn http_events_reach_every_client() {
    let state = test_helpers::test_app_state(false);
    let (_a, mut rx_a) = test_helpers::seed_client(&state).await;
    let (_b, mut rx_b) = test_helpers::seed_client(&state).await;

    handle_event(&state, UiEvent::set("user_input", "value", json!("x")), None)
        .await
        .expect("set");

    for rx in [&mut rx_a, &mut rx_b] {
        let notice = rx.try_recv().expect("every client gets the patch");
        assert!(notice.from.is_none());
        assert_eq!(notice.data["patches"][0]["value"], "x");
    }
}

#[tokio::test]
async fn failed_events_are_not_broadcast() {
    let state = test_helpers::test_app_state(false);
    let (_peer, mut peer_rx) = test_helpers::seed_client(&state).await;

    let err = handle_event(&state, UiEvent::set("button", "n_clicks", json!(2.5)), None)
        .await
        .unwrap_err();

    assert!(matches!(err, RegistryError::InvalidValue { .. }));
    assert!(peer_rx.try_recv().is_err());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn peers_receive_concurrent_events_in_dispatch_order() {
    let state = test_helpers::test_app_state(false);
    let (_peer, mut peer_rx) = test_helpers::seed_client(&state).await;

    let tasks: Vec<_> = (0..12)
        .map(|n| {
            let state = state.clone();
            tokio::spawn(async move {
                handle_event(&state, UiEvent::set("user_input", "value", json!(n)), None)
                    .await
                    .expect("set");
            })
        })
        .collect();
    for task in tasks {
        task.await.expect("task");
    }

    let mut last = None;
    while let Ok(notice) = peer_rx.try_recv() {
        last = Some(notice.data["patches"][0]["value"].clone());
    }
    let app = state.app.lock().await;
    let current = app
        .engine()
        .registry()
        .get(&Binding::new("user_input", Prop::Value))
        .cloned()
        .ok();
    assert!(current.is_some());
    assert_eq!(last, current);
}
