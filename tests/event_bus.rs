//! Scenario tests for `EventBus`: registration-order dispatch, error
//! isolation, max-listener enforcement, and blocking `wait_for`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use knowledge_graph_engine::EventBus;

#[test]
fn emit_returns_false_with_no_handlers() {
    let bus = EventBus::new();
    assert!(!bus.emit("nothing:happened", serde_json::json!(null)));
}

#[test]
fn handlers_run_in_registration_order_and_errors_do_not_abort_others() {
    let bus = EventBus::new();
    let order = Arc::new(std::sync::Mutex::new(Vec::new()));

    let order_1 = order.clone();
    bus.on("information:afterAdd", move |_| {
        order_1.lock().unwrap().push(1);
        Err("boom".to_string())
    })
    .unwrap();

    let order_2 = order.clone();
    bus.on("information:afterAdd", move |_| {
        order_2.lock().unwrap().push(2);
        Ok(())
    })
    .unwrap();

    let existed = bus.emit("information:afterAdd", serde_json::json!("n1"));
    assert!(existed);
    assert_eq!(*order.lock().unwrap(), vec![1, 2]);
}

#[test]
fn once_handler_unsubscribes_after_first_delivery() {
    let bus = EventBus::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let calls_clone = calls.clone();
    bus.once("knowledge:afterConnect", move |_| {
        calls_clone.fetch_add(1, Ordering::SeqCst);
        Ok(())
    })
    .unwrap();

    bus.emit("knowledge:afterConnect", serde_json::json!(null));
    bus.emit("knowledge:afterConnect", serde_json::json!(null));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn max_listeners_is_enforced() {
    let bus = EventBus::with_max_listeners(1);
    bus.on("capped", |_| Ok(())).unwrap();
    assert!(bus.on("capped", |_| Ok(())).is_err());
}

#[test]
fn wait_for_resolves_from_another_thread() {
    let bus = Arc::new(EventBus::new());
    let emitter = bus.clone();
    let handle = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(20));
        emitter.emit("experience:afterRecord", serde_json::json!({"id": "e1"}));
    });

    let payload = bus.wait_for("experience:afterRecord", Duration::from_secs(1)).unwrap();
    assert_eq!(payload["id"], "e1");
    handle.join().unwrap();
}

#[test]
fn wait_for_times_out_with_no_emission() {
    let bus = EventBus::new();
    let err = bus.wait_for("never:happens", Duration::from_millis(20));
    assert!(err.is_err());
}

#[test]
fn namespace_rewrites_event_names_in_both_directions() {
    let bus = EventBus::new();
    let namespace = bus.create_namespace("strategy");
    let calls = Arc::new(AtomicUsize::new(0));
    let calls_clone = calls.clone();
    namespace
        .on("afterPlan", move |_| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .unwrap();

    bus.emit("strategy:afterPlan", serde_json::json!(null));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
