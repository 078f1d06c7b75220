//! End-to-end exercises of the public API surface

use evbus::bus::api::{
    priority, EventError, EventManager, Listener, ListenerFn, ManagerOptions, MatchMode,
    Subscriber, Subscription,
};
use evbus::event::api::{CancelToken, Event, EventData};
use serde_json::json;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

/// A component that audits user events at several levels at once.
struct UserAudit {
    log: Arc<Mutex<Vec<String>>>,
}

impl UserAudit {
    fn record(log: &Arc<Mutex<Vec<String>>>, tag: &str) -> Arc<dyn Listener> {
        let log = Arc::clone(log);
        let tag = tag.to_string();
        Arc::new(ListenerFn::new(move |event: &mut Event| {
            log.lock().unwrap().push(format!("{}:{}", tag, event.name()));
            Ok(())
        }))
    }
}

impl Subscriber for UserAudit {
    fn subscriptions(&self) -> Vec<Subscription> {
        vec![
            Subscription::with_priority(
                "app.user.add",
                Self::record(&self.log, "exact"),
                priority::HIGH,
            ),
            Subscription::new("app.user.*", Self::record(&self.log, "group")),
            Subscription::with_priority("*", Self::record(&self.log, "all"), priority::LOW),
        ]
    }
}

#[test]
fn test_subscriber_driven_simple_cascade() {
    let bus = EventManager::new("app");
    let log = Arc::new(Mutex::new(Vec::new()));
    let ids = bus
        .subscribe(&UserAudit {
            log: Arc::clone(&log),
        })
        .unwrap();
    assert_eq!(ids.len(), 3);

    bus.fire("app.user.add", EventData::new()).unwrap();
    assert_eq!(
        *log.lock().unwrap(),
        vec![
            "exact:app.user.add",
            "group:app.user.add",
            "all:app.user.add"
        ]
    );

    log.lock().unwrap().clear();
    bus.fire("app.user.del", EventData::new()).unwrap();
    assert_eq!(
        *log.lock().unwrap(),
        vec!["group:app.user.del", "all:app.user.del"]
    );
}

#[test]
fn test_path_mode_prefix_routing() {
    let bus = EventManager::with_options(
        "storage",
        ManagerOptions {
            match_mode: MatchMode::Path,
            ..Default::default()
        },
    );
    let hits = Arc::new(AtomicU32::new(0));

    let seen = Arc::clone(&hits);
    bus.on_fn("db.**", move |_| {
        seen.fetch_add(1, Ordering::SeqCst);
        Ok(())
    })
    .unwrap();

    for name in ["db.user.add", "db.user.del", "db.migrate"] {
        bus.fire(name, EventData::new()).unwrap();
    }
    bus.fire("cache.evict", EventData::new()).unwrap();

    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[test]
fn test_pipeline_with_data_and_abort() {
    let bus = EventManager::new("pipeline");

    bus.on_fn_with(
        "order.submit",
        |event| {
            let total = event.get("total").and_then(|v| v.as_i64()).unwrap_or(0);
            if total <= 0 {
                event.set("rejected", true);
                event.abort(true);
            }
            Ok(())
        },
        priority::HIGH,
    )
    .unwrap();
    bus.on_fn("order.submit", |event| {
        event.set("accepted", true);
        Ok(())
    })
    .unwrap();

    let accepted = bus
        .fire("order.submit", EventData::from([("total".to_string(), json!(120))]))
        .unwrap();
    assert_eq!(accepted.get("accepted"), Some(&json!(true)));

    let rejected = bus
        .fire("order.submit", EventData::from([("total".to_string(), json!(0))]))
        .unwrap();
    assert!(rejected.is_aborted());
    assert_eq!(rejected.get("accepted"), None);
    assert_eq!(rejected.get("rejected"), Some(&json!(true)));
}

#[test]
fn test_async_pool_lifecycle() {
    let bus = Arc::new(EventManager::with_options(
        "jobs",
        ManagerOptions {
            channel_size: 2,
            consumer_count: 2,
            ..Default::default()
        },
    ));
    let processed = Arc::new(AtomicU32::new(0));

    let seen = Arc::clone(&processed);
    bus.on_fn("job.run", move |_| {
        seen.fetch_add(1, Ordering::SeqCst);
        Ok(())
    })
    .unwrap();

    for id in 0..10 {
        bus.fire_async(Event::new("job.run").with("id", id)).unwrap();
    }
    bus.close_wait().unwrap();
    assert_eq!(processed.load(Ordering::SeqCst), 10);

    // closed stays closed
    assert_eq!(bus.fire_async(Event::new("job.run")), Err(EventError::Closed));
}

#[test]
fn test_cancel_token_stops_long_dispatch() {
    let bus = Arc::new(EventManager::new("cancellable"));
    let invoked = Arc::new(AtomicU32::new(0));

    for _ in 0..5 {
        let invoked = Arc::clone(&invoked);
        bus.on_fn("batch.step", move |_| {
            invoked.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .unwrap();
    }

    let token = CancelToken::new();
    token.cancel();
    let result = bus.await_fire(Event::new("batch.step").with_cancel_token(token));

    assert!(matches!(result, Err(EventError::Cancelled { .. })));
    assert_eq!(invoked.load(Ordering::SeqCst), 0);
}
