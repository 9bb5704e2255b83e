//! A named-event publish/subscribe bus with bounded listener counts,
//! error-isolated dispatch, `once` subscriptions, filtered views, and
//! namespacing.
//!
//! The core is specified as a single-threaded cooperative system (see
//! SPEC_FULL.md §5), so there is no executor to hand `emitAsync`/`waitFor`
//! off to. `emit_async` simply runs handlers synchronously in registration
//! order; `wait_for` is a blocking call bounded by a `Duration` timeout,
//! backed by a `Condvar`, which satisfies the "resolves on next emission or
//! times out" contract without pulling in an async runtime the core
//! otherwise has no use for.

use std::collections::HashMap;
use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

use crate::types::{GraphError, GraphResult};

/// The value carried by an emitted event. Payloads are the entity or id
/// acted upon, modeled as JSON so producers aren't forced into one
/// concrete Rust type.
pub type EventPayload = serde_json::Value;

/// A subscription handle returned by `on`/`once`, used to `off` later.
pub type ListenerId = u64;

type HandlerFn = Box<dyn FnMut(&EventPayload) -> Result<(), String> + Send>;

struct HandlerEntry {
    id: ListenerId,
    once: bool,
    callback: HandlerFn,
}

struct Inner {
    handlers: HashMap<String, Vec<HandlerEntry>>,
    max_listeners: usize,
    next_id: ListenerId,
    generations: HashMap<String, u64>,
    last_payload: HashMap<String, EventPayload>,
}

/// Named-event publish/subscribe bus.
pub struct EventBus {
    inner: Mutex<Inner>,
    cond: Condvar,
}

impl EventBus {
    /// Default per-event listener cap, matching the teacher's conservative
    /// defaults for bounded resources.
    pub const DEFAULT_MAX_LISTENERS: usize = 64;

    /// Create a new bus with the default listener cap.
    pub fn new() -> Self {
        Self::with_max_listeners(Self::DEFAULT_MAX_LISTENERS)
    }

    /// Create a new bus with an explicit per-event listener cap.
    pub fn with_max_listeners(max_listeners: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                handlers: HashMap::new(),
                max_listeners,
                next_id: 0,
                generations: HashMap::new(),
                last_payload: HashMap::new(),
            }),
            cond: Condvar::new(),
        }
    }

    /// Subscribe a handler to `event`, invoked on every future emission in
    /// registration order. Fails with `ConstraintViolation` if this would
    /// exceed `max_listeners` for this event name.
    pub fn on(
        &self,
        event: &str,
        handler: impl FnMut(&EventPayload) -> Result<(), String> + Send + 'static,
    ) -> GraphResult<ListenerId> {
        self.subscribe(event, handler, false)
    }

    /// Subscribe a handler that auto-unsubscribes after its first delivery.
    pub fn once(
        &self,
        event: &str,
        handler: impl FnMut(&EventPayload) -> Result<(), String> + Send + 'static,
    ) -> GraphResult<ListenerId> {
        self.subscribe(event, handler, true)
    }

    fn subscribe(
        &self,
        event: &str,
        handler: impl FnMut(&EventPayload) -> Result<(), String> + Send + 'static,
        once: bool,
    ) -> GraphResult<ListenerId> {
        let mut inner = self.inner.lock().unwrap();
        let list = inner.handlers.entry(event.to_string()).or_default();
        if list.len() >= inner.max_listeners {
            return Err(GraphError::ConstraintViolation(format!(
                "max listeners ({}) exceeded for event {event:?}",
                inner.max_listeners
            )));
        }
        let id = inner.next_id;
        inner.next_id += 1;
        inner.handlers.entry(event.to_string()).or_default().push(HandlerEntry {
            id,
            once,
            callback: Box::new(handler),
        });
        Ok(id)
    }

    /// Remove a single listener by id. No-op if unknown.
    pub fn off(&self, event: &str, id: ListenerId) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(list) = inner.handlers.get_mut(event) {
            list.retain(|entry| entry.id != id);
        }
    }

    /// Remove listeners. With `event = None`, clears every event's
    /// listeners.
    pub fn remove_all_listeners(&self, event: Option<&str>) {
        let mut inner = self.inner.lock().unwrap();
        match event {
            Some(name) => {
                inner.handlers.remove(name);
            }
            None => inner.handlers.clear(),
        }
    }

    /// Emit `event` synchronously. Returns `true` iff at least one handler
    /// existed. A handler returning `Err` does not stop the others; the
    /// error is routed to `log::error!` (the error-handler of record for
    /// this single-process engine).
    pub fn emit(&self, event: &str, payload: EventPayload) -> bool {
        let existed = self.dispatch(event, &payload);
        self.record_emission(event, payload);
        existed
    }

    /// Emit `event`, running handlers in registration order. Named to match
    /// the spec's async dispatch path; see the module doc for why this is
    /// synchronous in this single-threaded core.
    pub fn emit_async(&self, event: &str, payload: EventPayload) -> bool {
        self.emit(event, payload)
    }

    fn dispatch(&self, event: &str, payload: &EventPayload) -> bool {
        let mut inner = self.inner.lock().unwrap();
        let Some(list) = inner.handlers.get_mut(event) else {
            return false;
        };
        if list.is_empty() {
            return false;
        }
        let mut to_remove = Vec::new();
        for entry in list.iter_mut() {
            if let Err(e) = (entry.callback)(payload) {
                log::error!("event handler for {event:?} failed: {e}");
            }
            if entry.once {
                to_remove.push(entry.id);
            }
        }
        if !to_remove.is_empty() {
            list.retain(|entry| !to_remove.contains(&entry.id));
        }
        true
    }

    fn record_emission(&self, event: &str, payload: EventPayload) {
        let mut inner = self.inner.lock().unwrap();
        *inner.generations.entry(event.to_string()).or_insert(0) += 1;
        inner.last_payload.insert(event.to_string(), payload);
        drop(inner);
        self.cond.notify_all();
    }

    /// Block until `event` is next emitted, or until `timeout` elapses.
    /// Resolves with the payload of that emission.
    pub fn wait_for(&self, event: &str, timeout: Duration) -> GraphResult<EventPayload> {
        let deadline = Instant::now() + timeout;
        let inner = self.inner.lock().unwrap();
        let start_gen = *inner.generations.get(event).unwrap_or(&0);
        let mut guard = inner;
        loop {
            let current_gen = *guard.generations.get(event).unwrap_or(&0);
            if current_gen > start_gen {
                return Ok(guard.last_payload.get(event).cloned().unwrap_or(EventPayload::Null));
            }
            let now = Instant::now();
            if now >= deadline {
                return Err(GraphError::Timeout(event.to_string(), timeout));
            }
            let (g, result) = self.cond.wait_timeout(guard, deadline - now).unwrap();
            guard = g;
            if result.timed_out() {
                let current_gen = *guard.generations.get(event).unwrap_or(&0);
                if current_gen > start_gen {
                    return Ok(guard.last_payload.get(event).cloned().unwrap_or(EventPayload::Null));
                }
                return Err(GraphError::Timeout(event.to_string(), timeout));
            }
        }
    }

    /// Number of listeners currently registered for `event`.
    pub fn listener_count(&self, event: &str) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.handlers.get(event).map(|v| v.len()).unwrap_or(0)
    }

    /// Create a restricted view over `event` that only invokes handlers
    /// when `predicate` holds for the payload.
    pub fn filter<'a>(
        &'a self,
        event: &str,
        predicate: impl Fn(&EventPayload) -> bool + Send + Sync + 'static,
    ) -> FilteredView<'a> {
        FilteredView {
            bus: self,
            event: event.to_string(),
            predicate: std::sync::Arc::new(predicate),
        }
    }

    /// Create a namespaced sub-bus. `namespace.on("foo", ...)` subscribes to
    /// `"prefix:foo"` on the parent bus; `namespace.emit("foo", ...)` emits
    /// `"prefix:foo"`. The rewrite is transparent in both directions because
    /// the namespace is just a thin name-prefixing wrapper over the same
    /// underlying bus.
    pub fn create_namespace<'a>(&'a self, prefix: &str) -> Namespace<'a> {
        Namespace {
            bus: self,
            prefix: prefix.to_string(),
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// A restricted view over one event name, created by `EventBus::filter`.
pub struct FilteredView<'a> {
    bus: &'a EventBus,
    event: String,
    predicate: std::sync::Arc<dyn Fn(&EventPayload) -> bool + Send + Sync>,
}

impl<'a> FilteredView<'a> {
    /// Subscribe a handler that only runs when the filter predicate holds.
    pub fn on(
        &self,
        mut handler: impl FnMut(&EventPayload) -> Result<(), String> + Send + 'static,
    ) -> GraphResult<ListenerId> {
        let predicate = self.predicate.clone();
        self.bus.on(&self.event, move |payload| {
            if predicate(payload) {
                handler(payload)
            } else {
                Ok(())
            }
        })
    }
}

/// A namespaced view over an `EventBus`, created by `EventBus::create_namespace`.
pub struct Namespace<'a> {
    bus: &'a EventBus,
    prefix: String,
}

impl<'a> Namespace<'a> {
    fn qualify(&self, local: &str) -> String {
        format!("{}:{}", self.prefix, local)
    }

    /// Subscribe to a locally-named event; the registration is on
    /// `"prefix:local"` in the parent bus.
    pub fn on(
        &self,
        local_event: &str,
        handler: impl FnMut(&EventPayload) -> Result<(), String> + Send + 'static,
    ) -> GraphResult<ListenerId> {
        self.bus.on(&self.qualify(local_event), handler)
    }

    /// Emit a locally-named event; actually emits `"prefix:local"` on the
    /// parent bus.
    pub fn emit(&self, local_event: &str, payload: EventPayload) -> bool {
        self.bus.emit(&self.qualify(local_event), payload)
    }
}
