// ── Event abstraction ──
//
// "Subscribe a listener, get back a disposable that cancels that
// subscription." An event is not a stream of already-emitted values --
// each subscription only observes future emissions. Listeners run
// synchronously in the firing call's context, in subscription order.
//
// Registries are mutex-guarded so the types are Send/Sync and usable from
// async tasks, but delivery itself never crosses a thread or task boundary.
// Listeners must not re-enter `fire` on the emitter currently delivering
// to them.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::dispose::{Disposable, DisposeGuard, combined, to_disposable};

/// A registered callback. Shared so `fire` can snapshot the registry and
/// invoke listeners outside the registry lock -- a listener may then
/// dispose subscriptions (its own included) mid-delivery.
type Listener<T> = Arc<Mutex<dyn FnMut(&T) + Send>>;

/// Absorb mutex poisoning: a panicking listener must not wedge the registry.
fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn invoke<T>(listener: &Listener<T>, value: &T) {
    let mut callback = lock(listener);
    (&mut *callback)(value);
}

// ── Registry ────────────────────────────────────────────────────────

struct Registry<T> {
    inner: Mutex<RegistryInner<T>>,
}

struct RegistryInner<T> {
    next_id: u64,
    entries: Vec<(u64, Listener<T>)>,
    closed: bool,
}

impl<T: 'static> Registry<T> {
    fn attach(registry: &Arc<Self>, listener: Listener<T>) -> DisposeGuard {
        let mut inner = lock(&registry.inner);
        if inner.closed {
            debug!("subscribe on a closed event source; returning inert handle");
            return DisposeGuard::noop();
        }

        let id = inner.next_id;
        inner.next_id += 1;
        inner.entries.push((id, listener));
        drop(inner);

        let registry = Arc::clone(registry);
        to_disposable(move || {
            let mut inner = lock(&registry.inner);
            inner.entries.retain(|(entry_id, _)| *entry_id != id);
        })
    }
}

// ── EventEmitter ────────────────────────────────────────────────────

/// The producing side of an [`Event`].
///
/// `event()` hands out the subscribable surface; [`fire`](Self::fire)
/// delivers a value to every live listener. Dropping the emitter closes
/// the registry: listeners are released and later subscriptions return
/// an inert handle.
pub struct EventEmitter<T> {
    registry: Arc<Registry<T>>,
}

impl<T: 'static> EventEmitter<T> {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Registry {
                inner: Mutex::new(RegistryInner {
                    next_id: 0,
                    entries: Vec::new(),
                    closed: false,
                }),
            }),
        }
    }

    /// The subscribable surface for this emitter. Cheap to call repeatedly.
    pub fn event(&self) -> Event<T> {
        let registry = Arc::clone(&self.registry);
        Event {
            subscribe: Arc::new(move |listener| Registry::attach(&registry, listener)),
        }
    }

    /// Deliver `value` to every live listener, in subscription order.
    ///
    /// Listeners registered or disposed by a listener during delivery take
    /// effect from the next `fire` onwards; the current delivery uses the
    /// registry as it was when `fire` began.
    pub fn fire(&self, value: T) {
        let snapshot: Vec<Listener<T>> = {
            let inner = lock(&self.registry.inner);
            inner.entries.iter().map(|(_, l)| Arc::clone(l)).collect()
        };
        for listener in snapshot {
            invoke(&listener, &value);
        }
    }

    /// Whether any subscription is currently live.
    pub fn has_listeners(&self) -> bool {
        !lock(&self.registry.inner).entries.is_empty()
    }
}

impl<T: 'static> Default for EventEmitter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for EventEmitter<T> {
    fn drop(&mut self) {
        let mut inner = lock(&self.registry.inner);
        inner.closed = true;
        if !inner.entries.is_empty() {
            debug!(
                listeners = inner.entries.len(),
                "event emitter dropped with live subscriptions"
            );
        }
        inner.entries.clear();
    }
}

// ── Event ───────────────────────────────────────────────────────────

/// The consuming side: subscribe a listener, get back a disposable.
///
/// Cheaply cloneable; clones share the underlying source.
pub struct Event<T> {
    subscribe: Arc<dyn Fn(Listener<T>) -> DisposeGuard + Send + Sync>,
}

impl<T> Clone for Event<T> {
    fn clone(&self) -> Self {
        Self {
            subscribe: Arc::clone(&self.subscribe),
        }
    }
}

/// State for a `once` subscription. `Fired` doubles as the tombstone for
/// an explicit dispose, so delivery is at-most-once on every interleaving.
enum OnceState {
    /// Subscribed, inner handle not yet stored.
    Pending,
    /// Inner handle stored, no delivery yet.
    Armed(DisposeGuard),
    /// Delivered or disposed.
    Fired,
}

impl<T: 'static> Event<T> {
    /// Register `listener` for every future emission.
    pub fn subscribe<F>(&self, listener: F) -> DisposeGuard
    where
        F: FnMut(&T) + Send + 'static,
    {
        self.attach(Arc::new(Mutex::new(listener)))
    }

    fn attach(&self, listener: Listener<T>) -> DisposeGuard {
        (self.subscribe)(listener)
    }

    /// Derived event forwarding only emissions for which `predicate` holds.
    /// Disposal forwards to the underlying subscription.
    pub fn filter<P>(&self, predicate: P) -> Event<T>
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let source = self.clone();
        let predicate = Arc::new(predicate);
        Event {
            subscribe: Arc::new(move |listener: Listener<T>| {
                let predicate = Arc::clone(&predicate);
                let wrapped: Listener<T> = Arc::new(Mutex::new(move |value: &T| {
                    if predicate(value) {
                        invoke(&listener, value);
                    }
                }));
                source.attach(wrapped)
            }),
        }
    }

    /// Derived event forwarding `f(&value)` for every emission.
    /// Disposal forwards to the underlying subscription.
    pub fn map<U, F>(&self, f: F) -> Event<U>
    where
        U: 'static,
        F: Fn(&T) -> U + Send + Sync + 'static,
    {
        let source = self.clone();
        let f = Arc::new(f);
        Event {
            subscribe: Arc::new(move |listener: Listener<U>| {
                let f = Arc::clone(&f);
                let wrapped: Listener<T> = Arc::new(Mutex::new(move |value: &T| {
                    let mapped = f(value);
                    invoke(&listener, &mapped);
                }));
                source.attach(wrapped)
            }),
        }
    }

    /// Derived event delivering at most one value per subscription.
    ///
    /// On first firing the subscription takes itself down before invoking
    /// the listener, so a second emission from the source can never reach it.
    pub fn once(&self) -> Event<T> {
        let source = self.clone();
        Event {
            subscribe: Arc::new(move |listener: Listener<T>| {
                let state = Arc::new(Mutex::new(OnceState::Pending));

                let wrapper_state = Arc::clone(&state);
                let wrapped: Listener<T> = Arc::new(Mutex::new(move |value: &T| {
                    let previous = {
                        let mut s = lock(&wrapper_state);
                        std::mem::replace(&mut *s, OnceState::Fired)
                    };
                    match previous {
                        // Already delivered or disposed.
                        OnceState::Fired => {}
                        OnceState::Pending => invoke(&listener, value),
                        OnceState::Armed(mut inner) => {
                            inner.dispose();
                            invoke(&listener, value);
                        }
                    }
                }));
                let inner = source.attach(wrapped);

                // Arm, unless the first emission already won the race.
                {
                    let mut s = lock(&state);
                    if matches!(*s, OnceState::Fired) {
                        drop(s);
                        let mut inner = inner;
                        inner.dispose();
                    } else {
                        *s = OnceState::Armed(inner);
                    }
                }

                to_disposable(move || {
                    let previous = {
                        let mut s = lock(&state);
                        std::mem::replace(&mut *s, OnceState::Fired)
                    };
                    if let OnceState::Armed(mut inner) = previous {
                        inner.dispose();
                    }
                })
            }),
        }
    }
}

/// Merge events: subscribing subscribes to every input; firing any input
/// fires the merged event with that value; disposing unsubscribes from all.
pub fn any_event<T, I>(events: I) -> Event<T>
where
    T: 'static,
    I: IntoIterator<Item = Event<T>>,
{
    let sources: Vec<Event<T>> = events.into_iter().collect();
    Event {
        subscribe: Arc::new(move |listener: Listener<T>| {
            let guards: Vec<DisposeGuard> = sources
                .iter()
                .map(|source| source.attach(Arc::clone(&listener)))
                .collect();
            combined(guards)
        }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::sync::Mutex;

    use pretty_assertions::assert_eq;

    use super::*;

    fn recording_subscription(event: &Event<i32>) -> (Arc<Mutex<Vec<i32>>>, DisposeGuard) {
        let seen: Arc<Mutex<Vec<i32>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let guard = event.subscribe(move |value| sink.lock().unwrap().push(*value));
        (seen, guard)
    }

    #[test]
    fn listeners_receive_fired_values_in_order() {
        let emitter = EventEmitter::new();
        let (seen, _guard) = recording_subscription(&emitter.event());

        emitter.fire(1);
        emitter.fire(2);
        emitter.fire(3);

        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn disposal_stops_delivery() {
        let emitter = EventEmitter::new();
        let (seen, mut guard) = recording_subscription(&emitter.event());

        emitter.fire(1);
        guard.dispose();
        emitter.fire(2);

        assert_eq!(*seen.lock().unwrap(), vec![1]);
        assert!(!emitter.has_listeners());
    }

    #[test]
    fn subscription_only_sees_future_emissions() {
        let emitter = EventEmitter::new();
        emitter.fire(1);

        let (seen, _guard) = recording_subscription(&emitter.event());
        emitter.fire(2);

        assert_eq!(*seen.lock().unwrap(), vec![2]);
    }

    #[test]
    fn filter_forwards_matching_emissions_only() {
        let emitter = EventEmitter::new();
        let evens = emitter.event().filter(|value| value % 2 == 0);
        let (seen, _guard) = recording_subscription(&evens);

        for value in 1..=6 {
            emitter.fire(value);
        }

        assert_eq!(*seen.lock().unwrap(), vec![2, 4, 6]);
    }

    #[test]
    fn map_transforms_emissions() {
        let emitter = EventEmitter::new();
        let doubled = emitter.event().map(|value: &i32| value * 2);
        let (seen, _guard) = recording_subscription(&doubled);

        emitter.fire(1);
        emitter.fire(2);

        assert_eq!(*seen.lock().unwrap(), vec![2, 4]);
    }

    #[test]
    fn once_delivers_exactly_one_value() {
        let emitter = EventEmitter::new();
        let first = emitter.event().once();
        let (seen, _guard) = recording_subscription(&first);

        emitter.fire(7);
        emitter.fire(8);

        assert_eq!(*seen.lock().unwrap(), vec![7]);
        assert!(!emitter.has_listeners());
    }

    #[test]
    fn once_disposed_before_firing_never_delivers() {
        let emitter = EventEmitter::new();
        let first = emitter.event().once();
        let (seen, mut guard) = recording_subscription(&first);

        guard.dispose();
        emitter.fire(7);

        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn any_event_merges_sources_and_unsubscribes_from_all() {
        let left = EventEmitter::new();
        let right = EventEmitter::new();
        let merged = any_event([left.event(), right.event()]);
        let (seen, mut guard) = recording_subscription(&merged);

        left.fire(1);
        right.fire(2);
        left.fire(3);

        guard.dispose();
        left.fire(4);
        right.fire(5);

        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3]);
        assert!(!left.has_listeners());
        assert!(!right.has_listeners());
    }

    #[test]
    fn listener_may_dispose_its_own_subscription_mid_delivery() {
        let emitter = EventEmitter::new();
        let count = Arc::new(Mutex::new(0u32));
        let slot: Arc<Mutex<Option<DisposeGuard>>> = Arc::new(Mutex::new(None));

        let sink = Arc::clone(&count);
        let self_slot = Arc::clone(&slot);
        let guard = emitter.event().subscribe(move |_: &i32| {
            *sink.lock().unwrap() += 1;
            if let Some(mut own) = self_slot.lock().unwrap().take() {
                own.dispose();
            }
        });
        *slot.lock().unwrap() = Some(guard);

        emitter.fire(0);
        emitter.fire(0);

        assert_eq!(*count.lock().unwrap(), 1);
    }

    #[test]
    fn subscribe_after_emitter_drop_returns_inert_handle() {
        let emitter = EventEmitter::new();
        let event = emitter.event();
        drop(emitter);

        let (seen, mut guard) = recording_subscription(&event);
        guard.dispose();

        assert!(seen.lock().unwrap().is_empty());
    }
}
