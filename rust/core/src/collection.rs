// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Observable collection of resident models.
//!
//! The collection is the single source of truth for which models are
//! loaded. Mutations publish events two ways:
//!
//! - **Observers** are synchronous callbacks registered with
//!   [`ModelCollection::observe`]. They receive the model itself and run
//!   after the internal lock is released, so they may read the collection.
//! - **Subscribers** receive a serializable [`ModelEvent`] over a tokio
//!   broadcast channel. Slow subscribers may lag and miss events.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Change delivered to observers.
pub enum CollectionEvent<'a, M> {
    Set { model_id: &'a str, model: &'a Arc<M> },
    Deleted { model_id: &'a str },
}

/// Change delivered to broadcast subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModelEvent {
    /// A model was inserted or replaced.
    Set { model_id: String, size: usize },
    /// A model was removed.
    Deleted { model_id: String, size: usize },
}

/// Handle returned by [`ModelCollection::observe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

type Observer<M> = Arc<dyn Fn(&CollectionEvent<'_, M>) + Send + Sync>;

/// Map of model id to resident model with change notification.
pub struct ModelCollection<M> {
    items: RwLock<FxHashMap<String, Arc<M>>>,
    observers: RwLock<Vec<(ObserverId, Observer<M>)>>,
    next_observer: AtomicU64,
    events: broadcast::Sender<ModelEvent>,
}

impl<M> ModelCollection<M> {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            items: RwLock::new(FxHashMap::default()),
            observers: RwLock::new(Vec::new()),
            next_observer: AtomicU64::new(0),
            events,
        }
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    pub fn contains(&self, model_id: &str) -> bool {
        self.items.read().contains_key(model_id)
    }

    pub fn get(&self, model_id: &str) -> Option<Arc<M>> {
        self.items.read().get(model_id).cloned()
    }

    /// Resident model ids, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.items.read().keys().cloned().collect();
        keys.sort_unstable();
        keys
    }

    /// Insert a model, returning the one it replaced.
    pub fn set(&self, model_id: impl Into<String>, model: Arc<M>) -> Option<Arc<M>> {
        let model_id = model_id.into();
        let (previous, size) = {
            let mut items = self.items.write();
            let previous = items.insert(model_id.clone(), Arc::clone(&model));
            (previous, items.len())
        };

        self.notify(&CollectionEvent::Set {
            model_id: &model_id,
            model: &model,
        });
        let _ = self.events.send(ModelEvent::Set { model_id, size });
        previous
    }

    /// Remove a model. Returns `None` without notifying if it was absent.
    pub fn delete(&self, model_id: &str) -> Option<Arc<M>> {
        let (removed, size) = {
            let mut items = self.items.write();
            let removed = items.remove(model_id);
            (removed, items.len())
        };

        if removed.is_some() {
            self.notify(&CollectionEvent::Deleted { model_id });
            let _ = self.events.send(ModelEvent::Deleted {
                model_id: model_id.to_string(),
                size,
            });
        }
        removed
    }

    /// Remove every model, notifying once per model.
    pub fn clear(&self) -> usize {
        let mut removed = 0;
        for model_id in self.keys() {
            if self.delete(&model_id).is_some() {
                removed += 1;
            }
        }
        removed
    }

    /// Register a synchronous observer.
    pub fn observe<F>(&self, observer: F) -> ObserverId
    where
        F: Fn(&CollectionEvent<'_, M>) + Send + Sync + 'static,
    {
        let id = ObserverId(self.next_observer.fetch_add(1, Ordering::Relaxed));
        self.observers.write().push((id, Arc::new(observer)));
        id
    }

    /// Detach an observer. Returns whether it was registered.
    pub fn unobserve(&self, id: ObserverId) -> bool {
        let mut observers = self.observers.write();
        let before = observers.len();
        observers.retain(|(existing, _)| *existing != id);
        observers.len() != before
    }

    pub fn observer_count(&self) -> usize {
        self.observers.read().len()
    }

    /// Subscribe to serializable change events.
    pub fn subscribe(&self) -> broadcast::Receiver<ModelEvent> {
        self.events.subscribe()
    }

    fn notify(&self, event: &CollectionEvent<'_, M>) {
        // Clone out so observers can touch the collection without deadlocking.
        let observers: Vec<Observer<M>> = self
            .observers
            .read()
            .iter()
            .map(|(_, observer)| Arc::clone(observer))
            .collect();
        for observer in observers {
            observer(event);
        }
    }
}

impl<M> Default for ModelCollection<M> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn set_and_delete_track_size() {
        let collection = ModelCollection::new();
        assert!(collection.is_empty());

        collection.set("a", Arc::new(1u32));
        collection.set("b", Arc::new(2u32));
        assert_eq!(collection.len(), 2);
        assert_eq!(collection.keys(), vec!["a".to_string(), "b".to_string()]);

        assert!(collection.delete("a").is_some());
        assert!(collection.delete("a").is_none());
        assert_eq!(collection.len(), 1);
    }

    #[test]
    fn set_replaces_existing_id() {
        let collection = ModelCollection::new();
        assert!(collection.set("a", Arc::new(1u32)).is_none());
        let previous = collection.set("a", Arc::new(2u32));
        assert_eq!(previous.as_deref(), Some(&1));
        assert_eq!(collection.len(), 1);
        assert_eq!(collection.get("a").as_deref(), Some(&2));
    }

    #[test]
    fn observers_see_changes_after_lock_release() {
        let collection: Arc<ModelCollection<u32>> = Arc::new(ModelCollection::new());
        let seen = Arc::new(Mutex::new(Vec::new()));

        let seen_in = Arc::clone(&seen);
        let weak = Arc::downgrade(&collection);
        collection.observe(move |event| {
            let size = weak.upgrade().map(|c| c.len()).unwrap_or_default();
            let entry = match event {
                CollectionEvent::Set { model_id, .. } => format!("set {} {}", model_id, size),
                CollectionEvent::Deleted { model_id } => format!("deleted {} {}", model_id, size),
            };
            seen_in.lock().push(entry);
        });

        collection.set("a", Arc::new(1));
        collection.delete("a");
        collection.delete("missing");

        assert_eq!(*seen.lock(), vec!["set a 1", "deleted a 0"]);
    }

    #[test]
    fn unobserve_detaches() {
        let collection: ModelCollection<u32> = ModelCollection::new();
        let hits = Arc::new(AtomicU64::new(0));
        let hits_in = Arc::clone(&hits);
        let id = collection.observe(move |_| {
            hits_in.fetch_add(1, Ordering::SeqCst);
        });

        collection.set("a", Arc::new(1));
        assert!(collection.unobserve(id));
        assert!(!collection.unobserve(id));
        collection.set("b", Arc::new(2));

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(collection.observer_count(), 0);
    }

    #[test]
    fn clear_empties_and_broadcasts() {
        let collection = ModelCollection::new();
        collection.set("a", Arc::new(1u32));
        collection.set("b", Arc::new(2u32));

        let mut rx = collection.subscribe();
        assert_eq!(collection.clear(), 2);
        assert_eq!(collection.len(), 0);

        assert_eq!(
            rx.try_recv().ok(),
            Some(ModelEvent::Deleted {
                model_id: "a".into(),
                size: 1
            })
        );
        assert_eq!(
            rx.try_recv().ok(),
            Some(ModelEvent::Deleted {
                model_id: "b".into(),
                size: 0
            })
        );
    }
}
