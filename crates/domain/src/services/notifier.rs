//! In-process change notification bus.
//!
//! Listeners subscribe with an optional key filter and a priority. Delivery
//! is synchronous, in descending priority with ties kept in registration
//! order. A failing or panicking listener never affects the broadcaster or
//! other listeners; after repeated consecutive failures it is deactivated
//! until re-enabled.

use crate::models::{ChangeEvent, ChangeEventType, ListenerInfo};
use crate::sync::lock;
use metrics::counter;
use std::collections::{HashMap, VecDeque};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};
use uuid::Uuid;

/// Listener callback. `Err` carries a description of the failure.
pub type ListenerCallback = Arc<dyn Fn(&ChangeEvent) -> Result<(), String> + Send + Sync>;

#[derive(Debug, Clone)]
pub struct NotifierOptions {
    pub history_limit: usize,
    pub max_listener_errors: u32,
}

impl Default for NotifierOptions {
    fn default() -> Self {
        Self {
            history_limit: 1000,
            max_listener_errors: 5,
        }
    }
}

struct Listener {
    id: String,
    callback: ListenerCallback,
    filter_keys: Vec<String>,
    priority: i32,
    is_active: bool,
    error_count: u32,
    /// Distinguishes a re-registered listener from the one it replaced.
    generation: u64,
}

impl Listener {
    fn accepts(&self, key: &str) -> bool {
        self.is_active && (self.filter_keys.is_empty() || self.filter_keys.iter().any(|k| k == key))
    }

    fn info(&self) -> ListenerInfo {
        ListenerInfo {
            listener_id: self.id.clone(),
            filter_keys: self.filter_keys.clone(),
            priority: self.priority,
            is_active: self.is_active,
            error_count: self.error_count,
        }
    }
}

#[derive(Default)]
struct Registry {
    /// Kept sorted by priority, highest first, stable for equal priorities.
    listeners: Vec<Listener>,
    history: VecDeque<ChangeEvent>,
    next_generation: u64,
}

pub struct ChangeNotifier {
    registry: Mutex<Registry>,
    options: NotifierOptions,
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new(NotifierOptions::default())
    }
}

impl ChangeNotifier {
    pub fn new(options: NotifierOptions) -> Self {
        Self {
            registry: Mutex::new(Registry::default()),
            options,
        }
    }

    /// Register a listener. Registering an existing id replaces it.
    pub fn register_listener<F>(
        &self,
        listener_id: impl Into<String>,
        callback: F,
        filter_keys: Vec<String>,
        priority: i32,
    ) where
        F: Fn(&ChangeEvent) -> Result<(), String> + Send + Sync + 'static,
    {
        self.register_callback(listener_id, Arc::new(callback), filter_keys, priority)
    }

    pub fn register_callback(
        &self,
        listener_id: impl Into<String>,
        callback: ListenerCallback,
        filter_keys: Vec<String>,
        priority: i32,
    ) {
        let id = listener_id.into();
        let mut registry = lock(&self.registry);
        registry.listeners.retain(|l| l.id != id);

        let generation = registry.next_generation;
        registry.next_generation += 1;

        let position = registry
            .listeners
            .iter()
            .position(|l| l.priority < priority)
            .unwrap_or(registry.listeners.len());
        debug!(listener_id = %id, priority, "Registered change listener");
        registry.listeners.insert(
            position,
            Listener {
                id,
                callback,
                filter_keys,
                priority,
                is_active: true,
                error_count: 0,
                generation,
            },
        );
    }

    /// Register an unfiltered listener under a generated id.
    pub fn subscribe<F>(&self, callback: F) -> String
    where
        F: Fn(&ChangeEvent) -> Result<(), String> + Send + Sync + 'static,
    {
        let id = format!("listener-{}", Uuid::new_v4().simple());
        self.register_listener(id.clone(), callback, Vec::new(), 0);
        id
    }

    pub fn unregister_listener(&self, listener_id: &str) -> bool {
        let mut registry = lock(&self.registry);
        let before = registry.listeners.len();
        registry.listeners.retain(|l| l.id != listener_id);
        registry.listeners.len() != before
    }

    /// Reactivate a listener and reset its error count.
    pub fn enable_listener(&self, listener_id: &str) -> bool {
        let mut registry = lock(&self.registry);
        match registry.listeners.iter_mut().find(|l| l.id == listener_id) {
            Some(listener) => {
                listener.is_active = true;
                listener.error_count = 0;
                true
            }
            None => false,
        }
    }

    /// Build a `setting_updated` event and deliver it.
    pub fn broadcast_change(
        &self,
        key: &str,
        old_value: Option<serde_json::Value>,
        new_value: Option<serde_json::Value>,
        user_id: Option<Uuid>,
    ) -> HashMap<String, bool> {
        self.broadcast_event(ChangeEvent::new(
            ChangeEventType::SettingUpdated,
            key,
            old_value,
            new_value,
            user_id,
        ))
    }

    /// Record `event` in history and deliver it to every matching listener.
    ///
    /// Returns each targeted listener's delivery outcome.
    pub fn broadcast_event(&self, event: ChangeEvent) -> HashMap<String, bool> {
        let targets: Vec<(String, u64, ListenerCallback)> = {
            let mut registry = lock(&self.registry);
            registry.history.push_back(event.clone());
            while registry.history.len() > self.options.history_limit {
                registry.history.pop_front();
            }
            registry
                .listeners
                .iter()
                .filter(|l| l.accepts(&event.key))
                .map(|l| (l.id.clone(), l.generation, l.callback.clone()))
                .collect()
        };

        let mut outcomes = HashMap::with_capacity(targets.len());
        for (id, generation, callback) in targets {
            let result = match catch_unwind(AssertUnwindSafe(|| callback(&event))) {
                Ok(result) => result,
                Err(_) => Err("listener panicked".to_string()),
            };
            let success = result.is_ok();
            if let Err(reason) = &result {
                warn!(
                    listener_id = %id,
                    key = %event.key,
                    event_type = %event.event_type,
                    error = %reason,
                    "Change listener failed"
                );
            }
            counter!(
                "change_notifications_total",
                "outcome" => if success { "delivered" } else { "failed" }
            )
            .increment(1);
            self.record_outcome(&id, generation, success);
            outcomes.insert(id, success);
        }
        outcomes
    }

    fn record_outcome(&self, listener_id: &str, generation: u64, success: bool) {
        let mut registry = lock(&self.registry);
        let Some(listener) = registry
            .listeners
            .iter_mut()
            .find(|l| l.id == listener_id && l.generation == generation)
        else {
            return;
        };
        if success {
            listener.error_count = 0;
            return;
        }
        listener.error_count += 1;
        if listener.error_count >= self.options.max_listener_errors && listener.is_active {
            listener.is_active = false;
            warn!(
                listener_id = %listener_id,
                error_count = listener.error_count,
                "Change listener disabled after repeated failures"
            );
        }
    }

    /// The most recent events, newest first.
    pub fn history(&self, limit: usize) -> Vec<ChangeEvent> {
        lock(&self.registry)
            .history
            .iter()
            .rev()
            .take(limit)
            .cloned()
            .collect()
    }

    /// The most recent events for `key`, newest first.
    pub fn history_for_key(&self, key: &str, limit: usize) -> Vec<ChangeEvent> {
        lock(&self.registry)
            .history
            .iter()
            .rev()
            .filter(|e| e.key == key)
            .take(limit)
            .cloned()
            .collect()
    }

    /// Listener status in delivery order.
    pub fn listeners(&self) -> Vec<ListenerInfo> {
        lock(&self.registry).listeners.iter().map(Listener::info).collect()
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.registry).listeners.len()
    }

    /// Remove all listeners and history.
    pub fn clear(&self) {
        let mut registry = lock(&self.registry);
        registry.listeners.clear();
        registry.history.clear();
    }
}
