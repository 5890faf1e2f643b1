//! In-process event bus (spec.md §6: `on(event, handler)` / `destroy()`)
//! plus forwarding to the optional injected `EventSink` capability.
//! Lifecycle events: `memory:stored`, `memory:recalled`, `dream:phase`,
//! `dream:completed` (spec.md §6).

use std::sync::RwLock;

use cortex_core::errors::CortexResult;
use cortex_core::traits::{CortexEvent, EventSink};

type Handler = Box<dyn Fn(&CortexEvent) + Send + Sync>;

/// Fan-out point for lifecycle events. In-process subscribers registered
/// via `on` run synchronously on publish, ahead of the optional external
/// `EventSink`, so a slow sink cannot starve local handlers.
#[derive(Default)]
pub struct EventBus {
    handlers: RwLock<Vec<(String, Handler)>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for `event`; `"*"` matches every kind.
    pub fn on(&self, event: &str, handler: impl Fn(&CortexEvent) + Send + Sync + 'static) {
        self.handlers.write().unwrap().push((event.to_string(), Box::new(handler)));
    }

    /// Drops every registered handler (spec.md §6 `destroy()`).
    pub fn clear(&self) {
        self.handlers.write().unwrap().clear();
    }

    pub async fn emit<V: EventSink>(&self, sink: Option<&V>, event: CortexEvent) -> CortexResult<()> {
        {
            let handlers = self.handlers.read().unwrap();
            for (pattern, handler) in handlers.iter() {
                if pattern == "*" || pattern == &event.kind {
                    handler(&event);
                }
            }
        }
        if let Some(sink) = sink {
            sink.publish(event).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct NoopSink;
    impl EventSink for NoopSink {
        async fn publish(&self, _event: CortexEvent) -> CortexResult<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn wildcard_handler_sees_every_event() {
        let bus = EventBus::new();
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        bus.on("*", move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        bus.emit(
            None::<&NoopSink>,
            CortexEvent { kind: "memory:stored".to_string(), at: chrono::Utc::now(), payload: serde_json::json!({}) },
        )
        .await
        .unwrap();
        bus.emit(
            None::<&NoopSink>,
            CortexEvent { kind: "dream:completed".to_string(), at: chrono::Utc::now(), payload: serde_json::json!({}) },
        )
        .await
        .unwrap();

        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn destroy_drops_handlers() {
        let bus = EventBus::new();
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        bus.on("memory:stored", move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        bus.clear();

        bus.emit(
            None::<&NoopSink>,
            CortexEvent { kind: "memory:stored".to_string(), at: chrono::Utc::now(), payload: serde_json::json!({}) },
        )
        .await
        .unwrap();

        assert_eq!(seen.load(Ordering::SeqCst), 0);
    }
}
