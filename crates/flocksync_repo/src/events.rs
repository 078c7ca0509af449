//! Typed change-event bus.
//!
//! Owned by the composition root and handed to whoever needs to react to
//! committed local writes (screens, background sync scheduling). Replaces
//! the global mutable singleton bus of earlier designs with an explicit
//! broadcast channel.

use flocksync_store::Collection;
use tokio::sync::broadcast;

/// What happened to an entity in the local store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    /// A new row was inserted.
    Created,
    /// An existing row was replaced.
    Updated,
    /// A row was removed.
    Deleted,
}

/// One committed local write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityEvent {
    /// Collection the entity belongs to.
    pub collection: Collection,
    /// Entity id.
    pub entity_id: String,
    /// What happened.
    pub change: Change,
}

/// Broadcast channel distributing [`EntityEvent`]s to any number of
/// subscribers. Publishing with no subscribers is a silent no-op; slow
/// subscribers skip overwritten events.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<EntityEvent>,
}

impl EventBus {
    /// Creates a bus with the given buffer capacity.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribes to future events.
    pub fn subscribe(&self) -> broadcast::Receiver<EntityEvent> {
        self.tx.subscribe()
    }

    /// Publishes an event to all current subscribers.
    pub fn publish(&self, event: EntityEvent) {
        let _ = self.tx.send(event);
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(id: &str, change: Change) -> EntityEvent {
        EntityEvent {
            collection: Collection::Flocks,
            entity_id: id.into(),
            change,
        }
    }

    #[tokio::test]
    async fn delivers_to_all_subscribers() {
        let bus = EventBus::new(8);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(event("F1", Change::Created));

        assert_eq!(rx1.recv().await.unwrap(), event("F1", Change::Created));
        assert_eq!(rx2.recv().await.unwrap(), event("F1", Change::Created));
    }

    #[test]
    fn publish_without_subscribers_is_a_no_op() {
        let bus = EventBus::new(8);
        assert_eq!(bus.subscriber_count(), 0);
        bus.publish(event("F1", Change::Deleted));
    }

    #[tokio::test]
    async fn late_subscribers_miss_earlier_events() {
        let bus = EventBus::new(8);
        bus.publish(event("F1", Change::Created));

        let mut rx = bus.subscribe();
        bus.publish(event("F2", Change::Updated));

        assert_eq!(rx.recv().await.unwrap().entity_id, "F2");
    }
}
