//! Fan-out of store mutations to connected browser tabs.
//!
//! The [`Notifier`] is a plain broadcast channel and knows nothing about the
//! transport, so the broadcast-after-write contract can be tested without
//! HTTP. The SSE endpoint at the bottom is the one transport bound to it:
//! one long-lived connection per tab, best-effort delivery, no retry. Tabs
//! that connect after a broadcast rely on their initial pull-on-load.

use crate::error::Result;
use crate::server::AppState;
use crate::store::{Event, PrayerTime, SettingsMap};
use axum::extract::State;
use axum::response::sse::{self, KeepAlive, Sse};
use serde::Serialize;
use std::convert::Infallible;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use tracing::debug;

/// One message per mutating API call, carrying the post-write canonical
/// value. Serialized names match the event names the frontend listens for.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum UpdateMessage {
    PrayerTimesUpdated(Vec<PrayerTime>),
    EventAdded(Event),
    EventUpdated(Event),
    EventDeleted(i64),
    SettingsUpdated(SettingsMap),
}

impl UpdateMessage {
    /// Wire name of this message, used as the SSE `event:` field.
    pub fn name(&self) -> &'static str {
        match self {
            UpdateMessage::PrayerTimesUpdated(_) => "prayer-times-updated",
            UpdateMessage::EventAdded(_) => "event-added",
            UpdateMessage::EventUpdated(_) => "event-updated",
            UpdateMessage::EventDeleted(_) => "event-deleted",
            UpdateMessage::SettingsUpdated(_) => "settings-updated",
        }
    }

    /// The payload alone, without the event-name envelope.
    pub fn data(&self) -> Result<serde_json::Value> {
        let value = match self {
            UpdateMessage::PrayerTimesUpdated(times) => serde_json::to_value(times),
            UpdateMessage::EventAdded(event) | UpdateMessage::EventUpdated(event) => {
                serde_json::to_value(event)
            }
            UpdateMessage::EventDeleted(id) => serde_json::to_value(id),
            UpdateMessage::SettingsUpdated(settings) => serde_json::to_value(settings),
        };
        value.map_err(|e| crate::error::MinaretError::Generic(e.to_string()))
    }
}

/// Broadcast handle shared by all mutating handlers.
///
/// Messages are published in the order writes commit; a slow subscriber that
/// falls more than the channel capacity behind loses the oldest messages,
/// which is within the at-most-best-effort delivery contract.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: broadcast::Sender<UpdateMessage>,
}

impl Notifier {
    const DEFAULT_CAPACITY: usize = 64;

    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(Self::DEFAULT_CAPACITY);
        Self { tx }
    }

    /// Subscribe a new receiver. Only messages published after this call are
    /// delivered.
    pub fn subscribe(&self) -> broadcast::Receiver<UpdateMessage> {
        self.tx.subscribe()
    }

    /// Publish a message to every current subscriber. Never fails: with no
    /// subscribers the message is simply dropped.
    pub fn publish(&self, message: UpdateMessage) {
        match self.tx.send(message) {
            Ok(receivers) => debug!("Broadcast delivered to {receivers} subscribers"),
            Err(_) => debug!("Broadcast dropped, no connected subscribers"),
        }
    }

    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

/// SSE endpoint: streams every [`UpdateMessage`] to the connected tab.
///
/// Lagged or unserializable messages are skipped rather than terminating the
/// stream; a dropped connection is silently discarded on the next send.
pub async fn updates_stream(
    State(state): State<AppState>,
) -> Sse<impl tokio_stream::Stream<Item = std::result::Result<sse::Event, Infallible>>> {
    let rx = state.notifier.subscribe();
    debug!(
        "New push-channel subscriber, {} connected",
        state.notifier.receiver_count()
    );

    let stream = BroadcastStream::new(rx).filter_map(|message| {
        let update = match message {
            Ok(update) => update,
            // Receiver fell behind; skip the gap, the tab still holds its
            // last pulled state.
            Err(_) => return None,
        };

        match update.data().and_then(|data| {
            serde_json::to_string(&data)
                .map_err(|e| crate::error::MinaretError::Generic(e.to_string()))
        }) {
            Ok(json) => Some(Ok(sse::Event::default().event(update.name()).data(json))),
            Err(e) => {
                tracing::error!("Failed to serialize push message: {e}");
                None
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::EventStatus;

    fn sample_event() -> Event {
        Event {
            id: 7,
            title: "Juma namozi".to_string(),
            date: "2025-01-24".to_string(),
            time: "12:30".to_string(),
            description: "Haftalik jamoat namozi".to_string(),
            detailed_description: None,
            image: None,
            status: EventStatus::Active,
        }
    }

    #[test]
    fn test_message_names_match_wire_events() {
        assert_eq!(
            UpdateMessage::PrayerTimesUpdated(vec![]).name(),
            "prayer-times-updated"
        );
        assert_eq!(UpdateMessage::EventAdded(sample_event()).name(), "event-added");
        assert_eq!(
            UpdateMessage::EventUpdated(sample_event()).name(),
            "event-updated"
        );
        assert_eq!(UpdateMessage::EventDeleted(7).name(), "event-deleted");
        assert_eq!(
            UpdateMessage::SettingsUpdated(SettingsMap::new()).name(),
            "settings-updated"
        );
    }

    #[test]
    fn test_serialized_envelope_uses_kebab_case_tag() {
        let json = serde_json::to_value(UpdateMessage::EventDeleted(3)).unwrap();
        assert_eq!(json["event"], "event-deleted");
        assert_eq!(json["data"], 3);
    }

    #[test]
    fn test_data_is_payload_without_envelope() {
        let message = UpdateMessage::EventAdded(sample_event());
        let data = message.data().unwrap();
        assert_eq!(data["id"], 7);
        assert_eq!(data["status"], "active");
        assert!(data.get("event").is_none());
    }

    #[tokio::test]
    async fn test_subscriber_receives_published_message() {
        let notifier = Notifier::new();
        let mut rx = notifier.subscribe();

        notifier.publish(UpdateMessage::EventDeleted(42));

        let received = rx.recv().await.unwrap();
        assert!(matches!(received, UpdateMessage::EventDeleted(42)));
    }

    #[tokio::test]
    async fn test_messages_arrive_in_publish_order() {
        let notifier = Notifier::new();
        let mut rx = notifier.subscribe();

        notifier.publish(UpdateMessage::EventDeleted(1));
        notifier.publish(UpdateMessage::EventDeleted(2));
        notifier.publish(UpdateMessage::EventDeleted(3));

        for expected in 1i64..=3 {
            let received = rx.recv().await.unwrap();
            assert!(matches!(received, UpdateMessage::EventDeleted(id) if id == expected));
        }
    }

    #[test]
    fn test_publish_without_subscribers_does_not_panic() {
        let notifier = Notifier::new();
        assert_eq!(notifier.receiver_count(), 0);
        notifier.publish(UpdateMessage::EventDeleted(1));
    }

    #[tokio::test]
    async fn test_late_subscriber_misses_earlier_messages() {
        let notifier = Notifier::new();
        notifier.publish(UpdateMessage::EventDeleted(1));

        let mut rx = notifier.subscribe();
        notifier.publish(UpdateMessage::EventDeleted(2));

        let received = rx.recv().await.unwrap();
        assert!(matches!(received, UpdateMessage::EventDeleted(2)));
    }
}
