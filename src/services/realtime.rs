use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

const CHANNEL_CAPACITY: usize = 64;

/// A change in club-scoped data, fanned out to that club's subscribers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeNotice {
    pub table: &'static str,
    pub action: &'static str,
    pub id: Uuid,
}

impl ChangeNotice {
    pub fn new(table: &'static str, action: &'static str, id: Uuid) -> Self {
        Self { table, action, id }
    }
}

/// In-process subscribe/notify hub keyed by club id. Channels are strictly
/// per-club, so a subscriber never sees another club's notices. Dropping a
/// receiver is the unsubscribe; senders with no receivers left are pruned
/// on the next notify.
#[derive(Clone, Default)]
pub struct RealtimeHub {
    channels: Arc<RwLock<HashMap<Uuid, broadcast::Sender<ChangeNotice>>>>,
}

impl RealtimeHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn subscribe(&self, club_id: Uuid) -> broadcast::Receiver<ChangeNotice> {
        let mut channels = self.channels.write().await;
        channels
            .entry(club_id)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    pub async fn notify(&self, club_id: Uuid, notice: ChangeNotice) {
        let mut channels = self.channels.write().await;
        if let Some(tx) = channels.get(&club_id) {
            if tx.send(notice).is_err() {
                channels.remove(&club_id);
            }
        }
    }

    pub async fn channel_count(&self) -> usize {
        self.channels.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_their_clubs_notices() {
        let hub = RealtimeHub::new();
        let club = Uuid::new_v4();
        let mut rx = hub.subscribe(club).await;

        let event_id = Uuid::new_v4();
        hub.notify(club, ChangeNotice::new("events", "created", event_id))
            .await;

        let notice = rx.recv().await.unwrap();
        assert_eq!(notice.table, "events");
        assert_eq!(notice.action, "created");
        assert_eq!(notice.id, event_id);
    }

    #[tokio::test]
    async fn notices_never_cross_clubs() {
        let hub = RealtimeHub::new();
        let club_a = Uuid::new_v4();
        let club_b = Uuid::new_v4();
        let mut rx_a = hub.subscribe(club_a).await;
        let _rx_b = hub.subscribe(club_b).await;

        hub.notify(club_b, ChangeNotice::new("rsvps", "updated", Uuid::new_v4()))
            .await;
        hub.notify(club_a, ChangeNotice::new("events", "deleted", Uuid::new_v4()))
            .await;

        let notice = rx_a.recv().await.unwrap();
        assert_eq!(notice.table, "events");
        assert!(rx_a.try_recv().is_err());
    }

    #[tokio::test]
    async fn dropped_subscribers_are_pruned() {
        let hub = RealtimeHub::new();
        let club = Uuid::new_v4();
        let rx = hub.subscribe(club).await;
        assert_eq!(hub.channel_count().await, 1);

        drop(rx);
        hub.notify(club, ChangeNotice::new("events", "created", Uuid::new_v4()))
            .await;
        assert_eq!(hub.channel_count().await, 0);
    }
}
