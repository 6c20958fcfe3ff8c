//! Per-game subscriber registry and personalized fan-out.
//!
//! Mirrors the source's `ConnectionManager`: a game maps player-id to an
//! outbound channel, and a broadcast is really N unicasts built from a
//! per-recipient payload factory so redaction lives at the publish site,
//! not at the subscriber.

use dashmap_like::SubscriberMap;
use rbp_dto::ServerEvent;

/// Abstract per-game subscriber set. A concrete sink only needs to know
/// how to hand a player their own channel; [`ChannelSink`] is the in-memory
/// implementation used by the hosting layer.
#[async_trait::async_trait]
pub trait BroadcastSink: Send + Sync {
    /// Registers `player_id` as a subscriber of `game_id`, returning the
    /// receiving half. Replaces any prior channel for the same player.
    fn subscribe(&self, game_id: &str, player_id: &str) -> tokio::sync::mpsc::UnboundedReceiver<ServerEvent>;

    fn unsubscribe(&self, game_id: &str, player_id: &str);

    /// Sends `event` to exactly one subscriber; drops the subscriber on a
    /// failed send.
    async fn send_to(&self, game_id: &str, player_id: &str, event: ServerEvent);

    /// Builds one personalized payload per connected subscriber and sends
    /// it. `factory` returning `None` for a recipient skips that player —
    /// this is how `your_turn` reaches only the expected actor.
    async fn publish(&self, game_id: &str, factory: &(dyn Fn(&str) -> Option<ServerEvent> + Send + Sync));
}

/// In-memory [`BroadcastSink`] backed by one `UnboundedSender` per
/// connected player per game, exactly as the source's `ConnectionManager`
/// tracks `game_id -> player_id -> websocket`.
#[derive(Default)]
pub struct ChannelSink {
    games: SubscriberMap,
}

impl ChannelSink {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl BroadcastSink for ChannelSink {
    fn subscribe(&self, game_id: &str, player_id: &str) -> tokio::sync::mpsc::UnboundedReceiver<ServerEvent> {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        self.games.insert(game_id, player_id, tx);
        rx
    }

    fn unsubscribe(&self, game_id: &str, player_id: &str) {
        self.games.remove(game_id, player_id);
    }

    async fn send_to(&self, game_id: &str, player_id: &str, event: ServerEvent) {
        if let Some(tx) = self.games.get(game_id, player_id) {
            if tx.send(event).is_err() {
                log::warn!("[sink] send failed to {} in {}, dropping", player_id, game_id);
                self.games.remove(game_id, player_id);
            }
        }
    }

    async fn publish(&self, game_id: &str, factory: &(dyn Fn(&str) -> Option<ServerEvent> + Send + Sync)) {
        let recipients = self.games.player_ids(game_id);
        let mut dead = Vec::new();
        for player_id in recipients {
            let Some(event) = factory(&player_id) else { continue };
            match self.games.get(game_id, &player_id) {
                Some(tx) if tx.send(event).is_ok() => {}
                _ => dead.push(player_id),
            }
        }
        for player_id in dead {
            log::warn!("[sink] broadcast failed to {} in {}, dropping", player_id, game_id);
            self.games.remove(game_id, &player_id);
        }
    }
}

/// Minimal concurrent `game_id -> player_id -> sender` table. A plain
/// `Mutex<HashMap<..>>` rather than an actual sharded map — the name keeps
/// intent obvious at call sites in [`ChannelSink`].
mod dashmap_like {
    use rbp_dto::ServerEvent;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tokio::sync::mpsc::UnboundedSender;

    #[derive(Default)]
    pub struct SubscriberMap(Mutex<HashMap<String, HashMap<String, UnboundedSender<ServerEvent>>>>);

    impl SubscriberMap {
        pub fn insert(&self, game_id: &str, player_id: &str, tx: UnboundedSender<ServerEvent>) {
            self.0
                .lock()
                .unwrap()
                .entry(game_id.to_string())
                .or_default()
                .insert(player_id.to_string(), tx);
        }

        pub fn remove(&self, game_id: &str, player_id: &str) {
            if let Some(players) = self.0.lock().unwrap().get_mut(game_id) {
                players.remove(player_id);
            }
        }

        pub fn get(&self, game_id: &str, player_id: &str) -> Option<UnboundedSender<ServerEvent>> {
            self.0.lock().unwrap().get(game_id)?.get(player_id).cloned()
        }

        pub fn player_ids(&self, game_id: &str) -> Vec<String> {
            self.0
                .lock()
                .unwrap()
                .get(game_id)
                .map(|players| players.keys().cloned().collect())
                .unwrap_or_default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscriber_receives_published_event() {
        let sink = ChannelSink::new();
        let mut rx = sink.subscribe("g1", "p0");
        sink.publish("g1", &|_| Some(ServerEvent::Pong)).await;
        let event = rx.recv().await.unwrap();
        assert!(matches!(event, ServerEvent::Pong));
    }

    #[tokio::test]
    async fn factory_returning_none_skips_recipient() {
        let sink = ChannelSink::new();
        let mut rx = sink.subscribe("g1", "p0");
        sink.publish("g1", &|pid| if pid == "p1" { Some(ServerEvent::Pong) } else { None }).await;
        drop(sink);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn unsubscribe_removes_recipient() {
        let sink = ChannelSink::new();
        let _rx = sink.subscribe("g1", "p0");
        sink.unsubscribe("g1", "p0");
        assert!(sink.games.get("g1", "p0").is_none());
    }
}
