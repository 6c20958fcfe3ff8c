//! In-memory game store: create, look up, list, and delete games, and
//! spawn/stop their orchestrator tasks. Grounded on the source's
//! process-wide `GameManager` singleton, translated into an injectable
//! registry rather than a module-level global.

use crate::orchestrator::{HandOrchestrator, StateQuery};
use crate::sink::ChannelSink;
use rbp_core::{Chips, MAX_SEATS};
use rbp_dto::{CreateGameRequest, GameStateView, GameSummary};
use rbp_gameplay::{Action, GameState, Seat, Variant};
use rbp_players::{BotDecider, Difficulty, HeuristicBot};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

fn state_min_buy_in(req: &CreateGameRequest, big_blind: Chips) -> Chips {
    req.min_buy_in.unwrap_or(big_blind * 20)
}

fn state_max_buy_in(req: &CreateGameRequest, big_blind: Chips) -> Chips {
    req.max_buy_in.unwrap_or(big_blind * 200)
}

struct RunningGame {
    summary: Mutex<GameSummarySnapshot>,
    actions: UnboundedSender<(String, Action)>,
    joins: UnboundedSender<Seat>,
    state: UnboundedSender<StateQuery>,
    handle: JoinHandle<()>,
}

/// Mirror of the fields an orchestrator reports back so the registry can
/// answer `list_games` and validate joins without locking the driver task
/// itself. Updated optimistically by the registry, not streamed back from
/// the driver — `phase`/`hand_number` may lag by up to one hand.
#[derive(Clone)]
struct GameSummarySnapshot {
    variant: Variant,
    phase: String,
    players: usize,
    max_players: usize,
    small_blind: rbp_core::Chips,
    big_blind: rbp_core::Chips,
    min_buy_in: Chips,
    max_buy_in: Chips,
    hand_number: rbp_core::HandNo,
}

/// Why a join attempt was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinError {
    GameNotFound,
    GameFull,
    BuyInTooLow,
    BuyInTooHigh,
}

impl std::fmt::Display for JoinError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            JoinError::GameNotFound => write!(f, "game not found"),
            JoinError::GameFull => write!(f, "game is full"),
            JoinError::BuyInTooLow => write!(f, "buy-in below the minimum"),
            JoinError::BuyInTooHigh => write!(f, "buy-in above the maximum"),
        }
    }
}

/// Thread-safe store of live games, shared by every HTTP/WebSocket handler.
pub struct GameRegistry {
    sink: Arc<ChannelSink>,
    games: Mutex<HashMap<String, Arc<RunningGame>>>,
}

impl Default for GameRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl GameRegistry {
    pub fn new() -> Self {
        Self {
            sink: Arc::new(ChannelSink::new()),
            games: Mutex::new(HashMap::new()),
        }
    }

    pub fn sink(&self) -> Arc<ChannelSink> {
        Arc::clone(&self.sink)
    }

    /// Creates a game, seats any requested bots, and spawns its driver
    /// task immediately — a game with zero human seats still runs to
    /// completion on its own.
    pub fn create_game(&self, req: &CreateGameRequest) -> anyhow::Result<String> {
        let variant = Variant::try_from(req.variant.as_str())?;
        let max_players = req.max_players.unwrap_or(MAX_SEATS).clamp(2, MAX_SEATS);
        let game_id = uuid::Uuid::new_v4().to_string()[..8].to_string();

        let mut state = GameState::new(game_id.clone(), variant, req.small_blind, req.big_blind);
        if let Some(min) = req.min_buy_in {
            state.min_buy_in = min;
        }
        if let Some(max) = req.max_buy_in {
            state.max_buy_in = max;
        }

        for (i, bot) in req.bots.iter().enumerate() {
            if state.seats.len() >= max_players {
                break;
            }
            let buy_in = state.max_buy_in;
            state.seats.push(Seat::new(format!("bot-{}-{}", game_id, i), bot.name.clone(), buy_in, true));
        }

        let bot_difficulties: Vec<(usize, Difficulty)> = req
            .bots
            .iter()
            .enumerate()
            .map(|(i, b)| (i, Difficulty::from_str(&b.difficulty).unwrap_or_default()))
            .collect();

        let sink = self.sink();
        let decider: Arc<dyn BotDecider> = Arc::new(HeuristicBot);
        let mut orchestrator = HandOrchestrator::new(state, sink, decider);
        for (seat, difficulty) in bot_difficulties {
            orchestrator.set_bot_difficulty(seat, difficulty);
        }

        let summary = Mutex::new(GameSummarySnapshot {
            variant,
            phase: "waiting".to_string(),
            players: orchestrator.seat_count(),
            max_players,
            small_blind: req.small_blind,
            big_blind: req.big_blind,
            min_buy_in: state_min_buy_in(req, req.big_blind),
            max_buy_in: state_max_buy_in(req, req.big_blind),
            hand_number: 0,
        });
        let actions = orchestrator.actions_sender();
        let joins = orchestrator.joins_sender();
        let state = orchestrator.state_sender();
        let handle = tokio::spawn(orchestrator.run());

        self.games.lock().unwrap().insert(
            game_id.clone(),
            Arc::new(RunningGame { summary, actions, joins, state, handle }),
        );
        Ok(game_id)
    }

    /// Asks the driver task for a redacted snapshot, waiting briefly for
    /// the reply. `None` if the game is unknown or the driver is wedged.
    pub async fn get_state(&self, game_id: &str, player_id: &str) -> Option<GameStateView> {
        let sender = {
            let games = self.games.lock().unwrap();
            games.get(game_id)?.state.clone()
        };
        let (reply_tx, reply_rx) = oneshot::channel();
        sender
            .send(StateQuery { player_id: player_id.to_string(), reply: reply_tx })
            .ok()?;
        tokio::time::timeout(Duration::from_secs(2), reply_rx).await.ok()?.ok()
    }

    /// Seats a human player between hands. Validated against the same
    /// buy-in bounds and seat cap the game was created with; the actual
    /// splice into `GameState.seats` happens inside the driver task the
    /// next time it drains its join queue.
    pub fn join_game(&self, game_id: &str, player_id: &str, name: &str, buy_in: Chips) -> Result<usize, JoinError> {
        let games = self.games.lock().unwrap();
        let game = games.get(game_id).ok_or(JoinError::GameNotFound)?;
        let mut summary = game.summary.lock().unwrap();
        if summary.players >= summary.max_players {
            return Err(JoinError::GameFull);
        }
        if buy_in < summary.min_buy_in {
            return Err(JoinError::BuyInTooLow);
        }
        if buy_in > summary.max_buy_in {
            return Err(JoinError::BuyInTooHigh);
        }
        let seat_index = summary.players;
        summary.players += 1;
        let _ = game.joins.send(Seat::new(player_id, name, buy_in, false));
        Ok(seat_index)
    }

    pub fn submit_action(&self, game_id: &str, player_id: &str, action: Action) -> bool {
        match self.games.lock().unwrap().get(game_id) {
            Some(game) => {
                let _ = game.actions.send((player_id.to_string(), action));
                true
            }
            None => false,
        }
    }

    pub fn list_games(&self) -> Vec<GameSummary> {
        self.games
            .lock()
            .unwrap()
            .iter()
            .map(|(id, game)| {
                let s = game.summary.lock().unwrap().clone();
                GameSummary {
                    game_id: id.clone(),
                    variant: s.variant.to_string(),
                    phase: s.phase,
                    players: s.players,
                    max_players: s.max_players,
                    small_blind: s.small_blind,
                    big_blind: s.big_blind,
                    hand_number: s.hand_number,
                }
            })
            .collect()
    }

    pub fn has_game(&self, game_id: &str) -> bool {
        self.games.lock().unwrap().contains_key(game_id)
    }

    /// Aborts the driver task and drops the registry entry. A game's
    /// chip state does not survive this — persistence is out of scope.
    pub fn delete_game(&self, game_id: &str) -> bool {
        match self.games.lock().unwrap().remove(game_id) {
            Some(game) => {
                game.handle.abort();
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CreateGameRequest {
        CreateGameRequest {
            variant: "no_limit".to_string(),
            small_blind: 10,
            big_blind: 20,
            max_players: Some(6),
            min_buy_in: None,
            max_buy_in: None,
            bots: vec![],
        }
    }

    #[tokio::test]
    async fn create_game_registers_it_for_lookup() {
        let registry = GameRegistry::new();
        let id = registry.create_game(&request()).unwrap();
        assert!(registry.has_game(&id));
        registry.delete_game(&id);
        assert!(!registry.has_game(&id));
    }

    #[tokio::test]
    async fn list_games_reports_created_game() {
        let registry = GameRegistry::new();
        let id = registry.create_game(&request()).unwrap();
        let games = registry.list_games();
        assert!(games.iter().any(|g| g.game_id == id));
    }

    #[tokio::test]
    async fn join_game_seats_a_player_within_buy_in_bounds() {
        let registry = GameRegistry::new();
        let id = registry.create_game(&request()).unwrap();
        let seat = registry.join_game(&id, "p0", "Alice", 2000).unwrap();
        assert_eq!(seat, 0);
        let games = registry.list_games();
        assert_eq!(games.iter().find(|g| g.game_id == id).unwrap().players, 1);
    }

    #[tokio::test]
    async fn join_game_rejects_buy_in_below_minimum() {
        let registry = GameRegistry::new();
        let id = registry.create_game(&request()).unwrap();
        let err = registry.join_game(&id, "p0", "Alice", 1).unwrap_err();
        assert_eq!(err, JoinError::BuyInTooLow);
    }

    #[tokio::test]
    async fn join_game_rejects_unknown_game() {
        let registry = GameRegistry::new();
        let err = registry.join_game("missing", "p0", "Alice", 2000).unwrap_err();
        assert_eq!(err, JoinError::GameNotFound);
    }

    #[tokio::test]
    async fn get_state_returns_a_snapshot_for_a_running_game() {
        let registry = GameRegistry::new();
        let id = registry.create_game(&request()).unwrap();
        let view = registry.get_state(&id, "nobody").await.unwrap();
        assert_eq!(view.game_id, id);
    }

    #[tokio::test]
    async fn get_state_returns_none_for_unknown_game() {
        let registry = GameRegistry::new();
        assert!(registry.get_state("missing", "nobody").await.is_none());
    }
}
