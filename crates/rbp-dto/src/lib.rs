//! Wire-format payloads shared between the hosting layer and any client.
//! Nothing in here touches game logic; it only shapes JSON.

use rbp_core::{Chips, HandNo, Position};
use serde::{Deserialize, Serialize};

/// Card string masking opponents' hole cards wherever a payload needs one.
pub const MASKED_CARD: &str = "??";

#[derive(Debug, Clone, Deserialize)]
pub struct CreateGameRequest {
    pub variant: String,
    pub small_blind: Chips,
    pub big_blind: Chips,
    #[serde(default)]
    pub max_players: Option<usize>,
    #[serde(default)]
    pub min_buy_in: Option<Chips>,
    #[serde(default)]
    pub max_buy_in: Option<Chips>,
    #[serde(default)]
    pub bots: Vec<BotSeatRequest>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BotSeatRequest {
    pub name: String,
    pub difficulty: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JoinGameRequest {
    pub player_id: String,
    pub name: String,
    pub buy_in: Chips,
}

#[derive(Debug, Clone, Serialize)]
pub struct GameSummary {
    pub game_id: String,
    pub variant: String,
    pub phase: String,
    pub players: usize,
    pub max_players: usize,
    pub small_blind: Chips,
    pub big_blind: Chips,
    pub hand_number: HandNo,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerView {
    pub seat: Position,
    pub player_id: String,
    pub name: String,
    pub chips: Chips,
    /// `None` when the seat has no hole cards; masked to `["??", "??"]`
    /// for every recipient other than the seat's own owner.
    pub hole: Option<Vec<String>>,
    pub bet: Chips,
    pub total_bet: Chips,
    pub folded: bool,
    pub all_in: bool,
    pub sitting_out: bool,
    pub is_bot: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct GameStateView {
    pub game_id: String,
    pub variant: String,
    pub phase: String,
    pub players: Vec<PlayerView>,
    pub community_cards: Vec<String>,
    pub pot: Chips,
    pub hand_number: HandNo,
    pub dealer_index: Position,
    pub current_player_index: Option<Position>,
    pub small_blind: Chips,
    pub big_blind: Chips,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidActionsView {
    pub can_check: bool,
    pub call_amount: Chips,
    pub min_raise: Chips,
    pub max_raise: Chips,
    pub can_raise: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Reveal {
    pub seat: Position,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hole: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PotAward {
    pub amount: Chips,
    pub winners: Vec<Position>,
}

/// One submitted action token over the wire: `fold`, `check`, `call`,
/// `raise`, `all_in`. `amount` is only meaningful for `raise`, and is the
/// total bet target for the street, not the incremental chips added.
#[derive(Debug, Clone, Deserialize)]
pub struct ActionRequest {
    pub action: String,
    #[serde(default)]
    pub amount: Option<Chips>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// Server-to-client event envelope. The event name set is fixed by the
/// external contract: `game_state`, `hand_starting`, `community_card`,
/// `your_turn`, `action_taken`, `winner`, `hand_over`, `game_over`, `chat`,
/// `pong`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    GameState(GameStateView),
    HandStarting {
        hand_number: HandNo,
        dealer_index: Position,
        stacks: Vec<Chips>,
    },
    /// Named `Board` internally per the teacher's own `Event::Board`
    /// naming; the wire tag stays `community_card` for interoperability.
    #[serde(rename = "community_card")]
    Board {
        hand_number: HandNo,
        street: String,
        cards: Vec<String>,
    },
    YourTurn {
        player_id: String,
        valid_actions: ValidActionsView,
    },
    ActionTaken {
        hand_number: HandNo,
        seat: Position,
        action: String,
        amount: Chips,
        pot: Chips,
    },
    Winner {
        hand_number: HandNo,
        pots: Vec<PotAward>,
        reveals: Vec<Reveal>,
    },
    HandOver {
        hand_number: HandNo,
    },
    GameOver {
        winner_seat: Option<Position>,
    },
    Chat {
        player_id: String,
        message: String,
    },
    Pong,
}

impl ServerEvent {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("serialize server event")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_tag_matches_external_contract() {
        let json = ServerEvent::Pong.to_json();
        assert_eq!(json, r#"{"type":"pong"}"#);
    }

    #[test]
    fn hand_over_carries_hand_number() {
        let json = ServerEvent::HandOver { hand_number: 7 }.to_json();
        assert!(json.contains("\"hand_number\":7"));
    }

    #[test]
    fn board_variant_keeps_the_community_card_wire_tag() {
        let json = ServerEvent::Board { hand_number: 1, street: "flop".to_string(), cards: vec!["As".to_string()] }.to_json();
        assert!(json.contains(r#""type":"community_card""#));
    }
}
