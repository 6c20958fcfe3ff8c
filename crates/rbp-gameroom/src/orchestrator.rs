//! The asynchronous per-game driver. Owns `GameState`, the pot ledger, and
//! the deck; everyone else only ever touches it through [`submit_action`]
//! or a [`BroadcastSink`] subscription. Single-writer by construction: the
//! only task that ever calls `GameState` mutators is the one running
//! [`HandOrchestrator::run`].

use crate::sink::BroadcastSink;
use crate::snapshot;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use rbp_cards::Deck;
use rbp_core::{Chips, HandNo, Position, GAME_START_PAUSE_MS, HAND_OVER_PAUSE_MS, STREET_PAUSE_MS};
use rbp_dto::{GameStateView, PotAward, ServerEvent};
use rbp_gameplay::{rules, Action, BettingResult, BettingRound, GameState, Phase, PotManager, Seat, Street, ValidActions, Variant};
use rbp_players::{apply_safety_clamps, BotDecider, Difficulty};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

/// A synchronous read of the game's current redacted view, answered by the
/// driver task itself so a caller never races the single-writer state.
pub struct StateQuery {
    pub player_id: String,
    pub reply: oneshot::Sender<GameStateView>,
}

fn new_rng() -> SmallRng {
    let mut seed = [0u8; 32];
    getrandom::fill(&mut seed).expect("system entropy source");
    SmallRng::from_seed(seed)
}

/// Drives one game through an unbounded sequence of hands until one seat
/// holds every chip.
pub struct HandOrchestrator<S: BroadcastSink> {
    state: GameState,
    pot: PotManager,
    deck: Deck,
    rng: SmallRng,
    sink: Arc<S>,
    bot: Arc<dyn BotDecider>,
    bot_difficulty: HashMap<Position, Difficulty>,
    actions_tx: mpsc::UnboundedSender<(String, Action)>,
    actions_rx: mpsc::UnboundedReceiver<(String, Action)>,
    joins_tx: mpsc::UnboundedSender<Seat>,
    joins_rx: mpsc::UnboundedReceiver<Seat>,
    state_tx: mpsc::UnboundedSender<StateQuery>,
    state_rx: mpsc::UnboundedReceiver<StateQuery>,
}

impl<S: BroadcastSink + 'static> HandOrchestrator<S> {
    pub fn new(state: GameState, sink: Arc<S>, bot: Arc<dyn BotDecider>) -> Self {
        let (actions_tx, actions_rx) = mpsc::unbounded_channel();
        let (joins_tx, joins_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = mpsc::unbounded_channel();
        Self {
            state,
            pot: PotManager::new(),
            deck: Deck::new(),
            rng: new_rng(),
            sink,
            bot,
            bot_difficulty: HashMap::new(),
            actions_tx,
            actions_rx,
            joins_tx,
            joins_rx,
            state_tx,
            state_rx,
        }
    }

    pub fn set_bot_difficulty(&mut self, seat: Position, difficulty: Difficulty) {
        self.bot_difficulty.insert(seat, difficulty);
    }

    /// External entry point: a submission is only honored later, in
    /// [`Self::obtain_action`], if `player_id` equals the actor currently
    /// expected to move. Stale or wrong-actor submissions are dropped
    /// there, not here — the channel itself never validates.
    pub fn submit_action(&self, player_id: String, action: Action) {
        let _ = self.actions_tx.send((player_id, action));
    }

    pub fn game_id(&self) -> &str {
        &self.state.game_id
    }

    pub fn seat_count(&self) -> usize {
        self.state.seats.len()
    }

    /// Clone of the submission channel, handed to the registry so it can
    /// route `submit_action` calls without holding the orchestrator itself.
    pub fn actions_sender(&self) -> mpsc::UnboundedSender<(String, Action)> {
        self.actions_tx.clone()
    }

    /// Clone of the seating channel. A new seat is only spliced into
    /// `GameState.seats` while the game is in `waiting` or `hand_over`,
    /// matching the rule that seats may not be added mid-hand.
    pub fn joins_sender(&self) -> mpsc::UnboundedSender<Seat> {
        self.joins_tx.clone()
    }

    fn drain_joins(&mut self) {
        while let Ok(seat) = self.joins_rx.try_recv() {
            self.state.seats.push(seat);
        }
    }

    /// Clone of the read-query channel, handed to the registry so a REST
    /// `GET .../state` caller can get a redacted snapshot without racing
    /// the driver's own mutation of `GameState`.
    pub fn state_sender(&self) -> mpsc::UnboundedSender<StateQuery> {
        self.state_tx.clone()
    }

    fn drain_state_queries(&mut self) {
        while let Ok(query) = self.state_rx.try_recv() {
            let view = snapshot::game_state_view(&self.state, &query.player_id);
            let _ = query.reply.send(view);
        }
    }

    /// Runs hands until only one seat still has chips, publishing
    /// `game_over` and returning.
    pub async fn run(mut self) {
        tokio::time::sleep(Duration::from_millis(GAME_START_PAUSE_MS)).await;
        self.drain_joins();
        self.drain_state_queries();
        loop {
            self.play_hand().await;
            self.publish_hand_over().await;
            tokio::time::sleep(Duration::from_millis(HAND_OVER_PAUSE_MS)).await;
            self.drain_joins();
            self.drain_state_queries();
            let seats_with_chips = self.state.seats.iter().filter(|s| s.chips > 0).count();
            if seats_with_chips < 2 {
                self.state.phase = Phase::GameOver;
                self.publish_game_over().await;
                break;
            }
        }
    }

    async fn play_hand(&mut self) {
        self.start_hand();
        self.publish_hand_starting().await;
        self.deal_hole_cards();

        let preflop_start = rules::first_to_act_preflop(&self.state);
        if let BettingResult::AllFolded = self.run_betting(Phase::Preflop, preflop_start).await {
            self.award_uncontested().await;
            return;
        }

        for street in [Street::Flop, Street::Turn, Street::River] {
            self.deal_street(street).await;
            let start = rules::first_to_act_postflop(&self.state);
            if let BettingResult::AllFolded = self.run_betting(Phase::of_street(street), start).await {
                self.award_uncontested().await;
                return;
            }
        }

        self.run_showdown().await;
    }

    fn start_hand(&mut self) {
        self.state.hand_number += 1;
        for seat in &mut self.state.seats {
            seat.reset_for_hand();
        }
        rules::advance_dealer(&mut self.state);
        self.deck.reset();
        self.deck.shuffle(&mut self.rng);
        self.state.board.clear();
        self.pot.reset();
        self.state.pot = 0;
        self.state.phase = Phase::Preflop;
        rules::post_blinds(&mut self.state, &mut self.pot);
    }

    /// Two passes, one card per seat per pass, in dealer-clockwise order —
    /// not all-at-once per seat — matching how a physical dealer works.
    fn deal_hole_cards(&mut self) {
        let dealable: Vec<Position> = self
            .state
            .seats
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.sitting_out)
            .map(|(i, _)| i)
            .collect();
        let mut first_card = HashMap::new();
        for &i in &dealable {
            first_card.insert(i, self.deck.deal_one());
        }
        for &i in &dealable {
            let second = self.deck.deal_one();
            self.state.seat_mut(i).hole = Some(rbp_cards::Hole::from((first_card[&i], second)));
        }
    }

    async fn deal_street(&mut self, street: Street) {
        self.state.phase = Phase::of_street(street);
        let n = street.board_size() - self.state.board.len();
        let cards = self.deck.deal(n);
        self.state.board.extend(cards);
        self.publish_community_card(street).await;
    }

    async fn run_betting(&mut self, phase: Phase, start: Option<Position>) -> BettingResult {
        // Preflop's "bet" is already seeded by the blinds posted in
        // `start_hand`; clearing it here would erase the big blind's
        // obligation before `BettingRound::new` ever reads `current_bet`.
        if phase != Phase::Preflop {
            self.state.reset_street_bets();
        }
        let Some(start) = start else {
            return BettingResult::RoundComplete;
        };
        let mut round = BettingRound::new(&mut self.state, start, phase);
        loop {
            match round.status(&self.state) {
                BettingResult::Continue => {}
                other => return other,
            }
            let Some(actor) = round.next_to_act(&self.state) else {
                return round.status(&self.state);
            };
            let valid = round.valid_actions(&self.state, actor);
            let action = self.obtain_action(actor, &valid, phase).await;
            let result = round.apply(&mut self.state, &mut self.pot, actor, action);
            self.publish_action_taken(actor, action).await;
            match result {
                BettingResult::Continue => continue,
                other => return other,
            }
        }
    }

    /// Waits for either a submitted action from the expected actor or a
    /// scheduled bot decision, whichever arrives first. Prompts the actor
    /// with `your_turn` before waiting.
    async fn obtain_action(&mut self, actor: Position, valid: &ValidActions, phase: Phase) -> Action {
        let seat = self.state.seat(actor);
        let player_id = seat.player_id.clone();
        self.publish_your_turn(&player_id, valid).await;

        if seat.is_bot {
            let difficulty = self.bot_difficulty.get(&actor).copied().unwrap_or_default();
            return self.bot_decide(actor, valid, difficulty, phase);
        }

        loop {
            tokio::select! {
                biased;
                // No safety-clamp pass here: a human's raise is clamped to a
                // legal minimum by `BettingRound::apply` itself, not downgraded
                // to a call the way the bot-only safety net would.
                action = self.actions_rx.recv() => match action {
                    Some((pid, action)) if pid == player_id => return action,
                    Some(_) => continue,
                    None => return Action::Fold,
                },
                query = self.state_rx.recv() => {
                    if let Some(query) = query {
                        let view = snapshot::game_state_view(&self.state, &query.player_id);
                        let _ = query.reply.send(view);
                    }
                }
            }
        }
    }

    fn bot_decide(&mut self, actor: Position, valid: &ValidActions, difficulty: Difficulty, _phase: Phase) -> Action {
        let action = self
            .bot
            .decide(&self.state, actor, valid, difficulty, &mut self.rng);
        let seat = self.state.seat(actor);
        apply_safety_clamps(seat.chips, seat.bet, valid, action)
    }

    async fn run_showdown(&mut self) {
        self.state.phase = Phase::Showdown;
        let active: Vec<Position> = self
            .state
            .seats
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.folded)
            .map(|(i, _)| i)
            .collect();

        let scores: HashMap<Position, u16> = active
            .iter()
            .map(|&i| {
                let seat = self.state.seat(i);
                let hole = seat.hole.expect("seat reached showdown without hole cards");
                let mut cards = hole.cards().to_vec();
                cards.extend_from_slice(&self.state.board);
                (i, rbp_cards::eval_best(&cards))
            })
            .collect();

        let pots = self.pot.calculate_side_pots(&active);
        let awards = self.award_pots(&pots, &scores);
        self.apply_awards(&awards);

        let reveals = snapshot::showdown_reveals(&self.state, &active);
        self.publish_winner(awards, reveals).await;
        self.state.pot = 0;
        self.pot.reset();
    }

    /// For each side pot, splits the amount evenly among tied minimum-score
    /// eligible seats, handing any remainder to the lowest seat index among
    /// the winners.
    fn award_pots(&self, pots: &[rbp_gameplay::SidePot], scores: &HashMap<Position, u16>) -> Vec<PotAward> {
        pots.iter()
            .map(|pot| {
                let best = pot
                    .eligible
                    .iter()
                    .filter_map(|i| scores.get(i).map(|&s| (i, s)))
                    .min_by_key(|(_, s)| *s)
                    .map(|(_, s)| s)
                    .unwrap_or(u16::MAX);
                let mut winners: Vec<Position> = pot
                    .eligible
                    .iter()
                    .copied()
                    .filter(|i| scores.get(i) == Some(&best))
                    .collect();
                winners.sort_unstable();
                PotAward { amount: pot.amount, winners }
            })
            .collect()
    }

    fn apply_awards(&mut self, awards: &[PotAward]) {
        for award in awards {
            if award.winners.is_empty() {
                continue;
            }
            let share = award.amount / award.winners.len() as Chips;
            let remainder = award.amount % award.winners.len() as Chips;
            for (i, &winner) in award.winners.iter().enumerate() {
                let bonus = if i == 0 { remainder } else { 0 };
                self.state.seat_mut(winner).chips += share + bonus;
            }
        }
    }

    /// A hand where all but one seat folded: the sole survivor wins the
    /// entire pot, no showdown, no hole cards shown.
    async fn award_uncontested(&mut self) {
        let survivor = self
            .state
            .seats
            .iter()
            .position(|s| !s.folded && !s.sitting_out);
        if let Some(winner) = survivor {
            let amount = self.state.pot;
            self.state.seat_mut(winner).chips += amount;
            let award = PotAward { amount, winners: vec![winner] };
            self.publish_winner(vec![award], Vec::new()).await;
        }
        self.state.pot = 0;
        self.pot.reset();
    }

    // --- publishing ---------------------------------------------------

    async fn publish_hand_starting(&self) {
        let hand_number = self.state.hand_number;
        let dealer_index = self.state.dealer_index;
        let stacks: Vec<Chips> = self.state.seats.iter().map(|s| s.chips).collect();
        self.sink
            .publish(self.game_id(), &move |_| {
                Some(ServerEvent::HandStarting { hand_number, dealer_index, stacks: stacks.clone() })
            })
            .await;
        tokio::time::sleep(Duration::from_millis(STREET_PAUSE_MS)).await;
    }

    async fn publish_community_card(&self, street: Street) {
        let hand_number = self.state.hand_number;
        let cards: Vec<String> = self.state.board.iter().map(|c| c.to_string()).collect();
        self.sink
            .publish(self.game_id(), &move |_| {
                Some(ServerEvent::Board { hand_number, street: street.to_string(), cards: cards.clone() })
            })
            .await;
        tokio::time::sleep(Duration::from_millis(STREET_PAUSE_MS)).await;
    }

    async fn publish_your_turn(&self, player_id: &str, valid: &ValidActions) {
        let view = snapshot::valid_actions_view(valid);
        let target = player_id.to_string();
        self.sink
            .publish(self.game_id(), &move |pid| {
                if pid == target {
                    Some(ServerEvent::YourTurn { player_id: pid.to_string(), valid_actions: view.clone() })
                } else {
                    None
                }
            })
            .await;
    }

    async fn publish_action_taken(&self, seat: Position, action: Action) {
        let hand_number = self.state.hand_number;
        let pot = self.state.pot;
        let amount = match action {
            Action::Raise(total) => total,
            _ => 0,
        };
        let label = match action {
            Action::Fold => "fold",
            Action::Check => "check",
            Action::Call => "call",
            Action::Raise(_) => "raise",
            Action::Shove => "all_in",
        };
        self.sink
            .publish(self.game_id(), &move |_| {
                Some(ServerEvent::ActionTaken { hand_number, seat, action: label.to_string(), amount, pot })
            })
            .await;
    }

    async fn publish_winner(&self, pots: Vec<PotAward>, reveals: Vec<rbp_dto::Reveal>) {
        let hand_number = self.state.hand_number;
        self.sink
            .publish(self.game_id(), &move |_| {
                Some(ServerEvent::Winner { hand_number, pots: pots.clone(), reveals: reveals.clone() })
            })
            .await;
    }

    async fn publish_hand_over(&self) {
        let hand_number = self.state.hand_number;
        self.state.phase = Phase::HandOver;
        self.sink
            .publish(self.game_id(), &move |_| Some(ServerEvent::HandOver { hand_number }))
            .await;
    }

    async fn publish_game_over(&self) {
        let winner_seat = self.state.seats.iter().position(|s| s.chips > 0);
        self.sink
            .publish(self.game_id(), &move |_| Some(ServerEvent::GameOver { winner_seat }))
            .await;
    }

    /// `game_state` snapshot for a newly-connected subscriber: redacted per
    /// the same rule as every other broadcast.
    pub async fn publish_snapshot_to(&self, player_id: &str) {
        let view = snapshot::game_state_view(&self.state, player_id);
        self.sink.send_to(self.game_id(), player_id, ServerEvent::GameState(view)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::ChannelSink;
    use rbp_gameplay::Seat;
    use rbp_players::HeuristicBot;

    fn two_seat_game() -> GameState {
        let mut state = GameState::new("g1", Variant::NoLimit, 10, 20);
        state.seats.push(Seat::new("p0", "Alice", 1000, false));
        state.seats.push(Seat::new("p1", "Bob", 1000, false));
        state
    }

    #[tokio::test]
    async fn award_pots_splits_ties_with_remainder_to_lowest_seat() {
        let state = two_seat_game();
        let sink = Arc::new(ChannelSink::new());
        let bot = Arc::new(HeuristicBot);
        let orch = HandOrchestrator::new(state, sink, bot);
        let pots = vec![rbp_gameplay::SidePot { amount: 101, eligible: vec![0, 1] }];
        let mut scores = HashMap::new();
        scores.insert(0, 1);
        scores.insert(1, 1);
        let awards = orch.award_pots(&pots, &scores);
        assert_eq!(awards[0].winners, vec![0, 1]);
        assert_eq!(awards[0].amount, 101);
    }

    #[tokio::test]
    async fn uncontested_hand_awards_entire_pot_to_survivor() {
        let mut state = two_seat_game();
        state.pot = 30;
        state.seats[1].folded = true;
        let sink = Arc::new(ChannelSink::new());
        let bot = Arc::new(HeuristicBot);
        let mut orch = HandOrchestrator::new(state, sink, bot);
        let before: Chips = orch.state.seats.iter().map(|s| s.chips).sum::<Chips>() + orch.state.pot;
        orch.award_uncontested().await;
        let after: Chips = orch.state.seats.iter().map(|s| s.chips).sum();
        assert_eq!(after, before);
        assert_eq!(orch.state.seat(0).chips, 1030);
    }

    fn cards(strs: &[&str]) -> Vec<rbp_cards::Card> {
        strs.iter().map(|s| rbp_cards::Card::try_from(*s).unwrap()).collect()
    }

    /// Board [Th, Jh, Qh, 2c, 3d]; p0 holds pocket aces, p1 holds 4s5c.
    /// p0's pair of aces beats p1's ace-high board hand.
    #[tokio::test]
    async fn single_winner_showdown_awards_the_whole_pot() {
        let state = two_seat_game();
        let sink = Arc::new(ChannelSink::new());
        let bot = Arc::new(HeuristicBot);
        let mut orch = HandOrchestrator::new(state, sink, bot);
        orch.state.board = cards(&["Th", "Jh", "Qh", "2c", "3d"]);
        orch.state.pot = 200;

        let board = orch.state.board.clone();
        let mut p0 = cards(&["As", "Ac"]);
        p0.extend(board.iter().copied());
        let mut p1 = cards(&["4s", "5c"]);
        p1.extend(board.iter().copied());
        let mut scores = HashMap::new();
        scores.insert(0, rbp_cards::eval_best(&p0));
        scores.insert(1, rbp_cards::eval_best(&p1));

        let pots = vec![rbp_gameplay::SidePot { amount: 200, eligible: vec![0, 1] }];
        let awards = orch.award_pots(&pots, &scores);
        assert_eq!(awards[0].winners, vec![0]);
        orch.apply_awards(&awards);
        assert_eq!(orch.state.seat(0).chips, 1200);
        assert_eq!(orch.state.seat(1).chips, 1000);
    }

    /// Board is a royal flush; both seats play the board and tie. An odd
    /// 101-chip pot splits 51/50, remainder to the lower seat index.
    #[tokio::test]
    async fn split_pot_on_board_royal_gives_the_odd_chip_to_the_lower_seat() {
        let state = two_seat_game();
        let sink = Arc::new(ChannelSink::new());
        let bot = Arc::new(HeuristicBot);
        let mut orch = HandOrchestrator::new(state, sink, bot);
        let board = cards(&["As", "Ks", "Qs", "Js", "Ts"]);
        let mut p0 = cards(&["2c", "3d"]);
        p0.extend(board.iter().copied());
        let mut p1 = cards(&["4c", "5d"]);
        p1.extend(board.iter().copied());
        let mut scores = HashMap::new();
        scores.insert(0, rbp_cards::eval_best(&p0));
        scores.insert(1, rbp_cards::eval_best(&p1));
        assert_eq!(scores[&0], scores[&1], "both seats play the board");

        let pots = vec![rbp_gameplay::SidePot { amount: 101, eligible: vec![0, 1] }];
        let awards = orch.award_pots(&pots, &scores);
        orch.apply_awards(&awards);
        assert_eq!(orch.state.seat(0).chips, 1051);
        assert_eq!(orch.state.seat(1).chips, 1050);
    }

    /// 4 seats at 50 chips each; p0 busts to 0 chips in the first hand.
    /// The next `start_hand` must not deal p0 in and must skip it in the
    /// blind rotation, with total chips conserved across both hands.
    #[tokio::test]
    async fn a_busted_seat_sits_out_the_next_hand() {
        // p0 already busted to a prior hand; its 50 chips went to p1,
        // so the 4-seat total of 200 still holds with p0 at zero.
        let mut state = GameState::new("g1", Variant::NoLimit, 10, 20);
        state.seats.push(Seat::new("p0", "A", 0, false));
        state.seats.push(Seat::new("p1", "B", 100, false));
        state.seats.push(Seat::new("p2", "C", 50, false));
        state.seats.push(Seat::new("p3", "D", 50, false));
        state.seats[0].sitting_out = true;
        let total_before: Chips = state.seats.iter().map(|s| s.chips).sum();
        let sink = Arc::new(ChannelSink::new());
        let bot = Arc::new(HeuristicBot);
        let mut orch = HandOrchestrator::new(state, sink, bot);

        orch.start_hand();
        orch.deal_hole_cards();

        assert!(orch.state.seat(0).sitting_out);
        assert!(orch.state.seat(0).hole.is_none());
        let (sb, bb) = rules::blind_indices(&orch.state);
        assert_ne!(sb, 0);
        assert_ne!(bb, 0);
        let total_after: Chips = orch.state.seats.iter().map(|s| s.chips).sum::<Chips>() + orch.state.pot;
        assert_eq!(total_after, total_before);
    }

    #[tokio::test]
    async fn full_hand_conserves_chips_when_both_bots_check_down() {
        let state = two_seat_game();
        let sink = Arc::new(ChannelSink::new());
        let bot = Arc::new(HeuristicBot);
        let mut orch = HandOrchestrator::new(state, sink, bot);
        orch.state.seats[0].is_bot = true;
        orch.state.seats[1].is_bot = true;
        let total_before: Chips = orch.state.seats.iter().map(|s| s.chips).sum();
        orch.play_hand().await;
        let total_after: Chips = orch.state.seats.iter().map(|s| s.chips).sum::<Chips>() + orch.state.pot;
        assert_eq!(total_after, total_before);
    }
}
