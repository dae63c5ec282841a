use chess::Piece;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::watch;

use crate::config::SkillTier;
use crate::game::{GameState, MoveRecord};
use crate::scoring;

/// Where the controller currently is in its turn cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    Idle,
    Thinking,
    Committing,
}

/// How a turn ended.
#[derive(Debug, Clone)]
pub enum TurnOutcome {
    /// The chosen move was applied.
    Played(MoveRecord),
    /// No legal move exists: the game is over, not an engine fault.
    NoLegalMoves,
    /// Cancelled while thinking; the pending move was discarded unplayed.
    Cancelled,
    /// The rules engine refused the move. The turn is dropped, no retry.
    Rejected,
}

/// Cancels an in-flight turn. Dropping the handle cancels too, so a torn-down
/// game can never receive a late move.
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

/// The controller's end of the cancellation channel.
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

pub fn cancel_pair() -> (CancelHandle, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelToken { rx })
}

impl CancelHandle {
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

impl CancelToken {
    async fn cancelled(&mut self) {
        loop {
            if *self.rx.borrow() {
                return;
            }
            if self.rx.changed().await.is_err() {
                // Handle dropped: the surrounding game is gone.
                return;
            }
        }
    }
}

/// Synthetic opponent for one seat at the board.
///
/// Plays whichever side is to move in the state it is handed; the caller
/// decides when it is the opponent's turn. `take_turn` borrows the opponent
/// and the game mutably, so a second turn cannot start while one is in
/// flight.
pub struct Opponent {
    tier: SkillTier,
    phase: TurnPhase,
    rng: StdRng,
}

impl Opponent {
    pub fn new(tier: SkillTier) -> Self {
        Self::from_rng(tier, StdRng::from_entropy())
    }

    /// Seeded construction, for reproducible play and tests.
    pub fn with_seed(tier: SkillTier, seed: u64) -> Self {
        Self::from_rng(tier, StdRng::seed_from_u64(seed))
    }

    fn from_rng(tier: SkillTier, rng: StdRng) -> Self {
        Self {
            tier,
            phase: TurnPhase::Idle,
            rng,
        }
    }

    pub fn tier(&self) -> SkillTier {
        self.tier
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    /// Play one turn: score all candidates, select, wait out the tier's
    /// thinking delay, then commit through the rules engine.
    ///
    /// Scoring and selection run synchronously before the delay starts; only
    /// the delay itself is suspended and cancellable. A cancellation that
    /// lands during the delay discards the pending move.
    pub async fn take_turn(
        &mut self,
        state: &mut GameState,
        cancel: &mut CancelToken,
    ) -> TurnOutcome {
        if state.is_game_over() {
            self.phase = TurnPhase::Idle;
            return TurnOutcome::NoLegalMoves;
        }

        let candidates = candidate_moves(state);
        if candidates.is_empty() {
            self.phase = TurnPhase::Idle;
            return TurnOutcome::NoLegalMoves;
        }

        self.phase = TurnPhase::Thinking;
        let scored = scoring::score_candidates(state, &candidates, self.tier, &mut self.rng);
        let Some(chosen) = scoring::pick(&scored, self.tier, &mut self.rng) else {
            self.phase = TurnPhase::Idle;
            return TurnOutcome::NoLegalMoves;
        };

        let delay = self.tier.profile().think_delay;
        log::info!(
            "{:?} picked {} out of {} candidates, committing in {}ms",
            self.tier,
            chosen.san,
            scored.len(),
            delay.as_millis()
        );

        tokio::select! {
            _ = cancel.cancelled() => {
                log::info!("turn cancelled, discarding {}", chosen.san);
                self.phase = TurnPhase::Idle;
                return TurnOutcome::Cancelled;
            }
            _ = tokio::time::sleep(delay) => {}
        }

        self.phase = TurnPhase::Committing;
        let outcome = match state.try_make_move(&chosen) {
            Ok(()) => TurnOutcome::Played(chosen),
            Err(err) => {
                log::warn!("dropping turn: {err}");
                TurnOutcome::Rejected
            }
        };
        self.phase = TurnPhase::Idle;
        outcome
    }
}

/// Legal moves the opponent considers. Promotions always resolve to a
/// queen, so the under-promotion variants are filtered out of the slate.
pub fn candidate_moves(state: &GameState) -> Vec<MoveRecord> {
    state
        .legal_moves()
        .into_iter()
        .filter(|record| match record.mv.get_promotion() {
            Some(piece) => piece == Piece::Queen,
            None => true,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use chess::Color;

    #[test]
    fn promotions_collapse_to_queen() {
        let state = GameState::from_fen("8/P6k/8/8/8/8/8/K7 w - - 0 1").unwrap();
        let candidates = candidate_moves(&state);

        let promotions: Vec<_> = candidates
            .iter()
            .filter(|r| r.mv.get_promotion().is_some())
            .collect();
        assert_eq!(promotions.len(), 1);
        assert_eq!(promotions[0].mv.get_promotion(), Some(Piece::Queen));
        assert_eq!(promotions[0].san, "a8=Q");
    }

    #[tokio::test(start_paused = true)]
    async fn turn_applies_a_legal_move_after_the_delay() {
        let mut state = GameState::new();
        let mut opponent = Opponent::with_seed(SkillTier::Advanced, 11);
        let (_handle, mut token) = cancel_pair();

        let legal = state.legal_moves();
        let started = tokio::time::Instant::now();
        let outcome = opponent.take_turn(&mut state, &mut token).await;

        let TurnOutcome::Played(record) = outcome else {
            panic!("expected a played move");
        };
        assert!(legal.iter().any(|r| r.mv == record.mv));
        assert!(started.elapsed() >= Duration::from_millis(1000));
        assert_eq!(state.num_moves(), 1);
        assert_eq!(state.side_to_move(), Color::Black);
        assert_eq!(opponent.phase(), TurnPhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_discards_the_pending_move() {
        let mut state = GameState::new();
        let fen_before = state.fen();
        let mut opponent = Opponent::with_seed(SkillTier::Beginner, 5);
        let (handle, mut token) = cancel_pair();

        // Fire the cancel partway into the three-second thinking delay.
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(500)).await;
            handle.cancel();
        });

        let outcome = opponent.take_turn(&mut state, &mut token).await;
        assert!(matches!(outcome, TurnOutcome::Cancelled));
        assert_eq!(state.fen(), fen_before);
        assert_eq!(state.num_moves(), 0);
        assert_eq!(opponent.phase(), TurnPhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_handle_counts_as_cancellation() {
        let mut state = GameState::new();
        let mut opponent = Opponent::with_seed(SkillTier::Intermediate, 5);
        let (handle, mut token) = cancel_pair();
        drop(handle);

        let outcome = opponent.take_turn(&mut state, &mut token).await;
        assert!(matches!(outcome, TurnOutcome::Cancelled));
        assert_eq!(state.num_moves(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn finished_game_reports_no_legal_moves() {
        let mut state = GameState::from_fen(
            "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3",
        )
        .unwrap();
        let fen_before = state.fen();
        let mut opponent = Opponent::with_seed(SkillTier::Advanced, 2);
        let (_handle, mut token) = cancel_pair();

        let outcome = opponent.take_turn(&mut state, &mut token).await;
        assert!(matches!(outcome, TurnOutcome::NoLegalMoves));
        assert_eq!(state.fen(), fen_before);
    }

    #[tokio::test(start_paused = true)]
    async fn consecutive_turns_alternate_sides() {
        let mut state = GameState::new();
        let mut white = Opponent::with_seed(SkillTier::Advanced, 8);
        let mut black = Opponent::with_seed(SkillTier::Beginner, 9);

        let (_wh, mut white_token) = cancel_pair();
        let outcome = white.take_turn(&mut state, &mut white_token).await;
        assert!(matches!(outcome, TurnOutcome::Played(_)));

        let (_bh, mut black_token) = cancel_pair();
        let outcome = black.take_turn(&mut state, &mut black_token).await;
        assert!(matches!(outcome, TurnOutcome::Played(_)));

        assert_eq!(state.num_moves(), 2);
        assert_eq!(state.side_to_move(), Color::White);
    }
}
