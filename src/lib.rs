//! Move evaluation and selection for a tiered synthetic chess opponent.

pub mod config;
pub mod evaluation;
pub mod game;
pub mod opponent;
pub mod scoring;

pub use config::{ClockConfig, SkillTier, TierProfile};
pub use game::{EngineError, GameState, MoveRecord};
pub use opponent::{
    CancelHandle, CancelToken, Opponent, TurnOutcome, TurnPhase, cancel_pair, candidate_moves,
};
pub use scoring::{ScoredMove, pick, rank, score_candidates, score_move, score_move_raw};
