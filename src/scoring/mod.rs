mod shortlist;

pub use shortlist::{pick, rank};

use chess::{Board, BoardStatus, Color};
use rand::Rng;

use crate::config::{SkillTier, TierProfile};
use crate::evaluation::{self, GamePhase};
use crate::game::{GameState, MoveRecord};

const CHECK_BONUS: i32 = 50;
// Must dwarf any sum of positional terms plus jitter so a mating move always
// ranks first.
const MATE_SCORE: i32 = 1_000_000;
const DRAW_PENALTY: i32 = -500_000;
const ATTACK_ZONE_BONUS: i32 = 6;
const MOBILITY_BONUS: i32 = 2;

/// A candidate move with its tier-dependent score.
#[derive(Debug, Clone)]
pub struct ScoredMove {
    pub record: MoveRecord,
    pub score: i32,
}

/// Score every candidate for the side to move. Jitter is drawn fresh per
/// candidate; the caller's state is never mutated.
pub fn score_candidates<R: Rng>(
    state: &GameState,
    candidates: &[MoveRecord],
    tier: SkillTier,
    rng: &mut R,
) -> Vec<ScoredMove> {
    candidates
        .iter()
        .map(|record| {
            let score = score_move(state, record, tier, rng);
            log::debug!("{:?} scores {} at {}", tier, record.san, score);
            ScoredMove {
                record: record.clone(),
                score,
            }
        })
        .collect()
}

/// Deterministic score plus the tier's random jitter.
pub fn score_move<R: Rng>(
    state: &GameState,
    record: &MoveRecord,
    tier: SkillTier,
    rng: &mut R,
) -> i32 {
    let profile = tier.profile();
    let jitter = if profile.jitter > 0 {
        rng.gen_range(0..=profile.jitter)
    } else {
        0
    };
    score_move_raw(state, record, tier) + jitter
}

/// The jitter-free score of one candidate move.
///
/// The move is tried on a copy of the current board; `chess::Board` is
/// `Copy`, so the game state cannot leak a half-applied move no matter how
/// this function exits.
pub fn score_move_raw(state: &GameState, record: &MoveRecord, tier: SkillTier) -> i32 {
    let profile = tier.profile();
    let before = state.current();
    let side = before.side_to_move();
    let after = before.make_move_new(record.mv);

    let mut score = exchange_term(record);

    if after.status() == BoardStatus::Checkmate {
        return score + MATE_SCORE;
    }
    if state.would_draw(record, &after) {
        score += DRAW_PENALTY;
    }
    if after.checkers().popcnt() > 0 {
        score += CHECK_BONUS;
    }

    if profile.positional() {
        score += positional_terms(&after, side, profile);
        if profile.opening_weight > 0 && state.num_moves() < profile.opening_move_limit {
            score += profile.opening_weight * evaluation::opening_principles(&before, record);
        }
    }
    score
}

/// Immediate material payoff of a capture: the victim's value plus a bonus
/// for winning the exchange outright.
fn exchange_term(record: &MoveRecord) -> i32 {
    let Some(victim) = record.captured else {
        return 0;
    };
    let gain = evaluation::piece_value(victim);
    let risk = evaluation::piece_value(record.piece);
    gain + (gain - risk).max(0) / 2
}

fn positional_terms(after: &Board, side: Color, profile: &TierProfile) -> i32 {
    let phase = evaluation::phase(after);

    let mut score = evaluation::material(after, side);
    score += profile.pst_weight * evaluation::piece_square(after, side, phase);
    score += profile.king_safety_weight * evaluation::king_safety(after, side, phase);
    score += profile.pawn_weight
        * if profile.full_pawn_scan {
            evaluation::pawn_structure_full(after, side)
        } else {
            evaluation::pawn_structure_coarse(after, side)
        };
    score += profile.attack_weight * ATTACK_ZONE_BONUS * evaluation::king_attack_pressure(after, side);
    score += profile.mobility_weight * MOBILITY_BONUS * evaluation::mobility(after, side);

    if profile.center_weight > 0 {
        score += profile.center_weight * evaluation::center_control(after, side);
    }
    if profile.endgame_technique && phase == GamePhase::Endgame {
        score += evaluation::endgame_position(after, side);
    }
    if profile.threat_scan {
        score -= evaluation::hanging_value(after, side);
    }
    score
}
