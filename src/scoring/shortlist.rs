use rand::Rng;
use rand::seq::SliceRandom;

use crate::config::SkillTier;
use crate::game::MoveRecord;
use crate::scoring::ScoredMove;

/// Candidates ordered best-first. The sort is stable, so equal scores keep
/// their generation order and ranking stays deterministic for a fixed
/// move-generation order.
pub fn rank(scored: &[ScoredMove]) -> Vec<ScoredMove> {
    let mut ranked = scored.to_vec();
    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked
}

/// Pick one move uniformly from the tier's shortlist of top candidates.
///
/// Returns None only for an empty slate, which means the side to move has no
/// legal move at all: game over, not an engine fault.
pub fn pick<R: Rng>(scored: &[ScoredMove], tier: SkillTier, rng: &mut R) -> Option<MoveRecord> {
    if scored.is_empty() {
        return None;
    }
    let ranked = rank(scored);
    let cutoff = tier.profile().shortlist.min(ranked.len());
    ranked[..cutoff].choose(rng).map(|sm| sm.record.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use chess::{ChessMove, Piece, Square};

    fn scored(square_pairs: &[(Square, Square, i32)]) -> Vec<ScoredMove> {
        square_pairs
            .iter()
            .map(|&(from, to, score)| ScoredMove {
                record: MoveRecord {
                    mv: ChessMove::new(from, to, None),
                    piece: Piece::Pawn,
                    captured: None,
                    is_castling: false,
                    san: format!("{to}"),
                },
                score,
            })
            .collect()
    }

    #[test]
    fn empty_slate_yields_no_move() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(pick(&[], SkillTier::Advanced, &mut rng).is_none());
    }

    #[test]
    fn picked_move_is_always_a_candidate() {
        let slate = scored(&[
            (Square::E2, Square::E4, 30),
            (Square::D2, Square::D4, 20),
            (Square::G1, Square::F3, 10),
            (Square::B1, Square::C3, 0),
        ]);
        let mut rng = StdRng::seed_from_u64(99);
        for tier in [
            SkillTier::Beginner,
            SkillTier::Intermediate,
            SkillTier::Advanced,
        ] {
            for _ in 0..50 {
                let chosen = pick(&slate, tier, &mut rng).unwrap();
                assert!(slate.iter().any(|sm| sm.record == chosen));
            }
        }
    }

    #[test]
    fn shortlist_clamps_to_available_moves() {
        // Beginner wants five, only two exist.
        let slate = scored(&[(Square::E2, Square::E4, 5), (Square::D2, Square::D4, 1)]);
        let mut rng = StdRng::seed_from_u64(3);
        let chosen = pick(&slate, SkillTier::Beginner, &mut rng).unwrap();
        assert!(slate.iter().any(|sm| sm.record == chosen));
    }

    #[test]
    fn advanced_only_samples_the_top_two() {
        let slate = scored(&[
            (Square::E2, Square::E4, 100),
            (Square::D2, Square::D4, 90),
            (Square::G1, Square::F3, -5),
        ]);
        let mut rng = StdRng::seed_from_u64(21);
        for _ in 0..100 {
            let chosen = pick(&slate, SkillTier::Advanced, &mut rng).unwrap();
            assert_ne!(chosen.san, "f3");
        }
    }

    #[test]
    fn ties_keep_generation_order() {
        let slate = scored(&[
            (Square::E2, Square::E4, 10),
            (Square::D2, Square::D4, 10),
            (Square::C2, Square::C4, 10),
        ]);
        let ranked = rank(&slate);
        assert_eq!(ranked[0].record.san, "e4");
        assert_eq!(ranked[1].record.san, "d4");
        assert_eq!(ranked[2].record.san, "c4");
    }

    #[test]
    fn ranking_is_descending() {
        let slate = scored(&[
            (Square::E2, Square::E4, -20),
            (Square::D2, Square::D4, 40),
            (Square::C2, Square::C4, 0),
        ]);
        let ranked = rank(&slate);
        let scores: Vec<i32> = ranked.iter().map(|sm| sm.score).collect();
        assert_eq!(scores, vec![40, 0, -20]);
    }
}
