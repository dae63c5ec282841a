use std::time::Duration;

/// Playing strength of the synthetic opponent.
///
/// Each tier is a fixed bundle of constants; nothing here is tuned at
/// runtime. Weaker tiers think longer, inject more random jitter into move
/// scores and sample from a longer shortlist, so they play more erratically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SkillTier {
    Beginner,
    Intermediate,
    Advanced,
}

/// Constant bundle owned by a [`SkillTier`].
///
/// Term weights are additive multipliers on the centipawn scale; a weight of
/// zero disables the term for that tier.
#[derive(Debug, Clone, Copy)]
pub struct TierProfile {
    /// Simulated thinking delay before a chosen move is committed.
    pub think_delay: Duration,
    /// Upper bound of the uniform random jitter added to every move score.
    pub jitter: i32,
    /// Number of top-ranked candidates the selector samples from.
    pub shortlist: usize,
    pub pst_weight: i32,
    pub pawn_weight: i32,
    pub king_safety_weight: i32,
    pub attack_weight: i32,
    pub mobility_weight: i32,
    pub center_weight: i32,
    pub opening_weight: i32,
    /// Opening-principles term applies while fewer plies than this were played.
    pub opening_move_limit: u16,
    /// Advanced pawn scan that also detects passed pawns.
    pub full_pawn_scan: bool,
    /// Penalize the best capture the opponent threatens in reply.
    pub threat_scan: bool,
    /// King-drive / king-proximity technique terms during the endgame.
    pub endgame_technique: bool,
}

const BEGINNER: TierProfile = TierProfile {
    think_delay: Duration::from_millis(3000),
    jitter: 120,
    shortlist: 5,
    pst_weight: 0,
    pawn_weight: 0,
    king_safety_weight: 0,
    attack_weight: 0,
    mobility_weight: 0,
    center_weight: 0,
    opening_weight: 0,
    opening_move_limit: 0,
    full_pawn_scan: false,
    threat_scan: false,
    endgame_technique: false,
};

const INTERMEDIATE: TierProfile = TierProfile {
    think_delay: Duration::from_millis(2000),
    jitter: 40,
    shortlist: 3,
    pst_weight: 1,
    pawn_weight: 1,
    king_safety_weight: 1,
    attack_weight: 1,
    mobility_weight: 1,
    center_weight: 0,
    opening_weight: 1,
    opening_move_limit: 10,
    full_pawn_scan: false,
    threat_scan: false,
    endgame_technique: false,
};

const ADVANCED: TierProfile = TierProfile {
    think_delay: Duration::from_millis(1000),
    jitter: 10,
    shortlist: 2,
    pst_weight: 2,
    pawn_weight: 2,
    king_safety_weight: 3,
    attack_weight: 1,
    mobility_weight: 1,
    center_weight: 1,
    opening_weight: 2,
    opening_move_limit: 16,
    full_pawn_scan: true,
    threat_scan: true,
    endgame_technique: true,
};

impl SkillTier {
    pub const fn profile(self) -> &'static TierProfile {
        match self {
            SkillTier::Beginner => &BEGINNER,
            SkillTier::Intermediate => &INTERMEDIATE,
            SkillTier::Advanced => &ADVANCED,
        }
    }
}

impl TierProfile {
    /// Whether this tier evaluates any positional terms at all.
    #[inline]
    pub fn positional(&self) -> bool {
        self.pst_weight > 0
    }
}

/// Time control of the surrounding game clock.
///
/// The engine itself never reads this; it exists so the caller can configure
/// clock and opponent strength through one surface.
#[derive(Debug, Clone, Copy)]
pub struct ClockConfig {
    pub initial: Duration,
    pub increment: Duration,
}

impl ClockConfig {
    pub const fn new(initial_secs: u64, increment_secs: u64) -> Self {
        Self {
            initial: Duration::from_secs(initial_secs),
            increment: Duration::from_secs(increment_secs),
        }
    }
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self::new(300, 2)
    }
}
