use chess::Color;

use sparring_engine::{
    ClockConfig, GameState, Opponent, SkillTier, TurnOutcome, cancel_pair,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} [{}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                message
            ))
        })
        .level(log::LevelFilter::Info)
        .chain(std::io::stderr())
        .chain(fern::log_file("./sparring.log")?)
        .apply()?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    runtime.block_on(run_match(SkillTier::Advanced, SkillTier::Beginner, 30))
}

/// Short self-play exhibition between two tiers, with the surrounding
/// clock's bookkeeping done out here where it belongs.
async fn run_match(
    white_tier: SkillTier,
    black_tier: SkillTier,
    max_plies: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut state = GameState::new();
    let mut white = Opponent::new(white_tier);
    let mut black = Opponent::new(black_tier);

    let clock = ClockConfig::default();
    let mut remaining = [clock.initial, clock.initial];
    let mut move_list: Vec<String> = Vec::new();

    log::info!("{white_tier:?} (White) vs {black_tier:?} (Black)");

    for _ in 0..max_plies {
        let side = state.side_to_move();
        let opponent = match side {
            Color::White => &mut white,
            Color::Black => &mut black,
        };

        let (_handle, mut token) = cancel_pair();
        match opponent.take_turn(&mut state, &mut token).await {
            TurnOutcome::Played(record) => {
                let seat = side.to_index();
                let spent = opponent.tier().profile().think_delay;
                remaining[seat] = remaining[seat].saturating_sub(spent) + clock.increment;
                move_list.push(record.san);
            }
            TurnOutcome::NoLegalMoves => {
                log::info!("game over for {side:?}");
                break;
            }
            TurnOutcome::Cancelled | TurnOutcome::Rejected => break,
        }
    }

    log::info!("moves: {}", move_list.join(" "));
    log::info!(
        "clocks after {} plies: white {:?}, black {:?}",
        move_list.len(),
        remaining[0],
        remaining[1]
    );
    if state.is_checkmate() {
        log::info!("checkmate, {:?} wins", !state.side_to_move());
    } else if state.is_stalemate() || state.can_draw() {
        log::info!("drawn");
    }
    Ok(())
}
