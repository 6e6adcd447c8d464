//! Henry's Bierolympiade entry point
//!
//! The browser build starts from `web::wasm_main`. Natively this runs a
//! headless mug sliding match with a jittery scripted player, which is handy
//! for checking balance changes from the terminal:
//!
//! ```text
//! RUST_LOG=info cargo run -- hard
//! ```

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use bierolympiade::game::Stage;
    use bierolympiade::platform::MemoryStore;
    use bierolympiade::sim::{Dice, GameEvent, GameMode, TurnPhase};
    use bierolympiade::{Difficulty, Game};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    env_logger::init();

    let difficulty = std::env::args()
        .nth(1)
        .and_then(|arg| Difficulty::from_str(&arg))
        .unwrap_or_default();
    let seed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    log::info!("Headless match on {} with seed {}", difficulty, seed);

    let mut game = Game::new(Box::new(MemoryStore::new()), Pcg32::seed_from_u64(seed));
    let mut hand = Pcg32::seed_from_u64(seed.rotate_left(17));
    let sweet = game.tuning().sweet_spot_power();
    game.start(GameMode::Schieben, difficulty);

    loop {
        let phase = match game.stage() {
            Stage::Shuffle(m) => m.phase,
            _ => break,
        };
        match phase {
            TurnPhase::Power => {
                game.action(sweet + hand.range(-8.0, 8.0));
            }
            TurnPhase::Angle { .. } => {
                game.action(hand.range(-6.0, 6.0));
            }
            _ => game.tick(100),
        }

        for event in game.drain_events() {
            match event {
                GameEvent::TurnResolved(turn) => println!(
                    "  {:?}: power {:5.1}, angle {:5.1} -> {:?} ({} points)",
                    turn.actor, turn.power, turn.angle, turn.outcome, turn.score
                ),
                GameEvent::RoundEnded {
                    round,
                    player_score,
                    opponent_score,
                    ..
                } => println!("Round {}: {} - {}", round, player_score, opponent_score),
                GameEvent::MatchFinished {
                    outcome,
                    player_total,
                    opponent_total,
                } => println!(
                    "Final: {} - {} ({:?})",
                    player_total, opponent_total, outcome
                ),
                _ => {}
            }
        }
    }

    if let Some(rank) = game.submit_name("Henry") {
        println!("New high score at rank {}", rank);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is web::wasm_main, this is just to satisfy the compiler
}
