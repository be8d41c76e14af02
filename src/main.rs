//! Neon Breaker entry point
//!
//! The browser build is driven from JS through `neon_breaker::wasm`. The
//! native binary plays a headless demo: the autopilot runs one session per
//! variant and the outcome is logged.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use neon_breaker::consts::SIM_DT;
    use neon_breaker::persistence::MemoryStorage;
    use neon_breaker::sim::{GameEvent, GamePhase, TickInput};
    use neon_breaker::{Session, Tuning, Variant};

    env_logger::init();
    log::info!("Neon Breaker (native) starting...");

    // Optional args: variant name, then seed
    let mut args = std::env::args().skip(1);
    let variants = match args.next().as_deref().map(Variant::from_str) {
        Some(Some(v)) => vec![v],
        Some(None) => {
            eprintln!("Unknown variant; expected neon, meta or classic");
            std::process::exit(2);
        }
        None => vec![Variant::Neon, Variant::Meta, Variant::Classic],
    };
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(42);

    let input = TickInput {
        idle_mode: true,
        ..Default::default()
    };
    // Five simulated minutes per variant
    let ticks = (5.0 * 60.0 / SIM_DT) as u64;

    for variant in variants {
        let mut session = Session::new(Tuning::preset(variant), seed, MemoryStorage::new());
        let mut levels_cleared = 0;
        let mut blocks = 0;

        for _ in 0..ticks {
            session.tick(&input, SIM_DT);
            for event in session.drain_events() {
                match event {
                    GameEvent::BlockDestroyed { .. } => blocks += 1,
                    GameEvent::LevelCleared { .. } => levels_cleared += 1,
                    GameEvent::GameOver { score, rank } => {
                        log::info!("{}: game over at {} (rank {:?})", variant.as_str(), score, rank)
                    }
                    _ => {}
                }
            }
        }

        let state = session.state();
        println!(
            "{:<8} games={} levels_cleared={} blocks={} level={} score={} best={:?} gold={}{}",
            variant.as_str(),
            session.games_played(),
            levels_cleared,
            blocks,
            state.round.level,
            state.round.score,
            session.high_scores().top_score(),
            session.progress().gold,
            if session.phase() == GamePhase::GameOver { " (over)" } else { "" },
        );
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is neon_breaker::wasm::wasm_start, this is just to satisfy the compiler
}
