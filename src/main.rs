//! Fizzi Zone entry point
//!
//! The browser build is driven from JavaScript through `fizzi_zone::web`.
//! Natively this runs one headless round with an autoplayer on a manual
//! clock, storing the played flag in the temp directory so a second run
//! shows the returning-player path.

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use fizzi_zone::persistence::FileStore;
    use fizzi_zone::platform::ManualScheduler;
    use fizzi_zone::sim::{GamePhase, GameSession, Reward, Target, TargetKind};
    use fizzi_zone::{Arcade, ArcadeEvent, Tuning, TuningError};

    /// Autoplayer reaction step
    const STEP_MS: u64 = 100;

    struct Falling {
        target: Target,
        lands_at_ms: u64,
    }

    pub fn run(seed: u64) -> Result<(), TuningError> {
        let store = FileStore::new(std::env::temp_dir().join("fizzi_zone_flags.json"));
        log::info!("Played flag file: {}", store.path().display());

        let scheduler = ManualScheduler::new();
        let session = GameSession::new(Tuning::default(), seed, Box::new(store))?;
        let arcade = Arcade::new(session, scheduler.clone());

        let falling: Rc<RefCell<VecDeque<Falling>>> = Rc::default();
        {
            let falling = falling.clone();
            let clock = scheduler.clone();
            arcade.set_listener(move |event, snapshot| match event {
                ArcadeEvent::TargetSpawned(target) => {
                    let fall_ms = (target.fall_secs * 1000.0) as u64;
                    falling.borrow_mut().push_back(Falling {
                        target: target.clone(),
                        lands_at_ms: clock.now_ms() + fall_ms,
                    });
                }
                ArcadeEvent::TargetResolved(r) => log::debug!(
                    "Tapped {} for {} (score {}, lives {})",
                    r.target.kind.as_str(),
                    r.points,
                    snapshot.raw_score,
                    snapshot.lives
                ),
                ArcadeEvent::Tick { time_remaining } if time_remaining % 10 == 0 => {
                    log::info!("{} s left, score {}", time_remaining, snapshot.score)
                }
                ArcadeEvent::PhaseChanged(phase) => log::info!("Phase: {}", phase.as_str()),
                _ => {}
            });
        }

        arcade.enter_screen();
        arcade.get_ready();

        // Taps most cans and diamonds, fat-fingers the odd bomb
        let mut player = Pcg32::seed_from_u64(seed.wrapping_add(1));
        while arcade.snapshot().phase != GamePhase::GameOver {
            scheduler.advance(STEP_MS);
            let now = scheduler.now_ms();
            let due: Vec<Falling> = falling.borrow_mut().drain(..).collect();
            for item in due {
                let tap_chance = match item.target.kind {
                    TargetKind::Bomb => 0.04,
                    TargetKind::Diamond => 0.5,
                    _ => 0.15,
                };
                if player.random_bool(tap_chance) {
                    arcade.resolve_target(item.target.id);
                } else if now >= item.lands_at_ms {
                    arcade.expire_target(item.target.id);
                } else {
                    falling.borrow_mut().push_back(item);
                }
            }
        }

        match arcade.summary() {
            Some(summary) => {
                println!("Game over!");
                println!("  Final score: {}", summary.final_score);
                println!("  Time played: {} s", summary.time_played);
                println!("  Lives left:  {}", summary.lives_left);
                match &summary.reward {
                    Reward::FirstTime {
                        promo_code,
                        redeemable_dollars,
                    } => {
                        if summary.shows_scratch_card() {
                            println!("  Redeemable:  ${}", redeemable_dollars);
                            println!("  Promo code:  {}", promo_code);
                        }
                        println!("  Find a Fizzi store near you!");
                    }
                    Reward::Returning { message } => println!("  {}", message),
                }
            }
            None => log::warn!("Round ended without a summary"),
        }
        arcade.leave_screen();
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();

    let seed = match std::env::args().nth(1) {
        Some(arg) => match arg.parse::<u64>() {
            Ok(seed) => seed,
            Err(_) => {
                eprintln!("usage: fizzi-zone [seed]");
                std::process::exit(2);
            }
        },
        None => std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0),
    };
    log::info!("Fizzi Zone (native demo) starting with seed {}", seed);

    if let Err(e) = demo::run(seed) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is fizzi_zone::web::start, this is just to satisfy the compiler
}
