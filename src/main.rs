//! Entropy Breaker entry point
//!
//! Drives a headless scripted run through the core at a fixed timestep and
//! logs what the HUD would show. `RUST_LOG=debug` shows the economy records.
//!
//! Usage: `entropy-breaker [SEED] [LEVELS]` (see `--help`)

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use entropy_breaker::round::{EntropyActionKind, RiskTier};
    use entropy_breaker::{
        BrickKind, CoreConfig, FrameInput, GameCore, ImpactEvent, ManualClock, Preferences,
    };
    use glam::Vec2;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    /// Simulation step (120 Hz)
    const FRAME_DT: f64 = 1.0 / 120.0;
    /// Bail out of a level that runs this long
    const MAX_LEVEL_SECS: f64 = 120.0;
    const ROWS: u32 = 5;
    const COLS: u32 = 8;

    pub fn run(seed: u64, levels: u32) {
        let clock = ManualClock::new(0.0);
        let config = CoreConfig {
            seed: Some(seed),
            ..Default::default()
        };
        let mut core = GameCore::new(config, Preferences::default(), clock.clone());
        // Stands in for physics; separate from the core's own RNG
        let mut physics = Pcg32::seed_from_u64(seed ^ 0x9e37_79b9_7f4a_7c15);

        let mut audio_secs = 0.0;
        let mut visual_secs = 0.0;

        for level in 0..levels {
            if !core.begin_level(level, ROWS * COLS) {
                log::info!("Run over before level {}", level);
                break;
            }

            let mut remaining: Vec<(u32, u32)> = (0..ROWS)
                .flat_map(|row| (0..COLS).map(move |col| (row, col)))
                .collect();
            let mut level_secs = 0.0;

            while core.session().is_active() && level_secs < MAX_LEVEL_SECS {
                clock.advance_secs(FRAME_DT);
                level_secs += FRAME_DT;
                visual_secs += FRAME_DT;
                // The audio scheduler runs slightly slow, then catches up
                audio_secs += FRAME_DT * if level_secs % 20.0 < 10.0 { 0.995 } else { 1.005 };

                let mut input = FrameInput {
                    dt: FRAME_DT,
                    audio_seconds: audio_secs,
                    visual_seconds: Some(visual_secs),
                    row_count: ROWS,
                    ..Default::default()
                };

                if !remaining.is_empty() && physics.random_bool(0.02) {
                    let pick = physics.random_range(0..remaining.len());
                    let (row, col) = remaining.swap_remove(pick);
                    let velocity = Vec2::new(
                        physics.random_range(-300.0..300.0),
                        physics.random_range(120.0..420.0),
                    );
                    input.brick_breaks.push(brick_at(row, col, velocity));
                }
                if physics.random_bool(0.0008) {
                    input.lives_lost.push("ball drained".to_string());
                }

                let report = core.tick(&input);
                for event in &report.events {
                    log::debug!("{:?}", event);
                }
            }

            let snapshot = core.snapshot();
            match snapshot.to_json() {
                Ok(json) => log::info!("Snapshot: {}", json),
                Err(e) => log::warn!("Snapshot serialization failed: {}", e),
            }
            let recap = core.round_recap();
            log::info!(
                "Level {} recap: +{} points, best combo {} (run {}), auto-completed: {}",
                recap.level_index,
                recap.points_gained,
                recap.highest_combo_round,
                recap.highest_combo_run,
                recap.auto_completed
            );

            if !core.session().status().is_terminal() || core.session().lives_remaining() == 0 {
                break;
            }
            between_levels(&mut core);
        }

        let snapshot = core.snapshot();
        log::info!(
            "Final: {} after {} rounds, {} coins, drift peak {:.1}ms",
            snapshot.score,
            snapshot.round_number,
            snapshot.coins,
            core.drift().status().peak_ms
        );
        for entry in &snapshot.hud.entries {
            println!("{:>8}  {}", entry.label, entry.value);
        }
    }

    fn brick_at(row: u32, col: u32, velocity: Vec2) -> ImpactEvent {
        let kind = match (row, col % 4) {
            (0, _) => BrickKind::Armored,
            (_, 0) if row % 2 == 1 => BrickKind::Crystal,
            (2, 3) => BrickKind::Explosive,
            (4, _) if col == 7 => BrickKind::PowerUpCapsule,
            _ => BrickKind::Glass,
        };
        let hp = if kind == BrickKind::Armored { 2 } else { 1 };
        ImpactEvent::new(row, col, velocity, kind).with_hit_points(hp)
    }

    /// Reward and bias phase, choosing the way a cautious player would
    fn between_levels(core: &mut GameCore) {
        if core.purchase_entropy_action(EntropyActionKind::Reroll) {
            log::info!("Bought a reroll token");
        }

        if let Some(reward) = core.offer_reward() {
            log::info!("Offered: {}", reward.label());
            if !reward.is_economic() {
                if let Some(rerolled) = core.reroll_reward() {
                    log::info!("Rerolled into: {}", rerolled.label());
                }
            }
            core.lock_reward();
            if let Some(claimed) = core.claim_reward() {
                log::info!("Claimed: {}", claimed.label());
            }
        }

        let options = core.enter_bias_phase();
        let choice = options
            .iter()
            .find(|o| o.tier == RiskTier::Safe)
            .or(options.first())
            .map(|o| o.id.clone());
        match choice {
            Some(id) => {
                if let Some(selected) = core.select_bias(&id) {
                    log::info!("Bias: {} ({})", selected.label, selected.tier.as_str());
                }
            }
            None => core.skip_bias_phase(),
        }
    }
}

/// Headless scripted run of the Entropy Breaker core
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, clap::Parser)]
#[command(name = "entropy-breaker", version, about)]
struct Args {
    /// Seed for the core and the scripted physics; random when omitted
    seed: Option<u64>,

    /// Number of levels to play
    #[arg(default_value_t = 3)]
    levels: u32,
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use clap::Parser;

    let args = Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let seed = args.seed.unwrap_or_else(rand::random::<u64>);
    log::info!("Entropy Breaker (headless) starting, seed {}", seed);
    demo::run(seed, args.levels);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is driven by the host page on the web; nothing to run here
}
