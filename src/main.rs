//! Swarmfall demo entry point
//!
//! Headless session runner: drives the simulation with a small autopilot so
//! a run can be watched through logs without a renderer attached.
//!
//! ```text
//! swarmfall [seed] [seconds] [stage] [character]
//! ```

use glam::Vec2;

use swarmfall::sim::{GameEvent, GamePhase, GameState, RectBounds, TickInput, tick};

const DT: f32 = 1.0 / 60.0;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let seed: u64 = args
        .next()
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(0xC0FFEE);
    let max_seconds: f32 = args
        .next()
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(120.0);
    let stage = args.next().unwrap_or_else(|| "overgrown-yard".into());
    let character = args.next().unwrap_or_else(|| "ranger".into());

    let bounds = RectBounds::new(2400.0, 2400.0);
    let mut state = GameState::from_ids(seed, &stage, &character);

    let ticks = (max_seconds / DT) as u32;
    for _ in 0..ticks {
        let input = autopilot(&state);
        tick(&mut state, &input, &bounds, DT);
        for event in state.drain_events() {
            report(&event);
        }
        if state.phase == GamePhase::GameOver {
            break;
        }
    }

    println!("--- run summary ---");
    println!("stage:    {}", state.config.id);
    println!("seed:     {}", state.seed);
    println!("time:     {:.1}s", state.elapsed);
    println!("level:    {}", state.player.level);
    println!("kills:    {}", state.kills);
    println!("score:    {}", state.score);
    println!("upgrades: {:?}", state.player.upgrades);
}

/// Kite away from the enemy pack and always take the first upgrade card.
fn autopilot(state: &GameState) -> TickInput {
    let mut input = TickInput::default();

    if state.phase == GamePhase::LevelUp {
        input.choose_upgrade = Some(0);
        return input;
    }

    // Run from the local center of mass of nearby enemies
    let player_pos = state.player.pos;
    let mut threat = Vec2::ZERO;
    let mut nearby = 0;
    for enemy in state.enemies.iter().filter(|enemy| !enemy.dead) {
        let offset = enemy.pos - player_pos;
        if offset.length_squared() < 300.0 * 300.0 {
            threat += offset;
            nearby += 1;
        }
    }
    if nearby > 0 {
        input.movement = (-threat).normalize_or_zero();
    } else {
        // Drift back toward the arena center while it is quiet
        input.movement = (-player_pos).normalize_or_zero() * 0.4;
    }
    input
}

fn report(event: &GameEvent) {
    match event {
        GameEvent::BossTelegraph => log::info!("[cue] boss incoming"),
        GameEvent::BossSpawned => log::info!("[cue] boss has arrived"),
        GameEvent::EnemyKilled { is_boss: true, .. } => log::info!("[cue] boss down"),
        GameEvent::LevelUpOffered { upgrades } => {
            log::info!("[cue] level up, cards: {upgrades:?}")
        }
        GameEvent::GameOver {
            victory,
            score,
            elapsed,
        } => log::info!("[cue] game over: victory={victory} score={score} t={elapsed:.1}s"),
        _ => {}
    }
}
