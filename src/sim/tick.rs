//! Simulation orchestrator
//!
//! Advances one frame of gameplay in a fixed order: player, camera,
//! auto-attack, spawning, enemy AI, projectiles and pickups, collision
//! resolution, pickup drains, cleanup, effect decay. Entities flagged dead
//! or spent leave the containers only in the cleanup sweep at the end of the
//! tick, never mid-pass.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::collision::{self, CollisionOutcome};
use super::entities::{Loot, LootKind, Projectile, XpOrb};
use super::map::MapBounds;
use super::math::{decay_scalar, direction_or_zero, distance_sq};
use super::state::{GameEvent, GamePhase, GameState};
use super::upgrade;
use crate::consts::*;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Movement intent; anything longer than a unit vector is normalized
    pub movement: Vec2,
    /// Explicit aim target in world coordinates; None = auto-aim at the
    /// nearest enemy in range
    pub aim: Option<Vec2>,
    /// Pause toggle (one-shot)
    pub pause: bool,
    /// Restart command; the only way out of GameOver
    pub restart: bool,
    /// Index into the current upgrade offer (LevelUp phase only)
    pub choose_upgrade: Option<usize>,
}

/// Advance the game by one frame. `dt` is wall-clock seconds since the last
/// frame, clamped inside so scheduler stalls never cause runaway catch-up.
pub fn tick(state: &mut GameState, input: &TickInput, bounds: &dyn MapBounds, dt: f32) {
    if input.restart {
        state.restart();
        return;
    }

    // Pause toggles gameplay only; the level-up overlay owns the screen and
    // the game-over screen only listens for restart
    if input.pause {
        match state.phase {
            GamePhase::Running => {
                state.phase = GamePhase::Paused;
                return;
            }
            GamePhase::Paused => state.phase = GamePhase::Running,
            _ => {}
        }
    }

    match state.phase {
        GamePhase::Paused | GamePhase::GameOver => return,
        GamePhase::LevelUp => {
            handle_upgrade_choice(state, input);
            return;
        }
        GamePhase::Running => {}
    }

    let dt = dt.min(MAX_FRAME_DT);
    state.elapsed += dt;

    // Player movement and timers
    state.player.update(dt, input.movement, bounds);

    // Fatal-only condition: the run ends here and only restart recovers
    if state.player.health <= 0.0 {
        finish_run(state, false);
        return;
    }

    state.camera.follow(state.player.pos, dt);

    fire_if_ready(state, input);

    // Spawn scheduler: waves, difficulty, boss timeline
    let batch = state.scheduler.update(
        dt,
        state.elapsed,
        &state.config,
        state.player.pos,
        bounds,
        &mut state.rng,
    );
    for mut enemy in batch.spawned {
        enemy.id = state.next_entity_id();
        state.enemies.push(enemy);
    }
    for event in batch.events {
        if matches!(event, GameEvent::BossSpawned) {
            state.camera.add_shake(0.6);
        }
        state.push_event(event);
    }

    // Enemy AI; ranged attack requests become projectiles afterwards
    let player_pos = state.player.pos;
    let mut shots = Vec::new();
    for enemy in &mut state.enemies {
        if let Some(shot) = enemy.update(dt, player_pos, bounds) {
            shots.push((enemy.id, shot));
        }
    }
    for (enemy_id, shot) in shots {
        let id = state.next_entity_id();
        state.projectiles.push(Projectile::from_enemy(id, enemy_id, &shot));
    }

    // Projectiles, orbs, loot
    for projectile in &mut state.projectiles {
        projectile.update(dt);
    }
    let attract_radius = ORB_ATTRACT_RADIUS * state.session.pickup_radius_multiplier;
    for orb in &mut state.orbs {
        orb.update(dt, player_pos, attract_radius);
    }
    for item in &mut state.loot {
        item.update(dt, player_pos);
    }

    // Resolve and apply collisions
    let outcome = collision::resolve(
        &mut state.player,
        &mut state.enemies,
        &mut state.projectiles,
        &mut state.rng,
    );
    let boss_down = apply_collision_outcome(state, &outcome);

    // Drain pickups collected this tick
    let levels_gained = collect_pickups(state);

    // Cleanup sweep: flagged records leave the simulation here, never earlier
    state.enemies.retain(|enemy| !enemy.dead);
    state.projectiles.retain(|projectile| projectile.active);
    state.orbs.retain(|orb| !orb.collected && !orb.expired());
    state.loot.retain(|item| !item.collected && !item.expired());

    // Transient screen effects
    state.camera.decay_shake(dt);
    state.hit_flash = decay_scalar(state.hit_flash, HIT_FLASH_DECAY, dt);

    if boss_down {
        finish_run(state, true);
        return;
    }

    if levels_gained > 0 {
        state.pending_level_ups += levels_gained;
        open_upgrade_offer(state);
    }
}

/// Fire the auto-attack if the cooldown elapsed and a target exists.
fn fire_if_ready(state: &mut GameState, input: &TickInput) {
    if !state.player.attack_ready() {
        return;
    }
    // Pointer aim wins; otherwise lock on the nearest enemy in range
    let target = match input.aim {
        Some(target) => Some(target),
        None => {
            let range_sq = state.player.range * state.player.range;
            state
                .nearest_enemy(state.player.pos)
                .filter(|enemy| distance_sq(state.player.pos, enemy.pos) <= range_sq)
                .map(|enemy| enemy.pos)
        }
    };
    let Some(target) = target else { return };

    let dir = direction_or_zero(state.player.pos, target);
    if dir == Vec2::ZERO {
        return; // degenerate aim, hold fire
    }

    let id = state.next_entity_id();
    let projectile = Projectile::from_player(id, &state.player, dir);
    state.projectiles.push(projectile);
    state.player.attack_timer = state.player.attack_cooldown;
}

/// Apply a resolution pass: score, kill-site drops, outbound events.
/// Returns whether the boss went down this tick.
fn apply_collision_outcome(state: &mut GameState, outcome: &CollisionOutcome) -> bool {
    if outcome.player_hit {
        state.push_event(GameEvent::PlayerHit);
        state.camera.add_shake(0.3);
        state.hit_flash = 1.0;
    }

    let mut boss_down = false;
    for hit in &outcome.hits {
        state.push_event(GameEvent::ProjectileImpact {
            x: hit.pos.x,
            y: hit.pos.y,
            color: hit.color,
            is_aoe: hit.aoe,
        });
        if !hit.killed {
            continue;
        }

        // The corpse is still in the container until the cleanup sweep
        let Some((xp_value, is_boss, pos)) = state
            .enemies
            .iter()
            .find(|enemy| enemy.id == hit.enemy_id)
            .map(|enemy| (enemy.xp_value, enemy.is_boss(), enemy.pos))
        else {
            continue;
        };

        state.kills += 1;
        state.score += xp_value as u64 * 10;
        state.push_event(GameEvent::EnemyKilled {
            x: pos.x,
            y: pos.y,
            color: hit.color,
            is_boss,
        });
        if is_boss {
            boss_down = true;
            state.camera.add_shake(1.0);
        }

        let orb_id = state.next_entity_id();
        state.orbs.push(XpOrb::new(orb_id, pos, xp_value));

        if state.rng.random::<f32>() < state.session.loot_drop_chance {
            let kind = roll_loot(&mut state.rng);
            let loot_id = state.next_entity_id();
            state.loot.push(Loot::new(loot_id, pos, kind));
        }
    }
    boss_down
}

fn roll_loot(rng: &mut Pcg32) -> LootKind {
    match rng.random_range(0..10u32) {
        0..=4 => LootKind::Coin { value: 25 },
        5..=7 => LootKind::Medkit { heal: 25.0 },
        _ => LootKind::Magnet,
    }
}

/// Drain collected orbs and loot, applying their effects. Returns how many
/// level-ups the XP earned.
fn collect_pickups(state: &mut GameState) -> u32 {
    let collected_orbs: Vec<(Vec2, u32)> = state
        .orbs
        .iter()
        .filter(|orb| orb.collected)
        .map(|orb| (orb.pos, orb.value))
        .collect();

    let mut levels = 0;
    for (pos, value) in collected_orbs {
        levels += upgrade::grant_xp(
            &mut state.player,
            &state.session,
            &state.config.leveling,
            state.config.enemy_xp_multiplier,
            value,
        );
        state.push_event(GameEvent::XpCollected { x: pos.x, y: pos.y });
    }

    let collected_loot: Vec<LootKind> = state
        .loot
        .iter()
        .filter(|item| item.collected)
        .map(|item| item.kind)
        .collect();

    let mut magnet = false;
    for kind in collected_loot {
        match kind {
            LootKind::Medkit { heal } => state.player.heal(heal),
            LootKind::Magnet => magnet = true,
            LootKind::Coin { value } => state.score += value as u64,
        }
    }
    if magnet {
        for orb in &mut state.orbs {
            orb.attracted = true;
        }
    }

    levels
}

/// Present the next queued level-up, pausing the simulation. Levels whose
/// offer comes up empty (exhausted catalog) are skipped rather than holding
/// the run hostage.
fn open_upgrade_offer(state: &mut GameState) {
    while state.pending_level_ups > 0 {
        let offer = upgrade::roll_offer(&mut state.rng);
        if offer.is_empty() {
            state.pending_level_ups -= 1;
            continue;
        }
        state.offered = offer.iter().map(|upgrade| upgrade.id).collect();
        state.phase = GamePhase::LevelUp;
        state.push_event(GameEvent::LevelUpOffered {
            upgrades: state.offered.clone(),
        });
        return;
    }
    state.phase = GamePhase::Running;
}

/// Apply the selected card and advance the queue. Out-of-range selections
/// are ignored; the overlay stays up until a valid pick lands.
fn handle_upgrade_choice(state: &mut GameState, input: &TickInput) {
    let Some(index) = input.choose_upgrade else {
        return;
    };
    let Some(&id) = state.offered.get(index) else {
        return;
    };

    upgrade::apply(id, &mut state.player, &mut state.session);
    state.offered.clear();
    state.pending_level_ups = state.pending_level_ups.saturating_sub(1);
    open_upgrade_offer(state);
}

/// The run is over. Terminal: only an explicit restart re-initializes.
fn finish_run(state: &mut GameState, victory: bool) {
    state.phase = GamePhase::GameOver;
    state.push_event(GameEvent::GameOver {
        victory,
        score: state.score,
        elapsed: state.elapsed,
    });
    log::info!(
        "run over: victory={victory}, score={}, t={:.1}s",
        state.score,
        state.elapsed
    );
}
