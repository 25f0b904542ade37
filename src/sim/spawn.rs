//! Spawn and difficulty scheduler
//!
//! Drives wave emission, one-directional difficulty escalation, time-based
//! HP scaling and the scripted boss timeline. The scheduler never touches the
//! entity containers directly; it returns a batch of fresh enemies (ids
//! unassigned) and events for the orchestrator to apply.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use std::f32::consts::TAU;

use super::entities::Enemy;
use super::map::MapBounds;
use super::state::GameEvent;
use crate::config::{LevelConfig, SpawnEntry};
use crate::consts::*;

/// Boss timeline for a run. One-way: once spawned, stays spawned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BossState {
    NotStarted,
    /// The "boss incoming" cue has fired
    Telegraphed,
    Spawned,
}

/// Per-run spawn state machine
#[derive(Debug, Clone)]
pub struct Scheduler {
    pub wave_timer: f32,
    pub wave_interval: f32,
    pub difficulty_timer: f32,
    pub enemies_per_wave: u32,
    pub boss_timer: f32,
    pub boss_state: BossState,
}

/// What one scheduler step produced
#[derive(Debug, Default)]
pub struct SpawnBatch {
    /// Fresh enemies; the orchestrator allocates their ids
    pub spawned: Vec<Enemy>,
    pub events: Vec<GameEvent>,
}

impl Scheduler {
    pub fn new(config: &LevelConfig) -> Self {
        Self {
            wave_timer: 0.0,
            wave_interval: config.wave_interval,
            difficulty_timer: 0.0,
            enemies_per_wave: config.enemies_per_wave,
            boss_timer: 0.0,
            boss_state: BossState::NotStarted,
        }
    }

    /// Advance all timers by one tick.
    pub fn update(
        &mut self,
        dt: f32,
        elapsed: f32,
        config: &LevelConfig,
        player_pos: Vec2,
        bounds: &dyn MapBounds,
        rng: &mut Pcg32,
    ) -> SpawnBatch {
        let mut batch = SpawnBatch::default();

        // Difficulty escalation: monotonic, one-directional
        self.difficulty_timer += dt;
        if self.difficulty_timer >= config.difficulty_increase_interval {
            self.difficulty_timer -= config.difficulty_increase_interval;
            self.enemies_per_wave =
                (self.enemies_per_wave + config.enemies_per_wave_step).min(config.max_enemies_per_wave);
            self.wave_interval =
                (self.wave_interval - config.wave_interval_step).max(config.min_wave_interval);
            log::info!(
                "difficulty up: {} enemies every {:.2}s",
                self.enemies_per_wave,
                self.wave_interval
            );
        }

        // Wave emission
        self.wave_timer += dt;
        if self.wave_timer >= self.wave_interval {
            self.wave_timer -= self.wave_interval;
            self.spawn_wave(elapsed, config, player_pos, bounds, rng, &mut batch);
        }

        // Boss timeline
        if let Some(boss_config) = &config.boss {
            self.boss_timer += dt;
            match self.boss_state {
                BossState::NotStarted => {
                    if self.boss_timer >= boss_config.spawn_timer - boss_config.telegraph_lead {
                        self.boss_state = BossState::Telegraphed;
                        batch.events.push(GameEvent::BossTelegraph);
                        log::info!("boss incoming in {:.1}s", boss_config.telegraph_lead);
                    }
                }
                BossState::Telegraphed => {
                    if self.boss_timer >= boss_config.spawn_timer {
                        self.boss_state = BossState::Spawned;
                        let archetype = config.archetype(&boss_config.archetype);
                        let pos = ring_position(player_pos, bounds, rng, boss_config.radius);
                        batch.spawned.push(Enemy::boss(
                            boss_config,
                            &archetype,
                            pos,
                            config.difficulty_multiplier,
                        ));
                        batch.events.push(GameEvent::BossSpawned);
                        log::info!("boss spawned at t={:.1}s", self.boss_timer);
                    }
                }
                BossState::Spawned => {}
            }
        }

        batch
    }

    /// Emit one wave: weighted draws over the enabled roster. An empty or
    /// zero-weight roster spawns nothing (a config problem, not an error).
    fn spawn_wave(
        &self,
        elapsed: f32,
        config: &LevelConfig,
        player_pos: Vec2,
        bounds: &dyn MapBounds,
        rng: &mut Pcg32,
        batch: &mut SpawnBatch,
    ) {
        let enabled: Vec<&SpawnEntry> = config
            .roster
            .iter()
            .filter(|entry| entry.enabled && entry.spawn_rate > 0.0)
            .collect();
        let total_weight: f32 = enabled.iter().map(|entry| entry.spawn_rate).sum();
        if enabled.is_empty() || total_weight <= 0.0 {
            return;
        }

        // Sampled once per wave, not retroactively applied
        let hp_multiplier = config.hp_growth.multiplier_at(elapsed);

        for _ in 0..self.enemies_per_wave {
            let mut roll = rng.random_range(0.0..total_weight);
            let mut chosen = enabled[enabled.len() - 1];
            for entry in &enabled {
                if roll < entry.spawn_rate {
                    chosen = entry;
                    break;
                }
                roll -= entry.spawn_rate;
            }

            let archetype = config.archetype(&chosen.archetype);
            let pos = ring_position(player_pos, bounds, rng, archetype.radius);
            batch.spawned.push(Enemy::from_archetype(
                &archetype,
                pos,
                hp_multiplier,
                config.difficulty_multiplier,
            ));
        }
    }
}

/// Pick a point on the off-screen ring around the player, clamped into the
/// playable area.
fn ring_position(player_pos: Vec2, bounds: &dyn MapBounds, rng: &mut Pcg32, radius: f32) -> Vec2 {
    let angle = rng.random_range(0.0..TAU);
    let dist = SPAWN_RING_RADIUS + rng.random_range(0.0..SPAWN_RING_JITTER);
    let pos = player_pos + Vec2::new(angle.cos(), angle.sin()) * dist;
    bounds.clamp(pos, radius)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BossConfig;
    use crate::sim::map::RectBounds;
    use rand::SeedableRng;

    fn bounds() -> RectBounds {
        RectBounds::new(4000.0, 4000.0)
    }

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(7)
    }

    /// Level with no wave roster so only the boss timeline is active
    fn boss_only_config(spawn_timer: f32, telegraph_lead: f32) -> LevelConfig {
        LevelConfig {
            roster: Vec::new(),
            boss: Some(BossConfig {
                spawn_timer,
                telegraph_lead,
                ..BossConfig::default()
            }),
            ..LevelConfig::default()
        }
    }

    #[test]
    fn test_boss_telegraph_then_spawn_exactly_once() {
        let config = boss_only_config(60.0, 7.5);
        let mut scheduler = Scheduler::new(&config);
        let mut rng = rng();
        let bounds = bounds();

        let dt = 0.5;
        let mut telegraphs = 0;
        let mut boss_spawns = 0;
        let mut telegraph_time = None;
        let mut spawn_time = None;

        let mut elapsed = 0.0;
        for _ in 0..240 {
            elapsed += dt;
            let batch = scheduler.update(dt, elapsed, &config, Vec2::ZERO, &bounds, &mut rng);
            for event in &batch.events {
                match event {
                    GameEvent::BossTelegraph => {
                        telegraphs += 1;
                        telegraph_time.get_or_insert(elapsed);
                    }
                    GameEvent::BossSpawned => {
                        boss_spawns += 1;
                        spawn_time.get_or_insert(elapsed);
                    }
                    _ => {}
                }
            }
            for enemy in &batch.spawned {
                assert!(enemy.is_boss());
            }
        }

        assert_eq!(telegraphs, 1);
        assert_eq!(boss_spawns, 1);
        assert_eq!(telegraph_time, Some(52.5));
        assert_eq!(spawn_time, Some(60.0));
    }

    #[test]
    fn test_empty_roster_spawns_nothing() {
        let config = LevelConfig {
            roster: Vec::new(),
            boss: None,
            ..LevelConfig::default()
        };
        let mut scheduler = Scheduler::new(&config);
        let mut rng = rng();
        let bounds = bounds();

        let mut elapsed = 0.0;
        for _ in 0..600 {
            elapsed += 0.1;
            let batch = scheduler.update(0.1, elapsed, &config, Vec2::ZERO, &bounds, &mut rng);
            assert!(batch.spawned.is_empty());
        }
    }

    #[test]
    fn test_disabled_entries_never_drawn() {
        let mut config = LevelConfig::default();
        config.boss = None;
        for entry in &mut config.roster {
            entry.enabled = entry.archetype == "grunt";
        }
        // A disabled entry with an overwhelming weight must stay silent
        config
            .roster
            .iter_mut()
            .filter(|e| !e.enabled)
            .for_each(|e| e.spawn_rate = 10_000.0);

        let mut scheduler = Scheduler::new(&config);
        let mut rng = rng();
        let bounds = bounds();

        let mut spawned = Vec::new();
        let mut elapsed = 0.0;
        for _ in 0..600 {
            elapsed += 0.1;
            spawned.extend(
                scheduler
                    .update(0.1, elapsed, &config, Vec2::ZERO, &bounds, &mut rng)
                    .spawned,
            );
        }

        assert!(!spawned.is_empty());
        let grunt = crate::config::EnemyArchetype::grunt();
        assert!(spawned.iter().all(|e| e.color == grunt.color));
    }

    #[test]
    fn test_difficulty_escalation_is_monotonic_and_capped() {
        let config = LevelConfig {
            boss: None,
            ..LevelConfig::default()
        };
        let mut scheduler = Scheduler::new(&config);
        let mut rng = rng();
        let bounds = bounds();

        let mut last_per_wave = scheduler.enemies_per_wave;
        let mut last_interval = scheduler.wave_interval;
        let mut elapsed = 0.0;
        // 20 minutes, far past every cap
        for _ in 0..12_000 {
            elapsed += 0.1;
            scheduler.update(0.1, elapsed, &config, Vec2::ZERO, &bounds, &mut rng);
            assert!(scheduler.enemies_per_wave >= last_per_wave);
            assert!(scheduler.enemies_per_wave <= config.max_enemies_per_wave);
            assert!(scheduler.wave_interval <= last_interval);
            assert!(scheduler.wave_interval >= config.min_wave_interval);
            last_per_wave = scheduler.enemies_per_wave;
            last_interval = scheduler.wave_interval;
        }
        assert_eq!(scheduler.enemies_per_wave, config.max_enemies_per_wave);
        assert!((scheduler.wave_interval - config.min_wave_interval).abs() < 1e-3);
    }

    #[test]
    fn test_hp_scaling_applied_at_spawn() {
        let config = LevelConfig {
            boss: None,
            ..LevelConfig::default()
        };
        let mut scheduler = Scheduler::new(&config);
        let mut rng = rng();
        let bounds = bounds();

        // Force a wave at a late timestamp
        scheduler.wave_timer = config.wave_interval;
        let late = 480.0;
        let batch = scheduler.update(0.1, late, &config, Vec2::ZERO, &bounds, &mut rng);
        assert!(!batch.spawned.is_empty());

        let expected_min = config.hp_growth.multiplier_at(late);
        for enemy in &batch.spawned {
            // Every archetype's base health is scaled up by the multiplier
            assert!(enemy.max_health >= 14.0 * expected_min.min(config.hp_growth.max_multiplier) * 0.999);
        }
    }

    #[test]
    fn test_spawns_land_inside_bounds() {
        let tight = RectBounds::new(600.0, 600.0);
        let config = LevelConfig {
            boss: None,
            ..LevelConfig::default()
        };
        let mut scheduler = Scheduler::new(&config);
        scheduler.wave_timer = config.wave_interval;
        let mut rng = rng();

        let batch = scheduler.update(0.1, 1.0, &config, Vec2::ZERO, &tight, &mut rng);
        assert!(!batch.spawned.is_empty());
        for enemy in &batch.spawned {
            assert!(tight.contains(enemy.pos, enemy.radius));
        }
    }
}
