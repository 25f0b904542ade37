//! Session state and outbound events
//!
//! All state for one run lives in [`GameState`]: the entity containers, the
//! phase machine, the session RNG and the queued outbound events. The
//! orchestrator in [`super::tick`] is the only writer during a tick;
//! collaborators read snapshots and drain the event queue between ticks.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::entities::{Enemy, Loot, Player, Projectile, XpOrb};
use super::math::{decay_scalar, distance_sq};
use super::spawn::Scheduler;
use super::upgrade::UpgradeId;
use crate::config::{LevelConfig, PlayerArchetype, SessionConfig};
use crate::consts::*;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Active gameplay
    Running,
    /// Voluntary pause; the frame scheduler keeps calling render
    Paused,
    /// Nested pause while an upgrade offer is on screen
    LevelUp,
    /// Terminal; only an explicit restart re-enters play
    GameOver,
}

/// Discrete outbound events consumed by the rendering/audio/UI collaborators
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    EnemyKilled {
        x: f32,
        y: f32,
        color: u32,
        is_boss: bool,
    },
    ProjectileImpact {
        x: f32,
        y: f32,
        color: u32,
        is_aoe: bool,
    },
    XpCollected {
        x: f32,
        y: f32,
    },
    PlayerHit,
    /// One-shot "boss incoming" cue for the audio collaborator
    BossTelegraph,
    BossSpawned,
    LevelUpOffered {
        upgrades: Vec<UpgradeId>,
    },
    GameOver {
        victory: bool,
        score: u64,
        elapsed: f32,
    },
}

/// Camera follow and shake. Purely visual; the renderer reads it, the
/// orchestrator decays it.
#[derive(Debug, Clone, Copy, Default)]
pub struct Camera {
    pub pos: Vec2,
    pub shake: f32,
}

impl Camera {
    pub fn follow(&mut self, target: Vec2, dt: f32) {
        self.pos += (target - self.pos) * (CAMERA_FOLLOW_RATE * dt).min(1.0);
    }

    pub fn add_shake(&mut self, amount: f32) {
        self.shake = (self.shake + amount).min(1.0);
    }

    pub fn decay_shake(&mut self, dt: f32) {
        self.shake = decay_scalar(self.shake, CAMERA_SHAKE_DECAY, dt);
        if self.shake < 0.01 {
            self.shake = 0.0;
        }
    }
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub phase: GamePhase,
    /// Gameplay seconds (pauses excluded)
    pub elapsed: f32,
    pub score: u64,
    pub kills: u32,
    pub config: LevelConfig,
    /// Character picked at session start; kept so restart preserves it
    pub character: PlayerArchetype,
    /// Ambient multipliers; upgrades mutate these
    pub session: SessionConfig,
    pub player: Player,
    pub scheduler: Scheduler,
    pub enemies: Vec<Enemy>,
    pub projectiles: Vec<Projectile>,
    pub orbs: Vec<XpOrb>,
    pub loot: Vec<Loot>,
    /// Level-ups not yet resolved, including the one currently on offer.
    /// Exactly one offer is on screen at a time; the rest wait here.
    pub pending_level_ups: u32,
    /// Upgrade ids currently on offer (LevelUp phase only)
    pub offered: Vec<UpgradeId>,
    pub camera: Camera,
    /// Transient screen effect, decays every tick
    pub hit_flash: f32,
    events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Start a session on the given stage with the default character.
    /// Construction covers the Init phase: the returned state is already
    /// Running.
    pub fn new(seed: u64, config: LevelConfig) -> Self {
        Self::with_character(seed, config, PlayerArchetype::default())
    }

    /// Start a session from selected level and character identifiers.
    /// Unknown ids resolve to documented defaults with a warning.
    pub fn from_ids(seed: u64, level_id: &str, character_id: &str) -> Self {
        Self::with_character(
            seed,
            LevelConfig::by_id(level_id),
            PlayerArchetype::by_id(character_id),
        )
    }

    pub fn with_character(seed: u64, config: LevelConfig, character: PlayerArchetype) -> Self {
        log::info!(
            "new session: stage '{}', character '{}', seed {seed}",
            config.id,
            character.id
        );
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Running,
            elapsed: 0.0,
            score: 0,
            kills: 0,
            player: Player::from_archetype(&character, &config.leveling),
            scheduler: Scheduler::new(&config),
            session: SessionConfig::default(),
            config,
            character,
            enemies: Vec::new(),
            projectiles: Vec::new(),
            orbs: Vec::new(),
            loot: Vec::new(),
            pending_level_ups: 0,
            offered: Vec::new(),
            camera: Camera::default(),
            hit_flash: 0.0,
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Hand the queued events to the collaborators. Called once per frame by
    /// the embedding shell.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Tear down and start over on the same stage, with the same character
    /// and seed.
    pub fn restart(&mut self) {
        log::info!("session restart");
        *self = Self::with_character(self.seed, self.config.clone(), self.character.clone());
    }

    /// Nearest live enemy to a point, for auto-aim
    pub fn nearest_enemy(&self, pos: Vec2) -> Option<&Enemy> {
        self.enemies
            .iter()
            .filter(|enemy| !enemy.dead)
            .min_by(|a, b| {
                distance_sq(pos, a.pos)
                    .partial_cmp(&distance_sq(pos, b.pos))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_running() {
        let state = GameState::new(1, LevelConfig::default());
        assert_eq!(state.phase, GamePhase::Running);
        assert_eq!(state.player.level, 1);
        assert!(state.enemies.is_empty());
    }

    #[test]
    fn test_entity_ids_are_unique() {
        let mut state = GameState::new(1, LevelConfig::default());
        let a = state.next_entity_id();
        let b = state.next_entity_id();
        assert_ne!(a, b);
    }

    #[test]
    fn test_drain_events_empties_queue() {
        let mut state = GameState::new(1, LevelConfig::default());
        state.push_event(GameEvent::PlayerHit);
        state.push_event(GameEvent::BossTelegraph);
        assert_eq!(state.drain_events().len(), 2);
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_restart_resets_run() {
        let mut state = GameState::new(9, LevelConfig::default());
        state.score = 500;
        state.phase = GamePhase::GameOver;
        state.restart();
        assert_eq!(state.score, 0);
        assert_eq!(state.phase, GamePhase::Running);
        assert_eq!(state.seed, 9);
    }

    #[test]
    fn test_session_from_ids_applies_character() {
        let state = GameState::from_ids(3, "ashen-causeway", "bruiser");
        assert_eq!(state.config.id, "ashen-causeway");
        assert_eq!(state.player.max_health, 140.0);

        // Unknown ids land on the documented defaults
        let fallback = GameState::from_ids(3, "no-such-stage", "no-such-character");
        assert_eq!(fallback.config.id, LevelConfig::default().id);
        assert_eq!(fallback.player.max_health, 100.0);
    }

    #[test]
    fn test_restart_preserves_character() {
        let mut state = GameState::from_ids(5, "overgrown-yard", "bruiser");
        state.player.health = 10.0;
        state.restart();
        assert_eq!(state.player.max_health, 140.0);
        assert_eq!(state.player.health, 140.0);
    }

    #[test]
    fn test_nearest_enemy_skips_dead() {
        use crate::config::EnemyArchetype;
        let mut state = GameState::new(1, LevelConfig::default());
        let mut near = crate::sim::Enemy::from_archetype(
            &EnemyArchetype::grunt(),
            Vec2::new(10.0, 0.0),
            1.0,
            1.0,
        );
        near.id = 1;
        near.dead = true;
        let mut far = crate::sim::Enemy::from_archetype(
            &EnemyArchetype::grunt(),
            Vec2::new(100.0, 0.0),
            1.0,
            1.0,
        );
        far.id = 2;
        state.enemies.push(near);
        state.enemies.push(far);

        assert_eq!(state.nearest_enemy(Vec2::ZERO).unwrap().id, 2);
    }
}
