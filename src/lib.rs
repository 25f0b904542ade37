//! Swarmfall - an arena-survival auto-battler simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, collision, spawning, leveling)
//! - `config`: Data-driven session/level/archetype configuration
//!
//! Rendering, audio and UI live outside this crate: collaborators read the
//! simulation state each frame for drawing and consume the discrete event
//! queue drained via [`sim::GameState::drain_events`]. The only inputs are
//! [`sim::TickInput`] and the [`sim::MapBounds`] collaborator.

pub mod config;
pub mod sim;

pub use config::{LevelConfig, PlayerArchetype, SessionConfig};
pub use sim::{GameEvent, GamePhase, GameState, MapBounds, RectBounds, TickInput, tick};

/// Game configuration constants
pub mod consts {
    /// Upper bound on a single frame's delta time (seconds). Longer frames
    /// are clamped instead of triggering runaway catch-up after a stall.
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Player defaults
    pub const PLAYER_RADIUS: f32 = 14.0;
    pub const PLAYER_BASE_HEALTH: f32 = 100.0;
    pub const PLAYER_BASE_DAMAGE: f32 = 5.0;
    pub const PLAYER_BASE_SPEED: f32 = 160.0;
    pub const PLAYER_ATTACK_COOLDOWN: f32 = 0.9;
    pub const PLAYER_BASE_RANGE: f32 = 340.0;
    /// Seconds of invulnerability after a hit lands
    pub const PLAYER_INVULN_WINDOW: f32 = 0.8;

    /// Projectile defaults
    pub const PROJECTILE_SPEED: f32 = 420.0;
    pub const PROJECTILE_RADIUS: f32 = 5.0;
    pub const PROJECTILE_LIFETIME: f32 = 3.0;
    /// Fraction of the owner's velocity snapshotted into a new projectile
    pub const PROJECTILE_VEL_INHERIT: f32 = 0.5;

    /// Per-pierce decay factors: damage, then speed and size
    pub const PIERCE_DAMAGE_DECAY: f32 = 0.8;
    pub const PIERCE_SPEED_DECAY: f32 = 0.9;

    /// Knockback impulse magnitudes (pixels/sec)
    pub const ENEMY_KNOCKBACK: f32 = 220.0;
    /// Player takes half force on body contact
    pub const PLAYER_KNOCKBACK: f32 = 110.0;
    /// Enemy shots knock the player back at reduced force
    pub const PROJECTILE_KNOCKBACK_FACTOR: f32 = 0.7;
    /// Knockback decay rate (exponential, per second)
    pub const KNOCKBACK_DECAY: f32 = 8.0;

    /// XP orbs
    pub const ORB_LIFETIME: f32 = 30.0;
    pub const ORB_ATTRACT_RADIUS: f32 = 90.0;
    pub const ORB_COLLECT_RADIUS: f32 = 18.0;
    pub const ORB_ATTRACT_SPEED: f32 = 520.0;

    /// Loot drops
    pub const LOOT_LIFETIME: f32 = 20.0;
    pub const LOOT_COLLECT_RADIUS: f32 = 22.0;

    /// Wave spawn ring: just outside a 16:9 view, recentered on the player
    pub const SPAWN_RING_RADIUS: f32 = 560.0;
    pub const SPAWN_RING_JITTER: f32 = 80.0;

    /// Camera
    pub const CAMERA_FOLLOW_RATE: f32 = 6.0;
    pub const CAMERA_SHAKE_DECAY: f32 = 6.0;
    /// Screen-space hit flash decay (per second)
    pub const HIT_FLASH_DECAY: f32 = 4.0;
}
