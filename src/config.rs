//! Data-driven session and level configuration
//!
//! Everything here is read-only at runtime except [`SessionConfig`], whose
//! ambient multipliers are mutated by upgrades. Level and archetype data
//! deserialize from JSON handed in by the embedding shell; unknown
//! identifiers and malformed payloads fall back to defaults with a warning
//! rather than failing the session.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// How an enemy fights
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AttackKind {
    /// Body contact only
    Melee,
    /// Stops at range and shoots at the player
    Ranged {
        shoot_cooldown: f32,
        shoot_range: f32,
        projectile_speed: f32,
        projectile_damage: f32,
    },
}

/// Resolved per-archetype stats. One record per enemy type; the spawn
/// scheduler reads these once at spawn time, so there is no runtime
/// property lookup on live enemies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyArchetype {
    pub id: String,
    pub health: f32,
    pub damage: f32,
    pub speed: f32,
    pub radius: f32,
    pub xp_value: u32,
    /// Color hint forwarded to the particle collaborator
    pub color: u32,
    pub attack: AttackKind,
}

impl EnemyArchetype {
    /// Slow melee chaser, the baseline threat
    pub fn grunt() -> Self {
        Self {
            id: "grunt".into(),
            health: 30.0,
            damage: 8.0,
            speed: 70.0,
            radius: 13.0,
            xp_value: 5,
            color: 0x8a_4b_c9,
            attack: AttackKind::Melee,
        }
    }

    /// Fast, fragile melee rusher
    pub fn stalker() -> Self {
        Self {
            id: "stalker".into(),
            health: 14.0,
            damage: 5.0,
            speed: 150.0,
            radius: 10.0,
            xp_value: 7,
            color: 0xd9_62_3a,
            attack: AttackKind::Melee,
        }
    }

    /// Ranged harasser that keeps its distance
    pub fn spitter() -> Self {
        Self {
            id: "spitter".into(),
            health: 22.0,
            damage: 4.0,
            speed: 55.0,
            radius: 12.0,
            xp_value: 9,
            color: 0x4f_a8_5e,
            attack: AttackKind::Ranged {
                shoot_cooldown: 2.4,
                shoot_range: 260.0,
                projectile_speed: 180.0,
                projectile_damage: 6.0,
            },
        }
    }

    /// Armored bruiser, used as the default boss body
    pub fn colossus() -> Self {
        Self {
            id: "colossus".into(),
            health: 120.0,
            damage: 14.0,
            speed: 45.0,
            radius: 24.0,
            xp_value: 40,
            color: 0xc9_3a_3a,
            attack: AttackKind::Melee,
        }
    }
}

/// Starting player stats, selected by id at session start
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerArchetype {
    pub id: String,
    pub health: f32,
    pub damage: f32,
    pub speed: f32,
    pub attack_cooldown: f32,
    pub crit_chance: f32,
    pub crit_damage: f32,
    pub range: f32,
}

impl PlayerArchetype {
    /// Balanced all-rounder, the default pick
    pub fn ranger() -> Self {
        Self {
            id: "ranger".into(),
            health: PLAYER_BASE_HEALTH,
            damage: PLAYER_BASE_DAMAGE,
            speed: PLAYER_BASE_SPEED,
            attack_cooldown: PLAYER_ATTACK_COOLDOWN,
            crit_chance: 5.0,
            crit_damage: 1.5,
            range: PLAYER_BASE_RANGE,
        }
    }

    /// Slow, short-ranged, hits like a truck
    pub fn bruiser() -> Self {
        Self {
            id: "bruiser".into(),
            health: 140.0,
            damage: 9.0,
            speed: 130.0,
            attack_cooldown: 1.2,
            crit_chance: 3.0,
            crit_damage: 1.8,
            range: 240.0,
        }
    }

    /// Look up a character by id; unknown ids fall back to the ranger with a
    /// warning.
    pub fn by_id(id: &str) -> Self {
        match id {
            "ranger" => Self::ranger(),
            "bruiser" => Self::bruiser(),
            other => {
                log::warn!("unknown character '{other}', substituting ranger");
                Self::ranger()
            }
        }
    }
}

impl Default for PlayerArchetype {
    fn default() -> Self {
        Self::ranger()
    }
}

/// Time-based HP scaling curve: `min(1 + (t * rate)^power, cap)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HpGrowth {
    pub rate: f32,
    pub power: f32,
    pub max_multiplier: f32,
}

impl HpGrowth {
    /// Multiplier applied to enemy health at spawn time. Monotonically
    /// non-decreasing in `elapsed` and never above the cap.
    pub fn multiplier_at(&self, elapsed: f32) -> f32 {
        let t = elapsed.max(0.0);
        (1.0 + (t * self.rate).powf(self.power)).min(self.max_multiplier)
    }
}

impl Default for HpGrowth {
    fn default() -> Self {
        Self {
            rate: 0.01,
            power: 1.4,
            max_multiplier: 8.0,
        }
    }
}

/// Scripted boss descriptor for a level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossConfig {
    /// Archetype the boss body is built from
    pub archetype: String,
    /// Seconds into the run when the boss appears
    pub spawn_timer: f32,
    /// Pre-roll window for the "boss incoming" cue
    pub telegraph_lead: f32,
    pub health: f32,
    pub damage: f32,
    /// Flat damage reduction per hit (floored so hits always land for 1)
    pub defense: f32,
    pub radius: f32,
    pub xp_value: u32,
}

impl Default for BossConfig {
    fn default() -> Self {
        Self {
            archetype: "colossus".into(),
            spawn_timer: 300.0,
            telegraph_lead: 7.5,
            health: 2200.0,
            damage: 22.0,
            defense: 3.0,
            radius: 34.0,
            xp_value: 500,
        }
    }
}

/// Roster entry: which archetype a level spawns and how often
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnEntry {
    pub archetype: String,
    /// Relative weight; normalized across enabled entries at draw time
    pub spawn_rate: f32,
    pub enabled: bool,
}

/// Shape of the XP requirement curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CurveKind {
    Linear,
    Quadratic,
    Exponential,
}

/// XP required per level, parameterized by the current level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelingCurve {
    pub base_xp: u32,
    pub kind: CurveKind,
    /// Growth factor, used by the exponential kind only
    pub factor: f32,
}

impl LevelingCurve {
    /// XP needed to advance from `level` to `level + 1`
    pub fn xp_to_next(&self, level: u32) -> u32 {
        let base = self.base_xp as f32;
        let l = level.max(1) as f32;
        let xp = match self.kind {
            CurveKind::Linear => base * l,
            CurveKind::Quadratic => base * l * l,
            CurveKind::Exponential => base * self.factor.powf(l - 1.0),
        };
        xp.round().max(1.0) as u32
    }
}

impl Default for LevelingCurve {
    fn default() -> Self {
        Self {
            base_xp: 20,
            kind: CurveKind::Linear,
            factor: 1.3,
        }
    }
}

/// Static per-stage data. Read-only once a session starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    pub id: String,
    /// Enemy catalog this level draws from
    pub archetypes: Vec<EnemyArchetype>,
    /// Spawn roster over the catalog
    pub roster: Vec<SpawnEntry>,
    /// Flat scale on spawned enemy health and damage
    pub difficulty_multiplier: f32,
    pub hp_growth: HpGrowth,
    /// Seconds between waves at the start of the run
    pub wave_interval: f32,
    pub min_wave_interval: f32,
    /// Subtracted from the wave interval at each difficulty step
    pub wave_interval_step: f32,
    pub enemies_per_wave: u32,
    pub max_enemies_per_wave: u32,
    /// Added to the wave size at each difficulty step
    pub enemies_per_wave_step: u32,
    /// Seconds between difficulty escalations
    pub difficulty_increase_interval: f32,
    /// Scales XP dropped by this level's enemies
    pub enemy_xp_multiplier: f32,
    pub leveling: LevelingCurve,
    pub boss: Option<BossConfig>,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            id: "overgrown-yard".into(),
            archetypes: vec![
                EnemyArchetype::grunt(),
                EnemyArchetype::stalker(),
                EnemyArchetype::spitter(),
                EnemyArchetype::colossus(),
            ],
            roster: vec![
                SpawnEntry {
                    archetype: "grunt".into(),
                    spawn_rate: 6.0,
                    enabled: true,
                },
                SpawnEntry {
                    archetype: "stalker".into(),
                    spawn_rate: 3.0,
                    enabled: true,
                },
                SpawnEntry {
                    archetype: "spitter".into(),
                    spawn_rate: 2.0,
                    enabled: true,
                },
            ],
            difficulty_multiplier: 1.0,
            hp_growth: HpGrowth::default(),
            wave_interval: 4.0,
            min_wave_interval: 1.0,
            wave_interval_step: 0.25,
            enemies_per_wave: 3,
            max_enemies_per_wave: 14,
            enemies_per_wave_step: 1,
            difficulty_increase_interval: 30.0,
            enemy_xp_multiplier: 1.0,
            leveling: LevelingCurve::default(),
            boss: Some(BossConfig::default()),
        }
    }
}

impl LevelConfig {
    /// Parse a level from JSON, falling back to the default stage when the
    /// payload is malformed.
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str(json) {
            Ok(level) => level,
            Err(err) => {
                log::warn!("bad level config ({err}), using default stage");
                Self::default()
            }
        }
    }

    /// Look up a built-in stage by id; unknown ids fall back to the default
    /// stage with a warning.
    pub fn by_id(id: &str) -> Self {
        match id {
            "overgrown-yard" => Self::default(),
            "ashen-causeway" => Self::ashen_causeway(),
            other => {
                log::warn!("unknown level '{other}', substituting the default stage");
                Self::default()
            }
        }
    }

    /// Harder second stage: denser waves, meaner curve, earlier boss.
    pub fn ashen_causeway() -> Self {
        Self {
            id: "ashen-causeway".into(),
            difficulty_multiplier: 1.4,
            hp_growth: HpGrowth {
                rate: 0.014,
                power: 1.5,
                max_multiplier: 10.0,
            },
            wave_interval: 3.0,
            enemies_per_wave: 4,
            max_enemies_per_wave: 18,
            boss: Some(BossConfig {
                spawn_timer: 240.0,
                ..BossConfig::default()
            }),
            ..Self::default()
        }
    }

    /// Look up an archetype by id. Unknown ids resolve to the grunt with a
    /// warning so a roster typo degrades a wave instead of killing the run.
    pub fn archetype(&self, id: &str) -> EnemyArchetype {
        if let Some(found) = self.archetypes.iter().find(|a| a.id == id) {
            return found.clone();
        }
        log::warn!("unknown enemy archetype '{id}', substituting grunt");
        EnemyArchetype::grunt()
    }
}

/// Ambient multipliers shared across subsystems. Carried on the session
/// (never process-wide) so tests can instantiate isolated copies; upgrades
/// mutate these directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub xp_gain_multiplier: f32,
    pub pickup_radius_multiplier: f32,
    /// Chance in [0, 1] that a kill drops loot alongside its XP orb
    pub loot_drop_chance: f32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            xp_gain_multiplier: 1.0,
            pickup_radius_multiplier: 1.0,
            loot_drop_chance: 0.06,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_curve() {
        let curve = LevelingCurve {
            base_xp: 20,
            kind: CurveKind::Linear,
            factor: 1.0,
        };
        assert_eq!(curve.xp_to_next(1), 20);
        assert_eq!(curve.xp_to_next(5), 100);
    }

    #[test]
    fn test_exponential_curve_grows() {
        let curve = LevelingCurve {
            base_xp: 10,
            kind: CurveKind::Exponential,
            factor: 2.0,
        };
        assert_eq!(curve.xp_to_next(1), 10);
        assert_eq!(curve.xp_to_next(2), 20);
        assert_eq!(curve.xp_to_next(4), 80);
    }

    #[test]
    fn test_hp_growth_capped() {
        let growth = HpGrowth {
            rate: 0.1,
            power: 2.0,
            max_multiplier: 5.0,
        };
        assert!((growth.multiplier_at(0.0) - 1.0).abs() < 1e-6);
        assert_eq!(growth.multiplier_at(10_000.0), 5.0);
    }

    #[test]
    fn test_hp_growth_monotonic() {
        let growth = HpGrowth::default();
        let mut last = 0.0;
        for i in 0..600 {
            let m = growth.multiplier_at(i as f32);
            assert!(m >= last);
            assert!(m <= growth.max_multiplier);
            last = m;
        }
    }

    #[test]
    fn test_bad_json_falls_back() {
        let level = LevelConfig::from_json("{not json");
        assert_eq!(level.id, LevelConfig::default().id);
    }

    #[test]
    fn test_roundtrip_json() {
        let level = LevelConfig::default();
        let json = serde_json::to_string(&level).unwrap();
        assert_eq!(LevelConfig::from_json(&json), level);
    }

    #[test]
    fn test_unknown_archetype_substitutes_grunt() {
        let level = LevelConfig::default();
        let archetype = level.archetype("does-not-exist");
        assert_eq!(archetype.id, "grunt");
    }

    #[test]
    fn test_unknown_level_falls_back_to_default() {
        assert_eq!(LevelConfig::by_id("nope"), LevelConfig::default());
        assert_eq!(LevelConfig::by_id("ashen-causeway").id, "ashen-causeway");
    }

    #[test]
    fn test_unknown_character_falls_back_to_ranger() {
        assert_eq!(PlayerArchetype::by_id("nope"), PlayerArchetype::ranger());
        assert_eq!(PlayerArchetype::by_id("bruiser").id, "bruiser");
    }
}
