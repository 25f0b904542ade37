//! Entity records: Player, Enemy, Projectile, XpOrb, Loot
//!
//! Plain mutable records owned by the orchestrator's containers. There is no
//! behavior hierarchy; each record knows how to advance itself one tick and
//! how to take damage, and the collision resolver mutates them through those
//! contracts.

use glam::Vec2;

use super::map::MapBounds;
use super::math::{circles_overlap, decay, direction_or_zero, distance_sq, ease_out_quad};
use super::upgrade::UpgradeId;
use crate::config::{AttackKind, BossConfig, EnemyArchetype, LevelingCurve, PlayerArchetype};
use crate::consts::*;

/// Player-owned projectile stats. Pierce and AOE are mutually exclusive:
/// granting an AOE radius zeroes the pierce budget, and pierce grants are
/// ignored while an AOE radius is set.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectileStats {
    pub speed: f32,
    pub radius: f32,
    /// Damage carried by the projectile itself, added to the player's damage
    pub base_damage: f32,
    pierce: u32,
    aoe_radius: Option<f32>,
}

impl Default for ProjectileStats {
    fn default() -> Self {
        Self {
            speed: PROJECTILE_SPEED,
            radius: PROJECTILE_RADIUS,
            base_damage: 5.0,
            pierce: 0,
            aoe_radius: None,
        }
    }
}

impl ProjectileStats {
    pub fn pierce(&self) -> u32 {
        self.pierce
    }

    pub fn aoe_radius(&self) -> Option<f32> {
        self.aoe_radius
    }

    /// Grant extra pierce. No-op while an AOE radius is set.
    pub fn add_pierce(&mut self, amount: u32) {
        if self.aoe_radius.is_none() {
            self.pierce += amount;
        }
    }

    /// Switch to (or widen) area damage, forfeiting any pierce budget.
    pub fn set_aoe_radius(&mut self, radius: f32) {
        let current = self.aoe_radius.unwrap_or(0.0);
        self.aoe_radius = Some(current.max(radius));
        self.pierce = 0;
    }
}

/// The player character
#[derive(Debug, Clone)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub health: f32,
    pub max_health: f32,
    /// Flat damage added to every projectile hit
    pub damage: f32,
    /// Percent chance in [0, 100] that a hit crits
    pub crit_chance: f32,
    /// Damage multiplier applied on a crit
    pub crit_damage: f32,
    pub speed: f32,
    pub attack_cooldown: f32,
    pub attack_timer: f32,
    pub projectile: ProjectileStats,
    /// Maximum travel distance for fired projectiles
    pub range: f32,
    pub xp: u32,
    pub level: u32,
    pub xp_to_next: u32,
    /// Seconds of invulnerability remaining
    pub invuln_timer: f32,
    pub knockback: Vec2,
    /// Append-only history of applied upgrades
    pub upgrades: Vec<UpgradeId>,
}

impl Player {
    pub fn new(curve: &LevelingCurve) -> Self {
        Self::from_archetype(&PlayerArchetype::default(), curve)
    }

    /// Build the player from a selected character archetype.
    pub fn from_archetype(archetype: &PlayerArchetype, curve: &LevelingCurve) -> Self {
        Self {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            radius: PLAYER_RADIUS,
            health: archetype.health,
            max_health: archetype.health,
            damage: archetype.damage,
            crit_chance: archetype.crit_chance,
            crit_damage: archetype.crit_damage,
            speed: archetype.speed,
            attack_cooldown: archetype.attack_cooldown,
            attack_timer: 0.0,
            projectile: ProjectileStats::default(),
            range: archetype.range,
            xp: 0,
            level: 1,
            xp_to_next: curve.xp_to_next(1),
            invuln_timer: 0.0,
            knockback: Vec2::ZERO,
            upgrades: Vec::new(),
        }
    }

    /// Advance movement and timers for one tick. `move_intent` is the raw
    /// input vector; anything longer than a unit vector is normalized.
    pub fn update(&mut self, dt: f32, move_intent: Vec2, bounds: &dyn MapBounds) {
        let intent = if move_intent.length_squared() > 1.0 {
            move_intent.normalize_or_zero()
        } else {
            move_intent
        };
        self.vel = intent * self.speed + self.knockback;
        self.pos = bounds.clamp(self.pos + self.vel * dt, self.radius);
        self.knockback = decay(self.knockback, KNOCKBACK_DECAY, dt);
        self.attack_timer = (self.attack_timer - dt).max(0.0);
        self.invuln_timer = (self.invuln_timer - dt).max(0.0);
    }

    /// Apply damage, honoring the invulnerability window: a hit while
    /// invulnerable is ignored and does NOT re-trigger the window. Returns
    /// whether damage was actually applied.
    pub fn take_damage(&mut self, amount: f32) -> bool {
        if self.invuln_timer > 0.0 {
            return false;
        }
        self.health = (self.health - amount).max(0.0);
        self.invuln_timer = PLAYER_INVULN_WINDOW;
        true
    }

    pub fn heal(&mut self, amount: f32) {
        self.health = (self.health + amount).min(self.max_health);
    }

    pub fn attack_ready(&self) -> bool {
        self.attack_timer <= 0.0
    }
}

/// Boss metadata on an enemy record
#[derive(Debug, Clone, PartialEq)]
pub struct BossTag {
    /// Flat damage reduction per hit
    pub defense: f32,
}

/// A ranged enemy's request to fire, consumed by the orchestrator
#[derive(Debug, Clone, Copy)]
pub struct RangedShot {
    pub origin: Vec2,
    pub dir: Vec2,
    pub speed: f32,
    pub damage: f32,
}

/// A hostile, melee or ranged. Stats are resolved from an archetype at spawn
/// time; there is no config lookup on the hot path.
#[derive(Debug, Clone)]
pub struct Enemy {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub health: f32,
    pub max_health: f32,
    pub damage: f32,
    pub speed: f32,
    pub radius: f32,
    pub xp_value: u32,
    pub color: u32,
    pub attack: AttackKind,
    /// Cooldown remaining until the next shot (ranged only)
    pub shoot_timer: f32,
    pub knockback: Vec2,
    pub dead: bool,
    pub boss: Option<BossTag>,
}

impl Enemy {
    /// Build an enemy from an archetype. `hp_multiplier` is the time-scaling
    /// factor sampled at spawn; `difficulty` is the level's flat multiplier.
    pub fn from_archetype(
        archetype: &EnemyArchetype,
        pos: Vec2,
        hp_multiplier: f32,
        difficulty: f32,
    ) -> Self {
        let health = archetype.health * hp_multiplier * difficulty;
        Self {
            id: 0,
            pos,
            vel: Vec2::ZERO,
            health,
            max_health: health,
            damage: archetype.damage * difficulty,
            speed: archetype.speed,
            radius: archetype.radius,
            xp_value: archetype.xp_value,
            color: archetype.color,
            attack: archetype.attack,
            shoot_timer: 0.0,
            knockback: Vec2::ZERO,
            dead: false,
            boss: None,
        }
    }

    /// Build the scripted boss from its descriptor and body archetype.
    pub fn boss(config: &BossConfig, archetype: &EnemyArchetype, pos: Vec2, difficulty: f32) -> Self {
        let mut enemy = Self::from_archetype(archetype, pos, 1.0, difficulty);
        enemy.health = config.health * difficulty;
        enemy.max_health = enemy.health;
        enemy.damage = config.damage * difficulty;
        enemy.radius = config.radius;
        enemy.xp_value = config.xp_value;
        enemy.boss = Some(BossTag {
            defense: config.defense,
        });
        enemy
    }

    pub fn is_boss(&self) -> bool {
        self.boss.is_some()
    }

    /// Apply damage, clamping health at zero. Returns true exactly once: on
    /// the hit that kills this enemy.
    pub fn take_damage(&mut self, amount: f32) -> bool {
        if self.dead {
            return false;
        }
        let amount = match &self.boss {
            // Defense never reduces a hit below 1
            Some(tag) => (amount - tag.defense).max(1.0),
            None => amount,
        };
        self.health = (self.health - amount).max(0.0);
        if self.health == 0.0 {
            self.dead = true;
            return true;
        }
        false
    }

    /// Chase (or hold range and shoot at) the player for one tick.
    pub fn update(&mut self, dt: f32, player_pos: Vec2, bounds: &dyn MapBounds) -> Option<RangedShot> {
        if self.dead {
            return None;
        }
        let to_player = direction_or_zero(self.pos, player_pos);
        let mut shot = None;

        match self.attack {
            AttackKind::Melee => {
                self.vel = to_player * self.speed;
            }
            AttackKind::Ranged {
                shoot_cooldown,
                shoot_range,
                projectile_speed,
                projectile_damage,
            } => {
                let dist_sq = distance_sq(self.pos, player_pos);
                // Advance until comfortably inside shooting range, then hold
                if dist_sq > (shoot_range * 0.85).powi(2) {
                    self.vel = to_player * self.speed;
                } else {
                    self.vel = Vec2::ZERO;
                }
                self.shoot_timer = (self.shoot_timer - dt).max(0.0);
                if self.shoot_timer == 0.0
                    && dist_sq <= shoot_range * shoot_range
                    && to_player != Vec2::ZERO
                {
                    self.shoot_timer = shoot_cooldown;
                    shot = Some(RangedShot {
                        origin: self.pos,
                        dir: to_player,
                        speed: projectile_speed,
                        damage: projectile_damage,
                    });
                }
            }
        }

        self.pos = bounds.clamp(self.pos + (self.vel + self.knockback) * dt, self.radius);
        self.knockback = decay(self.knockback, KNOCKBACK_DECAY, dt);
        shot
    }
}

/// Opaque identity token for a projectile's owner. Never a live reference;
/// velocity inheritance is snapshotted at creation instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner {
    Player,
    Enemy(u32),
}

/// A projectile in flight
#[derive(Debug, Clone)]
pub struct Projectile {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub damage: f32,
    pub radius: f32,
    pub age: f32,
    pub lifetime: f32,
    pub traveled: f32,
    /// Range cutoff: total distance before the projectile fizzles
    pub max_distance: f32,
    pub owner: Owner,
    /// Additional hits allowed after the first
    pub pierce_budget: u32,
    pub hits: u32,
    pub aoe_radius: Option<f32>,
    pub active: bool,
    /// Whether the most recent resolved hit was a critical
    pub last_hit_crit: bool,
    /// Enemy ids already struck; grows for the projectile's lifetime
    hit_set: Vec<u32>,
}

impl Projectile {
    /// Fire from the player along `dir`, inheriting part of the player's
    /// velocity (snapshotted now, never read back later).
    pub fn from_player(id: u32, player: &Player, dir: Vec2) -> Self {
        Self {
            id,
            pos: player.pos,
            vel: dir * player.projectile.speed + player.vel * PROJECTILE_VEL_INHERIT,
            damage: player.projectile.base_damage,
            radius: player.projectile.radius,
            age: 0.0,
            lifetime: PROJECTILE_LIFETIME,
            traveled: 0.0,
            max_distance: player.range,
            owner: Owner::Player,
            pierce_budget: player.projectile.pierce(),
            hits: 0,
            aoe_radius: player.projectile.aoe_radius(),
            active: true,
            last_hit_crit: false,
            hit_set: Vec::new(),
        }
    }

    /// Fire from a ranged enemy. Enemy shots never pierce and carry no AOE.
    pub fn from_enemy(id: u32, enemy_id: u32, shot: &RangedShot) -> Self {
        Self {
            id,
            pos: shot.origin,
            vel: shot.dir * shot.speed,
            damage: shot.damage,
            radius: PROJECTILE_RADIUS,
            age: 0.0,
            lifetime: PROJECTILE_LIFETIME * 2.0,
            traveled: 0.0,
            max_distance: f32::INFINITY,
            owner: Owner::Enemy(enemy_id),
            pierce_budget: 0,
            hits: 0,
            aoe_radius: None,
            active: true,
            last_hit_crit: false,
            hit_set: Vec::new(),
        }
    }

    /// Advance one tick; fizzle past lifetime or range.
    pub fn update(&mut self, dt: f32) {
        if !self.active {
            return;
        }
        let step = self.vel * dt;
        self.pos += step;
        self.traveled += step.length();
        self.age += dt;
        if self.age >= self.lifetime || self.traveled >= self.max_distance {
            self.active = false;
        }
    }

    pub fn has_hit(&self, enemy_id: u32) -> bool {
        self.hit_set.contains(&enemy_id)
    }

    pub fn record_hit(&mut self, enemy_id: u32) {
        self.hit_set.push(enemy_id);
    }

    /// Pierce decay: each survived hit dulls the projectile.
    pub fn apply_pierce_decay(&mut self) {
        self.damage *= PIERCE_DAMAGE_DECAY;
        self.vel *= PIERCE_SPEED_DECAY;
        self.radius *= PIERCE_SPEED_DECAY;
    }
}

/// Experience dropped at a kill site
#[derive(Debug, Clone)]
pub struct XpOrb {
    pub id: u32,
    pub pos: Vec2,
    pub value: u32,
    pub attracted: bool,
    pub collected: bool,
    pub age: f32,
    pub lifetime: f32,
}

impl XpOrb {
    pub fn new(id: u32, pos: Vec2, value: u32) -> Self {
        Self {
            id,
            pos,
            value,
            attracted: false,
            collected: false,
            age: 0.0,
            lifetime: ORB_LIFETIME,
        }
    }

    /// Drift toward the player once inside the (multiplier-scaled) attract
    /// radius; collect on contact.
    pub fn update(&mut self, dt: f32, player_pos: Vec2, attract_radius: f32) {
        if self.collected {
            return;
        }
        self.age += dt;
        if !self.attracted && distance_sq(self.pos, player_pos) < attract_radius * attract_radius {
            self.attracted = true;
        }
        if self.attracted {
            // Speeds up as it closes in
            let closeness = 1.0 - (distance_sq(self.pos, player_pos).sqrt() / attract_radius).min(1.0);
            let speed = ORB_ATTRACT_SPEED * (0.35 + 0.65 * ease_out_quad(closeness));
            self.pos += direction_or_zero(self.pos, player_pos) * speed * dt;
        }
        if circles_overlap(self.pos, 0.0, player_pos, ORB_COLLECT_RADIUS) {
            self.collected = true;
        }
    }

    pub fn expired(&self) -> bool {
        !self.collected && self.age >= self.lifetime
    }
}

/// What a loot drop does when picked up
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LootKind {
    /// Flat heal
    Medkit { heal: f32 },
    /// Pulls every live orb to the player
    Magnet,
    /// Straight score
    Coin { value: u32 },
}

/// A loot item on the ground
#[derive(Debug, Clone)]
pub struct Loot {
    pub id: u32,
    pub pos: Vec2,
    pub kind: LootKind,
    pub collected: bool,
    pub age: f32,
    pub lifetime: f32,
}

impl Loot {
    pub fn new(id: u32, pos: Vec2, kind: LootKind) -> Self {
        Self {
            id,
            pos,
            kind,
            collected: false,
            age: 0.0,
            lifetime: LOOT_LIFETIME,
        }
    }

    pub fn update(&mut self, dt: f32, player_pos: Vec2) {
        if self.collected {
            return;
        }
        self.age += dt;
        if circles_overlap(self.pos, 0.0, player_pos, LOOT_COLLECT_RADIUS) {
            self.collected = true;
        }
    }

    pub fn expired(&self) -> bool {
        !self.collected && self.age >= self.lifetime
    }
}
