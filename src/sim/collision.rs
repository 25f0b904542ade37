//! Collision detection and damage resolution
//!
//! One pass per tick over the live entity sets. The resolver mutates health
//! and knockback directly but never removes entities; corpses and spent
//! projectiles are swept by the orchestrator's cleanup pass. Everything the
//! external particle/audio collaborators need to react (impact coordinates,
//! color hints, crit and kill flags) is reported in the outcome.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::entities::{Enemy, Owner, Player, Projectile};
use super::math::{circles_overlap, direction_or_zero};
use crate::consts::*;

/// A single resolved hit on an enemy
#[derive(Debug, Clone)]
pub struct EnemyHit {
    pub enemy_id: u32,
    /// Impact position for the particle collaborator
    pub pos: Vec2,
    pub color: u32,
    pub crit: bool,
    /// True exactly once per enemy, on the killing hit
    pub killed: bool,
    pub aoe: bool,
}

/// Everything that happened in one resolution pass
#[derive(Debug, Clone, Default)]
pub struct CollisionOutcome {
    /// Whether the player actually took damage this tick
    pub player_hit: bool,
    pub hits: Vec<EnemyHit>,
    /// Ids of enemy-owned projectiles that struck the player
    pub enemy_shots_on_player: Vec<u32>,
}

/// Roll the damage formula for a player-sourced hit:
/// `(projectile + player) * crit multiplier`, crit rolled independently.
fn roll_damage(projectile_damage: f32, player: &Player, rng: &mut Pcg32) -> (f32, bool) {
    let crit = rng.random_range(0.0..100.0) < player.crit_chance;
    let multiplier = if crit { player.crit_damage } else { 1.0 };
    ((projectile_damage + player.damage) * multiplier, crit)
}

/// Resolve all overlaps for this tick.
pub fn resolve(
    player: &mut Player,
    enemies: &mut [Enemy],
    projectiles: &mut [Projectile],
    rng: &mut Pcg32,
) -> CollisionOutcome {
    let mut outcome = CollisionOutcome::default();

    // 1. Player body vs enemies. A hit inside the invulnerability window is
    //    ignored entirely: no damage, no knockback, no window refresh.
    for enemy in enemies.iter_mut() {
        if enemy.dead {
            continue;
        }
        if circles_overlap(player.pos, player.radius, enemy.pos, enemy.radius)
            && player.take_damage(enemy.damage)
        {
            outcome.player_hit = true;
            let away = direction_or_zero(enemy.pos, player.pos);
            // Symmetric shove: player at half force, enemy at full force
            player.knockback += away * PLAYER_KNOCKBACK;
            enemy.knockback -= away * ENEMY_KNOCKBACK;
        }
    }

    // 2. Enemy shots vs player. Enemy projectiles never pierce: contact
    //    spends the projectile even if the damage was ignored.
    for projectile in projectiles.iter_mut() {
        if !projectile.active || !matches!(projectile.owner, Owner::Enemy(_)) {
            continue;
        }
        if circles_overlap(projectile.pos, projectile.radius, player.pos, player.radius) {
            if player.take_damage(projectile.damage) {
                outcome.player_hit = true;
                let away = direction_or_zero(projectile.pos, player.pos);
                player.knockback += away * ENEMY_KNOCKBACK * PROJECTILE_KNOCKBACK_FACTOR;
            }
            projectile.active = false;
            outcome.enemy_shots_on_player.push(projectile.id);
        }
    }

    // 3. Player shots vs enemies.
    for projectile in projectiles.iter_mut() {
        if !projectile.active || projectile.owner != Owner::Player {
            continue;
        }

        if let Some(aoe_radius) = projectile.aoe_radius {
            resolve_aoe(projectile, aoe_radius, player, enemies, rng, &mut outcome);
        } else {
            resolve_point(projectile, player, enemies, rng, &mut outcome);
        }
    }

    outcome
}

/// Area resolution: once anything live is inside the blast circle, every
/// live enemy in it takes full damage, then the projectile is spent. A blast
/// whose candidates were all hit before lands on nothing; that is a wasted
/// shot, not an error.
fn resolve_aoe(
    projectile: &mut Projectile,
    aoe_radius: f32,
    player: &Player,
    enemies: &mut [Enemy],
    rng: &mut Pcg32,
    outcome: &mut CollisionOutcome,
) {
    let mut triggered = false;
    let mut caught: Vec<usize> = Vec::new();
    for (idx, enemy) in enemies.iter().enumerate() {
        if enemy.dead {
            continue;
        }
        if circles_overlap(projectile.pos, aoe_radius, enemy.pos, enemy.radius) {
            triggered = true;
            if !projectile.has_hit(enemy.id) {
                caught.push(idx);
            }
        }
    }
    if !triggered {
        return;
    }

    for idx in caught {
        let enemy = &mut enemies[idx];
        projectile.record_hit(enemy.id);
        projectile.hits += 1;
        let (total, crit) = roll_damage(projectile.damage, player, rng);
        let killed = enemy.take_damage(total);
        enemy.knockback += direction_or_zero(projectile.pos, enemy.pos) * ENEMY_KNOCKBACK;
        projectile.last_hit_crit = crit;
        outcome.hits.push(EnemyHit {
            enemy_id: enemy.id,
            pos: enemy.pos,
            color: enemy.color,
            crit,
            killed,
            aoe: true,
        });
    }

    // AOE never pierces
    projectile.active = false;
}

/// Point resolution with pierce semantics: the projectile survives (decayed)
/// while its hit count stays within the pierce budget.
fn resolve_point(
    projectile: &mut Projectile,
    player: &Player,
    enemies: &mut [Enemy],
    rng: &mut Pcg32,
    outcome: &mut CollisionOutcome,
) {
    for enemy in enemies.iter_mut() {
        if enemy.dead || projectile.has_hit(enemy.id) {
            continue;
        }
        if !circles_overlap(projectile.pos, projectile.radius, enemy.pos, enemy.radius) {
            continue;
        }

        projectile.record_hit(enemy.id);
        projectile.hits += 1;
        let (total, crit) = roll_damage(projectile.damage, player, rng);
        let killed = enemy.take_damage(total);
        enemy.knockback += direction_or_zero(projectile.pos, enemy.pos) * ENEMY_KNOCKBACK;
        projectile.last_hit_crit = crit;
        outcome.hits.push(EnemyHit {
            enemy_id: enemy.id,
            pos: enemy.pos,
            color: enemy.color,
            crit,
            killed,
            aoe: false,
        });

        if projectile.hits > projectile.pierce_budget {
            projectile.active = false;
            return;
        }
        projectile.apply_pierce_decay();
    }
}
