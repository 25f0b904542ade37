//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay pure and deterministic:
//! - Seeded RNG only, owned by the session
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies
//!
//! Dependency order inside the module: `math` -> `entities` ->
//! {`collision`, `spawn`, `upgrade`} -> `tick`.

pub mod collision;
pub mod entities;
pub mod map;
pub mod math;
pub mod spawn;
pub mod state;
pub mod tick;
pub mod upgrade;

pub use collision::{CollisionOutcome, EnemyHit, resolve};
pub use entities::{Enemy, Loot, LootKind, Owner, Player, Projectile, XpOrb};
pub use map::{MapBounds, RectBounds};
pub use state::{Camera, GameEvent, GamePhase, GameState};
pub use tick::{TickInput, tick};
pub use upgrade::{Rarity, Upgrade, UpgradeId, catalog, grant_xp};
