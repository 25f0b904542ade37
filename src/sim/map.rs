//! Map boundary collaborator interface
//!
//! The playable area is owned by an external map collaborator; the core only
//! needs clamping and containment queries, so the seam is a trait passed into
//! [`crate::sim::tick`]. [`RectBounds`] is the reference implementation used
//! by the tests and the demo runner.

use glam::Vec2;

/// Boundary queries consumed by the player, enemies and the spawn scheduler
pub trait MapBounds {
    /// Clamp a circle's center into the playable area
    fn clamp(&self, pos: Vec2, radius: f32) -> Vec2;

    /// Whether a circle lies fully inside the playable area
    fn contains(&self, pos: Vec2, radius: f32) -> bool;
}

/// Axis-aligned rectangular bounds centered on the origin
#[derive(Debug, Clone, Copy)]
pub struct RectBounds {
    pub half_width: f32,
    pub half_height: f32,
}

impl RectBounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            half_width: width / 2.0,
            half_height: height / 2.0,
        }
    }
}

impl MapBounds for RectBounds {
    fn clamp(&self, pos: Vec2, radius: f32) -> Vec2 {
        // max-then-min so an oversized radius collapses to the edge instead
        // of producing an inverted clamp range
        Vec2::new(
            pos.x
                .max(-self.half_width + radius)
                .min(self.half_width - radius),
            pos.y
                .max(-self.half_height + radius)
                .min(self.half_height - radius),
        )
    }

    fn contains(&self, pos: Vec2, radius: f32) -> bool {
        pos.x - radius >= -self.half_width
            && pos.x + radius <= self.half_width
            && pos.y - radius >= -self.half_height
            && pos.y + radius <= self.half_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_inside_is_identity() {
        let bounds = RectBounds::new(1000.0, 800.0);
        let p = Vec2::new(120.0, -300.0);
        assert_eq!(bounds.clamp(p, 10.0), p);
    }

    #[test]
    fn test_clamp_pulls_back_in() {
        let bounds = RectBounds::new(1000.0, 800.0);
        let p = bounds.clamp(Vec2::new(700.0, 500.0), 10.0);
        assert_eq!(p, Vec2::new(490.0, 390.0));
        assert!(bounds.contains(p, 10.0));
    }

    #[test]
    fn test_contains_respects_radius() {
        let bounds = RectBounds::new(100.0, 100.0);
        assert!(bounds.contains(Vec2::ZERO, 50.0));
        assert!(!bounds.contains(Vec2::new(45.0, 0.0), 10.0));
    }
}
