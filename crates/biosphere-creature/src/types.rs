//! Common types for creatures

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::f32::consts::{PI, TAU};
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier for creatures spawned into a scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(u64);

static NEXT_ENTITY_ID: AtomicU64 = AtomicU64::new(1);

impl EntityId {
    /// Generate a new unique entity ID
    pub fn new() -> Self {
        EntityId(NEXT_ENTITY_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw u64 value
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// Body region a part attaches to. At most one part is selected per region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Region {
    Body,
    Eyes,
    Fins,
}

impl Region {
    /// All regions in listing order
    pub const ALL: [Region; 3] = [Region::Body, Region::Eyes, Region::Fins];

    /// Human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            Region::Body => "Body",
            Region::Eyes => "Eyes",
            Region::Fins => "Fins",
        }
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for Region {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "body" => Ok(Region::Body),
            "eyes" | "eye" => Ok(Region::Eyes),
            "fins" | "fin" => Ok(Region::Fins),
            _ => Err(format!("Unknown region: {}. Valid: body, eyes, fins", s)),
        }
    }
}

/// Gameplay stats contributed by a part (and summed for a creature)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PartStats {
    pub health: i32,
    pub speed: i32,
    pub strength: i32,
}

impl PartStats {
    pub const ZERO: PartStats = PartStats {
        health: 0,
        speed: 0,
        strength: 0,
    };

    pub fn new(health: i32, speed: i32, strength: i32) -> Self {
        Self {
            health,
            speed,
            strength,
        }
    }
}

impl Add for PartStats {
    type Output = PartStats;

    fn add(self, rhs: PartStats) -> PartStats {
        PartStats {
            health: self.health + rhs.health,
            speed: self.speed + rhs.speed,
            strength: self.strength + rhs.strength,
        }
    }
}

impl AddAssign for PartStats {
    fn add_assign(&mut self, rhs: PartStats) {
        *self = *self + rhs;
    }
}

impl Sum for PartStats {
    fn sum<I: Iterator<Item = PartStats>>(iter: I) -> Self {
        iter.fold(PartStats::ZERO, Add::add)
    }
}

impl std::fmt::Display for PartStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "health {} / speed {} / strength {}",
            self.health, self.speed, self.strength
        )
    }
}

/// Position and rotation of a creature in the top-down scene
///
/// `rotation` is in radians, counter-clockwise. A creature faces along its
/// local up axis, so rotation 0 faces +Y.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Transform2D {
    pub position: Vec2,
    pub rotation: f32,
}

impl Transform2D {
    pub fn new(position: Vec2, rotation: f32) -> Self {
        Self { position, rotation }
    }

    pub fn from_position(position: Vec2) -> Self {
        Self {
            position,
            rotation: 0.0,
        }
    }

    /// Unit vector the creature faces (its local up axis in world space)
    pub fn up(&self) -> Vec2 {
        Vec2::new(-self.rotation.sin(), self.rotation.cos())
    }

    /// Convert a vector from the creature's local frame to world space
    pub fn local_to_world(&self, local: Vec2) -> Vec2 {
        Vec2::from_angle(self.rotation).rotate(local)
    }
}

/// Rotation that points the local up axis along `direction`
pub fn facing_rotation(direction: Vec2) -> f32 {
    (-direction.x).atan2(direction.y)
}

/// Signed shortest angle from `from` to `to`, in (-PI, PI]
pub fn angle_delta(from: f32, to: f32) -> f32 {
    let delta = (to - from + PI).rem_euclid(TAU) - PI;
    if delta <= -PI {
        delta + TAU
    } else {
        delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_uniqueness() {
        let id1 = EntityId::new();
        let id2 = EntityId::new();
        assert_ne!(id1, id2);
        assert!(id2.raw() > id1.raw());
    }

    #[test]
    fn test_region_from_str() {
        assert_eq!("Body".parse::<Region>(), Ok(Region::Body));
        assert_eq!("fin".parse::<Region>(), Ok(Region::Fins));
        assert_eq!("EYES".parse::<Region>(), Ok(Region::Eyes));
        assert!("tail".parse::<Region>().is_err());
    }

    #[test]
    fn test_facing_rotation_matches_up_axis() {
        for dir in [Vec2::X, Vec2::Y, Vec2::NEG_X, Vec2::new(1.0, -1.0).normalize()] {
            let t = Transform2D::new(Vec2::ZERO, facing_rotation(dir));
            assert!((t.up() - dir).length() < 1e-5, "dir {:?} up {:?}", dir, t.up());
        }
    }

    #[test]
    fn test_angle_delta_takes_short_way() {
        let d = angle_delta(170f32.to_radians(), (-170f32).to_radians());
        assert!((d - 20f32.to_radians()).abs() < 1e-5);

        let d = angle_delta(0.0, -PI / 2.0);
        assert!((d + PI / 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_local_to_world() {
        let t = Transform2D::new(Vec2::ZERO, PI / 2.0);
        let world = t.local_to_world(Vec2::Y);
        assert!((world - Vec2::NEG_X).length() < 1e-5);
    }

    #[test]
    fn test_stats_sum() {
        let total: PartStats = [
            PartStats::new(30, 5, 10),
            PartStats::new(5, 2, 3),
            PartStats::new(0, 15, 2),
        ]
        .into_iter()
        .sum();
        assert_eq!(total, PartStats::new(35, 22, 15));

        let empty: PartStats = std::iter::empty().sum();
        assert_eq!(empty, PartStats::ZERO);
    }
}
