//! Player locomotion, fin animation and camera follow

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::morphology::FIN_SWING_DEGREES;
use crate::types::{PartStats, Transform2D};

/// Move speed gained per point of the creature's speed stat
pub const SPEED_BONUS_PER_POINT: f32 = 0.01;

/// Fin oscillation frequency in radians/sec
const FIN_SWING_FREQUENCY: f32 = 8.0;

/// Raw movement axis, each component in [-1, 1]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MovementInput {
    pub axis: Vec2,
}

impl MovementInput {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            axis: Vec2::new(x.clamp(-1.0, 1.0), y.clamp(-1.0, 1.0)),
        }
    }

    pub fn idle() -> Self {
        Self::default()
    }

    pub fn is_idle(&self) -> bool {
        self.axis == Vec2::ZERO
    }
}

/// Player-controlled movement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Locomotion {
    /// Units/sec, already including the stat bonus
    pub move_speed: f32,
    /// Degrees/sec at full horizontal input
    pub turn_speed_deg: f32,
}

impl Locomotion {
    pub fn new(move_speed: f32, turn_speed_deg: f32) -> Self {
        Self {
            move_speed,
            turn_speed_deg,
        }
    }

    /// Base speed raised by 1% per speed point of the creature
    pub fn for_stats(base_move_speed: f32, turn_speed_deg: f32, stats: &PartStats) -> Self {
        let bonus = stats.speed as f32 * SPEED_BONUS_PER_POINT;
        Self::new(base_move_speed * (1.0 + bonus), turn_speed_deg)
    }

    /// Translate in the creature's local frame, then yaw by the horizontal input
    pub fn apply(&self, transform: Transform2D, input: MovementInput, delta_time: f32) -> Transform2D {
        let local_step = input.axis * self.move_speed * delta_time;
        let position = transform.position + transform.local_to_world(local_step);
        let rotation = transform.rotation - input.axis.x * self.turn_speed_deg.to_radians() * delta_time;
        Transform2D::new(position, rotation)
    }
}

/// Fin angle in degrees for player input at scene time `time`
pub fn player_fin_angle(input: MovementInput, time: f32) -> f32 {
    if input.axis.x < 0.0 {
        -FIN_SWING_DEGREES
    } else if input.axis.x > 0.0 {
        FIN_SWING_DEGREES
    } else if input.axis.y != 0.0 {
        fin_swing(time)
    } else {
        0.0
    }
}

/// Fin angle in degrees for a pursuer heading along `direction`
pub fn pursuer_fin_angle(direction: Vec2, time: f32) -> f32 {
    if direction.y != 0.0 {
        fin_swing(time)
    } else {
        0.0
    }
}

fn fin_swing(time: f32) -> f32 {
    (time * FIN_SWING_FREQUENCY).sin() * FIN_SWING_DEGREES
}

/// Camera that eases toward the player each frame
#[derive(Debug, Clone, PartialEq)]
pub struct CameraRig {
    pub position: Vec2,
    /// Per-second easing factor
    pub follow_rate: f32,
}

impl CameraRig {
    pub fn new(position: Vec2, follow_rate: f32) -> Self {
        Self {
            position,
            follow_rate,
        }
    }

    pub fn follow(&mut self, target: Vec2, delta_time: f32) {
        let t = (delta_time * self.follow_rate).clamp(0.0, 1.0);
        self.position = self.position.lerp(target, t);
    }
}
