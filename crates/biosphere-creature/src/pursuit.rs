//! Enemy pursuit behavior
//!
//! Per-tick rule that turns a pursuer toward its target and moves it closer
//! with bounded speed. Pursuers that fall too far behind are respawned near
//! the target. Nothing here is persisted.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{angle_delta, facing_rotation, Transform2D};

/// Pursuit tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PursuitConfig {
    /// Max linear speed in units/sec, also the per-second turn fraction
    pub follow_speed: f32,
    /// Max turn rate in degrees/sec
    pub max_angular_speed_deg: f32,
    /// Fraction of the pursuer→target segment the pursuer heads for (0.5 = midpoint)
    pub approach_ratio: f32,
    /// Pursuers farther than this from the target are respawned
    pub despawn_distance: f32,
    /// Respawn distance from the target
    pub spawn_radius: f32,
}

impl Default for PursuitConfig {
    fn default() -> Self {
        Self {
            follow_speed: 3.0,
            max_angular_speed_deg: 360.0,
            approach_ratio: 0.5,
            despawn_distance: 10.0,
            spawn_radius: 5.0,
        }
    }
}

/// A tuning value outside its allowed range
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{field} must be {expected} (got {value})")]
pub struct InvalidSetting {
    pub field: String,
    pub expected: &'static str,
    pub value: f32,
}

impl InvalidSetting {
    /// Require a finite value >= 0
    pub fn check_non_negative(field: &str, value: f32) -> Result<(), Self> {
        if value.is_finite() && value >= 0.0 {
            Ok(())
        } else {
            Err(Self::new(field, "a finite number >= 0", value))
        }
    }

    /// Require a value in [0, 1]
    pub fn check_unit(field: &str, value: f32) -> Result<(), Self> {
        if (0.0..=1.0).contains(&value) {
            Ok(())
        } else {
            Err(Self::new(field, "between 0 and 1", value))
        }
    }

    fn new(field: &str, expected: &'static str, value: f32) -> Self {
        Self {
            field: field.to_string(),
            expected,
            value,
        }
    }

    /// Qualify the field with its enclosing section, e.g. `pursuit.spawn_radius`
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.field = format!("{}.{}", prefix, self.field);
        self
    }
}

impl PursuitConfig {
    pub fn validate(&self) -> Result<(), InvalidSetting> {
        InvalidSetting::check_non_negative("follow_speed", self.follow_speed)?;
        InvalidSetting::check_non_negative("max_angular_speed_deg", self.max_angular_speed_deg)?;
        InvalidSetting::check_unit("approach_ratio", self.approach_ratio)?;
        InvalidSetting::check_non_negative("despawn_distance", self.despawn_distance)?;
        InvalidSetting::check_non_negative("spawn_radius", self.spawn_radius)?;
        Ok(())
    }
}

/// Result of one pursuit tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PursuitOutcome {
    /// Pursuer moved to the new transform
    Moved(Transform2D),
    /// Pursuer was discarded; a new one appears at this transform
    Respawned(Transform2D),
}

impl PursuitOutcome {
    pub fn transform(&self) -> Transform2D {
        match self {
            PursuitOutcome::Moved(t) | PursuitOutcome::Respawned(t) => *t,
        }
    }

    pub fn is_respawn(&self) -> bool {
        matches!(self, PursuitOutcome::Respawned(_))
    }
}

#[derive(Debug, Clone, Default)]
pub struct PursuitBehavior {
    config: PursuitConfig,
}

impl PursuitBehavior {
    pub fn new(config: PursuitConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PursuitConfig {
        &self.config
    }

    /// Scale the follow speed (difficulty adjustment)
    pub fn scale_follow_speed(&mut self, factor: f32) {
        self.config.follow_speed *= factor;
    }

    /// Run one tick: respawn if the pursuer is out of range, otherwise step toward the target.
    ///
    /// A non-positive or non-finite `delta_time`, a non-finite target or an
    /// invalid config leaves the pursuer where it is.
    pub fn tick<R: Rng + ?Sized>(
        &self,
        pursuer: Transform2D,
        target: Vec2,
        delta_time: f32,
        rng: &mut R,
    ) -> PursuitOutcome {
        if !(delta_time.is_finite() && delta_time > 0.0) || !target.is_finite() {
            return PursuitOutcome::Moved(pursuer);
        }
        if let Err(err) = self.config.validate() {
            log::debug!("Pursuit skipped: {}", err);
            return PursuitOutcome::Moved(pursuer);
        }

        if pursuer.position.distance(target) > self.config.despawn_distance {
            let spawned = self.spawn_near(target, rng);
            log::debug!(
                "Pursuer at ({:.1}, {:.1}) out of range, respawned at ({:.1}, {:.1})",
                pursuer.position.x,
                pursuer.position.y,
                spawned.position.x,
                spawned.position.y
            );
            return PursuitOutcome::Respawned(spawned);
        }

        PursuitOutcome::Moved(self.step(pursuer, target, delta_time))
    }

    /// Turn and move the pursuer toward `target` for one tick
    pub fn step(&self, pursuer: Transform2D, target: Vec2, delta_time: f32) -> Transform2D {
        let to_target = target - pursuer.position;
        let rotation = if to_target.length_squared() > f32::EPSILON {
            self.turn_toward(pursuer.rotation, facing_rotation(to_target), delta_time)
        } else {
            pursuer.rotation
        };

        let goal = pursuer.position.lerp(target, self.config.approach_ratio);
        let position = move_towards(
            pursuer.position,
            goal,
            self.config.follow_speed * delta_time,
        );

        Transform2D::new(position, rotation)
    }

    /// Rotate a fraction of the remaining angle, capped by the angular speed budget.
    /// Snaps once the remaining angle fits inside the budget.
    fn turn_toward(&self, current: f32, desired: f32, delta_time: f32) -> f32 {
        let remaining = angle_delta(current, desired);
        let budget = (self.config.max_angular_speed_deg.to_radians() * delta_time).max(0.0);

        if remaining.abs() <= budget {
            return desired;
        }

        let fraction = (self.config.follow_speed * delta_time).clamp(0.0, 1.0);
        let turn = (remaining * fraction).clamp(-budget, budget);
        angle_delta(0.0, current + turn)
    }

    /// Random point exactly `spawn_radius` from `target`
    pub fn spawn_near<R: Rng + ?Sized>(&self, target: Vec2, rng: &mut R) -> Transform2D {
        let angle = rng.gen_range(0.0..TAU);
        Transform2D::from_position(target + Vec2::from_angle(angle) * self.config.spawn_radius)
    }
}

/// Move `current` toward `goal` by at most `max_distance`, never overshooting
pub fn move_towards(current: Vec2, goal: Vec2, max_distance: f32) -> Vec2 {
    let delta = goal - current;
    let distance = delta.length();
    if distance <= max_distance || distance <= f32::EPSILON {
        goal
    } else {
        current + delta / distance * max_distance
    }
}
