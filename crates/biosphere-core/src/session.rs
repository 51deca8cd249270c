//! Gameplay session
//!
//! Owns the player creature, one pursuing enemy and the camera for a loaded
//! world. The caller drives it once per frame with the frame time and the
//! current simulation state.

use biosphere_creature::locomotion::{player_fin_angle, pursuer_fin_angle};
use biosphere_creature::{
    AssembledModel, BaseBody, CameraRig, CreatureComposer, CreatureDefinition, EntityId,
    InvalidSetting, Locomotion, MovementInput, PartCatalog, PartStats, PursuitBehavior,
    PursuitConfig, PursuitOutcome, Transform2D,
};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::world::WorldSave;

/// Gameplay tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Player speed in units/sec before the stat bonus
    pub base_move_speed: f32,
    pub turn_speed_deg: f32,
    /// Per-second camera easing factor
    pub camera_follow_rate: f32,
    pub pursuit: PursuitConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            base_move_speed: 4.0,
            turn_speed_deg: 180.0,
            camera_follow_rate: 5.0,
            pursuit: PursuitConfig::default(),
        }
    }
}

impl SessionConfig {
    /// Reject negative or non-finite tuning before a session is built from it
    pub fn validate(&self) -> Result<(), InvalidSetting> {
        InvalidSetting::check_non_negative("base_move_speed", self.base_move_speed)?;
        InvalidSetting::check_non_negative("turn_speed_deg", self.turn_speed_deg)?;
        InvalidSetting::check_non_negative("camera_follow_rate", self.camera_follow_rate)?;
        self.pursuit
            .validate()
            .map_err(|err| err.with_prefix("pursuit"))
    }
}

/// Whether gameplay time advances
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SimulationState {
    #[default]
    Running,
    Paused,
}

impl SimulationState {
    pub fn toggled(self) -> Self {
        match self {
            SimulationState::Running => SimulationState::Paused,
            SimulationState::Paused => SimulationState::Running,
        }
    }

    pub fn is_paused(self) -> bool {
        self == SimulationState::Paused
    }
}

/// A creature placed in the scene
#[derive(Debug, Clone)]
pub struct Actor {
    pub id: EntityId,
    pub transform: Transform2D,
    pub creature: CreatureDefinition,
    pub model: AssembledModel,
}

impl Actor {
    fn spawn(
        composer: &CreatureComposer<'_>,
        base: &BaseBody,
        creature: CreatureDefinition,
        transform: Transform2D,
    ) -> Self {
        let model = composer.assemble(&creature, base);
        Self {
            id: EntityId::new(),
            transform,
            creature,
            model,
        }
    }
}

/// What happened during one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    /// False when the tick was skipped (paused, or no usable frame time)
    pub simulated: bool,
    pub enemy_respawned: bool,
    pub player: Transform2D,
    pub enemy: Transform2D,
}

pub struct GameSession<'a> {
    world: WorldSave,
    composer: CreatureComposer<'a>,
    base: BaseBody,
    player: Actor,
    enemy: Actor,
    player_stats: PartStats,
    camera: CameraRig,
    locomotion: Locomotion,
    pursuit: PursuitBehavior,
    /// Seconds of simulated time since the session started
    elapsed: f32,
}

impl<'a> GameSession<'a> {
    pub fn new<R: Rng + ?Sized>(
        world: WorldSave,
        catalog: &'a PartCatalog,
        config: &SessionConfig,
        rng: &mut R,
    ) -> Self {
        let composer = CreatureComposer::new(catalog);
        let base = BaseBody::standard();

        let player_stats = composer.aggregate_stats(&world.selected_parts);
        let locomotion =
            Locomotion::for_stats(config.base_move_speed, config.turn_speed_deg, &player_stats);
        let player = Actor::spawn(
            &composer,
            &base,
            world.selected_parts.clone(),
            Transform2D::default(),
        );

        let mut pursuit = PursuitBehavior::new(config.pursuit.clone());
        pursuit.scale_follow_speed(world.difficulty.enemy_speed_factor());

        let enemy_at = pursuit.spawn_near(player.transform.position, rng);
        let enemy = Actor::spawn(&composer, &base, composer.random_creature(rng), enemy_at);

        log::info!(
            "Session started in '{}' ({}): player {} speed {:.2}, enemy {} at ({:.1}, {:.1})",
            world.name,
            world.difficulty,
            player_stats,
            locomotion.move_speed,
            enemy.id,
            enemy_at.position.x,
            enemy_at.position.y
        );

        Self {
            world,
            composer,
            camera: CameraRig::new(player.transform.position, config.camera_follow_rate),
            base,
            player,
            enemy,
            player_stats,
            locomotion,
            pursuit,
            elapsed: 0.0,
        }
    }

    pub fn world(&self) -> &WorldSave {
        &self.world
    }

    pub fn player(&self) -> &Actor {
        &self.player
    }

    pub fn enemy(&self) -> &Actor {
        &self.enemy
    }

    pub fn player_stats(&self) -> PartStats {
        self.player_stats
    }

    pub fn camera(&self) -> &CameraRig {
        &self.camera
    }

    pub fn locomotion(&self) -> &Locomotion {
        &self.locomotion
    }

    pub fn pursuit(&self) -> &PursuitBehavior {
        &self.pursuit
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Advance the session by `delta_time` seconds
    pub fn tick<R: Rng + ?Sized>(
        &mut self,
        state: SimulationState,
        input: MovementInput,
        delta_time: f32,
        rng: &mut R,
    ) -> TickReport {
        if state.is_paused() || !(delta_time.is_finite() && delta_time > 0.0) {
            return self.report(false, false);
        }

        self.elapsed += delta_time;

        self.player.transform = self
            .locomotion
            .apply(self.player.transform, input, delta_time);
        self.player
            .model
            .set_fin_angle(player_fin_angle(input, self.elapsed));

        let target = self.player.transform.position;
        self.camera.follow(target, delta_time);

        let respawned = match self
            .pursuit
            .tick(self.enemy.transform, target, delta_time, rng)
        {
            PursuitOutcome::Moved(transform) => {
                self.enemy.transform = transform;
                let heading = target - transform.position;
                self.enemy
                    .model
                    .set_fin_angle(pursuer_fin_angle(heading, self.elapsed));
                false
            }
            PursuitOutcome::Respawned(transform) => {
                let creature = self.composer.random_creature(rng);
                self.enemy = Actor::spawn(&self.composer, &self.base, creature, transform);
                log::debug!("Enemy respawned as {}", self.enemy.id);
                true
            }
        };

        self.world.add_play_time(f64::from(delta_time));
        self.report(true, respawned)
    }

    fn report(&self, simulated: bool, enemy_respawned: bool) -> TickReport {
        TickReport {
            simulated,
            enemy_respawned,
            player: self.player.transform,
            enemy: self.enemy.transform,
        }
    }

    /// End the session, returning the world with updated play time
    pub fn into_world(self) -> WorldSave {
        log::info!(
            "Session ended in '{}' after {:.1}s",
            self.world.name,
            self.elapsed
        );
        self.world
    }
}
