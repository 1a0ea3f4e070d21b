//! Game simulation - the main game loop.
//!
//! [`Simulation`] owns everything the gameplay layer touches: the clock, the
//! three collider scenes, the entity arena and the task scheduler. Nothing is
//! global. One call to [`Simulation::step`] runs one tick:
//!
//! 1. advance the clock by the scaled delta
//! 2. run scheduled tasks that came due (perception, lifetimes, respawn)
//! 3. tick every live entity, applying its queued side effects right after it
//!
//! Entities never touch each other directly during their tick. Damage,
//! spawns, despawns and trigger contacts are queued in [`Commands`] and
//! resolved by id afterwards, so a stale id is simply skipped.

use std::mem;

use slotmap::SlotMap;
use sps_physics::{Aabb, ColliderScene, KinematicController};

use crate::ai::Turret;
use crate::clock::Clock;
use crate::config::SimulationConfig;
use crate::damage::{DamageEvent, DamageSource};
use crate::entity::{Commands, Entity, EntityId, EntityKind, Target, TickContext};
use crate::error::SimError;
use crate::input::PlayerInput;
use crate::level::Level;
use crate::player::Player;
use crate::scheduler::{Scheduler, SimEvent, Trigger};
use crate::spawner::Spawner;
use crate::transform::{PoseUpdate, TransformSink};
use crate::trigger::HurtTrigger;

/// Deferred work the simulation schedules for itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// Refresh an AI agent's line of sight.
    Perceive(EntityId),
    /// Remove an entity whose lifetime ran out.
    Despawn(EntityId),
    /// Reload the level if the player has been dead long enough.
    Respawn,
}

/// The main game simulation.
#[derive(Debug)]
pub struct Simulation {
    clock: Clock,

    /// Simulation configuration.
    config: SimulationConfig,

    /// Current level.
    level: Level,

    /// Static level geometry.
    world: ColliderScene<()>,

    /// Agent hitboxes, tagged with their owner.
    hitboxes: ColliderScene<EntityId>,

    /// Trigger volumes, tagged with their owner.
    triggers: ColliderScene<EntityId>,

    entities: SlotMap<EntityId, Entity>,

    scheduler: Scheduler<Task>,

    /// Movement physics controller.
    controller: KinematicController,

    player: Option<EntityId>,

    drone_count: usize,

    /// Side effects of the entity currently ticking.
    commands: Commands,

    /// Poses waiting for [`Simulation::flush_poses`].
    poses: Vec<PoseUpdate>,
}

impl Simulation {
    /// Create a new simulation with the given configuration and level.
    pub fn new(config: SimulationConfig, level: Level) -> Result<Self, SimError> {
        config.validate()?;
        if level.player_spawn.is_none() {
            return Err(SimError::NoPlayerSpawn(level.name.clone()));
        }

        let mut sim = Self {
            clock: Clock::default(),
            world: ColliderScene::with_zones(config.zones.clone()),
            hitboxes: ColliderScene::with_zones(config.zones.clone()),
            triggers: ColliderScene::with_zones(config.zones.clone()),
            entities: SlotMap::with_key(),
            scheduler: Scheduler::new(),
            controller: KinematicController::new(config.movement.clone()),
            player: None,
            drone_count: 0,
            commands: Commands::default(),
            poses: Vec::new(),
            config,
            level,
        };
        sim.reload();
        Ok(sim)
    }

    /// Create a simulation with default configuration and test arena.
    pub fn test_arena() -> Result<Self, SimError> {
        Self::new(SimulationConfig::default(), Level::test_arena())
    }

    /// Replace the level and rebuild everything from it.
    pub fn load_level(&mut self, level: Level) -> Result<(), SimError> {
        if level.player_spawn.is_none() {
            return Err(SimError::NoPlayerSpawn(level.name));
        }
        self.level = level;
        self.reload();
        Ok(())
    }

    /// Throw away all runtime state and rebuild the current level.
    ///
    /// The clock keeps running.
    pub fn reload(&mut self) {
        self.world.reset();
        self.hitboxes.reset();
        self.triggers.reset();
        self.entities.clear();
        self.scheduler.clear();
        self.player = None;
        self.drone_count = 0;
        self.commands = Commands::default();
        self.poses.clear();

        for brush in &self.level.brushes {
            self.world.add(*brush, ());
        }

        if let Some(spawn) = self.level.player_spawn {
            let mut player = Player::new(spawn.position, spawn.yaw, &self.config);
            self.controller.spawn_at(&mut player.body, &self.world);
            self.spawn(Entity::Player(player));
        }

        let level = mem::take(&mut self.level);
        for turret in &level.turrets {
            self.spawn(Entity::Turret(Turret::new(
                turret.position,
                turret.hitbox_size,
                turret.facing,
                turret.health,
            )));
        }
        for spawner in &level.spawners {
            self.spawn(Entity::Spawner(Spawner::new(
                spawner.position,
                spawner.position + spawner.spawn_offset,
            )));
        }
        for trigger in &level.hurt_triggers {
            self.spawn(Entity::HurtTrigger(HurtTrigger::new(
                Aabb::new(trigger.center, trigger.size),
                trigger.damage,
                trigger.interval,
            )));
        }
        self.level = level;

        log::info!(
            "loaded level `{}`: {} brushes, {} entities",
            self.level.name,
            self.world.len(),
            self.entities.len()
        );
    }

    /// Advance the simulation by one fixed tick of [`SimulationConfig::delta_time`].
    pub fn tick(&mut self, input: &PlayerInput) {
        self.step(self.config.delta_time(), input);
    }

    /// Advance the simulation by `delta_time` seconds, scaled by the
    /// configured time scale.
    pub fn step(&mut self, delta_time: f32, input: &PlayerInput) {
        self.clock.advance(delta_time * self.config.time_scale);

        let mut due = self.scheduler.begin_tick(self.clock.frame, self.clock.time);
        if input.key_pressed {
            due.extend(self.scheduler.fire(SimEvent::KeyDown));
        }
        self.run_tasks(due);

        let target = self.target();
        let ids: Vec<EntityId> = self.entities.keys().collect();
        for id in ids {
            self.tick_entity(id, input, target);
        }
    }

    /// Add an entity, register its colliders and schedule its tasks.
    pub fn spawn(&mut self, entity: Entity) -> EntityId {
        let kind = entity.kind();
        let hitboxes = &mut self.hitboxes;
        let triggers = &mut self.triggers;
        let id = self.entities.insert_with_key(|id| {
            let mut entity = entity;
            entity.attach(id, hitboxes, triggers);
            entity
        });

        match kind {
            EntityKind::Player => self.player = Some(id),
            EntityKind::Turret => {
                self.scheduler
                    .schedule(Trigger::NextTick, Some(id), Task::Perceive(id));
            }
            EntityKind::Drone => {
                self.drone_count += 1;
                self.scheduler
                    .schedule(Trigger::NextTick, Some(id), Task::Perceive(id));
            }
            EntityKind::Projectile => {
                self.scheduler.schedule(
                    Trigger::After(self.config.ai.projectile_lifetime),
                    Some(id),
                    Task::Despawn(id),
                );
            }
            EntityKind::HurtTrigger | EntityKind::Spawner => {}
        }

        log::debug!("spawned {kind:?} {id:?}");
        id
    }

    /// Remove an entity, its colliders and every task it owns.
    pub fn despawn(&mut self, id: EntityId) -> Result<Entity, SimError> {
        let mut entity = self.entities.remove(id).ok_or(SimError::UnknownEntity(id))?;
        entity.detach(&mut self.hitboxes, &mut self.triggers);
        let cancelled = self.scheduler.cancel_owner(id);

        match entity.kind() {
            EntityKind::Drone => self.drone_count = self.drone_count.saturating_sub(1),
            EntityKind::Player => self.player = None,
            _ => {}
        }

        log::debug!("despawned {:?} {id:?}, cancelled {cancelled} tasks", entity.kind());
        Ok(entity)
    }

    /// Resolve a damage event against its target.
    ///
    /// Unknown targets and entities without health are ignored. Turrets and
    /// drones are despawned when they die; a dead player stays in the arena
    /// until the level reloads.
    pub fn apply_damage(&mut self, event: DamageEvent) {
        let is_player = self.player == Some(event.target);
        if is_player && self.config.no_damage && event.source.is_hitbox() {
            return;
        }
        let Some(target) = self
            .entities
            .get_mut(event.target)
            .and_then(|entity| entity.as_damageable_mut())
        else {
            return;
        };
        if target.is_dead() {
            return;
        }

        if event.source == DamageSource::KillVolume {
            target.kill();
        } else {
            target.on_damage(event.amount, event.position);
        }
        if !target.is_dead() {
            return;
        }

        if is_player {
            self.on_player_death(event.target);
        } else if let Ok(entity) = self.despawn(event.target) {
            log::info!("{:?} destroyed by {:?}", entity.kind(), event.source);
        }
    }

    /// Hand every pose produced since the last flush to `sink`.
    pub fn flush_poses(&mut self, sink: &mut dyn TransformSink) -> usize {
        let count = self.poses.len();
        for pose in self.poses.drain(..) {
            pose.apply(sink);
        }
        count
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    /// Id of the current player. Changes when the level reloads.
    pub fn player_id(&self) -> Option<EntityId> {
        self.player
    }

    pub fn player(&self) -> Option<&Player> {
        match self.entities.get(self.player?)? {
            Entity::Player(player) => Some(player),
            _ => None,
        }
    }

    pub fn player_mut(&mut self) -> Option<&mut Player> {
        match self.entities.get_mut(self.player?)? {
            Entity::Player(player) => Some(player),
            _ => None,
        }
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(id)
    }

    /// Whether `id` still refers to a live entity.
    pub fn is_alive(&self, id: EntityId) -> bool {
        self.entities.contains_key(id)
    }

    pub fn entities(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.entities.iter()
    }

    /// Number of live entities of one kind.
    pub fn count(&self, kind: EntityKind) -> usize {
        self.entities.values().filter(|e| e.kind() == kind).count()
    }

    pub fn world(&self) -> &ColliderScene<()> {
        &self.world
    }

    pub fn hitboxes(&self) -> &ColliderScene<EntityId> {
        &self.hitboxes
    }

    pub fn triggers(&self) -> &ColliderScene<EntityId> {
        &self.triggers
    }

    pub fn scheduler(&self) -> &Scheduler<Task> {
        &self.scheduler
    }

    /// The player as AI sees it. Nothing while dead.
    fn target(&self) -> Option<Target> {
        let id = self.player?;
        let player = self.player()?;
        player.is_alive().then(|| Target {
            id,
            center: player.body.center(),
        })
    }

    fn run_tasks(&mut self, tasks: Vec<Task>) {
        for task in tasks {
            match task {
                Task::Perceive(id) => self.perceive(id),
                Task::Despawn(id) => {
                    if let Err(err) = self.despawn(id) {
                        log::debug!("lifetime ran out: {err}");
                    }
                }
                Task::Respawn => {
                    if self.try_respawn() {
                        // The rest of the batch belongs to the old level.
                        return;
                    }
                }
            }
        }
    }

    fn perceive(&mut self, id: EntityId) {
        let target = self.target();
        let Some((perception, eye)) = self
            .entities
            .get_mut(id)
            .and_then(|entity| entity.perception_mut())
        else {
            return;
        };

        perception.observe(eye, target, &self.world, self.clock.time, &self.config.ai);
        self.scheduler.schedule(
            Trigger::After(self.config.ai.perception_interval),
            Some(id),
            Task::Perceive(id),
        );
    }

    fn try_respawn(&mut self) -> bool {
        let died_at = self.player().and_then(|player| player.died_at);
        match died_at {
            Some(t) if self.clock.since(t) > f64::from(self.config.player.respawn_delay) => {
                log::info!("player respawned");
                self.reload();
                true
            }
            _ => {
                self.scheduler
                    .schedule(Trigger::OnEvent(SimEvent::KeyDown), None, Task::Respawn);
                false
            }
        }
    }

    fn on_player_death(&mut self, id: EntityId) {
        let now = self.clock.time;
        let Some(Entity::Player(player)) = self.entities.get_mut(id) else {
            return;
        };
        player.died_at = Some(now);
        if let Some(key) = player.hitbox.take() {
            self.hitboxes.remove(key);
        }

        self.scheduler
            .schedule(Trigger::OnEvent(SimEvent::KeyDown), None, Task::Respawn);
        log::info!("player died at {now:.2}s");
    }

    fn tick_entity(&mut self, id: EntityId, input: &PlayerInput, target: Option<Target>) {
        let Some(entity) = self.entities.get_mut(id) else {
            return;
        };

        let mut ctx = TickContext {
            clock: &self.clock,
            config: &self.config,
            controller: &self.controller,
            world: &self.world,
            hitboxes: &mut self.hitboxes,
            triggers: &self.triggers,
            nav_nodes: &self.level.nav_nodes,
            input,
            target,
            drone_count: self.drone_count,
            commands: &mut self.commands,
        };
        entity.tick(id, &mut ctx);

        self.apply_commands();
    }

    fn apply_commands(&mut self) {
        let Commands {
            spawn,
            despawn,
            mut damage,
            triggered,
            poses,
        } = mem::take(&mut self.commands);
        self.poses.extend(poses);

        let now = self.clock.time;
        for (trigger, activator) in triggered {
            if let Some(trigger) = self
                .entities
                .get_mut(trigger)
                .and_then(|entity| entity.as_triggerable_mut())
            {
                trigger.on_triggered(activator, now, &mut damage);
            }
        }

        for event in damage {
            self.apply_damage(event);
        }
        for id in despawn {
            if let Err(err) = self.despawn(id) {
                log::debug!("despawn skipped: {err}");
            }
        }
        for entity in spawn {
            self.spawn(entity);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
