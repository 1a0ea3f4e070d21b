//! Pose output towards whatever owns the renderable side of an entity.

use std::collections::HashMap;

use glam::Vec3;

use crate::entity::EntityId;

/// Receives resolved poses once per tick.
pub trait TransformSink {
    fn set_position(&mut self, entity: EntityId, position: Vec3);

    /// Euler rotation in degrees (pitch, yaw, roll).
    fn set_rotation(&mut self, entity: EntityId, rotation: Vec3);
}

/// A pose produced during a tick, waiting to be flushed to a sink.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseUpdate {
    pub entity: EntityId,
    pub position: Vec3,
    pub rotation: Option<Vec3>,
}

impl PoseUpdate {
    pub fn apply(&self, sink: &mut dyn TransformSink) {
        sink.set_position(self.entity, self.position);
        if let Some(rotation) = self.rotation {
            sink.set_rotation(self.entity, rotation);
        }
    }
}

/// Sink that keeps the latest pose per entity.
#[derive(Debug, Clone, Default)]
pub struct LatestPoses {
    pub positions: HashMap<EntityId, Vec3>,
    pub rotations: HashMap<EntityId, Vec3>,
}

impl TransformSink for LatestPoses {
    fn set_position(&mut self, entity: EntityId, position: Vec3) {
        self.positions.insert(entity, position);
    }

    fn set_rotation(&mut self, entity: EntityId, rotation: Vec3) {
        self.rotations.insert(entity, rotation);
    }
}
