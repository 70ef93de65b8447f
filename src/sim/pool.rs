//! Obstacle and fuel tank pool
//!
//! Spawning is two-phase. [`EntityPool::issue`] rolls the spawn parameters and
//! reserves a pending slot; the host loads the model and hands the outcome to
//! [`EntityPool::resolve`], possibly many ticks later. Only resolved entities
//! move and collide.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::FUEL_MODEL_PATH;
use crate::error::AssetLoadError;
use crate::platform::EntityHandle;
use crate::tuning::Tuning;

/// Pooled entity types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Obstacle,
    FuelTank,
}

/// One of the three obstacle models, each with its own scale and facing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleVariant {
    Large,
    Medium,
    Tiny,
}

impl ObstacleVariant {
    pub const ALL: [ObstacleVariant; 3] = [
        ObstacleVariant::Large,
        ObstacleVariant::Medium,
        ObstacleVariant::Tiny,
    ];

    /// Model file number under `./models/obstacle/`
    pub fn model_index(&self) -> u8 {
        match self {
            ObstacleVariant::Large => 1,
            ObstacleVariant::Medium => 2,
            ObstacleVariant::Tiny => 3,
        }
    }

    pub fn model_path(&self) -> String {
        format!("./models/obstacle/{}.glb", self.model_index())
    }

    /// Uniform scale applied to the model
    pub fn scale(&self) -> f32 {
        match self {
            ObstacleVariant::Large => 4.0,
            ObstacleVariant::Medium => 0.8,
            ObstacleVariant::Tiny => 0.02, // source mesh is authored in centimetres
        }
    }

    /// Yaw offset (radians) so the model faces the car
    pub fn base_yaw(&self) -> f32 {
        match self {
            ObstacleVariant::Medium => -1.6,
            ObstacleVariant::Large | ObstacleVariant::Tiny => 1.5,
        }
    }
}

/// Identifies a spawn that is waiting on its model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SpawnTicket(pub u32);

/// What the host must load to complete a spawn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnRequest {
    pub ticket: SpawnTicket,
    pub kind: EntityKind,
    pub model_path: String,
}

/// A live obstacle or fuel tank
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub handle: EntityHandle,
    pub kind: EntityKind,
    pub variant: Option<ObstacleVariant>,
    pub pos: Vec3,
    pub yaw: f32,
    /// Radians per tick (0 = no spin)
    pub rotation_speed: f32,
    pub scale: Vec3,
}

impl Entity {
    /// Spin by the entity's rotation speed
    pub fn spin(&mut self) {
        if self.rotation_speed != 0.0 {
            self.yaw = crate::wrap_yaw(self.yaw + self.rotation_speed);
        }
    }
}

/// Spawn parameters rolled at issue time, waiting for a model
#[derive(Debug, Clone)]
struct PendingSpawn {
    ticket: SpawnTicket,
    kind: EntityKind,
    variant: Option<ObstacleVariant>,
    pos: Vec3,
    yaw: f32,
    rotation_speed: f32,
    scale: Vec3,
}

/// Outcome of completing a spawn
#[derive(Debug, Clone, PartialEq)]
pub enum SpawnResolution {
    /// Entity is live; the host should add the handle to the scene
    Installed(EntityHandle),
    /// Model loaded but the spawn is void (game over, or ticket unknown);
    /// the host must not keep the handle in the scene
    Discarded(EntityHandle),
    /// Model failed to load; the slot is gone
    Failed(AssetLoadError),
}

#[derive(Debug, Clone, Default)]
pub struct EntityPool {
    entities: Vec<Entity>,
    pending: Vec<PendingSpawn>,
    next_ticket: u32,
}

impl EntityPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a pending slot for `kind` and roll its spawn parameters
    pub fn issue(&mut self, kind: EntityKind, tuning: &Tuning, rng: &mut impl Rng) -> SpawnRequest {
        let ticket = SpawnTicket(self.next_ticket);
        self.next_ticket = self.next_ticket.wrapping_add(1);

        let pending = match kind {
            EntityKind::Obstacle => {
                let variant = ObstacleVariant::ALL[rng.random_range(0..ObstacleVariant::ALL.len())];
                let (min_x, max_x) = tuning.obstacle_x_range;
                PendingSpawn {
                    ticket,
                    kind,
                    variant: Some(variant),
                    pos: Vec3::new(rng.random_range(min_x..max_x), 0.0, tuning.spawn_z),
                    yaw: variant.base_yaw(),
                    rotation_speed: tuning.obstacle_rotation_speed,
                    scale: Vec3::splat(variant.scale()),
                }
            }
            EntityKind::FuelTank => {
                let (min_x, max_x) = tuning.fuel_x_range;
                PendingSpawn {
                    ticket,
                    kind,
                    variant: None,
                    pos: Vec3::new(
                        rng.random_range(min_x..max_x),
                        tuning.fuel_spawn_y,
                        tuning.spawn_z,
                    ),
                    yaw: 0.0,
                    rotation_speed: tuning.fuel_rotation_speed,
                    scale: Vec3::new(0.8, 1.0, 1.0),
                }
            }
        };

        let model_path = match pending.variant {
            Some(variant) => variant.model_path(),
            None => FUEL_MODEL_PATH.to_string(),
        };
        log::debug!("Spawn {:?} issued as {:?} at x={:.2}", kind, ticket, pending.pos.x);
        self.pending.push(pending);

        SpawnRequest {
            ticket,
            kind,
            model_path,
        }
    }

    /// Complete a spawn. `accepting` is false once the game has ended, in
    /// which case a loaded model is discarded instead of installed.
    pub fn resolve(
        &mut self,
        ticket: SpawnTicket,
        result: Result<EntityHandle, AssetLoadError>,
        accepting: bool,
    ) -> SpawnResolution {
        let slot = self
            .pending
            .iter()
            .position(|p| p.ticket == ticket)
            .map(|i| self.pending.remove(i));

        let handle = match result {
            Ok(handle) => handle,
            Err(err) => {
                log::warn!("Spawn {:?} abandoned: {}", ticket, err);
                return SpawnResolution::Failed(err);
            }
        };

        match slot {
            Some(p) if accepting => {
                log::debug!("Spawn {:?} installed as {:?}", ticket, handle);
                self.entities.push(Entity {
                    handle,
                    kind: p.kind,
                    variant: p.variant,
                    pos: p.pos,
                    yaw: p.yaw,
                    rotation_speed: p.rotation_speed,
                    scale: p.scale,
                });
                SpawnResolution::Installed(handle)
            }
            Some(_) => {
                log::debug!("Spawn {:?} resolved after game over, discarding", ticket);
                SpawnResolution::Discarded(handle)
            }
            None => {
                log::warn!("Spawn {:?} is not pending, discarding {:?}", ticket, handle);
                SpawnResolution::Discarded(handle)
            }
        }
    }

    /// Move every live entity toward the camera and spin it
    pub fn advance_all(&mut self, step: f32) {
        for entity in &mut self.entities {
            entity.pos.z += step;
            entity.spin();
        }
    }

    /// Remove entities that passed `threshold_z`, returning their handles
    pub fn retire_expired(&mut self, threshold_z: f32) -> Vec<EntityHandle> {
        let mut retired = Vec::new();
        self.entities.retain(|entity| {
            if entity.pos.z > threshold_z {
                retired.push(entity.handle);
                false
            } else {
                true
            }
        });
        if !retired.is_empty() {
            log::debug!("Retired {} entities past z={}", retired.len(), threshold_z);
        }
        retired
    }

    /// Remove the given entities, returning how many were present
    pub fn remove(&mut self, handles: &[EntityHandle]) -> usize {
        let before = self.entities.len();
        self.entities.retain(|e| !handles.contains(&e.handle));
        before - self.entities.len()
    }

    /// Drop everything, live and pending. Returns live handles.
    /// The ticket counter keeps running, so tickets issued before the clear
    /// never resolve against slots issued after it.
    pub fn clear(&mut self) -> Vec<EntityHandle> {
        self.pending.clear();
        self.entities.drain(..).map(|e| e.handle).collect()
    }

    pub fn get(&self, handle: EntityHandle) -> Option<&Entity> {
        self.entities.iter().find(|e| e.handle == handle)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn obstacles(&self) -> impl Iterator<Item = &Entity> {
        self.of_kind(EntityKind::Obstacle)
    }

    pub fn fuel_tanks(&self) -> impl Iterator<Item = &Entity> {
        self.of_kind(EntityKind::FuelTank)
    }

    fn of_kind(&self, kind: EntityKind) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(move |e| e.kind == kind)
    }

    /// Test/scripting hook: place a live entity directly
    pub fn insert(&mut self, entity: Entity) {
        self.entities.push(entity);
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}
