use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use controlshift_core::geometry::Rect;
use controlshift_core::input::{ControlScheme, InputFrame};

use crate::config::{GameConfig, TimingConfig};
use crate::layouts::{Layout, RoomKind, layout_for};
use crate::physics::{self, PhysicsConfig, PlayerBody};
use crate::pickups::BonusFruit;
use crate::transform::{InputTransform, TransformContext, TransformError};

/// Outcome of one room tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomTick {
    /// Nothing moved: death freeze, or the room already completed.
    Frozen,
    /// The body fell out and was put back at the spawn point.
    Respawned,
    Active {
        remapped: bool,
        bonus_spawned: bool,
        bonus_collected: bool,
    },
    /// The body reached the exit door. Reported once per entry.
    Completed,
}

/// One room: a layout, a transform, and the body playing through it.
pub struct Room {
    kind: RoomKind,
    layout: Layout,
    /// Transform as built, restored on every entry.
    pristine: InputTransform,
    pristine_scheme: ControlScheme,
    transform: InputTransform,
    scheme: ControlScheme,
    platforms: Vec<Rect>,
    body: PlayerBody,
    physics: PhysicsConfig,
    timing: TimingConfig,
    scatter_interval: u32,
    scatter_timer: u32,
    death_cooldown: u32,
    hint_timer: u32,
    bonus: BonusFruit,
    completed: bool,
}

impl Room {
    /// Build a room. A room built with `hide_door` has no exit and never completes.
    pub fn new(kind: RoomKind, config: &GameConfig, hide_door: bool) -> Result<Self, TransformError> {
        let (transform, scheme) = kind.controls(&config.transforms)?;
        let mut layout = layout_for(kind);
        if hide_door {
            layout.door = None;
        }
        let body = PlayerBody::new(layout.spawn, &config.physics);
        Ok(Self {
            kind,
            platforms: layout.platforms.clone(),
            layout,
            pristine: transform.clone(),
            pristine_scheme: scheme.clone(),
            transform,
            scheme,
            body,
            physics: config.physics.clone(),
            timing: config.timing.clone(),
            scatter_interval: config.transforms.scatter_interval.max(1),
            scatter_timer: 0,
            death_cooldown: 0,
            hint_timer: 0,
            bonus: BonusFruit::default(),
            completed: false,
        })
    }

    /// Reset everything local to this visit and place the body at the spawn point.
    pub fn enter(&mut self, rng: &mut StdRng) {
        self.transform = self.pristine.clone();
        self.scheme = self.pristine_scheme.clone();
        self.transform.reset(&mut self.scheme, rng);
        self.body.respawn_at(self.layout.spawn);
        self.body.facing_right = true;
        self.scatter_timer = 0;
        self.regenerate_platforms(rng);
        self.death_cooldown = 0;
        self.hint_timer = 0;
        self.bonus = BonusFruit::default();
        self.completed = false;
        tracing::info!(room = self.kind.index(), name = self.kind.name(), "Entered room");
    }

    /// Take the exit away for good. The room can no longer complete.
    pub fn remove_door(&mut self) {
        self.layout.door = None;
    }

    fn regenerate_platforms(&mut self, rng: &mut StdRng) {
        self.platforms.clear();
        self.platforms.extend_from_slice(&self.layout.platforms);
        if let Some(scatter) = &self.layout.scatter {
            self.platforms.extend(scatter.generate(rng));
        }
    }

    pub fn update(&mut self, frame: &InputFrame, rng: &mut StdRng) -> RoomTick {
        if self.completed {
            return RoomTick::Frozen;
        }
        if self.death_cooldown > 0 {
            self.death_cooldown -= 1;
            return RoomTick::Frozen;
        }

        let mut ctx = TransformContext::new(rng, self.body.center_x(), self.physics.screen_width);
        let input = self.transform.apply(frame, &mut self.scheme, &mut ctx);
        let remapped = ctx.remapped;
        if remapped {
            tracing::debug!(room = self.kind.index(), scheme = ?self.scheme, "Controls remapped");
        }

        let contacts = physics::advance(
            &mut self.body,
            &input,
            &self.platforms,
            self.transform.gravity(),
            &self.physics,
        );
        if contacts.floor_bound {
            self.body.respawn_at(self.layout.spawn);
            self.death_cooldown = self.timing.death_cooldown_ticks;
            tracing::debug!(room = self.kind.index(), "Player fell out, respawning");
            return RoomTick::Respawned;
        }

        self.hint_timer = self.hint_timer.saturating_add(1);

        if self.layout.scatter.is_some() {
            self.scatter_timer += 1;
            if self.scatter_timer >= self.scatter_interval {
                self.scatter_timer = 0;
                self.regenerate_platforms(ctx.rng);
            }
        }

        let bonus_spawned = self.bonus.tick(
            self.timing.bonus_dwell_ticks,
            &self.platforms,
            self.body.pos.x,
            self.physics.screen_width,
        );
        if bonus_spawned {
            tracing::debug!(room = self.kind.index(), "Bonus fruit spawned");
        }
        let bonus_collected = self.bonus.try_collect(&self.body.rect());
        if bonus_collected {
            self.transform = InputTransform::Identity;
            self.scheme = ControlScheme::standard();
            tracing::debug!(room = self.kind.index(), "Bonus collected, normal controls restored");
        }

        if let Some(door) = self.layout.door
            && self.body.rect().intersects(&door)
        {
            self.completed = true;
            tracing::info!(room = self.kind.index(), "Room completed");
            return RoomTick::Completed;
        }

        RoomTick::Active {
            remapped,
            bonus_spawned,
            bonus_collected,
        }
    }

    pub fn kind(&self) -> RoomKind {
        self.kind
    }

    pub fn index(&self) -> usize {
        self.kind.index()
    }

    pub fn platforms(&self) -> &[Rect] {
        &self.platforms
    }

    pub fn door(&self) -> Option<Rect> {
        self.layout.door
    }

    pub fn body(&self) -> &PlayerBody {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut PlayerBody {
        &mut self.body
    }

    pub fn transform(&self) -> &InputTransform {
        &self.transform
    }

    pub fn scheme(&self) -> &ControlScheme {
        &self.scheme
    }

    pub fn bonus(&self) -> &BonusFruit {
        &self.bonus
    }

    pub fn hint_visible(&self) -> bool {
        self.hint_timer >= self.timing.hint_delay_ticks
    }

    pub fn is_frozen(&self) -> bool {
        self.death_cooldown > 0
    }

    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            index: self.kind.index(),
            body: self.body.clone(),
            scheme: self.scheme.clone(),
            platforms: self.platforms.clone(),
            death_cooldown: self.death_cooldown,
            hint_timer: self.hint_timer,
            bonus: self.bonus.clone(),
            completed: self.completed,
        }
    }
}

/// Serializable view of a room's mutable state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomSnapshot {
    pub index: usize,
    pub body: PlayerBody,
    pub scheme: ControlScheme,
    pub platforms: Vec<Rect>,
    pub death_cooldown: u32,
    pub hint_timer: u32,
    pub bonus: BonusFruit,
    pub completed: bool,
}
