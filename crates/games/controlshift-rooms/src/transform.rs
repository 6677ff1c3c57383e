//! Per-room input transforms.
//!
//! A transform sits between the raw [`InputFrame`] and the physics step. It
//! reads the room's [`ControlScheme`] and produces the [`EffectiveInput`] the
//! body actually obeys, keeping whatever state it needs (delay queue,
//! momentum accumulator, remap timer) between ticks.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use controlshift_core::input::{ControlScheme, EffectiveInput, InputFrame, Key};

use crate::config::{MAX_DELAY_FRAMES, MomentumConfig};
use crate::physics::Gravity;

/// Keys the randomized transform draws its bindings from.
pub const RANDOM_KEY_POOL: [Key; 10] = [
    Key::Left,
    Key::Right,
    Key::Up,
    Key::A,
    Key::S,
    Key::D,
    Key::W,
    Key::Space,
    Key::Q,
    Key::E,
];

/// Construction-time precondition failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformError {
    /// A random remap needs three distinct keys.
    KeyPoolTooSmall { distinct: usize },
    ZeroInterval,
    NoBranches,
}

impl std::fmt::Display for TransformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::KeyPoolTooSmall { distinct } => write!(
                f,
                "randomized key pool needs at least 3 distinct keys, got {distinct}"
            ),
            Self::ZeroInterval => write!(f, "transform interval must be at least one tick"),
            Self::NoBranches => write!(f, "composite transform needs at least one branch"),
        }
    }
}

impl std::error::Error for TransformError {}

/// Per-tick inputs a transform may consult besides the raw frame.
pub struct TransformContext<'a> {
    /// The session's shared generator.
    pub rng: &'a mut StdRng,
    pub body_center_x: f32,
    pub screen_width: f32,
    /// Set by a transform that rewrote its scheme this tick.
    pub remapped: bool,
}

impl<'a> TransformContext<'a> {
    pub fn new(rng: &'a mut StdRng, body_center_x: f32, screen_width: f32) -> Self {
        Self {
            rng,
            body_center_x,
            screen_width,
            remapped: false,
        }
    }
}

/// How a room rewrites raw input.
#[derive(Debug, Clone)]
pub enum InputTransform {
    Identity,
    /// Left and right exchanged; jump untouched.
    Swapped,
    Delayed(DelayLine),
    Randomized(KeyShuffle),
    Momentum(MomentumDrive),
    Gravity(GravityShift),
    Composite(Box<Composite>),
}

impl InputTransform {
    pub fn delayed(frames: usize) -> Self {
        Self::Delayed(DelayLine::new(frames))
    }

    pub fn randomized(pool: &[Key], interval: u32) -> Result<Self, TransformError> {
        Ok(Self::Randomized(KeyShuffle::new(pool, interval)?))
    }

    pub fn momentum(config: MomentumConfig) -> Self {
        Self::Momentum(MomentumDrive::new(config))
    }

    pub fn inverted_gravity() -> Self {
        Self::Gravity(GravityShift {
            inverted: true,
            scale: 1.0,
        })
    }

    pub fn heavy_gravity(scale: f32) -> Self {
        Self::Gravity(GravityShift {
            inverted: false,
            scale,
        })
    }

    /// Equal-width screen columns, one branch per column, left to right.
    pub fn zones(branches: Vec<Branch>) -> Result<Self, TransformError> {
        Composite::new(Selector::Zones, branches).map(|c| Self::Composite(Box::new(c)))
    }

    /// Cycle through the branches, `period` ticks each.
    pub fn rotation(branches: Vec<Branch>, period: u32) -> Result<Self, TransformError> {
        if period == 0 {
            return Err(TransformError::ZeroInterval);
        }
        Composite::new(Selector::Rotation { period }, branches)
            .map(|c| Self::Composite(Box::new(c)))
    }

    /// Resolve this tick's effective input. May rewrite `scheme`.
    pub fn apply(
        &mut self,
        frame: &InputFrame,
        scheme: &mut ControlScheme,
        ctx: &mut TransformContext<'_>,
    ) -> EffectiveInput {
        match self {
            Self::Identity | Self::Gravity(_) => scheme.resolve(frame),
            Self::Swapped => scheme.with_sides_exchanged().resolve(frame),
            Self::Delayed(line) => line.push(scheme.resolve(frame)),
            Self::Randomized(shuffle) => {
                if shuffle.tick() {
                    shuffle.remap(scheme, ctx.rng);
                    ctx.remapped = true;
                }
                scheme.resolve(frame)
            },
            Self::Momentum(drive) => drive.drive(scheme.resolve(frame)),
            Self::Composite(composite) => composite.apply(frame, scheme, ctx),
        }
    }

    /// Clear all accumulated state. Randomized transforms remap immediately.
    pub fn reset(&mut self, scheme: &mut ControlScheme, rng: &mut StdRng) {
        match self {
            Self::Identity | Self::Swapped | Self::Gravity(_) => {},
            Self::Delayed(line) => line.clear(),
            Self::Randomized(shuffle) => {
                shuffle.timer = 0;
                shuffle.remap(scheme, rng);
            },
            Self::Momentum(drive) => drive.momentum = 0.0,
            Self::Composite(composite) => composite.reset(scheme, rng),
        }
    }

    /// Gravity the body should feel under this transform right now.
    pub fn gravity(&self) -> Gravity {
        match self {
            Self::Gravity(shift) => shift.gravity(),
            Self::Composite(composite) => composite
                .active_branch()
                .map(|b| b.transform.gravity())
                .unwrap_or_default(),
            _ => Gravity::NORMAL,
        }
    }

    /// Short name for the HUD.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Identity => "normal",
            Self::Swapped => "reversed",
            Self::Delayed(_) => "delayed",
            Self::Randomized(_) => "random",
            Self::Momentum(_) => "momentum",
            Self::Gravity(shift) if shift.inverted => "inverted gravity",
            Self::Gravity(_) => "heavy gravity",
            Self::Composite(composite) => match composite.selector {
                Selector::Zones => "zones",
                Selector::Rotation { .. } => "rotation",
            },
        }
    }
}

/// Fixed-length delay line with silent cold start.
#[derive(Debug, Clone)]
pub struct DelayLine {
    frames: usize,
    queue: VecDeque<EffectiveInput>,
}

impl DelayLine {
    pub fn new(frames: usize) -> Self {
        Self {
            frames,
            queue: VecDeque::with_capacity(frames.min(MAX_DELAY_FRAMES) + 1),
        }
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Push this tick's input; returns the input from `frames` ticks ago, or
    /// idle while the line is still filling.
    pub fn push(&mut self, input: EffectiveInput) -> EffectiveInput {
        self.queue.push_back(input);
        if self.queue.len() > self.frames {
            self.queue.pop_front().unwrap_or_default()
        } else {
            EffectiveInput::IDLE
        }
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

/// Periodically rebinds left/right/jump to random keys.
#[derive(Debug, Clone)]
pub struct KeyShuffle {
    pool: Vec<Key>,
    interval: u32,
    timer: u32,
}

impl KeyShuffle {
    pub fn new(pool: &[Key], interval: u32) -> Result<Self, TransformError> {
        if interval == 0 {
            return Err(TransformError::ZeroInterval);
        }
        let mut distinct: Vec<Key> = Vec::with_capacity(pool.len());
        for &key in pool {
            if !distinct.contains(&key) {
                distinct.push(key);
            }
        }
        if distinct.len() < 3 {
            return Err(TransformError::KeyPoolTooSmall {
                distinct: distinct.len(),
            });
        }
        Ok(Self {
            pool: distinct,
            interval,
            timer: 0,
        })
    }

    /// Share of the interval left before the next remap, in `0.0..=1.0`.
    pub fn time_left(&self) -> f32 {
        1.0 - self.timer as f32 / self.interval as f32
    }

    /// Advance the timer; true on a remap tick.
    fn tick(&mut self) -> bool {
        self.timer += 1;
        if self.timer >= self.interval {
            self.timer = 0;
            true
        } else {
            false
        }
    }

    /// Sample three keys without replacement and bind them in order.
    pub fn remap(&self, scheme: &mut ControlScheme, rng: &mut StdRng) {
        let mut keys = self.pool.clone();
        keys.shuffle(rng);
        if let [left, right, jump, ..] = keys[..] {
            *scheme = ControlScheme::custom(left, right, jump);
        }
    }
}

/// Turns directional input into a slowly changing velocity.
#[derive(Debug, Clone)]
pub struct MomentumDrive {
    config: MomentumConfig,
    momentum: f32,
}

impl MomentumDrive {
    pub fn new(config: MomentumConfig) -> Self {
        Self {
            config,
            momentum: 0.0,
        }
    }

    pub fn momentum(&self) -> f32 {
        self.momentum
    }

    fn drive(&mut self, input: EffectiveInput) -> EffectiveInput {
        let c = self.config;
        if input.left != input.right {
            let dir = if input.right { 1.0 } else { -1.0 };
            self.momentum += c.increment * dir;
        } else if self.momentum > 0.0 {
            self.momentum = (self.momentum - c.friction).max(0.0);
        } else if self.momentum < 0.0 {
            self.momentum = (self.momentum + c.friction).min(0.0);
        }
        self.momentum = self.momentum.clamp(-c.max, c.max);
        EffectiveInput {
            vel_x: Some(self.momentum),
            ..input
        }
    }
}

/// Changes gravity direction or strength; input passes through.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GravityShift {
    pub inverted: bool,
    pub scale: f32,
}

impl GravityShift {
    pub fn gravity(&self) -> Gravity {
        Gravity {
            sign: if self.inverted { -1.0 } else { 1.0 },
            scale: self.scale,
        }
    }
}

/// One sub-transform of a composite, optionally with its own key bindings.
#[derive(Debug, Clone)]
pub struct Branch {
    pub transform: InputTransform,
    /// Overrides the room's scheme while this branch is active.
    pub scheme: Option<ControlScheme>,
}

impl Branch {
    pub fn new(transform: InputTransform) -> Self {
        Self {
            transform,
            scheme: None,
        }
    }

    pub fn with_scheme(transform: InputTransform, scheme: ControlScheme) -> Self {
        Self {
            transform,
            scheme: Some(scheme),
        }
    }
}

/// How a composite picks its active branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    /// By which screen column holds the body's horizontal center.
    Zones,
    /// By elapsed time, `period` ticks per branch.
    Rotation { period: u32 },
}

/// Dispatches each tick to exactly one branch.
#[derive(Debug, Clone)]
pub struct Composite {
    selector: Selector,
    branches: Vec<Branch>,
    active: usize,
    elapsed: u32,
}

impl Composite {
    fn new(selector: Selector, branches: Vec<Branch>) -> Result<Self, TransformError> {
        if branches.is_empty() {
            return Err(TransformError::NoBranches);
        }
        Ok(Self {
            selector,
            branches,
            active: 0,
            elapsed: 0,
        })
    }

    pub fn selector(&self) -> Selector {
        self.selector
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    pub fn active(&self) -> usize {
        self.active
    }

    pub fn active_branch(&self) -> Option<&Branch> {
        self.branches.get(self.active)
    }

    /// Column index for a horizontal position; off-screen falls back to 0.
    pub fn zone_at(&self, x: f32, screen_width: f32) -> usize {
        let count = self.branches.len();
        let width = screen_width / count as f32;
        if !(x >= 0.0 && x < screen_width) || width <= 0.0 {
            return 0;
        }
        ((x / width) as usize).min(count - 1)
    }

    fn select(&mut self, ctx: &TransformContext<'_>) -> usize {
        match self.selector {
            Selector::Zones => self.zone_at(ctx.body_center_x, ctx.screen_width),
            Selector::Rotation { period } => {
                self.elapsed += 1;
                if self.elapsed >= period {
                    self.elapsed = 0;
                    (self.active + 1) % self.branches.len()
                } else {
                    self.active
                }
            },
        }
    }

    fn apply(
        &mut self,
        frame: &InputFrame,
        room_scheme: &mut ControlScheme,
        ctx: &mut TransformContext<'_>,
    ) -> EffectiveInput {
        let next = self.select(ctx);
        if next != self.active {
            tracing::debug!(from = self.active, to = next, "Composite branch switched");
            self.active = next;
        }
        let Some(branch) = self.branches.get_mut(self.active) else {
            return EffectiveInput::IDLE;
        };
        let scheme = branch.scheme.as_mut().unwrap_or(room_scheme);
        branch.transform.apply(frame, scheme, ctx)
    }

    fn reset(&mut self, room_scheme: &mut ControlScheme, rng: &mut StdRng) {
        self.active = 0;
        self.elapsed = 0;
        for branch in &mut self.branches {
            let scheme = match branch.scheme.as_mut() {
                Some(own) => own,
                None => &mut *room_scheme,
            };
            branch.transform.reset(scheme, rng);
        }
    }
}
