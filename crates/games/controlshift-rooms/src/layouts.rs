use glam::Vec2;
use rand::Rng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use controlshift_core::geometry::Rect;
use controlshift_core::input::{ControlScheme, Key};
use controlshift_core::render::Color;

use crate::config::{FinalRoomPolicy, MomentumConfig, TransformConfig};
use crate::transform::{Branch, InputTransform, RANDOM_KEY_POOL, TransformError};

/// Number of rooms in one loop.
pub const ROOM_COUNT: usize = 7;

/// The seven rooms, in play order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomKind {
    FirstStep,
    MirrorMaze,
    TimeLag,
    ChaosChamber,
    SlipperySlide,
    UpsideDown,
    ChaosTheory,
}

impl RoomKind {
    pub const ALL: [RoomKind; ROOM_COUNT] = [
        RoomKind::FirstStep,
        RoomKind::MirrorMaze,
        RoomKind::TimeLag,
        RoomKind::ChaosChamber,
        RoomKind::SlipperySlide,
        RoomKind::UpsideDown,
        RoomKind::ChaosTheory,
    ];

    pub fn from_index(index: usize) -> Option<RoomKind> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::FirstStep => "The First Step",
            Self::MirrorMaze => "Mirror Maze",
            Self::TimeLag => "Time Lag Zone",
            Self::ChaosChamber => "Chaos Chamber",
            Self::SlipperySlide => "Slippery Slide",
            Self::UpsideDown => "Upside Down",
            Self::ChaosTheory => "Chaos Theory",
        }
    }

    pub fn hint(self) -> &'static str {
        match self {
            Self::FirstStep => "Just try different buttons...",
            Self::MirrorMaze => "Left is right, right is left!",
            Self::TimeLag => "Your actions seem to be on a delay... think ahead!",
            Self::ChaosChamber => "The controls keep changing! Keep pressing different keys!",
            Self::SlipperySlide => {
                "Everything's so slippery... try pressing the opposite direction to slow down!"
            },
            Self::UpsideDown => "Everything's flipped! Try different buttons to jump... or fall?",
            Self::ChaosTheory => "Each section works differently! Watch how the environment changes!",
        }
    }

    pub fn background(self) -> Color {
        match self {
            Self::FirstStep => Color::rgb(20, 20, 60),
            Self::MirrorMaze => Color::rgb(40, 20, 40),
            Self::TimeLag => Color::rgb(20, 40, 20),
            Self::ChaosChamber => Color::rgb(40, 40, 20),
            Self::SlipperySlide => Color::rgb(20, 40, 60),
            Self::UpsideDown => Color::rgb(60, 20, 40),
            Self::ChaosTheory => Color::rgb(40, 60, 20),
        }
    }

    /// Music track played while in this room.
    pub fn track(self) -> usize {
        self.index()
    }

    /// Build this room's transform and starting control scheme.
    pub fn controls(
        self,
        config: &TransformConfig,
    ) -> Result<(InputTransform, ControlScheme), TransformError> {
        let standard = ControlScheme::standard();
        let transform = match self {
            Self::FirstStep => InputTransform::Identity,
            Self::MirrorMaze => InputTransform::Swapped,
            Self::TimeLag => InputTransform::delayed(config.delay_frames),
            Self::ChaosChamber => {
                InputTransform::randomized(&RANDOM_KEY_POOL, config.randomize_interval)?
            },
            Self::SlipperySlide => InputTransform::momentum(config.momentum),
            Self::UpsideDown => {
                let scheme = ControlScheme {
                    jump: vec![Key::Down, Key::S],
                    ..standard
                };
                return Ok((InputTransform::inverted_gravity(), scheme));
            },
            Self::ChaosTheory => final_room_transform(config)?,
        };
        Ok((transform, standard))
    }
}

fn final_room_transform(config: &TransformConfig) -> Result<InputTransform, TransformError> {
    let zone_momentum = MomentumConfig {
        max: config.zone_momentum_max,
        ..config.momentum
    };
    match config.final_room_policy {
        FinalRoomPolicy::Zones => InputTransform::zones(vec![
            Branch::new(InputTransform::Identity),
            Branch::new(InputTransform::Swapped),
            Branch::with_scheme(
                InputTransform::Identity,
                ControlScheme::custom(Key::F, Key::H, Key::T),
            ),
            Branch::new(InputTransform::momentum(zone_momentum)),
        ]),
        FinalRoomPolicy::Rotation => InputTransform::rotation(
            vec![
                Branch::new(InputTransform::heavy_gravity(config.heavy_gravity_scale)),
                Branch::new(InputTransform::momentum(zone_momentum)),
                Branch::new(InputTransform::Swapped),
                Branch::with_scheme(
                    InputTransform::randomized(&RANDOM_KEY_POOL, config.randomize_interval)?,
                    ControlScheme::standard(),
                ),
                Branch::new(InputTransform::delayed(config.composite_delay_frames)),
            ],
            config.rotation_ticks,
        ),
    }
}

/// Extra platforms re-rolled from the session generator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scatter {
    pub count: usize,
    pub x: (f32, f32),
    pub y: (f32, f32),
    pub width: (f32, f32),
    pub height: f32,
}

impl Scatter {
    pub fn generate(&self, rng: &mut StdRng) -> Vec<Rect> {
        (0..self.count)
            .map(|_| {
                let x = sample(rng, self.x);
                let y = sample(rng, self.y);
                let w = sample(rng, self.width);
                Rect::new(x, y, w, self.height)
            })
            .collect()
    }
}

fn sample(rng: &mut StdRng, (lo, hi): (f32, f32)) -> f32 {
    if hi > lo { rng.random_range(lo..hi) } else { lo }
}

/// Static geometry of a room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub platforms: Vec<Rect>,
    pub door: Option<Rect>,
    pub spawn: Vec2,
    pub scatter: Option<Scatter>,
}

const fn r(x: f32, y: f32, w: f32, h: f32) -> Rect {
    Rect::new(x, y, w, h)
}

/// Build the hand-authored layout for a room.
pub fn layout_for(kind: RoomKind) -> Layout {
    match kind {
        RoomKind::FirstStep => Layout {
            platforms: vec![
                r(0.0, 568.0, 300.0, 32.0),
                r(400.0, 568.0, 400.0, 32.0),
                r(100.0, 450.0, 150.0, 32.0),
                r(300.0, 380.0, 200.0, 32.0),
                r(600.0, 504.0, 200.0, 64.0),
            ],
            door: Some(r(736.0, 440.0, 32.0, 64.0)),
            spawn: Vec2::new(100.0, 300.0),
            scatter: None,
        },
        RoomKind::MirrorMaze => Layout {
            platforms: vec![
                r(0.0, 568.0, 200.0, 32.0),
                r(300.0, 568.0, 200.0, 32.0),
                r(600.0, 568.0, 200.0, 32.0),
                r(100.0, 400.0, 100.0, 32.0),
                r(30.0, 490.0, 50.0, 32.0),
                r(250.0, 350.0, 100.0, 32.0),
                r(450.0, 300.0, 100.0, 32.0),
                r(300.0, 370.0, 50.0, 32.0),
                r(600.0, 250.0, 150.0, 32.0),
                r(550.0, 290.0, 30.0, 32.0),
            ],
            door: Some(r(736.0, 186.0, 32.0, 64.0)),
            spawn: Vec2::new(150.0, 300.0),
            scatter: None,
        },
        RoomKind::TimeLag => Layout {
            platforms: vec![
                r(0.0, 568.0, 300.0, 32.0),
                r(400.0, 568.0, 400.0, 32.0),
                r(50.0, 450.0, 150.0, 32.0),
                r(300.0, 420.0, 100.0, 32.0),
                r(450.0, 370.0, 100.0, 32.0),
                r(300.0, 320.0, 100.0, 32.0),
                r(200.0, 500.0, 50.0, 32.0),
                r(400.0, 450.0, 30.0, 32.0),
                r(225.0, 350.0, 40.0, 32.0),
                r(500.0, 250.0, 200.0, 32.0),
            ],
            door: Some(r(736.0, 186.0, 32.0, 64.0)),
            spawn: Vec2::new(100.0, 400.0),
            scatter: None,
        },
        RoomKind::ChaosChamber => Layout {
            platforms: vec![
                // Staircase
                r(50.0, 500.0, 120.0, 32.0),
                r(160.0, 440.0, 120.0, 32.0),
                r(270.0, 380.0, 120.0, 32.0),
                r(380.0, 320.0, 120.0, 32.0),
                r(490.0, 260.0, 120.0, 32.0),
                r(600.0, 200.0, 120.0, 32.0),
                // Recovery ledges
                r(110.0, 550.0, 60.0, 32.0),
                r(220.0, 490.0, 60.0, 32.0),
                r(330.0, 430.0, 60.0, 32.0),
                r(440.0, 370.0, 60.0, 32.0),
                r(550.0, 310.0, 60.0, 32.0),
            ],
            door: Some(r(736.0, 126.0, 32.0, 64.0)),
            spawn: Vec2::new(70.0, 468.0),
            scatter: Some(Scatter {
                count: 3,
                x: (50.0, 650.0),
                y: (200.0, 500.0),
                width: (60.0, 100.0),
                height: 20.0,
            }),
        },
        RoomKind::SlipperySlide => Layout {
            platforms: vec![
                r(0.0, 550.0, 700.0, 32.0),
                r(100.0, 470.0, 700.0, 32.0),
                r(0.0, 390.0, 700.0, 32.0),
                r(100.0, 310.0, 700.0, 32.0),
                r(0.0, 230.0, 700.0, 32.0),
            ],
            door: Some(r(736.0, 166.0, 32.0, 64.0)),
            spawn: Vec2::new(30.0, 518.0),
            scatter: None,
        },
        RoomKind::UpsideDown => Layout {
            platforms: vec![
                r(0.0, 0.0, 800.0, 32.0),
                r(50.0, 32.0, 200.0, 32.0),
                r(200.0, 90.0, 120.0, 32.0),
                r(320.0, 180.0, 120.0, 32.0),
                r(440.0, 270.0, 120.0, 32.0),
                r(560.0, 360.0, 120.0, 32.0),
                r(260.0, 135.0, 60.0, 32.0),
                r(380.0, 225.0, 60.0, 32.0),
                r(500.0, 315.0, 60.0, 32.0),
                r(600.0, 400.0, 150.0, 32.0),
                r(650.0, 480.0, 100.0, 32.0),
                r(700.0, 560.0, 80.0, 32.0),
                r(100.0, 536.0, 100.0, 32.0),
                r(300.0, 536.0, 100.0, 32.0),
                r(500.0, 536.0, 100.0, 32.0),
            ],
            door: Some(r(736.0, 536.0, 32.0, 64.0)),
            spawn: Vec2::new(100.0, 64.0),
            scatter: None,
        },
        RoomKind::ChaosTheory => Layout {
            platforms: (0..8)
                .map(|i| {
                    let i = i as f32;
                    r(40.0 + i * 85.0, 520.0 - i * 40.0, 120.0, 32.0)
                })
                .collect(),
            door: Some(r(735.0, 176.0, 32.0, 64.0)),
            spawn: Vec2::new(60.0, 488.0),
            scatter: None,
        },
    }
}
