//! Frame composition. Everything here is read-only over the controller and
//! goes out through the [`Renderer`] primitives.

use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use controlshift_core::geometry::Rect;
use controlshift_core::input::Action;
use controlshift_core::render::{Color, Renderer};

use crate::ending::{ENDING_OPTIONS, EndingPhase, EndingStateMachine};
use crate::layouts::{ROOM_COUNT, RoomKind};
use crate::physics::TILE_SIZE;
use crate::room::Room;
use crate::transform::{InputTransform, Selector};
use crate::{GameController, Mode};

const PINK: Color = Color::rgb(255, 182, 193);
const PASTEL_YELLOW: Color = Color::rgb(253, 253, 150);
const PLAYER: Color = Color::rgb(255, 105, 180);
const WALL: Color = Color::rgb(110, 110, 150);
const NARRATOR_BOX: Color = Color::rgb(30, 0, 30);
const ENDING_BG: Color = Color::rgb(20, 0, 20);
const LEVEL_SELECT_BG: Color = Color::rgb(30, 0, 50);
/// Background pattern cell size.
const GRID: usize = 16;

const ZONE_TINTS: [Color; 4] = [
    Color::rgb(30, 30, 50),
    Color::rgb(50, 30, 50),
    Color::rgb(30, 50, 30),
    Color::rgb(50, 50, 30),
];

const LEVEL_DESCRIPTIONS: [&str; ROOM_COUNT] = [
    "1 - Normal: Learn the basics",
    "2 - Reversed: Left is right, right is left",
    "3 - Delayed: Your inputs are delayed",
    "4 - Chaos: Controls change randomly",
    "5 - Momentum: Slippery ice physics",
    "6 - Gravity: Everything is upside down",
    "7 - Final: The ultimate challenge",
];

/// Compose one full frame for the controller's current mode.
pub fn draw_frame(game: &GameController, r: &mut dyn Renderer) {
    let physics = &game.config().physics;
    let screen = Vec2::new(physics.screen_width, physics.screen_height);
    match game.mode() {
        Mode::Title => draw_title(screen, r),
        Mode::LevelSelect => draw_level_select(screen, r),
        Mode::Playing => {
            let room = game.sequencer().current();
            draw_background(room.index(), game.background_seed(), screen, r);
            draw_room(room, screen, r);
            draw_hud(room, screen, r);
        },
        Mode::Transition { message, .. } => {
            r.clear(Color::BLACK);
            centered(r, screen, message, screen.y / 2.0 - 50.0, 48.0, PINK);
            centered(
                r,
                screen,
                "Press any key to continue",
                screen.y / 2.0 + 50.0,
                24.0,
                Color::WHITE,
            );
            if let Some(line) = game.narrator().current() {
                draw_narrator(line, game.background_seed(), screen, r);
            }
        },
        Mode::Ending(ending) => draw_ending(ending, screen, r),
        Mode::Credits => draw_credits(screen, r),
    }
}

/// Approximate text width; renderers have no metrics to offer.
fn text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * 0.5
}

fn centered(r: &mut dyn Renderer, screen: Vec2, text: &str, y: f32, size: f32, color: Color) {
    let x = screen.x / 2.0 - text_width(text, size) / 2.0;
    r.text(text, Vec2::new(x, y), size, color);
}

/// Room base colour plus a per-room pattern: checker, stripes or dots.
pub fn draw_background(room_index: usize, seed: u64, screen: Vec2, r: &mut dyn Renderer) {
    let base = RoomKind::from_index(room_index)
        .map(RoomKind::background)
        .unwrap_or(Color::BLACK);
    r.clear(base);

    let mut rng = StdRng::seed_from_u64(seed.wrapping_add(room_index as u64));
    let cell = GRID as f32;
    for (gy, y) in (0..screen.y as usize).step_by(GRID).enumerate() {
        for (gx, x) in (0..screen.x as usize).step_by(GRID).enumerate() {
            let (x, y) = (x as f32, y as f32);
            match room_index % 3 {
                0 => {
                    if (gx + gy) % 2 == 0 {
                        r.fill_rect(Rect::new(x, y, cell, cell), base.shade(30));
                    }
                },
                1 => {
                    if gy % 2 == 0 {
                        r.fill_rect(Rect::new(x, y, cell, cell), base.shade(-20));
                    }
                },
                _ => {
                    if rng.random::<f32>() < 0.2 {
                        r.fill_circle(Vec2::new(x + cell / 2.0, y + cell / 2.0), 2.0, Color::WHITE);
                    }
                },
            }
        }
    }
}

fn draw_room(room: &Room, screen: Vec2, r: &mut dyn Renderer) {
    if let InputTransform::Composite(composite) = room.transform()
        && composite.selector() == Selector::Zones
    {
        let count = composite.branches().len();
        let width = screen.x / count as f32;
        for i in 0..count {
            let x = i as f32 * width;
            r.fill_rect(
                Rect::new(x, 0.0, width, screen.y),
                ZONE_TINTS[i % ZONE_TINTS.len()],
            );
            r.text("?", Vec2::new(x + width / 2.0 - 4.0, 50.0), 18.0, Color::WHITE);
            if i > 0 {
                r.line(Vec2::new(x, 0.0), Vec2::new(x, screen.y), 2.0, Color::WHITE);
            }
        }
    }

    for platform in room.platforms() {
        // Floor slabs are drawn darker than ledges
        let color = if platform.h > TILE_SIZE { WALL.shade(-30) } else { WALL };
        r.fill_rect(*platform, color);
        r.line(
            Vec2::new(platform.left(), platform.top()),
            Vec2::new(platform.right(), platform.top()),
            2.0,
            color.shade(40),
        );
    }

    if let Some(door) = room.door() {
        r.fill_rect(door, PINK);
        r.fill_circle(
            Vec2::new(door.right() - 8.0, door.top() + door.h / 2.0),
            4.0,
            PASTEL_YELLOW,
        );
    }

    if let Some(fruit) = room.bonus().visible() {
        let center = fruit.center();
        for i in 0..8 {
            let angle = (room.bonus().aura_angle() + i as f32 * 45.0).to_radians();
            let p = center + Vec2::new(angle.cos(), angle.sin()) * 18.0;
            r.fill_circle(p, 2.0, PASTEL_YELLOW);
        }
        r.fill_circle(center, fruit.w / 2.0, Color::YELLOW);
        r.fill_circle(center, fruit.w / 4.0, Color::rgb(255, 255, 180));
        r.fill_circle(center, fruit.w / 8.0, Color::WHITE);
    }

    let body = room.body();
    let color = if room.is_frozen() { Color::RED } else { PLAYER };
    r.fill_rect(body.rect(), color);
    let eye_x = if body.facing_right {
        body.pos.x + body.width - 7.0
    } else {
        body.pos.x + 7.0
    };
    let eye_y = if room.transform().gravity().is_inverted() {
        body.pos.y + body.height - 10.0
    } else {
        body.pos.y + 10.0
    };
    r.fill_circle(Vec2::new(eye_x, eye_y), 3.0, Color::WHITE);
}

fn draw_hud(room: &Room, screen: Vec2, r: &mut dyn Renderer) {
    let kind = room.kind();
    r.text(kind.name(), Vec2::new(20.0, 20.0), 28.0, Color::LIGHT_GRAY);
    let counter = format!("Room {}/{}", kind.index() + 1, ROOM_COUNT);
    r.text(
        &counter,
        Vec2::new(screen.x - text_width(&counter, 20.0) - 20.0, screen.y - 30.0),
        20.0,
        Color::GRAY,
    );

    match room.transform() {
        InputTransform::Randomized(shuffle) => {
            let scheme = room.scheme();
            for (i, action) in Action::ALL.into_iter().enumerate() {
                let label = scheme.keys(action).first().map(|k| k.label()).unwrap_or("?");
                r.text(
                    &format!("??? : {label}"),
                    Vec2::new(20.0, 100.0 + i as f32 * 20.0),
                    20.0,
                    Color::WHITE,
                );
            }
            let bar = Rect::new(20.0, 170.0, 200.0, 10.0);
            r.text("????? in:", Vec2::new(bar.x, bar.y - 20.0), 18.0, Color::WHITE);
            r.fill_rect(bar, Color::GRAY);
            r.fill_rect(Rect::new(bar.x, bar.y, bar.w * shuffle.time_left(), bar.h), PINK);
        },
        InputTransform::Composite(composite) => match composite.selector() {
            Selector::Zones => {
                let text = "Zone: ???";
                r.text(
                    text,
                    Vec2::new(screen.x - text_width(text, 24.0) - 20.0, 20.0),
                    24.0,
                    PINK,
                );
            },
            Selector::Rotation { .. } => {
                let label = composite
                    .active_branch()
                    .map(|b| b.transform.label())
                    .unwrap_or("?");
                r.text(&format!("Effect: {label}"), Vec2::new(20.0, 50.0), 24.0, Color::WHITE);
            },
        },
        _ => {},
    }

    if room.hint_visible() {
        r.text(kind.hint(), Vec2::new(10.0, screen.y - 30.0), 24.0, Color::WHITE);
    }
}

fn draw_narrator(line: &str, seed: u64, screen: Vec2, r: &mut dyn Renderer) {
    let bubble = Rect::new(100.0, 100.0, screen.x - 200.0, 100.0);
    r.fill_rect(bubble, NARRATOR_BOX);
    let corners = [
        Vec2::new(bubble.left(), bubble.top()),
        Vec2::new(bubble.right(), bubble.top()),
        Vec2::new(bubble.right(), bubble.bottom()),
        Vec2::new(bubble.left(), bubble.bottom()),
    ];
    for i in 0..corners.len() {
        r.line(corners[i], corners[(i + 1) % corners.len()], 3.0, PINK);
    }
    // Glitch offset in -2..=2
    let jitter = (seed % 5) as f32 - 2.0;
    r.text(
        line,
        Vec2::new(bubble.x + 20.0 + jitter, bubble.y + 30.0 + jitter),
        32.0,
        Color::WHITE,
    );
}

fn draw_title(screen: Vec2, r: &mut dyn Renderer) {
    r.clear(Color::BLACK);
    centered(r, screen, "CONTROL SHIFT", screen.y / 3.0, 48.0, PINK);
    centered(
        r,
        screen,
        "Something strange is happening to your controls...",
        screen.y / 2.0,
        24.0,
        Color::WHITE,
    );
    centered(r, screen, "Press any key to begin", screen.y * 2.0 / 3.0, 24.0, Color::LIGHT_GRAY);
}

fn draw_level_select(screen: Vec2, r: &mut dyn Renderer) {
    r.clear(LEVEL_SELECT_BG);
    centered(r, screen, "SELECT LEVEL", 50.0, 48.0, PINK);
    for (i, line) in LEVEL_DESCRIPTIONS.iter().enumerate() {
        centered(r, screen, line, 150.0 + i as f32 * 40.0, 24.0, Color::WHITE);
    }
    centered(r, screen, "Press 1-7 to jump to a specific level", 450.0, 24.0, Color::LIGHT_GRAY);
    centered(r, screen, "Press SPACE to start from the beginning", 480.0, 24.0, Color::LIGHT_GRAY);
}

fn draw_ending(ending: &EndingStateMachine, screen: Vec2, r: &mut dyn Renderer) {
    match ending.phase() {
        EndingPhase::Dialogue { .. } => {
            r.clear(ENDING_BG);
            // The one behind it all, at his computer
            r.fill_rect(Rect::new(350.0, 200.0, 100.0, 80.0), Color::GRAY);
            r.fill_rect(Rect::new(360.0, 210.0, 80.0, 60.0), Color::BLACK);
            r.fill_rect(Rect::new(370.0, 280.0, 60.0, 40.0), Color::GRAY);
            r.fill_rect(Rect::new(400.0, 240.0, 20.0, 40.0), PINK);
            r.fill_circle(Vec2::new(410.0, 230.0), 10.0, PASTEL_YELLOW);
            if let Some(line) = ending.current_line() {
                centered(r, screen, line, 350.0, 40.0, Color::WHITE);
            }
        },
        EndingPhase::Fade { .. } => {
            r.clear(ENDING_BG);
            r.fill_rect(
                Rect::new(0.0, 0.0, screen.x, screen.y),
                Color::BLACK.with_alpha(ending.fade_alpha()),
            );
        },
        EndingPhase::Choice { selected } => {
            r.clear(Color::BLACK);
            for (i, (label, _)) in ENDING_OPTIONS.iter().enumerate() {
                let color = if i == selected { PINK } else { Color::GRAY };
                let text = format!("[{label}]");
                let x = screen.x / 2.0 - 200.0 + i as f32 * 400.0 - text_width(&text, 48.0) / 2.0;
                r.text(&text, Vec2::new(x, screen.y / 2.0 - 24.0), 48.0, color);
            }
        },
        EndingPhase::Terminal(_) => r.clear(Color::BLACK),
    }
}

fn draw_credits(screen: Vec2, r: &mut dyn Renderer) {
    r.clear(Color::BLACK);
    centered(r, screen, "GAME OVER (for him)", screen.y / 2.0 - 80.0, 48.0, Color::RED);
    centered(r, screen, "Congratulations!", screen.y / 2.0 - 30.0, 48.0, Color::GREEN);
    centered(
        r,
        screen,
        "Thanks for playing Control Shift!",
        screen.y / 2.0 + 20.0,
        48.0,
        Color::WHITE,
    );
}
