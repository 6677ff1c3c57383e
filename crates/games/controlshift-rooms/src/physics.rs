use glam::Vec2;
use serde::{Deserialize, Serialize};

use controlshift_core::geometry::Rect;
use controlshift_core::input::EffectiveInput;

/// Downward acceleration per tick (screen y grows downward).
pub const GRAVITY: f32 = 0.8;
/// Horizontal speed per tick while a direction is held.
pub const PLAYER_SPEED: f32 = 5.0;
/// Vertical velocity applied on jump (negative is up).
pub const JUMP_STRENGTH: f32 = -12.0;
/// How far past a platform edge the previous-frame edge may be and still count
/// as hitting that edge.
pub const COLLISION_TOLERANCE: f32 = 10.0;
pub const PLAYER_WIDTH: f32 = 24.0;
pub const PLAYER_HEIGHT: f32 = 32.0;
pub const SCREEN_WIDTH: f32 = 800.0;
pub const SCREEN_HEIGHT: f32 = 600.0;
/// Grid unit the room layouts are drawn on.
pub const TILE_SIZE: f32 = 32.0;

/// Configurable physics parameters, loadable from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub gravity: f32,
    pub player_speed: f32,
    pub jump_strength: f32,
    pub collision_tolerance: f32,
    pub player_width: f32,
    pub player_height: f32,
    pub screen_width: f32,
    pub screen_height: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            player_speed: PLAYER_SPEED,
            jump_strength: JUMP_STRENGTH,
            collision_tolerance: COLLISION_TOLERANCE,
            player_width: PLAYER_WIDTH,
            player_height: PLAYER_HEIGHT,
            screen_width: SCREEN_WIDTH,
            screen_height: SCREEN_HEIGHT,
        }
    }
}

/// Direction and strength of gravity for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gravity {
    /// +1 pulls toward the bottom of the screen, -1 toward the top.
    pub sign: f32,
    /// Multiplier on the configured acceleration.
    pub scale: f32,
}

impl Gravity {
    pub const NORMAL: Gravity = Gravity {
        sign: 1.0,
        scale: 1.0,
    };
    pub const INVERTED: Gravity = Gravity {
        sign: -1.0,
        scale: 1.0,
    };

    pub fn is_inverted(&self) -> bool {
        self.sign < 0.0
    }
}

impl Default for Gravity {
    fn default() -> Self {
        Self::NORMAL
    }
}

/// Coarse animation state derived after each step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnimState {
    Idle,
    Run,
    Jump,
    Fall,
}

/// The player's physical body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerBody {
    /// Top-left corner.
    pub pos: Vec2,
    pub vel: Vec2,
    pub width: f32,
    pub height: f32,
    pub grounded: bool,
    pub facing_right: bool,
    pub anim: AnimState,
}

impl PlayerBody {
    pub fn new(spawn: Vec2, config: &PhysicsConfig) -> Self {
        Self {
            pos: spawn,
            vel: Vec2::ZERO,
            width: config.player_width,
            height: config.player_height,
            grounded: false,
            facing_right: true,
            anim: AnimState::Idle,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.width, self.height)
    }

    pub fn center_x(&self) -> f32 {
        self.pos.x + self.width / 2.0
    }

    pub fn respawn_at(&mut self, spawn: Vec2) {
        self.pos = spawn;
        self.vel = Vec2::ZERO;
        self.grounded = false;
        self.anim = AnimState::Idle;
    }
}

/// What stopped the body this step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepContacts {
    /// Landed on (or kept resting on) a platform.
    pub platform_floor: bool,
    /// Fell past every platform and was caught by the screen edge gravity pulls toward.
    pub floor_bound: bool,
}

/// Advance the body one tick.
///
/// Order: horizontal velocity, gravity (airborne only), jump (grounded only),
/// integrate, platform collisions, screen clamp.
pub fn advance(
    body: &mut PlayerBody,
    input: &EffectiveInput,
    platforms: &[Rect],
    gravity: Gravity,
    config: &PhysicsConfig,
) -> StepContacts {
    body.vel.x = match input.vel_x {
        Some(vx) if vx.is_finite() => vx,
        Some(_) => 0.0,
        None => {
            let mut vx = 0.0;
            if input.left {
                vx = -config.player_speed;
            }
            // Right is resolved after left, so it wins when both are held
            if input.right {
                vx = config.player_speed;
            }
            vx
        },
    };
    if body.vel.x > 0.0 {
        body.facing_right = true;
    } else if body.vel.x < 0.0 {
        body.facing_right = false;
    }

    if !body.grounded {
        body.vel.y += config.gravity * gravity.scale * gravity.sign;
    }

    if input.jump && body.grounded {
        body.vel.y = config.jump_strength * gravity.sign;
        body.grounded = false;
    }

    body.pos += body.vel;

    let platform_floor = resolve_collisions(body, platforms, gravity, config.collision_tolerance);
    let floor_bound = clamp_to_screen(body, gravity, config);

    body.anim = if !body.grounded {
        if body.vel.y * gravity.sign < 0.0 {
            AnimState::Jump
        } else {
            AnimState::Fall
        }
    } else if body.vel.x != 0.0 {
        AnimState::Run
    } else {
        AnimState::Idle
    };

    StepContacts {
        platform_floor,
        floor_bound,
    }
}

/// Resolve overlaps against each platform in order. Returns whether any
/// floor-type contact happened.
///
/// Each platform is tested independently; the first directional test that
/// matches for a platform decides how that platform pushes the body. With
/// several overlapping platforms the outcome depends on their order.
pub(crate) fn resolve_collisions(
    body: &mut PlayerBody,
    platforms: &[Rect],
    gravity: Gravity,
    tolerance: f32,
) -> bool {
    body.grounded = false;
    let down = !gravity.is_inverted();

    for p in platforms {
        let r = body.rect();
        if !(r.right() > p.left() && r.left() < p.right()) {
            continue;
        }
        let vx = body.vel.x;
        let vy = body.vel.y;

        // Floor-side edge: the platform top under normal gravity, its
        // underside when inverted. Touching counts so a resting body stays put.
        let (floor_hit, ceiling_hit) = if down {
            (
                vy >= 0.0
                    && r.bottom() >= p.top()
                    && r.top() < p.bottom()
                    && r.bottom() - vy <= p.top() + tolerance,
                vy < 0.0
                    && r.top() < p.bottom()
                    && r.bottom() > p.top()
                    && r.top() - vy >= p.bottom() - tolerance,
            )
        } else {
            (
                vy <= 0.0
                    && r.top() <= p.bottom()
                    && r.bottom() > p.top()
                    && r.top() - vy >= p.bottom() - tolerance,
                vy > 0.0
                    && r.bottom() > p.top()
                    && r.top() < p.bottom()
                    && r.bottom() - vy <= p.top() + tolerance,
            )
        };

        if floor_hit {
            body.pos.y = if down {
                p.top() - body.height
            } else {
                p.bottom()
            };
            body.vel.y = 0.0;
            body.grounded = true;
            continue;
        }
        if ceiling_hit {
            body.pos.y = if down {
                p.bottom()
            } else {
                p.top() - body.height
            };
            body.vel.y = 0.0;
            continue;
        }

        if !r.intersects(p) {
            continue;
        }
        if vx > 0.0 && r.right() - vx <= p.left() + tolerance {
            body.pos.x = p.left() - body.width;
            body.vel.x = 0.0;
        } else if vx < 0.0 && r.left() - vx >= p.right() - tolerance {
            body.pos.x = p.right();
            body.vel.x = 0.0;
        }
    }

    body.grounded
}

/// Keep the body on screen. Returns whether the floor-side edge caught it.
fn clamp_to_screen(body: &mut PlayerBody, gravity: Gravity, config: &PhysicsConfig) -> bool {
    let max_x = config.screen_width - body.width;
    let max_y = config.screen_height - body.height;
    body.pos.x = body.pos.x.clamp(0.0, max_x);

    let mut caught = false;
    // Inclusive so a body resting on the edge is caught every tick
    if body.pos.y <= 0.0 {
        body.pos.y = 0.0;
        if body.vel.y < 0.0 {
            body.vel.y = 0.0;
        }
        if gravity.is_inverted() {
            body.grounded = true;
            caught = true;
        }
    } else if body.pos.y >= max_y {
        body.pos.y = max_y;
        if body.vel.y > 0.0 {
            body.vel.y = 0.0;
        }
        if !gravity.is_inverted() {
            body.grounded = true;
            caught = true;
        }
    }
    caught
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> PhysicsConfig {
        PhysicsConfig::default()
    }

    fn idle() -> EffectiveInput {
        EffectiveInput::IDLE
    }

    fn right() -> EffectiveInput {
        EffectiveInput {
            right: true,
            ..EffectiveInput::IDLE
        }
    }

    fn jump() -> EffectiveInput {
        EffectiveInput {
            jump: true,
            ..EffectiveInput::IDLE
        }
    }

    /// Settle a body on `platforms` from `spawn` with no input.
    fn settle(spawn: Vec2, platforms: &[Rect], gravity: Gravity) -> PlayerBody {
        let mut body = PlayerBody::new(spawn, &cfg());
        for _ in 0..300 {
            advance(&mut body, &idle(), platforms, gravity, &cfg());
        }
        body
    }

    #[test]
    fn falls_and_lands_on_platform() {
        let platforms = [Rect::new(0.0, 400.0, 800.0, 32.0)];
        let mut body = PlayerBody::new(Vec2::new(100.0, 300.0), &cfg());

        let mut last_y = body.pos.y;
        let mut landed_at = None;
        for tick in 0..200 {
            advance(&mut body, &idle(), &platforms, Gravity::NORMAL, &cfg());
            assert!(
                body.pos.y >= last_y,
                "y must not decrease while falling (tick {tick}: {} < {last_y})",
                body.pos.y
            );
            last_y = body.pos.y;
            if body.grounded {
                landed_at = Some(tick);
                break;
            }
        }
        assert!(landed_at.is_some(), "body should land within 200 ticks");
        assert_eq!(body.pos.y, 400.0 - PLAYER_HEIGHT);
        assert_eq!(body.vel.y, 0.0);

        // Stays grounded with no further input
        for _ in 0..120 {
            advance(&mut body, &idle(), &platforms, Gravity::NORMAL, &cfg());
            assert!(body.grounded, "resting body must stay grounded");
            assert_eq!(body.pos.y, 400.0 - PLAYER_HEIGHT);
        }
    }

    #[test]
    fn landing_within_tolerance_snaps_to_top() {
        let platforms = [Rect::new(0.0, 400.0, 800.0, 32.0)];
        let mut body = PlayerBody::new(Vec2::new(100.0, 400.0 - PLAYER_HEIGHT - 2.0), &cfg());
        body.vel.y = 6.0;

        let contacts = advance(&mut body, &idle(), &platforms, Gravity::NORMAL, &cfg());
        assert!(contacts.platform_floor);
        assert!(body.grounded);
        assert_eq!(body.pos.y, 400.0 - PLAYER_HEIGHT);
        assert_eq!(body.vel.y, 0.0);
    }

    #[test]
    fn ceiling_stops_upward_motion() {
        let platforms = [
            Rect::new(0.0, 568.0, 800.0, 32.0),
            Rect::new(80.0, 480.0, 100.0, 32.0),
        ];
        let mut body = settle(Vec2::new(100.0, 536.0), &platforms, Gravity::NORMAL);
        assert!(body.grounded);

        advance(&mut body, &jump(), &platforms, Gravity::NORMAL, &cfg());
        let mut min_y = body.pos.y;
        for _ in 0..40 {
            advance(&mut body, &idle(), &platforms, Gravity::NORMAL, &cfg());
            min_y = min_y.min(body.pos.y);
        }
        assert!(
            min_y >= 512.0,
            "head should stop at the platform underside (y=512), reached {min_y}"
        );
        assert!(body.grounded, "body should fall back onto the floor");
    }

    #[test]
    fn wall_blocks_horizontal_motion() {
        let platforms = [
            Rect::new(0.0, 568.0, 800.0, 32.0),
            Rect::new(300.0, 440.0, 64.0, 128.0),
        ];
        let mut body = settle(Vec2::new(200.0, 536.0), &platforms, Gravity::NORMAL);
        for _ in 0..60 {
            advance(&mut body, &right(), &platforms, Gravity::NORMAL, &cfg());
        }
        assert_eq!(body.pos.x, 300.0 - PLAYER_WIDTH);
        assert!(body.grounded);
    }

    #[test]
    fn walking_off_an_edge_clears_grounded() {
        let platforms = [Rect::new(0.0, 300.0, 120.0, 32.0)];
        let mut body = settle(Vec2::new(60.0, 268.0), &platforms, Gravity::NORMAL);
        assert!(body.grounded);

        let mut left_ground = false;
        for _ in 0..30 {
            advance(&mut body, &right(), &platforms, Gravity::NORMAL, &cfg());
            if !body.grounded {
                left_ground = true;
                break;
            }
        }
        assert!(left_ground, "grounded must not carry over once off the platform");
        assert!(body.pos.x >= 120.0);
    }

    #[test]
    fn screen_bottom_catches_and_grounds() {
        let mut body = PlayerBody::new(Vec2::new(400.0, 500.0), &cfg());
        let mut caught = false;
        for _ in 0..60 {
            let contacts = advance(&mut body, &idle(), &[], Gravity::NORMAL, &cfg());
            caught |= contacts.floor_bound;
        }
        assert!(caught);
        assert!(body.grounded);
        assert_eq!(body.pos.y, SCREEN_HEIGHT - PLAYER_HEIGHT);
        assert_eq!(body.vel.y, 0.0);
    }

    #[test]
    fn horizontal_clamp_keeps_body_on_screen() {
        let mut body = PlayerBody::new(Vec2::new(790.0, 100.0), &cfg());
        advance(&mut body, &right(), &[], Gravity::NORMAL, &cfg());
        assert_eq!(body.pos.x, SCREEN_WIDTH - PLAYER_WIDTH);

        let mut body = PlayerBody::new(Vec2::new(2.0, 100.0), &cfg());
        let left = EffectiveInput {
            left: true,
            ..EffectiveInput::IDLE
        };
        advance(&mut body, &left, &[], Gravity::NORMAL, &cfg());
        assert_eq!(body.pos.x, 0.0);
        assert!(!body.facing_right);
    }

    #[test]
    fn both_directions_held_moves_right() {
        let mut body = PlayerBody::new(Vec2::new(100.0, 100.0), &cfg());
        let both = EffectiveInput {
            left: true,
            right: true,
            ..EffectiveInput::IDLE
        };
        advance(&mut body, &both, &[], Gravity::NORMAL, &cfg());
        assert_eq!(body.vel.x, PLAYER_SPEED);
    }

    #[test]
    fn velocity_override_bypasses_booleans() {
        let mut body = PlayerBody::new(Vec2::new(100.0, 100.0), &cfg());
        let input = EffectiveInput {
            left: true,
            vel_x: Some(7.5),
            ..EffectiveInput::IDLE
        };
        advance(&mut body, &input, &[], Gravity::NORMAL, &cfg());
        assert_eq!(body.vel.x, 7.5);
        assert_eq!(body.pos.x, 107.5);

        let bad = EffectiveInput {
            vel_x: Some(f32::NAN),
            ..EffectiveInput::IDLE
        };
        advance(&mut body, &bad, &[], Gravity::NORMAL, &cfg());
        assert_eq!(body.vel.x, 0.0, "non-finite override must be ignored");
    }

    #[test]
    fn jump_only_fires_when_grounded() {
        let mut body = PlayerBody::new(Vec2::new(100.0, 100.0), &cfg());
        advance(&mut body, &jump(), &[], Gravity::NORMAL, &cfg());
        assert!(body.vel.y > 0.0, "airborne jump must be ignored");

        let platforms = [Rect::new(0.0, 400.0, 800.0, 32.0)];
        let mut body = settle(Vec2::new(100.0, 368.0), &platforms, Gravity::NORMAL);
        advance(&mut body, &jump(), &platforms, Gravity::NORMAL, &cfg());
        assert_eq!(body.vel.y, JUMP_STRENGTH);
        assert!(!body.grounded);
        assert_eq!(body.anim, AnimState::Jump);
    }

    #[test]
    fn heavy_gravity_scales_acceleration() {
        let heavy = Gravity {
            sign: 1.0,
            scale: 2.0,
        };
        let mut body = PlayerBody::new(Vec2::new(100.0, 100.0), &cfg());
        advance(&mut body, &idle(), &[], heavy, &cfg());
        assert!((body.vel.y - 2.0 * GRAVITY).abs() < 1e-6);
    }

    #[test]
    fn inverted_gravity_lands_on_underside() {
        let platforms = [Rect::new(0.0, 0.0, 800.0, 32.0)];
        let mut body = PlayerBody::new(Vec2::new(100.0, 200.0), &cfg());
        for _ in 0..200 {
            advance(&mut body, &idle(), &platforms, Gravity::INVERTED, &cfg());
        }
        assert!(body.grounded, "ceiling should act as floor");
        assert_eq!(body.pos.y, 32.0);

        advance(&mut body, &jump(), &platforms, Gravity::INVERTED, &cfg());
        assert_eq!(body.vel.y, -JUMP_STRENGTH, "inverted jump pushes downward");
        assert!(body.pos.y > 32.0);
    }

    #[test]
    fn inverted_gravity_ceiling_hit_is_platform_top() {
        let platforms = [
            Rect::new(0.0, 0.0, 800.0, 32.0),
            Rect::new(50.0, 90.0, 200.0, 32.0),
        ];
        let mut body = settle(Vec2::new(100.0, 32.0), &platforms, Gravity::INVERTED);
        advance(&mut body, &jump(), &platforms, Gravity::INVERTED, &cfg());
        let mut max_bottom: f32 = 0.0;
        for _ in 0..40 {
            advance(&mut body, &idle(), &platforms, Gravity::INVERTED, &cfg());
            max_bottom = max_bottom.max(body.pos.y + PLAYER_HEIGHT);
        }
        assert!(
            max_bottom <= 90.0,
            "feet should stop at the lower platform's top, reached {max_bottom}"
        );
    }

    #[test]
    fn inverted_gravity_screen_top_grounds_but_bottom_does_not() {
        let mut body = PlayerBody::new(Vec2::new(100.0, 10.0), &cfg());
        let mut caught = false;
        for _ in 0..30 {
            caught |= advance(&mut body, &idle(), &[], Gravity::INVERTED, &cfg()).floor_bound;
        }
        assert!(caught);
        assert!(body.grounded);
        assert_eq!(body.pos.y, 0.0);

        let mut body = PlayerBody::new(Vec2::new(100.0, SCREEN_HEIGHT), &cfg());
        body.vel.y = 5.0;
        let contacts = advance(&mut body, &idle(), &[], Gravity::INVERTED, &cfg());
        assert!(!contacts.floor_bound);
        assert!(!body.grounded);
        assert_eq!(body.pos.y, SCREEN_HEIGHT - PLAYER_HEIGHT);
    }

    #[test]
    fn stacked_platforms_settle_on_topmost() {
        // Two stacked platforms both overlap the landing body. Whichever is
        // listed first snaps it; the upper one still has the final say.
        let upper_first = [
            Rect::new(0.0, 400.0, 800.0, 32.0),
            Rect::new(0.0, 405.0, 800.0, 32.0),
        ];
        let mut body = PlayerBody::new(Vec2::new(100.0, 400.0 - PLAYER_HEIGHT - 1.0), &cfg());
        body.vel.y = 8.0;
        advance(&mut body, &idle(), &upper_first, Gravity::NORMAL, &cfg());
        assert_eq!(body.pos.y, 400.0 - PLAYER_HEIGHT);

        let lower_first = [upper_first[1], upper_first[0]];
        let mut body = PlayerBody::new(Vec2::new(100.0, 400.0 - PLAYER_HEIGHT - 1.0), &cfg());
        body.vel.y = 8.0;
        advance(&mut body, &idle(), &lower_first, Gravity::NORMAL, &cfg());
        assert_eq!(body.pos.y, 400.0 - PLAYER_HEIGHT);
        assert!(body.grounded);
    }

    #[test]
    fn respawn_resets_motion() {
        let mut body = PlayerBody::new(Vec2::new(10.0, 10.0), &cfg());
        body.vel = Vec2::new(3.0, 9.0);
        body.grounded = true;
        body.respawn_at(Vec2::new(100.0, 300.0));
        assert_eq!(body.pos, Vec2::new(100.0, 300.0));
        assert_eq!(body.vel, Vec2::ZERO);
        assert!(!body.grounded);
    }

    // ================================================================
    // Property-based tests (proptest)
    // ================================================================

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn layout() -> Vec<Rect> {
            vec![
                Rect::new(0.0, 568.0, 300.0, 32.0),
                Rect::new(400.0, 568.0, 400.0, 32.0),
                Rect::new(100.0, 450.0, 150.0, 32.0),
                Rect::new(300.0, 380.0, 200.0, 32.0),
                Rect::new(600.0, 504.0, 200.0, 64.0),
            ]
        }

        fn input_from(code: u8) -> EffectiveInput {
            EffectiveInput {
                left: code & 1 != 0,
                right: code & 2 != 0,
                jump: code & 4 != 0,
                vel_x: None,
            }
        }

        /// Whether the body is touching a floor-side surface right now.
        fn has_floor_contact(body: &PlayerBody, platforms: &[Rect], gravity: Gravity) -> bool {
            let r = body.rect();
            let on_platform = platforms.iter().any(|p| {
                let h = r.right() > p.left() && r.left() < p.right();
                if gravity.is_inverted() {
                    h && (r.top() - p.bottom()).abs() < 1e-3
                } else {
                    h && (r.bottom() - p.top()).abs() < 1e-3
                }
            });
            let on_bound = if gravity.is_inverted() {
                r.top() <= 0.0
            } else {
                r.bottom() >= SCREEN_HEIGHT - 1e-3
            };
            on_platform || on_bound
        }

        proptest! {
            #[test]
            fn body_stays_on_screen(
                codes in proptest::collection::vec(0u8..8, 1..300),
                inverted in any::<bool>(),
            ) {
                let gravity = if inverted { Gravity::INVERTED } else { Gravity::NORMAL };
                let platforms = layout();
                let mut body = PlayerBody::new(Vec2::new(100.0, 300.0), &cfg());
                for code in codes {
                    advance(&mut body, &input_from(code), &platforms, gravity, &cfg());
                    prop_assert!(body.pos.x >= 0.0 && body.pos.x <= SCREEN_WIDTH - PLAYER_WIDTH);
                    prop_assert!(body.pos.y >= 0.0 && body.pos.y <= SCREEN_HEIGHT - PLAYER_HEIGHT);
                    prop_assert!(body.pos.is_finite() && body.vel.is_finite());
                }
            }

            #[test]
            fn grounded_implies_floor_contact(
                codes in proptest::collection::vec(0u8..8, 1..300),
                inverted in any::<bool>(),
            ) {
                let gravity = if inverted { Gravity::INVERTED } else { Gravity::NORMAL };
                let platforms = layout();
                let mut body = PlayerBody::new(Vec2::new(100.0, 300.0), &cfg());
                for code in codes {
                    advance(&mut body, &input_from(code), &platforms, gravity, &cfg());
                    if body.grounded {
                        prop_assert!(
                            has_floor_contact(&body, &platforms, gravity),
                            "grounded without contact at {:?}",
                            body.pos
                        );
                    }
                }
            }
        }
    }
}
