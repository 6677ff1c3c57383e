use serde::{Deserialize, Serialize};

use controlshift_core::geometry::Rect;

use crate::physics::TILE_SIZE;

/// Side length of the bonus fruit.
pub const BONUS_SIZE: f32 = TILE_SIZE / 2.0;
/// Degrees the fruit's aura turns per tick.
const AURA_STEP: u16 = 4;

/// Escape-hatch pickup that appears after a long stay in one room.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BonusFruit {
    timer: u32,
    rect: Option<Rect>,
    collected: bool,
    aura_angle: u16,
}

impl BonusFruit {
    /// Count one tick of active play. Returns true on the tick the fruit appears.
    pub fn tick(
        &mut self,
        dwell_ticks: u32,
        platforms: &[Rect],
        player_x: f32,
        screen_width: f32,
    ) -> bool {
        if self.collected {
            return false;
        }
        if self.rect.is_some() {
            self.aura_angle = (self.aura_angle + AURA_STEP) % 360;
            return false;
        }
        self.timer = self.timer.saturating_add(1);
        if self.timer < dwell_ticks {
            return false;
        }
        self.rect = bonus_spot(platforms, player_x, screen_width);
        self.rect.is_some()
    }

    /// Collect the fruit if `body` touches it.
    pub fn try_collect(&mut self, body: &Rect) -> bool {
        match self.rect {
            Some(fruit) if !self.collected && body.intersects(&fruit) => {
                self.collected = true;
                true
            },
            _ => false,
        }
    }

    /// The fruit's rect while it is waiting to be picked up.
    pub fn visible(&self) -> Option<Rect> {
        if self.collected { None } else { self.rect }
    }

    pub fn collected(&self) -> bool {
        self.collected
    }

    pub fn aura_angle(&self) -> f32 {
        f32::from(self.aura_angle)
    }
}

/// Where the fruit goes: on the lowest floor slab, at the end away from the player.
///
/// A floor slab is a platform taller than one tile. Rooms without one use
/// their lowest platform instead.
pub fn bonus_spot(platforms: &[Rect], player_x: f32, screen_width: f32) -> Option<Rect> {
    let floor = lowest(platforms.iter().filter(|p| p.h > TILE_SIZE))
        .or_else(|| lowest(platforms.iter()))?;

    let fx = if player_x < screen_width / 2.0 {
        floor.right() - TILE_SIZE
    } else {
        floor.left()
    };
    let tile = Rect::new(fx, floor.top() - TILE_SIZE, TILE_SIZE, TILE_SIZE);
    Some(tile.inset((TILE_SIZE - BONUS_SIZE) / 2.0))
}

/// Greatest `y` wins; the first of equals is kept.
fn lowest<'a>(candidates: impl Iterator<Item = &'a Rect>) -> Option<&'a Rect> {
    candidates.fold(None, |best, p| match best {
        Some(b) if b.y >= p.y => Some(b),
        _ => Some(p),
    })
}
