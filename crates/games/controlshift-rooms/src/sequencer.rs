use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::config::GameConfig;
use crate::layouts::{ROOM_COUNT, RoomKind};
use crate::room::Room;
use crate::transform::TransformError;

/// Shown between rooms, indexed by the room just completed.
pub const TRANSITION_MESSAGES: [&str; ROOM_COUNT] = [
    "Something changed...",
    "What's happening?",
    "The rules just shifted!",
    "The controls feel weird...",
    "This is getting strange!",
    "Everything's upside down!",
    "Pure chaos ahead...",
];

/// Result of moving to the next room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Advance {
    /// Index of the room now current.
    pub index: usize,
    /// The last room was completed and play wrapped to the first.
    pub looped: bool,
    pub message: &'static str,
}

/// Generator seed for one room visit.
pub fn room_seed(session_seed: u64, index: usize) -> u64 {
    session_seed ^ (index as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// Owns the seven rooms and which one is being played.
pub struct RoomSequencer {
    rooms: Vec<Room>,
    current: usize,
    session_seed: u64,
}

impl RoomSequencer {
    pub fn new(config: &GameConfig) -> Result<Self, TransformError> {
        let rooms = RoomKind::ALL
            .iter()
            .map(|&kind| Room::new(kind, config, false))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            rooms,
            current: 0,
            session_seed: config.session_seed(),
        })
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> &Room {
        &self.rooms[self.current]
    }

    pub fn current_mut(&mut self) -> &mut Room {
        &mut self.rooms[self.current]
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    /// Reseed `rng` for the current room and enter it.
    pub fn enter_current(&mut self, rng: &mut StdRng) {
        *rng = StdRng::seed_from_u64(room_seed(self.session_seed, self.current));
        self.rooms[self.current].enter(rng);
    }

    /// Move to the following room, wrapping after the last one.
    pub fn next_room(&mut self, rng: &mut StdRng) -> Advance {
        let completed = self.current;
        self.current = (self.current + 1) % self.rooms.len();
        let looped = self.current == 0;
        if looped {
            tracing::info!("All rooms completed, loop closed");
        }
        self.enter_current(rng);
        Advance {
            index: self.current,
            looped,
            message: TRANSITION_MESSAGES[completed % ROOM_COUNT],
        }
    }

    /// Enter room `index` directly. Out-of-range requests are ignored.
    pub fn jump_to(&mut self, index: usize, rng: &mut StdRng) -> bool {
        if index >= self.rooms.len() {
            tracing::debug!(index, "Ignoring jump to unknown room");
            return false;
        }
        self.current = index;
        self.enter_current(rng);
        true
    }

    /// Return to the first room with its exit removed.
    pub fn reset_without_door(&mut self, rng: &mut StdRng) {
        self.rooms[0].remove_door();
        self.current = 0;
        self.enter_current(rng);
        tracing::info!("First room reset without a door");
    }
}
