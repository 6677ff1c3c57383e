use serde::{Deserialize, Serialize};

use crate::input::{ControlScheme, InputEvent};
use crate::render::Renderer;

/// Contract between a frame-stepped game and the host loop that drives it.
///
/// The host calls `handle_input` for every pending event, then `update` once,
/// then `draw` once, at a fixed tick rate. Nothing blocks inside a tick.
pub trait ShiftGame {
    fn metadata(&self) -> GameMetadata;

    /// Simulation tick rate in Hz.
    fn tick_rate(&self) -> f32 {
        60.0
    }

    /// Feed one raw input event. May be called several times per tick.
    fn handle_input(&mut self, event: &InputEvent);

    /// Advance one tick. Returns `true` once the game wants the host to exit.
    fn update(&mut self) -> bool;

    fn draw(&self, renderer: &mut dyn Renderer);

    /// Take the events emitted since the last call.
    fn drain_events(&mut self) -> Vec<GameEvent>;

    /// Compact snapshot of the simulation, for determinism checks.
    fn serialize_state(&self) -> Vec<u8>;
}

/// Descriptive metadata for a game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameMetadata {
    pub name: String,
    pub description: String,
    pub room_count: usize,
}

/// How the epilogue choice resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndingOutcome {
    /// Leave the game entirely.
    Terminate,
    /// Restart at the first room, which no longer has an exit.
    ResetWithoutDoor,
}

/// Notable things that happened during a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    ModeChanged { mode: String },
    RoomEntered { index: usize },
    RoomCompleted { index: usize },
    /// The last room was completed and play wrapped back to the first one.
    LoopCompleted,
    PlayerRespawned { room: usize },
    BonusSpawned { room: usize },
    BonusCollected { room: usize },
    ControlsRemapped { room: usize, scheme: ControlScheme },
    EndingResolved { outcome: EndingOutcome },
    Terminate,
}
