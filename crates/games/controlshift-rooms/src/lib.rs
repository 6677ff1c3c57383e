pub mod config;
pub mod draw;
pub mod ending;
pub mod error;
pub mod layouts;
pub mod narrator;
pub mod physics;
pub mod pickups;
pub mod room;
pub mod sequencer;
pub mod transform;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use controlshift_core::audio::AudioService;
use controlshift_core::game_trait::{EndingOutcome, GameEvent, GameMetadata, ShiftGame};
use controlshift_core::input::{InputEvent, InputFrame, InputState, Key};
use controlshift_core::render::Renderer;

use config::GameConfig;
use ending::{EndingPhase, EndingStateMachine};
use error::GameError;
use layouts::ROOM_COUNT;
use narrator::Narrator;
use room::{RoomSnapshot, RoomTick};
use sequencer::RoomSequencer;

/// Top-level screen the controller is showing.
#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    Title,
    LevelSelect,
    Playing,
    Transition {
        remaining: u32,
        message: &'static str,
    },
    Ending(EndingStateMachine),
    Credits,
}

impl Mode {
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Title => "title",
            Mode::LevelSelect => "level_select",
            Mode::Playing => "playing",
            Mode::Transition { .. } => "transition",
            Mode::Ending(_) => "ending",
            Mode::Credits => "credits",
        }
    }
}

/// Snapshot for determinism checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ControllerSnapshot {
    tick: u64,
    mode: String,
    transition_remaining: Option<u32>,
    ending: Option<EndingPhase>,
    background_seed: u64,
    narrator: Narrator,
    room: RoomSnapshot,
}

/// Drives the whole game: menus, the room sequence, transitions and the ending.
pub struct GameController {
    config: GameConfig,
    sequencer: RoomSequencer,
    mode: Mode,
    input: InputState,
    rng: StdRng,
    narrator: Narrator,
    background_seed: u64,
    audio: Box<dyn AudioService>,
    events: Vec<GameEvent>,
    tick: u64,
    done: bool,
}

impl GameController {
    /// Validate `config`, build every room and show the title screen.
    pub fn new(config: GameConfig, mut audio: Box<dyn AudioService>) -> Result<Self, GameError> {
        config.validate()?;
        let mut sequencer = RoomSequencer::new(&config)?;
        let mut rng = StdRng::seed_from_u64(config.session_seed());
        sequencer.enter_current(&mut rng);
        audio.play(sequencer.current().kind().track());
        tracing::info!(seed = config.session_seed(), "Game controller ready");
        Ok(Self {
            config,
            sequencer,
            mode: Mode::Title,
            input: InputState::new(),
            rng,
            narrator: Narrator::default(),
            background_seed: 0,
            audio,
            events: Vec::new(),
            tick: 0,
            done: false,
        })
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn sequencer(&self) -> &RoomSequencer {
        &self.sequencer
    }

    /// Direct access to the rooms, for scripted setups and tests.
    pub fn sequencer_mut(&mut self) -> &mut RoomSequencer {
        &mut self.sequencer
    }

    pub fn narrator(&self) -> &Narrator {
        &self.narrator
    }

    pub fn background_seed(&self) -> u64 {
        self.background_seed
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    fn set_mode(&mut self, mode: Mode) {
        tracing::debug!(from = self.mode.name(), to = mode.name(), "Mode change");
        self.events.push(GameEvent::ModeChanged {
            mode: mode.name().to_string(),
        });
        self.mode = mode;
    }

    /// Enter room `index` and start playing it.
    fn start_at(&mut self, index: usize) {
        if self.sequencer.jump_to(index, &mut self.rng) {
            self.events.push(GameEvent::RoomEntered { index });
            self.audio.play(self.sequencer.current().kind().track());
            self.set_mode(Mode::Playing);
        }
    }

    fn update_level_select(&mut self, frame: &InputFrame) {
        if frame.just_pressed(Key::Space) {
            self.start_at(0);
            return;
        }
        let digit = frame
            .pressed
            .iter()
            .filter_map(|k| k.digit_index())
            .min();
        if let Some(index) = digit {
            self.start_at(index);
        }
    }

    fn update_playing(&mut self, frame: &InputFrame) {
        if frame.just_pressed(Key::Escape) {
            self.set_mode(Mode::LevelSelect);
            return;
        }
        let room = self.sequencer.current_index();
        match self.sequencer.current_mut().update(frame, &mut self.rng) {
            RoomTick::Frozen => {},
            RoomTick::Respawned => self.events.push(GameEvent::PlayerRespawned { room }),
            RoomTick::Active {
                remapped,
                bonus_spawned,
                bonus_collected,
            } => {
                if remapped {
                    self.events.push(GameEvent::ControlsRemapped {
                        room,
                        scheme: self.sequencer.current().scheme().clone(),
                    });
                }
                if bonus_spawned {
                    self.events.push(GameEvent::BonusSpawned { room });
                }
                if bonus_collected {
                    self.events.push(GameEvent::BonusCollected { room });
                }
            },
            RoomTick::Completed => {
                self.events.push(GameEvent::RoomCompleted { index: room });
                self.advance();
            },
        }
    }

    fn advance(&mut self) {
        let adv = self.sequencer.next_room(&mut self.rng);
        self.events.push(GameEvent::RoomEntered { index: adv.index });
        self.background_seed = self.rng.random_range(0..10_000);
        self.audio.play(self.sequencer.current().kind().track());

        if adv.looped {
            self.events.push(GameEvent::LoopCompleted);
            self.narrator.silence();
            self.set_mode(Mode::Ending(EndingStateMachine::new(&self.config.timing)));
        } else {
            self.narrator
                .speak(&mut self.rng, self.config.timing.narrator_ticks);
            self.set_mode(Mode::Transition {
                remaining: self.config.timing.transition_ticks,
                message: adv.message,
            });
        }
    }

    fn update_transition(&mut self, frame: &InputFrame) {
        self.narrator.tick();
        let Mode::Transition { remaining, .. } = &mut self.mode else {
            return;
        };
        *remaining = remaining.saturating_sub(1);
        if *remaining == 0 || frame.any_pressed() {
            self.narrator.silence();
            self.set_mode(Mode::Playing);
        }
    }

    fn update_ending(&mut self, frame: &InputFrame) {
        let Mode::Ending(ending) = &mut self.mode else {
            return;
        };
        let Some(outcome) = ending.update(frame) else {
            return;
        };
        self.events.push(GameEvent::EndingResolved { outcome });
        match outcome {
            EndingOutcome::Terminate => {
                self.events.push(GameEvent::Terminate);
                self.audio.stop();
                self.set_mode(Mode::Credits);
                self.done = true;
            },
            EndingOutcome::ResetWithoutDoor => {
                self.sequencer.reset_without_door(&mut self.rng);
                self.events.push(GameEvent::RoomEntered { index: 0 });
                self.audio.play(self.sequencer.current().kind().track());
                self.set_mode(Mode::Playing);
            },
        }
    }
}

impl ShiftGame for GameController {
    fn metadata(&self) -> GameMetadata {
        GameMetadata {
            name: "Control Shift".to_string(),
            description: "Seven rooms, each one rewiring your controls a little differently"
                .to_string(),
            room_count: ROOM_COUNT,
        }
    }

    fn tick_rate(&self) -> f32 {
        self.config.timing.fps as f32
    }

    fn handle_input(&mut self, event: &InputEvent) {
        self.input.apply(event);
    }

    fn update(&mut self) -> bool {
        if self.done {
            return true;
        }
        if self.input.quit_requested() {
            tracing::info!("Quit requested");
            self.done = true;
            return true;
        }

        let frame = self.input.frame();
        self.tick += 1;
        match self.mode {
            Mode::Title => {
                if frame.any_pressed() {
                    self.set_mode(Mode::LevelSelect);
                }
            },
            Mode::LevelSelect => self.update_level_select(&frame),
            Mode::Playing => self.update_playing(&frame),
            Mode::Transition { .. } => self.update_transition(&frame),
            Mode::Ending(_) => self.update_ending(&frame),
            Mode::Credits => self.done = true,
        }
        self.input.end_frame();
        self.done
    }

    fn draw(&self, renderer: &mut dyn Renderer) {
        draw::draw_frame(self, renderer);
    }

    fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    fn serialize_state(&self) -> Vec<u8> {
        let snapshot = ControllerSnapshot {
            tick: self.tick,
            mode: self.mode.name().to_string(),
            transition_remaining: match self.mode {
                Mode::Transition { remaining, .. } => Some(remaining),
                _ => None,
            },
            ending: match &self.mode {
                Mode::Ending(e) => Some(e.phase()),
                _ => None,
            },
            background_seed: self.background_seed,
            narrator: self.narrator.clone(),
            room: self.sequencer.current().snapshot(),
        };
        match rmp_serde::to_vec(&snapshot) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to encode controller snapshot");
                Vec::new()
            },
        }
    }
}
