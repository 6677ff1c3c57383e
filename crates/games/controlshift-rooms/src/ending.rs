//! Epilogue played after the last room: a few lines of dialogue, a fade to
//! black, then a two-way choice that decides how the session ends.

use serde::{Deserialize, Serialize};

use controlshift_core::game_trait::EndingOutcome;
use controlshift_core::input::{InputFrame, Key};

use crate::config::TimingConfig;

pub const ENDING_LINES: [&str; 3] = ["oh you are here", "well...", "I should've expected that"];

/// The two choices, left to right.
pub const ENDING_OPTIONS: [(&str, EndingOutcome); 2] = [
    ("get revenge", EndingOutcome::Terminate),
    ("forgive him", EndingOutcome::ResetWithoutDoor),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndingPhase {
    Dialogue { line: usize, timer: u32 },
    Fade { timer: u32 },
    Choice { selected: usize },
    Terminal(EndingOutcome),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndingStateMachine {
    phase: EndingPhase,
    line_ticks: u32,
    fade_ticks: u32,
}

impl EndingStateMachine {
    pub fn new(timing: &TimingConfig) -> Self {
        Self {
            phase: EndingPhase::Dialogue { line: 0, timer: 0 },
            line_ticks: timing.dialogue_line_ticks.max(1),
            fade_ticks: timing.fade_ticks.max(1),
        }
    }

    pub fn phase(&self) -> EndingPhase {
        self.phase
    }

    /// Advance one tick. Returns the outcome on the tick the choice is confirmed.
    pub fn update(&mut self, frame: &InputFrame) -> Option<EndingOutcome> {
        match &mut self.phase {
            EndingPhase::Dialogue { line, timer } => {
                *timer += 1;
                if *timer >= self.line_ticks {
                    *line += 1;
                    *timer = 0;
                    if *line >= ENDING_LINES.len() {
                        self.phase = EndingPhase::Fade { timer: 0 };
                    }
                }
                None
            },
            EndingPhase::Fade { timer } => {
                *timer += 1;
                if *timer >= self.fade_ticks {
                    self.phase = EndingPhase::Choice { selected: 0 };
                }
                None
            },
            EndingPhase::Choice { selected } => {
                if frame.any_down(&[Key::Left, Key::A]) {
                    *selected = 0;
                } else if frame.any_down(&[Key::Right, Key::D]) {
                    *selected = 1;
                } else if [Key::Up, Key::Down, Key::W, Key::S]
                    .iter()
                    .any(|&k| frame.just_pressed(k))
                {
                    *selected = 1 - *selected;
                }

                if frame.just_pressed(Key::Space) || frame.just_pressed(Key::Return) {
                    let (label, outcome) = ENDING_OPTIONS[*selected];
                    tracing::info!(choice = label, ?outcome, "Ending resolved");
                    self.phase = EndingPhase::Terminal(outcome);
                    return Some(outcome);
                }
                None
            },
            EndingPhase::Terminal(_) => None,
        }
    }

    /// Line currently on screen, if still in dialogue.
    pub fn current_line(&self) -> Option<&'static str> {
        match self.phase {
            EndingPhase::Dialogue { line, .. } => ENDING_LINES.get(line).copied(),
            _ => None,
        }
    }

    /// Opacity of the black overlay during the fade.
    pub fn fade_alpha(&self) -> u8 {
        match self.phase {
            EndingPhase::Dialogue { .. } => 0,
            EndingPhase::Fade { timer } => {
                let done = u64::from(timer.min(self.fade_ticks));
                (255 * done / u64::from(self.fade_ticks)) as u8
            },
            EndingPhase::Choice { .. } | EndingPhase::Terminal(_) => 255,
        }
    }

    pub fn selected(&self) -> Option<usize> {
        match self.phase {
            EndingPhase::Choice { selected } => Some(selected),
            _ => None,
        }
    }
}
