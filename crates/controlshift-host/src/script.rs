//! Replayable input scripts.
//!
//! ```toml
//! [[step]]
//! ticks = 2
//! press = ["Return"]
//!
//! [[step]]
//! ticks = 90
//! hold = ["Right"]
//! ```

use std::collections::BTreeSet;

use serde::Deserialize;

use controlshift_core::input::{InputEvent, Key};

use crate::error::HostError;

/// Where the host gets its input events each tick.
pub trait InputSource {
    /// Events to feed before the next update.
    fn poll(&mut self) -> Vec<InputEvent>;
}

/// No input at all. The session runs until the tick limit or ctrl-c.
#[derive(Debug, Default)]
pub struct NoInput;

impl InputSource for NoInput {
    fn poll(&mut self) -> Vec<InputEvent> {
        Vec::new()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InputScript {
    #[serde(rename = "step", default)]
    pub steps: Vec<ScriptStep>,
}

/// Keys held for a run of ticks, plus keys pressed once at its start.
#[derive(Debug, Clone, Deserialize)]
pub struct ScriptStep {
    #[serde(default = "one_tick")]
    pub ticks: u32,
    #[serde(default)]
    pub hold: Vec<String>,
    #[serde(default)]
    pub press: Vec<String>,
}

fn one_tick() -> u32 {
    1
}

impl InputScript {
    pub fn parse(text: &str, origin: &str) -> Result<Self, HostError> {
        toml::from_str(text).map_err(|source| HostError::ScriptParse {
            path: origin.to_string(),
            source,
        })
    }

    pub fn load(path: &str) -> Result<Self, HostError> {
        let text = std::fs::read_to_string(path).map_err(|source| HostError::ScriptRead {
            path: path.to_string(),
            source,
        })?;
        Self::parse(&text, path)
    }

    /// Resolve key names and build the player. Zero-tick steps are dropped.
    pub fn compile(&self) -> Result<ScriptedInput, HostError> {
        let mut steps = Vec::with_capacity(self.steps.len());
        for step in self.steps.iter().filter(|s| s.ticks > 0) {
            steps.push(Step {
                ticks: step.ticks,
                hold: resolve(&step.hold)?,
                press: resolve(&step.press)?,
            });
        }
        tracing::debug!(steps = steps.len(), "Input script compiled");
        Ok(ScriptedInput {
            steps,
            step: 0,
            tick_in_step: 0,
            held: BTreeSet::new(),
            quit_sent: false,
        })
    }
}

fn resolve(names: &[String]) -> Result<BTreeSet<Key>, HostError> {
    names
        .iter()
        .map(|name| Key::from_name(name).ok_or_else(|| HostError::UnknownKey(name.clone())))
        .collect()
}

#[derive(Debug, Clone)]
struct Step {
    ticks: u32,
    hold: BTreeSet<Key>,
    press: BTreeSet<Key>,
}

/// Plays an [`InputScript`] back one tick at a time, then asks to quit.
#[derive(Debug, Clone)]
pub struct ScriptedInput {
    steps: Vec<Step>,
    step: usize,
    tick_in_step: u32,
    held: BTreeSet<Key>,
    quit_sent: bool,
}

impl ScriptedInput {
    /// True once the closing `Quit` has been handed out.
    pub fn is_finished(&self) -> bool {
        self.quit_sent
    }

    fn release(&mut self, events: &mut Vec<InputEvent>, key: Key) {
        if self.held.remove(&key) {
            events.push(InputEvent::KeyUp(key));
        }
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self) -> Vec<InputEvent> {
        let mut events = Vec::new();
        if self.quit_sent {
            return events;
        }
        let Some(step) = self.steps.get(self.step).cloned() else {
            for key in std::mem::take(&mut self.held) {
                events.push(InputEvent::KeyUp(key));
            }
            events.push(InputEvent::Quit);
            self.quit_sent = true;
            return events;
        };

        match self.tick_in_step {
            0 => {
                let stale: Vec<Key> = self
                    .held
                    .iter()
                    .copied()
                    .filter(|k| !step.hold.contains(k))
                    .collect();
                for key in stale {
                    self.release(&mut events, key);
                }
                // A press always lands as a fresh edge, even over a held key
                for &key in &step.press {
                    self.release(&mut events, key);
                    events.push(InputEvent::KeyDown(key));
                    self.held.insert(key);
                }
                for &key in &step.hold {
                    if self.held.insert(key) {
                        events.push(InputEvent::KeyDown(key));
                    }
                }
            },
            1 => {
                for &key in step.press.difference(&step.hold) {
                    self.release(&mut events, key);
                }
            },
            _ => {},
        }

        self.tick_in_step += 1;
        if self.tick_in_step >= step.ticks {
            self.step += 1;
            self.tick_in_step = 0;
        }
        events
    }
}
