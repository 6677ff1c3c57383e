use rand::Rng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

pub const NARRATOR_LINES: [&str; 7] = [
    "Did you like that? Let's make it harder...",
    "You thought you had control? Think again!",
    "I'm just getting started...",
    "Your hands are not your own!",
    "Try to keep up!",
    "I can do this all day...",
    "This is my world now!",
];

/// Taunting speech bubble shown for a short while after each room.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Narrator {
    line: Option<usize>,
    remaining: u32,
}

impl Narrator {
    /// Pick a random line and show it for `ticks` ticks.
    pub fn speak(&mut self, rng: &mut StdRng, ticks: u32) -> &'static str {
        let index = rng.random_range(0..NARRATOR_LINES.len());
        self.line = Some(index);
        self.remaining = ticks;
        NARRATOR_LINES[index]
    }

    pub fn tick(&mut self) {
        if self.remaining > 0 {
            self.remaining -= 1;
            if self.remaining == 0 {
                self.line = None;
            }
        }
    }

    pub fn silence(&mut self) {
        self.line = None;
        self.remaining = 0;
    }

    pub fn current(&self) -> Option<&'static str> {
        self.line.and_then(|i| NARRATOR_LINES.get(i).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn speaks_for_a_fixed_time() {
        let mut narrator = Narrator::default();
        assert!(narrator.current().is_none());
        let line = narrator.speak(&mut StdRng::seed_from_u64(1), 3);
        assert!(NARRATOR_LINES.contains(&line));
        assert_eq!(narrator.current(), Some(line));
        narrator.tick();
        narrator.tick();
        assert_eq!(narrator.current(), Some(line));
        narrator.tick();
        assert!(narrator.current().is_none());
    }

    #[test]
    fn silence_clears_immediately() {
        let mut narrator = Narrator::default();
        narrator.speak(&mut StdRng::seed_from_u64(2), 100);
        narrator.silence();
        assert!(narrator.current().is_none());
    }
}
