pub mod audio;
pub mod game_trait;
pub mod geometry;
pub mod input;
pub mod render;
pub mod resource;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::audio::AudioService;
    use crate::game_trait::{GameEvent, ShiftGame};
    use crate::input::{InputEvent, InputFrame, Key};
    use crate::render::DrawList;

    /// Frame with `keys` held and nothing freshly pressed.
    pub fn held(keys: &[Key]) -> InputFrame {
        InputFrame::holding(keys)
    }

    /// Frame with `keys` held and pressed this tick.
    pub fn pressed(keys: &[Key]) -> InputFrame {
        InputFrame {
            held: keys.iter().copied().collect(),
            pressed: keys.iter().copied().collect(),
        }
    }

    /// Events for a single tap (down then up) of `key`.
    pub fn tap(key: Key) -> Vec<InputEvent> {
        vec![InputEvent::KeyDown(key), InputEvent::KeyUp(key)]
    }

    /// Audio service that records every call. Clones share the same log.
    #[derive(Debug, Clone, Default)]
    pub struct RecordingAudio {
        pub plays: Rc<RefCell<Vec<usize>>>,
        current: Rc<RefCell<Option<usize>>>,
    }

    impl RecordingAudio {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn played(&self) -> Vec<usize> {
            self.plays.borrow().clone()
        }
    }

    impl AudioService for RecordingAudio {
        fn play(&mut self, track: usize) {
            if *self.current.borrow() == Some(track) {
                return;
            }
            self.plays.borrow_mut().push(track);
            *self.current.borrow_mut() = Some(track);
        }

        fn stop(&mut self) {
            *self.current.borrow_mut() = None;
        }

        fn current(&self) -> Option<usize> {
            *self.current.borrow()
        }
    }

    /// Run one tick per entry of `ticks`, feeding that entry's events first.
    /// Stops early if the game reports done. Returns (ticks run, done, events).
    pub fn run_frames(
        game: &mut dyn ShiftGame,
        ticks: &[Vec<InputEvent>],
    ) -> (usize, bool, Vec<GameEvent>) {
        let mut events = Vec::new();
        for (i, tick_events) in ticks.iter().enumerate() {
            for e in tick_events {
                game.handle_input(e);
            }
            let done = game.update();
            events.extend(game.drain_events());
            if done {
                return (i + 1, true, events);
            }
        }
        (ticks.len(), false, events)
    }

    /// Run `n` ticks with no input.
    pub fn run_idle(game: &mut dyn ShiftGame, n: usize) -> Vec<GameEvent> {
        let ticks = vec![Vec::new(); n];
        run_frames(game, &ticks).2
    }

    // ================================================================
    // Game Trait Contract Tests
    // ================================================================
    // Generic checks every ShiftGame implementation must pass. Game crates
    // call them from their own test modules with a concrete instance.

    /// draw() must emit at least one primitive and begin with a clear.
    pub fn contract_draw_emits_primitives(game: &dyn ShiftGame) {
        let mut list = DrawList::new();
        game.draw(&mut list);
        assert!(
            !list.commands.is_empty(),
            "draw() must emit at least one primitive"
        );
        assert!(
            matches!(list.commands[0], crate::render::DrawCommand::Clear(_)),
            "draw() must start by clearing the frame"
        );
    }

    /// A Quit event must make the next update() report done.
    pub fn contract_quit_ends_session(game: &mut dyn ShiftGame) {
        game.handle_input(&InputEvent::Quit);
        assert!(game.update(), "update() must return done after Quit");
    }

    /// Two fresh instances fed the same events must produce identical snapshots.
    pub fn contract_update_is_deterministic(
        make: &dyn Fn() -> Box<dyn ShiftGame>,
        ticks: &[Vec<InputEvent>],
    ) {
        let mut a = make();
        let mut b = make();
        let (_, _, events_a) = run_frames(a.as_mut(), ticks);
        let (_, _, events_b) = run_frames(b.as_mut(), ticks);
        assert_eq!(events_a, events_b, "event streams must match for equal input");
        assert_eq!(
            a.serialize_state(),
            b.serialize_state(),
            "snapshots must match for equal input"
        );
    }
}
