//! End-to-end runs of the controller: the full room loop, the ending
//! branches, the bonus escape hatch and replay determinism.

use glam::Vec2;

use controlshift_core::audio::AudioService;
use controlshift_core::game_trait::{EndingOutcome, GameEvent, ShiftGame};
use controlshift_core::input::{ControlScheme, InputEvent, Key};
use controlshift_core::render::DrawList;
use controlshift_core::test_helpers::{RecordingAudio, run_frames, run_idle, tap};
use controlshift_rooms::config::GameConfig;
use controlshift_rooms::layouts::ROOM_COUNT;
use controlshift_rooms::physics::SCREEN_HEIGHT;
use controlshift_rooms::transform::InputTransform;
use controlshift_rooms::{GameController, Mode};

fn new_game(config: GameConfig) -> (GameController, RecordingAudio) {
    let audio = RecordingAudio::new();
    let game = GameController::new(config, Box::new(audio.clone())).unwrap();
    (game, audio)
}

/// Title -> level select -> first room.
fn begin(game: &mut GameController) -> Vec<GameEvent> {
    let (_, _, events) = run_frames(game, &[tap(Key::Return), tap(Key::Space)]);
    assert_eq!(game.mode(), &Mode::Playing);
    events
}

/// Place the body so it overlaps the top of the current door without
/// touching any platform, in either gravity.
fn warp_to_door(game: &mut GameController) {
    let door = game
        .sequencer()
        .current()
        .door()
        .expect("room should have a door");
    let body = game.sequencer_mut().current_mut().body_mut();
    body.pos = Vec2::new(door.x, door.y - 8.0);
    body.vel = Vec2::ZERO;
}

fn entered(events: &[GameEvent]) -> Vec<usize> {
    events
        .iter()
        .filter_map(|e| match e {
            GameEvent::RoomEntered { index } => Some(*index),
            _ => None,
        })
        .collect()
}

/// Finish every room in order and stop at the ending's choice screen.
fn play_to_choice(game: &mut GameController) -> Vec<GameEvent> {
    let mut events = begin(game);
    for room in 0..ROOM_COUNT {
        assert_eq!(game.sequencer().current_index(), room);
        warp_to_door(game);
        let tick = run_idle(game, 1);
        assert!(
            tick.contains(&GameEvent::RoomCompleted { index: room }),
            "room {room} should complete from its door"
        );
        events.extend(tick);
        if room + 1 < ROOM_COUNT {
            assert!(matches!(game.mode(), Mode::Transition { .. }));
            events.extend(run_frames(game, &[tap(Key::E)]).2);
        }
    }
    assert!(matches!(game.mode(), Mode::Ending(_)));

    let timing = game.config().timing.clone();
    let ticks = (timing.dialogue_line_ticks * 3 + timing.fade_ticks) as usize;
    events.extend(run_idle(game, ticks));
    match game.mode() {
        Mode::Ending(ending) => assert_eq!(ending.selected(), Some(0)),
        other => panic!("expected the choice screen, got {}", other.name()),
    }
    events
}

fn quick_config() -> GameConfig {
    let mut config = GameConfig::default();
    config.timing.dialogue_line_ticks = 3;
    config.timing.fade_ticks = 2;
    config
}

// ================================================================
// Full loop
// ================================================================

#[test]
fn full_loop_visits_every_room_in_order() {
    let (mut game, audio) = new_game(quick_config());
    let events = play_to_choice(&mut game);

    assert_eq!(entered(&events), vec![0, 1, 2, 3, 4, 5, 6, 0]);
    assert_eq!(
        events
            .iter()
            .filter(|e| **e == GameEvent::LoopCompleted)
            .count(),
        1
    );
    // Track 0 plays at startup, then one track per room, then the loop wraps
    assert_eq!(audio.played(), vec![0, 1, 2, 3, 4, 5, 6, 0]);
}

#[test]
fn revenge_rolls_credits_and_ends() {
    let (mut game, audio) = new_game(quick_config());
    play_to_choice(&mut game);

    let (_, done, events) = run_frames(&mut game, &[tap(Key::Return)]);
    assert!(done);
    assert!(events.contains(&GameEvent::EndingResolved {
        outcome: EndingOutcome::Terminate
    }));
    assert_eq!(game.mode(), &Mode::Credits);
    assert_eq!(audio.current(), None);

    let mut frame = DrawList::new();
    game.draw(&mut frame);
    assert!(frame.contains_text("Thanks for playing Control Shift!"));
}

#[test]
fn forgiveness_traps_the_player_in_the_first_room() {
    let (mut game, _) = new_game(quick_config());
    play_to_choice(&mut game);

    let (_, done, events) = run_frames(
        &mut game,
        &[vec![InputEvent::KeyDown(Key::Down)], vec![
            InputEvent::KeyUp(Key::Down),
            InputEvent::KeyDown(Key::Space),
        ]],
    );
    assert!(!done);
    assert!(events.contains(&GameEvent::EndingResolved {
        outcome: EndingOutcome::ResetWithoutDoor
    }));
    assert_eq!(game.mode(), &Mode::Playing);
    assert_eq!(game.sequencer().current_index(), 0);
    assert!(game.sequencer().current().door().is_none());

    // Standing where the door used to be does nothing
    let body = game.sequencer_mut().current_mut().body_mut();
    body.pos = Vec2::new(736.0, 432.0);
    body.vel = Vec2::ZERO;
    let events = run_idle(&mut game, 120);
    assert!(!events.iter().any(|e| matches!(e, GameEvent::RoomCompleted { .. })));
    assert_eq!(game.mode(), &Mode::Playing);

    // Re-entering through the level select keeps the exit gone
    run_frames(&mut game, &[tap(Key::Escape), tap(Key::Digit1)]);
    assert_eq!(game.mode(), &Mode::Playing);
    assert!(game.sequencer().current().door().is_none());
}

// ================================================================
// In-room behaviour through the controller
// ================================================================

#[test]
fn falling_out_respawns_with_an_event() {
    let (mut game, _) = new_game(GameConfig::default());
    begin(&mut game);
    let body = game.sequencer_mut().current_mut().body_mut();
    body.pos = Vec2::new(320.0, SCREEN_HEIGHT + 10.0);

    let events = run_idle(&mut game, 1);
    assert!(events.contains(&GameEvent::PlayerRespawned { room: 0 }));
    let room = game.sequencer().current();
    assert!(room.is_frozen());
    assert_eq!(room.body().pos, Vec2::new(100.0, 300.0));
}

#[test]
fn bonus_fruit_restores_normal_controls() {
    let mut config = GameConfig::default();
    config.timing.bonus_dwell_ticks = 30;
    let (mut game, _) = new_game(config);
    run_frames(&mut game, &[tap(Key::Return), tap(Key::Digit2)]);
    assert!(matches!(
        game.sequencer().current().transform(),
        InputTransform::Swapped
    ));

    let events = run_idle(&mut game, 30);
    assert!(events.contains(&GameEvent::BonusSpawned { room: 1 }));
    let fruit = game
        .sequencer()
        .current()
        .bonus()
        .visible()
        .expect("fruit should be out");

    let body = game.sequencer_mut().current_mut().body_mut();
    body.pos = Vec2::new(fruit.x - 4.0, fruit.y - 8.0);
    body.vel = Vec2::ZERO;
    let events = run_idle(&mut game, 1);
    assert!(events.contains(&GameEvent::BonusCollected { room: 1 }));

    let room = game.sequencer().current();
    assert!(matches!(room.transform(), InputTransform::Identity));
    assert_eq!(room.scheme(), &ControlScheme::standard());
    assert!(room.bonus().visible().is_none());
}

// ================================================================
// Clearing rooms with real key input
// ================================================================

/// Expand `(held keys, ticks)` steps into per-tick events. Keys are pressed
/// when a step starts holding them and released when a later step drops them.
fn key_script(steps: &[(&[Key], usize)]) -> Vec<Vec<InputEvent>> {
    let mut held: Vec<Key> = Vec::new();
    let mut ticks = Vec::new();
    for &(keys, count) in steps {
        let mut first = Vec::new();
        for &key in held.iter().filter(|k| !keys.contains(k)) {
            first.push(InputEvent::KeyUp(key));
        }
        for &key in keys.iter().filter(|k| !held.contains(k)) {
            first.push(InputEvent::KeyDown(key));
        }
        held = keys.to_vec();
        ticks.push(first);
        ticks.extend(std::iter::repeat_n(Vec::new(), count - 1));
    }
    ticks
}

fn open_level(game: &mut GameController, digit: Key) {
    run_frames(game, &[tap(Key::Return), tap(digit)]);
    assert_eq!(game.mode(), &Mode::Playing);
}

#[test]
fn time_lag_is_cleared_with_delayed_input() {
    const RUN: &[Key] = &[Key::Right];
    const HOP: &[Key] = &[Key::Right, Key::Up];
    let (mut game, _) = new_game(GameConfig::default());
    open_level(&mut game, Key::Digit3);

    // Three hops up the ledges, then walk off the top ledge into the door.
    // The last 30 ticks only let the delay line drain.
    let ticks = key_script(&[
        (RUN, 4),
        (HOP, 4),
        (RUN, 20),
        (HOP, 4),
        (RUN, 24),
        (HOP, 4),
        (RUN, 63),
        (&[], 30),
    ]);
    assert_eq!(ticks.len(), 153);

    let (_, _, events) = run_frames(&mut game, &ticks[..30]);
    let body = game.sequencer().current().body();
    assert_eq!(body.pos, Vec2::new(100.0, 418.0), "nothing moves while the line fills");
    assert!(body.grounded);
    assert!(events.is_empty(), "unexpected events: {events:?}");

    let (_, _, events) = run_frames(&mut game, &ticks[30..152]);
    assert!(!events.contains(&GameEvent::RoomCompleted { index: 2 }));
    assert!(!events.contains(&GameEvent::PlayerRespawned { room: 2 }));
    assert!(game.sequencer().current().body().pos.x > 700.0);

    let (_, _, events) = run_frames(&mut game, &ticks[152..]);
    assert!(events.contains(&GameEvent::RoomCompleted { index: 2 }));
    assert_eq!(game.sequencer().current_index(), 3);
}

#[test]
fn upside_down_is_cleared_along_the_ceiling() {
    const RUN: &[Key] = &[Key::Right];
    const DROP: &[Key] = &[Key::Right, Key::Down];
    let (mut game, _) = new_game(GameConfig::default());
    open_level(&mut game, Key::Digit6);

    // Down jumps away from the ceiling; each hop lands under a lower step.
    let ticks = key_script(&[
        (RUN, 12),
        (DROP, 4),
        (RUN, 20),
        (DROP, 4),
        (RUN, 20),
        (DROP, 4),
        (RUN, 16),
        (DROP, 4),
        (RUN, 16),
        (DROP, 4),
        (RUN, 24),
    ]);
    assert_eq!(ticks.len(), 128);

    let (_, _, events) = run_frames(&mut game, &ticks[..127]);
    assert!(!events.contains(&GameEvent::RoomCompleted { index: 5 }));
    assert!(!events.contains(&GameEvent::PlayerRespawned { room: 5 }));
    assert!(
        game.sequencer().current().body().grounded,
        "the body should be resting under the last step"
    );

    let (_, _, events) = run_frames(&mut game, &ticks[127..]);
    assert!(events.contains(&GameEvent::RoomCompleted { index: 5 }));
    assert_eq!(game.sequencer().current_index(), 6);
}

// ================================================================
// Determinism
// ================================================================

fn scripted_run(seed: u64) -> (Vec<GameEvent>, Vec<u8>) {
    let mut config = GameConfig::default();
    config.seed = Some(seed);
    config.transforms.randomize_interval = 20;
    let (mut game, _) = new_game(config);

    let mut ticks = vec![tap(Key::Return), tap(Key::Digit4)];
    ticks.push(vec![InputEvent::KeyDown(Key::Right)]);
    ticks.extend(vec![Vec::new(); 90]);
    ticks.push(vec![InputEvent::KeyUp(Key::Right), InputEvent::KeyDown(Key::Space)]);
    ticks.extend(vec![Vec::new(); 40]);
    let (_, _, events) = run_frames(&mut game, &ticks);
    (events, game.serialize_state())
}

#[test]
fn same_seed_replays_identically() {
    let (events_a, state_a) = scripted_run(42);
    let (events_b, state_b) = scripted_run(42);
    assert_eq!(events_a, events_b);
    assert_eq!(state_a, state_b);

    let remaps = events_a
        .iter()
        .filter(|e| matches!(e, GameEvent::ControlsRemapped { .. }))
        .count();
    assert!(remaps > 0, "expected periodic remaps");
}

#[test]
fn room_seed_fixes_the_first_shuffle() {
    let scheme_for = |seed: u64| {
        let mut config = GameConfig::default();
        config.seed = Some(seed);
        let (mut game, _) = new_game(config);
        run_frames(&mut game, &[tap(Key::Return), tap(Key::Digit4)]);
        game.sequencer().current().scheme().clone()
    };
    assert_eq!(scheme_for(7), scheme_for(7));
}
