use std::time::Duration;

use serde::Serialize;

use controlshift_core::game_trait::{EndingOutcome, GameEvent, ShiftGame};
use controlshift_core::render::Renderer;

use crate::render::CountingRenderer;
use crate::script::InputSource;

/// Summary of one host session, printed as JSON on exit.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionReport {
    pub ticks: u64,
    /// The game asked to exit (as opposed to a tick limit or interrupt).
    pub done: bool,
    pub rooms_entered: u64,
    pub loops_completed: u64,
    pub outcome: Option<EndingOutcome>,
    pub frames_presented: u64,
}

impl SessionReport {
    fn record(&mut self, events: &[GameEvent]) {
        for event in events {
            match event {
                GameEvent::RoomEntered { .. } => self.rooms_entered += 1,
                GameEvent::LoopCompleted => self.loops_completed += 1,
                GameEvent::EndingResolved { outcome } => self.outcome = Some(*outcome),
                _ => {},
            }
        }
    }
}

/// One host tick: feed input, update, draw, present. Returns the game's done flag.
fn step(
    game: &mut dyn ShiftGame,
    input: &mut dyn InputSource,
    renderer: &mut CountingRenderer,
    report: &mut SessionReport,
) -> bool {
    for event in input.poll() {
        game.handle_input(&event);
    }
    let done = game.update();
    report.record(&game.drain_events());
    game.draw(renderer);
    renderer.present();
    report.ticks += 1;
    report.done = done;
    report.frames_presented = renderer.frames;
    done
}

fn limit_reached(report: &SessionReport, max_ticks: Option<u64>) -> bool {
    max_ticks.is_some_and(|max| report.ticks >= max)
}

/// Run as fast as possible until done or `max_ticks`.
pub fn run_unpaced(
    game: &mut dyn ShiftGame,
    input: &mut dyn InputSource,
    renderer: &mut CountingRenderer,
    max_ticks: Option<u64>,
) -> SessionReport {
    let mut report = SessionReport::default();
    while !limit_reached(&report, max_ticks) {
        if step(game, input, renderer, &mut report) {
            break;
        }
    }
    report
}

/// Run at `tick_rate_hz` until done, `max_ticks`, or ctrl-c.
pub async fn run_session(
    game: &mut dyn ShiftGame,
    input: &mut dyn InputSource,
    renderer: &mut CountingRenderer,
    tick_rate_hz: u32,
    max_ticks: Option<u64>,
) -> SessionReport {
    let tick_interval = Duration::from_secs_f64(1.0 / f64::from(tick_rate_hz.max(1)));
    let mut interval = tokio::time::interval(tick_interval);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let metadata = game.metadata();
    tracing::info!(game = %metadata.name, tick_rate_hz, ?max_ticks, "Session started");

    let mut report = SessionReport::default();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                if limit_reached(&report, max_ticks) {
                    tracing::info!(ticks = report.ticks, "Tick limit reached");
                    break;
                }
                if step(game, input, renderer, &mut report) {
                    break;
                }
            }
            _ = &mut ctrl_c => {
                tracing::info!(ticks = report.ticks, "Interrupted, ending session");
                break;
            }
        }
    }
    report
}
