use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use controlshift_host::config::HostConfig;
use controlshift_host::error::HostError;
use controlshift_host::game_loop::run_session;
use controlshift_host::render::CountingRenderer;
use controlshift_host::{build_game, build_input};

fn init_tracing() {
    let json = std::env::var("CONTROLSHIFT_LOG_JSON")
        .is_ok_and(|v| v == "1" || v.eq_ignore_ascii_case("true"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run() -> Result<(), HostError> {
    let config = HostConfig::load();
    config.validate()?;

    let mut game = build_game(&config)?;
    let mut input = build_input(&config)?;
    let mut renderer = CountingRenderer::new();
    let report = run_session(
        &mut game,
        input.as_mut(),
        &mut renderer,
        config.tick_rate_hz,
        config.max_ticks,
    )
    .await;

    tracing::info!(
        ticks = report.ticks,
        done = report.done,
        rooms_entered = report.rooms_entered,
        "Session finished"
    );
    if config.report {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    tracing::info!("Control Shift host starting");

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Host failed");
            ExitCode::FAILURE
        },
    }
}
