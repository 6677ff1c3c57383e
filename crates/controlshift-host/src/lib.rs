pub mod config;
pub mod error;
pub mod game_loop;
pub mod render;
pub mod script;

use controlshift_core::audio::{SilentBackend, TrackPlayer};
use controlshift_core::resource::DirLocator;
use controlshift_rooms::GameController;

use config::HostConfig;
use error::HostError;
use script::{InputScript, InputSource, NoInput};

/// Build the game with music resolved under `asset_root`.
///
/// There is no output device, so tracks play through [`SilentBackend`];
/// missing files are logged once and otherwise ignored.
pub fn build_game(config: &HostConfig) -> Result<GameController, HostError> {
    let game_config = config.game_config()?;
    let audio = TrackPlayer::new(
        DirLocator::new(&config.asset_root),
        SilentBackend::default(),
        game_config.audio.tracks.clone(),
    );
    Ok(GameController::new(game_config, Box::new(audio))?)
}

/// The configured input script, or no input at all.
pub fn build_input(config: &HostConfig) -> Result<Box<dyn InputSource>, HostError> {
    match &config.script {
        Some(path) => {
            let scripted = InputScript::load(path)?.compile()?;
            tracing::info!(path, "Replaying input script");
            Ok(Box::new(scripted))
        },
        None => Ok(Box::new(NoInput)),
    }
}
