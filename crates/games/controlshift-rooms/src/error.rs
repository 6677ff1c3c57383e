use crate::config::ConfigError;
use crate::transform::TransformError;

/// Why a game could not be set up.
#[derive(Debug, Clone, PartialEq)]
pub enum GameError {
    Config(ConfigError),
    Transform(TransformError),
}

impl std::fmt::Display for GameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(e) => write!(f, "configuration rejected: {e}"),
            Self::Transform(e) => write!(f, "room could not be built: {e}"),
        }
    }
}

impl std::error::Error for GameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Transform(e) => Some(e),
        }
    }
}

impl From<ConfigError> for GameError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<TransformError> for GameError {
    fn from(e: TransformError) -> Self {
        Self::Transform(e)
    }
}
