use controlshift_rooms::error::GameError;

/// Everything that can stop the host before or after a session.
#[derive(Debug)]
pub enum HostError {
    ConfigRead {
        path: String,
        source: std::io::Error,
    },
    ConfigParse {
        path: String,
        source: toml::de::Error,
    },
    InvalidConfig {
        field: &'static str,
        reason: String,
    },
    ScriptRead {
        path: String,
        source: std::io::Error,
    },
    ScriptParse {
        path: String,
        source: toml::de::Error,
    },
    /// A script named a key the game does not know.
    UnknownKey(String),
    Game(GameError),
    Report(serde_json::Error),
}

impl std::fmt::Display for HostError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConfigRead { path, source } => write!(f, "cannot read config {path}: {source}"),
            Self::ConfigParse { path, source } => write!(f, "invalid config {path}: {source}"),
            Self::InvalidConfig { field, reason } => write!(f, "{field}: {reason}"),
            Self::ScriptRead { path, source } => write!(f, "cannot read script {path}: {source}"),
            Self::ScriptParse { path, source } => write!(f, "invalid script {path}: {source}"),
            Self::UnknownKey(name) => write!(f, "unknown key name in script: {name:?}"),
            Self::Game(e) => write!(f, "{e}"),
            Self::Report(e) => write!(f, "cannot serialize session report: {e}"),
        }
    }
}

impl std::error::Error for HostError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ConfigRead { source, .. } | Self::ScriptRead { source, .. } => Some(source),
            Self::ConfigParse { source, .. } | Self::ScriptParse { source, .. } => Some(source),
            Self::Game(e) => Some(e),
            Self::Report(e) => Some(e),
            Self::InvalidConfig { .. } | Self::UnknownKey(_) => None,
        }
    }
}

impl From<GameError> for HostError {
    fn from(e: GameError) -> Self {
        Self::Game(e)
    }
}

impl From<serde_json::Error> for HostError {
    fn from(e: serde_json::Error) -> Self {
        Self::Report(e)
    }
}
