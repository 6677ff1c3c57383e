use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::resource::{ResourceError, ResourceLocator};

/// Errors from the audio layer. Never propagated past [`TrackPlayer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioError {
    Resource(ResourceError),
    NoSuchTrack(usize),
    Backend(String),
}

impl std::fmt::Display for AudioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Resource(e) => write!(f, "{e}"),
            Self::NoSuchTrack(index) => write!(f, "no music track configured at index {index}"),
            Self::Backend(m) => write!(f, "audio backend error: {m}"),
        }
    }
}

impl std::error::Error for AudioError {}

impl From<ResourceError> for AudioError {
    fn from(e: ResourceError) -> Self {
        Self::Resource(e)
    }
}

/// Music playback as seen by the game: one looping track at a time.
///
/// Implementations must not fail: a track that cannot be played leaves the
/// service silent.
pub trait AudioService {
    /// Start looping `track`. A no-op if that track is already playing.
    fn play(&mut self, track: usize);

    fn stop(&mut self);

    /// Index of the track currently playing, if any.
    fn current(&self) -> Option<usize>;
}

/// Low-level device that actually produces sound.
pub trait AudioBackend {
    fn start_loop(&mut self, path: &Path) -> Result<(), AudioError>;
    fn stop(&mut self);
}

/// Backend with no output device. Accepts every file.
#[derive(Debug, Default)]
pub struct SilentBackend {
    pub last_started: Option<PathBuf>,
}

impl AudioBackend for SilentBackend {
    fn start_loop(&mut self, path: &Path) -> Result<(), AudioError> {
        self.last_started = Some(path.to_path_buf());
        Ok(())
    }

    fn stop(&mut self) {
        self.last_started = None;
    }
}

/// Plays per-room music tracks resolved through a [`ResourceLocator`].
pub struct TrackPlayer<L: ResourceLocator, B: AudioBackend> {
    locator: L,
    backend: B,
    tracks: Vec<String>,
    current: Option<usize>,
    /// Track indices already reported as unplayable (warn once each).
    reported: HashSet<usize>,
}

impl<L: ResourceLocator, B: AudioBackend> TrackPlayer<L, B> {
    pub fn new(locator: L, backend: B, tracks: Vec<String>) -> Self {
        Self {
            locator,
            backend,
            tracks,
            current: None,
            reported: HashSet::new(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn try_play(&mut self, track: usize) -> Result<(), AudioError> {
        let logical = self
            .tracks
            .get(track)
            .ok_or(AudioError::NoSuchTrack(track))?;
        let path = self.locator.resolve(logical)?;
        self.backend.start_loop(&path)
    }
}

impl<L: ResourceLocator, B: AudioBackend> AudioService for TrackPlayer<L, B> {
    fn play(&mut self, track: usize) {
        if self.current == Some(track) {
            return;
        }
        self.backend.stop();
        match self.try_play(track) {
            Ok(()) => {
                tracing::debug!(track, "Music started");
                self.current = Some(track);
            },
            Err(e) => {
                if self.reported.insert(track) {
                    tracing::warn!(track, error = %e, "Music unavailable, continuing silently");
                }
                self.current = None;
            },
        }
    }

    fn stop(&mut self) {
        self.backend.stop();
        self.current = None;
    }

    fn current(&self) -> Option<usize> {
        self.current
    }
}
