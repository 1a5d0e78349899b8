//! Error types for program files and checked editing operations

/// Error type for operations that can fail without being a plain no-op.
///
/// Edit and playback operations log and ignore bad indices instead of
/// returning this; it is surfaced by file I/O and the `try_*` accessors.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ProgramError {
    /// IO error
    #[error("IO error: {reason}")]
    Io { reason: String },

    /// Program file could not be encoded or decoded
    #[error("Serialization error: {reason}")]
    Serialization { reason: String },

    /// Program file does not carry the program extension
    #[error("Unsupported file extension for {path}: expected .{expected}")]
    UnsupportedExtension { path: String, expected: String },

    /// Program file schema version is not understood
    #[error("Unsupported program version {found} (supported: {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// Track index past the end of the program
    #[error("Track index {index} out of range ({len} tracks)")]
    TrackOutOfRange { index: usize, len: usize },

    /// Action index past the end of a track
    #[error("Action index {index} out of range in track {track} ({len} actions)")]
    ActionOutOfRange {
        track: usize,
        index: usize,
        len: usize,
    },

    /// Settings file problem
    #[error("Settings error: {reason}")]
    Settings { reason: String },
}

impl ProgramError {
    /// Get error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::Io { .. } => "io",
            Self::Serialization { .. }
            | Self::UnsupportedExtension { .. }
            | Self::UnsupportedVersion { .. } => "format",
            Self::TrackOutOfRange { .. } | Self::ActionOutOfRange { .. } => "index",
            Self::Settings { .. } => "settings",
        }
    }
}

impl From<std::io::Error> for ProgramError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for ProgramError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            reason: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for ProgramError {
    fn from(err: toml::de::Error) -> Self {
        Self::Settings {
            reason: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for ProgramError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Settings {
            reason: err.to_string(),
        }
    }
}

/// Program core result type
pub type Result<T> = core::result::Result<T, ProgramError>;
