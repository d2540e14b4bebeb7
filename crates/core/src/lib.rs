//! Error taxonomy for dropped-file intake and the user-facing kinds it maps to.

use std::io;

use thiserror::Error;

/// Boxed error coming from a third-party decoder or parser.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("No files were dropped")]
    EmptyDrop,

    #[error("Failed to read dropped file '{path}'")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to decode archive '{path}'")]
    Decode {
        path: String,
        #[source]
        source: BoxError,
    },

    #[error("No .glb or .gltf file found among the dropped files")]
    NoEntry,

    #[error("Referenced resource '{uri}' is not among the dropped files")]
    MissingResource { uri: String },

    #[error("Failed to parse scene '{path}'")]
    Parse {
        path: String,
        #[source]
        source: BoxError,
    },
}

/// Coarse failure class, used by the UI to pick a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Read,
    Decode,
    Unresolvable,
    Missing,
    Parse,
}

impl IntakeError {
    pub fn decode(path: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Decode {
            path: path.into(),
            source: source.into(),
        }
    }

    pub fn parse(path: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Parse {
            path: path.into(),
            source: source.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            // An empty drop has nothing loadable in it either.
            Self::EmptyDrop | Self::NoEntry => ErrorKind::Unresolvable,
            Self::Read { .. } => ErrorKind::Read,
            Self::Decode { .. } => ErrorKind::Decode,
            Self::MissingResource { .. } => ErrorKind::Missing,
            Self::Parse { .. } => ErrorKind::Parse,
        }
    }
}

impl ErrorKind {
    /// Short message suitable for showing to the user.
    pub fn user_message(self) -> &'static str {
        match self {
            ErrorKind::Read => "Could not read one of the dropped files.",
            ErrorKind::Decode => "The archive is corrupt or not a zip file.",
            ErrorKind::Unresolvable => "Nothing loadable found. Drop a .glb, .gltf or .zip file.",
            ErrorKind::Missing => "The model references a file that was not dropped with it.",
            ErrorKind::Parse => "The model file is corrupt or uses an unsupported feature.",
        }
    }
}

pub type IntakeResult<T> = Result<T, IntakeError>;
