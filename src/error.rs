use std::io;

use thiserror::Error;

/// Error type for mftp operations.
#[derive(Error, Debug)]
pub enum FtpError {
    /// IO error on the control or data channel.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The far end answered with `fail: <message>`.
    #[error("{0}")]
    Remote(String),

    /// A command was used incorrectly; nothing was sent.
    #[error("{0}")]
    Usage(String),

    /// A local file could not be opened or created.
    #[error("{}", os_message(.0))]
    Local(io::Error),

    /// The data channel ended before the announced byte count was moved.
    #[error("short transfer: expected {expected} bytes, moved {actual}")]
    ShortTransfer {
        /// Announced byte count.
        expected: u64,
        /// Bytes actually moved before the channel ran dry.
        actual: u64,
    },

    /// A response line that is neither `succ:` nor `fail:`.
    #[error("malformed response: {0:?}")]
    MalformedResponse(String),

    /// The control channel closed while a response was expected.
    #[error("connection closed by peer")]
    ConnectionClosed,

    /// Error with a string message.
    #[error("{0}")]
    StringError(String),
}

impl FtpError {
    /// Whether the session is out of sync and must be abandoned.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            FtpError::Remote(_) | FtpError::Usage(_) | FtpError::Local(_)
        )
    }
}

/// Describes an IO error the way `strerror` would, without the
/// `(os error N)` suffix std appends.
pub fn os_message(err: &io::Error) -> String {
    let text = err.to_string();
    match text.rfind(" (os error ") {
        Some(idx) => text[..idx].to_owned(),
        None => text,
    }
}

/// Result type alias for mftp operations.
pub type Result<T> = std::result::Result<T, FtpError>;
