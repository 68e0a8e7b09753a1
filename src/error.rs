/*!
The one error type everything in the crate returns.

Every variant renders as operator-facing text; there's no other error
channel.
*/
use crate::role::{Action, Role};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid username or password.")]
    InvalidCredentials,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Patient {0} not found.")]
    RecordNotFound(u32),

    #[error("Permission denied: the administrator has restricted {role} access to {action}.")]
    PermissionDenied { role: Role, action: Action },

    #[error("No access rights recorded for role {0}.")]
    RoleNotFound(Role),

    #[error("Storage failure: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// The console has no more input to give.
    #[error("Input closed.")]
    EndOfInput,

    /// A stored line failed to decode. `line` is 1-based; 0 means the
    /// line wasn't read from a file.
    #[error("Malformed record on line {line}: {msg}")]
    Format { line: u64, msg: String },
}

impl Error {
    /// Prepend some contextual `annotation` to a `Storage` error. Other
    /// variants pass through untouched.
    pub fn annotate(self, annotation: &str) -> Self {
        match self {
            Error::Storage(s) => Error::Storage(format!("{}: {}", annotation, &s)),
            x => x,
        }
    }

    pub(crate) fn format<S: Into<String>>(msg: S) -> Self {
        Error::Format { line: 0, msg: msg.into() }
    }

    /// Attach a line number to a `Format` error that doesn't have one yet.
    pub(crate) fn at_line(self, n: u64) -> Self {
        match self {
            Error::Format { line: 0, msg } => Error::Format { line: n, msg },
            x => x,
        }
    }

    /// Whether the operator can simply be asked again.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            Error::Storage(_) | Error::Format { .. } | Error::Config(_) | Error::EndOfInput
        )
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Error {
        Error::Storage(format!("{}", &e))
    }
}

impl From<csv::Error> for Error {
    fn from(e: csv::Error) -> Error {
        let line = e.position().map(|p| p.line()).unwrap_or(0);
        match e.kind() {
            csv::ErrorKind::Io(_) => Error::Storage(format!("{}", &e)),
            _ => Error::Format { line, msg: format!("{}", &e) },
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
