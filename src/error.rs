//! Error types.

/// Error enumerates the possible blackhole error states.
///
/// Variants fall into three groups. Informative errors are user-actionable and are printed as a
/// single line (see [`Error::is_informative`]). [`Error::NotRunnable`] is structural: a group
/// command was selected on its own. Everything else is a fault that propagates with its full
/// context.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Returned when a group command (one that only organizes subcommands) is run directly.
    #[error("command has no action of its own")]
    NotRunnable,

    /// Returned when a command field fails validation during construction.
    #[error("invalid {field}: {value}")]
    InvalidField { field: &'static str, value: String },

    /// Returned when the `server` host, port, or SSL settings are inconsistent.
    #[error("{0}")]
    Server(String),

    /// Returned when the TLS certificate chain or private key can't be used.
    #[error("invalid TLS material in {path}: {reason}")]
    InvalidTls { path: String, reason: String },

    /// Returned when no AWS credentials resolve for the Route53 integration.
    #[error(
        "AWS credentials not found; are they set up right? See: \
         https://boto3.amazonaws.com/v1/documentation/api/latest/guide/credentials.html"
    )]
    NoCredentials,

    /// Returned by the capability probe when an external tool can't be located.
    #[error("failed locating '{0}'; is it installed and on PATH?")]
    MissingCollaborator(String),

    /// Returned when arguments follow `--` for a command that doesn't forward them.
    #[error("'{0}' does not accept pass-through arguments")]
    UnexpectedPassthrough(String),

    /// Returned when a generic IO error occurs.
    #[error("an IO error occurred")]
    IO(#[from] std::io::Error),

    /// Returned when the blackhole HTTP server fails.
    #[error("HTTP server error")]
    HTTP(#[from] hyper::Error),

    /// Returned when a collaborator fails unexpectedly.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl Error {
    /// Whether the error is meant for the operator as a one-line message rather than a fault
    /// needing diagnosis.
    #[must_use]
    pub fn is_informative(&self) -> bool {
        matches!(
            self,
            Error::InvalidField { .. }
                | Error::Server(_)
                | Error::InvalidTls { .. }
                | Error::NoCredentials
                | Error::MissingCollaborator(_)
                | Error::UnexpectedPassthrough(_)
        )
    }

    pub(crate) fn invalid(field: &'static str, value: impl std::fmt::Debug) -> Self {
        Error::InvalidField {
            field,
            value: format!("{value:?}"),
        }
    }
}
