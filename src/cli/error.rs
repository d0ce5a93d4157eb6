//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("{0}")]
    Usage(String),
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

impl From<DomainError> for CliError {
    fn from(e: DomainError) -> Self {
        CliError::from(ApplicationError::from(e))
    }
}

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) | CliError::Usage(_) => crate::exitcode::USAGE,
            CliError::Infra(e) => match e {
                InfraError::Io { .. } => crate::exitcode::IOERR,
                InfraError::Application(app) => match app {
                    ApplicationError::UnsupportedFormat(_) => crate::exitcode::USAGE,
                    ApplicationError::Config { .. } => crate::exitcode::CONFIG,
                    ApplicationError::OperationFailed { .. } => crate::exitcode::NOINPUT,
                    ApplicationError::Codec { .. } | ApplicationError::Domain(_) => {
                        crate::exitcode::DATAERR
                    }
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::ItemId;
    use crate::exitcode;

    use super::*;

    #[test]
    fn given_layered_errors_when_exit_code_then_maps_by_cause() {
        let unsupported = CliError::from(ApplicationError::UnsupportedFormat("xlsx".into()));
        assert_eq!(unsupported.exit_code(), exitcode::USAGE);

        let missing = CliError::from(DomainError::IdNotFound(vec![ItemId(30)]));
        assert_eq!(missing.exit_code(), exitcode::DATAERR);
        assert_eq!(missing.to_string(), "ids not found in taxonomy: 30");

        let io = CliError::from(InfraError::io(
            "stdout",
            std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"),
        ));
        assert_eq!(io.exit_code(), exitcode::IOERR);
    }
}
