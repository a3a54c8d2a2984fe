use crate::schema::Mode;
use thiserror::Error;

/// Exit status for an unknown subcommand under the strict policy.
pub const EXIT_USAGE: i32 = 2;

/// Exit status when a collaborator reports a failed review.
pub const EXIT_REVIEW: i32 = 10;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("{mode} schema registers option '{name}' twice")]
    DuplicateName { mode: Mode, name: String },

    #[error("{mode} schema: flag '{flag}' is claimed by both '{first}' and '{second}'")]
    DuplicateFlag {
        mode: Mode,
        flag: String,
        first: String,
        second: String,
    },

    #[error("{mode} schema: flag '{flag}' of '{name}' is reserved")]
    ReservedFlag {
        mode: Mode,
        flag: String,
        name: String,
    },
}

/// Everything that can go wrong before a collaborator is called.
#[derive(Debug, Error)]
pub enum CliError {
    /// Rendered by clap: unknown flag, bad value, missing dataset, or a help request.
    #[error(transparent)]
    Usage(#[from] clap::Error),

    #[error("unknown subcommand '{token}', available commands: {available}")]
    UnknownSubcommand { token: String, available: String },
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(e) => e.exit_code(),
            CliError::UnknownSubcommand { .. } => EXIT_USAGE,
        }
    }
}

/// Dispatch failure. Collaborator errors pass through untouched.
#[derive(Debug, Error)]
pub enum DispatchError<E: std::error::Error + 'static> {
    #[error(transparent)]
    Cli(#[from] CliError),

    #[error(transparent)]
    Review(E),
}

impl<E: std::error::Error + 'static> DispatchError<E> {
    pub fn exit_code(&self) -> i32 {
        match self {
            DispatchError::Cli(e) => e.exit_code(),
            DispatchError::Review(_) => EXIT_REVIEW,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct EngineDown;

    impl fmt::Display for EngineDown {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("engine down")
        }
    }

    impl std::error::Error for EngineDown {}

    #[test]
    fn exit_codes_follow_failure_class() {
        let unknown: DispatchError<EngineDown> = CliError::UnknownSubcommand {
            token: "train".into(),
            available: "oracle, simulate".into(),
        }
        .into();
        assert_eq!(unknown.exit_code(), 2);

        let review: DispatchError<EngineDown> = DispatchError::Review(EngineDown);
        assert_eq!(review.exit_code(), 10);
    }

    #[test]
    fn schema_errors_name_the_mode() {
        let err = SchemaError::DuplicateName {
            mode: Mode::Simulate,
            name: "model".into(),
        };
        assert_eq!(err.to_string(), "simulate schema registers option 'model' twice");
    }

    #[test]
    fn review_errors_render_unchanged() {
        let review: DispatchError<EngineDown> = DispatchError::Review(EngineDown);
        assert_eq!(review.to_string(), "engine down");
    }
}
