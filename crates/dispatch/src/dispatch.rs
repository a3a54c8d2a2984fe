//! Top-level routing of one invocation.
//!
//! The leading token picks the path:
//! - `oracle` / `simulate`: build that mode's schema, parse the rest and
//!   forward `(dataset, configuration)` to the matching collaborator
//! - anything else (or nothing): the bare parser, which only knows an
//!   optional subcommand name and `-V/--version`

use crate::builder::{SchemaBuilder, BARE_PROG};
use crate::defaults::ConfigDefaults;
use crate::error::{CliError, DispatchError};
use crate::parser::{self, Configuration};
use crate::schema::Mode;
use std::ffi::OsString;

pub const USAGE_HINT: &str = "Use 'asreview -h' to view help.";

/// The review engines a dispatch forwards to.
///
/// Both receive the dataset path positionally and every other resolved
/// option by canonical name.
pub trait Collaborators {
    type Error: std::error::Error + 'static;

    fn review_oracle(&mut self, dataset: &str, config: Configuration) -> Result<(), Self::Error>;

    fn review_simulate(&mut self, dataset: &str, config: Configuration) -> Result<(), Self::Error>;
}

/// How the bare path treats a token that is not a known mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnknownSubcommandPolicy {
    /// Same as no subcommand: print the usage hint and succeed.
    #[default]
    Hint,
    /// Fail with [`CliError::UnknownSubcommand`].
    Reject,
}

/// Terminal state of a successful dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The collaborator for this mode ran and returned.
    Reviewed(Mode),
    /// `-V/--version` was given; holds the text to print.
    Version(String),
    /// No mode was selected; holds the hint to print.
    Hint(String),
}

#[derive(Debug, Clone)]
pub struct Dispatcher {
    builder: SchemaBuilder,
    policy: UnknownSubcommandPolicy,
    version: String,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(ConfigDefaults::default())
    }
}

impl Dispatcher {
    pub fn new(defaults: ConfigDefaults) -> Self {
        Self {
            builder: SchemaBuilder::new(defaults),
            policy: UnknownSubcommandPolicy::default(),
            version: crate::VERSION.to_string(),
        }
    }

    pub fn with_policy(mut self, policy: UnknownSubcommandPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn policy(&self) -> UnknownSubcommandPolicy {
        self.policy
    }

    /// Dispatch one invocation. `args` excludes the program name.
    pub fn run<C, I, T>(
        &self,
        args: I,
        collaborators: &mut C,
    ) -> Result<Outcome, DispatchError<C::Error>>
    where
        C: Collaborators,
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let args: Vec<OsString> = args.into_iter().map(Into::into).collect();

        let mode = args
            .first()
            .and_then(|token| token.to_str())
            .and_then(Mode::from_token);

        match mode {
            Some(mode) => self.review(mode, &args[1..], collaborators),
            None => Ok(self.bare(&args)?),
        }
    }

    fn review<C: Collaborators>(
        &self,
        mode: Mode,
        rest: &[OsString],
        collaborators: &mut C,
    ) -> Result<Outcome, DispatchError<C::Error>> {
        let schema = self.builder.build(mode);
        let parsed = parser::parse(&schema, rest.iter().cloned())?;
        let (dataset, config) = parsed.into_parts();

        log::debug!("dispatching {mode} review of '{dataset}'");
        let result = match mode {
            Mode::Oracle => collaborators.review_oracle(&dataset, config),
            Mode::Simulate => collaborators.review_simulate(&dataset, config),
        };
        result.map_err(DispatchError::Review)?;

        Ok(Outcome::Reviewed(mode))
    }

    fn bare(&self, args: &[OsString]) -> Result<Outcome, CliError> {
        let argv = std::iter::once(OsString::from(BARE_PROG)).chain(args.iter().cloned());
        let matches = self.builder.bare_command().try_get_matches_from(argv)?;

        // Version wins over whatever subcommand token came with it.
        if matches.get_flag("version") {
            return Ok(Outcome::Version(self.version.clone()));
        }

        match matches.get_one::<String>("subcommand") {
            None => Ok(Outcome::Hint(USAGE_HINT.to_string())),
            Some(token) => match self.policy {
                UnknownSubcommandPolicy::Hint => {
                    log::debug!("'{token}' is not a subcommand, showing usage hint");
                    Ok(Outcome::Hint(USAGE_HINT.to_string()))
                }
                UnknownSubcommandPolicy::Reject => Err(CliError::UnknownSubcommand {
                    token: token.clone(),
                    available: Mode::available(),
                }),
            },
        }
    }
}
