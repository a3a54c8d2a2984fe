//! ASReview command dispatch: turns process arguments into a validated review
//! configuration and routes it to the right collaborator.
//!
//! The flow for one invocation:
//! - the leading token selects `oracle`, `simulate`, or the bare path
//! - [`SchemaBuilder`] assembles the option schema for that mode
//! - [`parser::parse`] resolves the remaining arguments against it
//! - [`Dispatcher`] strips the dataset path and forwards the rest
//!
//! This crate contains NO active-learning logic and NO process handling.
//! Review engines plug in through the [`Collaborators`] trait.

pub mod builder;
pub mod defaults;
pub mod deprecation;
pub mod dispatch;
pub mod error;
pub mod parser;
pub mod schema;

pub use builder::SchemaBuilder;
pub use defaults::ConfigDefaults;
pub use deprecation::{with_deprecation_notice, LEGACY_RENAME_NOTICE};
pub use dispatch::{Collaborators, Dispatcher, Outcome, UnknownSubcommandPolicy, USAGE_HINT};
pub use error::{CliError, DispatchError, SchemaError};
pub use parser::{Configuration, ParsedConfiguration};
pub use schema::{Cardinality, Mode, ModeSchema, OptionSpec, OptionValue, ValueKind};

/// Version string printed verbatim by `-V/--version`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
