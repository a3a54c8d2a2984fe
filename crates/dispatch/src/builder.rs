//! Mode schema assembly.
//!
//! Every mode starts from the same base option set. Mode-specific options
//! come from an extension table keyed by mode, so adding an option to one
//! mode never touches the shared list.

use crate::defaults::ConfigDefaults;
use crate::schema::{Mode, ModeSchema, OptionSpec, OptionValue, ValueKind};
use clap::{value_parser, Arg, Command};

/// Program name of the bare (no mode) parser.
pub const BARE_PROG: &str = "asreview";

const MODE_ABOUT: &str = "Systematic review with the help of an oracle.";
const BARE_ABOUT: &str = "Automated Systematic Review.";
const DATASET_HELP: &str =
    "File path to the dataset. The dataset needs to be in the standardised format.";

const SIMULATE_ONLY: [Mode; 1] = [Mode::Simulate];

#[derive(Debug, Clone, Default)]
pub struct SchemaBuilder {
    defaults: ConfigDefaults,
}

impl SchemaBuilder {
    pub fn new(defaults: ConfigDefaults) -> Self {
        Self { defaults }
    }

    /// Options registered in every mode, in registration order.
    pub fn base_options(&self) -> Vec<OptionSpec> {
        let d = &self.defaults;
        vec![
            OptionSpec::new("model", "model", ValueKind::Str)
                .short('m')
                .default_value(OptionValue::Str(d.model.clone()))
                .help(format!(
                    "The prediction model for Active Learning. Default '{}'.",
                    d.model
                )),
            OptionSpec::new("query_strategy", "query_strategy", ValueKind::Str)
                .short('q')
                .default_value(OptionValue::Str(d.query_strategy.clone()))
                .help(format!(
                    "The query strategy for Active Learning. Default '{}'.",
                    d.query_strategy
                )),
            OptionSpec::new("balance_strategy", "balance_strategy", ValueKind::Str)
                .short('b')
                .default_value(OptionValue::Str(d.balance_strategy.clone()))
                .help(format!(
                    "Data rebalancing strategy mainly for RNN methods. Helps against imbalanced \
                     dataset with few inclusions and many exclusions. Default '{}'.",
                    d.balance_strategy
                )),
            OptionSpec::new("n_instances", "n_instances", ValueKind::Int)
                .default_value(OptionValue::Int(d.n_instances))
                .help(format!(
                    "Number of papers queried each query. Default {}.",
                    d.n_instances
                )),
            OptionSpec::new("n_queries", "n_queries", ValueKind::Int)
                .help(
                    "The number of queries. By default, the review runs until all papers are \
                     labelled.",
                ),
            OptionSpec::new("embedding_fp", "embedding", ValueKind::Str)
                .help("File path of embedding matrix. Required for LSTM model."),
            OptionSpec::new("config_file", "config_file", ValueKind::Str)
                .help("Configuration file with model parameters."),
            OptionSpec::new("src_log_fp", "session-from-log", ValueKind::Str)
                .short('s')
                .help("Continue session starting from previous log file."),
            OptionSpec::new("prior_included", "prior_included", ValueKind::IntList)
                .help("Initial included papers."),
            OptionSpec::new("prior_excluded", "prior_excluded", ValueKind::IntList)
                .help("Initial excluded papers."),
            OptionSpec::new("log_file", "log_file", ValueKind::Str)
                .short('l')
                .help("Location to store the log results."),
            OptionSpec::new("save_model_fp", "save_model", ValueKind::Str).help(
                "Location to store the model and weights. Only works for Keras/RNN models. \
                 End file extension with '.json'.",
            ),
            OptionSpec::new("verbose", "verbose", ValueKind::Int)
                .short('v')
                .default_value(OptionValue::Int(d.verbose))
                .help("Verbosity."),
        ]
    }

    /// Mode-keyed extension table.
    pub fn extension_table(&self) -> Vec<(Mode, Vec<OptionSpec>)> {
        let d = &self.defaults;
        vec![
            (Mode::Oracle, Vec::new()),
            (
                Mode::Simulate,
                vec![
                    OptionSpec::new("n_prior_included", "n_prior_included", ValueKind::Int)
                        .only(&SIMULATE_ONLY)
                        .default_value(OptionValue::Int(d.n_prior_included))
                        .help(format!(
                            "Sample n prior included papers. Only used when --prior_included \
                             is not given. Default {}.",
                            d.n_prior_included
                        )),
                    OptionSpec::new("n_prior_excluded", "n_prior_excluded", ValueKind::Int)
                        .only(&SIMULATE_ONLY)
                        .default_value(OptionValue::Int(d.n_prior_excluded))
                        .help(format!(
                            "Sample n prior excluded papers. Only used when --prior_excluded \
                             is not given. Default {}.",
                            d.n_prior_excluded
                        )),
                ],
            ),
        ]
    }

    /// Options the extension table adds for `mode`.
    pub fn extensions(&self, mode: Mode) -> Vec<OptionSpec> {
        self.extension_table()
            .into_iter()
            .filter(|(m, _)| *m == mode)
            .flat_map(|(_, specs)| specs)
            .collect()
    }

    /// Assemble the schema for `mode`: base options, then its extensions.
    /// Specs not visible in `mode` are left out.
    pub fn build(&self, mode: Mode) -> ModeSchema {
        let options = self
            .base_options()
            .into_iter()
            .chain(self.extensions(mode))
            .filter(|spec| spec.is_visible_in(mode))
            .collect();

        let schema = ModeSchema {
            mode,
            about: MODE_ABOUT,
            dataset_help: DATASET_HELP,
            options,
        };
        debug_assert_eq!(schema.validate(), Ok(()));
        schema
    }

    /// Version flag of the bare parser.
    pub fn version_option(&self) -> OptionSpec {
        OptionSpec::new("version", "version", ValueKind::Flag)
            .short('V')
            .help("Print the ASReview version number and exit.")
    }

    /// Minimal parser used when no mode token leads the invocation:
    /// an optional subcommand name plus the version flag.
    pub fn bare_command(&self) -> Command {
        Command::new(BARE_PROG)
            .about(BARE_ABOUT)
            .disable_version_flag(true)
            .args_override_self(true)
            .arg(
                Arg::new("subcommand")
                    .required(false)
                    .value_parser(value_parser!(String))
                    .help(format!(
                        "The subcommand to launch. Available commands: {}",
                        Mode::available()
                    )),
            )
            .arg(self.version_option().to_arg())
    }
}
