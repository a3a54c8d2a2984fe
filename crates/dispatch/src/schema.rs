//! Declarative option schema.
//!
//! An [`OptionSpec`] describes one configurable parameter: its canonical
//! name, flags, value kind, default and the modes it is registered in.
//! A [`ModeSchema`] is the concrete set of specs visible for one mode; it is
//! built fresh per invocation and turned into a clap command on demand.

use crate::error::SchemaError;
use clap::{value_parser, Arg, ArgAction, Command};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Canonical name of the positional dataset path.
pub const DATASET_KEY: &str = "dataset";

/// Flags clap registers on every command.
const RESERVED_FLAGS: [&str; 2] = ["-h", "--help"];

/// Primary operating mode, selected by the first command-line token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Interactive screening with a human oracle.
    Oracle,
    /// Non-interactive replay against a fully labelled dataset.
    Simulate,
}

impl Mode {
    pub const ALL: [Mode; 2] = [Mode::Oracle, Mode::Simulate];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Oracle => "oracle",
            Mode::Simulate => "simulate",
        }
    }

    /// Program name shown in usage and error messages.
    pub fn prog(&self) -> &'static str {
        match self {
            Mode::Oracle => "asreview oracle",
            Mode::Simulate => "asreview simulate",
        }
    }

    pub fn from_token(token: &str) -> Option<Mode> {
        Mode::ALL.into_iter().find(|m| m.as_str() == token)
    }

    /// Comma-separated list of mode names, for help and error text.
    pub fn available() -> String {
        Mode::ALL
            .iter()
            .map(Mode::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Str,
    Int,
    IntList,
    Flag,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    Single,
    ZeroOrMore,
}

/// A resolved option value. Serializes as a plain JSON value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    None,
    Flag(bool),
    Int(i64),
    IntList(Vec<i64>),
    Str(String),
}

/// One configurable parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionSpec {
    pub name: &'static str,
    pub short: Option<char>,
    pub long: &'static str,
    pub kind: ValueKind,
    pub cardinality: Cardinality,
    pub default: OptionValue,
    pub modes: &'static [Mode],
    pub help: String,
}

impl OptionSpec {
    /// A spec registered in every mode, defaulting to "absent".
    ///
    /// List kinds take zero or more values; flags default to `false`.
    pub fn new(name: &'static str, long: &'static str, kind: ValueKind) -> Self {
        let cardinality = match kind {
            ValueKind::IntList => Cardinality::ZeroOrMore,
            _ => Cardinality::Single,
        };
        let default = match kind {
            ValueKind::Flag => OptionValue::Flag(false),
            _ => OptionValue::None,
        };
        Self {
            name,
            short: None,
            long,
            kind,
            cardinality,
            default,
            modes: &Mode::ALL,
            help: String::new(),
        }
    }

    pub fn short(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }

    pub fn default_value(mut self, default: OptionValue) -> Self {
        self.default = default;
        self
    }

    pub fn only(mut self, modes: &'static [Mode]) -> Self {
        self.modes = modes;
        self
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    pub fn is_visible_in(&self, mode: Mode) -> bool {
        self.modes.contains(&mode)
    }

    /// All spellings of this option, short form first.
    pub fn aliases(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(2);
        if let Some(c) = self.short {
            out.push(format!("-{c}"));
        }
        out.push(format!("--{}", self.long));
        out
    }

    /// clap argument for this spec.
    ///
    /// Defaults are not registered with clap; the parser resolves them from
    /// `self.default` so every key is filled the same way.
    pub fn to_arg(&self) -> Arg {
        let mut arg = Arg::new(self.name)
            .long(self.long)
            .help(self.help.clone());
        if let Some(c) = self.short {
            arg = arg.short(c);
        }

        let arg = match self.kind {
            ValueKind::Flag => return arg.action(ArgAction::SetTrue),
            ValueKind::Str => arg.action(ArgAction::Set).value_parser(value_parser!(String)),
            ValueKind::Int | ValueKind::IntList => arg
                .action(ArgAction::Set)
                .value_parser(value_parser!(i64))
                .allow_negative_numbers(true),
        };

        match self.cardinality {
            Cardinality::Single => arg.num_args(1),
            Cardinality::ZeroOrMore => arg.num_args(0..),
        }
    }
}

/// The options visible for one mode.
#[derive(Debug, Clone, PartialEq)]
pub struct ModeSchema {
    pub mode: Mode,
    pub about: &'static str,
    pub dataset_help: &'static str,
    pub options: Vec<OptionSpec>,
}

impl ModeSchema {
    /// Canonical names in registration order, dataset excluded.
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.options.iter().map(|o| o.name)
    }

    pub fn find(&self, name: &str) -> Option<&OptionSpec> {
        self.options.iter().find(|o| o.name == name)
    }

    /// Check name and alias uniqueness.
    pub fn validate(&self) -> Result<(), SchemaError> {
        let mut names: Vec<&str> = vec![DATASET_KEY];
        let mut flags: HashMap<String, &str> = HashMap::new();

        for spec in &self.options {
            if names.contains(&spec.name) {
                return Err(SchemaError::DuplicateName {
                    mode: self.mode,
                    name: spec.name.to_string(),
                });
            }
            names.push(spec.name);

            for flag in spec.aliases() {
                if RESERVED_FLAGS.contains(&flag.as_str()) {
                    return Err(SchemaError::ReservedFlag {
                        mode: self.mode,
                        flag,
                        name: spec.name.to_string(),
                    });
                }
                if let Some(first) = flags.get(&flag) {
                    return Err(SchemaError::DuplicateFlag {
                        mode: self.mode,
                        flag,
                        first: first.to_string(),
                        second: spec.name.to_string(),
                    });
                }
                flags.insert(flag, spec.name);
            }
        }
        Ok(())
    }

    /// Fresh clap command for this schema.
    pub fn command(&self) -> Command {
        let dataset = Arg::new(DATASET_KEY)
            .value_name("X")
            .required(true)
            .value_parser(value_parser!(String))
            .help(self.dataset_help);

        self.options.iter().fold(
            Command::new(self.mode.prog())
                .about(self.about)
                .disable_version_flag(true)
                .args_override_self(true)
                .arg(dataset),
            |cmd, spec| cmd.arg(spec.to_arg()),
        )
    }
}
