//! Invocation parsing against a [`ModeSchema`].
//!
//! On success every schema key resolves to either the supplied value or the
//! spec's default. On failure nothing partial is returned; the clap error
//! carries the usage text for the caller to print.

use crate::error::CliError;
use crate::schema::{ModeSchema, OptionSpec, OptionValue, ValueKind, DATASET_KEY};
use clap::parser::ValueSource;
use clap::ArgMatches;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;

/// Resolved options keyed by canonical name, in schema order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Configuration(IndexMap<String, OptionValue>);

impl Configuration {
    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.0.get(name)
    }

    pub fn str(&self, name: &str) -> Option<&str> {
        match self.0.get(name) {
            Some(OptionValue::Str(s)) => Some(s),
            _ => None,
        }
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        match self.0.get(name) {
            Some(OptionValue::Int(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn int_list(&self, name: &str) -> Option<&[i64]> {
        match self.0.get(name) {
            Some(OptionValue::IntList(v)) => Some(v),
            _ => None,
        }
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

}

impl FromIterator<(String, OptionValue)> for Configuration {
    fn from_iter<I: IntoIterator<Item = (String, OptionValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Outcome of a successful parse: the dataset path plus every schema option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfiguration {
    dataset: String,
    options: Configuration,
}

impl ParsedConfiguration {
    pub fn dataset(&self) -> &str {
        &self.dataset
    }

    /// Look up any key, including `dataset`.
    pub fn get(&self, name: &str) -> Option<OptionValue> {
        if name == DATASET_KEY {
            return Some(OptionValue::Str(self.dataset.clone()));
        }
        self.options.get(name).cloned()
    }

    pub fn options(&self) -> &Configuration {
        &self.options
    }

    /// Strip the dataset path, which collaborators take positionally.
    pub fn into_parts(self) -> (String, Configuration) {
        (self.dataset, self.options)
    }
}

/// Parse `args` (everything after the mode token) against `schema`.
pub fn parse<I, T>(schema: &ModeSchema, args: I) -> Result<ParsedConfiguration, CliError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let argv = std::iter::once(OsString::from(schema.mode.prog()))
        .chain(args.into_iter().map(Into::into));
    let matches = schema.command().try_get_matches_from(argv)?;

    let dataset = match matches.get_one::<String>(DATASET_KEY) {
        Some(path) => path.clone(),
        None => {
            return Err(schema
                .command()
                .error(
                    clap::error::ErrorKind::MissingRequiredArgument,
                    "the dataset path is required",
                )
                .into())
        }
    };

    let options = schema
        .options
        .iter()
        .map(|spec| (spec.name.to_string(), resolve(spec, &matches)))
        .collect::<Configuration>();

    if let Some(path) = options.str("save_model_fp") {
        if !path.ends_with(".json") {
            log::warn!("--save_model '{path}' does not end in '.json'");
        }
    }

    log::debug!(
        "{}: dataset={dataset} options={}",
        schema.mode,
        schema.options.len()
    );

    Ok(ParsedConfiguration { dataset, options })
}

fn resolve(spec: &OptionSpec, matches: &ArgMatches) -> OptionValue {
    if matches.value_source(spec.name) != Some(ValueSource::CommandLine) {
        return spec.default.clone();
    }

    match spec.kind {
        ValueKind::Flag => OptionValue::Flag(matches.get_flag(spec.name)),
        ValueKind::Str => matches
            .get_one::<String>(spec.name)
            .cloned()
            .map(OptionValue::Str)
            .unwrap_or_else(|| spec.default.clone()),
        ValueKind::Int => matches
            .get_one::<i64>(spec.name)
            .copied()
            .map(OptionValue::Int)
            .unwrap_or_else(|| spec.default.clone()),
        // A bare `--prior_included` is an explicit empty list.
        ValueKind::IntList => OptionValue::IntList(
            matches
                .get_many::<i64>(spec.name)
                .map(|vals| vals.copied().collect())
                .unwrap_or_default(),
        ),
    }
}
