// File: crates/conformance/src/lib.rs
//
// Conformance harness for asreview command dispatch.
//
// Purpose:
// - Run argv fixtures through the dispatcher deterministically
// - Record which collaborator was called and with what configuration
// - Compare invocation traces against golden expectations
//
// Collaborators are replaced by a recorder; no review engine runs here.

use asreview_dispatch::{
    with_deprecation_notice, CliError, Collaborators, Configuration, DispatchError, Dispatcher,
    Mode, Outcome, UnknownSubcommandPolicy, LEGACY_RENAME_NOTICE,
};
use clap::error::ErrorKind;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConformanceError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("golden mismatch: {0}")]
    GoldenMismatch(String),

    #[error("fixture invalid: {0}")]
    FixtureInvalid(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fixture {
    pub name: String,

    /// Executable name the invocation goes through: `asreview` or `asr`.
    #[serde(default = "default_entry")]
    pub entry: String,

    /// Arguments after the program name.
    #[serde(default)]
    pub argv: Vec<String>,

    #[serde(default = "default_policy")]
    pub policy: String,

    /// Make the recorded collaborator fail after recording the call.
    #[serde(default)]
    pub review_fails: bool,

    #[serde(default)]
    pub expect_trace: Option<String>,

    #[serde(default)]
    pub expect_error: Option<String>,
}

fn default_entry() -> String {
    "asreview".into()
}
fn default_policy() -> String {
    "hint".into()
}

impl Fixture {
    pub fn base_dir(&self, fixture_file: &Path) -> PathBuf {
        fixture_file
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn expect_trace_path(&self, fixture_file: &Path) -> Result<PathBuf, ConformanceError> {
        let rel = self
            .expect_trace
            .as_ref()
            .ok_or_else(|| ConformanceError::FixtureInvalid("missing expect_trace".into()))?;
        Ok(self.base_dir(fixture_file).join(rel))
    }

    pub fn expect_error_path(&self, fixture_file: &Path) -> Result<PathBuf, ConformanceError> {
        let rel = self
            .expect_error
            .as_ref()
            .ok_or_else(|| ConformanceError::FixtureInvalid("missing expect_error".into()))?;
        Ok(self.base_dir(fixture_file).join(rel))
    }

    pub fn is_legacy(&self) -> Result<bool, ConformanceError> {
        match self.entry.as_str() {
            "asreview" => Ok(false),
            "asr" => Ok(true),
            other => Err(ConformanceError::FixtureInvalid(format!(
                "fixture '{}' has unknown entry '{}'",
                self.name, other
            ))),
        }
    }

    pub fn subcommand_policy(&self) -> Result<UnknownSubcommandPolicy, ConformanceError> {
        match self.policy.as_str() {
            "hint" => Ok(UnknownSubcommandPolicy::Hint),
            "reject" => Ok(UnknownSubcommandPolicy::Reject),
            other => Err(ConformanceError::FixtureInvalid(format!(
                "fixture '{}' has unknown policy '{}'",
                self.name, other
            ))),
        }
    }

    pub fn validate(&self) -> Result<(), ConformanceError> {
        match (self.expect_trace.is_some(), self.expect_error.is_some()) {
            (true, false) | (false, true) => Ok(()),
            (false, false) => Err(ConformanceError::FixtureInvalid(format!(
                "fixture '{}' must specify exactly one of expect_trace or expect_error",
                self.name
            ))),
            (true, true) => Err(ConformanceError::FixtureInvalid(format!(
                "fixture '{}' must not specify both expect_trace and expect_error",
                self.name
            ))),
        }
    }
}

/// One collaborator call as seen by the recorder.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecordedCall {
    pub collaborator: Mode,
    pub dataset: String,
    pub config: Configuration,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TraceError {
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<E: std::error::Error + 'static> From<&DispatchError<E>> for TraceError {
    fn from(e: &DispatchError<E>) -> Self {
        // clap's rendered text is not part of the trace; its kind is.
        let (kind, message) = match e {
            DispatchError::Cli(CliError::Usage(usage)) => {
                let kind = match usage.kind() {
                    ErrorKind::UnknownArgument => "UnknownFlag",
                    ErrorKind::MissingRequiredArgument => "MissingArgument",
                    ErrorKind::ValueValidation | ErrorKind::InvalidValue => "InvalidValue",
                    ErrorKind::DisplayHelp => "HelpRequested",
                    _ => "Usage",
                };
                (kind, None)
            }
            DispatchError::Cli(other @ CliError::UnknownSubcommand { .. }) => {
                ("UnknownSubcommand", Some(other.to_string()))
            }
            DispatchError::Review(review) => ("Review", Some(review.to_string())),
        };
        Self {
            kind: kind.to_string(),
            message,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SuccessTrace {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,

    /// `reviewed`, `version` or `hint`.
    pub outcome: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub printed: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call: Option<RecordedCall>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FailureTrace {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,

    pub error: TraceError,

    pub exit_code: i32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call: Option<RecordedCall>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum InvocationTrace {
    Failure(FailureTrace),
    Success(SuccessTrace),
}

#[derive(Debug, Error)]
#[error("review refused by fixture")]
pub struct FixtureRefusal;

#[derive(Debug, Default)]
struct Recorder {
    fail: bool,
    calls: Vec<RecordedCall>,
}

impl Recorder {
    fn record(
        &mut self,
        mode: Mode,
        dataset: &str,
        config: Configuration,
    ) -> Result<(), FixtureRefusal> {
        self.calls.push(RecordedCall {
            collaborator: mode,
            dataset: dataset.to_string(),
            config,
        });
        if self.fail {
            Err(FixtureRefusal)
        } else {
            Ok(())
        }
    }
}

impl Collaborators for Recorder {
    type Error = FixtureRefusal;

    fn review_oracle(
        &mut self,
        dataset: &str,
        config: Configuration,
    ) -> Result<(), FixtureRefusal> {
        self.record(Mode::Oracle, dataset, config)
    }

    fn review_simulate(
        &mut self,
        dataset: &str,
        config: Configuration,
    ) -> Result<(), FixtureRefusal> {
        self.record(Mode::Simulate, dataset, config)
    }
}

#[derive(Debug, Clone, Default)]
pub struct RunnerConfig {
    pub bless: bool,
}

pub struct Runner {
    cfg: RunnerConfig,
}

impl Runner {
    pub fn new(cfg: RunnerConfig) -> Self {
        Self { cfg }
    }

    pub fn load_fixture(path: impl AsRef<Path>) -> Result<Fixture, ConformanceError> {
        let bytes = fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub fn run_fixture(&self, fixture: &Fixture) -> Result<InvocationTrace, ConformanceError> {
        let dispatcher = Dispatcher::default().with_policy(fixture.subcommand_policy()?);
        let mut recorder = Recorder {
            fail: fixture.review_fails,
            calls: Vec::new(),
        };
        let mut warnings = Vec::new();

        let result = if fixture.is_legacy()? {
            with_deprecation_notice(
                LEGACY_RENAME_NOTICE,
                |notice| warnings.push(notice.to_string()),
                || dispatcher.run(fixture.argv.iter(), &mut recorder),
            )
        } else {
            dispatcher.run(fixture.argv.iter(), &mut recorder)
        };

        if recorder.calls.len() > 1 {
            return Err(ConformanceError::FixtureInvalid(format!(
                "fixture '{}' dispatched {} times",
                fixture.name,
                recorder.calls.len()
            )));
        }
        let call = recorder.calls.pop();

        Ok(match result {
            Ok(outcome) => {
                let (outcome, printed) = match outcome {
                    Outcome::Reviewed(_) => ("reviewed", None),
                    Outcome::Version(v) => ("version", Some(v)),
                    Outcome::Hint(h) => ("hint", Some(h)),
                };
                InvocationTrace::Success(SuccessTrace {
                    warnings,
                    outcome: outcome.to_string(),
                    printed,
                    call,
                })
            }
            Err(e) => InvocationTrace::Failure(FailureTrace {
                warnings,
                error: TraceError::from(&e),
                exit_code: e.exit_code(),
                call,
            }),
        })
    }

    pub fn assert_matches(
        &self,
        fixture_file: impl AsRef<Path>,
        fixture: &Fixture,
        produced: &InvocationTrace,
    ) -> Result<(), ConformanceError> {
        let fixture_file = fixture_file.as_ref();

        let golden_path = if fixture.expect_trace.is_some() {
            fixture.expect_trace_path(fixture_file)?
        } else {
            fixture.expect_error_path(fixture_file)?
        };

        if self.cfg.bless {
            fs::create_dir_all(golden_path.parent().unwrap_or_else(|| Path::new(".")))?;
            let s = serde_json::to_string_pretty(produced)?;
            fs::write(golden_path, s.as_bytes())?;
            return Ok(());
        }

        let golden_bytes = fs::read(&golden_path)?;
        let golden: InvocationTrace = serde_json::from_slice(&golden_bytes)?;

        if &golden != produced {
            let golden_s = serde_json::to_string_pretty(&golden)?;
            let produced_s = serde_json::to_string_pretty(produced)?;
            return Err(ConformanceError::GoldenMismatch(format!(
                "fixture '{}' produced trace does not match golden.\nfixture_file: {}\nargv: {:?}\nexpected: {}\n\n--- golden ---\n{}\n\n--- produced ---\n{}\n",
                fixture.name,
                fixture_file.display(),
                fixture.argv,
                golden_path.display(),
                golden_s,
                produced_s,
            )));
        }

        Ok(())
    }

    pub fn run_and_check(&self, fixture_file: impl AsRef<Path>) -> Result<(), ConformanceError> {
        let fixture_file = fixture_file.as_ref();
        let fixture = Self::load_fixture(fixture_file)?;
        fixture.validate()?;
        let produced = self.run_fixture(&fixture)?;

        // Success goldens live under expect_trace, failures under expect_error.
        let is_failure = matches!(produced, InvocationTrace::Failure(_));
        if !self.cfg.bless && is_failure != fixture.expect_error.is_some() {
            return Err(ConformanceError::GoldenMismatch(format!(
                "fixture '{}' {} but expects {}",
                fixture.name,
                if is_failure { "failed" } else { "succeeded" },
                if is_failure { "a trace" } else { "an error" },
            )));
        }

        self.assert_matches(fixture_file, &fixture, &produced)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fixture(json: &str) -> Fixture {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn fixture_defaults_to_current_entry_and_hint_policy() {
        let f = fixture(r#"{"name": "bare", "expect_trace": "golden/bare.json"}"#);
        assert!(!f.is_legacy().unwrap());
        assert_eq!(f.subcommand_policy().unwrap(), UnknownSubcommandPolicy::Hint);
        assert!(f.argv.is_empty());
        f.validate().unwrap();
    }

    #[test]
    fn fixture_needs_exactly_one_expectation() {
        assert!(fixture(r#"{"name": "none"}"#).validate().is_err());
        assert!(fixture(r#"{"name": "both", "expect_trace": "a", "expect_error": "b"}"#)
            .validate()
            .is_err());
    }

    #[test]
    fn unknown_entry_is_invalid() {
        let f = fixture(r#"{"name": "x", "entry": "asreview2", "expect_trace": "a"}"#);
        assert!(matches!(f.is_legacy(), Err(ConformanceError::FixtureInvalid(_))));
    }

    #[test]
    fn legacy_trace_differs_only_by_warning() {
        let runner = Runner::new(RunnerConfig::default());
        let current =
            fixture(r#"{"name": "c", "argv": ["oracle", "papers.csv"], "expect_trace": "a"}"#);
        let legacy = fixture(
            r#"{"name": "l", "entry": "asr", "argv": ["oracle", "papers.csv"], "expect_trace": "a"}"#,
        );

        let current = runner.run_fixture(&current).unwrap();
        let legacy = runner.run_fixture(&legacy).unwrap();

        match (current, legacy) {
            (InvocationTrace::Success(mut c), InvocationTrace::Success(l)) => {
                assert!(c.warnings.is_empty());
                assert_eq!(l.warnings, vec![LEGACY_RENAME_NOTICE.to_string()]);
                c.warnings = l.warnings.clone();
                assert_eq!(c, l);
            }
            other => panic!("unexpected traces: {other:?}"),
        }
    }

    #[test]
    fn failure_trace_round_trips_through_json() {
        let trace = InvocationTrace::Failure(FailureTrace {
            warnings: Vec::new(),
            error: TraceError {
                kind: "MissingArgument".into(),
                message: None,
            },
            exit_code: 2,
            call: None,
        });
        let s = serde_json::to_string(&trace).unwrap();
        assert_eq!(s, r#"{"error":{"kind":"MissingArgument"},"exit_code":2}"#);
        let back: InvocationTrace = serde_json::from_str(&s).unwrap();
        assert_eq!(back, trace);
    }
}
