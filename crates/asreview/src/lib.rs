// File: crates/asreview/src/lib.rs
//
// Process-level glue shared by the `asreview` and `asr` executables:
// logger setup, the collaborator handed to the dispatcher, and the mapping
// from dispatch outcomes to printed output and exit codes.

use asreview_dispatch::{
    CliError, Collaborators, ConfigDefaults, Configuration, DispatchError, Dispatcher, Mode,
    Outcome,
};
use serde::Serialize;
use std::ffi::OsString;
use std::io::{self, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The hand-off document for a review engine.
#[derive(Debug, Serialize)]
pub struct ReviewRequest<'a> {
    pub mode: Mode,
    pub dataset: &'a str,
    pub config: &'a Configuration,
}

/// Collaborator that passes each validated review request downstream as one
/// JSON document.
pub struct RequestEmitter<W: Write> {
    out: W,
}

impl<W: Write> RequestEmitter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(
        &mut self,
        mode: Mode,
        dataset: &str,
        config: &Configuration,
    ) -> Result<(), LaunchError> {
        let request = ReviewRequest {
            mode,
            dataset,
            config,
        };
        log::info!("handing {mode} review of '{dataset}' to the engine");
        serde_json::to_writer_pretty(&mut self.out, &request)?;
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }
}

impl<W: Write> Collaborators for RequestEmitter<W> {
    type Error = LaunchError;

    fn review_oracle(&mut self, dataset: &str, config: Configuration) -> Result<(), LaunchError> {
        self.emit(Mode::Oracle, dataset, &config)
    }

    fn review_simulate(&mut self, dataset: &str, config: Configuration) -> Result<(), LaunchError> {
        self.emit(Mode::Simulate, dataset, &config)
    }
}

/// Dispatch one invocation (program name excluded) and return the exit code.
pub fn run<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let dispatcher = Dispatcher::new(ConfigDefaults::default());
    let mut emitter = RequestEmitter::new(io::stdout());
    let result = dispatcher.run(args, &mut emitter);
    report(result, &mut io::stdout(), &mut io::stderr())
}

/// Print whatever the outcome calls for and map it to an exit code.
pub fn report<E: std::error::Error + 'static>(
    result: Result<Outcome, DispatchError<E>>,
    out: &mut impl Write,
    err: &mut impl Write,
) -> i32 {
    match result {
        Ok(Outcome::Reviewed(mode)) => {
            log::debug!("{mode} review finished");
            0
        }
        Ok(Outcome::Version(version)) => {
            let _ = writeln!(out, "{version}");
            0
        }
        Ok(Outcome::Hint(hint)) => {
            let _ = writeln!(out, "{hint}");
            0
        }
        Err(e) => {
            let code = e.exit_code();
            match &e {
                // clap renders usage and help itself; help goes to stdout.
                DispatchError::Cli(CliError::Usage(usage)) => {
                    let rendered = usage.render();
                    let _ = if code == 0 {
                        write!(out, "{rendered}")
                    } else {
                        write!(err, "{rendered}")
                    };
                }
                DispatchError::Cli(other) => {
                    let _ = writeln!(err, "asreview: {other}");
                }
                DispatchError::Review(review) => {
                    let _ = writeln!(err, "asreview: review failed: {review}");
                }
            }
            code
        }
    }
}

/// Write a user-facing notice to `err`. Unlike `log::warn!`, this is not
/// subject to the `RUST_LOG` filter.
pub fn print_notice(notice: &str, err: &mut impl Write) {
    let _ = writeln!(err, "warning: {notice}");
}

pub fn init_logging() {
    // Timestamp-free format keeps output stable; RUST_LOG still overrides the level.
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));

    builder.format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()));

    let _ = builder.try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use asreview_dispatch::UnknownSubcommandPolicy;
    use pretty_assertions::assert_eq;

    fn launch(dispatcher: &Dispatcher, args: &[&str]) -> (i32, String, String, String) {
        let mut emitter = RequestEmitter::new(Vec::new());
        let result = dispatcher.run(args.iter().copied(), &mut emitter);

        let (mut out, mut err) = (Vec::new(), Vec::new());
        let code = report(result, &mut out, &mut err);
        (
            code,
            String::from_utf8(emitter.into_inner()).unwrap(),
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    #[test]
    fn review_request_is_a_single_json_document() {
        let (code, request, out, err) = launch(
            &Dispatcher::default(),
            &["simulate", "papers.csv", "--prior_included", "1", "2", "3"],
        );
        assert_eq!(code, 0);
        assert_eq!(out, "");
        assert_eq!(err, "");

        let doc: serde_json::Value = serde_json::from_str(&request).unwrap();
        assert_eq!(doc["mode"], "simulate");
        assert_eq!(doc["dataset"], "papers.csv");
        assert_eq!(doc["config"]["model"], "lstm_pool");
        assert_eq!(doc["config"]["prior_included"], serde_json::json!([1, 2, 3]));
        assert_eq!(doc["config"]["prior_excluded"], serde_json::Value::Null);
        assert_eq!(doc["config"]["n_prior_included"], 10);
        assert!(doc["config"].get("dataset").is_none());
    }

    #[test]
    fn version_prints_exactly_the_version() {
        let (code, request, out, _) = launch(&Dispatcher::default().with_version("9.9.9"), &["-V"]);
        assert_eq!(code, 0);
        assert_eq!(out, "9.9.9\n");
        assert_eq!(request, "");
    }

    #[test]
    fn no_arguments_prints_hint() {
        let (code, request, out, _) = launch(&Dispatcher::default(), &[]);
        assert_eq!(code, 0);
        assert_eq!(out, "Use 'asreview -h' to view help.\n");
        assert_eq!(request, "");
    }

    #[test]
    fn usage_errors_go_to_stderr_with_exit_two() {
        let (code, request, out, err) = launch(&Dispatcher::default(), &["oracle"]);
        assert_eq!(code, 2);
        assert_eq!(out, "");
        assert_eq!(request, "");
        assert!(err.contains("Usage: asreview oracle"), "{err}");
    }

    #[test]
    fn help_goes_to_stdout_with_exit_zero() {
        let (code, _, out, err) = launch(&Dispatcher::default(), &["simulate", "--help"]);
        assert_eq!(code, 0);
        assert_eq!(err, "");
        assert!(out.contains("--n_prior_included"), "{out}");
        assert!(out.contains("Systematic review with the help of an oracle."));
    }

    #[test]
    fn rejected_subcommand_is_reported() {
        let dispatcher = Dispatcher::default().with_policy(UnknownSubcommandPolicy::Reject);
        let (code, _, out, err) = launch(&dispatcher, &["train"]);
        assert_eq!(code, 2);
        assert_eq!(out, "");
        assert_eq!(
            err,
            "asreview: unknown subcommand 'train', available commands: oracle, simulate\n"
        );
    }

    #[test]
    fn rename_notice_is_written_without_a_logger() {
        // No logger is installed in unit tests, so log::warn! would print nothing.
        let mut err = Vec::new();
        let code = asreview_dispatch::with_deprecation_notice(
            asreview_dispatch::LEGACY_RENAME_NOTICE,
            |notice| print_notice(notice, &mut err),
            || 0,
        );
        assert_eq!(code, 0);
        assert_eq!(
            String::from_utf8(err).unwrap(),
            "warning: 'asr' has been renamed to 'asreview', it will be removed in the future.\n"
        );
    }

    #[test]
    fn engine_failures_exit_ten() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "engine gone"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let mut emitter = RequestEmitter::new(Broken);
        let result = Dispatcher::default().run(["oracle", "papers.csv"], &mut emitter);
        let (mut out, mut err) = (Vec::new(), Vec::new());
        let code = report(result, &mut out, &mut err);

        assert_eq!(code, 10);
        let err = String::from_utf8(err).unwrap();
        assert!(err.starts_with("asreview: review failed:"), "{err}");
        assert!(err.contains("engine gone"), "{err}");
    }
}
