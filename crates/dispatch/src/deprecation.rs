//! Legacy entry point support.

/// Notice emitted when the tool is started under its old name.
pub const LEGACY_RENAME_NOTICE: &str =
    "'asr' has been renamed to 'asreview', it will be removed in the future.";

/// Emit `notice` once through `warn`, then run `entry` unchanged.
///
/// Wrapping instead of branching inside the dispatcher keeps the legacy
/// name removable on its own.
pub fn with_deprecation_notice<W, F, T>(notice: &str, warn: W, entry: F) -> T
where
    W: FnOnce(&str),
    F: FnOnce() -> T,
{
    warn(notice);
    entry()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{Collaborators, Dispatcher, Outcome};
    use crate::parser::Configuration;
    use crate::schema::Mode;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::convert::Infallible;

    #[derive(Default)]
    struct Calls(Vec<(Mode, String, Configuration)>);

    impl Collaborators for Calls {
        type Error = Infallible;

        fn review_oracle(
            &mut self,
            dataset: &str,
            config: Configuration,
        ) -> Result<(), Infallible> {
            self.0.push((Mode::Oracle, dataset.into(), config));
            Ok(())
        }

        fn review_simulate(
            &mut self,
            dataset: &str,
            config: Configuration,
        ) -> Result<(), Infallible> {
            self.0.push((Mode::Simulate, dataset.into(), config));
            Ok(())
        }
    }

    #[test]
    fn notice_is_emitted_once_before_entry() {
        let events = RefCell::new(Vec::new());
        let out = with_deprecation_notice(
            LEGACY_RENAME_NOTICE,
            |notice| events.borrow_mut().push(format!("warn: {notice}")),
            || {
                events.borrow_mut().push("entry".to_string());
                7
            },
        );

        assert_eq!(out, 7);
        assert_eq!(
            events.into_inner(),
            vec![
                format!("warn: {LEGACY_RENAME_NOTICE}"),
                "entry".to_string()
            ]
        );
    }

    #[test]
    fn legacy_entry_matches_current_entry() {
        let args = ["simulate", "papers.csv", "--n_prior_included", "2", "-v", "3"];
        let dispatcher = Dispatcher::default();

        let mut current = Calls::default();
        let expected = dispatcher.run(args, &mut current).unwrap();

        let mut warnings = Vec::new();
        let mut legacy = Calls::default();
        let got = with_deprecation_notice(
            LEGACY_RENAME_NOTICE,
            |notice| warnings.push(notice.to_string()),
            || dispatcher.run(args, &mut legacy),
        )
        .unwrap();

        assert_eq!(got, expected);
        assert_eq!(got, Outcome::Reviewed(Mode::Simulate));
        assert_eq!(legacy.0, current.0);
        assert_eq!(warnings, vec![LEGACY_RENAME_NOTICE.to_string()]);
    }

    #[test]
    fn entry_errors_pass_through() {
        let mut calls = Calls::default();
        let err = with_deprecation_notice(LEGACY_RENAME_NOTICE, |_| {}, || {
            Dispatcher::default().run(["oracle"], &mut calls)
        })
        .unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(calls.0.is_empty());
    }
}
