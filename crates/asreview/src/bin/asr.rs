// File: crates/asreview/src/bin/asr.rs
//
// Legacy `asr` executable. Same behavior as `asreview`, plus a rename notice.

use asreview_dispatch::{with_deprecation_notice, LEGACY_RENAME_NOTICE};

fn main() {
    asreview_launch::init_logging();

    let code = with_deprecation_notice(
        LEGACY_RENAME_NOTICE,
        |notice| asreview_launch::print_notice(notice, &mut std::io::stderr()),
        || asreview_launch::run(std::env::args_os().skip(1)),
    );
    std::process::exit(code);
}
