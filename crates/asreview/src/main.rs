// File: crates/asreview/src/main.rs

fn main() {
    asreview_launch::init_logging();

    let code = asreview_launch::run(std::env::args_os().skip(1));
    std::process::exit(code);
}
