//! Blockpix - Command-line tool for turning images into adaptive pixel art

use std::process::ExitCode;

use blockpix::cli;

fn main() -> ExitCode {
    env_logger::init();
    cli::run()
}
