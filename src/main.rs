// SPDX-License-Identifier: MPL-2.0
use fbplay::cli::{self, Invocation};
use std::process::ExitCode;

fn main() -> ExitCode {
    fbplay::logging::init();

    let options = match cli::parse(std::env::args_os().skip(1).collect()) {
        Ok(Invocation::Play(options)) => options,
        Ok(Invocation::Help) => {
            print!("{}", cli::USAGE);
            return ExitCode::SUCCESS;
        }
        Err(err) => {
            eprintln!("fbplay: {err}\n\n{}", cli::USAGE);
            return ExitCode::FAILURE;
        }
    };

    match fbplay::app::run(&options) {
        Ok(reason) => {
            log::debug!("stopped: {reason:?}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("fbplay: {err}");
            ExitCode::FAILURE
        }
    }
}
