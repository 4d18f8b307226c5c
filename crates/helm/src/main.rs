use std::any::Any;
use std::panic;
use std::process::ExitCode;

use clap::Parser;
use helm::cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match panic::catch_unwind(|| helm::run(cli)) {
        Ok(Ok(code)) => code,
        Ok(Err(error)) => {
            eprintln!("fatal: {error:#}");
            ExitCode::FAILURE
        }
        Err(payload) => {
            eprintln!("fatal: {}", panic_message(payload.as_ref()));
            ExitCode::FAILURE
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "panic"
    }
}
