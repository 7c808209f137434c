use std::process;

use log::error;

use uavprep::commands::{build_cli, settings_from_args, CommandFactory, UavPrepCommandFactory};
use uavprep::processing::{CancellationToken, ProcessingError};
use uavprep::utils::logger::Logger;

const EXIT_FAILURE: i32 = 1;
const EXIT_CANCELLED: i32 = 2;

fn report_failure(e: &ProcessingError) -> ! {
    if e.is_cancelled() {
        error!("{}", e);
        eprintln!("operation cancelled");
        process::exit(EXIT_CANCELLED);
    }

    error!("Command execution error: {}", e);
    eprintln!("operation failed: {}", e);
    process::exit(EXIT_FAILURE);
}

fn main() {
    let matches = build_cli().get_matches();

    let settings = match settings_from_args(&matches) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("operation failed: {}", e);
            process::exit(EXIT_FAILURE);
        }
    };

    if let Err(e) = Logger::init_global_logger(settings.log_file.as_deref(), settings.verbose()) {
        eprintln!("Error setting up global logger: {}", e);
        process::exit(EXIT_FAILURE);
    }

    // Nothing in the binary cancels this token, so exit code 2 is only reached
    // by library callers that share a token with the run.
    let factory = UavPrepCommandFactory::new(settings, CancellationToken::new());

    let command = match factory.create_command(&matches) {
        Ok(command) => command,
        Err(e) => report_failure(&e),
    };

    if let Err(e) = command.execute() {
        report_failure(&e);
    }
}
