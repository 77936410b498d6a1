use pincho_core::{logging, PushError};

mod cli;

use crate::cli::CliCommand;

#[tokio::main]
async fn main() {
    // Initialize logging as early as possible; fall back to stderr if the
    // state dir is unusable.
    if let Err(e) = logging::init_logging() {
        logging::init_logging_stderr();
        tracing::warn!("file logging unavailable: {e:#}");
    }

    if let Err(err) = CliCommand::run_from_args().await {
        eprintln!("pincho error: {:#}", err);
        let code = match err.downcast_ref::<PushError>() {
            Some(PushError::Cancelled) => 130,
            _ => 1,
        };
        std::process::exit(code);
    }
}
