mod repl;
mod runner;

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Script to run. Starts an interactive session when omitted.
    path: Option<PathBuf>,
    /// Log filter, e.g. `tamarin_interpreter=trace`. Falls back to `RUST_LOG`.
    #[arg(long, value_name = "FILTER")]
    log: Option<String>,
}

fn init_tracing(directives: Option<&str>) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = match directives {
        Some(directives) => EnvFilter::new(directives),
        None if std::env::var(EnvFilter::DEFAULT_ENV).is_ok() => EnvFilter::from_default_env(),
        None => return,
    };
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_level(true),
        )
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log.as_deref());

    match cli.path {
        None => match repl::start() {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                eprintln!("Error: {}", err);
                ExitCode::FAILURE
            }
        },
        Some(path) => match runner::execute(&path) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                eprintln!("{}", err);
                ExitCode::FAILURE
            }
        },
    }
}
