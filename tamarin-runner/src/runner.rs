use std::path::{Path, PathBuf};

use tamarin_interpreter::{run_source, Environment, RunError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecuteError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("script failed: {0}")]
    Run(#[from] RunError),
}

/// Runs a script in a fresh global scope and prints what it evaluates to.
pub fn execute(path: &Path) -> Result<(), ExecuteError> {
    let source =
        std::fs::read_to_string(path).map_err(|source| ExecuteError::Read {
            path: path.to_owned(),
            source,
        })?;
    tracing::debug!(path = %path.display(), bytes = source.len(), "running script");

    let mut env = Environment::new();
    let (text, error) = run_source(&source, &mut env);
    print!("{}", text);

    match error {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}
