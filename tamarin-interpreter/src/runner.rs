use gc::Gc;
use tamarin_core::parser::{parse, ParseError};
use thiserror::Error;

use crate::builtins::Registry;
use crate::environment::Environment;
use crate::evaluator::Evaluator;
use crate::object::{EvaluationError, NativeResult, Object};

#[derive(Debug, PartialEq, Error)]
pub enum RunError {
    #[error("{} parser error(s)", .0.len())]
    Parse(Vec<ParseError>),
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
}

impl From<Vec<ParseError>> for RunError {
    fn from(errors: Vec<ParseError>) -> Self {
        RunError::Parse(errors)
    }
}

/// Parses and evaluates `source` in `environment` with the built-in functions
/// available, returning the text to show the user alongside any failure.
pub fn run_source(source: &str, environment: &mut Environment) -> (String, Option<RunError>) {
    let evaluator = Evaluator::new(Registry::with_builtins());
    render(eval_source(&evaluator, source, environment))
}

fn eval_source(
    evaluator: &Evaluator,
    source: &str,
    environment: &mut Environment,
) -> Result<Gc<Object>, RunError> {
    let (program, errors) = parse(source);
    if !errors.is_empty() {
        return Err(errors.into());
    }
    Ok(evaluator.eval_program(&program, environment)?)
}

fn render(result: Result<Gc<Object>, RunError>) -> (String, Option<RunError>) {
    match result {
        Ok(value) => (format!("{}\n", *value), None),
        Err(RunError::Parse(errors)) => {
            let messages: String = errors.iter().map(|error| format!("\t{}\n", error)).collect();
            (
                format!("Woops!\n parser errors:\n{}", messages),
                Some(RunError::Parse(errors)),
            )
        }
        Err(RunError::Evaluation(error)) => (
            format!("ERROR: {}\n", error),
            Some(RunError::Evaluation(error)),
        ),
    }
}

/// One interpreter session: a global scope plus the registry of native
/// functions visible to it. Bindings persist from one `run` to the next.
#[derive(Debug)]
pub struct Session {
    evaluator: Evaluator,
    environment: Environment,
}

impl Session {
    pub fn new() -> Self {
        Self::with_registry(Registry::with_builtins())
    }

    pub fn with_registry(registry: Registry) -> Self {
        Self {
            evaluator: Evaluator::new(registry),
            environment: Environment::new(),
        }
    }

    pub fn register(
        &mut self,
        name: &str,
        func: impl Fn(Vec<Gc<Object>>) -> NativeResult + 'static,
    ) {
        self.evaluator.registry_mut().register(name, func);
    }

    pub fn eval(&mut self, source: &str) -> Result<Gc<Object>, RunError> {
        eval_source(&self.evaluator, source, &mut self.environment)
    }

    /// Like [`Session::eval`], rendered the same way as [`run_source`].
    pub fn run(&mut self, source: &str) -> (String, Option<RunError>) {
        render(self.eval(source))
    }

    /// Global bindings in the order they were first made.
    pub fn bindings(&self) -> Vec<(String, Gc<Object>)> {
        self.environment
            .keys()
            .into_iter()
            .filter_map(|name| {
                let value = self.environment.get(&name)?;
                Some((name, value))
            })
            .collect()
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
