pub mod builtins;
pub mod environment;
pub mod evaluator;
pub mod object;
pub mod runner;

pub use environment::Environment;
pub use evaluator::Evaluator;
pub use object::{EvaluationError, Object};
pub use runner::{run_source, RunError, Session};
