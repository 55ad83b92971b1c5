use std::cell::Cell;

use gc::Gc;
use tamarin_core::ast::{self, Expression, InfixOperationKind, Node, PrefixOperationKind};
use tamarin_core::stack::ensure_sufficient_stack;

use crate::builtins::Registry;
use crate::environment::Environment;
use crate::object::{EvaluationError, Function, Object, QuickReturn};

/// Tree-walking evaluator. Identifiers missing from the environment chain
/// are resolved against the native-function registry.
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    registry: Registry,
    /// User functions currently executing.
    depth: Cell<usize>,
}

/// Deepest chain of nested user function calls before evaluation fails.
pub const MAX_CALL_DEPTH: usize = 5_000;

impl Evaluator {
    pub fn new(registry: Registry) -> Self {
        Self {
            registry,
            depth: Cell::new(0),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// Evaluates any node, reporting failures as an `Object::Error` value.
    /// A pending `return` is resolved to the value it carries.
    pub fn evaluate<'a>(
        &self,
        node: impl Into<Node<'a>>,
        environment: &mut Environment,
    ) -> Gc<Object> {
        let result = match node.into() {
            Node::Program(program) => {
                return self
                    .eval_program(program, environment)
                    .unwrap_or_else(Object::error)
            }
            Node::Block(block) => self.eval_scoped_block(block, environment),
            Node::Statement(statement) => self.eval_statement(statement, environment),
            Node::Expression(expression) => self.eval_expression(expression, environment),
        };
        match result {
            Ok(value) | Err(QuickReturn::Return(value)) => value,
            Err(QuickReturn::Error(error)) => Object::error(error),
        }
    }

    #[tracing::instrument(level = "debug", skip_all, fields(statements = program.statements.len()))]
    pub fn eval_program(
        &self,
        program: &ast::Program,
        environment: &mut Environment,
    ) -> Result<Gc<Object>, EvaluationError> {
        let mut output = Object::null();
        for statement in &program.statements {
            match self.eval_statement(statement, environment) {
                Err(QuickReturn::Return(value)) => return Ok(value),
                Err(QuickReturn::Error(error)) => {
                    tracing::debug!(%error, "evaluation stopped");
                    return Err(error);
                }
                Ok(object) => output = object,
            };
        }
        Ok(output)
    }

    fn eval_statement(
        &self,
        statement: &ast::Statement,
        environment: &mut Environment,
    ) -> Result<Gc<Object>, QuickReturn> {
        match statement {
            ast::Statement::Expression(expression) => self.eval_expression(expression, environment),
            ast::Statement::Return(statement) => {
                let value = match &statement.value {
                    Some(value) => self.eval_expression(value, environment)?,
                    None => Object::null(),
                };
                Err(QuickReturn::Return(value))
            }
            ast::Statement::Let(statement) => {
                let value = self.eval_expression(&statement.value, environment)?;
                environment.set(&statement.identifier.name, value);
                Ok(Object::null())
            }
        }
    }

    fn eval_expression(
        &self,
        expression: &Expression,
        environment: &mut Environment,
    ) -> Result<Gc<Object>, QuickReturn> {
        ensure_sufficient_stack(|| self.eval_expression_kind(expression, environment))
    }

    fn eval_expression_kind(
        &self,
        expression: &Expression,
        environment: &mut Environment,
    ) -> Result<Gc<Object>, QuickReturn> {
        match expression {
            Expression::IntegerLiteral(value) => Ok(Object::integer(*value)),
            Expression::BooleanLiteral(value) => Ok(Object::boolean(*value)),
            Expression::StringLiteral(value) => Ok(Object::string(value.clone())),
            Expression::ArrayLiteral(array) => {
                Ok(Object::array(self.eval_expressions(array, environment)?))
            }
            Expression::Identifier(identifier) => environment
                .get(&identifier.name)
                .or_else(|| self.registry.get(&identifier.name))
                .ok_or_else(|| EvaluationError::UnknownIdentifier(identifier.name.clone()).into()),
            Expression::PrefixOperation(kind, right) => {
                let right = self.eval_expression(right, environment)?;
                Ok(eval_prefix_operation(*kind, &right)?)
            }
            Expression::InfixOperation(kind, left, right) => {
                let left = self.eval_expression(left, environment)?;
                let right = self.eval_expression(right, environment)?;
                Ok(eval_infix_operation(*kind, &left, &right)?)
            }
            Expression::IfExpression {
                condition,
                consequence,
                alternative,
            } => {
                let condition = self.eval_expression(condition, environment)?;
                if condition.is_truthy() {
                    self.eval_scoped_block(consequence, environment)
                } else if let Some(alternative) = alternative {
                    self.eval_scoped_block(alternative, environment)
                } else {
                    Ok(Object::null())
                }
            }
            Expression::FunctionLiteral { parameters, body } => Ok(Object::function(
                parameters.clone(),
                body.clone(),
                environment.clone(),
            )),
            Expression::CallExpression {
                function,
                arguments,
            } => {
                let function = self.eval_expression(function, environment)?;
                let arguments = self.eval_expressions(arguments, environment)?;
                Ok(self.apply_function(&function, arguments)?)
            }
            Expression::IndexExpression { left, index } => {
                let left = self.eval_expression(left, environment)?;
                let index = self.eval_expression(index, environment)?;
                Ok(eval_index_expression(&left, &index)?)
            }
        }
    }

    /// Evaluates left to right, stopping at the first failure.
    fn eval_expressions(
        &self,
        expressions: &[Expression],
        environment: &mut Environment,
    ) -> Result<Vec<Gc<Object>>, QuickReturn> {
        let mut result = Vec::with_capacity(expressions.len());
        for expression in expressions {
            result.push(self.eval_expression(expression, environment)?);
        }
        Ok(result)
    }

    pub fn apply_function(
        &self,
        function: &Gc<Object>,
        arguments: Vec<Gc<Object>>,
    ) -> Result<Gc<Object>, EvaluationError> {
        match &**function {
            Object::Function(function) => self.call_function(function, arguments),
            Object::NativeFunction(native) => {
                tracing::trace!(
                    name = %native.name,
                    arguments = arguments.len(),
                    "calling native function"
                );
                let result = native.call(arguments)?;
                match &*result {
                    Object::Error(error) => Err(error.clone()),
                    _ => Ok(result),
                }
            }
            other => Err(EvaluationError::NotAFunction(other.type_of())),
        }
    }

    fn call_function(
        &self,
        function: &Function,
        arguments: Vec<Gc<Object>>,
    ) -> Result<Gc<Object>, EvaluationError> {
        if function.parameters.len() != arguments.len() {
            return Err(EvaluationError::WrongArgumentCount {
                expected: function.parameters.len(),
                actual: arguments.len(),
            });
        }
        let depth = self.depth.get();
        if depth >= MAX_CALL_DEPTH {
            tracing::debug!(depth, "call depth exceeded");
            return Err(EvaluationError::CallDepthExceeded(MAX_CALL_DEPTH));
        }
        tracing::trace!(arguments = arguments.len(), depth, "applying function");

        self.depth.set(depth + 1);
        let result = self.eval_function_body(function, arguments);
        self.depth.set(depth);
        result
    }

    fn eval_function_body(
        &self,
        function: &Function,
        arguments: Vec<Gc<Object>>,
    ) -> Result<Gc<Object>, EvaluationError> {
        let mut frame = Environment::new_enclosed(&function.env);
        for (parameter, argument) in function.parameters.iter().zip(arguments) {
            frame.set(&parameter.name, argument);
        }
        match self.eval_block_statement(&function.body, &mut frame) {
            Ok(object) | Err(QuickReturn::Return(object)) => Ok(object),
            Err(QuickReturn::Error(err)) => Err(err),
        }
    }

    fn eval_block_statement(
        &self,
        block: &ast::BlockStatement,
        environment: &mut Environment,
    ) -> Result<Gc<Object>, QuickReturn> {
        let mut result = Object::null();
        for statement in &block.statements {
            result = self.eval_statement(statement, environment)?;
        }
        Ok(result)
    }

    /// `if`/`else` bodies get a scope of their own.
    fn eval_scoped_block(
        &self,
        block: &ast::BlockStatement,
        environment: &Environment,
    ) -> Result<Gc<Object>, QuickReturn> {
        let mut scope = Environment::new_enclosed(environment);
        self.eval_block_statement(block, &mut scope)
    }
}

fn eval_prefix_operation(
    kind: PrefixOperationKind,
    right: &Gc<Object>,
) -> Result<Gc<Object>, EvaluationError> {
    match (kind, &**right) {
        (PrefixOperationKind::Bang, value) => Ok(Object::boolean(!value.is_truthy())),
        (PrefixOperationKind::Minus, Object::Integer(value)) => {
            Ok(Object::integer(value.wrapping_neg()))
        }
        (PrefixOperationKind::Minus, value) => Err(EvaluationError::UnknownPrefixOperator {
            right: value.type_of(),
            operation: kind,
        }),
    }
}

fn eval_infix_operation(
    kind: InfixOperationKind,
    left: &Gc<Object>,
    right: &Gc<Object>,
) -> Result<Gc<Object>, EvaluationError> {
    use InfixOperationKind::*;

    match (kind, &**left, &**right) {
        (_, Object::Integer(left), Object::Integer(right)) => {
            eval_integer_infix_operation(kind, *left, *right)
        }
        (Plus, Object::String(left), Object::String(right)) => {
            Ok(Object::string(format!("{}{}", left, right)))
        }
        (Equal | NotEqual, Object::String(left), Object::String(right)) => {
            Ok(equality(kind, left == right))
        }
        (Equal | NotEqual, Object::Boolean(left), Object::Boolean(right)) => {
            Ok(equality(kind, left == right))
        }
        (Equal | NotEqual, Object::Null, Object::Null) => Ok(equality(kind, true)),
        (Equal | NotEqual, Object::Array(_), Object::Array(_)) => {
            Ok(equality(kind, Gc::ptr_eq(left, right)))
        }
        // functions and builtins already compare by identity
        (Equal | NotEqual, left, right) if left.type_of() == right.type_of() => {
            Ok(equality(kind, left == right))
        }
        (_, left, right) if left.type_of() != right.type_of() => {
            Err(EvaluationError::TypeMismatch {
                left: left.type_of(),
                right: right.type_of(),
                operation: kind,
            })
        }
        (_, left, right) => Err(EvaluationError::UnknownInfixOperator {
            left: left.type_of(),
            right: right.type_of(),
            operation: kind,
        }),
    }
}

fn equality(kind: InfixOperationKind, equal: bool) -> Gc<Object> {
    Object::boolean(if kind == InfixOperationKind::Equal {
        equal
    } else {
        !equal
    })
}

/// Signed 64-bit arithmetic that wraps on overflow.
fn eval_integer_infix_operation(
    kind: InfixOperationKind,
    left: i64,
    right: i64,
) -> Result<Gc<Object>, EvaluationError> {
    use InfixOperationKind::*;

    let result = match kind {
        Plus => Object::integer(left.wrapping_add(right)),
        Minus => Object::integer(left.wrapping_sub(right)),
        Multiply => Object::integer(left.wrapping_mul(right)),
        Divide => {
            if right == 0 {
                return Err(EvaluationError::DivisionByZero);
            }
            Object::integer(left.wrapping_div(right))
        }
        LessThan => Object::boolean(left < right),
        LessEqual => Object::boolean(left <= right),
        GreaterThan => Object::boolean(left > right),
        GreaterEqual => Object::boolean(left >= right),
        Equal => Object::boolean(left == right),
        NotEqual => Object::boolean(left != right),
    };
    Ok(result)
}

/// Out-of-range array access yields `null`.
fn eval_index_expression(
    left: &Gc<Object>,
    index: &Gc<Object>,
) -> Result<Gc<Object>, EvaluationError> {
    match (&**left, &**index) {
        (Object::Array(array), Object::Integer(index)) => Ok(usize::try_from(*index)
            .ok()
            .and_then(|index| array.get(index))
            .cloned()
            .unwrap_or_else(Object::null)),
        (left, index) => Err(EvaluationError::IndexNotSupported {
            left: left.type_of(),
            index: index.type_of(),
        }),
    }
}
