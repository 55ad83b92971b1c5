use std::fmt::Display;
use std::rc::Rc;

use gc::{Finalize, Gc, Trace};
use tamarin_core::ast;
use thiserror::Error;

use crate::environment::Environment;

#[derive(Debug, PartialEq, Clone, Trace, Finalize)]
pub enum Object {
    Integer(i64),
    Boolean(bool),
    String(String),
    Array(Vec<Gc<Object>>),
    Function(Function),
    NativeFunction(NativeFunction),
    Error(#[unsafe_ignore_trace] EvaluationError),
    Null,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ObjectType {
    Integer,
    Boolean,
    String,
    Array,
    Function,
    Builtin,
    Error,
    Null,
}

impl Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ObjectType::Integer => "INTEGER",
            ObjectType::Boolean => "BOOLEAN",
            ObjectType::String => "STRING",
            ObjectType::Array => "ARRAY",
            ObjectType::Function => "FUNCTION",
            ObjectType::Builtin => "BUILTIN",
            ObjectType::Error => "ERROR",
            ObjectType::Null => "NULL",
        };
        f.write_str(name)
    }
}

impl Object {
    pub fn null() -> Gc<Object> {
        Gc::new(Object::Null)
    }
    pub fn boolean(value: bool) -> Gc<Object> {
        Gc::new(Object::Boolean(value))
    }
    pub fn integer(value: i64) -> Gc<Object> {
        Gc::new(Object::Integer(value))
    }
    pub fn string(value: impl Into<String>) -> Gc<Object> {
        Gc::new(Object::String(value.into()))
    }
    pub fn array(array: Vec<Gc<Object>>) -> Gc<Object> {
        Gc::new(Object::Array(array))
    }
    pub fn error(error: EvaluationError) -> Gc<Object> {
        Gc::new(Object::Error(error))
    }
    pub fn function(
        parameters: Rc<[ast::Identifier]>,
        body: Rc<ast::BlockStatement>,
        env: Environment,
    ) -> Gc<Object> {
        Gc::new(Object::Function(Function {
            parameters,
            body,
            env,
        }))
    }
    pub fn native_function(func: NativeFunction) -> Gc<Object> {
        Gc::new(Object::NativeFunction(func))
    }

    pub fn type_of(&self) -> ObjectType {
        match self {
            Object::Integer(_) => ObjectType::Integer,
            Object::Boolean(_) => ObjectType::Boolean,
            Object::String(_) => ObjectType::String,
            Object::Array(_) => ObjectType::Array,
            Object::Function(_) => ObjectType::Function,
            Object::NativeFunction(_) => ObjectType::Builtin,
            Object::Error(_) => ObjectType::Error,
            Object::Null => ObjectType::Null,
        }
    }

    /// Only `false` and `null` are falsy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Object::Boolean(false) | Object::Null)
    }
}

/// The inspection form shown to users.
impl Display for Object {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Object::Integer(value) => write!(f, "{}", value),
            Object::Boolean(value) => write!(f, "{}", value),
            Object::String(value) => f.write_str(value),
            Object::Array(elements) => {
                write!(f, "[")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", **element)?;
                }
                write!(f, "]")
            }
            Object::Function(function) => {
                let parameters = function
                    .parameters
                    .iter()
                    .map(|id| id.name.as_ref())
                    .collect::<Box<[&str]>>()
                    .join(", ");
                write!(f, "fn({}) {}", parameters, function.body)
            }
            Object::NativeFunction(_) => write!(f, "builtin function"),
            Object::Error(error) => write!(f, "ERROR: {}", error),
            Object::Null => write!(f, "null"),
        }
    }
}

/// A closure: parameters and body shared with the parsed program, plus the
/// environment that was active when the literal was evaluated.
#[derive(Clone, Trace, Finalize)]
pub struct Function {
    #[unsafe_ignore_trace]
    pub parameters: Rc<[ast::Identifier]>,
    #[unsafe_ignore_trace]
    pub body: Rc<ast::BlockStatement>,
    pub env: Environment,
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.parameters, &other.parameters)
            && Rc::ptr_eq(&self.body, &other.body)
            && self.env == other.env
    }
}

impl std::fmt::Debug for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Function")
            .field("parameters", &self.parameters.len())
            .field("ptr", &Rc::as_ptr(&self.body))
            .finish()
    }
}

pub type NativeResult = Result<Gc<Object>, EvaluationError>;

/// Host callback invoked with already evaluated arguments.
pub type NativeFn = dyn Fn(Vec<Gc<Object>>) -> NativeResult;

#[derive(Clone, Trace, Finalize)]
pub struct NativeFunction {
    #[unsafe_ignore_trace]
    pub name: Rc<str>,
    #[unsafe_ignore_trace]
    pub func: Rc<NativeFn>,
}

impl NativeFunction {
    pub fn new(name: &str, func: impl Fn(Vec<Gc<Object>>) -> NativeResult + 'static) -> Self {
        Self {
            name: name.into(),
            func: Rc::new(func),
        }
    }

    pub fn call(&self, arguments: Vec<Gc<Object>>) -> NativeResult {
        (self.func)(arguments)
    }
}

impl PartialEq for NativeFunction {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && Rc::ptr_eq(&self.func, &other.func)
    }
}

impl std::fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeFunction")
            .field("name", &self.name)
            .finish()
    }
}

/// Control flow that cuts through nested blocks. `Return` is unwrapped at the
/// nearest function call, `Error` only at the top level.
#[derive(Debug, PartialEq)]
pub enum QuickReturn {
    Return(Gc<Object>),
    Error(EvaluationError),
}

impl From<EvaluationError> for QuickReturn {
    fn from(value: EvaluationError) -> Self {
        QuickReturn::Error(value)
    }
}

#[derive(Debug, PartialEq, Clone, Error)]
pub enum EvaluationError {
    #[error("identifier not found: {0}")]
    UnknownIdentifier(Rc<str>),
    #[error("type mismatch: {left} {operation} {right}")]
    TypeMismatch {
        left: ObjectType,
        right: ObjectType,
        operation: ast::InfixOperationKind,
    },
    #[error("unknown operator: {left} {operation} {right}")]
    UnknownInfixOperator {
        left: ObjectType,
        right: ObjectType,
        operation: ast::InfixOperationKind,
    },
    #[error("unknown operator: {operation}{right}")]
    UnknownPrefixOperator {
        right: ObjectType,
        operation: ast::PrefixOperationKind,
    },
    #[error("division by zero")]
    DivisionByZero,
    #[error("wrong number of arguments: got={actual}, want={expected}")]
    WrongArgumentCount { expected: usize, actual: usize },
    #[error("not a function: {0}")]
    NotAFunction(ObjectType),
    #[error("index operator not supported: {left}[{index}]")]
    IndexNotSupported { left: ObjectType, index: ObjectType },
    #[error("argument to `{function}` not supported, got {got}")]
    UnsupportedArgument { function: Rc<str>, got: ObjectType },
    #[error("argument to `{function}` must be {expected}, got {got}")]
    UnexpectedArgument {
        function: Rc<str>,
        expected: ObjectType,
        got: ObjectType,
    },
    #[error("maximum call depth of {0} exceeded")]
    CallDepthExceeded(usize),
    /// Free-form failure reported by a host supplied native function.
    #[error("{0}")]
    Native(Rc<str>),
}
