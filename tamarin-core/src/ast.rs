use std::fmt::Display;
use std::rc::Rc;

#[derive(Debug, PartialEq, Clone)]
pub enum Statement {
    Let(LetStatement),
    Return(ReturnStatement),
    Expression(Expression),
}

#[derive(Debug, PartialEq, Clone)]
pub struct LetStatement {
    pub identifier: Identifier,
    pub value: Expression,
}

#[derive(Debug, PartialEq, Clone)]
pub struct ReturnStatement {
    pub value: Option<Expression>,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Expression {
    Identifier(Identifier),
    IntegerLiteral(i64),
    StringLiteral(String),
    BooleanLiteral(bool),
    ArrayLiteral(Vec<Expression>),
    PrefixOperation(PrefixOperationKind, Box<Expression>),
    InfixOperation(InfixOperationKind, Box<Expression>, Box<Expression>),
    IfExpression {
        condition: Box<Expression>,
        consequence: BlockStatement,
        alternative: Option<BlockStatement>,
    },
    /// Parameters and body are reference counted so that function values
    /// created at runtime share them with the parsed program.
    FunctionLiteral {
        parameters: Rc<[Identifier]>,
        body: Rc<BlockStatement>,
    },
    CallExpression {
        function: Box<Expression>,
        arguments: Vec<Expression>,
    },
    IndexExpression {
        left: Box<Expression>,
        index: Box<Expression>,
    },
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum InfixOperationKind {
    Plus,
    Minus,
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,
    Equal,
    NotEqual,
    Multiply,
    Divide,
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum PrefixOperationKind {
    Minus,
    Bang,
}

#[derive(Debug, PartialEq, Clone)]
pub struct Identifier {
    pub name: Rc<str>,
}

#[derive(Debug, PartialEq, Clone, Default)]
pub struct Program {
    pub statements: Vec<Statement>,
}

#[derive(Debug, PartialEq, Clone, Default)]
pub struct BlockStatement {
    pub statements: Vec<Statement>,
}

/// Borrowed view over any evaluable node.
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Program(&'a Program),
    Block(&'a BlockStatement),
    Statement(&'a Statement),
    Expression(&'a Expression),
}

impl<'a> From<&'a Program> for Node<'a> {
    fn from(program: &'a Program) -> Self {
        Node::Program(program)
    }
}

impl<'a> From<&'a BlockStatement> for Node<'a> {
    fn from(block: &'a BlockStatement) -> Self {
        Node::Block(block)
    }
}

impl<'a> From<&'a Statement> for Node<'a> {
    fn from(statement: &'a Statement) -> Self {
        Node::Statement(statement)
    }
}

impl<'a> From<&'a Expression> for Node<'a> {
    fn from(expression: &'a Expression) -> Self {
        Node::Expression(expression)
    }
}

impl Display for LetStatement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "let {} = {};", self.identifier.name, self.value)
    }
}

impl Display for ReturnStatement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.value {
            Some(value) => write!(f, "return {};", value),
            None => write!(f, "return;"),
        }
    }
}

impl Display for BlockStatement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for statement in &self.statements {
            write!(f, "{}", statement)?;
        }
        write!(f, "}}")
    }
}

impl Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use Expression::*;
        match self {
            Identifier(ident) => write!(f, "{}", ident),
            IntegerLiteral(val) => write!(f, "{}", val),
            StringLiteral(val) => write!(f, "\"{}\"", val),
            BooleanLiteral(val) => write!(f, "{}", val),
            ArrayLiteral(arr) => write!(f, "[{}]", join(arr)),
            PrefixOperation(kind, expr) => write!(f, "({}{})", kind.to_str(), expr),
            InfixOperation(kind, left, right) => {
                write!(f, "({} {} {})", left, kind.to_str(), right)
            }
            IfExpression {
                condition,
                consequence,
                alternative,
            } => {
                write!(f, "if {} {}", condition, consequence)?;
                if let Some(alternative) = alternative {
                    write!(f, " else {}", alternative)?;
                }
                Ok(())
            }
            FunctionLiteral { parameters, body } => {
                write!(f, "fn({}) {}", join(parameters), body)
            }
            CallExpression {
                function,
                arguments,
            } => write!(f, "{}({})", function, join(arguments)),
            IndexExpression { left, index } => write!(f, "({}[{}])", left, index),
        }
    }
}

fn join<T: Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|item| item.to_string())
        .collect::<Vec<String>>()
        .join(", ")
}

impl Display for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use Statement::*;
        match self {
            Let(statement) => write!(f, "{}", statement),
            Return(statement) => write!(f, "{}", statement),
            Expression(expression) => write!(f, "{};", expression),
        }
    }
}

impl Display for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for statement in &self.statements {
            writeln!(f, "{}", statement)?;
        }
        Ok(())
    }
}

impl PrefixOperationKind {
    pub fn to_str(&self) -> &'static str {
        use PrefixOperationKind::*;
        match self {
            Minus => "-",
            Bang => "!",
        }
    }
}

impl InfixOperationKind {
    pub fn to_str(&self) -> &'static str {
        use InfixOperationKind::*;
        match self {
            Plus => "+",
            Minus => "-",
            LessThan => "<",
            LessEqual => "<=",
            GreaterThan => ">",
            GreaterEqual => ">=",
            Equal => "==",
            NotEqual => "!=",
            Multiply => "*",
            Divide => "/",
        }
    }
}

impl Display for PrefixOperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.to_str())
    }
}

impl Display for InfixOperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.to_str())
    }
}
