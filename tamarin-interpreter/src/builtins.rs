use std::collections::HashMap;
use std::rc::Rc;

use gc::Gc;

use crate::object::{EvaluationError, NativeFunction, NativeResult, Object, ObjectType};

/// Named native functions reachable from interpreted code. Each interpreter
/// session owns its registry, so sessions never observe each other's
/// registrations.
#[derive(Clone, Default)]
pub struct Registry {
    functions: HashMap<Rc<str>, NativeFunction>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding `len`, `first`, `last`, `rest`, `push`, `type` and
    /// `puts`.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("len", builtin_len);
        registry.register("first", builtin_first);
        registry.register("last", builtin_last);
        registry.register("rest", builtin_rest);
        registry.register("push", builtin_push);
        registry.register("type", builtin_type);
        registry.register("puts", builtin_puts);
        registry
    }

    /// Adds `func` under `name`, replacing any previous registration.
    pub fn register(
        &mut self,
        name: &str,
        func: impl Fn(Vec<Gc<Object>>) -> NativeResult + 'static,
    ) {
        tracing::debug!(name, "registering native function");
        self.functions
            .insert(name.into(), NativeFunction::new(name, func));
    }

    pub fn get(&self, name: &str) -> Option<Gc<Object>> {
        self.functions
            .get(name)
            .cloned()
            .map(Object::native_function)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Registered names in alphabetical order.
    pub fn names(&self) -> Vec<Rc<str>> {
        let mut names: Vec<_> = self.functions.keys().cloned().collect();
        names.sort();
        names
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("functions", &self.names())
            .finish()
    }
}

fn check_argument_count(expected: usize, args: &[Gc<Object>]) -> Result<(), EvaluationError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(EvaluationError::WrongArgumentCount {
            expected,
            actual: args.len(),
        })
    }
}

fn expect_array<'a>(function: &str, arg: &'a Gc<Object>) -> Result<&'a [Gc<Object>], EvaluationError> {
    match &**arg {
        Object::Array(arr) => Ok(arr),
        other => Err(EvaluationError::UnexpectedArgument {
            function: function.into(),
            expected: ObjectType::Array,
            got: other.type_of(),
        }),
    }
}

fn builtin_len(args: Vec<Gc<Object>>) -> NativeResult {
    check_argument_count(1, &args)?;
    match &*args[0] {
        // byte length, like the rest of the string handling
        Object::String(s) => Ok(Object::integer(s.len() as i64)),
        Object::Array(arr) => Ok(Object::integer(arr.len() as i64)),
        other => Err(EvaluationError::UnsupportedArgument {
            function: "len".into(),
            got: other.type_of(),
        }),
    }
}

fn builtin_first(args: Vec<Gc<Object>>) -> NativeResult {
    check_argument_count(1, &args)?;
    let arr = expect_array("first", &args[0])?;
    Ok(arr.first().cloned().unwrap_or_else(Object::null))
}

fn builtin_last(args: Vec<Gc<Object>>) -> NativeResult {
    check_argument_count(1, &args)?;
    let arr = expect_array("last", &args[0])?;
    Ok(arr.last().cloned().unwrap_or_else(Object::null))
}

fn builtin_rest(args: Vec<Gc<Object>>) -> NativeResult {
    check_argument_count(1, &args)?;
    let arr = expect_array("rest", &args[0])?;
    if arr.is_empty() {
        return Ok(Object::null());
    }
    Ok(Object::array(arr[1..].to_vec()))
}

fn builtin_push(args: Vec<Gc<Object>>) -> NativeResult {
    check_argument_count(2, &args)?;
    let arr = expect_array("push", &args[0])?;
    let mut new_arr = arr.to_vec();
    new_arr.push(args[1].clone());
    Ok(Object::array(new_arr))
}

fn builtin_type(args: Vec<Gc<Object>>) -> NativeResult {
    check_argument_count(1, &args)?;
    Ok(Object::string(args[0].type_of().to_string()))
}

fn builtin_puts(args: Vec<Gc<Object>>) -> NativeResult {
    for arg in &args {
        println!("{}", **arg);
    }
    Ok(Object::null())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_len() {
        let no_arguments = builtin_len(vec![]);
        assert_eq!(
            no_arguments,
            Err(EvaluationError::WrongArgumentCount {
                expected: 1,
                actual: 0
            })
        );

        let too_many_arguments =
            builtin_len(vec![Object::string("hello"), Object::string("world")]);
        assert_eq!(
            too_many_arguments.map_err(|err| err.to_string()),
            Err("wrong number of arguments: got=2, want=1".to_owned())
        );

        let empty_array = builtin_len(vec![Object::array(vec![])]);
        assert_eq!(empty_array, Ok(Object::integer(0)));

        let two_elements = builtin_len(vec![Object::array(vec![
            Object::string("hello"),
            Object::string("world"),
        ])]);
        assert_eq!(two_elements, Ok(Object::integer(2)));

        let string_len = builtin_len(vec![Object::string("hello")]);
        assert_eq!(string_len, Ok(Object::integer(5)));

        let integer_len = builtin_len(vec![Object::integer(42)]);
        assert_eq!(
            integer_len,
            Err(EvaluationError::UnsupportedArgument {
                function: "len".into(),
                got: ObjectType::Integer
            })
        );
    }

    #[test]
    fn test_first_and_last() {
        let arr = Object::array(vec![Object::integer(1), Object::integer(2)]);

        assert_eq!(builtin_first(vec![arr.clone()]), Ok(Object::integer(1)));
        assert_eq!(builtin_last(vec![arr]), Ok(Object::integer(2)));
        assert_eq!(builtin_first(vec![Object::array(vec![])]), Ok(Object::null()));
        assert_eq!(builtin_last(vec![Object::array(vec![])]), Ok(Object::null()));
        assert_eq!(
            builtin_first(vec![Object::integer(1)]).map_err(|err| err.to_string()),
            Err("argument to `first` must be ARRAY, got INTEGER".to_owned())
        );
    }

    #[test]
    fn test_rest_returns_a_new_array() {
        let original = Object::array(vec![
            Object::integer(1),
            Object::integer(2),
            Object::integer(3),
        ]);
        let expected = Object::array(vec![Object::integer(2), Object::integer(3)]);

        assert_eq!(builtin_rest(vec![original.clone()]), Ok(expected.clone()));
        assert_eq!(builtin_rest(vec![original.clone()]), Ok(expected));
        assert_eq!(
            *original,
            Object::Array(vec![
                Object::integer(1),
                Object::integer(2),
                Object::integer(3)
            ])
        );
        assert_eq!(builtin_rest(vec![Object::array(vec![])]), Ok(Object::null()));
    }

    #[test]
    fn test_push() {
        let original = Object::array(vec![Object::integer(1)]);
        let pushed = builtin_push(vec![original.clone(), Object::string("x")]);

        assert_eq!(
            pushed,
            Ok(Object::array(vec![Object::integer(1), Object::string("x")]))
        );
        assert_eq!(original, Object::array(vec![Object::integer(1)]));
        assert!(builtin_push(vec![original]).is_err());
    }

    #[test]
    fn test_type() {
        let cases = vec![
            (Object::integer(1), "INTEGER"),
            (Object::boolean(false), "BOOLEAN"),
            (Object::string("s"), "STRING"),
            (Object::array(vec![]), "ARRAY"),
            (Object::null(), "NULL"),
        ];
        for (value, expected) in cases {
            assert_eq!(builtin_type(vec![value]), Ok(Object::string(expected)));
        }
    }

    #[test]
    fn test_registry() {
        let mut registry = Registry::new();
        assert!(registry.get("len").is_none());

        registry.register("answer", |_| Ok(Object::integer(42)));
        let Some(answer) = registry.get("answer") else {
            panic!("answer should be registered");
        };
        match &*answer {
            Object::NativeFunction(native) => {
                assert_eq!(native.call(vec![]), Ok(Object::integer(42)))
            }
            other => panic!("expected a native function, got {other:?}"),
        }

        let builtins = Registry::with_builtins();
        let names: Vec<String> = builtins.names().iter().map(|n| n.to_string()).collect();
        assert_eq!(
            names,
            vec!["first", "last", "len", "push", "puts", "rest", "type"]
        );
    }
}
