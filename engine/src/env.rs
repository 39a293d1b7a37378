//! [`Environment`] with user bindings and the table of builtins.

use once_cell::sync::Lazy;

use std::{
    collections::HashMap,
    f64::consts::{E, PI},
    fmt,
    rc::Rc,
};

use crate::{ErrorKind, Expr};

/// Builtin unary math function.
#[derive(Clone, Copy)]
pub struct BuiltinFn {
    name: &'static str,
    function: fn(f64) -> f64,
}

impl fmt::Debug for BuiltinFn {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_tuple("BuiltinFn")
            .field(&self.name)
            .finish()
    }
}

/// Builtins are compared by name; names are unique within [`BUILTINS`].
impl PartialEq for BuiltinFn {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl BuiltinFn {
    /// Returns the name of this function.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Calls this function.
    pub fn call(&self, arg: f64) -> f64 {
        (self.function)(arg)
    }
}

/// Builtin constant or function.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Builtin {
    /// Constant, e.g., `pi`.
    Constant(f64),
    /// Unary function, e.g., `sin`.
    Function(BuiltinFn),
}

#[derive(Debug, Clone, Copy)]
struct StdLibrary {
    constants: &'static [(&'static str, f64)],
    unary: &'static [(&'static str, fn(f64) -> f64)],
}

/// Trigonometric functions take degrees.
const STD_LIB: StdLibrary = StdLibrary {
    constants: &[("pi", PI), ("e", E)],
    unary: &[
        ("sin", |x: f64| x.to_radians().sin()),
        ("cos", |x: f64| x.to_radians().cos()),
        ("tan", |x: f64| x.to_radians().tan()),
        ("sqrt", f64::sqrt),
        ("cbrt", f64::cbrt),
        ("round", f64::round_ties_even),
        ("floor", f64::floor),
        ("ceil", f64::ceil),
        ("ln", f64::ln),
    ],
};

/// Immutable table of builtin constants and functions.
#[derive(Debug)]
pub struct Builtins {
    entries: HashMap<&'static str, Builtin>,
}

impl Builtins {
    fn standard() -> Self {
        let constants = STD_LIB
            .constants
            .iter()
            .map(|&(name, value)| (name, Builtin::Constant(value)));
        let functions = STD_LIB.unary.iter().map(|&(name, function)| {
            (name, Builtin::Function(BuiltinFn { name, function }))
        });
        Self {
            entries: constants.chain(functions).collect(),
        }
    }

    /// Gets a builtin by name.
    pub fn get(&self, name: &str) -> Option<Builtin> {
        self.entries.get(name).copied()
    }

    /// Checks whether the name is reserved by a builtin.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Gets a builtin constant by name.
    pub fn constant(&self, name: &str) -> Option<f64> {
        match self.get(name)? {
            Builtin::Constant(value) => Some(value),
            Builtin::Function(_) => None,
        }
    }

    /// Gets a builtin function by name.
    pub fn function(&self, name: &str) -> Option<BuiltinFn> {
        match self.get(name)? {
            Builtin::Function(function) => Some(function),
            Builtin::Constant(_) => None,
        }
    }

    /// Iterates over builtins sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, Builtin)> {
        let mut entries: Vec<_> = self.entries.iter().map(|(&name, &b)| (name, b)).collect();
        entries.sort_unstable_by_key(|(name, _)| *name);
        entries.into_iter()
    }
}

/// Process-wide table of builtins, constructed on first use.
pub static BUILTINS: Lazy<Builtins> = Lazy::new(Builtins::standard);

/// What a name is bound to.
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    /// Builtin constant.
    Constant(f64),
    /// Builtin function.
    Builtin(BuiltinFn),
    /// User variable.
    Variable(f64),
    /// User function.
    Function(Rc<Expr>),
}

/// Environment containing user variables and functions for an interactive session.
///
/// Builtins, variables and functions share a single namespace: a name may be bound
/// in at most one of them. Builtins can never be rebound or removed.
///
/// # Examples
///
/// ```
/// use scicalc_engine::{env::Binding, Environment};
///
/// let mut env = Environment::new();
/// env.declare_variable("x", 5.0)?;
/// assert_eq!(env.lookup("x"), Some(Binding::Variable(5.0)));
/// assert!(env.declare_variable("x", 7.0).is_err());
/// assert!(env.declare_variable("pi", 3.0).is_err());
/// assert_eq!(env.remove_variable("x")?, 5.0);
/// # Ok::<_, scicalc_engine::ErrorKind>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Environment {
    variables: HashMap<String, f64>,
    functions: HashMap<String, Rc<Expr>>,
}

impl Environment {
    /// Creates an environment without user bindings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a name among builtins, variables and functions.
    pub fn lookup(&self, name: &str) -> Option<Binding> {
        if let Some(builtin) = BUILTINS.get(name) {
            return Some(match builtin {
                Builtin::Constant(value) => Binding::Constant(value),
                Builtin::Function(function) => Binding::Builtin(function),
            });
        }
        if let Some(&value) = self.variables.get(name) {
            return Some(Binding::Variable(value));
        }
        self.functions.get(name).cloned().map(Binding::Function)
    }

    /// Checks if the name is bound to anything, including builtins.
    pub fn contains(&self, name: &str) -> bool {
        BUILTINS.contains(name)
            || self.variables.contains_key(name)
            || self.functions.contains_key(name)
    }

    /// Gets a user variable.
    pub fn variable(&self, name: &str) -> Option<f64> {
        self.variables.get(name).copied()
    }

    /// Gets the body of a user function.
    pub fn function(&self, name: &str) -> Option<&Rc<Expr>> {
        self.functions.get(name)
    }

    /// Iterates over user variables sorted by name.
    pub fn variables(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        let mut variables: Vec<_> = self
            .variables
            .iter()
            .map(|(name, &value)| (name.as_str(), value))
            .collect();
        variables.sort_unstable_by_key(|(name, _)| *name);
        variables.into_iter()
    }

    /// Iterates over user functions sorted by name.
    pub fn functions(&self) -> impl Iterator<Item = (&str, &Rc<Expr>)> + '_ {
        let mut functions: Vec<_> = self
            .functions
            .iter()
            .map(|(name, body)| (name.as_str(), body))
            .collect();
        functions.sort_unstable_by_key(|(name, _)| *name);
        functions.into_iter()
    }

    /// Declares a new variable. Fails if the name is already bound.
    pub fn declare_variable(&mut self, name: &str, value: f64) -> Result<(), ErrorKind> {
        if self.contains(name) {
            return Err(ErrorKind::AlreadyExists(name.to_owned()));
        }
        tracing::debug!(name, value, "declared variable");
        self.variables.insert(name.to_owned(), value);
        Ok(())
    }

    /// Defines a new function. Fails if the name is already bound.
    pub fn define_function(&mut self, name: &str, body: Rc<Expr>) -> Result<(), ErrorKind> {
        if self.contains(name) {
            return Err(ErrorKind::AlreadyExists(name.to_owned()));
        }
        tracing::debug!(name, %body, "defined function");
        self.functions.insert(name.to_owned(), body);
        Ok(())
    }

    /// Removes a variable, returning its value. Builtins and functions cannot be removed.
    pub fn remove_variable(&mut self, name: &str) -> Result<f64, ErrorKind> {
        match self.lookup(name) {
            Some(Binding::Constant(_)) => Err(ErrorKind::DeleteConstant),
            Some(Binding::Builtin(_) | Binding::Function(_)) => Err(ErrorKind::DeleteFunction),
            Some(Binding::Variable(_)) | None => {
                let value = self
                    .variables
                    .remove(name)
                    .ok_or_else(|| ErrorKind::UnknownName(name.to_owned()))?;
                tracing::debug!(name, value, "removed variable");
                Ok(value)
            }
        }
    }

    /// Removes all user variables and functions.
    pub fn clear(&mut self) {
        tracing::debug!(
            variables = self.variables.len(),
            functions = self.functions.len(),
            "cleared environment"
        );
        self.variables.clear();
        self.functions.clear();
    }
}
