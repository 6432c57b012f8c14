use dyn_clone::{clone_box, DynClone};
use std::f64::consts;
use std::fmt;

/*========================================*/
/*          Unary Function                */
/*========================================*/

/// A function of one numeric argument that can be registered with
/// [`Solver::function`](crate::Solver::function).
///
/// Implemented for every `Fn(f64) -> f64 + Clone + Send + Sync`, so closures and
/// plain `fn`s both work.
pub trait UnaryFunction: DynClone + Send + Sync {
    fn call(&self, arg: f64) -> f64;
}

impl<F: Fn(f64) -> f64 + Clone + Send + Sync> UnaryFunction for F {
    fn call(&self, arg: f64) -> f64 {
        self(arg)
    }
}

impl Clone for Box<dyn UnaryFunction> {
    fn clone(&self) -> Self {
        clone_box(self.as_ref())
    }
}

impl fmt::Debug for dyn UnaryFunction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "<function>")
    }
}

/*========================================*/
/*          Symbol Table                  */
/*========================================*/

/// Named values, kept in insertion order.
///
/// Lookups are by prefix: given the remaining input, find the longest name it
/// starts with. Among names of equal length the earlier entry wins, which can
/// only happen if the same name was inserted twice (and [`SymbolTable::insert`]
/// prevents that).
#[derive(Debug, Clone)]
pub struct SymbolTable<T>(Vec<(String, T)>);

impl<T> SymbolTable<T> {
    pub fn new() -> SymbolTable<T> {
        SymbolTable(Vec::new())
    }

    /// Add `name`. If it's already present, its value is replaced and it keeps
    /// its place in the table.
    pub fn insert(&mut self, name: &str, value: T) {
        for (existing_name, existing_value) in self.0.iter_mut() {
            if existing_name.as_str() == name {
                *existing_value = value;
                return;
            }
        }
        self.0.push((name.to_owned(), value));
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.0
            .iter()
            .find(|(existing, _)| existing.as_str() == name)
            .map(|(_, value)| value)
    }

    /// The longest entry whose name is a prefix of `input`.
    pub fn longest_prefix(&self, input: &str) -> Option<(&str, &T)> {
        let mut best: Option<(&str, &T)> = None;
        for (name, value) in &self.0 {
            if !input.starts_with(name.as_str()) {
                continue;
            }
            let is_best = match best {
                Some((best_name, _)) => name.len() > best_name.len(),
                None => true,
            };
            if is_best {
                best = Some((name.as_str(), value));
            }
        }
        best
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<T> Default for SymbolTable<T> {
    fn default() -> Self {
        SymbolTable::new()
    }
}

/*========================================*/
/*          Default Tables                */
/*========================================*/

pub(crate) fn default_constants() -> SymbolTable<f64> {
    let mut table = SymbolTable::new();
    table.insert("pi", consts::PI);
    table.insert("e", consts::E);
    table
}

// Object tries constants before functions, so none of these may start with a
// default constant name (which is why there's no `exp`).
pub(crate) fn default_functions() -> SymbolTable<Box<dyn UnaryFunction>> {
    let builtins: [(&str, fn(f64) -> f64); 17] = [
        ("sin", f64::sin),
        ("cos", f64::cos),
        ("tan", f64::tan),
        ("asin", f64::asin),
        ("acos", f64::acos),
        ("atan", f64::atan),
        ("sinh", f64::sinh),
        ("cosh", f64::cosh),
        ("tanh", f64::tanh),
        ("sqrt", f64::sqrt),
        ("cbrt", f64::cbrt),
        ("ln", f64::ln),
        ("log", f64::log10),
        ("abs", f64::abs),
        ("floor", f64::floor),
        ("ceil", f64::ceil),
        ("round", f64::round),
    ];
    let mut table: SymbolTable<Box<dyn UnaryFunction>> = SymbolTable::new();
    for (name, func) in builtins {
        table.insert(name, Box::new(func));
    }
    table
}
