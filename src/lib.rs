//! # infix_solve
//!
//! **Evaluate arithmetic expressions straight from text.**
//!
//! ```
//! use infix_solve::solve;
//!
//! assert_eq!(solve("2+3*4"), Ok(Some(14.0)));
//! assert_eq!(solve("2(3+4)"), Ok(Some(14.0)));
//! assert_eq!(solve("-5 + 2"), Ok(Some(-3.0)));
//! assert_eq!(solve(""), Ok(None));
//! assert!(solve("(2+3").is_err());
//! ```
//!
//! ## Overview
//!
//! Expressions are made of:
//!
//! - numbers, like `3`, `2.5`, `.5`, or `7.` (no exponents, no signs)
//! - constants: `pi` and `e`
//! - functions of one argument, like `sqrt(2)` or `sin pi`
//! - brackets
//! - the operators `+`, `-`, `*`, and `/`
//!
//! Multiplication and division bind tighter than addition and subtraction, and
//! putting two things next to each other multiplies them: `2pi`, `3(1+1)`, and
//! `2 e` are all products.
//!
//! There is no syntax tree. The expression is evaluated as it's parsed, by a set
//! of mutually recursive grammar rules that backtrack when an alternative doesn't
//! match.
//!
//! ### Three kinds of outcome
//!
//! [`solve`] returns a `Result<Option<f64>, ParseError>`:
//!
//! - `Ok(Some(value))`: the input started with an expression, and this is its value.
//! - `Ok(None)`: the input didn't start with anything that looks like an
//!   expression (it's empty, or it's `"*3"`, or it's an unknown name).
//! - `Err(error)`: the input started out fine and then went wrong in a way that
//!   can't be read any other way: an unclosed bracket, or a function name with
//!   nothing after it to apply it to.
//!
//! By default, text left over after a complete expression is ignored, and
//! arithmetic follows IEEE rules, so dividing by zero gives an infinity. Both can
//! be changed with a [`Solver`]:
//!
//! ```
//! use infix_solve::{Arithmetic, ErrorKind, Solver, SolverError, Trailing};
//!
//! let mut solver = Solver::new();
//! solver
//!     .constant("tau", std::f64::consts::TAU)?
//!     .function("double", |x| 2.0 * x)?
//!     .trailing(Trailing::Strict)
//!     .arithmetic(Arithmetic::Checked);
//!
//! assert_eq!(solver.evaluate("input", "double(tau) / (2pi)"), Ok(Some(2.0)));
//!
//! let err = solver.evaluate("input", "1/0").unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::DivisionByZero);
//!
//! let err = solver.evaluate("input", "1 + 1 apples").unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::TrailingInput);
//! # Ok::<(), SolverError>(())
//! ```
//!
//! ### Names
//!
//! Constants and functions are looked up by longest prefix: at each position,
//! the longest registered name that the rest of the input starts with is the
//! one that matches. Constants are tried before functions, so a function name
//! that starts with a constant name (like `exp`, which starts with `e`) will
//! never be reached.
//!
//! ### Errors
//!
//! A [`ParseError`] displays as a diagnostic pointing into the input:
//!
//! ```
//! # use infix_solve::solve;
//! colored::control::set_override(false);
//! let err = solve("(2+3").unwrap_err();
//! assert_eq!(format!("{}", err),
//! "error[unclosed-bracket]: expected ')' but found end of input
//!  --> input:1:1
//!   |
//! 1 |(2+3
//!   |^ unclosed '('
//!   |");
//! ```

mod cursor;
mod parse_error;
mod rules;
mod symbols;

use cursor::anchored_regex;
use log::debug;
use once_cell::sync::Lazy;
use parse_error::ParseErrorCause;
use regex::Regex;
use rules::Evaluator;

/*========================================*/
/*          Interface                     */
/*========================================*/

pub use cursor::{Cursor, Mark, Position};
pub use parse_error::{ErrorKind, ParseError, SolverError};
pub use symbols::{SymbolTable, UnaryFunction};

pub(crate) enum ParseResult<T> {
    /// The rule matched, and produced a T.
    Success(T),
    /// The rule didn't match, and the cursor is back where it started. There's
    /// no error message here b.c. our caller is going to try something else.
    Failure,
    /// A fatal error. We're going to abort the entire evaluation with this message.
    Error(ParseErrorCause),
}

/// What to do with input left over after a complete expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Trailing {
    /// Ignore it: `"2+3 oops"` is `5`.
    #[default]
    Permissive,
    /// Raise [`ErrorKind::TrailingInput`].
    Strict,
}

/// How to treat arithmetic that has no real-valued answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Arithmetic {
    /// Follow IEEE 754: `1/0` is infinity and `sqrt(-1)` is NaN.
    #[default]
    Ieee,
    /// Raise [`ErrorKind::DivisionByZero`] for a zero divisor, and
    /// [`ErrorKind::Domain`] when a function turns a number into NaN.
    Checked,
}

/*========================================*/
/*          Solver                        */
/*========================================*/

/// White space as defined by the Pattern_White_Space Unicode property.
const UNICODE_WHITESPACE_REGEX: &str =
    "[\\u0009\\u000A\\u000B\\u000C\\u000D\\u0020\\u0085\\u200E\\u200F\\u2028\\u2029]*";

/// A run of digits with at most one decimal point, and at least one digit.
const NUMBER_REGEX: &str = r"[0-9]+\.?[0-9]*|\.[0-9]+";

const DEFAULT_MAX_DEPTH: usize = 256;

/// The constants, functions, and policies that expressions are evaluated with.
///
/// Build one once and call [`Solver::evaluate`] as many times as you like; it's
/// never modified by evaluation, so it can be shared between threads.
#[derive(Debug, Clone)]
pub struct Solver {
    pub(crate) whitespace: Regex,
    pub(crate) number: Regex,
    pub(crate) constants: SymbolTable<f64>,
    pub(crate) functions: SymbolTable<Box<dyn UnaryFunction>>,
    pub(crate) trailing: Trailing,
    pub(crate) arithmetic: Arithmetic,
    pub(crate) max_depth: usize,
}

static DEFAULT_SOLVER: Lazy<Solver> = Lazy::new(Solver::new);

/// Evaluate `expression` with the default constants, functions, and policies.
///
/// See the [crate docs](crate) for what the three kinds of result mean.
pub fn solve(expression: &str) -> Result<Option<f64>, ParseError> {
    DEFAULT_SOLVER.evaluate("input", expression)
}

impl Solver {
    /// A solver with the default constants and functions, that uses the
    /// `Pattern_White_Space` Unicode property for whitespace.
    pub fn new() -> Solver {
        let whitespace = anchored_regex(UNICODE_WHITESPACE_REGEX).unwrap();
        Solver::with_regex(whitespace)
    }

    /// A solver with the default constants and functions, and a custom regex
    /// for whitespace.
    pub fn with_whitespace(whitespace_regex: &str) -> Result<Solver, SolverError> {
        let whitespace = anchored_regex(whitespace_regex).map_err(SolverError::RegexError)?;
        Ok(Solver::with_regex(whitespace))
    }

    /// A solver with no constants and no functions.
    pub fn bare() -> Solver {
        let mut solver = Solver::new();
        solver.constants = SymbolTable::new();
        solver.functions = SymbolTable::new();
        solver
    }

    fn with_regex(whitespace: Regex) -> Solver {
        Solver {
            whitespace,
            number: anchored_regex(NUMBER_REGEX).unwrap(),
            constants: symbols::default_constants(),
            functions: symbols::default_functions(),
            trailing: Trailing::default(),
            arithmetic: Arithmetic::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Register a constant, or replace the value of an existing one.
    pub fn constant(&mut self, name: &str, value: f64) -> Result<&mut Solver, SolverError> {
        validate_name(name)?;
        self.constants.insert(name, value);
        Ok(self)
    }

    /// Register a function of one argument, or replace an existing one.
    pub fn function(
        &mut self,
        name: &str,
        func: impl Fn(f64) -> f64 + Clone + Send + Sync + 'static,
    ) -> Result<&mut Solver, SolverError> {
        validate_name(name)?;
        self.functions.insert(name, Box::new(func));
        Ok(self)
    }

    pub fn trailing(&mut self, trailing: Trailing) -> &mut Solver {
        self.trailing = trailing;
        self
    }

    pub fn arithmetic(&mut self, arithmetic: Arithmetic) -> &mut Solver {
        self.arithmetic = arithmetic;
        self
    }

    /// How deeply brackets and function arguments may nest before evaluation
    /// gives up with [`ErrorKind::TooDeep`].
    pub fn max_depth(&mut self, max_depth: usize) -> &mut Solver {
        self.max_depth = max_depth;
        self
    }

    pub fn constants(&self) -> &SymbolTable<f64> {
        &self.constants
    }

    pub fn functions(&self) -> &SymbolTable<Box<dyn UnaryFunction>> {
        &self.functions
    }

    /// Evaluate `input`. `filename` is used only for error messages.
    pub fn evaluate(&self, filename: &str, input: &str) -> Result<Option<f64>, ParseError> {
        use ParseResult::{Error, Failure, Success};

        debug!("evaluating {:?}", input);
        let mut evaluator = Evaluator::new(self, input);
        match evaluator.solve() {
            Success(value) => {
                debug!("{:?} = {}", input, value);
                Ok(Some(value))
            }
            Failure => {
                debug!("{:?} is not an expression", input);
                Ok(None)
            }
            Error(cause) => {
                debug!("{:?} failed: {:?}: {}", input, cause.kind, cause.message);
                Err(cause.build_error(filename, input))
            }
        }
    }
}

impl Default for Solver {
    fn default() -> Self {
        Solver::new()
    }
}

fn validate_name(name: &str) -> Result<(), SolverError> {
    let invalid = |reason| {
        Err(SolverError::InvalidName {
            name: name.to_owned(),
            reason,
        })
    };

    let first = match name.chars().next() {
        Some(ch) => ch,
        None => return invalid("is empty"),
    };
    if first.is_ascii_digit() || first == '.' {
        return invalid("starts like a number");
    }
    if name
        .chars()
        .any(|ch| ch.is_whitespace() || "+-*/()".contains(ch))
    {
        return invalid("contains whitespace, an operator, or a bracket");
    }
    Ok(())
}
