use crate::cursor::Position;
use regex::Error as RegexError;
use std::error::Error;
use std::fmt;

/*========================================*/
/*          Error Kind                    */
/*========================================*/

/// What went wrong in a hard failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A `(` with no matching `)`.
    UnclosedBracket,
    /// A function name that isn't followed by something it can be applied to.
    BadFunctionArgument,
    /// Input left over after a complete expression. Only raised by [`Trailing::Strict`].
    ///
    /// [`Trailing::Strict`]: crate::Trailing::Strict
    TrailingInput,
    /// Division by zero. Only raised by [`Arithmetic::Checked`].
    ///
    /// [`Arithmetic::Checked`]: crate::Arithmetic::Checked
    DivisionByZero,
    /// A function produced NaN from a number. Only raised by [`Arithmetic::Checked`].
    ///
    /// [`Arithmetic::Checked`]: crate::Arithmetic::Checked
    Domain,
    /// Brackets and function arguments nested deeper than the solver allows.
    TooDeep,
}

impl ErrorKind {
    /// A short, stable name for the kind, shown in the error header.
    pub fn code(self) -> &'static str {
        use ErrorKind::*;

        match self {
            UnclosedBracket => "unclosed-bracket",
            BadFunctionArgument => "bad-argument",
            TrailingInput => "trailing-input",
            DivisionByZero => "division-by-zero",
            Domain => "domain",
            TooDeep => "too-deep",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/*========================================*/
/*          Parse Error Cause             */
/*========================================*/

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseErrorCause {
    pub kind: ErrorKind,
    pub message: String,
    pub caret_message: String,
    pub span: (Position, Position),
}

impl ParseErrorCause {
    pub fn new(
        kind: ErrorKind,
        message: String,
        caret_message: &str,
        span: (Position, Position),
    ) -> ParseErrorCause {
        ParseErrorCause {
            kind,
            message,
            caret_message: caret_message.to_owned(),
            span,
        }
    }

    pub fn build_error(self, filename: &str, source: &str) -> ParseError {
        let line = self.span.0.line as usize;
        let line_contents = source.lines().nth(line).unwrap_or_default().to_owned();
        ParseError {
            kind: self.kind,
            message: self.message,
            caret_message: self.caret_message,
            filename: filename.to_owned(),
            line_contents,
            span: self.span,
        }
    }
}

/*========================================*/
/*          Parse Error                   */
/*========================================*/

/// A hard failure: the input started out looking like an expression, but then
/// went somewhere the grammar can't follow (or broke a rule that the
/// [`Solver`](crate::Solver) was configured to enforce).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    kind: ErrorKind,
    message: String,
    caret_message: String,
    filename: String,
    line_contents: String,
    span: (Position, Position),
}

impl ParseError {
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The region of the input that the error points at.
    pub fn span(&self) -> (Position, Position) {
        self.span
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use colored::Colorize;

        let (start, end) = self.span;
        let line_num = format!("{}", start.line + 1);
        let margin_width = line_num.len();
        let num_carets = if start.line == end.line {
            (end.utf8_col - start.utf8_col).max(1) as usize
        } else {
            self.line_contents
                .chars()
                .count()
                .saturating_sub(start.utf8_col as usize)
                .max(1)
        };

        writeln!(
            f,
            "{}{} {}",
            format!("error[{}]", self.kind).red().bold(),
            ":".bold(),
            self.message.bold(),
        )?;
        writeln!(
            f,
            "{:indent$}{} {}:{}:{}",
            "",
            "-->".blue().bold(),
            self.filename,
            start.line + 1,
            start.utf8_col + 1,
            indent = margin_width,
        )?;
        writeln!(
            f,
            "{:indent$}{}",
            "",
            "|".blue().bold(),
            indent = margin_width + 1
        )?;
        writeln!(
            f,
            "{} {}{}",
            line_num.blue().bold(),
            "|".blue().bold(),
            self.line_contents,
        )?;
        writeln!(
            f,
            "{:indent$}{}{:start$}{} {}",
            "",
            "|".blue().bold(),
            "",
            &"^".repeat(num_carets).red().bold(),
            self.caret_message.red().bold(),
            start = start.utf8_col as usize,
            indent = margin_width + 1
        )?;
        write!(
            f,
            "{:indent$}{}",
            "",
            "|".blue().bold(),
            indent = margin_width + 1
        )?;
        Ok(())
    }
}

impl Error for ParseError {}

/*========================================*/
/*          Solver Error                  */
/*========================================*/

/// A problem with how a [`Solver`](crate::Solver) was configured.
#[derive(Debug)]
pub enum SolverError {
    /// Invalid whitespace regex.
    RegexError(RegexError),
    /// A constant or function name that the grammar could never match sensibly.
    InvalidName { name: String, reason: &'static str },
}

impl fmt::Display for SolverError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use colored::Colorize;
        use SolverError::{InvalidName, RegexError};

        match self {
            RegexError(err) => write!(f, "{}", err),
            InvalidName { name, reason } => {
                let message = format!("'{}' {}", name, reason);
                write!(
                    f,
                    "{}{} {}",
                    "invalid symbol name".red().bold(),
                    ":".bold(),
                    message.bold()
                )
            }
        }
    }
}

impl Error for SolverError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SolverError::RegexError(err) => Some(err),
            SolverError::InvalidName { .. } => None,
        }
    }
}
