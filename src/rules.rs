//! The grammar, one method per rule, from loosest to tightest binding:
//!
//! ```text
//! term         = signed_chain signed_chain*
//! signed_chain = ('+' | '-')? object continuation*
//! continuation = ('*' | '/')? object
//! object       = number | bracketed | constant | function
//! bracketed    = '(' term ')'
//! function     = NAME object
//! ```
//!
//! There's no syntax tree: each rule computes its value as it matches. A rule
//! that doesn't match returns `Failure` and leaves the cursor exactly where it
//! found it, so the caller can try something else. A rule that matched far
//! enough to be sure of what it's looking at, and then couldn't finish, returns
//! `Error` instead, which aborts the whole evaluation.

use crate::cursor::{Cursor, Mark};
use crate::parse_error::{ErrorKind, ParseErrorCause};
use crate::{Arithmetic, ParseResult, Solver, Trailing};
use log::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MultOp {
    Mult,
    Div,
}

pub(crate) struct Evaluator<'s> {
    cursor: Cursor<'s>,
    solver: &'s Solver,
    depth: usize,
}

impl<'s> Evaluator<'s> {
    pub(crate) fn new(solver: &'s Solver, source: &'s str) -> Evaluator<'s> {
        Evaluator {
            cursor: Cursor::with_whitespace(source, &solver.whitespace),
            solver,
            depth: 0,
        }
    }

    /// Evaluate the whole input, applying the solver's trailing-input policy.
    pub(crate) fn solve(&mut self) -> ParseResult<f64> {
        use ParseResult::{Error, Failure, Success};

        let value = match self.term() {
            Success(value) => value,
            Failure => return Failure,
            Error(err) => return Error(err),
        };

        self.cursor.skip_whitespace();
        if self.cursor.at_end() {
            return Success(value);
        }
        match self.solver.trailing {
            Trailing::Permissive => {
                trace!("ignoring trailing input {:?}", self.cursor.remaining());
                Success(value)
            }
            Trailing::Strict => {
                let start = self.cursor.mark();
                let found = self.cursor.slice(1);
                let end = self.cursor.mark();
                Error(self.cause(
                    ErrorKind::TrailingInput,
                    format!("unexpected '{}' after a complete expression", found),
                    "unexpected",
                    start,
                    end,
                ))
            }
        }
    }

    /*========================================*/
    /*          Term                          */
    /*========================================*/

    /// One signed chain, then as many more as will match, summed. Subtraction is
    /// just a chain whose leading sign is `-`.
    fn term(&mut self) -> ParseResult<f64> {
        use ParseResult::{Error, Failure, Success};

        let mut sum = match self.signed_chain() {
            Success(value) => value,
            Failure => return Failure,
            Error(err) => return Error(err),
        };
        loop {
            match self.signed_chain() {
                Success(value) => sum += value,
                Failure => break,
                Error(err) => return Error(err),
            }
        }
        Success(sum)
    }

    /*========================================*/
    /*          Signed Chain                  */
    /*========================================*/

    /// An optional sign, an object, and any number of multiplicative
    /// continuations. The sign only ever applies to the first object.
    fn signed_chain(&mut self) -> ParseResult<f64> {
        use ParseResult::{Error, Failure, Success};

        let mark = self.cursor.mark();
        self.cursor.skip_whitespace();
        let sign = if self.cursor.eat("+") {
            1.0
        } else if self.cursor.eat("-") {
            -1.0
        } else {
            1.0
        };

        let mut product = match self.object() {
            Success(value) => sign * value,
            Failure => {
                trace!("no chain at offset {}", mark.offset());
                self.cursor.seek(mark);
                return Failure;
            }
            Error(err) => return Error(err),
        };
        loop {
            match self.continuation(product) {
                Success(value) => product = value,
                Failure => break,
                Error(err) => return Error(err),
            }
        }
        Success(product)
    }

    /*========================================*/
    /*          Continuation                  */
    /*========================================*/

    /// `* object`, `/ object`, or, with no operator, just `object` (implicit
    /// multiplication). Returns the new running product.
    fn continuation(&mut self, product: f64) -> ParseResult<f64> {
        use ParseResult::{Error, Failure, Success};

        let mark = self.cursor.mark();
        self.cursor.skip_whitespace();
        let op = if self.cursor.eat("*") {
            MultOp::Mult
        } else if self.cursor.eat("/") {
            MultOp::Div
        } else {
            MultOp::Mult
        };

        self.cursor.skip_whitespace();
        let operand_start = self.cursor.mark();
        let operand = match self.object() {
            Success(value) => value,
            Failure => {
                trace!("no continuation at offset {}", mark.offset());
                self.cursor.seek(mark);
                return Failure;
            }
            Error(err) => return Error(err),
        };

        match op {
            MultOp::Mult => Success(product * operand),
            MultOp::Div => {
                if operand == 0.0 && self.solver.arithmetic == Arithmetic::Checked {
                    let operand_end = self.cursor.mark();
                    return Error(self.cause(
                        ErrorKind::DivisionByZero,
                        "division by zero".to_owned(),
                        "this is zero",
                        operand_start,
                        operand_end,
                    ));
                }
                Success(product / operand)
            }
        }
    }

    /*========================================*/
    /*          Object                        */
    /*========================================*/

    fn object(&mut self) -> ParseResult<f64> {
        use ParseResult::{Error, Failure, Success};

        let mark = self.cursor.mark();
        self.cursor.skip_whitespace();

        let alternatives: [fn(&mut Self) -> ParseResult<f64>; 4] = [
            Self::number,
            Self::bracketed,
            Self::constant,
            Self::function,
        ];
        for alternative in alternatives {
            match alternative(self) {
                Success(value) => return Success(value),
                Error(err) => return Error(err),
                Failure => (),
            }
        }
        self.cursor.seek(mark);
        Failure
    }

    /*========================================*/
    /*          Number                        */
    /*========================================*/

    /// Digits with at most one decimal point.
    fn number(&mut self) -> ParseResult<f64> {
        let mark = self.cursor.mark();
        let digits = match self.cursor.eat_regex(&self.solver.number) {
            Some(digits) => digits,
            None => return ParseResult::Failure,
        };
        match digits.parse::<f64>() {
            Ok(value) => ParseResult::Success(value),
            Err(_) => {
                self.cursor.seek(mark);
                ParseResult::Failure
            }
        }
    }

    /*========================================*/
    /*          Bracketed                     */
    /*========================================*/

    fn bracketed(&mut self) -> ParseResult<f64> {
        use ParseResult::{Error, Failure, Success};

        let open = self.cursor.mark();
        if !self.cursor.eat("(") {
            return Failure;
        }
        let after_open = self.cursor.mark();

        let value = match self.nested(open, after_open, Self::term) {
            Success(value) => Some(value),
            Failure => None,
            Error(err) => return Error(err),
        };

        self.cursor.skip_whitespace();
        match value {
            Some(value) if self.cursor.eat(")") => Success(value),
            // `()` has nothing to evaluate, but it isn't left open either.
            None if self.cursor.peek() == Some(')') => {
                self.cursor.seek(open);
                Failure
            }
            _ => Error(self.cause(
                ErrorKind::UnclosedBracket,
                format!("expected ')' but found {}", self.found()),
                "unclosed '('",
                open,
                after_open,
            )),
        }
    }

    /*========================================*/
    /*          Constant                      */
    /*========================================*/

    fn constant(&mut self) -> ParseResult<f64> {
        let solver = self.solver;
        match solver.constants.longest_prefix(self.cursor.remaining()) {
            Some((name, value)) => {
                self.cursor.eat(name);
                ParseResult::Success(*value)
            }
            None => ParseResult::Failure,
        }
    }

    /*========================================*/
    /*          Function                      */
    /*========================================*/

    /// A function name applied to the single object that follows it. Once the
    /// name has matched, a missing argument is an error rather than a failure.
    fn function(&mut self) -> ParseResult<f64> {
        use ParseResult::{Error, Failure, Success};

        let solver = self.solver;
        let name_start = self.cursor.mark();
        let (name, func) = match solver.functions.longest_prefix(self.cursor.remaining()) {
            Some(entry) => entry,
            None => return Failure,
        };
        self.cursor.eat(name);
        let name_end = self.cursor.mark();

        let arg = match self.nested(name_start, name_end, Self::object) {
            Success(arg) => arg,
            Failure => {
                return Error(self.cause(
                    ErrorKind::BadFunctionArgument,
                    format!(
                        "expected an argument for '{}' but found {}",
                        name,
                        self.found()
                    ),
                    "needs an argument",
                    name_start,
                    name_end,
                ));
            }
            Error(err) => return Error(err),
        };

        let result = func.call(arg);
        if result.is_nan() && !arg.is_nan() && solver.arithmetic == Arithmetic::Checked {
            let call_end = self.cursor.mark();
            return Error(self.cause(
                ErrorKind::Domain,
                format!("'{}' is undefined at {}", name, arg),
                "undefined here",
                name_start,
                call_end,
            ));
        }
        Success(result)
    }

    /*========================================*/
    /*          Helpers                       */
    /*========================================*/

    /// Run `rule` one nesting level deeper, refusing to go past the solver's
    /// depth limit. `start..end` is what gets underlined if we do.
    fn nested(
        &mut self,
        start: Mark,
        end: Mark,
        rule: fn(&mut Self) -> ParseResult<f64>,
    ) -> ParseResult<f64> {
        if self.depth >= self.solver.max_depth {
            return ParseResult::Error(self.cause(
                ErrorKind::TooDeep,
                format!(
                    "expression is nested more than {} levels deep",
                    self.solver.max_depth
                ),
                "too deep",
                start,
                end,
            ));
        }
        self.depth += 1;
        let result = rule(self);
        self.depth -= 1;
        result
    }

    /// The next character after any whitespace, for error messages. Doesn't
    /// move the cursor.
    fn found(&self) -> String {
        let mut lookahead = self.cursor.clone();
        lookahead.skip_whitespace();
        match lookahead.peek() {
            Some(ch) => format!("'{}'", ch),
            None => "end of input".to_owned(),
        }
    }

    fn cause(
        &self,
        kind: ErrorKind,
        message: String,
        caret_message: &str,
        start: Mark,
        end: Mark,
    ) -> ParseErrorCause {
        let span = (self.cursor.position_of(start), self.cursor.position_of(end));
        ParseErrorCause::new(kind, message, caret_message, span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DEFAULT_SOLVER;
    use proptest::prelude::*;
    use rstest::rstest;

    #[derive(Debug, Clone, Copy)]
    enum Rule {
        Term,
        SignedChain,
        Continuation,
        Object,
        Number,
        Bracketed,
        Constant,
        Function,
    }

    const ALL_RULES: [Rule; 8] = [
        Rule::Term,
        Rule::SignedChain,
        Rule::Continuation,
        Rule::Object,
        Rule::Number,
        Rule::Bracketed,
        Rule::Constant,
        Rule::Function,
    ];

    impl Rule {
        fn run(self, evaluator: &mut Evaluator) -> ParseResult<f64> {
            match self {
                Rule::Term => evaluator.term(),
                Rule::SignedChain => evaluator.signed_chain(),
                Rule::Continuation => evaluator.continuation(2.0),
                Rule::Object => evaluator.object(),
                Rule::Number => evaluator.number(),
                Rule::Bracketed => evaluator.bracketed(),
                Rule::Constant => evaluator.constant(),
                Rule::Function => evaluator.function(),
            }
        }
    }

    /// Run `rule` on `input`, starting `skip` characters in, and return where
    /// the cursor was before and after.
    fn run_from(rule: Rule, input: &str, skip: usize) -> (ParseResult<f64>, Mark, Mark) {
        let mut evaluator = Evaluator::new(&DEFAULT_SOLVER, input);
        evaluator.cursor.slice(skip);
        let before = evaluator.cursor.mark();
        let result = rule.run(&mut evaluator);
        (result, before, evaluator.cursor.mark())
    }

    #[rstest]
    #[case(Rule::Object, " *3", 0)]
    #[case(Rule::Object, " foo", 0)]
    #[case(Rule::Object, " ()", 0)]
    #[case(Rule::Object, "1 )", 1)]
    #[case(Rule::Object, "", 0)]
    #[case(Rule::Continuation, " * +", 0)]
    #[case(Rule::Continuation, " / )", 0)]
    #[case(Rule::Continuation, "2 oops", 1)]
    #[case(Rule::SignedChain, " - *3", 0)]
    #[case(Rule::SignedChain, " + ()", 0)]
    #[case(Rule::SignedChain, "1 + bar", 3)]
    #[case(Rule::Term, "  -", 0)]
    #[case(Rule::Bracketed, "()", 0)]
    #[case(Rule::Bracketed, "( \t)", 0)]
    #[case(Rule::Bracketed, "1(2)", 0)]
    #[case(Rule::Function, "foo(1)", 0)]
    #[case(Rule::Function, "2 sin 1", 0)]
    #[case(Rule::Constant, "x", 0)]
    #[case(Rule::Number, ".", 0)]
    fn test_failure_restores_cursor(
        #[case] rule: Rule,
        #[case] input: &str,
        #[case] skip: usize,
    ) {
        match run_from(rule, input, skip) {
            (ParseResult::Failure, before, after) => assert_eq!(before, after),
            (ParseResult::Success(value), _, _) => {
                panic!("{:?} on {:?} unexpectedly gave {}", rule, input, value)
            }
            (ParseResult::Error(err), _, _) => {
                panic!("{:?} on {:?} unexpectedly failed: {}", rule, input, err.message)
            }
        }
    }

    #[rstest]
    #[case("2*(", 2)]
    #[case("(", 0)]
    #[case("(*2)", 0)]
    #[case("((1)", 0)]
    fn test_opened_bracket_is_never_a_failure(#[case] input: &str, #[case] skip: usize) {
        match run_from(Rule::Bracketed, input, skip).0 {
            ParseResult::Error(err) => assert_eq!(err.kind, ErrorKind::UnclosedBracket),
            ParseResult::Success(_) | ParseResult::Failure => {
                panic!("{:?} should be an unclosed bracket", input)
            }
        }
    }

    proptest! {
        #[test]
        fn test_any_failure_restores_cursor(
            input in "[0-9a-z+*/(). -]{0,16}",
            skip in 0usize..4,
        ) {
            for rule in ALL_RULES {
                if let (ParseResult::Failure, before, after) = run_from(rule, &input, skip) {
                    prop_assert_eq!(before, after, "{:?} on {:?}", rule, input);
                }
            }
        }
    }
}
