use thiserror::Error;

/// Evaluation of an expression failed.
///
/// During a search these failures only discard the candidate that produced them.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ArithmeticError {
    #[error("division by zero")]
    DivisionByZero,

    #[error("factorial is only defined for non-negative integers")]
    FactorialDomain,

    #[error("factorial operand is larger than {}", crate::primitive::MAX_FACTORIAL)]
    FactorialTooLarge,

    #[error("square root of a negative number")]
    NegativeRoot,

    #[error("square root is not a rational number")]
    IrrationalRoot,
}

/// Errors that point at a region of a typed expression.
pub mod kind {
    use ariadne::Fmt;
    use dice_attrs::ErrorKind;
    use dice_error::{DICE, EXPR};
    use super::ArithmeticError;
    use crate::expr::UnaryOp;

    /// A number in the expression is not the value of a die.
    #[derive(Debug, Clone, ErrorKind, PartialEq)]
    #[error(
        message = format!("`{}` is not a die", self.value),
        labels = ["this number"],
        help = format!("every number must be one of the white dice, which show {} through {}", "1".fg(DICE), "6".fg(DICE)),
    )]
    pub struct NotADie {
        /// The number that was written.
        pub value: u64,
    }

    /// A function other than `sqrt` was called.
    #[derive(Debug, Clone, ErrorKind, PartialEq)]
    #[error(
        message = format!("unknown function `{}`", self.name),
        labels = ["this function"],
        help = format!("the only function is {}", "sqrt".fg(EXPR)),
    )]
    pub struct UnknownFunction {
        /// The name of the function.
        pub name: String,
    }

    /// A function was called with the wrong number of arguments.
    #[derive(Debug, Clone, ErrorKind, PartialEq)]
    #[error(
        message = format!("`{}` takes {} argument, but {} were given", self.name, self.expected, self.given),
        labels = ["this call"],
    )]
    pub struct WrongArgumentCount {
        /// The name of the function.
        pub name: String,

        /// The number of arguments the function takes.
        pub expected: usize,

        /// The number of arguments that were given.
        pub given: usize,
    }

    /// A unary operator not permitted by the house rules was used.
    #[derive(Debug, Clone, ErrorKind, PartialEq)]
    #[error(
        message = format!("the {} operator is not allowed", self.op),
        labels = ["this operator"],
        help = "only the binary operators and the allowed unary operators may be used",
    )]
    pub struct UnaryNotAllowed {
        /// The operator that was used.
        pub op: UnaryOp,
    }

    /// The expression could not be evaluated.
    #[derive(Debug, Clone, ErrorKind, PartialEq)]
    #[error(
        message = "cannot evaluate this expression",
        labels = [self.reason.to_string()],
    )]
    pub struct EvaluationFailed {
        /// Why evaluation failed.
        pub reason: ArithmeticError,
    }
}
