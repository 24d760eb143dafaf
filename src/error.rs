//! Error types and handling for the exp-curve crate.
//!
//! Each stage of the pipeline reports its own failure family: the parser
//! produces [`ParseError`], the evaluator [`EvalError`], the curve fitter
//! [`FitError`] and the root finders [`RootFindError`]. None of them ever
//! substitutes a default value; deciding what to draw when a curve fails is
//! the caller's business.

use std::fmt;

use crate::Real;

/// Result type used throughout the crate.
///
/// This is a convenience type alias that uses the umbrella [`Error`] type for
/// the error variant.
pub type Result<T> = std::result::Result<T, Error>;

/// Error produced while turning a formula string into an [`Expression`](crate::Expression).
///
/// Positions are byte offsets into the source string.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    /// The source was empty or contained only whitespace.
    EmptyInput,

    /// A token appeared where the grammar does not allow it, including a
    /// leading binary operator, a trailing operator and unknown characters.
    UnexpectedToken {
        /// Byte offset of the offending token
        position: usize,
        /// Text of the offending token, or `end of input`
        found: String,
    },

    /// An opening parenthesis was never closed, or a closing one has no match.
    UnbalancedParens {
        /// Byte offset of the unmatched parenthesis
        position: usize,
        /// The parenthesis character that was left unmatched
        found: String,
    },

    /// An identifier outside the allow-list (`x`, `pi`, `e`, and the built-in
    /// function names).
    UnknownIdentifier { position: usize, name: String },

    /// A built-in function was called with the wrong number of arguments.
    WrongArity {
        /// Byte offset of the function name
        position: usize,
        /// Name of the function that was called
        name: String,
        /// Expected number of arguments
        expected: usize,
        /// Actual number of arguments provided
        found: usize,
    },

    /// A numeric literal could not be read, e.g. `1.2.3` or `4e`.
    InvalidNumber { position: usize, text: String },

    /// The input is too long, nests deeper than the parser allows, or would
    /// build a syntax tree taller than [`MAX_TREE_DEPTH`](crate::engine::MAX_TREE_DEPTH).
    TooComplex { limit: usize },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::EmptyInput => write!(f, "Empty expression"),
            ParseError::UnexpectedToken { position, found } => {
                write!(f, "Unexpected token at position {}: '{}'", position, found)
            }
            ParseError::UnbalancedParens { position, found } => {
                write!(
                    f,
                    "Unmatched parenthesis at position {}: found '{}'",
                    position, found
                )
            }
            ParseError::UnknownIdentifier { position, name } => {
                write!(f, "Unknown identifier at position {}: '{}'", position, name)
            }
            ParseError::WrongArity {
                position,
                name,
                expected,
                found,
            } => {
                write!(
                    f,
                    "Invalid function call to '{}' at position {}: expected {} arguments, found {}",
                    name, position, expected, found
                )
            }
            ParseError::InvalidNumber { position, text } => {
                write!(f, "Malformed number at position {}: '{}'", position, text)
            }
            ParseError::TooComplex { limit } => {
                write!(f, "Expression too complex: limit of {} exceeded", limit)
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// Error produced while evaluating a parsed curve at a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalError {
    /// The operation is undefined over the reals for its arguments:
    /// `sqrt` of a negative number, a negative base raised to a fractional
    /// exponent, or a non-finite `x`.
    Domain { operation: &'static str },

    /// Division by zero, including `0/0` and zero raised to a negative power.
    DivideByZero,

    /// Finite operands produced a result outside the range of `Real`.
    Overflow { operation: &'static str },
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::Domain { operation } => {
                write!(f, "Domain error: '{}' is undefined for its argument", operation)
            }
            EvalError::DivideByZero => write!(f, "Division by zero"),
            EvalError::Overflow { operation } => {
                write!(f, "Overflow: '{}' produced a non-finite result", operation)
            }
        }
    }
}

impl std::error::Error for EvalError {}

/// Error produced by the curve fitter.
#[derive(Debug, Clone, PartialEq)]
pub enum FitError {
    /// Fewer than two sample points were supplied.
    InsufficientPoints { found: usize },

    /// Lagrange interpolation received two points with the same x.
    DuplicateAbscissa { x: Real },

    /// The least-squares system is rank deficient.
    ///
    /// Usually every point shares one x-value. Callers typically fall back to
    /// a flat zero curve.
    SingularFit {
        /// Number of data points
        points: usize,
        /// Degree that was attempted after clamping
        degree: usize,
    },

    /// A sample point had a NaN or infinite coordinate.
    NonFinitePoint { index: usize },

    /// A method name other than `least_squares` or `lagrange`.
    UnknownMethod { name: String },
}

impl fmt::Display for FitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FitError::InsufficientPoints { found } => {
                write!(f, "Need at least 2 points to fit a curve, found {}", found)
            }
            FitError::DuplicateAbscissa { x } => {
                write!(f, "Duplicate x-value {} makes interpolation undefined", x)
            }
            FitError::SingularFit { points, degree } => write!(
                f,
                "Design matrix is singular; the data may be insufficient or collinear [n: {}, degree: {}]",
                points, degree
            ),
            FitError::NonFinitePoint { index } => {
                write!(f, "Point {} has a non-finite coordinate", index)
            }
            FitError::UnknownMethod { name } => write!(
                f,
                "Unknown fitting method '{}': expected 'least_squares' or 'lagrange'",
                name
            ),
        }
    }
}

impl std::error::Error for FitError {}

/// Error produced by the one-dimensional root finders.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RootFindError {
    /// `f(a)` and `f(b)` do not have opposite signs.
    InvalidBracket { a: Real, b: Real },

    /// Newton-Raphson hit a derivative smaller than `1e-10` in magnitude.
    DerivativeNearZero { at: Real, iterations: usize },

    /// Two successive secant function values were nearly equal.
    StagnantSecant { at: Real, iterations: usize },

    /// The tolerance was not met within the iteration budget.
    MaxIterationsExceeded { last: Real, iterations: usize },
}

impl fmt::Display for RootFindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RootFindError::InvalidBracket { a, b } => write!(
                f,
                "Function must have opposite signs at interval endpoints [{}, {}]",
                a, b
            ),
            RootFindError::DerivativeNearZero { at, iterations } => write!(
                f,
                "Derivative too close to zero at x = {} after {} iterations",
                at, iterations
            ),
            RootFindError::StagnantSecant { at, iterations } => write!(
                f,
                "Function values too close to continue secant method at x = {} after {} iterations",
                at, iterations
            ),
            RootFindError::MaxIterationsExceeded { last, iterations } => write!(
                f,
                "No convergence after {} iterations (last approximation {})",
                iterations, last
            ),
        }
    }
}

impl std::error::Error for RootFindError {}

/// Umbrella error for callers that chain parsing, evaluation and fitting.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    Parse(ParseError),
    Eval(EvalError),
    Fit(FitError),
    RootFind(RootFindError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Parse(err) => write!(f, "Parse error: {}", err),
            Error::Eval(err) => write!(f, "Evaluation error: {}", err),
            Error::Fit(err) => write!(f, "Fit error: {}", err),
            Error::RootFind(err) => write!(f, "Root finding error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Parse(err) => Some(err),
            Error::Eval(err) => Some(err),
            Error::Fit(err) => Some(err),
            Error::RootFind(err) => Some(err),
        }
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Error {
        Error::Parse(err)
    }
}

impl From<EvalError> for Error {
    fn from(err: EvalError) -> Error {
        Error::Eval(err)
    }
}

impl From<FitError> for Error {
    fn from(err: FitError) -> Error {
        Error::Fit(err)
    }
}

impl From<RootFindError> for Error {
    fn from(err: RootFindError) -> Error {
        Error::RootFind(err)
    }
}
