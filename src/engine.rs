use core::fmt;
use core::str::FromStr;

use crate::Real;
use crate::error::{EvalError, ParseError};
use crate::eval::eval_ast;
use crate::functions::Function;
use crate::lexer::{Lexer, Token};
use crate::types::{AstExpr, BinaryOp, NamedConstant, TokenKind};

/// Longest source string the parser accepts, in bytes.
pub const MAX_EXPRESSION_LENGTH: usize = 10_000;

/// Deepest nesting of sub-expressions the parser accepts.
pub const MAX_RECURSION_DEPTH: usize = 256;

/// Tallest syntax tree the parser will build.
///
/// Evaluation, rendering and comparison all walk the tree recursively, so its
/// height is bounded here rather than by the thread's stack. Left-associative
/// chains such as `x+x+...+x` grow the tree without nesting the parser.
pub const MAX_TREE_DEPTH: usize = 256;

const VARIABLE_NAME: &str = "x";

/// Pratt parser for single-variable formulas
struct PrattParser<'a> {
    lexer: Lexer<'a>,
    current: Option<Token>,
    recursion_depth: usize,
    paren_depth: usize,
}

/// A parsed sub-expression together with the height of its tree
struct Subtree {
    ast: AstExpr,
    height: usize,
}

impl Subtree {
    fn leaf(ast: AstExpr) -> Self {
        Self { ast, height: 1 }
    }

    fn node(ast: AstExpr, height: usize) -> Result<Self, ParseError> {
        if height > MAX_TREE_DEPTH {
            return Err(ParseError::TooComplex {
                limit: MAX_TREE_DEPTH,
            });
        }
        Ok(Self { ast, height })
    }

    fn negate(inner: Subtree) -> Result<Self, ParseError> {
        Self::node(AstExpr::Negate(Box::new(inner.ast)), inner.height + 1)
    }

    fn binary(op: BinaryOp, lhs: Subtree, rhs: Subtree) -> Result<Self, ParseError> {
        let height = lhs.height.max(rhs.height) + 1;
        Self::node(AstExpr::binary(op, lhs.ast, rhs.ast), height)
    }

    fn call(func: Function, arg: Subtree) -> Result<Self, ParseError> {
        Self::node(AstExpr::call(func, arg.ast), arg.height + 1)
    }
}

/// Token binding powers for the Pratt parser
#[derive(Debug, Clone, Copy)]
struct BindingPower {
    left: u8,
    right: u8,
}

impl BindingPower {
    const fn new(left: u8, right: u8) -> Self {
        Self { left, right }
    }

    // For left-associative operators, right binding power is left + 1
    const fn left_assoc(power: u8) -> Self {
        Self::new(power, power + 1)
    }

    // For right-associative operators, right binding power is same as left
    const fn right_assoc(power: u8) -> Self {
        Self::new(power, power)
    }
}

// Must be lower than `^` so that -2^2 parses as -(2^2)
const PREFIX_BINDING_POWER: u8 = 14;

impl<'a> PrattParser<'a> {
    fn new(input: &'a str) -> Self {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token();
        Self {
            lexer,
            current,
            recursion_depth: 0,
            paren_depth: 0,
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.current.as_ref()
    }

    fn next(&mut self) -> Option<Token> {
        let tok = self.current.take();
        self.current = self.lexer.next_token();
        tok
    }

    fn end_position(&self) -> usize {
        self.lexer.get_original_input().len()
    }

    fn unexpected_end(&self) -> ParseError {
        ParseError::UnexpectedToken {
            position: self.end_position(),
            found: "end of input".to_string(),
        }
    }

    // Get binding power for a binary operator
    fn get_binding_power(op: BinaryOp) -> BindingPower {
        match op {
            BinaryOp::Add | BinaryOp::Sub => BindingPower::left_assoc(9),
            BinaryOp::Mul | BinaryOp::Div => BindingPower::left_assoc(10),
            BinaryOp::Pow => BindingPower::right_assoc(15),
        }
    }

    /// Turns a token the grammar cannot accept here into the matching error.
    fn reject(&self, tok: &Token) -> ParseError {
        match tok.kind {
            TokenKind::Error if tok.text.starts_with(|c: char| c.is_ascii_digit() || c == '.') => {
                ParseError::InvalidNumber {
                    position: tok.position,
                    text: tok.text.clone(),
                }
            }
            TokenKind::Close if self.paren_depth == 0 => ParseError::UnbalancedParens {
                position: tok.position,
                found: tok.text.clone(),
            },
            _ => ParseError::UnexpectedToken {
                position: tok.position,
                found: tok.text.clone(),
            },
        }
    }

    fn parse_expr(&mut self, min_bp: u8) -> Result<Subtree, ParseError> {
        // Check recursion depth to prevent stack overflow
        self.recursion_depth += 1;
        if self.recursion_depth > MAX_RECURSION_DEPTH {
            return Err(ParseError::TooComplex {
                limit: MAX_RECURSION_DEPTH,
            });
        }

        let lhs = self.parse_prefix_or_primary()?;
        let lhs = self.parse_infix_operators(lhs, min_bp)?;

        self.recursion_depth -= 1;
        Ok(lhs)
    }

    fn parse_prefix_or_primary(&mut self) -> Result<Subtree, ParseError> {
        let prefix = match self.peek() {
            Some(tok) if tok.kind == TokenKind::Operator && (tok.text == "-" || tok.text == "+") => {
                Some(tok.text == "-")
            }
            _ => None,
        };

        match prefix {
            Some(negate) => {
                self.next();
                let rhs = self.parse_expr(PREFIX_BINDING_POWER)?;
                if negate {
                    Subtree::negate(rhs)
                } else {
                    // Unary + is a no-op
                    Ok(rhs)
                }
            }
            None => self.parse_primary(),
        }
    }

    fn parse_infix_operators(&mut self, mut lhs: Subtree, min_bp: u8) -> Result<Subtree, ParseError> {
        loop {
            let op = match self.peek() {
                Some(tok) if tok.kind == TokenKind::Operator => BinaryOp::from_symbol(&tok.text),
                _ => None,
            };
            let Some(op) = op else {
                break;
            };

            let bp = Self::get_binding_power(op);
            if bp.left < min_bp {
                break;
            }

            // Consume the operator
            self.next();
            let rhs = self.parse_expr(bp.right)?;
            lhs = Subtree::binary(op, lhs, rhs)?;
        }
        Ok(lhs)
    }

    // Parse a primary expression (number, identifier, call, parenthesized expression)
    fn parse_primary(&mut self) -> Result<Subtree, ParseError> {
        let tok = match self.next() {
            Some(tok) => tok,
            None => return Err(self.unexpected_end()),
        };

        match tok.kind {
            TokenKind::Number => match tok.value {
                Some(val) => Ok(Subtree::leaf(AstExpr::Constant(val))),
                None => Err(self.reject(&tok)),
            },
            TokenKind::Identifier => self.parse_identifier(tok),
            TokenKind::Open => self.parse_parenthesized_expr(tok.position),
            _ => Err(self.reject(&tok)),
        }
    }

    fn parse_identifier(&mut self, tok: Token) -> Result<Subtree, ParseError> {
        if tok.text == VARIABLE_NAME {
            return Ok(Subtree::leaf(AstExpr::Variable));
        }
        if let Some(constant) = NamedConstant::from_name(&tok.text) {
            return Ok(Subtree::leaf(AstExpr::Named(constant)));
        }
        if let Some(func) = Function::from_name(&tok.text) {
            return self.parse_function_call(func, tok.position);
        }
        Err(ParseError::UnknownIdentifier {
            position: tok.position,
            name: tok.text,
        })
    }

    // Helper method for parsing parenthesized expressions
    fn parse_parenthesized_expr(&mut self, open_position: usize) -> Result<Subtree, ParseError> {
        self.paren_depth += 1;
        let expr = self.parse_expr(0)?;
        self.expect_closing(open_position)?;
        self.paren_depth -= 1;
        Ok(expr)
    }

    fn expect_closing(&mut self, open_position: usize) -> Result<(), ParseError> {
        match self.peek() {
            Some(tok) if tok.kind == TokenKind::Close => {
                self.next();
                Ok(())
            }
            Some(tok) => Err(self.reject(tok)),
            None => Err(ParseError::UnbalancedParens {
                position: open_position,
                found: "(".to_string(),
            }),
        }
    }

    // Helper method for parsing function calls
    fn parse_function_call(&mut self, func: Function, name_position: usize) -> Result<Subtree, ParseError> {
        let open_position = match self.peek() {
            Some(tok) if tok.kind == TokenKind::Open => tok.position,
            Some(tok) => return Err(self.reject(tok)),
            None => return Err(self.unexpected_end()),
        };
        self.next(); // consume '('
        self.paren_depth += 1;

        let mut args = Vec::new();
        if !matches!(self.peek(), Some(tok) if tok.kind == TokenKind::Close) {
            args.push(self.parse_expr(0)?);
            while matches!(self.peek(), Some(tok) if tok.kind == TokenKind::Separator) {
                self.next(); // consume ','
                args.push(self.parse_expr(0)?);
            }
        }

        self.expect_closing(open_position)?;
        self.paren_depth -= 1;

        if args.len() != func.arity() {
            return Err(ParseError::WrongArity {
                position: name_position,
                name: func.name().to_string(),
                expected: func.arity(),
                found: args.len(),
            });
        }
        let arg = args.pop().ok_or_else(|| self.unexpected_end())?;
        Subtree::call(func, arg)
    }

    // Parse a complete expression
    fn parse(&mut self) -> Result<AstExpr, ParseError> {
        let input = self.lexer.get_original_input();
        if input.len() > MAX_EXPRESSION_LENGTH {
            return Err(ParseError::TooComplex {
                limit: MAX_EXPRESSION_LENGTH,
            });
        }
        if input.trim().is_empty() {
            return Err(ParseError::EmptyInput);
        }

        self.recursion_depth = 0;
        let expr = self.parse_expr(0)?.ast;

        // Check for unexpected trailing tokens
        if let Some(tok) = self.peek() {
            return Err(self.reject(tok));
        }

        log::trace!("parsed {:?} as {}", input, expr);
        Ok(expr)
    }
}

/// Parse an expression string into an AST using the Pratt parser.
/// Returns a Result with either the parsed AST or an error explaining what went wrong.
pub fn parse_expression(input: &str) -> Result<AstExpr, ParseError> {
    PrattParser::new(input).parse()
}

/// A parsed formula in the single variable `x`.
///
/// Built once from a source string and evaluated any number of times. The
/// value is immutable, owns its tree outright and is `Send + Sync`, so a host
/// may share it across threads and swap in a freshly parsed instance whenever
/// the source text changes.
///
/// # Examples
///
/// ```
/// use exp_curve::Expression;
///
/// let expr = Expression::parse("sin(x^2) + 1").unwrap();
/// assert_eq!(expr.eval(0.0).unwrap(), 1.0);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Expression {
    source: String,
    ast: AstExpr,
}

impl Expression {
    pub fn parse(source: &str) -> Result<Self, ParseError> {
        let ast = parse_expression(source)?;
        Ok(Self {
            source: source.to_string(),
            ast,
        })
    }

    /// Evaluates the formula at `x`.
    pub fn eval(&self, x: Real) -> Result<Real, EvalError> {
        eval_ast(&self.ast, x)
    }

    /// The text this expression was parsed from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn ast(&self) -> &AstExpr {
        &self.ast
    }
}

impl FromStr for Expression {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Expression::parse(s)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ast)
    }
}

/// Parses `source` and evaluates it at `x` in one step.
///
/// This is the entry point for callers that hold only the formula text. Hot
/// loops should parse once with [`Expression::parse`] and call
/// [`Expression::eval`] per sample instead.
///
/// # Examples
///
/// ```
/// use exp_curve::engine::evaluate_formula;
/// use exp_curve::error::{Error, EvalError};
///
/// assert_eq!(evaluate_formula("2 + 3 * x", 4.0).unwrap(), 14.0);
/// assert_eq!(
///     evaluate_formula("1/0", 4.0),
///     Err(Error::Eval(EvalError::DivideByZero))
/// );
/// ```
pub fn evaluate_formula(source: &str, x: Real) -> crate::error::Result<Real> {
    let ast = parse_expression(source)?;
    Ok(eval_ast(&ast, x)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_approx_eq;

    fn parse_err(input: &str) -> ParseError {
        match parse_expression(input) {
            Ok(ast) => panic!("expected {:?} to fail, parsed {}", input, ast),
            Err(err) => err,
        }
    }

    #[test]
    fn test_parse_standard_chained_function_calls() {
        let ast = parse_expression("sin(cos(tan(x)))").unwrap_or_else(|e| panic!("Parse error: {}", e));
        let expected = AstExpr::call(
            Function::Sin,
            AstExpr::call(Function::Cos, AstExpr::call(Function::Tan, AstExpr::Variable)),
        );
        assert_eq!(ast, expected);
    }

    #[test]
    fn test_parse_binary_op_mixed_precedence() {
        let ast = parse_expression("1 + 2 * x").unwrap();
        let expected = AstExpr::binary(
            BinaryOp::Add,
            AstExpr::Constant(1.0),
            AstExpr::binary(BinaryOp::Mul, AstExpr::Constant(2.0), AstExpr::Variable),
        );
        assert_eq!(ast, expected);
    }

    #[test]
    fn test_parse_binary_op_left_assoc() {
        let ast = parse_expression("8 - 3 - 1").unwrap();
        let expected = AstExpr::binary(
            BinaryOp::Sub,
            AstExpr::binary(BinaryOp::Sub, AstExpr::Constant(8.0), AstExpr::Constant(3.0)),
            AstExpr::Constant(1.0),
        );
        assert_eq!(ast, expected);
    }

    #[test]
    fn test_parse_binary_op_deep_right_assoc_pow() {
        let ast = parse_expression("2^3**2").unwrap();
        let expected = AstExpr::binary(
            BinaryOp::Pow,
            AstExpr::Constant(2.0),
            AstExpr::binary(BinaryOp::Pow, AstExpr::Constant(3.0), AstExpr::Constant(2.0)),
        );
        assert_eq!(ast, expected);
    }

    #[test]
    fn test_parse_binary_op_mixed_unary_and_power() {
        // -2^2 is -(2^2), as in conventional notation
        let ast = parse_expression("-2^2").unwrap();
        let expected = AstExpr::Negate(Box::new(AstExpr::binary(
            BinaryOp::Pow,
            AstExpr::Constant(2.0),
            AstExpr::Constant(2.0),
        )));
        assert_eq!(ast, expected);

        // A negative exponent needs no parentheses
        let ast = parse_expression("2^-1").unwrap();
        assert_eq!(eval_ast(&ast, 0.0), Ok(0.5));

        // Unary + is a no-op
        assert_eq!(parse_expression("+x").unwrap(), AstExpr::Variable);
    }

    #[test]
    fn test_parse_constants_and_variable() {
        assert_eq!(parse_expression("pi").unwrap(), AstExpr::Named(NamedConstant::Pi));
        assert_eq!(parse_expression(" e ").unwrap(), AstExpr::Named(NamedConstant::E));
        assert_eq!(parse_expression("x").unwrap(), AstExpr::Variable);
    }

    #[test]
    fn test_parse_empty_input() {
        assert_eq!(parse_err(""), ParseError::EmptyInput);
        assert_eq!(parse_err("   \t"), ParseError::EmptyInput);
    }

    #[test]
    fn test_parse_primary_paren_errors() {
        assert_eq!(
            parse_err("(x + 1"),
            ParseError::UnbalancedParens {
                position: 0,
                found: "(".to_string()
            }
        );
        assert_eq!(
            parse_err("x + 1)"),
            ParseError::UnbalancedParens {
                position: 5,
                found: ")".to_string()
            }
        );
        assert_eq!(
            parse_err("sin(x"),
            ParseError::UnbalancedParens {
                position: 3,
                found: "(".to_string()
            }
        );
        assert!(matches!(parse_err("()"), ParseError::UnexpectedToken { position: 1, .. }));
    }

    #[test]
    fn test_parse_unknown_identifiers() {
        assert_eq!(
            parse_err("2 * y"),
            ParseError::UnknownIdentifier {
                position: 4,
                name: "y".to_string()
            }
        );
        // No substring matching: these are not `sin`, `x` or `pi`
        for input in ["xsin(x)", "sinx", "PI", "Sin(x)", "asin(x)"] {
            assert!(
                matches!(parse_err(input), ParseError::UnknownIdentifier { position: 0, .. }),
                "input {:?}",
                input
            );
        }
    }

    #[test]
    fn test_parse_function_arity() {
        assert_eq!(
            parse_err("sin(1, 2)"),
            ParseError::WrongArity {
                position: 0,
                name: "sin".to_string(),
                expected: 1,
                found: 2
            }
        );
        assert_eq!(
            parse_err("1 + sqrt()"),
            ParseError::WrongArity {
                position: 4,
                name: "sqrt".to_string(),
                expected: 1,
                found: 0
            }
        );
        // A function name must be followed by its argument list
        assert!(matches!(parse_err("sin x"), ParseError::UnexpectedToken { position: 4, .. }));
        assert!(matches!(parse_err("abs"), ParseError::UnexpectedToken { position: 3, .. }));
    }

    #[test]
    fn test_parse_leading_and_trailing_operators() {
        assert_eq!(
            parse_err("x +"),
            ParseError::UnexpectedToken {
                position: 3,
                found: "end of input".to_string()
            }
        );
        assert_eq!(
            parse_err("* x"),
            ParseError::UnexpectedToken {
                position: 0,
                found: "*".to_string()
            }
        );
        assert!(matches!(parse_err("2 + * 3"), ParseError::UnexpectedToken { position: 4, .. }));
        assert!(matches!(parse_err("2x"), ParseError::UnexpectedToken { position: 1, .. }));
        assert!(matches!(parse_err("1, 2"), ParseError::UnexpectedToken { position: 1, .. }));
        assert!(matches!(parse_err("x $ 2"), ParseError::UnexpectedToken { position: 2, .. }));
    }

    #[test]
    fn test_parse_malformed_numbers() {
        assert_eq!(
            parse_err("1.2.3 + x"),
            ParseError::InvalidNumber {
                position: 0,
                text: "1.2.3".to_string()
            }
        );
        assert!(matches!(parse_err("x * 4e"), ParseError::InvalidNumber { position: 4, .. }));
    }

    #[test]
    fn test_parse_too_complex() {
        let deep = format!("{}x{}", "(".repeat(MAX_RECURSION_DEPTH + 1), ")".repeat(MAX_RECURSION_DEPTH + 1));
        assert!(matches!(parse_err(&deep), ParseError::TooComplex { .. }));

        let long = "x+".repeat(MAX_EXPRESSION_LENGTH / 2) + "x";
        assert_eq!(
            parse_err(&long),
            ParseError::TooComplex {
                limit: MAX_EXPRESSION_LENGTH
            }
        );
    }

    #[test]
    fn test_long_left_chain_is_bounded() {
        // Within the length limit, but far taller than the tree limit
        let chain = "x+".repeat(4999) + "x";
        assert_eq!(chain.len(), MAX_EXPRESSION_LENGTH);
        assert_eq!(
            parse_err(&chain),
            ParseError::TooComplex {
                limit: MAX_TREE_DEPTH
            }
        );
        assert!(matches!(
            parse_err(&("2*".repeat(4999) + "x")),
            ParseError::TooComplex { .. }
        ));
        assert!(matches!(
            parse_err(&("-".repeat(MAX_TREE_DEPTH + 1) + "x")),
            ParseError::TooComplex { .. }
        ));

        // The tallest accepted chain evaluates on an ordinary test thread
        let chain = "x+".repeat(MAX_TREE_DEPTH - 1) + "x";
        let expr = Expression::parse(&chain).unwrap();
        assert_eq!(expr.eval(1.0), Ok(MAX_TREE_DEPTH as Real));
        assert_eq!(expr.clone(), expr);
        assert!(!expr.to_string().is_empty());

        let one_more = "x+".repeat(MAX_TREE_DEPTH) + "x";
        assert_eq!(
            parse_err(&one_more),
            ParseError::TooComplex {
                limit: MAX_TREE_DEPTH
            }
        );
    }

    #[test]
    fn test_moderate_nesting_is_accepted() {
        let nested = format!("{}x{}", "(".repeat(100), ")".repeat(100));
        assert_eq!(parse_expression(&nested).unwrap(), AstExpr::Variable);
    }

    #[test]
    fn test_expression_display_round_trip() {
        for source in ["sin(x^2)+1", "-2^2", "x**3 - 2*x/3", "abs(-x) + sqrt(pi * e)", "0.001*x**2 + 0.1*sin(0.1*x) + 200"] {
            let expr = Expression::parse(source).unwrap();
            let reparsed: Expression = expr.to_string().parse().unwrap();
            assert_eq!(expr.ast(), reparsed.ast(), "source {:?}", source);
            assert_eq!(expr.source(), source);
        }
    }

    #[test]
    fn test_expression_eval() {
        let expr = Expression::parse("sin(x^2)+1").unwrap();
        assert_eq!(expr.eval(0.0), Ok(1.0));
        assert_approx_eq!(expr.eval((crate::constants::PI / 2.0).sqrt()).unwrap(), 2.0, 1e-6);
    }

    #[test]
    fn test_evaluate_formula_reports_both_stages() {
        use crate::error::Error;

        assert_eq!(evaluate_formula("x * 2", 3.0), Ok(6.0));
        assert!(matches!(evaluate_formula("x *", 3.0), Err(Error::Parse(_))));
        assert_eq!(
            evaluate_formula("sqrt(x)", -1.0),
            Err(Error::Eval(EvalError::Domain { operation: "sqrt" }))
        );
    }
}
