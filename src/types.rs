//! Type definitions for the expression parser, evaluator and curve fitter.
//!
//! This module contains the closed syntax tree produced by the parser, the token
//! kinds produced by the lexer, and the [`Point`] type shared by the fitter and the
//! viewport helpers.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::Real;
use crate::functions::Function;

/// Abstract Syntax Tree (AST) node representing an expression in `x`.
///
/// Every node is drawn from this closed set: there is no identifier lookup at
/// evaluation time and no node can have side effects.
#[derive(Clone, Debug, PartialEq)]
pub enum AstExpr {
    /// A literal numerical value.
    ///
    /// Examples: `3.14`, `42`, `1e-3`
    Constant(Real),

    /// The free variable `x`.
    Variable,

    /// A named constant, `pi` or `e`.
    Named(NamedConstant),

    /// Unary negation.
    Negate(Box<AstExpr>),

    /// A binary arithmetic operation.
    ///
    /// Examples: `x + 1`, `2 * x`, `x ^ 2`
    Binary {
        /// The operator
        op: BinaryOp,
        /// The left operand
        left: Box<AstExpr>,
        /// The right operand
        right: Box<AstExpr>,
    },

    /// A call to one of the allow-listed single-argument functions.
    ///
    /// Examples: `sin(x)`, `sqrt(x*x + 1)`
    Function {
        /// The function being called
        func: Function,
        /// The argument expression
        arg: Box<AstExpr>,
    },
}

impl AstExpr {
    pub fn binary(op: BinaryOp, left: AstExpr, right: AstExpr) -> Self {
        AstExpr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn call(func: Function, arg: AstExpr) -> Self {
        AstExpr::Function {
            func,
            arg: Box::new(arg),
        }
    }
}

/// Renders the tree fully parenthesised. Trees built by the parser re-parse to an equal
/// tree, provided the added parentheses stay within the parser's nesting limit.
impl fmt::Display for AstExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AstExpr::Constant(val) => {
                if val.is_sign_negative() {
                    write!(f, "({:?})", val)
                } else {
                    write!(f, "{:?}", val)
                }
            }
            AstExpr::Variable => write!(f, "x"),
            AstExpr::Named(name) => write!(f, "{}", name),
            AstExpr::Negate(inner) => write!(f, "(-{})", inner),
            AstExpr::Binary { op, left, right } => write!(f, "({} {} {})", left, op, right),
            AstExpr::Function { func, arg } => write!(f, "{}({})", func, arg),
        }
    }
}

/// Binary arithmetic operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    /// Exponentiation, written `^` or `**`.
    Pow,
}

impl BinaryOp {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "+" => Some(BinaryOp::Add),
            "-" => Some(BinaryOp::Sub),
            "*" => Some(BinaryOp::Mul),
            "/" => Some(BinaryOp::Div),
            "^" | "**" => Some(BinaryOp::Pow),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Pow => "^",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Constants that may appear by name in a formula.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NamedConstant {
    Pi,
    E,
}

impl NamedConstant {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "pi" => Some(NamedConstant::Pi),
            "e" => Some(NamedConstant::E),
            _ => None,
        }
    }

    pub fn value(self) -> Real {
        match self {
            NamedConstant::Pi => crate::constants::PI,
            NamedConstant::E => crate::constants::E,
        }
    }
}

impl fmt::Display for NamedConstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamedConstant::Pi => f.write_str("pi"),
            NamedConstant::E => f.write_str("e"),
        }
    }
}

/// Token types used by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// A numerical literal.
    Number,

    /// An identifier: `x`, a constant or a function name.
    Identifier,

    /// One of `+ - * / ^ **`.
    Operator,

    /// An opening parenthesis.
    Open,

    /// A closing parenthesis.
    Close,

    /// An argument separator (comma).
    Separator,

    /// A character or literal the lexer could not read.
    Error,
}

/// A sample point in origin-centred, y-up "real" coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: Real,
    pub y: Real,
}

impl Point {
    pub const fn new(x: Real, y: Real) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(Real, Real)> for Point {
    fn from((x, y): (Real, Real)) -> Self {
        Self { x, y }
    }
}

impl From<Point> for (Real, Real) {
    fn from(p: Point) -> Self {
        (p.x, p.y)
    }
}
