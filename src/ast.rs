//! Internal representation of the AST without source information
use crate::grammar::lexer::Operator;

use std::fmt;

/// Statements in execution order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program<'source>(pub Vec<Statement<'source>>);

#[derive(Debug, Clone, PartialEq)]
pub enum Statement<'source> {
    Print(Expr<'source>),
    VariableDeclaration {
        name: &'source str,
        initializer: Expr<'source>,
    },
    VariableAssignment {
        name: &'source str,
        value: Expr<'source>,
    },
    While {
        condition: Expr<'source>,
        body: Vec<Statement<'source>>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr<'source> {
    NumberLiteral(f32),
    Identifier(&'source str),
    Binary {
        operator: BinaryOp,
        lhs: Box<Expr<'source>>,
        rhs: Box<Expr<'source>>,
    },
}

impl<'source> Expr<'source> {
    pub fn binary(operator: BinaryOp, lhs: Self, rhs: Self) -> Self {
        Self::Binary {
            operator,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }
}

/// Every operator is evaluated on `f32` operands except `&&`, which works on the
/// `i32` results of comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// `+` operator
    Add,
    /// `-` operator
    Subtract,
    /// `*` operator
    Multiply,
    /// `/` operator
    Divide,
    /// `==` operator
    Equal,
    /// `>` operator
    GreaterThan,
    /// `<` operator
    LessThan,
    /// `&&` operator
    LogicAnd,
}

impl BinaryOp {
    pub const fn from_operator(op: Operator) -> Option<Self> {
        Some(match op {
            Operator::Plus => Self::Add,
            Operator::Minus => Self::Subtract,
            Operator::Star => Self::Multiply,
            Operator::Slash => Self::Divide,
            Operator::DoubleEquals => Self::Equal,
            Operator::AngleRight => Self::GreaterThan,
            Operator::AngleLeft => Self::LessThan,
            Operator::DoubleAnd => Self::LogicAnd,
            Operator::Equals => return None,
        })
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Equal => "==",
            Self::GreaterThan => ">",
            Self::LessThan => "<",
            Self::LogicAnd => "&&",
        })
    }
}
