//! Formula parser.
//!
//! Parsing happens in two stages. The text is first read with a generic
//! C-like expression grammar into a [`Syntax`] tree, which knows about
//! arithmetic, bitwise and comparison operators as well as the boolean ones.
//! The syntax tree is then lowered into an [`Expr`], and everything without a
//! boolean meaning is rejected there:
//!
//! ```text
//! "a + b"   -> parses fine, lowering fails with UnsupportedOperator("+")
//! "1 && a"  -> parses fine, lowering fails with UnsupportedExpression("1")
//! "a && "   -> parse error
//! ```
//!
//! Operator precedence, from loosest to tightest:
//!
//! ```text
//! ||
//! &&
//! ==  !=  <  <=  >  >=
//! +   -   |  ^
//! *   /   %  <<  >>  &
//! unary: !  -  +  ^
//! ```

use std::fmt;

use log::trace;

use crate::ast::{Expr, MAX_DEPTH};
use crate::error::{Error, Result};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum UnaryOp {
    Not,
    Neg,
    Plus,
    BitNot,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Not => "!",
            UnaryOp::Neg => "-",
            UnaryOp::Plus => "+",
            UnaryOp::BitNot => "^",
        }
    }

    fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "!" => Some(UnaryOp::Not),
            "-" => Some(UnaryOp::Neg),
            "+" => Some(UnaryOp::Plus),
            "^" => Some(UnaryOp::BitNot),
            _ => None,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BinaryOp {
    LogicalOr,
    LogicalAnd,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    BitOr,
    BitXor,
    Mul,
    Div,
    Rem,
    Shl,
    Shr,
    BitAnd,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::LogicalOr => "||",
            BinaryOp::LogicalAnd => "&&",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::BitAnd => "&",
        }
    }

    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::LogicalOr => 1,
            BinaryOp::LogicalAnd => 2,
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => 3,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::BitOr | BinaryOp::BitXor => 4,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem | BinaryOp::Shl | BinaryOp::Shr | BinaryOp::BitAnd => 5,
        }
    }

    fn from_symbol(symbol: &str) -> Option<Self> {
        let op = match symbol {
            "||" => BinaryOp::LogicalOr,
            "&&" => BinaryOp::LogicalAnd,
            "==" => BinaryOp::Eq,
            "!=" => BinaryOp::Ne,
            "<" => BinaryOp::Lt,
            "<=" => BinaryOp::Le,
            ">" => BinaryOp::Gt,
            ">=" => BinaryOp::Ge,
            "+" => BinaryOp::Add,
            "-" => BinaryOp::Sub,
            "|" => BinaryOp::BitOr,
            "^" => BinaryOp::BitXor,
            "*" => BinaryOp::Mul,
            "/" => BinaryOp::Div,
            "%" => BinaryOp::Rem,
            "<<" => BinaryOp::Shl,
            ">>" => BinaryOp::Shr,
            "&" => BinaryOp::BitAnd,
            _ => return None,
        };
        Some(op)
    }
}

/// Generic expression syntax, before any boolean interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Syntax {
    Ident(String),
    Literal(String),
    Unary(UnaryOp, Box<Syntax>),
    Binary(BinaryOp, Box<Syntax>, Box<Syntax>),
    Paren(Box<Syntax>),
}

impl Syntax {
    // Binary operators use their own precedence; everything else binds tightest.
    fn precedence(&self) -> u8 {
        match self {
            Syntax::Binary(op, _, _) => op.precedence(),
            _ => UNARY_PRECEDENCE,
        }
    }
}

const UNARY_PRECEDENCE: u8 = 6;

fn write_operand(f: &mut fmt::Formatter<'_>, child: &Syntax, min: u8) -> fmt::Result {
    if child.precedence() < min {
        write!(f, "({})", child)
    } else {
        write!(f, "{}", child)
    }
}

impl fmt::Display for Syntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Syntax::Ident(name) => write!(f, "{}", name),
            Syntax::Literal(text) => write!(f, "{}", text),
            Syntax::Unary(op, e) => {
                write!(f, "{}", op.symbol())?;
                write_operand(f, e, UNARY_PRECEDENCE)
            }
            Syntax::Binary(op, l, r) => {
                let prec = op.precedence();
                write_operand(f, l, prec)?;
                write!(f, " {} ", op.symbol())?;
                write_operand(f, r, prec + 1)
            }
            Syntax::Paren(e) => write!(f, "({})", e),
        }
    }
}

impl TryFrom<Syntax> for Expr {
    type Error = Error;

    fn try_from(syntax: Syntax) -> Result<Self> {
        match syntax {
            Syntax::Ident(name) => Ok(Expr::Var(name)),
            Syntax::Literal(text) => Err(Error::UnsupportedExpression(text)),
            Syntax::Unary(UnaryOp::Not, e) => Ok(Expr::not(Expr::try_from(*e)?)),
            Syntax::Unary(op, _) => Err(Error::UnsupportedOperator(op.symbol().to_string())),
            Syntax::Binary(BinaryOp::LogicalAnd, l, r) => Ok(Expr::and(Expr::try_from(*l)?, Expr::try_from(*r)?)),
            Syntax::Binary(BinaryOp::LogicalOr, l, r) => Ok(Expr::or(Expr::try_from(*l)?, Expr::try_from(*r)?)),
            Syntax::Binary(op, _, _) => Err(Error::UnsupportedOperator(op.symbol().to_string())),
            Syntax::Paren(e) => Ok(Expr::group(Expr::try_from(*e)?)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TokenKind {
    Ident(String),
    Int(String),
    Op(&'static str),
    LParen,
    RParen,
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Ident(name) => write!(f, "identifier `{}`", name),
            TokenKind::Int(text) => write!(f, "literal `{}`", text),
            TokenKind::Op(op) => write!(f, "`{}`", op),
            TokenKind::LParen => write!(f, "`(`"),
            TokenKind::RParen => write!(f, "`)`"),
            TokenKind::Eof => write!(f, "end of input"),
        }
    }
}

#[derive(Debug, Clone)]
struct Token {
    kind: TokenKind,
    position: usize,
}

const TWO_CHAR_OPS: [&str; 8] = ["&&", "||", "<<", ">>", "==", "!=", "<=", ">="];
const ONE_CHAR_OPS: [&str; 11] = ["!", "+", "-", "*", "/", "%", "&", "|", "^", "<", ">"];

fn tokenize(text: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let bytes = text.as_bytes();
    let mut pos = 0;

    while pos < bytes.len() {
        let c = bytes[pos];
        if c.is_ascii_whitespace() {
            pos += 1;
            continue;
        }

        let start = pos;
        let kind = if c.is_ascii_alphabetic() || c == b'_' {
            while pos < bytes.len() && (bytes[pos].is_ascii_alphanumeric() || bytes[pos] == b'_') {
                pos += 1;
            }
            TokenKind::Ident(text[start..pos].to_string())
        } else if c.is_ascii_digit() {
            while pos < bytes.len() && bytes[pos].is_ascii_alphanumeric() {
                pos += 1;
            }
            TokenKind::Int(text[start..pos].to_string())
        } else if c == b'(' {
            pos += 1;
            TokenKind::LParen
        } else if c == b')' {
            pos += 1;
            TokenKind::RParen
        } else if let Some(op) = TWO_CHAR_OPS.iter().copied().find(|op| text[pos..].starts_with(op)) {
            pos += 2;
            TokenKind::Op(op)
        } else if let Some(op) = ONE_CHAR_OPS.iter().copied().find(|op| text[pos..].starts_with(op)) {
            pos += 1;
            TokenKind::Op(op)
        } else {
            let ch = text[pos..].chars().next().unwrap_or_default();
            return Err(Error::parse(format!("unexpected character `{}`", ch), pos));
        };

        tokens.push(Token { kind, position: start });
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        position: text.len(),
    });
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    index: usize,
    // Unary operators and open parentheses above the current position.
    nesting: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        // The token stream always ends with `Eof`, and `advance` never moves past it.
        &self.tokens[self.index]
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.index].clone();
        if token.kind != TokenKind::Eof {
            self.index += 1;
        }
        token
    }

    fn peek_binary(&self) -> Option<BinaryOp> {
        match self.peek().kind {
            TokenKind::Op(symbol) => BinaryOp::from_symbol(symbol),
            _ => None,
        }
    }

    fn unexpected(&self, expected: &str) -> Error {
        let token = self.peek();
        Error::parse(format!("expected {}, found {}", expected, token.kind), token.position)
    }

    fn too_deep(position: usize) -> Error {
        Error::parse("formula nested too deeply", position)
    }

    /// Steps one level down for the construct starting at `position`.
    fn enter(&mut self, position: usize) -> Result<()> {
        self.nesting += 1;
        if self.nesting > MAX_DEPTH {
            return Err(Self::too_deep(position));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.nesting -= 1;
    }

    /// Checks the depth of a node about to be built for the operator at `position`.
    fn node_depth(child_depth: usize, position: usize) -> Result<usize> {
        let depth = child_depth + 1;
        if depth > MAX_DEPTH {
            return Err(Self::too_deep(position));
        }
        Ok(depth)
    }

    // Every parse function returns the depth of the tree it built along with it.

    fn parse_expr(&mut self, min_prec: u8) -> Result<(Syntax, usize)> {
        let (mut lhs, mut depth) = self.parse_unary()?;
        while let Some(op) = self.peek_binary() {
            if op.precedence() < min_prec {
                break;
            }
            let position = self.advance().position;
            // Precedence strictly grows on this recursion, so it needs no nesting count.
            let (rhs, rhs_depth) = self.parse_expr(op.precedence() + 1)?;
            depth = Self::node_depth(depth.max(rhs_depth), position)?;
            lhs = Syntax::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok((lhs, depth))
    }

    fn parse_unary(&mut self) -> Result<(Syntax, usize)> {
        if let TokenKind::Op(symbol) = self.peek().kind {
            if let Some(op) = UnaryOp::from_symbol(symbol) {
                let position = self.advance().position;
                self.enter(position)?;
                let (operand, depth) = self.parse_unary()?;
                self.leave();
                let depth = Self::node_depth(depth, position)?;
                return Ok((Syntax::Unary(op, Box::new(operand)), depth));
            }
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<(Syntax, usize)> {
        match self.peek().kind.clone() {
            TokenKind::Ident(name) => {
                self.advance();
                Ok((Syntax::Ident(name), 0))
            }
            TokenKind::Int(text) => {
                self.advance();
                Ok((Syntax::Literal(text), 0))
            }
            TokenKind::LParen => {
                let position = self.advance().position;
                self.enter(position)?;
                let (inner, depth) = self.parse_expr(0)?;
                if self.peek().kind != TokenKind::RParen {
                    return Err(self.unexpected("`)`"));
                }
                self.advance();
                self.leave();
                let depth = Self::node_depth(depth, position)?;
                Ok((Syntax::Paren(Box::new(inner)), depth))
            }
            _ => Err(self.unexpected("operand")),
        }
    }
}

/// Parses `text` with the generic expression grammar, without lowering.
///
/// Trees deeper than [`MAX_DEPTH`] are rejected with a parse error.
pub fn parse_syntax(text: &str) -> Result<Syntax> {
    let tokens = tokenize(text)?;
    trace!("tokens: {:?}", tokens);
    let mut parser = Parser {
        tokens,
        index: 0,
        nesting: 0,
    };
    let (syntax, depth) = parser.parse_expr(0)?;
    if parser.peek().kind != TokenKind::Eof {
        return Err(parser.unexpected("operator or end of input"));
    }
    trace!("syntax depth: {}", depth);
    Ok(syntax)
}

/// Parses a boolean formula such as `a && b || !c`.
pub fn parse(text: &str) -> Result<Expr> {
    let syntax = parse_syntax(text)?;
    Expr::try_from(syntax)
}
