//! Recursive-descent parser producing a postfix [`Program`].
//!
//! Precedence, loosest first:
//!
//! ```text
//! statement  := [identifier '='] ternary EOF
//! ternary    := comparison ['?' ternary ':' ternary]
//! comparison := sum [('<' | '<=' | '>' | '>=' | '==' | '!=') sum]
//! sum        := term {('+' | '-') term}
//! term       := factor {('*' | '/') factor}
//! factor     := unary ['^' factor]
//! unary      := {'+' | '-'} atom
//! atom       := number | PI | E | identifier '(' args ')' | identifier | '(' ternary ')'
//! ```
//!
//! Unary minus binds tighter than `^`, so `-2^2` is `4`.

use std::f64::consts;

use dge_api_core::Operation;

use crate::error::{DgeError, DgeResult};
use crate::function::Function;
use crate::token::{tokenize, Token, TokenKind};

/// Nesting limit. Each parenthesised group, call, ternary branch pair and
/// `^` exponent counts one level. Also caps runs of unary signs.
pub const MAX_DEPTH: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedConstant {
    Pi,
    E,
}

impl NamedConstant {
    fn lookup(text: &str) -> Option<Self> {
        if text.eq_ignore_ascii_case("pi") {
            Some(NamedConstant::Pi)
        } else if text.eq_ignore_ascii_case("e") {
            Some(NamedConstant::E)
        } else {
            None
        }
    }

    pub fn value(self) -> f64 {
        match self {
            NamedConstant::Pi => consts::PI,
            NamedConstant::E => consts::E,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Power => "^",
        }
    }

    pub fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            BinaryOp::Add => a + b,
            BinaryOp::Subtract => a - b,
            BinaryOp::Multiply => a * b,
            BinaryOp::Divide => a / b,
            BinaryOp::Power => a.powf(b),
        }
    }

    /// Host operation implementing this operator.
    pub fn operation(self) -> Operation {
        match self {
            BinaryOp::Add => Operation::Sum,
            BinaryOp::Subtract => Operation::Subtract,
            BinaryOp::Multiply => Operation::Multiply,
            BinaryOp::Divide => Operation::Divide,
            BinaryOp::Power => Operation::Power,
        }
    }
}

/// One step of the postfix program. Operands precede the instruction that
/// consumes them.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    Number(f64),
    Constant(NamedConstant),
    Identifier(String),
    /// Pops one operand.
    Negate,
    /// Pops rhs then lhs.
    Binary(BinaryOp),
    /// Pops rhs then lhs; pushes a predicate. `Operation` is one of the
    /// comparison modes.
    Compare(Operation),
    /// Pops the false branch, the true branch, then the condition.
    Select,
    /// Pops `function.arity()` arguments.
    Call(Function),
}

/// A parsed statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    /// Target of `name = expr`, if the statement is an assignment.
    pub assignment: Option<String>,
    pub instructions: Vec<Instruction>,
}

/// Parse an expression or assignment statement.
pub fn parse(source: &str) -> DgeResult<Program> {
    let tokens = tokenize(source)?;
    let mut parser = Parser {
        source,
        tokens,
        pos: 0,
        depth: 0,
        out: Vec::new(),
    };
    parser.statement()
}

struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token<'a>>,
    pos: usize,
    depth: usize,
    out: Vec<Instruction>,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Token<'a> {
        // The token list always ends with Eof and `pos` never moves past it.
        self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_at(&self, offset: usize) -> Token<'a> {
        self.tokens[(self.pos + offset).min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token<'a> {
        let token = self.peek();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, s: &str) -> bool {
        if self.peek().is(s) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, s: &str) -> DgeResult<()> {
        if self.eat(s) {
            Ok(())
        } else {
            Err(self.error(format!("expected '{s}'")))
        }
    }

    fn error(&self, message: impl Into<String>) -> DgeError {
        DgeError::parse_at(self.source, self.peek().position, message)
    }

    fn enter(&mut self) -> DgeResult<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(self.error("expression nested too deeply"));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn statement(&mut self) -> DgeResult<Program> {
        let assignment = if self.peek().kind == TokenKind::Identifier && self.peek_at(1).is("=") {
            let name = self.advance().text.to_string();
            self.advance();
            Some(name)
        } else {
            None
        };

        self.ternary()?;

        let rest = self.peek();
        if rest.kind != TokenKind::Eof {
            return Err(self.error(format!("unexpected '{}'", rest.text)));
        }
        Ok(Program {
            assignment,
            instructions: std::mem::take(&mut self.out),
        })
    }

    fn ternary(&mut self) -> DgeResult<()> {
        self.comparison()?;
        if self.eat("?") {
            self.enter()?;
            self.ternary()?;
            self.expect(":")?;
            self.ternary()?;
            self.leave();
            self.out.push(Instruction::Select);
        }
        Ok(())
    }

    fn comparison(&mut self) -> DgeResult<()> {
        self.sum()?;
        if let Some(op) = comparison_op(self.peek()) {
            self.advance();
            self.sum()?;
            self.out.push(Instruction::Compare(op));
            if comparison_op(self.peek()).is_some() {
                return Err(self.error("comparisons cannot be chained"));
            }
        }
        Ok(())
    }

    fn sum(&mut self) -> DgeResult<()> {
        self.term()?;
        loop {
            let op = if self.eat("+") {
                BinaryOp::Add
            } else if self.eat("-") {
                BinaryOp::Subtract
            } else {
                return Ok(());
            };
            self.term()?;
            self.out.push(Instruction::Binary(op));
        }
    }

    fn term(&mut self) -> DgeResult<()> {
        self.factor()?;
        loop {
            let op = if self.eat("*") {
                BinaryOp::Multiply
            } else if self.eat("/") {
                BinaryOp::Divide
            } else {
                return Ok(());
            };
            self.factor()?;
            self.out.push(Instruction::Binary(op));
        }
    }

    fn factor(&mut self) -> DgeResult<()> {
        self.unary()?;
        if self.eat("^") {
            self.enter()?;
            self.factor()?;
            self.leave();
            self.out.push(Instruction::Binary(BinaryOp::Power));
        }
        Ok(())
    }

    fn unary(&mut self) -> DgeResult<()> {
        let mut negations = 0usize;
        loop {
            if self.eat("-") {
                negations += 1;
            } else if !self.eat("+") {
                break;
            }
            if negations > MAX_DEPTH {
                return Err(self.error("expression nested too deeply"));
            }
        }

        // A signed numeric literal is a single literal, not a negation.
        if negations % 2 == 1 && self.peek().kind == TokenKind::Number {
            let value = self.number()?;
            self.out.push(Instruction::Number(-value));
            return Ok(());
        }

        self.atom()?;
        if negations % 2 == 1 {
            self.out.push(Instruction::Negate);
        }
        Ok(())
    }

    fn number(&mut self) -> DgeResult<f64> {
        let token = self.advance();
        token
            .text
            .parse::<f64>()
            .map_err(|_| DgeError::parse_at(self.source, token.position, "invalid number"))
    }

    fn atom(&mut self) -> DgeResult<()> {
        let token = self.peek();
        match token.kind {
            TokenKind::Number => {
                let value = self.number()?;
                self.out.push(Instruction::Number(value));
                Ok(())
            }
            TokenKind::Identifier if self.peek_at(1).is("(") => self.call(),
            TokenKind::Identifier => {
                self.advance();
                let instruction = match NamedConstant::lookup(token.text) {
                    Some(constant) => Instruction::Constant(constant),
                    None => Instruction::Identifier(token.text.to_string()),
                };
                self.out.push(instruction);
                Ok(())
            }
            _ if token.is("(") => {
                self.enter()?;
                self.advance();
                self.ternary()?;
                self.expect(")")?;
                self.leave();
                Ok(())
            }
            _ => Err(self.error("expected an operand")),
        }
    }

    fn call(&mut self) -> DgeResult<()> {
        let name = self.advance();
        self.advance();
        let function = Function::lookup(name.text).ok_or_else(|| DgeError::UnsupportedOperation {
            name: name.text.to_string(),
        })?;

        self.enter()?;
        let mut argc = 0;
        if !self.eat(")") {
            loop {
                self.ternary()?;
                argc += 1;
                if self.eat(")") {
                    break;
                }
                self.expect(",")?;
            }
        }
        self.leave();

        if argc != function.arity() {
            return Err(DgeError::ArityMismatch {
                function: function.name().to_string(),
                expected: function.arity(),
                actual: argc,
            });
        }
        self.out.push(Instruction::Call(function));
        Ok(())
    }
}

fn comparison_op(token: Token<'_>) -> Option<Operation> {
    if token.kind != TokenKind::Operator {
        return None;
    }
    match token.text {
        "==" => Some(Operation::Equal),
        "!=" => Some(Operation::NotEqual),
        ">" => Some(Operation::Greater),
        ">=" => Some(Operation::GreaterOrEqual),
        "<" => Some(Operation::Less),
        "<=" => Some(Operation::LessOrEqual),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Instruction::*;

    fn program(source: &str) -> Vec<Instruction> {
        parse(source).expect("parses").instructions
    }

    fn ident(name: &str) -> Instruction {
        Identifier(name.to_string())
    }

    #[test]
    fn exponent_is_right_associative() {
        assert_eq!(
            program("2^3^2"),
            vec![
                Number(2.0),
                Number(3.0),
                Number(2.0),
                Binary(BinaryOp::Power),
                Binary(BinaryOp::Power)
            ]
        );
    }

    #[test]
    fn additive_operators_are_left_associative() {
        assert_eq!(
            program("a-b+c"),
            vec![
                ident("a"),
                ident("b"),
                Binary(BinaryOp::Subtract),
                ident("c"),
                Binary(BinaryOp::Add)
            ]
        );
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        assert_eq!(
            program("(x+3)*(2+x)"),
            vec![
                ident("x"),
                Number(3.0),
                Binary(BinaryOp::Add),
                Number(2.0),
                ident("x"),
                Binary(BinaryOp::Add),
                Binary(BinaryOp::Multiply)
            ]
        );
    }

    #[test]
    fn unary_minus_negates_the_atom() {
        assert_eq!(program("-x"), vec![ident("x"), Negate]);
        assert_eq!(program("--x"), vec![ident("x")]);
        assert_eq!(program("-2"), vec![Number(-2.0)]);
        assert_eq!(
            program("-x^2"),
            vec![ident("x"), Negate, Number(2.0), Binary(BinaryOp::Power)]
        );
        assert_eq!(
            program("2^-x"),
            vec![Number(2.0), ident("x"), Negate, Binary(BinaryOp::Power)]
        );
    }

    #[test]
    fn constants_are_case_insensitive() {
        assert_eq!(
            program("pi*E"),
            vec![
                Constant(NamedConstant::Pi),
                Constant(NamedConstant::E),
                Binary(BinaryOp::Multiply)
            ]
        );
        assert_eq!(program("Pi"), vec![Constant(NamedConstant::Pi)]);
        assert_eq!(program("pie"), vec![ident("pie")]);
    }

    #[test]
    fn ternary_has_lowest_precedence() {
        assert_eq!(
            program("x < 1 ? x : 4"),
            vec![
                ident("x"),
                Number(1.0),
                Compare(Operation::Less),
                ident("x"),
                Number(4.0),
                Select
            ]
        );
    }

    #[test]
    fn nested_ternaries_associate_right() {
        assert_eq!(
            program("x > 0 ? 1 : x < 0 ? -1 : 0"),
            vec![
                ident("x"),
                Number(0.0),
                Compare(Operation::Greater),
                Number(1.0),
                ident("x"),
                Number(0.0),
                Compare(Operation::Less),
                Number(-1.0),
                Number(0.0),
                Select,
                Select
            ]
        );
    }

    #[test]
    fn calls_carry_their_function() {
        assert_eq!(
            program("clamp(x, 0, 1 + y)"),
            vec![
                ident("x"),
                Number(0.0),
                Number(1.0),
                ident("y"),
                Binary(BinaryOp::Add),
                Call(Function::Clamp)
            ]
        );
    }

    #[test]
    fn assignment_is_split_from_the_expression() {
        let parsed = parse("out = x * 2").unwrap();
        assert_eq!(parsed.assignment.as_deref(), Some("out"));
        assert_eq!(
            parsed.instructions,
            vec![ident("x"), Number(2.0), Binary(BinaryOp::Multiply)]
        );
        let compare = parse("out == 2 ? 1 : 0").unwrap();
        assert_eq!(compare.assignment, None);
    }

    #[test]
    fn syntax_errors_report_position() {
        for (source, position) in [
            ("", 0),
            ("x +", 3),
            ("(x + 1", 6),
            ("x + 1)", 5),
            ("x ? 1", 5),
            ("1 2", 2),
            ("x < y < z", 6),
        ] {
            match parse(source) {
                Err(DgeError::Parse { position: p, .. }) => {
                    assert_eq!(p, position, "position for {source:?}")
                }
                other => panic!("expected parse error for {source:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn unknown_functions_are_unsupported() {
        assert_eq!(
            parse("foo(1)"),
            Err(DgeError::UnsupportedOperation { name: "foo".into() })
        );
        // Function names are case-sensitive.
        assert!(matches!(
            parse("COS(1)"),
            Err(DgeError::UnsupportedOperation { .. })
        ));
    }

    #[test]
    fn wrong_argument_counts_are_rejected() {
        assert_eq!(
            parse("clamp(x, 1)"),
            Err(DgeError::ArityMismatch {
                function: "clamp".into(),
                expected: 3,
                actual: 2
            })
        );
        assert!(matches!(parse("cos()"), Err(DgeError::ArityMismatch { actual: 0, .. })));
    }

    #[test]
    fn deep_nesting_is_an_error_not_a_crash() {
        let source = format!("{}1{}", "(".repeat(2000), ")".repeat(2000));
        assert!(matches!(parse(&source), Err(DgeError::Parse { .. })));
        assert!(parse(&format!("{}1{}", "(".repeat(50), ")".repeat(50))).is_ok());
    }

    #[test]
    fn each_group_counts_one_level() {
        let nested = |n: usize| format!("{}1{}", "(".repeat(n), ")".repeat(n));
        assert!(parse(&nested(MAX_DEPTH)).is_ok());
        assert!(matches!(
            parse(&nested(MAX_DEPTH + 1)),
            Err(DgeError::Parse { position, ref message, .. })
                if position == MAX_DEPTH && message.contains("too deeply")
        ));

        let calls = |n: usize| format!("{}x{}", "abs(".repeat(n), ")".repeat(n));
        assert!(parse(&calls(MAX_DEPTH)).is_ok());
        assert!(parse(&calls(MAX_DEPTH + 1)).is_err());

        let powers = |n: usize| vec!["2"; n + 1].join("^");
        assert!(parse(&powers(MAX_DEPTH)).is_ok());
        assert!(parse(&powers(MAX_DEPTH + 1)).is_err());

        let selects = |n: usize| format!("{}0", "c ? 1 : ".repeat(n));
        assert!(parse(&selects(MAX_DEPTH)).is_ok());
        assert!(parse(&selects(MAX_DEPTH + 1)).is_err());
    }
}
