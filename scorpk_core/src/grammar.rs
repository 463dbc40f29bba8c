//! Line classifier
//!
//! A line is tested against the statement shapes below in a fixed order and
//! the first match wins. Several shapes are prefixes of others (a call looks
//! like the start of nothing else, but an untyped `let` would also satisfy the
//! assignment shape if it were tried first), so the order is part of the
//! grammar.

use crate::types::TypeTag;
use regex::{Captures, Regex};
use std::fmt;
use std::sync::OnceLock;

/// Integer comparison used by conditionals and while guards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Gt,
    Lt,
    Eq,
}

impl CmpOp {
    fn parse(s: &str) -> Option<Self> {
        match s {
            ">" => Some(CmpOp::Gt),
            "<" => Some(CmpOp::Lt),
            "==" => Some(CmpOp::Eq),
            _ => None,
        }
    }

    /// Apply the comparison
    pub fn holds(self, left: i64, right: i64) -> bool {
        match self {
            CmpOp::Gt => left > right,
            CmpOp::Lt => left < right,
            CmpOp::Eq => left == right,
        }
    }
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CmpOp::Gt => f.write_str(">"),
            CmpOp::Lt => f.write_str("<"),
            CmpOp::Eq => f.write_str("=="),
        }
    }
}

/// `<name> <op> <int>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub var: String,
    pub op: CmpOp,
    pub rhs: i64,
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.var, self.op, self.rhs)
    }
}

/// A classified source line with its captured fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// `let <name>: <type> = <literal>;`
    TypedDeclaration {
        name: String,
        ty: TypeTag,
        literal: String,
    },
    /// `let <name> = <literal>;`
    Declaration { name: String, literal: String },
    /// `<name> -> <type>;`
    Coercion { name: String, ty: TypeTag },
    /// `<name> = <expr>;`
    Assignment { name: String, expr: String },
    /// `lock(<name>);`
    Lock { name: String },
    /// `fn <name>() {`
    FunctionHeader { name: String },
    /// `intent <name> {`
    IntentHeader { name: String },
    /// `activar <intent> <state>;`
    Activation { intent: String, state: String },
    /// `if <cond> <action>;`
    InlineIf { cond: Condition, action: String },
    /// `if <cond> {`
    IfHeader { cond: Condition },
    /// `while <cond> {`
    WhileHeader { cond: Condition },
    /// `for <name> in <start>..<end> {`
    ForHeader { var: String, start: i64, end: i64 },
    /// `paralelo {`
    ParallelHeader,
    /// `<name>();`
    Call { name: String },
    /// `print(<argument>);`
    Print { argument: String },
}

impl Statement {
    /// Short name used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Statement::TypedDeclaration { .. } => "typed_declaration",
            Statement::Declaration { .. } => "declaration",
            Statement::Coercion { .. } => "coercion",
            Statement::Assignment { .. } => "assignment",
            Statement::Lock { .. } => "lock",
            Statement::FunctionHeader { .. } => "function",
            Statement::IntentHeader { .. } => "intent",
            Statement::Activation { .. } => "activation",
            Statement::InlineIf { .. } => "inline_if",
            Statement::IfHeader { .. } => "if",
            Statement::WhileHeader { .. } => "while",
            Statement::ForHeader { .. } => "for",
            Statement::ParallelHeader => "parallel",
            Statement::Call { .. } => "call",
            Statement::Print { .. } => "print",
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Shape {
    TypedDeclaration,
    Declaration,
    Coercion,
    Assignment,
    Lock,
    FunctionHeader,
    IntentHeader,
    Activation,
    InlineIf,
    IfHeader,
    WhileHeader,
    ForHeader,
    ParallelHeader,
    Call,
    Print,
}

const SHAPES: &[(Shape, &str)] = &[
    (Shape::TypedDeclaration, r"^let (\w+): (int|string) = (.+);$"),
    (Shape::Declaration, r"^let (\w+) = (.+);$"),
    (Shape::Coercion, r"^(\w+) -> (int|string);$"),
    (Shape::Assignment, r"^(\w+) = (.+);$"),
    (Shape::Lock, r"^lock\((\w+)\);$"),
    (Shape::FunctionHeader, r"^fn (\w+)\(\) \{$"),
    (Shape::IntentHeader, r"^intent (\w+) \{$"),
    (Shape::Activation, r"^activar (\w+) (\w+);$"),
    (Shape::InlineIf, r"^if (\w+) (>|<|==) (-?\d+) (.+;)$"),
    (Shape::IfHeader, r"^if (\w+) (>|<|==) (-?\d+) \{$"),
    (Shape::WhileHeader, r"^while (\w+) (>|<|==) (-?\d+) \{$"),
    (Shape::ForHeader, r"^for (\w+) in (-?\d+)\.\.(-?\d+) \{$"),
    (Shape::ParallelHeader, r"^paralelo \{$"),
    (Shape::Call, r"^(\w+)\(\);$"),
    (Shape::Print, r"^print\((.+)\);$"),
];

const STATE_HEADER: &str = r"^estado (\w+):$";

/// Compiled statement templates, in priority order
pub struct Grammar {
    shapes: Vec<(Shape, Regex)>,
    state_header: Regex,
}

impl Grammar {
    fn compile() -> Self {
        let shapes = SHAPES
            .iter()
            .map(|(shape, pattern)| {
                let regex = Regex::new(pattern).expect("statement pattern compiles");
                (*shape, regex)
            })
            .collect();
        let state_header = Regex::new(STATE_HEADER).expect("state pattern compiles");
        Self {
            shapes,
            state_header,
        }
    }

    /// Process-wide grammar instance
    pub fn get() -> &'static Grammar {
        static GRAMMAR: OnceLock<Grammar> = OnceLock::new();
        GRAMMAR.get_or_init(Grammar::compile)
    }

    /// Classify one line; `None` means no shape matched
    pub fn classify(&self, line: &str) -> Option<Statement> {
        let line = line.trim();
        for (shape, regex) in &self.shapes {
            if let Some(caps) = regex.captures(line) {
                // A matched shape with an unparseable number is not retried
                // against later shapes.
                return build(*shape, &caps);
            }
        }
        None
    }

    /// Name captured by an `estado <name>:` header line
    pub fn state_header(&self, line: &str) -> Option<String> {
        self.state_header
            .captures(line.trim())
            .map(|caps| caps[1].to_string())
    }
}

fn condition(caps: &Captures<'_>) -> Option<Condition> {
    Some(Condition {
        var: caps[1].to_string(),
        op: CmpOp::parse(&caps[2])?,
        rhs: caps[3].parse().ok()?,
    })
}

fn build(shape: Shape, caps: &Captures<'_>) -> Option<Statement> {
    let field = |i: usize| caps[i].to_string();
    let stmt = match shape {
        Shape::TypedDeclaration => Statement::TypedDeclaration {
            name: field(1),
            ty: caps[2].parse().ok()?,
            literal: caps[3].trim().to_string(),
        },
        Shape::Declaration => Statement::Declaration {
            name: field(1),
            literal: caps[2].trim().to_string(),
        },
        Shape::Coercion => Statement::Coercion {
            name: field(1),
            ty: caps[2].parse().ok()?,
        },
        Shape::Assignment => Statement::Assignment {
            name: field(1),
            expr: caps[2].trim().to_string(),
        },
        Shape::Lock => Statement::Lock { name: field(1) },
        Shape::FunctionHeader => Statement::FunctionHeader { name: field(1) },
        Shape::IntentHeader => Statement::IntentHeader { name: field(1) },
        Shape::Activation => Statement::Activation {
            intent: field(1),
            state: field(2),
        },
        Shape::InlineIf => Statement::InlineIf {
            cond: condition(caps)?,
            action: field(4),
        },
        Shape::IfHeader => Statement::IfHeader {
            cond: condition(caps)?,
        },
        Shape::WhileHeader => Statement::WhileHeader {
            cond: condition(caps)?,
        },
        Shape::ForHeader => Statement::ForHeader {
            var: field(1),
            start: caps[2].parse().ok()?,
            end: caps[3].parse().ok()?,
        },
        Shape::ParallelHeader => Statement::ParallelHeader,
        Shape::Call => Statement::Call { name: field(1) },
        Shape::Print => Statement::Print {
            argument: caps[1].trim().to_string(),
        },
    };
    Some(stmt)
}

/// Classify a line with the shared grammar
pub fn classify(line: &str) -> Option<Statement> {
    Grammar::get().classify(line)
}
