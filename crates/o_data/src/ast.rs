//! The command syntax tree produced by the parser (`o_grammar`) and shared
//! by every downstream component. Pure data: no parsing logic lives here.

use serde::{Deserialize, Serialize};

/// A parsed top-level command: `\name content... ---`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub name: String,
    pub content: Vec<Node>,
}

impl Command {
    pub fn new(name: impl Into<String>, content: Vec<Node>) -> Self {
        Self {
            name: name.into(),
            content,
        }
    }

    /// Text nodes only, joined with a single space. Used by `echo`, `say`,
    /// `publish`, and `stdout` to reconstruct the free-text portion of a
    /// command's arguments.
    pub fn text_parts(&self) -> Vec<&str> {
        self.content
            .iter()
            .filter_map(|n| match n {
                Node::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn entity_refs(&self) -> Vec<&str> {
        self.content
            .iter()
            .filter_map(|n| match n {
                Node::Entity { name } => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn space_refs(&self) -> Vec<&str> {
        self.content
            .iter()
            .filter_map(|n| match n {
                Node::Space { name } => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn condition(&self) -> Option<&BoolExpr> {
        self.content.iter().find_map(|n| match n {
            Node::Condition { expr } => Some(expr),
            _ => None,
        })
    }
}

/// One argument-position node inside a command's `content`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Node {
    /// A literal text fragment, including any `#` that isn't a space sigil.
    Text { text: String },
    /// `@name`, or one expansion of `@(a,b,...)`. `name` excludes the `@`.
    Entity { name: String },
    /// `#name`, or one expansion of `#(a,b,...)`. `name` excludes the `#`.
    Space { name: String },
    /// `?( EXPR )`.
    Condition { expr: BoolExpr },
    /// One command inside `$( \cmd--- )`.
    Query { command: Box<Command> },
}

/// Comparison operator for `Compare` nodes in a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompareOp {
    Lt,
    Gt,
    Eq,
}

impl CompareOp {
    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Lt => "<",
            CompareOp::Gt => ">",
            CompareOp::Eq => "=",
        }
    }
}

/// A boolean condition tree, as produced by `?( ... )` and persisted as part
/// of a wake registration (`memory/wake/<entity>.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BoolExpr {
    Or { l: Box<BoolExpr>, r: Box<BoolExpr> },
    And { l: Box<BoolExpr>, r: Box<BoolExpr> },
    Not { x: Box<BoolExpr> },
    Compare {
        l: Box<BoolExpr>,
        op: CompareOp,
        r: Box<BoolExpr>,
    },
    Query { command: Box<Command> },
    Text { text: String },
    Entity { name: String },
    Space { name: String },
}
