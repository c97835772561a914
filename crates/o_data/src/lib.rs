//! Pure data structures for the o runtime: the command syntax tree and the
//! world model.
//!
//! This crate has NO IO dependencies. No tokio, no file access, no
//! `SystemTime`. Timestamps and tick numbers are injected by callers
//! (typically `o_runtime`'s scheduler).

pub mod ast;
pub mod world;

pub use ast::{BoolExpr, Command, CompareOp, Node};
pub use world::{canonical_pair_space_id, ExecutionRecord, Message, SpaceData, WakeRegistration, World};
