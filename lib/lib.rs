//! Kestrel is a Value-Set Analysis core for ESIL, the postfix intermediate
//! representation emitted by radare2-family disassemblers.
//!
//! Kestrel approximates the values registers and flags can hold at each
//! program point. It does so by abstractly interpreting one instruction's
//! ESIL over a small family of abstract domains:
//!
//! * `domain::StridedInterval` — sets of integers of the form
//!   `{base + k * stride mod 2^W}`, with `⊤`/`⊥` sentinels.
//! * `domain::ValueSet` — one strided interval per symbolic memory region,
//!   so pointer arithmetic confined to one region stays precise.
//! * `domain::Bool3` — three-valued logic for conditional flags.
//! * `domain::AbstractEnvironment` — the register/flag state at a program
//!   point, with a join for control-flow merges.
//!
//! The entry point is `esil::Transformer`, which maps one instruction's
//! ESIL text and an input environment to the environment after the
//! instruction. Driving the transformer across basic blocks to a fixed
//! point, and persisting the per-instruction environments, is the
//! caller's business; `AbstractEnvironment::join` and
//! `AbstractEnvironment::widen` are the primitives such a driver needs at
//! merge points.

pub mod architecture;
pub mod domain;
pub mod error;
pub mod esil;
#[cfg(test)]
mod tests;
pub mod types;

pub use crate::error::{Error, Result};
