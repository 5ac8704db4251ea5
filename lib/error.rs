//! Error types for Kestrel.
//!
//! Every variant is an interpretation failure: abstract interpretation of
//! the current instruction could not be completed, and the caller decides
//! whether to abort, skip the program point with an unconstrained
//! environment, or halt its fixed point. Arithmetic over the abstract
//! domains never fails; it degrades to `⊤` instead.

use thiserror::Error;

#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum Error {
    /// A token which is neither an ESIL keyword, a numeric constant, nor
    /// a register/flag name known to the platform.
    #[error("unknown ESIL token ({0})")]
    UnknownToken(String),

    /// An operator required more operands than the stack held.
    #[error("operand stack underflow while executing {0}")]
    StackUnderflow(String),

    /// An operand which cannot be coerced to a boolean value. This
    /// includes value sets whose global region is `⊥`.
    #[error("operand cannot be represented as a boolean value ({0})")]
    BooleanExpected(String),

    /// An assignment target which is not a register or flag identifier.
    #[error("expected register or flag, found {0}")]
    RegisterOrFlagExpected(String),

    /// Conditionals nested beyond the interpreter's recursion bound.
    #[error("conditional nesting exceeds depth limit ({0})")]
    ConditionalDepth(usize),
}

pub type Result<T> = std::result::Result<T, Error>;
